//! Declarative scene description and its Blender Python rendering.

use std::fmt;
use std::path::{Path, PathBuf};

pub const DEFAULT_STILL_OUTPUT: &str = "/tmp/blender_render.png";
pub const DEFAULT_ANIMATION_OUTPUT: &str = "/tmp/architecture_animation.mp4";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec3(pub f64, pub f64, pub f64);

impl fmt::Display for Vec3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0, self.1, self.2)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneObject {
    Cube { size: f64, location: Vec3 },
    SunLight { location: Vec3 },
}

/// A location keyframe on the camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: u32,
    pub location: Vec3,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub location: Vec3,
    pub rotation: Vec3,
    pub keyframes: Vec<Keyframe>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Single PNG frame.
    Still { path: PathBuf },
    /// MPEG-4 movie over an inclusive frame range.
    Animation {
        path: PathBuf,
        fps: u32,
        frame_start: u32,
        frame_end: u32,
    },
}

impl Output {
    pub fn path(&self) -> &Path {
        match self {
            Output::Still { path } | Output::Animation { path, .. } => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub objects: Vec<SceneObject>,
    pub camera: Camera,
    pub output: Output,
}

fn base_objects() -> Vec<SceneObject> {
    vec![
        SceneObject::Cube {
            size: 2.0,
            location: Vec3(0.0, 0.0, 1.0),
        },
        SceneObject::SunLight {
            location: Vec3(0.0, 0.0, 10.0),
        },
    ]
}

impl Scene {
    /// Cube under a sun light, seen from a fixed corner camera.
    pub fn still(output: impl Into<PathBuf>) -> Self {
        Self {
            objects: base_objects(),
            camera: Camera {
                location: Vec3(5.0, -5.0, 5.0),
                rotation: Vec3(1.1, 0.0, 0.9),
                keyframes: Vec::new(),
            },
            output: Output::Still {
                path: output.into(),
            },
        }
    }

    /// Same cube, with the camera dollying in over 50 frames at 24 fps.
    pub fn animation(output: impl Into<PathBuf>) -> Self {
        let start = Vec3(10.0, -10.0, 5.0);
        Self {
            objects: base_objects(),
            camera: Camera {
                location: start,
                rotation: Vec3(1.2, 0.0, 0.9),
                keyframes: vec![
                    Keyframe {
                        frame: 1,
                        location: start,
                    },
                    Keyframe {
                        frame: 50,
                        location: Vec3(0.0, -5.0, 5.0),
                    },
                ],
            },
            output: Output::Animation {
                path: output.into(),
                fps: 24,
                frame_start: 1,
                frame_end: 50,
            },
        }
    }

    /// Blender Python that builds this scene from an empty file and renders it.
    pub fn to_script(&self) -> String {
        let mut script = String::from("import bpy\n");
        script.push_str("bpy.ops.wm.read_factory_settings(use_empty=True)\n");

        for object in &self.objects {
            match object {
                SceneObject::Cube { size, location } => {
                    script.push_str(&format!(
                        "bpy.ops.mesh.primitive_cube_add(size={}, location={})\n",
                        size, location
                    ));
                }
                SceneObject::SunLight { location } => {
                    script.push_str(&format!(
                        "bpy.ops.object.light_add(type='SUN', location={})\n",
                        location
                    ));
                }
            }
        }

        script.push_str(&format!(
            "bpy.ops.object.camera_add(location={}, rotation={})\n",
            self.camera.location, self.camera.rotation
        ));
        script.push_str("camera = bpy.context.object\n");

        for keyframe in &self.camera.keyframes {
            script.push_str(&format!("camera.location = {}\n", keyframe.location));
            script.push_str(&format!(
                "camera.keyframe_insert(data_path=\"location\", frame={})\n",
                keyframe.frame
            ));
        }

        script.push_str("scene = bpy.context.scene\n");
        script.push_str("scene.camera = camera\n");
        script.push_str(&format!(
            "scene.render.filepath = {}\n",
            python_string(&self.output.path().to_string_lossy())
        ));

        match &self.output {
            Output::Still { .. } => {
                script.push_str("scene.render.image_settings.file_format = 'PNG'\n");
                script.push_str("bpy.ops.render.render(write_still=True)\n");
            }
            Output::Animation {
                fps,
                frame_start,
                frame_end,
                ..
            } => {
                script.push_str("scene.render.image_settings.file_format = 'FFMPEG'\n");
                script.push_str("scene.render.ffmpeg.format = 'MPEG4'\n");
                script.push_str(&format!("scene.render.fps = {}\n", fps));
                script.push_str(&format!("scene.frame_start = {}\n", frame_start));
                script.push_str(&format!("scene.frame_end = {}\n", frame_end));
                script.push_str("bpy.ops.render.render(animation=True)\n");
            }
        }

        script
    }
}

/// Quote `s` as a Python string literal.
fn python_string(s: &str) -> String {
    // JSON string escapes are a subset of Python's.
    serde_json::to_string(s).unwrap_or_else(|_| format!("{:?}", s))
}

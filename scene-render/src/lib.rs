//! scene-render: one-shot Blender batch jobs for the concept scene.
//!
//! Each job describes a scene, turns it into a Blender Python script and runs
//! Blender headless on it. Nothing here is reachable from the HTTP service.
pub mod blender;
pub mod scene;

pub use blender::{BlenderRunner, RenderError};
pub use scene::{Scene, Vec3};

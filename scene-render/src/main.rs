use clap::{Parser, Subcommand};
use scene_render::scene::{DEFAULT_ANIMATION_OUTPUT, DEFAULT_STILL_OUTPUT};
use scene_render::{BlenderRunner, Scene};
use service_core::observability::init_tracing;
use std::path::PathBuf;

/// Render the concept scene with Blender.
#[derive(Debug, Parser)]
#[command(name = "scene-render", version)]
struct Cli {
    /// Blender executable.
    #[arg(long, env = "BLENDER_BIN", default_value = "blender", global = true)]
    blender: String,

    /// Print the generated script instead of running Blender.
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    job: Job,
}

#[derive(Debug, Subcommand)]
enum Job {
    /// Render a single PNG frame.
    Still {
        #[arg(long, default_value = DEFAULT_STILL_OUTPUT)]
        output: PathBuf,
    },
    /// Render a 50 frame MPEG-4 camera move.
    Animation {
        #[arg(long, default_value = DEFAULT_ANIMATION_OUTPUT)]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing("scene-render", "info", None);

    let scene = match cli.job {
        Job::Still { output } => Scene::still(output),
        Job::Animation { output } => Scene::animation(output),
    };
    let script = scene.to_script();

    if cli.dry_run {
        print!("{}", script);
        return Ok(());
    }

    let output = BlenderRunner::new(cli.blender)
        .render(&script, scene.output.path())
        .await?;

    tracing::info!(output = %output.display(), "Wrote render output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn still_defaults_to_tmp_png() {
        let cli = Cli::try_parse_from(["scene-render", "still"]).unwrap();
        match cli.job {
            Job::Still { output } => assert_eq!(output, PathBuf::from(DEFAULT_STILL_OUTPUT)),
            other => panic!("unexpected job {:?}", other),
        }
    }

    #[test]
    fn animation_accepts_output_and_dry_run() {
        let cli =
            Cli::try_parse_from(["scene-render", "animation", "--output", "/tmp/a.mp4", "--dry-run"])
                .unwrap();
        assert!(cli.dry_run);
        match cli.job {
            Job::Animation { output } => assert_eq!(output, PathBuf::from("/tmp/a.mp4")),
            other => panic!("unexpected job {:?}", other),
        }
    }
}

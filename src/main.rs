use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use showcase3d::config::ShowcaseConfig;
use showcase3d::section::{AttributeValue, SectionDescriptor};
use showcase3d::snapshot::{write_snapshot, SnapshotRequest};
use showcase3d::terminal::{terminal_size, viewport_for};
use showcase3d::{load_showcase, AsyncModelLoader, GltfLoader, Showcase, ShowcaseApp, ShowcaseOptions};

#[derive(Parser, Debug)]
#[command(name = "showcase3d", version)]
#[command(about = "Scroll through 3D models in the terminal")]
struct Args {
    /// Showcase file (TOML) listing the sections
    config: Option<PathBuf>,

    /// Model of a single ad-hoc section, used instead of a showcase file
    #[arg(long, conflicts_with = "config")]
    model: Option<String>,

    /// Initial yaw of the ad-hoc section's model, in degrees
    #[arg(long, requires = "model", allow_hyphen_values = true)]
    rotate: Option<String>,

    /// Background color of the ad-hoc section
    #[arg(long, requires = "model")]
    bgcolor: Option<String>,

    /// Heading of the ad-hoc section
    #[arg(long, requires = "model")]
    name: Option<String>,

    /// Start with the debug overlay shown
    #[arg(short, long)]
    debug: bool,

    /// Start in wireframe mode
    #[arg(short, long)]
    wireframe: bool,

    /// Frames per second of the render loop
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Render one section to this PNG file and exit
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Section to snapshot (1-based)
    #[arg(long, default_value_t = 1, requires = "snapshot")]
    section: usize,

    /// Scroll progress of the snapshot, 0 to 1
    #[arg(long, default_value_t = 0.0, requires = "snapshot")]
    progress: f64,

    /// Snapshot width in pixels
    #[arg(long, default_value_t = 800, requires = "snapshot")]
    width: u32,

    /// Snapshot height in pixels
    #[arg(long, default_value_t = 600, requires = "snapshot")]
    height: u32,
}

impl Args {
    fn showcase(&self) -> Result<Showcase> {
        if let Some(path) = &self.config {
            return load_showcase(path).with_context(|| format!("failed to load {}", path.display()));
        }
        let Some(model) = &self.model else {
            bail!("either a showcase file or --model is required");
        };
        let config = ShowcaseConfig {
            sections: vec![SectionDescriptor {
                model: Some(model.clone()),
                rotate: self.rotate.clone().map(AttributeValue::Text),
                bgcolor: self.bgcolor.clone(),
                name: self.name.clone().unwrap_or_default(),
                ..SectionDescriptor::default()
            }],
            ..ShowcaseConfig::default()
        };
        Ok(config.validate(None)?)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();
    let showcase = args.showcase()?;
    log::info!("Starting showcase3d v{}", env!("CARGO_PKG_VERSION"));

    if let Some(path) = &args.snapshot {
        if args.section == 0 {
            bail!("--section is 1-based");
        }
        let request = SnapshotRequest {
            section: args.section - 1,
            progress: args.progress,
            width: args.width,
            height: args.height,
            wireframe: args.wireframe,
        };
        write_snapshot(path, &showcase, &GltfLoader, &request)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        return Ok(());
    }

    let (cols, rows) = terminal_size().context("failed to query terminal size")?;
    let options = ShowcaseOptions {
        debug: args.debug,
        wireframe: args.wireframe,
    };
    let app = ShowcaseApp::new(
        showcase,
        viewport_for(cols, rows),
        AsyncModelLoader::new(Arc::new(GltfLoader)),
        options,
    );
    app.run(args.fps)?;
    Ok(())
}

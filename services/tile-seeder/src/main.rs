//! Tile seeder.
//!
//! Renders every tile of a bounding box over a zoom range into
//! `{tiles_root}/{name}/{z}/{x}/{y}.png`, skipping tiles that already exist.

mod style_source;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use pyramid::{render_tiles, PyramidConfig, TracingSink};
use renderer::{RendererFactory, StyleRendererFactory};
use tile_common::{BoundingBox, ZoomRange};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "tile-seeder")]
#[command(about = "Pre-render a raster tile pyramid for a bounding box")]
struct Args {
    /// Pyramid name; used as the output subdirectory and log label
    #[arg(long, env = "TILES_NAME")]
    name: String,

    /// Bounding box as west,south,east,north in degrees
    #[arg(long, env = "TILES_BBOX", allow_hyphen_values = true)]
    bbox: BoundingBox,

    /// Style document: http(s) URL or local path, JSON or YAML
    #[arg(long, env = "TILES_STYLE")]
    style: String,

    #[arg(long, env = "TILES_MIN_ZOOM", default_value = "0")]
    min_zoom: u32,

    #[arg(long, env = "TILES_MAX_ZOOM", default_value = "18")]
    max_zoom: u32,

    /// Directory holding one pyramid per name
    #[arg(long, env = "TILES_ROOT", default_value = "/tiles")]
    tiles_root: PathBuf,

    /// Number of render worker threads
    #[arg(short, long, env = "TILES_WORKERS", default_value = "4")]
    workers: usize,

    /// Jobs buffered between enumeration and the workers
    #[arg(long, default_value = "32")]
    queue_capacity: usize,

    /// Byte size identifying a blank tile; measured from the style when unset
    #[arg(long, env = "TILES_EMPTY_TILE_BYTES")]
    empty_tile_bytes: Option<u64>,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn pyramid_config(&self) -> Result<PyramidConfig> {
        let zoom = ZoomRange::new(self.min_zoom, self.max_zoom)?;
        let mut config = PyramidConfig::new(self.bbox, self.tiles_root.join(&self.name))
            .with_zoom(zoom)
            .with_label(self.name.as_str())
            .with_workers(self.workers)
            .with_queue_capacity(self.queue_capacity);
        if let Some(bytes) = self.empty_tile_bytes {
            config = config.with_empty_tile_bytes(bytes);
        }
        config.validate()?;
        Ok(config)
    }
}

/// Use the renderer's own blank tile size unless one was given explicitly.
fn with_blank_tile_size<F: RendererFactory>(
    config: PyramidConfig,
    explicit: Option<u64>,
    factory: &F,
) -> Result<PyramidConfig> {
    if explicit.is_some() {
        return Ok(config);
    }
    match factory
        .blank_tile_bytes(config.tile_size)
        .context("Failed to measure a blank tile")?
    {
        Some(bytes) => {
            info!(empty_tile_bytes = bytes, "Using blank tile size reported by the renderer");
            Ok(config.with_empty_tile_bytes(bytes))
        }
        None => Ok(config),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let run_id = Uuid::new_v4();
    info!(run_id = %run_id, name = %args.name, "Starting tile seeder");

    // Validate everything before touching the network or the disk
    let config = args.pyramid_config()?;
    let style = style_source::load_style(&args.style).await?;
    let factory = StyleRendererFactory::new(style);
    let config = with_blank_tile_size(config, args.empty_tile_bytes, &factory)?;

    tokio::fs::create_dir_all(&args.tiles_root)
        .await
        .with_context(|| format!("Failed to create {}", args.tiles_root.display()))?;

    let summary = tokio::task::spawn_blocking(move || {
        let mut sink = TracingSink;
        render_tiles(&config, &factory, &mut sink)
    })
    .await
    .context("Render task panicked")??;

    info!(
        run_id = %run_id,
        summary = %serde_json::to_string(&summary)?,
        "Tile seeding finished"
    );

    if summary.has_failures() {
        error!(run_id = %run_id, failed = summary.failed, "Some tiles failed to render");
        bail!("{} of {} tiles failed to render", summary.failed, summary.total);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyramid::CompletionRecord;
    use renderer::StyleDefinition;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec![
            "tile-seeder",
            "--name",
            "alps",
            "--bbox",
            "5.9,45.8,10.5,47.8",
            "--style",
            "style.json",
        ];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]);
        assert_eq!(args.min_zoom, 0);
        assert_eq!(args.max_zoom, 18);
        assert_eq!(args.workers, 4);
        assert_eq!(args.queue_capacity, 32);
        assert_eq!(args.empty_tile_bytes, None);

        let config = args.pyramid_config().unwrap();
        assert_eq!(config.output_dir, PathBuf::from("/tiles/alps"));
        assert_eq!(config.label, "alps");
        assert_eq!(config.bbox, BoundingBox::new(5.9, 45.8, 10.5, 47.8));
    }

    #[test]
    fn test_negative_bbox() {
        let args = parse(&["--bbox", "-10,-10,10,10"]);
        assert_eq!(args.bbox, BoundingBox::new(-10.0, -10.0, 10.0, 10.0));
    }

    #[test]
    fn test_malformed_bbox_is_rejected() {
        let result = Args::try_parse_from([
            "tile-seeder",
            "--name",
            "x",
            "--bbox",
            "1,2,3",
            "--style",
            "s.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_inverted_zoom_is_rejected() {
        let args = parse(&["--min-zoom", "5", "--max-zoom", "2"]);
        assert!(args.pyramid_config().is_err());
    }

    #[test]
    fn test_zero_workers_is_rejected() {
        let args = parse(&["--workers", "0"]);
        assert!(args.pyramid_config().is_err());
    }

    #[test]
    fn test_blank_tile_size_comes_from_renderer() {
        let factory = StyleRendererFactory::new(StyleDefinition::blank("blank"));
        let args = parse(&[]);
        let config =
            with_blank_tile_size(args.pyramid_config().unwrap(), args.empty_tile_bytes, &factory)
                .unwrap();

        assert_eq!(
            Some(config.empty_tile.blank_size_bytes),
            factory.blank_tile_bytes(256).unwrap()
        );
    }

    #[test]
    fn test_explicit_empty_tile_bytes_wins() {
        let factory = StyleRendererFactory::new(StyleDefinition::blank("blank"));
        let args = parse(&["--empty-tile-bytes", "4242"]);
        let config =
            with_blank_tile_size(args.pyramid_config().unwrap(), args.empty_tile_bytes, &factory)
                .unwrap();

        assert_eq!(config.empty_tile.blank_size_bytes, 4242);
    }

    #[test]
    fn test_default_config_marks_blank_style_tiles_empty() {
        let root = tempfile::tempdir().unwrap();
        let args = parse(&["--tiles-root", root.path().to_str().unwrap(), "--max-zoom", "3"]);
        let factory = StyleRendererFactory::new(StyleDefinition::blank("blank"));
        let config =
            with_blank_tile_size(args.pyramid_config().unwrap(), args.empty_tile_bytes, &factory)
                .unwrap();

        let mut records: Vec<CompletionRecord> = Vec::new();
        let summary = render_tiles(&config, &factory, &mut records).unwrap();

        assert!(summary.total > 0);
        assert_eq!(summary.empty, summary.total);
        assert!(records.iter().all(|r| r.empty));
    }
}

use clap::{Parser, Subcommand};
use image_resizer::cache::CacheManager;
use image_resizer::config::{self, ResizerConfig};
use image_resizer::imaging::{FitMode, RustCodec};
use image_resizer::resize::{ResizeRequest, Resizer};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Flags for a single resize call. Unset values fall back to the config file.
#[derive(clap::Args)]
struct ResizeArgs {
    /// Source image: a file:// URI or a plain path
    uri: String,

    /// Target width in pixels (0 keeps the source size)
    #[arg(long, default_value_t = 0)]
    width: u32,

    /// Target height in pixels (0 keeps the source size)
    #[arg(long, default_value_t = 0)]
    height: u32,

    /// Output format (png, jpeg, webp, avif, bmp, tiff, gif)
    #[arg(long)]
    format: Option<String>,

    /// Encoder quality, 0-100
    #[arg(long)]
    quality: Option<u32>,

    /// Fit mode: stretch, contain or cover
    #[arg(long)]
    mode: Option<String>,

    /// Never enlarge beyond the source size
    #[arg(long)]
    only_scale_down: bool,

    /// Clockwise rotation in degrees, applied before scaling
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    rotation: i32,

    /// Copy the result into this directory and report that copy
    #[arg(long)]
    output_path: Option<PathBuf>,

    /// Carry EXIF metadata from the source onto the output
    #[arg(long)]
    keep_meta: bool,

    /// Override the cache directory from the config file
    #[arg(long)]
    cache_dir: Option<PathBuf>,
}

#[derive(Parser)]
#[command(name = "image-resizer")]
#[command(about = "Resize a single image into a private cache directory")]
#[command(long_about = "\
Resize a single image into a private cache directory

The source is copied into the cache (unless it already lives there), decoded,
rotated, scaled and encoded. The result record is printed as JSON:

  { path, uri, size, name, width, height, base64 }

Stages that fail after decoding do not abort the call. They are listed under
\"failures\" and the record may then describe an empty or stale file.

Run 'image-resizer gen-config' to generate a documented image-resizer.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./image-resizer.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize one image and print the result record
    Resize(ResizeArgs),
    /// Print a stock image-resizer.toml with all options documented
    GenConfig,
}

fn init_logging(config: &ResizerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    // stdout carries the JSON record
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .init();
}

fn build_request(args: ResizeArgs, config: &ResizerConfig) -> ResizeRequest {
    let mut request = ResizeRequest::new(args.uri)
        .size(args.width, args.height)
        .format(args.format.unwrap_or_else(|| config.defaults.format.clone()))
        .quality(args.quality.unwrap_or(config.defaults.quality))
        .fit_mode(args.mode.map(FitMode::from).unwrap_or(config.fit_mode()))
        .only_scale_down(args.only_scale_down)
        .rotation(args.rotation)
        .preserve_metadata(args.keep_meta);
    if let Some(dir) = args.output_path {
        request = request.output_dir(dir);
    }
    request
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resize(args) => {
            let config = config::load_config(cli.config.as_deref())?;
            init_logging(&config);

            let cache_dir = args.cache_dir.clone().unwrap_or_else(|| config.cache_dir());
            let resizer = Resizer::new(RustCodec::new(), CacheManager::new(cache_dir));
            let request = build_request(args, &config);

            let outcome = resizer.resize(&request)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.is_degraded() {
                let stages: Vec<String> = outcome
                    .failed_stages()
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                eprintln!(
                    "warning: resize completed with failed stages: {}",
                    stages.join(", ")
                );
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

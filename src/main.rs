use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::task::LocalSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use svg2raster::{detect_format, image_header, ConvertOptions, Converter, Format, HostConfig, ResvgHost};

#[derive(Parser)]
#[command(name = "svg2raster")]
#[command(about = "Convert SVG markup to PNG, JPEG or WebP")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an SVG file to a raster image
    Convert {
        /// Input SVG file, or "-" for stdin
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Requested MIME type: "image/png", "image/jpeg" or "image/webp"
        #[arg(short, long, default_value = "image/png")]
        format: String,

        /// Encoder quality (0.0 - 1.0)
        #[arg(short, long, default_value_t = 1.0)]
        quality: f32,

        /// Horizontal placement of the image on the surface
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f32,

        /// Vertical placement of the image on the surface
        #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
        y: f32,

        /// Output width (set together with --height; 0 keeps the natural size)
        #[arg(long, default_value_t = 0.0)]
        width: f32,

        /// Output height (set together with --width; 0 keeps the natural size)
        #[arg(long, default_value_t = 0.0)]
        height: f32,

        /// Host configuration file (YAML)
        #[arg(short, long, env = "SVG2RASTER_CONFIG")]
        config: Option<PathBuf>,
    },
    /// Show the detected format and header of a raster file
    Inspect {
        file: PathBuf,

        /// Number of header bytes to show
        #[arg(long, default_value_t = 12)]
        header_bytes: usize,
    },
}

#[derive(Serialize)]
struct Inspection {
    format: Format,
    size: usize,
    header: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "svg2raster=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            format,
            quality,
            x,
            y,
            width,
            height,
            config,
        } => {
            let options = ConvertOptions::default()
                .with_format(format)
                .with_quality(quality)
                .at(x, y)
                .sized(width, height);
            run_convert_command(&input, &output, options, config.as_deref()).await
        }
        Commands::Inspect { file, header_bytes } => run_inspect_command(&file, header_bytes).await,
    }
}

/// Convert one file on a single-threaded local task set
async fn run_convert_command(
    input: &Path,
    output: &Path,
    options: ConvertOptions,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let markup = read_input(input).await?;
    let host = ResvgHost::new(HostConfig::load(config));
    let requested = options.format.clone();

    let local = LocalSet::new();
    let image = local
        .run_until(async {
            let converter = Converter::new(host);
            converter.convert_async(markup, options).await
        })
        .await
        .with_context(|| format!("Failed to convert {}", input.display()))?;

    if image.format.mime_type() != Some(requested.as_str()) {
        tracing::warn!(
            requested = %requested,
            produced = %image.format,
            "Host produced a different format than requested"
        );
    }

    tokio::fs::write(output, &image.bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!(
        "Wrote {} ({} bytes, format {}, header {})",
        output.display(),
        image.len(),
        image.format,
        image.header(12)
    );
    Ok(())
}

async fn run_inspect_command(file: &Path, header_bytes: usize) -> anyhow::Result<()> {
    let bytes = tokio::fs::read(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let inspection = Inspection {
        format: detect_format(&bytes),
        size: bytes.len(),
        header: image_header(&bytes, 0, header_bytes),
    };
    println!("{}", serde_json::to_string_pretty(&inspection)?);
    Ok(())
}

async fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    if input == Path::new("-") {
        let mut markup = Vec::new();
        tokio::io::stdin()
            .read_to_end(&mut markup)
            .await
            .context("Failed to read stdin")?;
        return Ok(markup);
    }

    tokio::fs::read(input)
        .await
        .with_context(|| format!("Failed to read {}", input.display()))
}

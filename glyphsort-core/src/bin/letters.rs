use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use glyphsort_core::consts::*;
use glyphsort_core::{BatchConverter, ConverterConfigBuilder, MalformedPolicy};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser)]
#[command(name = "letters")]
#[command(about = "Crop box file glyphs out of page images into per-character folders")]
struct Args {
    #[arg(short = 'i', long, help = "Folder of page image / box file pairs")]
    source: PathBuf,

    #[arg(short = 'o', long, help = "Destination folder for the glyph folders")]
    destination: PathBuf,

    #[arg(long, default_value = IMAGE_EXTENSION, help = "Page image extension")]
    image_ext: String,

    #[arg(long, default_value = BOX_EXTENSION, help = "Box file extension")]
    box_ext: String,

    #[arg(long, default_value_t = GLYPH_DPI, help = "Density written into each glyph")]
    dpi: u16,

    #[arg(
        long,
        default_value_t = JPEG_QUALITY,
        value_parser = clap::value_parser!(u8).range(1..=100),
        help = "JPEG quality (1-100)"
    )]
    quality: u8,

    #[arg(
        long,
        value_enum,
        default_value_t = MalformedPolicy::Abort,
        help = "Stop or continue on rows that cannot be parsed"
    )]
    on_malformed: MalformedPolicy,

    #[arg(long, help = "Write a JSON summary of the run to this file")]
    report: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text, help = "Log output format")]
    log_format: LogFormat,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);

    match format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.log_format);

    let config = ConverterConfigBuilder::default()
        .source(args.source)
        .destination(args.destination)
        .image_extension(args.image_ext)
        .box_extension(args.box_ext)
        .dpi(args.dpi)
        .quality(args.quality)
        .on_malformed(args.on_malformed)
        .build()?;

    let summary = BatchConverter::new(config)
        .run()
        .context("glyph extraction stopped")?;

    if let Some(report) = &args.report {
        summary
            .write_report(report)
            .with_context(|| format!("writing report {}", report.display()))?;
        info!("report written to {}", report.display());
    }

    println!("{}", summary.summary_line());
    Ok(())
}

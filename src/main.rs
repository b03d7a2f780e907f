//! retex CLI - Command-line tool for CTXR game texture conversion.
//!
//! This is the main entry point for the retex command-line application.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use retex::prelude::*;

/// retex - CTXR game texture conversion tool
#[derive(Parser)]
#[command(name = "retex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Target {
    Dds,
    Tga,
    Png,
    Bmp,
    Ctxr,
}

impl From<Target> for TargetFormat {
    fn from(target: Target) -> Self {
        match target {
            Target::Dds => TargetFormat::Dds,
            Target::Tga => TargetFormat::Tga,
            Target::Png => TargetFormat::Png,
            Target::Bmp => TargetFormat::Bmp,
            Target::Ctxr => TargetFormat::Ctxr,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print header and mip-chain information for a CTXR file
    Info {
        /// Input CTXR file
        #[arg(short, long)]
        input: PathBuf,

        /// Treat the payload as DXT5-compressed
        #[arg(long)]
        dxt5: bool,
    },

    /// Convert a single file
    Convert {
        /// Input file (CTXR, or DDS/TGA/PNG/BMP when targeting CTXR)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Target format
        #[arg(short, long)]
        to: Target,

        /// Companion template (CTXR header donor when targeting CTXR, DDS
        /// header donor when targeting DDS)
        #[arg(long)]
        template: Option<PathBuf>,

        /// Asset manifest with per-asset format/swizzle tags
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Treat the payload as DXT5-compressed (overrides the manifest)
        #[arg(long)]
        dxt5: bool,

        /// Append the fixed 32-byte trailer to TGA output
        #[arg(long)]
        tga_footer: bool,
    },

    /// Convert every matching file in a directory
    Batch {
        /// Input directory
        #[arg(short, long, env = "INPUT_FOLDER")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, env = "OUTPUT_FOLDER")]
        output: PathBuf,

        /// Target format
        #[arg(short, long)]
        to: Target,

        /// Directory of companion CTXR templates (required when targeting
        /// CTXR)
        #[arg(long)]
        template_dir: Option<PathBuf>,

        /// Asset manifest with per-asset format/swizzle tags
        #[arg(short, long)]
        manifest: Option<PathBuf>,

        /// Append the fixed 32-byte trailer to TGA output
        #[arg(long)]
        tga_footer: bool,
    },

    /// Convert PS3-build CTXR assets to DDS
    Ps3Convert {
        /// Input CTXR file or directory
        #[arg(short, long)]
        input: PathBuf,

        /// Output DDS file or directory
        #[arg(short, long)]
        output: PathBuf,

        /// Known-good DDS header to patch instead of building one
        #[arg(long)]
        dds_template: Option<PathBuf>,

        /// Asset manifest with per-asset swizzle tags
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Info { input, dxt5 } => {
            cmd_info(&input, dxt5)?;
        }
        Commands::Convert {
            input,
            output,
            to,
            template,
            manifest,
            dxt5,
            tga_footer,
        } => {
            cmd_convert(&input, &output, to, template, manifest, dxt5, tga_footer)?;
        }
        Commands::Batch {
            input,
            output,
            to,
            template_dir,
            manifest,
            tga_footer,
        } => {
            cmd_batch(&input, &output, to, template_dir, manifest, tga_footer)?;
        }
        Commands::Ps3Convert {
            input,
            output,
            dds_template,
            manifest,
        } => {
            cmd_ps3_convert(&input, &output, dds_template, manifest)?;
        }
    }

    Ok(())
}

fn load_manifest(path: Option<&PathBuf>) -> Result<AssetManifest> {
    match path {
        Some(path) => AssetManifest::load(path)
            .with_context(|| format!("Failed to load manifest {}", path.display())),
        None => Ok(AssetManifest::default()),
    }
}

fn cmd_info(input: &PathBuf, dxt5: bool) -> Result<()> {
    let layout = if dxt5 {
        PixelLayout::Dxt5
    } else {
        PixelLayout::Rgba8
    };

    let data = fs::read(input).context("Failed to read input file")?;
    let ctxr = CtxrFile::parse(&data, layout).context("Failed to parse CTXR")?;

    println!("{}", input.display());
    println!(
        "  {}x{}, {} mip level(s), {:?} payload",
        ctxr.width(),
        ctxr.height(),
        ctxr.header().mipmap_count(),
        ctxr.layout()
    );
    println!("  main payload: {} bytes", ctxr.pixel_data().len());

    for (i, level) in ctxr.mip_levels().iter().enumerate() {
        println!(
            "  level {}: {} bytes, {} padding byte(s), size field {}",
            i + 1,
            level.data.len(),
            level.padding.len(),
            level
                .declared_size
                .map_or("absent".to_string(), |s| s.to_string())
        );
    }

    Ok(())
}

fn cmd_convert(
    input: &PathBuf,
    output: &PathBuf,
    to: Target,
    template: Option<PathBuf>,
    manifest: Option<PathBuf>,
    dxt5: bool,
    tga_footer: bool,
) -> Result<()> {
    println!("Converting: {} -> {}", input.display(), output.display());

    let manifest = load_manifest(manifest.as_ref())?;
    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let layout = if dxt5 {
        PixelLayout::Dxt5
    } else {
        manifest.layout_for(&file_name)
    };

    let options = ConvertOptions {
        layout: Some(layout),
        template,
        tga_footer,
    };
    convert_file(input, output, to.into(), &options).context("Conversion failed")?;

    println!("Conversion complete");
    Ok(())
}

fn cmd_batch(
    input: &PathBuf,
    output: &PathBuf,
    to: Target,
    template_dir: Option<PathBuf>,
    manifest: Option<PathBuf>,
    tga_footer: bool,
) -> Result<()> {
    println!("Batch converting: {} -> {}", input.display(), output.display());

    let mut job = BatchJob::new(to.into());
    job.manifest = load_manifest(manifest.as_ref())?;
    job.template_dir = template_dir;
    job.tga_footer = tga_footer;

    run_batch(input, output, &job)
}

fn cmd_ps3_convert(
    input: &PathBuf,
    output: &PathBuf,
    dds_template: Option<PathBuf>,
    manifest: Option<PathBuf>,
) -> Result<()> {
    let manifest = load_manifest(manifest.as_ref())?;
    let dds_template = dds_template
        .map(|path| {
            fs::read(&path)
                .with_context(|| format!("Failed to read DDS template {}", path.display()))
        })
        .transpose()?;

    if input.is_dir() {
        let mut job = BatchJob::new(TargetFormat::Dds);
        job.manifest = manifest;
        job.dds_template = dds_template;
        job.ps3 = true;
        return run_batch(input, output, &job);
    }

    println!("Converting: {} -> {}", input.display(), output.display());

    let file_name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let data = fs::read(input).context("Failed to read input file")?;
    let dds = ps3_ctxr_to_dds(&data, manifest.is_swizzled(&file_name), dds_template.as_deref())
        .context("Conversion failed")?;
    retex::convert::commit(output, &dds).context("Failed to write output file")?;

    println!("Conversion complete");
    Ok(())
}

fn run_batch(input: &PathBuf, output: &PathBuf, job: &BatchJob) -> Result<()> {
    let count = walkdir::WalkDir::new(input)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            let ext = e
                .path()
                .extension()
                .and_then(|x| x.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            job.target.source_extensions().contains(&ext.as_str())
        })
        .count();

    let pb = ProgressBar::new(count as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let start = Instant::now();
    let report = convert_directory(input, output, job, |_| pb.inc(1))
        .context("Batch conversion failed")?;
    pb.finish_with_message("Done");

    println!(
        "Converted {}/{} file(s) in {:?}",
        report.succeeded,
        report.total(),
        start.elapsed()
    );
    if !report.failures.is_empty() {
        println!("Failures:");
        for (name, error) in &report.failures {
            eprintln!("  {}: {}", name, error);
        }
    }

    Ok(())
}

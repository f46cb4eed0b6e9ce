use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "backdrop", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Export an editor job as a PNG.
    Export(ExportArgs),
    /// Print the resolved canvas dimensions as JSON.
    Dims(DimsArgs),
}

#[derive(Parser, Debug)]
struct ExportArgs {
    /// Input job JSON.
    #[arg(long)]
    job: PathBuf,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    /// Root for relative image paths; defaults to the job's directory.
    #[arg(long)]
    assets: Option<PathBuf>,

    /// Directory of .ttf/.otf files for text overlays.
    #[arg(long)]
    fonts: Option<PathBuf>,

    /// Override the export scale.
    #[arg(long)]
    scale: Option<f64>,

    /// Skip the settle waits between capture steps.
    #[arg(long, default_value_t = false)]
    no_settle: bool,
}

#[derive(Parser, Debug)]
struct DimsArgs {
    #[arg(long)]
    image_width: f64,
    #[arg(long)]
    image_height: f64,
    #[arg(long)]
    container_width: f64,
    #[arg(long)]
    container_height: f64,
    #[arg(long)]
    viewport_width: Option<f64>,
    #[arg(long)]
    viewport_height: Option<f64>,
    #[arg(long, default_value_t = 0.0)]
    padding: f64,
    #[arg(long, default_value_t = 1.0)]
    screenshot_scale: f64,
    /// Canvas aspect ratio (width / height).
    #[arg(long)]
    aspect: Option<f64>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Export(args) => cmd_export(args),
        Command::Dims(args) => cmd_dims(args),
    }
}

fn cmd_export(args: ExportArgs) -> anyhow::Result<()> {
    let mut job = backdrop::ExportJob::from_path(&args.job)?;
    if args.no_settle {
        job.settings = job.settings.clone().without_delays();
    }
    let assets_root = args.assets.clone().unwrap_or_else(|| {
        args.job
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .to_path_buf()
    });
    let fonts = match &args.fonts {
        Some(dir) => backdrop::FontBook::from_dir(dir)?,
        None => backdrop::FontBook::new(),
    };

    let loader = backdrop::FsImageLoader::new(assets_root);
    let mut canvas = backdrop::LiveCanvas::build(&job, &loader, fonts)?;
    let mut options = canvas.export_options(&job);
    if let Some(scale) = args.scale {
        options.scale = scale;
    }
    let inputs = canvas.export_inputs(&job, options);

    let settle = backdrop::ThreadSettle;
    let mut exporter = backdrop::Exporter::new(job.settings.clone(), &settle, &loader);
    let artifact = exporter.export(&mut canvas.document, Some(&mut canvas.stage), &inputs)?;

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &artifact.blob.bytes)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    println!(
        "{}x{} xxh3={:016x}",
        artifact.width,
        artifact.height,
        xxhash_rust::xxh3::xxh3_64(&artifact.blob.bytes)
    );
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_dims(args: DimsArgs) -> anyhow::Result<()> {
    let dims = backdrop::resolve_dimensions(&backdrop::DimensionInputs {
        image_width: args.image_width,
        image_height: args.image_height,
        container_width: args.container_width,
        container_height: args.container_height,
        viewport_width: args.viewport_width.unwrap_or(f64::INFINITY),
        viewport_height: args.viewport_height.unwrap_or(f64::INFINITY),
        canvas_padding: args.padding,
        screenshot_scale: args.screenshot_scale,
        aspect_ratio: args.aspect,
    });
    let json = serde_json::to_string_pretty(&dims).context("serialize dimensions")?;
    println!("{json}");
    Ok(())
}

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use photobooth::{
    BoothManifest, BoothSession, FrameSource, FsAssetSource, GalleryStore, InMemoryGallery,
    MockFrameSource, Scene, SchoolCategory, StillFrameSource,
};

#[derive(Parser, Debug)]
#[command(name = "photobooth", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Composite a scripted scene and write the encoded still.
    Capture(CaptureArgs),
    /// List catalog entries.
    Catalog(CatalogArgs),
}

#[derive(Parser, Debug)]
struct CaptureArgs {
    /// Booth manifest JSON. Asset paths resolve against its directory.
    #[arg(long)]
    manifest: PathBuf,

    /// Scene JSON (uniform, stickers, recorded gestures).
    #[arg(long)]
    scene: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,

    /// Camera frame image. Without it the mock camera view is used.
    #[arg(long)]
    frame: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct CatalogArgs {
    /// Booth manifest JSON.
    #[arg(long)]
    manifest: PathBuf,

    /// Only list uniforms of this school level (middle|high).
    #[arg(long)]
    category: Option<SchoolCategory>,
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Capture(args) => cmd_capture(args),
        Command::Catalog(args) => cmd_catalog(args),
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("PHOTOBOOTH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_capture(args: CaptureArgs) -> anyhow::Result<()> {
    let manifest = BoothManifest::from_path(&args.manifest)?;
    let scene = Scene::from_path(&args.scene)?;
    let assets_root = args.manifest.parent().unwrap_or_else(|| Path::new("."));
    let assets = FsAssetSource::new(assets_root);

    let frames: Box<dyn FrameSource> = match &args.frame {
        Some(path) => Box::new(StillFrameSource::from_path(path)?),
        None => Box::new(MockFrameSource::default()),
    };

    let mut session = BoothSession::new(manifest);
    let ticks = scene.apply_to(&mut session)?;
    tracing::info!(ticks, "scene applied");

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("start async runtime")?;
    let mut gallery = InMemoryGallery::new();
    let out = runtime.block_on(session.capture(frames.as_ref(), &assets, &mut gallery))?;

    for skipped in &out.report.skipped {
        eprintln!(
            "skipped {} ({}): {:?}",
            skipped.overlay, skipped.image, skipped.reason
        );
    }

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(&args.out, &out.frame.bytes)
        .with_context(|| format!("write image '{}'", args.out.display()))?;

    eprintln!(
        "wrote {} ({}x{}, {} in gallery as {})",
        args.out.display(),
        out.frame.width,
        out.frame.height,
        gallery.len(),
        photobooth::download_file_name(&out.frame)
    );
    Ok(())
}

fn cmd_catalog(args: CatalogArgs) -> anyhow::Result<()> {
    let manifest = BoothManifest::from_path(&args.manifest)?;
    let uniforms: Vec<_> = match args.category {
        Some(category) => manifest.uniforms_in(category).collect(),
        None => manifest.uniforms.iter().collect(),
    };
    for u in uniforms {
        println!(
            "uniform\t{}\t{}\t{:?}\t{:?}\t{}",
            u.id, u.name, u.category, u.kind, u.image
        );
    }
    for s in &manifest.stickers {
        println!("sticker\t{}\t{}\t{}", s.id, s.name, s.image);
    }
    Ok(())
}

use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use diorama::{Screen, Stage, Surface};

#[derive(Parser, Debug)]
#[command(name = "diorama", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the frame at a given elapsed time as a PNG.
    Frame(FrameArgs),
    /// Run the frame loop headless for a bounded number of frames.
    Run(RunArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Elapsed seconds to simulate before capturing.
    #[arg(long, default_value_t = 0.0)]
    time: f64,

    /// Simulation rate in frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720")]
    size: String,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input scene JSON.
    #[arg(long)]
    scene: PathBuf,

    /// Number of frames to run before exiting.
    #[arg(long)]
    frames: u64,

    /// Simulation rate in frames per second.
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Screen size as WIDTHxHEIGHT.
    #[arg(long, default_value = "1280x720")]
    size: String,

    /// Dump every frame as a PNG into this directory.
    #[arg(long)]
    dump_dir: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Run(args) => cmd_run(args),
    }
}

fn parse_size(size: &str) -> anyhow::Result<Screen> {
    let (w, h) = size
        .split_once('x')
        .with_context(|| format!("size '{size}' is not WIDTHxHEIGHT"))?;
    let width = w.parse().with_context(|| format!("bad width '{w}'"))?;
    let height = h.parse().with_context(|| format!("bad height '{h}'"))?;
    Ok(Screen::new(width, height)?)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0, "fps must be > 0");
    let screen = parse_size(&args.size)?;
    let mut stage = Stage::load(&args.scene, screen)?;
    let mut frame = Surface::new(screen);

    let dt = 1.0 / f64::from(args.fps);
    let ticks = ((args.time * f64::from(args.fps)).round() as u64).max(1);
    for _ in 0..ticks {
        stage.tick(dt, &mut frame)?;
    }

    write_png(&frame, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.fps > 0, "fps must be > 0");
    let screen = parse_size(&args.size)?;
    let mut stage = Stage::load(&args.scene, screen)?;
    let mut frame = Surface::new(screen);

    if let Some(dir) = &args.dump_dir {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("create dump dir '{}'", dir.display()))?;
    }

    let dt = 1.0 / f64::from(args.fps);
    let mut total_events = 0usize;
    for n in 0..args.frames {
        let events = stage.tick(dt, &mut frame)?;
        total_events += events.len();

        if let Some(dir) = &args.dump_dir {
            write_png(&frame, &dir.join(format!("frame_{n:05}.png")))?;
        }
    }

    eprintln!(
        "ran {} frames ({:.2}s simulated), {} events",
        args.frames,
        stage.elapsed(),
        total_events
    );
    Ok(())
}

fn write_png(frame: &Surface, out: &std::path::Path) -> anyhow::Result<()> {
    if let Some(parent) = out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        out,
        frame.data(),
        frame.width(),
        frame.height(),
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", out.display()))?;
    Ok(())
}

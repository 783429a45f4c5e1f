use std::io::BufWriter;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt as _, util::SubscriberInitExt as _};

use plasma::{
    Canvas, CheckerRenderer, DisplayChange, DisplayState, NullSink, PipelineConfig, PngDirSink,
    PresentSink, RunLimit, ScriptedDisplay, Session, WorkerCommand, WorkerPool,
};

#[derive(Parser, Debug)]
#[command(name = "plasma", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the pipeline headless and print its counters as JSON.
    Run(RunArgs),
    /// Serve render tasks on stdin/stdout (spawned by `run`).
    #[command(hide = true)]
    Worker,
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Pipeline config JSON; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Initial canvas width.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Initial canvas height.
    #[arg(long, default_value_t = 240)]
    height: u32,

    /// Target frames per second.
    #[arg(long)]
    fps: Option<u32>,

    /// Cap on frames in flight plus frames buffered.
    #[arg(long)]
    max_pending: Option<usize>,

    /// Icon size as WxH.
    #[arg(long)]
    icon: Option<Canvas>,

    /// Worker processes (default: available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Stop after this many presented frames.
    #[arg(long, default_value_t = 60)]
    frames: u64,

    /// Also stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,

    /// Write every presented frame as a PNG into this directory.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Iconify the display from tick N on. Ticks count from 1; 0 applies before the first tick.
    #[arg(long)]
    iconify_at: Option<u64>,

    /// Restore the display from tick N on. Ticks count from 1; 0 applies before the first tick.
    #[arg(long)]
    restore_at: Option<u64>,

    /// Resize the canvas from a tick on, as TICK:WxH (ticks count from 1; 0 applies before the
    /// first tick). Repeatable.
    #[arg(long)]
    resize_at: Vec<ResizeAt>,
}

#[derive(Clone, Copy, Debug)]
struct ResizeAt {
    tick: u64,
    size: Canvas,
}

impl FromStr for ResizeAt {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tick, size) = s
            .split_once(':')
            .ok_or_else(|| format!("expected TICK:WxH, got '{s}'"))?;
        Ok(Self {
            tick: tick
                .trim()
                .parse()
                .map_err(|e| format!("invalid tick '{tick}': {e}"))?,
            size: size.parse().map_err(|e| format!("{e}"))?,
        })
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Worker => cmd_worker(),
    }
}

// stdout carries worker results and the final stats, so logs always go to stderr.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "plasma=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(args: &RunArgs) -> anyhow::Result<PipelineConfig> {
    let mut cfg = match &args.config {
        Some(path) => PipelineConfig::from_json_path(path)
            .with_context(|| format!("load config '{}'", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(fps) = args.fps {
        cfg.target_fps = fps;
    }
    if let Some(n) = args.max_pending {
        cfg.max_pending = n;
    }
    if let Some(icon) = args.icon {
        cfg.icon = icon;
    }
    if args.workers.is_some() {
        cfg.workers = args.workers;
    }
    cfg.validate()?;
    Ok(cfg)
}

fn build_display(args: &RunArgs) -> ScriptedDisplay {
    let canvas = Canvas::new(args.width, args.height);
    let mut display = ScriptedDisplay::new(DisplayState::visible(canvas));
    for r in &args.resize_at {
        display = display.at(r.tick, DisplayChange::Resize(r.size));
    }
    if let Some(tick) = args.iconify_at {
        display = display.at(tick, DisplayChange::Iconify);
    }
    if let Some(tick) = args.restore_at {
        display = display.at(tick, DisplayChange::Restore);
    }
    display
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = load_config(&args)?;
    let display = build_display(&args);
    let sink: Box<dyn PresentSink> = match &args.out {
        Some(dir) => Box::new(PngDirSink::create(dir)?),
        None => Box::new(NullSink::default()),
    };

    let cmd = WorkerCommand::current_exe()?;
    let pool = WorkerPool::spawn(&cmd, cfg.worker_count()).context("start workers")?;
    let limit = RunLimit {
        max_presented: Some(args.frames),
        max_ticks: args.ticks,
    };

    let mut session = Session::new(cfg, pool, display, sink)?;
    let stats = session.run(limit).context("run pipeline")?;
    let (mut pool, _, _) = session.into_parts();
    pool.shutdown();

    println!("{}", serde_json::to_string_pretty(&stats)?);
    if let Some(dir) = &args.out {
        eprintln!("wrote {} frames to {}", stats.frames_presented, dir.display());
    }
    Ok(())
}

fn cmd_worker() -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut input = stdin.lock();
    let mut output = BufWriter::new(stdout.lock());

    match plasma::run_worker(&mut input, &mut output, &CheckerRenderer::default()) {
        Ok(exit) => {
            tracing::debug!(
                pid = std::process::id(),
                served = exit.tasks_served,
                skipped = exit.tasks_skipped,
                "worker done"
            );
            Ok(())
        }
        // The coordinator stops reading before it closes our input during shutdown.
        Err(e) if e.is_connection() => {
            tracing::debug!(pid = std::process::id(), error = %e, "coordinator went away");
            Ok(())
        }
        Err(e) => Err(e).context("worker loop"),
    }
}

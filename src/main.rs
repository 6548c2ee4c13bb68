//! Sudoku Lens CLI
//!
//! Drives a tracking session from the synthetic frame source and prints
//! the solved puzzle.

use clap::Parser;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use sudoku_lens::{
    capture::{FileConfig, FrameSource, SyntheticSource},
    metrics::{MetricsRegistry, MetricsSnapshot},
    session::{FrameOutcome, PuzzleTracker},
    solver::{Grid, SIDE},
};
use tracing::{debug, info, warn};

#[cfg(feature = "metrics")]
use sudoku_lens::metrics::{MetricsServer, MetricsServerConfig, MetricsState};

/// Command-line arguments. Flags override values from the config file.
#[derive(Parser, Debug)]
#[command(name = "sudoku-lens")]
#[command(about = "Reads a Sudoku from noisy frames and solves it")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Puzzle to render, 81 characters with '.' or '0' for blanks
    #[arg(long)]
    puzzle: Option<String>,

    /// Number of frames to process
    #[arg(short = 'n', long)]
    frames: Option<u32>,

    /// Run until Ctrl-C
    #[arg(long)]
    continuous: bool,

    /// Noise seed for the synthetic source
    #[arg(long)]
    seed: Option<u64>,

    /// Probability that a given digit is rendered wrong
    #[arg(long)]
    misread_rate: Option<f64>,

    /// Votes needed before a cell is settled
    #[arg(long)]
    cap: Option<u8>,

    /// Settled cells required before solving (strictly more)
    #[arg(long)]
    min_hits: Option<usize>,

    /// Metrics server port, 0 to disable
    #[arg(long)]
    metrics_port: Option<u16>,

    /// Print Prometheus metrics on exit
    #[arg(long)]
    print_metrics: bool,
}

impl Args {
    fn apply(&self, config: &mut FileConfig) {
        if let Some(puzzle) = &self.puzzle {
            config.source.puzzle = puzzle.clone();
        }
        if let Some(frames) = self.frames {
            config.output.frame_count = frames;
        }
        if self.continuous {
            config.output.continuous = true;
        }
        if let Some(seed) = self.seed {
            config.source.seed = seed;
        }
        if let Some(rate) = self.misread_rate {
            config.source.misread_rate = rate;
        }
        if let Some(cap) = self.cap {
            config.consensus.cap = cap;
        }
        if let Some(min_hits) = self.min_hits {
            config.consensus.min_hits = min_hits;
        }
        if let Some(port) = self.metrics_port {
            config.output.metrics_port = port;
        }
    }
}

/// Where per-frame metrics go.
enum Reporter {
    Local(MetricsRegistry),
    #[cfg(feature = "metrics")]
    Served(Arc<tokio::sync::RwLock<MetricsState>>),
}

impl Reporter {
    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn record(&self, tracker: &PuzzleTracker, outcome: &FrameOutcome) {
        let snapshot = MetricsSnapshot::from_tracker(tracker);
        match self {
            Reporter::Local(registry) => registry.update(&snapshot),
            #[cfg(feature = "metrics")]
            Reporter::Served(state) => {
                let mut state = state.blocking_write();
                state.update(&snapshot);
                state.publish(outcome);
            }
        }
    }

    fn encode(&self) -> Option<String> {
        let encoded = match self {
            Reporter::Local(registry) => registry.encode(),
            #[cfg(feature = "metrics")]
            Reporter::Served(state) => state.blocking_read().encode(),
        };
        encoded
            .map_err(|e| warn!(error = %e, "Failed to encode metrics"))
            .ok()
    }
}

#[cfg(feature = "metrics")]
fn spawn_metrics_server(port: u16, registry: MetricsRegistry) -> Reporter {
    let server = MetricsServer::new(MetricsServerConfig::with_port(port), registry);
    let state = server.state();

    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(rt) => rt,
            Err(e) => {
                warn!(error = %e, "Failed to start metrics runtime");
                return;
            }
        };
        if let Err(e) = runtime.block_on(server.run()) {
            warn!(error = %e, "Metrics server stopped");
        }
    });

    Reporter::Served(state)
}

#[cfg(feature = "metrics")]
fn reporter(port: u16, registry: MetricsRegistry) -> Reporter {
    if port == 0 {
        return Reporter::Local(registry);
    }
    spawn_metrics_server(port, registry)
}

#[cfg(not(feature = "metrics"))]
fn reporter(port: u16, registry: MetricsRegistry) -> Reporter {
    if port != 0 {
        debug!(port, "Built without the metrics feature, not serving metrics");
    }
    Reporter::Local(registry)
}

fn print_grid(grid: &Grid) {
    for row in grid.cells().chunks(SIDE) {
        let line: String = row
            .iter()
            .map(|&v| match v {
                0 => '.',
                d => char::from(b'0' + d),
            })
            .collect();
        println!("{}", line);
    }
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match FileConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Failed to load config: {}", e);
                std::process::exit(1);
            }
        },
        None => FileConfig::default(),
    };
    args.apply(&mut config);

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {}", e);
        std::process::exit(1);
    }

    info!("Sudoku Lens v{}", sudoku_lens::VERSION);
    info!(
        cap = config.consensus.cap,
        min_hits = config.consensus.min_hits,
        misread_rate = config.source.misread_rate,
        "Session configured"
    );

    let running = Arc::new(AtomicBool::new(true));
    if config.output.continuous {
        let flag = Arc::clone(&running);
        if let Err(e) = ctrlc::set_handler(move || flag.store(false, Ordering::SeqCst)) {
            warn!(error = %e, "Failed to install Ctrl-C handler");
        }
    }

    let registry = match MetricsRegistry::new() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Failed to create metrics registry: {}", e);
            std::process::exit(1);
        }
    };
    let reporter = reporter(config.output.metrics_port, registry);

    let mut source = SyntheticSource::new(config.source.clone());
    if let Err(e) = source.open() {
        eprintln!("Failed to open frame source: {}", e);
        std::process::exit(1);
    }

    let mut tracker = PuzzleTracker::from_config(&config);
    let mut last_solution: Option<Grid> = None;
    let mut last_preview = Grid::empty();
    let mut processed: u64 = 0;

    info!("Processing frames...");

    while running.load(Ordering::SeqCst) {
        if !config.output.continuous && processed >= u64::from(config.output.frame_count) {
            break;
        }

        let frame = match source.next_frame() {
            Ok(f) => f,
            Err(e) => {
                warn!("Frame read failed: {}", e);
                break;
            }
        };
        processed += 1;

        let outcome = tracker.process(frame);
        reporter.record(&tracker, &outcome);

        match &outcome {
            FrameOutcome::Success(solved) => {
                if last_solution != Some(solved.solution) {
                    info!(
                        frame = solved.sequence,
                        deduced = solved.deduced_cells().count(),
                        "Solution available"
                    );
                }
                last_solution = Some(solved.solution);
            }
            FrameOutcome::Failure(snapshot) => {
                debug!(
                    frame = snapshot.sequence,
                    state = %snapshot.state,
                    reason = %snapshot.reason,
                    "Frame not solved"
                );
                last_preview = snapshot.preview;
            }
        }

        if config.output.continuous {
            std::thread::sleep(Duration::from_millis(33));
        }
    }

    source.close();

    let stats = tracker.stats();
    info!(
        frames = stats.frames,
        without_boundary = stats.frames_without_boundary,
        resets = stats.resets,
        solve_attempts = stats.solve_attempts,
        solved = stats.frames_solved,
        elapsed_ms = (chrono::Utc::now() - stats.started_at).num_milliseconds(),
        "Session finished"
    );

    match last_solution {
        Some(solution) => print_grid(&solution),
        None => {
            warn!(
                confident = tracker.consensus().confident_cells(),
                needed = config.consensus.min_hits + 1,
                "No solution reached"
            );
            print_grid(&last_preview);
        }
    }

    if args.print_metrics {
        if let Some(text) = reporter.encode() {
            print!("{}", text);
        }
    }
}

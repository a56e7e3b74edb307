//! Pursuit control-core binary.
//!
//! Runs one trial of the selected task and prints the task metrics, cycle
//! timing and emission counters to stdout at run end. SIGINT unwinds the
//! loop cleanly with the same report.

use std::path::PathBuf;
use std::sync::atomic::Ordering;

use clap::Parser;
use serde::Serialize;
use tracing::{Level, info, warn};
use tracing_subscriber::EnvFilter;

use pursuit_common::config::ExperimentConfig;
use pursuit_common::task::TaskType;
use pursuit_control::cycle::CycleStatsSummary;
use pursuit_control::emitter::EmitterStats;
use pursuit_control::{ControlError, ControlLoop, TaskMetrics};

#[derive(Parser, Debug)]
#[command(
    name = "pursuit_control",
    about = "Soft-real-time control core for the pursuit tracking platform",
    version
)]
struct Args {
    /// Run duration [s]
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Task to run: sos | cit | fitts
    #[arg(long, default_value = "sos")]
    task: String,

    /// Optional TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    /// JSON log output and metrics report
    #[arg(long)]
    json: bool,
}

/// End-of-run report printed to stdout.
#[derive(Debug, Serialize)]
struct RunReport {
    task: TaskMetrics,
    cycle: CycleStatsSummary,
    emitter: EmitterStats,
}

fn main() -> Result<(), ControlError> {
    let args = Args::parse();
    setup_tracing(&args);

    let config = match &args.config {
        Some(path) => ExperimentConfig::load(path)?,
        None => ExperimentConfig::default(),
    };

    let kind = TaskType::parse(&args.task).unwrap_or_else(|| {
        warn!("unknown task '{}', falling back to sos", args.task);
        TaskType::Sos
    });

    let mut control = ControlLoop::new(config, kind)?;

    // SIGINT clears the running flag; the loop observes it at the next
    // tick head and unwinds with stats intact.
    let running = control.running_flag();
    ctrlc::set_handler(move || {
        info!("received shutdown signal");
        running.store(false, Ordering::SeqCst);
    })?;

    control.run(args.duration);

    let report = RunReport {
        task: control.task().metrics(),
        cycle: control.stats().summary(),
        emitter: control.emitter_stats(),
    };
    print_report(&report, args.json);

    control.close();
    Ok(())
}

fn print_report(report: &RunReport, json: bool) {
    if json {
        match serde_json::to_string_pretty(report) {
            Ok(doc) => println!("{doc}"),
            Err(e) => warn!("failed to serialize report: {e}"),
        }
        return;
    }

    println!("── run report ──");
    match &report.task {
        TaskMetrics::Sos(m) => {
            println!("task: sos");
            println!("  rmse_x: {:.6} m", m.rmse_x);
            println!("  rmse_y: {:.6} m", m.rmse_y);
            println!("  rmse_total: {:.6} m", m.rmse_total);
            println!("  samples: {}", m.samples);
        }
        TaskMetrics::Cit(m) => {
            println!("task: cit");
            println!("  lambda_critical: {:.3} rad/s", m.lambda_critical);
            println!("  divergence_time: {:.3} s", m.divergence_time);
            println!("  increments: {}", m.increments);
            println!("  final_distance: {:.6} m", m.final_distance);
            println!("  diverged: {}", m.diverged);
        }
        TaskMetrics::Fitts(m) => {
            println!("task: fitts");
            println!("  amplitude: {:.6} m", m.amplitude);
            println!("  index_of_difficulty: {:.3} bits", m.index_of_difficulty);
            println!("  mean_movement_time: {:.3} s", m.mean_movement_time);
            println!("  throughput: {:.3} bits/s", m.throughput);
            println!("  error_rate: {:.3}", m.error_rate);
            println!(
                "  movements: {}/{}",
                m.movements_completed, m.movements_total
            );
        }
    }
    println!(
        "cycle: ticks={} max={}us min={}us avg={}us overruns={}",
        report.cycle.tick_count,
        report.cycle.max_tick_us,
        report.cycle.min_tick_us,
        report.cycle.avg_tick_us,
        report.cycle.overruns
    );
    println!(
        "emitter: sent={} errors={} error_rate={:.4}",
        report.emitter.send_count, report.emitter.error_count, report.emitter.error_rate
    );
}

/// Set up the tracing subscriber from CLI flags and RUST_LOG.
fn setup_tracing(args: &Args) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

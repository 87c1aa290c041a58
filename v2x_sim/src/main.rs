//! V2X Simulator CLI
//!
//! Run deterministic emergency-braking scenarios, export frame data for
//! visualization, or drive the simulation in real time.

use clap::Parser;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;
use v2x_core::Intent;
use v2x_env::{EnvError, TokioContext};
use v2x_sim::scenarios::ScenarioId;
use v2x_sim::{
    event_label, run_realtime, EffectTracker, ScenarioResult, ScenarioRunner, SimExport,
    SimFrame, VehicleFrame,
};

/// Runs a scenario with frame-by-frame export for visualization.
fn run_with_export(
    seed: u64,
    scenario: ScenarioId,
    duration: f64,
    export_path: &str,
) -> std::io::Result<bool> {
    let tick_rate_hz = 60u32;
    let frame_dt = Duration::from_secs_f64(1.0 / tick_rate_hz as f64);
    let target_ticks = (duration * tick_rate_hz as f64) as u64;
    let trigger_tick = tick_rate_hz as u64; // one second in

    let mut sim = v2x_core::Simulation::new(seed);
    let mut effects = EffectTracker::new();
    let mut export = SimExport::new(scenario.name(), seed);

    if scenario == ScenarioId::OutOfRange {
        sim.apply(Intent::DragVehicle {
            vehicle: v2x_env::VehicleId(3),
            x: 700.0,
            y: 200.0,
        })
        .expect("drag within track bounds");
    }

    // Export every 6 ticks (10 FPS in the viewer).
    let export_interval = 6;

    for tick in 0..target_ticks {
        if tick == trigger_tick {
            sim.apply(Intent::TriggerEmergency).expect("trigger armed");
        }

        sim.tick(frame_dt);

        let events = sim.drain_events();
        effects.observe(&events);
        effects.decay();

        if tick % export_interval == 0 {
            let snapshot = sim.snapshot();
            export.add_frame(SimFrame {
                time_sec: snapshot.elapsed.as_secs_f64(),
                vehicles: snapshot.vehicles.iter().map(VehicleFrame::from).collect(),
                effects: effects.active().iter().map(Into::into).collect(),
                events: events.iter().map(event_label).collect(),
            });
        }
    }

    let passed = sim
        .vehicles()
        .iter()
        .all(|v| v.status == v2x_core::VehicleStatus::Stopped || !v.emergency_braking);
    export.finalize(passed);
    export.write_to_file(export_path)?;

    info!(
        "Exported {} frames to {}",
        export.frames.len(),
        export_path
    );
    Ok(passed)
}

/// Drives a short real-time session: trigger at 2s, report the outcome.
async fn run_realtime_demo(seed: u64, duration: f64, tick_rate_hz: u32) {
    let ctx = TokioContext::new();
    let (tx, rx) = mpsc::channel(64);

    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(2)).await;
        let sent = tx
            .send(Intent::TriggerEmergency)
            .await
            .map_err(|_| EnvError::channel("intent receiver dropped"));
        if let Err(e) = sent {
            warn!("{}", e);
        }
    });

    let snapshot = run_realtime(
        &ctx,
        rx,
        seed,
        Duration::from_secs_f64(duration),
        tick_rate_hz,
    )
    .await;

    info!("Real-time session finished at t={:.1}s", snapshot.elapsed.as_secs_f64());
    for v in &snapshot.vehicles {
        info!("  {}: {:.0} km/h, {}", v.id, v.speed_kmh, v.status);
    }
}

/// V2X Deterministic Simulation CLI
#[derive(Parser, Debug)]
#[command(name = "v2x-sim")]
#[command(about = "Run deterministic V2X emergency-braking scenarios", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (emergency_chain, out_of_range, repeated_trigger,
    /// reset_race, cruise, jitter_sweep, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Maximum simulation duration in seconds
    #[arg(short, long, default_value = "15")]
    duration: f64,

    /// Tick rate in Hz
    #[arg(short, long, default_value = "60")]
    tick_rate: u32,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export frame data to a JSON file for visualization
    #[arg(long)]
    export: Option<String>,

    /// Run interactively against the wall clock instead of asserting
    #[arg(long)]
    realtime: bool,
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if !args.json {
        info!("V2X Simulator v0.1.0");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        vec![args.scenario.parse().unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            eprintln!(
                "Available scenarios: emergency_chain, out_of_range, repeated_trigger, \
                 reset_race, cruise, jitter_sweep, all"
            );
            std::process::exit(1);
        })]
    };

    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(1)
    } else {
        args.seed
    };

    if args.realtime {
        let runtime = tokio::runtime::Runtime::new().expect("Failed to build tokio runtime");
        runtime.block_on(run_realtime_demo(base_seed, args.duration, args.tick_rate));
        return;
    }

    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            std::process::exit(1);
        }

        info!("Running with export to: {}", export_path);
        match run_with_export(base_seed, scenarios[0], args.duration, export_path) {
            Ok(true) => {
                info!("✓ {} (seed={}) exported", scenarios[0].name(), base_seed);
            }
            Ok(false) => {
                error!("✗ {} left vehicles braking at the horizon", scenarios[0].name());
                std::process::exit(1);
            }
            Err(e) => {
                error!("Failed to write export: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);

        let runner = ScenarioRunner::new(seed)
            .with_tick_rate(args.tick_rate)
            .with_duration(args.duration);

        for scenario in &scenarios {
            let result = runner.run(*scenario);

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED", scenario.name(), seed);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario.name(),
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }

            all_results.push(result);
        }
    }

    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "ticks": r.total_ticks,
                    "time_secs": r.final_time_secs,
                    "broadcasts": r.metrics.broadcasts,
                    "deliveries": r.metrics.deliveries,
                    "max_delivery_delay_ms": r.metrics.max_delivery_delay_ms,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).expect("summary serializes")
        );
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);

            for result in &all_results {
                if !result.passed {
                    error!(
                        "  - {} seed={}: {}",
                        result.scenario.name(),
                        result.seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }
        }
    }

    if failed_count > 0 {
        std::process::exit(1);
    }
}

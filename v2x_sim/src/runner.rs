//! Scenario runner - executes and asserts the scenario catalogue.

use crate::effects::EffectTracker;
use crate::exporter::event_label;
use crate::scenarios::ScenarioId;

use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use v2x_core::{EventKind, Intent, Simulation, SimulationEvent, SimulationSnapshot, VehicleStatus};
use v2x_env::{V2xContext, VehicleId};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether the scenario passed all assertions
    pub passed: bool,

    /// Total ticks executed
    pub total_ticks: u64,

    /// Final simulation time in seconds
    pub final_time_secs: f64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during the run
    pub metrics: ScenarioMetrics,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default)]
pub struct ScenarioMetrics {
    /// Broadcasts fanned out
    pub broadcasts: u64,

    /// Deliveries that landed and were applied
    pub deliveries: u64,

    /// Receivers outside the range at broadcast time
    pub skipped_out_of_range: u64,

    /// Worst observed trigger-to-delivery delay (ms)
    pub max_delivery_delay_ms: f64,
}

/// Runs scenarios against a seeded simulation.
pub struct ScenarioRunner {
    /// Master seed
    seed: u64,

    /// Tick rate in Hz
    tick_rate_hz: u32,

    /// Maximum duration in seconds
    max_duration_secs: f64,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            tick_rate_hz: 60,
            max_duration_secs: 15.0,
        }
    }

    /// Sets the tick rate.
    pub fn with_tick_rate(mut self, hz: u32) -> Self {
        self.tick_rate_hz = hz;
        self
    }

    /// Sets the maximum duration.
    pub fn with_duration(mut self, secs: f64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        match scenario {
            ScenarioId::EmergencyChain => self.run_emergency_chain(),
            ScenarioId::OutOfRange => self.run_out_of_range(),
            ScenarioId::RepeatedTrigger => self.run_repeated_trigger(),
            ScenarioId::ResetRace => self.run_reset_race(),
            ScenarioId::Cruise => self.run_cruise(),
            ScenarioId::JitterSweep => self.run_jitter_sweep(),
        }
    }

    fn frame(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.tick_rate_hz as f64)
    }

    fn result(
        &self,
        scenario: ScenarioId,
        sim: &Simulation,
        total_ticks: u64,
        metrics: ScenarioMetrics,
        failure_reason: Option<String>,
    ) -> ScenarioResult {
        ScenarioResult {
            scenario,
            seed: self.seed,
            passed: failure_reason.is_none(),
            total_ticks,
            final_time_secs: sim.elapsed().as_secs_f64(),
            failure_reason,
            metrics,
        }
    }

    /// Full braking chain with the default geometry.
    ///
    /// V2 sits 100 units from V1 and V3 sits 200, both inside the
    /// 300-unit range; both must enter EmergencyResponse within
    /// latency + jitter and the whole fleet must reach rest.
    fn run_emergency_chain(&self) -> ScenarioResult {
        let mut sim = Simulation::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut trigger_at = None;
        let mut failure = None;

        let frame = self.frame();
        let target_ticks = (self.max_duration_secs * self.tick_rate_hz as f64) as u64;
        let trigger_tick = self.tick_rate_hz as u64; // one second in

        let mut ticks = 0;
        for tick in 0..target_ticks {
            if tick == trigger_tick {
                if let Err(err) = sim.apply(Intent::TriggerEmergency) {
                    failure = Some(format!("trigger rejected: {}", err));
                    break;
                }
            }

            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);

            if let Some(violation) = fleet_invariant_violation(&sim) {
                failure = Some(violation);
                break;
            }
        }

        if failure.is_none() {
            let window_ms =
                sim.config().latency_ms + sim.config().jitter_max_ms + frame.as_secs_f64() * 1000.0;
            if metrics.deliveries != 2 {
                failure = Some(format!("expected 2 deliveries, saw {}", metrics.deliveries));
            } else if metrics.max_delivery_delay_ms > window_ms {
                failure = Some(format!(
                    "delivery took {:.1}ms, window is {:.1}ms",
                    metrics.max_delivery_delay_ms, window_ms
                ));
            } else if let Some(v) = sim
                .vehicles()
                .iter()
                .find(|v| v.status != VehicleStatus::Stopped || v.speed_kmh != 0.0)
            {
                failure = Some(format!("{} never reached rest ({})", v.id, v.status));
            }
        }

        debug!(
            "emergency_chain: {} deliveries, worst delay {:.1}ms",
            metrics.deliveries, metrics.max_delivery_delay_ms
        );
        self.result(ScenarioId::EmergencyChain, &sim, ticks, metrics, failure)
    }

    /// A receiver strictly beyond the range at broadcast time never
    /// transitions to EmergencyResponse from that broadcast.
    fn run_out_of_range(&self) -> ScenarioResult {
        let mut sim = Simulation::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut trigger_at = None;
        let mut failure = None;

        // V3 at x=700 is 600 units from V1, double the default range.
        sim.apply(Intent::DragVehicle {
            vehicle: VehicleId(3),
            x: 700.0,
            y: 200.0,
        })
        .expect("drag within track bounds");
        sim.apply(Intent::TriggerEmergency).expect("trigger armed");

        let frame = self.frame();
        let target_ticks = (self.max_duration_secs * self.tick_rate_hz as f64) as u64;

        let mut ticks = 0;
        for _ in 0..target_ticks {
            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);

            let v3 = sim.vehicle(VehicleId(3)).expect("fleet intact");
            if v3.status == VehicleStatus::EmergencyResponse || v3.emergency_braking {
                failure = Some("out-of-range vehicle reacted to the broadcast".to_string());
                break;
            }
        }

        if failure.is_none() {
            if metrics.skipped_out_of_range != 1 {
                failure = Some(format!(
                    "expected 1 skipped receiver, saw {}",
                    metrics.skipped_out_of_range
                ));
            } else if sim.vehicle(VehicleId(2)).expect("fleet intact").status
                != VehicleStatus::Stopped
            {
                failure = Some("in-range receiver failed to stop".to_string());
            }
        }

        self.result(ScenarioId::OutOfRange, &sim, ticks, metrics, failure)
    }

    /// A second trigger while the fleet is braking changes nothing.
    fn run_repeated_trigger(&self) -> ScenarioResult {
        let mut sim = Simulation::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut trigger_at = None;
        let mut failure = None;

        sim.apply(Intent::TriggerEmergency).expect("trigger armed");

        let frame = self.frame();
        let settle_ticks = (0.15 * self.tick_rate_hz as f64) as u64; // past latency+jitter
        let mut ticks = 0;
        for _ in 0..settle_ticks {
            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);
        }

        let before: Vec<(VehicleId, f64)> = sim
            .vehicles()
            .iter()
            .map(|v| (v.id, v.acceleration_mps2))
            .collect();

        // Still inside the cooldown, and everyone is already braking.
        sim.apply(Intent::TriggerEmergency).expect("intent accepted");
        for _ in 0..settle_ticks {
            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);
        }

        for (id, deceleration) in &before {
            let vehicle = sim.vehicle(*id).expect("fleet intact");
            if vehicle.emergency_braking && vehicle.acceleration_mps2 != *deceleration {
                failure = Some(format!(
                    "{} deceleration changed from {:.2} to {:.2}",
                    id, deceleration, vehicle.acceleration_mps2
                ));
            }
        }
        if failure.is_none() && metrics.broadcasts != 1 {
            failure = Some(format!("expected 1 broadcast, saw {}", metrics.broadcasts));
        }

        self.result(ScenarioId::RepeatedTrigger, &sim, ticks, metrics, failure)
    }

    /// Reset lands between broadcast and delivery; the reinitialized
    /// fleet must never see the stale deliveries.
    fn run_reset_race(&self) -> ScenarioResult {
        let mut sim = Simulation::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut trigger_at = None;
        let mut failure = None;

        sim.apply(Intent::TriggerEmergency).expect("trigger armed");

        let frame = self.frame();
        let mut ticks = 0;

        // One frame (~17ms) is well inside the 50ms base latency.
        sim.tick(frame);
        ticks += 1;
        record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);

        sim.apply(Intent::Reset).expect("reset accepted");

        let target_ticks = (2.0 * self.tick_rate_hz as f64) as u64;
        for _ in 0..target_ticks {
            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);
        }

        if metrics.deliveries != 0 {
            failure = Some(format!(
                "{} stale deliveries mutated the new fleet",
                metrics.deliveries
            ));
        } else if let Some(v) = sim
            .vehicles()
            .iter()
            .find(|v| v.status != VehicleStatus::Normal || v.emergency_braking)
        {
            failure = Some(format!("{} is {:?} after reset", v.id, v.status));
        }

        self.result(ScenarioId::ResetRace, &sim, ticks, metrics, failure)
    }

    /// No emergency at all: target changes apply, the track wraps, and
    /// the kinematic invariants hold throughout.
    fn run_cruise(&self) -> ScenarioResult {
        let mut sim = Simulation::new(self.seed);
        let mut metrics = ScenarioMetrics::default();
        let mut trigger_at = None;
        let mut failure = None;

        sim.apply(Intent::SetTargetSpeed {
            vehicle: VehicleId(1),
            kmh: 80.0,
        })
        .expect("valid target");
        sim.apply(Intent::SetTargetSpeed {
            vehicle: VehicleId(2),
            kmh: 30.0,
        })
        .expect("valid target");

        let frame = self.frame();
        let target_ticks = (self.max_duration_secs * self.tick_rate_hz as f64) as u64;
        let wrap_at = sim.config().track.wrap_at_x;

        let mut ticks = 0;
        for _ in 0..target_ticks {
            sim.tick(frame);
            ticks += 1;
            record_events(&sim.drain_events(), &mut metrics, &mut trigger_at);

            if let Some(violation) = fleet_invariant_violation(&sim) {
                failure = Some(violation);
                break;
            }
            if let Some(v) = sim.vehicles().iter().find(|v| v.position.x > wrap_at) {
                failure = Some(format!("{} escaped the track at x={:.1}", v.id, v.position.x));
                break;
            }
        }

        if failure.is_none() {
            let v1 = sim.vehicle(VehicleId(1)).expect("fleet intact");
            let v2 = sim.vehicle(VehicleId(2)).expect("fleet intact");
            if (v1.speed_kmh - 80.0).abs() > 1.0 || (v2.speed_kmh - 30.0).abs() > 1.0 {
                failure = Some(format!(
                    "targets not reached: V1 at {:.1}, V2 at {:.1}",
                    v1.speed_kmh, v2.speed_kmh
                ));
            } else if metrics.broadcasts != 0 {
                failure = Some("broadcast without a trigger".to_string());
            }
        }

        self.result(ScenarioId::Cruise, &sim, ticks, metrics, failure)
    }

    /// Sweeps the latency slider and checks every delivery lands inside
    /// `[latency, latency + jitter]`, measured at millisecond ticks.
    fn run_jitter_sweep(&self) -> ScenarioResult {
        let mut metrics = ScenarioMetrics::default();
        let mut failure = None;
        let mut ticks = 0;

        let frame = Duration::from_millis(1);
        let mut last_sim = Simulation::new(self.seed);

        for (i, latency_ms) in [20.0, 50.0, 100.0].into_iter().enumerate() {
            let mut sim = Simulation::new(self.seed.wrapping_add(i as u64));
            let mut trigger_at = None;

            sim.apply(Intent::SetLatency { ms: latency_ms })
                .expect("latency within bounds");
            sim.apply(Intent::TriggerEmergency).expect("trigger armed");

            let mut sweep_metrics = ScenarioMetrics::default();
            for _ in 0..300 {
                sim.tick(frame);
                ticks += 1;
                record_events(&sim.drain_events(), &mut sweep_metrics, &mut trigger_at);
            }

            // 1ms tick quantization on top of the jitter bound.
            let window_ms = latency_ms + sim.config().jitter_max_ms + 2.0;
            if sweep_metrics.deliveries != 2 {
                failure = Some(format!(
                    "latency {}ms: expected 2 deliveries, saw {}",
                    latency_ms, sweep_metrics.deliveries
                ));
            } else if sweep_metrics.max_delivery_delay_ms < latency_ms
                || sweep_metrics.max_delivery_delay_ms > window_ms
            {
                failure = Some(format!(
                    "latency {}ms: delay {:.1}ms outside [{:.0}, {:.0}]",
                    latency_ms, sweep_metrics.max_delivery_delay_ms, latency_ms, window_ms
                ));
            }

            metrics.broadcasts += sweep_metrics.broadcasts;
            metrics.deliveries += sweep_metrics.deliveries;
            metrics.max_delivery_delay_ms = metrics
                .max_delivery_delay_ms
                .max(sweep_metrics.max_delivery_delay_ms);
            last_sim = sim;

            if failure.is_some() {
                break;
            }
        }

        self.result(ScenarioId::JitterSweep, &last_sim, ticks, metrics, failure)
    }
}

/// Folds a frame's events into the metrics.
fn record_events(
    events: &[SimulationEvent],
    metrics: &mut ScenarioMetrics,
    trigger_at: &mut Option<Duration>,
) {
    for event in events {
        match &event.kind {
            EventKind::EmergencyTriggered { .. } => *trigger_at = Some(event.at),
            EventKind::MessageBroadcast { out_of_range, .. } => {
                metrics.broadcasts += 1;
                metrics.skipped_out_of_range += out_of_range.len() as u64;
            }
            EventKind::MessageDelivered { .. } => {
                metrics.deliveries += 1;
                if let Some(t0) = trigger_at {
                    let delay_ms = (event.at - *t0).as_secs_f64() * 1000.0;
                    if delay_ms > metrics.max_delivery_delay_ms {
                        metrics.max_delivery_delay_ms = delay_ms;
                    }
                }
            }
            _ => {}
        }
    }
}

/// Checks the always-true kinematic invariants over the fleet.
fn fleet_invariant_violation(sim: &Simulation) -> Option<String> {
    let max_deceleration = sim.config().limits.max_deceleration;
    for v in sim.vehicles() {
        if v.speed_kmh < 0.0 {
            return Some(format!("{} has negative speed {:.3}", v.id, v.speed_kmh));
        }
        if v.acceleration_mps2.abs() > max_deceleration {
            return Some(format!(
                "{} acceleration {:.2} exceeds the {:.1} bound",
                v.id, v.acceleration_mps2, max_deceleration
            ));
        }
    }
    None
}

/// Drives the simulation in real time, pacing frames with the context
/// clock and draining queued intents between ticks.
///
/// With a `TokioContext` this is the interactive loop; with a
/// `SimContext` the same code runs instantly and deterministically.
pub async fn run_realtime<C: V2xContext>(
    ctx: &C,
    mut intents: mpsc::Receiver<Intent>,
    seed: u64,
    duration: Duration,
    tick_rate_hz: u32,
) -> SimulationSnapshot {
    let mut sim = Simulation::new(seed);
    let mut effects = EffectTracker::new();
    let frame = Duration::from_secs_f64(1.0 / tick_rate_hz as f64);
    let start = ctx.now();

    while ctx.now() - start < duration {
        // All mutation happens here, between physics passes.
        while let Ok(intent) = intents.try_recv() {
            if let Err(err) = sim.apply(intent) {
                warn!("Rejected intent: {}", err);
            }
        }

        sim.tick(frame);

        let events = sim.drain_events();
        for event in &events {
            debug!("{}", event_label(event));
        }
        effects.observe(&events);
        effects.decay();

        ctx.sleep(frame).await;
    }

    sim.snapshot()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SimContext;
    use proptest::prelude::*;

    #[test]
    fn test_all_scenarios_pass_with_default_seed() {
        let runner = ScenarioRunner::new(42);
        for scenario in ScenarioId::all() {
            let result = runner.run(scenario);
            assert!(
                result.passed,
                "{} failed: {:?}",
                scenario.name(),
                result.failure_reason
            );
        }
    }

    #[test]
    fn test_emergency_chain_metrics() {
        let result = ScenarioRunner::new(42).run(ScenarioId::EmergencyChain);
        assert!(result.passed);
        assert_eq!(result.metrics.broadcasts, 1);
        assert_eq!(result.metrics.deliveries, 2);
        assert!(result.metrics.max_delivery_delay_ms >= 50.0);
    }

    #[tokio::test]
    async fn test_realtime_loop_with_virtual_clock() {
        let ctx = SimContext::new(42);
        let (tx, rx) = mpsc::channel(16);
        tx.send(Intent::TriggerEmergency).await.unwrap();

        let snapshot = run_realtime(&ctx, rx, 42, Duration::from_secs(10), 60).await;

        // Trigger drained on the first frame; everyone is at rest by 10s.
        for v in &snapshot.vehicles {
            assert_eq!(v.status, VehicleStatus::Stopped);
            assert_eq!(v.speed_kmh, 0.0);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_emergency_chain_passes_for_any_seed(seed in 0u64..10_000) {
            let result = ScenarioRunner::new(seed).run(ScenarioId::EmergencyChain);
            prop_assert!(result.passed, "seed {} failed: {:?}", seed, result.failure_reason);
        }
    }
}

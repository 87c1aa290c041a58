//! The simulation controller.
//!
//! Owns the fleet, the radio config, the delivery scheduler and the
//! broadcaster, and exposes the whole UI boundary: validated intents in,
//! snapshots and events out.

use crate::broadcast::Broadcaster;
use crate::config::{
    SimulationConfig, LATENCY_BOUNDS_MS, TRANSMISSION_RANGE_BOUNDS,
};
use crate::error::CoreError;
use crate::events::{EventKind, SimulationEvent};
use crate::intents::Intent;
use crate::physics;
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::vehicle::Vehicle;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;
use v2x_env::VehicleId;

/// Read-only view of the simulation for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    /// Elapsed simulation time
    pub elapsed: Duration,

    /// Run loop active
    pub running: bool,

    /// Emergency trigger available (not cooling down)
    pub trigger_armed: bool,

    /// The full fleet
    pub vehicles: Vec<Vehicle>,
}

/// The simulation: one controller instance owns all mutable state.
///
/// Single-threaded by construction - deliveries and intents only take
/// effect between physics passes, so a tick always sees a consistent
/// fleet.
pub struct Simulation {
    config: SimulationConfig,
    vehicles: Vec<Vehicle>,
    scheduler: Scheduler,
    broadcaster: Broadcaster,
    elapsed: Duration,
    running: bool,
    trigger_armed: bool,
    events: VecDeque<SimulationEvent>,
    seed: u64,
}

impl Simulation {
    /// Creates a simulation with the default config and fleet.
    pub fn new(seed: u64) -> Self {
        Self::with_config(SimulationConfig::default(), seed)
    }

    /// Creates a simulation with an explicit config.
    pub fn with_config(config: SimulationConfig, seed: u64) -> Self {
        // Separate stream for the broadcaster so unrelated draws never
        // perturb delivery jitter.
        let broadcast_seed = seed.wrapping_mul(0x9e3779b97f4a7c15);

        Self {
            config,
            vehicles: Self::default_fleet(),
            scheduler: Scheduler::new(),
            broadcaster: Broadcaster::from_seed(broadcast_seed),
            elapsed: Duration::ZERO,
            running: true,
            trigger_armed: true,
            events: VecDeque::new(),
            seed,
        }
    }

    /// The fixed three-vehicle fleet every run starts from.
    fn default_fleet() -> Vec<Vehicle> {
        vec![
            Vehicle::new(VehicleId(1), Vector2::new(100.0, 200.0), 60.0),
            Vehicle::new(VehicleId(2), Vector2::new(200.0, 200.0), 55.0),
            Vehicle::new(VehicleId(3), Vector2::new(300.0, 200.0), 50.0),
        ]
    }

    /// Applies a user intent, validating at this boundary.
    ///
    /// A rejected intent leaves the simulation untouched.
    pub fn apply(&mut self, intent: Intent) -> Result<(), CoreError> {
        match intent {
            Intent::SetTargetSpeed { vehicle, kmh } => {
                let max = self.config.limits.max_speed_kmh;
                if !(0.0..=max).contains(&kmh) {
                    return Err(CoreError::InvalidInput {
                        field: "target_speed",
                        value: kmh,
                        min: 0.0,
                        max,
                    });
                }
                let v = self
                    .vehicles
                    .iter_mut()
                    .find(|v| v.id == vehicle)
                    .ok_or(CoreError::UnknownVehicle(vehicle))?;
                v.target_speed_kmh = kmh;
                self.push_event(EventKind::TargetSpeedChanged { vehicle, kmh });
                Ok(())
            }

            Intent::TriggerEmergency => self.trigger_emergency(),

            Intent::SetTransmissionRange { meters } => {
                let (min, max) = TRANSMISSION_RANGE_BOUNDS;
                if !(min..=max).contains(&meters) {
                    return Err(CoreError::InvalidInput {
                        field: "transmission_range",
                        value: meters,
                        min,
                        max,
                    });
                }
                self.config.transmission_range = meters;
                self.push_event(EventKind::RangeChanged { meters });
                Ok(())
            }

            Intent::SetLatency { ms } => {
                let (min, max) = LATENCY_BOUNDS_MS;
                if !(min..=max).contains(&ms) {
                    return Err(CoreError::InvalidInput {
                        field: "latency",
                        value: ms,
                        min,
                        max,
                    });
                }
                self.config.latency_ms = ms;
                self.push_event(EventKind::LatencyChanged { ms });
                Ok(())
            }

            Intent::PlayPause => {
                self.running = !self.running;
                let kind = if self.running {
                    EventKind::Resumed
                } else {
                    EventKind::Paused
                };
                self.push_event(kind);
                Ok(())
            }

            Intent::Reset => {
                self.reset();
                Ok(())
            }

            Intent::DragVehicle { vehicle, x, y } => {
                let track = self.config.track.clone();
                if !(track.wrap_to_x..=track.wrap_at_x).contains(&x) {
                    return Err(CoreError::InvalidInput {
                        field: "position_x",
                        value: x,
                        min: track.wrap_to_x,
                        max: track.wrap_at_x,
                    });
                }
                let v = self
                    .vehicles
                    .iter_mut()
                    .find(|v| v.id == vehicle)
                    .ok_or(CoreError::UnknownVehicle(vehicle))?;
                v.position.x = x;
                v.position.y = y.clamp(track.min_y, track.max_y);
                self.push_event(EventKind::VehicleRepositioned { vehicle });
                Ok(())
            }
        }
    }

    /// Slams the lead vehicle's brakes and fans out the EEBL alert.
    ///
    /// Ignored while the trigger is cooling down.
    fn trigger_emergency(&mut self) -> Result<(), CoreError> {
        if !self.trigger_armed {
            return Ok(());
        }
        let sender = match self.vehicles.first() {
            Some(v) => v.id,
            None => return Ok(()),
        };

        self.trigger_armed = false;
        self.scheduler.schedule(
            self.elapsed + self.config.trigger_rearm,
            ScheduledAction::RearmTrigger,
        );

        let summary = self.broadcaster.trigger(
            sender,
            &mut self.vehicles,
            &self.config,
            &mut self.scheduler,
            self.elapsed,
        )?;

        self.push_event(EventKind::EmergencyTriggered { vehicle: sender });
        self.push_event(EventKind::MessageBroadcast {
            sender,
            kind: summary.message.kind,
            origin: summary.message.payload.position,
            receivers: summary.scheduled,
            out_of_range: summary.skipped,
        });
        Ok(())
    }

    /// Advances the simulation by one frame.
    ///
    /// Due deliveries drain first, then a single atomic physics pass
    /// runs over the fleet; a delivery is therefore visible at the start
    /// of a tick, never mid-tick. No-op while paused, and a dt at or
    /// above 100 ms is dropped entirely.
    pub fn tick(&mut self, dt: Duration) {
        if !self.running {
            return;
        }
        let dt_secs = dt.as_secs_f64();
        if dt_secs >= physics::MAX_STEP_SECS {
            return;
        }

        self.elapsed += dt;

        while let Some(action) = self.scheduler.pop_due(self.elapsed) {
            match action {
                ScheduledAction::Deliver { receiver, message } => {
                    let vehicle = self.vehicles.iter_mut().find(|v| v.id == receiver);
                    let outcome = match vehicle {
                        Some(v) => self.broadcaster.deliver(v, &message, &self.config),
                        None => None,
                    };
                    if let Some(outcome) = outcome {
                        self.push_event(EventKind::MessageDelivered {
                            receiver: outcome.receiver,
                            deceleration_mps2: outcome.deceleration_mps2,
                        });
                    }
                }
                ScheduledAction::RearmTrigger => {
                    self.trigger_armed = true;
                    self.push_event(EventKind::TriggerRearmed);
                }
            }
        }

        let stopped = physics::step(
            &mut self.vehicles,
            &self.config.limits,
            &self.config.track,
            dt_secs,
        );
        for vehicle in stopped {
            self.push_event(EventKind::VehicleStopped { vehicle });
        }
    }

    /// Replaces all state with the fixed defaults.
    ///
    /// Pending deliveries and timers are cancelled - a callback scheduled
    /// before the reset can never touch the new fleet. Radio settings
    /// persist, matching the operator's sliders.
    pub fn reset(&mut self) {
        self.scheduler.cancel_all();
        self.vehicles = Self::default_fleet();
        self.elapsed = Duration::ZERO;
        self.running = true;
        self.trigger_armed = true;
        self.push_event(EventKind::SimulationReset);
    }

    /// Returns a rendering snapshot.
    pub fn snapshot(&self) -> SimulationSnapshot {
        SimulationSnapshot {
            elapsed: self.elapsed,
            running: self.running,
            trigger_armed: self.trigger_armed,
            vehicles: self.vehicles.clone(),
        }
    }

    /// Drains all buffered events.
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        self.events.drain(..).collect()
    }

    /// Returns a vehicle by id.
    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id == id)
    }

    /// Returns the full fleet.
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Elapsed simulation time.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// True while the run loop is active.
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// True while the emergency trigger is available.
    pub fn trigger_armed(&self) -> bool {
        self.trigger_armed
    }

    /// Number of scheduled deliveries/timers not yet due.
    pub fn pending_deliveries(&self) -> usize {
        self.scheduler.pending()
    }

    /// The master seed this run was built from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn push_event(&mut self, kind: EventKind) {
        self.events
            .push_back(SimulationEvent::new(self.elapsed, kind));
    }
}

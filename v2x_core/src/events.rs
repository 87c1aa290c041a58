//! Outbound state-change events.
//!
//! The core emits these instead of touching any UI; a presentation layer
//! drains them each frame and renders however it likes. Events are
//! lightweight value types carrying just enough data to be useful.

use crate::message::MessageKind;
use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use v2x_env::VehicleId;

/// A state-change event emitted by the simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationEvent {
    /// Simulation time at emission
    pub at: Duration,

    /// Event payload
    pub kind: EventKind,
}

/// Event payload variants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum EventKind {
    /// An operator changed a vehicle's cruise target.
    TargetSpeedChanged { vehicle: VehicleId, kmh: f64 },

    /// A vehicle began an emergency stop of its own.
    EmergencyTriggered { vehicle: VehicleId },

    /// An alert was fanned out.
    MessageBroadcast {
        sender: VehicleId,
        kind: MessageKind,
        /// Sender position at send time, for range-ring rendering
        origin: Vector2<f64>,
        /// Receivers with a delivery scheduled
        receivers: Vec<VehicleId>,
        /// Receivers outside the transmission range at send time
        out_of_range: Vec<VehicleId>,
    },

    /// A scheduled delivery landed and the receiver reacted.
    MessageDelivered {
        receiver: VehicleId,
        deceleration_mps2: f64,
    },

    /// A braking vehicle came to rest.
    VehicleStopped { vehicle: VehicleId },

    /// A vehicle was dragged to a new position.
    VehicleRepositioned { vehicle: VehicleId },

    /// The transmission range was adjusted.
    RangeChanged { meters: f64 },

    /// The base latency was adjusted.
    LatencyChanged { ms: f64 },

    /// The emergency trigger finished its cooldown.
    TriggerRearmed,

    /// The run loop was paused.
    Paused,

    /// The run loop was resumed.
    Resumed,

    /// All state was replaced with the fixed defaults.
    SimulationReset,
}

impl SimulationEvent {
    /// Creates an event stamped at `at`.
    pub fn new(at: Duration, kind: EventKind) -> Self {
        Self { at, kind }
    }
}

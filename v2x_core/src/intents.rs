//! Inbound operator intents.
//!
//! The UI boundary: everything a presentation layer can ask of the
//! simulation arrives as one of these, validated before any state moves.

use serde::{Deserialize, Serialize};
use v2x_env::VehicleId;

/// A user intent from the presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Intent {
    /// Set a vehicle's cruise target (km/h).
    SetTargetSpeed { vehicle: VehicleId, kmh: f64 },

    /// Slam the lead vehicle's brakes and broadcast the alert.
    TriggerEmergency,

    /// Adjust the transmission range (sim meters).
    SetTransmissionRange { meters: f64 },

    /// Adjust the base one-way latency (ms).
    SetLatency { ms: f64 },

    /// Toggle the run loop.
    PlayPause,

    /// Replace all state with the fixed defaults.
    Reset,

    /// Drag a vehicle to a new position; y is clamped to the road.
    DragVehicle { vehicle: VehicleId, x: f64, y: f64 },
}

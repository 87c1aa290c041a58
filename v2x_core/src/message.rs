//! V2X message types exchanged between vehicles.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use v2x_env::VehicleId;

/// Wire-level message taxonomy.
///
/// Only `Eebl` is produced by the current flow; `Bsm` (the periodic
/// state beacon) and `EmergencyAlert` are declared kinds of the same
/// channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageKind {
    /// Basic Safety Message - periodic vehicle state beacon
    Bsm,

    /// Emergency Electronic Brake Light - hard-braking alert
    Eebl,

    /// Generic emergency alert
    EmergencyAlert,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MessageKind::Bsm => "BSM",
            MessageKind::Eebl => "EEBL",
            MessageKind::EmergencyAlert => "Emergency Alert",
        };
        write!(f, "{}", s)
    }
}

/// Payload describing the sender's braking state at send time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmergencyPayload {
    /// Sender is performing an emergency stop
    pub emergency_braking: bool,

    /// Deceleration the sender is applying (m/s², magnitude)
    pub deceleration_mps2: f64,

    /// Sender position at send time (simulation units)
    pub position: Vector2<f64>,

    /// Sender speed at send time (km/h)
    pub speed_kmh: f64,
}

/// A broadcast message.
///
/// Created on trigger and delivered zero or more times, once per
/// in-range receiver; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message kind
    pub kind: MessageKind,

    /// Originating vehicle
    pub sender: VehicleId,

    /// Simulation time at creation
    pub sent_at: Duration,

    /// Braking-state payload
    pub payload: EmergencyPayload,
}

impl Message {
    /// Creates an EEBL alert from the sender's state at send time.
    pub fn eebl(sender: VehicleId, sent_at: Duration, payload: EmergencyPayload) -> Self {
        Self {
            kind: MessageKind::Eebl,
            sender,
            sent_at,
            payload,
        }
    }
}

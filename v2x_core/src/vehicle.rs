//! Per-vehicle kinematic and status state.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use v2x_env::VehicleId;

/// Operational status of a vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleStatus {
    /// Cruising toward its target speed
    Normal,

    /// Braking hard after triggering the emergency itself
    EmergencyBraking,

    /// Braking in response to a received alert
    EmergencyResponse,

    /// Came to rest after an emergency stop
    Stopped,
}

impl std::fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            VehicleStatus::Normal => "Normal",
            VehicleStatus::EmergencyBraking => "Emergency Braking",
            VehicleStatus::EmergencyResponse => "Emergency Response",
            VehicleStatus::Stopped => "Stopped",
        };
        write!(f, "{}", s)
    }
}

/// A vehicle in the simulation.
///
/// Mutated once per tick by the physics pass and asynchronously by
/// message deliveries drained at tick start; replaced wholesale on reset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Identity, unique within a run
    pub id: VehicleId,

    /// Position in simulation-space units
    pub position: Vector2<f64>,

    /// Current speed (km/h, never negative)
    pub speed_kmh: f64,

    /// Operator-set cruise target (km/h)
    pub target_speed_kmh: f64,

    /// Signed acceleration (m/s²)
    pub acceleration_mps2: f64,

    /// Currently performing an emergency stop
    pub emergency_braking: bool,

    /// Operational status
    pub status: VehicleStatus,
}

impl Vehicle {
    /// Creates a vehicle cruising at `speed_kmh`.
    pub fn new(id: VehicleId, position: Vector2<f64>, speed_kmh: f64) -> Self {
        Self {
            id,
            position,
            speed_kmh,
            target_speed_kmh: speed_kmh,
            acceleration_mps2: 0.0,
            emergency_braking: false,
            status: VehicleStatus::Normal,
        }
    }

    /// Euclidean distance to another vehicle, in simulation units.
    pub fn distance_to(&self, other: &Vehicle) -> f64 {
        (self.position - other.position).norm()
    }

    /// True once an emergency stop has completed.
    pub fn is_stopped(&self) -> bool {
        self.status == VehicleStatus::Stopped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_vehicle_defaults() {
        let v = Vehicle::new(VehicleId(1), Vector2::new(100.0, 200.0), 60.0);
        assert_eq!(v.target_speed_kmh, 60.0);
        assert_eq!(v.acceleration_mps2, 0.0);
        assert!(!v.emergency_braking);
        assert_eq!(v.status, VehicleStatus::Normal);
    }

    #[test]
    fn test_distance() {
        let a = Vehicle::new(VehicleId(1), Vector2::new(0.0, 0.0), 60.0);
        let b = Vehicle::new(VehicleId(2), Vector2::new(3.0, 4.0), 55.0);
        assert_relative_eq!(a.distance_to(&b), 5.0);
    }
}

//! Per-tick kinematic integration for the vehicle fleet.
//!
//! Speeds are stored in km/h for the operator-facing surface and
//! converted to m/s for integration, as the underlying model is metric.

use crate::config::{TrackGeometry, VehicleLimits};
use crate::vehicle::{Vehicle, VehicleStatus};
use v2x_env::VehicleId;

/// Steps at or above this size are ignored entirely.
///
/// A backgrounded frame source can hand the loop a multi-second dt;
/// integrating it would blow the physics up, so the step is dropped.
pub const MAX_STEP_SECS: f64 = 0.1;

/// Speed-matching deadband (m/s) below which acceleration is zeroed.
const SPEED_DEADBAND_MPS: f64 = 0.1;

/// An emergency-braking vehicle below this speed (km/h) is forced to rest.
const STOP_EPSILON_KMH: f64 = 0.1;

/// Converts km/h to m/s.
pub fn kmh_to_mps(kmh: f64) -> f64 {
    kmh * (1000.0 / 3600.0)
}

/// Converts m/s to km/h.
pub fn mps_to_kmh(mps: f64) -> f64 {
    mps * (3600.0 / 1000.0)
}

/// Advances every vehicle by `dt_secs` and returns the ids of vehicles
/// that completed an emergency stop during this step.
///
/// The pass over the fleet is atomic: no delivery or intent interleaves
/// with it. A `dt_secs` of [`MAX_STEP_SECS`] or more is ignored.
pub fn step(
    vehicles: &mut [Vehicle],
    limits: &VehicleLimits,
    track: &TrackGeometry,
    dt_secs: f64,
) -> Vec<VehicleId> {
    if !(0.0..MAX_STEP_SECS).contains(&dt_secs) {
        return Vec::new();
    }

    let mut stopped = Vec::new();

    for vehicle in vehicles.iter_mut() {
        let current_mps = kmh_to_mps(vehicle.speed_kmh);
        let target_mps = kmh_to_mps(vehicle.target_speed_kmh);

        // Speed-match toward the target unless an emergency stop owns
        // the pedal. The magnitude is proportional to the remaining
        // speed gap, clamped at the configured maximum.
        if !vehicle.emergency_braking {
            let diff = target_mps - current_mps;
            vehicle.acceleration_mps2 = if diff.abs() > SPEED_DEADBAND_MPS {
                diff.signum() * limits.max_acceleration.min(diff.abs())
            } else {
                0.0
            };
        }

        let new_mps = (current_mps + vehicle.acceleration_mps2 * dt_secs).max(0.0);
        vehicle.speed_kmh = mps_to_kmh(new_mps);

        // Advance along the track; the position update uses the speed at
        // the start of the step.
        vehicle.position.x += current_mps * dt_secs * track.position_scale;
        if vehicle.position.x > track.wrap_at_x {
            vehicle.position.x = track.wrap_to_x;
        }

        if vehicle.emergency_braking && vehicle.speed_kmh < STOP_EPSILON_KMH {
            vehicle.speed_kmh = 0.0;
            vehicle.acceleration_mps2 = 0.0;
            vehicle.emergency_braking = false;
            vehicle.status = VehicleStatus::Stopped;
            stopped.push(vehicle.id);
        }
    }

    stopped
}

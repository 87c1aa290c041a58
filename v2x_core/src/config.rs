//! Simulation configuration: radio parameters, vehicle limits, track geometry.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Adjustable bounds for the transmission range, in simulation meters.
pub const TRANSMISSION_RANGE_BOUNDS: (f64, f64) = (100.0, 500.0);

/// Adjustable bounds for the base one-way latency, in milliseconds.
pub const LATENCY_BOUNDS_MS: (f64, f64) = (20.0, 100.0);

/// Physical limits shared by every vehicle in the fleet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleLimits {
    /// Maximum operator-settable speed (km/h)
    pub max_speed_kmh: f64,

    /// Maximum acceleration toward a target speed (m/s²)
    pub max_acceleration: f64,

    /// Hard bound on any deceleration magnitude (m/s²)
    pub max_deceleration: f64,

    /// Deceleration applied by the triggering vehicle (m/s²)
    pub emergency_deceleration: f64,

    /// Base deceleration applied by alerted vehicles (m/s²)
    pub comfort_deceleration: f64,

    /// Vehicle length (m), used by the presentation layer
    pub vehicle_length_m: f64,

    /// Driver reaction time (s)
    pub reaction_time_s: f64,
}

impl Default for VehicleLimits {
    fn default() -> Self {
        Self {
            max_speed_kmh: 120.0,
            max_acceleration: 3.0,
            max_deceleration: 8.0,
            emergency_deceleration: 7.0,
            comfort_deceleration: 6.0,
            vehicle_length_m: 5.0,
            reaction_time_s: 0.5,
        }
    }
}

/// Geometry of the looping track in simulation-space units.
///
/// The wrap past the right edge is a rendering convenience, not a
/// physical teleport: the track reads as an endless road.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackGeometry {
    /// A vehicle past this x wraps back to `wrap_to_x`
    pub wrap_at_x: f64,

    /// Re-entry x after wrapping
    pub wrap_to_x: f64,

    /// Conversion from meters travelled to simulation-space units
    pub position_scale: f64,

    /// Top road edge (min y a vehicle can occupy)
    pub min_y: f64,

    /// Bottom road edge (max y a vehicle can occupy)
    pub max_y: f64,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            wrap_at_x: 900.0,
            wrap_to_x: -50.0,
            position_scale: 10.0,
            min_y: 150.0,
            max_y: 450.0,
        }
    }
}

/// Configuration for a simulation run.
///
/// Radio parameters are operator-adjustable at runtime through validated
/// intents; limits and geometry are fixed for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Maximum distance at which a broadcast is receivable (sim meters)
    pub transmission_range: f64,

    /// Base one-way delivery delay (ms)
    pub latency_ms: f64,

    /// Upper bound on the random per-delivery jitter (ms)
    pub jitter_max_ms: f64,

    /// Cooldown before the emergency trigger re-arms
    pub trigger_rearm: Duration,

    /// Vehicle physical limits
    pub limits: VehicleLimits,

    /// Track geometry
    pub track: TrackGeometry,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            transmission_range: 300.0,
            latency_ms: 50.0,
            jitter_max_ms: 20.0,
            trigger_rearm: Duration::from_secs(3),
            limits: VehicleLimits::default(),
            track: TrackGeometry::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_radio_parameters_within_bounds() {
        let config = SimulationConfig::default();
        assert!(config.transmission_range >= TRANSMISSION_RANGE_BOUNDS.0);
        assert!(config.transmission_range <= TRANSMISSION_RANGE_BOUNDS.1);
        assert!(config.latency_ms >= LATENCY_BOUNDS_MS.0);
        assert!(config.latency_ms <= LATENCY_BOUNDS_MS.1);
    }

    #[test]
    fn test_deceleration_ordering() {
        // Emergency and comfort responses must fit under the hard bound,
        // including the 1.2x worst-case response factor.
        let limits = VehicleLimits::default();
        assert!(limits.emergency_deceleration <= limits.max_deceleration);
        assert!(limits.comfort_deceleration * 1.2 <= limits.max_deceleration);
    }
}

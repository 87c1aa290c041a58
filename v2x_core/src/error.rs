//! Error types for the simulation core.

use thiserror::Error;
use v2x_env::VehicleId;

/// Errors surfaced at the intent boundary.
///
/// All failures are local and non-fatal; a rejected intent leaves the
/// simulation untouched.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A slider/form value was out of range for its parameter
    #[error("Invalid input: {field} = {value} (allowed {min}..={max})")]
    InvalidInput {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// An intent referenced a vehicle that does not exist
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(VehicleId),
}

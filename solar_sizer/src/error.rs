//! Error types for the sizing calculator.

use thiserror::Error;

/// Errors surfaced by the calculator.
///
/// Division hazards are typed errors here, never NaN or infinity in a
/// result; callers show a placeholder instead of a number.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SizingError {
    /// An input was non-finite or out of range for its parameter
    #[error("Invalid input: {field} = {value}")]
    InvalidInput { field: &'static str, value: f64 },

    /// Cannot size a system for a location with no solar resource
    #[error("Irradiance must be positive to size a system")]
    ZeroIrradiance,

    /// The sized system produces nothing; cost metrics are undefined
    #[error("System produces no energy; payback and LCOE are undefined")]
    NoProduction,

    /// A location lookup missed
    #[error("Unknown location: {0}")]
    UnknownLocation(String),
}

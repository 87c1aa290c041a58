//! Solar PV sizing and cost calculator.
//!
//! Pure, deterministic arithmetic: [`size`] turns consumption, location
//! and hardware inputs into a system size, a cost breakdown and lifetime
//! economics; [`scenario`] re-runs it with one input perturbed and
//! reports the deltas; [`series`] shapes chart-ready data for a
//! presentation layer. No I/O, no state, no randomness.
//!
//! ```
//! use solar_sizer::{size, SizingInputs};
//!
//! let inputs = SizingInputs::default();
//! let result = size(&inputs).unwrap();
//! assert!(result.system_size_kw > 0.0);
//! ```

mod error;
mod inputs;
pub mod locations;
pub mod scenario;
pub mod series;
mod sizing;

pub use error::SizingError;
pub use inputs::{SizingInputs, SystemType};
pub use locations::Location;
pub use scenario::{ScenarioKind, ScenarioReport};
pub use series::ChartSeries;
pub use sizing::{size, CostBreakdown, SizingResult};

//! V2X Deterministic Simulation Harness
//!
//! Runs the emergency-braking simulation in a controlled environment
//! where every source of non-determinism is intercepted:
//! - **Time**: a virtual clock advanced by the harness
//! - **Delivery timing**: explicit scheduled events in the core
//! - **Randomness**: all entropy derived from a single 64-bit seed
//!
//! Any failing run reproduces exactly from its seed number.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     ScenarioRunner                       │
//! │  ┌────────────┐   Intent    ┌───────────────────────┐    │
//! │  │  scenario  ├────────────►│  v2x_core::Simulation │    │
//! │  │   script   │             └──────────┬────────────┘    │
//! │  └────────────┘                        │ events          │
//! │        ▲                     ┌─────────▼──────────┐      │
//! │        │ assertions          │ EffectTracker /    │      │
//! │        └─────────────────────┤ SimExport (JSON)   │      │
//! │                              └────────────────────┘      │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use v2x_sim::{ScenarioRunner, scenarios::ScenarioId};
//!
//! let runner = ScenarioRunner::new(42).with_duration(15.0);
//! let result = runner.run(ScenarioId::EmergencyChain);
//! assert!(result.passed);
//! ```

mod clock;
mod effects;
mod exporter;
mod runner;
pub mod scenarios;

pub use clock::SimContext;
pub use effects::{BroadcastEffect, EffectTracker};
pub use exporter::{event_label, EffectFrame, SimExport, SimFrame, VehicleFrame};
pub use runner::{run_realtime, ScenarioMetrics, ScenarioResult, ScenarioRunner};

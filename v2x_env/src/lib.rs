//! V2X Environment Abstraction Layer
//!
//! This crate provides the "Sans-IO" abstraction allowing the simulation
//! core to run against both **Production** (tokio, wall clock) and
//! **Simulation** (virtual clock) environments.
//!
//! # Core Concept
//!
//! For deterministic testing, all sources of non-determinism are
//! intercepted behind [`V2xContext`]:
//! - Time (`now()`, `sleep()`)
//! - Randomness (`derive_rng()`)
//!
//! By deriving all entropy from a single 64-bit seed, any run becomes
//! reproducible via its seed number.
//!
//! # Example
//!
//! ```ignore
//! use v2x_env::V2xContext;
//! use std::time::Duration;
//!
//! async fn frame_loop<Ctx: V2xContext>(ctx: &Ctx) {
//!     loop {
//!         let frame_start = ctx.now();
//!         step_simulation();
//!         ctx.sleep(Duration::from_millis(33)).await;
//!     }
//! }
//! ```

mod context;
mod error;
mod tokio_impl;
mod types;

pub use context::V2xContext;
pub use error::EnvError;
pub use tokio_impl::TokioContext;
pub use types::VehicleId;

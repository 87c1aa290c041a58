//! V2X Emergency Braking Simulation Core
//!
//! A small kinematic simulation of a vehicle fleet on a looping track,
//! with an emergency-brake alert fanned out to in-range vehicles over a
//! lossy, latency-bound broadcast.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                       Simulation                          │
//! │                                                           │
//! │  Intent ──► validate ──► mutate ─┐                        │
//! │                                  │                        │
//! │  ┌─────────────┐   schedule   ┌──▼──────────┐             │
//! │  │ Broadcaster ├─────────────►│  Scheduler  │             │
//! │  └─────────────┘              │ (due, seq)  │             │
//! │        ▲                      └──┬──────────┘             │
//! │        │ deliver (start of tick) │                        │
//! │  ┌─────┴──────────────┐          │                        │
//! │  │  Vehicle fleet     │◄─────────┘                        │
//! │  │  (physics::step)   │                                   │
//! │  └────────────────────┘                                   │
//! │        │                                                  │
//! │        └──► SimulationEvent / SimulationSnapshot ──► UI   │
//! └───────────────────────────────────────────────────────────┘
//! ```
//!
//! All mutation happens on a single logical thread: scheduled deliveries
//! drain at the start of a tick, never mid-tick, and the physics pass over
//! the fleet is atomic relative to them.
//!
//! # Determinism
//!
//! Jitter and braking-response draws come from a `ChaCha8Rng` derived from
//! the run's master seed, so a scenario replays exactly from its seed.

mod broadcast;
mod config;
mod error;
mod events;
mod intents;
mod message;
pub mod physics;
mod scheduler;
mod sim;
mod vehicle;

pub use broadcast::{Broadcaster, BroadcastSummary, DeliveryOutcome};
pub use config::{SimulationConfig, TrackGeometry, VehicleLimits};
pub use error::CoreError;
pub use events::{EventKind, SimulationEvent};
pub use intents::Intent;
pub use message::{EmergencyPayload, Message, MessageKind};
pub use scheduler::{ScheduledAction, Scheduler};
pub use sim::{Simulation, SimulationSnapshot};
pub use vehicle::{Vehicle, VehicleStatus};

pub use v2x_env::VehicleId;

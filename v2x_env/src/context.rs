//! Core environment context trait for the simulation.

use async_trait::async_trait;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// The central interface for environment interaction.
///
/// This trait abstracts time and entropy so that the simulation core can
/// run in both production (tokio, OS randomness) and simulation (virtual
/// clock, seeded randomness) environments.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `tokio::time`, `OsRng`
/// - **Simulation**: `SimContext` (in `v2x_sim`) - virtual clock, seeded RNG
///
/// # Determinism
///
/// All methods that would normally introduce non-determinism are
/// controlled by the implementation. A simulated run with the same seed
/// produces the same delivery jitter, the same braking responses, and
/// the same frame timeline.
#[async_trait]
pub trait V2xContext: Send + Sync + 'static {
    /// Returns the current time since context creation.
    ///
    /// In simulation, this is the virtual clock time.
    fn now(&self) -> Duration;

    /// Suspends execution for the given duration.
    ///
    /// In production: wraps `tokio::time::sleep`
    /// In simulation: advances the virtual clock
    async fn sleep(&self, duration: Duration);

    /// Derives a deterministic RNG from a seed extension.
    ///
    /// The implementation combines the global seed with `seed_extension`
    /// to derive unique but reproducible random streams, so that changing
    /// one subsystem's draws does not perturb another's.
    ///
    /// In production, the stream is seeded from OS entropy instead.
    fn derive_rng(&self, seed_extension: u64) -> ChaCha8Rng;

    /// Returns the context's seed (for logging/debugging).
    ///
    /// In production, returns 0 (not seeded).
    /// In simulation, returns the master seed.
    fn seed(&self) -> u64;
}

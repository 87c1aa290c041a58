//! Transient broadcast visuals.
//!
//! The core never renders; it only reports that a broadcast happened.
//! This tracker owns the decaying ring each broadcast leaves behind -
//! the visual record lives and dies entirely in the presentation layer.

use v2x_core::{EventKind, SimulationEvent};

/// Ring growth per frame (simulation units).
const RADIUS_STEP: f64 = 5.0;

/// Opacity fade per frame.
const ALPHA_STEP: f64 = 0.02;

/// One expanding, fading broadcast ring.
#[derive(Debug, Clone, Copy)]
pub struct BroadcastEffect {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

/// Tracks active broadcast rings across frames.
#[derive(Debug, Default)]
pub struct EffectTracker {
    effects: Vec<BroadcastEffect>,
}

impl EffectTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spawns a ring for every broadcast in this frame's events.
    pub fn observe(&mut self, events: &[SimulationEvent]) {
        for event in events {
            if let EventKind::MessageBroadcast { origin, .. } = &event.kind {
                self.effects.push(BroadcastEffect {
                    x: origin.x,
                    y: origin.y,
                    radius: 0.0,
                    alpha: 1.0,
                });
            }
        }
    }

    /// Ages every ring one frame and drops the fully faded ones.
    pub fn decay(&mut self) {
        for effect in &mut self.effects {
            effect.radius += RADIUS_STEP;
            effect.alpha -= ALPHA_STEP;
        }
        self.effects.retain(|e| e.alpha > 0.0);
    }

    /// The rings still visible.
    pub fn active(&self) -> &[BroadcastEffect] {
        &self.effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use v2x_core::{Intent, Simulation};

    fn broadcast_events() -> Vec<SimulationEvent> {
        let mut sim = Simulation::new(42);
        sim.apply(Intent::TriggerEmergency).unwrap();
        sim.drain_events()
    }

    #[test]
    fn test_broadcast_spawns_ring_at_sender() {
        let mut tracker = EffectTracker::new();
        tracker.observe(&broadcast_events());

        assert_eq!(tracker.active().len(), 1);
        let ring = tracker.active()[0];
        assert_eq!((ring.x, ring.y), (100.0, 200.0));
        assert_eq!(ring.alpha, 1.0);
    }

    #[test]
    fn test_ring_fades_out_after_fifty_frames() {
        let mut tracker = EffectTracker::new();
        tracker.observe(&broadcast_events());

        for _ in 0..49 {
            tracker.decay();
        }
        assert_eq!(tracker.active().len(), 1);
        assert!(tracker.active()[0].radius > 0.0);

        tracker.decay();
        tracker.decay();
        assert!(tracker.active().is_empty());
    }

    #[test]
    fn test_non_broadcast_events_spawn_nothing() {
        let mut sim = Simulation::new(42);
        sim.tick(Duration::from_millis(16));
        let mut tracker = EffectTracker::new();
        tracker.observe(&sim.drain_events());
        assert!(tracker.active().is_empty());
    }
}

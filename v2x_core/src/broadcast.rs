//! Emergency-brake message fan-out.
//!
//! The broadcaster decides, at send time, which vehicles a message
//! reaches and when each copy lands. Decisions are fire-and-forget: a
//! receiver that later drives out of range still gets its scheduled
//! copy, and one outside the range at send time never does.

use crate::config::SimulationConfig;
use crate::message::{EmergencyPayload, Message, MessageKind};
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::vehicle::{Vehicle, VehicleStatus};
use crate::CoreError;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::time::Duration;
use v2x_env::VehicleId;

/// Result of a trigger/broadcast: the message sent, who got a scheduled
/// copy and who was out of range.
#[derive(Debug, Clone)]
pub struct BroadcastSummary {
    /// The message that was fanned out
    pub message: Message,

    /// Receivers with a delivery scheduled
    pub scheduled: Vec<VehicleId>,

    /// Receivers outside the transmission range at send time
    pub skipped: Vec<VehicleId>,
}

/// Result of applying one delivery to a receiver.
#[derive(Debug, Clone, Copy)]
pub struct DeliveryOutcome {
    /// The receiver that reacted
    pub receiver: VehicleId,

    /// Deceleration magnitude applied (m/s²)
    pub deceleration_mps2: f64,
}

/// Fans triggered alerts out to in-range vehicles after a randomized delay.
///
/// Owns the only RNG in the core; with a fixed seed the jitter and
/// response draws replay exactly.
pub struct Broadcaster {
    rng: ChaCha8Rng,
}

impl Broadcaster {
    /// Creates a broadcaster with an externally derived RNG.
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self { rng }
    }

    /// Creates a broadcaster seeded directly (tests, standalone use).
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Puts `sender` into an emergency stop and broadcasts the EEBL alert.
    ///
    /// The sender's state changes synchronously, before any delivery is
    /// scheduled, let alone delivered.
    pub fn trigger(
        &mut self,
        sender: VehicleId,
        vehicles: &mut [Vehicle],
        config: &SimulationConfig,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> Result<BroadcastSummary, CoreError> {
        let vehicle = vehicles
            .iter_mut()
            .find(|v| v.id == sender)
            .ok_or(CoreError::UnknownVehicle(sender))?;

        vehicle.emergency_braking = true;
        vehicle.acceleration_mps2 = -config.limits.emergency_deceleration;
        vehicle.status = VehicleStatus::EmergencyBraking;

        let message = Message::eebl(
            sender,
            now,
            EmergencyPayload {
                emergency_braking: true,
                deceleration_mps2: config.limits.emergency_deceleration,
                position: vehicle.position,
                speed_kmh: vehicle.speed_kmh,
            },
        );

        let (scheduled, skipped) = self.broadcast(&message, vehicles, config, scheduler, now);

        Ok(BroadcastSummary {
            message,
            scheduled,
            skipped,
        })
    }

    /// Schedules one independent delivery per in-range receiver at
    /// `now + latency + jitter`, jitter uniform in `[0, jitter_max_ms)`.
    ///
    /// Returns (scheduled, skipped). There is no delivery-order guarantee
    /// across receivers and no retry for skipped ones.
    pub fn broadcast(
        &mut self,
        message: &Message,
        vehicles: &[Vehicle],
        config: &SimulationConfig,
        scheduler: &mut Scheduler,
        now: Duration,
    ) -> (Vec<VehicleId>, Vec<VehicleId>) {
        let mut scheduled = Vec::new();
        let mut skipped = Vec::new();

        for vehicle in vehicles.iter().filter(|v| v.id != message.sender) {
            let distance = (vehicle.position - message.payload.position).norm();
            if distance > config.transmission_range {
                skipped.push(vehicle.id);
                continue;
            }

            let jitter_ms: f64 = self.rng.gen_range(0.0..config.jitter_max_ms);
            let delay = Duration::from_secs_f64((config.latency_ms + jitter_ms) / 1000.0);
            scheduler.schedule(
                now + delay,
                ScheduledAction::Deliver {
                    receiver: vehicle.id,
                    message: message.clone(),
                },
            );
            scheduled.push(vehicle.id);
        }

        (scheduled, skipped)
    }

    /// Applies a due delivery to its receiver.
    ///
    /// Only an EEBL with the emergency flag set has any effect, and a
    /// vehicle already braking is not re-triggered; repeat deliveries
    /// leave its deceleration untouched.
    pub fn deliver(
        &mut self,
        receiver: &mut Vehicle,
        message: &Message,
        config: &SimulationConfig,
    ) -> Option<DeliveryOutcome> {
        if message.kind != MessageKind::Eebl || !message.payload.emergency_braking {
            return None;
        }
        if receiver.emergency_braking {
            return None;
        }

        let response_factor: f64 = self.rng.gen_range(0.8..1.2);
        let deceleration = (config.limits.comfort_deceleration * response_factor)
            .min(config.limits.max_deceleration);

        receiver.acceleration_mps2 = -deceleration;
        receiver.emergency_braking = true;
        receiver.status = VehicleStatus::EmergencyResponse;

        Some(DeliveryOutcome {
            receiver: receiver.id,
            deceleration_mps2: deceleration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector2;

    fn fleet() -> Vec<Vehicle> {
        vec![
            Vehicle::new(VehicleId(1), Vector2::new(100.0, 200.0), 60.0),
            Vehicle::new(VehicleId(2), Vector2::new(200.0, 200.0), 55.0),
            Vehicle::new(VehicleId(3), Vector2::new(300.0, 200.0), 50.0),
        ]
    }

    #[test]
    fn test_trigger_marks_sender_synchronously() {
        let mut vehicles = fleet();
        let config = SimulationConfig::default();
        let mut scheduler = Scheduler::new();
        let mut broadcaster = Broadcaster::from_seed(7);

        let summary = broadcaster
            .trigger(
                VehicleId(1),
                &mut vehicles,
                &config,
                &mut scheduler,
                Duration::ZERO,
            )
            .unwrap();

        // Sender state changed before any delivery fired.
        assert!(vehicles[0].emergency_braking);
        assert_eq!(vehicles[0].status, VehicleStatus::EmergencyBraking);
        assert_eq!(
            vehicles[0].acceleration_mps2,
            -config.limits.emergency_deceleration
        );

        // Default geometry: both others are within 300 units of V1.
        assert_eq!(summary.scheduled, vec![VehicleId(2), VehicleId(3)]);
        assert!(summary.skipped.is_empty());
        assert_eq!(scheduler.pending(), 2);

        // No receiver has reacted yet.
        assert!(!vehicles[1].emergency_braking);
        assert!(!vehicles[2].emergency_braking);
    }

    #[test]
    fn test_out_of_range_receiver_is_skipped() {
        let mut vehicles = fleet();
        vehicles[2].position = Vector2::new(600.0, 200.0); // 500 > 300 from V1
        let config = SimulationConfig::default();
        let mut scheduler = Scheduler::new();
        let mut broadcaster = Broadcaster::from_seed(7);

        let summary = broadcaster
            .trigger(
                VehicleId(1),
                &mut vehicles,
                &config,
                &mut scheduler,
                Duration::ZERO,
            )
            .unwrap();

        assert_eq!(summary.scheduled, vec![VehicleId(2)]);
        assert_eq!(summary.skipped, vec![VehicleId(3)]);
        assert_eq!(scheduler.pending(), 1);
    }

    #[test]
    fn test_delivery_delay_within_jitter_bound() {
        let mut vehicles = fleet();
        let config = SimulationConfig::default();
        let mut scheduler = Scheduler::new();
        let mut broadcaster = Broadcaster::from_seed(7);

        broadcaster
            .trigger(
                VehicleId(1),
                &mut vehicles,
                &config,
                &mut scheduler,
                Duration::ZERO,
            )
            .unwrap();

        let min = Duration::from_secs_f64(config.latency_ms / 1000.0);
        let max =
            Duration::from_secs_f64((config.latency_ms + config.jitter_max_ms) / 1000.0);
        let due = scheduler.next_due().unwrap();
        assert!(due >= min && due < max, "due {:?} outside [{:?}, {:?})", due, min, max);
    }

    #[test]
    fn test_deliver_applies_comfort_deceleration() {
        let mut vehicles = fleet();
        let config = SimulationConfig::default();
        let mut broadcaster = Broadcaster::from_seed(7);
        let message = Message::eebl(
            VehicleId(1),
            Duration::ZERO,
            EmergencyPayload {
                emergency_braking: true,
                deceleration_mps2: config.limits.emergency_deceleration,
                position: Vector2::new(100.0, 200.0),
                speed_kmh: 60.0,
            },
        );

        let outcome = broadcaster
            .deliver(&mut vehicles[1], &message, &config)
            .unwrap();

        let lo = config.limits.comfort_deceleration * 0.8;
        let hi = config.limits.comfort_deceleration * 1.2;
        assert!(outcome.deceleration_mps2 >= lo && outcome.deceleration_mps2 <= hi);
        assert!(outcome.deceleration_mps2 <= config.limits.max_deceleration);
        assert!(vehicles[1].emergency_braking);
        assert_eq!(vehicles[1].status, VehicleStatus::EmergencyResponse);
    }

    #[test]
    fn test_repeat_delivery_is_idempotent() {
        let mut vehicles = fleet();
        let config = SimulationConfig::default();
        let mut broadcaster = Broadcaster::from_seed(7);
        let message = Message::eebl(
            VehicleId(1),
            Duration::ZERO,
            EmergencyPayload {
                emergency_braking: true,
                deceleration_mps2: config.limits.emergency_deceleration,
                position: Vector2::new(100.0, 200.0),
                speed_kmh: 60.0,
            },
        );

        broadcaster.deliver(&mut vehicles[1], &message, &config);
        let applied = vehicles[1].acceleration_mps2;

        assert!(broadcaster
            .deliver(&mut vehicles[1], &message, &config)
            .is_none());
        assert_eq!(vehicles[1].acceleration_mps2, applied);
        assert_eq!(vehicles[1].status, VehicleStatus::EmergencyResponse);
    }

    #[test]
    fn test_same_seed_same_fanout() {
        let config = SimulationConfig::default();

        let run = |seed: u64| {
            let mut vehicles = fleet();
            let mut scheduler = Scheduler::new();
            let mut broadcaster = Broadcaster::from_seed(seed);
            broadcaster
                .trigger(
                    VehicleId(1),
                    &mut vehicles,
                    &config,
                    &mut scheduler,
                    Duration::ZERO,
                )
                .unwrap();
            scheduler.next_due().unwrap()
        };

        assert_eq!(run(42), run(42));
    }
}

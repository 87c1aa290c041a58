//! Scheduled-event queue for delayed deliveries and timers.
//!
//! Replaces free-running callbacks with explicit (due, payload) entries
//! drained between ticks, so delivery timing is deterministic and a
//! reset cannot be mutated by a stale timer.

use crate::message::Message;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Duration;
use v2x_env::VehicleId;

/// An action to perform when its entry comes due.
#[derive(Debug, Clone)]
pub enum ScheduledAction {
    /// Deliver a broadcast message to one receiver
    Deliver {
        receiver: VehicleId,
        message: Message,
    },

    /// Re-arm the emergency trigger after its cooldown
    RearmTrigger,
}

#[derive(Debug, Clone)]
struct Entry {
    due: Duration,
    seq: u64,
    epoch: u64,
    action: ScheduledAction,
}

// Ordered by (due, seq); seq is unique, so the order is total and FIFO
// among entries scheduled for the same instant.
impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.due == other.due && self.seq == other.seq
    }
}

impl Eq for Entry {}

impl PartialOrd for Entry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Entry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reversed: BinaryHeap is a max-heap, we want the earliest entry on top.
        other
            .due
            .cmp(&self.due)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Min-heap of scheduled actions, guarded by a generation counter.
///
/// `cancel_all` bumps the generation; entries from an older generation
/// are discarded at pop time rather than executed, so a callback
/// scheduled before a reset can never touch the reinitialized fleet.
#[derive(Debug, Default)]
pub struct Scheduler {
    heap: BinaryHeap<Entry>,
    next_seq: u64,
    epoch: u64,
}

impl Scheduler {
    /// Creates an empty scheduler.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules an action to fire at `due` (simulation time).
    pub fn schedule(&mut self, due: Duration, action: ScheduledAction) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Entry {
            due,
            seq,
            epoch: self.epoch,
            action,
        });
    }

    /// Pops the next action due at or before `now`, discarding any
    /// stale-generation entries it encounters.
    pub fn pop_due(&mut self, now: Duration) -> Option<ScheduledAction> {
        while let Some(entry) = self.heap.peek() {
            if entry.epoch != self.epoch {
                self.heap.pop();
                continue;
            }
            if entry.due > now {
                return None;
            }
            return self.heap.pop().map(|e| e.action);
        }
        None
    }

    /// Returns the due time of the next live entry, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.heap
            .iter()
            .filter(|e| e.epoch == self.epoch)
            .map(|e| e.due)
            .min()
    }

    /// Number of live (current-generation) entries.
    pub fn pending(&self) -> usize {
        self.heap.iter().filter(|e| e.epoch == self.epoch).count()
    }

    /// Cancels everything: clears the heap and bumps the generation.
    pub fn cancel_all(&mut self) {
        self.heap.clear();
        self.epoch += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_pops_in_due_order() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(at_ms(70), ScheduledAction::RearmTrigger);
        scheduler.schedule(at_ms(50), ScheduledAction::RearmTrigger);
        scheduler.schedule(at_ms(60), ScheduledAction::RearmTrigger);

        assert_eq!(scheduler.next_due(), Some(at_ms(50)));
        assert!(scheduler.pop_due(at_ms(40)).is_none());

        // All three due by t=100, drained earliest-first.
        assert!(scheduler.pop_due(at_ms(100)).is_some());
        assert_eq!(scheduler.next_due(), Some(at_ms(60)));
        assert!(scheduler.pop_due(at_ms(100)).is_some());
        assert!(scheduler.pop_due(at_ms(100)).is_some());
        assert!(scheduler.pop_due(at_ms(100)).is_none());
    }

    #[test]
    fn test_same_instant_is_fifo() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(
            at_ms(50),
            ScheduledAction::Deliver {
                receiver: VehicleId(2),
                message: test_message(),
            },
        );
        scheduler.schedule(at_ms(50), ScheduledAction::RearmTrigger);

        match scheduler.pop_due(at_ms(50)) {
            Some(ScheduledAction::Deliver { receiver, .. }) => assert_eq!(receiver, VehicleId(2)),
            other => panic!("expected first-scheduled delivery, got {:?}", other),
        }
    }

    #[test]
    fn test_cancel_all_discards_pending() {
        let mut scheduler = Scheduler::new();
        scheduler.schedule(at_ms(50), ScheduledAction::RearmTrigger);
        scheduler.schedule(at_ms(60), ScheduledAction::RearmTrigger);
        assert_eq!(scheduler.pending(), 2);

        scheduler.cancel_all();

        assert_eq!(scheduler.pending(), 0);
        assert!(scheduler.pop_due(at_ms(1000)).is_none());

        // The queue keeps working in the new generation.
        scheduler.schedule(at_ms(70), ScheduledAction::RearmTrigger);
        assert!(scheduler.pop_due(at_ms(70)).is_some());
    }

    fn test_message() -> Message {
        use crate::message::{EmergencyPayload, Message};
        use nalgebra::Vector2;

        Message::eebl(
            VehicleId(1),
            Duration::ZERO,
            EmergencyPayload {
                emergency_braking: true,
                deceleration_mps2: 7.0,
                position: Vector2::new(100.0, 200.0),
                speed_kmh: 60.0,
            },
        )
    }
}

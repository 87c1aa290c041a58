//! JSON exporter for offline visualization.
//!
//! Exports simulation frames as JSON so an external viewer can replay a
//! run: vehicle poses, broadcast rings, and a human-readable event log.

use crate::effects::BroadcastEffect;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use v2x_core::{EventKind, SimulationEvent, Vehicle};

/// Pose and status of one vehicle at a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleFrame {
    pub id: u32,
    pub x: f64,
    pub y: f64,
    pub speed_kmh: f64,
    /// Deceleration magnitude for the status panel (m/s²)
    pub deceleration_mps2: f64,
    pub status: String,
}

impl From<&Vehicle> for VehicleFrame {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            id: vehicle.id.as_u32(),
            x: vehicle.position.x,
            y: vehicle.position.y,
            speed_kmh: vehicle.speed_kmh,
            deceleration_mps2: vehicle.acceleration_mps2.abs(),
            status: vehicle.status.to_string(),
        }
    }
}

/// One broadcast ring at a frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectFrame {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub alpha: f64,
}

impl From<&BroadcastEffect> for EffectFrame {
    fn from(effect: &BroadcastEffect) -> Self {
        Self {
            x: effect.x,
            y: effect.y,
            radius: effect.radius,
            alpha: effect.alpha,
        }
    }
}

/// A single frame of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimFrame {
    /// Simulation time in seconds
    pub time_sec: f64,

    /// The full fleet
    pub vehicles: Vec<VehicleFrame>,

    /// Active broadcast rings
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub effects: Vec<EffectFrame>,

    /// Event log lines emitted since the previous frame
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<String>,
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Duration in seconds
    pub duration_sec: f64,

    /// All frames
    pub frames: Vec<SimFrame>,

    /// Final result
    pub passed: bool,
}

impl SimExport {
    /// Creates a new export container.
    pub fn new(scenario: &str, seed: u64) -> Self {
        Self {
            scenario: scenario.to_string(),
            seed,
            duration_sec: 0.0,
            frames: Vec::new(),
            passed: false,
        }
    }

    /// Adds a frame.
    pub fn add_frame(&mut self, frame: SimFrame) {
        self.duration_sec = frame.time_sec;
        self.frames.push(frame);
    }

    /// Finalizes the export.
    pub fn finalize(&mut self, passed: bool) {
        self.passed = passed;
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }
}

/// Renders an event as the log line the message panel shows.
pub fn event_label(event: &SimulationEvent) -> String {
    match &event.kind {
        EventKind::TargetSpeedChanged { vehicle, kmh } => {
            format!("Vehicle {} target speed set to {} km/h", vehicle.as_u32(), kmh)
        }
        EventKind::EmergencyTriggered { vehicle } => {
            format!("EMERGENCY: Vehicle {} applying emergency brakes!", vehicle.as_u32())
        }
        EventKind::MessageBroadcast { sender, kind, receivers, .. } => {
            format!(
                "Vehicle {} broadcast {} to {} vehicle(s)",
                sender.as_u32(),
                kind,
                receivers.len()
            )
        }
        EventKind::MessageDelivered { receiver, .. } => {
            format!(
                "Vehicle {} received EEBL message - applying brakes",
                receiver.as_u32()
            )
        }
        EventKind::VehicleStopped { vehicle } => {
            format!("Vehicle {} stopped", vehicle.as_u32())
        }
        EventKind::VehicleRepositioned { vehicle } => {
            format!("Vehicle {} repositioned", vehicle.as_u32())
        }
        EventKind::RangeChanged { meters } => {
            format!("Transmission range set to {} m", meters)
        }
        EventKind::LatencyChanged { ms } => format!("Latency set to {} ms", ms),
        EventKind::TriggerRearmed => "Emergency trigger re-armed".to_string(),
        EventKind::Paused => "Simulation paused".to_string(),
        EventKind::Resumed => "Simulation resumed".to_string(),
        EventKind::SimulationReset => "Simulation reset".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use v2x_core::{Intent, Simulation};

    #[test]
    fn test_frame_round_trips_through_json() {
        let mut sim = Simulation::new(42);
        sim.apply(Intent::TriggerEmergency).unwrap();
        sim.tick(Duration::from_millis(16));

        let snapshot = sim.snapshot();
        let frame = SimFrame {
            time_sec: snapshot.elapsed.as_secs_f64(),
            vehicles: snapshot.vehicles.iter().map(VehicleFrame::from).collect(),
            effects: Vec::new(),
            events: sim.drain_events().iter().map(event_label).collect(),
        };

        let json = serde_json::to_string(&frame).unwrap();
        let back: SimFrame = serde_json::from_str(&json).unwrap();
        assert_eq!(back.vehicles.len(), 3);
        assert_eq!(back.vehicles[0].status, "Emergency Braking");
        assert!(back
            .events
            .iter()
            .any(|e| e.contains("EMERGENCY: Vehicle 1")));
    }

    #[test]
    fn test_export_accumulates_duration() {
        let mut export = SimExport::new("emergency_chain", 42);
        export.add_frame(SimFrame {
            time_sec: 0.5,
            vehicles: Vec::new(),
            effects: Vec::new(),
            events: Vec::new(),
        });
        export.add_frame(SimFrame {
            time_sec: 1.0,
            vehicles: Vec::new(),
            effects: Vec::new(),
            events: Vec::new(),
        });
        export.finalize(true);

        assert_eq!(export.duration_sec, 1.0);
        assert_eq!(export.frames.len(), 2);
        assert!(export.passed);
    }
}

//! Common types for the environment abstraction.

use serde::{Deserialize, Serialize};

/// Unique identifier for a vehicle within a simulation run.
///
/// Small positive integers, assigned in fleet order starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VehicleId(pub u32);

impl VehicleId {
    /// Creates a VehicleId from a zero-based fleet index.
    pub fn from_index(index: usize) -> Self {
        Self(index as u32 + 1)
    }

    /// Returns the zero-based fleet index.
    pub fn index(&self) -> usize {
        (self.0 - 1) as usize
    }

    /// Returns the raw identifier.
    pub fn as_u32(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for VehicleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vehicle_id_index_round_trip() {
        let id = VehicleId::from_index(0);
        assert_eq!(id, VehicleId(1));
        assert_eq!(id.index(), 0);
        assert_eq!(id.to_string(), "V1");
    }
}

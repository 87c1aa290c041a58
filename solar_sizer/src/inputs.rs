//! Calculator inputs.

use serde::{Deserialize, Serialize};

/// Grid relationship of the proposed system.
///
/// Battery costs apply only to the battery-backed types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SystemType {
    /// Grid-tied, no storage
    GridTied,

    /// Fully independent, battery-backed
    OffGrid,

    /// Grid-tied with battery backup
    Hybrid,
}

impl SystemType {
    /// True for the battery-backed types.
    pub fn has_battery(&self) -> bool {
        matches!(self, SystemType::OffGrid | SystemType::Hybrid)
    }
}

impl std::str::FromStr for SystemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "grid-tied" | "grid_tied" | "grid" => Ok(SystemType::GridTied),
            "off-grid" | "off_grid" | "offgrid" => Ok(SystemType::OffGrid),
            "hybrid" => Ok(SystemType::Hybrid),
            _ => Err(format!("Unknown system type: {}", s)),
        }
    }
}

/// All slider/form inputs to the calculator.
///
/// Defaults match the calculator's initial slider positions, with the
/// New York solar resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingInputs {
    /// Household consumption (kWh/day)
    pub daily_consumption_kwh: f64,

    /// Available roof area (m²)
    pub roof_area_m2: f64,

    /// Utility rate ($/kWh)
    pub electricity_rate: f64,

    /// Battery bank capacity (kWh), priced only for battery-backed types
    pub battery_capacity_kwh: f64,

    /// Panel conversion efficiency (%)
    pub panel_efficiency_pct: f64,

    /// System losses: wiring, inverter, soiling (%)
    pub system_losses_pct: f64,

    /// Panel price ($/W)
    pub panel_cost_per_watt: f64,

    /// Battery price ($/kWh)
    pub battery_cost_per_kwh: f64,

    /// Solar resource (kWh/m²/day), a.k.a. peak sun hours
    pub irradiance: f64,

    /// Grid relationship
    pub system_type: SystemType,
}

impl Default for SizingInputs {
    fn default() -> Self {
        Self {
            daily_consumption_kwh: 30.0,
            roof_area_m2: 100.0,
            electricity_rate: 0.12,
            battery_capacity_kwh: 10.0,
            panel_efficiency_pct: 20.0,
            system_losses_pct: 15.0,
            panel_cost_per_watt: 0.40,
            battery_cost_per_kwh: 500.0,
            irradiance: 4.5,
            system_type: SystemType::GridTied,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_type_parsing() {
        assert_eq!("grid-tied".parse::<SystemType>(), Ok(SystemType::GridTied));
        assert_eq!("off-grid".parse::<SystemType>(), Ok(SystemType::OffGrid));
        assert_eq!("HYBRID".parse::<SystemType>(), Ok(SystemType::Hybrid));
        assert!("diesel".parse::<SystemType>().is_err());
    }

    #[test]
    fn test_battery_applicability() {
        assert!(!SystemType::GridTied.has_battery());
        assert!(SystemType::OffGrid.has_battery());
        assert!(SystemType::Hybrid.has_battery());
    }
}

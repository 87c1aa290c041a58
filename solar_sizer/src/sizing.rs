//! The sizing calculation.

use crate::error::SizingError;
use crate::inputs::SizingInputs;
use serde::{Deserialize, Serialize};

/// Footprint of one panel (m²).
pub const PANEL_AREA_M2: f64 = 2.0;

/// Standard test condition irradiance (kW/m²); panel wattage is the
/// panel footprint times its efficiency at STC.
const STC_KW_PER_M2: f64 = 1.0;

/// Inverter cost ($/W).
const INVERTER_COST_PER_W: f64 = 0.15;

/// Installation labor ($/W).
const INSTALLATION_COST_PER_W: f64 = 0.50;

/// Mounting, wiring, permitting ($/W).
const BALANCE_OF_SYSTEM_COST_PER_W: f64 = 0.25;

/// Amortization horizon for LCOE (years).
pub const SYSTEM_LIFETIME_YEARS: f64 = 25.0;

const DAYS_PER_YEAR: f64 = 365.0;

/// Installed-cost breakdown ($).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub panels: f64,
    pub inverter: f64,
    pub installation: f64,
    pub balance_of_system: f64,
    pub battery: f64,
}

impl CostBreakdown {
    /// Total installed cost ($).
    pub fn total(&self) -> f64 {
        self.panels + self.inverter + self.installation + self.balance_of_system + self.battery
    }
}

/// Output of [`size`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingResult {
    /// Installed DC capacity (kW)
    pub system_size_kw: f64,

    /// Number of panels
    pub panel_count: u32,

    /// Rating of the chosen panel (kW)
    pub panel_wattage_kw: f64,

    /// Roof area the unconstrained design would need (m²)
    pub required_area_m2: f64,

    /// The roof could not fit the unconstrained design
    pub area_constrained: bool,

    /// Consumption not met by the constrained system (kWh/day, 0 when
    /// unconstrained)
    pub energy_deficit_kwh_per_day: f64,

    /// Annual production (kWh)
    pub annual_production_kwh: f64,

    /// Annual utility-bill savings ($)
    pub annual_savings_usd: f64,

    /// Cost breakdown ($)
    pub costs: CostBreakdown,

    /// Total installed cost ($)
    pub total_cost_usd: f64,

    /// Years to recoup the investment; `None` when savings are zero
    /// (the display shows a placeholder, never infinity)
    pub payback_years: Option<f64>,

    /// Levelized cost of energy over the system lifetime ($/kWh)
    pub lcoe_usd_per_kwh: f64,
}

fn check_finite_non_negative(field: &'static str, value: f64) -> Result<(), SizingError> {
    if !value.is_finite() || value < 0.0 {
        return Err(SizingError::InvalidInput { field, value });
    }
    Ok(())
}

fn validate(inputs: &SizingInputs) -> Result<(), SizingError> {
    check_finite_non_negative("daily_consumption_kwh", inputs.daily_consumption_kwh)?;
    check_finite_non_negative("roof_area_m2", inputs.roof_area_m2)?;
    check_finite_non_negative("electricity_rate", inputs.electricity_rate)?;
    check_finite_non_negative("battery_capacity_kwh", inputs.battery_capacity_kwh)?;
    check_finite_non_negative("panel_cost_per_watt", inputs.panel_cost_per_watt)?;
    check_finite_non_negative("battery_cost_per_kwh", inputs.battery_cost_per_kwh)?;

    if !inputs.panel_efficiency_pct.is_finite()
        || inputs.panel_efficiency_pct <= 0.0
        || inputs.panel_efficiency_pct > 100.0
    {
        return Err(SizingError::InvalidInput {
            field: "panel_efficiency_pct",
            value: inputs.panel_efficiency_pct,
        });
    }
    if !inputs.system_losses_pct.is_finite()
        || !(0.0..100.0).contains(&inputs.system_losses_pct)
    {
        return Err(SizingError::InvalidInput {
            field: "system_losses_pct",
            value: inputs.system_losses_pct,
        });
    }
    if !inputs.irradiance.is_finite() {
        return Err(SizingError::InvalidInput {
            field: "irradiance",
            value: inputs.irradiance,
        });
    }
    if inputs.irradiance <= 0.0 {
        return Err(SizingError::ZeroIrradiance);
    }
    Ok(())
}

/// Sizes a system for the given inputs.
///
/// When the unconstrained design outgrows the roof, the panel count is
/// clamped to what fits, production is recomputed, and the shortfall is
/// reported as an energy deficit rather than a failure. A system that
/// cannot produce at all (e.g. a roof too small for a single panel) is
/// [`SizingError::NoProduction`], since payback and LCOE would divide
/// by zero.
///
/// Deterministic and pure: same inputs, same result.
pub fn size(inputs: &SizingInputs) -> Result<SizingResult, SizingError> {
    validate(inputs)?;

    let system_efficiency = (100.0 - inputs.system_losses_pct) / 100.0;
    let required_kw =
        inputs.daily_consumption_kwh / (inputs.irradiance * system_efficiency);

    let panel_wattage_kw = PANEL_AREA_M2 * (inputs.panel_efficiency_pct / 100.0) * STC_KW_PER_M2;
    let unconstrained_count = (required_kw / panel_wattage_kw).ceil() as u32;
    let required_area = unconstrained_count as f64 * PANEL_AREA_M2;
    let area_constrained = required_area > inputs.roof_area_m2;

    let (system_size_kw, panel_count, daily_production, deficit) = if area_constrained {
        let max_panels = (inputs.roof_area_m2 / PANEL_AREA_M2).floor() as u32;
        let actual_kw = max_panels as f64 * panel_wattage_kw;
        let daily = actual_kw * inputs.irradiance * system_efficiency;
        (
            actual_kw,
            max_panels,
            daily,
            inputs.daily_consumption_kwh - daily,
        )
    } else {
        (
            required_kw,
            unconstrained_count,
            inputs.daily_consumption_kwh,
            0.0,
        )
    };

    let annual_production = daily_production * DAYS_PER_YEAR;
    if annual_production <= 0.0 {
        return Err(SizingError::NoProduction);
    }

    let system_watts = system_size_kw * 1000.0;
    let costs = CostBreakdown {
        panels: panel_count as f64 * (panel_wattage_kw * 1000.0) * inputs.panel_cost_per_watt,
        inverter: system_watts * INVERTER_COST_PER_W,
        installation: system_watts * INSTALLATION_COST_PER_W,
        balance_of_system: system_watts * BALANCE_OF_SYSTEM_COST_PER_W,
        battery: if inputs.system_type.has_battery() {
            inputs.battery_capacity_kwh * inputs.battery_cost_per_kwh
        } else {
            0.0
        },
    };
    let total_cost = costs.total();

    let annual_savings = annual_production * inputs.electricity_rate;
    let payback_years = if annual_savings > 0.0 {
        Some(total_cost / annual_savings)
    } else {
        None
    };
    let lcoe = total_cost / (annual_production * SYSTEM_LIFETIME_YEARS);

    Ok(SizingResult {
        system_size_kw,
        panel_count,
        panel_wattage_kw,
        required_area_m2: required_area,
        area_constrained,
        energy_deficit_kwh_per_day: deficit,
        annual_production_kwh: annual_production,
        annual_savings_usd: annual_savings,
        costs,
        total_cost_usd: total_cost,
        payback_years,
        lcoe_usd_per_kwh: lcoe,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::SystemType;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_baseline_sizing() {
        // 30 kWh/day, 4.5 sun hours, 15% losses, 20% panels.
        let result = size(&SizingInputs::default()).unwrap();

        assert_relative_eq!(result.system_size_kw, 30.0 / (4.5 * 0.85), epsilon = 1e-9);
        assert_relative_eq!(result.panel_wattage_kw, 0.4);
        assert_eq!(result.panel_count, 20); // ceil(7.843 / 0.4)
        assert!(!result.area_constrained);
        assert_eq!(result.energy_deficit_kwh_per_day, 0.0);
        assert_relative_eq!(result.annual_production_kwh, 30.0 * 365.0);

        // 20 panels of 400 W at $0.40/W.
        assert_relative_eq!(result.costs.panels, 3200.0);
        assert_eq!(result.costs.battery, 0.0);
        assert_relative_eq!(result.annual_savings_usd, 10950.0 * 0.12);
        let payback = result.payback_years.unwrap();
        assert_relative_eq!(payback, result.total_cost_usd / result.annual_savings_usd);
        assert_relative_eq!(
            result.lcoe_usd_per_kwh,
            result.total_cost_usd / (10950.0 * 25.0)
        );
    }

    #[test]
    fn test_roof_constraint_reports_deficit() {
        let inputs = SizingInputs {
            roof_area_m2: 10.0,
            ..SizingInputs::default()
        };
        let result = size(&inputs).unwrap();

        // 5 panels fit; the unconstrained design wanted 20.
        assert!(result.area_constrained);
        assert_eq!(result.panel_count, 5);
        assert!(result.required_area_m2 > inputs.roof_area_m2);
        assert_relative_eq!(result.system_size_kw, 2.0);
        assert!(result.energy_deficit_kwh_per_day > 0.0);
        assert_relative_eq!(
            result.energy_deficit_kwh_per_day,
            30.0 - 2.0 * 4.5 * 0.85
        );
    }

    #[test]
    fn test_battery_costed_only_when_backed() {
        let grid = size(&SizingInputs::default()).unwrap();
        let off_grid = size(&SizingInputs {
            system_type: SystemType::OffGrid,
            ..SizingInputs::default()
        })
        .unwrap();
        let hybrid = size(&SizingInputs {
            system_type: SystemType::Hybrid,
            ..SizingInputs::default()
        })
        .unwrap();

        assert_eq!(grid.costs.battery, 0.0);
        assert_relative_eq!(off_grid.costs.battery, 10.0 * 500.0);
        assert_relative_eq!(hybrid.costs.battery, off_grid.costs.battery);
        assert_relative_eq!(
            hybrid.total_cost_usd,
            grid.total_cost_usd + hybrid.costs.battery
        );
    }

    #[test]
    fn test_zero_irradiance_is_an_error() {
        let inputs = SizingInputs {
            irradiance: 0.0,
            ..SizingInputs::default()
        };
        assert_eq!(size(&inputs), Err(SizingError::ZeroIrradiance));
    }

    #[test]
    fn test_tiny_roof_is_no_production() {
        let inputs = SizingInputs {
            roof_area_m2: 1.0, // not even one panel
            ..SizingInputs::default()
        };
        assert_eq!(size(&inputs), Err(SizingError::NoProduction));
    }

    #[test]
    fn test_zero_rate_gives_payback_marker() {
        let inputs = SizingInputs {
            electricity_rate: 0.0,
            ..SizingInputs::default()
        };
        let result = size(&inputs).unwrap();
        assert_eq!(result.payback_years, None);
        assert!(result.lcoe_usd_per_kwh.is_finite());
    }

    #[test]
    fn test_non_finite_input_rejected() {
        let inputs = SizingInputs {
            daily_consumption_kwh: f64::NAN,
            ..SizingInputs::default()
        };
        assert!(matches!(
            size(&inputs),
            Err(SizingError::InvalidInput { field: "daily_consumption_kwh", .. })
        ));
    }

    fn arb_inputs() -> impl Strategy<Value = SizingInputs> {
        (
            1.0..120.0f64,   // daily consumption
            4.0..400.0f64,   // roof area
            0.01..1.0f64,    // rate
            0.0..40.0f64,    // battery capacity
            5.0..30.0f64,    // panel efficiency
            0.0..40.0f64,    // losses
            0.1..1.5f64,     // panel $/W
            100.0..900.0f64, // battery $/kWh
            0.5..8.0f64,     // irradiance
            0..3u8,
        )
            .prop_map(
                |(daily, roof, rate, batt_kwh, eff, losses, pcost, bcost, irr, ty)| {
                    SizingInputs {
                        daily_consumption_kwh: daily,
                        roof_area_m2: roof,
                        electricity_rate: rate,
                        battery_capacity_kwh: batt_kwh,
                        panel_efficiency_pct: eff,
                        system_losses_pct: losses,
                        panel_cost_per_watt: pcost,
                        battery_cost_per_kwh: bcost,
                        irradiance: irr,
                        system_type: match ty {
                            0 => SystemType::GridTied,
                            1 => SystemType::OffGrid,
                            _ => SystemType::Hybrid,
                        },
                    }
                },
            )
    }

    proptest! {
        #[test]
        fn prop_size_is_deterministic(inputs in arb_inputs()) {
            prop_assert_eq!(size(&inputs), size(&inputs));
        }

        #[test]
        fn prop_deficit_zero_iff_unconstrained(inputs in arb_inputs()) {
            if let Ok(result) = size(&inputs) {
                if result.area_constrained {
                    prop_assert!(result.energy_deficit_kwh_per_day > 0.0);
                    prop_assert!(result.required_area_m2 > inputs.roof_area_m2);
                } else {
                    prop_assert_eq!(result.energy_deficit_kwh_per_day, 0.0);
                }
            }
        }

        #[test]
        fn prop_results_are_finite(inputs in arb_inputs()) {
            if let Ok(result) = size(&inputs) {
                prop_assert!(result.system_size_kw.is_finite());
                prop_assert!(result.total_cost_usd.is_finite());
                prop_assert!(result.lcoe_usd_per_kwh.is_finite());
                if let Some(payback) = result.payback_years {
                    prop_assert!(payback.is_finite());
                }
            }
        }
    }
}

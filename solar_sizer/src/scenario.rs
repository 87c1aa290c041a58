//! What-if scenario analysis.
//!
//! Each scenario re-runs [`size`] with exactly one input perturbed and
//! reports the deltas against the baseline. Stateless: neither run
//! touches the other, and the baseline inputs are never modified.

use crate::error::SizingError;
use crate::inputs::{SizingInputs, SystemType};
use crate::sizing::{size, SizingResult};
use serde::{Deserialize, Serialize};

/// The supported what-if perturbations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Panel efficiency +5 percentage points
    PanelEfficiency,

    /// Battery cost halved
    BatteryCost,

    /// Switch to a hybrid (battery-backed) system
    Hybrid,

    /// Electricity rate +25%
    Tariff,
}

impl ScenarioKind {
    /// Returns all scenarios.
    pub fn all() -> Vec<ScenarioKind> {
        vec![
            ScenarioKind::PanelEfficiency,
            ScenarioKind::BatteryCost,
            ScenarioKind::Hybrid,
            ScenarioKind::Tariff,
        ]
    }

    /// Short identifier.
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::PanelEfficiency => "efficiency",
            ScenarioKind::BatteryCost => "battery",
            ScenarioKind::Hybrid => "hybrid",
            ScenarioKind::Tariff => "tariff",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            ScenarioKind::PanelEfficiency => "+5% Panel Efficiency",
            ScenarioKind::BatteryCost => "50% Battery Cost Reduction",
            ScenarioKind::Hybrid => "Add Battery Storage",
            ScenarioKind::Tariff => "+25% Electricity Rate",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for ScenarioKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "efficiency" => Ok(ScenarioKind::PanelEfficiency),
            "battery" => Ok(ScenarioKind::BatteryCost),
            "hybrid" => Ok(ScenarioKind::Hybrid),
            "tariff" => Ok(ScenarioKind::Tariff),
            _ => Err(format!("Unknown scenario: {}", s)),
        }
    }
}

/// Baseline vs. perturbed comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    /// Which perturbation ran
    pub kind: ScenarioKind,

    /// Display label
    pub label: &'static str,

    /// The unperturbed result
    pub baseline: SizingResult,

    /// The perturbed result
    pub scenario: SizingResult,

    /// Total-cost change ($, signed)
    pub cost_delta_usd: f64,

    /// Payback change (years, signed); `None` when either side has no
    /// defined payback
    pub payback_delta_years: Option<f64>,
}

/// Runs one scenario against `baseline` inputs.
pub fn run(baseline: &SizingInputs, kind: ScenarioKind) -> Result<ScenarioReport, SizingError> {
    let mut perturbed = baseline.clone();
    match kind {
        ScenarioKind::PanelEfficiency => perturbed.panel_efficiency_pct += 5.0,
        ScenarioKind::BatteryCost => perturbed.battery_cost_per_kwh *= 0.5,
        ScenarioKind::Hybrid => perturbed.system_type = SystemType::Hybrid,
        ScenarioKind::Tariff => perturbed.electricity_rate *= 1.25,
    }

    let baseline_result = size(baseline)?;
    let scenario_result = size(&perturbed)?;

    let cost_delta = scenario_result.total_cost_usd - baseline_result.total_cost_usd;
    let payback_delta = match (scenario_result.payback_years, baseline_result.payback_years) {
        (Some(s), Some(b)) => Some(s - b),
        _ => None,
    };

    Ok(ScenarioReport {
        kind,
        label: kind.label(),
        baseline: baseline_result,
        scenario: scenario_result,
        cost_delta_usd: cost_delta,
        payback_delta_years: payback_delta,
    })
}

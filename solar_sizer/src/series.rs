//! Chart-ready series derived from a sizing result.
//!
//! Pure data shaping for a presentation layer: a 12-point monthly
//! production/consumption series, a 26-point cumulative-ROI series, and
//! the 5-slice cost breakdown. No rendering here.

use crate::inputs::SizingInputs;
use crate::sizing::SizingResult;
use serde::Serialize;

/// Month labels, chart order.
pub const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Simplified seasonal variation applied to the monthly average.
const MONTHLY_MULTIPLIERS: [f64; 12] = [
    0.7, 0.8, 0.9, 1.0, 1.1, 1.2, 1.2, 1.1, 1.0, 0.9, 0.8, 0.7,
];

/// Billing days per month for the consumption series.
const BILLING_DAYS_PER_MONTH: f64 = 30.0;

/// Years covered by the ROI series (inclusive of year 0).
const ROI_HORIZON_YEARS: u32 = 25;

/// One month of the production/consumption chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyPoint {
    pub month: &'static str,
    pub production_kwh: f64,
    pub consumption_kwh: f64,
}

/// One year of the cumulative-ROI chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoiPoint {
    pub year: u32,
    /// Cumulative savings net of the investment ($, negative until payback)
    pub cumulative_savings_usd: f64,
    /// The flat initial-investment reference line ($, negative)
    pub investment_usd: f64,
}

/// One slice of the cost-breakdown chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSlice {
    pub label: &'static str,
    pub amount_usd: f64,
}

/// Everything the charts need.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSeries {
    pub monthly: Vec<MonthlyPoint>,
    pub roi: Vec<RoiPoint>,
    pub cost_breakdown: Vec<CostSlice>,
}

/// Builds all chart series for a sizing result.
pub fn chart_series(inputs: &SizingInputs, result: &SizingResult) -> ChartSeries {
    let monthly_average = result.annual_production_kwh / 12.0;
    let monthly = MONTH_LABELS
        .iter()
        .zip(MONTHLY_MULTIPLIERS.iter())
        .map(|(&month, &multiplier)| MonthlyPoint {
            month,
            production_kwh: monthly_average * multiplier,
            consumption_kwh: inputs.daily_consumption_kwh * BILLING_DAYS_PER_MONTH,
        })
        .collect();

    let roi = (0..=ROI_HORIZON_YEARS)
        .map(|year| RoiPoint {
            year,
            cumulative_savings_usd: year as f64 * result.annual_savings_usd
                - result.total_cost_usd,
            investment_usd: -result.total_cost_usd,
        })
        .collect();

    let cost_breakdown = vec![
        CostSlice {
            label: "Solar Panels",
            amount_usd: result.costs.panels,
        },
        CostSlice {
            label: "Inverter",
            amount_usd: result.costs.inverter,
        },
        CostSlice {
            label: "Installation",
            amount_usd: result.costs.installation,
        },
        CostSlice {
            label: "Battery",
            amount_usd: result.costs.battery,
        },
        CostSlice {
            label: "Balance of System",
            amount_usd: result.costs.balance_of_system,
        },
    ];

    ChartSeries {
        monthly,
        roi,
        cost_breakdown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sizing::size;
    use approx::assert_relative_eq;

    fn baseline() -> (SizingInputs, SizingResult) {
        let inputs = SizingInputs::default();
        let result = size(&inputs).unwrap();
        (inputs, result)
    }

    #[test]
    fn test_series_shapes() {
        let (inputs, result) = baseline();
        let series = chart_series(&inputs, &result);

        assert_eq!(series.monthly.len(), 12);
        assert_eq!(series.roi.len(), 26);
        assert_eq!(series.cost_breakdown.len(), 5);
    }

    #[test]
    fn test_roi_starts_at_negative_investment_and_rises() {
        let (inputs, result) = baseline();
        let series = chart_series(&inputs, &result);

        assert_relative_eq!(
            series.roi[0].cumulative_savings_usd,
            -result.total_cost_usd
        );
        for window in series.roi.windows(2) {
            assert!(window[1].cumulative_savings_usd > window[0].cumulative_savings_usd);
            assert_eq!(window[1].investment_usd, -result.total_cost_usd);
        }
    }

    #[test]
    fn test_midsummer_peaks_over_midwinter() {
        let (inputs, result) = baseline();
        let series = chart_series(&inputs, &result);

        let january = &series.monthly[0];
        let june = &series.monthly[5];
        assert!(june.production_kwh > january.production_kwh);
        assert_relative_eq!(january.consumption_kwh, 30.0 * 30.0);
    }
}

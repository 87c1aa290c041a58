//! Solar sizing CLI
//!
//! Sizes a PV system from slider-equivalent flags, prints the result,
//! the chart series, and optional what-if scenario deltas.

use clap::Parser;
use solar_sizer::{
    locations, scenario, series, size, ScenarioKind, SizingInputs, SizingResult, SystemType,
};
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

/// Solar PV sizing calculator
#[derive(Parser, Debug)]
#[command(name = "solar-sizer")]
#[command(about = "Size a solar PV system and estimate its economics", long_about = None)]
struct Args {
    /// Daily consumption (kWh)
    #[arg(long, default_value = "30")]
    consumption: f64,

    /// Available roof area (m²)
    #[arg(long, default_value = "100")]
    roof_area: f64,

    /// Electricity rate ($/kWh)
    #[arg(long, default_value = "0.12")]
    rate: f64,

    /// Battery capacity (kWh)
    #[arg(long, default_value = "10")]
    battery_capacity: f64,

    /// Panel efficiency (%)
    #[arg(long, default_value = "20")]
    panel_efficiency: f64,

    /// System losses (%)
    #[arg(long, default_value = "15")]
    losses: f64,

    /// Panel cost ($/W)
    #[arg(long, default_value = "0.40")]
    panel_cost: f64,

    /// Battery cost ($/kWh)
    #[arg(long, default_value = "500")]
    battery_cost: f64,

    /// Solar irradiance (kWh/m²/day); overridden by --location
    #[arg(long, default_value = "4.5")]
    irradiance: f64,

    /// Look the irradiance up by city name (phoenix, miami, denver,
    /// seattle, chicago, utah)
    #[arg(long)]
    location: Option<String>,

    /// System type: grid-tied, off-grid, hybrid
    #[arg(long, default_value = "grid-tied")]
    system_type: SystemType,

    /// What-if scenario to compare (efficiency, battery, hybrid, tariff)
    #[arg(long)]
    scenario: Option<ScenarioKind>,

    /// JSON output (result + chart series + scenario)
    #[arg(long)]
    json: bool,
}

fn print_result(result: &SizingResult) {
    println!("System size:       {:.1} kW", result.system_size_kw);
    println!(
        "Panels:            {} x {:.0} W",
        result.panel_count,
        result.panel_wattage_kw * 1000.0
    );
    println!("Total cost:        ${:.0}", result.total_cost_usd);
    println!("Annual production: {:.0} kWh", result.annual_production_kwh);
    match result.payback_years {
        Some(years) => println!("Payback period:    {:.1} years", years),
        None => println!("Payback period:    n/a"),
    }
    println!("LCOE:              ${:.3}/kWh", result.lcoe_usd_per_kwh);

    if result.area_constrained {
        println!(
            "Note: roof limits the array ({:.0} m² needed); {:.1} kWh/day of \
             consumption is not met",
            result.required_area_m2, result.energy_deficit_kwh_per_day
        );
    }
}

fn main() {
    let args = Args::parse();

    let subscriber = FmtSubscriber::builder().with_max_level(Level::INFO).finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    let irradiance = match &args.location {
        Some(name) => match locations::lookup(name) {
            Ok(location) => location.irradiance,
            Err(e) => {
                error!("{}. Try: {}", e, locations::names().join(", "));
                std::process::exit(1);
            }
        },
        None => args.irradiance,
    };

    let inputs = SizingInputs {
        daily_consumption_kwh: args.consumption,
        roof_area_m2: args.roof_area,
        electricity_rate: args.rate,
        battery_capacity_kwh: args.battery_capacity,
        panel_efficiency_pct: args.panel_efficiency,
        system_losses_pct: args.losses,
        panel_cost_per_watt: args.panel_cost,
        battery_cost_per_kwh: args.battery_cost,
        irradiance,
        system_type: args.system_type,
    };

    let result = match size(&inputs) {
        Ok(result) => result,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    let report = match args.scenario {
        Some(kind) => match scenario::run(&inputs, kind) {
            Ok(report) => Some(report),
            Err(e) => {
                error!("Scenario failed: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    if args.json {
        let charts = series::chart_series(&inputs, &result);
        let output = serde_json::json!({
            "inputs": inputs,
            "result": result,
            "series": charts,
            "scenario": report,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&output).expect("output serializes")
        );
        return;
    }

    print_result(&result);

    if let Some(report) = report {
        println!();
        println!("{} impact:", report.label);
        println!(
            "  Cost change:    {}${:.0}",
            if report.cost_delta_usd >= 0.0 { "+" } else { "-" },
            report.cost_delta_usd.abs()
        );
        match report.payback_delta_years {
            Some(delta) => println!("  Payback change: {:+.1} years", delta),
            None => println!("  Payback change: n/a"),
        }
        println!(
            "  New LCOE:       ${:.3}/kWh",
            report.scenario.lcoe_usd_per_kwh
        );
        println!(
            "  Production:     {:.0} kWh/year",
            report.scenario.annual_production_kwh
        );
    }
}

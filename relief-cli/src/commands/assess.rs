//! Offline calculators. Nothing here talks to a server.

use clap::Subcommand;
use comfy_table::Cell;
use console::style;

use relief_assess::risk::{FloodFactors, SeismicFactors, StormFactors, WildfireFactors};
use relief_assess::{
    allocate, allocate_budget, assess, assess_impact, calculate_emergency_supplies, ImpactAssessment,
    ImpactInput, InfrastructureDamage, RegionNeed, RiskAssessment, RiskInput, RiskLevel, Severity,
    SupplyRequest, UnitCosts,
};
use relief_core::error::ReliefResult;

use super::{format_money, new_table, print_json};
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum AssessAction {
    /// Score the risk of a hazard from its drivers.
    Risk {
        #[command(subcommand)]
        hazard: HazardArgs,
    },
    /// Score the human, infrastructure and economic impact of an event.
    Impact {
        /// People living in the affected area.
        #[arg(long)]
        population: u64,
        #[arg(long, default_value = "0")]
        deaths: u64,
        #[arg(long, default_value = "0")]
        injured: u64,
        #[arg(long, default_value = "0")]
        displaced: u64,
        #[arg(long, default_value = "0")]
        buildings_damaged: u64,
        #[arg(long, default_value = "0")]
        buildings_total: u64,
        /// Power damage, 0..=1.
        #[arg(long, default_value = "0")]
        power: f64,
        /// Water damage, 0..=1.
        #[arg(long, default_value = "0")]
        water: f64,
        /// Road damage, 0..=1.
        #[arg(long, default_value = "0")]
        roads: f64,
        /// Telecom damage, 0..=1.
        #[arg(long, default_value = "0")]
        telecom: f64,
        /// Health facility damage, 0..=1.
        #[arg(long, default_value = "0")]
        health: f64,
        /// Direct economic loss.
        #[arg(long, default_value = "0")]
        economic_loss: f64,
        /// Regional GDP, in the same currency as the loss.
        #[arg(long)]
        regional_gdp: f64,
    },
    /// Estimate emergency supplies for a population.
    Supplies {
        #[arg(long)]
        population: u64,
        /// Days to cover.
        #[arg(long, default_value = "7")]
        days: u32,
        /// Share of vulnerable people, 0..=1.
        #[arg(long, default_value = "0")]
        vulnerable: f64,
        /// Average people per household.
        #[arg(long, default_value = "5")]
        household_size: f64,
        /// Split this budget across supply categories.
        #[arg(long)]
        budget: Option<f64>,
    },
    /// Split a stock of units across regions by need.
    Allocate {
        /// Units to distribute.
        #[arg(long)]
        units: u64,
        /// Region as name:population:severity:accessibility (repeatable).
        #[arg(long = "region", required = true, value_parser = parse_region)]
        regions: Vec<RegionNeed>,
    },
}

#[derive(Subcommand)]
pub enum HazardArgs {
    Flood {
        /// Rainfall over the last 24 hours, mm.
        #[arg(long)]
        rainfall_mm: f64,
        /// River level divided by flood stage.
        #[arg(long)]
        river_level: f64,
        /// Soil saturation, 0..=1.
        #[arg(long)]
        soil_saturation: f64,
        /// Elevation above the nearest water body, m.
        #[arg(long, allow_negative_numbers = true)]
        elevation_m: f64,
        /// Drainage capacity, 0..=1.
        #[arg(long)]
        drainage: f64,
        /// Floods recorded in the last ten years.
        #[arg(long, default_value = "0")]
        past_floods: f64,
    },
    Earthquake {
        /// Largest recorded magnitude.
        #[arg(long)]
        magnitude: f64,
        /// Distance to the nearest active fault, km.
        #[arg(long)]
        fault_distance_km: f64,
        /// Share of buildings meeting seismic code, 0..=1.
        #[arg(long)]
        code_compliance: f64,
        /// Liquefaction susceptibility, 0..=1.
        #[arg(long, default_value = "0")]
        liquefaction: f64,
        /// People per km².
        #[arg(long)]
        density: f64,
    },
    Wildfire {
        #[arg(long, allow_negative_numbers = true)]
        temperature_c: f64,
        /// Relative humidity, 0..=1.
        #[arg(long)]
        humidity: f64,
        #[arg(long)]
        wind_kmh: f64,
        /// Vegetation dryness, 0..=1.
        #[arg(long)]
        dryness: f64,
        #[arg(long, default_value = "0")]
        days_since_rain: f64,
    },
    Hurricane {
        /// Sustained wind speed, km/h.
        #[arg(long)]
        wind_kmh: f64,
        /// Forecast storm surge, m.
        #[arg(long, default_value = "0")]
        surge_m: f64,
        /// Distance from the coast, km.
        #[arg(long)]
        coast_distance_km: f64,
        /// Community preparedness, 0..=1.
        #[arg(long, default_value = "0.5")]
        preparedness: f64,
    },
}

impl From<HazardArgs> for RiskInput {
    fn from(args: HazardArgs) -> Self {
        match args {
            HazardArgs::Flood {
                rainfall_mm,
                river_level,
                soil_saturation,
                elevation_m,
                drainage,
                past_floods,
            } => RiskInput::Flood(FloodFactors {
                rainfall_mm,
                river_level_ratio: river_level,
                soil_saturation,
                elevation_m,
                drainage_capacity: drainage,
                floods_last_decade: past_floods,
            }),
            HazardArgs::Earthquake {
                magnitude,
                fault_distance_km,
                code_compliance,
                liquefaction,
                density,
            } => RiskInput::Earthquake(SeismicFactors {
                max_historical_magnitude: magnitude,
                fault_distance_km,
                building_code_compliance: code_compliance,
                soil_liquefaction: liquefaction,
                population_density: density,
            }),
            HazardArgs::Wildfire {
                temperature_c,
                humidity,
                wind_kmh,
                dryness,
                days_since_rain,
            } => RiskInput::Wildfire(WildfireFactors {
                temperature_c,
                relative_humidity: humidity,
                wind_speed_kmh: wind_kmh,
                vegetation_dryness: dryness,
                days_since_rain,
            }),
            HazardArgs::Hurricane {
                wind_kmh,
                surge_m,
                coast_distance_km,
                preparedness,
            } => RiskInput::Hurricane(StormFactors {
                wind_speed_kmh: wind_kmh,
                storm_surge_m: surge_m,
                coastal_distance_km: coast_distance_km,
                preparedness,
            }),
        }
    }
}

/// Parse `name:population:severity:accessibility`.
fn parse_region(s: &str) -> Result<RegionNeed, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let [name, population, severity, accessibility] = parts.as_slice() else {
        return Err(format!("expected name:population:severity:accessibility, got {s:?}"));
    };
    if name.trim().is_empty() {
        return Err("region name is empty".into());
    }
    Ok(RegionNeed {
        name: name.trim().to_string(),
        population: population
            .trim()
            .parse()
            .map_err(|_| format!("invalid population: {population}"))?,
        severity: severity
            .trim()
            .parse()
            .map_err(|_| format!("invalid severity: {severity}"))?,
        accessibility: accessibility
            .trim()
            .parse()
            .map_err(|_| format!("invalid accessibility: {accessibility}"))?,
    })
}

pub fn run(action: AssessAction, format: OutputFormat) -> ReliefResult<()> {
    match action {
        AssessAction::Risk { hazard } => {
            let result = assess(&RiskInput::from(hazard))?;
            match format {
                OutputFormat::Json => print_json(&result),
                OutputFormat::Text => print_risk(&result),
            }
        }

        AssessAction::Impact {
            population,
            deaths,
            injured,
            displaced,
            buildings_damaged,
            buildings_total,
            power,
            water,
            roads,
            telecom,
            health,
            economic_loss,
            regional_gdp,
        } => {
            let result = assess_impact(&ImpactInput {
                affected_population: population,
                deaths,
                injured,
                displaced,
                buildings_damaged,
                buildings_total,
                infrastructure: InfrastructureDamage {
                    power,
                    water,
                    roads,
                    telecom,
                    health,
                },
                economic_loss,
                regional_gdp,
            })?;
            match format {
                OutputFormat::Json => print_json(&result),
                OutputFormat::Text => print_impact(&result),
            }
        }

        AssessAction::Supplies {
            population,
            days,
            vulnerable,
            household_size,
            budget,
        } => {
            let plan = calculate_emergency_supplies(&SupplyRequest {
                population,
                days,
                vulnerable_share: vulnerable,
                household_size,
            })?;
            let split = budget
                .map(|b| allocate_budget(b, &plan, &UnitCosts::default()))
                .transpose()?;

            match format {
                OutputFormat::Json => print_json(&serde_json::json!({ "plan": plan, "budget": split })),
                OutputFormat::Text => {
                    let mut table = new_table();
                    table.set_header(vec!["Item", "Quantity"]);
                    table.add_row(vec![Cell::new("Households"), Cell::new(plan.households)]);
                    table.add_row(vec![Cell::new("Water (L)"), Cell::new(format!("{:.0}", plan.water_litres))]);
                    table.add_row(vec![Cell::new("Food (kg)"), Cell::new(format!("{:.0}", plan.food_kg))]);
                    table.add_row(vec![Cell::new("Hygiene kits"), Cell::new(plan.hygiene_kits)]);
                    table.add_row(vec![Cell::new("Shelter kits"), Cell::new(plan.shelter_kits)]);
                    table.add_row(vec![Cell::new("Blankets"), Cell::new(plan.blankets)]);
                    table.add_row(vec![Cell::new("Medical kits"), Cell::new(plan.medical_kits)]);
                    table.add_row(vec![Cell::new("Responders"), Cell::new(plan.responders)]);
                    println!("{}", style(format!("Supplies for {population} people, {days} days")).bold());
                    println!("{table}");

                    if let Some(split) = split {
                        println!();
                        println!("{}", style("Budget").bold().underlined());
                        println!("  Water:     {}", format_money(split.water));
                        println!("  Food:      {}", format_money(split.food));
                        println!("  Shelter:   {}", format_money(split.shelter));
                        println!("  Medical:   {}", format_money(split.medical));
                        println!("  Hygiene:   {}", format_money(split.hygiene));
                        println!("  Required:  {}", format_money(split.total_required));
                        let coverage = format!("{:.0}%", split.coverage * 100.0);
                        let coverage = if split.coverage >= 1.0 {
                            style(coverage).green()
                        } else {
                            style(coverage).yellow()
                        };
                        println!("  Coverage:  {coverage}");
                    }
                }
            }
        }

        AssessAction::Allocate { units, regions } => {
            let allocations = allocate(units, &regions)?;
            match format {
                OutputFormat::Json => print_json(&allocations),
                OutputFormat::Text => {
                    let mut table = new_table();
                    table.set_header(vec!["Region", "Units", "Share"]);
                    for a in &allocations {
                        table.add_row(vec![
                            Cell::new(&a.name),
                            Cell::new(a.units),
                            Cell::new(format!("{:.1}%", a.share * 100.0)),
                        ]);
                    }
                    println!("{table}");
                }
            }
        }
    }
    Ok(())
}

fn print_risk(result: &RiskAssessment) {
    let level = format!("{:?}", result.level).to_uppercase();
    let level = match result.level {
        RiskLevel::Low => style(level).green(),
        RiskLevel::Moderate => style(level).yellow(),
        RiskLevel::High | RiskLevel::Extreme => style(level).red().bold(),
    };
    println!(
        "{} risk: {} ({:.1}/100)",
        style(result.hazard.as_str()).bold(),
        level,
        result.score
    );
    println!("  Dominant factor: {}", result.dominant_factor);
    println!();

    let mut table = new_table();
    table.set_header(vec!["Factor", "Weight", "Normalized", "Points"]);
    for f in &result.factors {
        table.add_row(vec![
            Cell::new(&f.name),
            Cell::new(format!("{:.2}", f.weight)),
            Cell::new(format!("{:.2}", f.normalized)),
            Cell::new(format!("{:.1}", f.points)),
        ]);
    }
    println!("{table}");

    if !result.recommendations.is_empty() {
        println!();
        println!("{}", style("Recommendations").bold().underlined());
        for r in &result.recommendations {
            println!("  - {r}");
        }
    }
}

fn print_impact(result: &ImpactAssessment) {
    let severity = format!("{:?}", result.severity).to_uppercase();
    let severity = match result.severity {
        Severity::Minor => style(severity).green(),
        Severity::Moderate => style(severity).yellow(),
        _ => style(severity).red().bold(),
    };
    println!("Impact: {} ({:.1}/100)", severity, result.overall_score);
    println!("  Human:           {:.1}", result.human_score);
    println!("  Infrastructure:  {:.1}", result.infrastructure_score);
    println!("  Economic:        {:.1}", result.economic_score);
    println!("  Recovery (est.): {} days", result.estimated_recovery_days);
    if !result.priority_sectors.is_empty() {
        let sectors: Vec<String> = result
            .priority_sectors
            .iter()
            .map(|s| format!("{s:?}").to_lowercase())
            .collect();
        println!("  Priorities:      {}", sectors.join(", "));
    }
}

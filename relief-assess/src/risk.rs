//! Per-hazard risk scoring.
//!
//! Each hazard has a fixed set of factors. A factor's raw reading is mapped
//! onto 0..=1, multiplied by its weight, and the weighted sum is scaled to
//! 0..=100. Weights for a hazard sum to 1.

use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_core::error::ReliefResult;

use crate::{check_fraction, check_non_negative, check_range, unit};

/// Hazard being scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Hazard {
    Flood,
    Earthquake,
    Wildfire,
    Hurricane,
}

impl Hazard {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flood => "flood",
            Self::Earthquake => "earthquake",
            Self::Wildfire => "wildfire",
            Self::Hurricane => "hurricane",
        }
    }
}

/// Banded interpretation of a risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl RiskLevel {
    /// Band for a 0..=100 score.
    pub fn from_score(score: f64) -> Self {
        if score < 25.0 {
            Self::Low
        } else if score < 50.0 {
            Self::Moderate
        } else if score < 75.0 {
            Self::High
        } else {
            Self::Extreme
        }
    }
}

/// Flood drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FloodFactors {
    /// Rainfall over the last 24 hours, in millimetres.
    pub rainfall_mm: f64,
    /// Current river level divided by flood stage.
    pub river_level_ratio: f64,
    /// Soil saturation, 0..=1.
    pub soil_saturation: f64,
    /// Elevation above the nearest water body, in metres. May be negative.
    pub elevation_m: f64,
    /// Drainage capacity, 0..=1.
    pub drainage_capacity: f64,
    /// Flood events recorded in the last ten years.
    pub floods_last_decade: f64,
}

/// Earthquake drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeismicFactors {
    /// Largest recorded magnitude in the region.
    pub max_historical_magnitude: f64,
    /// Distance to the nearest active fault, in kilometres.
    pub fault_distance_km: f64,
    /// Share of buildings meeting seismic code, 0..=1.
    pub building_code_compliance: f64,
    /// Soil liquefaction susceptibility, 0..=1.
    pub soil_liquefaction: f64,
    /// People per square kilometre.
    pub population_density: f64,
}

/// Wildfire drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WildfireFactors {
    pub temperature_c: f64,
    /// Relative humidity, 0..=1.
    pub relative_humidity: f64,
    pub wind_speed_kmh: f64,
    /// Vegetation dryness index, 0..=1.
    pub vegetation_dryness: f64,
    pub days_since_rain: f64,
}

/// Hurricane / cyclone drivers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StormFactors {
    /// Sustained wind speed, km/h.
    pub wind_speed_kmh: f64,
    /// Forecast storm surge, metres.
    pub storm_surge_m: f64,
    /// Distance from the coastline, kilometres.
    pub coastal_distance_km: f64,
    /// Community preparedness, 0..=1.
    pub preparedness: f64,
}

/// Input to [`assess`], tagged by hazard.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "hazard", rename_all = "lowercase")]
pub enum RiskInput {
    Flood(FloodFactors),
    Earthquake(SeismicFactors),
    Wildfire(WildfireFactors),
    Hurricane(StormFactors),
}

/// One factor's share of a score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FactorContribution {
    pub name: String,
    pub weight: f64,
    /// Normalized reading, 0..=1.
    pub normalized: f64,
    /// `weight * normalized * 100`.
    pub points: f64,
}

/// Result of scoring one hazard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub hazard: Hazard,
    pub score: f64,
    pub level: RiskLevel,
    /// Factor with the largest weighted contribution.
    pub dominant_factor: String,
    pub factors: Vec<FactorContribution>,
    pub recommendations: Vec<String>,
}

fn combine(hazard: Hazard, parts: &[(&str, f64, f64)]) -> RiskAssessment {
    let factors: Vec<FactorContribution> = parts
        .iter()
        .map(|&(name, weight, normalized)| FactorContribution {
            name: name.to_string(),
            weight,
            normalized,
            points: weight * normalized * 100.0,
        })
        .collect();

    let score = factors.iter().map(|f| f.points).sum::<f64>().clamp(0.0, 100.0);
    let level = RiskLevel::from_score(score);
    let dominant_factor = factors
        .iter()
        .max_by(|a, b| a.points.total_cmp(&b.points))
        .map(|f| f.name.clone())
        .unwrap_or_default();

    debug!("{} risk score={score:.1} level={level:?}", hazard.as_str());

    RiskAssessment {
        hazard,
        score,
        level,
        dominant_factor,
        factors,
        recommendations: recommendations(hazard, level),
    }
}

/// Score flood risk.
pub fn calculate_flood_risk(f: &FloodFactors) -> ReliefResult<RiskAssessment> {
    let rain = check_non_negative("rainfallMm", f.rainfall_mm)?;
    let river = check_non_negative("riverLevelRatio", f.river_level_ratio)?;
    let soil = check_fraction("soilSaturation", f.soil_saturation)?;
    let elev = check_range("elevationM", f.elevation_m, -500.0, 9_000.0)?;
    let drainage = check_fraction("drainageCapacity", f.drainage_capacity)?;
    let history = check_non_negative("floodsLastDecade", f.floods_last_decade)?;

    Ok(combine(
        Hazard::Flood,
        &[
            ("rainfall", 0.30, unit(rain / 200.0)),
            ("riverLevel", 0.25, unit(river - 0.5)),
            ("soilSaturation", 0.15, soil),
            ("elevation", 0.15, unit(1.0 - elev / 100.0)),
            ("drainage", 0.10, 1.0 - drainage),
            ("history", 0.05, unit(history / 5.0)),
        ],
    ))
}

/// Score earthquake risk.
pub fn calculate_earthquake_risk(f: &SeismicFactors) -> ReliefResult<RiskAssessment> {
    let mag = check_range("maxHistoricalMagnitude", f.max_historical_magnitude, 0.0, 10.0)?;
    let dist = check_non_negative("faultDistanceKm", f.fault_distance_km)?;
    let code = check_fraction("buildingCodeCompliance", f.building_code_compliance)?;
    let liq = check_fraction("soilLiquefaction", f.soil_liquefaction)?;
    let density = check_non_negative("populationDensity", f.population_density)?;

    Ok(combine(
        Hazard::Earthquake,
        &[
            ("magnitude", 0.35, unit((mag - 4.0) / 5.0)),
            ("faultProximity", 0.25, unit(1.0 - dist / 200.0)),
            ("buildingVulnerability", 0.20, 1.0 - code),
            ("liquefaction", 0.10, liq),
            ("populationDensity", 0.10, unit(density / 10_000.0)),
        ],
    ))
}

/// Score wildfire risk.
pub fn calculate_wildfire_risk(f: &WildfireFactors) -> ReliefResult<RiskAssessment> {
    let temp = check_range("temperatureC", f.temperature_c, -60.0, 60.0)?;
    let rh = check_fraction("relativeHumidity", f.relative_humidity)?;
    let wind = check_non_negative("windSpeedKmh", f.wind_speed_kmh)?;
    let dry = check_fraction("vegetationDryness", f.vegetation_dryness)?;
    let days = check_non_negative("daysSinceRain", f.days_since_rain)?;

    Ok(combine(
        Hazard::Wildfire,
        &[
            ("temperature", 0.25, unit((temp - 10.0) / 35.0)),
            ("dryAir", 0.20, 1.0 - rh),
            ("wind", 0.20, unit(wind / 80.0)),
            ("vegetationDryness", 0.25, dry),
            ("drySpell", 0.10, unit(days / 60.0)),
        ],
    ))
}

/// Score hurricane risk.
pub fn calculate_hurricane_risk(f: &StormFactors) -> ReliefResult<RiskAssessment> {
    let wind = check_non_negative("windSpeedKmh", f.wind_speed_kmh)?;
    let surge = check_non_negative("stormSurgeM", f.storm_surge_m)?;
    let dist = check_non_negative("coastalDistanceKm", f.coastal_distance_km)?;
    let prep = check_fraction("preparedness", f.preparedness)?;

    Ok(combine(
        Hazard::Hurricane,
        &[
            ("wind", 0.40, unit((wind - 60.0) / 190.0)),
            ("stormSurge", 0.25, unit(surge / 6.0)),
            ("coastalExposure", 0.20, unit(1.0 - dist / 100.0)),
            ("unpreparedness", 0.15, 1.0 - prep),
        ],
    ))
}

/// Score whichever hazard `input` describes.
pub fn assess(input: &RiskInput) -> ReliefResult<RiskAssessment> {
    match input {
        RiskInput::Flood(f) => calculate_flood_risk(f),
        RiskInput::Earthquake(f) => calculate_earthquake_risk(f),
        RiskInput::Wildfire(f) => calculate_wildfire_risk(f),
        RiskInput::Hurricane(f) => calculate_hurricane_risk(f),
    }
}

/// Combined score for a region exposed to several hazards.
///
/// Starts from the worst single score and adds 10% of it for every other
/// hazard rated high or extreme, capped at 100. Empty input scores 0.
pub fn composite_risk(assessments: &[RiskAssessment]) -> f64 {
    let Some((worst_idx, worst)) = assessments
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.score.total_cmp(&b.score))
    else {
        return 0.0;
    };

    let others_severe = assessments
        .iter()
        .enumerate()
        .filter(|(i, a)| *i != worst_idx && a.level >= RiskLevel::High)
        .count();

    (worst.score * (1.0 + 0.10 * others_severe as f64)).min(100.0)
}

fn recommendations(hazard: Hazard, level: RiskLevel) -> Vec<String> {
    let mut out: Vec<&str> = match level {
        RiskLevel::Low => vec!["Maintain routine monitoring"],
        RiskLevel::Moderate => vec![
            "Review evacuation routes and shelter capacity",
            "Pre-position basic supplies",
        ],
        RiskLevel::High => vec![
            "Issue public warnings to affected communities",
            "Pre-position supplies and stand up response teams",
        ],
        RiskLevel::Extreme => vec![
            "Begin evacuation of high-exposure areas",
            "Activate emergency operations centre",
            "Request external assistance",
        ],
    };

    if level >= RiskLevel::Moderate {
        out.push(match hazard {
            Hazard::Flood => "Clear drainage channels and prepare sandbags",
            Hazard::Earthquake => "Inspect critical buildings and secure heavy equipment",
            Hazard::Wildfire => "Cut firebreaks and restrict open burning",
            Hazard::Hurricane => "Secure structures and move boats and vehicles inland",
        });
    }

    out.into_iter().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calm_flood() -> FloodFactors {
        FloodFactors {
            rainfall_mm: 0.0,
            river_level_ratio: 0.3,
            soil_saturation: 0.0,
            elevation_m: 150.0,
            drainage_capacity: 1.0,
            floods_last_decade: 0.0,
        }
    }

    #[test]
    fn test_calm_flood_is_zero() {
        let r = calculate_flood_risk(&calm_flood()).unwrap();
        assert_eq!(r.score, 0.0);
        assert_eq!(r.level, RiskLevel::Low);
        assert_eq!(r.recommendations, vec!["Maintain routine monitoring".to_string()]);
    }

    #[test]
    fn test_saturated_flood_is_extreme() {
        let r = calculate_flood_risk(&FloodFactors {
            rainfall_mm: 300.0,
            river_level_ratio: 2.0,
            soil_saturation: 1.0,
            elevation_m: -2.0,
            drainage_capacity: 0.0,
            floods_last_decade: 8.0,
        })
        .unwrap();
        assert!((r.score - 100.0).abs() < 1e-9);
        assert_eq!(r.level, RiskLevel::Extreme);
        assert_eq!(r.dominant_factor, "rainfall");
    }

    #[test]
    fn test_flood_partial_weights() {
        // Rain at 100mm (0.5 * 0.30) + river at 1.0 (0.5 * 0.25) = 27.5 points.
        let mut f = calm_flood();
        f.rainfall_mm = 100.0;
        f.river_level_ratio = 1.0;
        let r = calculate_flood_risk(&f).unwrap();
        assert!((r.score - 27.5).abs() < 1e-9);
        assert_eq!(r.level, RiskLevel::Moderate);
    }

    #[test]
    fn test_invalid_inputs_rejected() {
        let mut f = calm_flood();
        f.soil_saturation = 1.5;
        assert!(calculate_flood_risk(&f).is_err());

        f = calm_flood();
        f.rainfall_mm = f64::NAN;
        assert!(calculate_flood_risk(&f).is_err());

        let quake = SeismicFactors {
            max_historical_magnitude: 11.0,
            fault_distance_km: 1.0,
            building_code_compliance: 0.5,
            soil_liquefaction: 0.5,
            population_density: 100.0,
        };
        assert!(calculate_earthquake_risk(&quake).is_err());
    }

    #[test]
    fn test_earthquake_dominant_factor() {
        let r = calculate_earthquake_risk(&SeismicFactors {
            max_historical_magnitude: 9.0,
            fault_distance_km: 200.0,
            building_code_compliance: 1.0,
            soil_liquefaction: 0.0,
            population_density: 0.0,
        })
        .unwrap();
        assert!((r.score - 35.0).abs() < 1e-9);
        assert_eq!(r.dominant_factor, "magnitude");
    }

    #[test]
    fn test_wildfire_and_hurricane_ranges() {
        let fire = calculate_wildfire_risk(&WildfireFactors {
            temperature_c: 45.0,
            relative_humidity: 0.0,
            wind_speed_kmh: 80.0,
            vegetation_dryness: 1.0,
            days_since_rain: 60.0,
        })
        .unwrap();
        assert!((fire.score - 100.0).abs() < 1e-9);

        let storm = calculate_hurricane_risk(&StormFactors {
            wind_speed_kmh: 40.0,
            storm_surge_m: 0.0,
            coastal_distance_km: 500.0,
            preparedness: 1.0,
        })
        .unwrap();
        assert_eq!(storm.score, 0.0);
    }

    #[test]
    fn test_tagged_input_dispatch() {
        let input: RiskInput = serde_json::from_str(
            r#"{"hazard":"hurricane","windSpeedKmh":250,"stormSurgeM":6,
                "coastalDistanceKm":0,"preparedness":0}"#,
        )
        .unwrap();
        let r = assess(&input).unwrap();
        assert_eq!(r.hazard, Hazard::Hurricane);
        assert_eq!(r.level, RiskLevel::Extreme);
        assert!(r.recommendations.len() >= 3);
    }

    #[test]
    fn test_level_bands() {
        assert_eq!(RiskLevel::from_score(24.9), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(25.0), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(50.0), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(75.0), RiskLevel::Extreme);
    }

    #[test]
    fn test_composite_risk() {
        assert_eq!(composite_risk(&[]), 0.0);

        let mk = |score: f64| RiskAssessment {
            hazard: Hazard::Flood,
            score,
            level: RiskLevel::from_score(score),
            dominant_factor: String::new(),
            factors: vec![],
            recommendations: vec![],
        };
        assert!((composite_risk(&[mk(60.0)]) - 60.0).abs() < 1e-9);
        // One other high hazard adds 10% of the worst score.
        assert!((composite_risk(&[mk(60.0), mk(55.0), mk(10.0)]) - 66.0).abs() < 1e-9);
        assert_eq!(composite_risk(&[mk(95.0), mk(90.0), mk(80.0)]), 100.0);
    }
}

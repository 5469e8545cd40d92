//! Post-event impact scoring.

use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_core::error::{ReliefError, ReliefResult};

use crate::{check_fraction, check_non_negative};

/// Infrastructure sector tracked by the damage survey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    Health,
    Water,
    Power,
    Roads,
    Telecom,
}

impl Sector {
    /// Contribution of the sector to the infrastructure score.
    pub fn weight(&self) -> f64 {
        match self {
            Self::Health | Self::Water => 0.25,
            Self::Power => 0.2,
            Self::Roads | Self::Telecom => 0.15,
        }
    }
}

/// Damage per sector, 0 (intact) to 1 (destroyed).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfrastructureDamage {
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub water: f64,
    #[serde(default)]
    pub roads: f64,
    #[serde(default)]
    pub telecom: f64,
    #[serde(default)]
    pub health: f64,
}

impl InfrastructureDamage {
    fn sectors(&self) -> [(Sector, f64); 5] {
        [
            (Sector::Health, self.health),
            (Sector::Water, self.water),
            (Sector::Power, self.power),
            (Sector::Roads, self.roads),
            (Sector::Telecom, self.telecom),
        ]
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactInput {
    pub affected_population: u64,
    #[serde(default)]
    pub deaths: u64,
    #[serde(default)]
    pub injured: u64,
    #[serde(default)]
    pub displaced: u64,
    #[serde(default)]
    pub buildings_damaged: u64,
    #[serde(default)]
    pub buildings_total: u64,
    #[serde(default)]
    pub infrastructure: InfrastructureDamage,
    /// Direct economic loss, in the same currency as `regional_gdp`.
    #[serde(default)]
    pub economic_loss: f64,
    pub regional_gdp: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Minor,
    Moderate,
    Major,
    Catastrophic,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score < 20.0 {
            Self::Minor
        } else if score < 45.0 {
            Self::Moderate
        } else if score < 70.0 {
            Self::Major
        } else {
            Self::Catastrophic
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpactAssessment {
    pub human_score: f64,
    pub infrastructure_score: f64,
    pub economic_score: f64,
    pub overall_score: f64,
    pub severity: Severity,
    pub estimated_recovery_days: u32,
    /// Sectors at least half destroyed, worst first.
    pub priority_sectors: Vec<Sector>,
}

const DEATH_WEIGHT: f64 = 10.0;
const INJURY_WEIGHT: f64 = 3.0;
/// Loss equal to this share of regional GDP scores 100.
const GDP_SATURATION: f64 = 0.2;
const SECTOR_PRIORITY_THRESHOLD: f64 = 0.5;

fn human_score(input: &ImpactInput) -> f64 {
    let weighted = input.deaths as f64 * DEATH_WEIGHT
        + input.injured as f64 * INJURY_WEIGHT
        + input.displaced as f64;
    let base = input.affected_population.max(1) as f64;
    (100.0 * weighted / base).min(100.0)
}

fn infrastructure_score(input: &ImpactInput) -> f64 {
    let sectors: f64 = input
        .infrastructure
        .sectors()
        .iter()
        .map(|(s, d)| s.weight() * d)
        .sum::<f64>()
        * 100.0;
    let buildings = if input.buildings_total == 0 {
        0.0
    } else {
        (input.buildings_damaged as f64 / input.buildings_total as f64).min(1.0) * 100.0
    };
    0.7 * sectors + 0.3 * buildings
}

fn economic_score(input: &ImpactInput) -> f64 {
    (100.0 * input.economic_loss / input.regional_gdp / GDP_SATURATION).min(100.0)
}

/// Score an event's human, infrastructure, and economic toll.
pub fn assess_impact(input: &ImpactInput) -> ReliefResult<ImpactAssessment> {
    for (sector, damage) in input.infrastructure.sectors() {
        check_fraction(&format!("infrastructure.{sector:?}").to_lowercase(), damage)?;
    }
    check_non_negative("economicLoss", input.economic_loss)?;
    let gdp = check_non_negative("regionalGdp", input.regional_gdp)?;
    if gdp == 0.0 {
        return Err(ReliefError::InvalidInput("regionalGdp must be greater than zero".into()));
    }
    if input.buildings_damaged > input.buildings_total {
        return Err(ReliefError::InvalidInput(format!(
            "buildingsDamaged ({}) exceeds buildingsTotal ({})",
            input.buildings_damaged, input.buildings_total
        )));
    }

    let human = human_score(input);
    let infra = infrastructure_score(input);
    let econ = economic_score(input);
    let overall = 0.5 * human + 0.3 * infra + 0.2 * econ;

    let mut damaged: Vec<(Sector, f64)> = input
        .infrastructure
        .sectors()
        .into_iter()
        .filter(|(_, d)| *d >= SECTOR_PRIORITY_THRESHOLD)
        .collect();
    damaged.sort_by(|a, b| b.1.total_cmp(&a.1));

    let assessment = ImpactAssessment {
        human_score: human,
        infrastructure_score: infra,
        economic_score: econ,
        overall_score: overall,
        severity: Severity::from_score(overall),
        estimated_recovery_days: (30.0 * (1.0 + overall / 10.0)).round() as u32,
        priority_sectors: damaged.into_iter().map(|(s, _)| s).collect(),
    };
    debug!(
        "impact: overall {:.1} ({:?})",
        assessment.overall_score, assessment.severity
    );
    Ok(assessment)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet() -> ImpactInput {
        ImpactInput {
            affected_population: 10_000,
            deaths: 0,
            injured: 0,
            displaced: 0,
            buildings_damaged: 0,
            buildings_total: 1_000,
            infrastructure: InfrastructureDamage::default(),
            economic_loss: 0.0,
            regional_gdp: 1_000_000.0,
        }
    }

    #[test]
    fn test_no_damage_is_minor() {
        let a = assess_impact(&quiet()).unwrap();
        assert_eq!(a.overall_score, 0.0);
        assert_eq!(a.severity, Severity::Minor);
        assert_eq!(a.estimated_recovery_days, 30);
        assert!(a.priority_sectors.is_empty());
    }

    #[test]
    fn test_human_score_weighting() {
        let input = ImpactInput {
            deaths: 10,
            injured: 100,
            displaced: 500,
            ..quiet()
        };
        // (100 + 300 + 500) / 10_000 * 100 = 9
        let a = assess_impact(&input).unwrap();
        assert!((a.human_score - 9.0).abs() < 1e-9);
        assert!((a.overall_score - 4.5).abs() < 1e-9);
    }

    #[test]
    fn test_scores_saturate() {
        let input = ImpactInput {
            affected_population: 100,
            displaced: 1_000,
            buildings_damaged: 1_000,
            infrastructure: InfrastructureDamage {
                power: 1.0,
                water: 1.0,
                roads: 1.0,
                telecom: 1.0,
                health: 1.0,
            },
            economic_loss: 5_000_000.0,
            ..quiet()
        };
        let a = assess_impact(&input).unwrap();
        assert_eq!(a.human_score, 100.0);
        assert!((a.infrastructure_score - 100.0).abs() < 1e-9);
        assert_eq!(a.economic_score, 100.0);
        assert_eq!(a.severity, Severity::Catastrophic);
        assert_eq!(a.estimated_recovery_days, 330);
    }

    #[test]
    fn test_economic_score_scale() {
        // 10% of GDP is half of saturation.
        let input = ImpactInput {
            economic_loss: 100_000.0,
            ..quiet()
        };
        let a = assess_impact(&input).unwrap();
        assert!((a.economic_score - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_priority_sectors_sorted() {
        let input = ImpactInput {
            infrastructure: InfrastructureDamage {
                power: 0.6,
                water: 0.9,
                roads: 0.4,
                telecom: 0.5,
                health: 0.0,
            },
            ..quiet()
        };
        let a = assess_impact(&input).unwrap();
        assert_eq!(a.priority_sectors, vec![Sector::Water, Sector::Power, Sector::Telecom]);
    }

    #[test]
    fn test_invalid_impact_inputs() {
        assert!(assess_impact(&ImpactInput {
            regional_gdp: 0.0,
            ..quiet()
        })
        .is_err());
        assert!(assess_impact(&ImpactInput {
            buildings_damaged: 2_000,
            ..quiet()
        })
        .is_err());
        let mut bad = quiet();
        bad.infrastructure.roads = 1.5;
        assert!(assess_impact(&bad).is_err());
    }

    #[test]
    fn test_severity_bands() {
        assert_eq!(Severity::from_score(19.9), Severity::Minor);
        assert_eq!(Severity::from_score(20.0), Severity::Moderate);
        assert_eq!(Severity::from_score(45.0), Severity::Major);
        assert_eq!(Severity::from_score(70.0), Severity::Catastrophic);
    }
}

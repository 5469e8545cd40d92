//! Emergency supply sizing and proportional allocation across regions.

use serde::{Deserialize, Serialize};
use tracing::debug;

use relief_core::constants::sphere;
use relief_core::error::{ReliefError, ReliefResult};

use crate::{check_fraction, check_non_negative};

/// Population to supply for a given number of days.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyRequest {
    pub population: u64,
    pub days: u32,
    /// Share of children, elderly, pregnant, or chronically ill people, 0..=1.
    #[serde(default)]
    pub vulnerable_share: f64,
    /// Average people per household.
    #[serde(default = "default_household_size")]
    pub household_size: f64,
}

fn default_household_size() -> f64 {
    5.0
}

/// Quantities needed to cover a [`SupplyRequest`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplyPlan {
    pub households: u64,
    pub water_litres: f64,
    pub food_kg: f64,
    pub hygiene_kits: u64,
    pub shelter_kits: u64,
    pub blankets: u64,
    pub medical_kits: u64,
    pub responders: u64,
}

fn ceil_div(n: f64, d: f64) -> u64 {
    (n / d).ceil() as u64
}

fn checked_product(field: &str, a: u64, b: u64) -> ReliefResult<u64> {
    a.checked_mul(b)
        .ok_or_else(|| ReliefError::InvalidInput(format!("{field} overflows for this population")))
}

/// Largest stock [`allocate`] accepts. Above 2^53 the proportional shares
/// can no longer be represented exactly as `f64`.
pub const MAX_ALLOCATION_UNITS: u64 = 1 << 53;

/// Size water, food, shelter, hygiene, medical, and staffing needs.
pub fn calculate_emergency_supplies(req: &SupplyRequest) -> ReliefResult<SupplyPlan> {
    let vulnerable_share = check_fraction("vulnerableShare", req.vulnerable_share)?;
    let household_size = check_non_negative("householdSize", req.household_size)?;
    if household_size < 1.0 {
        return Err(ReliefError::InvalidInput(format!(
            "householdSize must be at least 1, got {household_size}"
        )));
    }

    let people = req.population as f64;
    let days = f64::from(req.days);
    let households = ceil_div(people, household_size);
    let vulnerable = (people * vulnerable_share).round();
    let kit_cycles = ceil_div(days, sphere::HYGIENE_KIT_DAYS);

    let plan = SupplyPlan {
        households,
        water_litres: people * days * sphere::WATER_LITRES_PER_DAY,
        food_kg: people * days * sphere::FOOD_KG_PER_DAY,
        hygiene_kits: checked_product("hygieneKits", households, kit_cycles)?,
        shelter_kits: households,
        blankets: checked_product("blankets", req.population, sphere::BLANKETS_PER_PERSON)?,
        medical_kits: ceil_div(people, sphere::PEOPLE_PER_MEDICAL_KIT)
            .saturating_add(ceil_div(vulnerable, sphere::VULNERABLE_PER_MEDICAL_KIT)),
        responders: ceil_div(people, sphere::PEOPLE_PER_RESPONDER),
    };
    debug!("supply plan for {} people over {} days: {plan:?}", req.population, req.days);
    Ok(plan)
}

/// Need of one region competing for a shared stock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionNeed {
    pub name: String,
    pub population: u64,
    /// Damage severity, 0..=1.
    pub severity: f64,
    /// Ease of reaching the region, 0..=1. Hard-to-reach regions weigh more.
    pub accessibility: f64,
}

impl RegionNeed {
    fn weight(&self) -> f64 {
        self.population as f64 * self.severity * (1.0 + (1.0 - self.accessibility))
    }
}

/// Units assigned to one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Allocation {
    pub name: String,
    pub units: u64,
    /// Fraction of the total stock, 0..=1.
    pub share: f64,
}

/// Split `total_units` across regions in proportion to need.
///
/// Uses largest-remainder rounding, so the returned units always sum to
/// `total_units` unless every region has zero weight, in which case every
/// region receives nothing. Remainder ties go to the earlier region.
pub fn allocate(total_units: u64, regions: &[RegionNeed]) -> ReliefResult<Vec<Allocation>> {
    if total_units > MAX_ALLOCATION_UNITS {
        return Err(ReliefError::InvalidInput(format!(
            "units must be at most {MAX_ALLOCATION_UNITS}, got {total_units}"
        )));
    }
    for r in regions {
        check_fraction(&format!("{}.severity", r.name), r.severity)?;
        check_fraction(&format!("{}.accessibility", r.name), r.accessibility)?;
    }

    let weights: Vec<f64> = regions.iter().map(RegionNeed::weight).collect();
    let total_weight: f64 = weights.iter().sum();

    if total_weight <= 0.0 {
        return Ok(regions
            .iter()
            .map(|r| Allocation {
                name: r.name.clone(),
                units: 0,
                share: 0.0,
            })
            .collect());
    }

    let exact: Vec<f64> = weights
        .iter()
        .map(|w| total_units as f64 * w / total_weight)
        .collect();
    let mut units: Vec<u64> = exact.iter().map(|e| e.floor() as u64).collect();
    let fractional: Vec<f64> = exact.iter().map(|e| e - e.floor()).collect();

    // Indices by descending fractional part, ties keep original order.
    let mut order: Vec<usize> = (0..regions.len()).collect();
    order.sort_by(|&a, &b| fractional[b].total_cmp(&fractional[a]).then(a.cmp(&b)));

    let assigned: u128 = units.iter().map(|&u| u128::from(u)).sum();
    let target = u128::from(total_units);
    if assigned < target {
        let mut remaining = target - assigned;
        for &i in order.iter().filter(|&&i| weights[i] > 0.0).cycle() {
            if remaining == 0 {
                break;
            }
            units[i] += 1;
            remaining -= 1;
        }
    } else if assigned > target {
        // Floating-point drift can overshoot by a unit; take it back from the
        // smallest fractional parts.
        let mut excess = assigned - target;
        for &i in order.iter().rev() {
            if excess == 0 {
                break;
            }
            if units[i] > 0 {
                units[i] -= 1;
                excess -= 1;
            }
        }
    }

    Ok(regions
        .iter()
        .zip(units)
        .map(|(r, u)| Allocation {
            name: r.name.clone(),
            units: u,
            share: if total_units == 0 { 0.0 } else { u as f64 / total_units as f64 },
        })
        .collect())
}

/// Unit prices used for budgeting.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitCosts {
    pub water_per_litre: f64,
    pub food_per_kg: f64,
    pub shelter_kit: f64,
    pub blanket: f64,
    pub medical_kit: f64,
    pub hygiene_kit: f64,
}

impl Default for UnitCosts {
    fn default() -> Self {
        Self {
            water_per_litre: 0.02,
            food_per_kg: 1.2,
            shelter_kit: 150.0,
            blanket: 8.0,
            medical_kit: 300.0,
            hygiene_kit: 25.0,
        }
    }
}

/// How a budget is spread over supply categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSplit {
    pub water: f64,
    pub food: f64,
    pub shelter: f64,
    pub medical: f64,
    pub hygiene: f64,
    /// Cost of fully funding the plan.
    pub total_required: f64,
    /// Fraction of the plan the budget covers, 0..=1.
    pub coverage: f64,
}

/// Split `budget` across categories by each category's share of the plan cost.
pub fn allocate_budget(budget: f64, plan: &SupplyPlan, costs: &UnitCosts) -> ReliefResult<BudgetSplit> {
    let budget = check_non_negative("budget", budget)?;

    let water = plan.water_litres * costs.water_per_litre;
    let food = plan.food_kg * costs.food_per_kg;
    let shelter = plan.shelter_kits as f64 * costs.shelter_kit + plan.blankets as f64 * costs.blanket;
    let medical = plan.medical_kits as f64 * costs.medical_kit;
    let hygiene = plan.hygiene_kits as f64 * costs.hygiene_kit;
    let total_required = water + food + shelter + medical + hygiene;

    if total_required <= 0.0 {
        return Ok(BudgetSplit {
            water: 0.0,
            food: 0.0,
            shelter: 0.0,
            medical: 0.0,
            hygiene: 0.0,
            total_required: 0.0,
            coverage: 1.0,
        });
    }

    let spend = budget.min(total_required);
    let scale = spend / total_required;
    Ok(BudgetSplit {
        water: water * scale,
        food: food * scale,
        shelter: shelter * scale,
        medical: medical * scale,
        hygiene: hygiene * scale,
        total_required,
        coverage: scale,
    })
}

//! Relief Assess - Stateless calculators used by campaign planners.
//!
//! Three independent families of weighted-sum formulas:
//! - [`risk`]: per-hazard risk scores (flood, earthquake, wildfire, hurricane)
//! - [`resources`]: emergency supply quantities and proportional allocation
//! - [`impact`]: post-event human, infrastructure, and economic impact
//!
//! Every entry point validates its numeric inputs and returns
//! `ReliefError::InvalidInput` for values that are non-finite or out of range.
//! Scores are on a 0..=100 scale.

pub mod risk;
pub mod resources;
pub mod impact;

pub use risk::{assess, composite_risk, Hazard, RiskAssessment, RiskInput, RiskLevel};
pub use resources::{
    allocate, allocate_budget, calculate_emergency_supplies, Allocation, BudgetSplit, RegionNeed, SupplyPlan,
    SupplyRequest, UnitCosts, MAX_ALLOCATION_UNITS,
};
pub use impact::{assess_impact, ImpactAssessment, ImpactInput, InfrastructureDamage, Sector, Severity};

use relief_core::error::{ReliefError, ReliefResult};

/// Require `value` to be finite and within `min..=max`.
pub(crate) fn check_range(name: &str, value: f64, min: f64, max: f64) -> ReliefResult<f64> {
    if !value.is_finite() {
        return Err(ReliefError::InvalidInput(format!("{name} must be a finite number")));
    }
    if value < min || value > max {
        return Err(ReliefError::InvalidInput(format!(
            "{name} must be between {min} and {max}, got {value}"
        )));
    }
    Ok(value)
}

/// Require `value` to be finite and non-negative.
pub(crate) fn check_non_negative(name: &str, value: f64) -> ReliefResult<f64> {
    check_range(name, value, 0.0, f64::MAX)
}

/// Require a 0..=1 fraction.
pub(crate) fn check_fraction(name: &str, value: f64) -> ReliefResult<f64> {
    check_range(name, value, 0.0, 1.0)
}

/// Clamp into 0..=1.
pub(crate) fn unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

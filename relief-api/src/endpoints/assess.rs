//! Calculator endpoints.

use serde::{Deserialize, Serialize};

use relief_assess::{
    Allocation, BudgetSplit, ImpactAssessment, ImpactInput, RegionNeed, RiskAssessment, RiskInput,
    SupplyPlan, SupplyRequest,
};
use relief_core::error::ReliefResult;

use crate::client::ApiClient;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuppliesReport {
    pub plan: SupplyPlan,
    #[serde(default)]
    pub budget: Option<BudgetSplit>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SuppliesBody<'a> {
    #[serde(flatten)]
    request: &'a SupplyRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<f64>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AllocateBody<'a> {
    total_units: u64,
    regions: &'a [RegionNeed],
}

impl ApiClient {
    /// `POST /api/assess/risk` for a single hazard.
    pub async fn assess_risk(&self, input: &RiskInput) -> ReliefResult<RiskAssessment> {
        self.post_json("/api/assess/risk", input).await
    }

    /// `POST /api/assess/impact`.
    pub async fn assess_impact(&self, input: &ImpactInput) -> ReliefResult<ImpactAssessment> {
        self.post_json("/api/assess/impact", input).await
    }

    /// `POST /api/assess/supplies`, optionally splitting a budget.
    pub async fn assess_supplies(&self, request: &SupplyRequest, budget: Option<f64>) -> ReliefResult<SuppliesReport> {
        self.post_json("/api/assess/supplies", &SuppliesBody { request, budget })
            .await
    }

    /// `POST /api/assess/allocate`.
    pub async fn allocate(&self, total_units: u64, regions: &[RegionNeed]) -> ReliefResult<Vec<Allocation>> {
        self.post_json("/api/assess/allocate", &AllocateBody { total_units, regions })
            .await
    }
}

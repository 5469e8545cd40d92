//! Request handlers, one arm per [`Route`].

use std::collections::HashMap;

use http_body_util::{BodyExt, LengthLimitError, Limited};
use hyper::body::{Bytes, Incoming};
use hyper::header::{CONTENT_LENGTH, CONTENT_TYPE};
use hyper::{Request, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use relief_assess::{
    allocate, allocate_budget, assess, assess_impact, calculate_emergency_supplies, composite_risk,
    BudgetSplit, ImpactInput, RegionNeed, RiskAssessment, RiskInput, SupplyPlan, SupplyRequest,
    UnitCosts,
};
use relief_core::constants::{APP_VERSION, DEFAULT_PAGE_SIZE, SERVICE_NAME};
use relief_core::error::{ReliefError, ReliefResult};
use relief_models::{
    CampaignFilter, CampaignList, CampaignStatus, DisasterType, HealthStatus, NewCampaign,
    NewDonation, PageRequest, ProofStatusUpdate,
};
use relief_services::{EscrowApproval, LoginRequest, QuickDonation};

use crate::multipart;
use crate::response::{self, json_response, BoxBody};
use crate::router::Route;
use crate::server::ServerContext;

/// Body of `POST /api/assess/risk`: one hazard, or several to combine.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RiskBody {
    One(RiskInput),
    Many(Vec<RiskInput>),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompositeRisk {
    assessments: Vec<RiskAssessment>,
    composite_score: f64,
}

/// Body of `POST /api/assess/supplies`. With a budget the response also
/// carries its split across supply categories.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SuppliesBody {
    #[serde(flatten)]
    request: SupplyRequest,
    #[serde(default)]
    budget: Option<f64>,
    #[serde(default)]
    unit_costs: Option<UnitCosts>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SuppliesReport {
    plan: SupplyPlan,
    #[serde(skip_serializing_if = "Option::is_none")]
    budget: Option<BudgetSplit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllocateBody {
    total_units: u64,
    regions: Vec<RegionNeed>,
}

fn ok<T: Serialize + ?Sized>(value: &T) -> Response<BoxBody> {
    json_response(StatusCode::OK, value)
}

fn created<T: Serialize + ?Sized>(value: &T) -> Response<BoxBody> {
    json_response(StatusCode::CREATED, value)
}

/// Run the handler for `route`, turning any error into its JSON response.
pub(crate) async fn dispatch(route: Route, req: Request<Incoming>, ctx: &ServerContext) -> Response<BoxBody> {
    match handle(route, req, ctx).await {
        Ok(resp) => resp,
        Err(e) => response::from_error(&e),
    }
}

async fn handle(route: Route, req: Request<Incoming>, ctx: &ServerContext) -> ReliefResult<Response<BoxBody>> {
    let registry = &ctx.registry;
    let limit = ctx.max_body_bytes;

    let resp = match route {
        Route::Health => ok(&HealthStatus::ok(SERVICE_NAME, APP_VERSION, ctx.uptime_seconds())),

        // ---- Campaigns ----
        Route::ListCampaigns => {
            let (filter, page) = campaign_query(&query_params(&req))?;
            ok(&CampaignList::from(registry.campaigns.list(&filter, page).await))
        }
        Route::CreateCampaign => {
            let new: NewCampaign = read_json(req, limit).await?;
            created(&registry.campaigns.create(new).await?)
        }
        Route::GetCampaign(id) => ok(&registry.campaigns.get(id).await?),

        // ---- Donations ----
        Route::ListDonations(id) => ok(&registry.donations.list(id).await?),
        Route::Donate(id) => {
            let new: NewDonation = read_json(req, limit).await?;
            created(&registry.donations.donate(id, new).await?)
        }

        // ---- Proofs ----
        Route::ListProofs(id) => ok(&registry.proofs.list(id).await?),
        Route::UploadProof(id) => {
            let content_type = req
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);
            let body = read_body(req, limit).await?;
            let upload = multipart::parse_proof_upload(content_type.as_deref(), body).await?;
            created(&registry.proofs.store_upload(id, upload).await?)
        }
        Route::UpdateProof(id) => {
            let update: ProofStatusUpdate = read_json(req, limit).await?;
            ok(&registry.proofs.set_status(id, update.status).await?)
        }

        // ---- Users ----
        Route::Login => {
            let login: LoginRequest = read_json(req, limit).await?;
            ok(&registry.auth.login(&login.email, &login.password).await?)
        }
        Route::Profile => ok(&registry.auth.profile().await?),

        // ---- Chain ----
        Route::QuickDonate => {
            let donation: QuickDonation = read_json(req, limit).await?;
            ok(&registry.escrow.quick_donate(donation).await?)
        }
        Route::EscrowStatus => ok(&registry.escrow.status().await?),
        Route::EscrowApprove => {
            let approval: EscrowApproval = read_json(req, limit).await?;
            ok(&registry.escrow.approve(&approval.oracle).await?)
        }
        Route::EscrowRelease => ok(&registry.escrow.release().await?),
        Route::Stats => ok(&registry.stats.stats().await),

        // ---- Calculators ----
        Route::AssessRisk => match read_json::<RiskBody>(req, limit).await? {
            RiskBody::One(input) => ok(&assess(&input)?),
            RiskBody::Many(inputs) => {
                let assessments = inputs.iter().map(assess).collect::<ReliefResult<Vec<_>>>()?;
                let composite_score = composite_risk(&assessments);
                ok(&CompositeRisk {
                    assessments,
                    composite_score,
                })
            }
        },
        Route::AssessImpact => {
            let input: ImpactInput = read_json(req, limit).await?;
            ok(&assess_impact(&input)?)
        }
        Route::AssessSupplies => {
            let body: SuppliesBody = read_json(req, limit).await?;
            let plan = calculate_emergency_supplies(&body.request)?;
            let costs = body.unit_costs.unwrap_or_default();
            let budget = body
                .budget
                .map(|b| allocate_budget(b, &plan, &costs))
                .transpose()?;
            ok(&SuppliesReport { plan, budget })
        }
        Route::AssessAllocate => {
            let body: AllocateBody = read_json(req, limit).await?;
            ok(&allocate(body.total_units, &body.regions)?)
        }
    };
    Ok(resp)
}

fn query_params(req: &Request<Incoming>) -> HashMap<String, String> {
    req.uri()
        .query()
        .map(|q| form_urlencoded::parse(q.as_bytes()).into_owned().collect())
        .unwrap_or_default()
}

/// Filter and page for `GET /api/campaigns`.
///
/// Unparseable `page`/`limit` values fall back to their defaults; unknown
/// `status` or `disasterType` values are rejected.
fn campaign_query(params: &HashMap<String, String>) -> ReliefResult<(CampaignFilter, PageRequest)> {
    let number = |key: &str, default: usize| {
        params
            .get(key)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(default)
    };
    let page = PageRequest::new(number("page", 1), number("limit", DEFAULT_PAGE_SIZE));

    let present = |key: &str| params.get(key).map(String::as_str).filter(|v| !v.trim().is_empty());
    let filter = CampaignFilter {
        status: present("status").map(CampaignStatus::parse).transpose()?,
        disaster_type: present("disasterType").map(DisasterType::parse).transpose()?,
        query: present("q").map(str::to_owned),
    };
    Ok((filter, page))
}

/// Collect the request body, refusing anything over `limit` bytes.
async fn read_body(req: Request<Incoming>, limit: u64) -> ReliefResult<Bytes> {
    let declared = req
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if let Some(size) = declared.filter(|size| *size > limit) {
        return Err(ReliefError::PayloadTooLarge { size, limit });
    }

    let limited = Limited::new(req.into_body(), usize::try_from(limit).unwrap_or(usize::MAX));
    match limited.collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => Err(ReliefError::PayloadTooLarge {
            size: limit.saturating_add(1),
            limit,
        }),
        Err(e) => Err(ReliefError::Http(format!("failed to read request body: {e}"))),
    }
}

async fn read_json<T: DeserializeOwned>(req: Request<Incoming>, limit: u64) -> ReliefResult<T> {
    let bytes = read_body(req, limit).await?;
    serde_json::from_slice(&bytes).map_err(|e| ReliefError::InvalidInput(format!("invalid JSON body: {e}")))
}

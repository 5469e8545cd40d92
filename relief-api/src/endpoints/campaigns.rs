//! Campaign endpoints.

use relief_core::error::ReliefResult;
use relief_models::{Campaign, CampaignList, CampaignStatus, DisasterType, NewCampaign};

use crate::client::ApiClient;

/// Query parameters for listing campaigns. Unset fields are omitted.
#[derive(Debug, Clone, Default)]
pub struct CampaignQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    pub status: Option<CampaignStatus>,
    pub disaster_type: Option<DisasterType>,
    /// Free-text search over title, location, and description.
    pub q: Option<String>,
}

impl CampaignQuery {
    /// Encode as a query string, including the leading `?` when non-empty.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(page) = self.page {
            serializer.append_pair("page", &page.to_string());
        }
        if let Some(limit) = self.limit {
            serializer.append_pair("limit", &limit.to_string());
        }
        if let Some(status) = self.status {
            serializer.append_pair("status", status.as_str());
        }
        if let Some(kind) = self.disaster_type {
            serializer.append_pair("disasterType", kind.as_str());
        }
        if let Some(q) = self.q.as_deref().filter(|q| !q.is_empty()) {
            serializer.append_pair("q", q);
        }
        let encoded = serializer.finish();
        if encoded.is_empty() {
            encoded
        } else {
            format!("?{encoded}")
        }
    }
}

impl ApiClient {
    /// `GET /api/campaigns` with optional filters.
    pub async fn campaigns(&self, query: &CampaignQuery) -> ReliefResult<CampaignList> {
        self.get_json(&format!("/api/campaigns{}", query.to_query_string()))
            .await
    }

    /// `GET /api/campaigns/:id`.
    pub async fn campaign(&self, id: u64) -> ReliefResult<Campaign> {
        self.get_json(&format!("/api/campaigns/{id}")).await
    }

    /// `POST /api/campaigns`.
    pub async fn create_campaign(&self, new: &NewCampaign) -> ReliefResult<Campaign> {
        self.post_json("/api/campaigns", new).await
    }
}

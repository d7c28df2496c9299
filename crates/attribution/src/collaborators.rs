//! Narrow interfaces the facade uses to fetch input records and persist
//! result documents. Concrete implementations (database-backed, in-memory,
//! etc.) live outside this crate.

use crate::facade::AttributionResultDocument;
use async_trait::async_trait;
use b2b_attribution_core::{CampaignResult, Lead, Opportunity, Touchpoint};
use chrono::{DateTime, Utc};
use std::collections::HashSet;

/// The account-id / date-window filter shared by every load operation and
/// by all three read-only facade operations, so a single query is
/// guaranteed internally consistent across leads, opportunities, and
/// touchpoints.
#[derive(Debug, Clone, Default)]
pub struct QueryFilter {
    pub account_ids: Option<HashSet<String>>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl QueryFilter {
    pub fn validate(&self) -> CampaignResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to) {
            if to < from {
                return Err(b2b_attribution_core::AttributionError::validation(
                    "date window end precedes start",
                ));
            }
        }
        Ok(())
    }
}

/// Fetches already-loaded, already-filtered input records. The collaborator
/// is responsible for matching `account_id`, for applying the date window
/// where applicable, and for only returning won opportunities.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn load_leads(&self, filter: &QueryFilter) -> CampaignResult<Vec<Lead>>;
    async fn load_opportunities(&self, filter: &QueryFilter) -> CampaignResult<Vec<Opportunity>>;
    async fn load_touchpoints(&self, filter: &QueryFilter) -> CampaignResult<Vec<Touchpoint>>;
}

/// Persists a completed result document. Failures are logged by the
/// facade and never surfaced to the caller — the result has already been
/// returned by the time the writer runs.
#[async_trait]
pub trait ResultWriter: Send + Sync {
    async fn write_result(&self, doc: &AttributionResultDocument) -> CampaignResult<()>;
}

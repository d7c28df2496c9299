//! In-memory reference implementations of the `Storage` and `ResultWriter`
//! collaborators. Relational persistence is out of scope for the engine
//! (spec §1); this gives the binary something real to serve against.

use async_trait::async_trait;
use b2b_attribution_core::{CampaignResult, Lead, Opportunity, Touchpoint};
use b2b_attribution_engine::{AttributionResultDocument, QueryFilter, ResultWriter, Storage};
use dashmap::DashMap;
use uuid::Uuid;

#[derive(Default)]
pub struct InMemoryStorage {
    pub leads: Vec<Lead>,
    pub opportunities: Vec<Opportunity>,
    pub touchpoints: Vec<Touchpoint>,
}

impl InMemoryStorage {
    pub fn new(leads: Vec<Lead>, opportunities: Vec<Opportunity>, touchpoints: Vec<Touchpoint>) -> Self {
        Self {
            leads,
            opportunities,
            touchpoints,
        }
    }

    fn account_matches(filter: &QueryFilter, account_id: &str) -> bool {
        filter
            .account_ids
            .as_ref()
            .map(|ids| ids.contains(account_id))
            .unwrap_or(true)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn load_leads(&self, filter: &QueryFilter) -> CampaignResult<Vec<Lead>> {
        Ok(self
            .leads
            .iter()
            .filter(|l| Self::account_matches(filter, &l.account_id))
            .cloned()
            .collect())
    }

    async fn load_opportunities(&self, filter: &QueryFilter) -> CampaignResult<Vec<Opportunity>> {
        Ok(self
            .opportunities
            .iter()
            .filter(|o| Self::account_matches(filter, &o.account_id))
            .filter(|o| {
                let instant = o.conversion_instant();
                filter.from.map(|from| instant >= from).unwrap_or(true)
                    && filter.to.map(|to| instant <= to).unwrap_or(true)
            })
            .cloned()
            .collect())
    }

    async fn load_touchpoints(&self, filter: &QueryFilter) -> CampaignResult<Vec<Touchpoint>> {
        Ok(self
            .touchpoints
            .iter()
            .filter(|t| Self::account_matches(filter, &t.account_id))
            .filter(|t| {
                filter.from.map(|from| t.timestamp >= from).unwrap_or(true)
                    && filter.to.map(|to| t.timestamp <= to).unwrap_or(true)
            })
            .cloned()
            .collect())
    }
}

/// Keyed by an auto-generated id, per the persisted-state layout in §6.
#[derive(Default)]
pub struct InMemoryResultWriter {
    results: DashMap<Uuid, AttributionResultDocument>,
}

#[async_trait]
impl ResultWriter for InMemoryResultWriter {
    async fn write_result(&self, doc: &AttributionResultDocument) -> CampaignResult<()> {
        self.results.insert(Uuid::new_v4(), doc.clone());
        Ok(())
    }
}

use super::AttributionMap;
use crate::weighting::velocity_multiplier;
use b2b_attribution_core::{EngineConfig, Opportunity, Touchpoint, TouchpointType};

/// Per opportunity, stamps a velocity signal into each account touchpoint.
/// Touchpoints shared across multiple won opportunities on the same
/// account accumulate the sum of each opportunity's contribution.
pub fn pipeline_velocity_attribution(
    opportunities: &[Opportunity],
    touchpoints: &[Touchpoint],
    config: &EngineConfig,
) -> AttributionMap {
    let mut out = AttributionMap::new();

    for opp in opportunities {
        let expected = config.weight_tables.expected_cycle_days(opp.deal_size_tier);
        let velocity = velocity_multiplier(opp.sales_cycle_days, expected);

        for tp in touchpoints.iter().filter(|tp| tp.account_id == opp.account_id) {
            let base = tp.engagement_score / 100.0;
            let impact = match tp.touchpoint_type {
                TouchpointType::DemoRequest | TouchpointType::SalesCall => velocity * 1.2,
                _ => velocity,
            };
            *out.entry(tp.touchpoint_id.clone()).or_insert(0.0) += base * impact;
        }
    }

    out
}

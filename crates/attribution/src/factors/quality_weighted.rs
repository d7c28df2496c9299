use super::AttributionMap;
use b2b_attribution_core::{EngineConfig, Lead, Touchpoint};
use std::collections::HashMap;

/// Per-touchpoint quality-adjusted engagement score. Touchpoints whose
/// lead is unknown are skipped entirely; there is no normalization.
pub fn quality_weighted_attribution(
    touchpoints: &[Touchpoint],
    leads: &[Lead],
    config: &EngineConfig,
) -> AttributionMap {
    let leads_by_id: HashMap<&str, &Lead> =
        leads.iter().map(|l| (l.lead_id.as_str(), l)).collect();

    let mut out = AttributionMap::new();

    for tp in touchpoints {
        let Some(lead) = leads_by_id.get(tp.lead_id.as_str()) else {
            continue;
        };

        let base = tp.engagement_score / 100.0;
        let qual_mult = config.weight_tables.quality_multiplier(lead.quality_tier);
        let score_mult = (lead.lead_score as f64 / 100.0).min(2.0);
        let demo_bonus = 1.0 + lead.demographic_score as f64 / 1000.0;
        let firmo_bonus = 1.0 + lead.firmographic_score as f64 / 1000.0;

        let value = base * qual_mult * score_mult * demo_bonus * firmo_bonus;
        *out.entry(tp.touchpoint_id.clone()).or_insert(0.0) += value;
    }

    out
}

use super::AttributionMap;
use crate::weighting::{account_complexity_multiplier, committee_factor};
use b2b_attribution_core::{EngineConfig, Opportunity, Touchpoint};

/// Per opportunity, weights touchpoints by type, engagement, a sales/
/// marketing multiplier, account complexity, committee size, and deal-size
/// tier, then normalizes the per-opportunity shares to the deal amount.
pub fn account_based_attribution(
    opportunities: &[Opportunity],
    touchpoints: &[Touchpoint],
    config: &EngineConfig,
) -> AttributionMap {
    let mut out = AttributionMap::new();

    for opp in opportunities {
        let complexity = account_complexity_multiplier(
            opp.deal_size_tier,
            opp.decision_makers_count,
            opp.influencers_count,
            opp.sales_cycle_days,
        );
        let committee = committee_factor(opp.decision_makers_count, opp.influencers_count);
        let deal_size_mult = config.weight_tables.deal_size_multiplier(opp.deal_size_tier);

        let account_touchpoints: Vec<&Touchpoint> = touchpoints
            .iter()
            .filter(|tp| tp.account_id == opp.account_id)
            .collect();

        if account_touchpoints.is_empty() {
            continue;
        }

        let weights: Vec<(String, f64)> = account_touchpoints
            .iter()
            .map(|tp| {
                let mut base = config.weight_tables.touchpoint_type_weight(tp.touchpoint_type)
                    * (tp.engagement_score / 100.0);
                if tp.is_sales_touch {
                    base *= 1.3;
                } else if tp.is_marketing_touch {
                    base *= 1.0;
                }
                let w = base * complexity * committee * deal_size_mult;
                (tp.touchpoint_id.clone(), w)
            })
            .collect();

        let total: f64 = weights.iter().map(|(_, w)| w).sum();
        if total <= 0.0 {
            continue;
        }

        for (id, w) in weights {
            let share = w / total * opp.amount;
            *out.entry(id).or_insert(0.0) += share;
        }
    }

    out
}

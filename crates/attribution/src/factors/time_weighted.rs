use super::AttributionMap;
use crate::weighting::{derived_half_life, time_decay_kernel};
use b2b_attribution_core::{EngineConfig, Opportunity, Touchpoint};

/// Per opportunity, normalizes decayed-and-type-weighted touchpoint shares
/// to the deal amount. Touchpoints shared across opportunities on the same
/// account accumulate contributions.
pub fn time_weighted_attribution(
    opportunities: &[Opportunity],
    touchpoints: &[Touchpoint],
    config: &EngineConfig,
) -> AttributionMap {
    let mut out = AttributionMap::new();

    for opp in opportunities {
        let conversion_instant = opp.conversion_instant();
        let half_life = derived_half_life(
            opp.sales_cycle_days,
            config.half_life_cycle_fraction,
            config.half_life_floor_days,
        );

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
                let kernel = time_decay_kernel(tp.timestamp, conversion_instant, half_life);
                let type_weight = config.weight_tables.touchpoint_type_weight(tp.touchpoint_type);
                (tp.touchpoint_id.clone(), kernel * type_weight)
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

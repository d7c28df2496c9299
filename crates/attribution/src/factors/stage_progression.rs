use super::AttributionMap;
use b2b_attribution_core::{EngineConfig, Touchpoint};

/// Per touchpoint, independently: engagement scaled by its stage and type
/// weight. No normalization, no coupling to opportunities.
pub fn stage_progression_attribution(
    touchpoints: &[Touchpoint],
    config: &EngineConfig,
) -> AttributionMap {
    touchpoints
        .iter()
        .map(|tp| {
            let value = (tp.engagement_score / 100.0)
                * config.weight_tables.stage_weight(tp.stage_influence)
                * config.weight_tables.touchpoint_type_weight(tp.touchpoint_type);
            (tp.touchpoint_id.clone(), value)
        })
        .collect()
}

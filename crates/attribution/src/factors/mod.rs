//! The five stateless factor calculators. Each takes immutable slices of
//! input records and returns a mapping from touchpoint_id to a
//! non-negative real; touchpoints not mentioned are implicitly 0. All are
//! pure and safe to run concurrently.

mod account_based;
mod pipeline_velocity;
mod quality_weighted;
mod stage_progression;
mod time_weighted;

pub use account_based::account_based_attribution;
pub use pipeline_velocity::pipeline_velocity_attribution;
pub use quality_weighted::quality_weighted_attribution;
pub use stage_progression::stage_progression_attribution;
pub use time_weighted::time_weighted_attribution;

use std::collections::HashMap;

/// A mapping from `touchpoint_id` to its attributed value under one factor.
pub type AttributionMap = HashMap<String, f64>;

#[cfg(test)]
mod invariant_tests {
    use super::*;
    use b2b_attribution_core::{
        DealSizeTier, EngineConfig, Lead, Opportunity, QualityTier, Stage, Touchpoint,
        TouchpointType,
    };
    use chrono::{Duration, Utc};
    use std::collections::HashSet;

    fn make_opportunity(account_id: &str, amount: f64, cycle_days: u32) -> Opportunity {
        let now = Utc::now();
        Opportunity {
            opportunity_id: format!("opp-{account_id}"),
            account_id: account_id.to_string(),
            lead_ids: HashSet::from(["lead-1".to_string()]),
            amount,
            created_date: now - Duration::days(cycle_days as i64),
            close_date: Some(now),
            sales_cycle_days: cycle_days,
            deal_size_tier: DealSizeTier::MidMarket,
            decision_makers_count: 1,
            influencers_count: 1,
        }
    }

    fn make_touchpoint(id: &str, account_id: &str, days_ago: i64, engagement: f64) -> Touchpoint {
        Touchpoint {
            touchpoint_id: id.to_string(),
            lead_id: "lead-1".to_string(),
            account_id: account_id.to_string(),
            timestamp: Utc::now() - Duration::days(days_ago),
            touchpoint_type: TouchpointType::ContentDownload,
            channel: "email".to_string(),
            engagement_score: engagement,
            stage_influence: Stage::Consideration,
            cost: 10.0,
            is_sales_touch: false,
            is_marketing_touch: true,
            campaign_id: None,
            content_id: None,
            sales_rep_id: None,
        }
    }

    fn make_lead(id: &str, account_id: &str) -> Lead {
        Lead {
            lead_id: id.to_string(),
            account_id: account_id.to_string(),
            lead_score: 70,
            demographic_score: 60,
            behavioral_score: 60,
            firmographic_score: 60,
            quality_tier: QualityTier::B,
            created_date: Utc::now() - Duration::days(30),
            stage: Stage::Consideration,
            source: "web".to_string(),
        }
    }

    #[test]
    fn time_weighted_conserves_opportunity_amount() {
        let cfg = EngineConfig::default();
        let opp = make_opportunity("acct-1", 1000.0, 60);
        let touchpoints = vec![
            make_touchpoint("t1", "acct-1", 60, 50.0),
            make_touchpoint("t2", "acct-1", 0, 50.0),
        ];
        let map = time_weighted_attribution(&[opp], &touchpoints, &cfg);
        let sum: f64 = map.values().sum();
        assert!((sum - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn account_based_conserves_opportunity_amount() {
        let cfg = EngineConfig::default();
        let opp = make_opportunity("acct-1", 1000.0, 60);
        let touchpoints = vec![
            make_touchpoint("t1", "acct-1", 60, 50.0),
            make_touchpoint("t2", "acct-1", 0, 50.0),
        ];
        let map = account_based_attribution(&[opp], &touchpoints, &cfg);
        let sum: f64 = map.values().sum();
        assert!((sum - 1000.0).abs() < 1e-6);
    }

    #[test]
    fn all_factors_are_non_negative_and_finite() {
        let cfg = EngineConfig::default();
        let opp = make_opportunity("acct-1", 1000.0, 60);
        let touchpoints = vec![
            make_touchpoint("t1", "acct-1", 60, 50.0),
            make_touchpoint("t2", "acct-1", 0, 50.0),
        ];
        let leads = vec![make_lead("lead-1", "acct-1")];

        let maps: Vec<AttributionMap> = vec![
            time_weighted_attribution(&[opp.clone()], &touchpoints, &cfg),
            quality_weighted_attribution(&touchpoints, &leads, &cfg),
            account_based_attribution(&[opp.clone()], &touchpoints, &cfg),
            stage_progression_attribution(&touchpoints, &cfg),
            pipeline_velocity_attribution(&[opp], &touchpoints, &cfg),
        ];
        for map in maps {
            for v in map.values() {
                assert!(v.is_finite());
                assert!(*v >= 0.0);
            }
        }
    }

    #[test]
    fn opportunity_with_no_touchpoints_contributes_nothing() {
        let cfg = EngineConfig::default();
        let opp = make_opportunity("acct-lonely", 500.0, 60);
        let map = time_weighted_attribution(&[opp], &[], &cfg);
        assert!(map.is_empty());
    }
}

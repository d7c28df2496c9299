//! Literal end-to-end scenarios (S1-S6): fixed inputs, fixed expected
//! outputs, exercised through the public facade.

use async_trait::async_trait;
use b2b_attribution_core::{
    AttributionError, CampaignResult, CombineWeights, DealSizeTier, EngineConfig, Lead,
    Opportunity, QualityTier, Stage, Touchpoint, TouchpointType,
};
use b2b_attribution_engine::{AttributionFacade, Outcome, QueryFilter, ResultWriter, Storage};
use chrono::{Duration, TimeZone, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

struct FixedStorage {
    leads: Vec<Lead>,
    opportunities: Vec<Opportunity>,
    touchpoints: Vec<Touchpoint>,
}

#[async_trait]
impl Storage for FixedStorage {
    async fn load_leads(&self, _filter: &QueryFilter) -> CampaignResult<Vec<Lead>> {
        Ok(self.leads.clone())
    }
    async fn load_opportunities(&self, _filter: &QueryFilter) -> CampaignResult<Vec<Opportunity>> {
        Ok(self.opportunities.clone())
    }
    async fn load_touchpoints(&self, _filter: &QueryFilter) -> CampaignResult<Vec<Touchpoint>> {
        Ok(self.touchpoints.clone())
    }
}

#[derive(Default)]
struct RecordingWriter {
    write_count: Mutex<usize>,
}

#[async_trait]
impl ResultWriter for RecordingWriter {
    async fn write_result(
        &self,
        _doc: &b2b_attribution_engine::AttributionResultDocument,
    ) -> CampaignResult<()> {
        *self.write_count.lock().unwrap() += 1;
        Ok(())
    }
}

fn day(n: i64) -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

/// S1 and S6 both need an expected-cycle table tuned so the velocity
/// factor's "actual == expected" / "half of expected" premises hold for a
/// chosen `sales_cycle_days`, without disturbing the other defaults.
fn config_with_expected_cycle(tier: DealSizeTier, days: u32) -> EngineConfig {
    let mut cfg = EngineConfig::default();
    cfg.weight_tables.expected_cycle_days.insert(tier, days);
    cfg
}

fn s1_opportunity() -> Opportunity {
    Opportunity {
        opportunity_id: "O".to_string(),
        account_id: "acct-1".to_string(),
        lead_ids: HashSet::from(["lead-1".to_string()]),
        amount: 1000.0,
        created_date: day(0),
        close_date: Some(day(100)),
        sales_cycle_days: 100,
        deal_size_tier: DealSizeTier::Smb,
        decision_makers_count: 1,
        influencers_count: 1,
    }
}

fn s1_touchpoint() -> Touchpoint {
    Touchpoint {
        touchpoint_id: "T".to_string(),
        lead_id: "lead-1".to_string(),
        account_id: "acct-1".to_string(),
        timestamp: day(100),
        touchpoint_type: TouchpointType::DemoRequest,
        channel: "website".to_string(),
        engagement_score: 80.0,
        stage_influence: Stage::Evaluation,
        cost: 0.0,
        is_sales_touch: true,
        is_marketing_touch: true,
        campaign_id: None,
        content_id: None,
        sales_rep_id: None,
    }
}

fn s1_lead() -> Lead {
    Lead {
        lead_id: "lead-1".to_string(),
        account_id: "acct-1".to_string(),
        lead_score: 70,
        demographic_score: 60,
        behavioral_score: 60,
        firmographic_score: 60,
        quality_tier: QualityTier::B,
        created_date: day(-30),
        stage: Stage::Evaluation,
        source: "web".to_string(),
    }
}

#[tokio::test]
async fn s1_single_touchpoint_single_deal() {
    let config = config_with_expected_cycle(DealSizeTier::Smb, 100);
    let storage = Arc::new(FixedStorage {
        leads: vec![s1_lead()],
        opportunities: vec![s1_opportunity()],
        touchpoints: vec![s1_touchpoint()],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(config, storage, writer);

    let result = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();

    let Outcome::Completed(r) = result else {
        panic!("expected completion");
    };

    assert!((r.time_weighted["T"] - 1000.0).abs() < 1e-6);
    assert!((r.account_based["T"] - 1000.0).abs() < 1e-6);
    assert!((r.quality_weighted["T"] - 0.755).abs() < 1e-3);
    assert!((r.stage_progression["T"] - 1.8).abs() < 1e-9);
    assert!((r.pipeline_velocity["T"] - 0.96).abs() < 1e-9);
    assert!((r.combined["T"] - 500.55).abs() < 1e-2);

    assert_eq!(r.summary.top_touchpoints[0].touchpoint_id, "T");

    assert_eq!(r.alignment.score, 0.0);
    assert_eq!(r.alignment.grade, "F");
}

#[tokio::test]
async fn s2_two_touchpoints_conservation() {
    let opp = Opportunity {
        opportunity_id: "O".to_string(),
        account_id: "acct-1".to_string(),
        lead_ids: HashSet::from(["lead-1".to_string()]),
        amount: 1000.0,
        created_date: day(0),
        close_date: Some(day(60)),
        sales_cycle_days: 60,
        deal_size_tier: DealSizeTier::Smb,
        decision_makers_count: 1,
        influencers_count: 1,
    };
    let touchpoint = |id: &str, at: i64| Touchpoint {
        touchpoint_id: id.to_string(),
        lead_id: "lead-1".to_string(),
        account_id: "acct-1".to_string(),
        timestamp: day(at),
        touchpoint_type: TouchpointType::ContentDownload,
        channel: "email".to_string(),
        engagement_score: 50.0,
        stage_influence: Stage::Interest,
        cost: 0.0,
        is_sales_touch: false,
        is_marketing_touch: true,
        campaign_id: None,
        content_id: None,
        sales_rep_id: None,
    };

    let storage = Arc::new(FixedStorage {
        leads: vec![],
        opportunities: vec![opp],
        touchpoints: vec![touchpoint("A", 0), touchpoint("B", 60)],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

    let result = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();

    let Outcome::Completed(r) = result else {
        panic!("expected completion");
    };

    let sum: f64 = r.time_weighted.values().sum();
    assert!((sum - 1000.0).abs() < 1e-6);
    assert!((r.time_weighted["A"] - 34.47).abs() < 0.1);
    assert!((r.time_weighted["B"] - 965.53).abs() < 0.1);
}

#[tokio::test]
async fn s3_cancellation_skips_writer_and_leaves_result_untouched() {
    let config = EngineConfig::default();
    let storage = Arc::new(FixedStorage {
        leads: vec![s1_lead()],
        opportunities: vec![s1_opportunity()],
        touchpoints: vec![s1_touchpoint()],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(config, storage, writer.clone());

    let cancel = CancellationToken::new();
    cancel.cancel();
    let cancelled = facade
        .calculate(QueryFilter::default(), None, cancel)
        .await
        .unwrap();
    assert!(matches!(cancelled, Outcome::Cancelled));
    assert_eq!(*writer.write_count.lock().unwrap(), 0);

    let first = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();
    let second = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();

    let (Outcome::Completed(a), Outcome::Completed(b)) = (first, second) else {
        panic!("expected completion");
    };
    assert_eq!(a.combined, b.combined);
}

#[tokio::test]
async fn s4_no_touchpoints_in_window() {
    let storage = Arc::new(FixedStorage {
        leads: vec![],
        opportunities: vec![s1_opportunity()],
        touchpoints: vec![],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(EngineConfig::default(), storage, writer.clone());

    let result = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();

    let Outcome::Completed(r) = result else {
        panic!("expected completion");
    };

    assert!(r.time_weighted.is_empty());
    assert!(r.combined.is_empty());
    assert_eq!(r.summary.total, 0.0);
    assert_eq!(r.summary.count, 0);
    assert!(r.channel_performance.is_empty());
    assert_eq!(r.alignment.score, 0.0);
    assert_eq!(r.alignment.grade, "F");
    assert_eq!(*writer.write_count.lock().unwrap(), 1);
}

#[tokio::test]
async fn s5_weight_override_matches_single_factor() {
    let config = config_with_expected_cycle(DealSizeTier::Smb, 100);
    let storage = Arc::new(FixedStorage {
        leads: vec![s1_lead()],
        opportunities: vec![s1_opportunity()],
        touchpoints: vec![s1_touchpoint()],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(config, storage, writer);

    let weights = CombineWeights {
        time: 1.0,
        quality: 0.0,
        account: 0.0,
        stage: 0.0,
        velocity: 0.0,
    };
    let result = facade
        .calculate(QueryFilter::default(), Some(weights), CancellationToken::new())
        .await
        .unwrap();
    let Outcome::Completed(r) = result else {
        panic!("expected completion");
    };
    assert!((r.combined["T"] - r.time_weighted["T"]).abs() < 1e-9);
}

#[tokio::test]
async fn s5_all_zero_weights_rejected() {
    let storage = Arc::new(FixedStorage {
        leads: vec![s1_lead()],
        opportunities: vec![s1_opportunity()],
        touchpoints: vec![s1_touchpoint()],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

    let weights = CombineWeights {
        time: 0.0,
        quality: 0.0,
        account: 0.0,
        stage: 0.0,
        velocity: 0.0,
    };
    let err = facade
        .calculate(QueryFilter::default(), Some(weights), CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, AttributionError::Validation(_)));
}

#[tokio::test]
async fn s6_accelerated_enterprise_deal() {
    let opp = Opportunity {
        opportunity_id: "O".to_string(),
        account_id: "acct-1".to_string(),
        lead_ids: HashSet::from(["lead-1".to_string()]),
        amount: 100_000.0,
        created_date: day(0),
        close_date: Some(day(135)),
        sales_cycle_days: 135,
        deal_size_tier: DealSizeTier::Enterprise,
        decision_makers_count: 3,
        influencers_count: 2,
    };
    let touchpoint = Touchpoint {
        touchpoint_id: "T".to_string(),
        lead_id: "lead-1".to_string(),
        account_id: "acct-1".to_string(),
        timestamp: day(135),
        touchpoint_type: TouchpointType::DemoRequest,
        channel: "sales".to_string(),
        engagement_score: 100.0,
        stage_influence: Stage::Evaluation,
        cost: 0.0,
        is_sales_touch: true,
        is_marketing_touch: false,
        campaign_id: None,
        content_id: None,
        sales_rep_id: None,
    };

    let storage = Arc::new(FixedStorage {
        leads: vec![],
        opportunities: vec![opp],
        touchpoints: vec![touchpoint],
    });
    let writer = Arc::new(RecordingWriter::default());
    let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

    let result = facade
        .calculate(QueryFilter::default(), None, CancellationToken::new())
        .await
        .unwrap();
    let Outcome::Completed(r) = result else {
        panic!("expected completion");
    };

    assert!((r.account_based["T"] - 100_000.0).abs() < 1e-6);
    assert!((r.pipeline_velocity["T"] - 1.5).abs() < 1e-9);
}

//! The Service Facade: orchestrates load → compute → analyze → summarize
//! → persist, and exposes the four public operations named in §4.5.

use crate::analyzer::{alignment_report as compute_alignment_report, channel_performance, AlignmentReport, ChannelPerformance};
use crate::collaborators::{QueryFilter, ResultWriter, Storage};
use crate::combiner::{combine, resolve_weights, summarize, CombinerSummary, FactorMaps};
use crate::factors::{
    account_based_attribution, pipeline_velocity_attribution, quality_weighted_attribution,
    stage_progression_attribution, time_weighted_attribution, AttributionMap,
};
use b2b_attribution_core::{CampaignResult, CombineWeights, EngineConfig, WeightTables};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub const MODEL_NAME: &str = "B2B_Marketing_Attribution";

/// The outcome of a cancellable operation: either it ran to completion, or
/// it was cancelled. Cancellation is a distinct outcome, not an error.
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultMetadata {
    pub account_filter: Option<Vec<String>>,
    pub model_type: String,
    pub effective_weights: CombineWeights,
}

/// The full result body returned by `calculate`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttributionResult {
    pub time_weighted: AttributionMap,
    pub quality_weighted: AttributionMap,
    pub account_based: AttributionMap,
    pub stage_progression: AttributionMap,
    pub pipeline_velocity: AttributionMap,
    pub combined: AttributionMap,
    pub summary: CombinerSummary,
    pub channel_performance: Vec<ChannelPerformance>,
    pub channel_insights: Vec<String>,
    pub alignment: AlignmentReport,
    pub metadata: ResultMetadata,
}

/// What gets handed to the result-writer collaborator: the model name,
/// creation instant, full body, and a metadata sub-block — exactly the
/// persisted-state layout in §6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionResultDocument {
    pub model_name: String,
    pub created_at: DateTime<Utc>,
    pub payload: AttributionResult,
    pub metadata: ResultMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelInsightsResult {
    pub channels: Vec<ChannelPerformance>,
    pub insights: Vec<String>,
    pub best_channel: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TouchpointTypeInfo {
    pub touchpoint_type: String,
    pub weight: f64,
    pub category: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub model_name: String,
    pub version: String,
    pub description: String,
    pub factors: Vec<FactorInfo>,
    pub features: Vec<String>,
    pub touchpoint_types: Vec<TouchpointTypeInfo>,
    pub stage_weights: Vec<(String, f64)>,
    pub quality_multipliers: Vec<(String, f64)>,
    pub expected_cycle_days: Vec<(String, u32)>,
    pub default_combine_weights: CombineWeights,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorInfo {
    pub name: String,
    pub description: String,
    pub default_weight: f64,
}

fn touchpoint_category(t: b2b_attribution_core::TouchpointType) -> &'static str {
    use b2b_attribution_core::TouchpointType::*;
    match t {
        DemoRequest | SalesCall => "High Intent",
        WebinarAttendance | TradeShow | ContentDownload => "Engagement",
        EmailEngagement | DirectMail => "Nurturing",
        WebsiteVisit | SocialEngagement => "Awareness",
        Referral => "Referral",
    }
}

fn touchpoint_description(t: b2b_attribution_core::TouchpointType) -> &'static str {
    use b2b_attribution_core::TouchpointType::*;
    match t {
        ContentDownload => "Downloaded gated marketing content such as a whitepaper or case study",
        WebinarAttendance => "Attended a live or recorded webinar",
        DemoRequest => "Requested a product demonstration",
        TradeShow => "Engaged at a trade show or industry event",
        SalesCall => "Participated in a call with a sales representative",
        EmailEngagement => "Opened or clicked a marketing email",
        WebsiteVisit => "Visited the website without a tracked conversion",
        SocialEngagement => "Engaged with a social media post or ad",
        DirectMail => "Received a physical direct-mail piece",
        Referral => "Was referred by an existing customer or partner",
    }
}

/// Orchestrates the engine. Generic over the storage and writer
/// collaborators so tests can supply in-memory fakes.
pub struct AttributionFacade<S: Storage, W: ResultWriter> {
    config: EngineConfig,
    storage: Arc<S>,
    writer: Arc<W>,
}

impl<S: Storage, W: ResultWriter> AttributionFacade<S, W> {
    pub fn new(config: EngineConfig, storage: Arc<S>, writer: Arc<W>) -> Self {
        Self {
            config,
            storage,
            writer,
        }
    }

    /// Loads leads, opportunities, and touchpoints with the same filter,
    /// guaranteeing internal consistency across operations on the same
    /// window (§4.5 load-order invariant).
    async fn load(
        &self,
        filter: &QueryFilter,
    ) -> CampaignResult<(
        Vec<b2b_attribution_core::Lead>,
        Vec<b2b_attribution_core::Opportunity>,
        Vec<b2b_attribution_core::Touchpoint>,
    )> {
        let leads = self.storage.load_leads(filter).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch leads");
            e
        })?;
        let opportunities = self.storage.load_opportunities(filter).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch opportunities");
            e
        })?;
        let touchpoints = self.storage.load_touchpoints(filter).await.map_err(|e| {
            tracing::error!(error = %e, "failed to fetch touchpoints");
            e
        })?;

        let opp_accounts: HashSet<&str> = opportunities.iter().map(|o| o.account_id.as_str()).collect();
        for tp in &touchpoints {
            if !opp_accounts.contains(tp.account_id.as_str()) {
                tracing::warn!(
                    touchpoint_id = %tp.touchpoint_id,
                    account_id = %tp.account_id,
                    "touchpoint references an account with no opportunities in window"
                );
            }
        }

        Ok((leads, opportunities, touchpoints))
    }

    /// Runs the five factor calculators in parallel on independent worker
    /// tasks; they share only the immutable input slices. The combiner
    /// joins once all five complete.
    async fn compute_factors(
        &self,
        opportunities: Arc<Vec<b2b_attribution_core::Opportunity>>,
        touchpoints: Arc<Vec<b2b_attribution_core::Touchpoint>>,
        leads: Arc<Vec<b2b_attribution_core::Lead>>,
    ) -> CampaignResult<(
        AttributionMap,
        AttributionMap,
        AttributionMap,
        AttributionMap,
        AttributionMap,
    )> {
        let config = self.config.clone();

        let opps1 = opportunities.clone();
        let tps1 = touchpoints.clone();
        let cfg1 = config.clone();
        let time_weighted = tokio::task::spawn_blocking(move || {
            time_weighted_attribution(&opps1, &tps1, &cfg1)
        });

        let tps2 = touchpoints.clone();
        let leads2 = leads.clone();
        let cfg2 = config.clone();
        let quality_weighted =
            tokio::task::spawn_blocking(move || quality_weighted_attribution(&tps2, &leads2, &cfg2));

        let opps3 = opportunities.clone();
        let tps3 = touchpoints.clone();
        let cfg3 = config.clone();
        let account_based =
            tokio::task::spawn_blocking(move || account_based_attribution(&opps3, &tps3, &cfg3));

        let tps4 = touchpoints.clone();
        let cfg4 = config.clone();
        let stage_progression =
            tokio::task::spawn_blocking(move || stage_progression_attribution(&tps4, &cfg4));

        let opps5 = opportunities.clone();
        let tps5 = touchpoints.clone();
        let cfg5 = config.clone();
        let pipeline_velocity =
            tokio::task::spawn_blocking(move || pipeline_velocity_attribution(&opps5, &tps5, &cfg5));

        let (time_weighted, quality_weighted, account_based, stage_progression, pipeline_velocity) =
            tokio::try_join!(
                time_weighted,
                quality_weighted,
                account_based,
                stage_progression,
                pipeline_velocity,
            )
            .map_err(|e| b2b_attribution_core::AttributionError::Internal(e.into()))?;

        Ok((
            time_weighted,
            quality_weighted,
            account_based,
            stage_progression,
            pipeline_velocity,
        ))
    }

    /// Operation 1: full calculate. Persists the result through the
    /// writer as a side effect; writer failures are logged, not
    /// propagated.
    pub async fn calculate(
        &self,
        filter: QueryFilter,
        weights: Option<CombineWeights>,
        cancel: CancellationToken,
    ) -> CampaignResult<Outcome<AttributionResult>> {
        let start = std::time::Instant::now();
        filter.validate()?;
        let resolved_weights = resolve_weights(weights, self.config.default_combine_weights)?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let (leads, opportunities, touchpoints) = self.load(&filter).await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let opportunities = Arc::new(opportunities);
        let touchpoints = Arc::new(touchpoints);
        let leads = Arc::new(leads);

        let (time_weighted, quality_weighted, account_based, stage_progression, pipeline_velocity) =
            self.compute_factors(opportunities.clone(), touchpoints.clone(), leads.clone())
                .await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let maps = FactorMaps {
            time_weighted: &time_weighted,
            quality_weighted: &quality_weighted,
            account_based: &account_based,
            stage_progression: &stage_progression,
            pipeline_velocity: &pipeline_velocity,
        };
        let combined = combine(&maps, &resolved_weights);
        let summary = summarize(&combined);
        let (channels, channel_insights) = channel_performance(&combined, &touchpoints);
        let alignment = compute_alignment_report(&combined, &touchpoints);

        let metadata = ResultMetadata {
            account_filter: filter.account_ids.map(|s| {
                let mut v: Vec<String> = s.into_iter().collect();
                v.sort();
                v
            }),
            model_type: MODEL_NAME.to_string(),
            effective_weights: resolved_weights,
        };

        let result = AttributionResult {
            time_weighted,
            quality_weighted,
            account_based,
            stage_progression,
            pipeline_velocity,
            combined,
            summary,
            channel_performance: channels,
            channel_insights,
            alignment,
            metadata: metadata.clone(),
        };

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let doc = AttributionResultDocument {
            model_name: MODEL_NAME.to_string(),
            created_at: Utc::now(),
            payload: result.clone(),
            metadata,
        };

        if let Err(e) = self.writer.write_result(&doc).await {
            tracing::warn!(error = %e, "result writer failed, result already returned to caller");
        }

        tracing::info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            touchpoint_count = result.summary.count,
            "attribution calculate completed"
        );

        Ok(Outcome::Completed(result))
    }

    /// Operation 2: channel insights only, using default combine weights.
    pub async fn channel_insights(
        &self,
        filter: QueryFilter,
        cancel: CancellationToken,
    ) -> CampaignResult<Outcome<ChannelInsightsResult>> {
        filter.validate()?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let (leads, opportunities, touchpoints) = self.load(&filter).await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let opportunities = Arc::new(opportunities);
        let touchpoints = Arc::new(touchpoints);
        let leads = Arc::new(leads);

        let (time_weighted, quality_weighted, account_based, stage_progression, pipeline_velocity) =
            self.compute_factors(opportunities, touchpoints.clone(), leads).await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let maps = FactorMaps {
            time_weighted: &time_weighted,
            quality_weighted: &quality_weighted,
            account_based: &account_based,
            stage_progression: &stage_progression,
            pipeline_velocity: &pipeline_velocity,
        };
        let combined = combine(&maps, &self.config.default_combine_weights);
        let (channels, insights) = channel_performance(&combined, &touchpoints);
        let best_channel = channels.first().map(|c| c.channel.clone());

        Ok(Outcome::Completed(ChannelInsightsResult {
            channels,
            insights,
            best_channel,
        }))
    }

    /// Operation 3: alignment report only, using default combine weights.
    pub async fn alignment_report(
        &self,
        filter: QueryFilter,
        cancel: CancellationToken,
    ) -> CampaignResult<Outcome<AlignmentReport>> {
        filter.validate()?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let (leads, opportunities, touchpoints) = self.load(&filter).await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let opportunities = Arc::new(opportunities);
        let touchpoints = Arc::new(touchpoints);
        let leads = Arc::new(leads);

        let (time_weighted, quality_weighted, account_based, stage_progression, pipeline_velocity) =
            self.compute_factors(opportunities, touchpoints.clone(), leads).await?;

        if cancel.is_cancelled() {
            return Ok(Outcome::Cancelled);
        }

        let maps = FactorMaps {
            time_weighted: &time_weighted,
            quality_weighted: &quality_weighted,
            account_based: &account_based,
            stage_progression: &stage_progression,
            pipeline_velocity: &pipeline_velocity,
        };
        let combined = combine(&maps, &self.config.default_combine_weights);

        Ok(Outcome::Completed(compute_alignment_report(&combined, &touchpoints)))
    }

    /// Operation 4: model introspection. No I/O, no inputs.
    pub fn model_introspection(&self) -> ModelInfo {
        let tables: &WeightTables = &self.config.weight_tables;

        let touchpoint_types = b2b_attribution_core::TouchpointType::ALL
            .iter()
            .map(|t| TouchpointTypeInfo {
                touchpoint_type: t.as_str().to_string(),
                weight: tables.touchpoint_type_weight(*t),
                category: touchpoint_category(*t).to_string(),
                description: touchpoint_description(*t).to_string(),
            })
            .collect();

        let stage_weights = vec![
            ("awareness".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Awareness)),
            ("interest".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Interest)),
            ("consideration".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Consideration)),
            ("intent".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Intent)),
            ("evaluation".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Evaluation)),
            ("purchase".to_string(), tables.stage_weight(b2b_attribution_core::Stage::Purchase)),
        ];

        let quality_multipliers = vec![
            ("a".to_string(), tables.quality_multiplier(b2b_attribution_core::QualityTier::A)),
            ("b".to_string(), tables.quality_multiplier(b2b_attribution_core::QualityTier::B)),
            ("c".to_string(), tables.quality_multiplier(b2b_attribution_core::QualityTier::C)),
            ("d".to_string(), tables.quality_multiplier(b2b_attribution_core::QualityTier::D)),
        ];

        let expected_cycle_days = vec![
            ("enterprise".to_string(), tables.expected_cycle_days(b2b_attribution_core::DealSizeTier::Enterprise)),
            ("mid_market".to_string(), tables.expected_cycle_days(b2b_attribution_core::DealSizeTier::MidMarket)),
            ("smb".to_string(), tables.expected_cycle_days(b2b_attribution_core::DealSizeTier::Smb)),
        ];

        ModelInfo {
            model_name: MODEL_NAME.to_string(),
            version: "1.0".to_string(),
            description: "B2B marketing attribution combining time-decay, lead quality, account complexity, funnel stage, and deal velocity".to_string(),
            factors: vec![
                FactorInfo {
                    name: "time_weighted".to_string(),
                    description: "Exponential time-decay credit toward the close date, scaled by touchpoint type".to_string(),
                    default_weight: self.config.default_combine_weights.time,
                },
                FactorInfo {
                    name: "quality_weighted".to_string(),
                    description: "Lead-quality-adjusted engagement score, independent of deal value".to_string(),
                    default_weight: self.config.default_combine_weights.quality,
                },
                FactorInfo {
                    name: "account_based".to_string(),
                    description: "Deal-value credit scaled by account complexity, buying-committee size, and deal tier".to_string(),
                    default_weight: self.config.default_combine_weights.account,
                },
                FactorInfo {
                    name: "stage_progression".to_string(),
                    description: "Per-touchpoint engagement scaled by funnel-stage weight".to_string(),
                    default_weight: self.config.default_combine_weights.stage,
                },
                FactorInfo {
                    name: "pipeline_velocity".to_string(),
                    description: "Engagement scaled by how the deal's actual cycle compares to its expected cycle".to_string(),
                    default_weight: self.config.default_combine_weights.velocity,
                },
            ],
            features: vec![
                "account-based complexity multiplier".to_string(),
                "buying-committee size weighting".to_string(),
                "deal-size tier multipliers".to_string(),
                "pipeline-velocity scoring".to_string(),
                "sales/marketing alignment diagnostics".to_string(),
            ],
            touchpoint_types,
            stage_weights,
            quality_multipliers,
            expected_cycle_days,
            default_combine_weights: self.config.default_combine_weights,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{QueryFilter, ResultWriter, Storage};
    use async_trait::async_trait;
    use b2b_attribution_core::{Lead, Opportunity, Touchpoint};
    use std::sync::Mutex;

    struct FakeStorage {
        leads: Vec<Lead>,
        opportunities: Vec<Opportunity>,
        touchpoints: Vec<Touchpoint>,
    }

    #[async_trait]
    impl Storage for FakeStorage {
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
    struct FakeWriter {
        writes: Mutex<Vec<AttributionResultDocument>>,
    }

    #[async_trait]
    impl ResultWriter for FakeWriter {
        async fn write_result(&self, doc: &AttributionResultDocument) -> CampaignResult<()> {
            self.writes.lock().unwrap().push(doc.clone());
            Ok(())
        }
    }

    #[tokio::test]
    async fn calculate_rejects_invalid_date_window() {
        let storage = Arc::new(FakeStorage {
            leads: vec![],
            opportunities: vec![],
            touchpoints: vec![],
        });
        let writer = Arc::new(FakeWriter::default());
        let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

        let filter = QueryFilter {
            account_ids: None,
            from: Some(Utc::now()),
            to: Some(Utc::now() - chrono::Duration::days(1)),
        };

        let result = facade.calculate(filter, None, CancellationToken::new()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn calculate_rejects_all_zero_weights() {
        let storage = Arc::new(FakeStorage {
            leads: vec![],
            opportunities: vec![],
            touchpoints: vec![],
        });
        let writer = Arc::new(FakeWriter::default());
        let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

        let weights = CombineWeights {
            time: 0.0,
            quality: 0.0,
            account: 0.0,
            stage: 0.0,
            velocity: 0.0,
        };

        let result = facade
            .calculate(QueryFilter::default(), Some(weights), CancellationToken::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn pre_cancelled_token_short_circuits_before_writer() {
        let storage = Arc::new(FakeStorage {
            leads: vec![],
            opportunities: vec![],
            touchpoints: vec![],
        });
        let writer = Arc::new(FakeWriter::default());
        let facade = AttributionFacade::new(EngineConfig::default(), storage, writer.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = facade
            .calculate(QueryFilter::default(), None, cancel)
            .await
            .unwrap();
        assert!(matches!(result, Outcome::Cancelled));
        assert!(writer.writes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_window_calculates_empty_result() {
        let storage = Arc::new(FakeStorage {
            leads: vec![],
            opportunities: vec![],
            touchpoints: vec![],
        });
        let writer = Arc::new(FakeWriter::default());
        let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);

        let result = facade
            .calculate(QueryFilter::default(), None, CancellationToken::new())
            .await
            .unwrap();

        match result {
            Outcome::Completed(r) => {
                assert_eq!(r.summary.count, 0);
                assert_eq!(r.summary.total, 0.0);
                assert_eq!(r.alignment.score, 0.0);
                assert_eq!(r.alignment.grade, "F");
            }
            Outcome::Cancelled => panic!("expected completion"),
        }
    }

    #[test]
    fn model_introspection_lists_all_touchpoint_types() {
        let storage = Arc::new(FakeStorage {
            leads: vec![],
            opportunities: vec![],
            touchpoints: vec![],
        });
        let writer = Arc::new(FakeWriter::default());
        let facade = AttributionFacade::new(EngineConfig::default(), storage, writer);
        let info = facade.model_introspection();
        assert_eq!(info.touchpoint_types.len(), 10);
    }
}

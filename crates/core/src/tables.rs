//! Constant tables for the attribution model. Injected at engine
//! construction rather than compiled in, so every scenario in spec §8 is
//! parameterizable for test (see SPEC_FULL.md §D).

use crate::types::{DealSizeTier, QualityTier, Stage, TouchpointType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Per-factor weights for the combiner (time, quality, account, stage,
/// velocity). Always renormalized to sum to 1 before use.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CombineWeights {
    pub time: f64,
    pub quality: f64,
    pub account: f64,
    pub stage: f64,
    pub velocity: f64,
}

impl CombineWeights {
    pub fn sum(&self) -> f64 {
        self.time + self.quality + self.account + self.stage + self.velocity
    }

    /// Renormalize so the five components sum to 1. Returns `None` if the
    /// vector sums to zero (caller must reject as a validation error) or
    /// contains a negative component.
    pub fn normalized(&self) -> Option<CombineWeights> {
        if self.time < 0.0
            || self.quality < 0.0
            || self.account < 0.0
            || self.stage < 0.0
            || self.velocity < 0.0
        {
            return None;
        }
        let total = self.sum();
        if total <= 0.0 {
            return None;
        }
        Some(CombineWeights {
            time: self.time / total,
            quality: self.quality / total,
            account: self.account / total,
            stage: self.stage / total,
            velocity: self.velocity / total,
        })
    }
}

impl Default for CombineWeights {
    fn default() -> Self {
        Self {
            time: 0.25,
            quality: 0.25,
            account: 0.25,
            stage: 0.15,
            velocity: 0.10,
        }
    }
}

/// The full set of constant tables the factor calculators read from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightTables {
    pub touchpoint_type_weight: HashMap<TouchpointType, f64>,
    pub stage_weight: HashMap<Stage, f64>,
    pub quality_multiplier: HashMap<QualityTier, f64>,
    pub deal_size_multiplier: HashMap<DealSizeTier, f64>,
    pub expected_cycle_days: HashMap<DealSizeTier, u32>,
    pub default_combine_weights: CombineWeights,
}

impl WeightTables {
    pub fn touchpoint_type_weight(&self, t: TouchpointType) -> f64 {
        self.touchpoint_type_weight.get(&t).copied().unwrap_or(1.0)
    }

    pub fn stage_weight(&self, s: Stage) -> f64 {
        self.stage_weight.get(&s).copied().unwrap_or(1.0)
    }

    pub fn quality_multiplier(&self, q: QualityTier) -> f64 {
        self.quality_multiplier.get(&q).copied().unwrap_or(1.0)
    }

    pub fn deal_size_multiplier(&self, d: DealSizeTier) -> f64 {
        self.deal_size_multiplier.get(&d).copied().unwrap_or(1.0)
    }

    /// 180 for unknown tier, matching spec §4.1.
    pub fn expected_cycle_days(&self, d: DealSizeTier) -> u32 {
        self.expected_cycle_days.get(&d).copied().unwrap_or(180)
    }
}

impl Default for WeightTables {
    fn default() -> Self {
        use DealSizeTier::*;
        use QualityTier::*;
        use Stage::*;
        use TouchpointType::*;

        let touchpoint_type_weight = HashMap::from([
            (DemoRequest, 1.5),
            (SalesCall, 1.4),
            (Referral, 1.6),
            (TradeShow, 1.3),
            (WebinarAttendance, 1.2),
            (ContentDownload, 1.1),
            (DirectMail, 0.9),
            (EmailEngagement, 0.8),
            (SocialEngagement, 0.7),
            (WebsiteVisit, 0.6),
        ]);

        let stage_weight = HashMap::from([
            (Awareness, 0.8),
            (Interest, 1.0),
            (Consideration, 1.2),
            (Intent, 1.4),
            (Evaluation, 1.5),
            (Purchase, 1.3),
        ]);

        let quality_multiplier = HashMap::from([(A, 1.5), (B, 1.2), (C, 1.0), (D, 0.7)]);

        let deal_size_multiplier =
            HashMap::from([(Enterprise, 1.4), (MidMarket, 1.2), (Smb, 1.0)]);

        let expected_cycle_days = HashMap::from([(Enterprise, 270), (MidMarket, 150), (Smb, 60)]);

        Self {
            touchpoint_type_weight,
            stage_weight,
            quality_multiplier,
            deal_size_multiplier,
            expected_cycle_days,
            default_combine_weights: CombineWeights::default(),
        }
    }
}

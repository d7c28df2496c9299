//! Combines the five factor maps into one weighted map and produces
//! summary statistics over it.

use crate::factors::AttributionMap;
use b2b_attribution_core::{AttributionError, CampaignResult, CombineWeights};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// The five factor maps in a fixed order, so callers can't transpose them.
pub struct FactorMaps<'a> {
    pub time_weighted: &'a AttributionMap,
    pub quality_weighted: &'a AttributionMap,
    pub account_based: &'a AttributionMap,
    pub stage_progression: &'a AttributionMap,
    pub pipeline_velocity: &'a AttributionMap,
}

/// One entry in the top-5 list: touchpoint id, its value, and its share of
/// the combined total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopTouchpoint {
    pub touchpoint_id: String,
    pub value: f64,
    pub percentage_of_total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinerSummary {
    pub total: f64,
    pub count: usize,
    pub average: f64,
    pub top_touchpoints: Vec<TopTouchpoint>,
    pub top_20_pct_sum: f64,
    pub bottom_20_pct_sum: f64,
}

/// Renormalizes a caller-supplied weight vector to sum to 1, or falls back
/// to `config.default_combine_weights` when `weights` is `None`. Rejects a
/// vector with a negative component or a zero sum.
pub fn resolve_weights(
    weights: Option<CombineWeights>,
    default: CombineWeights,
) -> CampaignResult<CombineWeights> {
    let raw = weights.unwrap_or(default);
    raw.normalized()
        .ok_or_else(|| AttributionError::validation("combine weights must be non-negative and sum to a positive value"))
}

/// Weighted sum of the five factor maps over the union of their keys.
pub fn combine(maps: &FactorMaps, weights: &CombineWeights) -> AttributionMap {
    let mut keys: HashSet<&str> = HashSet::new();
    keys.extend(maps.time_weighted.keys().map(String::as_str));
    keys.extend(maps.quality_weighted.keys().map(String::as_str));
    keys.extend(maps.account_based.keys().map(String::as_str));
    keys.extend(maps.stage_progression.keys().map(String::as_str));
    keys.extend(maps.pipeline_velocity.keys().map(String::as_str));

    let mut out = HashMap::with_capacity(keys.len());
    for key in keys {
        let value = maps.time_weighted.get(key).copied().unwrap_or(0.0) * weights.time
            + maps.quality_weighted.get(key).copied().unwrap_or(0.0) * weights.quality
            + maps.account_based.get(key).copied().unwrap_or(0.0) * weights.account
            + maps.stage_progression.get(key).copied().unwrap_or(0.0) * weights.stage
            + maps.pipeline_velocity.get(key).copied().unwrap_or(0.0) * weights.velocity;
        out.insert(key.to_string(), value);
    }
    out
}

/// Total, average, top-5, and top/bottom quintile-by-count sums, all
/// computed in deterministic key-sorted order with ties broken by
/// touchpoint_id.
pub fn summarize(combined: &AttributionMap) -> CombinerSummary {
    let total: f64 = combined.values().sum();
    let count = combined.len();
    let average = if count > 0 { total / count as f64 } else { 0.0 };

    let mut sorted: Vec<(&String, &f64)> = combined.iter().collect();
    sorted.sort_by(|a, b| {
        b.1.partial_cmp(a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.0.cmp(b.0))
    });

    let top_touchpoints = sorted
        .iter()
        .take(5)
        .map(|(id, value)| TopTouchpoint {
            touchpoint_id: (*id).clone(),
            value: **value,
            percentage_of_total: if total > 0.0 { **value / total * 100.0 } else { 0.0 },
        })
        .collect();

    let quintile = if count == 0 { 0 } else { (count / 5).max(1) };
    let top_20_pct_sum: f64 = sorted.iter().take(quintile).map(|(_, v)| **v).sum();
    let bottom_20_pct_sum: f64 = sorted.iter().rev().take(quintile).map(|(_, v)| **v).sum();

    CombinerSummary {
        total,
        count,
        average,
        top_touchpoints,
        top_20_pct_sum,
        bottom_20_pct_sum,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(pairs: &[(&str, f64)]) -> AttributionMap {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn rejects_zero_sum_weights() {
        let weights = CombineWeights {
            time: 0.0,
            quality: 0.0,
            account: 0.0,
            stage: 0.0,
            velocity: 0.0,
        };
        assert!(resolve_weights(Some(weights), CombineWeights::default()).is_err());
    }

    #[test]
    fn combiner_is_linear() {
        let t = map(&[("t1", 10.0)]);
        let q = map(&[("t1", 2.0)]);
        let a = map(&[("t1", 5.0)]);
        let s = map(&[("t1", 1.0)]);
        let v = map(&[("t1", 1.0)]);
        let maps = FactorMaps {
            time_weighted: &t,
            quality_weighted: &q,
            account_based: &a,
            stage_progression: &s,
            pipeline_velocity: &v,
        };
        let weights = CombineWeights::default();
        let combined1 = combine(&maps, &weights);

        let t2 = map(&[("t1", 20.0)]);
        let q2 = map(&[("t1", 4.0)]);
        let a2 = map(&[("t1", 10.0)]);
        let s2 = map(&[("t1", 2.0)]);
        let v2 = map(&[("t1", 2.0)]);
        let maps2 = FactorMaps {
            time_weighted: &t2,
            quality_weighted: &q2,
            account_based: &a2,
            stage_progression: &s2,
            pipeline_velocity: &v2,
        };
        let combined2 = combine(&maps2, &weights);

        assert!((combined2["t1"] - 2.0 * combined1["t1"]).abs() < 1e-9);
    }

    #[test]
    fn renormalization_is_scale_invariant() {
        let scaled = CombineWeights {
            time: 2.0,
            quality: 2.0,
            account: 2.0,
            stage: 1.2,
            velocity: 0.8,
        };
        let default = CombineWeights::default();

        let t = map(&[("t1", 10.0)]);
        let q = map(&[("t1", 2.0)]);
        let a = map(&[("t1", 5.0)]);
        let s = map(&[("t1", 1.0)]);
        let v = map(&[("t1", 1.0)]);
        let maps = FactorMaps {
            time_weighted: &t,
            quality_weighted: &q,
            account_based: &a,
            stage_progression: &s,
            pipeline_velocity: &v,
        };

        let resolved_scaled = resolve_weights(Some(scaled), default).unwrap();
        let resolved_default = resolve_weights(None, default).unwrap();

        let combined_scaled = combine(&maps, &resolved_scaled);
        let combined_default = combine(&maps, &resolved_default);

        assert!((combined_scaled["t1"] - combined_default["t1"]).abs() < 1e-9);
    }

    #[test]
    fn summary_reports_correct_total_and_count() {
        let combined = map(&[("t1", 10.0), ("t2", 20.0), ("t3", 30.0)]);
        let summary = summarize(&combined);
        assert_eq!(summary.count, 3);
        assert!((summary.total - 60.0).abs() < 1e-9);
        assert!((summary.average - 20.0).abs() < 1e-9);
        assert_eq!(summary.top_touchpoints[0].touchpoint_id, "t3");
    }

    #[test]
    fn empty_map_summarizes_to_zero() {
        let combined = AttributionMap::new();
        let summary = summarize(&combined);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.total, 0.0);
        assert_eq!(summary.average, 0.0);
        assert!(summary.top_touchpoints.is_empty());
    }
}

//! Channel performance roll-up and sales–marketing alignment diagnostics,
//! both derived from the combined attribution map.

use crate::factors::AttributionMap;
use crate::weighting::{alignment_grade, alignment_score};
use b2b_attribution_core::Touchpoint;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChannelPerformance {
    pub channel: String,
    pub total_attribution: f64,
    pub touchpoint_count: usize,
    pub total_cost: f64,
    pub touchpoint_types: Vec<String>,
    pub roi: f64,
    pub cost_per_attribution: f64,
}

/// Groups the combined map by channel and computes ROI / CPA per channel,
/// plus rule-generated insight strings in a fixed, deterministic order.
pub fn channel_performance(
    combined: &AttributionMap,
    touchpoints: &[Touchpoint],
) -> (Vec<ChannelPerformance>, Vec<String>) {
    struct Accum {
        total_attribution: f64,
        touchpoint_count: usize,
        total_cost: f64,
        touchpoint_types: HashSet<String>,
    }

    let mut by_channel: HashMap<&str, Accum> = HashMap::new();

    for tp in touchpoints {
        let value = combined.get(&tp.touchpoint_id).copied().unwrap_or(0.0);
        let entry = by_channel.entry(tp.channel.as_str()).or_insert(Accum {
            total_attribution: 0.0,
            touchpoint_count: 0,
            total_cost: 0.0,
            touchpoint_types: HashSet::new(),
        });
        entry.total_attribution += value;
        entry.touchpoint_count += 1;
        entry.total_cost += tp.cost;
        entry.touchpoint_types.insert(tp.touchpoint_type.as_str().to_string());
    }

    let mut channels: Vec<ChannelPerformance> = by_channel
        .into_iter()
        .map(|(channel, acc)| {
            let roi = if acc.total_cost > 0.0 {
                (acc.total_attribution - acc.total_cost) / acc.total_cost
            } else if acc.total_attribution > 0.0 {
                f64::INFINITY
            } else {
                0.0
            };
            let cost_per_attribution = if acc.total_attribution > 0.0 {
                acc.total_cost / acc.total_attribution
            } else {
                0.0
            };
            let mut touchpoint_types: Vec<String> = acc.touchpoint_types.into_iter().collect();
            touchpoint_types.sort();

            ChannelPerformance {
                channel: channel.to_string(),
                total_attribution: acc.total_attribution,
                touchpoint_count: acc.touchpoint_count,
                total_cost: acc.total_cost,
                touchpoint_types,
                roi,
                cost_per_attribution,
            }
        })
        .collect();

    channels.sort_by(|a, b| {
        b.roi
            .partial_cmp(&a.roi)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.channel.cmp(&b.channel))
    });

    let insights = generate_channel_insights(&channels);

    (channels, insights)
}

fn generate_channel_insights(channels: &[ChannelPerformance]) -> Vec<String> {
    let mut insights = Vec::new();

    if let Some(best) = channels.first() {
        insights.push(format!(
            "best ROI channel: {} ({:.2}x)",
            best.channel, best.roi
        ));
    }

    if let Some(worst) = channels.iter().filter(|c| c.roi < 0.0).last() {
        insights.push(format!(
            "worst ROI channel: {} ({:.2}x)",
            worst.channel, worst.roi
        ));
    }

    for c in channels.iter().filter(|c| c.touchpoint_count > 10 && c.roi < 1.0) {
        insights.push(format!(
            "{} has high touchpoint volume ({}) with ROI below 1",
            c.channel, c.touchpoint_count
        ));
    }

    for c in channels.iter().filter(|c| c.total_cost > 1000.0 && c.roi < 2.0) {
        insights.push(format!(
            "{} spends over $1000 with ROI below 2",
            c.channel
        ));
    }

    insights
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlignmentReport {
    pub sales_total: f64,
    pub marketing_total: f64,
    pub joint_total: f64,
    pub sales_pct: f64,
    pub marketing_pct: f64,
    pub joint_pct: f64,
    pub score: f64,
    pub grade: String,
    pub recommendations: Vec<String>,
}

/// Partitions the combined map by each touchpoint's sales/marketing flags
/// (touchpoints with neither flag are excluded) and scores the split
/// against the ideal 40/40/20 balance.
pub fn alignment_report(combined: &AttributionMap, touchpoints: &[Touchpoint]) -> AlignmentReport {
    let mut sales_total = 0.0;
    let mut marketing_total = 0.0;
    let mut joint_total = 0.0;

    for tp in touchpoints {
        let value = combined.get(&tp.touchpoint_id).copied().unwrap_or(0.0);
        if tp.is_joint_touch() {
            joint_total += value;
        } else if tp.is_sales_touch {
            sales_total += value;
        } else if tp.is_marketing_touch {
            marketing_total += value;
        }
    }

    let total = sales_total + marketing_total + joint_total;
    let (sales_pct, marketing_pct, joint_pct) = if total > 0.0 {
        (
            sales_total / total * 100.0,
            marketing_total / total * 100.0,
            joint_total / total * 100.0,
        )
    } else {
        (0.0, 0.0, 0.0)
    };

    let score = alignment_score(sales_total, marketing_total, joint_total);
    let grade = alignment_grade(score).to_string();

    let mut recommendations = Vec::new();
    if score < 50.0 {
        recommendations.push("poor alignment, implement joint planning".to_string());
    }
    if sales_pct > 60.0 {
        recommendations.push("reduce sales dominance, strengthen nurturing".to_string());
    } else if sales_pct < 20.0 {
        recommendations.push("increase sales involvement".to_string());
    }
    if marketing_pct > 60.0 {
        recommendations.push("reduce marketing dominance, strengthen nurturing".to_string());
    } else if marketing_pct < 20.0 {
        recommendations.push("increase marketing involvement".to_string());
    }
    if joint_pct < 10.0 {
        recommendations.push("add collaborative activities".to_string());
    } else if joint_pct > 40.0 {
        recommendations.push("clarify ownership".to_string());
    }
    if score >= 80.0 {
        recommendations.push("excellent alignment, share practices".to_string());
    }

    AlignmentReport {
        sales_total,
        marketing_total,
        joint_total,
        sales_pct,
        marketing_pct,
        joint_pct,
        score,
        grade,
        recommendations,
    }
}

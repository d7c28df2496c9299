//! Pure weighting primitives shared by the factor calculators: the
//! time-decay kernel, the account complexity multiplier, the expected-cycle
//! lookup, the velocity multiplier, and the alignment-score formula.

use b2b_attribution_core::{DealSizeTier, WeightTables};
use chrono::{DateTime, Utc};

/// `exp(-max(0, (c - t) / 1 day) / h)`. A touchpoint after the conversion
/// instant clips to zero gap and returns 1.
pub fn time_decay_kernel(t: DateTime<Utc>, c: DateTime<Utc>, half_life_days: f64) -> f64 {
    let gap_days = (c - t).num_seconds() as f64 / 86_400.0;
    let gap_days = gap_days.max(0.0);
    (-gap_days / half_life_days).exp()
}

/// `max(0.3 * sales_cycle_days, 14)`.
pub fn derived_half_life(sales_cycle_days: u32, cycle_fraction: f64, floor_days: f64) -> f64 {
    (sales_cycle_days as f64 * cycle_fraction).max(floor_days)
}

/// Cumulative additive bonuses on top of a base of 1.0, per §4.1.
pub fn account_complexity_multiplier(
    deal_size_tier: DealSizeTier,
    decision_makers_count: u32,
    influencers_count: u32,
    sales_cycle_days: u32,
) -> f64 {
    let mut m = 1.0;

    m += match deal_size_tier {
        DealSizeTier::Enterprise => 0.3,
        DealSizeTier::MidMarket => 0.15,
        DealSizeTier::Smb => 0.0,
    };

    let committee = decision_makers_count + influencers_count;
    if committee > 5 {
        m += 0.2;
    } else if committee > 3 {
        m += 0.1;
    }

    if sales_cycle_days > 365 {
        m += 0.25;
    } else if sales_cycle_days > 180 {
        m += 0.15;
    }

    m
}

/// `1 + 0.1 * (decision_makers + influencers)`.
pub fn committee_factor(decision_makers_count: u32, influencers_count: u32) -> f64 {
    1.0 + 0.1 * (decision_makers_count + influencers_count) as f64
}

pub fn expected_cycle_days(tables: &WeightTables, tier: DealSizeTier) -> u32 {
    tables.expected_cycle_days(tier)
}

/// Branching velocity multiplier: rewards beating the expected cycle,
/// penalizes (with a floor of 0.5) overrunning it.
pub fn velocity_multiplier(actual_days: u32, expected_days: u32) -> f64 {
    let actual = actual_days as f64;
    let expected = expected_days as f64;
    if expected <= 0.0 {
        return 1.0;
    }
    if actual < expected {
        1.0 + ((expected - actual) / expected) * 0.5
    } else {
        (1.0 - ((actual - expected) / expected) * 0.3).max(0.5)
    }
}

/// The ideal sales/marketing/joint split, as percentages of total.
pub const IDEAL_MARKETING_PCT: f64 = 40.0;
pub const IDEAL_SALES_PCT: f64 = 40.0;
pub const IDEAL_JOINT_PCT: f64 = 20.0;

/// `max(0, 100 - sum of absolute deviations from the ideal 40/40/20 split)`.
/// Returns 0 when `total` is zero (no signal to score).
pub fn alignment_score(sales_total: f64, marketing_total: f64, joint_total: f64) -> f64 {
    let total = sales_total + marketing_total + joint_total;
    if total <= 0.0 {
        return 0.0;
    }
    let sales_pct = sales_total / total * 100.0;
    let marketing_pct = marketing_total / total * 100.0;
    let joint_pct = joint_total / total * 100.0;

    let deviation = (sales_pct - IDEAL_SALES_PCT).abs()
        + (marketing_pct - IDEAL_MARKETING_PCT).abs()
        + (joint_pct - IDEAL_JOINT_PCT).abs();

    (100.0 - deviation).max(0.0)
}

/// Letter grade for an alignment score, per the boundaries in §4.1.
pub fn alignment_grade(score: f64) -> &'static str {
    if score >= 90.0 {
        "A+"
    } else if score >= 80.0 {
        "A"
    } else if score >= 70.0 {
        "B"
    } else if score >= 60.0 {
        "C"
    } else if score >= 50.0 {
        "D"
    } else {
        "F"
    }
}

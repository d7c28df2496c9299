use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Ordered B2B sales funnel stage. Not numeric — progression is handled by
/// table lookup, never by comparing discriminants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Awareness,
    Interest,
    Consideration,
    Intent,
    Evaluation,
    Purchase,
}

/// B2B touchpoint categories, each carrying a distinct attribution weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchpointType {
    ContentDownload,
    WebinarAttendance,
    DemoRequest,
    TradeShow,
    SalesCall,
    EmailEngagement,
    WebsiteVisit,
    SocialEngagement,
    DirectMail,
    Referral,
}

impl TouchpointType {
    /// All variants, in the order the model-introspection endpoint lists them.
    pub const ALL: [TouchpointType; 10] = [
        TouchpointType::ContentDownload,
        TouchpointType::WebinarAttendance,
        TouchpointType::DemoRequest,
        TouchpointType::TradeShow,
        TouchpointType::SalesCall,
        TouchpointType::EmailEngagement,
        TouchpointType::WebsiteVisit,
        TouchpointType::SocialEngagement,
        TouchpointType::DirectMail,
        TouchpointType::Referral,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TouchpointType::ContentDownload => "content_download",
            TouchpointType::WebinarAttendance => "webinar_attendance",
            TouchpointType::DemoRequest => "demo_request",
            TouchpointType::TradeShow => "trade_show",
            TouchpointType::SalesCall => "sales_call",
            TouchpointType::EmailEngagement => "email_engagement",
            TouchpointType::WebsiteVisit => "website_visit",
            TouchpointType::SocialEngagement => "social_engagement",
            TouchpointType::DirectMail => "direct_mail",
            TouchpointType::Referral => "referral",
        }
    }
}

/// Lead-quality tier. Derived from `lead_score` at ingestion time; the
/// engine treats it as authoritative and never re-derives it (see §9 of
/// SPEC_FULL.md — re-derivation inside the engine is disallowed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityTier {
    A,
    B,
    C,
    D,
}

/// Deal-size tier, controlling multipliers and expected sales-cycle length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DealSizeTier {
    Enterprise,
    MidMarket,
    Smb,
}

/// A known individual within an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lead {
    pub lead_id: String,
    pub account_id: String,
    pub lead_score: u8,
    pub demographic_score: u8,
    pub behavioral_score: u8,
    pub firmographic_score: u8,
    pub quality_tier: QualityTier,
    pub created_date: DateTime<Utc>,
    pub stage: Stage,
    pub source: String,
}

/// A won deal tied to an account, with one or more associated leads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub opportunity_id: String,
    pub account_id: String,
    pub lead_ids: HashSet<String>,
    pub amount: f64,
    pub created_date: DateTime<Utc>,
    pub close_date: Option<DateTime<Utc>>,
    pub sales_cycle_days: u32,
    pub deal_size_tier: DealSizeTier,
    pub decision_makers_count: u32,
    pub influencers_count: u32,
}

impl Opportunity {
    /// Default applied when a source record carries no sales-cycle length.
    pub const DEFAULT_SALES_CYCLE_DAYS: u32 = 180;

    /// The instant attribution is computed against: `close_date` if known,
    /// else `created_date`.
    pub fn conversion_instant(&self) -> DateTime<Utc> {
        self.close_date.unwrap_or(self.created_date)
    }
}

/// A single interaction belonging to a lead and an account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Touchpoint {
    pub touchpoint_id: String,
    pub lead_id: String,
    pub account_id: String,
    pub timestamp: DateTime<Utc>,
    pub touchpoint_type: TouchpointType,
    pub channel: String,
    pub engagement_score: f64,
    pub stage_influence: Stage,
    pub cost: f64,
    pub is_sales_touch: bool,
    pub is_marketing_touch: bool,
    pub campaign_id: Option<String>,
    pub content_id: Option<String>,
    pub sales_rep_id: Option<String>,
}

impl Touchpoint {
    pub fn is_joint_touch(&self) -> bool {
        self.is_sales_touch && self.is_marketing_touch
    }
}

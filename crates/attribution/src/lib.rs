#![warn(clippy::unwrap_used)]

pub mod analyzer;
pub mod collaborators;
pub mod combiner;
pub mod facade;
pub mod factors;
pub mod weighting;

pub use analyzer::{AlignmentReport, ChannelPerformance};
pub use collaborators::{QueryFilter, ResultWriter, Storage};
pub use combiner::{CombinerSummary, TopTouchpoint};
pub use facade::{
    AttributionFacade, AttributionResult, AttributionResultDocument, ChannelInsightsResult,
    ModelInfo, Outcome,
};
pub use factors::AttributionMap;

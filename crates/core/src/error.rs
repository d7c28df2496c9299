use thiserror::Error;

/// The attribution engine's error taxonomy. Mirrors the reference
/// platform's `CampaignError` shape: a small closed set of variants that
/// HTTP handlers map to status codes, plus an escape hatch for anything
/// unexpected.
#[derive(Debug, Error)]
pub enum AttributionError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("failed to fetch data from {source}")]
    DataFetch { source: String, transient: bool },

    #[error("result writer failed: {0}")]
    Writer(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AttributionError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn data_fetch(source: impl Into<String>, transient: bool) -> Self {
        Self::DataFetch {
            source: source.into(),
            transient,
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, Self::DataFetch { transient: true, .. })
    }
}

pub type CampaignResult<T> = Result<T, AttributionError>;

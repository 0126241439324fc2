use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnavailableKind {
    /// The provider answered and does not know the ticker.
    UnknownTicker,
    /// Transport failure, server error or a payload that failed validation.
    ProviderFailure,
}

/// The only failure the scoring core reports.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("metrics unavailable for '{ticker}': {reason}")]
    Unavailable {
        ticker: String,
        kind: UnavailableKind,
        reason: String,
    },
}

impl MetricsError {
    pub fn unknown_ticker(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        MetricsError::Unavailable {
            ticker: ticker.into(),
            kind: UnavailableKind::UnknownTicker,
            reason: reason.into(),
        }
    }

    pub fn provider_failure(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        MetricsError::Unavailable {
            ticker: ticker.into(),
            kind: UnavailableKind::ProviderFailure,
            reason: reason.into(),
        }
    }

    pub fn ticker(&self) -> &str {
        match self {
            MetricsError::Unavailable { ticker, .. } => ticker,
        }
    }

    pub fn kind(&self) -> UnavailableKind {
        match self {
            MetricsError::Unavailable { kind, .. } => *kind,
        }
    }
}

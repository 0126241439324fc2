use crate::config::Settings;
use crate::domain::metrics::StockMetrics;
use chrono::NaiveDate;

pub mod builtin;
pub mod error;
pub mod http;

pub use builtin::BuiltinMetricsProvider;
pub use error::{MetricsError, UnavailableKind};
pub use http::HttpJsonMetricsProvider;

/// Source of fundamental metrics for the scoring core.
#[async_trait::async_trait]
pub trait MetricsProvider: Send + Sync {
    fn provider_name(&self) -> &'static str;

    /// Metrics for `ticker` as of the close of `as_of_date`.
    async fn fetch_metrics(
        &self,
        ticker: &str,
        as_of_date: NaiveDate,
    ) -> Result<StockMetrics, MetricsError>;
}

pub fn normalize_ticker(ticker: &str) -> String {
    ticker.trim().to_uppercase()
}

/// HTTP provider backed by the builtin table when configured, else builtin only.
pub fn from_settings(settings: &Settings) -> anyhow::Result<Box<dyn MetricsProvider>> {
    if settings.metrics_provider_base_url.is_none() {
        return Ok(Box::new(BuiltinMetricsProvider::new()));
    }

    let http = HttpJsonMetricsProvider::from_settings(settings)?;
    Ok(Box::new(FallbackMetricsProvider::new(
        Box::new(http),
        Box::new(BuiltinMetricsProvider::new()),
    )))
}

/// Consults `secondary` when `primary` fails to answer. A ticker the primary
/// reports as unknown stays unavailable.
pub struct FallbackMetricsProvider {
    primary: Box<dyn MetricsProvider>,
    secondary: Box<dyn MetricsProvider>,
}

impl FallbackMetricsProvider {
    pub fn new(primary: Box<dyn MetricsProvider>, secondary: Box<dyn MetricsProvider>) -> Self {
        Self { primary, secondary }
    }
}

#[async_trait::async_trait]
impl MetricsProvider for FallbackMetricsProvider {
    fn provider_name(&self) -> &'static str {
        self.primary.provider_name()
    }

    async fn fetch_metrics(
        &self,
        ticker: &str,
        as_of_date: NaiveDate,
    ) -> Result<StockMetrics, MetricsError> {
        match self.primary.fetch_metrics(ticker, as_of_date).await {
            Ok(metrics) => Ok(metrics),
            Err(err) if err.kind() == UnavailableKind::UnknownTicker => Err(err),
            Err(err) => {
                tracing::warn!(
                    ticker,
                    primary = self.primary.provider_name(),
                    secondary = self.secondary.provider_name(),
                    error = %err,
                    "primary metrics provider failed; falling back"
                );
                self.secondary.fetch_metrics(ticker, as_of_date).await
            }
        }
    }
}

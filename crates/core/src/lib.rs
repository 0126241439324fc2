pub mod analysis;
pub mod domain;
pub mod metrics;
pub mod time;

pub mod config {
    use anyhow::Context;

    #[derive(Debug, Clone, Default)]
    pub struct Settings {
        pub sentry_dsn: Option<String>,
        pub metrics_provider_base_url: Option<String>,
        pub metrics_provider_api_key: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            Ok(Self {
                sentry_dsn: non_empty_var("SENTRY_DSN"),
                metrics_provider_base_url: non_empty_var("METRICS_PROVIDER_BASE_URL"),
                metrics_provider_api_key: non_empty_var("METRICS_PROVIDER_API_KEY"),
            })
        }

        pub fn require_metrics_provider_base_url(&self) -> anyhow::Result<&str> {
            self.metrics_provider_base_url
                .as_deref()
                .context("METRICS_PROVIDER_BASE_URL is required")
        }
    }

    fn non_empty_var(key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::metrics::{MetricsOrigin, StockMetrics};

    /// Value stock used across the scoring tests: scores in the 70s under the
    /// Graham table with a ~19% margin of safety.
    pub fn worked_example() -> StockMetrics {
        StockMetrics {
            ticker: "FIX.OL".to_string(),
            name: "Fixture ASA".to_string(),
            price: 100.0,
            pe_ratio: 10.0,
            pb_ratio: 1.0,
            current_ratio: 2.5,
            debt_to_equity: 0.2,
            roe: 18.0,
            dividend_yield: 0.0,
            earnings_growth: 6.0,
            revenue_growth: 4.0,
            source: MetricsOrigin::Known,
        }
    }
}

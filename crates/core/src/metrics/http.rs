use crate::config::Settings;
use crate::domain::contract::MetricsPayload;
use crate::domain::metrics::StockMetrics;
use crate::metrics::{normalize_ticker, MetricsError, MetricsProvider};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::StatusCode;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_PATH: &str = "/v1/metrics";
const DEFAULT_RETRIES: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_secs(1);
const MAX_RETRIES: u32 = 10;
const MAX_BACKOFF: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct HttpJsonMetricsProvider {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    path: String,
    retries: u32,
    backoff: Duration,
}

impl HttpJsonMetricsProvider {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let base_url = settings.require_metrics_provider_base_url()?.to_string();
        let api_key = settings.metrics_provider_api_key.clone();

        let timeout_secs = std::env::var("METRICS_PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let retries = std::env::var("METRICS_PROVIDER_RETRIES")
            .ok()
            .and_then(|s| s.parse::<u32>().ok())
            .unwrap_or(DEFAULT_RETRIES);

        let path = std::env::var("METRICS_PROVIDER_PATH")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PATH.to_string());

        let provider = Self::new(base_url, api_key, Duration::from_secs(timeout_secs))?;
        Ok(provider.with_path(path).with_retries(retries, DEFAULT_BACKOFF))
    }

    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build metrics provider http client")?;

        Ok(Self {
            http,
            base_url,
            api_key,
            path: DEFAULT_PATH.to_string(),
            retries: DEFAULT_RETRIES,
            backoff: DEFAULT_BACKOFF,
        })
    }

    pub fn with_path(mut self, path: String) -> Self {
        self.path = path;
        self
    }

    /// Between 1 and `MAX_RETRIES` attempts. Backoff doubles per attempt up
    /// to `MAX_BACKOFF`.
    pub fn with_retries(mut self, retries: u32, backoff: Duration) -> Self {
        self.retries = retries.clamp(1, MAX_RETRIES);
        self.backoff = backoff;
        self
    }

    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.backoff.saturating_mul(factor).min(MAX_BACKOFF)
    }

    fn url(&self) -> String {
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    fn headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(api_key) = &self.api_key {
            headers.insert("x-api-key", HeaderValue::from_str(api_key)?);
        }
        Ok(headers)
    }

    /// `Ok(None)` means the provider does not know the ticker.
    async fn fetch_once(
        &self,
        ticker: &str,
        as_of_date: NaiveDate,
    ) -> Result<Option<MetricsPayload>> {
        let as_of_date = as_of_date.format("%Y-%m-%d").to_string();
        let res = self
            .http
            .get(self.url())
            .headers(self.headers()?)
            .query(&[("ticker", ticker), ("as_of_date", as_of_date.as_str())])
            .send()
            .await
            .context("metrics provider request failed")?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let text = res
            .text()
            .await
            .context("failed to read metrics provider response")?;

        if !status.is_success() {
            anyhow::bail!("metrics provider HTTP {status}: {text}");
        }

        let parsed = serde_json::from_str::<MetricsPayload>(&text)
            .with_context(|| format!("metrics provider response does not match schema: {text}"))?;
        Ok(Some(parsed))
    }
}

#[async_trait::async_trait]
impl MetricsProvider for HttpJsonMetricsProvider {
    fn provider_name(&self) -> &'static str {
        "external_http_json"
    }

    async fn fetch_metrics(
        &self,
        ticker: &str,
        as_of_date: NaiveDate,
    ) -> Result<StockMetrics, MetricsError> {
        let ticker = normalize_ticker(ticker);
        if ticker.is_empty() {
            return Err(MetricsError::unknown_ticker(ticker, "ticker is blank"));
        }

        let mut attempt: u32 = 0;
        loop {
            attempt += 1;
            match self.fetch_once(&ticker, as_of_date).await {
                Ok(Some(payload)) => {
                    return payload
                        .validate_and_into_metrics(&ticker, as_of_date)
                        .map_err(|e| MetricsError::provider_failure(&ticker, format!("{e:#}")));
                }
                Ok(None) => {
                    return Err(MetricsError::unknown_ticker(&ticker, "unknown to metrics provider"));
                }
                Err(err) => {
                    if attempt >= self.retries {
                        return Err(MetricsError::provider_failure(&ticker, format!("{err:#}")));
                    }
                    let backoff = self.backoff_for(attempt);
                    tracing::warn!(%ticker, attempt, ?backoff, error = %err, "metrics fetch failed; retrying");
                    tokio::time::sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::metrics::MetricsOrigin;
    use crate::metrics::UnavailableKind;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn body(ticker: &str) -> serde_json::Value {
        json!({
            "ticker": ticker,
            "name": "Kongsberg Gruppen ASA",
            "price": 310.0,
            "pe_ratio": 28.0,
            "pb_ratio": 6.2,
            "current_ratio": 1.3,
            "debt_to_equity": 0.3,
            "roe": 24.0,
            "dividend_yield": 1.9,
            "earnings_growth": 18.0,
            "revenue_growth": 15.0,
        })
    }

    fn provider(server: &MockServer, retries: u32) -> HttpJsonMetricsProvider {
        HttpJsonMetricsProvider::new(server.uri(), Some("secret".to_string()), Duration::from_secs(5))
            .unwrap()
            .with_retries(retries, Duration::from_millis(1))
    }

    fn as_of() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn url_joins_base_and_path() {
        let p = HttpJsonMetricsProvider::new(
            "http://localhost:9000/".to_string(),
            None,
            Duration::from_secs(1),
        )
        .unwrap()
        .with_path("api/metrics".to_string());
        assert_eq!(p.url(), "http://localhost:9000/api/metrics");
    }

    #[tokio::test]
    async fn fetches_and_validates_metrics() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/metrics"))
            .and(query_param("ticker", "KOG.OL"))
            .and(query_param("as_of_date", "2026-10-16"))
            .and(header("x-api-key", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("KOG.OL")))
            .expect(1)
            .mount(&server)
            .await;

        let m = provider(&server, 3).fetch_metrics("kog.ol", as_of()).await.unwrap();
        assert_eq!(m.ticker, "KOG.OL");
        assert_eq!(m.pe_ratio, 28.0);
        assert_eq!(m.source, MetricsOrigin::External);
    }

    #[tokio::test]
    async fn not_found_is_unavailable_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let err = provider(&server, 3).fetch_metrics("NOPE.OL", as_of()).await.unwrap_err();
        assert_eq!(err.ticker(), "NOPE.OL");
        assert_eq!(err.kind(), UnavailableKind::UnknownTicker);
    }

    #[tokio::test]
    async fn server_errors_are_retried_then_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .expect(3)
            .mount(&server)
            .await;

        let err = provider(&server, 3).fetch_metrics("KOG.OL", as_of()).await.unwrap_err();
        let MetricsError::Unavailable { kind, reason, .. } = err;
        assert_eq!(kind, UnavailableKind::ProviderFailure);
        assert!(reason.contains("503"), "{reason}");
    }

    #[tokio::test]
    async fn large_retry_counts_are_clamped() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(u64::from(MAX_RETRIES))
            .mount(&server)
            .await;

        let p = HttpJsonMetricsProvider::new(server.uri(), None, Duration::from_secs(5))
            .unwrap()
            .with_retries(40, Duration::ZERO);
        let err = p.fetch_metrics("KOG.OL", as_of()).await.unwrap_err();
        assert_eq!(err.kind(), UnavailableKind::ProviderFailure);
    }

    #[test]
    fn backoff_saturates_at_ceiling() {
        let p = HttpJsonMetricsProvider::new(
            "http://localhost".to_string(),
            None,
            Duration::from_secs(1),
        )
        .unwrap()
        .with_retries(3, Duration::from_millis(100));
        assert_eq!(p.backoff_for(1), Duration::from_millis(100));
        assert_eq!(p.backoff_for(3), Duration::from_millis(400));
        assert_eq!(p.backoff_for(40), MAX_BACKOFF);
        assert_eq!(p.backoff_for(u32::MAX), MAX_BACKOFF);
    }

    #[tokio::test]
    async fn invalid_payload_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("OTHER.OL")))
            .mount(&server)
            .await;

        let err = provider(&server, 1).fetch_metrics("KOG.OL", as_of()).await.unwrap_err();
        let MetricsError::Unavailable { reason, .. } = err;
        assert!(reason.contains("mismatch"), "{reason}");
    }
}

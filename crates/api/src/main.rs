use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aksjeradar_core::analysis::{self, Strategy};
use aksjeradar_core::metrics::{MetricsError, MetricsProvider, UnavailableKind};
use aksjeradar_core::time::oslo_market;

mod presentation;

use presentation::{ApiAnalysis, ApiScreenEntry};

const MAX_SCREEN_TICKERS: usize = 50;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = aksjeradar_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider: Box<dyn MetricsProvider> = match aksjeradar_core::metrics::from_settings(&settings) {
        Ok(provider) => provider,
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "metrics provider setup failed; using builtin metrics only");
            Box::new(aksjeradar_core::metrics::BuiltinMetricsProvider::new())
        }
    };
    tracing::info!(provider = provider.provider_name(), "metrics provider ready");

    let app = router(AppState {
        provider: Arc::from(provider),
    });

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/analysis/:ticker", get(get_analysis))
        .route("/screen", get(get_screen))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    provider: Arc<dyn MetricsProvider>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

fn api_error(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<ApiError>) {
    (status, Json(ApiError { error: error.into() }))
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisQuery {
    strategy: Option<String>,
    as_of_date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScreenQuery {
    tickers: String,
    strategy: Option<String>,
    as_of_date: Option<String>,
}

fn parse_common(
    strategy: Option<&str>,
    as_of_date: Option<&str>,
) -> Result<(Strategy, chrono::NaiveDate), (StatusCode, Json<ApiError>)> {
    let strategy = match strategy {
        Some(s) => s
            .parse::<Strategy>()
            .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))?,
        None => Strategy::default(),
    };

    let as_of_date = oslo_market::resolve_as_of_date(as_of_date, chrono::Utc::now())
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("{e:#}")))?;

    Ok((strategy, as_of_date))
}

async fn get_analysis(
    State(state): State<AppState>,
    Path(ticker): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> ApiResult<ApiAnalysis> {
    if ticker.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "ticker must be non-empty"));
    }
    let (strategy, as_of_date) =
        parse_common(query.strategy.as_deref(), query.as_of_date.as_deref())?;

    let analysis = analysis::analyze_ticker(state.provider.as_ref(), &ticker, strategy, as_of_date)
        .await
        .map_err(|e| match &e {
            MetricsError::Unavailable { ticker, kind, .. } => {
                tracing::warn!(%ticker, ?kind, error = %e, "analysis requested for unavailable ticker");
                let status = match kind {
                    UnavailableKind::UnknownTicker => StatusCode::NOT_FOUND,
                    UnavailableKind::ProviderFailure => StatusCode::SERVICE_UNAVAILABLE,
                };
                api_error(status, format!("no metrics available for {ticker}"))
            }
        })?;

    Ok(Json(analysis.into()))
}

#[derive(Debug, Serialize)]
struct ApiScreen {
    strategy: Strategy,
    as_of_date: chrono::NaiveDate,
    requested: usize,
    entries: Vec<ApiScreenEntry>,
}

async fn get_screen(
    State(state): State<AppState>,
    Query(query): Query<ScreenQuery>,
) -> ApiResult<ApiScreen> {
    let (strategy, as_of_date) =
        parse_common(query.strategy.as_deref(), query.as_of_date.as_deref())?;

    let tickers: Vec<String> = query
        .tickers
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if tickers.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "tickers must be non-empty"));
    }
    if tickers.len() > MAX_SCREEN_TICKERS {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            format!("at most {MAX_SCREEN_TICKERS} tickers per screen (got {})", tickers.len()),
        ));
    }

    let entries = analysis::screen(state.provider.as_ref(), &tickers, strategy, as_of_date).await;

    Ok(Json(ApiScreen {
        strategy,
        as_of_date,
        requested: tickers.len(),
        entries: entries.into_iter().map(ApiScreenEntry::from).collect(),
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &aksjeradar_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aksjeradar_core::metrics::BuiltinMetricsProvider;
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    struct Failing(UnavailableKind);

    #[async_trait::async_trait]
    impl MetricsProvider for Failing {
        fn provider_name(&self) -> &'static str {
            "failing"
        }

        async fn fetch_metrics(
            &self,
            ticker: &str,
            _as_of_date: chrono::NaiveDate,
        ) -> Result<aksjeradar_core::domain::metrics::StockMetrics, MetricsError> {
            Err(match self.0 {
                UnavailableKind::UnknownTicker => MetricsError::unknown_ticker(ticker, "delisted"),
                UnavailableKind::ProviderFailure => MetricsError::provider_failure(ticker, "offline"),
            })
        }
    }

    fn app() -> Router {
        app_with(Arc::new(BuiltinMetricsProvider::new()))
    }

    fn app_with(provider: Arc<dyn MetricsProvider>) -> Router {
        router(AppState { provider })
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        request_json(app(), uri).await
    }

    async fn request_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let res = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn healthz_is_ok() {
        let res = app()
            .oneshot(Request::builder().uri("/healthz").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn analysis_returns_output_contract() {
        let (status, body) =
            get_json("/analysis/eqnr.ol?strategy=buffett&as_of_date=2026-10-16").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticker"], "EQNR.OL");
        assert_eq!(body["strategy"], "buffett");
        assert_eq!(body["as_of_date"], "2026-10-16");
        assert_eq!(body["source"], "known");
        assert!(body["aggregate_score"].is_number());
        assert!(body["recommendation"]["action"].is_string());
        assert!(body["recommendation"].get("reasoning").is_none());
        assert!(body["explanation"]["reasoning"].is_string());
    }

    #[tokio::test]
    async fn unknown_strategy_is_bad_request() {
        let (status, body) = get_json("/analysis/EQNR.OL?strategy=lynch").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("lynch"));
    }

    #[tokio::test]
    async fn invalid_as_of_date_is_bad_request() {
        let (status, _) = get_json("/analysis/EQNR.OL?as_of_date=yesterday").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn blank_ticker_is_bad_request() {
        let (status, body) = get_json("/analysis/%20").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn unknown_ticker_is_not_found() {
        let app = app_with(Arc::new(Failing(UnavailableKind::UnknownTicker)));
        let (status, body) = request_json(app, "/analysis/DELISTED.OL").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("DELISTED.OL"));
    }

    #[tokio::test]
    async fn provider_failure_is_service_unavailable() {
        let app = app_with(Arc::new(Failing(UnavailableKind::ProviderFailure)));
        let (status, _) = request_json(app, "/analysis/EQNR.OL").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn screen_ranks_tickers() {
        let (status, body) =
            get_json("/screen?tickers=EQNR.OL,DNB.OL,,NHY.OL&as_of_date=2026-10-16").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["requested"], 3);
        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["rank"], 1);
        assert!(entries[0]["analysis"]["explanation"]["reasoning"].is_string());
    }

    #[tokio::test]
    async fn empty_screen_is_bad_request() {
        let (status, _) = get_json("/screen?tickers=,,").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

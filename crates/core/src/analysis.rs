use crate::domain::criteria::{self, CriterionDef, CriterionResult, BUFFETT_CRITERIA, GRAHAM_CRITERIA};
use crate::domain::metrics::{MetricsOrigin, StockMetrics};
use crate::domain::recommendation::Recommendation;
use crate::domain::score;
use crate::domain::valuation::{self, ValuationEstimate};
use crate::metrics::{MetricsError, MetricsProvider};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Graham,
    Buffett,
}

impl Strategy {
    pub fn criteria(&self) -> &'static [CriterionDef] {
        match self {
            Strategy::Graham => &GRAHAM_CRITERIA,
            Strategy::Buffett => &BUFFETT_CRITERIA,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Graham => "graham",
            Strategy::Buffett => "buffett",
        }
    }
}

impl FromStr for Strategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "graham" => Ok(Strategy::Graham),
            "buffett" => Ok(Strategy::Buffett),
            other => Err(format!("unknown strategy '{other}', expected graham or buffett")),
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a host needs to render one ticker's value analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueAnalysis {
    pub ticker: String,
    pub strategy: Strategy,
    pub as_of_date: NaiveDate,
    pub source: MetricsOrigin,
    pub metrics: StockMetrics,
    pub aggregate_score: f64,
    pub criteria: Vec<CriterionResult>,
    pub valuation: ValuationEstimate,
    pub margin_of_safety: f64,
    pub recommendation: Recommendation,
}

pub fn analyze(metrics: &StockMetrics, strategy: Strategy, as_of_date: NaiveDate) -> ValueAnalysis {
    let criteria = criteria::evaluate(metrics, strategy.criteria());
    let aggregate_score = score::aggregate(&criteria);
    let valuation = valuation::estimate(metrics);
    let margin_of_safety = valuation::margin_of_safety(valuation.average, metrics.price);
    let recommendation = Recommendation::generate(aggregate_score, margin_of_safety, metrics);

    ValueAnalysis {
        ticker: metrics.ticker.clone(),
        strategy,
        as_of_date,
        source: metrics.source,
        metrics: metrics.clone(),
        aggregate_score,
        criteria,
        valuation,
        margin_of_safety,
        recommendation,
    }
}

pub async fn analyze_ticker(
    provider: &dyn MetricsProvider,
    ticker: &str,
    strategy: Strategy,
    as_of_date: NaiveDate,
) -> Result<ValueAnalysis, MetricsError> {
    let metrics = provider.fetch_metrics(ticker, as_of_date).await?;
    let analysis = analyze(&metrics, strategy, as_of_date);

    tracing::info!(
        ticker = %analysis.ticker,
        %strategy,
        provider = provider.provider_name(),
        source = ?analysis.source,
        aggregate_score = analysis.aggregate_score,
        action = %analysis.recommendation.action,
        "value analysis complete"
    );
    Ok(analysis)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenEntry {
    pub rank: usize,
    pub analysis: ValueAnalysis,
}

/// Analyzes every ticker and ranks by aggregate score, best first. Tickers
/// without metrics are skipped; duplicate tickers are analyzed once.
pub async fn screen(
    provider: &dyn MetricsProvider,
    tickers: &[String],
    strategy: Strategy,
    as_of_date: NaiveDate,
) -> Vec<ScreenEntry> {
    let mut analyses: Vec<ValueAnalysis> = Vec::with_capacity(tickers.len());
    for ticker in tickers {
        match analyze_ticker(provider, ticker, strategy, as_of_date).await {
            Ok(a) => {
                if analyses.iter().any(|seen| seen.ticker == a.ticker) {
                    continue;
                }
                analyses.push(a);
            }
            Err(e) => {
                tracing::warn!(%ticker, error = %e, "skipping ticker in screen");
            }
        }
    }

    analyses.sort_by(|a, b| {
        b.aggregate_score
            .partial_cmp(&a.aggregate_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });

    analyses
        .into_iter()
        .enumerate()
        .map(|(i, analysis)| ScreenEntry {
            rank: i + 1,
            analysis,
        })
        .collect()
}

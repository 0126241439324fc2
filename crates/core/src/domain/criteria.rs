use crate::domain::metrics::StockMetrics;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    /// Passes when the value is at or below the threshold.
    Maximum,
    /// Passes when the value is at or above the threshold.
    Minimum,
    /// Like `Maximum`, over the product of two metrics.
    Combined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    Price,
    PeRatio,
    PbRatio,
    CurrentRatio,
    DebtToEquity,
    Roe,
    DividendYield,
    EarningsGrowth,
    RevenueGrowth,
}

impl Metric {
    pub fn read(self, metrics: &StockMetrics) -> f64 {
        match self {
            Metric::Price => metrics.price,
            Metric::PeRatio => metrics.pe_ratio,
            Metric::PbRatio => metrics.pb_ratio,
            Metric::CurrentRatio => metrics.current_ratio,
            Metric::DebtToEquity => metrics.debt_to_equity,
            Metric::Roe => metrics.roe,
            Metric::DividendYield => metrics.dividend_yield,
            Metric::EarningsGrowth => metrics.earnings_growth,
            Metric::RevenueGrowth => metrics.revenue_growth,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriterionDef {
    pub key: &'static str,
    pub metric: Metric,
    /// Second factor of a `Combined` criterion; ignored otherwise.
    pub secondary: Option<Metric>,
    pub threshold: f64,
    pub comparison: Comparison,
    pub weight: f64,
}

impl CriterionDef {
    const fn max(key: &'static str, metric: Metric, threshold: f64, weight: f64) -> Self {
        Self {
            key,
            metric,
            secondary: None,
            threshold,
            comparison: Comparison::Maximum,
            weight,
        }
    }

    const fn min(key: &'static str, metric: Metric, threshold: f64, weight: f64) -> Self {
        Self {
            key,
            metric,
            secondary: None,
            threshold,
            comparison: Comparison::Minimum,
            weight,
        }
    }

    const fn combined(
        key: &'static str,
        metric: Metric,
        secondary: Metric,
        threshold: f64,
        weight: f64,
    ) -> Self {
        Self {
            key,
            metric,
            secondary: Some(secondary),
            threshold,
            comparison: Comparison::Combined,
            weight,
        }
    }

    pub fn observe(&self, metrics: &StockMetrics) -> f64 {
        let value = self.metric.read(metrics);
        match (self.comparison, self.secondary) {
            (Comparison::Combined, Some(other)) => value * other.read(metrics),
            _ => value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionResult {
    pub key: String,
    pub comparison: Comparison,
    pub threshold: f64,
    pub value: f64,
    pub passed: bool,
    pub score: f64,
    pub weight: f64,
}

/// Graham defensive-investor screen. This is the standard table.
pub const GRAHAM_CRITERIA: [CriterionDef; 7] = [
    CriterionDef::max("pe_ratio", Metric::PeRatio, 15.0, 0.15),
    CriterionDef::max("pb_ratio", Metric::PbRatio, 1.5, 0.10),
    CriterionDef::combined("graham_number", Metric::PeRatio, Metric::PbRatio, 22.5, 0.15),
    CriterionDef::min("current_ratio", Metric::CurrentRatio, 2.0, 0.15),
    CriterionDef::max("debt_to_equity", Metric::DebtToEquity, 1.0, 0.15),
    CriterionDef::min("roe", Metric::Roe, 15.0, 0.15),
    CriterionDef::min("earnings_growth", Metric::EarningsGrowth, 5.0, 0.15),
];

/// Quality-business screen in the Buffett style.
pub const BUFFETT_CRITERIA: [CriterionDef; 6] = [
    CriterionDef::min("roe", Metric::Roe, 15.0, 0.25),
    CriterionDef::max("debt_to_equity", Metric::DebtToEquity, 0.5, 0.20),
    CriterionDef::min("earnings_growth", Metric::EarningsGrowth, 10.0, 0.20),
    CriterionDef::min("revenue_growth", Metric::RevenueGrowth, 5.0, 0.15),
    CriterionDef::max("pe_ratio", Metric::PeRatio, 25.0, 0.10),
    CriterionDef::min("current_ratio", Metric::CurrentRatio, 1.5, 0.10),
];

pub fn evaluate(metrics: &StockMetrics, criteria: &[CriterionDef]) -> Vec<CriterionResult> {
    criteria.iter().map(|def| evaluate_one(metrics, def)).collect()
}

pub fn evaluate_one(metrics: &StockMetrics, def: &CriterionDef) -> CriterionResult {
    let value = def.observe(metrics);
    let (passed, score) = match def.comparison {
        Comparison::Maximum | Comparison::Combined => {
            let passed = value <= def.threshold;
            (passed, ratio_score(def.threshold - value, def.threshold, passed))
        }
        Comparison::Minimum => {
            let passed = value >= def.threshold;
            (passed, ratio_score(value, def.threshold, passed))
        }
    };

    CriterionResult {
        key: def.key.to_string(),
        comparison: def.comparison,
        threshold: def.threshold,
        value,
        passed,
        score,
        weight: def.weight,
    }
}

// A zero value under a Maximum criterion scores a full 100 (the formula gives
// threshold/threshold). Negative P/E lands there too after clamping.
fn ratio_score(numerator: f64, threshold: f64, passed: bool) -> f64 {
    if threshold == 0.0 {
        return if passed { 100.0 } else { 0.0 };
    }
    clamp_score(numerator / threshold * 100.0)
}

/// Clamps into [0, 100]. NaN maps to 0.
pub fn clamp_score(raw: f64) -> f64 {
    if raw.is_nan() {
        return 0.0;
    }
    raw.clamp(0.0, 100.0)
}

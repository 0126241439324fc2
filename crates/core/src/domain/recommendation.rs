use crate::domain::metrics::StockMetrics;
use serde::{Deserialize, Serialize};

const MAX_FACTORS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    StrongBuy,
    Buy,
    Hold,
    WeakHold,
    Avoid,
}

impl Action {
    /// Buckets are checked from the top; a bucket's bounds are inclusive so
    /// values just under an edge fall into the lower bucket.
    pub fn classify(aggregate_score: f64, margin_of_safety: f64) -> Self {
        if aggregate_score >= 80.0 && margin_of_safety >= 20.0 {
            Action::StrongBuy
        } else if aggregate_score >= 70.0 && margin_of_safety >= 10.0 {
            Action::Buy
        } else if aggregate_score >= 60.0 && margin_of_safety >= 0.0 {
            Action::Hold
        } else if aggregate_score >= 50.0 {
            Action::WeakHold
        } else {
            Action::Avoid
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::StrongBuy => "STRONG_BUY",
            Action::Buy => "BUY",
            Action::Hold => "HOLD",
            Action::WeakHold => "WEAK_HOLD",
            Action::Avoid => "AVOID",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub fn from_score(aggregate_score: f64) -> Self {
        if aggregate_score >= 75.0 {
            Confidence::High
        } else if aggregate_score >= 55.0 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskFactor {
    HighDebt,
    HighValuation,
    WeakLiquidity,
    DecliningEarnings,
    DecliningRevenue,
    LowReturnOnEquity,
    PremiumToBook,
}

impl RiskFactor {
    const RULES: [(RiskFactor, fn(&StockMetrics) -> bool); 7] = [
        (RiskFactor::HighDebt, |m| m.debt_to_equity > 1.0),
        (RiskFactor::HighValuation, |m| m.pe_ratio > 25.0),
        (RiskFactor::WeakLiquidity, |m| m.current_ratio < 1.0),
        (RiskFactor::DecliningEarnings, |m| m.earnings_growth < 0.0),
        (RiskFactor::DecliningRevenue, |m| m.revenue_growth < 0.0),
        (RiskFactor::LowReturnOnEquity, |m| m.roe < 8.0),
        (RiskFactor::PremiumToBook, |m| m.pb_ratio > 3.0),
    ];

    pub fn detect(metrics: &StockMetrics) -> Vec<RiskFactor> {
        Self::RULES
            .iter()
            .filter(|(_, applies)| applies(metrics))
            .map(|(factor, _)| *factor)
            .take(MAX_FACTORS)
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositiveFactor {
    StrongReturnOnEquity,
    ConservativeBalanceSheet,
    AttractiveEarningsMultiple,
    StrongLiquidity,
    SolidDividend,
    EarningsGrowth,
    NearBookValue,
}

impl PositiveFactor {
    const RULES: [(PositiveFactor, fn(&StockMetrics) -> bool); 7] = [
        (PositiveFactor::StrongReturnOnEquity, |m| m.roe >= 15.0),
        (PositiveFactor::ConservativeBalanceSheet, |m| m.debt_to_equity < 0.5),
        (PositiveFactor::AttractiveEarningsMultiple, |m| m.pe_ratio < 15.0),
        (PositiveFactor::StrongLiquidity, |m| m.current_ratio >= 2.0),
        (PositiveFactor::SolidDividend, |m| m.dividend_yield >= 3.0),
        (PositiveFactor::EarningsGrowth, |m| m.earnings_growth >= 10.0),
        (PositiveFactor::NearBookValue, |m| m.pb_ratio < 1.5),
    ];

    pub fn detect(metrics: &StockMetrics) -> Vec<PositiveFactor> {
        Self::RULES
            .iter()
            .filter(|(_, applies)| applies(metrics))
            .map(|(factor, _)| *factor)
            .take(MAX_FACTORS)
            .collect()
    }
}

/// Codes only; hosts own the wording shown to users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: Confidence,
    pub margin_of_safety: f64,
    pub risk_factors: Vec<RiskFactor>,
    pub positive_factors: Vec<PositiveFactor>,
}

impl Recommendation {
    pub fn generate(aggregate_score: f64, margin_of_safety: f64, metrics: &StockMetrics) -> Self {
        Self {
            action: Action::classify(aggregate_score, margin_of_safety),
            confidence: Confidence::from_score(aggregate_score),
            margin_of_safety,
            risk_factors: RiskFactor::detect(metrics),
            positive_factors: PositiveFactor::detect(metrics),
        }
    }
}

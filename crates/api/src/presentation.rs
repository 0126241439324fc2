use aksjeradar_core::analysis::{ScreenEntry, ValueAnalysis};
use aksjeradar_core::domain::recommendation::{Action, PositiveFactor, RiskFactor};
use serde::Serialize;

/// English wording for a recommendation. The scoring core only emits codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Explanation {
    pub reasoning: &'static str,
    pub risk_factors: Vec<&'static str>,
    pub positive_factors: Vec<&'static str>,
}

impl Explanation {
    pub fn for_analysis(analysis: &ValueAnalysis) -> Self {
        let rec = &analysis.recommendation;
        Self {
            reasoning: reasoning(rec.action),
            risk_factors: rec.risk_factors.iter().copied().map(risk_label).collect(),
            positive_factors: rec.positive_factors.iter().copied().map(positive_label).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiAnalysis {
    #[serde(flatten)]
    pub analysis: ValueAnalysis,
    pub explanation: Explanation,
}

impl From<ValueAnalysis> for ApiAnalysis {
    fn from(analysis: ValueAnalysis) -> Self {
        let explanation = Explanation::for_analysis(&analysis);
        Self {
            analysis,
            explanation,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ApiScreenEntry {
    pub rank: usize,
    pub analysis: ApiAnalysis,
}

impl From<ScreenEntry> for ApiScreenEntry {
    fn from(entry: ScreenEntry) -> Self {
        Self {
            rank: entry.rank,
            analysis: entry.analysis.into(),
        }
    }
}

pub fn reasoning(action: Action) -> &'static str {
    match action {
        Action::StrongBuy => {
            "Passes most value criteria and trades well below the estimated intrinsic value."
        }
        Action::Buy => "Solid fundamentals with a meaningful discount to the estimated intrinsic value.",
        Action::Hold => "Reasonable fundamentals, priced close to the estimated intrinsic value.",
        Action::WeakHold => "Mixed fundamentals or little margin of safety at the current price.",
        Action::Avoid => "Fails too many value criteria to justify a position.",
    }
}

pub fn risk_label(factor: RiskFactor) -> &'static str {
    match factor {
        RiskFactor::HighDebt => "High debt levels",
        RiskFactor::HighValuation => "High earnings multiple",
        RiskFactor::WeakLiquidity => "Weak short-term liquidity",
        RiskFactor::DecliningEarnings => "Declining earnings",
        RiskFactor::DecliningRevenue => "Declining revenue",
        RiskFactor::LowReturnOnEquity => "Low return on equity",
        RiskFactor::PremiumToBook => "Trading far above book value",
    }
}

pub fn positive_label(factor: PositiveFactor) -> &'static str {
    match factor {
        PositiveFactor::StrongReturnOnEquity => "Strong return on equity",
        PositiveFactor::ConservativeBalanceSheet => "Conservative balance sheet",
        PositiveFactor::AttractiveEarningsMultiple => "Attractive earnings multiple",
        PositiveFactor::StrongLiquidity => "Strong short-term liquidity",
        PositiveFactor::SolidDividend => "Solid dividend yield",
        PositiveFactor::EarningsGrowth => "Consistent earnings growth",
        PositiveFactor::NearBookValue => "Trading close to book value",
    }
}

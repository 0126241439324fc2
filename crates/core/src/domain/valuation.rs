use crate::domain::metrics::StockMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

const GRAHAM_BASE_MULTIPLE: f64 = 8.5;
const GRAHAM_GROWTH_CAP: f64 = 20.0;
const BOOK_VALUE_PREMIUM: f64 = 1.1;
const EARNINGS_CAPITALIZATION_RATE: f64 = 0.10;
const ASSET_VALUE_DISCOUNT: f64 = 0.8;
const DIVIDEND_GROWTH_RATE: f64 = 0.03;
const REQUIRED_RETURN: f64 = 0.08;

// Estimates above this multiple of the current price are dropped from the average.
const OUTLIER_PRICE_MULTIPLE: f64 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValuationMethod {
    GrahamFormula,
    BookValue,
    EarningsPower,
    AssetValue,
    DividendDiscount,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationEstimate {
    pub estimates: BTreeMap<ValuationMethod, f64>,
    pub average: f64,
    pub excluded: Vec<ValuationMethod>,
}

impl ValuationEstimate {
    /// Averages `estimates`, skipping any above 3x `price`. Falls back to the
    /// Graham formula value when nothing survives.
    pub fn from_estimates(estimates: BTreeMap<ValuationMethod, f64>, price: f64) -> Self {
        let ceiling = price * OUTLIER_PRICE_MULTIPLE;

        let mut excluded = Vec::new();
        let mut kept = Vec::with_capacity(estimates.len());
        for (&method, &value) in &estimates {
            if value > ceiling {
                excluded.push(method);
            } else {
                kept.push(value);
            }
        }

        let average = if kept.is_empty() {
            estimates
                .get(&ValuationMethod::GrahamFormula)
                .copied()
                .unwrap_or(0.0)
        } else {
            kept.iter().sum::<f64>() / kept.len() as f64
        };

        Self {
            estimates,
            average,
            excluded,
        }
    }

    pub fn get(&self, method: ValuationMethod) -> Option<f64> {
        self.estimates.get(&method).copied()
    }
}

/// `EPS * (8.5 + 2g)` with growth `g` in percent, capped at 20.
pub fn graham_formula(eps: f64, growth_rate: f64) -> f64 {
    eps * (GRAHAM_BASE_MULTIPLE + 2.0 * growth_rate.min(GRAHAM_GROWTH_CAP))
}

pub fn estimate(metrics: &StockMetrics) -> ValuationEstimate {
    let eps = metrics.eps();
    let book_value = metrics.book_value();

    let mut estimates = BTreeMap::new();
    estimates.insert(
        ValuationMethod::GrahamFormula,
        graham_formula(eps, metrics.earnings_growth),
    );
    estimates.insert(ValuationMethod::BookValue, book_value * BOOK_VALUE_PREMIUM);
    estimates.insert(
        ValuationMethod::EarningsPower,
        eps / EARNINGS_CAPITALIZATION_RATE,
    );
    estimates.insert(ValuationMethod::AssetValue, book_value * ASSET_VALUE_DISCOUNT);

    if metrics.dividend_yield > 0.0 {
        let dividend = metrics.price * metrics.dividend_yield / 100.0;
        estimates.insert(
            ValuationMethod::DividendDiscount,
            dividend * (1.0 + DIVIDEND_GROWTH_RATE) / (REQUIRED_RETURN - DIVIDEND_GROWTH_RATE),
        );
    }

    ValuationEstimate::from_estimates(estimates, metrics.price)
}

/// Percent by which `average` exceeds `price`, relative to `average`.
/// Zero when the average is not positive.
pub fn margin_of_safety(average: f64, price: f64) -> f64 {
    if average <= 0.0 || !average.is_finite() {
        return 0.0;
    }
    (average - price) / average * 100.0
}

use serde::{Deserialize, Serialize};

/// Where a set of metrics came from. Hosts use it to tell real figures from
/// generated ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricsOrigin {
    Known,
    Synthetic,
    External,
}

/// Fundamental ratios for one ticker.
///
/// `roe`, `dividend_yield`, `earnings_growth` and `revenue_growth` are in
/// percent units (18.0 means 18%).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockMetrics {
    pub ticker: String,
    pub name: String,
    pub price: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub roe: f64,
    pub dividend_yield: f64,
    pub earnings_growth: f64,
    pub revenue_growth: f64,
    pub source: MetricsOrigin,
}

impl StockMetrics {
    /// Earnings per share implied by price and P/E. Zero when P/E is zero.
    pub fn eps(&self) -> f64 {
        if self.pe_ratio == 0.0 {
            return 0.0;
        }
        self.price / self.pe_ratio
    }

    /// Book value per share implied by price and P/B. Zero when P/B is zero.
    pub fn book_value(&self) -> f64 {
        if self.pb_ratio == 0.0 {
            return 0.0;
        }
        self.price / self.pb_ratio
    }
}

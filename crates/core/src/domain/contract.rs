use crate::domain::metrics::{MetricsOrigin, StockMetrics};
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Metrics payload as served by an external metrics provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsPayload {
    pub ticker: String,
    pub name: Option<String>,
    pub price: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub roe: f64,
    #[serde(default)]
    pub dividend_yield: f64,
    pub earnings_growth: f64,
    #[serde(default)]
    pub revenue_growth: f64,
    /// Session the figures belong to, echoed back by providers that support
    /// point-in-time queries.
    #[serde(default)]
    pub as_of_date: Option<NaiveDate>,
}

impl MetricsPayload {
    pub fn validate_and_into_metrics(
        self,
        expected_ticker: &str,
        expected_as_of_date: NaiveDate,
    ) -> anyhow::Result<StockMetrics> {
        let ticker = self.ticker.trim().to_uppercase();
        ensure!(!ticker.is_empty(), "ticker must be non-empty");
        ensure!(
            ticker == expected_ticker,
            "provider ticker mismatch: expected {expected_ticker}, got {ticker}"
        );
        if let Some(as_of_date) = self.as_of_date {
            ensure!(
                as_of_date == expected_as_of_date,
                "provider as_of_date mismatch: expected {expected_as_of_date}, got {as_of_date}"
            );
        }

        let fields = [
            ("price", self.price),
            ("pe_ratio", self.pe_ratio),
            ("pb_ratio", self.pb_ratio),
            ("current_ratio", self.current_ratio),
            ("debt_to_equity", self.debt_to_equity),
            ("roe", self.roe),
            ("dividend_yield", self.dividend_yield),
            ("earnings_growth", self.earnings_growth),
            ("revenue_growth", self.revenue_growth),
        ];
        for (field, value) in fields {
            ensure!(value.is_finite(), "{field} must be finite (got {value})");
        }

        ensure!(self.price > 0.0, "price must be positive (got {})", self.price);
        ensure!(
            self.dividend_yield >= 0.0,
            "dividend_yield must be non-negative (got {})",
            self.dividend_yield
        );

        let name = self
            .name
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| ticker.clone());

        Ok(StockMetrics {
            ticker,
            name,
            price: self.price,
            pe_ratio: self.pe_ratio,
            pb_ratio: self.pb_ratio,
            current_ratio: self.current_ratio,
            debt_to_equity: self.debt_to_equity,
            roe: self.roe,
            dividend_yield: self.dividend_yield,
            earnings_growth: self.earnings_growth,
            revenue_growth: self.revenue_growth,
            source: MetricsOrigin::External,
        })
    }
}

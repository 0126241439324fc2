use crate::domain::metrics::{MetricsOrigin, StockMetrics};
use crate::metrics::{normalize_ticker, MetricsError, MetricsProvider};
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq)]
pub struct KnownStock {
    pub ticker: &'static str,
    pub name: &'static str,
    pub price: f64,
    pub pe_ratio: f64,
    pub pb_ratio: f64,
    pub current_ratio: f64,
    pub debt_to_equity: f64,
    pub roe: f64,
    pub dividend_yield: f64,
    pub earnings_growth: f64,
    pub revenue_growth: f64,
}

impl KnownStock {
    fn to_metrics(&self) -> StockMetrics {
        StockMetrics {
            ticker: self.ticker.to_string(),
            name: self.name.to_string(),
            price: self.price,
            pe_ratio: self.pe_ratio,
            pb_ratio: self.pb_ratio,
            current_ratio: self.current_ratio,
            debt_to_equity: self.debt_to_equity,
            roe: self.roe,
            dividend_yield: self.dividend_yield,
            earnings_growth: self.earnings_growth,
            revenue_growth: self.revenue_growth,
            source: MetricsOrigin::Known,
        }
    }
}

// Reference figures for the most followed Oslo Børs names.
pub static KNOWN_STOCKS: [KnownStock; 8] = [
    KnownStock {
        ticker: "EQNR.OL",
        name: "Equinor ASA",
        price: 285.40,
        pe_ratio: 8.1,
        pb_ratio: 1.9,
        current_ratio: 1.5,
        debt_to_equity: 0.55,
        roe: 24.3,
        dividend_yield: 4.8,
        earnings_growth: -12.0,
        revenue_growth: -8.5,
    },
    KnownStock {
        ticker: "DNB.OL",
        name: "DNB Bank ASA",
        price: 212.60,
        pe_ratio: 9.4,
        pb_ratio: 1.3,
        current_ratio: 1.1,
        debt_to_equity: 0.9,
        roe: 15.8,
        dividend_yield: 6.1,
        earnings_growth: 7.5,
        revenue_growth: 6.0,
    },
    KnownStock {
        ticker: "TEL.OL",
        name: "Telenor ASA",
        price: 128.90,
        pe_ratio: 17.2,
        pb_ratio: 3.1,
        current_ratio: 0.9,
        debt_to_equity: 1.4,
        roe: 14.2,
        dividend_yield: 7.2,
        earnings_growth: 2.1,
        revenue_growth: 1.4,
    },
    KnownStock {
        ticker: "NHY.OL",
        name: "Norsk Hydro ASA",
        price: 64.20,
        pe_ratio: 13.5,
        pb_ratio: 1.2,
        current_ratio: 1.8,
        debt_to_equity: 0.35,
        roe: 9.6,
        dividend_yield: 3.9,
        earnings_growth: 11.0,
        revenue_growth: 4.2,
    },
    KnownStock {
        ticker: "MOWI.OL",
        name: "Mowi ASA",
        price: 198.30,
        pe_ratio: 19.8,
        pb_ratio: 2.8,
        current_ratio: 2.3,
        debt_to_equity: 0.7,
        roe: 16.4,
        dividend_yield: 4.1,
        earnings_growth: 9.0,
        revenue_growth: 8.3,
    },
    KnownStock {
        ticker: "YAR.OL",
        name: "Yara International ASA",
        price: 342.10,
        pe_ratio: 22.6,
        pb_ratio: 1.6,
        current_ratio: 1.7,
        debt_to_equity: 0.8,
        roe: 6.9,
        dividend_yield: 2.6,
        earnings_growth: -4.5,
        revenue_growth: -10.2,
    },
    KnownStock {
        ticker: "ORK.OL",
        name: "Orkla ASA",
        price: 86.70,
        pe_ratio: 16.1,
        pb_ratio: 2.0,
        current_ratio: 1.2,
        debt_to_equity: 0.45,
        roe: 12.8,
        dividend_yield: 3.5,
        earnings_growth: 6.2,
        revenue_growth: 3.9,
    },
    KnownStock {
        ticker: "AKRBP.OL",
        name: "Aker BP ASA",
        price: 251.80,
        pe_ratio: 7.3,
        pb_ratio: 1.4,
        current_ratio: 1.3,
        debt_to_equity: 0.6,
        roe: 19.5,
        dividend_yield: 8.9,
        earnings_growth: 4.0,
        revenue_growth: 12.5,
    },
];

/// Where a ticker's builtin metrics come from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricsSource {
    Known(&'static KnownStock),
    Synthetic(u64),
}

impl MetricsSource {
    /// Expects a normalized ticker.
    pub fn resolve(ticker: &str) -> Self {
        match KNOWN_STOCKS.iter().find(|s| s.ticker == ticker) {
            Some(known) => MetricsSource::Known(known),
            None => MetricsSource::Synthetic(ticker_seed(ticker)),
        }
    }

    pub fn metrics(&self, ticker: &str) -> StockMetrics {
        match self {
            MetricsSource::Known(known) => known.to_metrics(),
            MetricsSource::Synthetic(seed) => synthetic_metrics(ticker, *seed),
        }
    }
}

/// FNV-1a over the ticker bytes. Stable across processes and builds.
pub fn ticker_seed(ticker: &str) -> u64 {
    const OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
    const PRIME: u64 = 0x0000_0100_0000_01b3;
    ticker
        .bytes()
        .fold(OFFSET_BASIS, |hash, b| (hash ^ u64::from(b)).wrapping_mul(PRIME))
}

fn synthetic_metrics(ticker: &str, seed: u64) -> StockMetrics {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut draw = |lo: f64, hi: f64| round2(rng.gen_range(lo..=hi));

    StockMetrics {
        ticker: ticker.to_string(),
        name: ticker.to_string(),
        price: draw(50.0, 500.0),
        pe_ratio: draw(8.0, 35.0),
        pb_ratio: draw(0.5, 5.0),
        current_ratio: draw(0.8, 4.0),
        debt_to_equity: draw(0.1, 2.0),
        roe: draw(5.0, 30.0),
        dividend_yield: draw(0.0, 6.0),
        earnings_growth: draw(-5.0, 25.0),
        revenue_growth: draw(-5.0, 20.0),
        source: MetricsOrigin::Synthetic,
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Fixed reference table with deterministic synthetic fallback. Total: every
/// string, blank included, gets metrics. Figures do not vary with the as-of
/// date.
#[derive(Debug, Clone, Default)]
pub struct BuiltinMetricsProvider;

impl BuiltinMetricsProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl MetricsProvider for BuiltinMetricsProvider {
    fn provider_name(&self) -> &'static str {
        "builtin"
    }

    async fn fetch_metrics(
        &self,
        ticker: &str,
        _as_of_date: NaiveDate,
    ) -> Result<StockMetrics, MetricsError> {
        let ticker = normalize_ticker(ticker);
        let source = MetricsSource::resolve(&ticker);
        tracing::debug!(
            %ticker,
            synthetic = matches!(source, MetricsSource::Synthetic(_)),
            "resolved builtin metrics source"
        );
        Ok(source.metrics(&ticker))
    }
}

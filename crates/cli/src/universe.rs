use aksjeradar_core::metrics::builtin::KNOWN_STOCKS;
use aksjeradar_core::metrics::normalize_ticker;

#[derive(Debug, Clone)]
pub struct UniverseOptions {
    /// Start from the builtin Oslo Børs reference table.
    pub include_known: bool,

    /// Extra tickers from `SCREEN_UNIVERSE` ("KOG.OL,SALM.OL").
    pub extra: Vec<String>,

    /// Maximum number of tickers to screen.
    pub max_size: usize,
}

impl Default for UniverseOptions {
    fn default() -> Self {
        Self {
            include_known: true,
            extra: Vec::new(),
            max_size: 50,
        }
    }
}

impl UniverseOptions {
    pub fn from_env() -> Self {
        let mut out = Self::default();

        if let Ok(s) = std::env::var("SCREEN_UNIVERSE") {
            out.extra = split_tickers(&s);
        }

        if let Ok(s) = std::env::var("SCREEN_MAX_SIZE") {
            if let Ok(n) = s.parse::<usize>() {
                out.max_size = n;
            }
        }

        out
    }
}

/// Explicit tickers win; otherwise the configured universe. Normalized and
/// deduplicated, first occurrence kept.
pub fn build_universe(explicit: &[String], opts: &UniverseOptions) -> anyhow::Result<Vec<String>> {
    let mut candidates: Vec<String> = Vec::new();
    if explicit.is_empty() {
        if opts.include_known {
            candidates.extend(KNOWN_STOCKS.iter().map(|s| s.ticker.to_string()));
        }
        candidates.extend(opts.extra.iter().cloned());
    } else {
        candidates.extend(explicit.iter().flat_map(|s| split_tickers(s)));
    }

    let mut out: Vec<String> = Vec::with_capacity(candidates.len());
    for ticker in candidates {
        let ticker = normalize_ticker(&ticker);
        if !ticker.is_empty() && !out.contains(&ticker) {
            out.push(ticker);
        }
    }

    anyhow::ensure!(!out.is_empty(), "screen universe is empty");
    anyhow::ensure!(
        out.len() <= opts.max_size,
        "screen universe has {} tickers, max is {}",
        out.len(),
        opts.max_size
    );
    Ok(out)
}

fn split_tickers(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

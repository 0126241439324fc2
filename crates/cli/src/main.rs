use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use aksjeradar_core::analysis::{self, Strategy};

mod universe;

#[derive(Debug, Parser)]
#[command(name = "aksjeradar", about = "Value-investing scores for Oslo Børs tickers")]
struct Args {
    /// Market as-of date (YYYY-MM-DD). Defaults to the latest completed Oslo session.
    #[arg(long, global = true)]
    as_of_date: Option<String>,

    /// Scoring table: graham or buffett.
    #[arg(long, global = true, default_value = "graham")]
    strategy: Strategy,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Score a single ticker.
    Analyze {
        #[arg(value_parser = parse_ticker)]
        ticker: String,
    },

    /// Score and rank several tickers (comma or space separated).
    Screen {
        tickers: Vec<String>,

        /// Only print the best N entries.
        #[arg(long)]
        top: Option<usize>,
    },
}

fn parse_ticker(s: &str) -> Result<String, String> {
    let ticker = aksjeradar_core::metrics::normalize_ticker(s);
    if ticker.is_empty() {
        return Err("ticker must be non-empty".to_string());
    }
    Ok(ticker)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = aksjeradar_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let result = run(args, &settings).await;
    if let Err(err) = &result {
        sentry_anyhow::capture_anyhow(err);
        tracing::error!(error = %err, "aksjeradar run failed");
    }
    result
}

async fn run(args: Args, settings: &aksjeradar_core::config::Settings) -> anyhow::Result<()> {
    let as_of_date = aksjeradar_core::time::oslo_market::resolve_as_of_date(
        args.as_of_date.as_deref(),
        chrono::Utc::now(),
    )?;
    let provider = aksjeradar_core::metrics::from_settings(settings)?;

    let output = match args.command {
        Command::Analyze { ticker } => {
            let analysis =
                analysis::analyze_ticker(provider.as_ref(), &ticker, args.strategy, as_of_date)
                    .await?;
            serde_json::to_string_pretty(&analysis)
        }
        Command::Screen { tickers, top } => {
            let universe =
                universe::build_universe(&tickers, &universe::UniverseOptions::from_env())?;
            let mut entries =
                analysis::screen(provider.as_ref(), &universe, args.strategy, as_of_date).await;
            tracing::info!(
                %as_of_date,
                strategy = %args.strategy,
                requested = universe.len(),
                scored = entries.len(),
                "screen complete"
            );
            if let Some(n) = top {
                entries.truncate(n);
            }
            serde_json::to_string_pretty(&entries)
        }
    }
    .context("failed to serialize analysis output")?;

    println!("{output}");
    Ok(())
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

    #[test]
    fn parses_analyze_with_global_flags() {
        let args = Args::try_parse_from([
            "aksjeradar",
            "analyze",
            "eqnr.ol",
            "--strategy",
            "buffett",
            "--as-of-date",
            "2026-10-16",
        ])
        .unwrap();
        assert_eq!(args.strategy, Strategy::Buffett);
        assert_eq!(args.as_of_date.as_deref(), Some("2026-10-16"));
        assert!(matches!(args.command, Command::Analyze { ref ticker } if ticker == "EQNR.OL"));
    }

    #[test]
    fn parses_screen_with_top() {
        let args =
            Args::try_parse_from(["aksjeradar", "screen", "EQNR.OL", "DNB.OL", "--top", "1"])
                .unwrap();
        assert_eq!(args.strategy, Strategy::Graham);
        match args.command {
            Command::Screen { tickers, top } => {
                assert_eq!(tickers.len(), 2);
                assert_eq!(top, Some(1));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_blank_ticker() {
        assert!(Args::try_parse_from(["aksjeradar", "analyze", "  "]).is_err());
        assert!(Args::try_parse_from(["aksjeradar", "analyze", ""]).is_err());
    }

    #[test]
    fn rejects_unknown_strategy() {
        assert!(Args::try_parse_from(["aksjeradar", "--strategy", "lynch", "analyze", "X"]).is_err());
    }
}

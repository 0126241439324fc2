use anyhow::Context;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::collections::HashSet;

const CET_OFFSET_SECS: i32 = 3600;
const CEST_OFFSET_SECS: i32 = 2 * 3600;

// Continuous trading ends 16:20 local time and the closing auction is done
// by 16:30. Before 16:30 the previous session is the latest complete one.
const CLOSE_CUTOFF_HOUR: u32 = 16;
const CLOSE_CUTOFF_MINUTE: u32 = 30;

pub fn resolve_as_of_date(
    as_of_date_arg: Option<&str>,
    now_utc: DateTime<Utc>,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = as_of_date_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid as-of date '{s}', expected YYYY-MM-DD"));
    }

    let offset = chrono::FixedOffset::east_opt(oslo_offset_secs(now_utc))
        .context("invalid Oslo offset")?;
    let now_local = now_utc.with_timezone(&offset);

    let cutoff_reached =
        (now_local.hour(), now_local.minute()) >= (CLOSE_CUTOFF_HOUR, CLOSE_CUTOFF_MINUTE);
    let mut date = now_local.date_naive();
    if !cutoff_reached {
        date = date - Duration::days(1);
    }

    let holidays = configured_holidays(date.year());
    while is_weekend(date) || holidays.contains(&date) {
        date = date - Duration::days(1);
    }

    Ok(date)
}

/// CEST between 01:00 UTC on the last Sundays of March and October.
fn oslo_offset_secs(now_utc: DateTime<Utc>) -> i32 {
    let year = now_utc.year();
    let switch = |month| {
        last_sunday(year, month)
            .and_then(|d| d.and_hms_opt(1, 0, 0))
            .map(|dt| dt.and_utc())
    };

    match (switch(3), switch(10)) {
        (Some(start), Some(end)) if now_utc >= start && now_utc < end => CEST_OFFSET_SECS,
        _ => CET_OFFSET_SECS,
    }
}

fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    let last = next_month.pred_opt()?;
    let back = last.weekday().num_days_from_sunday();
    Some(last - Duration::days(i64::from(back)))
}

fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), chrono::Weekday::Sat | chrono::Weekday::Sun)
}

/// Closures for `year` and the year before, enough for any roll-back that
/// starts in `year`.
fn configured_holidays(year: i32) -> HashSet<NaiveDate> {
    // Fixed-date closures only; Easter and Ascension move and must come from
    // OSLO_MARKET_HOLIDAYS="YYYY-MM-DD,YYYY-MM-DD".
    let fixed = [(1, 1), (5, 1), (5, 17), (12, 24), (12, 25), (12, 26), (12, 31)];
    let mut out = HashSet::new();
    for y in [year - 1, year] {
        for (m, d) in fixed {
            if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
                out.insert(date);
            }
        }
    }

    if let Ok(s) = std::env::var("OSLO_MARKET_HOLIDAYS") {
        for part in s.split(',') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match NaiveDate::parse_from_str(part, "%Y-%m-%d") {
                Ok(d) => {
                    out.insert(d);
                }
                Err(e) => tracing::warn!(value = part, error = %e, "ignoring invalid OSLO_MARKET_HOLIDAYS entry"),
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn explicit_date_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(Some("2025-11-14"), now).unwrap(), date(2025, 11, 14));
        assert!(resolve_as_of_date(Some("14.11.2025"), now).is_err());
    }

    #[test]
    fn rolls_back_on_weekend() {
        // 2026-01-03 is a Saturday.
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 1, 2));
    }

    #[test]
    fn uses_previous_session_before_cutoff() {
        // 14:00 UTC = 15:00 CET on a Monday.
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 14, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 1, 2));
    }

    #[test]
    fn uses_same_day_after_cutoff() {
        let now = Utc.with_ymd_and_hms(2026, 1, 5, 16, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 1, 5));
    }

    #[test]
    fn applies_summer_time() {
        // 14:45 UTC = 16:45 CEST, past the cutoff only under summer time.
        let now = Utc.with_ymd_and_hms(2026, 6, 10, 14, 45, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 6, 10));
    }

    #[test]
    fn skips_christmas_closures() {
        let now = Utc.with_ymd_and_hms(2026, 12, 28, 8, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 12, 23));
    }

    #[test]
    fn fixed_closures_hold_in_any_year() {
        // 2035-12-27 is a Thursday after the Christmas closures.
        let now = Utc.with_ymd_and_hms(2035, 12, 27, 8, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2035, 12, 21));
        // 2041-01-02 09:00 CET: 1 January and New Year's Eve of the prior year.
        let now = Utc.with_ymd_and_hms(2041, 1, 2, 8, 0, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2040, 12, 28));
    }

    #[test]
    fn closing_auction_sets_the_cutoff() {
        // 15:25 UTC = 16:25 CET, after the 16:20 close but before the auction ends.
        let now = Utc.with_ymd_and_hms(2026, 1, 6, 15, 25, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 1, 5));
        let now = Utc.with_ymd_and_hms(2026, 1, 6, 15, 30, 0).unwrap();
        assert_eq!(resolve_as_of_date(None, now).unwrap(), date(2026, 1, 6));
    }

    #[test]
    fn finds_last_sundays() {
        assert_eq!(last_sunday(2026, 3), Some(date(2026, 3, 29)));
        assert_eq!(last_sunday(2026, 10), Some(date(2026, 10, 25)));
        assert_eq!(last_sunday(2026, 12), Some(date(2026, 12, 27)));
    }
}

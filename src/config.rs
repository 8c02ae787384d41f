use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Datelike, Local, NaiveDate};

use crate::nba_stats::NBA_STATS_BASE_URL;
use crate::stats_cache::default_db_path;

const CACHE_DIR: &str = "hoops_hustler";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub season: String,
    pub stats_base_url: String,
    pub offline: bool,
}

impl AppConfig {
    /// Reads `.env.local`, `.env`, then the process environment.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");

        let db_path = non_empty_env("HOOPS_DB_PATH")
            .map(PathBuf::from)
            .or_else(default_db_path)
            .context("unable to resolve sqlite path; set HOOPS_DB_PATH")?;
        let season = non_empty_env("NBA_SEASON")
            .filter(|s| is_valid_season(s))
            .unwrap_or_else(|| current_season(Local::now().date_naive()));
        let stats_base_url =
            non_empty_env("NBA_STATS_BASE_URL").unwrap_or_else(|| NBA_STATS_BASE_URL.to_string());
        let offline = non_empty_env("HOOPS_OFFLINE").is_some_and(|v| parse_flag(&v));

        Ok(Self {
            db_path,
            season,
            stats_base_url,
            offline,
        })
    }
}

pub fn app_cache_dir() -> Option<PathBuf> {
    if let Some(base) = non_empty_env("XDG_CACHE_HOME") {
        return Some(PathBuf::from(base).join(CACHE_DIR));
    }
    let home = non_empty_env("HOME")?;
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

/// Season label for `today`. Seasons tip off in October.
pub fn current_season(today: NaiveDate) -> String {
    let start = if today.month() >= 10 {
        today.year()
    } else {
        today.year() - 1
    };
    season_label(start)
}

pub fn season_label(start_year: i32) -> String {
    format!("{start_year}-{:02}", (start_year + 1).rem_euclid(100))
}

/// `YYYY-YY` with the second year following the first.
pub fn is_valid_season(raw: &str) -> bool {
    let Some((start, end)) = raw.trim().split_once('-') else {
        return false;
    };
    if start.len() != 4 || end.len() != 2 {
        return false;
    }
    let (Ok(start), Ok(end)) = (start.parse::<i32>(), end.parse::<i32>()) else {
        return false;
    };
    start >= 1946 && (start + 1).rem_euclid(100) == end
}

fn parse_flag(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{current_season, is_valid_season, parse_flag, season_label};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn season_rolls_over_in_october() {
        assert_eq!(current_season(date(2026, 10, 16)), "2026-27");
        assert_eq!(current_season(date(2026, 9, 30)), "2025-26");
        assert_eq!(current_season(date(2026, 3, 1)), "2025-26");
    }

    #[test]
    fn season_label_wraps_century() {
        assert_eq!(season_label(1999), "1999-00");
        assert_eq!(season_label(2009), "2009-10");
    }

    #[test]
    fn season_validation() {
        assert!(is_valid_season("2024-25"));
        assert!(is_valid_season("1999-00"));
        assert!(!is_valid_season("2024-26"));
        assert!(!is_valid_season("2024"));
        assert!(!is_valid_season("abcd-ef"));
    }

    #[test]
    fn flags() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag(" 1 "));
        assert!(!parse_flag("0"));
        assert!(!parse_flag("nope"));
    }
}

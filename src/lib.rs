//! # Club Tournament
//!
//! Round and pairing engine for chess club tournaments.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (tournaments, rounds, matches, standings)
//! - **pairing**: Score-bucket round generation with repeat avoidance
//! - **calculate**: Standings, winners and career statistics
//! - **storage**: Filesystem persistence (JSONL)
//! - **config**: Configuration loading and validation

pub mod calculate;
pub mod config;
pub mod models;
pub mod pairing;
pub mod storage;

pub use models::*;

use chrono::NaiveDate;
use regex::Regex;

/// Lowercase a location into `[a-z0-9_]`, e.g. "Saint-Étienne Club" becomes
/// "saint_tienne_club".
pub fn slugify(location: &str) -> String {
    let lower = location.trim().to_lowercase();
    match Regex::new(r"[^a-z0-9]+") {
        Ok(re) => re.replace_all(&lower, "_").trim_matches('_').to_string(),
        Err(_) => lower,
    }
}

/// Next tournament name for a location and date:
/// `tournament_<n>_<slug>_<YYYY-MM-DD>`, where `n` follows the highest
/// number already used.
pub fn tournament_name<S: AsRef<str>>(location: &str, existing: &[S], date: NaiveDate) -> String {
    let next = Regex::new(r"^tournament_(\d+)_")
        .ok()
        .and_then(|re| {
            existing
                .iter()
                .filter_map(|name| {
                    re.captures(name.as_ref())
                        .and_then(|c| c.get(1))
                        .and_then(|m| m.as_str().parse::<u32>().ok())
                })
                .max()
        })
        .map_or(1, |n| n + 1);

    let slug = slugify(location);
    if slug.is_empty() {
        format!("tournament_{}_{}", next, date.format("%Y-%m-%d"))
    } else {
        format!("tournament_{}_{}_{}", next, slug, date.format("%Y-%m-%d"))
    }
}

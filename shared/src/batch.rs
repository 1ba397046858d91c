//! Traceability codes, expiry computation and freshness classification
//!
//! Everything here is a pure function of its inputs: the caller supplies the
//! production date and, where relevant, the current instant. The code shapes
//! and the 30-day month approximation are frozen by the batches already
//! labelled and archived with them.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ProductCategory;

/// Days to expiry at or below which a batch is flagged as expiring soon.
/// Fixed window, independent of the category shelf life.
pub const WARNING_WINDOW_DAYS: i64 = 30;

/// Errors from parsing a manually entered production date
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid production date '{0}', expected dd/mm/yyyy")]
    InvalidDateFormat(String),
}

/// Derived traceability codes for one production run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchCodes {
    /// Week-based code: `yyCww-ww+1`
    pub batch: String,
    /// Day-based code: `yy-jjj-C`
    pub sub_batch: String,
}

/// Freshness tier of a recorded best-before date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreshnessStatus {
    Expired,
    Warning,
    Ok,
}

impl FreshnessStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessStatus::Expired => "expired",
            FreshnessStatus::Warning => "warning",
            FreshnessStatus::Ok => "ok",
        }
    }
}

/// Parse a production date entered as strict `dd/mm/yyyy`.
pub fn parse_production_date(input: &str) -> Result<NaiveDate, BatchError> {
    let invalid = || BatchError::InvalidDateFormat(input.to_string());

    let mut parts = input.trim().split('/');
    let (Some(day), Some(month), Some(year), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(invalid());
    };

    let day: u32 = day.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;
    let year: i32 = year.parse().map_err(|_| invalid())?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// Resolve the production date used for code generation.
///
/// A missing or malformed DPJ falls back to `today` rather than failing;
/// label printing must never stall on operator input. Callers that want to
/// log the fallback can use [`parse_production_date`] directly.
pub fn production_date_or(input: Option<&str>, today: NaiveDate) -> NaiveDate {
    match input {
        Some(raw) => parse_production_date(raw).unwrap_or(today),
        None => today,
    }
}

/// Two-digit year, e.g. 2024 -> "24"
pub fn two_digit_year(date: NaiveDate) -> String {
    format!("{:02}", date.year().rem_euclid(100))
}

/// Day of year, 1-366
pub fn day_of_year(date: NaiveDate) -> u32 {
    date.ordinal()
}

/// ISO-8601 week number, 1-53
pub fn iso_week(date: NaiveDate) -> u32 {
    date.iso_week().week()
}

/// Single-letter product code derived from the commercial name
pub fn product_letter(product_name: &str) -> char {
    let name = product_name.to_lowercase();
    if name.contains("poulet") {
        'P'
    } else if name.contains("dinde") {
        'D'
    } else {
        'X'
    }
}

/// Build the batch and sub-batch codes for a production run.
///
/// The batch suffix is always `week + 1`, even across the ISO year
/// boundary; existing labels and the movement archive use exactly this
/// shape, so it is reproduced as-is.
pub fn batch_codes(date: NaiveDate, product_name: &str) -> BatchCodes {
    let year = two_digit_year(date);
    let letter = product_letter(product_name);
    let week = iso_week(date);

    BatchCodes {
        sub_batch: format!("{}-{:03}-{}", year, day_of_year(date), letter),
        batch: format!("{}{}{}-{}", year, letter, week, week + 1),
    }
}

/// Best-before instant: midnight UTC of the production date plus the
/// category shelf life.
pub fn best_before(production_date: NaiveDate, category: ProductCategory) -> DateTime<Utc> {
    let midnight = production_date.and_time(NaiveTime::MIN);
    Utc.from_utc_datetime(&midnight) + Duration::days(category.shelf_life_days())
}

/// Classify a best-before instant relative to `now`.
///
/// Whole days are floored (not truncated toward zero), so one second past
/// the best-before instant already counts as day -1 and the batch reads
/// `Expired`, while exactly 30 days out is still `Warning`.
pub fn classify_freshness(best_before: DateTime<Utc>, now: DateTime<Utc>) -> FreshnessStatus {
    let delta_days = (best_before - now).num_seconds().div_euclid(86_400);

    if delta_days < 0 {
        FreshnessStatus::Expired
    } else if delta_days <= WARNING_WINDOW_DAYS {
        FreshnessStatus::Warning
    } else {
        FreshnessStatus::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_strict_day_month_year() {
        assert_eq!(parse_production_date("15/03/2024"), Ok(date(2024, 3, 15)));
        assert_eq!(parse_production_date(" 1/1/2024 "), Ok(date(2024, 1, 1)));
    }

    #[test]
    fn rejects_malformed_input() {
        for raw in ["2024-03-15", "15/03", "32/01/2024", "29/02/2023", "a/b/c", "", "1/2/3/4"] {
            assert!(parse_production_date(raw).is_err(), "accepted {:?}", raw);
        }
    }

    #[test]
    fn falls_back_to_today_on_bad_input() {
        let today = date(2024, 6, 1);
        assert_eq!(production_date_or(Some("not-a-date"), today), today);
        assert_eq!(production_date_or(None, today), today);
        assert_eq!(
            production_date_or(Some("15/03/2024"), today),
            date(2024, 3, 15)
        );
    }

    #[test]
    fn product_letter_matches_family_names() {
        assert_eq!(product_letter("Poulet Entier"), 'P');
        assert_eq!(product_letter("CUISSE DE DINDE"), 'D');
        assert_eq!(product_letter("Merguez"), 'X');
    }

    #[test]
    fn reference_batch_codes() {
        // 2024-03-15: day 75, ISO week 11
        let codes = batch_codes(date(2024, 3, 15), "Poulet Entier");
        assert_eq!(codes.sub_batch, "24-075-P");
        assert_eq!(codes.batch, "24P11-12");
    }

    #[test]
    fn msm_shelf_life_is_360_days() {
        let bbd = best_before(date(2024, 1, 1), ProductCategory::Msm);
        assert_eq!(bbd.date_naive(), date(2024, 12, 26));
    }

    #[test]
    fn freshness_thresholds() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(
            classify_freshness(now + Duration::days(31), now),
            FreshnessStatus::Ok
        );
        assert_eq!(
            classify_freshness(now + Duration::days(30), now),
            FreshnessStatus::Warning
        );
        assert_eq!(
            classify_freshness(now, now),
            FreshnessStatus::Warning,
            "zero whole days left is still within the warning window"
        );
        assert_eq!(
            classify_freshness(now - Duration::seconds(1), now),
            FreshnessStatus::Expired,
            "floored day count goes to -1 immediately past the instant"
        );
    }
}

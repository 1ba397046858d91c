//! Traceability code and expiry tests
//!
//! Covers batch/sub-batch code generation, production date parsing with its
//! fallback, category shelf lives and the three-tier freshness
//! classification.

use chrono::{Datelike, Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use shared::batch::{
    batch_codes, best_before, classify_freshness, parse_production_date, product_letter,
    production_date_or, FreshnessStatus, WARNING_WINDOW_DAYS,
};
use shared::models::ProductCategory;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_known_batch_codes() {
        // 2024-03-15 is day 75, ISO week 11
        let codes = batch_codes(date(2024, 3, 15), "Poulet Entier");
        assert_eq!(codes.sub_batch, "24-075-P");
        assert_eq!(codes.batch, "24P11-12");

        // 2023-01-02 is day 2, ISO week 1
        let codes = batch_codes(date(2023, 1, 2), "Escalope de Dinde");
        assert_eq!(codes.sub_batch, "23-002-D");
        assert_eq!(codes.batch, "23D1-2");
    }

    #[test]
    fn test_unknown_family_letter_is_x() {
        let codes = batch_codes(date(2024, 7, 1), "Merguez");
        assert!(codes.sub_batch.ends_with("-X"));
        assert_eq!(product_letter("Merguez"), 'X');
    }

    #[test]
    fn test_week_suffix_across_year_boundary() {
        // 2024-12-30 falls in ISO week 1 of 2025, but the year prefix stays
        // 24 and the suffix is still week + 1
        let codes = batch_codes(date(2024, 12, 30), "Merguez");
        assert_eq!(codes.batch, "24X1-2");
    }

    #[test]
    fn test_week_53_suffix() {
        // 2020-12-31 is in ISO week 53; the suffix simply reads 54
        let codes = batch_codes(date(2020, 12, 31), "Poulet");
        assert_eq!(codes.batch, "20P53-54");
    }

    #[test]
    fn test_strict_date_parsing() {
        assert_eq!(parse_production_date("15/03/2024"), Ok(date(2024, 3, 15)));
        assert!(parse_production_date("2024-03-15").is_err());
        assert!(parse_production_date("31/02/2024").is_err());
        assert!(parse_production_date("15/03").is_err());
        assert!(parse_production_date("").is_err());
    }

    #[test]
    fn test_malformed_dpj_falls_back_to_today() {
        let today = date(2024, 6, 10);
        assert_eq!(production_date_or(Some("junk"), today), today);
        assert_eq!(production_date_or(None, today), today);
        assert_eq!(
            production_date_or(Some("01/02/2024"), today),
            date(2024, 2, 1)
        );
    }

    #[test]
    fn test_shelf_life_days_per_category() {
        assert_eq!(ProductCategory::Msm.shelf_life_days(), 360);
        assert_eq!(ProductCategory::Offal.shelf_life_days(), 270);
        assert_eq!(ProductCategory::Whole.shelf_life_days(), 540);
        assert_eq!(ProductCategory::Cut.shelf_life_days(), 540);
    }

    #[test]
    fn test_best_before_is_midnight_plus_shelf_life() {
        let bbd = best_before(date(2024, 1, 1), ProductCategory::Msm);
        assert_eq!(bbd, Utc.with_ymd_and_hms(2024, 12, 26, 0, 0, 0).unwrap());

        let bbd = best_before(date(2024, 1, 1), ProductCategory::Offal);
        assert_eq!(bbd.date_naive(), date(2024, 9, 27));
    }

    #[test]
    fn test_freshness_tiers() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 8, 30, 0).unwrap();

        assert_eq!(
            classify_freshness(now + Duration::days(200), now),
            FreshnessStatus::Ok
        );
        assert_eq!(
            classify_freshness(now + Duration::days(WARNING_WINDOW_DAYS), now),
            FreshnessStatus::Warning
        );
        assert_eq!(
            classify_freshness(now + Duration::hours(12), now),
            FreshnessStatus::Warning
        );
        assert_eq!(
            classify_freshness(now - Duration::seconds(1), now),
            FreshnessStatus::Expired
        );
        assert_eq!(
            classify_freshness(now - Duration::days(3), now),
            FreshnessStatus::Expired
        );
    }

    #[test]
    fn test_warning_boundary_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        // Exactly 30 whole days left: warning. One second more: ok.
        assert_eq!(
            classify_freshness(now + Duration::days(30), now),
            FreshnessStatus::Warning
        );
        assert_eq!(
            classify_freshness(now + Duration::days(30) + Duration::seconds(1), now),
            FreshnessStatus::Warning,
            "30 days and change still floors to 30"
        );
        assert_eq!(
            classify_freshness(now + Duration::days(31), now),
            FreshnessStatus::Ok
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn date_strategy() -> impl Strategy<Value = NaiveDate> {
        (2000i32..=2099, 1u32..=12, 1u32..=28)
            .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    fn category_strategy() -> impl Strategy<Value = ProductCategory> {
        prop_oneof![
            Just(ProductCategory::Msm),
            Just(ProductCategory::Offal),
            Just(ProductCategory::Whole),
            Just(ProductCategory::Cut),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        /// Same inputs always yield the same codes
        #[test]
        fn prop_codes_are_deterministic(d in date_strategy(), name in "[A-Za-z ]{1,30}") {
            let a = batch_codes(d, &name);
            let b = batch_codes(d, &name);
            prop_assert_eq!(a, b);
        }

        /// Sub-batch always has the shape yy-jjj-C
        #[test]
        fn prop_sub_batch_shape(d in date_strategy(), name in "[A-Za-z ]{1,30}") {
            let codes = batch_codes(d, &name);
            let parts: Vec<&str> = codes.sub_batch.split('-').collect();
            prop_assert_eq!(parts.len(), 3);
            prop_assert_eq!(parts[0].len(), 2);
            prop_assert_eq!(parts[1].len(), 3);
            let day: u32 = parts[1].parse().unwrap();
            prop_assert!((1..=366).contains(&day));
            prop_assert!(matches!(parts[2], "P" | "D" | "X"));
        }

        /// Batch suffix is always the week number plus one
        #[test]
        fn prop_batch_suffix_is_week_plus_one(d in date_strategy(), name in "[A-Za-z ]{1,30}") {
            let codes = batch_codes(d, &name);
            let week = d.iso_week().week();
            let suffix = format!("{}-{}", week, week + 1);
            prop_assert!(codes.batch.ends_with(&suffix));
        }

        /// Round-trip: a formatted date always parses back to itself
        #[test]
        fn prop_formatted_date_parses_back(d in date_strategy()) {
            let formatted = d.format("%d/%m/%Y").to_string();
            prop_assert_eq!(parse_production_date(&formatted), Ok(d));
        }

        /// Best-before is strictly after the production date for every category
        #[test]
        fn prop_best_before_after_production(d in date_strategy(), cat in category_strategy()) {
            let bbd = best_before(d, cat);
            prop_assert!(bbd.date_naive() > d);
            let elapsed = (bbd.date_naive() - d).num_days();
            prop_assert_eq!(elapsed, cat.shelf_life_days());
        }

        /// Classification is monotonic: moving now forward never makes a
        /// batch fresher
        #[test]
        fn prop_freshness_monotonic(d in date_strategy(), cat in category_strategy(), offset in 0i64..700) {
            let bbd = best_before(d, cat);
            let earlier = bbd - Duration::days(offset);
            let later = earlier + Duration::days(1);

            let rank = |s: FreshnessStatus| match s {
                FreshnessStatus::Ok => 2,
                FreshnessStatus::Warning => 1,
                FreshnessStatus::Expired => 0,
            };

            prop_assert!(rank(classify_freshness(bbd, later)) <= rank(classify_freshness(bbd, earlier)));
        }
    }
}

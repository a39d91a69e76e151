//! Merge engine: ranking, deduplication and forecast correlation for the
//! combined alert set.
//!
//! `rank` must run before `deduplicate`: dedup keeps the first occurrence of
//! a key, and ranking first guarantees that occurrence is the most severe
//! instance reported by any source.

use itertools::Itertools;

use crate::weather::{Alert, ForecastDay};

/// Stable sort, most severe first. Ties keep their input order.
pub fn rank(mut alerts: Vec<Alert>) -> Vec<Alert> {
    alerts.sort_by_key(|alert| std::cmp::Reverse(alert.severity));
    alerts
}

/// Drop alerts sharing an (event, start) pair with an earlier entry.
pub fn deduplicate(alerts: Vec<Alert>) -> Vec<Alert> {
    alerts
        .into_iter()
        .unique_by(|alert| alert.dedup_key())
        .collect()
}

/// Flag each forecast day whose calendar date carries at least one alert.
/// Date-only comparison; time of day is ignored.
pub fn correlate(alerts: &[Alert], mut forecast: Vec<ForecastDay>) -> Vec<ForecastDay> {
    for day in &mut forecast {
        day.has_warning = alerts
            .iter()
            .any(|alert| alert.start.date_naive() == day.date);
    }
    forecast
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{AlertSource, Severity, WarningIcon};
    use chrono::{NaiveDate, TimeZone, Utc};

    fn alert(event: &str, severity: Severity, day: u32, description: &str) -> Alert {
        Alert {
            event: event.to_string(),
            headline: None,
            description: description.to_string(),
            severity,
            icon: WarningIcon::classify(event),
            start: Utc.with_ymd_and_hms(2026, 1, day, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, day, 23, 59, 59).unwrap(),
            source: AlertSource::Analysis,
        }
    }

    fn day(date: NaiveDate) -> ForecastDay {
        ForecastDay {
            date,
            weather_code: 3,
            condition: "Overcast".to_string(),
            temp_max: 8.0,
            temp_min: 2.0,
            precipitation: 40,
            has_warning: false,
        }
    }

    #[test]
    fn rank_orders_by_severity_desc() {
        let ranked = rank(vec![
            alert("Wind Warning", Severity::Yellow, 2, "a"),
            alert("Snow Warning", Severity::Red, 3, "b"),
            alert("Fog Warning", Severity::Amber, 4, "c"),
        ]);
        let severities: Vec<_> = ranked.iter().map(|a| a.severity).collect();
        assert_eq!(severities, [Severity::Red, Severity::Amber, Severity::Yellow]);
    }

    #[test]
    fn rank_is_stable_within_a_tier() {
        let ranked = rank(vec![
            alert("Wind Warning", Severity::Yellow, 2, "first"),
            alert("Fog Warning", Severity::Yellow, 3, "second"),
        ]);
        assert_eq!(ranked[0].description, "first");
        assert_eq!(ranked[1].description, "second");
    }

    #[test]
    fn dedup_after_rank_keeps_the_most_severe_instance() {
        let deduped = deduplicate(rank(vec![
            alert("Wind Warning", Severity::Yellow, 2, "from analysis"),
            alert("Wind Warning", Severity::Amber, 2, "from the feed"),
        ]));
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].severity, Severity::Amber);
        assert_eq!(deduped[0].description, "from the feed");
    }

    #[test]
    fn dedup_requires_exact_key_match() {
        let deduped = deduplicate(rank(vec![
            alert("Wind Warning", Severity::Yellow, 2, "a"),
            alert("Wind Warning", Severity::Yellow, 3, "different start"),
            alert("Snow Warning", Severity::Yellow, 2, "different event"),
        ]));
        assert_eq!(deduped.len(), 3);
    }

    #[test]
    fn no_duplicate_keys_survive() {
        let alerts = vec![
            alert("Wind Warning", Severity::Yellow, 2, "a"),
            alert("Wind Warning", Severity::Red, 2, "b"),
            alert("Wind Warning", Severity::Amber, 2, "c"),
            alert("Rain Warning", Severity::Amber, 2, "d"),
        ];
        let merged = deduplicate(rank(alerts));
        let keys: Vec<_> = merged.iter().map(Alert::dedup_key).collect();
        let mut unique = keys.clone();
        unique.dedup();
        assert_eq!(keys, unique);
        assert_eq!(merged[0].severity, Severity::Red);
    }

    #[test]
    fn correlate_matches_calendar_dates() {
        let alerts = vec![alert("Snow Warning", Severity::Amber, 2, "x")];
        let forecast = vec![
            day(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            day(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()),
            day(NaiveDate::from_ymd_opt(2026, 1, 3).unwrap()),
        ];
        let flagged = correlate(&alerts, forecast);
        assert_eq!(
            flagged.iter().map(|d| d.has_warning).collect::<Vec<_>>(),
            [false, true, false]
        );
    }

    #[test]
    fn correlate_ignores_time_of_day() {
        let mut late = alert("Snow Warning", Severity::Yellow, 2, "x");
        late.start = Utc.with_ymd_and_hms(2026, 1, 2, 23, 45, 0).unwrap();
        let forecast = vec![day(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap())];
        assert!(correlate(&[late], forecast)[0].has_warning);
    }

    #[test]
    fn empty_alert_list_clears_nothing_and_flags_nothing() {
        let forecast = vec![
            day(NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()),
            day(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()),
        ];
        let flagged = correlate(&[], forecast);
        assert!(flagged.iter().all(|d| !d.has_warning));
    }
}

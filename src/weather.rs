//! The canonical weather model every provider normalizes into.
//!
//! Upstream services disagree about almost everything: severity is free text
//! ("YELLOW", "Moderate", "extreme"), events are free text, timestamps come
//! with or without offsets, forecasts are parallel arrays. The types here are
//! the single shape the rest of the pipeline works with, and the associated
//! `classify` functions are the only place provider text is interpreted.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Severity tier of a warning. The ordering is load-bearing: ranking sorts on
/// it, so `Red` must compare greater than `Amber`, and `Amber` greater than
/// `Yellow`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Severity {
    #[default]
    Yellow,
    Amber,
    Red,
}

impl Severity {
    /// Map free provider text to a canonical tier.
    ///
    /// Case-insensitive substring match, checked most severe first so that
    /// text naming several tiers lands on the worst one. Unrecognised text is
    /// `Yellow`. Classifying an already-canonical label returns it unchanged.
    pub fn classify(text: &str) -> Self {
        let text = text.to_lowercase();
        if text.contains("extreme") || text.contains("red") {
            Self::Red
        } else if text.contains("severe") || text.contains("amber") || text.contains("orange") {
            Self::Amber
        } else {
            Self::Yellow
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Yellow => "Yellow",
            Self::Amber => "Amber",
            Self::Red => "Red",
        }
    }
}

/// Icon category for an alert, derived from its event text. Front-ends map
/// these to whatever glyph set they use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningIcon {
    Thunder,
    Wind,
    Rain,
    Snow,
    Fog,
    Heat,
    Cold,
    Tornado,
    Hurricane,
    Generic,
}

impl WarningIcon {
    /// Keyword table scanned in a fixed order; the first matching keyword
    /// wins, so "thunderstorm with heavy rain" is `Thunder`, not `Rain`.
    pub fn classify(event: &str) -> Self {
        let event = event.to_lowercase();
        const TABLE: &[(&[&str], WarningIcon)] = &[
            (&["thunder", "lightning"], WarningIcon::Thunder),
            (&["wind", "gale"], WarningIcon::Wind),
            (&["rain", "flood"], WarningIcon::Rain),
            (&["snow", "ice", "frost"], WarningIcon::Snow),
            (&["fog"], WarningIcon::Fog),
            (&["heat", "hot"], WarningIcon::Heat),
            (&["cold", "freeze"], WarningIcon::Cold),
            (&["tornado"], WarningIcon::Tornado),
            (&["hurricane", "cyclone"], WarningIcon::Hurricane),
        ];
        for (keywords, icon) in TABLE {
            if keywords.iter().any(|keyword| event.contains(keyword)) {
                return *icon;
            }
        }
        WarningIcon::Generic
    }
}

/// Which subsystem produced an alert. Dedup ignores it; it exists so a report
/// can say where a warning came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertSource {
    /// Explicit warning objects from the Met Office DataHub payload.
    #[serde(rename = "Met Office")]
    MetOffice,
    /// Synthesized from DataHub probability fields.
    #[serde(rename = "Met Office Analysis")]
    MetOfficeAnalysis,
    /// Parsed out of the regional warnings feed.
    #[serde(rename = "Met Office Warnings")]
    RegionFeed,
    /// Synthesized from the generic forecast.
    #[serde(rename = "Weather Analysis")]
    Analysis,
}

/// One severe-weather warning, normalized from whichever source produced it.
///
/// `start` is always present: parsers drop items they cannot date rather than
/// construct an alert without one. `end` defaults to `start` when a feed
/// provides no end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Category label, e.g. "Heavy Rain Warning".
    pub event: String,
    /// Short human title, when the source has one distinct from `event`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headline: Option<String>,
    pub description: String,
    pub severity: Severity,
    pub icon: WarningIcon,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub source: AlertSource,
}

impl Alert {
    /// Key under which logically identical warnings from different sources
    /// collide: exact event label plus exact start time.
    pub fn dedup_key(&self) -> (String, DateTime<Utc>) {
        (self.event.clone(), self.start)
    }
}

/// One day of the outlook. `has_warning` is owned by the merge engine and
/// stays false until an alert is correlated onto the date.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub weather_code: i32,
    pub condition: String,
    pub temp_max: f64,
    pub temp_min: f64,
    /// Chance of precipitation, 0-100.
    pub precipitation: u8,
    pub has_warning: bool,
}

/// Snapshot of the present conditions, display-only: no alert logic reads it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub weather_code: i32,
    pub condition: String,
    pub wind_speed: f64,
    pub wind_direction: f64,
    pub is_day: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
}

/// The per-cycle output handed to the display front-end.
#[derive(Debug, Clone, Serialize)]
pub struct WeatherReport {
    pub current: Option<CurrentConditions>,
    pub alerts: Vec<Alert>,
    pub forecast: Vec<ForecastDay>,
}

/// Human description for a WMO weather interpretation code.
pub fn condition_for_code(code: i32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Foggy",
        48 => "Icy fog",
        51 => "Light drizzle",
        53 => "Drizzle",
        55 => "Dense drizzle",
        56 => "Freezing drizzle",
        57 => "Heavy freezing drizzle",
        61 => "Light rain",
        63 => "Rain",
        65 => "Heavy rain",
        66 => "Freezing rain",
        67 => "Heavy freezing rain",
        71 => "Light snow",
        73 => "Snow",
        75 => "Heavy snow",
        77 => "Snow grains",
        80 => "Light showers",
        81 => "Showers",
        82 => "Heavy showers",
        85 => "Snow showers",
        86 => "Heavy snow showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with hail",
        99 => "Severe thunderstorm",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_precedence() {
        assert_eq!(Severity::classify("extreme"), Severity::Red);
        assert_eq!(Severity::classify("Severe Thunderstorm"), Severity::Amber);
        assert_eq!(Severity::classify("orange"), Severity::Amber);
        assert_eq!(Severity::classify("moderate"), Severity::Yellow);
        assert_eq!(Severity::classify("no idea"), Severity::Yellow);
        // first match wins: red beats a later yellow in the same text
        assert_eq!(Severity::classify("extreme yellow event"), Severity::Red);
    }

    #[test]
    fn severity_is_idempotent() {
        for severity in [Severity::Yellow, Severity::Amber, Severity::Red] {
            assert_eq!(Severity::classify(severity.label()), severity);
        }
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Red > Severity::Amber);
        assert!(Severity::Amber > Severity::Yellow);
    }

    #[test]
    fn icon_keywords() {
        assert_eq!(WarningIcon::classify("Thunderstorm Warning"), WarningIcon::Thunder);
        assert_eq!(WarningIcon::classify("gale force winds"), WarningIcon::Wind);
        assert_eq!(WarningIcon::classify("Flood alert"), WarningIcon::Rain);
        assert_eq!(WarningIcon::classify("Snow, Ice Warning"), WarningIcon::Snow);
        assert_eq!(WarningIcon::classify("dense FOG"), WarningIcon::Fog);
        assert_eq!(WarningIcon::classify("volcanic ash"), WarningIcon::Generic);
    }

    #[test]
    fn icon_first_keyword_wins() {
        // thunder is scanned before rain
        assert_eq!(
            WarningIcon::classify("Thunderstorms with heavy rain"),
            WarningIcon::Thunder
        );
        // wind before snow
        assert_eq!(WarningIcon::classify("wind and snow"), WarningIcon::Wind);
    }

    #[test]
    fn condition_lookup() {
        assert_eq!(condition_for_code(0), "Clear sky");
        assert_eq!(condition_for_code(95), "Thunderstorm");
        assert_eq!(condition_for_code(42), "Unknown");
    }

    #[test]
    fn severity_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&Severity::Amber).unwrap(), "\"Amber\"");
    }
}

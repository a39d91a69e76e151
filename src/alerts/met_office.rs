//! Met Office DataHub site-specific daily payload.
//!
//! Two layers of the same payload can produce alerts. When the point carries
//! explicit warning objects they map straight onto the canonical shape with
//! no heuristics. When it carries none, warnings are derived from the daily
//! probability fields instead (sferics is Met Office speak for lightning).
//! Wind fields here are metres per second, unlike the km/h the generic
//! forecast path works in.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use serde::Deserialize;

use super::{AlertProvider, day_window};
use crate::errors::*;
use crate::http;
use crate::merge;
use crate::weather::{Alert, AlertSource, Severity, WarningIcon};

const DATAHUB_URL: &str = "https://data.hub.api.metoffice.gov.uk/sitespecific/v0/point/daily";

pub(super) struct Service {
    latitude: f64,
    longitude: f64,
    api_key: String,
}

impl Service {
    pub(super) fn new(latitude: f64, longitude: f64, api_key: String) -> Self {
        Self {
            latitude,
            longitude,
            api_key,
        }
    }
}

#[async_trait]
impl AlertProvider for Service {
    fn name(&self) -> &'static str {
        "met office datahub"
    }

    async fn fetch(&self) -> Result<Vec<Alert>> {
        let url = format!(
            "{DATAHUB_URL}?latitude={}&longitude={}",
            self.latitude, self.longitude
        );
        let headers = [
            ("apikey", self.api_key.as_str()),
            ("accept", "application/json"),
        ];
        let body = http::fetch(&url, &headers).await?;
        let payload: ApiResponse = serde_json::from_value(body.json()?)
            .map_err(|e| Error::malformed(format!("datahub payload: {e}")))?;
        Ok(merge::deduplicate(merge::rank(parse(&payload))))
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    features: Option<Vec<ApiFeature>>,
}

#[derive(Deserialize, Debug)]
struct ApiFeature {
    properties: Option<ApiProperties>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct ApiProperties {
    warnings: Option<Vec<ApiWarning>>,
    time_series: Option<Vec<ApiTimeStep>>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct ApiWarning {
    warning_type: Option<String>,
    headline: Option<String>,
    description: Option<String>,
    warning_level: Option<String>,
    valid_from: Option<String>,
    valid_to: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase", default)]
struct ApiTimeStep {
    time: Option<String>,
    day_probability_of_heavy_rain: Option<f64>,
    night_probability_of_heavy_rain: Option<f64>,
    day_probability_of_heavy_snow: Option<f64>,
    night_probability_of_heavy_snow: Option<f64>,
    day_probability_of_sferics: Option<f64>,
    night_probability_of_sferics: Option<f64>,
    midday10_m_wind_speed: Option<f64>,
    midnight10_m_wind_speed: Option<f64>,
    midday10_m_wind_gust: Option<f64>,
    midnight10_m_wind_gust: Option<f64>,
}

/// Explicit warnings first; probability synthesis only when there are none.
fn parse(payload: &ApiResponse) -> Vec<Alert> {
    let features = payload.features.as_deref().unwrap_or_default();

    let mut alerts: Vec<Alert> = features
        .iter()
        .filter_map(|f| f.properties.as_ref())
        .filter_map(|p| p.warnings.as_deref())
        .flatten()
        .filter_map(parse_warning)
        .collect();

    if alerts.is_empty() {
        alerts = features
            .iter()
            .filter_map(|f| f.properties.as_ref())
            .filter_map(|p| p.time_series.as_deref())
            .flatten()
            .flat_map(synthesize_day)
            .collect();
    }

    alerts
}

/// Map one explicit warning object onto the canonical shape. A warning with
/// no parsable start is dropped.
fn parse_warning(warning: &ApiWarning) -> Option<Alert> {
    let start = match warning.valid_from.as_deref().and_then(parse_timestamp) {
        Some(start) => start,
        None => {
            debug!("dropping warning without a valid-from: {:?}", warning.headline);
            return None;
        }
    };
    let end = warning
        .valid_to
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(start);
    let event = warning
        .warning_type
        .clone()
        .unwrap_or_else(|| "Weather Warning".to_string());
    Some(Alert {
        icon: WarningIcon::classify(&event),
        event,
        headline: warning.headline.clone(),
        description: warning.description.clone().unwrap_or_default(),
        severity: warning
            .warning_level
            .as_deref()
            .map(Severity::classify)
            .unwrap_or_default(),
        start,
        end,
        source: AlertSource::MetOffice,
    })
}

/// Validity timestamps arrive in a few shapes: full RFC 3339, bare seconds,
/// minute precision. Take whatever parses.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%MZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
    ] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(parsed.and_utc());
        }
    }
    None
}

fn max_of(day: Option<f64>, night: Option<f64>) -> f64 {
    day.unwrap_or_default().max(night.unwrap_or_default())
}

/// Derive alerts for one daily time step from its probability fields.
/// Probabilities over 50 trigger, over 70 escalate to Amber; wind is m/s
/// with 20/25 trigger bounds and 25/30 escalation bounds.
fn synthesize_day(step: &ApiTimeStep) -> Vec<Alert> {
    let Some(date) = step
        .time
        .as_deref()
        .and_then(|t| t.split('T').next())
        .and_then(|d| d.parse::<NaiveDate>().ok())
    else {
        return Vec::new();
    };
    let (start, end) = day_window(date);
    let mut alerts = Vec::new();
    let mut push = |event: &str, severity: Severity, description: String| {
        alerts.push(Alert {
            event: event.to_string(),
            headline: None,
            description,
            severity,
            icon: WarningIcon::classify(event),
            start,
            end,
            source: AlertSource::MetOfficeAnalysis,
        });
    };

    let escalate = |probability: f64| {
        if probability > 70.0 {
            Severity::Amber
        } else {
            Severity::Yellow
        }
    };

    let heavy_rain = max_of(
        step.day_probability_of_heavy_rain,
        step.night_probability_of_heavy_rain,
    );
    if heavy_rain > 50.0 {
        push(
            "Heavy Rain Warning",
            escalate(heavy_rain),
            format!(
                "Heavy rainfall expected ({heavy_rain}% probability). \
                 Surface water flooding possible in places."
            ),
        );
    }

    let heavy_snow = max_of(
        step.day_probability_of_heavy_snow,
        step.night_probability_of_heavy_snow,
    );
    if heavy_snow > 50.0 {
        push(
            "Snow Warning",
            escalate(heavy_snow),
            format!(
                "Heavy snow expected ({heavy_snow}% probability). \
                 Travel disruption likely. Take care on roads and paths."
            ),
        );
    }

    let sferics = max_of(
        step.day_probability_of_sferics,
        step.night_probability_of_sferics,
    );
    if sferics > 50.0 {
        push(
            "Thunderstorm Warning",
            escalate(sferics),
            format!(
                "Thunderstorms expected ({sferics}% probability) \
                 with possible lightning and heavy rain."
            ),
        );
    }

    let wind = max_of(step.midday10_m_wind_speed, step.midnight10_m_wind_speed);
    let gusts = max_of(step.midday10_m_wind_gust, step.midnight10_m_wind_gust);
    if wind > 20.0 || gusts > 25.0 {
        let severity = if wind > 25.0 || gusts > 30.0 {
            Severity::Amber
        } else {
            Severity::Yellow
        };
        push(
            "Wind Warning",
            severity,
            format!(
                "Strong winds expected. Sustained: {} km/h, Gusts: {} km/h. \
                 Secure loose objects and take care when driving.",
                (wind * 3.6).round(),
                (gusts * 3.6).round()
            ),
        );
    }

    alerts
}

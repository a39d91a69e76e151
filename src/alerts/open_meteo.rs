//! Threshold analysis of the Open-Meteo daily forecast.
//!
//! Open-Meteo has no warnings endpoint, so this source derives alerts from
//! the raw daily numbers: severe weather interpretation codes, sustained wind
//! and gust maxima. Always last in the fallback chain and available for any
//! coordinate.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{AlertProvider, day_window};
use crate::errors::*;
use crate::http;
use crate::merge;
use crate::weather::{Alert, AlertSource, Severity, WarningIcon};

const ALERT_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Synthesis horizon, independent of the display forecast length.
const ALERT_DAYS: u32 = 4;

pub(super) struct Service {
    latitude: f64,
    longitude: f64,
}

impl Service {
    pub(super) fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    fn url(&self) -> String {
        format!(
            "{ALERT_URL}?latitude={}&longitude={}\
             &current=weather_code,wind_speed_10m,wind_gusts_10m\
             &daily=weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,wind_speed_10m_max,wind_gusts_10m_max\
             &timezone=auto&forecast_days={ALERT_DAYS}",
            self.latitude, self.longitude
        )
    }
}

#[async_trait]
impl AlertProvider for Service {
    fn name(&self) -> &'static str {
        "open-meteo analysis"
    }

    async fn fetch(&self) -> Result<Vec<Alert>> {
        let body = http::fetch(&self.url(), &[]).await?;
        let payload: ApiResponse = serde_json::from_value(body.json()?)
            .map_err(|e| Error::malformed(format!("open-meteo alert payload: {e}")))?;
        Ok(merge::deduplicate(merge::rank(synthesize(&payload))))
    }
}

#[derive(Deserialize, Debug)]
struct ApiResponse {
    daily: Option<ApiDaily>,
}

#[derive(Deserialize, Debug, Default)]
struct ApiDaily {
    #[serde(default)]
    time: Vec<NaiveDate>,
    weather_code: Option<Vec<i32>>,
    wind_speed_10m_max: Option<Vec<f64>>,
    wind_gusts_10m_max: Option<Vec<f64>>,
}

fn at(values: &Option<Vec<f64>>, index: usize) -> f64 {
    values
        .as_ref()
        .and_then(|v| v.get(index))
        .copied()
        .unwrap_or_default()
}

/// Compare each day against fixed thresholds and emit at most one alert per
/// category per day. Wind speeds here are km/h, the unit Open-Meteo reports.
fn synthesize(payload: &ApiResponse) -> Vec<Alert> {
    let Some(daily) = &payload.daily else {
        return Vec::new();
    };
    let codes = daily.weather_code.clone().unwrap_or_default();
    let mut alerts = Vec::new();

    for (i, date) in daily.time.iter().enumerate() {
        let code = codes.get(i).copied().unwrap_or_default();
        let wind = at(&daily.wind_speed_10m_max, i);
        let gusts = at(&daily.wind_gusts_10m_max, i);
        let (start, end) = day_window(*date);
        let mut push = |event: &str, severity: Severity, description: String| {
            alerts.push(Alert {
                event: event.to_string(),
                headline: None,
                description,
                severity,
                icon: WarningIcon::classify(event),
                start,
                end,
                source: AlertSource::Analysis,
            });
        };

        // Thunderstorms (codes 95-99)
        if code >= 95 {
            let description = if code >= 96 {
                "Thunderstorms expected with possible lightning and heavy rain. \
                 Hail is also possible."
            } else {
                "Thunderstorms expected with possible lightning and heavy rain."
            };
            let severity = if code >= 96 {
                Severity::Amber
            } else {
                Severity::Yellow
            };
            push("Thunderstorm Warning", severity, description.to_string());
        }

        // Heavy snow (75, 86)
        if code == 75 || code == 86 {
            push(
                "Snow Warning",
                Severity::Amber,
                "Heavy snow expected. Travel disruption likely. Take care on roads and paths."
                    .to_string(),
            );
        }

        // Heavy rain (65, 82)
        if code == 65 || code == 82 {
            push(
                "Heavy Rain Warning",
                Severity::Yellow,
                "Heavy rainfall expected. Surface water flooding possible in places.".to_string(),
            );
        }

        // High winds (>70 km/h sustained or >90 km/h gusts)
        if wind > 70.0 || gusts > 90.0 {
            let severity = if wind > 90.0 || gusts > 120.0 {
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
                    wind.round(),
                    gusts.round()
                ),
            );
        }

        // Dense fog (48)
        if code == 48 {
            push(
                "Fog Warning",
                Severity::Yellow,
                "Dense fog expected with reduced visibility. Allow extra time for travel."
                    .to_string(),
            );
        }
    }

    alerts
}

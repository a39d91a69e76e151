//! Fetches and normalizes the Open-Meteo current + daily forecast.
//!
//! Open-Meteo delivers the daily outlook as parallel arrays indexed by day
//! offset. Normalization turns them into one [`ForecastDay`] per index;
//! `has_warning` starts false everywhere and is filled in later by the merge
//! engine.

use chrono::NaiveDate;
use serde::Deserialize;

use crate::config::{Config, UnitSystem};
use crate::errors::*;
use crate::http;
use crate::weather::{CurrentConditions, ForecastDay, condition_for_code};

const FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Deserialize, Debug)]
struct ApiResponse {
    current: Option<ApiCurrent>,
    daily: Option<ApiDaily>,
}

#[derive(Deserialize, Debug)]
struct ApiCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    apparent_temperature: f64,
    weather_code: i32,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    is_day: u8,
}

#[derive(Deserialize, Debug, Default)]
struct ApiDaily {
    time: Option<Vec<NaiveDate>>,
    weather_code: Option<Vec<i32>>,
    temperature_2m_max: Option<Vec<f64>>,
    temperature_2m_min: Option<Vec<f64>>,
    precipitation_probability_max: Option<Vec<Option<f64>>>,
    sunrise: Option<Vec<String>>,
    sunset: Option<Vec<String>>,
}

fn forecast_url(config: &Config) -> String {
    let units = match config.units {
        UnitSystem::Metric => "",
        UnitSystem::Imperial => "&temperature_unit=fahrenheit&wind_speed_unit=mph",
    };
    format!(
        "{FORECAST_URL}?latitude={}&longitude={}\
         &current=temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m,is_day\
         &daily=weather_code,temperature_2m_max,temperature_2m_min,precipitation_probability_max,precipitation_sum,wind_speed_10m_max,wind_gusts_10m_max,sunrise,sunset\
         &timezone=auto&forecast_days={}{units}",
        config.latitude, config.longitude, config.forecast_days
    )
}

/// Fetch the current conditions snapshot and the normalized daily forecast.
/// This is the primary branch of a cycle: a failure here fails the cycle.
pub async fn fetch(config: &Config) -> Result<(Option<CurrentConditions>, Vec<ForecastDay>)> {
    let body = http::fetch(&forecast_url(config), &[]).await?;
    let payload: ApiResponse = serde_json::from_value(body.json()?)
        .map_err(|e| Error::malformed(format!("forecast payload: {e}")))?;
    let current = parse_current(&payload);
    let forecast = normalize(payload.daily)?;
    Ok((current, forecast))
}

fn parse_current(payload: &ApiResponse) -> Option<CurrentConditions> {
    let current = payload.current.as_ref()?;
    let daily = payload.daily.as_ref();
    Some(CurrentConditions {
        temperature: current.temperature_2m,
        feels_like: current.apparent_temperature,
        humidity: current.relative_humidity_2m,
        weather_code: current.weather_code,
        condition: condition_for_code(current.weather_code).to_string(),
        wind_speed: current.wind_speed_10m,
        wind_direction: current.wind_direction_10m,
        is_day: current.is_day == 1,
        sunrise: daily
            .and_then(|d| d.sunrise.as_ref())
            .and_then(|s| s.first().cloned()),
        sunset: daily
            .and_then(|d| d.sunset.as_ref())
            .and_then(|s| s.first().cloned()),
    })
}

/// One `ForecastDay` per index of the daily arrays. A missing date array is a
/// malformed payload; a missing precipitation array means 0 everywhere.
fn normalize(daily: Option<ApiDaily>) -> Result<Vec<ForecastDay>> {
    let daily = daily.or_malformed("daily forecast block missing")?;
    let dates = daily.time.or_malformed("daily time axis missing")?;
    let codes = daily.weather_code.unwrap_or_default();
    let max = daily.temperature_2m_max.unwrap_or_default();
    let min = daily.temperature_2m_min.unwrap_or_default();
    let precipitation = daily.precipitation_probability_max.unwrap_or_default();

    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, date)| {
            let code = codes.get(i).copied().unwrap_or(-1);
            ForecastDay {
                date,
                weather_code: code,
                condition: condition_for_code(code).to_string(),
                temp_max: max.get(i).copied().unwrap_or_default(),
                temp_min: min.get(i).copied().unwrap_or_default(),
                precipitation: precipitation
                    .get(i)
                    .copied()
                    .flatten()
                    .unwrap_or_default()
                    .clamp(0.0, 100.0) as u8,
                has_warning: false,
            }
        })
        .collect())
}

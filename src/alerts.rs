//! Severe-weather alert sources and the fallback chain across them.
//!
//! Three sources can produce alerts, in strict preference order:
//!
//! 1. the Met Office regional warnings feed (UK coordinates only),
//! 2. the Met Office DataHub point payload (UK coordinates with an API key),
//! 3. threshold analysis of the generic Open-Meteo forecast.
//!
//! The chain is sequential, never speculative: providers are rate-limited and
//! a satisfied earlier step must short-circuit the later ones. An `Ok` with
//! zero alerts is a valid "no warnings" answer and stops the chain; only an
//! `Err` moves on to the next source. Exhausting every source yields an empty
//! list, not an error.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use log::{info, warn};

use crate::config::Config;
use crate::errors::*;
use crate::regions;
use crate::weather::Alert;

pub mod met_office;
pub mod open_meteo;
pub mod region_feed;

#[async_trait]
trait AlertProvider {
    fn name(&self) -> &'static str;
    async fn fetch(&self) -> Result<Vec<Alert>>;
}

/// Fetch alerts for the configured location, falling through the source
/// chain. Failures are absorbed here and logged; this branch of a cycle
/// never fails the cycle.
pub async fn fetch(config: &Config) -> Vec<Alert> {
    first_usable(&chain(config)).await
}

fn chain(config: &Config) -> Vec<Box<dyn AlertProvider + Send + Sync>> {
    let mut sources: Vec<Box<dyn AlertProvider + Send + Sync>> = Vec::new();
    if regions::is_uk(config.latitude, config.longitude) {
        sources.push(Box::new(region_feed::Service::new(
            config.latitude,
            config.longitude,
        )));
        if let Some(key) = &config.met_office_api_key {
            sources.push(Box::new(met_office::Service::new(
                config.latitude,
                config.longitude,
                key.clone(),
            )));
        }
    }
    sources.push(Box::new(open_meteo::Service::new(
        config.latitude,
        config.longitude,
    )));
    sources
}

async fn first_usable(sources: &[Box<dyn AlertProvider + Send + Sync>]) -> Vec<Alert> {
    for source in sources {
        match source.fetch().await {
            Ok(alerts) => {
                info!("{} answered with {} alert(s)", source.name(), alerts.len());
                return alerts;
            }
            Err(err) => {
                info!("{} failed ({err}), trying next source", source.name());
            }
        }
    }
    warn!("every alert source failed; reporting none");
    Vec::new()
}

/// Validity window for a synthesized alert: the full calendar day.
pub(crate) fn day_window(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = date.and_hms_opt(0, 0, 0).expect("midnight is always valid");
    let end = date.and_hms_opt(23, 59, 59).expect("23:59:59 is always valid");
    (start.and_utc(), end.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::weather::{AlertSource, Severity, WarningIcon};
    use chrono::TimeZone;

    struct Fixed(&'static str, Result<Vec<Alert>>);

    #[async_trait]
    impl AlertProvider for Fixed {
        fn name(&self) -> &'static str {
            self.0
        }
        async fn fetch(&self) -> Result<Vec<Alert>> {
            self.1.clone()
        }
    }

    fn some_alert() -> Alert {
        Alert {
            event: "Wind Warning".to_string(),
            headline: None,
            description: String::new(),
            severity: Severity::Yellow,
            icon: WarningIcon::Wind,
            start: Utc.with_ymd_and_hms(2026, 1, 2, 0, 0, 0).unwrap(),
            end: Utc.with_ymd_and_hms(2026, 1, 2, 23, 59, 59).unwrap(),
            source: AlertSource::Analysis,
        }
    }

    #[tokio::test]
    async fn first_success_short_circuits() {
        let sources: Vec<Box<dyn AlertProvider + Send + Sync>> = vec![
            Box::new(Fixed("a", Ok(vec![some_alert()]))),
            Box::new(Fixed("b", Ok(vec![some_alert(), some_alert()]))),
        ];
        assert_eq!(first_usable(&sources).await.len(), 1);
    }

    #[tokio::test]
    async fn empty_success_is_a_valid_answer() {
        let sources: Vec<Box<dyn AlertProvider + Send + Sync>> = vec![
            Box::new(Fixed("feed", Ok(Vec::new()))),
            Box::new(Fixed("analysis", Ok(vec![some_alert()]))),
        ];
        assert!(first_usable(&sources).await.is_empty());
    }

    #[tokio::test]
    async fn failure_falls_through() {
        let sources: Vec<Box<dyn AlertProvider + Send + Sync>> = vec![
            Box::new(Fixed("feed", Err(Error::Timeout))),
            Box::new(Fixed("datahub", Err(Error::parse("nope")))),
            Box::new(Fixed("analysis", Ok(vec![some_alert()]))),
        ];
        assert_eq!(first_usable(&sources).await.len(), 1);
    }

    #[tokio::test]
    async fn total_exhaustion_yields_empty() {
        let sources: Vec<Box<dyn AlertProvider + Send + Sync>> =
            vec![Box::new(Fixed("feed", Err(Error::Timeout)))];
        assert!(first_usable(&sources).await.is_empty());
    }

    #[test]
    fn chain_composition_follows_location_and_credentials() {
        let mut config = Config::default();
        // London, no key: feed + analysis
        assert_eq!(
            chain(&config).iter().map(|s| s.name()).collect::<Vec<_>>(),
            ["met office warnings feed", "open-meteo analysis"]
        );
        config.met_office_api_key = Some("sesame".to_string());
        assert_eq!(
            chain(&config).iter().map(|s| s.name()).collect::<Vec<_>>(),
            [
                "met office warnings feed",
                "met office datahub",
                "open-meteo analysis"
            ]
        );
        // Somewhere far from the UK: analysis only
        config.latitude = 40.7128;
        config.longitude = -74.0060;
        assert_eq!(
            chain(&config).iter().map(|s| s.name()).collect::<Vec<_>>(),
            ["open-meteo analysis"]
        );
    }

    #[test]
    fn day_window_spans_the_whole_day() {
        let (start, end) = day_window(NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
        assert_eq!(start.to_rfc3339(), "2026-01-02T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2026-01-02T23:59:59+00:00");
    }
}

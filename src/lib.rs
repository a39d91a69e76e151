#![warn(clippy::match_same_arms)]
#![warn(clippy::semicolon_if_nothing_returned)]
#![warn(clippy::unnecessary_wraps)]
#![allow(clippy::single_match)]

pub mod alerts;
pub mod config;
pub mod errors;
pub mod forecast;
pub mod http;
pub mod merge;
pub mod protocol;
pub mod regions;
pub mod weather;

pub use env_logger;
pub use serde_json;
pub use tokio;

use std::sync::LazyLock;
use std::time::Duration;

use log::{error, info};
use tokio::time::sleep;

use crate::config::Config;
use crate::errors::*;
use crate::weather::WeatherReport;

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// Per-request bound; a slow provider fails only its own call, never the
/// whole cycle.
pub const REQWEST_TIMEOUT: Duration = Duration::from_secs(10);

pub(crate) static REQWEST_CLIENT: LazyLock<reqwest::Client> = LazyLock::new(|| {
    reqwest::Client::builder()
        .user_agent(APP_USER_AGENT)
        .timeout(REQWEST_TIMEOUT)
        .build()
        .unwrap()
});

/// The weatherwarn program aggregates forecasts and severe-weather warnings
/// from multiple providers into a single normalized report, printed to
/// standard output as one JSON document per fetch cycle for a display
/// front-end to consume.
#[derive(Debug, clap::Parser)]
#[clap(author, about, long_about, version = env!("VERSION"))]
pub struct CliArgs {
    /// Sets a TOML config file
    ///
    /// 1. If a full path is given, it is used as is: `/home/foo/weatherwarn.toml`
    ///
    /// 2. If a bare filename is given, e.g. "config.toml", it is looked up in
    ///    `$XDG_CONFIG_HOME/weatherwarn`
    #[clap(default_value = "config.toml")]
    pub config: String,
    /// Run a single fetch cycle, print the report and exit
    #[clap(long = "one-shot")]
    pub one_shot: bool,
}

/// Run one fetch cycle.
///
/// The forecast branch and the alert branch run concurrently and the cycle
/// completes when both resolve. A forecast failure fails the whole cycle; the
/// alert branch absorbs its failures internally (worst case: no alerts). The
/// merged alert set is ranked, deduplicated and correlated onto the forecast
/// days before the report is assembled.
pub async fn fetch_weather_report(config: &Config) -> Result<WeatherReport> {
    let (forecast, alerts) = tokio::join!(forecast::fetch(config), alerts::fetch(config));
    let (current, forecast) = forecast?;
    let alerts = merge::deduplicate(merge::rank(alerts));
    let forecast = merge::correlate(&alerts, forecast);
    Ok(WeatherReport {
        current,
        alerts,
        forecast,
    })
}

/// Fetch-print loop. Cycles run on a fixed interval; a failed cycle reports
/// an error payload and the next cycle is the only retry there is.
pub async fn run(config: Config, one_shot: bool) -> Result<()> {
    info!(
        "watching {} at {:.4},{:.4}",
        config.location, config.latitude, config.longitude
    );
    let interval = Duration::from_secs(config.interval);
    loop {
        match fetch_weather_report(&config).await {
            Ok(report) => protocol::print_report(&report),
            Err(err) => {
                error!("fetch cycle failed: {err}");
                protocol::print_error(&err.to_string());
                if one_shot {
                    return Err(err);
                }
            }
        }
        if one_shot {
            return Ok(());
        }
        sleep(interval).await;
    }
}

//! Output protocol: newline-delimited JSON on stdout.
//!
//! The display front-end owns rendering entirely; it reads one document per
//! fetch cycle. A successful cycle emits the full report, a failed one emits
//! `{"message": "..."}` so the front-end can show the failure instead of
//! stale data.

use crate::weather::WeatherReport;

pub fn print_report(report: &WeatherReport) {
    match serde_json::to_string(report) {
        Ok(json) => println!("{json}"),
        Err(err) => log::error!("failed to serialize report: {err}"),
    }
}

pub fn print_error(message: &str) {
    println!("{}", serde_json::json!({ "message": message }));
}

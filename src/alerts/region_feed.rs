//! Met Office regional warnings feed.
//!
//! The feed is RSS with all the interesting detail buried in free text: the
//! title carries the severity and the event ("Yellow warning of snow, ice
//! affecting South West England"), the description carries the validity
//! window ("valid from 0000 Fri 02 Jan to 1200 Fri 02 Jan") with no year
//! anywhere. Everything below is heuristic extraction where a failed match is
//! a normal control path; a single unparsable item is logged and skipped, and
//! only a document that cannot be read at all is an error.

use std::sync::LazyLock;

use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use log::debug;
use regex::Regex;
use serde::Deserialize;

use super::{AlertProvider, day_window};
use crate::errors::*;
use crate::http;
use crate::merge;
use crate::regions;
use crate::weather::{Alert, AlertSource, Severity, WarningIcon};

const FEED_URL: &str = "https://www.metoffice.gov.uk/public/data/PWSCache/WarningsRSS/Region";

pub(super) struct Service {
    code: &'static str,
}

impl Service {
    pub(super) fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            code: regions::region_code(latitude, longitude),
        }
    }
}

#[async_trait]
impl AlertProvider for Service {
    fn name(&self) -> &'static str {
        "met office warnings feed"
    }

    async fn fetch(&self) -> Result<Vec<Alert>> {
        let url = format!("{FEED_URL}/{}", self.code);
        let body = http::fetch(&url, &[]).await?;
        let alerts = parse_feed(&body.text(), Utc::now().date_naive())?;
        Ok(merge::deduplicate(merge::rank(alerts)))
    }
}

#[derive(Deserialize, Debug)]
struct Rss {
    channel: Channel,
}

#[derive(Deserialize, Debug, Default)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Item {
    title: String,
    description: String,
}

/// Parse the whole feed relative to `today` (which anchors year inference).
/// Zero items is a valid "no warnings" result, not a failure.
pub(crate) fn parse_feed(text: &str, today: NaiveDate) -> Result<Vec<Alert>> {
    let rss: Rss = quick_xml::de::from_str(text)
        .map_err(|e| Error::parse(format!("warnings feed: {e}")))?;
    Ok(rss
        .channel
        .items
        .iter()
        .filter_map(|item| parse_item(item, today))
        .collect())
}

fn parse_item(item: &Item, today: NaiveDate) -> Option<Alert> {
    let severity = title_severity(&item.title);
    let event = title_event(&item.title);
    let window = parse_window(&item.description, today);

    if event.is_none() && window.is_none() {
        debug!("dropping feed item with no event and no dates: {:?}", item.title);
        return None;
    }
    let Some((start, end)) = window else {
        debug!("dropping feed item with no resolvable dates: {:?}", item.title);
        return None;
    };

    let event = event.unwrap_or_else(|| "Weather Warning".to_string());
    Some(Alert {
        icon: WarningIcon::classify(&event),
        event,
        headline: Some(item.title.clone()),
        description: item.description.clone(),
        severity,
        start,
        end,
        source: AlertSource::RegionFeed,
    })
}

/// Feed titles spell the tier out literally; match the phrases rather than
/// the bare color words so "Redruth" cannot escalate anything.
fn title_severity(title: &str) -> Severity {
    let title = title.to_lowercase();
    if title.contains("red warning") || title.contains("extreme") {
        Severity::Red
    } else if title.contains("amber warning") || title.contains("severe") {
        Severity::Amber
    } else {
        Severity::Yellow
    }
}

static EVENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)warning of (.+?) affecting").unwrap());

const NOISE_WORDS: &[&str] = &[
    "yellow",
    "amber",
    "red",
    "orange",
    "severe",
    "extreme",
    "moderate",
    "warning",
    "warnings",
    "of",
    "for",
    "and",
    "affecting",
    "update",
    "issued",
];

/// Extract the event phrase from a feed title.
///
/// The usual shape is "<severity> warning of <events> affecting <region>".
/// When that pattern is absent, stripping severity and connector words from
/// the title often leaves a usable residue; `None` means not even that
/// produced something meaningful.
fn title_event(title: &str) -> Option<String> {
    if let Some(caps) = EVENT_RE.captures(title) {
        return Some(format!("{} Warning", title_case(caps[1].trim())));
    }
    let residue: Vec<&str> = title
        .split_whitespace()
        .filter(|word| {
            let word = word.trim_matches(|c: char| !c.is_alphanumeric());
            !NOISE_WORDS.contains(&word.to_lowercase().as_str())
        })
        .collect();
    let residue = residue.join(" ");
    if residue.len() < 3 {
        return None;
    }
    Some(format!("{} Warning", title_case(&residue)))
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

static VALID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)valid from (\d{4}) [A-Za-z]{3} (\d{1,2}) ([A-Za-z]{3}) to (\d{4}) [A-Za-z]{3} (\d{1,2}) ([A-Za-z]{3})",
    )
    .unwrap()
});

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{4}-\d{2}-\d{2}\b").unwrap());

/// Validity window from an item description.
///
/// Primary: the "valid from HHMM Dow DD Mon to HHMM Dow DD Mon" phrase.
/// Fallback: bare ISO dates anywhere in the text; two dates make a window,
/// a single date covers that whole day.
fn parse_window(description: &str, today: NaiveDate) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    if let Some(caps) = VALID_RE.captures(description) {
        let start = feed_datetime(&caps[1], &caps[2], &caps[3], today)?;
        let end = feed_datetime(&caps[4], &caps[5], &caps[6], today)?;
        return Some((start, end));
    }

    let dates: Vec<NaiveDate> = ISO_DATE_RE
        .find_iter(description)
        .filter_map(|m| m.as_str().parse().ok())
        .collect();
    match dates.as_slice() {
        [] => None,
        [only] => Some(day_window(*only)),
        [first, .., last] => {
            let (start, _) = day_window(*first);
            let (_, end) = day_window(*last);
            Some((start, end))
        }
    }
}

fn feed_datetime(
    hhmm: &str,
    day: &str,
    month: &str,
    today: NaiveDate,
) -> Option<DateTime<Utc>> {
    let hhmm: u32 = hhmm.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    let month = month_number(month)?;
    let date = resolve_date(day, month, today)?;
    date.and_hms_opt(hhmm / 100, hhmm % 100, 0)
        .map(|naive| naive.and_utc())
}

/// The feed never states a year. Warnings are near-term, so a month/day that
/// already passed this year belongs to next year, never to the past.
fn resolve_date(day: u32, month: u32, today: NaiveDate) -> Option<NaiveDate> {
    match NaiveDate::from_ymd_opt(today.year(), month, day) {
        Some(date) if date >= today => Some(date),
        _ => NaiveDate::from_ymd_opt(today.year() + 1, month, day),
    }
}

fn month_number(abbreviation: &str) -> Option<u32> {
    let month = match abbreviation.to_lowercase().as_str() {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

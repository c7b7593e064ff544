//! # Fear & Greed Page Extractor
//!
//! Pulls the needle image, the five readings and the "Last updated" marker out
//! of the page markup. Everything page-specific (selectors and patterns) lives
//! here behind the [`Extractor`] trait, so a layout change means a new
//! extractor and nothing else.
//!
//! The page never prints a year. [`resolve_last_update`] places the marker in
//! the year of "now" and steps back one year when that lands in the future,
//! which is what happens on New Year's Day for a Dec 31 close.

use std::sync::LazyLock;

use chrono::{DateTime, Datelike, Days, Month, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::core::error::NgError;
use crate::markets::cnn::model::{PartialResult, ValueText, READING_FIELDS};

static IMAGE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"http://markets\.money\.cnn\.com/Marketsdata/uploadhandler/[0-9A-Za-z_]+\.png")
        .expect("image url regex")
});

// Lazy prefix, so the number is the last one directly before the label.
// `.` stops at line ends, so the label never spans lines.
static VALUE_TEXT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*?([0-9]+)\s\((.+)\)").expect("value text regex"));

static LAST_UPDATED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^Last updated ([A-Za-z]{3,9})\s+([0-9]{1,2}) at ([0-9]{1,2}):([0-9]{2})\s*([AaPp][Mm])$")
        .expect("last updated regex")
});

static CONTAINER_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#fearGreedContainer .modContent").expect("container selector"));

static ITEM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul li").expect("item selector"));

static DATE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#needleAsOfDate").expect("date selector"));

/// Turns page markup into a [`PartialResult`]. Validation is not the
/// extractor's job.
pub trait Extractor: Send + Sync {
    /// `zone` is the zone the page's clock readings are in; `now` anchors the
    /// year-less "Last updated" marker.
    fn extract(&self, html: &str, zone: Tz, now: DateTime<Utc>) -> Result<PartialResult, NgError>;
}

/// Extractor for the money.cnn.com layout.
#[derive(Debug, Clone)]
pub struct CnnPageExtractor {
    container: Selector,
    items: Selector,
    date: Selector,
}

impl Default for CnnPageExtractor {
    fn default() -> Self {
        Self {
            container: CONTAINER_SELECTOR.clone(),
            items: ITEM_SELECTOR.clone(),
            date: DATE_SELECTOR.clone(),
        }
    }
}

impl Extractor for CnnPageExtractor {
    fn extract(&self, html: &str, zone: Tz, now: DateTime<Utc>) -> Result<PartialResult, NgError> {
        let document = Html::parse_document(html);
        let mut partial = PartialResult::default();

        // No container: leave everything unset and let validation report it.
        // Several containers: the last one wins.
        let Some(container) = document.select(&self.container).last() else {
            return Ok(partial);
        };

        partial.image_url = parse_image_url(&container.inner_html())
            .unwrap_or_default()
            .to_string();

        let items: Vec<ElementRef> = container.select(&self.items).collect();
        if !items.is_empty() && items.len() != READING_FIELDS.len() {
            return Err(NgError::ItemCountError {
                expected: READING_FIELDS.len(),
                found: items.len(),
            });
        }
        for (position, item) in items.iter().enumerate() {
            let text: String = item.text().collect();
            partial.readings[position] = parse_value_text(&text).ok_or_else(|| NgError::TextParseError {
                position,
                text: text.trim().to_string(),
            })?;
        }

        if let Some(marker) = container.select(&self.date).last() {
            let text: String = marker.text().collect();
            partial.last_update_date = parse_last_updated(&text)
                .and_then(|parsed| resolve_last_update(&parsed, zone, &now))
                .map(|resolved| resolved.fixed_offset());
        }

        Ok(partial)
    }
}

/// First needle image URL found in `html`.
pub fn parse_image_url(html: &str) -> Option<&str> {
    IMAGE_URL_RE.find(html).map(|m| m.as_str())
}

/// Parses `"<anything> <N> (<label>)"` into `(N, label)`.
///
/// Returns `None` when the text has no such shape or `N` does not fit a `u32`.
pub fn parse_value_text(text: &str) -> Option<ValueText> {
    let caps = VALUE_TEXT_RE.captures(text)?;
    let value = caps.get(1)?.as_str().parse::<u32>().ok()?;
    Some(ValueText::new(value, caps.get(2)?.as_str()))
}

/// Year-less wall clock reading from the "Last updated" marker, 24-hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastUpdated {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
}

/// Parses `"Last updated Mar 29 at 4:59pm"`. Surrounding whitespace is ignored.
pub fn parse_last_updated(text: &str) -> Option<LastUpdated> {
    let caps = LAST_UPDATED_RE.captures(text.trim())?;

    let month = caps[1].parse::<Month>().ok()?.number_from_month();
    let day = caps[2].parse::<u32>().ok()?;
    let hour12 = caps[3].parse::<u32>().ok()?;
    let minute = caps[4].parse::<u32>().ok()?;
    let pm = caps[5].eq_ignore_ascii_case("pm");

    if !(1..=31).contains(&day) || !(1..=12).contains(&hour12) || minute > 59 {
        return None;
    }

    // 12am is midnight, 12pm is noon
    let hour = hour12 % 12 + if pm { 12 } else { 0 };
    Some(LastUpdated { month, day, hour, minute })
}

/// Anchors `parsed` to an absolute instant in `zone`.
///
/// The candidate uses the year `now` has in `zone`, with seconds zeroed. If
/// `now` is strictly before the candidate the marker must belong to last year,
/// so one year is subtracted. Equality keeps the current year.
///
/// Days past the end of a month carry into the next one, so Feb 29 one year
/// back becomes Mar 1. Wall clock times skipped by a DST change give `None`;
/// ambiguous times take the earlier instant.
pub fn resolve_last_update<Z: TimeZone>(parsed: &LastUpdated, zone: Tz, now: &DateTime<Z>) -> Option<DateTime<Tz>> {
    let now = now.with_timezone(&zone);

    let date = carry_date(now.year(), parsed.month, parsed.day)?;
    let candidate = localize(zone, &date.and_hms_opt(parsed.hour, parsed.minute, 0)?)?;

    if now < candidate {
        let previous = carry_date(date.year() - 1, date.month(), date.day())?;
        return localize(zone, &previous.and_hms_opt(parsed.hour, parsed.minute, 0)?);
    }

    Some(candidate)
}

/// Builds a date, letting a day beyond the month's length run into the next month.
fn carry_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?.checked_add_days(Days::new(u64::from(day.checked_sub(1)?)))
}

fn localize(zone: Tz, naive: &NaiveDateTime) -> Option<DateTime<Tz>> {
    zone.from_local_datetime(naive).earliest()
}

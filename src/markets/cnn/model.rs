//! # Fear & Greed Data Model
//!
//! Value objects produced by the page extractor. They carry no behavior beyond
//! validation and are serialized with camelCase keys.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::core::error::NgError;

/// One sentiment reading: a number on the 0-100 scale and its label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueText {
    /// Index value, e.g. `44`.
    pub value: u32,
    /// Qualitative label, e.g. `"Extreme Fear"`.
    pub text: String,
}

impl ValueText {
    pub fn new(value: u32, text: impl Into<String>) -> Self {
        Self { value, text: text.into() }
    }

    /// A zero value counts as empty, so a genuine reading of 0 is rejected too.
    pub fn is_empty(&self) -> bool {
        self.value == 0 || self.text.is_empty()
    }
}

/// Everything scraped from the Fear & Greed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FearAndGreedResult {
    /// Needle chart image.
    pub image_url: String,
    pub now: ValueText,
    pub previous_close: ValueText,
    pub one_week_ago: ValueText,
    pub one_month_ago: ValueText,
    pub one_year_ago: ValueText,
    /// "Last updated" marker resolved to an instant, carrying the page zone's offset.
    pub last_update_date: DateTime<FixedOffset>,
}

impl FearAndGreedResult {
    /// The readings in page order.
    pub fn readings(&self) -> [(&'static str, &ValueText); 5] {
        [
            (READING_FIELDS[0], &self.now),
            (READING_FIELDS[1], &self.previous_close),
            (READING_FIELDS[2], &self.one_week_ago),
            (READING_FIELDS[3], &self.one_month_ago),
            (READING_FIELDS[4], &self.one_year_ago),
        ]
    }
}

/// Result under construction. Fields start unset and are filled as the
/// extractor finds them; [`validate`](Self::validate) turns it into a
/// [`FearAndGreedResult`] or an [`NgError::EmptyFieldError`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialResult {
    pub image_url: String,
    /// Indexed by page position: now, previous close, 1 week, 1 month, 1 year.
    pub readings: [ValueText; 5],
    pub last_update_date: Option<DateTime<FixedOffset>>,
}

/// Field names by list position.
pub const READING_FIELDS: [&str; 5] = ["now", "previousClose", "oneWeekAgo", "oneMonthAgo", "oneYearAgo"];

impl PartialResult {
    /// Names of every field that is empty, zero or unset.
    pub fn empty_fields(&self) -> Vec<String> {
        let mut fields = Vec::new();
        if self.image_url.is_empty() {
            fields.push("imageUrl".to_string());
        }
        for (name, reading) in READING_FIELDS.iter().zip(self.readings.iter()) {
            if reading.is_empty() {
                fields.push((*name).to_string());
            }
        }
        if self.last_update_date.is_none() {
            fields.push("lastUpdateDate".to_string());
        }
        fields
    }

    /// Accepts the result only if no field is empty.
    pub fn validate(self) -> Result<FearAndGreedResult, NgError> {
        let fields = self.empty_fields();
        let Some(last_update_date) = self.last_update_date.filter(|_| fields.is_empty()) else {
            return Err(NgError::EmptyFieldError { fields });
        };

        let [now, previous_close, one_week_ago, one_month_ago, one_year_ago] = self.readings;
        Ok(FearAndGreedResult {
            image_url: self.image_url,
            now,
            previous_close,
            one_week_ago,
            one_month_ago,
            one_year_ago,
            last_update_date,
        })
    }
}

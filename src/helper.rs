use chrono::{NaiveDate, NaiveDateTime};
use log::debug;

use crate::{Result, TodoError};

/// Completion timestamp in `ja-JP` locale order, e.g. `2024/1/2 1:05:00`.
pub const DONE_TIME_FORMAT: &str = "%Y/%-m/%-d %-H:%M:%S";

/// Calendar day stored in the reset marker.
pub const RESET_DATE_FORMAT: &str = "%Y-%m-%d";

/// Trims user input and rejects it if nothing is left.
pub fn normalize_text(text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("Rejected empty item text");
        return Err(TodoError::Validation {
            message: "Please enter some text".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub fn format_done_time(at: NaiveDateTime) -> String {
    at.format(DONE_TIME_FORMAT).to_string()
}

pub fn format_reset_date(date: NaiveDate) -> String {
    date.format(RESET_DATE_FORMAT).to_string()
}

/// Hands out millisecond-timestamp ids.
///
/// Two items created within the same millisecond would share a timestamp, so
/// the generator moves to `last + 1` instead. Ids stay unique and still sort
/// in creation order.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    last: i64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts above every id already in use.
    pub fn seeded(existing: impl IntoIterator<Item = i64>) -> Self {
        Self {
            last: existing.into_iter().max().unwrap_or(0),
        }
    }

    /// Fails once the stored ids have reached `i64::MAX`.
    pub fn next_id(&mut self, now_millis: i64) -> Result<i64> {
        let id = if now_millis > self.last {
            now_millis
        } else {
            self.last
                .checked_add(1)
                .ok_or(TodoError::IdSpaceExhausted { last: self.last })?
        };
        self.last = id;
        Ok(id)
    }
}

use crate::errors::OjaiResult;
use chrono::{DateTime, NaiveDate, Utc};

/// Parses an ISO-8601 calendar date such as `2014-03-23`.
pub fn parse_date(text: &str) -> OjaiResult<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| {
        log::error!("Invalid date '{}': {}", text, e);
        e.into()
    })
}

/// Parses an RFC 3339 timestamp such as `2014-03-23T08:30:00Z` into UTC.
pub fn parse_timestamp(text: &str) -> OjaiResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            log::error!("Invalid timestamp '{}': {}", text, e);
            e.into()
        })
}

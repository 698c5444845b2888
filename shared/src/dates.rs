//! Operational-day boundaries
//!
//! Report and ledger filters take plain `YYYY-MM-DD` dates. A date always means
//! a whole day in the operational timezone, independent of where the server
//! runs: the start is local midnight and the end is the last microsecond of
//! that day, both converted to UTC instants.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Format accepted for filter dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timezone used when none is configured
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::America::Bogota;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidFormat(String),

    #[error("End date must be after the start date")]
    EndBeforeStart,
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate, DateError> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT)
        .map_err(|_| DateError::InvalidFormat(value.to_string()))
}

/// Local midnight of `date` in `tz`, as a UTC instant
pub fn start_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    local_instant(date.and_time(chrono::NaiveTime::MIN), tz)
}

/// Last representable instant of `date` in `tz` (microsecond precision, which
/// is what Postgres timestamps store)
pub fn end_of_day(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    match date.succ_opt() {
        Some(next) => start_of_day(next, tz) - Duration::microseconds(1),
        None => local_instant(
            date.and_hms_micro_opt(23, 59, 59, 999_999)
                .unwrap_or_else(|| date.and_time(chrono::NaiveTime::MIN)),
            tz,
        ),
    }
}

/// Resolve a local wall-clock time. Ambiguous times take the earliest
/// instant; times skipped by a DST jump fall back to reading them as UTC.
fn local_instant(naive: NaiveDateTime, tz: Tz) -> DateTime<Utc> {
    tz.from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc())
}

/// Closed interval of instants; either side may be open-ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateWindow {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateWindow {
    /// Build a window from optional filter dates. Blank strings count as
    /// absent.
    pub fn from_dates(
        start_date: Option<&str>,
        end_date: Option<&str>,
        tz: Tz,
    ) -> Result<Self, DateError> {
        let start = non_blank(start_date)
            .map(parse_date)
            .transpose()?
            .map(|d| start_of_day(d, tz));
        let end = non_blank(end_date)
            .map(parse_date)
            .transpose()?
            .map(|d| end_of_day(d, tz));

        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Err(DateError::EndBeforeStart);
            }
        }

        Ok(Self { start, end })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::error::ReminderError;
use crate::timezone::ZoneCode;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// An absolute reminder instant. Values with an offset are taken as-is; bare
/// wall-clock values are read in the reminder's zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReminderTarget {
    pub at: DateTime<Utc>,
    pub zone: ZoneCode,
}

impl ReminderTarget {
    pub fn parse(datetime: &str, timezone: &str) -> Result<Self, ReminderError> {
        let zone = ZoneCode::from_code(timezone);
        let at = parse_instant(datetime, zone)?;
        Ok(ReminderTarget { at, zone })
    }

    pub fn countdown(&self, now: DateTime<Utc>) -> Countdown {
        if self.at <= now {
            return Countdown::Reached;
        }
        let secs = (self.at - now).num_seconds();
        Countdown::Remaining(Remaining::from_seconds(secs))
    }

    /// Target as shown next to the badge, in the reminder's own zone.
    pub fn local_display(&self) -> String {
        format!(
            "{} {}",
            self.at.with_timezone(&self.zone.tz()).format("%Y-%m-%d %H:%M"),
            self.zone
        )
    }
}

fn parse_instant(datetime: &str, zone: ZoneCode) -> Result<DateTime<Utc>, ReminderError> {
    let raw = datetime.trim();
    if let Ok(absolute) = DateTime::parse_from_rfc3339(raw) {
        return Ok(absolute.with_timezone(&Utc));
    }

    let naive = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| ReminderError::InvalidReminderTime(raw.to_string()))?;

    zone.resolve_local(naive)
        .ok_or_else(|| ReminderError::InvalidReminderTime(raw.to_string()))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    pub fn from_seconds(total: i64) -> Self {
        let total = total.max(0);
        Remaining {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> i64 {
        self.days * 86_400 + self.hours * 3_600 + self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.days > 0 {
            write!(f, "{}d ", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h ", self.hours)?;
        }
        write!(f, "{}m {}s", self.minutes, self.seconds)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Countdown {
    Invalid,
    Reached,
    Remaining(Remaining),
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Countdown::Invalid => f.write_str("Invalid time"),
            Countdown::Reached => f.write_str("Reminder time reached"),
            Countdown::Remaining(remaining) => remaining.fmt(f),
        }
    }
}

/// Time left until `datetime` (read in `timezone`) as seen at `now`.
pub fn compute_remaining(now: DateTime<Utc>, datetime: &str, timezone: &str) -> Countdown {
    match ReminderTarget::parse(datetime, timezone) {
        Ok(target) => target.countdown(now),
        Err(err) => {
            tracing::debug!(%err, "reminder target unreadable");
            Countdown::Invalid
        }
    }
}

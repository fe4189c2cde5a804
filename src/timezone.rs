use std::fmt;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// The zones a reminder may be entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ZoneCode {
    Est,
    Cst,
    Mst,
    Pst,
    Utc,
}

impl ZoneCode {
    /// Strict lookup; `None` for anything outside the five supported codes.
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "EST" => Some(ZoneCode::Est),
            "CST" => Some(ZoneCode::Cst),
            "MST" => Some(ZoneCode::Mst),
            "PST" => Some(ZoneCode::Pst),
            "UTC" => Some(ZoneCode::Utc),
            _ => None,
        }
    }

    /// Lenient lookup used for stored reminders: unknown codes read as UTC.
    pub fn from_code(code: &str) -> Self {
        Self::parse(code).unwrap_or(ZoneCode::Utc)
    }

    pub fn code(&self) -> &'static str {
        match self {
            ZoneCode::Est => "EST",
            ZoneCode::Cst => "CST",
            ZoneCode::Mst => "MST",
            ZoneCode::Pst => "PST",
            ZoneCode::Utc => "UTC",
        }
    }

    pub fn tz(&self) -> Tz {
        match self {
            ZoneCode::Est => chrono_tz::America::New_York,
            ZoneCode::Cst => chrono_tz::America::Chicago,
            ZoneCode::Mst => chrono_tz::America::Denver,
            ZoneCode::Pst => chrono_tz::America::Los_Angeles,
            ZoneCode::Utc => chrono_tz::UTC,
        }
    }

    /// Reads a naive wall-clock time in this zone. Times skipped by a DST
    /// jump have no instant; repeated times take the earlier one.
    pub fn resolve_local(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.tz()
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl fmt::Display for ZoneCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockFace {
    pub label: String,
    pub time: String,
    pub date: String,
}

impl ClockFace {
    pub fn at(now: DateTime<Utc>, zone: Tz, label: impl Into<String>) -> Self {
        let local = now.with_timezone(&zone);
        ClockFace {
            label: label.into(),
            time: local.format("%I:%M:%S %p").to_string(),
            date: local.format("%a, %b %-d").to_string(),
        }
    }
}

impl fmt::Display for ClockFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<24} {}  {}", self.label, self.time, self.date)
    }
}

/// The dashboard header clocks.
pub fn default_board() -> Vec<(Tz, &'static str)> {
    vec![
        (chrono_tz::America::New_York, "Eastern Time (EST/EDT)"),
        (chrono_tz::America::Chicago, "Central Time (CST/CDT)"),
        (chrono_tz::America::Los_Angeles, "Pacific Time (PST/PDT)"),
    ]
}

pub fn render_board(now: DateTime<Utc>, board: &[(Tz, &str)]) -> Vec<ClockFace> {
    board
        .iter()
        .map(|(zone, label)| ClockFace::at(now, *zone, *label))
        .collect()
}

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeadStatus {
    #[serde(rename = "On Training")]
    OnTraining,
    #[serde(rename = "On Deposit")]
    OnDeposit,
    #[serde(rename = "Blocked")]
    Blocked,
    #[serde(rename = "Opened")]
    Opened,
    #[serde(rename = "Follow Up")]
    FollowUp,
    #[serde(rename = "Not Interested")]
    NotInterested,
    /// Any label outside the dashboard's fixed set.
    #[serde(other)]
    Unknown,
}

impl LeadStatus {
    pub const ALL: [LeadStatus; 6] = [
        LeadStatus::OnTraining,
        LeadStatus::OnDeposit,
        LeadStatus::Blocked,
        LeadStatus::Opened,
        LeadStatus::FollowUp,
        LeadStatus::NotInterested,
    ];

    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "On Training" => LeadStatus::OnTraining,
            "On Deposit" => LeadStatus::OnDeposit,
            "Blocked" => LeadStatus::Blocked,
            "Opened" => LeadStatus::Opened,
            "Follow Up" => LeadStatus::FollowUp,
            "Not Interested" => LeadStatus::NotInterested,
            _ => LeadStatus::Unknown,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LeadStatus::OnTraining => "On Training",
            LeadStatus::OnDeposit => "On Deposit",
            LeadStatus::Blocked => "Blocked",
            LeadStatus::Opened => "Opened",
            LeadStatus::FollowUp => "Follow Up",
            LeadStatus::NotInterested => "Not Interested",
            LeadStatus::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Reminder fields exactly as the store holds them. Parsing is deferred to
/// the scheduler so a malformed value becomes a display state, not a load
/// failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    #[serde(default)]
    pub datetime: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default, alias = "reason")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub client_number: String,
    #[serde(default)]
    pub my_number: String,
    #[serde(default)]
    pub team_member: String,
    #[serde(default = "unknown_status")]
    pub status: LeadStatus,
    #[serde(default)]
    pub remarks: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub reminder: Option<Reminder>,
}

fn unknown_status() -> LeadStatus {
    LeadStatus::Unknown
}

impl Lead {
    /// Creation instant, falling back to the legacy `date` field.
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.date)
    }

    /// The reminder pairing, present only when both datetime and timezone are set.
    pub fn reminder_key(&self) -> Option<ReminderKey> {
        let reminder = self.reminder.as_ref()?;
        let datetime = reminder.datetime.as_deref().map(str::trim)?;
        let timezone = reminder.timezone.as_deref().map(str::trim)?;
        if datetime.is_empty() || timezone.is_empty() {
            return None;
        }
        Some(ReminderKey {
            datetime: datetime.to_string(),
            timezone: timezone.to_string(),
        })
    }

    pub fn reminder_note(&self) -> Option<&str> {
        self.reminder
            .as_ref()
            .and_then(|r| r.note.as_deref())
            .map(str::trim)
            .filter(|note| !note.is_empty())
    }
}

/// The (datetime, timezone) pairing a scheduled reminder is keyed on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    pub datetime: String,
    pub timezone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMemberStats {
    pub name: String,
    pub total: usize,
    pub opened: usize,
    pub on_deposit: usize,
    pub on_training: usize,
    pub blocked: usize,
    pub follow_up: usize,
    pub not_interested: usize,
    #[serde(serialize_with = "serialize_date_labels")]
    pub date_wise_entries: BTreeMap<NaiveDate, usize>,
}

impl TeamMemberStats {
    pub fn new(name: impl Into<String>) -> Self {
        TeamMemberStats {
            name: name.into(),
            total: 0,
            opened: 0,
            on_deposit: 0,
            on_training: 0,
            blocked: 0,
            follow_up: 0,
            not_interested: 0,
            date_wise_entries: BTreeMap::new(),
        }
    }

    pub fn count_for(&self, status: LeadStatus) -> usize {
        match status {
            LeadStatus::OnTraining => self.on_training,
            LeadStatus::OnDeposit => self.on_deposit,
            LeadStatus::Blocked => self.blocked,
            LeadStatus::Opened => self.opened,
            LeadStatus::FollowUp => self.follow_up,
            LeadStatus::NotInterested => self.not_interested,
            LeadStatus::Unknown => 0,
        }
    }

    /// Ranking key; higher sorts first.
    pub fn rank_key(&self) -> (usize, usize, usize, usize) {
        (self.opened, self.on_deposit, self.on_training, self.total)
    }
}

/// en-US short date, e.g. `10/1/2025`.
pub fn date_label(date: NaiveDate) -> String {
    date.format("%-m/%-d/%Y").to_string()
}

fn serialize_date_labels<S>(
    entries: &BTreeMap<NaiveDate, usize>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(date, count)| (date_label(*date), count)))
}

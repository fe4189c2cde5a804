use std::fmt::{Display, Write};

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

use crate::aggregate::aggregate;
use crate::board::StatusTotals;
use crate::countdown::{compute_remaining, Countdown, ReminderTarget};
use crate::models::{date_label, Lead, TeamMemberStats};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReminderRow {
    pub lead_id: String,
    pub team_member: String,
    pub client_number: String,
    /// Target in the reminder's own zone, or the raw value when unreadable.
    pub target: String,
    pub note: Option<String>,
    pub countdown: Countdown,
}

/// One row per lead with a complete reminder, soonest first; unreadable
/// reminders sort last.
pub fn reminder_rows(leads: &[Lead], now: DateTime<Utc>) -> Vec<ReminderRow> {
    let mut rows: Vec<(Option<DateTime<Utc>>, ReminderRow)> = leads
        .iter()
        .filter_map(|lead| {
            let key = lead.reminder_key()?;
            let parsed = ReminderTarget::parse(&key.datetime, &key.timezone).ok();
            let target = parsed
                .map(|t| t.local_display())
                .unwrap_or_else(|| format!("{} {}", key.datetime, key.timezone));
            let row = ReminderRow {
                lead_id: lead.id.clone(),
                team_member: lead.team_member.clone(),
                client_number: lead.client_number.clone(),
                target,
                note: lead.reminder_note().map(str::to_string),
                countdown: compute_remaining(now, &key.datetime, &key.timezone),
            };
            Some((parsed.map(|t| t.at), row))
        })
        .collect();

    rows.sort_by_key(|(at, _)| (at.is_none(), *at));
    rows.into_iter().map(|(_, row)| row).collect()
}

pub fn ranking_line(position: usize, stats: &TeamMemberStats) -> String {
    format!(
        "#{} {}: {} total | opened {} | on deposit {} | on training {} | follow up {}",
        position, stats.name, stats.total, stats.opened, stats.on_deposit, stats.on_training,
        stats.follow_up
    )
}

pub fn build_report<Tz>(leads: &[Lead], now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let totals = StatusTotals::from_leads(leads);
    let ranking: Vec<TeamMemberStats> = aggregate(leads, now).collect();
    let reminders = reminder_rows(leads, now.with_timezone(&Utc));

    let mut output = String::new();

    let _ = writeln!(output, "# Lead Performance Report");
    let _ = writeln!(output, "Generated {}", now.format("%Y-%m-%d %H:%M %Z"));
    let _ = writeln!(output);
    let _ = writeln!(output, "## Totals");
    let _ = writeln!(output, "- Total leads: {}", totals.total);
    let _ = writeln!(output, "- On Training: {}", totals.on_training);
    let _ = writeln!(output, "- On Deposit: {}", totals.on_deposit);
    let _ = writeln!(output, "- Opened: {}", totals.opened);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Team Performance");

    if ranking.is_empty() {
        let _ = writeln!(output, "No team members found.");
    } else {
        for (idx, stats) in ranking.iter().enumerate() {
            let _ = writeln!(output, "- {}", ranking_line(idx + 1, stats));
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Current Month Summary");

    if ranking.is_empty() {
        let _ = writeln!(output, "No entries this month.");
    } else {
        for stats in ranking.iter() {
            let _ = writeln!(output, "### {}", stats.name);
            if stats.date_wise_entries.is_empty() {
                let _ = writeln!(output, "No entries this month.");
                continue;
            }
            for (date, count) in stats.date_wise_entries.iter().rev() {
                let _ = writeln!(output, "- {}: {} new clients", date_label(*date), count);
            }
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Reminders");

    if reminders.is_empty() {
        let _ = writeln!(output, "No reminders set.");
    } else {
        for row in reminders.iter() {
            let _ = write!(
                output,
                "- {} ({}) at {}: {}",
                row.client_number, row.team_member, row.target, row.countdown
            );
            match &row.note {
                Some(note) => {
                    let _ = writeln!(output, " ({note})");
                }
                None => {
                    let _ = writeln!(output);
                }
            }
        }
    }

    output
}

//! Read-only access to a Postgres `leads` table.
//!
//! Expected columns: `id`, `client_number`, `my_number`, `team_member`,
//! `status`, `remarks`, `created_at` (timestamptz, nullable) and the nullable
//! text columns `reminder_datetime`, `reminder_timezone`, `reminder_note`.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::error::SourceError;
use crate::models::{Lead, LeadStatus, Reminder};

pub async fn fetch_leads(
    pool: &PgPool,
    team_member: Option<&str>,
) -> Result<Vec<Lead>, SourceError> {
    let mut query = String::from(
        "SELECT id::text AS id, client_number, my_number, team_member, status, remarks, \
         created_at, reminder_datetime, reminder_timezone, reminder_note \
         FROM leads",
    );

    if team_member.is_some() {
        query.push_str(" WHERE team_member = $1");
    }
    query.push_str(" ORDER BY created_at NULLS LAST, id");

    let mut rows = sqlx::query(&query);
    if let Some(value) = team_member {
        rows = rows.bind(value);
    }

    let records = rows.fetch_all(pool).await?;
    let mut leads = Vec::with_capacity(records.len());

    for row in records {
        let status: Option<String> = row.try_get("status")?;
        let reminder_datetime: Option<String> = row.try_get("reminder_datetime")?;
        let reminder_timezone: Option<String> = row.try_get("reminder_timezone")?;
        let reminder = (reminder_datetime.is_some() || reminder_timezone.is_some()).then(|| {
            Reminder {
                datetime: reminder_datetime,
                timezone: reminder_timezone,
                note: row.try_get::<Option<String>, _>("reminder_note").ok().flatten(),
            }
        });

        leads.push(Lead {
            id: row.try_get("id")?,
            client_number: row.try_get::<Option<String>, _>("client_number")?.unwrap_or_default(),
            my_number: row.try_get::<Option<String>, _>("my_number")?.unwrap_or_default(),
            team_member: row.try_get::<Option<String>, _>("team_member")?.unwrap_or_default(),
            status: status
                .as_deref()
                .map(LeadStatus::from_label)
                .unwrap_or(LeadStatus::Unknown),
            remarks: row.try_get::<Option<String>, _>("remarks")?.unwrap_or_default(),
            created_at: row.try_get::<Option<DateTime<Utc>>, _>("created_at")?,
            date: None,
            reminder,
        });
    }

    tracing::debug!(count = leads.len(), "fetched leads from Postgres");
    Ok(leads)
}

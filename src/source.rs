use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db;
use crate::error::SourceError;
use crate::models::{Lead, LeadStatus, Reminder};

#[derive(Debug, Clone)]
pub enum LeadSource {
    Csv(PathBuf),
    Json(PathBuf),
    Postgres {
        pool: PgPool,
        team_member: Option<String>,
    },
}

impl LeadSource {
    pub async fn load(&self) -> Result<Vec<Lead>, SourceError> {
        match self {
            LeadSource::Csv(path) => load_csv(path),
            LeadSource::Json(path) => load_json(path),
            LeadSource::Postgres { pool, team_member } => {
                db::fetch_leads(pool, team_member.as_deref()).await
            }
        }
    }
}

pub fn load_json(path: &Path) -> Result<Vec<Lead>, SourceError> {
    let raw = std::fs::read_to_string(path).map_err(|source| SourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SourceError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_csv(path: &Path) -> Result<Vec<Lead>, SourceError> {
    #[derive(serde::Deserialize)]
    struct CsvRow {
        id: String,
        client_number: String,
        #[serde(default)]
        my_number: String,
        #[serde(default)]
        team_member: String,
        status: String,
        #[serde(default)]
        remarks: String,
        created_at: Option<DateTime<Utc>>,
        reminder_datetime: Option<String>,
        reminder_timezone: Option<String>,
        reminder_note: Option<String>,
    }

    let csv_err = |source| SourceError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::Reader::from_path(path).map_err(csv_err)?;
    let mut leads = Vec::new();

    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(csv_err)?;
        let reminder = (row.reminder_datetime.is_some() || row.reminder_timezone.is_some())
            .then(|| Reminder {
                datetime: row.reminder_datetime,
                timezone: row.reminder_timezone,
                note: row.reminder_note,
            });

        leads.push(Lead {
            id: row.id,
            client_number: row.client_number,
            my_number: row.my_number,
            team_member: row.team_member,
            status: LeadStatus::from_label(&row.status),
            remarks: row.remarks,
            created_at: row.created_at,
            date: None,
            reminder,
        });
    }

    tracing::debug!(count = leads.len(), path = %path.display(), "loaded leads from CSV");
    Ok(leads)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn csv_rows_become_leads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "id,client_number,my_number,team_member,status,remarks,created_at,reminder_datetime,reminder_timezone,reminder_note"
        )
        .unwrap();
        writeln!(
            file,
            "1,+1 555 0100,+1 555 0199,Ali,Opened,keen,2025-10-01T12:00:00Z,2025-10-20T09:00,EST,call back"
        )
        .unwrap();
        writeln!(file, "2,+1 555 0101,,Sara,Waiting,,,,,").unwrap();

        let leads = load_csv(file.path()).unwrap();
        assert_eq!(leads.len(), 2);
        assert_eq!(leads[0].status, LeadStatus::Opened);
        assert!(leads[0].reminder_key().is_some());
        assert_eq!(leads[0].reminder_note(), Some("call back"));
        assert_eq!(leads[1].status, LeadStatus::Unknown);
        assert!(leads[1].reminder.is_none());
        assert!(leads[1].created().is_none());
    }

    #[test]
    fn json_array_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"_id": "a1", "teamMember": "Ali", "status": "Follow Up", "clientNumber": "1"}}]"#
        )
        .unwrap();

        let leads = load_json(file.path()).unwrap();
        assert_eq!(leads.len(), 1);
        assert_eq!(leads[0].status, LeadStatus::FollowUp);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_json(Path::new("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, SourceError::Io { .. }));
    }
}

use std::path::PathBuf;

/// Reminder conditions. None of these escape the scheduler; they are turned
/// into a display state or a skipped delivery and logged.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error("invalid reminder time: {0}")]
    InvalidReminderTime(String),

    #[error("notification permission unavailable")]
    PermissionUnavailable,

    #[error("notification delivery failed: {0}")]
    Delivery(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("bad CSV row in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("bad JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown display timezone {0:?}")]
    DisplayTimezone(String),

    #[error("LEAD_NOTIFICATIONS must be on or off, got {0:?}")]
    NotificationSwitch(String),
}

use chrono_tz::Tz;

use crate::error::ConfigError;

pub const DISPLAY_TZ_VAR: &str = "LEAD_DISPLAY_TZ";
pub const NOTIFICATIONS_VAR: &str = "LEAD_NOTIFICATIONS";
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: Option<String>,
    /// Zone used for calendar days in rankings, filters and reports.
    pub display_tz: Tz,
    pub notifications: bool,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                tracing::warn!(%err, "ignoring unreadable .env file");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let display_tz = match lookup(DISPLAY_TZ_VAR).filter(|v| !v.trim().is_empty()) {
            Some(name) => name
                .trim()
                .parse::<Tz>()
                .map_err(|_| ConfigError::DisplayTimezone(name.clone()))?,
            None => host_timezone(),
        };

        let notifications = match lookup(NOTIFICATIONS_VAR) {
            None => true,
            Some(value) => parse_switch(&value)?,
        };

        Ok(Settings {
            database_url: lookup(DATABASE_URL_VAR).filter(|v| !v.is_empty()),
            display_tz,
            notifications,
        })
    }
}

fn parse_switch(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::NotificationSwitch(value.to_string())),
    }
}

fn host_timezone() -> Tz {
    iana_time_zone::get_timezone()
        .ok()
        .and_then(|name| name.parse::<Tz>().ok())
        .unwrap_or(chrono_tz::UTC)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(vars: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn reads_explicit_values() {
        let s = settings(&[
            (DISPLAY_TZ_VAR, "America/Chicago"),
            (NOTIFICATIONS_VAR, "off"),
            (DATABASE_URL_VAR, "postgres://localhost/leads"),
        ])
        .unwrap();
        assert_eq!(s.display_tz, chrono_tz::America::Chicago);
        assert!(!s.notifications);
        assert_eq!(s.database_url.as_deref(), Some("postgres://localhost/leads"));
    }

    #[test]
    fn notifications_default_on() {
        let s = settings(&[(DISPLAY_TZ_VAR, "UTC")]).unwrap();
        assert!(s.notifications);
        assert!(s.database_url.is_none());
    }

    #[test]
    fn rejects_bad_zone_and_switch() {
        assert!(matches!(
            settings(&[(DISPLAY_TZ_VAR, "Mars/Olympus")]),
            Err(ConfigError::DisplayTimezone(_))
        ));
        assert!(matches!(
            settings(&[(DISPLAY_TZ_VAR, "UTC"), (NOTIFICATIONS_VAR, "maybe")]),
            Err(ConfigError::NotificationSwitch(_))
        ));
    }
}

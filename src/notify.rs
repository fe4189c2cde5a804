#[cfg(test)]
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::error::ReminderError;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// Not decided yet; delivery is skipped until it becomes `Granted`.
    Default,
}

/// A way to put an alert in front of the user.
pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    fn request_permission(&self) -> Permission;

    fn notify(&self, title: &str, body: &str) -> Result<(), ReminderError>;
}

/// Writes alerts to stdout and the log. Always granted.
#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn permission(&self) -> Permission {
        Permission::Granted
    }

    fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), ReminderError> {
        tracing::info!(title, body, "reminder alert");
        println!("[alert] {title}: {body}");
        Ok(())
    }
}

/// Used when notifications are switched off in config.
#[derive(Debug, Default)]
pub struct MutedNotifier;

impl Notifier for MutedNotifier {
    fn permission(&self) -> Permission {
        Permission::Denied
    }

    fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    fn notify(&self, _title: &str, _body: &str) -> Result<(), ReminderError> {
        Err(ReminderError::PermissionUnavailable)
    }
}

/// In-memory notifier that records every delivered alert.
#[cfg(test)]
#[derive(Debug)]
pub struct RecordingNotifier {
    permission: Mutex<Permission>,
    grant_on_request: bool,
    sent: Mutex<Vec<(String, String)>>,
}

#[cfg(test)]
impl RecordingNotifier {
    pub fn new(permission: Permission, grant_on_request: bool) -> Self {
        RecordingNotifier {
            permission: Mutex::new(permission),
            grant_on_request,
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn granted() -> Self {
        Self::new(Permission::Granted, true)
    }

    pub fn denied() -> Self {
        Self::new(Permission::Denied, false)
    }

    pub fn set_permission(&self, permission: Permission) {
        if let Ok(mut current) = self.permission.lock() {
            *current = permission;
        }
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl Notifier for RecordingNotifier {
    fn permission(&self) -> Permission {
        self.permission
            .lock()
            .map(|p| *p)
            .unwrap_or(Permission::Denied)
    }

    fn request_permission(&self) -> Permission {
        let Ok(mut current) = self.permission.lock() else {
            return Permission::Denied;
        };
        if *current == Permission::Default {
            *current = if self.grant_on_request {
                Permission::Granted
            } else {
                Permission::Denied
            };
        }
        *current
    }

    fn notify(&self, title: &str, body: &str) -> Result<(), ReminderError> {
        let mut sent = self
            .sent
            .lock()
            .map_err(|e| ReminderError::Delivery(e.to_string()))?;
        sent.push((title.to_string(), body.to_string()));
        Ok(())
    }
}

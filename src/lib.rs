pub mod aggregate;
pub mod board;
pub mod config;
pub mod countdown;
pub mod db;
pub mod error;
pub mod logging;
pub mod models;
pub mod notify;
pub mod report;
pub mod scheduler;
pub mod source;
pub mod timezone;

pub use aggregate::aggregate;
pub use countdown::{compute_remaining, Countdown, Remaining, ReminderTarget};
pub use models::{Lead, LeadStatus, Reminder, TeamMemberStats};
pub use scheduler::{CountdownUpdate, ReminderPhase, ReminderScheduler};

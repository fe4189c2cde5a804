//! Per-lead reminder timers.
//!
//! The scheduler watches the reminder pairing (datetime, timezone) of every
//! lead it is shown and owns two timers per lead: a one-second countdown tick
//! and a one-shot alert. Timers are only replaced when the pairing actually
//! changes, and every timer is aborted when its lead is unmounted or the
//! scheduler is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use crate::countdown::{Countdown, ReminderTarget};
use crate::models::{Lead, ReminderKey};
use crate::notify::{Clock, Notifier, Permission};

pub const TICK: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountdownUpdate {
    pub lead_id: String,
    pub countdown: Countdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderPhase {
    NoReminder,
    /// A reminder is set but no alert is armed: already due, or unreadable.
    Idle,
    Scheduled,
    Fired,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub body: String,
}

impl Alert {
    pub fn for_lead(lead: &Lead) -> Self {
        let body = match lead.reminder_note() {
            Some(note) => format!("Reminder for {}: {}", lead.client_number, note),
            None => format!("Reminder for {}", lead.client_number),
        };
        Alert {
            title: format!("Reminder Alert for {}", lead.team_member),
            body,
        }
    }
}

#[derive(Debug)]
struct ArmedAlert {
    handle: JoinHandle<()>,
    fired: Arc<AtomicBool>,
}

#[derive(Debug, Default)]
struct Slot {
    key: Option<ReminderKey>,
    ticker: Option<JoinHandle<()>>,
    alarm: Option<ArmedAlert>,
    cancelled: bool,
}

impl Slot {
    fn phase(&self) -> ReminderPhase {
        match &self.alarm {
            Some(alarm) if alarm.fired.load(Ordering::SeqCst) => ReminderPhase::Fired,
            Some(_) => ReminderPhase::Scheduled,
            None if self.cancelled => ReminderPhase::Cancelled,
            None if self.key.is_some() => ReminderPhase::Idle,
            None => ReminderPhase::NoReminder,
        }
    }

    /// Stops both timers. Returns true if an alert was still pending.
    fn cancel(&mut self) -> bool {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        match self.alarm.take() {
            Some(alarm) if !alarm.fired.load(Ordering::SeqCst) => {
                alarm.handle.abort();
                true
            }
            _ => false,
        }
    }
}

pub struct ReminderScheduler {
    clock: Arc<dyn Clock>,
    notifier: Arc<dyn Notifier>,
    updates: Option<mpsc::UnboundedSender<CountdownUpdate>>,
    slots: HashMap<String, Slot>,
}

impl ReminderScheduler {
    pub fn new(clock: Arc<dyn Clock>, notifier: Arc<dyn Notifier>) -> Self {
        ReminderScheduler {
            clock,
            notifier,
            updates: None,
            slots: HashMap::new(),
        }
    }

    /// Enables countdown ticks; every observed reminder publishes on `tx`.
    pub fn with_countdowns(mut self, tx: mpsc::UnboundedSender<CountdownUpdate>) -> Self {
        self.updates = Some(tx);
        self
    }

    pub fn phase(&self, lead_id: &str) -> ReminderPhase {
        self.slots
            .get(lead_id)
            .map(Slot::phase)
            .unwrap_or(ReminderPhase::NoReminder)
    }

    /// Number of alerts armed and not yet fired.
    pub fn pending(&self) -> usize {
        self.slots
            .values()
            .filter(|slot| slot.phase() == ReminderPhase::Scheduled)
            .count()
    }

    /// Picks up the lead's current reminder. A pairing equal to the one
    /// already seen leaves the running timers alone.
    ///
    /// Timers run on the current tokio runtime. Outside a runtime nothing is
    /// armed and the reminder reads as [`ReminderPhase::Idle`].
    pub fn observe(&mut self, lead: &Lead) -> ReminderPhase {
        let key = lead.reminder_key();
        if let Some(slot) = self.slots.get(&lead.id) {
            if slot.key == key {
                return slot.phase();
            }
        }

        let cancelled = self
            .slots
            .remove(&lead.id)
            .map(|mut previous| previous.cancel())
            .unwrap_or(false);
        if cancelled {
            tracing::debug!(lead = %lead.id, "reminder changed, previous alert cancelled");
        }

        let Some(key) = key else {
            if cancelled {
                self.slots.insert(
                    lead.id.clone(),
                    Slot {
                        cancelled: true,
                        ..Slot::default()
                    },
                );
                return ReminderPhase::Cancelled;
            }
            return ReminderPhase::NoReminder;
        };

        let slot = self.arm(lead, key);
        let phase = slot.phase();
        self.slots.insert(lead.id.clone(), slot);
        phase
    }

    /// Observes every lead and unmounts the ones no longer in the collection.
    pub fn sync(&mut self, leads: &[Lead]) {
        let mut seen = HashSet::with_capacity(leads.len());
        for lead in leads {
            self.observe(lead);
            seen.insert(lead.id.as_str());
        }

        let gone: Vec<String> = self
            .slots
            .keys()
            .filter(|id| !seen.contains(id.as_str()))
            .cloned()
            .collect();
        for id in gone {
            self.unmount(&id);
        }
    }

    /// Drops the lead's timers. Returns true if an alert was still pending.
    pub fn unmount(&mut self, lead_id: &str) -> bool {
        match self.slots.remove(lead_id) {
            Some(mut slot) => slot.cancel(),
            None => false,
        }
    }

    fn arm(&self, lead: &Lead, key: ReminderKey) -> Slot {
        let target = match ReminderTarget::parse(&key.datetime, &key.timezone) {
            Ok(target) => Some(target),
            Err(err) => {
                tracing::warn!(lead = %lead.id, %err, "reminder not scheduled");
                None
            }
        };

        let ticker = self
            .updates
            .clone()
            .and_then(|tx| self.spawn_ticker(lead.id.clone(), target, tx));
        let alarm = target.and_then(|target| self.spawn_alarm(lead, target));

        Slot {
            key: Some(key),
            ticker,
            alarm,
            cancelled: false,
        }
    }

    fn spawn_ticker(
        &self,
        lead_id: String,
        target: Option<ReminderTarget>,
        tx: mpsc::UnboundedSender<CountdownUpdate>,
    ) -> Option<JoinHandle<()>> {
        let runtime = current_runtime()?;
        let clock = Arc::clone(&self.clock);
        let mut interval = tokio::time::interval_at(Instant::now(), TICK);
        Some(runtime.spawn(async move {
            loop {
                interval.tick().await;
                let countdown = match &target {
                    Some(target) => target.countdown(clock.now()),
                    None => Countdown::Invalid,
                };
                let update = CountdownUpdate {
                    lead_id: lead_id.clone(),
                    countdown,
                };
                if tx.send(update).is_err() {
                    break;
                }
            }
        }))
    }

    fn spawn_alarm(&self, lead: &Lead, target: ReminderTarget) -> Option<ArmedAlert> {
        if target.at <= self.clock.now() {
            tracing::debug!(lead = %lead.id, "reminder already due, no alert armed");
            return None;
        }

        if self.notifier.permission() != Permission::Granted {
            let answer = self.notifier.request_permission();
            tracing::debug!(lead = %lead.id, ?answer, "requested notification permission");
        }

        let alert = Alert::for_lead(lead);
        let lead_id = lead.id.clone();
        let notifier = Arc::clone(&self.notifier);
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);

        let handle = schedule_notification(self.clock.now(), target, move || {
            flag.store(true, Ordering::SeqCst);
            deliver(notifier.as_ref(), &lead_id, &alert);
        })?;
        tracing::info!(lead = %lead.id, at = %target.local_display(), "reminder scheduled");

        Some(ArmedAlert { handle, fired })
    }
}

/// Arms a one-shot timer that runs `on_fire` when `target` is reached.
/// Returns `None` without arming when the target is not in the future, or
/// when there is no tokio runtime to run the timer on.
pub fn schedule_notification<F>(
    now: DateTime<Utc>,
    target: ReminderTarget,
    on_fire: F,
) -> Option<JoinHandle<()>>
where
    F: FnOnce() + Send + 'static,
{
    let delay = (target.at - now).to_std().ok().filter(|d| !d.is_zero())?;
    let runtime = current_runtime()?;
    // fixed here so a late first poll cannot push the alert back
    let deadline = Instant::now() + delay;
    Some(runtime.spawn(async move {
        tokio::time::sleep_until(deadline).await;
        on_fire();
    }))
}

fn current_runtime() -> Option<Handle> {
    match Handle::try_current() {
        Ok(handle) => Some(handle),
        Err(err) => {
            tracing::warn!(%err, "no tokio runtime, timer not started");
            None
        }
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        for slot in self.slots.values_mut() {
            slot.cancel();
        }
    }
}

fn deliver(notifier: &dyn Notifier, lead_id: &str, alert: &Alert) {
    if notifier.permission() != Permission::Granted {
        tracing::debug!(lead = %lead_id, "notification permission not granted, alert skipped");
        return;
    }
    if let Err(err) = notifier.notify(&alert.title, &alert.body) {
        tracing::warn!(lead = %lead_id, %err, "failed to deliver reminder alert");
    }
}

//! Notification service seam.
//!
//! The tracker talks to reminders and alerts only through [`Notifier`].
//! Delivery is best-effort: failures are reported but never undo a write.

use std::cell::RefCell;

use crate::clock::WallTime;
use crate::error::NotifyError;
use crate::storage::UserSettings;

/// Notification delivery used by the tracker.
pub trait Notifier {
    /// Schedule the daily reminder, replacing any prior schedule.
    fn schedule_reminder(&self, time: WallTime) -> Result<(), NotifyError>;

    /// Cancel every scheduled reminder.
    fn cancel_all(&self) -> Result<(), NotifyError>;

    /// Deliver a notification right away.
    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

impl<T: Notifier + ?Sized> Notifier for &T {
    fn schedule_reminder(&self, time: WallTime) -> Result<(), NotifyError> {
        (**self).schedule_reminder(time)
    }

    fn cancel_all(&self) -> Result<(), NotifyError> {
        (**self).cancel_all()
    }

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        (**self).send_immediate(title, body)
    }
}

/// Re-sync the reminder schedule with `settings`.
///
/// Always cancels first; schedules again only when notifications are enabled.
/// An unparsable reminder time leaves nothing scheduled.
pub fn apply_reminder<N: Notifier + ?Sized>(
    notifier: &N,
    settings: &UserSettings,
) -> Result<Option<WallTime>, NotifyError> {
    notifier.cancel_all()?;
    if !settings.notifications_enabled {
        return Ok(None);
    }
    match settings.reminder() {
        Ok(time) => {
            notifier.schedule_reminder(time)?;
            tracing::info!(%time, "reminder scheduled");
            Ok(Some(time))
        }
        Err(e) => {
            tracing::warn!(error = %e, "reminder not scheduled");
            Ok(None)
        }
    }
}

/// Body text announcing the current streak.
pub fn streak_message(current_streak: u32) -> String {
    let unit = if current_streak == 1 { "day" } else { "days" };
    format!("Your current streak is now {current_streak} {unit}!")
}

/// Notifier that only emits tracing events.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn schedule_reminder(&self, time: WallTime) -> Result<(), NotifyError> {
        tracing::info!(target: "dailydose::notify", %time, "schedule daily reminder");
        Ok(())
    }

    fn cancel_all(&self) -> Result<(), NotifyError> {
        tracing::info!(target: "dailydose::notify", "cancel scheduled reminders");
        Ok(())
    }

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(target: "dailydose::notify", title, body, "notification");
        Ok(())
    }
}

/// A notifier call, as seen by [`RecordingNotifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Scheduled(WallTime),
    CancelledAll,
    Sent { title: String, body: String },
}

/// Notifier that records calls in memory. Useful for previews and tests.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    calls: RefCell<Vec<Notification>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every call fails after being recorded.
    pub fn failing() -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            fail: true,
        }
    }

    pub fn calls(&self) -> Vec<Notification> {
        self.calls.borrow().clone()
    }

    fn push(&self, call: Notification) -> Result<(), NotifyError> {
        self.calls.borrow_mut().push(call);
        if self.fail {
            return Err(NotifyError::DeliveryFailed("recording notifier set to fail".into()));
        }
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    fn schedule_reminder(&self, time: WallTime) -> Result<(), NotifyError> {
        self.push(Notification::Scheduled(time))
    }

    fn cancel_all(&self) -> Result<(), NotifyError> {
        self.push(Notification::CancelledAll)
    }

    fn send_immediate(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        self.push(Notification::Sent {
            title: title.to_string(),
            body: body.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_reminder_cancels_then_schedules() {
        let notifier = RecordingNotifier::new();
        let scheduled = apply_reminder(&notifier, &UserSettings::default()).unwrap();
        let ten = WallTime::new(10, 0).unwrap();
        assert_eq!(scheduled, Some(ten));
        assert_eq!(
            notifier.calls(),
            vec![Notification::CancelledAll, Notification::Scheduled(ten)]
        );
    }

    #[test]
    fn apply_reminder_only_cancels_when_disabled() {
        let notifier = RecordingNotifier::new();
        let settings = UserSettings {
            notifications_enabled: false,
            ..UserSettings::default()
        };
        assert_eq!(apply_reminder(&notifier, &settings).unwrap(), None);
        assert_eq!(notifier.calls(), vec![Notification::CancelledAll]);
    }

    #[test]
    fn apply_reminder_skips_bad_time() {
        let notifier = RecordingNotifier::new();
        let settings = UserSettings {
            reminder_time: "noonish".into(),
            ..UserSettings::default()
        };
        assert_eq!(apply_reminder(&notifier, &settings).unwrap(), None);
        assert_eq!(notifier.calls(), vec![Notification::CancelledAll]);
    }

    #[test]
    fn apply_reminder_propagates_delivery_errors() {
        let notifier = RecordingNotifier::failing();
        assert!(apply_reminder(&notifier, &UserSettings::default()).is_err());
    }

    #[test]
    fn streak_message_pluralizes() {
        assert_eq!(streak_message(1), "Your current streak is now 1 day!");
        assert_eq!(streak_message(4), "Your current streak is now 4 days!");
        assert_eq!(streak_message(0), "Your current streak is now 0 days!");
    }

    #[test]
    fn log_notifier_never_fails() {
        let n = LogNotifier;
        assert!(n.schedule_reminder(WallTime::MIDNIGHT).is_ok());
        assert!(n.cancel_all().is_ok());
        assert!(n.send_immediate("t", "b").is_ok());
    }
}

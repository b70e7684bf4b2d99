//! Fire-and-forget notifications: in-app toasts and desktop popups

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// How long a toast stays on the info line
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Older toasts are dropped beyond this many
const TOAST_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: Level::Info, message: message.into() }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self { level: Level::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: Level::Error, message: message.into() }
    }
}

pub trait Notifier {
    fn notify(&mut self, notification: &Notification);
}

/// Toasts shown on the info line, newest first, each expiring after [`TOAST_TTL`]
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: VecDeque<(Notification, Instant)>,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_at(&mut self, notification: Notification, at: Instant) {
        self.toasts.push_back((notification, at));
        while self.toasts.len() > TOAST_CAPACITY {
            self.toasts.pop_front();
        }
    }

    /// Most recent toast still alive at `now`
    pub fn current_at(&self, now: Instant) -> Option<&Notification> {
        self.toasts
            .iter()
            .rev()
            .find(|(_, at)| now.saturating_duration_since(*at) < TOAST_TTL)
            .map(|(n, _)| n)
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current_at(Instant::now())
    }

    /// Drop expired toasts
    pub fn prune_at(&mut self, now: Instant) {
        self.toasts.retain(|(_, at)| now.saturating_duration_since(*at) < TOAST_TTL);
    }

    /// Every toast delivered and not yet pruned, oldest first
    #[cfg(test)]
    pub fn history(&self) -> impl Iterator<Item = &Notification> {
        self.toasts.iter().map(|(n, _)| n)
    }
}

impl Notifier for ToastQueue {
    fn notify(&mut self, notification: &Notification) {
        self.push_at(notification.clone(), Instant::now());
    }
}

/// Desktop notifications through the session's notification daemon
#[derive(Debug, Default)]
pub struct DesktopNotifier;

impl Notifier for DesktopNotifier {
    fn notify(&mut self, notification: &Notification) {
        let (icon, urgency) = match notification.level {
            Level::Info => ("dialog-information", notify_rust::Urgency::Low),
            Level::Success => ("emblem-default", notify_rust::Urgency::Normal),
            Level::Error => ("dialog-error", notify_rust::Urgency::Critical),
        };

        if let Err(e) = notify_rust::Notification::new()
            .summary("agribarter")
            .body(&notification.message)
            .icon(icon)
            .urgency(urgency)
            .show()
        {
            tracing::debug!("Desktop notification failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newest_live_toast_wins() {
        let start = Instant::now();
        let mut queue = ToastQueue::new();
        queue.push_at(Notification::info("first"), start);
        queue.push_at(Notification::success("second"), start + Duration::from_secs(1));

        let current = queue.current_at(start + Duration::from_secs(1)).unwrap();
        assert_eq!(current.message, "second");
        assert_eq!(current.level, Level::Success);
    }

    #[test]
    fn test_toasts_expire() {
        let start = Instant::now();
        let mut queue = ToastQueue::new();
        queue.push_at(Notification::error("boom"), start);

        assert!(queue.current_at(start + Duration::from_secs(2)).is_some());
        assert!(queue.current_at(start + TOAST_TTL).is_none());

        queue.prune_at(start + TOAST_TTL);
        assert_eq!(queue.history().count(), 0);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let now = Instant::now();
        let mut queue = ToastQueue::new();
        for i in 0..(TOAST_CAPACITY + 4) {
            queue.push_at(Notification::info(format!("t{}", i)), now);
        }

        assert_eq!(queue.history().count(), TOAST_CAPACITY);
        assert_eq!(queue.history().next().unwrap().message, "t4");
    }
}

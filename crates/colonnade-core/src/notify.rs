//! The three named notification channels (spec.md §6 "Notifications
//! published"), each carrying `(old, new)` pairs of opaque identifiers and
//! human-readable names, emitted only on actual transitions.

use crate::ids::{MonitorId, WindowHandle, WorkspaceId};

#[derive(Debug, Clone, PartialEq)]
pub enum Notification {
    FocusChanged {
        old: Option<WindowHandle>,
        new: Option<WindowHandle>,
    },
    FocusedWorkspaceChanged {
        old: Option<(WorkspaceId, String)>,
        new: Option<(WorkspaceId, String)>,
    },
    FocusedMonitorChanged {
        old: Option<MonitorId>,
        new: Option<MonitorId>,
    },
}

/// Consumes published notifications; the orchestrator holds a
/// `Box<dyn NotificationSink>` so tests can substitute a recording sink.
pub trait NotificationSink: std::fmt::Debug + Send + Sync {
    fn publish(&self, notification: Notification);
}

/// Drops every notification; the default when nothing observes the core.
#[derive(Debug, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn publish(&self, _notification: Notification) {}
}

/// Records every notification in arrival order, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    received: std::sync::Mutex<Vec<Notification>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut self.received.lock().unwrap())
    }
}

impl NotificationSink for RecordingSink {
    fn publish(&self, notification: Notification) {
        self.received.lock().unwrap().push(notification);
    }
}

/// Emits `FocusChanged` only when `old != new`, per spec.md §6.
pub fn notify_focus_changed(
    sink: &dyn NotificationSink,
    old: Option<WindowHandle>,
    new: Option<WindowHandle>,
) {
    if old != new {
        sink.publish(Notification::FocusChanged { old, new });
    }
}

pub fn notify_focused_workspace_changed(
    sink: &dyn NotificationSink,
    old: Option<(WorkspaceId, String)>,
    new: Option<(WorkspaceId, String)>,
) {
    if old != new {
        sink.publish(Notification::FocusedWorkspaceChanged { old, new });
    }
}

pub fn notify_focused_monitor_changed(sink: &dyn NotificationSink, old: Option<MonitorId>, new: Option<MonitorId>) {
    if old != new {
        sink.publish(Notification::FocusedMonitorChanged { old, new });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_transition_means_no_notification() {
        let sink = RecordingSink::new();
        let handle = WindowHandle::new(1, 1);

        notify_focus_changed(&sink, Some(handle), Some(handle));

        assert!(sink.drain().is_empty());
    }

    #[test]
    fn an_actual_transition_is_recorded() {
        let sink = RecordingSink::new();
        let a = WindowHandle::new(1, 1);
        let b = WindowHandle::new(1, 2);

        notify_focus_changed(&sink, Some(a), Some(b));

        let received = sink.drain();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], Notification::FocusChanged { old: Some(a), new: Some(b) });
    }
}

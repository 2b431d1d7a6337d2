//! The seam between the scheduler and whatever renders it.

use loopviz_core::Notification;

/// Receives every notification the scheduler emits, in order.
pub trait NotificationSink {
    fn notify(&mut self, notification: Notification);
}

/// Records notifications. Used by tests and by shells that render in batches.
impl NotificationSink for Vec<Notification> {
    fn notify(&mut self, notification: Notification) {
        self.push(notification);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for &mut S {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

impl<S: NotificationSink + ?Sized> NotificationSink for Box<S> {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&mut self, _notification: Notification) {}
}

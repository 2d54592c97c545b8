//! Subscriber registry for reorganization notifications.
//!
//! Handlers run inline on the notifying thread, while the organizer still
//! holds its submission lock. That makes every notification observable
//! before the next submission begins, at the cost of keeping handlers
//! cheap. The terminal stopped event is delivered at most once; handlers
//! registered after shutdown receive it immediately.

use parking_lot::Mutex;

use crate::events::ReorganizeEvent;

/// A reorganization callback.
pub type ReorganizeHandler = Box<dyn Fn(&ReorganizeEvent) + Send + Sync>;

/// Handler registry with a started/stopped lifecycle.
#[derive(Default)]
pub struct ReorganizeSubscriber {
    inner: Mutex<SubscriberState>,
}

#[derive(Default)]
struct SubscriberState {
    handlers: Vec<ReorganizeHandler>,
    stopped: bool,
}

impl ReorganizeSubscriber {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept notifications (again).
    pub fn start(&self) {
        self.inner.lock().stopped = false;
    }

    /// Register a handler. After shutdown the terminal event is delivered
    /// to the new handler immediately and it is not retained.
    pub fn subscribe(&self, handler: ReorganizeHandler) {
        let mut state = self.inner.lock();

        if state.stopped {
            handler(&ReorganizeEvent::Stopped);
            return;
        }

        state.handlers.push(handler);
    }

    /// Deliver an event to every registered handler.
    pub fn invoke(&self, event: &ReorganizeEvent) {
        let state = self.inner.lock();

        if state.stopped {
            return;
        }

        for handler in &state.handlers {
            handler(event);
        }
    }

    /// Deliver the terminal stopped event once and drop all handlers.
    pub fn stop(&self) {
        let mut state = self.inner.lock();

        if state.stopped {
            return;
        }

        state.stopped = true;
        for handler in state.handlers.drain(..) {
            handler(&ReorganizeEvent::Stopped);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_handler(count: Arc<AtomicUsize>) -> ReorganizeHandler {
        Box::new(move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_invoke_reaches_every_handler() {
        let subscriber = ReorganizeSubscriber::new();
        let count = Arc::new(AtomicUsize::new(0));

        subscriber.start();
        subscriber.subscribe(counting_handler(count.clone()));
        subscriber.subscribe(counting_handler(count.clone()));

        subscriber.invoke(&ReorganizeEvent::Applied {
            fork_height: 0,
            incoming: vec![],
            outgoing: vec![],
        });
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_stop_delivers_terminal_event_once() {
        let subscriber = ReorganizeSubscriber::new();
        let terminal = Arc::new(AtomicUsize::new(0));
        let observed = terminal.clone();

        subscriber.start();
        subscriber.subscribe(Box::new(move |event| {
            if matches!(event, ReorganizeEvent::Stopped) {
                observed.fetch_add(1, Ordering::SeqCst);
            }
        }));

        subscriber.stop();
        subscriber.stop();
        assert_eq!(terminal.load(Ordering::SeqCst), 1);

        // Events after shutdown are dropped.
        subscriber.invoke(&ReorganizeEvent::Applied {
            fork_height: 0,
            incoming: vec![],
            outgoing: vec![],
        });
        assert_eq!(terminal.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_late_subscriber_sees_terminal_event() {
        let subscriber = ReorganizeSubscriber::new();
        subscriber.start();
        subscriber.stop();

        let terminal = Arc::new(AtomicUsize::new(0));
        let observed = terminal.clone();
        subscriber.subscribe(Box::new(move |event| {
            if matches!(event, ReorganizeEvent::Stopped) {
                observed.fetch_add(1, Ordering::SeqCst);
            }
        }));
        assert_eq!(terminal.load(Ordering::SeqCst), 1);
    }
}

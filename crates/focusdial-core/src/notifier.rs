//! Completion notifier.
//!
//! Subscribers register explicitly and receive every [`Event`] synchronously,
//! in registration order. Delivery is best-effort: a subscriber returning an
//! error is logged and skipped, the rest still receive the event.

use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::events::Event;

pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Receives session events.
pub trait Subscriber: Send {
    /// Short name used in logs.
    fn name(&self) -> &str {
        "anonymous"
    }

    fn on_event(&self, event: &Event) -> Result<(), SubscriberError>;
}

impl<F> Subscriber for F
where
    F: Fn(&Event) -> Result<(), SubscriberError> + Send,
{
    fn on_event(&self, event: &Event) -> Result<(), SubscriberError> {
        self(event)
    }
}

/// Handle returned by [`Notifier::subscribe`], usable to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct Notifier {
    subscribers: Vec<(SubscriptionId, Box<dyn Subscriber>)>,
    next_id: u64,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, subscriber: impl Subscriber + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns false when `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Deliver `event` to every subscriber. Returns how many failed.
    ///
    /// A panicking subscriber counts as failed; the panic does not reach the
    /// caller, which may be the tick task holding the session lock.
    pub fn emit(&self, event: &Event) -> usize {
        let mut failed = 0;
        for (_, subscriber) in &self.subscribers {
            let error = match catch_unwind(AssertUnwindSafe(|| subscriber.on_event(event))) {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => panic_message(payload.as_ref()),
            };
            failed += 1;
            tracing::warn!(
                subscriber = subscriber.name(),
                event = event.name(),
                error = %error,
                "subscriber failed to handle event"
            );
        }
        failed
    }

    pub fn emit_all(&self, events: &[Event]) {
        for event in events {
            self.emit(event);
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        format!("panicked: {msg}")
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        format!("panicked: {msg}")
    } else {
        "panicked".to_string()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

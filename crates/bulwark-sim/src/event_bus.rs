//! Ordered event delivery.
//!
//! Subscribers are called synchronously in subscription order as events are
//! emitted. Every event is also buffered until the engine drains it into the
//! tick's snapshot.

use bulwark_core::events::SimEvent;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Subscriber = Box<dyn FnMut(&SimEvent) + Send>;

#[derive(Default)]
pub struct EventBus {
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_id: u64,
    pending: Vec<SimEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(
        &mut self,
        subscriber: impl FnMut(&SimEvent) + Send + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(subscriber)));
        id
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sub, _)| *sub != id);
        self.subscribers.len() != before
    }

    pub fn emit(&mut self, event: SimEvent) {
        for (_, subscriber) in &mut self.subscribers {
            subscriber(&event);
        }
        self.pending.push(event);
    }

    /// Take everything emitted since the last drain.
    pub fn drain(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn clear_subscribers(&mut self) {
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn delivers_in_subscription_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = EventBus::new();
        for tag in ["first", "second"] {
            let log = Arc::clone(&log);
            bus.subscribe(move |_| log.lock().unwrap().push(tag));
        }
        bus.emit(SimEvent::FiredoorDestroyed);
        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
        assert_eq!(bus.drain(), vec![SimEvent::FiredoorDestroyed]);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let mut bus = EventBus::new();
        let counter = Arc::clone(&count);
        let id = bus.subscribe(move |_| *counter.lock().unwrap() += 1);
        bus.emit(SimEvent::ClickCountChanged { count: 1 });
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(SimEvent::ClickCountChanged { count: 2 });
        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.drain().len(), 2);
    }
}

//! Change notifications.

use std::fmt;

use crate::registry::Value;

/// What a subscriber listens to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Topic {
    Key(String),
    All,
}

impl Topic {
    pub fn key(key: impl Into<String>) -> Self {
        Topic::Key(key.into())
    }

    fn matches(&self, key: &str) -> bool {
        match self {
            Topic::Key(k) => k == key,
            Topic::All => true,
        }
    }
}

/// Handle returned by [`ChangeBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// One change of one key.
///
/// `old` and `new` are both `None` after a reload: the key must be treated
/// as completely changed, not as removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub key: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
}

impl ChangeEvent {
    pub fn changed(key: &str, old: Value, new: Value) -> Self {
        Self {
            key: key.to_string(),
            old: Some(old),
            new: Some(new),
        }
    }

    pub fn reloaded(key: &str) -> Self {
        Self {
            key: key.to_string(),
            old: None,
            new: None,
        }
    }

    pub fn is_reload(&self) -> bool {
        self.old.is_none() && self.new.is_none()
    }
}

type Callback = Box<dyn FnMut(&ChangeEvent) + Send>;

struct Subscriber {
    id: SubscriptionId,
    topic: Topic,
    callback: Callback,
}

/// Synchronous subscriber list.
///
/// Events are delivered in registration order before `publish` returns.
#[derive(Default)]
pub struct ChangeBus {
    next_id: u64,
    subscribers: Vec<Subscriber>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscribers.push(Subscriber {
            id,
            topic,
            callback: Box::new(callback),
        });
        id
    }

    /// Returns `false` if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    pub fn publish(&mut self, event: &ChangeEvent) {
        for subscriber in &mut self.subscribers {
            if subscriber.topic.matches(&event.key) {
                (subscriber.callback)(event);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus")
            .field(
                "topics",
                &self.subscribers.iter().map(|s| &s.topic).collect::<Vec<_>>(),
            )
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recorder(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> impl FnMut(&ChangeEvent) + Send {
        let log = Arc::clone(log);
        move |event: &ChangeEvent| log.lock().unwrap().push(format!("{tag}:{}", event.key))
    }

    #[test]
    fn test_delivery_order_and_topics() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = ChangeBus::new();
        bus.subscribe(Topic::All, recorder(&log, "all"));
        bus.subscribe(Topic::key("a"), recorder(&log, "a"));
        bus.subscribe(Topic::All, recorder(&log, "all2"));

        bus.publish(&ChangeEvent::reloaded("a"));
        bus.publish(&ChangeEvent::reloaded("b"));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["all:a", "a:a", "all2:a", "all:b", "all2:b"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut bus = ChangeBus::new();
        let id = bus.subscribe(Topic::All, recorder(&log, "x"));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&ChangeEvent::changed("k", Value::None, Value::Bool(true)));
        assert!(log.lock().unwrap().is_empty());
        assert!(bus.is_empty());
    }

    #[test]
    fn test_reload_event() {
        assert!(ChangeEvent::reloaded("k").is_reload());
        assert!(!ChangeEvent::changed("k", Value::None, Value::None).is_reload());
    }
}

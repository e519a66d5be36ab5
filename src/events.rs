// src/events.rs

//! Topic → subscriber registry for SAM CLI output.
//!
//! The supervisor publishes raw stdout chunks on [`Topic::Data`] and stderr
//! chunks (plus unexpected-exit notices) on [`Topic::Error`]. Emission is a
//! synchronous fan-out over a snapshot of the subscriber list, so callbacks
//! may subscribe or unsubscribe without deadlocking.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::exec::OutputSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    Data,
    Error,
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Data => f.write_str("data"),
            Topic::Error => f.write_str("error"),
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "data" => Ok(Topic::Data),
            "error" => Ok(Topic::Error),
            other => Err(format!(
                "invalid topic: {other} (expected \"data\" or \"error\")"
            )),
        }
    }
}

pub type Callback = Arc<dyn Fn(&[u8]) + Send + Sync>;

/// Returned by [`EventBus::subscribe`]; pass it to `unsubscribe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: AtomicU64,
    subscribers: Mutex<HashMap<Topic, Vec<(SubscriptionId, Callback)>>>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("data", &self.subscriber_count(Topic::Data))
            .field("error", &self.subscriber_count(Topic::Error))
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Topic, Vec<(SubscriptionId, Callback)>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&[u8]) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock()
            .entry(topic)
            .or_default()
            .push((id, Arc::new(callback)));
        id
    }

    /// Returns `false` if `id` was not subscribed to `topic`.
    pub fn unsubscribe(&self, topic: Topic, id: SubscriptionId) -> bool {
        let mut subs = self.lock();
        let Some(list) = subs.get_mut(&topic) else {
            return false;
        };
        let before = list.len();
        list.retain(|(sub_id, _)| *sub_id != id);
        before != list.len()
    }

    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.lock().get(&topic).map_or(0, Vec::len)
    }

    pub fn publish(&self, topic: Topic, chunk: &[u8]) {
        let callbacks: Vec<Callback> = self
            .lock()
            .get(&topic)
            .map(|list| list.iter().map(|(_, cb)| Arc::clone(cb)).collect())
            .unwrap_or_default();

        for callback in callbacks {
            callback(chunk);
        }
    }
}

impl OutputSink for EventBus {
    fn emit(&self, topic: Topic, chunk: &[u8]) {
        self.publish(topic, chunk);
    }
}

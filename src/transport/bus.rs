//! In-process topic bus.

use crate::error::{OverlayError, Result};
use crate::types::{validate_topic, Message, OverflowPolicy};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use super::types::{Inbox, Publisher, QueueOptions, SubscriptionId};

/// Type-erased payload as carried between publishers and inboxes.
pub(crate) type Payload = Arc<dyn Any + Send + Sync>;

/// Internal subscription state.
struct Subscription {
    sender: Sender<Payload>,
    /// Kept to evict the oldest payload when the queue is full.
    receiver: Receiver<Payload>,
    overflow: OverflowPolicy,
    dropped: Arc<AtomicU64>,
}

impl Subscription {
    /// Queue a payload, applying the overflow policy. Returns whether the
    /// payload ended up in the queue.
    fn offer(&self, payload: Payload) -> bool {
        let payload = match self.sender.try_send(payload) {
            Ok(()) => return true,
            // The receiver clone above keeps the channel connected
            Err(TrySendError::Disconnected(_)) => return false,
            Err(TrySendError::Full(payload)) => payload,
        };

        self.dropped.fetch_add(1, Ordering::Relaxed);
        if self.overflow == OverflowPolicy::DropNewest {
            return false;
        }

        let _ = self.receiver.try_recv();
        // Another publisher may have refilled the slot
        self.sender.try_send(payload).is_ok()
    }
}

#[derive(Default)]
struct TopicEntry {
    /// Set by the first publisher, cleared when the last one leaves.
    datatype: Option<&'static str>,
    publishers: usize,
    subscriptions: HashMap<SubscriptionId, Subscription>,
}

impl TopicEntry {
    fn is_unused(&self) -> bool {
        self.publishers == 0 && self.subscriptions.is_empty()
    }
}

struct BusInner {
    topics: RwLock<HashMap<String, TopicEntry>>,
    next_id: AtomicU64,
}

/// Topic-addressed publish/subscribe between threads of one process.
///
/// Cloning is cheap; clones share the same topics.
#[derive(Clone)]
pub struct Bus {
    inner: Arc<BusInner>,
}

/// Resolve a relative topic name against the root namespace.
pub(crate) fn resolve_topic(topic: &str) -> Result<String> {
    validate_topic(topic)?;
    if topic.starts_with('/') || topic.starts_with('~') {
        Ok(topic.to_string())
    } else {
        Ok(format!("/{}", topic))
    }
}

impl Bus {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(BusInner {
                topics: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Subscribe to `topic` with a bounded inbound queue.
    ///
    /// Fails if the name is malformed or the topic is advertised with a
    /// different datatype.
    pub fn subscribe<M: Message>(&self, topic: &str, options: QueueOptions) -> Result<Inbox<M>> {
        let topic = resolve_topic(topic)?;
        if options.queue_size == 0 {
            return Err(OverlayError::InvalidConfig(
                "queue_size must be at least 1".to_string(),
            ));
        }

        let mut topics = self.inner.topics.write();
        let entry = topics.entry(topic.clone()).or_default();

        if let Some(datatype) = entry.datatype {
            if datatype != M::DATATYPE {
                return Err(OverlayError::TypeMismatch {
                    topic,
                    expected: datatype.to_string(),
                    got: M::DATATYPE.to_string(),
                });
            }
        }

        let id = SubscriptionId(self.inner.next_id.fetch_add(1, Ordering::SeqCst));
        let (sender, receiver) = bounded(options.queue_size);
        let dropped = Arc::new(AtomicU64::new(0));

        entry.subscriptions.insert(
            id,
            Subscription {
                sender,
                receiver: receiver.clone(),
                overflow: options.overflow,
                dropped: Arc::clone(&dropped),
            },
        );

        tracing::debug!(topic = %topic, id = %id, datatype = M::DATATYPE, "Subscribed");

        Ok(Inbox {
            id,
            topic,
            receiver,
            dropped,
            bus: self.clone(),
            _marker: PhantomData,
        })
    }

    /// Remove a subscription. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut topics = self.inner.topics.write();

        let found = topics
            .iter_mut()
            .find_map(|(name, entry)| entry.subscriptions.remove(&id).map(|_| name.clone()));

        match found {
            Some(topic) => {
                if topics.get(&topic).is_some_and(TopicEntry::is_unused) {
                    topics.remove(&topic);
                }
                tracing::debug!(topic = %topic, id = %id, "Unsubscribed");
                true
            }
            None => false,
        }
    }

    /// Start publishing `M` on `topic`.
    pub fn advertise<M: Message>(&self, topic: &str) -> Result<Publisher<M>> {
        let topic = resolve_topic(topic)?;

        let mut topics = self.inner.topics.write();
        let entry = topics.entry(topic.clone()).or_default();

        match entry.datatype {
            Some(datatype) if datatype != M::DATATYPE => {
                return Err(OverlayError::TypeMismatch {
                    topic,
                    expected: datatype.to_string(),
                    got: M::DATATYPE.to_string(),
                });
            }
            _ => {
                entry.datatype = Some(M::DATATYPE);
                entry.publishers += 1;
            }
        }

        Ok(Publisher {
            topic,
            bus: self.clone(),
            _marker: PhantomData,
        })
    }

    pub(crate) fn unadvertise(&self, topic: &str) {
        let mut topics = self.inner.topics.write();
        if let Some(entry) = topics.get_mut(topic) {
            entry.publishers = entry.publishers.saturating_sub(1);
            if entry.publishers == 0 {
                entry.datatype = None;
            }
            if entry.is_unused() {
                topics.remove(topic);
            }
        }
    }

    /// Deliver a payload to every subscription of `topic`. Returns how many
    /// queued it.
    pub(crate) fn broadcast(&self, topic: &str, payload: Payload) -> usize {
        let topics = self.inner.topics.read();
        let Some(entry) = topics.get(topic) else {
            return 0;
        };

        entry
            .subscriptions
            .values()
            .filter(|sub| sub.offer(Arc::clone(&payload)))
            .count()
    }

    /// Number of live subscriptions on `topic`.
    pub fn subscription_count(&self, topic: &str) -> usize {
        let Ok(topic) = resolve_topic(topic) else {
            return 0;
        };
        self.inner
            .topics
            .read()
            .get(&topic)
            .map_or(0, |entry| entry.subscriptions.len())
    }

    /// Advertised topics and their datatypes, sorted by name.
    pub fn advertised_topics(&self) -> Vec<(String, &'static str)> {
        let mut out: Vec<_> = self
            .inner
            .topics
            .read()
            .iter()
            .filter_map(|(name, entry)| entry.datatype.map(|dt| (name.clone(), dt)))
            .collect();
        out.sort();
        out
    }

    /// Advertised topics carrying `datatype`, for topic pickers.
    pub fn topics_with_datatype(&self, datatype: &str) -> Vec<String> {
        self.advertised_topics()
            .into_iter()
            .filter(|(_, dt)| *dt == datatype)
            .map(|(name, _)| name)
            .collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

//! Handles returned by the bus.

use super::bus::{Bus, Payload};
use crate::types::{Message, OverflowPolicy};
use crossbeam_channel::Receiver;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default inbound queue length per subscription.
pub const DEFAULT_QUEUE_SIZE: usize = 10;

/// Unique identifier for a bus subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(pub u64);

impl fmt::Debug for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SubscriptionId({})", self.0)
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inbound queue options for one subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueOptions {
    /// Max buffered payloads.
    /// Default: 10
    pub queue_size: usize,

    /// What happens to a payload arriving at a full queue.
    pub overflow: OverflowPolicy,
}

impl Default for QueueOptions {
    fn default() -> Self {
        Self {
            queue_size: DEFAULT_QUEUE_SIZE,
            overflow: OverflowPolicy::default(),
        }
    }
}

/// Receiving end of a bus subscription.
///
/// Each received item is a payload handle: `Some` for a payload of type `M`,
/// `None` when the bus carried something that is not an `M`. Dropping the
/// inbox unsubscribes.
pub struct Inbox<M: Message> {
    pub(crate) id: SubscriptionId,
    pub(crate) topic: String,
    pub(crate) receiver: Receiver<Payload>,
    pub(crate) dropped: Arc<AtomicU64>,
    pub(crate) bus: Bus,
    pub(crate) _marker: PhantomData<fn() -> M>,
}

impl<M: Message> Inbox<M> {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Resolved topic name.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Take the next payload handle, if any (non-blocking).
    pub fn try_recv(&self) -> Option<Option<Arc<M>>> {
        self.receiver
            .try_recv()
            .ok()
            .map(|payload| payload.downcast::<M>().ok())
    }

    /// Take every payload handle currently buffered.
    pub fn drain(&self) -> Vec<Option<Arc<M>>> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }

    /// Discard everything buffered. Returns how many payloads were dropped.
    pub fn clear(&self) -> usize {
        self.receiver.try_iter().count()
    }

    /// Payloads lost to queue overflow so far.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<M: Message> Drop for Inbox<M> {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.id);
    }
}

impl<M: Message> fmt::Debug for Inbox<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inbox")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("datatype", &M::DATATYPE)
            .finish()
    }
}

/// Sending end for one topic.
///
/// The first publisher of a topic fixes its datatype until every publisher
/// of that topic is dropped.
pub struct Publisher<M: Message> {
    pub(crate) topic: String,
    pub(crate) bus: Bus,
    pub(crate) _marker: PhantomData<fn(M)>,
}

impl<M: Message> Publisher<M> {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Publish a payload. Returns how many subscriptions queued it.
    pub fn publish(&self, message: M) -> usize {
        self.publish_arc(Arc::new(message))
    }

    /// Publish an already shared payload.
    pub fn publish_arc(&self, message: Arc<M>) -> usize {
        self.bus.broadcast(&self.topic, message)
    }
}

impl<M: Message> Drop for Publisher<M> {
    fn drop(&mut self) {
        self.bus.unadvertise(&self.topic);
    }
}

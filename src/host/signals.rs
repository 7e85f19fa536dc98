//! Host notification fan-out.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::RwLock;

/// Change notifications a host delivers to its subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HostEvent {
    /// The overlay's state (visibility included) changed.
    OverlayChanged,
    /// The host's global reference frame changed.
    FixedFrameChanged,
    /// The topic property named `property` was edited to `topic`.
    TopicEdited { property: String, topic: String },
}

impl HostEvent {
    pub fn topic_edited(property: impl Into<String>, topic: impl Into<String>) -> Self {
        HostEvent::TopicEdited {
            property: property.into(),
            topic: topic.into(),
        }
    }
}

/// Broadcasts host notifications to every connected listener.
///
/// Listeners receive on their own channel and process events on the
/// thread that owns them; `emit` never blocks.
pub struct SignalHub {
    listeners: RwLock<Vec<Sender<HostEvent>>>,
}

impl SignalHub {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Connect a new listener.
    pub fn connect(&self) -> Receiver<HostEvent> {
        let (sender, receiver) = unbounded();
        self.listeners.write().push(sender);
        receiver
    }

    /// Deliver `event` to all connected listeners. Listeners whose receiver
    /// was dropped are removed.
    pub fn emit(&self, event: HostEvent) {
        self.listeners
            .write()
            .retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Number of connected listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }
}

impl Default for SignalHub {
    fn default() -> Self {
        Self::new()
    }
}

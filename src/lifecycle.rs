//! Payload-independent lifecycle shared by all subscribers.
//!
//! [`Lifecycle`] owns the editable topic property and the connection to the
//! host's notifications. It turns host events into [`Hook`]s, which the
//! owning subscriber runs through its [`LifecycleHooks`] implementation.

use crate::host::{DisplayContext, HostEvent};
use crossbeam_channel::Receiver;

/// The editable topic setting of one subscriber.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TopicProperty {
    name: String,
    value: String,
    message_type: String,
    description: String,
}

impl TopicProperty {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            message_type: String::new(),
            description: String::new(),
        }
    }

    /// Label the host shows for this property. Also keys status entries.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current topic name. Empty until the host edits it.
    pub fn topic(&self) -> &str {
        &self.value
    }

    /// Payload-type tag used by the host to filter candidate topics.
    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_message_type(&mut self, message_type: &str) {
        self.message_type = message_type.to_string();
        self.description = format!("{} topic to subscribe to.", message_type);
    }

    /// Returns false if `topic` equals the current value.
    fn set_topic(&mut self, topic: String) -> bool {
        if self.value == topic {
            return false;
        }
        self.value = topic;
        true
    }
}

/// What a host notification asks a subscriber to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Hook {
    TopicChanged,
    EnabledChanged,
    FrameChanged,
}

/// Reactions to host notifications.
pub trait LifecycleHooks {
    /// The topic property now holds a different topic.
    fn on_topic_changed(&mut self);

    /// The overlay's visibility may have changed.
    fn on_enabled_changed(&mut self);

    /// The host's global reference frame changed.
    fn on_frame_changed(&mut self);

    /// Run the hook matching `hook`.
    fn dispatch(&mut self, hook: Hook) {
        match hook {
            Hook::TopicChanged => self.on_topic_changed(),
            Hook::EnabledChanged => self.on_enabled_changed(),
            Hook::FrameChanged => self.on_frame_changed(),
        }
    }
}

/// Topic property plus the host notification connection.
pub struct Lifecycle {
    topic: TopicProperty,
    events: Receiver<HostEvent>,
}

impl Lifecycle {
    /// Connect to the host's notifications. Must happen before the host
    /// emits anything this subscriber should see.
    pub fn initialize(ctx: &DisplayContext<'_>, property_name: impl Into<String>) -> Self {
        Self {
            topic: TopicProperty::new(property_name),
            events: ctx.signals.connect(),
        }
    }

    pub fn topic(&self) -> &TopicProperty {
        &self.topic
    }

    pub fn topic_mut(&mut self) -> &mut TopicProperty {
        &mut self.topic
    }

    /// Take the next hook to run, applying topic edits on the way.
    ///
    /// Edits addressed to other properties and edits that leave the topic
    /// unchanged produce no hook.
    pub fn next_hook(&mut self) -> Option<Hook> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                HostEvent::OverlayChanged => return Some(Hook::EnabledChanged),
                HostEvent::FixedFrameChanged => return Some(Hook::FrameChanged),
                HostEvent::TopicEdited { property, topic } => {
                    if property == self.topic.name && self.topic.set_topic(topic) {
                        return Some(Hook::TopicChanged);
                    }
                }
            }
        }
        None
    }
}

//! Frame-filtered subscriber for one payload type.

use crate::filter::{FilterStats, FrameFilter};
use crate::host::DisplayContext;
use crate::lifecycle::{Lifecycle, LifecycleHooks, TopicProperty};
use crate::transport::{resolve_topic, Bus, Inbox};
use crate::types::{Message, StatusLevel};
use std::sync::Arc;

use super::config::SubscriberConfig;

/// Subscribes to one topic of `M`, holds payloads back until their frame
/// resolves against the host's fixed frame, and hands admitted payloads to
/// a callback.
///
/// All state changes happen on the thread that calls
/// [`spin_once`](Self::spin_once) or one of the public operations. The host
/// context is borrowed for `'h` and must outlive the subscriber.
pub struct FilteredSubscriber<'h, M: Message> {
    lifecycle: Lifecycle,
    ctx: DisplayContext<'h>,
    bus: Bus,
    config: SubscriberConfig,

    /// Live transport binding, if any.
    inbox: Option<Inbox<M>>,
    filter: FrameFilter<M>,

    /// Mirrors the overlay's visibility.
    enabled: bool,
    /// Admitted payloads since the last reset.
    messages_received: u64,

    callback: Box<dyn FnMut(Arc<M>) + 'h>,
}

impl<'h, M: Message> FilteredSubscriber<'h, M> {
    /// Create a subscriber with the default configuration.
    ///
    /// `label` names the topic property and keys the status entries this
    /// subscriber reports.
    pub fn new<F>(label: impl Into<String>, ctx: DisplayContext<'h>, bus: &Bus, callback: F) -> Self
    where
        F: FnMut(Arc<M>) + 'h,
    {
        Self::with_config(label, ctx, bus, SubscriberConfig::default(), callback)
    }

    /// Create a subscriber with a custom configuration.
    pub fn with_config<F>(
        label: impl Into<String>,
        ctx: DisplayContext<'h>,
        bus: &Bus,
        config: SubscriberConfig,
        callback: F,
    ) -> Self
    where
        F: FnMut(Arc<M>) + 'h,
    {
        let label = label.into();

        let mut lifecycle = Lifecycle::initialize(&ctx, label.clone());
        lifecycle.topic_mut().set_message_type(M::DATATYPE);

        let filter = FrameFilter::new(
            label.clone(),
            ctx.frames.fixed_frame(),
            config.filter_capacity,
            config.overflow,
        );
        ctx.frames.register_status_check(&label);

        let mut subscriber = Self {
            lifecycle,
            ctx,
            bus: bus.clone(),
            config,
            inbox: None,
            filter,
            enabled: false,
            messages_received: 0,
            callback: Box::new(callback),
        };

        subscriber.set_enabled(ctx.overlay.is_enabled());
        subscriber.on_topic_changed();
        subscriber.on_frame_changed();

        subscriber
    }

    /// Set the enabled flag. Enabling subscribes; disabling unsubscribes and
    /// discards anything still held back, so nothing queued while visible is
    /// delivered after the overlay is hidden.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if enabled {
            self.subscribe();
        } else {
            self.unsubscribe();
            self.reset();
        }
    }

    /// Drop everything held back by the filter or buffered by the transport
    /// and zero the received counter.
    pub fn reset(&mut self) {
        self.filter.clear();
        if let Some(inbox) = &self.inbox {
            inbox.clear();
        }
        self.messages_received = 0;
    }

    /// Bind the transport to the current topic.
    ///
    /// Does nothing while disabled or when already bound to that topic. A new
    /// binding starts the received counter from zero. Failures are reported as an error status under the property label and
    /// leave the subscriber unbound until the next topic edit or enable.
    pub fn subscribe(&mut self) {
        if !self.enabled {
            return;
        }

        let topic = self.lifecycle.topic().topic().to_string();
        let label = self.label().to_string();

        if topic.is_empty() {
            self.unsubscribe();
            self.ctx.overlay.set_status(StatusLevel::Ok, &label, "OK");
            return;
        }

        if let (Some(inbox), Ok(resolved)) = (&self.inbox, resolve_topic(&topic)) {
            if inbox.topic() == resolved {
                return;
            }
        }
        self.unsubscribe();

        tracing::debug!(property = %label, topic = %topic, "Subscribing");

        match self.bus.subscribe::<M>(&topic, self.config.queue_options()) {
            Ok(inbox) => {
                self.inbox = Some(inbox);
                self.messages_received = 0;
                self.ctx.overlay.set_status(StatusLevel::Ok, &label, "OK");
            }
            Err(e) => {
                tracing::warn!(property = %label, topic = %topic, error = %e, "Subscribe failed");
                self.ctx.overlay.set_status(
                    StatusLevel::Error,
                    &label,
                    &format!("Error subscribing: {}", e),
                );
            }
        }
    }

    /// Release the transport binding, if any.
    pub fn unsubscribe(&mut self) {
        if let Some(inbox) = self.inbox.take() {
            tracing::debug!(property = %self.label(), topic = %inbox.topic(), "Unsubscribing");
        }
    }

    /// Run pending host notifications, then filter and deliver whatever the
    /// transport has buffered. Returns how many payloads were admitted.
    pub fn spin_once(&mut self) -> usize {
        while let Some(hook) = self.lifecycle.next_hook() {
            self.dispatch(hook);
        }

        if !self.enabled {
            return 0;
        }
        let Some(inbox) = &self.inbox else {
            return 0;
        };
        let handles = inbox.drain();

        let mut admitted = 0;

        for message in self.filter.release(self.ctx.frames) {
            if self.admit(Some(message)) {
                admitted += 1;
            }
        }

        for handle in handles {
            let ready = match handle {
                Some(message) => self.filter.add(message, self.ctx.frames),
                None => None,
            };
            if self.admit(ready) {
                admitted += 1;
            }
        }

        admitted
    }

    /// Count, report and deliver one payload that passed the filter.
    fn admit(&mut self, handle: Option<Arc<M>>) -> bool {
        let Some(message) = handle.filter(|m| m.is_valid()) else {
            return false;
        };

        self.messages_received += 1;
        self.ctx.overlay.set_status(
            StatusLevel::Ok,
            self.lifecycle.topic().name(),
            &format!("{} messages received", self.messages_received),
        );
        tracing::trace!(
            property = %self.label(),
            frame = %message.frame_id(),
            count = self.messages_received,
            "Admitted message"
        );

        (self.callback)(message);
        true
    }

    // --- Queries ---

    /// Property label, also the status key.
    pub fn label(&self) -> &str {
        self.lifecycle.topic().name()
    }

    pub fn property(&self) -> &TopicProperty {
        self.lifecycle.topic()
    }

    /// Topic currently configured on the property.
    pub fn topic(&self) -> &str {
        self.lifecycle.topic().topic()
    }

    /// Resolved topic of the live transport binding.
    pub fn subscribed_topic(&self) -> Option<&str> {
        self.inbox.as_ref().map(|inbox| inbox.topic())
    }

    pub fn is_subscribed(&self) -> bool {
        self.inbox.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Payloads admitted since the last reset.
    pub fn messages_received(&self) -> u64 {
        self.messages_received
    }

    pub fn target_frame(&self) -> &str {
        self.filter.target_frame()
    }

    /// Payloads held back by the filter.
    pub fn pending(&self) -> usize {
        self.filter.pending()
    }

    pub fn filter_stats(&self) -> FilterStats {
        self.filter.stats()
    }
}

impl<M: Message> LifecycleHooks for FilteredSubscriber<'_, M> {
    fn on_topic_changed(&mut self) {
        tracing::debug!(property = %self.label(), topic = %self.topic(), "Topic changed");
        self.unsubscribe();
        self.reset();
        self.subscribe();
        self.ctx.overlay.queue_render();
    }

    fn on_enabled_changed(&mut self) {
        let enabled = self.ctx.overlay.is_enabled();
        tracing::debug!(property = %self.label(), enabled, "Overlay enable changed");
        self.set_enabled(enabled);
    }

    fn on_frame_changed(&mut self) {
        let frame = self.ctx.frames.fixed_frame();
        tracing::debug!(property = %self.label(), frame = %frame, "Fixed frame changed");
        self.filter.set_target_frame(frame);
        self.reset();
    }
}

impl<M: Message> Drop for FilteredSubscriber<'_, M> {
    fn drop(&mut self) {
        self.unsubscribe();
        self.ctx.overlay.delete_status(self.lifecycle.topic().name());
    }
}

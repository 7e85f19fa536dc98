//! Topic subscribers for overlays.
//!
//! A [`FilteredSubscriber`] ties together:
//! - the topic property and host notifications ([`Lifecycle`](crate::Lifecycle))
//! - one transport binding on the [`Bus`](crate::Bus)
//! - a [`FrameFilter`](crate::FrameFilter) targeting the host's fixed frame
//! - a callback that receives every admitted payload
//!
//! # Example
//!
//! ```ignore
//! let ctx = DisplayContext::new(&overlay, &frames, &signals);
//! let mut tracks = FilteredSubscriber::<PersonTrack>::new("Tracks topic", ctx, &bus, |track| {
//!     scene.update_track(&track);
//! });
//!
//! signals.emit(HostEvent::topic_edited("Tracks topic", "/tracks"));
//!
//! // On the host's event thread
//! loop {
//!     tracks.spin_once();
//! }
//! ```

mod config;
mod filtered;

pub use config::SubscriberConfig;
pub use filtered::FilteredSubscriber;

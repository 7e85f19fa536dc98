//! # Topic Overlay
//!
//! Reusable plumbing for visualization overlays fed by a message stream.
//!
//! ## Core Concepts
//!
//! - **Topic property**: an editable topic name, tagged with the payload type
//! - **Bus**: topic-addressed transport with bounded per-subscription queues
//! - **Frame filter**: holds payloads back until their frame resolves
//! - **Filtered subscriber**: reacts to topic edits, overlay visibility and
//!   fixed-frame changes, and delivers admitted payloads to a callback
//!
//! ## Example
//!
//! ```ignore
//! use topic_overlay::{Bus, DisplayContext, FilteredSubscriber, HostEvent, SignalHub};
//! use topic_overlay::host::memory::{OverlayState, StaticFrames};
//!
//! let overlay = OverlayState::new(true);
//! let frames = StaticFrames::new("map");
//! let signals = SignalHub::new();
//! let bus = Bus::new();
//!
//! let ctx = DisplayContext::new(&overlay, &frames, &signals);
//! let mut people = FilteredSubscriber::<PersonTrack>::new("People topic", ctx, &bus, |track| {
//!     println!("Track {} in {}", track.id, track.frame_id());
//! });
//!
//! signals.emit(HostEvent::topic_edited("People topic", "/people/tracks"));
//! people.spin_once();
//! ```

pub mod error;
pub mod filter;
pub mod host;
pub mod lifecycle;
pub mod subscriber;
pub mod transport;
pub mod types;

// Re-exports
pub use error::{OverlayError, Result};
pub use filter::{FilterStats, FrameFilter, DEFAULT_FILTER_CAPACITY};
pub use host::{DisplayContext, FrameService, HostEvent, Overlay, SignalHub};
pub use lifecycle::{Hook, Lifecycle, LifecycleHooks, TopicProperty};
pub use subscriber::{FilteredSubscriber, SubscriberConfig};
pub use transport::{Bus, Inbox, Publisher, QueueOptions, SubscriptionId, DEFAULT_QUEUE_SIZE};
pub use types::*;

//! Topic transport between publishers and subscribers.
//!
//! A [`Bus`] moves payloads from [`Publisher`]s to [`Inbox`]es by topic
//! name. Publishing never blocks:
//! - every subscription has its own bounded queue
//! - a full queue applies the subscription's [`OverflowPolicy`](crate::OverflowPolicy)
//! - payloads are only handed out when the owner of the inbox asks for them,
//!   so delivery happens on the owner's thread
//!
//! # Example
//!
//! ```ignore
//! let bus = Bus::new();
//! let inbox = bus.subscribe::<PersonTrack>("/tracks", QueueOptions::default())?;
//! let publisher = bus.advertise::<PersonTrack>("/tracks")?;
//!
//! publisher.publish(track);
//! for payload in inbox.drain().into_iter().flatten() {
//!     println!("Got track in {}", payload.frame_id());
//! }
//! ```

mod bus;
mod types;

pub use bus::Bus;
pub(crate) use bus::resolve_topic;
pub use types::{Inbox, Publisher, QueueOptions, SubscriptionId, DEFAULT_QUEUE_SIZE};

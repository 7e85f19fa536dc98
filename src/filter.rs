//! Frame-resolvability filter.
//!
//! Holds payloads back until the frame they claim can be transformed into
//! the target frame. Payloads that never resolve age out of a bounded
//! pending queue.

use crate::host::FrameService;
use crate::types::{Message, OverflowPolicy};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;

/// Default number of payloads held back per filter.
pub const DEFAULT_FILTER_CAPACITY: usize = 10;

/// Counters kept by a [`FrameFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterStats {
    /// Payloads passed on because their frame was resolvable.
    pub released: u64,
    /// Payloads lost to the pending queue bound.
    pub overflowed: u64,
    /// Payloads discarded by [`FrameFilter::clear`].
    pub cleared: u64,
}

/// Gate between a transport inbox and an admission handler.
pub struct FrameFilter<M: Message> {
    label: String,
    target: String,
    capacity: usize,
    overflow: OverflowPolicy,
    pending: VecDeque<Arc<M>>,
    stats: FilterStats,
}

impl<M: Message> FrameFilter<M> {
    /// Create a filter for `label` targeting `target`.
    ///
    /// A `capacity` of zero disables holding back: unresolvable payloads are
    /// dropped on arrival.
    pub fn new(
        label: impl Into<String>,
        target: impl Into<String>,
        capacity: usize,
        overflow: OverflowPolicy,
    ) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
            capacity,
            overflow,
            pending: VecDeque::with_capacity(capacity),
            stats: FilterStats::default(),
        }
    }

    pub fn target_frame(&self) -> &str {
        &self.target
    }

    /// Retarget the filter. Pending payloads stay queued; callers decide
    /// whether to [`clear`](Self::clear) them.
    pub fn set_target_frame(&mut self, target: impl Into<String>) {
        self.target = target.into();
    }

    /// Offer a payload. Returns it straight back if its frame resolves now,
    /// otherwise holds it back.
    ///
    /// Payload validity is not checked here. An invalid payload whose frame
    /// does not resolve still takes a queue slot and can evict a valid one,
    /// which is reported through [`FrameService::transform_failed`].
    pub fn add(&mut self, message: Arc<M>, frames: &dyn FrameService) -> Option<Arc<M>> {
        if frames.can_transform(&self.target, message.frame_id()) {
            self.stats.released += 1;
            return Some(message);
        }

        if self.pending.len() < self.capacity {
            self.pending.push_back(message);
            return None;
        }

        self.stats.overflowed += 1;
        let evicted = match self.overflow {
            OverflowPolicy::DropNewest => message,
            OverflowPolicy::DropOldest => match self.pending.pop_front() {
                Some(oldest) => {
                    self.pending.push_back(message);
                    oldest
                }
                None => message,
            },
        };

        tracing::debug!(
            property = %self.label,
            frame = %evicted.frame_id(),
            target = %self.target,
            "Dropped message waiting for transform"
        );
        frames.transform_failed(&self.label, evicted.frame_id(), &self.target);

        None
    }

    /// Take every pending payload whose frame resolves now, oldest first.
    pub fn release(&mut self, frames: &dyn FrameService) -> Vec<Arc<M>> {
        let mut released = Vec::new();

        self.pending.retain(|message| {
            if frames.can_transform(&self.target, message.frame_id()) {
                released.push(Arc::clone(message));
                false
            } else {
                true
            }
        });

        self.stats.released += released.len() as u64;
        released
    }

    /// Discard all pending payloads.
    pub fn clear(&mut self) {
        self.stats.cleared += self.pending.len() as u64;
        self.pending.clear();
    }

    /// Number of payloads held back.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn stats(&self) -> FilterStats {
        self.stats
    }
}

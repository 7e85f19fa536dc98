//! In-process host implementations.
//!
//! Enough of a host to drive subscribers without a rendering front end:
//! an overlay that records its status entries and a frame service backed by
//! a static set of transforms.

use super::{FrameService, Overlay};
use crate::types::{Status, StatusLevel};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Overlay state kept in memory.
pub struct OverlayState {
    enabled: AtomicBool,
    statuses: RwLock<BTreeMap<String, Status>>,
    render_requests: AtomicU64,
}

impl OverlayState {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
            statuses: RwLock::new(BTreeMap::new()),
            render_requests: AtomicU64::new(0),
        }
    }

    /// Change visibility. Callers still have to emit
    /// [`HostEvent::OverlayChanged`](super::HostEvent::OverlayChanged).
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Current status entry for `name`.
    pub fn status(&self, name: &str) -> Option<Status> {
        self.statuses.read().get(name).cloned()
    }

    /// All status entries, ordered by name.
    pub fn statuses(&self) -> BTreeMap<String, Status> {
        self.statuses.read().clone()
    }

    /// How many redraws were requested so far.
    pub fn render_requests(&self) -> u64 {
        self.render_requests.load(Ordering::SeqCst)
    }
}

impl Overlay for OverlayState {
    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    fn set_status(&self, level: StatusLevel, name: &str, detail: &str) {
        self.statuses.write().insert(
            name.to_string(),
            Status {
                level,
                detail: detail.to_string(),
            },
        );
    }

    fn delete_status(&self, name: &str) {
        self.statuses.write().remove(name);
    }

    fn queue_render(&self) {
        self.render_requests.fetch_add(1, Ordering::SeqCst);
    }
}

/// Frame service over a static set of transforms.
///
/// A frame resolves into a target if it is the target itself or a transform
/// between the two was added with [`StaticFrames::add_transform`], in either
/// direction.
pub struct StaticFrames {
    fixed: RwLock<String>,
    transforms: RwLock<HashSet<(String, String)>>,
    failures: RwLock<Vec<(String, String, String)>>,
}

impl StaticFrames {
    pub fn new(fixed_frame: impl Into<String>) -> Self {
        Self {
            fixed: RwLock::new(fixed_frame.into()),
            transforms: RwLock::new(HashSet::new()),
            failures: RwLock::new(Vec::new()),
        }
    }

    /// Change the fixed frame. Callers still have to emit
    /// [`HostEvent::FixedFrameChanged`](super::HostEvent::FixedFrameChanged).
    pub fn set_fixed_frame(&self, frame: impl Into<String>) {
        *self.fixed.write() = frame.into();
    }

    /// Make `child` resolvable into `parent` and back.
    pub fn add_transform(&self, parent: impl Into<String>, child: impl Into<String>) {
        self.transforms.write().insert((parent.into(), child.into()));
    }

    pub fn remove_transform(&self, parent: &str, child: &str) {
        self.transforms
            .write()
            .remove(&(parent.to_string(), child.to_string()));
    }

    /// Reported transform failures as `(label, source, target)`.
    pub fn failures(&self) -> Vec<(String, String, String)> {
        self.failures.read().clone()
    }
}

impl FrameService for StaticFrames {
    fn fixed_frame(&self) -> String {
        self.fixed.read().clone()
    }

    fn can_transform(&self, target: &str, source: &str) -> bool {
        if target == source {
            return true;
        }
        let transforms = self.transforms.read();
        transforms.contains(&(target.to_string(), source.to_string()))
            || transforms.contains(&(source.to_string(), target.to_string()))
    }

    fn transform_failed(&self, label: &str, source: &str, target: &str) {
        self.failures
            .write()
            .push((label.to_string(), source.to_string(), target.to_string()));
    }
}

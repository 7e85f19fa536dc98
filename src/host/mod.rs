//! Host collaborators consumed by subscribers.
//!
//! The host owns the overlay, the reference-frame service and the
//! notification hub. Subscribers hold plain references to them for their
//! whole lifetime, so the host must outlive every subscriber it creates.
//!
//! Reference implementations for in-process hosts and tests live in
//! [`memory`].

pub mod memory;
mod signals;

pub use signals::{HostEvent, SignalHub};

use crate::types::StatusLevel;

/// The overlay a subscriber feeds.
pub trait Overlay {
    /// Current visibility of the overlay.
    fn is_enabled(&self) -> bool;

    /// Set the status entry `name` to `level` with free-text `detail`.
    fn set_status(&self, level: StatusLevel, name: &str, detail: &str);

    /// Remove the status entry `name`.
    fn delete_status(&self, _name: &str) {}

    /// Ask the host to redraw at its next opportunity.
    fn queue_render(&self) {}
}

/// Reference-frame resolution provided by the host.
pub trait FrameService {
    /// The host's current global (fixed) frame.
    fn fixed_frame(&self) -> String;

    /// Whether a transform from `source` into `target` is currently known.
    fn can_transform(&self, target: &str, source: &str) -> bool;

    /// Register `label` for transform diagnostics. Informational only.
    fn register_status_check(&self, _label: &str) {}

    /// A pending message for `label` aged out without its frame becoming
    /// resolvable. Informational only.
    fn transform_failed(&self, _label: &str, _source: &str, _target: &str) {}
}

/// Everything a subscriber borrows from the host.
#[derive(Clone, Copy)]
pub struct DisplayContext<'h> {
    pub overlay: &'h dyn Overlay,
    pub frames: &'h dyn FrameService,
    pub signals: &'h SignalHub,
}

impl<'h> DisplayContext<'h> {
    pub fn new(
        overlay: &'h dyn Overlay,
        frames: &'h dyn FrameService,
        signals: &'h SignalHub,
    ) -> Self {
        Self {
            overlay,
            frames,
            signals,
        }
    }
}

//! Core types shared by the transport, filter and subscriber.

use crate::error::{OverlayError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A message payload that claims a spatial reference frame.
///
/// The subscriber never looks past `frame_id` and `is_valid`; everything
/// else about the payload belongs to the caller's callback.
pub trait Message: Send + Sync + 'static {
    /// Payload-type tag, shown by hosts when listing candidate topics.
    const DATATYPE: &'static str;

    /// Frame the payload is expressed in.
    fn frame_id(&self) -> &str;

    /// Whether the payload is usable at all.
    fn is_valid(&self) -> bool {
        true
    }
}

/// Severity of an overlay status entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusLevel {
    Ok,
    Error,
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLevel::Ok => write!(f, "ok"),
            StatusLevel::Error => write!(f, "error"),
        }
    }
}

/// A status entry as shown in the host's status panel.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
    pub level: StatusLevel,
    pub detail: String,
}

impl Status {
    pub fn ok(detail: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Ok,
            detail: detail.into(),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            level: StatusLevel::Error,
            detail: detail.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.level == StatusLevel::Ok
    }
}

/// What a bounded queue does when a new entry arrives while it is full.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Evict the oldest queued entry to make room.
    #[default]
    DropOldest,
    /// Keep the queue as is and discard the new entry.
    DropNewest,
}

/// Check a topic name against graph-name rules.
///
/// Accepted: an optional leading `/` or `~`, then an alphabetic character,
/// then alphanumerics, `_` or `/`. Empty segments and a trailing `/` are
/// rejected.
pub fn validate_topic(topic: &str) -> Result<()> {
    let invalid = |reason: &str| OverlayError::InvalidTopic {
        topic: topic.to_string(),
        reason: reason.to_string(),
    };

    let body = topic
        .strip_prefix('/')
        .or_else(|| topic.strip_prefix('~'))
        .unwrap_or(topic);

    let first = body
        .chars()
        .next()
        .ok_or_else(|| invalid("name is empty"))?;
    if !first.is_ascii_alphabetic() {
        return Err(invalid("must start with a letter"));
    }

    if let Some(c) = body
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '/'))
    {
        return Err(invalid(&format!("character '{}' is not allowed", c)));
    }

    if body.contains("//") {
        return Err(invalid("contains an empty segment"));
    }

    if body.ends_with('/') {
        return Err(invalid("ends with '/'"));
    }

    Ok(())
}

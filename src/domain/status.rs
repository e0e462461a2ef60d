//! Visit lifecycle status vocabulary
//!
//! Two independent status columns govern a visit record: `MappingStatus`
//! drives the fill/mark-complete sweeps, `PublishStatus` records the
//! outcome of publish attempts. Both are persisted as their uppercase
//! string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Mapping lifecycle of a visit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MappingStatus {
    /// Ready to publish to the registry
    #[serde(rename = "READY")]
    Ready,
    /// Sections still missing; fill/mark-complete keep processing it
    #[serde(rename = "INCOMPLETE")]
    Incomplete,
    /// The immutable snapshot failed validation at fetch time; terminal
    #[serde(rename = "INVALID")]
    Invalid,
}

impl MappingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MappingStatus::Ready => "READY",
            MappingStatus::Incomplete => "INCOMPLETE",
            MappingStatus::Invalid => "INVALID",
        }
    }
}

impl fmt::Display for MappingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MappingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "READY" => Ok(MappingStatus::Ready),
            "INCOMPLETE" => Ok(MappingStatus::Incomplete),
            "INVALID" => Ok(MappingStatus::Invalid),
            other => Err(format!("unknown mapping status: {other}")),
        }
    }
}

/// Publish outcome of a visit record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PublishStatus {
    /// Successfully published
    #[serde(rename = "SUCCESS")]
    Success,
    /// Published but the registry reported a payload problem
    #[serde(rename = "PAYLOAD_INVALID")]
    PayloadInvalid,
    /// Publish failed with a registry response; retryable
    #[serde(rename = "ERROR")]
    Error,
    /// Not yet attempted (initial state)
    #[serde(rename = "PREPARING")]
    Preparing,
}

impl PublishStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishStatus::Success => "SUCCESS",
            PublishStatus::PayloadInvalid => "PAYLOAD_INVALID",
            PublishStatus::Error => "ERROR",
            PublishStatus::Preparing => "PREPARING",
        }
    }
}

impl fmt::Display for PublishStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PublishStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(PublishStatus::Success),
            "PAYLOAD_INVALID" => Ok(PublishStatus::PayloadInvalid),
            "ERROR" => Ok(PublishStatus::Error),
            "PREPARING" => Ok(PublishStatus::Preparing),
            other => Err(format!("unknown publish status: {other}")),
        }
    }
}

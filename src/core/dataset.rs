use crate::core::state::StateSnapshot;
use crate::core::surface::SurfaceDescription;
use crate::error::PlaybackError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Server-assigned identifier of a streaming simulation run
pub type SourceId = i64;

/// How the backend delivers the state sequence of a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Full state sequence in one request
    #[default]
    Batch,
    /// State fetched incrementally as playback consumes it
    Streaming,
}

impl DeliveryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Batch => "batch",
            DeliveryMode::Streaming => "streaming",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeliveryMode {
    type Err = PlaybackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "batch" => Ok(DeliveryMode::Batch),
            "streaming" => Ok(DeliveryMode::Streaming),
            other => Err(PlaybackError::UnknownMode(other.to_string())),
        }
    }
}

/// Surface geometry plus the time-ordered state sequence of one plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationDataset {
    pub surface: SurfaceDescription,
    #[serde(rename = "state", default)]
    pub states: Vec<StateSnapshot>,
    /// Only present for streaming runs
    #[serde(rename = "simulatorId", default, skip_serializing_if = "Option::is_none")]
    pub source_id: Option<SourceId>,
}

impl SimulationDataset {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

//! Shared types returned to callers and serialized by the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything a caller learns about the produced file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub path: String,
    pub uri: String,
    /// Byte size from a stat of the final file.
    pub size: u64,
    /// Last path segment of `uri`; `None` for non-local URI schemes.
    pub name: Option<String>,
    pub width: u32,
    pub height: u32,
    /// Encoded bytes as produced by the codec (before any metadata splice).
    pub base64: String,
}

/// Pipeline step whose failure is logged and recorded but does not abort the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Rotate,
    Scale,
    Encode,
    Write,
    Metadata,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Rotate => "rotate",
            Stage::Scale => "scale",
            Stage::Encode => "encode",
            Stage::Write => "write",
            Stage::Metadata => "metadata",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub message: String,
}

/// A completed resize: the record plus any stages that failed along the way.
///
/// A non-empty `failures` list means the record may describe an empty,
/// partial or stale file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOutcome {
    #[serde(flatten)]
    pub record: ResultRecord,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<StageFailure>,
}

impl ResizeOutcome {
    pub fn is_degraded(&self) -> bool {
        !self.failures.is_empty()
    }

    pub fn failed_stages(&self) -> Vec<Stage> {
        self.failures.iter().map(|f| f.stage).collect()
    }
}

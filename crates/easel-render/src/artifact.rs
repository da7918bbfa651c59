use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use easel_core::ScriptHash;
use easel_script::ScriptMode;

/// The kind of output a render produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArtifactKind {
    /// A single still frame of the static scene.
    PreviewImage,
    /// The full animated video.
    Video,
}

impl ArtifactKind {
    /// Short label used in logs, errors, and events.
    pub fn label(&self) -> &'static str {
        match self {
            ArtifactKind::PreviewImage => "preview",
            ArtifactKind::Video => "video",
        }
    }

    /// The script form this artifact kind is rendered from.
    pub fn script_mode(&self) -> ScriptMode {
        match self {
            ArtifactKind::PreviewImage => ScriptMode::Preview,
            ArtifactKind::Video => ScriptMode::Render,
        }
    }

    /// File extension of the engine's output for this kind.
    pub fn extension(&self) -> &'static str {
        match self {
            ArtifactKind::PreviewImage => "png",
            ArtifactKind::Video => "mp4",
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The immutable record of one successful render.
///
/// A new render of the same scene produces a new artifact at a new path;
/// existing artifacts are never overwritten or deleted by the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderArtifact {
    /// Unique id of the render request that produced this artifact.
    pub id: String,
    pub kind: ArtifactKind,
    /// Location of the produced output file.
    pub path: PathBuf,
    /// Hash of the exact script text this artifact was rendered from.
    pub script_hash: ScriptHash,
    pub created_at: DateTime<Utc>,
}

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Render quality preset, mapped to the engine's quality flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Low,
    Medium,
    High,
}

impl Quality {
    /// The CLI flag the engine expects for this preset.
    pub fn flag(&self) -> &'static str {
        match self {
            Quality::Low => "-ql",
            Quality::Medium => "-qm",
            Quality::High => "-qh",
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Quality::Low
    }
}

/// Configuration for invoking the external rendering engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Program used to launch the engine.
    pub program: String,
    /// Arguments inserted before the script path (`-m manim` by default, so
    /// the engine runs as a Python module the way the upstream CLI does).
    pub module_args: Vec<String>,
    /// Quality preset for both preview and video output.
    pub quality: Quality,
    /// Root directory the engine writes media output under.
    pub media_dir: PathBuf,
    /// Hard ceiling on a single engine invocation, in seconds.
    pub timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            program: "python".to_string(),
            module_args: vec!["-m".to_string(), "manim".to_string()],
            quality: Quality::default(),
            media_dir: std::env::temp_dir().join("easel_media"),
            timeout_secs: 300,
        }
    }
}

impl EngineConfig {
    /// Replace the media output directory.
    pub fn with_media_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.media_dir = dir.into();
        self
    }

    /// Replace the invocation timeout.
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

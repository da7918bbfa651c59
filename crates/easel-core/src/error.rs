/// Core error types for the Easel engine.
use serde::{Deserialize, Serialize};

/// A specialized Result type for Easel operations.
pub type EaselResult<T> = Result<T, EaselError>;

/// The phase of a render request in which a failure occurred.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderPhase {
    /// Compiling the scene snapshot into a script.
    Compile,
    /// Writing the script to its temporary location.
    WriteScript,
    /// The engine child process itself.
    Engine,
    /// Locating the output file after a zero exit.
    CollectOutput,
    /// The engine exceeded its time budget and was killed.
    Timeout,
    /// The request was cancelled and the child process terminated.
    Cancelled,
}

impl std::fmt::Display for RenderPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderPhase::Compile => write!(f, "compile"),
            RenderPhase::WriteScript => write!(f, "write-script"),
            RenderPhase::Engine => write!(f, "engine"),
            RenderPhase::CollectOutput => write!(f, "collect-output"),
            RenderPhase::Timeout => write!(f, "timeout"),
            RenderPhase::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Top-level error type encompassing all Easel subsystems.
#[derive(Debug, thiserror::Error)]
pub enum EaselError {
    #[error("unknown object type: {type_name}")]
    UnknownType { type_name: String },

    #[error("unknown animation: {name}")]
    UnknownAnimation { name: String },

    #[error("invalid value {value} for property '{name}' of {id}: {reason}")]
    InvalidPropertyValue {
        id: String,
        name: String,
        value: String,
        reason: String,
    },

    #[error("animation '{animation}' is not valid for {object_type} object {id}")]
    IncompatibleAnimation {
        id: String,
        object_type: String,
        animation: String,
    },

    #[error("object not found: {id}")]
    ObjectNotFound { id: String },

    #[error("unsupported property combination: {0}")]
    UnsupportedPropertyCombination(String),

    #[error("render failed during {phase} (exit code {exit_code:?}): {stderr}")]
    RenderFailed {
        phase: RenderPhase,
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("a {kind} render is already in flight")]
    RenderBusy { kind: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EaselError {
    /// Create an unknown-type error.
    pub fn unknown_type(type_name: impl Into<String>) -> Self {
        EaselError::UnknownType {
            type_name: type_name.into(),
        }
    }

    /// Create an object-not-found error.
    pub fn not_found(id: impl Into<String>) -> Self {
        EaselError::ObjectNotFound { id: id.into() }
    }

    /// Create an invalid-property-value error.
    pub fn invalid_value(
        id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        EaselError::InvalidPropertyValue {
            id: id.into(),
            name: name.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a render-failed error carrying the engine's raw stderr.
    pub fn render_failed(
        phase: RenderPhase,
        exit_code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        EaselError::RenderFailed {
            phase,
            exit_code,
            stderr: stderr.into(),
        }
    }

    /// True for errors that indicate bad input rather than an internal or
    /// engine-side fault.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            EaselError::UnknownType { .. }
                | EaselError::UnknownAnimation { .. }
                | EaselError::InvalidPropertyValue { .. }
                | EaselError::IncompatibleAnimation { .. }
                | EaselError::ObjectNotFound { .. }
        )
    }
}

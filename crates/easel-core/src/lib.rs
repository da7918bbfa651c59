//! # easel-core
//!
//! Core types and primitives for the Easel scene-assembly engine.
//! This crate contains foundational types shared across all Easel crates:
//! object and animation kinds, colors, script hashes, engine configuration,
//! and error types.

pub mod color;
pub mod config;
pub mod error;
pub mod hash;
pub mod types;

pub use color::Color;
pub use config::{EngineConfig, Quality};
pub use error::{EaselError, EaselResult, RenderPhase};
pub use hash::{hash_script, ScriptHash};
pub use types::{AnimationKind, ObjectKind};

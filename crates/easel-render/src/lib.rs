//! # easel-render
//!
//! Render orchestration for Easel: writes compiled scripts to unique
//! temporary locations, drives the Manim engine as an isolated child
//! process (with timeout and cancellation), and reconciles results back
//! into immutable render artifacts.

pub mod artifact;
pub mod engine;
pub mod orchestrator;

pub use artifact::{ArtifactKind, RenderArtifact};
pub use engine::ManimEngine;
pub use orchestrator::{CancelHandle, RenderJob, RenderOrchestrator, RenderState};

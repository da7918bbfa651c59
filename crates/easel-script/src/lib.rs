//! # easel-script
//!
//! The Easel script compiler — a pure, deterministic mapping from a scene
//! snapshot to an executable Manim script. The same snapshot always
//! compiles to byte-identical text, so script hashes identify renders.

pub mod compiler;

pub use compiler::{Compiler, Script, ScriptMode};

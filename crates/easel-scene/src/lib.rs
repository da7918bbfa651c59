//! # easel-scene
//!
//! The Easel scene model — an ordered, schema-validated collection of scene
//! objects and the store that mutates it. Every write goes through the
//! property schema, so a snapshot handed to the compiler is valid by
//! construction.

pub mod object;
pub mod schema;
pub mod store;
pub mod validate;

pub use object::{ObjectId, SceneObject};
pub use schema::{schema_for, PropertySpec, PropertyValue, ValueKind};
pub use store::{SceneSnapshot, SceneStore};
pub use validate::validate_snapshot;

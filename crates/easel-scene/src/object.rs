use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use easel_core::{AnimationKind, ObjectKind};

use crate::schema::{schema_for, PropertyValue};

/// Unique identifier for a scene object.
///
/// Ids double as the local variable names in the compiled script, so they
/// are generated in `<kind slug>_<6 hex chars>` form — a legal identifier
/// in the engine's scripting language.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectId(pub String);

impl ObjectId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh process-unique id for an object of `kind`.
    pub fn generate(kind: ObjectKind) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        Self(format!("{}_{}", kind.slug(), &hex[..6]))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One visual entity in the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneObject {
    /// Unique identifier, immutable after creation.
    pub id: ObjectId,
    /// Object kind, immutable after creation.
    pub kind: ObjectKind,
    /// Current property values keyed by name. The key set is fixed by the
    /// kind's schema and every value is within its declared domain.
    pub properties: HashMap<String, PropertyValue>,
    /// Entry animation played when the object first appears.
    pub animation: AnimationKind,
}

impl SceneObject {
    /// Create an object of `kind` with a fresh id, every property at its
    /// schema default, and no entry animation.
    pub fn with_defaults(kind: ObjectKind) -> Self {
        let properties = schema_for(kind)
            .into_iter()
            .map(|spec| (spec.name.to_string(), spec.default))
            .collect();
        Self {
            id: ObjectId::generate(kind),
            kind,
            properties,
            animation: AnimationKind::None,
        }
    }

    /// Get a property value by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Get a numeric property by name.
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(PropertyValue::as_number)
    }

    /// Get a textual property by name.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(PropertyValue::as_text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_id_shape() {
        let id = ObjectId::generate(ObjectKind::Circle);
        let (prefix, hex) = id.as_str().split_once('_').unwrap();
        assert_eq!(prefix, "circle");
        assert_eq!(hex.len(), 6);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_generated_ids_unique() {
        let a = ObjectId::generate(ObjectKind::Text);
        let b = ObjectId::generate(ObjectKind::Text);
        assert_ne!(a, b);
    }

    #[test]
    fn test_defaults_cover_whole_schema() {
        for kind in ObjectKind::ALL {
            let obj = SceneObject::with_defaults(kind);
            let schema = schema_for(kind);
            assert_eq!(obj.properties.len(), schema.len());
            for spec in schema {
                assert_eq!(obj.get(spec.name), Some(&spec.default));
            }
            assert_eq!(obj.animation, AnimationKind::None);
        }
    }

    #[test]
    fn test_typed_accessors() {
        let obj = SceneObject::with_defaults(ObjectKind::Circle);
        assert_eq!(obj.number("radius"), Some(1.0));
        assert_eq!(obj.text("fill_color"), Some("#58C4DD"));
        assert_eq!(obj.number("fill_color"), None);
        assert_eq!(obj.text("radius"), None);
    }
}

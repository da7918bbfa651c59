//! The scene model store — the single mutable container of scene state.
//!
//! Every operation validates before it mutates: a failed call leaves the
//! store exactly as it was, and a successful one is visible to all
//! subsequent reads. Readers that need a stable view (the compiler, a
//! render in flight) take a [`SceneSnapshot`], which is a fully independent
//! copy.

use serde::{Deserialize, Serialize};

use easel_core::{AnimationKind, EaselError, EaselResult, ObjectKind};

use crate::object::{ObjectId, SceneObject};
use crate::schema::{spec_for, PropertyValue};

/// An immutable point-in-time copy of the scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    /// Store version the snapshot was taken at. Bumped on every successful
    /// mutation, so equal versions imply equal content.
    pub version: u64,
    /// Objects in scene order (insertion order unless explicitly moved).
    pub objects: Vec<SceneObject>,
}

impl SceneSnapshot {
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }
}

/// The single mutable container of scene state.
#[derive(Debug, Default)]
pub struct SceneStore {
    objects: Vec<SceneObject>,
    version: u64,
}

impl SceneStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current store version. Starts at 0 for the empty scene.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Objects in scene order.
    pub fn objects(&self) -> &[SceneObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look up an object by id.
    pub fn get_object(&self, id: &ObjectId) -> EaselResult<&SceneObject> {
        self.objects
            .iter()
            .find(|o| &o.id == id)
            .ok_or_else(|| EaselError::not_found(id.as_str()))
    }

    fn index_of(&self, id: &ObjectId) -> EaselResult<usize> {
        self.objects
            .iter()
            .position(|o| &o.id == id)
            .ok_or_else(|| EaselError::not_found(id.as_str()))
    }

    /// Create a new object of `kind` with schema defaults, appended at the
    /// end of the scene order. Returns its id.
    pub fn create_object(&mut self, kind: ObjectKind) -> ObjectId {
        let object = SceneObject::with_defaults(kind);
        let id = object.id.clone();
        self.objects.push(object);
        self.version += 1;
        tracing::debug!(id = %id, kind = %kind, version = self.version, "object created");
        id
    }

    /// Update one property of one object. The value is validated against
    /// the property's declared domain before anything is written.
    pub fn update_property(
        &mut self,
        id: &ObjectId,
        name: &str,
        value: PropertyValue,
    ) -> EaselResult<()> {
        let index = self.index_of(id)?;
        let kind = self.objects[index].kind;
        let spec = spec_for(kind, name).ok_or_else(|| {
            EaselError::invalid_value(
                id.as_str(),
                name,
                value.to_string(),
                format!("{} has no property '{}'", kind, name),
            )
        })?;
        let accepted = spec.accept(value.clone()).map_err(|reason| {
            EaselError::invalid_value(id.as_str(), name, value.to_string(), reason)
        })?;
        self.objects[index]
            .properties
            .insert(name.to_string(), accepted);
        self.version += 1;
        tracing::debug!(id = %id, property = name, version = self.version, "property updated");
        Ok(())
    }

    /// Assign an entry animation, rejecting combinations the engine cannot
    /// express (`Write` on a non-text object).
    pub fn set_animation(&mut self, id: &ObjectId, animation: AnimationKind) -> EaselResult<()> {
        let index = self.index_of(id)?;
        let kind = self.objects[index].kind;
        if !animation.is_compatible_with(kind) {
            return Err(EaselError::IncompatibleAnimation {
                id: id.to_string(),
                object_type: kind.to_string(),
                animation: animation.to_string(),
            });
        }
        self.objects[index].animation = animation;
        self.version += 1;
        tracing::debug!(id = %id, animation = %animation, version = self.version, "animation set");
        Ok(())
    }

    /// Remove an object. Remaining objects keep their relative order.
    pub fn remove_object(&mut self, id: &ObjectId) -> EaselResult<()> {
        let index = self.index_of(id)?;
        self.objects.remove(index);
        self.version += 1;
        tracing::debug!(id = %id, version = self.version, "object removed");
        Ok(())
    }

    /// Move an object to `new_index` in the scene order. All other objects
    /// keep their relative order.
    pub fn move_object(&mut self, id: &ObjectId, new_index: usize) -> EaselResult<()> {
        let index = self.index_of(id)?;
        if new_index >= self.objects.len() {
            return Err(EaselError::InvalidArgument(format!(
                "index {} out of range for {} objects",
                new_index,
                self.objects.len()
            )));
        }
        let object = self.objects.remove(index);
        self.objects.insert(new_index, object);
        self.version += 1;
        tracing::debug!(id = %id, new_index, version = self.version, "object moved");
        Ok(())
    }

    /// Take a fully independent, read-only copy of the scene, safe to hand
    /// to the compiler while further edits proceed.
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            version: self.version,
            objects: self.objects.clone(),
        }
    }
}

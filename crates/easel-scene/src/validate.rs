use std::collections::HashSet;

use easel_core::EaselError;

use crate::schema::schema_for;
use crate::store::SceneSnapshot;

/// Re-check a snapshot for structural correctness.
///
/// The store already validates every write, so a failure here means a
/// validation gap upstream, not bad user input. The compiler runs this
/// before emitting a script and treats any finding as an
/// internal-consistency fault.
pub fn validate_snapshot(snapshot: &SceneSnapshot) -> Result<(), Vec<EaselError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for object in &snapshot.objects {
        if !seen.insert(&object.id) {
            errors.push(EaselError::UnsupportedPropertyCombination(format!(
                "duplicate object id: {}",
                object.id
            )));
        }

        for spec in schema_for(object.kind) {
            match object.get(spec.name) {
                None => errors.push(EaselError::UnsupportedPropertyCombination(format!(
                    "{} is missing property '{}'",
                    object.id, spec.name
                ))),
                Some(value) => {
                    if let Err(reason) = spec.accept(value.clone()) {
                        errors.push(EaselError::UnsupportedPropertyCombination(format!(
                            "{} property '{}' out of domain: {}",
                            object.id, spec.name, reason
                        )));
                    }
                }
            }
        }

        if !object.animation.is_compatible_with(object.kind) {
            errors.push(EaselError::UnsupportedPropertyCombination(format!(
                "{} pairs animation '{}' with kind {}",
                object.id, object.animation, object.kind
            )));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use crate::schema::PropertyValue;
    use crate::store::SceneStore;
    use easel_core::{AnimationKind, ObjectKind};

    #[test]
    fn test_store_built_snapshot_is_valid() {
        let mut store = SceneStore::new();
        store.create_object(ObjectKind::Circle);
        let text = store.create_object(ObjectKind::Text);
        store.set_animation(&text, AnimationKind::Write).unwrap();
        assert!(validate_snapshot(&store.snapshot()).is_ok());
    }

    #[test]
    fn test_empty_snapshot_is_valid() {
        assert!(validate_snapshot(&SceneStore::new().snapshot()).is_ok());
    }

    #[test]
    fn test_detects_hand_built_corruption() {
        let mut store = SceneStore::new();
        store.create_object(ObjectKind::Square);
        let mut snapshot = store.snapshot();

        // Bypass the store the way a buggy caller might.
        snapshot.objects[0]
            .properties
            .insert("opacity".to_string(), PropertyValue::Number(7.0));
        snapshot.objects[0].animation = AnimationKind::Write;

        let errors = validate_snapshot(&snapshot).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors
            .iter()
            .all(|e| matches!(e, EaselError::UnsupportedPropertyCombination(_))));
    }

    #[test]
    fn test_detects_duplicate_ids() {
        let mut store = SceneStore::new();
        store.create_object(ObjectKind::Circle);
        let mut snapshot = store.snapshot();
        let copy: SceneObject = snapshot.objects[0].clone();
        snapshot.objects.push(copy);

        let errors = validate_snapshot(&snapshot).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.to_string().contains("duplicate object id")));
    }
}

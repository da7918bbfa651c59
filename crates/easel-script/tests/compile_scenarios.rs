use easel_core::{AnimationKind, ObjectKind};
use easel_scene::{PropertyValue, SceneStore};
use easel_script::{Compiler, ScriptMode};

/// Byte offset of `needle` in `haystack`, asserting it occurs exactly once.
fn position_of(haystack: &str, needle: &str) -> usize {
    let first = haystack
        .find(needle)
        .unwrap_or_else(|| panic!("script does not contain {:?}", needle));
    assert_eq!(
        haystack.rfind(needle),
        Some(first),
        "{:?} occurs more than once",
        needle
    );
    first
}

#[test]
fn red_circle_with_fade_in_emits_expected_statements_in_order() {
    let mut store = SceneStore::new();
    let circle = store.create_object(ObjectKind::Circle);
    store
        .update_property(&circle, "fill_color", PropertyValue::text("#FF0000"))
        .unwrap();
    store
        .set_animation(&circle, AnimationKind::FadeIn)
        .unwrap();

    let script = Compiler::compile(&store.snapshot(), ScriptMode::Render).unwrap();
    let source = &script.source;

    let construction = position_of(source, &format!("{} = Circle(", circle));
    let fill = position_of(source, "fill_color='#FF0000'");
    let placement = position_of(source, ".move_to(np.array([0.0, 0.0, 0.0]))");
    let animation = position_of(source, &format!("self.play(FadeIn({}))", circle));

    assert!(construction < fill);
    assert!(fill < placement);
    assert!(placement < animation);
    assert!(source.contains("radius=1.0"));
}

#[test]
fn constructions_precede_all_animation_statements() {
    let mut store = SceneStore::new();
    let a = store.create_object(ObjectKind::Circle);
    let b = store.create_object(ObjectKind::Square);
    let c = store.create_object(ObjectKind::Text);
    store.set_animation(&a, AnimationKind::FadeIn).unwrap();
    store.set_animation(&c, AnimationKind::Write).unwrap();

    let script = Compiler::compile(&store.snapshot(), ScriptMode::Render).unwrap();
    let source = &script.source;

    let construct_a = position_of(source, &format!("{} = Circle(", a));
    let construct_b = position_of(source, &format!("{} = Square(", b));
    let construct_c = position_of(source, &format!("{} = Text(", c));
    let play_a = position_of(source, &format!("self.play(FadeIn({}))", a));
    let play_c = position_of(source, &format!("self.play(Write({}))", c));
    let add_b = position_of(source, &format!("self.add({})", b));

    // Constructions in scene order.
    assert!(construct_a < construct_b && construct_b < construct_c);
    // Every animation statement after every construction.
    let last_construction = construct_c;
    assert!(play_a > last_construction);
    assert!(play_c > last_construction);
    // Animations keep scene order among themselves.
    assert!(play_a < play_c);
    // The static object is shown without motion.
    assert!(add_b > last_construction);
    assert!(!source.contains(&format!("self.play(FadeIn({}))", b)));
}

#[test]
fn reorder_changes_emission_order() {
    let mut store = SceneStore::new();
    let a = store.create_object(ObjectKind::Circle);
    let b = store.create_object(ObjectKind::Square);

    let before = Compiler::compile(&store.snapshot(), ScriptMode::Render).unwrap();
    assert!(
        position_of(&before.source, &format!("{} = Circle(", a))
            < position_of(&before.source, &format!("{} = Square(", b))
    );

    store.move_object(&b, 0).unwrap();
    let after = Compiler::compile(&store.snapshot(), ScriptMode::Render).unwrap();
    assert!(
        position_of(&after.source, &format!("{} = Square(", b))
            < position_of(&after.source, &format!("{} = Circle(", a))
    );
    assert_ne!(before.hash, after.hash);
}

#[test]
fn snapshot_taken_before_edits_compiles_to_the_old_scene() {
    let mut store = SceneStore::new();
    let circle = store.create_object(ObjectKind::Circle);
    let snapshot = store.snapshot();

    store
        .update_property(&circle, "radius", PropertyValue::number(5.0))
        .unwrap();
    store.create_object(ObjectKind::Square);

    let script = Compiler::compile(&snapshot, ScriptMode::Render).unwrap();
    assert!(script.source.contains("radius=1.0"));
    assert!(!script.source.contains("radius=5.0"));
    assert!(!script.source.contains("Square("));
}

#[test]
fn text_defaults_compile_with_color_keyword() {
    let mut store = SceneStore::new();
    let text = store.create_object(ObjectKind::Text);

    let script = Compiler::compile(&store.snapshot(), ScriptMode::Render).unwrap();
    let statement_start = position_of(&script.source, &format!("{} = Text('Text'", text));
    assert!(statement_start > 0);
    assert!(script.source.contains("font_size=48.0"));
    assert!(script.source.contains("color='#FFFFFF'"));
    assert!(!script.source.contains("stroke_width"));
}

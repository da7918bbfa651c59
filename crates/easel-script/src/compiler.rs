//! Scene snapshot → Manim script.
//!
//! Emission order is fixed: one construction statement per object in scene
//! order (constructor arguments in schema order, placement appended), then
//! one `self.play(...)` per animated object in scene order, then one
//! `self.add(...)` per static object in scene order. Entry animations
//! therefore never precede the construction of any object.

use serde::{Deserialize, Serialize};

use easel_core::{hash_script, AnimationKind, EaselError, EaselResult, ObjectKind, ScriptHash};
use easel_scene::{validate_snapshot, SceneObject, SceneSnapshot};

/// Which form of script to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptMode {
    /// A static scene: every object is added with no motion, for a
    /// still-frame preview.
    Preview,
    /// The full scene including entry animations.
    Render,
}

impl ScriptMode {
    /// Name of the scene class the script defines.
    pub fn scene_class(&self) -> &'static str {
        match self {
            ScriptMode::Preview => "PreviewScene",
            ScriptMode::Render => "EaselScene",
        }
    }
}

impl std::fmt::Display for ScriptMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptMode::Preview => write!(f, "preview"),
            ScriptMode::Render => write!(f, "render"),
        }
    }
}

/// A compiled script plus its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct Script {
    /// The script source text, valid input to the engine with no edits.
    pub source: String,
    /// The scene class the engine should be pointed at.
    pub scene_class: &'static str,
    /// The mode this script was compiled for.
    pub mode: ScriptMode,
    /// SHA-256 of `source`.
    pub hash: ScriptHash,
}

const BODY_INDENT: &str = "        ";

/// Compiles scene snapshots into Manim scripts.
pub struct Compiler {
    output: String,
}

impl Compiler {
    /// Compile `snapshot` into a script.
    ///
    /// The snapshot is re-checked for structural consistency first; a
    /// finding there means store-side validation has a gap and is surfaced
    /// as an internal-consistency fault, not a user error.
    pub fn compile(snapshot: &SceneSnapshot, mode: ScriptMode) -> EaselResult<Script> {
        if let Err(errors) = validate_snapshot(snapshot) {
            for error in &errors {
                tracing::error!(%error, "snapshot failed consistency re-check");
            }
            return Err(errors
                .into_iter()
                .next()
                .expect("non-empty error list from validate_snapshot"));
        }

        let mut compiler = Compiler {
            output: String::new(),
        };
        compiler.emit_scene(snapshot, mode)?;
        let source = compiler.output;
        let hash = hash_script(&source);
        Ok(Script {
            source,
            scene_class: mode.scene_class(),
            mode,
            hash,
        })
    }

    fn push_line(&mut self, line: &str) {
        self.output.push_str(line);
        self.output.push('\n');
    }

    fn push_body_line(&mut self, line: &str) {
        self.output.push_str(BODY_INDENT);
        self.push_line(line);
    }

    fn emit_scene(&mut self, snapshot: &SceneSnapshot, mode: ScriptMode) -> EaselResult<()> {
        self.push_line("# Generated by Easel");
        self.push_line("from manim import *");
        self.push_line("import numpy as np");
        self.push_line("");
        self.push_line(&format!("class {}(Scene):", mode.scene_class()));
        self.push_line("    def construct(self):");

        if snapshot.is_empty() {
            self.push_body_line("pass");
            return Ok(());
        }

        for object in &snapshot.objects {
            let statement = construction_statement(object);
            self.push_body_line(&statement);
        }

        let mut static_ids = Vec::new();
        for object in &snapshot.objects {
            match animation_call(object, mode)? {
                Some(call) => self.push_body_line(&format!("self.play({})", call)),
                None => static_ids.push(object.id.as_str()),
            }
        }
        for id in static_ids {
            self.push_body_line(&format!("self.add({})", id));
        }

        Ok(())
    }
}

/// One construction statement: constructor call with schema-ordered
/// arguments, then the placement call. Position is always applied through
/// `move_to`, never through constructor arguments, so argument order can
/// never change placement.
fn construction_statement(object: &SceneObject) -> String {
    let mut args: Vec<String> = Vec::new();
    match object.kind {
        ObjectKind::Circle => {
            args.push(number_arg(object, "radius"));
            args.push(color_arg(object, "fill_color", "fill_color"));
            args.push(opacity_arg(object));
            args.push(color_arg(object, "stroke_color", "stroke_color"));
            args.push(number_arg(object, "stroke_width"));
            args.push(number_arg(object, "stroke_opacity"));
        }
        ObjectKind::Square => {
            args.push(number_arg(object, "side_length"));
            args.push(color_arg(object, "fill_color", "fill_color"));
            args.push(opacity_arg(object));
            args.push(color_arg(object, "stroke_color", "stroke_color"));
            args.push(number_arg(object, "stroke_width"));
            args.push(number_arg(object, "stroke_opacity"));
        }
        ObjectKind::Text => {
            args.push(py_str(object.text("text_content").unwrap_or_default()));
            args.push(number_arg(object, "font_size"));
            // Text uses `color` for its primary fill.
            args.push(color_arg(object, "fill_color", "color"));
            args.push(opacity_arg(object));
            args.push(color_arg(object, "stroke_color", "stroke_color"));
            args.push(number_arg(object, "stroke_opacity"));
        }
    }

    format!(
        "{} = {}({}){}",
        object.id,
        object.kind.engine_class(),
        args.join(", "),
        placement_call(object)
    )
}

fn placement_call(object: &SceneObject) -> String {
    format!(
        ".move_to(np.array([{}, {}, {}]))",
        py_num(object.number("pos_x").unwrap_or(0.0)),
        py_num(object.number("pos_y").unwrap_or(0.0)),
        py_num(object.number("pos_z").unwrap_or(0.0))
    )
}

/// The animation invocation for an object, or `None` for a static add.
/// Preview scripts are always static.
fn animation_call(object: &SceneObject, mode: ScriptMode) -> EaselResult<Option<String>> {
    if mode == ScriptMode::Preview {
        return Ok(None);
    }
    match object.animation {
        AnimationKind::None => Ok(None),
        AnimationKind::FadeIn => Ok(Some(format!("FadeIn({})", object.id))),
        AnimationKind::GrowFromCenter => Ok(Some(format!("GrowFromCenter({})", object.id))),
        AnimationKind::Write if object.kind == ObjectKind::Text => {
            Ok(Some(format!("Write({})", object.id)))
        }
        AnimationKind::Write => Err(EaselError::UnsupportedPropertyCombination(format!(
            "{}: Write cannot be compiled for kind {}",
            object.id, object.kind
        ))),
    }
}

fn number_arg(object: &SceneObject, name: &str) -> String {
    format!("{}={}", name, py_num(object.number(name).unwrap_or(0.0)))
}

fn opacity_arg(object: &SceneObject) -> String {
    format!("fill_opacity={}", py_num(object.number("opacity").unwrap_or(1.0)))
}

fn color_arg(object: &SceneObject, property: &str, keyword: &str) -> String {
    format!(
        "{}={}",
        keyword,
        py_str(object.text(property).unwrap_or_default())
    )
}

/// Deterministic Python number literal.
fn py_num(n: f64) -> String {
    if n == n.trunc() && n.is_finite() && n.abs() < 1e15 {
        format!("{:.1}", n)
    } else {
        format!("{}", n)
    }
}

/// Python single-quoted string literal with escaping.
fn py_str(s: &str) -> String {
    let escaped = s
        .replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n");
    format!("'{}'", escaped)
}

//! The property schema — the single source of truth for which properties
//! each object kind has, their value domains, and their defaults.
//!
//! Defaults follow the engine's own conventions: shapes fill with Manim
//! blue and stroke white, text fills white.

use serde::{Deserialize, Serialize};

use easel_core::{Color, ObjectKind};

/// The domain of values a property accepts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueKind {
    /// Any finite number.
    Number,
    /// A finite number within `[min, max]`.
    BoundedNumber { min: f64, max: f64 },
    /// A `#RRGGBB` hex color.
    ColorHex,
    /// A non-empty string.
    NonEmptyText,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueKind::Number => write!(f, "a number"),
            ValueKind::BoundedNumber { min, max } => {
                write!(f, "a number between {} and {}", min, max)
            }
            ValueKind::ColorHex => write!(f, "a #RRGGBB hex color"),
            ValueKind::NonEmptyText => write!(f, "non-empty text"),
        }
    }
}

/// A property value as stored on a scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
}

impl PropertyValue {
    pub fn number(n: f64) -> Self {
        PropertyValue::Number(n)
    }

    pub fn text(s: impl Into<String>) -> Self {
        PropertyValue::Text(s.into())
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PropertyValue::Number(n) => Some(*n),
            PropertyValue::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Number(_) => None,
            PropertyValue::Text(s) => Some(s),
        }
    }
}

impl std::fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PropertyValue::Number(n) => write!(f, "{}", n),
            PropertyValue::Text(s) => write!(f, "{:?}", s),
        }
    }
}

/// Declared name, domain, and default for one editable property of an
/// object kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySpec {
    pub name: &'static str,
    pub kind: ValueKind,
    pub default: PropertyValue,
}

impl PropertySpec {
    fn number(name: &'static str, default: f64) -> Self {
        Self {
            name,
            kind: ValueKind::Number,
            default: PropertyValue::Number(default),
        }
    }

    fn bounded(name: &'static str, min: f64, max: f64, default: f64) -> Self {
        Self {
            name,
            kind: ValueKind::BoundedNumber { min, max },
            default: PropertyValue::Number(default),
        }
    }

    fn color(name: &'static str, default: Color) -> Self {
        Self {
            name,
            kind: ValueKind::ColorHex,
            default: PropertyValue::Text(default.to_hex()),
        }
    }

    fn text(name: &'static str, default: &str) -> Self {
        Self {
            name,
            kind: ValueKind::NonEmptyText,
            default: PropertyValue::Text(default.to_string()),
        }
    }

    /// Validate `value` against this spec's domain and return the value in
    /// normalised form (hex colors upper-cased). On failure the returned
    /// reason is suitable for an `InvalidPropertyValue` error.
    pub fn accept(&self, value: PropertyValue) -> Result<PropertyValue, String> {
        match (&self.kind, &value) {
            (ValueKind::Number, PropertyValue::Number(n)) => {
                if n.is_finite() {
                    Ok(value)
                } else {
                    Err("must be a finite number".to_string())
                }
            }
            (ValueKind::BoundedNumber { min, max }, PropertyValue::Number(n)) => {
                if !n.is_finite() {
                    Err("must be a finite number".to_string())
                } else if n < min || n > max {
                    Err(format!("must be between {} and {}", min, max))
                } else {
                    Ok(value)
                }
            }
            (ValueKind::ColorHex, PropertyValue::Text(s)) => Color::from_hex(s)
                .map(|c| PropertyValue::Text(c.to_hex()))
                .map_err(|e| e.to_string()),
            (ValueKind::NonEmptyText, PropertyValue::Text(s)) => {
                if s.trim().is_empty() {
                    Err("must not be empty".to_string())
                } else {
                    Ok(value)
                }
            }
            _ => Err(format!("expected {}", self.kind)),
        }
    }
}

/// The ordered property specs for an object kind. Constructor arguments in
/// the compiled script follow this order.
pub fn schema_for(kind: ObjectKind) -> Vec<PropertySpec> {
    let position = [
        PropertySpec::number("pos_x", 0.0),
        PropertySpec::number("pos_y", 0.0),
        PropertySpec::number("pos_z", 0.0),
    ];
    let mut specs: Vec<PropertySpec> = position.to_vec();
    match kind {
        ObjectKind::Circle => {
            specs.push(PropertySpec::bounded("radius", 0.01, 100.0, 1.0));
            specs.push(PropertySpec::color("fill_color", Color::MANIM_BLUE));
            specs.push(PropertySpec::bounded("opacity", 0.0, 1.0, 1.0));
            specs.push(PropertySpec::color("stroke_color", Color::WHITE));
            specs.push(PropertySpec::bounded("stroke_width", 0.0, 50.0, 2.0));
            specs.push(PropertySpec::bounded("stroke_opacity", 0.0, 1.0, 1.0));
        }
        ObjectKind::Square => {
            specs.push(PropertySpec::bounded("side_length", 0.01, 100.0, 2.0));
            specs.push(PropertySpec::color("fill_color", Color::MANIM_BLUE));
            specs.push(PropertySpec::bounded("opacity", 0.0, 1.0, 1.0));
            specs.push(PropertySpec::color("stroke_color", Color::WHITE));
            specs.push(PropertySpec::bounded("stroke_width", 0.0, 50.0, 2.0));
            specs.push(PropertySpec::bounded("stroke_opacity", 0.0, 1.0, 1.0));
        }
        ObjectKind::Text => {
            specs.push(PropertySpec::text("text_content", "Text"));
            specs.push(PropertySpec::color("fill_color", Color::WHITE));
            specs.push(PropertySpec::bounded("font_size", 1.0, 512.0, 48.0));
            specs.push(PropertySpec::bounded("opacity", 0.0, 1.0, 1.0));
            specs.push(PropertySpec::color("stroke_color", Color::BLACK));
            // No stroke_width: the engine's Text type treats font outlines
            // differently from shape strokes.
            specs.push(PropertySpec::bounded("stroke_opacity", 0.0, 1.0, 1.0));
        }
    }
    specs
}

/// Look up one property spec by name.
pub fn spec_for(kind: ObjectKind, name: &str) -> Option<PropertySpec> {
    schema_for(kind).into_iter().find(|s| s.name == name)
}

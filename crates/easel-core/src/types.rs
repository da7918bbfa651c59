use serde::{Deserialize, Serialize};

use crate::error::EaselError;

/// The kind of object a scene entry represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObjectKind {
    /// A circle shape.
    Circle,
    /// A square shape.
    Square,
    /// A text label.
    Text,
}

impl ObjectKind {
    /// All supported kinds, in display order.
    pub const ALL: [ObjectKind; 3] = [ObjectKind::Circle, ObjectKind::Square, ObjectKind::Text];

    /// Lower-case slug used in generated identifiers.
    pub fn slug(&self) -> &'static str {
        match self {
            ObjectKind::Circle => "circle",
            ObjectKind::Square => "square",
            ObjectKind::Text => "text",
        }
    }

    /// The Manim constructor this kind compiles to.
    pub fn engine_class(&self) -> &'static str {
        match self {
            ObjectKind::Circle => "Circle",
            ObjectKind::Square => "Square",
            ObjectKind::Text => "Text",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.engine_class())
    }
}

impl std::str::FromStr for ObjectKind {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Circle" => Ok(ObjectKind::Circle),
            "Square" => Ok(ObjectKind::Square),
            "Text" => Ok(ObjectKind::Text),
            other => Err(EaselError::unknown_type(other)),
        }
    }
}

/// Entry animation played when an object first appears.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnimationKind {
    /// No animation; the object is present from the first frame.
    None,
    FadeIn,
    /// Stroke-by-stroke writing. Only valid for text objects.
    Write,
    GrowFromCenter,
}

impl AnimationKind {
    /// All supported animations, in display order.
    pub const ALL: [AnimationKind; 4] = [
        AnimationKind::None,
        AnimationKind::FadeIn,
        AnimationKind::Write,
        AnimationKind::GrowFromCenter,
    ];

    /// Whether this animation may be assigned to an object of `kind`.
    pub fn is_compatible_with(&self, kind: ObjectKind) -> bool {
        match self {
            AnimationKind::Write => kind == ObjectKind::Text,
            _ => true,
        }
    }
}

impl Default for AnimationKind {
    fn default() -> Self {
        AnimationKind::None
    }
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationKind::None => write!(f, "None"),
            AnimationKind::FadeIn => write!(f, "FadeIn"),
            AnimationKind::Write => write!(f, "Write"),
            AnimationKind::GrowFromCenter => write!(f, "GrowFromCenter"),
        }
    }
}

impl std::str::FromStr for AnimationKind {
    type Err = EaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "None" => Ok(AnimationKind::None),
            "FadeIn" => Ok(AnimationKind::FadeIn),
            "Write" => Ok(AnimationKind::Write),
            "GrowFromCenter" => Ok(AnimationKind::GrowFromCenter),
            other => Err(EaselError::UnknownAnimation { name: other.into() }),
        }
    }
}

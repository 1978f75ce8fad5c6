//! Scene-change messages

use serde::{Deserialize, Serialize};

use crate::{ElementChild, StyleProp, SurfaceId};

/// One operation on the native scene
///
/// A batch of these is applied strictly in order. Tags 0-4 form the core
/// protocol; 5 and 6 carry the data the native selector engine matches on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum SceneChange {
    /// Total element and text surfaces allocated so far (including the root)
    Realloc { element_count: u32, text_count: u32 },
    InsertAt { parent: SurfaceId, child: ElementChild, index: u32 },
    RemoveChild { parent: SurfaceId, child: ElementChild },
    SetStyleProp { surface: SurfaceId, prop: StyleProp },
    SetText { text: SurfaceId, value: TextRecord },
    SetTagName { surface: SurfaceId, tag: String },
    SetAttribute { surface: SurfaceId, name: String, value: Option<String> },
}

impl SceneChange {
    /// Wire discriminant
    pub fn tag(&self) -> u32 {
        match self {
            Self::Realloc { .. } => 0,
            Self::InsertAt { .. } => 1,
            Self::RemoveChild { .. } => 2,
            Self::SetStyleProp { .. } => 3,
            Self::SetText { .. } => 4,
            Self::SetTagName { .. } => 5,
            Self::SetAttribute { .. } => 6,
        }
    }
}

/// Content of a text surface
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TextRecord {
    pub text: String,
}

impl TextRecord {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

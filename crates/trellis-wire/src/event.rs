//! Window events reported by the native side

use serde::{Deserialize, Serialize};

use crate::SurfaceId;

/// Input/window event, produced once per native input tick
///
/// Pointer targets are element surface ids picked by the native side.
/// Keyboard events carry no target; the script side routes them to the
/// focused element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum WindowEvent {
    MouseMove { target: SurfaceId },
    MouseDown { target: SurfaceId },
    MouseUp { target: SurfaceId },
    Scroll { target: SurfaceId },
    /// Physical scancode
    KeyDown(u16),
    /// Character code
    KeyPress(u16),
    /// Physical scancode
    KeyUp(u16),
    Focus,
    Blur,
    Resize,
    Close,
    Unknown,
}

impl WindowEvent {
    /// Wire discriminant
    pub fn tag(&self) -> u32 {
        match self {
            Self::MouseMove { .. } => 0,
            Self::MouseDown { .. } => 1,
            Self::MouseUp { .. } => 2,
            Self::Scroll { .. } => 3,
            Self::KeyDown(_) => 4,
            Self::KeyPress(_) => 5,
            Self::KeyUp(_) => 6,
            Self::Focus => 7,
            Self::Blur => 8,
            Self::Resize => 9,
            Self::Close => 10,
            Self::Unknown => 11,
        }
    }

    /// Picked surface, for pointer events
    pub fn target(&self) -> Option<SurfaceId> {
        match *self {
            Self::MouseMove { target }
            | Self::MouseDown { target }
            | Self::MouseUp { target }
            | Self::Scroll { target } => Some(target),
            _ => None,
        }
    }
}

//! Request/response envelope
//!
//! Each transport round-trip carries exactly one [`ApiMsg`] and returns
//! exactly one [`ApiResponse`].

use serde::{Deserialize, Serialize};

use crate::{SceneChange, SurfaceId, Vector2f, WindowEvent};

/// Native window identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u32);

/// Request sent to the native side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum ApiMsg {
    /// Fetch pending events; `poll = false` blocks until at least one arrives
    GetEvents { poll: bool },
    UpdateScene { window: WindowId, changes: Vec<SceneChange> },
    GetBounds { window: WindowId, surface: SurfaceId },
    CreateWindow { title: String, width: u32, height: u32 },
    ResizeWindow { window: WindowId, width: u32, height: u32 },
    DestroyWindow { window: WindowId },
    /// Selector matching within the subtree of `root`, in tree order
    Query { window: WindowId, root: SurfaceId, selector: String, all: bool },
}

impl ApiMsg {
    /// Wire discriminant
    pub fn tag(&self) -> u32 {
        match self {
            Self::GetEvents { .. } => 0,
            Self::UpdateScene { .. } => 1,
            Self::GetBounds { .. } => 2,
            Self::CreateWindow { .. } => 3,
            Self::ResizeWindow { .. } => 4,
            Self::DestroyWindow { .. } => 5,
            Self::Query { .. } => 6,
        }
    }
}

/// Reply from the native side
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum ApiResponse {
    Events { events: Vec<WindowEvent> },
    Nothing,
    Bounds { bounds: Bounds },
    WindowId { window: WindowId },
    Surfaces { surfaces: Vec<SurfaceId> },
    /// The request could not be decoded or applied
    Error { message: String },
}

impl ApiResponse {
    /// Wire discriminant
    pub fn tag(&self) -> u32 {
        match self {
            Self::Events { .. } => 0,
            Self::Nothing => 1,
            Self::Bounds { .. } => 2,
            Self::WindowId { .. } => 3,
            Self::Surfaces { .. } => 4,
            Self::Error { .. } => 5,
        }
    }
}

/// Axis-aligned box defined by its top-left and bottom-right corners
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub a: Vector2f,
    pub b: Vector2f,
}

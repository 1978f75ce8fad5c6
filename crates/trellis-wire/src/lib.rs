//! Trellis Wire Protocol
//!
//! Every message exchanged between the script-side document and the native
//! renderer. Variants are plain sum types in memory; on the wire each one is
//! a numeric tag followed by its fields (see [`codec`]), or an adjacently
//! tagged JSON object (see [`json`]).

use serde::{Deserialize, Serialize};

/// Fieldless enum with a fixed `u8` wire code per variant.
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($(#[$vmeta:meta])* $variant:ident = $code:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $code),+
        }

        impl $name {
            /// Look up a variant by its wire code
            pub fn from_u8(code: u8) -> Option<Self> {
                match code {
                    $($code => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Wire code of this variant
            #[inline]
            pub fn code(self) -> u8 {
                self as u8
            }
        }
    };
}

mod api;
pub mod codec;
mod event;
pub mod json;
mod scene;
mod style;

pub use api::{ApiMsg, ApiResponse, Bounds, WindowId};
pub use codec::{Reader, WireDecode, WireEncode, WireError};
pub use event::WindowEvent;
pub use json::Encoding;
pub use scene::{SceneChange, TextRecord};
pub use style::{
    Align, Border, BorderRadius, BorderSide, BorderStyle, BoxShadow, Color, Dimension, Flex,
    FlexDirection, FlexWrap, Flow, Image, JustifyContent, Overflow, Rect, Size, StyleProp,
    TextAlign, TextStyle, Vector2f,
};

/// Native surface identifier
///
/// Elements and texts live in separate id spaces. Element surface `0` is the
/// native root, owned by the document node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

impl SurfaceId {
    /// Root surface (the document)
    pub const ROOT: SurfaceId = SurfaceId(0);

    /// Index into per-surface tables
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A child slot of an element surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum ElementChild {
    Element(SurfaceId),
    Text(SurfaceId),
}

impl ElementChild {
    /// The element surface, if this is one
    pub fn as_element(self) -> Option<SurfaceId> {
        match self {
            Self::Element(id) => Some(id),
            Self::Text(_) => None,
        }
    }
}

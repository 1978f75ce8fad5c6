//! Trellis - GUI toolkit core
//!
//! A browser-like document tree on the script side, mirrored into a native
//! renderer through batched scene changes.
//!
//! # Crates
//! - `trellis-wire`: protocol messages and their binary/JSON codecs
//! - `trellis-style`: property bags resolved into style props
//! - `trellis-scene`: batching scene context and transports
//! - `trellis-dom`: document, node operations and event routing

pub mod config;
pub mod logging;
mod window;

pub use config::{Config, ConfigError};
pub use window::Window;

pub use trellis_dom::{
    Document, DomError, DomResult, Event, EventDetail, EventTarget, ListenerId, NodeId,
    NodeOperations, StyleDeclaration,
};
pub use trellis_scene::{
    ChannelTransport, FramedTransport, LoopbackHandle, LoopbackTransport, NativeEndpoint,
    SceneContext, SceneError, Transport, TransportError, channel_pair,
};
pub use trellis_style::{PropertyBag, StyleError, StyleValue};
pub use trellis_wire::{Encoding, SurfaceId, WindowEvent, WireError};

/// Result type for the facade
pub type Result<T> = std::result::Result<T, Error>;

/// Errors from any layer
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Dom(#[from] DomError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

//! Trellis Scene Context
//!
//! Batches tree and style mutations into `UpdateScene` messages, allocates
//! native surface ids and carries request/response round-trips over a
//! [`Transport`].

mod channel;
mod context;
mod loopback;
mod mirror;
pub mod selector;
mod transport;

pub use channel::{ChannelTransport, NativeEndpoint, PendingRequest, channel_pair};
pub use context::SceneContext;
pub use loopback::{LoopbackHandle, LoopbackTransport};
pub use mirror::{MirrorError, SceneMirror};
pub use transport::{FramedTransport, MAX_FRAME_LEN, Transport, TransportError, read_frame, write_frame};

use trellis_wire::WireError;

/// Scene synchronization error
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("wire error: {0}")]
    Wire(#[from] WireError),

    /// The native side answered with `ApiResponse::Error`
    #[error("native side rejected the request: {0}")]
    Rejected(String),

    #[error("unexpected response: expected {expected}, got tag {tag}")]
    UnexpectedResponse { expected: &'static str, tag: u32 },

    /// A previous round-trip failed; call `reset` (or resync the document)
    #[error("scene is desynchronized from the native side")]
    Desynchronized,
}

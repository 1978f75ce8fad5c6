//! Trellis DOM - Document Object Model
//!
//! Arena-backed document tree whose every mutation is mirrored, in the same
//! order, into the window's scene context.

mod document;
mod element;
pub mod events;
mod node;
mod operations;
mod style;

pub use document::Document;
pub use events::{Event, EventDetail, EventTarget, Listener, ListenerId, PointerState};
pub use node::{ElementData, Node, NodeData, NodeType};
pub use operations::NodeOperations;
pub use style::StyleDeclaration;

use trellis_scene::SceneError;
use trellis_style::StyleError;

/// Node identifier (index into the document arena)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// The Document node
    pub const DOCUMENT: NodeId = NodeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "node{}", self.0)
    }
}

/// Result type for DOM operations
pub type DomResult<T> = Result<T, DomError>;

/// DOM operation errors
#[derive(Debug, thiserror::Error)]
pub enum DomError {
    /// Bad node handle, or a reference node that is not a child
    #[error("node not found")]
    NotFound,

    #[error("node is not a child of the given parent")]
    NotAChild,

    #[error("hierarchy request error: {0}")]
    HierarchyRequest(&'static str),

    /// Operation needs a different kind of node (e.g. attributes on text)
    #[error("invalid node type for this operation")]
    InvalidNodeType,

    #[error("invalid selector: {0}")]
    InvalidSelector(String),

    #[error(transparent)]
    Style(#[from] StyleError),

    #[error(transparent)]
    Scene(#[from] SceneError),
}

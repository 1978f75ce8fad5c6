//! DOM Node Operations
//!
//! appendChild, insertBefore, removeChild, replaceChild. Each operation
//! validates completely before touching the tree, then mutates the arena and
//! queues the matching scene change in the same order.

use crate::node::Node;
use crate::{Document, DomError, DomResult, NodeId};

/// Node operations trait
pub trait NodeOperations {
    /// Append a child node, moving it from its current parent
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Insert before a reference node (`None` appends)
    fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<NodeId>;

    /// Remove a child node; it keeps its surface for later reinsertion
    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId>;

    /// Replace a child with another node, returning the old child
    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId>;

    /// Detach a node from its parent, if any
    fn remove(&mut self, node: NodeId) -> DomResult<()>;
}

impl Document {
    /// Check that `child` may become a child of `parent`
    ///
    /// `replacing` is the child about to leave `parent` in a replace.
    fn validate_insert(
        &self,
        parent: NodeId,
        child: NodeId,
        replacing: Option<NodeId>,
    ) -> DomResult<()> {
        let parent_node = self.node(parent).ok_or(DomError::NotFound)?;
        let child_node = self.node(child).ok_or(DomError::NotFound)?;

        if !parent_node.is_container() {
            return Err(DomError::HierarchyRequest("text nodes cannot have children"));
        }
        if child == NodeId::DOCUMENT {
            return Err(DomError::HierarchyRequest("the document cannot be inserted"));
        }
        if self.contains(child, parent) {
            return Err(DomError::HierarchyRequest("a node cannot be inserted into itself"));
        }

        if parent == NodeId::DOCUMENT {
            if child_node.is_text() {
                return Err(DomError::HierarchyRequest("the document cannot hold text"));
            }
            let occupied = parent_node
                .children
                .iter()
                .any(|&c| c != child && Some(c) != replacing);
            if occupied {
                return Err(DomError::HierarchyRequest("the document already has an element"));
            }
        }

        Ok(())
    }

    fn is_child_of(&self, parent: NodeId, child: NodeId) -> bool {
        self.node(child).and_then(|n| n.parent) == Some(parent)
    }

    /// Unlink `child` from its parent in the arena and the scene
    fn detach(&mut self, child: NodeId) {
        let Some(parent) = self.node(child).and_then(|n| n.parent) else {
            return;
        };
        let slot = self.node(child).and_then(Node::scene_child);

        if let Some(node) = self.node_mut(parent) {
            node.children.retain(|&c| c != child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = None;
        }

        let parent_surface = self.node(parent).and_then(|n| n.surface);
        if let (Some(parent_surface), Some(slot)) = (parent_surface, slot) {
            self.scene.remove_child(parent_surface, slot);
        }
        tracing::trace!("Detached {} from {}", child, parent);
    }

    /// Validated insertion; `reference` must be a child of `parent` other
    /// than `child`, or `None` to append
    fn insert_validated(
        &mut self,
        parent: NodeId,
        child: NodeId,
        reference: Option<NodeId>,
    ) -> DomResult<()> {
        let parent_surface = self.ensure_surface(parent)?;
        self.ensure_surface(child)?;

        self.detach(child);

        let children = self.child_nodes(parent);
        let index = reference
            .and_then(|r| children.iter().position(|&c| c == r))
            .unwrap_or(children.len());

        if let Some(node) = self.node_mut(parent) {
            node.children.insert(index, child);
        }
        if let Some(node) = self.node_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(slot) = self.node(child).and_then(Node::scene_child) {
            self.scene.insert_at(parent_surface, slot, index as u32);
        }

        tracing::trace!("Inserted {} into {} at {}", child, parent, index);
        Ok(())
    }
}

impl NodeOperations for Document {
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        self.insert_before(parent, child, None)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        ref_child: Option<NodeId>,
    ) -> DomResult<NodeId> {
        if let Some(reference) = ref_child {
            if !self.is_child_of(parent, reference) {
                return Err(DomError::NotFound);
            }
        }
        self.validate_insert(parent, new_child, None)?;

        // inserting a node before itself keeps its position
        let reference = match ref_child {
            Some(r) if r == new_child => self.next_sibling(new_child),
            other => other,
        };

        self.insert_validated(parent, new_child, reference)?;
        Ok(new_child)
    }

    fn remove_child(&mut self, parent: NodeId, child: NodeId) -> DomResult<NodeId> {
        if self.node(parent).is_none() || self.node(child).is_none() {
            return Err(DomError::NotFound);
        }
        if !self.is_child_of(parent, child) {
            return Err(DomError::NotAChild);
        }

        self.detach(child);
        Ok(child)
    }

    fn replace_child(
        &mut self,
        parent: NodeId,
        new_child: NodeId,
        old_child: NodeId,
    ) -> DomResult<NodeId> {
        if self.node(old_child).is_none() {
            return Err(DomError::NotFound);
        }
        if !self.is_child_of(parent, old_child) {
            return Err(DomError::NotAChild);
        }
        self.validate_insert(parent, new_child, Some(old_child))?;

        if new_child == old_child {
            return Ok(old_child);
        }

        self.insert_validated(parent, new_child, Some(old_child))?;
        self.detach(old_child);
        Ok(old_child)
    }

    fn remove(&mut self, node: NodeId) -> DomResult<()> {
        match self.node(node).ok_or(DomError::NotFound)?.parent {
            Some(parent) => self.remove_child(parent, node).map(|_| ()),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_scene::{LoopbackTransport, SceneContext};
    use trellis_wire::{ElementChild, Encoding, SceneChange, SurfaceId};

    fn document() -> Document {
        let transport = LoopbackTransport::new(Encoding::Binary);
        let scene = SceneContext::open(Box::new(transport), Encoding::Binary, "ops", 100, 100).unwrap();
        let mut doc = Document::new(scene).unwrap();
        doc.flush().unwrap();
        doc
    }

    #[test]
    fn test_append_and_insert_before() {
        let mut doc = document();
        let body = doc.body();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        let c = doc.create_element("div");

        doc.append_child(body, a).unwrap();
        doc.append_child(body, c).unwrap();
        doc.insert_before(body, b, Some(c)).unwrap();

        assert_eq!(doc.child_nodes(body), &[a, b, c]);
    }

    #[test]
    fn test_insert_before_self_keeps_position() {
        let mut doc = document();
        let body = doc.body();
        let a = doc.create_element("div");
        let b = doc.create_element("div");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();

        doc.insert_before(body, a, Some(a)).unwrap();
        assert_eq!(doc.child_nodes(body), &[a, b]);
    }

    #[test]
    fn test_move_emits_remove_then_insert() {
        let mut doc = document();
        let (head, body) = (doc.head(), doc.body());
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.flush().unwrap();

        doc.append_child(head, div).unwrap();
        let surface = doc.node(div).unwrap().surface().unwrap();
        assert_eq!(
            doc.scene().pending(),
            &[
                SceneChange::RemoveChild {
                    parent: SurfaceId(3),
                    child: ElementChild::Element(surface),
                },
                SceneChange::InsertAt {
                    parent: SurfaceId(2),
                    child: ElementChild::Element(surface),
                    index: 0,
                },
            ]
        );
    }

    #[test]
    fn test_hierarchy_errors() {
        let mut doc = document();
        let body = doc.body();
        let html = doc.document_element();
        let text = doc.create_text_node("t");
        let div = doc.create_element("div");

        assert!(matches!(doc.append_child(text, div), Err(DomError::HierarchyRequest(_))));
        assert!(matches!(
            doc.append_child(body, NodeId::DOCUMENT),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(doc.append_child(body, html), Err(DomError::HierarchyRequest(_))));
        assert!(matches!(doc.append_child(body, body), Err(DomError::HierarchyRequest(_))));
        assert!(matches!(
            doc.append_child(NodeId::DOCUMENT, div),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(matches!(
            doc.append_child(NodeId::DOCUMENT, text),
            Err(DomError::HierarchyRequest(_))
        ));
        assert!(doc.scene().pending().is_empty());
    }

    #[test]
    fn test_not_found_and_not_a_child() {
        let mut doc = document();
        let body = doc.body();
        let div = doc.create_element("div");
        let stray = doc.create_element("span");

        assert!(matches!(doc.append_child(body, NodeId(999)), Err(DomError::NotFound)));
        assert!(matches!(doc.insert_before(body, div, Some(stray)), Err(DomError::NotFound)));
        assert!(matches!(doc.remove_child(body, stray), Err(DomError::NotAChild)));
        assert!(matches!(doc.replace_child(body, div, stray), Err(DomError::NotAChild)));
        assert_eq!(doc.parent_node(div), None);
    }

    #[test]
    fn test_replace_child() {
        let mut doc = document();
        let body = doc.body();
        let a = doc.create_element("div");
        let b = doc.create_element("p");
        let c = doc.create_element("span");
        doc.append_child(body, a).unwrap();
        doc.append_child(body, b).unwrap();

        assert_eq!(doc.replace_child(body, c, a).unwrap(), a);
        assert_eq!(doc.child_nodes(body), &[c, b]);
        assert_eq!(doc.parent_node(a), None);
    }

    #[test]
    fn test_replace_document_element() {
        let mut doc = document();
        let html = doc.document_element();
        let other = doc.create_element("html");

        doc.replace_child(NodeId::DOCUMENT, other, html).unwrap();
        assert_eq!(doc.child_nodes(NodeId::DOCUMENT), &[other]);
    }

    #[test]
    fn test_remove_keeps_surface() {
        let mut doc = document();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        let surface = doc.node(div).unwrap().surface();

        doc.remove(div).unwrap();
        doc.remove(div).unwrap();
        assert_eq!(doc.node(div).unwrap().surface(), surface);
        assert!(!doc.is_connected(div));
    }
}

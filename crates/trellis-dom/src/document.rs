//! Document - High-level document API
//!
//! Owns the node arena and the window's [`SceneContext`]. Every element or
//! text node that has ever been inserted somewhere holds one native surface;
//! the reverse tables map those surfaces back to nodes for event routing and
//! query results.

use trellis_scene::SceneContext;
use trellis_scene::selector::{SelectorList, SimpleSelector};
use trellis_style::defaults::default_style;
use trellis_style::{PropertyBag, resolve};
use trellis_wire::{Bounds, SurfaceId, TextRecord};

use crate::events::PointerState;
use crate::node::{ElementData, Node, NodeData};
use crate::{DomError, DomResult, NodeId, NodeOperations};

/// Script-side document bound to one native window
pub struct Document {
    pub(crate) nodes: Vec<Node>,
    pub(crate) scene: SceneContext,
    /// Element surface → node; slot 0 is the Document
    element_nodes: Vec<Option<NodeId>>,
    /// Text surface → node
    text_nodes: Vec<Option<NodeId>>,
    html_element: NodeId,
    head_element: NodeId,
    body_element: NodeId,
    pub(crate) pointer: PointerState,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("scene", &self.scene)
            .field("pointer", &self.pointer)
            .finish()
    }
}

impl Document {
    /// Create a document with `html > (head, body)` attached to the root
    pub fn new(scene: SceneContext) -> DomResult<Self> {
        let mut root = Node::new(NodeData::Document);
        root.surface = Some(SurfaceId::ROOT);

        let mut doc = Self {
            nodes: vec![root],
            scene,
            element_nodes: vec![Some(NodeId::DOCUMENT)],
            text_nodes: Vec::new(),
            html_element: NodeId::DOCUMENT,
            head_element: NodeId::DOCUMENT,
            body_element: NodeId::DOCUMENT,
            pointer: PointerState::default(),
        };

        doc.build_skeleton()?;

        tracing::debug!("Created document for {:?}", doc.scene.window());
        Ok(doc)
    }

    /// Throw the whole tree away and start over with a fresh skeleton
    ///
    /// The scene id space is reset first, so nothing from the old tree
    /// reaches the native side again. Listeners on the Document node go too.
    pub fn clear(&mut self) -> DomResult<()> {
        tracing::debug!("Clearing document ({} nodes)", self.nodes.len());
        self.scene.reset();

        let mut root = Node::new(NodeData::Document);
        root.surface = Some(SurfaceId::ROOT);
        self.nodes = vec![root];
        self.element_nodes = vec![Some(NodeId::DOCUMENT)];
        self.text_nodes.clear();
        self.pointer = PointerState::default();

        self.build_skeleton()
    }

    fn build_skeleton(&mut self) -> DomResult<()> {
        let html = self.create_element("html");
        let head = self.create_element("head");
        let body = self.create_element("body");

        self.append_child(NodeId::DOCUMENT, html)?;
        self.append_child(html, head)?;
        self.append_child(html, body)?;

        self.html_element = html;
        self.head_element = head;
        self.body_element = body;
        Ok(())
    }

    /// Give the scene context back, e.g. to destroy the window
    pub fn into_scene(self) -> SceneContext {
        self.scene
    }

    /// `<html>`
    pub fn document_element(&self) -> NodeId {
        self.html_element
    }

    pub fn head(&self) -> NodeId {
        self.head_element
    }

    pub fn body(&self) -> NodeId {
        self.body_element
    }

    pub fn scene(&self) -> &SceneContext {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut SceneContext {
        &mut self.scene
    }

    // Creation

    /// New unattached element; no surface until first insertion
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Element(ElementData::new(tag))))
    }

    pub fn create_text_node(&mut self, data: &str) -> NodeId {
        self.push_node(Node::new(NodeData::Text(data.to_string())))
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.index())
    }

    pub(crate) fn element(&self, id: NodeId) -> DomResult<&ElementData> {
        self.node(id)
            .ok_or(DomError::NotFound)?
            .as_element()
            .ok_or(DomError::InvalidNodeType)
    }

    /// Upper-case tag name, elements only
    pub fn tag_name(&self, id: NodeId) -> Option<String> {
        self.local_name(id).map(str::to_ascii_uppercase)
    }

    pub fn local_name(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.as_element().map(ElementData::local_name)
    }

    // Navigation

    pub fn parent_node(&self, id: NodeId) -> Option<NodeId> {
        self.node(id)?.parent
    }

    pub fn child_nodes(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(Node::children).unwrap_or(&[])
    }

    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).first().copied()
    }

    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.child_nodes(id).last().copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.child_nodes(self.parent_node(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        siblings.get(pos + 1).copied()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let siblings = self.child_nodes(self.parent_node(id)?);
        let pos = siblings.iter().position(|&c| c == id)?;
        pos.checked_sub(1).map(|p| siblings[p])
    }

    /// Is `other` an inclusive descendant of `id`?
    pub fn contains(&self, id: NodeId, other: NodeId) -> bool {
        let mut current = Some(other);
        while let Some(node) = current {
            if node == id {
                return true;
            }
            current = self.parent_node(node);
        }
        false
    }

    /// Is `id` reachable from the Document node?
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.node(id).is_some() && self.contains(NodeId::DOCUMENT, id)
    }

    /// Node owning an element surface
    pub fn node_for_surface(&self, surface: SurfaceId) -> Option<NodeId> {
        self.element_nodes.get(surface.index()).copied().flatten()
    }

    /// Node owning a text surface
    pub fn node_for_text(&self, text: SurfaceId) -> Option<NodeId> {
        self.text_nodes.get(text.index()).copied().flatten()
    }

    // Styles

    /// Tag defaults overlaid by the inline style
    pub(crate) fn effective_style(element: &ElementData) -> PropertyBag {
        let mut bag = default_style(&element.local_name);
        bag.extend(element.inline_style.iter().map(|(k, v)| (k.clone(), v.clone())));
        bag
    }

    // Surfaces

    /// Allocate a surface for `id` if it has none, sending its full state
    ///
    /// A node that already has children but no surface (only possible after
    /// a resync dropped a detached subtree) gets its subtree allocated and
    /// re-inserted too.
    pub(crate) fn ensure_surface(&mut self, id: NodeId) -> DomResult<SurfaceId> {
        let node = self.node(id).ok_or(DomError::NotFound)?;
        if let Some(surface) = node.surface {
            return Ok(surface);
        }

        let surface = match &node.data {
            NodeData::Document => SurfaceId::ROOT,
            NodeData::Element(element) => {
                let tag = element.local_name.clone();
                let attributes = element.attributes.clone();
                let props = resolve(&Self::effective_style(element))?;

                let surface = self.scene.create_surface();
                bind(&mut self.element_nodes, surface, id);
                self.scene.set_tag_name(surface, &tag);
                for (name, value) in &attributes {
                    self.scene.set_attribute(surface, name, Some(value));
                }
                for prop in props {
                    self.scene.set_style_prop(surface, prop);
                }
                surface
            }
            NodeData::Text(data) => {
                let record = TextRecord::new(data.as_str());
                let surface = self.scene.create_text();
                bind(&mut self.text_nodes, surface, id);
                self.scene.set_text(surface, record);
                surface
            }
        };

        let children = match self.node_mut(id) {
            Some(node) => {
                node.surface = Some(surface);
                node.children.clone()
            }
            None => Vec::new(),
        };
        self.attach_children(surface, &children)?;

        Ok(surface)
    }

    fn attach_children(&mut self, surface: SurfaceId, children: &[NodeId]) -> DomResult<()> {
        for (index, &child) in children.iter().enumerate() {
            self.ensure_surface(child)?;
            if let Some(slot) = self.node(child).and_then(Node::scene_child) {
                self.scene.insert_at(surface, slot, index as u32);
            }
        }
        Ok(())
    }

    /// Rebuild the native scene from scratch
    ///
    /// Resets the scene context (recovering from a desync), forgets every
    /// surface and re-sends the tree reachable from the Document node.
    /// Detached subtrees are allocated again on their next insertion.
    pub fn resync(&mut self) -> DomResult<()> {
        tracing::debug!("Resyncing document ({} nodes)", self.nodes.len());
        self.scene.reset();

        for node in self.nodes.iter_mut().skip(1) {
            node.surface = None;
        }
        self.element_nodes = vec![Some(NodeId::DOCUMENT)];
        self.text_nodes.clear();

        let children = self.nodes[0].children.clone();
        self.attach_children(SurfaceId::ROOT, &children)
    }

    /// Ship queued changes; `Ok(false)` when there was nothing to send
    pub fn flush(&mut self) -> DomResult<bool> {
        Ok(self.scene.flush()?)
    }

    // Layout and queries

    /// Layout box from the native side; zero for never-inserted nodes
    pub fn get_offset_bounds(&mut self, id: NodeId) -> DomResult<Bounds> {
        let node = self.node(id).ok_or(DomError::NotFound)?;
        if !node.is_element() && id != NodeId::DOCUMENT {
            return Err(DomError::InvalidNodeType);
        }
        match node.surface {
            Some(surface) => Ok(self.scene.get_offset_bounds(surface)?),
            None => Ok(Bounds::default()),
        }
    }

    /// First element under `scope` matching `selector`
    pub fn query_selector(&mut self, scope: NodeId, selector: &str) -> DomResult<Option<NodeId>> {
        Ok(self.query(scope, selector, false)?.into_iter().next())
    }

    /// Every element under `scope` matching `selector`, in tree order
    pub fn query_selector_all(&mut self, scope: NodeId, selector: &str) -> DomResult<Vec<NodeId>> {
        self.query(scope, selector, true)
    }

    pub fn get_element_by_id(&mut self, element_id: &str) -> DomResult<Option<NodeId>> {
        let selector = format!("#{}", element_id);
        if SimpleSelector::parse(&selector).is_some() {
            return self.query_selector(NodeId::DOCUMENT, &selector);
        }

        // not expressible as a selector; scan the connected tree
        Ok(self.find_by_id(NodeId::DOCUMENT, element_id))
    }

    fn find_by_id(&self, start: NodeId, element_id: &str) -> Option<NodeId> {
        for &child in self.child_nodes(start) {
            let matches = self
                .node(child)
                .and_then(Node::as_element)
                .is_some_and(|el| el.attribute("id") == Some(element_id));
            if matches {
                return Some(child);
            }
            if let Some(found) = self.find_by_id(child, element_id) {
                return Some(found);
            }
        }
        None
    }

    fn query(&mut self, scope: NodeId, selector: &str, all: bool) -> DomResult<Vec<NodeId>> {
        SelectorList::parse(selector).map_err(|e| DomError::InvalidSelector(e.to_string()))?;

        let node = self.node(scope).ok_or(DomError::NotFound)?;
        if node.is_text() {
            return Err(DomError::InvalidNodeType);
        }
        let Some(surface) = node.surface else {
            return Ok(Vec::new());
        };

        let surfaces = self.scene.query(surface, selector, all)?;
        let nodes = surfaces
            .into_iter()
            .filter_map(|surface| {
                let node = self.node_for_surface(surface);
                if node.is_none() {
                    tracing::warn!("Query returned unknown surface {}", surface);
                }
                node
            })
            .collect();
        Ok(nodes)
    }
}

fn bind(table: &mut Vec<Option<NodeId>>, surface: SurfaceId, node: NodeId) {
    let index = surface.index();
    if table.len() <= index {
        table.resize(index + 1, None);
    }
    table[index] = Some(node);
}

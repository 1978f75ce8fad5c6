//! DOM Node types

use trellis_style::PropertyBag;
use trellis_wire::{ElementChild, SurfaceId};

use crate::NodeId;
use crate::events::Listeners;

/// Node type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum NodeType {
    Element = 1,
    Text = 3,
    Document = 9,
}

/// Element payload
#[derive(Debug, Clone, Default)]
pub struct ElementData {
    /// Lowercase local name
    pub(crate) local_name: String,
    /// Attributes in insertion order, names lowercase
    pub(crate) attributes: Vec<(String, String)>,
    /// Inline style (camelCase keys), overlaid on the tag defaults
    pub(crate) inline_style: PropertyBag,
}

impl ElementData {
    pub(crate) fn new(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_ascii_lowercase(),
            ..Default::default()
        }
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn inline_style(&self) -> &PropertyBag {
        &self.inline_style
    }
}

/// Node payload
#[derive(Debug, Clone)]
pub enum NodeData {
    Document,
    Element(ElementData),
    Text(String),
}

/// A node in the arena
#[derive(Debug)]
pub struct Node {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    /// Native surface, assigned on first insertion
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) listeners: Listeners,
}

impl Node {
    pub(crate) fn new(data: NodeData) -> Self {
        Self {
            data,
            parent: None,
            children: Vec::new(),
            surface: None,
            listeners: Listeners::default(),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.data {
            NodeData::Document => NodeType::Document,
            NodeData::Element(_) => NodeType::Element,
            NodeData::Text(_) => NodeType::Text,
        }
    }

    pub fn data(&self) -> &NodeData {
        &self.data
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    pub fn is_element(&self) -> bool {
        matches!(self.data, NodeData::Element(_))
    }

    pub fn is_text(&self) -> bool {
        matches!(self.data, NodeData::Text(_))
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.data {
            NodeData::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Can this node have children?
    pub(crate) fn is_container(&self) -> bool {
        !self.is_text()
    }

    /// This node's slot in its native parent's child list
    pub(crate) fn scene_child(&self) -> Option<ElementChild> {
        let surface = self.surface?;
        match self.data {
            NodeData::Element(_) => Some(ElementChild::Element(surface)),
            NodeData::Text(_) => Some(ElementChild::Text(surface)),
            NodeData::Document => None,
        }
    }
}

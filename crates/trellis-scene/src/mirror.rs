//! Scene Mirror
//!
//! Strict reference applier for [`SceneChange`] batches: the state a native
//! renderer would hold after applying them. Used by the loopback host and
//! by tests comparing script-side trees to what the native side saw.

use std::collections::BTreeMap;

use trellis_wire::{ElementChild, SceneChange, StyleProp, SurfaceId};

/// Applier error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MirrorError {
    #[error("unknown element surface {0}")]
    UnknownElement(SurfaceId),

    #[error("unknown text surface {0}")]
    UnknownText(SurfaceId),

    #[error("index {index} out of range for {parent} with {len} children")]
    IndexOutOfRange { parent: SurfaceId, index: u32, len: usize },

    #[error("{child:?} is not a child of {parent}")]
    NotAChild { parent: SurfaceId, child: ElementChild },

    #[error("{0:?} already has a parent")]
    AlreadyAttached(ElementChild),

    #[error("the root surface cannot be inserted")]
    RootInserted,
}

#[derive(Debug, Clone, Default)]
struct MirrorElement {
    tag: String,
    attributes: BTreeMap<String, String>,
    children: Vec<ElementChild>,
    parent: Option<SurfaceId>,
    styles: BTreeMap<u32, StyleProp>,
}

#[derive(Debug, Clone, Default)]
struct MirrorText {
    text: String,
    parent: Option<SurfaceId>,
}

/// Native-side view of one window's scene
#[derive(Debug, Clone)]
pub struct SceneMirror {
    elements: Vec<MirrorElement>,
    texts: Vec<MirrorText>,
}

impl Default for SceneMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneMirror {
    /// Empty scene holding only the root surface
    pub fn new() -> Self {
        Self {
            elements: vec![MirrorElement::default()],
            texts: Vec::new(),
        }
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn text_count(&self) -> usize {
        self.texts.len()
    }

    /// Apply a batch in order, stopping at the first invalid change
    pub fn apply_all(&mut self, changes: &[SceneChange]) -> Result<(), MirrorError> {
        changes.iter().try_for_each(|change| self.apply(change))
    }

    pub fn apply(&mut self, change: &SceneChange) -> Result<(), MirrorError> {
        match change {
            SceneChange::Realloc { element_count, text_count } => {
                let (elements, texts) = (*element_count as usize, *text_count as usize);
                if elements < self.elements.len() || texts < self.texts.len() {
                    // shrinking is a document-wide reset
                    tracing::debug!("Mirror reset to {} elements, {} texts", elements, texts);
                    *self = Self::new();
                }
                self.elements.resize_with(elements.max(1), MirrorElement::default);
                self.texts.resize_with(texts, MirrorText::default);
            }
            SceneChange::InsertAt { parent, child, index } => {
                self.insert_at(*parent, *child, *index)?;
            }
            SceneChange::RemoveChild { parent, child } => {
                self.remove_child(*parent, *child)?;
            }
            SceneChange::SetStyleProp { surface, prop } => {
                self.element_mut(*surface)?.styles.insert(prop.tag(), prop.clone());
            }
            SceneChange::SetText { text, value } => {
                self.text_mut(*text)?.text = value.text.clone();
            }
            SceneChange::SetTagName { surface, tag } => {
                self.element_mut(*surface)?.tag = tag.to_ascii_lowercase();
            }
            SceneChange::SetAttribute { surface, name, value } => {
                let attributes = &mut self.element_mut(*surface)?.attributes;
                match value {
                    Some(value) => {
                        attributes.insert(name.clone(), value.clone());
                    }
                    None => {
                        attributes.remove(name);
                    }
                }
            }
        }
        Ok(())
    }

    fn insert_at(
        &mut self,
        parent: SurfaceId,
        child: ElementChild,
        index: u32,
    ) -> Result<(), MirrorError> {
        if child == ElementChild::Element(SurfaceId::ROOT) {
            return Err(MirrorError::RootInserted);
        }
        if self.parent_of(child)?.is_some() {
            return Err(MirrorError::AlreadyAttached(child));
        }

        let len = self.element(parent)?.children.len();
        if index as usize > len {
            return Err(MirrorError::IndexOutOfRange { parent, index, len });
        }

        self.element_mut(parent)?.children.insert(index as usize, child);
        self.set_parent(child, Some(parent))
    }

    fn remove_child(&mut self, parent: SurfaceId, child: ElementChild) -> Result<(), MirrorError> {
        let children = &mut self.element_mut(parent)?.children;
        let pos = children
            .iter()
            .position(|c| *c == child)
            .ok_or(MirrorError::NotAChild { parent, child })?;
        children.remove(pos);
        self.set_parent(child, None)
    }

    fn parent_of(&self, child: ElementChild) -> Result<Option<SurfaceId>, MirrorError> {
        Ok(match child {
            ElementChild::Element(id) => self.element(id)?.parent,
            ElementChild::Text(id) => self.text(id)?.parent,
        })
    }

    fn set_parent(&mut self, child: ElementChild, parent: Option<SurfaceId>) -> Result<(), MirrorError> {
        match child {
            ElementChild::Element(id) => self.element_mut(id)?.parent = parent,
            ElementChild::Text(id) => self.text_mut(id)?.parent = parent,
        }
        Ok(())
    }

    fn element(&self, id: SurfaceId) -> Result<&MirrorElement, MirrorError> {
        self.elements.get(id.index()).ok_or(MirrorError::UnknownElement(id))
    }

    fn element_mut(&mut self, id: SurfaceId) -> Result<&mut MirrorElement, MirrorError> {
        self.elements.get_mut(id.index()).ok_or(MirrorError::UnknownElement(id))
    }

    fn text(&self, id: SurfaceId) -> Result<&MirrorText, MirrorError> {
        self.texts.get(id.index()).ok_or(MirrorError::UnknownText(id))
    }

    fn text_mut(&mut self, id: SurfaceId) -> Result<&mut MirrorText, MirrorError> {
        self.texts.get_mut(id.index()).ok_or(MirrorError::UnknownText(id))
    }

    // Read access

    pub fn children(&self, surface: SurfaceId) -> Option<&[ElementChild]> {
        self.elements.get(surface.index()).map(|e| e.children.as_slice())
    }

    pub fn parent(&self, child: ElementChild) -> Option<SurfaceId> {
        self.parent_of(child).ok().flatten()
    }

    /// Lowercase tag name; empty for the root and untagged surfaces
    pub fn tag_name(&self, surface: SurfaceId) -> Option<&str> {
        self.elements.get(surface.index()).map(|e| e.tag.as_str())
    }

    pub fn attribute(&self, surface: SurfaceId, name: &str) -> Option<&str> {
        self.elements
            .get(surface.index())?
            .attributes
            .get(name)
            .map(String::as_str)
    }

    pub fn text_content(&self, text: SurfaceId) -> Option<&str> {
        self.texts.get(text.index()).map(|t| t.text.as_str())
    }

    /// Last style prop of the given wire tag applied to `surface`
    pub fn style(&self, surface: SurfaceId, tag: u32) -> Option<&StyleProp> {
        self.elements.get(surface.index())?.styles.get(&tag)
    }

    /// Element descendants of `root` in tree (pre-)order, `root` excluded
    pub fn descendants(&self, root: SurfaceId) -> Vec<SurfaceId> {
        let mut out = Vec::new();
        let mut stack: Vec<SurfaceId> = self
            .children(root)
            .unwrap_or_default()
            .iter()
            .rev()
            .filter_map(|c| c.as_element())
            .collect();

        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(children) = self.children(id) {
                stack.extend(children.iter().rev().filter_map(|c| c.as_element()));
            }
        }
        out
    }
}

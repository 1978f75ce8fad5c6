//! Element Attributes and Text
//!
//! get/set/remove/has attribute and text node data. Changes on nodes that
//! already own a surface are mirrored to the scene right away; the `style`
//! attribute is routed to the inline style bag instead.

use trellis_style::properties::camel_case;
use trellis_style::{PropertyBag, StyleValue};
use trellis_wire::TextRecord;

use crate::node::NodeData;
use crate::{Document, DomError, DomResult, NodeId};

const STYLE_ATTRIBUTE: &str = "style";

impl Document {
    pub fn get_attribute(&self, element: NodeId, name: &str) -> DomResult<Option<String>> {
        let data = self.element(element)?;
        if name.eq_ignore_ascii_case(STYLE_ATTRIBUTE) {
            let css = self.css_text(element)?;
            return Ok((!css.is_empty()).then_some(css));
        }
        Ok(data.attribute(name).map(str::to_string))
    }

    pub fn has_attribute(&self, element: NodeId, name: &str) -> DomResult<bool> {
        Ok(self.get_attribute(element, name)?.is_some())
    }

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        if name == STYLE_ATTRIBUTE {
            let bag = parse_declarations(value);
            return self.update_inline_style(element, |inline| *inline = bag);
        }

        let node = self.node_mut(element).ok_or(DomError::NotFound)?;
        let surface = node.surface;
        let data = node.as_element_mut().ok_or(DomError::InvalidNodeType)?;

        match data.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = value.to_string(),
            None => data.attributes.push((name.clone(), value.to_string())),
        }

        if let Some(surface) = surface {
            self.scene.set_attribute(surface, &name, Some(value));
        }
        Ok(())
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) -> DomResult<()> {
        let name = name.to_ascii_lowercase();
        if name == STYLE_ATTRIBUTE {
            return self.update_inline_style(element, PropertyBag::clear);
        }

        let node = self.node_mut(element).ok_or(DomError::NotFound)?;
        let surface = node.surface;
        let data = node.as_element_mut().ok_or(DomError::InvalidNodeType)?;

        let before = data.attributes.len();
        data.attributes.retain(|(n, _)| *n != name);
        if data.attributes.len() == before {
            return Ok(());
        }

        if let Some(surface) = surface {
            self.scene.set_attribute(surface, &name, None);
        }
        Ok(())
    }

    /// Data of a text node
    pub fn text_data(&self, text: NodeId) -> DomResult<&str> {
        match &self.node(text).ok_or(DomError::NotFound)?.data {
            NodeData::Text(data) => Ok(data),
            _ => Err(DomError::InvalidNodeType),
        }
    }

    pub fn set_text_data(&mut self, text: NodeId, value: &str) -> DomResult<()> {
        let node = self.node_mut(text).ok_or(DomError::NotFound)?;
        let NodeData::Text(data) = &mut node.data else {
            return Err(DomError::InvalidNodeType);
        };
        *data = value.to_string();

        if let Some(surface) = node.surface {
            self.scene.set_text(surface, TextRecord::new(value));
        }
        Ok(())
    }

    /// Concatenated text of `node` and its descendants
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(node, &mut out);
        out
    }

    fn collect_text(&self, node: NodeId, out: &mut String) {
        let Some(n) = self.node(node) else {
            return;
        };
        if let NodeData::Text(data) = &n.data {
            out.push_str(data);
        }
        for &child in &n.children {
            self.collect_text(child, out);
        }
    }
}

/// Parse `name: value; ...` into a bag with camelCase keys
///
/// Numeric values become numbers; anything else is kept as a string and
/// validated when the style is resolved. Malformed declarations are skipped.
fn parse_declarations(css: &str) -> PropertyBag {
    let mut bag = PropertyBag::new();
    for declaration in css.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            if !declaration.trim().is_empty() {
                tracing::trace!("Skipping malformed declaration {:?}", declaration);
            }
            continue;
        };
        let (name, value) = (name.trim(), value.trim());
        if name.is_empty() || value.is_empty() {
            continue;
        }

        let value = match value.parse::<f32>() {
            Ok(n) => StyleValue::Number(n),
            Err(_) => StyleValue::Str(value.to_string()),
        };
        bag.insert(camel_case(&name.to_ascii_lowercase()).into_owned(), value);
    }
    bag
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NodeOperations;
    use trellis_scene::{LoopbackTransport, SceneContext};
    use trellis_wire::{Encoding, SceneChange};

    fn document() -> Document {
        let transport = LoopbackTransport::new(Encoding::Binary);
        let scene = SceneContext::open(Box::new(transport), Encoding::Binary, "el", 100, 100).unwrap();
        let mut doc = Document::new(scene).unwrap();
        doc.flush().unwrap();
        doc
    }

    #[test]
    fn test_parse_declarations() {
        let bag = parse_declarations("width: 10px; background-color: #fff;; flex:1; bogus");
        assert_eq!(bag.get("width"), Some(&StyleValue::Str("10px".into())));
        assert_eq!(bag.get("backgroundColor"), Some(&StyleValue::Str("#fff".into())));
        assert_eq!(bag.get("flex"), Some(&StyleValue::Number(1.0)));
        assert_eq!(bag.len(), 3);
    }

    #[test]
    fn test_attributes_on_unallocated_element() {
        let mut doc = document();
        let div = doc.create_element("div");

        doc.set_attribute(div, "ID", "main").unwrap();
        assert_eq!(doc.get_attribute(div, "id").unwrap().as_deref(), Some("main"));
        assert!(doc.has_attribute(div, "Id").unwrap());
        assert!(doc.scene().pending().is_empty());

        doc.remove_attribute(div, "id").unwrap();
        assert!(!doc.has_attribute(div, "id").unwrap());
    }

    #[test]
    fn test_attribute_mirrored_once_allocated() {
        let mut doc = document();
        let body = doc.body();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.flush().unwrap();

        doc.set_attribute(div, "class", "a b").unwrap();
        doc.remove_attribute(div, "class").unwrap();
        doc.remove_attribute(div, "class").unwrap();

        let surface = doc.node(div).unwrap().surface().unwrap();
        assert_eq!(
            doc.scene().pending(),
            &[
                SceneChange::SetAttribute {
                    surface,
                    name: "class".into(),
                    value: Some("a b".into()),
                },
                SceneChange::SetAttribute { surface, name: "class".into(), value: None },
            ]
        );
    }

    #[test]
    fn test_attributes_need_element() {
        let mut doc = document();
        let text = doc.create_text_node("t");
        assert!(matches!(doc.set_attribute(text, "id", "x"), Err(DomError::InvalidNodeType)));
        assert!(matches!(doc.get_attribute(NodeId(500), "id"), Err(DomError::NotFound)));
    }

    #[test]
    fn test_text_data_and_content() {
        let mut doc = document();
        let body = doc.body();
        let p = doc.create_element("p");
        let a = doc.create_text_node("hello ");
        let b = doc.create_text_node("world");
        doc.append_child(p, a).unwrap();
        doc.append_child(p, b).unwrap();
        doc.append_child(body, p).unwrap();

        assert_eq!(doc.text_content(p), "hello world");

        doc.flush().unwrap();
        doc.set_text_data(b, "there").unwrap();
        assert_eq!(doc.text_data(b).unwrap(), "there");

        let surface = doc.node(b).unwrap().surface().unwrap();
        assert_eq!(
            doc.scene().pending(),
            &[SceneChange::SetText { text: surface, value: TextRecord::new("there") }]
        );
        assert!(matches!(doc.text_data(p), Err(DomError::InvalidNodeType)));
    }

    #[test]
    fn test_style_attribute_feeds_inline_style() {
        let mut doc = document();
        let div = doc.create_element("div");

        doc.set_attribute(div, "style", "width: 50%; padding-top: 4px").unwrap();
        let inline = doc.node(div).unwrap().as_element().unwrap().inline_style();
        assert_eq!(inline.len(), 2);
        assert!(inline.contains_key("paddingTop"));
        assert!(doc.get_attribute(div, "style").unwrap().is_some());

        assert!(matches!(
            doc.set_attribute(div, "style", "width: wide"),
            Err(DomError::Style(_))
        ));
        assert_eq!(doc.node(div).unwrap().as_element().unwrap().inline_style().len(), 2);

        doc.remove_attribute(div, "style").unwrap();
        assert_eq!(doc.get_attribute(div, "style").unwrap(), None);
    }
}

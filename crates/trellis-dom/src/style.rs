//! Inline style declarations
//!
//! `doc.style(el)` hands out a [`StyleDeclaration`] over the element's inline
//! bag. Every mutation diffs the effective style (tag defaults overlaid by
//! the inline bag) before and after, and queues one `SetStyleProp` per
//! damaged group. A value that fails to resolve leaves the style untouched.

use trellis_style::properties::{camel_case, is_known, kebab_case};
use trellis_style::{PropertyBag, StyleValue, diff_style};

use crate::{Document, DomError, DomResult, NodeId};

/// Handle on one element's inline style
pub struct StyleDeclaration<'a> {
    doc: &'a mut Document,
    element: NodeId,
}

impl Document {
    /// Inline style handle; fails for non-elements
    pub fn style(&mut self, element: NodeId) -> DomResult<StyleDeclaration<'_>> {
        self.element(element)?;
        Ok(StyleDeclaration { doc: self, element })
    }

    /// Inline style serialized as `name: value; ...` with kebab-case names
    pub fn css_text(&self, element: NodeId) -> DomResult<String> {
        let inline = &self.element(element)?.inline_style;
        let declarations: Vec<String> = inline
            .iter()
            .map(|(key, value)| format!("{}: {}", kebab_case(key), value))
            .collect();
        Ok(declarations.join("; "))
    }

    /// Apply `edit` to the inline bag of `element`
    ///
    /// The change is committed only if every damaged group resolves.
    pub(crate) fn update_inline_style<F>(&mut self, element: NodeId, edit: F) -> DomResult<()>
    where
        F: FnOnce(&mut PropertyBag),
    {
        let data = self.element(element)?;
        let prev = Self::effective_style(data);

        let mut updated = data.clone();
        edit(&mut updated.inline_style);
        let next = Self::effective_style(&updated);

        let props = diff_style(&next, &prev)?;

        let node = self.node_mut(element).ok_or(DomError::NotFound)?;
        let surface = node.surface;
        if let Some(data) = node.as_element_mut() {
            data.inline_style = updated.inline_style;
        }

        if let Some(surface) = surface {
            tracing::trace!("Restyling {} ({} groups)", element, props.len());
            for prop in props {
                self.scene.set_style_prop(surface, prop);
            }
        }
        Ok(())
    }
}

/// Generate a getter/setter pair for a bag key
macro_rules! style_accessors {
    ($($getter:ident, $setter:ident => $key:literal;)+) => {
        impl StyleDeclaration<'_> {
            $(
                pub fn $getter(&self) -> Option<String> {
                    self.get_property($key)
                }

                pub fn $setter(&mut self, value: impl Into<StyleValue>) -> DomResult<()> {
                    self.set_value($key, value.into())
                }
            )+
        }
    };
}

style_accessors! {
    width, set_width => "width";
    height, set_height => "height";
    flex, set_flex => "flex";
    flex_grow, set_flex_grow => "flexGrow";
    flex_shrink, set_flex_shrink => "flexShrink";
    flex_basis, set_flex_basis => "flexBasis";
    flex_direction, set_flex_direction => "flexDirection";
    flex_wrap, set_flex_wrap => "flexWrap";
    align_content, set_align_content => "alignContent";
    align_items, set_align_items => "alignItems";
    align_self, set_align_self => "alignSelf";
    justify_content, set_justify_content => "justifyContent";
    padding, set_padding => "padding";
    padding_top, set_padding_top => "paddingTop";
    padding_right, set_padding_right => "paddingRight";
    padding_bottom, set_padding_bottom => "paddingBottom";
    padding_left, set_padding_left => "paddingLeft";
    margin, set_margin => "margin";
    margin_top, set_margin_top => "marginTop";
    margin_right, set_margin_right => "marginRight";
    margin_bottom, set_margin_bottom => "marginBottom";
    margin_left, set_margin_left => "marginLeft";
    border_radius, set_border_radius => "borderRadius";
    border_width, set_border_width => "borderWidth";
    border_color, set_border_color => "borderColor";
    border_style, set_border_style => "borderStyle";
    background_color, set_background_color => "backgroundColor";
    background_image_url, set_background_image_url => "backgroundImageUrl";
    color, set_color => "color";
    font_size, set_font_size => "fontSize";
    line_height, set_line_height => "lineHeight";
    text_align, set_text_align => "textAlign";
    overflow, set_overflow => "overflow";
}

impl StyleDeclaration<'_> {
    pub fn element(&self) -> NodeId {
        self.element
    }

    /// Inline value of `name` (kebab-case or camelCase)
    pub fn get_property(&self, name: &str) -> Option<String> {
        let key = camel_case(name);
        self.doc
            .element(self.element)
            .ok()?
            .inline_style
            .get(key.as_ref())
            .map(ToString::to_string)
    }

    /// Set `name`; an empty value removes it
    pub fn set_property(&mut self, name: &str, value: &str) -> DomResult<()> {
        let value = value.trim();
        if value.is_empty() {
            return self.remove_property(name);
        }
        let value = match value.parse::<f32>() {
            Ok(n) => StyleValue::Number(n),
            Err(_) => StyleValue::Str(value.to_string()),
        };
        self.set_value(name, value)
    }

    pub fn remove_property(&mut self, name: &str) -> DomResult<()> {
        let key = camel_case(name).into_owned();
        self.doc
            .update_inline_style(self.element, |inline| {
                inline.remove(&key);
            })
    }

    pub fn css_text(&self) -> String {
        self.doc.css_text(self.element).unwrap_or_default()
    }

    fn set_value(&mut self, name: &str, value: StyleValue) -> DomResult<()> {
        let key = camel_case(name).into_owned();
        if !is_known(&key) {
            tracing::debug!("Style property {} is kept but not rendered", key);
        }
        self.doc
            .update_inline_style(self.element, |inline| {
                inline.insert(key, value);
            })
    }
}

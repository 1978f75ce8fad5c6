//! Per-tag default styles
//!
//! A small reboot-like sheet. The effective style of an element is its tag
//! defaults overlaid by its inline style.

use crate::{PropertyBag, StyleValue};

const EM: f32 = 16.0;

/// Default bag for `tag` (case-insensitive); empty for unknown tags
pub fn default_style(tag: &str) -> PropertyBag {
    let entries: &[(&str, StyleValue)] = match tag.to_ascii_uppercase().as_str() {
        "BODY" => &[w("width", "100%"), w("height", "100%")],

        "H1" => &heading(2.5),
        "H2" => &heading(2.0),
        "H3" => &heading(1.75),
        "H4" => &heading(1.5),
        "H5" => &heading(1.25),
        "H6" => &heading(1.0),

        "BUTTON" => &[
            w("backgroundColor", "#2196F3"),
            n("paddingLeft", 10.0),
            n("paddingRight", 10.0),
            n("borderRadius", 2.0),
            n("fontSize", 14.0),
            n("lineHeight", 32.0),
            w("color", "#ffffff"),
            w("textAlign", "center"),
            w("justifyContent", "space-around"),
        ],

        "A" => &[w("color", "#4338ad")],

        "P" => &[n("marginBottom", EM)],

        "INPUT" => &[n("lineHeight", EM), n("padding", 0.5 * EM)],

        "TABLE" | "THEAD" | "TBODY" => &[w("flexDirection", "column")],

        "TR" => &[w("flexDirection", "row"), w("width", "100%")],

        "TH" => &[n("flex", 1.0), w("color", "#666")],

        "TD" => &[n("flex", 1.0)],

        _ => &[],
    };

    entries
        .iter()
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
}

fn heading(scale: f32) -> [(&'static str, StyleValue); 3] {
    [
        n("fontSize", scale * EM),
        n("lineHeight", 1.2 * scale * EM),
        n("marginBottom", 0.5 * EM),
    ]
}

fn n(key: &'static str, value: f32) -> (&'static str, StyleValue) {
    (key, StyleValue::Number(value))
}

fn w(key: &'static str, value: &str) -> (&'static str, StyleValue) {
    (key, StyleValue::Str(value.to_string()))
}

//! Property Names
//!
//! Bags use camelCase keys (`backgroundColor`). CSS text and attribute
//! styles use kebab-case (`background-color`); convert at the boundary.

use std::borrow::Cow;

/// Every key the resolver understands, in group order
pub const KNOWN_PROPERTIES: &[&str] = &[
    // Size
    "width",
    "height",
    // Flex
    "flex",
    "flexGrow",
    "flexShrink",
    "flexBasis",
    // Flow
    "flexDirection",
    "flexWrap",
    "alignContent",
    "alignItems",
    "alignSelf",
    "justifyContent",
    // Padding
    "padding",
    "paddingVertical",
    "paddingHorizontal",
    "paddingTop",
    "paddingRight",
    "paddingBottom",
    "paddingLeft",
    // Margin
    "margin",
    "marginVertical",
    "marginHorizontal",
    "marginTop",
    "marginRight",
    "marginBottom",
    "marginLeft",
    // BorderRadius
    "borderRadius",
    "borderTopLeftRadius",
    "borderTopRightRadius",
    "borderBottomRightRadius",
    "borderBottomLeftRadius",
    // Border
    "borderWidth",
    "borderColor",
    "borderStyle",
    "borderTopWidth",
    "borderRightWidth",
    "borderBottomWidth",
    "borderLeftWidth",
    "borderTopColor",
    "borderRightColor",
    "borderBottomColor",
    "borderLeftColor",
    "borderTopStyle",
    "borderRightStyle",
    "borderBottomStyle",
    "borderLeftStyle",
    // BoxShadow
    "shadowColor",
    "shadowRadius",
    "shadowSpread",
    "shadowOffsetX",
    "shadowOffsetY",
    // BackgroundColor, Image
    "backgroundColor",
    "backgroundImageUrl",
    // Text
    "color",
    "fontSize",
    "lineHeight",
    "textAlign",
    // Overflow
    "overflow",
];

/// Normalize a property name to its bag key
///
/// `background-color` → `backgroundColor`. Names without dashes are
/// returned as-is.
pub fn camel_case(name: &str) -> Cow<'_, str> {
    if !name.contains('-') {
        return Cow::Borrowed(name);
    }

    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for ch in name.chars() {
        if ch == '-' {
            // leading dash (vendor prefix) stays lowercase
            upper = !out.is_empty();
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    Cow::Owned(out)
}

/// Inverse of [`camel_case`]
pub fn kebab_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for ch in key.chars() {
        if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// Is `key` (camelCase) resolved by some group?
pub fn is_known(key: &str) -> bool {
    KNOWN_PROPERTIES.contains(&key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::group_of;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("background-color"), "backgroundColor");
        assert_eq!(camel_case("border-top-left-radius"), "borderTopLeftRadius");
        assert_eq!(camel_case("width"), "width");
        assert!(matches!(camel_case("width"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("justifyContent"), "justify-content");
        assert_eq!(camel_case(&kebab_case("borderBottomLeftRadius")), "borderBottomLeftRadius");
    }

    #[test]
    fn test_known_properties_match_group_table() {
        for key in KNOWN_PROPERTIES {
            assert!(group_of(key).is_some(), "{} has no group", key);
        }
        assert!(!is_known("display"));
    }
}

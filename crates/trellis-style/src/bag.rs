//! Property bags

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Loosely typed style value, as scripts write it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StyleValue {
    Number(f32),
    Str(String),
}

impl StyleValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            StyleValue::Str(s) => Some(s),
            StyleValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StyleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StyleValue::Number(n) => write!(f, "{}", n),
            StyleValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<f32> for StyleValue {
    fn from(n: f32) -> Self {
        StyleValue::Number(n)
    }
}

impl From<i32> for StyleValue {
    fn from(n: i32) -> Self {
        StyleValue::Number(n as f32)
    }
}

impl From<&str> for StyleValue {
    fn from(s: &str) -> Self {
        StyleValue::Str(s.to_string())
    }
}

impl From<String> for StyleValue {
    fn from(s: String) -> Self {
        StyleValue::Str(s)
    }
}

/// Flat camelCase property map
///
/// Ordered so that iteration (and therefore tracing output) is stable.
pub type PropertyBag = BTreeMap<String, StyleValue>;

/// Build a [`PropertyBag`] from `key => value` pairs
#[macro_export]
macro_rules! bag {
    ($($key:expr => $value:expr),* $(,)?) => {{
        #[allow(unused_mut)]
        let mut bag = $crate::PropertyBag::new();
        $(bag.insert(String::from($key), $crate::StyleValue::from($value));)*
        bag
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bag_from_json() {
        let bag: PropertyBag =
            serde_json::from_str(r##"{"padding": 10, "backgroundColor": "#fff"}"##).unwrap();

        assert_eq!(bag.get("padding"), Some(&StyleValue::Number(10.0)));
        assert_eq!(bag.get("backgroundColor"), Some(&StyleValue::from("#fff")));
    }

    #[test]
    fn test_bag_macro() {
        let bag = bag! { "width" => 100, "height" => "50%" };
        assert_eq!(bag.len(), 2);
        assert_eq!(bag["width"], StyleValue::Number(100.0));
    }
}

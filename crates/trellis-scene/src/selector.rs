//! Simple selector matching for native-side queries
//!
//! Supports selector lists of compound selectors built from `tag`, `#id`,
//! `.class` and `*` (`button.primary, #main`). No combinators.

/// One simple selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Universal,
}

/// Simple selectors that must all match
pub type Compound = Vec<SimpleSelector>;

/// Comma-separated selector list, matching if any compound matches
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorList(pub Vec<Compound>);

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported selector: {0:?}")]
pub struct SelectorError(pub String);

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

impl SimpleSelector {
    /// Parse a single simple selector
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        let name_ok = |name: &str| !name.is_empty() && name.chars().all(is_name_char);

        if s == "*" {
            Some(Self::Universal)
        } else if let Some(id) = s.strip_prefix('#') {
            name_ok(id).then(|| Self::Id(id.to_string()))
        } else if let Some(class) = s.strip_prefix('.') {
            name_ok(class).then(|| Self::Class(class.to_string()))
        } else {
            name_ok(s).then(|| Self::Tag(s.to_ascii_lowercase()))
        }
    }
}

impl SelectorList {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let err = || SelectorError(input.to_string());

        let compounds = input
            .split(',')
            .map(|part| parse_compound(part.trim()).ok_or_else(err))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self(compounds))
    }

    pub fn matches(&self, element: &ElementContext<'_>) -> bool {
        self.0
            .iter()
            .any(|compound| compound.iter().all(|s| element.matches(s)))
    }
}

/// Split `div.a#b` into `div`, `.a`, `#b`
fn parse_compound(s: &str) -> Option<Compound> {
    if s.is_empty() {
        return None;
    }

    let mut parts = Vec::new();
    let mut start = 0;
    for (i, c) in s.char_indices().skip(1) {
        if c == '.' || c == '#' {
            parts.push(&s[start..i]);
            start = i;
        }
    }
    parts.push(&s[start..]);

    parts.into_iter().map(SimpleSelector::parse).collect()
}

/// What the matcher needs to know about one element
#[derive(Debug, Clone, Copy)]
pub struct ElementContext<'a> {
    pub tag_name: &'a str,
    pub id: Option<&'a str>,
    /// Raw `class` attribute, whitespace separated
    pub class: Option<&'a str>,
}

impl ElementContext<'_> {
    pub fn matches(&self, selector: &SimpleSelector) -> bool {
        match selector {
            SimpleSelector::Universal => true,
            SimpleSelector::Tag(tag) => self.tag_name.eq_ignore_ascii_case(tag),
            SimpleSelector::Id(id) => self.id == Some(id.as_str()),
            SimpleSelector::Class(class) => self
                .class
                .is_some_and(|list| list.split_whitespace().any(|c| c == class)),
        }
    }
}

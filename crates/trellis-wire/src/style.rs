//! Resolved style records
//!
//! Values here are fully resolved and unit normalized. No strings (other
//! than image URLs), no shorthands.

use serde::{Deserialize, Serialize};

/// One resolved style group, attached to a surface by `SetStyleProp`
///
/// Wire tags follow declaration order (0 = Size ... 11 = Overflow).
/// `None` payloads reset the group on the native side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum StyleProp {
    Size(Size),
    Flex(Flex),
    Flow(Flow),
    Padding(Rect),
    Margin(Rect),
    BorderRadius(Option<BorderRadius>),
    Border(Option<Border>),
    BoxShadow(Option<BoxShadow>),
    BackgroundColor(Option<Color>),
    Image(Option<Image>),
    Text(Option<TextStyle>),
    Overflow(Overflow),
}

impl StyleProp {
    /// Wire discriminant
    pub fn tag(&self) -> u32 {
        match self {
            Self::Size(_) => 0,
            Self::Flex(_) => 1,
            Self::Flow(_) => 2,
            Self::Padding(_) => 3,
            Self::Margin(_) => 4,
            Self::BorderRadius(_) => 5,
            Self::Border(_) => 6,
            Self::BoxShadow(_) => 7,
            Self::BackgroundColor(_) => 8,
            Self::Image(_) => 9,
            Self::Text(_) => 10,
            Self::Overflow(_) => 11,
        }
    }
}

/// Layout dimension
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "tag", content = "value")]
pub enum Dimension {
    #[default]
    Auto,
    Point(f32),
    Percent(f32),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: Dimension,
    pub height: Dimension,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Flex {
    pub grow: f32,
    pub shrink: f32,
    pub basis: Dimension,
}

/// Flex container flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flow {
    pub direction: FlexDirection,
    pub wrap: FlexWrap,
    pub align_content: Align,
    pub align_items: Align,
    pub align_self: Align,
    pub justify_content: JustifyContent,
}

/// Four edges, clockwise from the top
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub top: Dimension,
    pub right: Dimension,
    pub bottom: Dimension,
    pub left: Dimension,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BorderRadius {
    pub top_left: f32,
    pub top_right: f32,
    pub bottom_right: f32,
    pub bottom_left: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Border {
    pub top: BorderSide,
    pub right: BorderSide,
    pub bottom: BorderSide,
    pub left: BorderSide,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderSide {
    pub width: f32,
    pub style: BorderStyle,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoxShadow {
    pub color: Color,
    pub offset: Vector2f,
    pub blur: f32,
    pub spread: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector2f {
    pub x: f32,
    pub y: f32,
}

impl Vector2f {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Packed RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0, 255);
    pub const TRANSPARENT: Color = Color::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Channels as `[r, g, b, a]`
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
}

/// Text styling of an element, inherited by its text children
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub color: Color,
    pub font_size: f32,
    pub line_height: f32,
    pub align: TextAlign,
}

code_enum! {
    pub enum FlexDirection {
        Column = 0,
        ColumnReverse = 1,
        Row = 2,
        RowReverse = 3,
    }
}

code_enum! {
    pub enum FlexWrap {
        NoWrap = 0,
        Wrap = 1,
        WrapReverse = 2,
    }
}

code_enum! {
    /// Cross-axis alignment (`align-*`)
    pub enum Align {
        Auto = 0,
        FlexStart = 1,
        Center = 2,
        FlexEnd = 3,
        Stretch = 4,
        Baseline = 5,
        SpaceBetween = 6,
        SpaceAround = 7,
    }
}

code_enum! {
    pub enum JustifyContent {
        FlexStart = 0,
        Center = 1,
        FlexEnd = 2,
        SpaceBetween = 3,
        SpaceAround = 4,
        SpaceEvenly = 5,
    }
}

code_enum! {
    pub enum Overflow {
        Visible = 0,
        Hidden = 1,
        Scroll = 2,
    }
}

code_enum! {
    pub enum TextAlign {
        Left = 0,
        Center = 1,
        Right = 2,
    }
}

code_enum! {
    pub enum BorderStyle {
        None = 0,
        Solid = 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_prop_tags_follow_declaration_order() {
        let props = [
            StyleProp::Size(Size::default()),
            StyleProp::Padding(Rect::default()),
            StyleProp::BorderRadius(None),
            StyleProp::BackgroundColor(Some(Color::BLACK)),
            StyleProp::Overflow(Overflow::Hidden),
        ];
        let tags: Vec<u32> = props.iter().map(StyleProp::tag).collect();
        assert_eq!(tags, vec![0, 3, 5, 8, 11]);
    }

    #[test]
    fn test_code_enum_lookup() {
        assert_eq!(FlexDirection::from_u8(2), Some(FlexDirection::Row));
        assert_eq!(Align::SpaceAround.code(), 7);
        assert_eq!(JustifyContent::from_u8(6), None);
    }
}

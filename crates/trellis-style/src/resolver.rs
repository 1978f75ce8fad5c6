//! Group resolvers
//!
//! One resolver per [`StyleProp`] variant. Each reads only the keys of its
//! own group, so a group can be re-resolved in isolation when diffing.

use std::collections::BTreeSet;

use trellis_wire::{
    Align, Border, BorderRadius, BorderSide, BorderStyle, BoxShadow, Color, Dimension, Flex,
    FlexDirection, FlexWrap, Flow, Image, JustifyContent, Overflow, Rect, Size, StyleProp,
    TextAlign, TextStyle, Vector2f,
};

use crate::parsers::*;
use crate::{PropertyBag, StyleError, StyleValue};

/// Damage unit: one resolvable style group, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum StyleGroup {
    Size,
    Flex,
    Flow,
    Padding,
    Margin,
    BorderRadius,
    Border,
    BoxShadow,
    BackgroundColor,
    Image,
    Text,
    Overflow,
}

impl StyleGroup {
    pub const ALL: [StyleGroup; 12] = [
        StyleGroup::Size,
        StyleGroup::Flex,
        StyleGroup::Flow,
        StyleGroup::Padding,
        StyleGroup::Margin,
        StyleGroup::BorderRadius,
        StyleGroup::Border,
        StyleGroup::BoxShadow,
        StyleGroup::BackgroundColor,
        StyleGroup::Image,
        StyleGroup::Text,
        StyleGroup::Overflow,
    ];
}

/// Static key → group table
pub fn group_of(key: &str) -> Option<StyleGroup> {
    Some(match key {
        "width" | "height" => StyleGroup::Size,

        "flex" | "flexGrow" | "flexShrink" | "flexBasis" => StyleGroup::Flex,

        "flexDirection" | "flexWrap" | "alignContent" | "alignItems" | "alignSelf"
        | "justifyContent" => StyleGroup::Flow,

        "padding" | "paddingVertical" | "paddingHorizontal" | "paddingTop" | "paddingRight"
        | "paddingBottom" | "paddingLeft" => StyleGroup::Padding,

        "margin" | "marginVertical" | "marginHorizontal" | "marginTop" | "marginRight"
        | "marginBottom" | "marginLeft" => StyleGroup::Margin,

        "borderRadius" | "borderTopLeftRadius" | "borderTopRightRadius"
        | "borderBottomRightRadius" | "borderBottomLeftRadius" => StyleGroup::BorderRadius,

        "borderWidth" | "borderColor" | "borderStyle" | "borderTopWidth" | "borderRightWidth"
        | "borderBottomWidth" | "borderLeftWidth" | "borderTopColor" | "borderRightColor"
        | "borderBottomColor" | "borderLeftColor" | "borderTopStyle" | "borderRightStyle"
        | "borderBottomStyle" | "borderLeftStyle" => StyleGroup::Border,

        "shadowColor" | "shadowRadius" | "shadowSpread" | "shadowOffsetX" | "shadowOffsetY" => {
            StyleGroup::BoxShadow
        }

        "backgroundColor" => StyleGroup::BackgroundColor,
        "backgroundImageUrl" => StyleGroup::Image,

        "color" | "fontSize" | "lineHeight" | "textAlign" => StyleGroup::Text,

        "overflow" => StyleGroup::Overflow,

        _ => return None,
    })
}

/// Resolve a whole bag
///
/// Emits one [`StyleProp`] per group with at least one key present, in
/// group order. Keys outside every group are ignored.
pub fn resolve(bag: &PropertyBag) -> Result<Vec<StyleProp>, StyleError> {
    let mut groups = BTreeSet::new();

    for key in bag.keys() {
        match group_of(key) {
            Some(group) => {
                groups.insert(group);
            }
            None => tracing::trace!("Ignoring style key without a group: {}", key),
        }
    }

    groups.into_iter().map(|group| resolve_group(group, bag)).collect()
}

/// Resolve one group against `bag`, applying defaults for absent keys
pub fn resolve_group(group: StyleGroup, bag: &PropertyBag) -> Result<StyleProp, StyleError> {
    let prop = match group {
        StyleGroup::Size => StyleProp::Size(resolve_size(bag)?),
        StyleGroup::Flex => StyleProp::Flex(resolve_flex(bag)?),
        StyleGroup::Flow => StyleProp::Flow(resolve_flow(bag)?),
        StyleGroup::Padding => StyleProp::Padding(resolve_edges(bag, "padding")?),
        StyleGroup::Margin => StyleProp::Margin(resolve_edges(bag, "margin")?),
        StyleGroup::BorderRadius => StyleProp::BorderRadius(resolve_border_radius(bag)?),
        StyleGroup::Border => StyleProp::Border(resolve_border(bag)?),
        StyleGroup::BoxShadow => StyleProp::BoxShadow(resolve_box_shadow(bag)?),
        StyleGroup::BackgroundColor => StyleProp::BackgroundColor(
            lookup(bag, &["backgroundColor"])
                .map(|(key, value)| parse_color(key, value))
                .transpose()?,
        ),
        StyleGroup::Image => StyleProp::Image(
            lookup(bag, &["backgroundImageUrl"]).map(|(_, value)| Image { url: value.to_string() }),
        ),
        StyleGroup::Text => StyleProp::Text(resolve_text(bag)?),
        StyleGroup::Overflow => StyleProp::Overflow(
            lookup(bag, &["overflow"])
                .map(|(key, value)| parse_overflow(key, value))
                .transpose()?
                .unwrap_or(Overflow::Visible),
        ),
    };
    Ok(prop)
}

/// First present key of a fallback chain, most specific first
fn lookup<'a>(bag: &'a PropertyBag, chain: &[&'a str]) -> Option<(&'a str, &'a StyleValue)> {
    chain
        .iter()
        .find_map(|key| bag.get(*key).map(|value| (*key, value)))
}

/// Parse the first present key of `chain`, or fall back to `default`
fn cascade<'a, T>(
    bag: &'a PropertyBag,
    chain: &[&'a str],
    parse: fn(&str, &StyleValue) -> Result<T, StyleError>,
    default: T,
) -> Result<T, StyleError> {
    match lookup(bag, chain) {
        Some((key, value)) => parse(key, value),
        None => Ok(default),
    }
}

fn resolve_size(bag: &PropertyBag) -> Result<Size, StyleError> {
    Ok(Size {
        width: cascade(bag, &["width"], parse_dimension, Dimension::Auto)?,
        height: cascade(bag, &["height"], parse_dimension, Dimension::Auto)?,
    })
}

fn resolve_flex(bag: &PropertyBag) -> Result<Flex, StyleError> {
    let flex = cascade(bag, &["flex"], parse_number, 0.0)?;
    let basis_default = if flex != 0.0 {
        Dimension::Percent(0.0)
    } else {
        Dimension::Auto
    };

    Ok(Flex {
        grow: cascade(bag, &["flexGrow"], parse_number, flex)?,
        shrink: cascade(bag, &["flexShrink"], parse_number, flex)?,
        basis: cascade(bag, &["flexBasis"], parse_dimension, basis_default)?,
    })
}

fn resolve_flow(bag: &PropertyBag) -> Result<Flow, StyleError> {
    Ok(Flow {
        direction: cascade(bag, &["flexDirection"], parse_flex_direction, FlexDirection::Column)?,
        wrap: cascade(bag, &["flexWrap"], parse_flex_wrap, FlexWrap::NoWrap)?,
        align_content: cascade(bag, &["alignContent"], parse_align, Align::FlexStart)?,
        align_items: cascade(bag, &["alignItems"], parse_align, Align::Stretch)?,
        align_self: cascade(bag, &["alignSelf"], parse_align, Align::Auto)?,
        justify_content: cascade(
            bag,
            &["justifyContent"],
            parse_justify_content,
            JustifyContent::FlexStart,
        )?,
    })
}

/// Padding or margin: edge, then axis, then shorthand, then zero
fn resolve_edges(bag: &PropertyBag, base: &str) -> Result<Rect, StyleError> {
    let shorthand = base.to_string();
    let vertical = format!("{base}Vertical");
    let horizontal = format!("{base}Horizontal");

    let edge = |side: &str, axis: &str| -> Result<Dimension, StyleError> {
        let key = format!("{base}{side}");
        match lookup(bag, &[key.as_str(), axis, shorthand.as_str()]) {
            Some((key, value)) => parse_dimension(key, value),
            None => Ok(Dimension::Point(0.0)),
        }
    };

    Ok(Rect {
        top: edge("Top", &vertical)?,
        right: edge("Right", &horizontal)?,
        bottom: edge("Bottom", &vertical)?,
        left: edge("Left", &horizontal)?,
    })
}

fn resolve_border_radius(bag: &PropertyBag) -> Result<Option<BorderRadius>, StyleError> {
    let corner = |key: &'static str| cascade(bag, &[key, "borderRadius"], parse_length, 0.0);

    let radius = BorderRadius {
        top_left: corner("borderTopLeftRadius")?,
        top_right: corner("borderTopRightRadius")?,
        bottom_right: corner("borderBottomRightRadius")?,
        bottom_left: corner("borderBottomLeftRadius")?,
    };

    let all_zero = [radius.top_left, radius.top_right, radius.bottom_right, radius.bottom_left]
        .iter()
        .all(|r| *r == 0.0);

    Ok((!all_zero).then_some(radius))
}

fn resolve_border(bag: &PropertyBag) -> Result<Option<Border>, StyleError> {
    let side = |name: &str| -> Result<BorderSide, StyleError> {
        let width = format!("border{name}Width");
        let style = format!("border{name}Style");
        let color = format!("border{name}Color");

        Ok(BorderSide {
            width: cascade(bag, &[width.as_str(), "borderWidth"], parse_length, 0.0)?,
            style: cascade(
                bag,
                &[style.as_str(), "borderStyle"],
                parse_border_style,
                BorderStyle::Solid,
            )?,
            color: cascade(bag, &[color.as_str(), "borderColor"], parse_color, Color::BLACK)?,
        })
    };

    let border = Border {
        top: side("Top")?,
        right: side("Right")?,
        bottom: side("Bottom")?,
        left: side("Left")?,
    };

    let all_zero = [border.top, border.right, border.bottom, border.left]
        .iter()
        .all(|s| s.width == 0.0);

    Ok((!all_zero).then_some(border))
}

/// A shadow exists only once it has a color
fn resolve_box_shadow(bag: &PropertyBag) -> Result<Option<BoxShadow>, StyleError> {
    let Some((key, value)) = lookup(bag, &["shadowColor"]) else {
        return Ok(None);
    };

    Ok(Some(BoxShadow {
        color: parse_color(key, value)?,
        offset: Vector2f::new(
            cascade(bag, &["shadowOffsetX"], parse_length, 0.0)?,
            cascade(bag, &["shadowOffsetY"], parse_length, 0.0)?,
        ),
        blur: cascade(bag, &["shadowRadius"], parse_length, 0.0)?,
        spread: cascade(bag, &["shadowSpread"], parse_length, 0.0)?,
    }))
}

fn resolve_text(bag: &PropertyBag) -> Result<Option<TextStyle>, StyleError> {
    const KEYS: [&str; 4] = ["color", "fontSize", "lineHeight", "textAlign"];

    if !KEYS.iter().any(|key| bag.contains_key(*key)) {
        return Ok(None);
    }

    Ok(Some(TextStyle {
        color: cascade(bag, &["color"], parse_color, Color::BLACK)?,
        font_size: cascade(bag, &["fontSize"], parse_length, 16.0)?,
        line_height: cascade(bag, &["lineHeight"], parse_length, 30.0)?,
        align: cascade(bag, &["textAlign"], parse_text_align, TextAlign::Left)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag;

    #[test]
    fn test_group_table_covers_every_group() {
        let keys = [
            "width",
            "flexGrow",
            "alignSelf",
            "paddingTop",
            "marginHorizontal",
            "borderTopLeftRadius",
            "borderLeftColor",
            "shadowSpread",
            "backgroundColor",
            "backgroundImageUrl",
            "lineHeight",
            "overflow",
        ];
        let groups: Vec<_> = keys.iter().filter_map(|k| group_of(k)).collect();
        assert_eq!(groups, StyleGroup::ALL.to_vec());
    }

    #[test]
    fn test_unknown_keys_have_no_group() {
        assert_eq!(group_of("display"), None);
        assert_eq!(group_of("paddingFoo"), None);
        assert_eq!(group_of("background-color"), None);
    }

    #[test]
    fn test_sparse_emission() {
        let props = resolve(&bag! { "width" => 10, "display" => "block" }).unwrap();
        assert_eq!(
            props,
            vec![StyleProp::Size(Size {
                width: Dimension::Point(10.0),
                height: Dimension::Auto,
            })]
        );
    }

    #[test]
    fn test_empty_bag_resolves_to_nothing() {
        assert!(resolve(&PropertyBag::new()).unwrap().is_empty());
    }

    #[test]
    fn test_flex_shorthand() {
        let flex = resolve_flex(&bag! { "flex" => 1 }).unwrap();
        assert_eq!(flex.grow, 1.0);
        assert_eq!(flex.shrink, 1.0);
        assert_eq!(flex.basis, Dimension::Percent(0.0));

        let flex = resolve_flex(&bag! { "flexGrow" => 2 }).unwrap();
        assert_eq!(flex.shrink, 0.0);
        assert_eq!(flex.basis, Dimension::Auto);
    }

    #[test]
    fn test_flow_defaults() {
        let flow = resolve_flow(&bag! { "flexDirection" => "row" }).unwrap();
        assert_eq!(flow.direction, FlexDirection::Row);
        assert_eq!(flow.wrap, FlexWrap::NoWrap);
        assert_eq!(flow.align_content, Align::FlexStart);
        assert_eq!(flow.align_items, Align::Stretch);
        assert_eq!(flow.align_self, Align::Auto);
        assert_eq!(flow.justify_content, JustifyContent::FlexStart);
    }

    #[test]
    fn test_edges_axis_shorthand() {
        let rect = resolve_edges(&bag! { "margin" => 1, "marginVertical" => "2px" }, "margin").unwrap();
        assert_eq!(rect.top, Dimension::Point(2.0));
        assert_eq!(rect.bottom, Dimension::Point(2.0));
        assert_eq!(rect.left, Dimension::Point(1.0));
        assert_eq!(rect.right, Dimension::Point(1.0));
    }

    #[test]
    fn test_zero_radius_is_none() {
        assert_eq!(resolve_border_radius(&bag! { "borderRadius" => 0 }).unwrap(), None);

        let radius = resolve_border_radius(&bag! { "borderRadius" => 4, "borderTopLeftRadius" => 0 })
            .unwrap()
            .unwrap();
        assert_eq!(radius.top_left, 0.0);
        assert_eq!(radius.bottom_right, 4.0);
    }

    #[test]
    fn test_border_sides() {
        let border = resolve_border(&bag! {
            "borderWidth" => 1,
            "borderColor" => "#f00",
            "borderLeftWidth" => "3px",
            "borderTopStyle" => "none",
        })
        .unwrap()
        .unwrap();

        assert_eq!(border.left.width, 3.0);
        assert_eq!(border.right.width, 1.0);
        assert_eq!(border.top.style, BorderStyle::None);
        assert_eq!(border.bottom.style, BorderStyle::Solid);
        assert_eq!(border.bottom.color, Color::new(255, 0, 0, 255));

        assert_eq!(resolve_border(&bag! { "borderColor" => "#f00" }).unwrap(), None);
    }

    #[test]
    fn test_shadow_needs_color() {
        assert_eq!(resolve_box_shadow(&bag! { "shadowRadius" => 4 }).unwrap(), None);

        let shadow = resolve_box_shadow(&bag! { "shadowColor" => "#0008", "shadowRadius" => 4 })
            .unwrap()
            .unwrap();
        assert_eq!(shadow.blur, 4.0);
        assert_eq!(shadow.color.a, 136);
    }

    #[test]
    fn test_text_defaults() {
        let text = resolve_text(&bag! { "textAlign" => "center" }).unwrap().unwrap();
        assert_eq!(text.font_size, 16.0);
        assert_eq!(text.line_height, 30.0);
        assert_eq!(text.color, Color::BLACK);
        assert_eq!(text.align, TextAlign::Center);
    }

    #[test]
    fn test_optional_group_without_keys_clears() {
        let empty = PropertyBag::new();
        assert_eq!(
            resolve_group(StyleGroup::BackgroundColor, &empty).unwrap(),
            StyleProp::BackgroundColor(None)
        );
        assert_eq!(resolve_group(StyleGroup::Text, &empty).unwrap(), StyleProp::Text(None));
        assert_eq!(
            resolve_group(StyleGroup::Overflow, &empty).unwrap(),
            StyleProp::Overflow(Overflow::Visible)
        );
    }

    #[test]
    fn test_error_names_the_property() {
        let err = resolve(&bag! { "alignItems" => "middle" }).unwrap_err();
        assert_eq!(
            err,
            StyleError::UnknownKeyword {
                property: "alignItems".into(),
                value: "middle".into(),
            }
        );
    }
}

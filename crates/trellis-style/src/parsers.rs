//! Value parsers
//!
//! Each parser takes the property name only to report it in errors.

use trellis_wire::{
    Align, BorderStyle, Color, Dimension, FlexDirection, FlexWrap, JustifyContent, Overflow,
    TextAlign,
};

use crate::{StyleError, StyleValue};

/// Parse a layout dimension
///
/// `auto`, `n%`, a number, `"n"` or `"npx"`.
pub fn parse_dimension(property: &str, value: &StyleValue) -> Result<Dimension, StyleError> {
    let invalid = || StyleError::InvalidDimension {
        property: property.to_string(),
        value: value.to_string(),
    };

    let s = match value {
        StyleValue::Number(n) if n.is_finite() => return Ok(Dimension::Point(*n)),
        StyleValue::Number(_) => return Err(invalid()),
        StyleValue::Str(s) => s.trim(),
    };

    if s == "auto" {
        return Ok(Dimension::Auto);
    }

    if let Some(percent) = s.strip_suffix('%') {
        return parse_finite(percent).map(Dimension::Percent).ok_or_else(invalid);
    }

    parse_finite(s.strip_suffix("px").unwrap_or(s))
        .map(Dimension::Point)
        .ok_or_else(invalid)
}

/// Parse a plain number (flex factors)
pub fn parse_number(property: &str, value: &StyleValue) -> Result<f32, StyleError> {
    let parsed = match value {
        StyleValue::Number(n) => n.is_finite().then_some(*n),
        StyleValue::Str(s) => parse_finite(s.trim()),
    };

    parsed.ok_or_else(|| StyleError::InvalidNumber {
        property: property.to_string(),
        value: value.to_string(),
    })
}

/// Parse a length that cannot be a percentage (border widths, radii, font sizes)
pub fn parse_length(property: &str, value: &StyleValue) -> Result<f32, StyleError> {
    let parsed = match value {
        StyleValue::Number(n) => n.is_finite().then_some(*n),
        StyleValue::Str(s) => {
            let s = s.trim();
            parse_finite(s.strip_suffix("px").unwrap_or(s))
        }
    };

    parsed.ok_or_else(|| StyleError::InvalidNumber {
        property: property.to_string(),
        value: value.to_string(),
    })
}

fn parse_finite(s: &str) -> Option<f32> {
    s.parse::<f32>().ok().filter(|n| n.is_finite())
}

/// Parse `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`
pub fn parse_color(property: &str, value: &StyleValue) -> Result<Color, StyleError> {
    value
        .as_str()
        .and_then(|s| s.trim().strip_prefix('#'))
        .and_then(parse_hash_color)
        .ok_or_else(|| StyleError::InvalidColor {
            property: property.to_string(),
            value: value.to_string(),
        })
}

fn parse_hash_color(hex: &str) -> Option<Color> {
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }

    // hex digits are ASCII, byte slicing is safe
    let pair = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    let short = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);

    match hex.len() {
        3 => Some(Color::new(short(0)?, short(1)?, short(2)?, 255)),
        4 => Some(Color::new(short(0)?, short(1)?, short(2)?, short(3)?)),
        6 => Some(Color::new(pair(0)?, pair(2)?, pair(4)?, 255)),
        8 => Some(Color::new(pair(0)?, pair(2)?, pair(4)?, pair(6)?)),
        _ => None,
    }
}

/// Keyword parser: string value looked up in a fixed table
macro_rules! keyword_parser {
    ($(#[$meta:meta])* $fn_name:ident -> $ty:ident { $($($kw:literal)|+ => $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        pub fn $fn_name(property: &str, value: &StyleValue) -> Result<$ty, StyleError> {
            match value.as_str().map(str::trim) {
                $($(Some($kw))|+ => Ok($ty::$variant),)+
                _ => Err(StyleError::UnknownKeyword {
                    property: property.to_string(),
                    value: value.to_string(),
                }),
            }
        }
    };
}

keyword_parser!(parse_flex_direction -> FlexDirection {
    "column" => Column,
    "column-reverse" => ColumnReverse,
    "row" => Row,
    "row-reverse" => RowReverse,
});

keyword_parser!(
    /// Accepts the legacy `no-wrap` spelling too
    parse_flex_wrap -> FlexWrap {
        "nowrap" | "no-wrap" => NoWrap,
        "wrap" => Wrap,
        "wrap-reverse" => WrapReverse,
    }
);

keyword_parser!(parse_align -> Align {
    "auto" => Auto,
    "flex-start" => FlexStart,
    "center" => Center,
    "flex-end" => FlexEnd,
    "stretch" => Stretch,
    "baseline" => Baseline,
    "space-between" => SpaceBetween,
    "space-around" => SpaceAround,
});

keyword_parser!(parse_justify_content -> JustifyContent {
    "flex-start" => FlexStart,
    "center" => Center,
    "flex-end" => FlexEnd,
    "space-between" => SpaceBetween,
    "space-around" => SpaceAround,
    "space-evenly" => SpaceEvenly,
});

keyword_parser!(parse_overflow -> Overflow {
    "visible" => Visible,
    "hidden" => Hidden,
    "scroll" => Scroll,
});

keyword_parser!(parse_text_align -> TextAlign {
    "left" => Left,
    "center" => Center,
    "right" => Right,
});

keyword_parser!(parse_border_style -> BorderStyle {
    "none" => None,
    "solid" => Solid,
});

#[cfg(test)]
mod tests {
    use super::*;

    fn dim(value: impl Into<StyleValue>) -> Result<Dimension, StyleError> {
        parse_dimension("width", &value.into())
    }

    #[test]
    fn test_parse_dimension() {
        assert_eq!(dim("auto"), Ok(Dimension::Auto));
        assert_eq!(dim("50%"), Ok(Dimension::Percent(50.0)));
        assert_eq!(dim("12px"), Ok(Dimension::Point(12.0)));
        assert_eq!(dim("12"), Ok(Dimension::Point(12.0)));
        assert_eq!(dim(7), Ok(Dimension::Point(7.0)));
        assert_eq!(dim("-4.5px"), Ok(Dimension::Point(-4.5)));
    }

    #[test]
    fn test_parse_dimension_rejects_garbage() {
        for bad in ["", "abc", "10em", "%", "px", "NaN", "inf"] {
            assert!(
                matches!(dim(bad), Err(StyleError::InvalidDimension { .. })),
                "accepted {:?}",
                bad
            );
        }
    }

    #[test]
    fn test_parse_color_forms() {
        let c = |s: &str| parse_color("color", &StyleValue::from(s));

        assert_eq!(c("#fff"), Ok(Color::new(255, 255, 255, 255)));
        assert_eq!(c("#f008"), Ok(Color::new(255, 0, 0, 136)));
        assert_eq!(c("#2196F3"), Ok(Color::new(0x21, 0x96, 0xf3, 255)));
        assert_eq!(c("#11223344"), Ok(Color::new(0x11, 0x22, 0x33, 0x44)));
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        for bad in ["fff", "#ff", "#fffff", "#ggg", "red", "#ééé"] {
            assert!(parse_color("color", &StyleValue::from(bad)).is_err(), "accepted {:?}", bad);
        }
        assert!(parse_color("color", &StyleValue::from(0)).is_err());
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(parse_length("borderWidth", &"2px".into()), Ok(2.0));
        assert_eq!(parse_length("borderWidth", &StyleValue::Number(3.0)), Ok(3.0));
        assert!(parse_length("borderWidth", &"50%".into()).is_err());
    }

    #[test]
    fn test_keywords() {
        assert_eq!(parse_flex_wrap("flexWrap", &"no-wrap".into()), Ok(FlexWrap::NoWrap));
        assert_eq!(parse_align("alignItems", &"baseline".into()), Ok(Align::Baseline));
        assert_eq!(
            parse_overflow("overflow", &"auto".into()),
            Err(StyleError::UnknownKeyword {
                property: "overflow".into(),
                value: "auto".into(),
            })
        );
    }
}

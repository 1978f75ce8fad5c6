//! Trellis Style Resolver
//!
//! Flat, loosely typed property bags (`{"padding": 10, "paddingLeft": "5px"}`)
//! in, resolved [`StyleProp`] groups out. Pure and deterministic.

mod bag;
pub mod defaults;
mod diff;
pub mod parsers;
pub mod properties;
mod resolver;

pub use bag::{PropertyBag, StyleValue};
pub use diff::{damaged_groups, diff_style};
pub use resolver::{StyleGroup, group_of, resolve, resolve_group};

pub use trellis_wire::StyleProp;

/// Style resolution error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StyleError {
    #[error("unknown keyword {value:?} for {property}")]
    UnknownKeyword { property: String, value: String },

    #[error("invalid dimension {value:?} for {property}")]
    InvalidDimension { property: String, value: String },

    #[error("invalid color {value:?} for {property}")]
    InvalidColor { property: String, value: String },

    #[error("invalid number {value:?} for {property}")]
    InvalidNumber { property: String, value: String },
}

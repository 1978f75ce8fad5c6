//! Damage-based style diffing
//!
//! Compare two bags key by key, map the changed keys to groups and
//! re-resolve only those groups.

use std::collections::BTreeSet;

use trellis_wire::StyleProp;

use crate::resolver::{StyleGroup, group_of, resolve_group};
use crate::{PropertyBag, StyleError};

/// Groups touched by the difference between `prev` and `new`
pub fn damaged_groups(new: &PropertyBag, prev: &PropertyBag) -> BTreeSet<StyleGroup> {
    let removed = prev.keys().filter(|key| !new.contains_key(*key));
    let changed = new
        .iter()
        .filter(|(key, value)| prev.get(*key) != Some(*value))
        .map(|(key, _)| key);

    let mut damage = BTreeSet::new();
    for key in removed.chain(changed) {
        match group_of(key) {
            Some(group) => {
                damage.insert(group);
            }
            None => tracing::trace!("No damage for style key {}", key),
        }
    }
    damage
}

/// Style props to send when the effective bag goes from `prev` to `new`
///
/// Empty when nothing that maps to a group changed.
pub fn diff_style(new: &PropertyBag, prev: &PropertyBag) -> Result<Vec<StyleProp>, StyleError> {
    damaged_groups(new, prev)
        .into_iter()
        .map(|group| resolve_group(group, new))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bag;
    use trellis_wire::{Color, Dimension, Rect, Size};

    #[test]
    fn test_identical_bags_have_no_damage() {
        let style = bag! { "width" => 10, "backgroundColor" => "#fff" };
        assert!(diff_style(&style, &style.clone()).unwrap().is_empty());
    }

    #[test]
    fn test_single_key_change_resolves_one_group() {
        let prev = bag! { "width" => 10, "padding" => 4, "backgroundColor" => "#fff" };
        let mut new = prev.clone();
        new.insert("backgroundColor".into(), "#000".into());

        assert_eq!(
            diff_style(&new, &prev).unwrap(),
            vec![StyleProp::BackgroundColor(Some(Color::BLACK))]
        );
    }

    #[test]
    fn test_removed_key_resets_group() {
        let prev = bag! { "width" => 10, "backgroundColor" => "#fff" };
        let new = bag! { "width" => 10 };

        assert_eq!(diff_style(&new, &prev).unwrap(), vec![StyleProp::BackgroundColor(None)]);

        let new = PropertyBag::new();
        assert_eq!(
            diff_style(&new, &prev).unwrap(),
            vec![
                StyleProp::Size(Size::default()),
                StyleProp::BackgroundColor(None),
            ]
        );
    }

    #[test]
    fn test_group_resolved_from_whole_new_bag() {
        let prev = bag! { "padding" => 10 };
        let new = bag! { "padding" => 10, "paddingLeft" => 5 };

        let expected = Rect {
            top: Dimension::Point(10.0),
            right: Dimension::Point(10.0),
            bottom: Dimension::Point(10.0),
            left: Dimension::Point(5.0),
        };
        assert_eq!(diff_style(&new, &prev).unwrap(), vec![StyleProp::Padding(expected)]);
    }

    #[test]
    fn test_ungrouped_keys_cause_no_damage() {
        let prev = PropertyBag::new();
        let new = bag! { "display" => "block" };
        assert!(damaged_groups(&new, &prev).is_empty());
    }
}

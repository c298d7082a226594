//! Tags: members of closed, user-declared enumerations.
//!
//! A user enum implements [`TagKind`] (usually through [`tag_kind!`]) and its
//! members are stored type-erased as [`Tag`], so one spec can carry tags from
//! several families at once.

use serde::{Serialize, Serializer};
use std::any::TypeId;
use std::fmt;
use std::hash::Hash;

/// A closed enumeration whose members can be attached to specs.
pub trait TagKind: Copy + Eq + Hash + fmt::Debug + 'static {
    /// Name of the enumeration, used in printable forms.
    fn family() -> &'static str;

    fn label(self) -> &'static str;

    /// Declaration position within the enumeration.
    fn ordinal(self) -> u32;
}

/// Declare a fieldless enum and implement [`TagKind`] for it.
///
/// ```
/// dataspecs::tag_kind! {
///     pub enum Weather { Data, Meta }
/// }
/// assert_eq!(dataspecs::Tag::from(Weather::Meta).to_string(), "Weather::Meta");
/// ```
#[macro_export]
macro_rules! tag_kind {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($(#[$vmeta:meta])* $variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        $vis enum $name {
            $($(#[$vmeta])* $variant),+
        }

        impl $crate::TagKind for $name {
            fn family() -> &'static str {
                stringify!($name)
            }

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            fn ordinal(self) -> u32 {
                self as u32
            }
        }
    };
}

/// Type-erased tag value.
///
/// Field order drives the derived ordering: family name, then declaration
/// order within the family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Tag {
    family_name: &'static str,
    ordinal: u32,
    label: &'static str,
    family: TypeId,
}

impl Tag {
    pub fn of<K: TagKind>(kind: K) -> Self {
        Self {
            family_name: K::family(),
            ordinal: kind.ordinal(),
            label: kind.label(),
            family: TypeId::of::<K>(),
        }
    }

    /// True if this tag belongs to the enumeration `K`.
    pub fn is<K: TagKind>(&self) -> bool {
        self.family == TypeId::of::<K>()
    }

    pub fn family_id(&self) -> TypeId {
        self.family
    }

    pub fn family(&self) -> &'static str {
        self.family_name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }
}

impl<K: TagKind> From<K> for Tag {
    fn from(kind: K) -> Self {
        Tag::of(kind)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.family_name, self.label)
    }
}

impl Serialize for Tag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Append `tag` unless it is already present, keeping declaration order.
pub(crate) fn push_unique(tags: &mut Vec<Tag>, tag: Tag) {
    if !tags.contains(&tag) {
        tags.push(tag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    crate::tag_kind! {
        enum Color { Red, Green }
    }

    crate::tag_kind! {
        enum Shape { Red }
    }

    #[test]
    fn erased_tags_keep_family() {
        let red = Tag::from(Color::Red);
        assert!(red.is::<Color>());
        assert!(!red.is::<Shape>());
        assert_eq!(red.to_string(), "Color::Red");
        assert_ne!(red, Tag::from(Shape::Red));
        assert_eq!(red, Tag::of(Color::Red));
    }

    #[test]
    fn ordering_follows_declaration() {
        let mut tags = vec![Tag::from(Color::Green), Tag::from(Color::Red)];
        tags.sort();
        assert_eq!(tags, vec![Tag::from(Color::Red), Tag::from(Color::Green)]);
    }

    #[test]
    fn push_unique_dedups() {
        let mut tags = Vec::new();
        push_unique(&mut tags, Color::Green.into());
        push_unique(&mut tags, Color::Red.into());
        push_unique(&mut tags, Color::Green.into());
        assert_eq!(tags, vec![Tag::from(Color::Green), Tag::from(Color::Red)]);
    }
}

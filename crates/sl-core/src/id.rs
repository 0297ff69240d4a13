use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an identifier as-is. Use [`slugify`] to derive one from a display name.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}

string_id!(
    /// Identifier of a scene, e.g. `office`.
    SceneId
);
string_id!(
    /// Identifier of an item, e.g. `brass_key`.
    ItemId
);
string_id!(
    /// Identifier of a character, e.g. `informant`.
    CharacterId
);
string_id!(
    /// Identifier of a dialogue node, unique within one character's graph.
    NodeId
);

impl NodeId {
    /// The id every dialogue graph uses for its root node.
    pub fn root() -> Self {
        Self("root".to_string())
    }
}

/// Derive an identifier from a display name.
///
/// Lower-cases the name and collapses every run of non-alphanumeric
/// characters into a single `_`, trimming underscores at both ends.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_sep = false;
    for c in name.chars() {
        if c.is_alphanumeric() {
            if pending_sep && !slug.is_empty() {
                slug.push('_');
            }
            pending_sep = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Brass Key"), "brass_key");
        assert_eq!(slugify("  The Old--Chest! "), "the_old_chest");
        assert_eq!(slugify("Dr. Watson"), "dr_watson");
    }

    #[test]
    fn slugify_keeps_digits() {
        assert_eq!(slugify("Room 101"), "room_101");
    }

    #[test]
    fn ids_display_their_text() {
        assert_eq!(ItemId::new("key").to_string(), "key");
        assert_eq!(NodeId::root().as_str(), "root");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn slugs_are_stable(name in "[A-Za-z0-9 ._'-]{0,24}") {
            let slug = slugify(&name);
            prop_assert_eq!(slugify(&slug), slug.clone());
            prop_assert!(!slug.starts_with('_') && !slug.ends_with('_'));
            prop_assert!(!slug.contains("__"));
        }
    }
}

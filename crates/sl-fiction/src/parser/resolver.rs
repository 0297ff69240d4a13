//! Entity name resolution: alias index, suffix fallback and fuzzy hints.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sl_core::{CharacterId, ItemId, World};
use strsim::jaro_winkler;

use super::command::normalize_phrase;

/// Minimum similarity score for a "did you mean" hint (0.0-1.0).
const FUZZY_THRESHOLD: f64 = 0.8;

/// A reference to something the player can name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityRef {
    /// An item.
    Item(ItemId),
    /// A character.
    Character(CharacterId),
}

impl EntityRef {
    /// The item id, if this is an item.
    pub fn as_item(&self) -> Option<&ItemId> {
        match self {
            Self::Item(id) => Some(id),
            Self::Character(_) => None,
        }
    }

    /// The character id, if this is a character.
    pub fn as_character(&self) -> Option<&CharacterId> {
        match self {
            Self::Character(id) => Some(id),
            Self::Item(_) => None,
        }
    }

    /// The display name in `world`, falling back to the id.
    pub fn name<'w>(&'w self, world: &'w World) -> &'w str {
        match self {
            Self::Item(id) => world.item(id).map_or(id.as_str(), |i| i.name.as_str()),
            Self::Character(id) => world
                .character(id)
                .map_or(id.as_str(), |c| c.name.as_str()),
        }
    }

    fn names<'w>(&self, world: &'w World) -> Vec<&'w str> {
        match self {
            Self::Item(id) => world.item(id).map(|i| i.names().collect()),
            Self::Character(id) => world.character(id).map(|c| c.names().collect()),
        }
        .unwrap_or_default()
    }
}

/// The outcome of resolving a noun phrase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Exactly one visible entity matches.
    Found(EntityRef),
    /// Several visible entities match; the player must pick one.
    Ambiguous(Vec<EntityRef>),
    /// Nothing visible matches.
    NotFound {
        /// A visible name close to the phrase.
        suggestion: Option<String>,
    },
}

/// Lower-cased names and aliases of every item and character.
///
/// Built once per world; resolution then filters matches by what the player
/// can currently see.
#[derive(Debug, Clone, Default)]
pub struct AliasIndex {
    names: BTreeMap<String, Vec<EntityRef>>,
}

impl AliasIndex {
    /// Index every name and alias in `world`.
    pub fn build(world: &World) -> Self {
        let mut index = Self::default();
        for item in world.items() {
            for name in item.names() {
                index.insert(name, EntityRef::Item(item.id.clone()));
            }
        }
        for character in world.characters() {
            for name in character.names() {
                index.insert(name, EntityRef::Character(character.id.clone()));
            }
        }
        index
    }

    fn insert(&mut self, name: &str, entity: EntityRef) {
        let key = normalize_phrase(name);
        if key.is_empty() {
            return;
        }
        let slot = self.names.entry(key).or_default();
        if !slot.contains(&entity) {
            slot.push(entity);
        }
    }

    /// Every entity a phrase names exactly, visible or not.
    pub fn lookup(&self, phrase: &str) -> &[EntityRef] {
        self.names
            .get(&normalize_phrase(phrase))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Resolve `phrase` among the `visible` entities.
    ///
    /// Exact names and aliases win. Otherwise the last word of the phrase is
    /// compared with the last word of each visible name, so "locket" finds
    /// the "Silver Locket".
    pub fn resolve(&self, world: &World, phrase: &str, visible: &[EntityRef]) -> Resolution {
        let exact: Vec<EntityRef> = self
            .lookup(phrase)
            .iter()
            .filter(|e| visible.contains(e))
            .cloned()
            .collect();
        match exact.len() {
            0 => {}
            1 => return Resolution::Found(exact[0].clone()),
            _ => return Resolution::Ambiguous(exact),
        }

        let normalized = normalize_phrase(phrase);
        let Some(last) = normalized.split_whitespace().last() else {
            return Resolution::NotFound { suggestion: None };
        };
        let suffixed: Vec<EntityRef> = visible
            .iter()
            .filter(|e| {
                e.names(world).iter().any(|name| {
                    name.split_whitespace()
                        .last()
                        .is_some_and(|w| w.eq_ignore_ascii_case(last))
                })
            })
            .cloned()
            .collect();
        match suffixed.len() {
            0 => Resolution::NotFound {
                suggestion: suggest(world, &normalized, visible),
            },
            1 => Resolution::Found(suffixed[0].clone()),
            _ => Resolution::Ambiguous(suffixed),
        }
    }
}

/// The visible name closest to `phrase`, if any is close enough.
fn suggest(world: &World, phrase: &str, visible: &[EntityRef]) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;
    for entity in visible {
        for name in entity.names(world) {
            let score = jaro_winkler(phrase, &name.to_lowercase());
            if score >= FUZZY_THRESHOLD && best.is_none_or(|(_, s)| score > s) {
                best = Some((name, score));
            }
        }
    }
    best.map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sl_core::{Character, Item, WorldMeta};

    fn item(id: &str) -> EntityRef {
        EntityRef::Item(ItemId::new(id))
    }

    fn test_world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));
        world
            .add_item(Item::new(ItemId::new("brass_key"), "Brass Key").with_alias("key"))
            .unwrap();
        world
            .add_item(Item::new(ItemId::new("iron_key"), "Iron Key"))
            .unwrap();
        world
            .add_item(Item::new(ItemId::new("silver_locket"), "Silver Locket"))
            .unwrap();
        world.add_item(Item::new(ItemId::new("lamp"), "Lamp")).unwrap();
        world
            .add_character(Character::new(CharacterId::new("informant"), "Informant"))
            .unwrap();
        world
    }

    fn everything(world: &World) -> Vec<EntityRef> {
        world
            .items()
            .map(|i| EntityRef::Item(i.id.clone()))
            .chain(world.characters().map(|c| EntityRef::Character(c.id.clone())))
            .collect()
    }

    #[test]
    fn exact_name_is_case_insensitive() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        let visible = everything(&world);
        assert_eq!(
            index.resolve(&world, "SILVER locket", &visible),
            Resolution::Found(item("silver_locket"))
        );
        assert_eq!(
            index.resolve(&world, "the informant", &visible),
            Resolution::Found(EntityRef::Character(CharacterId::new("informant")))
        );
    }

    #[test]
    fn alias_beats_suffix_match() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        let visible = everything(&world);
        assert_eq!(
            index.resolve(&world, "key", &visible),
            Resolution::Found(item("brass_key"))
        );
    }

    #[test]
    fn suffix_match_is_ambiguous_between_two_keys() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        let visible = vec![item("iron_key"), item("brass_key"), item("lamp")];
        assert_eq!(
            index.resolve(&world, "old key", &visible),
            Resolution::Ambiguous(vec![item("iron_key"), item("brass_key")])
        );
    }

    #[test]
    fn suffix_match_only_sees_visible_entities() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        let visible = vec![item("iron_key"), item("lamp")];
        assert_eq!(
            index.resolve(&world, "rusty key", &visible),
            Resolution::Found(item("iron_key"))
        );
        assert_eq!(
            index.resolve(&world, "locket", &visible),
            Resolution::NotFound { suggestion: None }
        );
    }

    #[test]
    fn not_found_suggests_close_name() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        let visible = vec![item("lamp")];
        assert_eq!(
            index.resolve(&world, "lamb", &visible),
            Resolution::NotFound {
                suggestion: Some("Lamp".to_string())
            }
        );
    }

    #[test]
    fn lookup_ignores_visibility() {
        let world = test_world();
        let index = AliasIndex::build(&world);
        assert_eq!(index.lookup("Iron Key"), &[item("iron_key")]);
        assert!(index.lookup("sword").is_empty());
    }
}

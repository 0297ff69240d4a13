use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::ItemId;
use crate::value::Value;

/// The type tag of an item. Extensible via `Custom(String)`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// An ordinary object.
    #[default]
    Generic,
    /// Opens locks whose id matches its `unlocks` property.
    Key,
    /// Holds another item.
    Container,
    /// Grants skill bonuses while carried.
    Tool,
    /// Fixed part of a scene.
    Scenery,
    /// An author-defined type.
    Custom(String),
}

impl ItemKind {
    /// Parse a type tag. Unknown tags become `Custom`.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "" | "item" | "object" | "generic" => Self::Generic,
            "key" => Self::Key,
            "container" => Self::Container,
            "tool" => Self::Tool,
            "scenery" => Self::Scenery,
            other => Self::Custom(other.to_string()),
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generic => write!(f, "generic"),
            Self::Key => write!(f, "key"),
            Self::Container => write!(f, "container"),
            Self::Tool => write!(f, "tool"),
            Self::Scenery => write!(f, "scenery"),
            Self::Custom(s) => write!(f, "{s}"),
        }
    }
}

/// A lock on an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lock {
    /// Whether the lock starts locked.
    pub locked: bool,
    /// Skill total needed to pick the lock. `None` means it cannot be picked.
    pub difficulty: Option<i64>,
    /// Message shown when the lock opens.
    pub on_unlock: Option<String>,
    /// Message shown when a lockpicking attempt fails.
    pub on_fail: Option<String>,
}

/// A known interaction rule carried by an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemRule {
    /// The item can be locked and unlocked.
    Lock(Lock),
    /// A key that opens the item with this id.
    Unlocks(ItemId),
    /// Bonus added to a player skill while the item is carried.
    SkillBonus {
        /// Skill name, e.g. `lockpicking`.
        skill: String,
        /// Bonus added to the player's skill level.
        bonus: i64,
    },
    /// Message shown on `use` with no target.
    UseMessage(String),
    /// Detailed text shown by `examine`.
    Examine(String),
}

/// An object in the world.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    /// Unique identifier.
    pub id: ItemId,
    /// Canonical display name.
    pub name: String,
    /// Alternative names the player may type.
    pub aliases: Vec<String>,
    /// Type tag.
    pub kind: ItemKind,
    /// Whether the player can pick the item up.
    pub movable: bool,
    /// Base description.
    pub description: Option<String>,
    /// The item held inside this one, if any.
    pub contains: Option<ItemId>,
    /// Typed interaction rules.
    pub rules: Vec<ItemRule>,
    /// Author-defined properties with no built-in meaning.
    pub properties: BTreeMap<String, Value>,
}

impl Item {
    /// Create a movable generic item.
    pub fn new(id: ItemId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            aliases: Vec::new(),
            kind: ItemKind::Generic,
            movable: true,
            description: None,
            contains: None,
            rules: Vec::new(),
            properties: BTreeMap::new(),
        }
    }

    /// Set the type tag.
    pub fn with_kind(mut self, kind: ItemKind) -> Self {
        self.kind = kind;
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add an alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.aliases.push(alias.into());
        self
    }

    /// Add an interaction rule.
    pub fn with_rule(mut self, rule: ItemRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Mark the item as fixed in place.
    pub fn immovable(mut self) -> Self {
        self.movable = false;
        self
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// The lock on this item, if it has one.
    pub fn lock(&self) -> Option<&Lock> {
        self.rules.iter().find_map(|r| match r {
            ItemRule::Lock(lock) => Some(lock),
            _ => None,
        })
    }

    /// The id of the item this key opens.
    pub fn unlocks(&self) -> Option<&ItemId> {
        self.rules.iter().find_map(|r| match r {
            ItemRule::Unlocks(id) => Some(id),
            _ => None,
        })
    }

    /// Bonus this item grants to `skill`.
    pub fn skill_bonus(&self, skill: &str) -> Option<i64> {
        self.rules.iter().find_map(|r| match r {
            ItemRule::SkillBonus { skill: s, bonus } if s.eq_ignore_ascii_case(skill) => {
                Some(*bonus)
            }
            _ => None,
        })
    }

    /// Message shown when the item is used on its own.
    pub fn use_message(&self) -> Option<&str> {
        self.rules.iter().find_map(|r| match r {
            ItemRule::UseMessage(m) => Some(m.as_str()),
            _ => None,
        })
    }

    /// The `examine` text, falling back to the description.
    pub fn examine_text(&self) -> Option<&str> {
        self.rules
            .iter()
            .find_map(|r| match r {
                ItemRule::Examine(t) => Some(t.as_str()),
                _ => None,
            })
            .or(self.description.as_deref())
    }

    /// Whether the item can hold another item.
    pub fn is_container(&self) -> bool {
        self.kind == ItemKind::Container || self.contains.is_some()
    }
}

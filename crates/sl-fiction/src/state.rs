//! Mutable per-session state layered over the immutable world.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use sl_core::{CharacterId, ItemId, NodeId, SceneId, Value, World};

use crate::config::SessionConfig;
use crate::error::{CommandError, CommandResult};
use crate::parser::{Command, EntityRef};

/// Who holds an item right now.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    /// Lying in a scene.
    Scene(SceneId),
    /// Carried by the player.
    Inventory,
    /// Carried by a character.
    Character(CharacterId),
    /// Inside another item's `contains` slot.
    Contained(ItemId),
}

/// Where an item is and when it got there.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    /// The current owner.
    pub owner: Owner,
    /// Arrival order; listings sort by it.
    pub seq: u64,
}

/// The single source of truth for item ownership.
///
/// Each item in play has exactly one [`Placement`]. Items that are not in
/// the ledger are latent (recipe results not yet produced) or spent
/// (ingredients consumed by a combination).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemLedger {
    placements: BTreeMap<ItemId, Placement>,
    next_seq: u64,
}

impl ItemLedger {
    /// Build the ledger from the world's initial layout, then move the
    /// starting inventory into the player's hands.
    pub fn from_world(world: &World, starting_inventory: &[ItemId]) -> Self {
        let mut ledger = Self::default();
        for scene in world.scenes() {
            for item in &scene.items {
                ledger.place(item.clone(), Owner::Scene(scene.id.clone()));
            }
        }
        for character in world.characters() {
            for item in &character.items {
                ledger.place(item.clone(), Owner::Character(character.id.clone()));
            }
        }
        for item in world.items() {
            if let Some(inner) = &item.contains {
                ledger.place(inner.clone(), Owner::Contained(item.id.clone()));
            }
        }
        for item in starting_inventory {
            ledger.place(item.clone(), Owner::Inventory);
        }
        ledger
    }

    /// Put `item` with `owner`, replacing any previous placement.
    pub fn place(&mut self, item: ItemId, owner: Owner) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.placements.insert(item, Placement { owner, seq });
    }

    /// Take `item` out of play. Returns its last owner.
    pub fn remove(&mut self, item: &ItemId) -> Option<Owner> {
        self.placements.remove(item).map(|p| p.owner)
    }

    /// The current owner of `item`, or `None` if it is not in play.
    pub fn owner(&self, item: &ItemId) -> Option<&Owner> {
        self.placements.get(item).map(|p| &p.owner)
    }

    /// Every item `owner` holds, in arrival order.
    pub fn held_by(&self, owner: &Owner) -> Vec<ItemId> {
        let mut held: Vec<(&ItemId, u64)> = self
            .placements
            .iter()
            .filter(|(_, p)| &p.owner == owner)
            .map(|(id, p)| (id, p.seq))
            .collect();
        held.sort_by_key(|(_, seq)| *seq);
        held.into_iter().map(|(id, _)| id.clone()).collect()
    }

    /// Iterate over every placement in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Owner)> {
        self.placements.iter().map(|(id, p)| (id, &p.owner))
    }

    /// Number of items in play.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    /// Whether no item is in play.
    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }
}

/// A question the session is waiting for the player to answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Pending {
    /// In conversation; the next input picks a choice of `node`.
    Dialogue {
        /// Who the player is talking to.
        character: CharacterId,
        /// The node whose choices are on offer.
        node: NodeId,
    },
    /// A noun phrase matched several entities.
    Disambiguation {
        /// The command to re-run once the phrase is pinned down.
        command: Command,
        /// The ambiguous phrase.
        phrase: String,
        /// Entities the phrase could mean, in listing order.
        candidates: Vec<EntityRef>,
        /// Phrases already pinned by earlier answers.
        bindings: BTreeMap<String, EntityRef>,
    },
    /// A combination has several possible results.
    Recipe {
        /// First ingredient.
        first: ItemId,
        /// Second ingredient.
        second: ItemId,
        /// Possible results, in recipe order.
        candidates: Vec<ItemId>,
    },
}

/// Everything that changes while a story is played.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Where the player is.
    pub current_scene: SceneId,
    /// Who holds which item.
    pub items: ItemLedger,
    /// Story flags set by dialogue and gifts.
    pub flags: BTreeSet<String>,
    /// Where each character's conversation resumes.
    pub dialogue_cursors: BTreeMap<CharacterId, NodeId>,
    /// Player variables such as skill levels.
    pub variables: BTreeMap<String, Value>,
    /// Locks that have been opened.
    pub unlocked: BTreeSet<ItemId>,
    /// Containers whose contents the player has seen.
    pub revealed: BTreeSet<ItemId>,
    /// An unanswered question, if any.
    pub pending: Option<Pending>,
    /// Number of completed turns.
    pub turns: u64,
}

impl WorldState {
    /// Initial state for `world`, with `config` overriding the document's
    /// front matter.
    pub fn new(world: &World, config: &SessionConfig) -> CommandResult<Self> {
        let current_scene = match config
            .starting_scene
            .as_ref()
            .or(world.meta.starting_scene.as_ref())
        {
            Some(id) => id.clone(),
            None => world
                .first_scene()
                .map(|s| s.id.clone())
                .ok_or_else(|| CommandError::BrokenWorld("no scenes".to_string()))?,
        };
        if world.scene(&current_scene).is_none() {
            return Err(CommandError::BrokenWorld(format!(
                "unknown starting scene \"{current_scene}\""
            )));
        }

        let inventory = config
            .starting_inventory
            .as_deref()
            .unwrap_or(&world.meta.starting_inventory);
        if let Some(missing) = inventory.iter().find(|id| world.item(id).is_none()) {
            return Err(CommandError::BrokenWorld(format!(
                "unknown starting item \"{missing}\""
            )));
        }

        let mut variables = world.meta.variables.clone();
        variables.extend(config.variables.clone());

        let unlocked = world
            .items()
            .filter(|i| i.lock().is_some_and(|l| !l.locked))
            .map(|i| i.id.clone())
            .collect();

        Ok(Self {
            current_scene,
            items: ItemLedger::from_world(world, inventory),
            flags: BTreeSet::new(),
            dialogue_cursors: BTreeMap::new(),
            variables,
            unlocked,
            revealed: BTreeSet::new(),
            pending: None,
            turns: 0,
        })
    }

    /// Items the player carries, in acquisition order.
    pub fn inventory(&self) -> Vec<ItemId> {
        self.items.held_by(&Owner::Inventory)
    }

    /// Whether the player carries `item`.
    pub fn has_item(&self, item: &ItemId) -> bool {
        self.items.owner(item) == Some(&Owner::Inventory)
    }

    /// Whether a story flag is set.
    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Set a story flag.
    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    /// Whether `item` carries a lock that is still closed.
    pub fn is_locked(&self, world: &World, item: &ItemId) -> bool {
        world.item(item).and_then(|i| i.lock()).is_some() && !self.unlocked.contains(item)
    }

    /// A player variable read as an integer; missing or non-numeric is 0.
    pub fn variable_int(&self, name: &str) -> i64 {
        self.variables
            .get(name)
            .and_then(Value::as_int)
            .unwrap_or(0)
    }

    /// The node a conversation with `character` starts from.
    pub fn cursor(&self, character: &CharacterId) -> Option<&NodeId> {
        self.dialogue_cursors.get(character)
    }
}

//! Puzzle rules: keys and locks, lockpicking and item combination.
//!
//! Rules are pure: they read the world and the current state and return an
//! [`Outcome`] describing what should happen. The interpreter applies the
//! outcome to its working copy of the state, so a rule never leaves a
//! half-applied change behind.

mod combine;
mod lock;

pub use combine::{Combination, combine, produce};
pub use lock::{KeyLock, LOCKPICKING, SKILL_SUFFIX, pick_lock};

use sl_core::{Item, ItemId, World};

use crate::error::{CommandError, CommandResult};
use crate::state::WorldState;

/// What a rule decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Text shown to the player.
    pub message: String,
    /// A lock that opens.
    pub unlock: Option<ItemId>,
}

impl Outcome {
    /// An outcome that only reports something.
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unlock: None,
        }
    }

    /// An outcome that opens the lock of `item`.
    pub fn unlocking(item: ItemId, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            unlock: Some(item),
        }
    }

    /// Write the outcome's effects into `state`.
    pub fn apply(&self, state: &mut WorldState) {
        if let Some(item) = &self.unlock {
            state.unlocked.insert(item.clone());
        }
    }
}

/// A rule for using one item on another.
pub trait InteractionRule {
    /// Whether this rule governs using `item` on `target`.
    fn applies(&self, item: &Item, target: &Item) -> bool;

    /// Decide what happens. Errors are refusals that change nothing.
    fn apply(
        &self,
        world: &World,
        state: &WorldState,
        item: &Item,
        target: &Item,
    ) -> CommandResult<Outcome>;
}

/// The rules `use X on Y` consults, in order.
pub const DEFAULT_RULES: &[&dyn InteractionRule] = &[&KeyLock];

/// Use `item` on `target` under `rules`: the first rule that applies decides.
pub fn use_on(
    rules: &[&dyn InteractionRule],
    world: &World,
    state: &WorldState,
    item: &Item,
    target: &Item,
) -> CommandResult<Outcome> {
    match rules.iter().find(|rule| rule.applies(item, target)) {
        Some(rule) => rule.apply(world, state, item, target),
        None => Err(CommandError::CannotUseWith {
            item: item.name.clone(),
            target: target.name.clone(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use sl_core::{ItemKind, Scene, SceneId, WorldMeta};

    struct Polish;

    impl InteractionRule for Polish {
        fn applies(&self, item: &Item, _target: &Item) -> bool {
            item.id.as_str() == "rag"
        }

        fn apply(
            &self,
            _world: &World,
            _state: &WorldState,
            _item: &Item,
            target: &Item,
        ) -> CommandResult<Outcome> {
            Ok(Outcome::message(format!("The {} gleams.", target.name)))
        }
    }

    fn world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));
        world.add_scene(Scene::new(SceneId::new("hall"), "Hall")).unwrap();
        world.add_item(Item::new(ItemId::new("rag"), "Rag")).unwrap();
        world
            .add_item(Item::new(ItemId::new("lamp"), "Lamp").with_kind(ItemKind::Generic))
            .unwrap();
        world
    }

    #[test]
    fn no_rule_means_refusal() {
        let world = world();
        let state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        let rag = world.item(&ItemId::new("rag")).unwrap();
        let lamp = world.item(&ItemId::new("lamp")).unwrap();
        assert_eq!(
            use_on(DEFAULT_RULES, &world, &state, rag, lamp),
            Err(CommandError::CannotUseWith {
                item: "Rag".to_string(),
                target: "Lamp".to_string()
            })
        );
    }

    #[test]
    fn custom_rules_plug_in() {
        let world = world();
        let state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        let rag = world.item(&ItemId::new("rag")).unwrap();
        let lamp = world.item(&ItemId::new("lamp")).unwrap();
        let rules: &[&dyn InteractionRule] = &[&KeyLock, &Polish];
        let outcome = use_on(rules, &world, &state, rag, lamp).unwrap();
        assert_eq!(outcome, Outcome::message("The Lamp gleams."));
    }
}

//! Keys, locks and lockpicking.

use sl_core::{Item, ItemKind, World};

use super::{InteractionRule, Outcome};
use crate::error::{CommandError, CommandResult};
use crate::state::WorldState;

/// The skill lockpicking tools boost.
pub const LOCKPICKING: &str = "lockpicking";

/// Player variables named `<skill><SKILL_SUFFIX>` hold skill levels.
pub const SKILL_SUFFIX: &str = "_skill";

/// A key opens the lock its `unlocks` property names, and no other.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyLock;

impl InteractionRule for KeyLock {
    fn applies(&self, item: &Item, target: &Item) -> bool {
        (item.kind == ItemKind::Key || item.unlocks().is_some()) && target.lock().is_some()
    }

    fn apply(
        &self,
        world: &World,
        state: &WorldState,
        item: &Item,
        target: &Item,
    ) -> CommandResult<Outcome> {
        if !state.is_locked(world, &target.id) {
            return Err(CommandError::NotLocked(target.name.clone()));
        }
        if item.unlocks() != Some(&target.id) {
            return Err(CommandError::WrongKey {
                key: item.name.clone(),
                target: target.name.clone(),
            });
        }
        let message = target
            .lock()
            .and_then(|l| l.on_unlock.clone())
            .unwrap_or_else(|| format!("You unlock the {}.", target.name));
        Ok(Outcome::unlocking(target.id.clone(), message))
    }
}

/// Try to pick the lock of `target` with the best tool the player carries.
///
/// Succeeds when skill plus tool bonus reaches the lock's difficulty. A
/// failed attempt is still an `Ok` outcome: the turn is spent and the tool
/// is kept.
pub fn pick_lock(world: &World, state: &WorldState, target: &Item) -> CommandResult<Outcome> {
    let bonus = state
        .inventory()
        .iter()
        .filter_map(|id| world.item(id))
        .filter_map(|tool| tool.skill_bonus(LOCKPICKING))
        .max()
        .ok_or(CommandError::NoLockpick)?;

    let (lock, difficulty) = target
        .lock()
        .and_then(|lock| lock.difficulty.map(|d| (lock, d)))
        .ok_or_else(|| CommandError::NotLockable(target.name.clone()))?;
    if !state.is_locked(world, &target.id) {
        return Err(CommandError::NotLocked(target.name.clone()));
    }

    let skill = state.variable_int(&format!("{LOCKPICKING}{SKILL_SUFFIX}"));
    tracing::debug!(skill, bonus, difficulty, target = %target.id, "lockpicking attempt");
    if skill + bonus >= difficulty {
        let message = lock
            .on_unlock
            .clone()
            .unwrap_or_else(|| format!("You successfully pick the lock of the {}.", target.name));
        Ok(Outcome::unlocking(target.id.clone(), message))
    } else {
        let message = lock
            .on_fail
            .clone()
            .unwrap_or_else(|| format!("You fail to pick the lock of the {}.", target.name));
        Ok(Outcome::message(message))
    }
}

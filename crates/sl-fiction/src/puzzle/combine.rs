//! Combining two carried items into a new one.

use sl_core::{ItemId, World};

use crate::error::{CommandError, CommandResult};
use crate::render::item_name;
use crate::state::{Owner, WorldState};

/// The result of asking to combine two items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Combination {
    /// The recipe had one result; it has been made. Carries the message.
    Made(String),
    /// Several results are possible; nothing has changed yet.
    Choose(Vec<ItemId>),
}

/// Combine `first` and `second` from the inventory.
///
/// Ingredient order does not matter. With exactly one candidate the
/// ingredients are consumed and the result produced; with several, the
/// caller must pick one and call [`produce`].
pub fn combine(
    world: &World,
    state: &mut WorldState,
    first: &ItemId,
    second: &ItemId,
) -> CommandResult<Combination> {
    check_ingredients(world, state, first, second)?;
    let results = world.recipes().lookup(first, second);
    match results {
        [] => Err(cannot_combine(world, first, second)),
        [only] => produce(world, state, first, second, &only.item).map(Combination::Made),
        many => Ok(Combination::Choose(
            many.iter().map(|r| r.item.clone()).collect(),
        )),
    }
}

/// Consume both ingredients and put `result` in the inventory.
///
/// Fails without touching `state` if either ingredient is gone, `result`
/// is not something the pair makes, or `result` is already in play.
pub fn produce(
    world: &World,
    state: &mut WorldState,
    first: &ItemId,
    second: &ItemId,
    result: &ItemId,
) -> CommandResult<String> {
    check_ingredients(world, state, first, second)?;
    let Some(recipe) = world
        .recipes()
        .lookup(first, second)
        .iter()
        .find(|r| &r.item == result)
    else {
        return Err(CommandError::InvalidChoice(
            item_name(world, result).to_string(),
        ));
    };
    let made = world
        .item(result)
        .ok_or_else(|| CommandError::BrokenWorld(format!("unknown recipe result \"{result}\"")))?;
    if state.items.owner(result).is_some() {
        return Err(CommandError::AlreadyMade(made.name.clone()));
    }

    state.items.remove(first);
    state.items.remove(second);
    state.items.place(result.clone(), Owner::Inventory);
    tracing::debug!(%first, %second, %result, "combined items");

    let mut message = format!("You create a new item: {}.", made.name);
    if let Some(description) = recipe.description.as_ref().or(made.description.as_ref()) {
        message.push('\n');
        message.push_str(description);
    }
    Ok(message)
}

fn check_ingredients(
    world: &World,
    state: &WorldState,
    first: &ItemId,
    second: &ItemId,
) -> CommandResult<()> {
    if first == second {
        return Err(cannot_combine(world, first, second));
    }
    for item in [first, second] {
        if !state.has_item(item) {
            return Err(CommandError::NotCarrying(item_name(world, item).to_string()));
        }
    }
    Ok(())
}

fn cannot_combine(world: &World, first: &ItemId, second: &ItemId) -> CommandError {
    CommandError::CannotCombine {
        first: item_name(world, first).to_string(),
        second: item_name(world, second).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use sl_core::{Item, RecipeResult, Scene, SceneId, WorldMeta};

    fn world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));
        world.add_scene(Scene::new(SceneId::new("hall"), "Hall")).unwrap();
        for (id, name) in [
            ("rag", "Rag"),
            ("alcohol", "Alcohol"),
            ("bandage", "Bandage"),
            ("cleaning_cloth", "Cleaning Cloth"),
            ("wire", "Wire"),
            ("pin", "Pin"),
            ("lockpick", "Lockpick"),
        ] {
            world.add_item(Item::new(ItemId::new(id), name)).unwrap();
        }
        let recipes = world.recipes_mut();
        recipes.add(
            &ItemId::new("rag"),
            &ItemId::new("alcohol"),
            RecipeResult {
                item: ItemId::new("bandage"),
                description: Some("Clean enough for a wound.".to_string()),
            },
        );
        recipes.add(
            &ItemId::new("alcohol"),
            &ItemId::new("rag"),
            RecipeResult {
                item: ItemId::new("cleaning_cloth"),
                description: None,
            },
        );
        recipes.add(
            &ItemId::new("wire"),
            &ItemId::new("pin"),
            RecipeResult {
                item: ItemId::new("lockpick"),
                description: None,
            },
        );
        world
    }

    fn carrying(world: &World, items: &[&str]) -> WorldState {
        let config = SessionConfig::default()
            .with_starting_inventory(items.iter().map(|id| ItemId::new(*id)).collect());
        WorldState::new(world, &config).unwrap()
    }

    #[test]
    fn single_result_is_made() {
        let world = world();
        let mut state = carrying(&world, &["wire", "pin"]);
        let made = combine(&world, &mut state, &ItemId::new("pin"), &ItemId::new("wire")).unwrap();
        assert_eq!(made, Combination::Made("You create a new item: Lockpick.".to_string()));
        assert_eq!(state.inventory(), vec![ItemId::new("lockpick")]);
        assert!(state.items.owner(&ItemId::new("wire")).is_none());
    }

    #[test]
    fn several_results_wait_for_a_choice() {
        let world = world();
        let mut state = carrying(&world, &["rag", "alcohol"]);
        let before = state.clone();
        let choice = combine(&world, &mut state, &ItemId::new("rag"), &ItemId::new("alcohol")).unwrap();
        assert_eq!(
            choice,
            Combination::Choose(vec![ItemId::new("bandage"), ItemId::new("cleaning_cloth")])
        );
        assert_eq!(state, before);

        let message = produce(
            &world,
            &mut state,
            &ItemId::new("rag"),
            &ItemId::new("alcohol"),
            &ItemId::new("bandage"),
        )
        .unwrap();
        assert_eq!(
            message,
            "You create a new item: Bandage.\nClean enough for a wound."
        );
        assert_eq!(state.inventory(), vec![ItemId::new("bandage")]);
    }

    #[test]
    fn producing_something_else_is_refused() {
        let world = world();
        let mut state = carrying(&world, &["rag", "alcohol"]);
        let before = state.clone();
        let err = produce(
            &world,
            &mut state,
            &ItemId::new("rag"),
            &ItemId::new("alcohol"),
            &ItemId::new("lockpick"),
        );
        assert_eq!(err, Err(CommandError::InvalidChoice("Lockpick".to_string())));
        assert_eq!(state, before);
    }

    #[test]
    fn missing_ingredient_or_recipe() {
        let world = world();
        let mut state = carrying(&world, &["rag", "wire"]);
        assert_eq!(
            combine(&world, &mut state, &ItemId::new("rag"), &ItemId::new("alcohol")),
            Err(CommandError::NotCarrying("Alcohol".to_string()))
        );
        assert_eq!(
            combine(&world, &mut state, &ItemId::new("rag"), &ItemId::new("wire")),
            Err(CommandError::CannotCombine {
                first: "Rag".to_string(),
                second: "Wire".to_string()
            })
        );
        assert!(matches!(
            combine(&world, &mut state, &ItemId::new("rag"), &ItemId::new("rag")),
            Err(CommandError::CannotCombine { .. })
        ));
    }

    #[test]
    fn results_already_in_play_are_not_made_again() {
        let world = world();
        let mut state = carrying(&world, &["wire", "pin", "lockpick"]);
        let before = state.clone();
        assert_eq!(
            combine(&world, &mut state, &ItemId::new("wire"), &ItemId::new("pin")),
            Err(CommandError::AlreadyMade("Lockpick".to_string()))
        );
        assert_eq!(state, before);
    }
}

//! Integration tests: properties.
use std::collections::BTreeSet;

use proptest::prelude::*;
use proptest::sample::select;
use sl_core::{ItemId, World};
use sl_fiction::{AliasIndex, Interpreter, Owner, Pending, SessionConfig, WorldState};
use sl_markdown::parse_document;

const OFFICE: &str = include_str!("../../../demos/office.md");

const INPUTS: &[&str] = &[
    "look",
    "inventory",
    "take key",
    "take rag",
    "take wire",
    "take pin",
    "take alcohol",
    "take coin",
    "take locket",
    "drop rag",
    "drop wire",
    "drop key",
    "drop notebook",
    "examine desk",
    "examine chest",
    "go north",
    "go street",
    "go office",
    "south",
    "use key on chest",
    "lockpick chest",
    "combine wire + pin",
    "combine rag + alcohol",
    "give locket to informant",
    "talk to informant",
    "1",
    "2",
    "3",
    "0",
    "cancel",
];

fn office() -> World {
    parse_document("office.md", OFFICE)
        .into_world()
        .expect("demo story parses")
}

/// Every owner an item could have in this world.
fn owners(world: &World) -> Vec<Owner> {
    let mut owners = vec![Owner::Inventory];
    owners.extend(world.scenes().map(|s| Owner::Scene(s.id.clone())));
    owners.extend(world.characters().map(|c| Owner::Character(c.id.clone())));
    owners.extend(world.items().map(|i| Owner::Contained(i.id.clone())));
    owners
}

fn ingredients(world: &World) -> BTreeSet<ItemId> {
    world
        .recipes()
        .iter()
        .flat_map(|r| [r.ingredients.0.clone(), r.ingredients.1.clone()])
        .collect()
}

proptest! {
    #[test]
    fn every_item_has_exactly_one_owner(inputs in prop::collection::vec(select(INPUTS), 0..40)) {
        let world = office();
        let aliases = AliasIndex::build(&world);
        let interpreter = Interpreter::new(&world, &aliases);
        let mut state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        let initial: Vec<ItemId> = state.items.iter().map(|(id, _)| id.clone()).collect();
        let spendable = ingredients(&world);
        let owners = owners(&world);

        for input in inputs {
            state = interpreter.execute(&state, input).state;

            for (id, _) in state.items.iter() {
                let holders = owners
                    .iter()
                    .filter(|owner| state.items.held_by(owner).contains(id))
                    .count();
                prop_assert_eq!(holders, 1, "{} held {} times", id, holders);
            }
            for id in &initial {
                prop_assert!(
                    state.items.owner(id).is_some() || spendable.contains(id),
                    "{} vanished",
                    id
                );
            }
        }
    }

    #[test]
    fn take_then_drop_restores_the_scene(index in 0usize..3) {
        let world = office();
        let aliases = AliasIndex::build(&world);
        let interpreter = Interpreter::new(&world, &aliases);
        let state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        let here = Owner::Scene(state.current_scene.clone());
        let before: BTreeSet<ItemId> = state.items.held_by(&here).into_iter().collect();

        let name = ["key", "rag", "wire"][index];
        let taken = interpreter.execute(&state, &format!("take {name}")).state;
        prop_assert_eq!(taken.items.held_by(&here).len(), before.len() - 1);
        let dropped = interpreter.execute(&taken, &format!("drop {name}")).state;
        let after: BTreeSet<ItemId> = dropped.items.held_by(&here).into_iter().collect();
        prop_assert_eq!(after, before);
        prop_assert_eq!(dropped.inventory(), state.inventory());
    }

    #[test]
    fn combining_ignores_ingredient_order(
        first in select(&["rag", "alcohol", "wire", "pin", "notebook"][..]),
        second in select(&["rag", "alcohol", "wire", "pin", "notebook"][..]),
    ) {
        prop_assume!(first != second);
        let world = office();
        let aliases = AliasIndex::build(&world);
        let interpreter = Interpreter::new(&world, &aliases);
        let config = SessionConfig::default()
            .with_starting_inventory(vec![ItemId::new(first), ItemId::new(second)]);
        let state = WorldState::new(&world, &config).unwrap();

        let forward = interpreter.execute(&state, &format!("combine {first} + {second}")).state;
        let backward = interpreter.execute(&state, &format!("combine {second} + {first}")).state;
        prop_assert_eq!(forward.inventory(), backward.inventory());
        prop_assert_eq!(candidates(&forward), candidates(&backward));
        prop_assert_eq!(forward.turns, backward.turns);
    }
}

fn candidates(state: &WorldState) -> Option<Vec<ItemId>> {
    match &state.pending {
        Some(Pending::Recipe { candidates, .. }) => Some(candidates.clone()),
        _ => None,
    }
}

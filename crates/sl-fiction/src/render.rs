//! Plain-text rendering of scenes, conversations and pending questions.

use sl_core::{Character, DialogueNode, ItemId, World};

use crate::state::{Owner, Pending, WorldState};

/// A question waiting for the player's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// The question.
    pub question: String,
    /// Numbered options, first is option 1.
    pub options: Vec<String>,
}

/// Describe the player's current scene.
pub fn scene(world: &World, state: &WorldState) -> String {
    let Some(scene) = world.scene(&state.current_scene) else {
        return format!("You are nowhere ({}).", state.current_scene);
    };

    let mut lines = vec![scene.name.clone()];
    lines.extend(scene.description.iter().cloned());

    let here = state.items.held_by(&Owner::Scene(scene.id.clone()));
    if !here.is_empty() {
        lines.push(String::new());
        lines.push(format!("You see: {}.", names(world, &here)));
        for container in &here {
            if state.revealed.contains(container) && !state.is_locked(world, container) {
                let inside = state.items.held_by(&Owner::Contained(container.clone()));
                if !inside.is_empty() {
                    lines.push(format!(
                        "Inside the {}: {}.",
                        item_name(world, container),
                        names(world, &inside)
                    ));
                }
            }
        }
    }

    for id in &scene.characters {
        if let Some(character) = world.character(id) {
            lines.push(format!("{} is here.", character.name));
        }
    }

    if !scene.exits.is_empty() {
        let labels: Vec<&str> = scene.exits.iter().map(|e| e.label.as_str()).collect();
        lines.push(format!("Exits: {}", labels.join(", ")));
    }

    lines.join("\n")
}

/// What a character says at `node`.
pub fn node(character: &Character, node: &DialogueNode) -> Option<String> {
    let text = node.text.trim();
    if text.is_empty() {
        None
    } else {
        Some(format!("{}: {}", character.name, text))
    }
}

/// The prompt for whatever the state is waiting on.
pub fn prompt(world: &World, state: &WorldState) -> Option<Prompt> {
    match state.pending.as_ref()? {
        Pending::Dialogue { character, node } => {
            let node = world
                .character(character)?
                .dialogue
                .as_ref()?
                .node(node)?;
            Some(Prompt {
                question: "What do you say? (0 to leave)".to_string(),
                options: node.choices.iter().map(|c| c.label.clone()).collect(),
            })
        }
        Pending::Disambiguation { candidates, .. } => Some(Prompt {
            question: "Which do you mean?".to_string(),
            options: candidates.iter().map(|c| c.name(world).to_string()).collect(),
        }),
        Pending::Recipe { candidates, .. } => Some(Prompt {
            question: "Which do you want to make?".to_string(),
            options: candidates.iter().map(|c| item_name(world, c).to_string()).collect(),
        }),
    }
}

/// The display name of an item, or its id if the world lacks it.
pub fn item_name<'w>(world: &'w World, id: &'w ItemId) -> &'w str {
    world.item(id).map_or(id.as_str(), |i| i.name.as_str())
}

/// Comma-separated item names.
pub fn names(world: &World, items: &[ItemId]) -> String {
    items
        .iter()
        .map(|id| item_name(world, id))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SessionConfig;
    use sl_core::{CharacterId, Exit, Item, Scene, SceneId, WorldMeta};

    fn world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));
        let mut hall = Scene::new(SceneId::new("hall"), "Hall");
        hall.description = vec!["A draughty hall.".to_string()];
        hall.items = vec![ItemId::new("lamp"), ItemId::new("box")];
        hall.characters = vec![CharacterId::new("guard")];
        hall.exits = vec![Exit::new("north", SceneId::new("yard"))];
        world.add_scene(hall).unwrap();
        world.add_scene(Scene::new(SceneId::new("yard"), "Yard")).unwrap();
        world.add_item(Item::new(ItemId::new("lamp"), "Lamp")).unwrap();
        let mut chest = Item::new(ItemId::new("box"), "Box");
        chest.contains = Some(ItemId::new("ring"));
        world.add_item(chest).unwrap();
        world.add_item(Item::new(ItemId::new("ring"), "Ring")).unwrap();
        world
            .add_character(Character::new(CharacterId::new("guard"), "Guard"))
            .unwrap();
        world
    }

    #[test]
    fn scene_lists_items_characters_and_exits() {
        let world = world();
        let state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        let text = scene(&world, &state);
        assert!(text.starts_with("Hall\nA draughty hall."));
        assert!(text.contains("You see: Lamp, Box."));
        assert!(text.contains("Guard is here."));
        assert!(text.contains("Exits: north"));
        assert!(!text.contains("Ring"));
    }

    #[test]
    fn revealed_contents_are_listed() {
        let world = world();
        let mut state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        state.revealed.insert(ItemId::new("box"));
        assert!(scene(&world, &state).contains("Inside the Box: Ring."));
    }

    #[test]
    fn no_prompt_without_pending_question() {
        let world = world();
        let state = WorldState::new(&world, &SessionConfig::default()).unwrap();
        assert_eq!(prompt(&world, &state), None);
    }
}

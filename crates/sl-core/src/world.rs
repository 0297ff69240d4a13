use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::character::Character;
use crate::dialogue::Effect;
use crate::error::{CoreError, CoreResult, Subject};
use crate::id::{CharacterId, ItemId, SceneId};
use crate::item::Item;
use crate::recipe::RecipeBook;
use crate::scene::Scene;
use crate::value::Value;

/// Metadata about the story itself, usually read from front matter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldMeta {
    /// Story title.
    pub title: String,
    /// Banner text shown at session start.
    pub description: String,
    /// Scene the player starts in. Defaults to the first scene.
    pub starting_scene: Option<SceneId>,
    /// Items the player starts with.
    pub starting_inventory: Vec<ItemId>,
    /// Initial player variables such as skill levels.
    pub variables: BTreeMap<String, Value>,
    /// Any other front matter keys.
    pub properties: BTreeMap<String, Value>,
}

impl WorldMeta {
    /// Create metadata with a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// The entity model. Owns every scene, item, character, and recipe.
///
/// A `World` is immutable during play; everything that changes lives in the
/// session's world state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    /// Story metadata.
    pub meta: WorldMeta,
    scenes: BTreeMap<SceneId, Scene>,
    scene_order: Vec<SceneId>,
    items: BTreeMap<ItemId, Item>,
    characters: BTreeMap<CharacterId, Character>,
    recipes: RecipeBook,
}

impl World {
    /// Create an empty world.
    pub fn new(meta: WorldMeta) -> Self {
        Self {
            meta,
            scenes: BTreeMap::new(),
            scene_order: Vec::new(),
            items: BTreeMap::new(),
            characters: BTreeMap::new(),
            recipes: RecipeBook::new(),
        }
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Add a scene. Scenes keep their insertion order.
    pub fn add_scene(&mut self, scene: Scene) -> CoreResult<SceneId> {
        if self.scenes.contains_key(&scene.id) {
            return Err(CoreError::DuplicateId {
                kind: "scene",
                id: scene.id.to_string(),
            });
        }
        let id = scene.id.clone();
        self.scene_order.push(id.clone());
        self.scenes.insert(id.clone(), scene);
        Ok(id)
    }

    /// Add an item.
    pub fn add_item(&mut self, item: Item) -> CoreResult<ItemId> {
        if self.items.contains_key(&item.id) {
            return Err(CoreError::DuplicateId {
                kind: "item",
                id: item.id.to_string(),
            });
        }
        let id = item.id.clone();
        self.items.insert(id.clone(), item);
        Ok(id)
    }

    /// Add a character.
    pub fn add_character(&mut self, character: Character) -> CoreResult<CharacterId> {
        if self.characters.contains_key(&character.id) {
            return Err(CoreError::DuplicateId {
                kind: "character",
                id: character.id.to_string(),
            });
        }
        let id = character.id.clone();
        self.characters.insert(id.clone(), character);
        Ok(id)
    }

    /// Mutable access to the recipe book.
    pub fn recipes_mut(&mut self) -> &mut RecipeBook {
        &mut self.recipes
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    /// Get a scene by id.
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Get an item by id.
    pub fn item(&self, id: &ItemId) -> Option<&Item> {
        self.items.get(id)
    }

    /// Get a character by id.
    pub fn character(&self, id: &CharacterId) -> Option<&Character> {
        self.characters.get(id)
    }

    /// The recipe book.
    pub fn recipes(&self) -> &RecipeBook {
        &self.recipes
    }

    /// All scenes in document order.
    pub fn scenes(&self) -> impl Iterator<Item = &Scene> {
        self.scene_order.iter().filter_map(|id| self.scenes.get(id))
    }

    /// All items, ordered by id.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.values()
    }

    /// All characters, ordered by id.
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.characters.values()
    }

    /// The first scene in document order.
    pub fn first_scene(&self) -> Option<&Scene> {
        self.scene_order.first().and_then(|id| self.scenes.get(id))
    }

    /// The scene the player starts in: `meta.starting_scene` or the first scene.
    pub fn starting_scene(&self) -> Option<&Scene> {
        match &self.meta.starting_scene {
            Some(id) => self.scenes.get(id),
            None => self.first_scene(),
        }
    }

    /// The container an item starts inside, if any.
    pub fn container_of(&self, item: &ItemId) -> Option<&Item> {
        self.items
            .values()
            .find(|i| i.contains.as_ref() == Some(item))
    }

    /// Number of scenes.
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Number of items, including ones that start outside the world.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Number of characters.
    pub fn character_count(&self) -> usize {
        self.characters.len()
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    /// Check that every reference resolves and that no item starts in two
    /// places. Returns every problem found, in a stable order.
    pub fn validate(&self) -> Vec<CoreError> {
        let mut errors = Vec::new();
        if self.scenes.is_empty() {
            errors.push(CoreError::NoScenes);
        }

        let item_ref = |owner: String, subject: &Subject, id: &ItemId, errors: &mut Vec<CoreError>| {
            if !self.items.contains_key(id) {
                errors.push(CoreError::DanglingReference {
                    owner,
                    subject: subject.clone(),
                    kind: "item",
                    target: id.to_string(),
                });
            }
        };
        let scene_ref = |owner: String, subject: &Subject, id: &SceneId, errors: &mut Vec<CoreError>| {
            if !self.scenes.contains_key(id) {
                errors.push(CoreError::DanglingReference {
                    owner,
                    subject: subject.clone(),
                    kind: "scene",
                    target: id.to_string(),
                });
            }
        };

        // Initial placements: each item may start in at most one spot.
        let mut placed: BTreeMap<&ItemId, String> = BTreeMap::new();
        let mut place = |item: &ItemId, owner: String, subject: &Subject, errors: &mut Vec<CoreError>| {
            let Some((key, _)) = self.items.get_key_value(item) else {
                return;
            };
            if let Some(first) = placed.get(key) {
                errors.push(CoreError::DoublePlacement {
                    item: item.to_string(),
                    first: first.clone(),
                    second: owner,
                    subject: subject.clone(),
                });
            } else {
                placed.insert(key, owner);
            }
        };

        for scene in self.scenes() {
            let here = Subject::Scene(scene.id.clone());
            let owner = format!("scene \"{}\"", scene.id);
            for item in &scene.items {
                item_ref(owner.clone(), &here, item, &mut errors);
                place(item, owner.clone(), &here, &mut errors);
            }
            for character in &scene.characters {
                if !self.characters.contains_key(character) {
                    errors.push(CoreError::DanglingReference {
                        owner: owner.clone(),
                        subject: here.clone(),
                        kind: "character",
                        target: character.to_string(),
                    });
                }
            }
            for exit in &scene.exits {
                let owner = format!("exit \"{}\" of scene \"{}\"", exit.label, scene.id);
                scene_ref(owner.clone(), &here, &exit.destination, &mut errors);
                if let Some(required) = &exit.requires {
                    item_ref(owner, &here, required, &mut errors);
                }
            }
        }

        for character in self.characters.values() {
            let here = Subject::Character(character.id.clone());
            let owner = format!("character \"{}\"", character.id);
            for item in &character.items {
                item_ref(owner.clone(), &here, item, &mut errors);
                place(item, owner.clone(), &here, &mut errors);
            }
            for item in character.accepts.iter().flatten() {
                item_ref(owner.clone(), &here, item, &mut errors);
            }
            let Some(graph) = &character.dialogue else {
                continue;
            };
            for node in graph.nodes() {
                for choice in &node.choices {
                    let owner = format!("dialogue of \"{}\" at node \"{}\"", character.id, node.id);
                    if let Some(next) = choice.next.as_ref().filter(|n| !graph.contains(n)) {
                        errors.push(CoreError::DanglingReference {
                            owner: owner.clone(),
                            subject: here.clone(),
                            kind: "dialogue node",
                            target: next.to_string(),
                        });
                    }
                    for effect in &choice.effects {
                        match effect {
                            Effect::Gives(item) | Effect::Takes(item) => {
                                item_ref(owner.clone(), &here, item, &mut errors)
                            }
                            Effect::Goto(node) if !graph.contains(node) => {
                                errors.push(CoreError::DanglingReference {
                                    owner: owner.clone(),
                                    subject: here.clone(),
                                    kind: "dialogue node",
                                    target: node.to_string(),
                                })
                            }
                            Effect::LeavesTo(scene) => {
                                scene_ref(owner.clone(), &here, scene, &mut errors)
                            }
                            _ => {}
                        }
                    }
                }
            }
        }

        for item in self.items.values() {
            let here = Subject::Item(item.id.clone());
            let owner = format!("item \"{}\"", item.id);
            if let Some(inner) = &item.contains {
                item_ref(owner.clone(), &here, inner, &mut errors);
                place(inner, owner.clone(), &here, &mut errors);
            }
            if let Some(target) = item.unlocks() {
                item_ref(owner, &here, target, &mut errors);
            }
        }

        for recipe in self.recipes.iter() {
            let (a, b) = &recipe.ingredients;
            let here = Subject::Recipe(a.clone(), b.clone());
            let owner = format!("recipe \"{a} + {b}\"");
            item_ref(owner.clone(), &here, a, &mut errors);
            item_ref(owner.clone(), &here, b, &mut errors);
            for result in &recipe.results {
                item_ref(owner.clone(), &here, &result.item, &mut errors);
            }
        }

        if let Some(start) = &self.meta.starting_scene {
            let owner = "front matter starting_scene".to_string();
            scene_ref(owner, &Subject::StartingScene, start, &mut errors);
        }
        for item in &self.meta.starting_inventory {
            let here = Subject::StartingInventory;
            item_ref("front matter starting_inventory".to_string(), &here, item, &mut errors);
            place(item, "the starting inventory".to_string(), &here, &mut errors);
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::{Choice, DialogueGraph, DialogueNode};
    use crate::id::NodeId;
    use crate::recipe::RecipeResult;
    use crate::scene::Exit;

    fn test_world() -> World {
        let mut world = World::new(WorldMeta::new("Test"));
        let mut office = Scene::new(SceneId::new("office"), "Office");
        office.items.push(ItemId::new("key"));
        office
            .exits
            .push(Exit::new("north", SceneId::new("vault")).requiring(ItemId::new("key")));
        world.add_scene(office).unwrap();
        world
            .add_scene(Scene::new(SceneId::new("vault"), "Vault"))
            .unwrap();
        world
            .add_item(Item::new(ItemId::new("key"), "Brass Key"))
            .unwrap();
        world
    }

    #[test]
    fn scenes_keep_document_order() {
        let world = test_world();
        let names: Vec<_> = world.scenes().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Office", "Vault"]);
        assert_eq!(world.first_scene().unwrap().id, SceneId::new("office"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut world = test_world();
        let result = world.add_item(Item::new(ItemId::new("key"), "Other Key"));
        assert!(matches!(result, Err(CoreError::DuplicateId { kind: "item", .. })));
    }

    #[test]
    fn valid_world_has_no_errors() {
        assert!(test_world().validate().is_empty());
    }

    #[test]
    fn dangling_references_reported() {
        let mut world = test_world();
        world.recipes_mut().add(
            &ItemId::new("key"),
            &ItemId::new("ghost"),
            RecipeResult {
                item: ItemId::new("key"),
                description: None,
            },
        );
        let root = DialogueNode::new(NodeId::root(), "Hello")
            .with_choice(Choice::new("Again").with_effect(Effect::Goto(NodeId::new("nowhere"))));
        let mut informant = Character::new(CharacterId::new("informant"), "Informant")
            .with_dialogue(DialogueGraph::new(root));
        informant.items.push(ItemId::new("key"));
        world.add_character(informant).unwrap();

        let errors = world.validate();
        assert!(errors.iter().any(|e| matches!(
            e,
            CoreError::DanglingReference { target, subject: Subject::Recipe(..), .. } if target == "ghost"
        )));
        assert!(errors.iter().any(|e| matches!(
            e,
            CoreError::DanglingReference { target, .. } if target == "nowhere"
        )));
        let informant = Subject::Character(CharacterId::new("informant"));
        assert!(errors.iter().any(|e| matches!(e, CoreError::DoublePlacement { .. })
            && e.subject().as_ref() == Some(&informant)));
    }

    #[test]
    fn starting_scene_falls_back_to_first() {
        let mut world = test_world();
        assert_eq!(world.starting_scene().unwrap().name, "Office");
        world.meta.starting_scene = Some(SceneId::new("vault"));
        assert_eq!(world.starting_scene().unwrap().name, "Vault");
    }
}

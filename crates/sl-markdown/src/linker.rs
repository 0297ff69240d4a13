//! Turns the drafts of every document into one [`World`].
//!
//! Linking happens in passes:
//! 1. **Id pass**: scenes, characters and items get their ids, and every
//!    name and alias goes into a [`NameIndex`].
//! 2. **Reference pass**: exits, recipes, dialogue effects, item rules and
//!    the front matter resolve their written names through the indexes.
//!
//! A reference that does not resolve becomes an error diagnostic and is
//! dropped, so the world that comes out is always internally consistent.

use std::collections::{BTreeMap, BTreeSet};

use sl_core::{
    Character, CharacterId, Choice, DialogueGraph, DialogueNode, Effect, Exit, Item, ItemId,
    ItemKind, ItemRule, Lock, NodeId, RecipeBook, RecipeResult, Scene, SceneId, Subject, Value,
    World, WorldMeta, slugify,
};

use crate::diagnostics::{Diagnostic, Origin};
use crate::draft::{
    Annotation, CharacterDraft, DialogueDraft, DocumentDraft, ItemDraft, Property, RecipeDraft,
    SceneDraft,
};
use crate::resolver::{Lookup, NameIndex};

const UNTITLED: &str = "Untitled Story";

/// Who holds an item when the story starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Scene(usize),
    Character(usize),
    Contained(usize),
    /// Catalog items and recipe results that enter play later.
    Latent,
}

#[derive(Debug)]
struct Entry {
    id: ItemId,
    draft: ItemDraft,
    slot: Slot,
}

#[derive(Debug)]
struct SceneSlot<'d> {
    id: SceneId,
    draft: &'d SceneDraft,
}

#[derive(Debug)]
struct CharacterSlot<'d> {
    id: CharacterId,
    draft: &'d CharacterDraft,
    scene: usize,
}

/// Link parsed documents into a world, returning every diagnostic found.
pub(crate) fn link(documents: &[DocumentDraft]) -> (World, Vec<Diagnostic>) {
    let mut linker = Linker::default();
    let world = linker.link(documents);
    (world, linker.diagnostics)
}

#[derive(Default)]
struct Linker {
    diagnostics: Vec<Diagnostic>,
    scenes: NameIndex<SceneId>,
    characters: NameIndex<CharacterId>,
    items: NameIndex<ItemId>,
    /// Where each recipe was first written, by sorted ingredient pair.
    recipe_origins: BTreeMap<(ItemId, ItemId), Origin>,
}

impl Linker {
    fn link(&mut self, documents: &[DocumentDraft]) -> World {
        // Pass 1: ids and name indexes
        let scenes = self.collect_scenes(documents);
        let characters = self.collect_characters(&scenes);
        let mut entries = collect_items(documents, &scenes, &characters);
        self.assign_item_ids(&mut entries);
        self.synthesize_results(documents, &mut entries);

        // Pass 2: references
        let mut world = World::new(self.build_meta(documents));

        for (index, entry) in entries.iter().enumerate() {
            let item = self.build_item(index, entry, &entries);
            self.commit(world.add_item(item).map(drop), &entry.draft.origin);
        }

        let mut dialogues = self.build_dialogues(&scenes, &characters);
        for (index, slot) in characters.iter().enumerate() {
            let character = self.build_character(index, slot, &entries, dialogues.remove(&slot.id));
            self.commit(world.add_character(character).map(drop), &slot.draft.origin);
        }

        for (index, slot) in scenes.iter().enumerate() {
            let scene = self.build_scene(index, slot, &characters, &entries);
            self.commit(world.add_scene(scene).map(drop), &slot.draft.origin);
        }

        for recipe in documents.iter().flat_map(|doc| &doc.recipes) {
            self.link_recipe(recipe, &mut world);
        }

        for error in world.validate() {
            let origin = error
                .subject()
                .and_then(|subject| self.locate(&subject, documents, &scenes, &characters, &entries))
                .unwrap_or_else(Origin::world);
            self.diagnostics.push(Diagnostic::error(origin, error.to_string()));
        }

        tracing::debug!(
            scenes = world.scene_count(),
            items = world.item_count(),
            characters = world.character_count(),
            recipes = world.recipes().len(),
            "linked world"
        );
        world
    }

    fn commit(&mut self, result: sl_core::CoreResult<()>, origin: &Origin) {
        if let Err(error) = result {
            self.error(origin, error.to_string());
        }
    }

    /// Find the declaration a validation error belongs to.
    fn locate(
        &self,
        subject: &Subject,
        documents: &[DocumentDraft],
        scenes: &[SceneSlot<'_>],
        characters: &[CharacterSlot<'_>],
        entries: &[Entry],
    ) -> Option<Origin> {
        let front_matter = |key: &str| {
            documents
                .iter()
                .flat_map(|doc| &doc.front_matter)
                .find(|property| property.key == key)
                .map(|property| property.origin.clone())
        };
        match subject {
            Subject::Scene(id) => scenes
                .iter()
                .find(|slot| &slot.id == id)
                .map(|slot| slot.draft.origin.clone()),
            Subject::Character(id) => characters
                .iter()
                .find(|slot| &slot.id == id)
                .map(|slot| slot.draft.origin.clone()),
            Subject::Item(id) => entries
                .iter()
                .find(|entry| &entry.id == id)
                .map(|entry| entry.draft.origin.clone()),
            Subject::Recipe(a, b) => self.recipe_origins.get(&(a.clone(), b.clone())).cloned(),
            Subject::StartingScene => front_matter("starting_scene"),
            Subject::StartingInventory => front_matter("starting_inventory"),
        }
    }

    fn error(&mut self, origin: &Origin, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::error(origin.clone(), message));
    }

    fn warning(&mut self, origin: &Origin, message: impl Into<String>) {
        self.diagnostics
            .push(Diagnostic::warning(origin.clone(), message));
    }

    // -- Pass 1: ids --

    fn collect_scenes<'d>(&mut self, documents: &'d [DocumentDraft]) -> Vec<SceneSlot<'d>> {
        let mut scenes = Vec::new();
        for draft in documents.iter().flat_map(|doc| &doc.scenes) {
            let slug = slugify(&draft.name);
            if slug.is_empty() {
                self.error(&draft.origin, format!("scene name \"{}\" has no usable id", draft.name));
                continue;
            }
            if self.scenes.contains_id(&slug) {
                self.error(&draft.origin, format!("scene already exists: \"{}\"", draft.name));
                continue;
            }
            let id = SceneId::new(slug);
            self.scenes.insert_id(id.as_str(), id.clone());
            self.scenes.insert_name(&draft.name, id.clone());
            scenes.push(SceneSlot { id, draft });
        }
        scenes
    }

    fn collect_characters<'d>(&mut self, scenes: &[SceneSlot<'d>]) -> Vec<CharacterSlot<'d>> {
        let mut characters = Vec::new();
        for (scene, slot) in scenes.iter().enumerate() {
            for draft in &slot.draft.characters {
                let slug = explicit_id(&draft.properties).unwrap_or_else(|| slugify(&draft.name));
                if slug.is_empty() {
                    self.error(&draft.origin, format!("character name \"{}\" has no usable id", draft.name));
                    continue;
                }
                if self.characters.contains_id(&slug) {
                    self.error(&draft.origin, format!("character already exists: \"{}\"", draft.name));
                    continue;
                }
                let id = CharacterId::new(slug);
                self.characters.insert_id(id.as_str(), id.clone());
                self.characters.insert_name(&draft.name, id.clone());
                for alias in aliases(&draft.properties) {
                    self.characters.insert_name(&alias, id.clone());
                }
                characters.push(CharacterSlot { id, draft, scene });
            }
        }
        characters
    }

    fn assign_item_ids(&mut self, entries: &mut [Entry]) {
        let explicit: Vec<Option<String>> = entries
            .iter()
            .map(|entry| explicit_id(&entry.draft.properties))
            .collect();

        let mut reserved = BTreeSet::new();
        for (entry, id) in entries.iter().zip(&explicit) {
            if let Some(id) = id {
                if !reserved.insert(id.clone()) {
                    self.error(&entry.draft.origin, format!("item id already exists: \"{id}\""));
                }
            }
        }

        let mut assigned = BTreeSet::new();
        for (entry, id) in entries.iter_mut().zip(explicit) {
            let id = match id.filter(|id| !assigned.contains(id)) {
                Some(id) => id,
                None => unique_id(&entry.draft.name, &reserved, &assigned),
            };
            assigned.insert(id.clone());
            entry.id = ItemId::new(id);
            self.index_item(entry);
        }
    }

    fn index_item(&mut self, entry: &Entry) {
        self.items.insert_id(entry.id.as_str(), entry.id.clone());
        self.items.insert_name(&entry.draft.name, entry.id.clone());
        for alias in aliases(&entry.draft.properties) {
            self.items.insert_name(&alias, entry.id.clone());
        }
    }

    /// Recipe results that are not declared anywhere become latent items.
    fn synthesize_results(&mut self, documents: &[DocumentDraft], entries: &mut Vec<Entry>) {
        for recipe in documents.iter().flat_map(|doc| &doc.recipes) {
            if self.items.find(&recipe.result) != Lookup::Missing {
                continue;
            }
            let taken: BTreeSet<String> = entries.iter().map(|e| e.id.as_str().to_string()).collect();
            let entry = Entry {
                id: ItemId::new(unique_id(&recipe.result, &taken, &BTreeSet::new())),
                draft: ItemDraft {
                    name: recipe.result.clone(),
                    origin: recipe.origin.clone(),
                    movable: true,
                    description: recipe.description.clone(),
                    properties: Vec::new(),
                    nested: None,
                },
                slot: Slot::Latent,
            };
            tracing::debug!(item = %entry.id, "declaring recipe result as a latent item");
            self.index_item(&entry);
            entries.push(entry);
        }
    }

    // -- Pass 2: references --

    fn build_meta(&mut self, documents: &[DocumentDraft]) -> WorldMeta {
        let mut meta = WorldMeta::new(UNTITLED);
        let mut seen = BTreeSet::new();

        for property in documents.iter().flat_map(|doc| &doc.front_matter) {
            if !seen.insert(property.key.clone()) {
                self.warning(
                    &property.origin,
                    format!("front matter key `{}` is already set", property.key),
                );
                continue;
            }
            match property.key.as_str() {
                "title" => meta.title = property.value.to_string(),
                "description" => meta.description = property.value.to_string(),
                "starting_scene" => {
                    meta.starting_scene = self.scenes.lookup(
                        "scene",
                        &property.value.to_string(),
                        &property.origin,
                        &mut self.diagnostics,
                    );
                }
                "starting_inventory" => {
                    for name in property.value.to_string_list() {
                        if let Some(id) =
                            self.items
                                .lookup("item", &name, &property.origin, &mut self.diagnostics)
                        {
                            meta.starting_inventory.push(id);
                        }
                    }
                }
                "player" | "variables" => match &property.value {
                    Value::Map(map) => meta.variables.extend(map.clone()),
                    other => self.error(
                        &property.origin,
                        format!("`{}` must be a map like {{\"lockpicking_skill\": 2}}, got `{other}`", property.key),
                    ),
                },
                other => {
                    meta.properties
                        .insert(other.to_string(), property.value.clone());
                }
            }
        }

        if !seen.contains("title") {
            if let Some(heading) = documents.iter().find_map(|doc| doc.heading.clone()) {
                meta.title = heading;
            }
        }
        meta
    }

    fn build_item(&mut self, index: usize, entry: &Entry, entries: &[Entry]) -> Item {
        let draft = &entry.draft;
        let mut item = Item::new(entry.id.clone(), draft.name.clone());
        item.movable = draft.movable;
        item.description = draft.description.clone();

        let mut lock: Option<Lock> = None;
        for property in &draft.properties {
            let Property { key, value, origin } = property;
            match key.as_str() {
                "id" => {}
                "type" | "kind" => item.kind = ItemKind::parse(&value.to_string()),
                "aliases" | "alias" => item.aliases.extend(value.to_string_list()),
                "description" => item.description = Some(value.to_string()),
                "examine" => item.rules.push(ItemRule::Examine(value.to_string())),
                "use_message" | "on_use" => item.rules.push(ItemRule::UseMessage(value.to_string())),
                "movable" => match value.as_bool() {
                    Some(movable) => item.movable = movable,
                    None => self.error(origin, format!("`movable` must be true or false, got `{value}`")),
                },
                "locked" | "lockable" => match value.as_bool() {
                    Some(locked) => lock.get_or_insert_with(locked_by_default).locked = locked,
                    None => self.error(origin, format!("`{key}` must be true or false, got `{value}`")),
                },
                "lock_difficulty" | "difficulty" => match value.as_int() {
                    Some(n) => lock.get_or_insert_with(locked_by_default).difficulty = Some(n),
                    None => self.error(origin, format!("`{key}` must be a whole number, got `{value}`")),
                },
                "on_unlock" => {
                    lock.get_or_insert_with(locked_by_default).on_unlock = Some(value.to_string());
                }
                "on_fail_lockpick" | "on_fail" => {
                    lock.get_or_insert_with(locked_by_default).on_fail = Some(value.to_string());
                }
                "unlocks" => {
                    if let Some(target) =
                        self.items
                            .lookup("item", &value.to_string(), origin, &mut self.diagnostics)
                    {
                        item.rules.push(ItemRule::Unlocks(target));
                    }
                }
                "skill_bonus" => match value.as_map() {
                    Some(bonuses) => {
                        for (skill, bonus) in bonuses {
                            match bonus.as_int() {
                                Some(bonus) => item.rules.push(ItemRule::SkillBonus {
                                    skill: skill.clone(),
                                    bonus,
                                }),
                                None => self.error(origin, format!("skill bonus for `{skill}` must be a whole number")),
                            }
                        }
                    }
                    None => self.error(
                        origin,
                        "`skill_bonus` must be a map like {\"lockpicking\": 2}",
                    ),
                },
                "contains" => {
                    if let Some(target) =
                        self.items
                            .lookup("item", &value.to_string(), origin, &mut self.diagnostics)
                    {
                        item.contains = Some(target);
                    }
                }
                other => {
                    item.properties.insert(other.to_string(), value.clone());
                }
            }
        }

        if let Some(lock) = lock {
            item.rules.push(ItemRule::Lock(lock));
        }
        if item.kind == ItemKind::Scenery {
            item.movable = false;
        }

        if let Some(nested) = entries.iter().find(|e| e.slot == Slot::Contained(index)) {
            if item.contains.is_some() {
                self.error(
                    &nested.draft.origin,
                    format!("`{}` already contains another item", draft.name),
                );
            } else {
                item.contains = Some(nested.id.clone());
            }
        }
        item
    }

    fn build_dialogues(
        &mut self,
        scenes: &[SceneSlot<'_>],
        characters: &[CharacterSlot<'_>],
    ) -> BTreeMap<CharacterId, DialogueGraph> {
        let mut graphs = BTreeMap::new();
        for (index, scene) in scenes.iter().enumerate() {
            for draft in &scene.draft.dialogues {
                let Some(speaker) = self.resolve_speaker(&draft.speaker, index, characters) else {
                    self.warning(
                        &draft.origin,
                        format!("unknown speaker `{}`; this dialogue is ignored", draft.speaker),
                    );
                    continue;
                };
                if graphs.contains_key(&speaker) {
                    self.error(
                        &draft.origin,
                        format!("`{}` already has a dialogue", draft.speaker),
                    );
                    continue;
                }
                if let Some(graph) = self.build_graph(draft) {
                    graphs.insert(speaker, graph);
                }
            }
        }
        graphs
    }

    /// Speakers resolve against the scene's own characters first.
    fn resolve_speaker(
        &self,
        speaker: &str,
        scene: usize,
        characters: &[CharacterSlot<'_>],
    ) -> Option<CharacterId> {
        let wanted = speaker.trim().to_lowercase();
        let local = characters.iter().find(|slot| {
            slot.scene == scene
                && (slot.draft.name.to_lowercase() == wanted
                    || slot.id.as_str() == slugify(speaker)
                    || aliases(&slot.draft.properties)
                        .iter()
                        .any(|alias| alias.to_lowercase() == wanted))
        });
        match local {
            Some(slot) => Some(slot.id.clone()),
            None => match self.characters.find(speaker) {
                Lookup::Found(id) => Some(id),
                _ => None,
            },
        }
    }

    fn build_graph(&mut self, draft: &DialogueDraft) -> Option<DialogueGraph> {
        let known: BTreeSet<&NodeId> = draft.nodes.iter().map(|n| &n.id).collect();
        let mut nodes = Vec::with_capacity(draft.nodes.len());
        for node in &draft.nodes {
            let mut built = DialogueNode::new(node.id.clone(), node.text.join("\n"));
            for choice in &node.choices {
                let mut built_choice = Choice::new(choice.label.clone()).leading_to(choice.next.clone());
                for annotation in &choice.annotations {
                    if let Some(effect) = self.effect(annotation, &choice.origin, &known, &draft.speaker) {
                        built_choice = built_choice.with_effect(effect);
                    }
                }
                built = built.with_choice(built_choice);
            }
            nodes.push(built);
        }

        let mut nodes = nodes.into_iter();
        let mut graph = DialogueGraph::new(nodes.next()?);
        for node in nodes {
            graph.insert(node);
        }
        tracing::debug!(speaker = %draft.speaker, nodes = graph.len(), "linked dialogue");
        Some(graph)
    }

    fn effect(
        &mut self,
        annotation: &Annotation,
        origin: &Origin,
        known: &BTreeSet<&NodeId>,
        speaker: &str,
    ) -> Option<Effect> {
        match annotation {
            Annotation::Requires(flag) => Some(Effect::Requires(flag.clone())),
            Annotation::Sets(flag) => Some(Effect::Sets(flag.clone())),
            Annotation::Gives(name) => self
                .items
                .lookup("item", name, origin, &mut self.diagnostics)
                .map(Effect::Gives),
            Annotation::Takes(name) => self
                .items
                .lookup("item", name, origin, &mut self.diagnostics)
                .map(Effect::Takes),
            Annotation::Goto(target) => {
                let node = NodeId::new(target.trim());
                if known.contains(&node) {
                    Some(Effect::Goto(node))
                } else {
                    self.error(
                        origin,
                        format!("goto target `{target}` is not a node of {speaker}'s dialogue"),
                    );
                    None
                }
            }
            Annotation::Ends => Some(Effect::EndsDialogue),
            Annotation::LeavesTo(scene) => self
                .scenes
                .lookup("scene", scene, origin, &mut self.diagnostics)
                .map(Effect::LeavesTo),
        }
    }

    fn build_character(
        &mut self,
        index: usize,
        slot: &CharacterSlot<'_>,
        entries: &[Entry],
        dialogue: Option<DialogueGraph>,
    ) -> Character {
        let draft = slot.draft;
        let mut character =
            Character::new(slot.id.clone(), draft.name.clone()).with_description(draft.description.clone());
        character.items = entries
            .iter()
            .filter(|e| e.slot == Slot::Character(index))
            .map(|e| e.id.clone())
            .collect();
        character.dialogue = dialogue;

        for Property { key, value, origin } in &draft.properties {
            match key.as_str() {
                "id" => {}
                "aliases" | "alias" => character.aliases.extend(value.to_string_list()),
                "description" => character.description = value.to_string(),
                "on_give" => character.on_give = Some(value.to_string()),
                "accepts" => {
                    let accepted = value
                        .to_string_list()
                        .iter()
                        .filter_map(|name| {
                            self.items.lookup("item", name, origin, &mut self.diagnostics)
                        })
                        .collect();
                    character.accepts = Some(accepted);
                }
                other => self.warning(origin, format!("unknown character property `{other}`")),
            }
        }
        character
    }

    fn build_scene(
        &mut self,
        index: usize,
        slot: &SceneSlot<'_>,
        characters: &[CharacterSlot<'_>],
        entries: &[Entry],
    ) -> Scene {
        let draft = slot.draft;
        let mut scene = Scene::new(slot.id.clone(), draft.name.clone());
        scene.description = draft.description.clone();
        scene.items = entries
            .iter()
            .filter(|e| e.slot == Slot::Scene(index))
            .map(|e| e.id.clone())
            .collect();
        scene.characters = characters
            .iter()
            .filter(|c| c.scene == index)
            .map(|c| c.id.clone())
            .collect();

        for exit in &draft.exits {
            let Some(destination) = exit.destination.as_deref().and_then(|name| {
                self.scenes
                    .lookup("scene", name, &exit.origin, &mut self.diagnostics)
            }) else {
                continue;
            };
            let mut built = Exit::new(exit.label.clone(), destination);
            built.blocked = exit.blocked;
            built.message = exit.message.clone();
            if let Some(requires) = &exit.requires {
                match self
                    .items
                    .lookup("item", requires, &exit.origin, &mut self.diagnostics)
                {
                    Some(item) => built = built.requiring(item),
                    None => continue,
                }
            }
            scene.exits.push(built);
        }
        scene
    }

    fn link_recipe(&mut self, recipe: &RecipeDraft, world: &mut World) {
        let origin = &recipe.origin;
        let first = self
            .items
            .lookup("item", &recipe.first, origin, &mut self.diagnostics);
        let second = self
            .items
            .lookup("item", &recipe.second, origin, &mut self.diagnostics);
        let result = self
            .items
            .lookup("item", &recipe.result, origin, &mut self.diagnostics);
        let (Some(first), Some(second), Some(result)) = (first, second, result) else {
            return;
        };
        if first == second {
            self.error(origin, format!("`{}` cannot be combined with itself", recipe.first));
            return;
        }
        self.recipe_origins
            .entry(RecipeBook::key(&first, &second))
            .or_insert_with(|| origin.clone());
        let added = world.recipes_mut().add(
            &first,
            &second,
            RecipeResult {
                item: result,
                description: recipe.description.clone(),
            },
        );
        if !added {
            self.warning(origin, "duplicate combination");
        }
    }
}

/// Flatten every item declaration with the slot it starts in.
fn collect_items(
    documents: &[DocumentDraft],
    scenes: &[SceneSlot<'_>],
    characters: &[CharacterSlot<'_>],
) -> Vec<Entry> {
    let mut entries = Vec::new();
    for (index, scene) in scenes.iter().enumerate() {
        for item in &scene.draft.items {
            push_entry(&mut entries, item, Slot::Scene(index));
        }
    }
    for (index, character) in characters.iter().enumerate() {
        for item in &character.draft.items {
            push_entry(&mut entries, item, Slot::Character(index));
        }
    }
    for item in documents.iter().flat_map(|doc| &doc.catalog) {
        push_entry(&mut entries, item, Slot::Latent);
    }
    entries
}

fn push_entry(entries: &mut Vec<Entry>, item: &ItemDraft, slot: Slot) {
    let mut draft = item.clone();
    let nested = draft.nested.take();
    entries.push(Entry {
        id: ItemId::new(String::new()),
        draft,
        slot,
    });
    if let Some(nested) = nested {
        let parent = entries.len() - 1;
        entries.push(Entry {
            id: ItemId::new(String::new()),
            draft: *nested,
            slot: Slot::Contained(parent),
        });
    }
}

fn explicit_id(properties: &[Property]) -> Option<String> {
    properties
        .iter()
        .find(|p| p.key == "id")
        .map(|p| slugify(&p.value.to_string()))
        .filter(|id| !id.is_empty())
}

fn aliases(properties: &[Property]) -> Vec<String> {
    properties
        .iter()
        .filter(|p| p.key == "aliases" || p.key == "alias")
        .flat_map(|p| p.value.to_string_list())
        .collect()
}

fn locked_by_default() -> Lock {
    Lock {
        locked: true,
        ..Lock::default()
    }
}

/// The slug of `name`, suffixed with `_2`, `_3`... until it is free.
fn unique_id(name: &str, reserved: &BTreeSet<String>, assigned: &BTreeSet<String>) -> String {
    let base = match slugify(name) {
        slug if slug.is_empty() => "item".to_string(),
        slug => slug,
    };
    let free = |candidate: &String| !reserved.contains(candidate) && !assigned.contains(candidate);
    if free(&base) {
        return base;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}_{n}");
        if free(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unique_ids_get_suffixes() {
        let reserved = BTreeSet::from(["door".to_string()]);
        let assigned = BTreeSet::from(["door_2".to_string()]);
        assert_eq!(unique_id("Door", &reserved, &assigned), "door_3");
        assert_eq!(unique_id("Lamp", &reserved, &assigned), "lamp");
        assert_eq!(unique_id("!!!", &reserved, &assigned), "item");
    }
}

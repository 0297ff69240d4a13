//! The working copy a single command runs against.

use std::collections::BTreeMap;

use sl_core::{Character, CharacterId, Item, ItemId, Scene, World};

use crate::error::CommandError;
use crate::parser::{AliasIndex, EntityRef, Resolution, normalize_phrase};
use crate::state::{Owner, WorldState};

/// Why a command stopped early.
#[derive(Debug)]
pub(crate) enum Halt {
    /// The command was refused; nothing it did is kept.
    Failed(CommandError),
    /// A phrase named several entities; the player has to pick one.
    Ambiguous {
        phrase: String,
        candidates: Vec<EntityRef>,
    },
}

impl From<CommandError> for Halt {
    fn from(err: CommandError) -> Self {
        Self::Failed(err)
    }
}

pub(crate) type Step<T> = Result<T, Halt>;

/// Which entities a phrase may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    /// Items lying in the scene, including revealed contents.
    Scene,
    /// Items the player carries.
    Inventory,
    /// Scene items and carried items, including revealed contents.
    Reachable,
    /// Characters in the scene.
    Characters,
    /// Everything the player can look at.
    Visible,
}

pub(crate) struct Context<'a> {
    pub world: &'a World,
    pub aliases: &'a AliasIndex,
    pub state: WorldState,
    pub bindings: BTreeMap<String, EntityRef>,
    lines: Vec<String>,
}

impl<'a> Context<'a> {
    pub fn new(
        world: &'a World,
        aliases: &'a AliasIndex,
        state: WorldState,
        bindings: BTreeMap<String, EntityRef>,
    ) -> Self {
        Self {
            world,
            aliases,
            state,
            bindings,
            lines: Vec::new(),
        }
    }

    pub fn say(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn into_parts(self) -> (WorldState, String) {
        (self.state, self.lines.join("\n"))
    }

    pub fn scene(&self) -> Step<&'a Scene> {
        self.world
            .scene(&self.state.current_scene)
            .ok_or_else(|| broken(format!("unknown scene \"{}\"", self.state.current_scene)))
    }

    pub fn item(&self, id: &ItemId) -> Step<&'a Item> {
        self.world
            .item(id)
            .ok_or_else(|| broken(format!("unknown item \"{id}\"")))
    }

    pub fn character(&self, id: &CharacterId) -> Step<&'a Character> {
        self.world
            .character(id)
            .ok_or_else(|| broken(format!("unknown character \"{id}\"")))
    }

    /// Entities in `scope`, in the order they are listed to the player.
    pub fn visible(&self, scope: Scope) -> Vec<EntityRef> {
        let here = self
            .state
            .items
            .held_by(&Owner::Scene(self.state.current_scene.clone()));
        let carried = self.state.inventory();
        let present: Vec<CharacterId> = self
            .world
            .scene(&self.state.current_scene)
            .map(|s| s.characters.clone())
            .unwrap_or_default();

        let mut items = match scope {
            Scope::Scene => self.with_contents(here),
            Scope::Inventory => carried,
            Scope::Reachable | Scope::Visible => {
                let mut all = here;
                all.extend(carried);
                self.with_contents(all)
            }
            Scope::Characters => Vec::new(),
        };
        if scope == Scope::Visible {
            for character in &present {
                items.extend(self.state.items.held_by(&Owner::Character(character.clone())));
            }
        }

        let mut entities: Vec<EntityRef> = items.into_iter().map(EntityRef::Item).collect();
        if matches!(scope, Scope::Characters | Scope::Visible) {
            entities.extend(present.into_iter().map(EntityRef::Character));
        }
        entities
    }

    /// `items` followed by the contents of any opened, revealed container
    /// among them.
    fn with_contents(&self, items: Vec<ItemId>) -> Vec<ItemId> {
        let mut all = items.clone();
        for container in &items {
            if self.state.revealed.contains(container)
                && !self.state.is_locked(self.world, container)
            {
                all.extend(self.state.items.held_by(&Owner::Contained(container.clone())));
            }
        }
        all
    }

    /// Resolve `phrase` to one entity in `scope`.
    pub fn resolve(&self, phrase: &str, scope: Scope) -> Step<EntityRef> {
        let visible = self.visible(scope);
        let bound = self.bindings.get(&normalize_phrase(phrase));
        if let Some(bound) = bound.filter(|b| visible.contains(b)) {
            return Ok(bound.clone());
        }
        match self.aliases.resolve(self.world, phrase, &visible) {
            Resolution::Found(entity) => Ok(entity),
            Resolution::Ambiguous(candidates) => Err(Halt::Ambiguous {
                phrase: phrase.trim().to_string(),
                candidates,
            }),
            Resolution::NotFound { suggestion } => Err(CommandError::NotFound {
                phrase: phrase.trim().to_string(),
                suggestion,
            }
            .into()),
        }
    }

    /// Resolve `phrase` to an item in `scope`.
    pub fn resolve_item(&self, phrase: &str, scope: Scope) -> Step<&'a Item> {
        match self.resolve(phrase, scope)? {
            EntityRef::Item(id) => self.item(&id),
            EntityRef::Character(_) => Err(CommandError::NotFound {
                phrase: phrase.trim().to_string(),
                suggestion: None,
            }
            .into()),
        }
    }

    /// Resolve `phrase` to a character present in the scene.
    pub fn resolve_character(&self, phrase: &str) -> Step<&'a Character> {
        match self.resolve(phrase, Scope::Characters)? {
            EntityRef::Character(id) => self.character(&id),
            EntityRef::Item(_) => Err(CommandError::NotFound {
                phrase: phrase.trim().to_string(),
                suggestion: None,
            }
            .into()),
        }
    }

    /// The first item a phrase names anywhere in the world, visible or not.
    pub fn named_item(&self, phrase: &str) -> Option<&'a Item> {
        self.aliases
            .lookup(phrase)
            .iter()
            .filter_map(EntityRef::as_item)
            .find_map(|id| self.world.item(id))
    }
}

fn broken(message: String) -> Halt {
    Halt::Failed(CommandError::BrokenWorld(message))
}

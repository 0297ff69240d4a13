//! Configuration for a play session.

use std::collections::BTreeMap;

use sl_core::{ItemId, SceneId, Value};

/// Overrides applied on top of a document's front matter.
///
/// Every field left unset falls back to the world's own metadata: the
/// `starting_scene` (or the first scene), the `starting_inventory`, and the
/// `player` variables.
#[derive(Debug, Clone, Default)]
pub struct SessionConfig {
    /// Scene to start in.
    pub starting_scene: Option<SceneId>,
    /// Items the player starts with.
    pub starting_inventory: Option<Vec<ItemId>>,
    /// Player variables merged over the document's.
    pub variables: BTreeMap<String, Value>,
}

impl SessionConfig {
    /// Start in `scene`.
    pub fn with_starting_scene(mut self, scene: SceneId) -> Self {
        self.starting_scene = Some(scene);
        self
    }

    /// Start with exactly these items.
    pub fn with_starting_inventory(mut self, items: Vec<ItemId>) -> Self {
        self.starting_inventory = Some(items);
        self
    }

    /// Set a player variable.
    pub fn with_variable(mut self, name: impl Into<String>, value: Value) -> Self {
        self.variables.insert(name.into(), value);
        self
    }
}

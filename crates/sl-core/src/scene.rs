use serde::{Deserialize, Serialize};

use crate::id::{CharacterId, ItemId, SceneId};

/// A directed, possibly gated edge from one scene to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exit {
    /// The label the player types, e.g. `north` or `Street`.
    pub label: String,
    /// Where the exit leads.
    pub destination: SceneId,
    /// Item the player must carry to pass.
    pub requires: Option<ItemId>,
    /// Whether the exit is impassable.
    pub blocked: bool,
    /// Message shown when the gate stops the player.
    pub message: Option<String>,
}

impl Exit {
    /// Create an ungated exit.
    pub fn new(label: impl Into<String>, destination: SceneId) -> Self {
        Self {
            label: label.into(),
            destination,
            requires: None,
            blocked: false,
            message: None,
        }
    }

    /// Require an item to pass.
    pub fn requiring(mut self, item: ItemId) -> Self {
        self.requires = Some(item);
        self
    }

    /// Set the gate message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Case-insensitive label comparison.
    pub fn matches(&self, label: &str) -> bool {
        self.label.eq_ignore_ascii_case(label.trim())
    }
}

/// A location node in the world graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Unique identifier.
    pub id: SceneId,
    /// Display name.
    pub name: String,
    /// Description paragraphs in document order.
    pub description: Vec<String>,
    /// Items present when the story starts, in document order.
    pub items: Vec<ItemId>,
    /// Characters present.
    pub characters: Vec<CharacterId>,
    /// Exits in document order.
    pub exits: Vec<Exit>,
}

impl Scene {
    /// Create an empty scene.
    pub fn new(id: SceneId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: Vec::new(),
            items: Vec::new(),
            characters: Vec::new(),
            exits: Vec::new(),
        }
    }

    /// Find an exit by label.
    pub fn exit(&self, label: &str) -> Option<&Exit> {
        self.exits.iter().find(|e| e.matches(label))
    }
}

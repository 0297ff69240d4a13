use serde::{Deserialize, Serialize};

use crate::dialogue::DialogueGraph;
use crate::id::{CharacterId, ItemId};

/// A person the player can talk to and trade with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Unique identifier.
    pub id: CharacterId,
    /// Display name.
    pub name: String,
    /// Short description shown when the character is present.
    pub description: String,
    /// Alternative names the player may type.
    pub aliases: Vec<String>,
    /// Items the character carries at the start.
    pub items: Vec<ItemId>,
    /// The character's conversation, rooted at [`DialogueGraph::root`].
    pub dialogue: Option<DialogueGraph>,
    /// Items the character will take from the player. `None` accepts anything.
    pub accepts: Option<Vec<ItemId>>,
    /// Line spoken when the character receives an item.
    pub on_give: Option<String>,
}

impl Character {
    /// Create a character with no items and no dialogue.
    pub fn new(id: CharacterId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            aliases: Vec::new(),
            items: Vec::new(),
            dialogue: None,
            accepts: None,
            on_give: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Attach a dialogue graph.
    pub fn with_dialogue(mut self, dialogue: DialogueGraph) -> Self {
        self.dialogue = Some(dialogue);
        self
    }

    /// The canonical name followed by every alias.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Whether the character takes `item` when offered.
    pub fn accepts(&self, item: &ItemId) -> bool {
        self.accepts.as_ref().is_none_or(|list| list.contains(item))
    }
}

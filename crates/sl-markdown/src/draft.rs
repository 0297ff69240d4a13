//! Unlinked records produced by the section sub-parsers.
//!
//! Drafts keep names exactly as written plus the [`Origin`] they came from;
//! the linker turns them into model entities once every name is known.

use sl_core::{NodeId, Value};

use crate::diagnostics::Origin;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Property {
    pub key: String,
    pub value: Value,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ItemDraft {
    pub name: String,
    pub origin: Origin,
    pub movable: bool,
    pub description: Option<String>,
    pub properties: Vec<Property>,
    pub nested: Option<Box<ItemDraft>>,
}

impl ItemDraft {
    pub fn property(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CharacterDraft {
    pub name: String,
    pub description: String,
    pub origin: Origin,
    pub items: Vec<ItemDraft>,
    pub properties: Vec<Property>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Annotation {
    Requires(String),
    Sets(String),
    Gives(String),
    Takes(String),
    Goto(String),
    Ends,
    LeavesTo(String),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ChoiceDraft {
    pub label: String,
    pub origin: Origin,
    pub next: NodeId,
    pub annotations: Vec<Annotation>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NodeDraft {
    pub id: NodeId,
    pub text: Vec<String>,
    pub choices: Vec<ChoiceDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct DialogueDraft {
    pub speaker: String,
    pub origin: Origin,
    /// Root first, then nodes in the order they were opened.
    pub nodes: Vec<NodeDraft>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ExitDraft {
    pub label: String,
    pub origin: Origin,
    pub destination: Option<String>,
    pub requires: Option<String>,
    pub blocked: bool,
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RecipeDraft {
    pub first: String,
    pub second: String,
    pub result: String,
    pub description: Option<String>,
    pub origin: Origin,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SceneDraft {
    pub name: String,
    pub origin: Origin,
    pub description: Vec<String>,
    pub items: Vec<ItemDraft>,
    pub characters: Vec<CharacterDraft>,
    pub dialogues: Vec<DialogueDraft>,
    pub exits: Vec<ExitDraft>,
}

impl SceneDraft {
    pub fn new(name: impl Into<String>, origin: Origin) -> Self {
        Self {
            name: name.into(),
            origin,
            description: Vec::new(),
            items: Vec::new(),
            characters: Vec::new(),
            dialogues: Vec::new(),
            exits: Vec::new(),
        }
    }
}

/// Everything segmented out of one document.
#[derive(Debug, Clone, PartialEq, Default)]
pub(crate) struct DocumentDraft {
    pub heading: Option<String>,
    pub front_matter: Vec<Property>,
    pub scenes: Vec<SceneDraft>,
    pub catalog: Vec<ItemDraft>,
    pub recipes: Vec<RecipeDraft>,
}

//! Dialogue graphs.
//!
//! A graph is a flat map of nodes keyed by [`NodeId`]. Choices point at
//! other nodes by id, so cycles (a `goto` back to an earlier node) are just
//! another edge and never require recursion to walk.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::id::{ItemId, NodeId, SceneId};

/// A side effect attached to a dialogue choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// The choice is only available while this story flag is set.
    Requires(String),
    /// Set a story flag.
    Sets(String),
    /// Give an item to the player.
    Gives(ItemId),
    /// Take an item from the player.
    Takes(ItemId),
    /// Move this character's conversation cursor to a node.
    Goto(NodeId),
    /// End the conversation.
    EndsDialogue,
    /// End the conversation and move the player to a scene.
    LeavesTo(SceneId),
}

/// A single choice in a dialogue node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    /// The text shown to the player.
    pub label: String,
    /// The node reached by picking this choice, if it has one.
    pub next: Option<NodeId>,
    /// Effects applied when the choice is picked.
    pub effects: Vec<Effect>,
}

impl Choice {
    /// Create a choice with no follow-up node.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            next: None,
            effects: Vec::new(),
        }
    }

    /// Set the follow-up node.
    pub fn leading_to(mut self, node: NodeId) -> Self {
        self.next = Some(node);
        self
    }

    /// Add an effect.
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// The flag this choice requires.
    pub fn requires(&self) -> Option<&str> {
        self.effects.iter().find_map(|e| match e {
            Effect::Requires(flag) => Some(flag.as_str()),
            _ => None,
        })
    }

    /// The `goto` target of this choice.
    pub fn goto(&self) -> Option<&NodeId> {
        self.effects.iter().find_map(|e| match e {
            Effect::Goto(node) => Some(node),
            _ => None,
        })
    }

    /// The scene this choice leaves to.
    pub fn leaves_to(&self) -> Option<&SceneId> {
        self.effects.iter().find_map(|e| match e {
            Effect::LeavesTo(scene) => Some(scene),
            _ => None,
        })
    }

    /// Whether the choice explicitly ends the conversation.
    pub fn ends_dialogue(&self) -> bool {
        self.effects.contains(&Effect::EndsDialogue)
    }
}

/// One state in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    /// Identifier, unique within the graph.
    pub id: NodeId,
    /// What the speaker says on reaching this node. May be empty.
    pub text: String,
    /// Available choices in document order.
    pub choices: Vec<Choice>,
}

impl DialogueNode {
    /// Create a node with no choices.
    pub fn new(id: NodeId, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            choices: Vec::new(),
        }
    }

    /// Add a choice.
    pub fn with_choice(mut self, choice: Choice) -> Self {
        self.choices.push(choice);
        self
    }
}

/// A character's conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueGraph {
    /// The node a first conversation starts at.
    pub root: NodeId,
    nodes: BTreeMap<NodeId, DialogueNode>,
}

impl DialogueGraph {
    /// Create a graph from its root node.
    pub fn new(root: DialogueNode) -> Self {
        let id = root.id.clone();
        let mut nodes = BTreeMap::new();
        nodes.insert(id.clone(), root);
        Self { root: id, nodes }
    }

    /// Insert or replace a node. Returns the replaced node, if any.
    pub fn insert(&mut self, node: DialogueNode) -> Option<DialogueNode> {
        self.nodes.insert(node.id.clone(), node)
    }

    /// Look up a node.
    pub fn node(&self, id: &NodeId) -> Option<&DialogueNode> {
        self.nodes.get(id)
    }

    /// Look up a node for editing.
    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut DialogueNode> {
        self.nodes.get_mut(id)
    }

    /// Whether the graph has a node with this id.
    pub fn contains(&self, id: &NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// All nodes, ordered by id.
    pub fn nodes(&self) -> impl Iterator<Item = &DialogueNode> {
        self.nodes.values()
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty. A graph always has its root, so this is
    /// only true for a graph whose root was never inserted.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

//! Core types for Storyloom: the entity model a story document compiles into.
//!
//! This crate is independent of the markdown parser. A [`World`] can be built
//! programmatically with the `add_*` methods and checked with
//! [`World::validate`], which is what the parser does after linking.

/// Characters and the items they carry.
pub mod character;
/// Dialogue graphs, nodes, choices, and choice effects.
pub mod dialogue;
/// Error types used throughout the crate.
pub mod error;
/// Typed identifiers and slug generation.
pub mod id;
/// Items, item kinds, and interaction rules.
pub mod item;
/// Item combination recipes.
pub mod recipe;
/// Scenes and exits.
pub mod scene;
/// Loosely typed property values decoded from documents.
pub mod value;
/// The world model that owns every entity.
pub mod world;

pub use character::Character;
pub use dialogue::{Choice, DialogueGraph, DialogueNode, Effect};
pub use error::{CoreError, CoreResult, Subject};
pub use id::{CharacterId, ItemId, NodeId, SceneId, slugify};
pub use item::{Item, ItemKind, ItemRule, Lock};
pub use recipe::{Recipe, RecipeBook, RecipeResult};
pub use scene::{Exit, Scene};
pub use value::Value;
pub use world::{World, WorldMeta};

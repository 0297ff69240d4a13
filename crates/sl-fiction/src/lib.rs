//! Interactive fiction runtime for Storyloom.
//!
//! Takes a [`sl_core::World`] and plays it: free-text commands are parsed,
//! noun phrases are resolved against what the player can see, and each
//! command produces text plus a new [`WorldState`]. Conversations walk
//! dialogue graphs, and puzzles (keys, lockpicking, combinations) are
//! pluggable rules.

/// Session configuration.
pub mod config;
/// The dialogue engine.
pub mod dialogue;
/// Error types for the fiction runtime.
pub mod error;
/// The command interpreter.
pub mod interpreter;
/// Command parsing and entity resolution.
pub mod parser;
/// Keys, locks, lockpicking and combinations.
pub mod puzzle;
/// Text rendering of scenes and prompts.
pub mod render;
/// Interactive fiction session management.
pub mod session;
/// Runtime state and the item ownership ledger.
pub mod state;

pub use config::SessionConfig;
pub use error::{CommandError, CommandResult};
pub use interpreter::{Interpreter, Turn, execute};
pub use parser::{AliasIndex, Command, Direction, EntityRef, Resolution, parse_command};
pub use render::Prompt;
pub use session::{Reply, Session};
pub use state::{ItemLedger, Owner, Pending, WorldState};

//! Command parsing and entity resolution.

mod command;
mod resolver;

pub use command::{Command, Direction, normalize_phrase, parse_command};
pub use resolver::{AliasIndex, EntityRef, Resolution};

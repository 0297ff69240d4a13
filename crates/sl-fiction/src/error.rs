//! Error types for the fiction runtime.

use thiserror::Error;

/// Result type for fiction operations.
pub type CommandResult<T> = Result<T, CommandError>;

/// A command the player issued could not be carried out.
///
/// Every variant is recoverable: the session reports the message and the
/// world state stays exactly as it was before the command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The input did not match any known verb.
    #[error("I don't understand that command.")]
    UnknownCommand(String),

    /// A verb was given without the object it needs.
    #[error("{0}")]
    Incomplete(String),

    /// No visible entity answers to the phrase.
    #[error("You don't see any \"{phrase}\" here.{}", did_you_mean(.suggestion))]
    NotFound {
        /// What the player typed.
        phrase: String,
        /// A close name among the visible entities.
        suggestion: Option<String>,
    },

    /// The item exists but is somewhere else.
    #[error("The {0} isn't here.")]
    NotPresent(String),

    /// The player already holds the item.
    #[error("You already have the {0}.")]
    AlreadyCarrying(String),

    /// The item is not in the inventory.
    #[error("You're not carrying the {0}.")]
    NotCarrying(String),

    /// The item is scenery.
    #[error("The {0} is not something you can carry.")]
    NotMovable(String),

    /// The current scene has no exit by that name.
    #[error("You can't go {0}.")]
    NoExit(String),

    /// The exit is gated; the payload is the message shown.
    #[error("{0}")]
    Gated(String),

    /// A used item has nothing to do on its own.
    #[error("You can't use the {0} by itself.")]
    CannotUse(String),

    /// No interaction rule covers the pair.
    #[error("You can't use the {item} with the {target}.")]
    CannotUseWith {
        /// The item being used.
        item: String,
        /// The target.
        target: String,
    },

    /// The target is already open.
    #[error("The {0} isn't locked.")]
    NotLocked(String),

    /// The key belongs to another lock.
    #[error("The {key} doesn't fit the lock of the {target}.")]
    WrongKey {
        /// The key used.
        key: String,
        /// The locked item.
        target: String,
    },

    /// The container is locked.
    #[error("The {0} is locked.")]
    Locked(String),

    /// No inventory item helps with lockpicking.
    #[error("You need lockpicking tools for that.")]
    NoLockpick,

    /// The target has no pickable lock.
    #[error("You can't pick the lock of the {0}.")]
    NotLockable(String),

    /// No recipe exists for the pair.
    #[error("The {first} and the {second} cannot be combined.")]
    CannotCombine {
        /// First ingredient.
        first: String,
        /// Second ingredient.
        second: String,
    },

    /// The recipe result is already somewhere in the world.
    #[error("The {0} has already been made.")]
    AlreadyMade(String),

    /// The character has no dialogue.
    #[error("{0} has nothing to say.")]
    NoDialogue(String),

    /// Nobody is around to receive an item.
    #[error("There is no one here to give that to.")]
    NoRecipient,

    /// The character refuses the item.
    #[error("{character} doesn't want the {item}.")]
    NotAccepted {
        /// The character.
        character: String,
        /// The item offered.
        item: String,
    },

    /// A dialogue choice needs a story flag the player has not earned.
    #[error("That response isn't available.")]
    Unavailable(String),

    /// A dialogue choice hands over an item the speaker no longer holds.
    #[error("{character} no longer has the {item}.")]
    NotHeld {
        /// The speaker.
        character: String,
        /// The item promised.
        item: String,
    },

    /// A dialogue choice takes an item the player does not have.
    #[error("You don't have the {0}.")]
    LacksItem(String),

    /// The answer to a pending question is not one of the options.
    #[error("\"{0}\" is not one of the choices.")]
    InvalidChoice(String),

    /// Nothing is waiting for an answer.
    #[error("There is nothing to cancel.")]
    NothingPending,

    /// The world cannot host a session (missing scene or dangling data).
    #[error("broken world: {0}")]
    BrokenWorld(String),
}

fn did_you_mean(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" Did you mean the {name}?"),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_mentions_suggestion() {
        let err = CommandError::NotFound {
            phrase: "lamb".to_string(),
            suggestion: Some("lamp".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "You don't see any \"lamb\" here. Did you mean the lamp?"
        );

        let err = CommandError::NotFound {
            phrase: "ghost".to_string(),
            suggestion: None,
        };
        assert_eq!(err.to_string(), "You don't see any \"ghost\" here.");
    }

    #[test]
    fn messages_are_single_lines() {
        let errors = [
            CommandError::UnknownCommand("dance".to_string()),
            CommandError::NotLocked("chest".to_string()),
            CommandError::NoLockpick,
            CommandError::CannotCombine {
                first: "rag".to_string(),
                second: "key".to_string(),
            },
        ];
        for err in errors {
            assert!(!err.to_string().contains('\n'));
        }
    }
}

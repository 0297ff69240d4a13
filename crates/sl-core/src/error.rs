use crate::id::{CharacterId, ItemId, SceneId};

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when building or validating a world.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Two entities of the same kind share an id.
    #[error("duplicate {kind} id: \"{id}\"")]
    DuplicateId {
        /// The entity kind ("scene", "item", "character").
        kind: &'static str,
        /// The clashing id.
        id: String,
    },

    /// A reference points at an entity that does not exist.
    #[error("{owner} references unknown {kind} \"{target}\"")]
    DanglingReference {
        /// Human-readable description of where the reference lives.
        owner: String,
        /// The declaration holding the reference.
        subject: Subject,
        /// The expected entity kind.
        kind: &'static str,
        /// The unresolved id.
        target: String,
    },

    /// An item is placed in more than one spot at load time.
    #[error("item \"{item}\" is placed in both {first} and {second}")]
    DoublePlacement {
        /// The item id.
        item: String,
        /// The first owner found.
        first: String,
        /// The conflicting owner.
        second: String,
        /// The declaration of the conflicting owner.
        subject: Subject,
    },

    /// The world has no scenes at all.
    #[error("world contains no scenes")]
    NoScenes,
}

impl CoreError {
    /// The declaration a problem belongs to, if it belongs to one.
    pub fn subject(&self) -> Option<Subject> {
        match self {
            Self::DuplicateId { kind: "scene", id } => Some(Subject::Scene(SceneId::new(id))),
            Self::DuplicateId { kind: "character", id } => {
                Some(Subject::Character(CharacterId::new(id)))
            }
            Self::DuplicateId { id, .. } => Some(Subject::Item(ItemId::new(id))),
            Self::DanglingReference { subject, .. } | Self::DoublePlacement { subject, .. } => {
                Some(subject.clone())
            }
            Self::NoScenes => None,
        }
    }
}

/// A declaration in the world, used to point validation errors at their
/// source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// A scene, including its exits.
    Scene(SceneId),
    /// A character, including its dialogue.
    Character(CharacterId),
    /// An item, including its rules and contents.
    Item(ItemId),
    /// A combination recipe, by its ingredients in sorted order.
    Recipe(ItemId, ItemId),
    /// The front matter `starting_scene`.
    StartingScene,
    /// The front matter `starting_inventory`.
    StartingInventory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_name_their_subject() {
        let duplicate = CoreError::DuplicateId {
            kind: "character",
            id: "clerk".to_string(),
        };
        assert_eq!(
            duplicate.subject(),
            Some(Subject::Character(CharacterId::new("clerk")))
        );

        let placed = CoreError::DoublePlacement {
            item: "rag".to_string(),
            first: "scene \"kitchen\"".to_string(),
            second: "the starting inventory".to_string(),
            subject: Subject::StartingInventory,
        };
        assert_eq!(placed.subject(), Some(Subject::StartingInventory));
        assert_eq!(CoreError::NoScenes.subject(), None);
    }
}

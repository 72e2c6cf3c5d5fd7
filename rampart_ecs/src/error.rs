//! Error types of ECS.

use std::error::Error as StdError;

use thiserror::Error;

use crate::{component::ComponentType, entity::EntityId};

/// Result of any ECS operation which can fail.
pub type Result<T> = std::result::Result<T, EcsError>;

/// Boxed error which can be returned by the *system* of ECS.
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Result of the update of the *system* of ECS.
pub type SystemResult = std::result::Result<(), BoxError>;

/// Error that can happen while working with entities, components and systems.
#[derive(Debug, Error)]
pub enum EcsError {
    #[error("entity {entity} already has component `{component}` attached")]
    ComponentAlreadyAttached {
        entity: EntityId,
        component: ComponentType,
    },

    #[error("cannot update component `{expected}` from component `{found}`")]
    ComponentTypeMismatch {
        expected: ComponentType,
        found: ComponentType,
    },

    #[error("there is no entity with id {0}")]
    NoSuchEntity(EntityId),

    #[error("archetype `{0}` is not registered")]
    UnknownArchetype(String),

    #[error("archetype `{0}` was already registered")]
    ArchetypeAlreadyRegistered(String),

    #[error("system `{name}` failed to update: {source}")]
    System {
        name: &'static str,
        #[source]
        source: BoxError,
    },
}

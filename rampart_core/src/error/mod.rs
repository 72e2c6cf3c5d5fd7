//! Utilities for game engine error handling.

use thiserror::Error;

use rampart_ecs::BoxError;

use crate::state::StateId;

/// Result of any engine operation which can return an error.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Error of [configuration](crate::config::Config) validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("count of entities per chunk must be greater than zero")]
    ZeroChunkCapacity,

    #[error("time speed must be a positive finite number, got {0}")]
    InvalidTimeSpeed(f32),

    #[error("duration of frame must be greater than zero")]
    ZeroFrameDelta,
}

/// Error that can happen while managing [game states](crate::state::GameState).
#[derive(Debug, Error)]
pub enum StateError {
    #[error("cannot set up systems of state `{id}`: {source}")]
    Setup {
        id: StateId,
        #[source]
        source: BoxError,
    },

    #[error("cannot initialize state `{id}`: {source}")]
    Init {
        id: StateId,
        #[source]
        source: BoxError,
    },

    #[error("state `{id}` failed to update: {source}")]
    Update {
        id: StateId,
        #[source]
        source: BoxError,
    },
}

/// General error type of game engine.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("game state error: {0}")]
    State(#[from] StateError),
}

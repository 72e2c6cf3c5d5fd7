//! Configuration utilities for game engine and your game.

use semver::Version;

use rampart_ecs::{EntityManager, World, DEFAULT_ENTITIES_PER_CHUNK};

use crate::{app::DeltaTime, error::ConfigError};

/// Frame delta used by default: 60 frames per second.
pub const DEFAULT_FRAME_DELTA: DeltaTime = DeltaTime::from_nanos(1_000_000_000 / 60);

/// This struct represents general configuration of game engine.
#[derive(Debug, Clone)]
pub struct Config {
    name: String,
    version: Version,
    entities_per_chunk: u32,
    time_speed: f32,
    frame_delta: DeltaTime,
    frame_limit: Option<u64>,
    monitoring: bool,
}

pub const ENGINE_NAME: &str = env!("CARGO_CRATE_NAME", "library must be compiled by Cargo");

const ENGINE_VERSION_STR: &str = env!("CARGO_PKG_VERSION", "library must be compiled by Cargo");
lazy_static::lazy_static! {
    pub static ref ENGINE_VERSION: Version = ENGINE_VERSION_STR.parse().unwrap();
}

impl Config {
    /// Creates new configuration with given name and version of your game.
    ///
    /// Other settings are set to their defaults.
    ///
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            entities_per_chunk: DEFAULT_ENTITIES_PER_CHUNK,
            time_speed: 1.0,
            frame_delta: DEFAULT_FRAME_DELTA,
            frame_limit: None,
            monitoring: cfg!(debug_assertions),
        }
    }

    pub fn with_entities_per_chunk(mut self, entities_per_chunk: u32) -> Self {
        self.entities_per_chunk = entities_per_chunk;
        self
    }

    pub fn with_time_speed(mut self, time_speed: f32) -> Self {
        self.time_speed = time_speed;
        self
    }

    pub fn with_frame_delta(mut self, frame_delta: DeltaTime) -> Self {
        self.frame_delta = frame_delta;
        self
    }

    pub fn with_frame_limit(mut self, frame_limit: Option<u64>) -> Self {
        self.frame_limit = frame_limit;
        self
    }

    pub fn with_monitoring(mut self, monitoring: bool) -> Self {
        self.monitoring = monitoring;
        self
    }

    /// Name of your game.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Semver version of your game.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// Count of entities in each chunk of entity pools.
    pub fn entities_per_chunk(&self) -> u32 {
        self.entities_per_chunk
    }

    /// Global multiplier of frame delta, applied before time speed of the game state.
    pub fn time_speed(&self) -> f32 {
        self.time_speed
    }

    /// Fixed duration of one frame used by [`Engine::run`](crate::Engine::run).
    pub fn frame_delta(&self) -> DeltaTime {
        self.frame_delta
    }

    /// Maximal count of frames to run, if any.
    pub fn frame_limit(&self) -> Option<u64> {
        self.frame_limit
    }

    /// If worlds will record statistics of their systems (useful for debugging).
    pub fn monitoring(&self) -> bool {
        self.monitoring
    }

    /// Checks that this configuration can be used to run the engine.
    ///
    /// # Errors
    ///
    /// An error is returned if count of entities per chunk is zero,
    /// time speed is not a positive finite number or frame delta is zero.
    ///
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.entities_per_chunk == 0 {
            return Err(ConfigError::ZeroChunkCapacity);
        }
        if !self.time_speed.is_finite() || self.time_speed <= 0.0 {
            return Err(ConfigError::InvalidTimeSpeed(self.time_speed));
        }
        if self.frame_delta.is_zero() {
            return Err(ConfigError::ZeroFrameDelta);
        }
        Ok(())
    }

    /// Creates an empty world according to this configuration.
    pub fn create_world(&self) -> World {
        let manager = EntityManager::with_chunk_capacity(self.entities_per_chunk);
        let mut world = World::with_entity_manager(manager);
        world.set_monitoring(self.monitoring);
        world
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new("Hello World", Version::new(0, 0, 0))
    }
}

//! Utilities for engine initialization and its main loop.

use std::time::Instant;

use crate::{
    config::{Config, ENGINE_NAME, ENGINE_VERSION},
    error::Result,
    state::{GameState, GameStateManager},
};

/// Type which represents duration between two frames.
pub type DeltaTime = rampart_ecs::DeltaTime;

/// General context of game engine.
///
/// Owns the stack of game states and ticks it frame by frame.
///
pub struct Engine {
    config: Config,
    states: GameStateManager,
    frames: u64,
}

impl Engine {
    /// Creates new engine with given configuration and empty stack of states.
    ///
    /// # Errors
    ///
    /// An error is returned if configuration is invalid.
    ///
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        log::info!(
            "starting `{}` v{} on {} v{}",
            config.name(),
            config.version(),
            ENGINE_NAME,
            *ENGINE_VERSION,
        );
        Ok(Self {
            config,
            states: GameStateManager::new(),
            frames: 0,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn states(&self) -> &GameStateManager {
        &self.states
    }

    pub fn states_mut(&mut self) -> &mut GameStateManager {
        &mut self.states
    }

    /// Count of frames run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sets up, initializes and puts new state on top of the stack.
    ///
    /// # Errors
    ///
    /// An error is returned if the state failed to initialize.
    ///
    pub fn push_state<T>(&mut self, state: T) -> Result<()>
    where
        T: GameState,
    {
        self.states.push_state(state)?;
        Ok(())
    }

    /// Runs one frame: updates the current state and applies its transition.
    ///
    /// Frame delta is scaled by the configured time speed.
    /// Returns `false` if the engine should stop.
    ///
    /// # Errors
    ///
    /// An error is returned if the current state failed to update
    /// or the state it pushed failed to initialize.
    ///
    pub fn step(&mut self, delta_time: DeltaTime) -> Result<bool> {
        if self.states.is_empty() {
            return Ok(false);
        }
        let delta_time = scale(delta_time, self.config.time_speed());
        let transition = self.states.update(delta_time)?;
        self.frames += 1;
        log::trace!("frame {} requested transition {:?}", self.frames, transition);
        Ok(self.states.apply(transition)?)
    }

    /// Runs frames with the configured fixed frame delta until the stack of states is empty,
    /// some state requests to quit or the frame limit is reached.
    ///
    /// Returns count of frames run by this call.
    ///
    /// # Errors
    ///
    /// An error is returned if some state failed; the engine is stopped then.
    ///
    pub fn run(&mut self) -> Result<u64> {
        let start = Instant::now();
        let first = self.frames;
        let delta_time = self.config.frame_delta();
        loop {
            if let Some(limit) = self.config.frame_limit() {
                if self.frames >= limit {
                    log::info!("frame limit {} is reached", limit);
                    break;
                }
            }
            if !self.step(delta_time)? {
                break;
            }
        }

        let frames = self.frames - first;
        log::info!("ran {} frames in {:?}", frames, start.elapsed());
        Ok(frames)
    }
}

/// Multiplies frame delta by time speed.
///
/// Negative, non-finite or too large results are treated as zero.
///
pub(crate) fn scale(delta_time: DeltaTime, time_speed: f32) -> DeltaTime {
    if time_speed == 1.0 {
        return delta_time;
    }
    DeltaTime::try_from_secs_f32(delta_time.as_secs_f32() * time_speed).unwrap_or_else(|_| {
        log::warn!("cannot scale frame delta by time speed {}", time_speed);
        DeltaTime::ZERO
    })
}

impl Drop for Engine {
    fn drop(&mut self) {
        self.states.clear();
        log::info!("closing this application");
    }
}

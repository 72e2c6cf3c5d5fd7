//! Utilities for managing the stack of game states.

use super::{GameState, StateContext, Transition};
use crate::{
    app::{scale, DeltaTime},
    error::StateError,
};

/// Stack of all [game states](GameState) of the game.
///
/// Only the state on top of the stack is updated.
/// Removing a state drops its world together with all of its entities.
///
#[derive(Default)]
pub struct GameStateManager {
    states: Vec<Box<dyn GameState>>,
}

impl GameStateManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets up and initializes the state, then puts it on top of the stack.
    ///
    /// # Errors
    ///
    /// An error is returned if the state failed to set up its systems or to initialize.
    /// In this case the state is dropped and the stack is left untouched.
    ///
    pub fn push(&mut self, mut state: Box<dyn GameState>) -> Result<(), StateError> {
        let id = state.id();
        state
            .setup_systems()
            .map_err(|source| StateError::Setup { id, source })?;
        state
            .init()
            .map_err(|source| StateError::Init { id, source })?;

        log::debug!(
            "pushed state `{}` with {} systems and {} entities",
            id,
            state.world().system_count(),
            state.world().entity_manager().len(),
        );
        self.states.push(state);
        Ok(())
    }

    /// Same as [`push`](Self::push), but accepts state by value.
    pub fn push_state<T>(&mut self, state: T) -> Result<(), StateError>
    where
        T: GameState,
    {
        self.push(Box::new(state))
    }

    /// Removes the current state, then the state below it (if any) is entered again.
    ///
    /// Returns removed state.
    ///
    pub fn pop_current(&mut self) -> Option<Box<dyn GameState>> {
        let state = self.states.pop()?;
        log::debug!("popped state `{}`", state.id());
        if let Some(current) = self.states.last_mut() {
            log::debug!("entering state `{}`", current.id());
            current.on_enter();
        }
        Some(state)
    }

    /// Removes the current state without entering the state below it.
    ///
    /// Returns removed state.
    ///
    pub fn pop_back(&mut self) -> Option<Box<dyn GameState>> {
        let state = self.states.pop()?;
        log::debug!("removed state `{}`", state.id());
        Some(state)
    }

    /// Current state, which is on top of the stack.
    pub fn current(&self) -> Option<&dyn GameState> {
        self.states.last().map(|state| state.as_ref())
    }

    pub fn current_mut(&mut self) -> Option<&mut dyn GameState> {
        Some(self.states.last_mut()?.as_mut())
    }

    /// Iterator over all states, from bottom to top of the stack.
    pub fn states(&self) -> impl Iterator<Item = &dyn GameState> {
        self.states.iter().map(|state| state.as_ref())
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Removes all states from the stack, from top to bottom.
    pub fn clear(&mut self) {
        while self.pop_back().is_some() {}
    }

    /// Updates the current state with frame delta scaled by its time speed.
    ///
    /// States below the current one are not updated.
    /// Returns transition requested by the current state, which is not applied yet.
    ///
    /// # Errors
    ///
    /// An error is returned if the current state failed to update.
    ///
    pub fn update(&mut self, delta_time: DeltaTime) -> Result<Transition, StateError> {
        let (current, below) = match self.states.split_last_mut() {
            Some(split) => split,
            None => {
                log::trace!("there is no state to update");
                return Ok(Transition::None);
            }
        };

        let id = current.id();
        let delta_time = scale(delta_time, current.time_speed());

        let mut context = StateContext::new(below);
        current
            .update(&mut context, delta_time)
            .map_err(|source| StateError::Update { id, source })
    }

    /// Applies transition requested by the current state.
    ///
    /// Returns `false` if the engine should stop:
    /// either the transition is [`Transition::Quit`] or the stack became empty.
    ///
    /// # Errors
    ///
    /// An error is returned if the pushed state failed to initialize.
    /// When replacing, the current state is removed even if the new one fails.
    ///
    pub fn apply(&mut self, transition: Transition) -> Result<bool, StateError> {
        match transition {
            Transition::None => {}
            Transition::Pop => {
                self.pop_current();
            }
            Transition::Push(state) => self.push(state)?,
            Transition::Replace(state) => {
                self.pop_back();
                self.push(state)?;
            }
            Transition::Quit => {
                log::info!("quit was requested");
                return Ok(false);
            }
        }
        Ok(!self.is_empty())
    }
}

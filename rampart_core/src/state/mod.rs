//! Utilities for *game states*: stacked layers of the game, each owning its own world.

use std::any::type_name;
use std::fmt;

pub use manager::GameStateManager;

use rampart_ecs::{AsAny, BoxError, EntityManager, World};

use crate::app::DeltaTime;

mod manager;

/// Identifier of the game state.
pub type StateId = &'static str;

/// Result of fallible operation of the game state.
pub type StateResult<T = ()> = std::result::Result<T, BoxError>;

/// Objects of this trait represent *game state*: a layer of the game
/// (for example, level being played or pause menu) with its own [world](World).
///
/// States are kept in a stack by the [`GameStateManager`]:
/// only the state on top of the stack is updated each frame.
///
pub trait GameState: AsAny {
    /// Identifier of this state.
    fn id(&self) -> StateId {
        type_name::<Self>()
    }

    fn world(&self) -> &World;

    fn world_mut(&mut self) -> &mut World;

    /// Registers systems in the world of this state.
    ///
    /// Called once, right before [`init`](Self::init).
    ///
    fn setup_systems(&mut self) -> StateResult;

    /// Creates initial entities of this state.
    fn init(&mut self) -> StateResult;

    /// Called when this state becomes the top of the stack again
    /// after the state above it was removed.
    fn on_enter(&mut self) {}

    /// Updates this state once per frame.
    ///
    /// Default implementation updates the world and keeps the state on the stack.
    ///
    fn update(
        &mut self,
        _context: &mut StateContext,
        delta_time: DeltaTime,
    ) -> StateResult<Transition> {
        self.world_mut().update(delta_time)?;
        Ok(Transition::None)
    }

    /// Multiplier of frame delta passed into [`update`](Self::update).
    fn time_speed(&self) -> f32 {
        1.0
    }

    /// Replaces entities of this state with a deep copy of the entities of `other`.
    fn clone_entity_manager(&mut self, other: &EntityManager) {
        self.world_mut().clone_entity_manager(other)
    }
}

/// Change of the state stack requested by the updated state.
pub enum Transition {
    /// Keep the stack as is.
    None,
    /// Remove the current state, entering the state below it.
    Pop,
    /// Put new state on top of the current one.
    Push(Box<dyn GameState>),
    /// Replace the current state with the new one.
    Replace(Box<dyn GameState>),
    /// Stop the engine.
    Quit,
}

impl Transition {
    /// Shorthand for `Transition::Push(Box::new(state))`.
    pub fn push<T>(state: T) -> Self
    where
        T: GameState,
    {
        Self::Push(Box::new(state))
    }

    /// Shorthand for `Transition::Replace(Box::new(state))`.
    pub fn replace<T>(state: T) -> Self
    where
        T: GameState,
    {
        Self::Replace(Box::new(state))
    }
}

impl fmt::Debug for Transition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Pop => f.write_str("Pop"),
            Self::Push(state) => f.debug_tuple("Push").field(&state.id()).finish(),
            Self::Replace(state) => f.debug_tuple("Replace").field(&state.id()).finish(),
            Self::Quit => f.write_str("Quit"),
        }
    }
}

/// Context of the updated state: gives access to the states below it.
///
/// States below the updated one are never updated by the manager,
/// but the updated state is allowed to read and modify them
/// (for example, pause menu reads the score of the level being played).
///
pub struct StateContext<'a> {
    below: &'a mut [Box<dyn GameState>],
}

impl<'a> StateContext<'a> {
    pub(crate) fn new(below: &'a mut [Box<dyn GameState>]) -> Self {
        Self { below }
    }

    /// Iterator over the states below the updated one, from bottom to top.
    pub fn states(&self) -> impl Iterator<Item = &dyn GameState> {
        self.below.iter().map(|state| state.as_ref())
    }

    /// State right below the updated one.
    pub fn previous(&self) -> Option<&dyn GameState> {
        self.below.last().map(|state| state.as_ref())
    }

    pub fn previous_mut(&mut self) -> Option<&mut dyn GameState> {
        Some(self.below.last_mut()?.as_mut())
    }

    /// Retrieves the nearest state of type `T` below the updated one.
    pub fn find<T>(&self) -> Option<&T>
    where
        T: GameState,
    {
        self.below.iter().rev().find_map(|state| {
            let state: &dyn GameState = state.as_ref();
            state.as_any().downcast_ref()
        })
    }

    /// Retrieves the nearest state of type `T` below the updated one.
    pub fn find_mut<T>(&mut self) -> Option<&mut T>
    where
        T: GameState,
    {
        self.below.iter_mut().rev().find_map(|state| {
            let state: &mut dyn GameState = state.as_mut();
            state.as_any_mut().downcast_mut()
        })
    }

    /// Count of the states below the updated one.
    pub fn len(&self) -> usize {
        self.below.len()
    }

    pub fn is_empty(&self) -> bool {
        self.below.is_empty()
    }
}

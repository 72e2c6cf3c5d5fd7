//! Utilities for *systems* in ECS.

use std::any::{type_name, Any};
use std::time::Duration;

pub use signature::{Dependencies, Signature};

use crate::entity::EntityManager;
use crate::error::SystemResult;

mod signature;

/// Type which represents duration between two frames.
pub type DeltaTime = Duration;

/// Objects of this trait represent *system* of ECS.
///
/// System declares its [dependencies](Dependencies) once on construction
/// and then is updated once per frame by the [world](crate::World)
/// in order of registration.
///
/// # Example
///
/// ```
/// use rampart_ecs::{Component, Dependencies, DeltaTime, EntityManager, System, SystemResult};
///
/// #[derive(Clone)]
/// struct Position(f32);
/// impl Component for Position {}
///
/// #[derive(Clone)]
/// struct Velocity(f32);
/// impl Component for Velocity {}
///
/// struct MovementSystem {
///     dependencies: Dependencies,
/// }
///
/// impl System for MovementSystem {
///     fn dependencies(&self) -> &Dependencies {
///         &self.dependencies
///     }
///
///     fn update(&mut self, manager: &mut EntityManager, delta_time: DeltaTime) -> SystemResult {
///         self.dependencies.for_each_entity(manager, |entity| {
///             let velocity = entity.get_component::<Velocity>().map_or(0.0, |it| it.0);
///             if let Some(position) = entity.get_component_mut::<Position>() {
///                 position.0 += velocity * delta_time.as_secs_f32();
///             }
///         });
///         Ok(())
///     }
/// }
///
/// let system = MovementSystem {
///     dependencies: Dependencies::of::<(Position, Velocity)>(),
/// };
/// assert_eq!(system.dependencies().len(), 2);
/// ```
///
pub trait System: AsAny {
    /// Human readable name of this system.
    fn name(&self) -> &'static str {
        type_name::<Self>()
    }

    /// Component types which entity must have to be handled by this system.
    fn dependencies(&self) -> &Dependencies;

    /// Handles state of the current system.
    ///
    /// Do something useful with entities which match [dependencies](Self::dependencies).
    ///
    fn update(&mut self, manager: &mut EntityManager, delta_time: DeltaTime) -> SystemResult;
}

/// Conversion into [`Any`] used to look up systems by their concrete type.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> AsAny for T
where
    T: Any,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

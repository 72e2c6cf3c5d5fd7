//! Utilities for *components* in ECS.

use std::any::Any;
use std::fmt;

pub use registry::ComponentType;

use crate::error::{EcsError, Result};

mod registry;

/// Objects of this trait represent *component* of ECS.
///
/// Each component is owned by exactly one entity. It can be cloned
/// to produce an independent copy (used when an entity is built from an archetype
/// or when a whole entity manager is duplicated) and updated from another instance
/// of the same type (used when archetype defaults are applied once again).
///
pub trait Component: Any + Clone + Send + Sync {
    /// Overwrites state of this component by state of `other`.
    ///
    /// Default implementation replaces the whole state with a copy of `other`.
    /// Override it to merge only some fields.
    ///
    fn update_from(&mut self, other: &Self) {
        self.clone_from(other)
    }
}

/// Object safe version of [`Component`] trait.
///
/// Implemented for every [`Component`], so any component can be stored
/// as `Box<dyn AnyComponent>` and dispatched by its runtime type.
///
pub trait AnyComponent: Any + Send + Sync {
    /// Runtime type of this component.
    fn component_type(&self) -> ComponentType;

    /// Creates an independent copy of this component.
    fn clone_boxed(&self) -> Box<dyn AnyComponent>;

    /// Overwrites state of this component by state of `other`.
    ///
    /// # Errors
    ///
    /// An error is returned if `other` has another concrete type.
    /// Debug builds panic instead.
    ///
    fn update_from_any(&mut self, other: &dyn AnyComponent) -> Result<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;
}

impl<T> AnyComponent for T
where
    T: Component,
{
    fn component_type(&self) -> ComponentType {
        ComponentType::of::<T>()
    }

    fn clone_boxed(&self) -> Box<dyn AnyComponent> {
        Box::new(self.clone())
    }

    fn update_from_any(&mut self, other: &dyn AnyComponent) -> Result<()> {
        match other.as_any().downcast_ref::<T>() {
            Some(other) => {
                self.update_from(other);
                Ok(())
            }
            None => {
                let expected = ComponentType::of::<T>();
                let found = other.component_type();
                debug_assert!(
                    false,
                    "cannot update component `{}` from component `{}`",
                    expected, found,
                );
                Err(EcsError::ComponentTypeMismatch { expected, found })
            }
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any> {
        self
    }
}

impl Clone for Box<dyn AnyComponent> {
    fn clone(&self) -> Self {
        self.as_ref().clone_boxed()
    }
}

impl fmt::Debug for dyn AnyComponent {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("Component")
            .field(&self.component_type().name())
            .finish()
    }
}

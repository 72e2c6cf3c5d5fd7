//! Utilities for *entities* in ECS.

use std::fmt;
use std::num::NonZeroU32;

pub use manager::EntityManager;
pub use pool::{EntityPool, DEFAULT_ENTITIES_PER_CHUNK};

use crate::component::{AnyComponent, Component, ComponentType};
use crate::error::{EcsError, Result};

mod manager;
mod pool;
mod tests;

/// Unique identifier of the *entity* of ECS.
///
/// Identifiers start from 1: zero is reserved as the null identifier
/// and is never handed out by the [pool](EntityPool).
///
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EntityId(NonZeroU32);

impl EntityId {
    /// Creates identifier from its raw value.
    ///
    /// Returns [`None`] for the null identifier.
    ///
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(raw) => Some(Self(raw)),
            None => None,
        }
    }

    /// Raw value of this identifier.
    pub const fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<EntityId> for u32 {
    fn from(id: EntityId) -> Self {
        id.get()
    }
}

#[derive(Debug, Clone)]
struct ComponentSlot {
    component_type: ComponentType,
    component: Box<dyn AnyComponent>,
}

/// Slot of the [pool](EntityPool) which represents *entity* of ECS.
///
/// Owns an ordered collection of components, at most one per component type.
///
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    free: bool,
    tag: Option<String>,
    archetype: Option<String>,
    components: Vec<ComponentSlot>,
}

impl Entity {
    pub(crate) fn new(id: EntityId) -> Self {
        Self {
            id,
            free: true,
            tag: None,
            archetype: None,
            components: Vec::new(),
        }
    }

    /// Identifier of this entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    pub(crate) fn is_free(&self) -> bool {
        self.free
    }

    pub(crate) fn set_free(&mut self, free: bool) {
        self.free = free;
        if free {
            self.tag = None;
            self.archetype = None;
            self.components.clear();
        }
    }

    /// Tag of this entity used for lookup by name, if any.
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = Some(tag.into());
    }

    pub fn clear_tag(&mut self) {
        self.tag = None;
    }

    /// Name of the archetype this entity was created from, if any.
    pub fn archetype(&self) -> Option<&str> {
        self.archetype.as_deref()
    }

    pub(crate) fn set_archetype(&mut self, archetype: impl Into<String>) {
        self.archetype = Some(archetype.into());
    }

    /// Attaches component to this entity.
    ///
    /// # Errors
    ///
    /// An error is returned if component of type `T` was already attached to this entity.
    /// Use [`replace_component`](Self::replace_component) to overwrite it.
    ///
    pub fn add_component<T>(&mut self, component: T) -> Result<&mut Self>
    where
        T: Component,
    {
        self.add_boxed_component(Box::new(component))
    }

    /// Attaches type erased component to this entity.
    ///
    /// # Errors
    ///
    /// An error is returned if component of the same type was already attached to this entity.
    ///
    pub fn add_boxed_component(&mut self, component: Box<dyn AnyComponent>) -> Result<&mut Self> {
        let component_type = component.component_type();
        if self.has_component(component_type) {
            log::warn!(
                "component `{}` is already attached to entity {}",
                component_type,
                self.id,
            );
            return Err(EcsError::ComponentAlreadyAttached {
                entity: self.id,
                component: component_type,
            });
        }
        self.components.push(ComponentSlot {
            component_type,
            component,
        });
        Ok(self)
    }

    /// Attaches component to this entity, replacing the previous one of the same type.
    ///
    /// Returns previously attached component, if any.
    ///
    pub fn replace_component<T>(&mut self, component: T) -> Option<T>
    where
        T: Component,
    {
        match self.get_component_mut::<T>() {
            Some(attached) => Some(std::mem::replace(attached, component)),
            None => {
                self.components.push(ComponentSlot {
                    component_type: ComponentType::of::<T>(),
                    component: Box::new(component),
                });
                None
            }
        }
    }

    /// Detaches component of type `T` from this entity.
    ///
    /// Returns component that was attached to this entity.
    ///
    pub fn remove_component<T>(&mut self) -> Option<T>
    where
        T: Component,
    {
        let position = self.position(ComponentType::of::<T>())?;
        let slot = self.components.remove(position);
        slot.component.into_any().downcast::<T>().ok().map(|boxed| *boxed)
    }

    /// Retrieves an immutable reference to component of type `T` attached to this entity.
    pub fn get_component<T>(&self) -> Option<&T>
    where
        T: Component,
    {
        self.components
            .iter()
            .find_map(|slot| slot.component.as_any().downcast_ref())
    }

    /// Retrieves a mutable reference to component of type `T` attached to this entity.
    pub fn get_component_mut<T>(&mut self) -> Option<&mut T>
    where
        T: Component,
    {
        self.components
            .iter_mut()
            .find_map(|slot| slot.component.as_any_mut().downcast_mut())
    }

    /// Returns `true` if component of given type is attached to this entity.
    pub fn has_component(&self, component_type: ComponentType) -> bool {
        self.position(component_type).is_some()
    }

    /// Returns `true` if component of type `T` is attached to this entity.
    pub fn has<T>(&self) -> bool
    where
        T: Component,
    {
        self.has_component(ComponentType::of::<T>())
    }

    /// Overwrites attached component of the same type by state of `other`.
    ///
    /// Returns `false` if there is no such component attached to this entity.
    ///
    pub fn update_component_from(&mut self, other: &dyn AnyComponent) -> Result<bool> {
        let position = match self.position(other.component_type()) {
            Some(position) => position,
            None => return Ok(false),
        };
        self.components[position]
            .component
            .update_from_any(other)?;
        Ok(true)
    }

    /// Iterator over all components attached to this entity, in attachment order.
    pub fn components(&self) -> impl Iterator<Item = &dyn AnyComponent> {
        self.components.iter().map(|slot| slot.component.as_ref())
    }

    /// Iterator over types of all components attached to this entity, in attachment order.
    pub fn component_types(&self) -> impl Iterator<Item = ComponentType> + '_ {
        self.components.iter().map(|slot| slot.component_type)
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    fn position(&self, component_type: ComponentType) -> Option<usize> {
        self.components
            .iter()
            .position(|slot| slot.component_type == component_type)
    }
}

impl PartialEq for Entity {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Entity {}

impl PartialEq<EntityId> for Entity {
    fn eq(&self, other: &EntityId) -> bool {
        self.id == *other
    }
}

impl PartialEq<u32> for Entity {
    fn eq(&self, other: &u32) -> bool {
        self.id.get() == *other
    }
}

//! Utilities for signature of *systems* in ECS.

use crate::component::{Component, ComponentType};
use crate::entity::{Entity, EntityId, EntityManager};

/// Signature of the *system* in ECS.
///
/// Describes which component types are required by the system.
///
pub trait Signature {
    /// Array of [`ComponentType`]s which represents set of types in this signature.
    fn component_types() -> Box<[ComponentType]>;
}

impl Signature for () {
    fn component_types() -> Box<[ComponentType]> {
        Box::from([])
    }
}

// Generate implementations of Signature for tuples up to 12 elements.
macro_rules! impl_signature {
    ($($name:ident),*) => {
        impl<$($name),*> Signature for ($($name,)*)
        where
            $($name: Component,)*
        {
            fn component_types() -> Box<[ComponentType]> {
                Box::from([$(ComponentType::of::<$name>()),*])
            }
        }
    };
}

impl_signature!(A);
impl_signature!(A, B);
impl_signature!(A, B, C);
impl_signature!(A, B, C, D);
impl_signature!(A, B, C, D, E);
impl_signature!(A, B, C, D, E, F);
impl_signature!(A, B, C, D, E, F, G);
impl_signature!(A, B, C, D, E, F, G, H);
impl_signature!(A, B, C, D, E, F, G, H, I);
impl_signature!(A, B, C, D, E, F, G, H, I, J);
impl_signature!(A, B, C, D, E, F, G, H, I, J, K);
impl_signature!(A, B, C, D, E, F, G, H, I, J, K, L);

/// Set of component types which entity must have to be handled by the system.
///
/// Empty set matches every entity.
///
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct Dependencies {
    types: Vec<ComponentType>,
}

impl Dependencies {
    /// Empty set of dependencies, usable in constant contexts.
    pub const EMPTY: Self = Self { types: Vec::new() };

    /// Creates an empty set of dependencies.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates set of dependencies from the signature.
    pub fn of<S>() -> Self
    where
        S: Signature,
    {
        let mut dependencies = Self::new();
        for component_type in S::component_types().iter().copied() {
            dependencies.insert(component_type);
        }
        dependencies
    }

    /// Adds component type `T` to this set.
    pub fn with<T>(mut self) -> Self
    where
        T: Component,
    {
        self.add::<T>();
        self
    }

    /// Adds component type `T` to this set.
    pub fn add<T>(&mut self)
    where
        T: Component,
    {
        self.insert(ComponentType::of::<T>())
    }

    /// Adds component type to this set, if not present yet.
    pub fn insert(&mut self, component_type: ComponentType) {
        if !self.types.contains(&component_type) {
            self.types.push(component_type);
        }
    }

    /// Component types of this set, in order of their addition.
    pub fn types(&self) -> &[ComponentType] {
        &self.types
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Returns `true` if entity has all the component types of this set attached.
    pub fn matches(&self, entity: &Entity) -> bool {
        self.types
            .iter()
            .all(|&component_type| entity.has_component(component_type))
    }

    /// Calls `callback` exactly once for each entity which matches this set,
    /// in order of entity manager iteration.
    ///
    /// Entities are filtered against the current state of the manager on each call.
    /// Returns count of visited entities.
    ///
    pub fn for_each_entity<F>(&self, manager: &mut EntityManager, mut callback: F) -> usize
    where
        F: FnMut(&mut Entity),
    {
        let mut count = 0;
        manager.for_each_mut(|entity| {
            if self.matches(entity) {
                count += 1;
                callback(entity);
            }
        });
        count
    }

    /// Immutable version of [`for_each_entity`](Self::for_each_entity).
    pub fn for_each_entity_ref<F>(&self, manager: &EntityManager, mut callback: F) -> usize
    where
        F: FnMut(&Entity),
    {
        let mut count = 0;
        for entity in manager.iter().filter(|entity| self.matches(entity)) {
            count += 1;
            callback(entity);
        }
        count
    }

    /// Identifiers of entities which match this set, in order of entity manager iteration.
    ///
    /// Useful when the system needs access to the whole manager while handling each entity.
    ///
    pub fn matching_entities(&self, manager: &EntityManager) -> Vec<EntityId> {
        manager
            .iter()
            .filter(|entity| self.matches(entity))
            .map(Entity::id)
            .collect()
    }

    /// Count of entities which match this set.
    pub fn count_matching(&self, manager: &EntityManager) -> usize {
        manager.iter().filter(|entity| self.matches(entity)).count()
    }
}

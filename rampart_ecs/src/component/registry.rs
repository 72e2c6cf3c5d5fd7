//! Registry of runtime types of components.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use lazy_static::lazy_static;
use parking_lot::RwLock;

lazy_static! {
    static ref REGISTRY: RwLock<Registry> = RwLock::new(Registry::default());
}

#[derive(Default)]
struct Registry {
    types: HashMap<TypeId, ComponentType>,
}

/// Runtime type identity of the *component* of ECS.
///
/// Each concrete component type gets a small integer index
/// the first time it is seen by the process. Indices are assigned sequentially
/// starting from zero and never change afterwards.
///
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ComponentType {
    index: u32,
    name: &'static str,
}

impl ComponentType {
    /// Returns runtime type of component `T`, registering it if needed.
    pub fn of<T>() -> Self
    where
        T: Any,
    {
        let type_id = TypeId::of::<T>();
        if let Some(component_type) = REGISTRY.read().types.get(&type_id) {
            return *component_type;
        }

        let mut registry = REGISTRY.write();
        let index = registry.types.len() as u32;
        *registry.types.entry(type_id).or_insert_with(|| {
            let name = type_name::<T>();
            log::trace!("registered component type `{}` with index {}", name, index);
            Self { index, name }
        })
    }

    /// Index assigned to this type by the registry.
    pub const fn index(self) -> u32 {
        self.index
    }

    /// Full name of the Rust type of this component.
    pub const fn name(self) -> &'static str {
        self.name
    }

    /// Count of component types registered so far.
    pub fn registered() -> usize {
        REGISTRY.read().types.len()
    }
}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}", self.name, self.index)
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

//! Utilities for *archetypes*: named templates of entities.

use std::collections::HashMap;

use crate::component::{AnyComponent, Component};
use crate::entity::{Entity, EntityManager};
use crate::error::{EcsError, Result};

/// Named template which describes initial set of components for a class of entities.
#[derive(Debug, Clone)]
pub struct Archetype {
    name: String,
    tag: Option<String>,
    components: Vec<Box<dyn AnyComponent>>,
}

impl Archetype {
    /// Creates an archetype without any components.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tag: None,
            components: Vec::new(),
        }
    }

    /// Sets tag which will be assigned to each entity created from this archetype.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Adds prototype component to this archetype.
    pub fn with_component<T>(mut self, component: T) -> Self
    where
        T: Component,
    {
        self.set_component(component);
        self
    }

    /// Adds prototype component to this archetype,
    /// replacing prototype of the same type if any.
    pub fn set_component<T>(&mut self, component: T)
    where
        T: Component,
    {
        let prototype = self
            .components
            .iter_mut()
            .find_map(|prototype| prototype.as_any_mut().downcast_mut::<T>());
        match prototype {
            Some(prototype) => *prototype = component,
            None => self.components.push(Box::new(component)),
        }
    }

    /// Retrieves prototype component of type `T`.
    pub fn get_component<T>(&self) -> Option<&T>
    where
        T: Component,
    {
        self.components
            .iter()
            .find_map(|prototype| prototype.as_any().downcast_ref())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Iterator over prototype components of this archetype.
    pub fn components(&self) -> impl Iterator<Item = &dyn AnyComponent> {
        self.components.iter().map(AsRef::as_ref)
    }

    /// Attaches copies of all prototype components to the entity.
    ///
    /// # Errors
    ///
    /// An error is returned if entity already has some of these components.
    ///
    pub fn instantiate(&self, entity: &mut Entity) -> Result<()> {
        if let Some(tag) = &self.tag {
            entity.set_tag(tag.as_str());
        }
        entity.set_archetype(self.name.as_str());
        for prototype in &self.components {
            entity.add_boxed_component(prototype.clone_boxed())?;
        }
        Ok(())
    }

    /// Applies state of prototype components to the entity.
    ///
    /// Attached components are updated from their prototypes,
    /// missing ones are attached as copies of prototypes.
    ///
    pub fn apply(&self, entity: &mut Entity) -> Result<()> {
        for prototype in &self.components {
            if !entity.update_component_from(prototype.as_ref())? {
                entity.add_boxed_component(prototype.clone_boxed())?;
            }
        }
        Ok(())
    }
}

/// Storage for all archetypes, addressed by name.
#[derive(Debug, Clone, Default)]
pub struct ArchetypeRegistry {
    archetypes: HashMap<String, Archetype>,
}

impl ArchetypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers new archetype.
    ///
    /// # Errors
    ///
    /// An error is returned if archetype with the same name was already registered.
    ///
    pub fn register(&mut self, archetype: Archetype) -> Result<()> {
        if self.archetypes.contains_key(archetype.name()) {
            return Err(EcsError::ArchetypeAlreadyRegistered(archetype.name));
        }
        log::debug!("registered archetype `{}`", archetype.name());
        self.archetypes.insert(archetype.name.clone(), archetype);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Archetype> {
        self.archetypes.get(name)
    }

    /// Retrieves a mutable reference to the archetype, for example to change its defaults.
    ///
    /// Use [`reapply`](Self::reapply) to propagate changes to existing entities.
    ///
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Archetype> {
        self.archetypes.get_mut(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.archetypes.contains_key(name)
    }

    /// Iterator over names of all registered archetypes, in arbitrary order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.archetypes.keys().map(String::as_str)
    }

    /// Creates new entity from the archetype with given name.
    ///
    /// # Errors
    ///
    /// An error is returned if there is no archetype with such name.
    ///
    pub fn create_entity<'a>(
        &self,
        manager: &'a mut EntityManager,
        name: &str,
    ) -> Result<&'a mut Entity> {
        let archetype = self
            .get(name)
            .ok_or_else(|| EcsError::UnknownArchetype(name.to_string()))?;

        let entity = manager.create_entity();
        let id = entity.id();
        if let Err(error) = archetype.instantiate(entity) {
            manager.destroy_entity(id);
            return Err(error);
        }
        manager.get_entity_mut(id).ok_or(EcsError::NoSuchEntity(id))
    }

    /// Applies defaults of the archetype to every entity created from it.
    ///
    /// Returns count of updated entities.
    ///
    /// # Errors
    ///
    /// An error is returned if there is no archetype with such name.
    ///
    pub fn reapply(&self, manager: &mut EntityManager, name: &str) -> Result<usize> {
        let archetype = self
            .get(name)
            .ok_or_else(|| EcsError::UnknownArchetype(name.to_string()))?;

        let mut count = 0;
        let mut result = Ok(());
        manager.for_each_mut(|entity| {
            if result.is_err() || entity.archetype() != Some(name) {
                return;
            }
            result = archetype.apply(entity);
            count += 1;
        });
        result.map(|_| count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Health(u32);

    impl Component for Health {}

    #[derive(Debug, Clone, PartialEq)]
    struct Damage(u32);

    impl Component for Damage {}

    fn registry() -> ArchetypeRegistry {
        let mut registry = ArchetypeRegistry::new();
        registry
            .register(
                Archetype::new("ENEMY")
                    .with_tag("Enemy")
                    .with_component(Health(10))
                    .with_component(Damage(2)),
            )
            .unwrap();
        registry
            .register(Archetype::new("CASTLE").with_component(Health(100)))
            .unwrap();
        registry
    }

    #[test]
    fn test_create_entity() {
        let registry = registry();
        let mut manager = EntityManager::new();

        let entity = registry.create_entity(&mut manager, "ENEMY").unwrap();
        assert_eq!(entity.tag(), Some("Enemy"));
        assert_eq!(entity.archetype(), Some("ENEMY"));
        assert_eq!(entity.get_component::<Health>(), Some(&Health(10)));
        assert_eq!(entity.get_component::<Damage>(), Some(&Damage(2)));

        entity.get_component_mut::<Health>().unwrap().0 = 1;
        let other = registry.create_entity(&mut manager, "ENEMY").unwrap();
        assert_eq!(other.get_component::<Health>(), Some(&Health(10)));
        assert_eq!(manager.len(), 2);
    }

    #[test]
    fn test_unknown_archetype() {
        let registry = registry();
        let mut manager = EntityManager::new();

        let error = registry.create_entity(&mut manager, "DRAGON").unwrap_err();
        assert!(matches!(error, EcsError::UnknownArchetype(name) if name == "DRAGON"));
        assert!(manager.is_empty());
    }

    #[test]
    fn test_register_twice() {
        let mut registry = registry();
        let error = registry.register(Archetype::new("CASTLE")).unwrap_err();
        assert!(matches!(error, EcsError::ArchetypeAlreadyRegistered(_)));

        let mut names: Vec<_> = registry.names().collect();
        names.sort_unstable();
        assert_eq!(names, ["CASTLE", "ENEMY"]);
    }

    #[test]
    fn test_set_component_replaces_prototype() {
        let archetype = Archetype::new("TOWER")
            .with_component(Damage(1))
            .with_component(Damage(5));
        assert_eq!(archetype.components().count(), 1);
        assert_eq!(archetype.get_component::<Damage>(), Some(&Damage(5)));
    }

    #[test]
    fn test_reapply() {
        let mut registry = registry();
        let mut manager = EntityManager::new();
        let enemy = registry.create_entity(&mut manager, "ENEMY").unwrap().id();
        let castle = registry.create_entity(&mut manager, "CASTLE").unwrap().id();
        manager.get_entity_mut(enemy).unwrap().remove_component::<Damage>();

        registry
            .get_mut("ENEMY")
            .unwrap()
            .set_component(Health(20));
        let updated = registry.reapply(&mut manager, "ENEMY").unwrap();
        assert_eq!(updated, 1);

        let enemy = manager.get_entity(enemy).unwrap();
        assert_eq!(enemy.get_component::<Health>(), Some(&Health(20)));
        assert_eq!(enemy.get_component::<Damage>(), Some(&Damage(2)));

        let castle = manager.get_entity(castle).unwrap();
        assert_eq!(castle.get_component::<Health>(), Some(&Health(100)));

        assert!(registry.reapply(&mut manager, "DRAGON").is_err());
    }
}

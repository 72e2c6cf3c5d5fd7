//! Utilities for managing entities of ECS.

use super::{Entity, EntityId, EntityPool, DEFAULT_ENTITIES_PER_CHUNK};

/// Manager of all entities of ECS.
///
/// Owns the [pool](EntityPool) of entities and remembers the order of their creation:
/// iteration always visits live entities in that order.
///
/// Cloning the manager produces a deep copy: every component of every entity is cloned,
/// and identifiers of entities are preserved.
///
#[derive(Debug, Clone, Default)]
pub struct EntityManager {
    pool: EntityPool,
    order: Vec<EntityId>,
}

impl EntityManager {
    /// Creates new manager with default count of entities per chunk.
    pub fn new() -> Self {
        Self::with_chunk_capacity(DEFAULT_ENTITIES_PER_CHUNK)
    }

    /// Creates new manager which allocates entities by chunks of given capacity.
    pub fn with_chunk_capacity(entities_per_chunk: u32) -> Self {
        Self {
            pool: EntityPool::new(entities_per_chunk),
            order: Vec::new(),
        }
    }

    /// Creates new entity without any components.
    pub fn create_entity(&mut self) -> &mut Entity {
        let entity = self.pool.allocate();
        self.order.push(entity.id());
        log::trace!("created entity {}", entity.id());
        entity
    }

    /// Creates new entity with given tag.
    pub fn create_entity_with_tag(&mut self, tag: impl Into<String>) -> &mut Entity {
        let entity = self.create_entity();
        entity.set_tag(tag);
        entity
    }

    /// Destroys entity with given identifier, dropping all of its components.
    ///
    /// Returns `false` if there is no such entity.
    ///
    pub fn destroy_entity(&mut self, id: EntityId) -> bool {
        if !self.pool.free(id) {
            return false;
        }
        self.order.retain(|&other| other != id);
        log::trace!("destroyed entity {}", id);
        true
    }

    /// Destroys all entities of this manager.
    ///
    /// Chunks of the pool are kept, and the next allocations start from the lowest slots again.
    ///
    pub fn clear(&mut self) {
        for id in std::mem::take(&mut self.order).into_iter().rev() {
            self.pool.free(id);
        }
    }

    /// Retrieves an immutable reference to entity with given identifier.
    pub fn get_entity(&self, id: EntityId) -> Option<&Entity> {
        self.pool.get(id)
    }

    /// Retrieves a mutable reference to entity with given identifier.
    pub fn get_entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.pool.get_mut(id)
    }

    /// Retrieves entity by its raw identifier, where zero means null.
    pub fn get_entity_raw(&self, raw: u32) -> Option<&Entity> {
        self.pool.get_raw(raw)
    }

    /// Retrieves the first created entity with given tag.
    pub fn get_entity_by_tag(&self, tag: &str) -> Option<&Entity> {
        self.iter().find(|entity| entity.tag() == Some(tag))
    }

    /// Retrieves the first created entity with given tag.
    pub fn get_entity_by_tag_mut(&mut self, tag: &str) -> Option<&mut Entity> {
        let id = self.get_entity_by_tag(tag)?.id();
        self.pool.get_mut(id)
    }

    /// Iterator over all entities with given tag, in order of their creation.
    pub fn get_entities_by_tag<'a, 'b>(
        &'a self,
        tag: &'b str,
    ) -> impl Iterator<Item = &'a Entity> + 'b
    where
        'a: 'b,
    {
        self.iter().filter(move |entity| entity.tag() == Some(tag))
    }

    /// Iterator over all entities, in order of their creation.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.order.iter().filter_map(move |&id| self.pool.get(id))
    }

    /// Calls `callback` for each entity, in order of their creation.
    pub fn for_each_mut(&mut self, mut callback: impl FnMut(&mut Entity)) {
        let Self { pool, order } = self;
        for &id in order.iter() {
            if let Some(entity) = pool.get_mut(id) {
                callback(entity);
            }
        }
    }

    /// Identifiers of all entities, in order of their creation.
    pub fn ids(&self) -> &[EntityId] {
        &self.order
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.pool.get(id).is_some()
    }

    /// Count of live entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Underlying pool of entities.
    pub fn pool(&self) -> &EntityPool {
        &self.pool
    }
}

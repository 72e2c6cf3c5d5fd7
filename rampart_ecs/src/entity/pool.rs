//! Chunked pool allocator for entities of ECS.

use std::num::NonZeroU32;

use super::{Entity, EntityId};

/// Count of entities in each chunk of the pool created by default.
pub const DEFAULT_ENTITIES_PER_CHUNK: u32 = 64;

/// Fixed-capacity block of entity slots with a free-list of slot indices.
#[derive(Debug, Clone)]
struct Chunk {
    entities: Box<[Entity]>,
    free: Vec<u32>,
}

impl Chunk {
    fn new(index: u32, entities_per_chunk: u32) -> Self {
        let entities = (0..entities_per_chunk)
            .map(|slot| Entity::new(slot_id(index, slot, entities_per_chunk)))
            .collect();
        // Reversed so that the lowest slot is popped first.
        let free = (0..entities_per_chunk).rev().collect();
        Self { entities, free }
    }
}

fn slot_id(chunk: u32, slot: u32, entities_per_chunk: u32) -> EntityId {
    match NonZeroU32::new(chunk * entities_per_chunk + slot + 1) {
        Some(raw) => EntityId(raw),
        None => unreachable!("slot identifier is never zero"),
    }
}

/// Pool of entities which consists of chunks of fixed capacity.
///
/// Entity at slot `i` of chunk `c` always has identifier `c * capacity + i + 1`,
/// so identifier can be translated into its slot without any auxiliary index.
/// Chunks are never released or reordered until the pool itself is dropped:
/// freed slots are reused by subsequent allocations.
///
#[derive(Debug, Clone)]
pub struct EntityPool {
    entities_per_chunk: u32,
    chunks: Vec<Chunk>,
    allocated: usize,
}

impl EntityPool {
    /// Creates an empty pool with given count of entities per chunk.
    ///
    /// # Panics
    ///
    /// Panics if `entities_per_chunk` is zero.
    ///
    pub fn new(entities_per_chunk: u32) -> Self {
        assert!(
            entities_per_chunk > 0,
            "count of entities per chunk must be greater than zero",
        );
        Self {
            entities_per_chunk,
            chunks: Vec::new(),
            allocated: 0,
        }
    }

    /// Allocates an entity from the first chunk which has a free slot.
    ///
    /// If there is no free slot, new chunk is appended to the pool,
    /// so allocation never fails.
    ///
    /// # Panics
    ///
    /// Panics if the identifier space of `u32` is exhausted.
    ///
    pub fn allocate(&mut self) -> &mut Entity {
        let (chunk, slot) = loop {
            let found = self
                .chunks
                .iter_mut()
                .enumerate()
                .find_map(|(index, chunk)| Some((index, chunk.free.pop()?)));
            match found {
                Some(found) => break found,
                None => self.grow(),
            }
        };
        self.allocated += 1;

        let entity = &mut self.chunks[chunk].entities[slot as usize];
        entity.set_free(false);
        entity
    }

    /// Returns entity back to the pool.
    ///
    /// Components of the entity are dropped, but its slot is kept for reuse.
    /// Returns `false` if there is no allocated entity with such identifier.
    ///
    pub fn free(&mut self, id: EntityId) -> bool {
        let (chunk, slot) = match self.locate(id) {
            Some(location) => location,
            None => {
                log::warn!("cannot free entity {}: it was never allocated", id);
                return false;
            }
        };
        let chunk = &mut self.chunks[chunk];
        let entity = &mut chunk.entities[slot];
        if entity.is_free() {
            log::warn!("cannot free entity {}: it is already free", id);
            return false;
        }
        entity.set_free(true);
        chunk.free.push(slot as u32);
        self.allocated -= 1;
        true
    }

    /// Retrieves an immutable reference to allocated entity with given identifier.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        let (chunk, slot) = self.locate(id)?;
        let entity = &self.chunks[chunk].entities[slot];
        (!entity.is_free()).then(|| entity)
    }

    /// Retrieves a mutable reference to allocated entity with given identifier.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        let (chunk, slot) = self.locate(id)?;
        let entity = &mut self.chunks[chunk].entities[slot];
        (!entity.is_free()).then(move || entity)
    }

    /// Same as [`get`](Self::get), but accepts raw identifier where zero means null.
    pub fn get_raw(&self, raw: u32) -> Option<&Entity> {
        self.get(EntityId::new(raw)?)
    }

    /// Iterator over all allocated entities in order of their identifiers.
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.chunks
            .iter()
            .flat_map(|chunk| chunk.entities.iter())
            .filter(|entity| !entity.is_free())
    }

    /// Count of allocated entities.
    pub fn len(&self) -> usize {
        self.allocated
    }

    pub fn is_empty(&self) -> bool {
        self.allocated == 0
    }

    /// Count of chunks allocated so far.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn entities_per_chunk(&self) -> u32 {
        self.entities_per_chunk
    }

    /// Total count of slots, both free and allocated.
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.entities_per_chunk as usize
    }

    /// Count of free slots in chunk with given index.
    pub fn free_in_chunk(&self, chunk: usize) -> Option<usize> {
        self.chunks.get(chunk).map(|chunk| chunk.free.len())
    }

    /// Translates identifier into chunk index and slot index within the chunk.
    fn locate(&self, id: EntityId) -> Option<(usize, usize)> {
        let index = id.get() - 1;
        let chunk = (index / self.entities_per_chunk) as usize;
        let slot = (index % self.entities_per_chunk) as usize;
        (chunk < self.chunks.len()).then(|| (chunk, slot))
    }

    fn grow(&mut self) {
        let index = self.chunks.len() as u32;
        let last = u64::from(index + 1) * u64::from(self.entities_per_chunk);
        assert!(
            last <= u64::from(u32::MAX),
            "identifier space of entities is exhausted",
        );
        log::debug!(
            "allocating entity chunk {} ({} entities per chunk)",
            index,
            self.entities_per_chunk,
        );
        self.chunks.push(Chunk::new(index, self.entities_per_chunk));
    }
}

impl Default for EntityPool {
    fn default() -> Self {
        Self::new(DEFAULT_ENTITIES_PER_CHUNK)
    }
}

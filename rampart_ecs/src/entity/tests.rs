#![cfg(test)]

use std::collections::HashSet;

use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Position(f32, f32);

impl Component for Position {}

#[derive(Debug, Clone, PartialEq)]
struct Gold(u32);

impl Component for Gold {}

fn id(raw: u32) -> EntityId {
    EntityId::new(raw).unwrap()
}

#[test]
fn test_null_id() {
    assert_eq!(EntityId::new(0), None);
    assert_eq!(EntityId::new(7).map(EntityId::get), Some(7));
}

#[test]
fn test_allocation_grows_by_chunk() {
    let mut pool = EntityPool::new(4);
    let ids: Vec<_> = (0..5).map(|_| pool.allocate().id().get()).collect();

    assert_eq!(ids, [1, 2, 3, 4, 5]);
    assert_eq!(pool.chunk_count(), 2);
    assert_eq!(pool.free_in_chunk(0), Some(0));
    assert_eq!(pool.free_in_chunk(1), Some(3));
    assert_eq!(pool.len(), 5);
    assert_eq!(pool.capacity(), 8);
}

#[test]
fn test_free_then_allocate_reuses_slot() {
    let mut pool = EntityPool::new(4);
    for _ in 0..5 {
        pool.allocate();
    }

    assert!(pool.free(id(2)));
    assert!(pool.get(id(2)).is_none());

    let entity = pool.allocate();
    assert_eq!(entity.id(), id(2));
    assert_eq!(pool.chunk_count(), 2);
    assert!(pool.get(id(2)).is_some());
}

#[test]
fn test_handle_permanence() {
    const CAPACITY: u32 = 3;

    let mut pool = EntityPool::new(CAPACITY);
    for _ in 0..10 {
        pool.allocate();
    }
    for raw in [2, 5, 9] {
        pool.free(id(raw));
    }
    for _ in 0..3 {
        pool.allocate();
    }

    for chunk in 0..pool.chunk_count() as u32 {
        for slot in 0..CAPACITY {
            let raw = chunk * CAPACITY + slot + 1;
            if let Some(entity) = pool.get(id(raw)) {
                assert_eq!(entity.id().get(), raw);
            }
        }
    }
}

#[test]
fn test_growth_never_duplicates() {
    let mut pool = EntityPool::new(8);
    let mut live = HashSet::new();
    for _ in 0..20 {
        assert!(live.insert(pool.allocate().id()));
    }
    for raw in (1..=20).step_by(3) {
        assert!(pool.free(id(raw)));
        live.remove(&id(raw));
    }
    for _ in 0..30 {
        assert!(live.insert(pool.allocate().id()));
    }

    assert_eq!(live.len(), pool.len());
    // 20 - 7 + 30 = 43 live entities need 6 chunks of 8.
    assert_eq!(pool.chunk_count(), 6);
    assert!(live.iter().all(|&id| id.get() != 0));
}

#[test]
fn test_invalid_lookups() {
    let mut pool = EntityPool::new(4);
    pool.allocate();

    assert!(pool.get_raw(0).is_none());
    assert!(pool.get_raw(1).is_some());
    assert!(pool.get_raw(2).is_none(), "slot is not allocated yet");
    assert!(pool.get_raw(5).is_none(), "chunk does not exist");

    assert!(!pool.free(id(2)));
    assert!(!pool.free(id(100)));
    assert!(pool.free(id(1)));
    assert!(!pool.free(id(1)), "double free must be rejected");
    assert!(pool.is_empty());
}

#[test]
#[should_panic]
fn test_zero_chunk_capacity() {
    let _pool = EntityPool::new(0);
}

#[test]
fn test_components() {
    let mut manager = EntityManager::with_chunk_capacity(4);
    let entity = manager.create_entity();

    assert!(entity.get_component::<Position>().is_none());
    assert!(!entity.has::<Position>());

    entity.add_component(Position(1.0, 2.0)).unwrap();
    assert_eq!(entity.get_component::<Position>(), Some(&Position(1.0, 2.0)));
    assert!(entity.has_component(ComponentType::of::<Position>()));
    assert!(!entity.has::<Gold>());

    entity.get_component_mut::<Position>().unwrap().0 = 10.0;
    assert_eq!(entity.get_component::<Position>(), Some(&Position(10.0, 2.0)));

    assert_eq!(entity.remove_component::<Position>(), Some(Position(10.0, 2.0)));
    assert_eq!(entity.remove_component::<Position>(), None);
    assert_eq!(entity.component_count(), 0);
}

#[test]
fn test_duplicate_component_rejected() {
    let mut manager = EntityManager::new();
    let entity = manager.create_entity();
    entity
        .add_component(Gold(10))
        .and_then(|entity| entity.add_component(Position(0.0, 0.0)))
        .unwrap();

    let error = entity.add_component(Gold(99)).unwrap_err();
    assert!(matches!(error, EcsError::ComponentAlreadyAttached { .. }));
    assert_eq!(entity.get_component::<Gold>(), Some(&Gold(10)));
    assert_eq!(entity.component_count(), 2);

    assert_eq!(entity.replace_component(Gold(99)), Some(Gold(10)));
    assert_eq!(entity.get_component::<Gold>(), Some(&Gold(99)));
}

#[test]
fn test_entity_equality() {
    let mut manager = EntityManager::new();
    let first = manager.create_entity().clone();
    let second = manager.create_entity().clone();

    assert_eq!(first, first.id());
    assert_eq!(first, 1);
    assert_ne!(first, second);
}

#[test]
fn test_destroy_drops_components() {
    let mut manager = EntityManager::with_chunk_capacity(2);
    let id = manager.create_entity_with_tag("Player").id();
    manager
        .get_entity_mut(id)
        .unwrap()
        .add_component(Gold(5))
        .unwrap();

    assert!(manager.destroy_entity(id));
    assert!(!manager.destroy_entity(id));
    assert!(manager.get_entity(id).is_none());
    assert!(manager.get_entity_by_tag("Player").is_none());

    let entity = manager.create_entity();
    assert_eq!(entity.id(), id);
    assert_eq!(entity.component_count(), 0);
    assert_eq!(entity.tag(), None);
}

#[test]
fn test_tags() {
    let mut manager = EntityManager::new();
    manager.create_entity_with_tag("Enemy");
    let player = manager.create_entity_with_tag("Player").id();
    manager.create_entity();
    manager.create_entity_with_tag("Enemy");

    assert_eq!(manager.get_entity_by_tag("Player").map(Entity::id), Some(player));
    assert!(manager.get_entity_by_tag("Castle").is_none());

    let enemies: Vec<_> = manager
        .get_entities_by_tag("Enemy")
        .map(|entity| entity.id().get())
        .collect();
    assert_eq!(enemies, [1, 4]);

    manager.get_entity_by_tag_mut("Player").unwrap().clear_tag();
    assert!(manager.get_entity_by_tag("Player").is_none());
}

#[test]
fn test_tag_lookup_outlives_tag() {
    let mut manager = EntityManager::new();
    manager.create_entity();
    let castle = manager.create_entity_with_tag("Castle").id();

    let found = {
        let tag = String::from("Castle");
        manager.get_entity_by_tag(&tag)
    };
    assert_eq!(found.map(Entity::id), Some(castle));

    let castles: Vec<&Entity> = {
        let tag = "Castle".to_string();
        manager.get_entities_by_tag(&tag).collect()
    };
    assert_eq!(castles.len(), 1);
}

#[test]
fn test_iteration_order() {
    let mut manager = EntityManager::with_chunk_capacity(4);
    let ids: Vec<_> = (0..4).map(|_| manager.create_entity().id()).collect();
    manager.destroy_entity(ids[1]);
    // Reuses slot of the second entity, but is iterated last.
    let reused = manager.create_entity().id();
    assert_eq!(reused, ids[1]);

    let order: Vec<_> = manager.iter().map(|entity| entity.id().get()).collect();
    assert_eq!(order, [1, 3, 4, 2]);
    assert_eq!(manager.ids(), &[ids[0], ids[2], ids[3], reused]);
    assert_eq!(manager.len(), 4);
}

#[test]
fn test_clone_manager_is_deep() {
    let mut manager = EntityManager::new();
    let id = manager.create_entity_with_tag("Castle").id();
    manager
        .get_entity_mut(id)
        .unwrap()
        .add_component(Gold(100))
        .unwrap();

    let mut copy = manager.clone();
    copy.get_entity_mut(id)
        .unwrap()
        .get_component_mut::<Gold>()
        .unwrap()
        .0 = 0;
    copy.create_entity();

    let original = manager.get_entity(id).unwrap();
    assert_eq!(original.get_component::<Gold>(), Some(&Gold(100)));
    assert_eq!(manager.len(), 1);
    assert_eq!(copy.len(), 2);
    assert_eq!(copy.get_entity_by_tag("Castle").map(Entity::id), Some(id));
}

#[test]
fn test_clear() {
    let mut manager = EntityManager::with_chunk_capacity(2);
    for _ in 0..5 {
        manager.create_entity();
    }
    manager.clear();

    assert!(manager.is_empty());
    assert!(manager.pool().is_empty());
    assert_eq!(manager.pool().chunk_count(), 3);
    assert_eq!(manager.create_entity().id().get(), 1);
}

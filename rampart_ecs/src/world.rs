//! Utilities for storage of ECS.

use std::marker::PhantomData;
use std::time::Instant;

use anymap2::AnyMap;

use crate::entity::EntityManager;
use crate::error::{EcsError, Result};
use crate::monitor::{MonitorKey, SystemMonitor};
use crate::system::{DeltaTime, System};

/// Index of the first registered system of type `T`.
struct SystemIndex<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

struct SystemEntry {
    system: Box<dyn System>,
    key: MonitorKey,
}

/// Storage for entities, components and systems of ECS.
///
/// Systems are updated once per frame in order of their registration.
/// Each system sees every change made by the systems updated before it during the same frame.
///
pub struct World {
    /// Storage for all entities.
    entity_manager: EntityManager,
    /// Systems in order of their registration.
    systems: Vec<SystemEntry>,
    /// Map with types of systems and their indices.
    registry: AnyMap,
    monitor: SystemMonitor,
    monitoring: bool,
}

impl World {
    /// Creates new world with an empty entity manager.
    pub fn new() -> Self {
        Self::with_entity_manager(EntityManager::new())
    }

    /// Creates new world around given entity manager.
    pub fn with_entity_manager(entity_manager: EntityManager) -> Self {
        Self {
            entity_manager,
            systems: Vec::new(),
            registry: AnyMap::new(),
            monitor: SystemMonitor::new(),
            monitoring: cfg!(debug_assertions),
        }
    }

    pub fn entity_manager(&self) -> &EntityManager {
        &self.entity_manager
    }

    pub fn entity_manager_mut(&mut self) -> &mut EntityManager {
        &mut self.entity_manager
    }

    /// Replaces content of the entity manager of this world with a deep copy of `other`.
    pub fn clone_entity_manager(&mut self, other: &EntityManager) {
        self.entity_manager.clone_from(other);
        log::debug!(
            "cloned entity manager with {} entities",
            self.entity_manager.len(),
        );
    }

    /// Registers the system at the end of the update order.
    ///
    /// If system of type `T` was registered earlier,
    /// lookup by type still returns the first one.
    ///
    pub fn add_system<T>(&mut self, system: T) -> &mut Self
    where
        T: System,
    {
        let index = self.systems.len();
        let name = system.name();
        if self.registry.contains::<SystemIndex<T>>() {
            log::warn!("system `{}` was already registered", name);
        } else {
            self.registry.insert(SystemIndex::<T> {
                index,
                _marker: PhantomData,
            });
        }
        let key = self.monitor.register(name);
        self.systems.push(SystemEntry {
            system: Box::new(system),
            key,
        });
        log::debug!("registered system `{}` at position {}", name, index);
        self
    }

    /// Retrieves an immutable reference to the first registered system of type `T`.
    ///
    /// Intended to be used while setting up systems which depend on each other.
    ///
    pub fn get_system<T>(&self) -> Option<&T>
    where
        T: System,
    {
        let index = self.registry.get::<SystemIndex<T>>()?.index;
        let system: &dyn System = self.systems.get(index)?.system.as_ref();
        system.as_any().downcast_ref()
    }

    /// Retrieves a mutable reference to the first registered system of type `T`.
    pub fn get_system_mut<T>(&mut self) -> Option<&mut T>
    where
        T: System,
    {
        let index = self.registry.get::<SystemIndex<T>>()?.index;
        let system: &mut dyn System = self.systems.get_mut(index)?.system.as_mut();
        system.as_any_mut().downcast_mut()
    }

    /// Iterator over all systems in order of their registration.
    pub fn systems(&self) -> impl Iterator<Item = &dyn System> {
        self.systems.iter().map(|entry| entry.system.as_ref())
    }

    pub fn system_count(&self) -> usize {
        self.systems.len()
    }

    /// Updates every system once, in order of their registration.
    ///
    /// # Errors
    ///
    /// An error is returned if some system failed to update.
    /// Systems registered after the failed one are not updated during this frame.
    ///
    pub fn update(&mut self, delta_time: DeltaTime) -> Result<()> {
        let Self {
            entity_manager,
            systems,
            monitor,
            monitoring,
            ..
        } = self;

        for entry in systems.iter_mut() {
            let system = entry.system.as_mut();
            // Entities are counted before the system changes them.
            let entities = if *monitoring {
                system.dependencies().count_matching(entity_manager)
            } else {
                0
            };
            let start = Instant::now();
            if let Err(source) = system.update(entity_manager, delta_time) {
                let name = system.name();
                log::error!("system `{}` failed to update: {}", name, source);
                return Err(EcsError::System { name, source });
            }
            if *monitoring {
                monitor.record(entry.key, start.elapsed(), entities);
            }
        }
        Ok(())
    }

    /// Statistics of all registered systems.
    pub fn monitor(&self) -> &SystemMonitor {
        &self.monitor
    }

    /// Enables or disables recording of system statistics.
    ///
    /// Enabled by default in debug builds.
    ///
    pub fn set_monitoring(&mut self, monitoring: bool) {
        self.monitoring = monitoring;
    }

    pub fn monitoring(&self) -> bool {
        self.monitoring
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::component::Component;
    use crate::error::SystemResult;
    use crate::system::Dependencies;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter(u32);

    impl Component for Counter {}

    type Journal = Arc<Mutex<Vec<&'static str>>>;

    /// Increments every counter and writes its name into the journal.
    struct Increment {
        name: &'static str,
        journal: Journal,
        dependencies: Dependencies,
    }

    impl Increment {
        fn new(name: &'static str, journal: &Journal) -> Self {
            Self {
                name,
                journal: Arc::clone(journal),
                dependencies: Dependencies::of::<(Counter,)>(),
            }
        }
    }

    impl System for Increment {
        fn name(&self) -> &'static str {
            self.name
        }

        fn dependencies(&self) -> &Dependencies {
            &self.dependencies
        }

        fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
            self.journal.lock().unwrap().push(self.name);
            self.dependencies.for_each_entity(manager, |entity| {
                if let Some(counter) = entity.get_component_mut::<Counter>() {
                    counter.0 += 1;
                }
            });
            Ok(())
        }
    }

    /// Remembers counter values seen during the last update.
    #[derive(Default)]
    struct Observer {
        seen: Vec<u32>,
        dependencies: Dependencies,
    }

    impl System for Observer {
        fn dependencies(&self) -> &Dependencies {
            &self.dependencies
        }

        fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
            self.seen = manager
                .iter()
                .filter_map(|entity| entity.get_component::<Counter>())
                .map(|counter| counter.0)
                .collect();
            Ok(())
        }
    }

    /// Doubles every counter.
    struct Double {
        dependencies: Dependencies,
    }

    impl Double {
        fn new() -> Self {
            Self {
                dependencies: Dependencies::of::<(Counter,)>(),
            }
        }
    }

    impl System for Double {
        fn dependencies(&self) -> &Dependencies {
            &self.dependencies
        }

        fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
            self.dependencies.for_each_entity(manager, |entity| {
                if let Some(counter) = entity.get_component_mut::<Counter>() {
                    counter.0 *= 2;
                }
            });
            Ok(())
        }
    }

    /// Destroys every entity with a counter.
    struct Reaper {
        dependencies: Dependencies,
    }

    impl System for Reaper {
        fn dependencies(&self) -> &Dependencies {
            &self.dependencies
        }

        fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
            for id in self.dependencies.matching_entities(manager) {
                manager.destroy_entity(id);
            }
            Ok(())
        }
    }

    struct Failing;

    impl System for Failing {
        fn dependencies(&self) -> &Dependencies {
            static DEPENDENCIES: Dependencies = Dependencies::EMPTY;
            &DEPENDENCIES
        }

        fn update(&mut self, _: &mut EntityManager, _: DeltaTime) -> SystemResult {
            Err("castle is on fire".into())
        }
    }

    fn world_with_counters(count: usize) -> World {
        let mut world = World::new();
        for _ in 0..count {
            world
                .entity_manager_mut()
                .create_entity()
                .add_component(Counter(0))
                .unwrap();
        }
        world
    }

    #[test]
    fn test_update_order() {
        let journal = Journal::default();
        let mut world = world_with_counters(1);
        world
            .add_system(Increment::new("first", &journal))
            .add_system(Increment::new("second", &journal))
            .add_system(Increment::new("third", &journal));

        for _ in 0..3 {
            world.update(DeltaTime::from_millis(16)).unwrap();
        }

        let journal = journal.lock().unwrap();
        assert_eq!(journal.len(), 9);
        for frame in journal.chunks(3) {
            assert_eq!(frame, ["first", "second", "third"]);
        }
    }

    #[test]
    fn test_later_system_sees_changes() {
        let journal = Journal::default();
        let mut world = world_with_counters(2);
        world
            .add_system(Increment::new("increment", &journal))
            .add_system(Observer::default());

        world.update(DeltaTime::ZERO).unwrap();
        assert_eq!(world.get_system::<Observer>().unwrap().seen, [1, 1]);

        world.update(DeltaTime::ZERO).unwrap();
        assert_eq!(world.get_system::<Observer>().unwrap().seen, [2, 2]);
    }

    #[test]
    fn test_get_system() {
        let journal = Journal::default();
        let mut world = World::new();
        assert!(world.get_system::<Increment>().is_none());

        world
            .add_system(Increment::new("first", &journal))
            .add_system(Increment::new("second", &journal));
        assert_eq!(world.system_count(), 2);
        assert_eq!(world.get_system::<Increment>().unwrap().name, "first");
        assert!(world.get_system::<Observer>().is_none());

        world.get_system_mut::<Increment>().unwrap().name = "renamed";
        let names: Vec<_> = world.systems().map(|system| system.name()).collect();
        assert_eq!(names, ["renamed", "second"]);
    }

    #[test]
    fn test_failing_system_stops_frame() {
        let journal = Journal::default();
        let mut world = world_with_counters(1);
        world
            .add_system(Increment::new("before", &journal))
            .add_system(Failing)
            .add_system(Increment::new("after", &journal));

        let error = world.update(DeltaTime::ZERO).unwrap_err();
        match error {
            EcsError::System { name, source } => {
                assert!(name.ends_with("Failing"));
                assert_eq!(source.to_string(), "castle is on fire");
            }
            error => panic!("unexpected error: {}", error),
        }
        assert_eq!(*journal.lock().unwrap(), ["before"]);
    }

    #[test]
    fn test_monitoring() {
        let journal = Journal::default();
        let mut world = world_with_counters(3);
        world.entity_manager_mut().create_entity();
        world.set_monitoring(true);
        world.add_system(Increment::new("increment", &journal));

        world.update(DeltaTime::ZERO).unwrap();
        world.update(DeltaTime::ZERO).unwrap();

        let stats = world.monitor().get_by_name("increment").unwrap();
        assert_eq!(stats.updates(), 2);
        assert_eq!(stats.entities(), 3);
        assert!(stats.last().is_some());

        world.set_monitoring(false);
        world.update(DeltaTime::ZERO).unwrap();
        let stats = world.monitor().get_by_name("increment").unwrap();
        assert_eq!(stats.updates(), 2);
    }

    #[test]
    fn test_monitoring_counts_entities_before_update() {
        let mut world = world_with_counters(3);
        world.set_monitoring(true);
        world.add_system(Reaper {
            dependencies: Dependencies::of::<(Counter,)>(),
        });

        world.update(DeltaTime::ZERO).unwrap();
        assert!(world.entity_manager().is_empty());
        let stats = world.monitor().get_by_name(world.systems().next().unwrap().name());
        assert_eq!(stats.unwrap().entities(), 3);

        world.update(DeltaTime::ZERO).unwrap();
        let stats = world.monitor().iter().next().map(|(_, stats)| stats);
        assert_eq!(stats.unwrap().entities(), 0);
        assert_eq!(stats.unwrap().updates(), 2);
    }

    #[test]
    fn test_same_order_gives_same_state() {
        fn run(order: &[&'static str]) -> Vec<u32> {
            let journal = Journal::default();
            let mut world = World::new();
            for value in [1, 5, 7] {
                world
                    .entity_manager_mut()
                    .create_entity()
                    .add_component(Counter(value))
                    .unwrap();
            }
            for &name in order {
                match name {
                    "double" => world.add_system(Double::new()),
                    _ => world.add_system(Increment::new(name, &journal)),
                };
            }
            world.update(DeltaTime::from_millis(16)).unwrap();
            world
                .entity_manager()
                .iter()
                .filter_map(|entity| entity.get_component::<Counter>())
                .map(|counter| counter.0)
                .collect()
        }

        let order = ["increment", "double", "increment"];
        let first = run(&order);
        let second = run(&order);
        assert_eq!(first, second);
        assert_eq!(first, [5, 13, 17]);

        let reversed = run(&["double", "increment", "increment"]);
        assert_eq!(reversed, [4, 12, 16]);
    }

    #[test]
    fn test_clone_entity_manager() {
        let source = world_with_counters(2);
        let mut world = world_with_counters(5);
        world.clone_entity_manager(source.entity_manager());

        assert_eq!(world.entity_manager().len(), 2);

        let journal = Journal::default();
        world.add_system(Increment::new("increment", &journal));
        world.update(DeltaTime::ZERO).unwrap();

        let counters = |world: &World| -> Vec<u32> {
            world
                .entity_manager()
                .iter()
                .filter_map(|entity| entity.get_component::<Counter>())
                .map(|counter| counter.0)
                .collect()
        };
        assert_eq!(counters(&world), [1, 1]);
        assert_eq!(counters(&source), [0, 0]);
    }
}

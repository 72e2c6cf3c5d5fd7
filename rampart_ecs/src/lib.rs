//! Entity Component System (ECS) runtime for game engine.

pub use archetype::{Archetype, ArchetypeRegistry};
pub use component::{AnyComponent, Component, ComponentType};
pub use entity::{Entity, EntityId, EntityManager, EntityPool, DEFAULT_ENTITIES_PER_CHUNK};
pub use error::{BoxError, EcsError, Result, SystemResult};
pub use monitor::{MonitorKey, SystemMonitor, SystemStats, SAMPLE_COUNT};
pub use system::{AsAny, Dependencies, DeltaTime, Signature, System};
pub use world::World;

mod archetype;
mod component;
mod entity;
mod error;
mod monitor;
mod system;
mod world;

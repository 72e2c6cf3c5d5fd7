//! Systems of the tower defense game, in order of their registration.

use rampart_ecs::{
    ArchetypeRegistry, Dependencies, DeltaTime, EntityId, EntityManager, System, SystemResult,
};

use crate::components::{
    Collider, CollisionState, Enemy, Health, Position, Resolution, Tower, Velocity, Wave,
};

pub const CASTLE_TAG: &str = "Castle";
pub const ENEMY_TAG: &str = "Enemy";

/// Spawns enemies from wave spawners and sends them to the castle.
pub struct WaveSystem {
    dependencies: Dependencies,
    archetypes: ArchetypeRegistry,
    enemy: String,
    spawned: u32,
}

impl WaveSystem {
    /// Creates the system which spawns enemies from the archetype named `enemy`.
    pub fn new(archetypes: ArchetypeRegistry, enemy: impl Into<String>) -> Self {
        Self {
            dependencies: Dependencies::of::<(Wave, Position)>(),
            archetypes,
            enemy: enemy.into(),
            spawned: 0,
        }
    }

    /// Count of enemies spawned so far.
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    fn spawn(&mut self, manager: &mut EntityManager, position: Position) -> SystemResult {
        let target = manager
            .get_entity_by_tag(CASTLE_TAG)
            .and_then(|castle| castle.get_component::<Position>())
            .copied()
            .unwrap_or(position);

        let entity = self.archetypes.create_entity(manager, &self.enemy)?;
        let speed = entity.get_component::<Enemy>().map_or(0.0, |enemy| enemy.speed);
        entity.replace_component(position);
        entity.replace_component(Velocity::towards(&position, &target, speed));

        self.spawned += 1;
        log::debug!("enemy {} spawned at ({}, {})", entity.id(), position.x, position.y);
        Ok(())
    }
}

impl System for WaveSystem {
    fn name(&self) -> &'static str {
        "WaveSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, delta_time: DeltaTime) -> SystemResult {
        let elapsed = delta_time.as_secs_f32();
        let mut spawns = Vec::new();
        self.dependencies.for_each_entity(manager, |entity| {
            let position = entity.get_component::<Position>().copied();
            let wave = entity.get_component_mut::<Wave>();
            if let (Some(position), Some(wave)) = (position, wave) {
                if wave.remaining == 0 {
                    return;
                }
                wave.timer -= elapsed;
                if wave.timer <= 0.0 {
                    wave.timer += wave.interval;
                    wave.remaining -= 1;
                    spawns.push(position);
                }
            }
        });

        for position in spawns {
            self.spawn(manager, position)?;
        }
        Ok(())
    }
}

/// Makes towers shoot the nearest enemy in their range.
pub struct TowerAiSystem {
    dependencies: Dependencies,
    shots: u32,
}

impl TowerAiSystem {
    pub fn new() -> Self {
        Self {
            dependencies: Dependencies::of::<(Tower, Position)>(),
            shots: 0,
        }
    }

    /// Count of shots made by all towers so far.
    pub fn shots(&self) -> u32 {
        self.shots
    }
}

impl Default for TowerAiSystem {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds the nearest living enemy within `range` of `position`.
fn nearest_enemy(manager: &EntityManager, position: &Position, range: f32) -> Option<EntityId> {
    manager
        .get_entities_by_tag(ENEMY_TAG)
        .filter(|enemy| enemy.get_component::<Health>().map_or(false, |health| !health.is_dead()))
        .filter_map(|enemy| {
            let distance = enemy.get_component::<Position>()?.distance(position);
            (distance <= range).then(|| (enemy.id(), distance))
        })
        .min_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(id, _)| id)
}

impl System for TowerAiSystem {
    fn name(&self) -> &'static str {
        "TowerAiSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, delta_time: DeltaTime) -> SystemResult {
        let elapsed = delta_time.as_secs_f32();
        for id in self.dependencies.matching_entities(manager) {
            let (position, tower) = match manager.get_entity(id).and_then(|entity| {
                let position = *entity.get_component::<Position>()?;
                let tower = *entity.get_component::<Tower>()?;
                Some((position, tower))
            }) {
                Some(found) => found,
                None => continue,
            };

            let reload = tower.reload - elapsed;
            let target = if reload <= 0.0 {
                nearest_enemy(manager, &position, tower.range)
            } else {
                None
            };
            if let Some(health) = target
                .and_then(|target| manager.get_entity_mut(target))
                .and_then(|enemy| enemy.get_component_mut::<Health>())
            {
                health.take_damage(tower.damage);
                self.shots += 1;
            }

            if let Some(tower) = manager
                .get_entity_mut(id)
                .and_then(|entity| entity.get_component_mut::<Tower>())
            {
                tower.reload = match target {
                    Some(_) => tower.cooldown,
                    None => reload.max(0.0),
                };
            }
        }
        Ok(())
    }
}

/// Moves entities according to their velocity.
pub struct MovementSystem {
    dependencies: Dependencies,
}

impl MovementSystem {
    pub fn new() -> Self {
        Self {
            dependencies: Dependencies::of::<(Position, Velocity)>(),
        }
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &'static str {
        "MovementSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, delta_time: DeltaTime) -> SystemResult {
        let elapsed = delta_time.as_secs_f32();
        self.dependencies.for_each_entity(manager, |entity| {
            let velocity = entity.get_component::<Velocity>().copied().unwrap_or_default();
            if let Some(position) = entity.get_component_mut::<Position>() {
                position.x += velocity.x * elapsed;
                position.y += velocity.y * elapsed;
            }
        });
        Ok(())
    }
}

/// Detects overlapping colliders and updates collision state of entities which react on them.
pub struct CollisionSystem {
    dependencies: Dependencies,
    colliders: Dependencies,
}

impl CollisionSystem {
    pub fn new() -> Self {
        Self {
            dependencies: Dependencies::of::<(Position, Collider, Resolution)>(),
            colliders: Dependencies::of::<(Position, Collider)>(),
        }
    }
}

impl Default for CollisionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for CollisionSystem {
    fn name(&self) -> &'static str {
        "CollisionSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
        let mut shapes = Vec::new();
        self.colliders.for_each_entity_ref(manager, |entity| {
            let position = entity.get_component::<Position>();
            let collider = entity.get_component::<Collider>();
            if let (Some(&position), Some(&collider)) = (position, collider) {
                shapes.push((entity.id(), position, collider.radius));
            }
        });

        self.dependencies.for_each_entity(manager, |entity| {
            let id = entity.id();
            let hit = shapes
                .iter()
                .find(|(other, ..)| *other == id)
                .and_then(|&(_, position, radius)| {
                    shapes
                        .iter()
                        .find(|(other, other_position, other_radius)| {
                            *other != id
                                && position.distance(other_position) <= radius + other_radius
                        })
                        .map(|&(other, ..)| other)
                });
            if let Some(resolution) = entity.get_component_mut::<Resolution>() {
                update_collision(resolution, hit);
            }
        });
        Ok(())
    }
}

fn update_collision(resolution: &mut Resolution, hit: Option<EntityId>) {
    match (hit, resolution.state) {
        (Some(other), CollisionState::None | CollisionState::Exiting) => {
            resolution.state = CollisionState::Entering;
            resolution.other = Some(other);
        }
        (Some(other), CollisionState::Entering | CollisionState::Colliding)
            if resolution.other != Some(other) =>
        {
            resolution.state = CollisionState::Entering;
            resolution.other = Some(other);
        }
        (None, CollisionState::Entering | CollisionState::Colliding) => {
            resolution.state = CollisionState::Exiting;
        }
        _ => {}
    }
}

/// Reacts on collisions detected by the [`CollisionSystem`]:
/// enemies which reach the castle damage it and die.
pub struct ResolutionSystem {
    dependencies: Dependencies,
}

impl ResolutionSystem {
    pub fn new() -> Self {
        Self {
            dependencies: Dependencies::of::<(Resolution,)>(),
        }
    }

    fn on_collision_enter(manager: &mut EntityManager, id: EntityId, other: EntityId) {
        let damage = match manager.get_entity_mut(other) {
            Some(enemy) if enemy.tag() == Some(ENEMY_TAG) => {
                let damage = enemy.get_component::<Enemy>().map_or(0, |enemy| enemy.damage);
                if let Some(health) = enemy.get_component_mut::<Health>() {
                    health.current = 0;
                }
                damage
            }
            _ => return,
        };
        if let Some(health) = manager
            .get_entity_mut(id)
            .and_then(|entity| entity.get_component_mut::<Health>())
        {
            health.take_damage(damage);
            log::info!(
                "entity {} was hit by enemy {}: health {}/{}",
                id,
                other,
                health.current,
                health.max,
            );
        }
    }
}

impl Default for ResolutionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ResolutionSystem {
    fn name(&self) -> &'static str {
        "ResolutionSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
        for id in self.dependencies.matching_entities(manager) {
            let resolution = match manager
                .get_entity_mut(id)
                .and_then(|entity| entity.get_component_mut::<Resolution>())
            {
                Some(resolution) => resolution,
                None => continue,
            };
            match (resolution.state, resolution.other) {
                (CollisionState::Entering, Some(other)) => {
                    resolution.state = CollisionState::Colliding;
                    Self::on_collision_enter(manager, id, other);
                }
                (CollisionState::Exiting, _) => {
                    resolution.state = CollisionState::None;
                    resolution.other = None;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

/// Destroys entities which have no health left.
pub struct HealthSystem {
    dependencies: Dependencies,
    killed: u32,
}

impl HealthSystem {
    pub fn new() -> Self {
        Self {
            dependencies: Dependencies::of::<(Health,)>(),
            killed: 0,
        }
    }

    /// Count of entities destroyed so far.
    pub fn killed(&self) -> u32 {
        self.killed
    }
}

impl Default for HealthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for HealthSystem {
    fn name(&self) -> &'static str {
        "HealthSystem"
    }

    fn dependencies(&self) -> &Dependencies {
        &self.dependencies
    }

    fn update(&mut self, manager: &mut EntityManager, _: DeltaTime) -> SystemResult {
        let mut dead = Vec::new();
        self.dependencies.for_each_entity_ref(manager, |entity| {
            if entity.get_component::<Health>().map_or(false, Health::is_dead) {
                dead.push(entity.id());
            }
        });
        for id in dead {
            if manager.destroy_entity(id) {
                log::debug!("entity {} was destroyed", id);
                self.killed += 1;
            }
        }
        Ok(())
    }
}

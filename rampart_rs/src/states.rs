//! Game states of the tower defense game.

use rampart_core::{
    config::Config,
    state::{GameState, StateContext, StateResult, Transition},
    DeltaTime,
};
use rampart_ecs::{Archetype, ArchetypeRegistry, EcsError, EntityId, World};

use crate::components::{
    Collider, Enemy, Health, Position, Resolution, Tile, Tower, Velocity, Wave,
};
use crate::systems::{
    CollisionSystem, HealthSystem, MovementSystem, ResolutionSystem, TowerAiSystem, WaveSystem,
    CASTLE_TAG, ENEMY_TAG,
};

pub const TILE: &str = "TILE";
pub const CASTLE: &str = "CASTLE";
pub const TOWER: &str = "TOWER";
pub const ENEMY: &str = "ENEMY";
pub const WAVE_SPAWNER: &str = "WAVE_SPAWNER";

const MAP_WIDTH: u32 = 12;
const MAP_HEIGHT: u32 = 5;

const TOWER_STATS: Tower = Tower {
    range: 2.5,
    damage: 10,
    cooldown: 1.0,
    reload: 0.0,
};

/// Registers archetypes of all entities of the game.
pub fn archetypes() -> Result<ArchetypeRegistry, EcsError> {
    let mut registry = ArchetypeRegistry::new();
    registry.register(
        Archetype::new(TILE)
            .with_component(Tile)
            .with_component(Position::default()),
    )?;
    registry.register(
        Archetype::new(CASTLE)
            .with_tag(CASTLE_TAG)
            .with_component(Position::default())
            .with_component(Health::new(100))
            .with_component(Collider { radius: 0.5 })
            .with_component(Resolution::default()),
    )?;
    registry.register(
        Archetype::new(TOWER)
            .with_component(Position::default())
            .with_component(TOWER_STATS),
    )?;
    registry.register(
        Archetype::new(ENEMY)
            .with_tag(ENEMY_TAG)
            .with_component(Position::default())
            .with_component(Velocity::default())
            .with_component(Health::new(30))
            .with_component(Collider { radius: 0.4 })
            .with_component(Enemy {
                speed: 1.5,
                damage: 20,
            }),
    )?;
    registry.register(
        Archetype::new(WAVE_SPAWNER)
            .with_component(Position::default())
            .with_component(Wave {
                remaining: 5,
                interval: 2.0,
                timer: 0.0,
            }),
    )?;
    Ok(registry)
}

/// Level being played: the map with castle, towers and enemy waves.
pub struct PlayState {
    world: World,
    archetypes: ArchetypeRegistry,
    castle: Option<EntityId>,
    elapsed: DeltaTime,
    pause_at: Option<DeltaTime>,
    pause_duration: DeltaTime,
}

impl PlayState {
    pub fn new(config: &Config) -> Result<Self, EcsError> {
        Ok(Self {
            world: config.create_world(),
            archetypes: archetypes()?,
            castle: None,
            elapsed: DeltaTime::ZERO,
            pause_at: None,
            pause_duration: DeltaTime::from_secs(1),
        })
    }

    /// Pauses the game once after given time of the play.
    pub fn with_pause(mut self, at: DeltaTime, duration: DeltaTime) -> Self {
        self.pause_at = Some(at);
        self.pause_duration = duration;
        self
    }

    /// Current health of the castle, if it still stands.
    pub fn castle_health(&self) -> Option<i32> {
        let castle = self.world.entity_manager().get_entity(self.castle?)?;
        castle.get_component::<Health>().map(|health| health.current)
    }

    /// Time played so far.
    pub fn elapsed(&self) -> DeltaTime {
        self.elapsed
    }

    pub fn enemies_left(&self) -> usize {
        self.world.entity_manager().get_entities_by_tag(ENEMY_TAG).count()
    }

    fn waves_left(&self) -> u32 {
        self.world
            .entity_manager()
            .iter()
            .filter_map(|entity| entity.get_component::<Wave>())
            .map(|wave| wave.remaining)
            .sum()
    }

    fn create(&mut self, archetype: &str, position: Position) -> Result<EntityId, EcsError> {
        let manager = self.world.entity_manager_mut();
        let entity = self.archetypes.create_entity(manager, archetype)?;
        entity.replace_component(position);
        Ok(entity.id())
    }

    /// Makes towers stronger, applying new defaults to towers already built.
    fn upgrade_towers(&mut self) -> Result<usize, EcsError> {
        let tower = self
            .archetypes
            .get_mut(TOWER)
            .ok_or_else(|| EcsError::UnknownArchetype(TOWER.to_string()))?;
        let mut stats = tower.get_component::<Tower>().copied().unwrap_or(TOWER_STATS);
        stats.damage += 5;
        stats.range += 0.5;
        tower.set_component(stats);

        self.archetypes
            .reapply(self.world.entity_manager_mut(), TOWER)
    }
}

impl GameState for PlayState {
    fn id(&self) -> &'static str {
        "PlayState"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn setup_systems(&mut self) -> StateResult {
        if !self.archetypes.contains(ENEMY) {
            return Err(EcsError::UnknownArchetype(ENEMY.to_string()).into());
        }

        self.world
            .add_system(WaveSystem::new(self.archetypes.clone(), ENEMY))
            .add_system(TowerAiSystem::new())
            .add_system(MovementSystem::new())
            .add_system(CollisionSystem::new())
            .add_system(ResolutionSystem::new())
            .add_system(HealthSystem::new());
        Ok(())
    }

    fn init(&mut self) -> StateResult {
        for y in 0..MAP_HEIGHT {
            for x in 0..MAP_WIDTH {
                self.create(TILE, Position::new(x as f32 + 0.5, y as f32 + 0.5))?;
            }
        }
        for y in [1.5, 3.5] {
            self.create(WAVE_SPAWNER, Position::new(0.5, y))?;
        }
        for (x, y) in [(5.5, 1.5), (6.5, 3.5)] {
            self.create(TOWER, Position::new(x, y))?;
        }
        self.create(CASTLE, Position::new(MAP_WIDTH as f32 - 0.5, 2.5))?;

        let castle = self
            .world
            .entity_manager()
            .get_entity_by_tag(CASTLE_TAG)
            .map(|castle| castle.id());
        if castle.is_none() {
            return Err("there is no castle on the map".into());
        }
        self.castle = castle;

        log::info!(
            "map {}x{} is built with {} entities",
            MAP_WIDTH,
            MAP_HEIGHT,
            self.world.entity_manager().len(),
        );
        Ok(())
    }

    fn on_enter(&mut self) {
        match self.upgrade_towers() {
            Ok(count) => log::info!("game resumed, {} towers upgraded", count),
            Err(error) => log::warn!("game resumed, but towers were not upgraded: {}", error),
        }
    }

    fn update(&mut self, _: &mut StateContext, delta_time: DeltaTime) -> StateResult<Transition> {
        self.world.update(delta_time)?;
        self.elapsed += delta_time;

        let health = match self.castle_health() {
            Some(health) => health,
            None => {
                log::info!("castle has fallen after {:?}", self.elapsed);
                return Ok(Transition::Quit);
            }
        };
        if self.waves_left() == 0 && self.enemies_left() == 0 {
            log::info!(
                "all waves are defeated after {:?}, castle health is {}",
                self.elapsed,
                health,
            );
            return Ok(Transition::Quit);
        }

        if let Some(pause_at) = self.pause_at {
            if self.elapsed >= pause_at {
                self.pause_at = None;
                return Ok(Transition::push(PauseState::new(self.pause_duration)));
            }
        }
        Ok(Transition::None)
    }
}

/// Pause overlay: keeps a snapshot of the level and resumes it after a while.
pub struct PauseState {
    world: World,
    remaining: DeltaTime,
    castle_health: Option<i32>,
}

impl PauseState {
    pub fn new(duration: DeltaTime) -> Self {
        Self {
            world: World::new(),
            remaining: duration,
            castle_health: None,
        }
    }
}

impl GameState for PauseState {
    fn id(&self) -> &'static str {
        "PauseState"
    }

    fn world(&self) -> &World {
        &self.world
    }

    fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    fn setup_systems(&mut self) -> StateResult {
        Ok(())
    }

    fn init(&mut self) -> StateResult {
        Ok(())
    }

    fn update(
        &mut self,
        context: &mut StateContext,
        delta_time: DeltaTime,
    ) -> StateResult<Transition> {
        if self.world.entity_manager().is_empty() {
            if let Some(play) = context.find::<PlayState>() {
                self.castle_health = play.castle_health();
                self.clone_entity_manager(play.world().entity_manager());
                log::info!(
                    "game paused with {} entities, castle health is {:?}",
                    self.world.entity_manager().len(),
                    self.castle_health,
                );
            }
        }

        self.remaining = self.remaining.saturating_sub(delta_time);
        if self.remaining.is_zero() {
            return Ok(Transition::Pop);
        }
        Ok(Transition::None)
    }
}

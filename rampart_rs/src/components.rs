//! Components of the tower defense game.

use rampart_ecs::{Component, EntityId};

/// Position of the entity on the map, in tiles.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

impl Component for Position {}

/// Velocity of the entity, in tiles per second.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
}

impl Velocity {
    /// Velocity directed from `from` to `to` with given speed.
    pub fn towards(from: &Position, to: &Position, speed: f32) -> Self {
        let distance = from.distance(to);
        if distance <= f32::EPSILON {
            return Self::default();
        }
        Self {
            x: (to.x - from.x) / distance * speed,
            y: (to.y - from.y) / distance * speed,
        }
    }
}

impl Component for Velocity {}

/// Marker of the map tile.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Tile;

impl Component for Tile {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub const fn new(max: i32) -> Self {
        Self { current: max, max }
    }

    pub fn is_dead(&self) -> bool {
        self.current <= 0
    }

    pub fn take_damage(&mut self, damage: i32) {
        self.current = (self.current - damage).max(0);
    }
}

impl Component for Health {
    /// Takes maximum health from `other`, keeping the damage already taken.
    fn update_from(&mut self, other: &Self) {
        let damage = self.max - self.current;
        self.max = other.max;
        self.current = (self.max - damage).max(0);
    }
}

/// Enemy which walks to the castle and damages it on collision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Enemy {
    pub speed: f32,
    pub damage: i32,
}

impl Component for Enemy {}

/// Tower which shoots the nearest enemy in its range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tower {
    pub range: f32,
    pub damage: i32,
    /// Seconds between two shots.
    pub cooldown: f32,
    /// Seconds left before the next shot.
    pub reload: f32,
}

impl Component for Tower {
    /// Upgrades characteristics of the tower, keeping its reload progress.
    fn update_from(&mut self, other: &Self) {
        self.range = other.range;
        self.damage = other.damage;
        self.cooldown = other.cooldown;
        self.reload = self.reload.min(self.cooldown);
    }
}

/// Spawner of enemy waves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wave {
    /// Count of enemies left to spawn.
    pub remaining: u32,
    /// Seconds between two spawns.
    pub interval: f32,
    /// Seconds left before the next spawn.
    pub timer: f32,
}

impl Component for Wave {}

/// Collision shape of the entity: a circle around its position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub radius: f32,
}

impl Component for Collider {}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum CollisionState {
    #[default]
    None,
    Entering,
    Colliding,
    Exiting,
}

/// Collision state of the entity which reacts on collisions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Resolution {
    pub state: CollisionState,
    /// Entity this one collides with.
    pub other: Option<EntityId>,
}

impl Component for Resolution {}

//! Physics domain: the backend contract the movement core queries.
//!
//! The core never owns a rigid-body engine. Everything it needs from one goes
//! through [`PhysicsBackend`] (scene queries, effector lookup, collision
//! toggling) and [`CharacterBody`] (the character's own body).

mod aabb;
mod effectors;


pub use aabb::{AabbBody, AabbWorld, SimBody, SweptBody};
pub use effectors::{
    AirEffector, AirEffectorType, Capability, EffectorSet, GroundEffector, GroundType, JumpPad,
    PlatformMotion, WallEffector, WallType, WaterVolume,
};

use bevy::prelude::*;

/// Collision layer bits shared by the core defaults and the ECS host.
pub mod layers {
    pub const DEFAULT: u32 = 1 << 0;
    pub const GROUND: u32 = 1 << 1;
    pub const WALL: u32 = 1 << 2;
    pub const PLAYER: u32 = 1 << 3;
    pub const WATER: u32 = 1 << 4;
    pub const AIR_ZONE: u32 = 1 << 5;

    /// Everything a character can stand on or run into.
    pub const SOLID: u32 = DEFAULT | GROUND | WALL;
    /// Volumes the character enters rather than collides with.
    pub const TRIGGERS: u32 = WATER | AIR_ZONE;
}

/// Opaque reference to a body known to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyHandle(pub u64);

impl From<Entity> for BodyHandle {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Shape swept or overlapped by a query. Capsules are vertical.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CastShape {
    Capsule { size: Vec2 },
    Box { size: Vec2 },
}

impl CastShape {
    pub fn size(&self) -> Vec2 {
        match *self {
            CastShape::Capsule { size } | CastShape::Box { size } => size,
        }
    }
}

/// The character's collision volume relative to its body position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterCollider {
    pub size: Vec2,
    pub offset: Vec2,
}

impl CharacterCollider {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            offset: Vec2::ZERO,
        }
    }

    pub fn center(&self, position: Vec2) -> Vec2 {
        position + self.offset
    }

    pub fn shape(&self) -> CastShape {
        CastShape::Capsule { size: self.size }
    }
}

impl Default for CharacterCollider {
    fn default() -> Self {
        Self::new(Vec2::new(1.0, 2.0))
    }
}

/// Which bodies a query may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryFilter {
    pub mask: u32,
    pub exclude: Option<BodyHandle>,
}

impl QueryFilter {
    pub fn from_mask(mask: u32) -> Self {
        Self {
            mask,
            exclude: None,
        }
    }

    pub fn excluding(mut self, body: BodyHandle) -> Self {
        self.exclude = Some(body);
        self
    }
}

/// Result of a shape or ray cast.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CastHit {
    pub body: BodyHandle,
    pub distance: f32,
    /// Outward surface normal of the hit body.
    pub normal: Vec2,
}

/// Scene queries and body-level switches exposed by a physics engine.
pub trait PhysicsBackend {
    fn cast_shape(
        &self,
        shape: CastShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit>;

    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit>;

    /// Bodies whose volume intersects `shape` placed at `origin`.
    fn overlapping(&self, shape: CastShape, origin: Vec2, filter: &QueryFilter)
    -> Vec<BodyHandle>;

    /// Bodies whose volume contains `point`.
    fn containing_point(&self, point: Vec2, filter: &QueryFilter) -> Vec<BodyHandle>;

    /// All effector data attached to a body. Unknown bodies have none.
    fn effectors(&self, body: BodyHandle) -> EffectorSet;

    /// Typed capability lookup on a contacted body.
    fn capability<C: Capability>(&self, body: BodyHandle) -> Option<C> {
        C::select(&self.effectors(body))
    }

    /// Enable or disable collision for a body (one-way pass-through, air
    /// effector deactivation). Disabled bodies are invisible to queries.
    fn set_collision_enabled(&mut self, body: BodyHandle, enabled: bool);

    /// Ask a collapsable platform to begin its collapse sequence.
    fn signal_collapse(&mut self, body: BodyHandle);
}

/// The character's own body as seen by the position integrator.
pub trait CharacterBody {
    fn position(&self) -> Vec2;
    /// Kinematic move to `target`; the backend resolves collisions on the way.
    fn move_position(&mut self, target: Vec2);
    /// Place the body at `position` without sweeping. Used for teleports.
    fn set_position(&mut self, position: Vec2);
    fn velocity(&self) -> Vec2;
    fn set_velocity(&mut self, velocity: Vec2);
    /// Accumulate a force for the backend to integrate.
    fn add_force(&mut self, force: Vec2);
}

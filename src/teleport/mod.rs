//! Teleport domain: aimed relocation onto ground below a target point.
//!
//! A [`TeleportTarget`] looks down from its aim point for ground. When it
//! finds some, it checks that the character's collider would fit standing
//! just above it. [`crate::character::Character::teleport`] only moves the
//! body when the last evaluation found a clear landing.


use bevy::prelude::*;

use crate::physics::{CharacterCollider, PhysicsBackend, QueryFilter};

/// How far below the aim point ground is searched for.
pub const GROUND_SEARCH_DISTANCE: f32 = 2.0;
/// Gap left between the ground and the collider's feet on landing.
pub const LANDING_CLEARANCE: f32 = 0.2;

/// What the last evaluation found under the aim point.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub enum LandingStatus {
    #[default]
    NoGround,
    /// Ground was found but the collider would overlap something there.
    Blocked { center: Vec2 },
    Clear { center: Vec2 },
}

#[derive(Component, Debug, Clone, PartialEq, Default, Reflect)]
pub struct TeleportTarget {
    pub aim: Vec2,
    /// Aiming in progress. Hosts show an indicator while this is set.
    pub active: bool,
    status: LandingStatus,
}

impl TeleportTarget {
    pub fn new(aim: Vec2) -> Self {
        Self {
            aim,
            active: false,
            status: LandingStatus::NoGround,
        }
    }

    pub fn status(&self) -> LandingStatus {
        self.status
    }

    pub fn can_teleport(&self) -> bool {
        matches!(self.status, LandingStatus::Clear { .. })
    }

    /// Collider centre the character would land at, when the spot is clear.
    pub fn landing(&self) -> Option<Vec2> {
        match self.status {
            LandingStatus::Clear { center } => Some(center),
            _ => None,
        }
    }

    /// Re-check the landing spot for `collider` against bodies in `filter`.
    pub fn evaluate<B: PhysicsBackend>(
        &mut self,
        backend: &B,
        collider: &CharacterCollider,
        filter: &QueryFilter,
    ) -> LandingStatus {
        self.status = match backend.cast_ray(self.aim, Dir2::NEG_Y, GROUND_SEARCH_DISTANCE, filter)
        {
            None => LandingStatus::NoGround,
            Some(hit) => {
                let ground = self.aim.y - hit.distance;
                let center = Vec2::new(
                    self.aim.x,
                    ground + collider.size.y * 0.5 + LANDING_CLEARANCE,
                );
                if backend
                    .overlapping(collider.shape(), center, filter)
                    .is_empty()
                {
                    LandingStatus::Clear { center }
                } else {
                    LandingStatus::Blocked { center }
                }
            }
        };
        self.status
    }
}

//! Probe domain: per-tick contact detection around the character.
//!
//! [`ContactProbe::probe`] rebuilds a [`ContactSnapshot`] from scratch every
//! tick. Only the two edge flags look at the previous tick.


use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::{
    AirEffector, AirEffectorType, BodyHandle, CharacterCollider, GroundEffector, GroundType,
    JumpPad, PhysicsBackend, PlatformMotion, QueryFilter, WallEffector, WallType, WaterVolume,
    layers,
};

/// How long ground detection stays off after a jump.
pub const GROUND_CHECK_SUPPRESSION: f32 = 0.1;
/// Wall rays sit this fraction of the collider height above and below centre.
const WALL_RAY_SPREAD: f32 = 0.35;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProbeSettings {
    /// Steeper ground than this (degrees) does not support the character.
    pub slope_angle_limit: f32,
    pub raycast_distance: f32,
    pub solid_mask: u32,
    pub trigger_mask: u32,
}

impl Default for ProbeSettings {
    fn default() -> Self {
        Self {
            slope_angle_limit: 45.0,
            raycast_distance: 0.2,
            solid_mask: layers::SOLID,
            trigger_mask: layers::TRIGGERS,
        }
    }
}

/// The air effector volume the character is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirEffectorContact {
    pub body: BodyHandle,
    pub kind: AirEffectorType,
    pub speed: f32,
    pub direction: Vec2,
}

/// Read-only contact state for one tick.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContactSnapshot {
    pub below: bool,
    pub left: bool,
    pub right: bool,
    pub above: bool,
    pub ground_type: GroundType,
    pub left_wall_type: WallType,
    pub right_wall_type: WallType,
    pub ceiling_type: GroundType,
    /// Signed angle from the ground normal to up, in degrees.
    pub slope_angle: f32,
    pub jump_pad: Option<JumpPad>,
    pub left_wall_effector: Option<WallEffector>,
    pub right_wall_effector: Option<WallEffector>,
    pub hit_ground_this_frame: bool,
    pub hit_wall_this_frame: bool,
    pub is_submerged: bool,
    pub is_in_water: bool,
    pub air_effector: Option<AirEffectorContact>,
    /// Platform the character is coupled to, if any.
    pub ground_body: Option<BodyHandle>,
    pub ground_check_suppressed: bool,
}

impl ContactSnapshot {
    pub fn touching_wall(&self) -> bool {
        self.left || self.right
    }

    pub fn air_effector_type(&self) -> AirEffectorType {
        self.air_effector
            .map(|contact| contact.kind)
            .unwrap_or_default()
    }

    pub fn is_in_air_effector(&self) -> bool {
        self.air_effector.is_some()
    }

    /// A touched wall whose effector forbids running. Left is checked first.
    pub fn wall_forbids_run(&self) -> bool {
        if self.left && self.left_wall_effector.is_some_and(|e| !e.runnable) {
            return true;
        }
        self.right && self.right_wall_effector.is_some_and(|e| !e.runnable)
    }

    /// A touched wall whose effector forbids jumping off it.
    pub fn wall_forbids_jump(&self) -> bool {
        if self.left && self.left_wall_effector.is_some_and(|e| !e.jumpable) {
            return true;
        }
        self.right && self.right_wall_effector.is_some_and(|e| !e.jumpable)
    }

    /// Gravity fraction while sliding: the touched wall's own modifier, or
    /// `default` when the wall carries no effector.
    pub fn slide_modifier(&self, default: f32) -> f32 {
        match (self.left, self.left_wall_effector, self.right, self.right_wall_effector) {
            (true, Some(effector), _, _) => effector.slide_amount,
            (_, _, true, Some(effector)) => effector.slide_amount,
            _ => default,
        }
    }
}

/// Owns the snapshot plus the little state probing needs between ticks.
#[derive(Debug, Clone, Default)]
pub struct ContactProbe {
    pub settings: ProbeSettings,
    snapshot: ContactSnapshot,
    ground_check_timer: f32,
    platform: Option<BodyHandle>,
}

impl ContactProbe {
    pub fn new(settings: ProbeSettings) -> Self {
        Self {
            settings,
            ..default()
        }
    }

    pub fn snapshot(&self) -> &ContactSnapshot {
        &self.snapshot
    }

    pub fn ground_check_disabled(&self) -> bool {
        self.ground_check_timer > 0.0
    }

    /// Drop ground support now and skip ground detection for a short window.
    pub fn disable_ground_check(&mut self) {
        self.snapshot.below = false;
        self.snapshot.ground_check_suppressed = true;
        self.ground_check_timer = GROUND_CHECK_SUPPRESSION;
    }

    pub fn clear_platform_coupling(&mut self) {
        self.platform = None;
        self.snapshot.ground_body = None;
    }

    /// Position delta of the coupled platform for this tick.
    pub fn platform_velocity<B: PhysicsBackend>(&self, backend: &B) -> Vec2 {
        match (self.platform, self.snapshot.ground_type) {
            (Some(body), GroundType::MovingPlatform | GroundType::CollapsablePlatform) => backend
                .capability::<PlatformMotion>(body)
                .map(|motion| motion.difference)
                .unwrap_or(Vec2::ZERO),
            _ => Vec2::ZERO,
        }
    }

    /// Re-evaluate every contact at the body's current position.
    pub fn probe<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        position: Vec2,
        collider: &CharacterCollider,
        this_body: Option<BodyHandle>,
        dt: f32,
    ) -> &ContactSnapshot {
        let previous = std::mem::take(&mut self.snapshot);
        let in_air_last_frame = !previous.below;
        let no_side_contact_last_frame = !previous.left && !previous.right;

        let mut solid = QueryFilter::from_mask(self.settings.solid_mask);
        let mut triggers = QueryFilter::from_mask(self.settings.trigger_mask);
        if let Some(body) = this_body {
            solid = solid.excluding(body);
            triggers = triggers.excluding(body);
        }

        let mut snapshot = ContactSnapshot::default();

        if self.ground_check_timer > 0.0 {
            self.ground_check_timer -= dt;
            snapshot.ground_check_suppressed = true;
        } else {
            self.check_ground(backend, position, collider, &solid, &mut snapshot);
        }
        snapshot.ground_body = self.platform;

        self.check_walls(backend, position, collider, &solid, &mut snapshot);
        self.check_ceiling(backend, position, collider, &solid, &mut snapshot);
        self.check_volumes(backend, position, collider, &triggers, &mut snapshot);

        snapshot.hit_ground_this_frame = snapshot.below && in_air_last_frame;
        snapshot.hit_wall_this_frame = snapshot.touching_wall() && no_side_contact_last_frame;

        if snapshot.hit_ground_this_frame {
            debug!(
                "Landed: ground_type={:?}, slope_angle={:.1}",
                snapshot.ground_type, snapshot.slope_angle
            );
        } else if previous.below && !snapshot.below {
            debug!("Left ground: suppressed={}", snapshot.ground_check_suppressed);
        }

        self.snapshot = snapshot;
        &self.snapshot
    }

    fn check_ground<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        position: Vec2,
        collider: &CharacterCollider,
        filter: &QueryFilter,
        snapshot: &mut ContactSnapshot,
    ) {
        let hit = backend.cast_shape(
            collider.shape(),
            collider.center(position),
            Dir2::NEG_Y,
            self.settings.raycast_distance,
            filter,
        );

        let Some(hit) = hit else {
            snapshot.ground_type = GroundType::None;
            snapshot.below = false;
            self.platform = None;
            return;
        };

        snapshot.ground_type = match backend.capability::<GroundEffector>(hit.body) {
            Some(effector) => effector.ground_type,
            None => {
                self.platform = None;
                GroundType::LevelGeometry
            }
        };

        match snapshot.ground_type {
            GroundType::MovingPlatform => self.platform = Some(hit.body),
            GroundType::CollapsablePlatform => {
                self.platform = Some(hit.body);
                backend.signal_collapse(hit.body);
            }
            GroundType::JumpPad => {
                snapshot.jump_pad = Some(backend.capability::<JumpPad>(hit.body).unwrap_or_default());
            }
            _ => {}
        }

        snapshot.slope_angle = hit.normal.angle_to(Vec2::Y).to_degrees();
        snapshot.below = snapshot.slope_angle.abs() <= self.settings.slope_angle_limit;
    }

    fn check_walls<B: PhysicsBackend>(
        &self,
        backend: &B,
        position: Vec2,
        collider: &CharacterCollider,
        filter: &QueryFilter,
        snapshot: &mut ContactSnapshot,
    ) {
        let center = collider.center(position);
        let half_width = collider.size.x * 0.5;
        let spread = Vec2::Y * collider.size.y * WALL_RAY_SPREAD;
        let distance = self.settings.raycast_distance;

        let side = |direction: Dir2| {
            let origin = center + direction.as_vec2() * half_width;
            let upper = backend.cast_ray(origin + spread, direction, distance, filter);
            let lower = backend.cast_ray(origin - spread, direction, distance, filter);

            // A single ray catching a corner is not a wall
            match (upper, lower) {
                (Some(_), Some(lower)) => {
                    let effector = backend.capability::<WallEffector>(lower.body);
                    let wall_type = effector.map_or(WallType::Normal, |e| e.wall_type);
                    Some((wall_type, effector))
                }
                _ => None,
            }
        };

        if let Some((wall_type, effector)) = side(Dir2::NEG_X) {
            snapshot.left = true;
            snapshot.left_wall_type = wall_type;
            snapshot.left_wall_effector = effector;
        }
        if let Some((wall_type, effector)) = side(Dir2::X) {
            snapshot.right = true;
            snapshot.right_wall_type = wall_type;
            snapshot.right_wall_effector = effector;
        }
    }

    fn check_ceiling<B: PhysicsBackend>(
        &self,
        backend: &B,
        position: Vec2,
        collider: &CharacterCollider,
        filter: &QueryFilter,
        snapshot: &mut ContactSnapshot,
    ) {
        let hit = backend.cast_shape(
            collider.shape(),
            collider.center(position),
            Dir2::Y,
            self.settings.raycast_distance,
            filter,
        );

        if let Some(hit) = hit {
            snapshot.above = true;
            snapshot.ceiling_type = backend
                .capability::<GroundEffector>(hit.body)
                .map_or(GroundType::LevelGeometry, |e| e.ground_type);
        }
    }

    fn check_volumes<B: PhysicsBackend>(
        &self,
        backend: &B,
        position: Vec2,
        collider: &CharacterCollider,
        filter: &QueryFilter,
        snapshot: &mut ContactSnapshot,
    ) {
        let center = collider.center(position);
        let overlapping = backend.overlapping(collider.shape(), center, filter);

        snapshot.is_in_water = overlapping
            .iter()
            .any(|body| backend.capability::<WaterVolume>(*body).is_some());
        snapshot.is_submerged = backend
            .containing_point(center, filter)
            .iter()
            .any(|body| backend.capability::<WaterVolume>(*body).is_some());

        snapshot.air_effector = overlapping.iter().find_map(|body| {
            backend
                .capability::<AirEffector>(*body)
                .map(|effector| AirEffectorContact {
                    body: *body,
                    kind: effector.kind,
                    speed: effector.speed,
                    direction: effector.direction,
                })
        });
    }
}

//! Integrator domain: turns the queued move amount into body motion.
//!
//! Kinematic mode moves the body directly. Inside water the integrator
//! switches to force-based motion and lets the backend integrate.


use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::physics::{AirEffectorType, CharacterBody, GroundType};
use crate::probe::ContactSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum MoveMode {
    #[default]
    Kinematic,
    PhysicsBased,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IntegratorSettings {
    /// Extra pull applied when walking down a slope or riding a collapsing
    /// platform.
    pub down_force_adjustment: f32,
    pub water_force: f32,
    /// Forces stop accumulating once the body is faster than this.
    pub speed_cap: f32,
}

impl Default for IntegratorSettings {
    fn default() -> Self {
        Self {
            down_force_adjustment: 1.2,
            water_force: 250.0,
            speed_cap: 10.0,
        }
    }
}

/// Contact facts the displacement adjustments depend on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SurfaceContext {
    pub below: bool,
    pub slope_angle: f32,
    pub ground_type: GroundType,
    /// Coupled platform's motion this tick.
    pub platform_velocity: Vec2,
    pub ground_check_disabled: bool,
    pub air_effector: Option<(AirEffectorType, Vec2)>,
}

impl SurfaceContext {
    pub fn new(snapshot: &ContactSnapshot, platform_velocity: Vec2, ground_check_disabled: bool) -> Self {
        Self {
            below: snapshot.below,
            slope_angle: snapshot.slope_angle,
            ground_type: snapshot.ground_type,
            platform_velocity,
            ground_check_disabled,
            air_effector: snapshot
                .air_effector
                .map(|contact| (contact.kind, contact.direction * contact.speed)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PositionIntegrator {
    pub settings: IntegratorSettings,
    mode: MoveMode,
    pending: Vec2,
}

impl PositionIntegrator {
    pub fn new(settings: IntegratorSettings) -> Self {
        Self {
            settings,
            ..default()
        }
    }

    pub fn mode(&self) -> MoveMode {
        self.mode
    }

    /// Move amount waiting for the next [`integrate`](Self::integrate).
    pub fn pending_move(&self) -> Vec2 {
        self.pending
    }

    /// Accumulate a displacement for this tick.
    pub fn queue_move(&mut self, amount: Vec2) {
        self.pending += amount;
    }

    /// Apply slope, platform and tractor-beam adjustments to the pending move.
    pub fn resolve_displacement(&mut self, surface: &SurfaceContext, dt: f32) {
        let adjustment = self.settings.down_force_adjustment;
        let amount = &mut self.pending;

        if surface.slope_angle != 0.0 && surface.below {
            let downhill = (amount.x > 0.0 && surface.slope_angle > 0.0)
                || (amount.x < 0.0 && surface.slope_angle < 0.0);
            if downhill {
                amount.y = -(surface.slope_angle.to_radians().tan() * amount.x).abs() * adjustment;
            }
        }

        let platform = surface.platform_velocity;
        match surface.ground_type {
            GroundType::MovingPlatform => {
                amount.x += platform.x;
                if platform.y < 0.0 {
                    amount.y += platform.y;
                }
            }
            GroundType::CollapsablePlatform if platform.y < 0.0 => {
                amount.y += platform.y;
                if !surface.ground_check_disabled && surface.below {
                    amount.y *= adjustment * 4.0;
                }
            }
            _ => {}
        }

        if let Some((AirEffectorType::TractorBeam, pull)) = surface.air_effector {
            *amount = amount.lerp(pull, dt.clamp(0.0, 1.0));
        }
    }

    /// Hand the pending move to the body and clear it.
    pub fn integrate(&mut self, body: &mut impl CharacterBody) {
        match self.mode {
            MoveMode::Kinematic => {
                let target = body.position() + self.pending;
                body.move_position(target);
            }
            MoveMode::PhysicsBased => {
                if body.velocity().length() < self.settings.speed_cap {
                    body.add_force(self.pending * self.settings.water_force);
                }
            }
        }
        self.pending = Vec2::ZERO;
    }

    /// Follow water contact. Returns the new mode when it changed.
    pub fn sync_water(&mut self, in_water: bool, body: &mut impl CharacterBody) -> Option<MoveMode> {
        match (self.mode, in_water) {
            (MoveMode::Kinematic, true) => {
                self.mode = MoveMode::PhysicsBased;
                debug!("Entered water: mode=PhysicsBased");
                Some(self.mode)
            }
            (MoveMode::PhysicsBased, false) => {
                body.set_velocity(Vec2::ZERO);
                self.mode = MoveMode::Kinematic;
                debug!("Left water: mode=Kinematic");
                Some(self.mode)
            }
            _ => None,
        }
    }
}

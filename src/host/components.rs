//! Host domain: components and physics layers for motor-driven characters.

use std::sync::Arc;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::character::Character;
use crate::integrator::MoveMode;
use crate::movement::{InputFrame, JumpSignal};
use crate::physics::{CharacterCollider, EffectorSet};
use crate::profile::Profile;
use crate::teleport::TeleportTarget;

/// Physics layers for collision filtering. Bit order matches
/// [`crate::physics::layers`].
#[derive(PhysicsLayer, Clone, Copy, Debug, Default)]
pub enum GameLayer {
    #[default]
    Default,
    /// Ground surfaces (floors, platforms)
    Ground,
    /// Wall surfaces
    Wall,
    /// Motor-driven characters
    Player,
    /// Water volumes (sensors)
    Water,
    /// Ladders, updrafts and tractor beams (sensors)
    AirZone,
}

/// Marks the character fed by the keyboard sampler.
#[derive(Component, Debug)]
pub struct PlayerControlled;

/// Effector data carried by a surface or volume.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Effectors(pub EffectorSet);

/// The movement core for one character entity.
#[derive(Component, Debug)]
pub struct Motor {
    pub character: Character,
    applied_collider: CharacterCollider,
}

impl Motor {
    pub fn new(character: Character) -> Self {
        let applied_collider = character.collider();
        Self {
            character,
            applied_collider,
        }
    }

    /// The controller's collider, when it differs from the one last applied
    /// to the entity.
    pub(crate) fn take_collider_change(&mut self) -> Option<CharacterCollider> {
        let current = self.character.collider();
        if current == self.applied_collider {
            return None;
        }
        self.applied_collider = current;
        Some(current)
    }
}

/// Input latched between frame-rate sampling and the fixed tick.
#[derive(Component, Debug, Default)]
pub struct MotorInput {
    frame: InputFrame,
    teleport: bool,
}

impl MotorInput {
    pub fn set_movement(&mut self, movement: Vec2) {
        self.frame.movement = movement;
    }

    /// Latch a jump signal. A press or release outranks a hold until the
    /// next tick consumes it.
    pub fn latch_jump(&mut self, signal: JumpSignal) {
        self.frame.jump = match (self.frame.jump, signal) {
            (Some(JumpSignal::Pressed), _) => Some(JumpSignal::Pressed),
            (Some(JumpSignal::Released), JumpSignal::Held) => Some(JumpSignal::Released),
            _ => Some(signal),
        };
    }

    pub fn latch_dash(&mut self) {
        self.frame.dash = true;
    }

    pub fn latch_attack(&mut self) {
        self.frame.attack = true;
    }

    /// Request a teleport to the current target on the next tick.
    pub fn latch_teleport(&mut self) {
        self.teleport = true;
    }

    pub(crate) fn take_teleport(&mut self) -> bool {
        std::mem::take(&mut self.teleport)
    }

    pub fn peek(&self) -> &InputFrame {
        &self.frame
    }

    /// Hand over this tick's input. The movement axis stays, latches reset.
    pub fn take(&mut self) -> InputFrame {
        let frame = self.frame;
        self.frame = InputFrame::moving(frame.movement);
        frame
    }
}

/// Avian collider for a character collider, offset included.
pub fn collider_for(collider: &CharacterCollider) -> Collider {
    let shape = Collider::rectangle(collider.size.x, collider.size.y);
    if collider.offset == Vec2::ZERO {
        return shape;
    }
    Collider::compound(vec![(
        Position::new(collider.offset),
        Rotation::default(),
        shape,
    )])
}

/// Water drag the dynamic body carries while forces drive it. Matches the
/// headless body.
pub const WATER_DAMPING: f32 = 1.0;

/// Kinematic moves write the exact per-tick velocity, so they must not be
/// damped by avian.
pub fn damping_for(mode: MoveMode) -> LinearDamping {
    match mode {
        MoveMode::Kinematic => LinearDamping(0.0),
        MoveMode::PhysicsBased => LinearDamping(WATER_DAMPING),
    }
}

/// Everything a motor-driven character entity needs.
pub fn motor_character(profile: Arc<Profile>, position: Vec2) -> impl Bundle {
    let character = Character::with_profile(profile);
    let collider = collider_for(&character.collider());

    (
        (
            Motor::new(character),
            MotorInput::default(),
            TeleportTarget::new(position),
        ),
        Transform::from_translation(position.extend(1.0)),
        (
            RigidBody::Dynamic,
            collider,
            LockedAxes::ROTATION_LOCKED,
            LinearVelocity::default(),
            damping_for(MoveMode::Kinematic),
            GravityScale(0.0), // The controller owns gravity
            Friction::new(0.0),
            CollisionLayers::new(
                GameLayer::Player,
                [GameLayer::Default, GameLayer::Ground, GameLayer::Wall],
            ),
        ),
    )
}

/// Solid surface carrying effectors. Platforms pass `RigidBody::Kinematic`.
pub fn surface(
    position: Vec2,
    size: Vec2,
    layer: GameLayer,
    body: RigidBody,
    effectors: EffectorSet,
) -> impl Bundle {
    (
        Effectors(effectors),
        Transform::from_translation(position.extend(0.0)),
        body,
        Collider::rectangle(size.x, size.y),
        CollisionLayers::new(layer, [GameLayer::Player]),
    )
}

/// Trigger volume: water or an air effector zone.
pub fn volume(position: Vec2, size: Vec2, layer: GameLayer, effectors: EffectorSet) -> impl Bundle {
    (
        Effectors(effectors),
        Transform::from_translation(position.extend(-1.0)),
        RigidBody::Static,
        Collider::rectangle(size.x, size.y),
        Sensor,
        CollisionLayers::new(layer, [GameLayer::Player]),
    )
}

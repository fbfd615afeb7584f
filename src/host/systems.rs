//! Host domain: input sampling, platform motion and the fixed character tick.

use avian2d::prelude::*;
use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;

use crate::host::backend::{AvianBackend, BodyIndex};
use crate::host::components::{
    Effectors, Motor, MotorInput, PlayerControlled, collider_for, damping_for,
};
use crate::movement::{JumpSignal, MovementNotification};
use crate::physics::{BodyHandle, CharacterBody, PlatformMotion, layers};
use crate::physics::QueryFilter;
use crate::platforms::{CollapsingPlatform, MovingPlatform};
use crate::teleport::TeleportTarget;

/// How far below a collapsing platform support is looked for.
const SUPPORT_PROBE_DISTANCE: f32 = 100.0;
/// Keyboard teleport aim, relative to the character along its facing.
pub const TELEPORT_REACH: f32 = 4.0;
pub const TELEPORT_LIFT: f32 = 1.0;

/// Collapse signals raised by characters, consumed by the next platform step.
#[derive(Resource, Debug, Default)]
pub struct PendingCollapses(pub Vec<Entity>);

pub(crate) fn sample_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut query: Query<(&mut MotorInput, Option<&mut TeleportTarget>), With<PlayerControlled>>,
) {
    let mut x = 0.0;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        x += 1.0;
    }

    let mut y = 0.0;
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        y += 1.0;
    }

    let jump_keys = [KeyCode::Space, KeyCode::KeyK];
    let jump = if keyboard.any_just_pressed(jump_keys) {
        Some(JumpSignal::Pressed)
    } else if keyboard.any_just_released(jump_keys) {
        Some(JumpSignal::Released)
    } else if keyboard.any_pressed(jump_keys) {
        Some(JumpSignal::Held)
    } else {
        None
    };
    let dash = keyboard.any_just_pressed([KeyCode::ShiftLeft, KeyCode::KeyJ]);
    let attack = keyboard.any_just_pressed([KeyCode::KeyL, KeyCode::KeyX]);
    let aiming = keyboard.pressed(KeyCode::KeyT);
    let teleport = keyboard.just_released(KeyCode::KeyT);

    for (mut input, target) in &mut query {
        if let Some(mut target) = target {
            target.active = aiming;
        }
        if teleport {
            input.latch_teleport();
        }
        input.set_movement(Vec2::new(x, y));
        if let Some(signal) = jump {
            input.latch_jump(signal);
        }
        if dash {
            input.latch_dash();
        }
        if attack {
            input.latch_attack();
        }
    }
}

/// Keep [`BodyIndex`] in step with spawned, changed and removed colliders.
pub(crate) fn index_bodies(
    mut index: ResMut<BodyIndex>,
    added: Query<(Entity, Option<&Effectors>), Added<Collider>>,
    changed: Query<(Entity, &Effectors), Changed<Effectors>>,
    mut removed: RemovedComponents<Collider>,
) {
    for entity in removed.read() {
        index.remove(entity);
    }
    for (entity, effectors) in &added {
        index.insert(entity, effectors.map(|e| e.0).unwrap_or_default());
    }
    for (entity, effectors) in &changed {
        index.insert(entity, effectors.0);
    }
}

pub(crate) fn advance_platforms(
    time: Res<Time>,
    spatial: SpatialQuery,
    mut pending: ResMut<PendingCollapses>,
    mut moving: Query<
        (&mut MovingPlatform, &mut Transform, &mut Effectors),
        Without<CollapsingPlatform>,
    >,
    mut collapsing: Query<
        (Entity, &mut CollapsingPlatform, &Collider, &mut Transform, &mut Effectors),
        Without<MovingPlatform>,
    >,
) {
    let dt = time.delta_secs();

    for (mut platform, mut transform, mut effectors) in &mut moving {
        platform.advance(dt);
        transform.translation = platform.position().extend(transform.translation.z);
        effectors.0.platform = Some(PlatformMotion {
            difference: platform.difference(),
        });
    }

    for entity in pending.0.drain(..) {
        if let Ok((_, mut platform, ..)) = collapsing.get_mut(entity) {
            platform.collapse();
        }
    }

    for (entity, mut platform, collider, mut transform, mut effectors) in &mut collapsing {
        let filter = SpatialQueryFilter::from_mask(LayerMask(layers::SOLID))
            .with_excluded_entities([entity]);
        let support = spatial
            .cast_shape(
                collider,
                platform.position(),
                0.0,
                Dir2::NEG_Y,
                &ShapeCastConfig::from_max_distance(SUPPORT_PROBE_DISTANCE),
                &filter,
            )
            .map(|hit| hit.distance);

        platform.advance(dt, support);
        transform.translation = platform.position().extend(transform.translation.z);
        effectors.0.platform = Some(PlatformMotion {
            difference: platform.difference(),
        });
    }
}

/// The character's dynamic body, driven through its linear velocity.
struct AvianBody<'a> {
    position: Vec2,
    velocity: &'a mut Vec2,
    dt: f32,
}

impl CharacterBody for AvianBody<'_> {
    fn position(&self) -> Vec2 {
        self.position
    }

    fn move_position(&mut self, target: Vec2) {
        *self.velocity = (target - self.position) / self.dt;
        self.position = target;
    }

    fn velocity(&self) -> Vec2 {
        *self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        *self.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec2) {
        *self.velocity += force * self.dt;
    }

    fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }
}

/// Aim point for a character facing `facing` at `position`.
pub fn teleport_aim(position: Vec2, facing: f32) -> Vec2 {
    position + Vec2::new(facing * TELEPORT_REACH, TELEPORT_LIFT)
}

/// Keep live targets evaluated and take requested teleports before the
/// character tick senses.
pub(crate) fn aim_teleports(
    spatial: SpatialQuery,
    index: Res<BodyIndex>,
    mut characters: Query<(
        Entity,
        &mut Motor,
        &mut MotorInput,
        &mut TeleportTarget,
        &mut Transform,
        &mut LinearVelocity,
    )>,
) {
    for (entity, mut motor, mut input, mut target, mut transform, mut velocity) in &mut characters {
        let requested = input.take_teleport();
        if !target.active && !requested {
            continue;
        }

        let handle = BodyHandle::from(entity);
        let position = transform.translation.truncate();
        let motor = &mut *motor;
        target.aim = teleport_aim(position, motor.character.controller.facing().sign());

        let mut backend = AvianBackend::new(&spatial, &index);
        let filter = QueryFilter::from_mask(layers::SOLID).excluding(handle);
        target.evaluate(&backend, &motor.character.collider(), &filter);
        if !requested {
            continue;
        }

        let mut body = AvianBody {
            position,
            velocity: &mut velocity.0,
            dt: 0.0,
        };
        if motor
            .character
            .teleport(&target, &mut backend, &mut body, Some(handle))
        {
            transform.translation = body.position.extend(transform.translation.z);
            info!("Character {:?} teleported to {:?}", entity, body.position);
        } else {
            info!("Character {:?} cannot teleport to {:?}", entity, target.aim);
        }
    }
}

/// One fixed tick per character: sense where physics left the body, then
/// decide and hand the displacement to avian as velocity.
pub(crate) fn tick_characters(
    mut commands: Commands,
    time: Res<Time>,
    spatial: SpatialQuery,
    index: Res<BodyIndex>,
    mut pending: ResMut<PendingCollapses>,
    mut notifications: MessageWriter<MovementNotification>,
    mut characters: Query<(Entity, &mut Motor, &mut MotorInput, &Transform, &mut LinearVelocity)>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (entity, mut motor, mut input, transform, mut velocity) in &mut characters {
        let handle = BodyHandle::from(entity);
        let position = transform.translation.truncate();
        let frame = input.take();
        let motor = &mut *motor;

        let mut backend = AvianBackend::new(&spatial, &index);
        let mut body = AvianBody {
            position,
            velocity: &mut velocity.0,
            dt,
        };

        motor
            .character
            .sense(&mut backend, position, Some(handle), dt);
        if let Some(mode) = motor.character.sync_water(&mut body) {
            commands.entity(entity).insert(damping_for(mode));
            debug!("Character {:?} switched move mode: mode={:?}", entity, mode);
        }
        motor
            .character
            .decide(dt, &frame, &mut backend, position, Some(handle));
        motor.character.integrate(&mut body);

        if let Some(collider) = motor.take_collider_change() {
            commands.entity(entity).insert(collider_for(&collider));
        }

        for event in motor.character.controller.drain_events() {
            notifications.write(MovementNotification { entity, event });
        }

        let requests = backend.into_requests();
        for (toggled, enabled) in requests.toggles {
            let Some(target) = index.entity(toggled) else {
                warn!("Collision toggle for unknown body {:?}", toggled);
                continue;
            };
            if enabled {
                commands.entity(target).remove::<ColliderDisabled>();
            } else {
                commands.entity(target).insert(ColliderDisabled);
            }
        }
        pending
            .0
            .extend(requests.collapses.into_iter().filter_map(|platform| index.entity(platform)));
    }
}

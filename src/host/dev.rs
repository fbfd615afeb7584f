//! Host domain: sandbox room and probe overlay for trying the controller by hand.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::host::MotorProfile;
use crate::host::components::{GameLayer, Motor, PlayerControlled, motor_character, surface, volume};
use crate::physics::{
    AirEffector, AirEffectorType, CharacterCollider, EffectorSet, GroundEffector, GroundType,
    JumpPad, WallEffector, WaterVolume,
};
use crate::platforms::{CollapsingPlatform, MovingPlatform};
use crate::teleport::{LandingStatus, TeleportTarget};

/// World units are metres; the camera shows 32 pixels per unit.
const PIXELS_PER_UNIT: f32 = 32.0;

pub struct MotorDevPlugin;

impl Plugin for MotorDevPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ProbeOverlay>()
            .add_systems(Startup, (setup_camera, spawn_sandbox_room))
            .add_systems(Update, (toggle_probe_overlay, draw_probe_overlay).chain())
            .add_systems(Update, draw_teleport_indicator);
    }
}

#[derive(Resource, Debug, Default)]
pub struct ProbeOverlay {
    pub visible: bool,
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera2d,
        Projection::Orthographic(OrthographicProjection {
            scale: 1.0 / PIXELS_PER_UNIT,
            ..OrthographicProjection::default_2d()
        }),
        Transform::from_xyz(0.0, 6.0, 0.0),
    ));
}

fn sprite(color: Color, size: Vec2) -> Sprite {
    Sprite {
        color,
        custom_size: Some(size),
        ..default()
    }
}

fn ground(ground_type: GroundType) -> EffectorSet {
    EffectorSet {
        ground: Some(GroundEffector::new(ground_type)),
        ..default()
    }
}

pub(crate) fn spawn_sandbox_room(mut commands: Commands, profile: Res<MotorProfile>) {
    let wall_color = Color::srgb(0.3, 0.3, 0.4);
    let ground_color = Color::srgb(0.4, 0.5, 0.4);
    let platform_color = Color::srgb(0.5, 0.4, 0.3);

    // Floor
    let size = Vec2::new(40.0, 1.0);
    commands.spawn((
        surface(
            Vec2::new(0.0, -0.5),
            size,
            GameLayer::Ground,
            RigidBody::Static,
            ground(GroundType::LevelGeometry),
        ),
        sprite(ground_color, size),
    ));

    // Walls. The right one is sticky and can't be run up.
    let size = Vec2::new(1.0, 20.0);
    commands.spawn((
        surface(
            Vec2::new(-20.5, 10.0),
            size,
            GameLayer::Wall,
            RigidBody::Static,
            EffectorSet::default(),
        ),
        sprite(wall_color, size),
    ));
    commands.spawn((
        surface(
            Vec2::new(20.5, 10.0),
            size,
            GameLayer::Wall,
            RigidBody::Static,
            EffectorSet {
                wall: Some(WallEffector {
                    runnable: false,
                    slide_amount: 0.02,
                    ..default()
                }),
                ..default()
            },
        ),
        sprite(wall_color, size),
    ));

    // One-way platform
    let size = Vec2::new(4.0, 0.2);
    commands.spawn((
        surface(
            Vec2::new(-8.0, 3.5),
            size,
            GameLayer::Ground,
            RigidBody::Static,
            ground(GroundType::OneWayPlatform),
        ),
        sprite(platform_color, size),
    ));

    // Moving platform
    let size = Vec2::new(3.0, 0.4);
    let start = Vec2::new(-4.0, 6.0);
    match MovingPlatform::new(start, vec![start, Vec2::new(4.0, 6.0), Vec2::new(4.0, 9.0)], 2.0) {
        Ok(platform) => {
            commands.spawn((
                platform,
                surface(
                    start,
                    size,
                    GameLayer::Ground,
                    RigidBody::Kinematic,
                    ground(GroundType::MovingPlatform),
                ),
                sprite(platform_color, size),
            ));
        }
        Err(error) => warn!("Skipping sandbox moving platform: {}", error),
    }

    // Collapsing platform
    let size = Vec2::new(3.0, 0.4);
    let position = Vec2::new(12.0, 4.0);
    commands.spawn((
        CollapsingPlatform::new(position),
        surface(
            position,
            size,
            GameLayer::Ground,
            RigidBody::Kinematic,
            ground(GroundType::CollapsablePlatform),
        ),
        sprite(Color::srgb(0.6, 0.35, 0.3), size),
    ));

    // Jump pad
    let size = Vec2::new(2.0, 0.3);
    commands.spawn((
        surface(
            Vec2::new(-15.0, 0.15),
            size,
            GameLayer::Ground,
            RigidBody::Static,
            EffectorSet {
                jump_pad: Some(JumpPad::default()),
                ..default()
            },
        ),
        sprite(Color::srgb(0.8, 0.7, 0.2), size),
    ));

    // Water pool sitting on the floor
    let size = Vec2::new(6.0, 3.0);
    commands.spawn((
        volume(
            Vec2::new(16.0, 1.5),
            size,
            GameLayer::Water,
            EffectorSet {
                water: Some(WaterVolume),
                ..default()
            },
        ),
        sprite(Color::srgba(0.2, 0.4, 0.9, 0.4), size),
    ));

    // Ladder and updraft
    let size = Vec2::new(1.0, 8.0);
    commands.spawn((
        volume(
            Vec2::new(-11.0, 4.0),
            size,
            GameLayer::AirZone,
            EffectorSet {
                air: Some(AirEffector::new(AirEffectorType::Ladder, 4.0)),
                ..default()
            },
        ),
        sprite(Color::srgba(0.6, 0.5, 0.3, 0.5), size),
    ));
    let size = Vec2::new(2.0, 10.0);
    commands.spawn((
        volume(
            Vec2::new(8.0, 5.0),
            size,
            GameLayer::AirZone,
            EffectorSet {
                air: Some(AirEffector::new(AirEffectorType::Updraft, 12.0)),
                ..default()
            },
        ),
        sprite(Color::srgba(0.7, 0.9, 1.0, 0.25), size),
    ));

    // Character
    let collider = CharacterCollider::default().size;
    commands.spawn((
        PlayerControlled,
        motor_character(profile.0.clone(), Vec2::new(0.0, 2.0)),
        sprite(Color::srgb(0.9, 0.9, 0.9), collider),
    ));

    info!("Spawned sandbox room");
}

fn toggle_probe_overlay(keyboard: Res<ButtonInput<KeyCode>>, mut overlay: ResMut<ProbeOverlay>) {
    if keyboard.just_pressed(KeyCode::F1) || keyboard.just_pressed(KeyCode::Backquote) {
        overlay.visible = !overlay.visible;
        debug!("Probe overlay visible={}", overlay.visible);
    }
}

/// Collider outline plus one line per probe direction, lit when in contact.
fn draw_probe_overlay(
    overlay: Res<ProbeOverlay>,
    mut gizmos: Gizmos,
    characters: Query<(&Motor, &Transform)>,
) {
    if !overlay.visible {
        return;
    }

    let idle = Color::srgb(0.4, 0.4, 0.4);
    let hit = Color::srgb(1.0, 0.3, 0.2);
    let pick = |touching: bool| if touching { hit } else { idle };

    for (motor, transform) in &characters {
        let character = &motor.character;
        let position = transform.translation.truncate();
        let collider = character.collider();
        let center = collider.center(position);
        let half = collider.size * 0.5;
        let reach = character.probe.settings.raycast_distance;
        let contacts = character.snapshot();

        let outline = if character.controller.is_grounded() {
            Color::srgb(0.3, 0.9, 0.4)
        } else {
            Color::srgb(0.9, 0.9, 0.3)
        };
        gizmos.rect_2d(center, collider.size, outline);

        let below = center - Vec2::Y * half.y;
        gizmos.line_2d(below, below - Vec2::Y * reach, pick(contacts.below));
        let above = center + Vec2::Y * half.y;
        gizmos.line_2d(above, above + Vec2::Y * reach, pick(contacts.above));
        let left = center - Vec2::X * half.x;
        gizmos.line_2d(left, left - Vec2::X * reach, pick(contacts.left));
        let right = center + Vec2::X * half.x;
        gizmos.line_2d(right, right + Vec2::X * reach, pick(contacts.right));
    }
}

/// Aim marker while the teleport key is held: green over a clear landing,
/// red otherwise.
fn draw_teleport_indicator(
    mut gizmos: Gizmos,
    characters: Query<(&Motor, &TeleportTarget), With<PlayerControlled>>,
) {
    let clear = Color::srgb(0.3, 0.9, 0.4);
    let refused = Color::srgb(1.0, 0.3, 0.2);

    for (motor, target) in &characters {
        if !target.active {
            continue;
        }
        let size = motor.character.collider().size;
        match target.status() {
            LandingStatus::Clear { center } => gizmos.rect_2d(center, size, clear),
            LandingStatus::Blocked { center } => gizmos.rect_2d(center, size, refused),
            LandingStatus::NoGround => {
                gizmos.circle_2d(target.aim, 0.25, refused);
            }
        }
    }
}

//! Headless domain: deterministic simulation over the [`AabbWorld`] backend.
//!
//! [`Sandbox`] owns the world, the character's body and any platforms, and
//! runs whole ticks without an ECS. Used for replays and scenario tests.


use std::sync::Arc;

use bevy::prelude::*;

use crate::character::Character;
use crate::movement::{InputFrame, MovementController, MovementEvent};
use crate::physics::{
    AabbBody, AabbWorld, BodyHandle, CastShape, EffectorSet, GroundEffector, GroundType,
    PhysicsBackend, QueryFilter, SimBody, SweptBody, layers,
};
use crate::platforms::{CollapsingPlatform, MovingPlatform};
use crate::profile::Profile;
use crate::teleport::TeleportTarget;

pub const DEFAULT_TICK: f32 = 1.0 / 60.0;
/// Handle reserved for the character's own body.
pub const CHARACTER_HANDLE: BodyHandle = BodyHandle(u64::MAX);
/// How far below a collapsing platform support is looked for.
const SUPPORT_PROBE_DISTANCE: f32 = 100.0;

#[derive(Debug)]
struct MovingEntry {
    body: BodyHandle,
    platform: MovingPlatform,
}

#[derive(Debug)]
struct CollapsingEntry {
    body: BodyHandle,
    size: Vec2,
    platform: CollapsingPlatform,
}

/// What happened during one [`Sandbox::step`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub position: Vec2,
    pub velocity: Vec2,
    pub events: Vec<MovementEvent>,
}

#[derive(Debug)]
pub struct Sandbox {
    pub world: AabbWorld,
    pub body: SimBody,
    pub character: Character,
    pub dt: f32,
    moving: Vec<MovingEntry>,
    collapsing: Vec<CollapsingEntry>,
    ticks: u64,
}

impl Sandbox {
    pub fn new(profile: Arc<Profile>, spawn: Vec2) -> Self {
        let character = Character::with_profile(profile);
        Self::with_character(character, spawn)
    }

    pub fn with_character(character: Character, spawn: Vec2) -> Self {
        let collider = character.collider();
        let mut body = SimBody::new(CHARACTER_HANDLE, spawn, collider.size, layers::SOLID);
        body.set_collider(&collider);
        Self {
            world: AabbWorld::new(),
            body,
            character,
            dt: DEFAULT_TICK,
            moving: Vec::new(),
            collapsing: Vec::new(),
            ticks: 0,
        }
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn position(&self) -> Vec2 {
        self.body.position
    }

    pub fn controller(&self) -> &MovementController {
        &self.character.controller
    }

    pub fn add_static(&mut self, body: AabbBody) -> BodyHandle {
        self.world.add_body(body)
    }

    pub fn add_moving_platform(&mut self, size: Vec2, platform: MovingPlatform) -> BodyHandle {
        let body = self.world.add_body(
            AabbBody::new(platform.position(), size, layers::GROUND).with_effectors(EffectorSet {
                ground: Some(GroundEffector::new(GroundType::MovingPlatform)),
                ..default()
            }),
        );
        self.world.set_platform_motion(body, Vec2::ZERO);
        self.moving.push(MovingEntry { body, platform });
        body
    }

    pub fn add_collapsing_platform(&mut self, size: Vec2, platform: CollapsingPlatform) -> BodyHandle {
        let body = self.world.add_body(
            AabbBody::new(platform.position(), size, layers::GROUND).with_effectors(EffectorSet {
                ground: Some(GroundEffector::new(GroundType::CollapsablePlatform)),
                ..default()
            }),
        );
        self.world.set_platform_motion(body, Vec2::ZERO);
        self.collapsing.push(CollapsingEntry {
            body,
            size,
            platform,
        });
        body
    }

    pub fn moving_platform(&self, body: BodyHandle) -> Option<&MovingPlatform> {
        self.moving
            .iter()
            .find(|entry| entry.body == body)
            .map(|entry| &entry.platform)
    }

    pub fn collapsing_platform(&self, body: BodyHandle) -> Option<&CollapsingPlatform> {
        self.collapsing
            .iter()
            .find(|entry| entry.body == body)
            .map(|entry| &entry.platform)
    }

    /// Aim a teleport at `aim` and take it when the landing is clear.
    pub fn teleport(&mut self, aim: Vec2) -> bool {
        let mut target = TeleportTarget::new(aim);
        let filter = QueryFilter::from_mask(layers::SOLID).excluding(CHARACTER_HANDLE);
        target.evaluate(&self.world, &self.character.collider(), &filter);

        let placed = {
            let mut swept = SweptBody {
                world: &self.world,
                body: &mut self.body,
            };
            self.character.place(&target, &mut swept)
        };
        let Some(position) = placed else {
            return false;
        };
        self.character
            .sense(&mut self.world, position, Some(CHARACTER_HANDLE), 0.0);
        true
    }

    /// Probe once at the current position so the first tick sees real contacts.
    pub fn settle(&mut self) {
        let position = self.body.position;
        self.character
            .sense(&mut self.world, position, Some(CHARACTER_HANDLE), 0.0);
    }

    /// Advance platforms, then the character, by one tick.
    pub fn step(&mut self, input: &InputFrame) -> TickReport {
        let dt = self.dt;
        self.advance_platforms(dt);

        let position = self.body.position;
        self.character
            .decide(dt, input, &mut self.world, position, Some(CHARACTER_HANDLE));
        self.body.set_collider(&self.character.collider());

        {
            let mut swept = SweptBody {
                world: &self.world,
                body: &mut self.body,
            };
            self.character.integrate(&mut swept);
        }
        self.body.integrate_dynamics(&self.world, dt);

        let position = self.body.position;
        self.character
            .sense(&mut self.world, position, Some(CHARACTER_HANDLE), dt);
        {
            let mut swept = SweptBody {
                world: &self.world,
                body: &mut self.body,
            };
            self.character.sync_water(&mut swept);
        }

        self.ticks += 1;
        TickReport {
            position: self.body.position,
            velocity: self.character.controller.move_direction(),
            events: self.character.controller.drain_events(),
        }
    }

    /// Step once per input, collecting every report.
    pub fn run<'a>(&mut self, inputs: impl IntoIterator<Item = &'a InputFrame>) -> Vec<TickReport> {
        inputs.into_iter().map(|input| self.step(input)).collect()
    }

    /// Step `ticks` times with the same input.
    pub fn hold(&mut self, input: InputFrame, ticks: usize) -> Vec<TickReport> {
        (0..ticks).map(|_| self.step(&input)).collect()
    }

    fn advance_platforms(&mut self, dt: f32) {
        let rider_on = self.character.snapshot().ground_body;

        for entry in &mut self.moving {
            entry.platform.advance(dt);
            let difference = entry.platform.difference();
            self.world.set_center(entry.body, entry.platform.position());
            self.world.set_platform_motion(entry.body, difference);

            // Rising platforms push their rider up
            if rider_on == Some(entry.body) && difference.y > 0.0 {
                self.body.position.y += difference.y;
            }
        }

        for signalled in self.world.take_collapse_signals() {
            if let Some(entry) = self
                .collapsing
                .iter_mut()
                .find(|entry| entry.body == signalled)
            {
                entry.platform.collapse();
            }
        }

        for entry in &mut self.collapsing {
            let filter = QueryFilter::from_mask(layers::SOLID).excluding(entry.body);
            let support = self
                .world
                .cast_shape(
                    CastShape::Box { size: entry.size },
                    entry.platform.position(),
                    Dir2::NEG_Y,
                    SUPPORT_PROBE_DISTANCE,
                    &filter,
                )
                .map(|hit| hit.distance);

            entry.platform.advance(dt, support);
            self.world.set_center(entry.body, entry.platform.position());
            self.world
                .set_platform_motion(entry.body, entry.platform.difference());
        }
    }
}

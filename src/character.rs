//! Character domain: controller, probe and integrator run as one unit.
//!
//! A tick is split into phases so hosts can interleave their own borrows:
//! [`Character::decide`] (state machine + displacement adjustments),
//! [`Character::integrate`] (move the body), [`Character::sense`] (re-probe
//! contacts for the next tick) and [`Character::sync_water`].
//! [`Character::teleport`] runs outside the tick.

use std::sync::Arc;

use bevy::prelude::*;

use crate::integrator::{IntegratorSettings, MoveMode, PositionIntegrator, SurfaceContext};
use crate::movement::{InputFrame, MovementController};
use crate::physics::{BodyHandle, CharacterBody, CharacterCollider, PhysicsBackend};
use crate::probe::{ContactProbe, ContactSnapshot, ProbeSettings};
use crate::profile::Profile;
use crate::teleport::TeleportTarget;

#[derive(Debug, Clone)]
pub struct Character {
    pub controller: MovementController,
    pub probe: ContactProbe,
    pub integrator: PositionIntegrator,
}

impl Character {
    pub fn new(
        profile: Arc<Profile>,
        collider: CharacterCollider,
        probe: ProbeSettings,
        integrator: IntegratorSettings,
    ) -> Self {
        Self {
            controller: MovementController::new(profile, collider),
            probe: ContactProbe::new(probe),
            integrator: PositionIntegrator::new(integrator),
        }
    }

    pub fn with_profile(profile: Arc<Profile>) -> Self {
        Self::new(
            profile,
            CharacterCollider::default(),
            ProbeSettings::default(),
            IntegratorSettings::default(),
        )
    }

    pub fn snapshot(&self) -> &ContactSnapshot {
        self.probe.snapshot()
    }

    pub fn collider(&self) -> CharacterCollider {
        self.controller.collider()
    }

    pub fn mode(&self) -> MoveMode {
        self.integrator.mode()
    }

    /// Run the state machine and queue the adjusted displacement.
    pub fn decide<B: PhysicsBackend>(
        &mut self,
        dt: f32,
        input: &InputFrame,
        backend: &mut B,
        position: Vec2,
        body: Option<BodyHandle>,
    ) {
        let delta = self
            .controller
            .update(dt, input, &mut self.probe, backend, position, body);
        self.integrator.queue_move(delta);

        let surface = SurfaceContext::new(
            self.probe.snapshot(),
            self.probe.platform_velocity(backend),
            self.probe.ground_check_disabled(),
        );
        self.integrator.resolve_displacement(&surface, dt);
    }

    pub fn integrate(&mut self, body: &mut impl CharacterBody) {
        self.integrator.integrate(body);
    }

    /// Re-probe at the body's new position.
    pub fn sense<B: PhysicsBackend>(
        &mut self,
        backend: &mut B,
        position: Vec2,
        body: Option<BodyHandle>,
        dt: f32,
    ) -> &ContactSnapshot {
        let collider = self.controller.collider();
        self.probe.probe(backend, position, &collider, body, dt)
    }

    /// Move the body to the target's landing spot if its last evaluation was
    /// clear. Returns the new body position.
    pub fn place(&self, target: &TeleportTarget, body: &mut impl CharacterBody) -> Option<Vec2> {
        let Some(center) = target.landing() else {
            debug!("Teleport refused: aim={:?}, status={:?}", target.aim, target.status());
            return None;
        };
        let position = center - self.collider().offset;
        body.set_position(position);
        debug!("Teleported: position={:?}", position);
        Some(position)
    }

    /// [`Character::place`], then re-probe at the landing so the next tick
    /// starts from real contacts. Returns whether the body moved.
    pub fn teleport<B: PhysicsBackend>(
        &mut self,
        target: &TeleportTarget,
        backend: &mut B,
        body: &mut impl CharacterBody,
        handle: Option<BodyHandle>,
    ) -> bool {
        let Some(position) = self.place(target, body) else {
            return false;
        };
        self.sense(backend, position, handle, 0.0);
        true
    }

    pub fn sync_water(&mut self, body: &mut impl CharacterBody) -> Option<MoveMode> {
        let in_water = self.probe.snapshot().is_in_water;
        self.integrator.sync_water(in_water, body)
    }
}

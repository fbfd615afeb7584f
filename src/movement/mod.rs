//! Movement domain: the per-tick character state machine.
//!
//! [`MovementController::update`] reads the contact snapshot the probe built
//! last tick, resolves a velocity and returns the displacement for the
//! integrator. All ability state and timers live here.

mod air;
mod events;
mod ground;
mod input;
mod state;
mod timers;
mod volumes;

#[cfg(test)]
mod tests;

pub use events::{MovementEvent, MovementNotification};
pub use input::{InputFrame, JumpSignal, apply_deadzone};
pub use state::{Facing, MovementState, OneWayPass};
pub use timers::{
    AIR_EFFECTOR_DEACTIVATION, DUCK_CLEAR_DELAY, ONE_WAY_PASS_WINDOW, POWER_JUMP_WINDOW, TimerKey,
    Timers, WALL_RUN_WINDOW,
};

use std::sync::Arc;

use bevy::prelude::*;

use crate::physics::{BodyHandle, CharacterCollider, PhysicsBackend, QueryFilter};
use crate::probe::{ContactProbe, ContactSnapshot};
use crate::profile::{DispatchOrder, Profile};

/// Which top-level handler ran this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum MovementMode {
    OnGround,
    InAirEffector,
    InWater,
    InAir,
}

/// Everything a handler may touch during one tick.
pub(crate) struct Tick<'a, B: PhysicsBackend> {
    pub dt: f32,
    /// Deadzone-filtered movement axis.
    pub input: Vec2,
    pub contacts: ContactSnapshot,
    pub probe: &'a mut ContactProbe,
    pub backend: &'a mut B,
    pub position: Vec2,
    pub body: Option<BodyHandle>,
}

impl<B: PhysicsBackend> Tick<'_, B> {
    pub fn solid_filter(&self) -> QueryFilter {
        let filter = QueryFilter::from_mask(self.probe.settings.solid_mask);
        match self.body {
            Some(body) => filter.excluding(body),
            None => filter,
        }
    }
}

#[derive(Debug, Clone)]
pub struct MovementController {
    profile: Arc<Profile>,
    pub state: MovementState,
    timers: Timers,
    collider: CharacterCollider,
    standing_size: Vec2,
    events: Vec<MovementEvent>,
    mode: MovementMode,
    grounded: bool,
    on_wall: bool,
    submerged: bool,
    last_air_effector: Option<BodyHandle>,
}

impl MovementController {
    pub fn new(profile: Arc<Profile>, collider: CharacterCollider) -> Self {
        let state = MovementState::new(profile.glide_time, profile.can_ground_slam);
        Self {
            profile,
            state,
            timers: Timers::default(),
            collider,
            standing_size: collider.size,
            events: Vec::new(),
            mode: MovementMode::InAir,
            grounded: false,
            on_wall: false,
            submerged: false,
            last_air_effector: None,
        }
    }

    pub fn profile(&self) -> &Arc<Profile> {
        &self.profile
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    /// Current collision volume. Shrinks while ducking.
    pub fn collider(&self) -> CharacterCollider {
        self.collider
    }

    pub fn mode(&self) -> MovementMode {
        self.mode
    }

    pub fn move_direction(&self) -> Vec2 {
        self.state.move_direction
    }

    pub fn facing(&self) -> Facing {
        self.state.facing
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn is_on_wall(&self) -> bool {
        self.on_wall
    }

    pub fn is_submerged(&self) -> bool {
        self.submerged
    }

    pub fn is_gliding(&self) -> bool {
        self.state.is_gliding
    }

    pub fn is_ducking(&self) -> bool {
        self.state.is_ducking
    }

    /// Notifications raised since the last drain.
    pub fn events(&self) -> &[MovementEvent] {
        &self.events
    }

    pub fn drain_events(&mut self) -> Vec<MovementEvent> {
        std::mem::take(&mut self.events)
    }

    /// Run one tick and return the displacement to hand to the integrator.
    pub fn update<B: PhysicsBackend>(
        &mut self,
        dt: f32,
        input: &InputFrame,
        probe: &mut ContactProbe,
        backend: &mut B,
        position: Vec2,
        body: Option<BodyHandle>,
    ) -> Vec2 {
        let contacts = probe.snapshot().clone();
        self.grounded = contacts.below;
        self.on_wall = contacts.touching_wall();
        self.submerged = contacts.is_submerged;

        let mut tick = Tick {
            dt,
            input: apply_deadzone(input.movement, self.profile.deadzone),
            contacts,
            probe,
            backend,
            position,
            body,
        };

        self.advance_timers(&mut tick);
        self.track_air_effector_exit(&mut tick);
        self.apply_input(&tick, input);
        self.process_horizontal_movement(&tick);

        self.mode = self.dispatch(&tick.contacts);
        match self.mode {
            MovementMode::OnGround => self.on_ground(&mut tick),
            MovementMode::InAirEffector => self.in_air_effector(&mut tick),
            MovementMode::InWater => self.in_water(&mut tick),
            MovementMode::InAir => self.in_air(&mut tick),
        }

        self.state.start_jump = false;
        self.state.move_direction * dt
    }

    fn dispatch(&self, contacts: &ContactSnapshot) -> MovementMode {
        match self.profile.dispatch_order {
            DispatchOrder::GroundFirst => {
                if contacts.below {
                    MovementMode::OnGround
                } else if contacts.is_in_air_effector() {
                    MovementMode::InAirEffector
                } else if contacts.is_in_water {
                    MovementMode::InWater
                } else {
                    MovementMode::InAir
                }
            }
            DispatchOrder::WaterFirst => {
                if contacts.is_in_water {
                    MovementMode::InWater
                } else if contacts.below {
                    MovementMode::OnGround
                } else if contacts.is_in_air_effector() {
                    MovementMode::InAirEffector
                } else {
                    MovementMode::InAir
                }
            }
        }
    }

    fn advance_timers<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        for key in self.timers.tick(tick.dt) {
            match key {
                TimerKey::Dash => {
                    self.state.is_dashing = false;
                    self.timers
                        .restart(TimerKey::DashCooldown, self.profile.dash_cooldown_time);
                    debug!("Dash ended: cooldown={}", self.profile.dash_cooldown_time);
                }
                TimerKey::DashCooldown => {}
                TimerKey::PowerJump => self.state.is_power_jumping = false,
                TimerKey::WallJumpLockout => self.state.in_air_control = true,
                TimerKey::WallRun => {
                    self.state.is_wall_running = false;
                    if !self.state.is_wall_jumping {
                        self.state.able_to_wall_run = false;
                    }
                }
                TimerKey::DuckClear => self.try_stand_up(tick),
                TimerKey::OneWayPass => {
                    if let Some(pass) = self.state.one_way_pass.take() {
                        tick.backend.set_collision_enabled(pass.body, true);
                        self.state.ground_slam_enabled = pass.saved_ground_slam;
                        debug!("One-way platform restored: body={:?}", pass.body);
                    }
                }
                TimerKey::AirEffectorDeactivation => {
                    if let Some(body) = self.state.deactivated_air_effector.take() {
                        tick.backend.set_collision_enabled(body, true);
                    }
                }
            }
        }

        if self.state.jump_buffer_counter > 0.0 {
            self.state.jump_buffer_counter -= tick.dt;
        }
        if !tick.contacts.below && self.state.coyote_time_counter > 0.0 {
            self.state.coyote_time_counter -= tick.dt;
        }
    }

    fn apply_input<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>, input: &InputFrame) {
        match input.jump {
            Some(JumpSignal::Pressed) => {
                self.state.start_jump = true;
                self.state.release_jump = false;
                self.state.hold_jump = true;
                self.state.jump_buffer_counter = self.profile.jump_buffer_time;
            }
            Some(JumpSignal::Held) => self.state.hold_jump = true,
            Some(JumpSignal::Released) => {
                self.state.start_jump = false;
                self.state.release_jump = true;
                self.state.hold_jump = false;
            }
            None => {}
        }

        if input.dash {
            self.try_dash(tick.contacts.below);
        }

        if input.attack && tick.input.y < 0.0 && self.state.ground_slam_enabled {
            self.state.is_ground_slamming = true;
        }
    }

    /// A press this tick, or one still held in the buffer.
    fn jump_requested(&self) -> bool {
        self.state.start_jump || self.state.jump_buffer_counter > 0.0
    }

    fn try_dash(&mut self, grounded: bool) {
        if self.state.is_dashing || self.timers.is_running(TimerKey::DashCooldown) {
            return;
        }
        let allowed = if grounded {
            self.profile.can_ground_dash
        } else {
            self.profile.can_air_dash
        };
        if !allowed {
            return;
        }

        self.events.push(MovementEvent::DashStarted);
        self.state.is_dashing = true;
        self.timers.restart(TimerKey::Dash, self.profile.dash_time);
        debug!("Dash started: facing={:?}, grounded={}", self.state.facing, grounded);
    }

    fn process_horizontal_movement<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        let input = tick.input;
        if !self.state.in_air_control || (self.state.is_wall_jumping && input.x == 0.0) {
            return;
        }

        if input.x < 0.0 {
            self.state.facing = Facing::Left;
        } else if input.x > 0.0 {
            self.state.facing = Facing::Right;
        }

        if self.state.is_dashing {
            self.state.move_direction.x = self.profile.dash_speed * self.state.facing.sign();
            self.state.move_direction.y = 0.0;
            return;
        }

        let speed = if self.state.is_creeping {
            self.profile.creep_speed
        } else {
            self.profile.walk_speed
        };
        let target = input.x * speed;
        let current = self.state.move_direction.x;
        let rate = if target.abs() > current.abs() {
            self.profile.acceleration_amount
        } else {
            self.profile.deceleration_amount
        };
        self.state.move_direction.x = current + (target - current) * rate.clamp(0.0, 1.0);
    }

    /// Shrink the collider to half height, keeping the feet in place.
    fn duck(&mut self) {
        let height = self.standing_size.y * 0.5;
        self.collider.size = Vec2::new(self.standing_size.x, height);
        self.collider.offset = Vec2::new(0.0, -height * 0.5);
        self.state.is_ducking = true;
    }

    /// Restore full height unless something overhead is in the way.
    fn try_stand_up<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        if !self.state.is_ducking && !self.state.is_creeping {
            return;
        }
        let blocked = tick
            .backend
            .cast_shape(
                self.collider.shape(),
                self.collider.center(tick.position),
                Dir2::Y,
                self.standing_size.y * 0.5,
                &tick.solid_filter(),
            )
            .is_some();
        if blocked {
            return;
        }

        self.collider.size = self.standing_size;
        self.collider.offset = Vec2::ZERO;
        self.state.is_ducking = false;
        self.state.is_creeping = false;
    }
}

//! Movement domain: grounded handling, jumps and ducking.

use bevy::prelude::*;

use super::timers::{DUCK_CLEAR_DELAY, ONE_WAY_PASS_WINDOW, POWER_JUMP_WINDOW};
use super::{MovementController, MovementEvent, OneWayPass, Tick, TimerKey};
use crate::physics::{AirEffectorType, GroundType, PhysicsBackend};

/// Fraction of the incoming fall speed a jump pad returns.
const JUMP_PAD_RESTITUTION: f32 = 0.92;
/// Share of the bounce added to the hold accumulator each tick.
const JUMP_PAD_HOLD_GAIN: f32 = 0.1;

impl MovementController {
    pub(super) fn on_ground<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        if tick.contacts.air_effector_type() == AirEffectorType::Ladder {
            self.in_air_effector(tick);
            return;
        }

        self.state.coyote_time_counter = self.profile.coyote_time;

        if tick.contacts.hit_ground_this_frame {
            self.state.landing_velocity = self.state.move_direction;
        }

        self.clear_air_ability_flags();
        self.state.move_direction.y = 0.0;

        self.jump(tick);
        self.ducking_and_creeping(tick);
        self.jump_pad(tick);
    }

    pub(super) fn clear_air_ability_flags(&mut self) {
        let state = &mut self.state;
        state.is_jumping = false;
        state.is_double_jumping = false;
        state.is_triple_jumping = false;
        state.is_wall_jumping = false;
        state.is_wall_sliding = false;
        state.is_ground_slamming = false;
        state.stomp_emitted = false;
        state.start_glide = true;
        state.current_glide_time = self.profile.glide_time;
        state.is_gliding = false;
    }

    /// Ground-style jump. Fires on this tick's press or while the jump buffer
    /// is live, so a press shortly before landing still counts.
    pub(super) fn jump<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        if !self.jump_requested() {
            return;
        }
        self.state.jump_buffer_counter = 0.0;
        self.state.coyote_time_counter = 0.0;
        self.state.start_jump = false;

        let ground_type = tick.contacts.ground_type;
        if self.profile.can_power_jump
            && self.state.is_ducking
            && ground_type != GroundType::OneWayPlatform
            && self.state.power_jump_timer > self.profile.power_jump_wait_time
        {
            self.events.push(MovementEvent::PowerJump);
            self.state.move_direction.y = self.profile.power_jump_speed;
            self.state.is_power_jumping = true;
            self.timers.restart(TimerKey::PowerJump, POWER_JUMP_WINDOW);
            debug!("Power jump: held={:.2}", self.state.power_jump_timer);
        } else if self.state.is_ducking && ground_type == GroundType::OneWayPlatform {
            self.disable_one_way_platform(tick, true);
        } else {
            self.state.move_direction.y = self.profile.jump_speed;
            debug!("Jump: ground_type={:?}", ground_type);
        }

        self.state.is_jumping = true;
        self.state.able_to_wall_run = true;

        tick.probe.disable_ground_check();
        tick.probe.clear_platform_coupling();
    }

    fn jump_pad<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        if tick.contacts.ground_type != GroundType::JumpPad {
            return;
        }
        let pad = tick.contacts.jump_pad.unwrap_or_default();

        let incoming = -self.state.landing_velocity.y;
        let mut bounce = if incoming > pad.amount {
            incoming * JUMP_PAD_RESTITUTION
        } else {
            pad.amount
        };

        if self.state.hold_jump {
            self.state.jump_pad_adjustment += bounce * JUMP_PAD_HOLD_GAIN;
            bounce += self.state.jump_pad_adjustment;
        } else {
            self.state.jump_pad_adjustment = 0.0;
        }

        self.state.move_direction.y = bounce.min(pad.upper_limit);
    }

    fn ducking_and_creeping<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        if tick.input.y < 0.0 {
            if !self.state.is_ducking && !self.state.is_creeping {
                self.duck();
            }
            self.state.power_jump_timer += tick.dt;
        } else {
            self.try_stand_up(tick);
            self.state.power_jump_timer = 0.0;
        }

        if self.state.is_ducking && self.state.move_direction.x != 0.0 {
            self.state.is_creeping = true;
            self.state.power_jump_timer = 0.0;
        } else {
            self.state.is_creeping = false;
        }
    }

    /// Switch off the one-way platform directly below (or above) for a short
    /// window. The ground-slam gate is suspended for the same window.
    pub(super) fn disable_one_way_platform<B: PhysicsBackend>(
        &mut self,
        tick: &mut Tick<'_, B>,
        check_below: bool,
    ) {
        if self.state.one_way_pass.is_some() {
            return;
        }

        let center = self.collider.center(tick.position);
        let half_height = Vec2::Y * self.collider.size.y * 0.5;
        let (origin, direction) = if check_below {
            (center - half_height, Dir2::NEG_Y)
        } else {
            (center + half_height, Dir2::Y)
        };

        let Some(hit) = tick.backend.cast_ray(
            origin,
            direction,
            tick.probe.settings.raycast_distance,
            &tick.solid_filter(),
        ) else {
            return;
        };

        tick.backend.set_collision_enabled(hit.body, false);
        self.state.one_way_pass = Some(OneWayPass {
            body: hit.body,
            saved_ground_slam: self.state.ground_slam_enabled,
        });
        self.state.ground_slam_enabled = false;
        self.timers.restart(TimerKey::OneWayPass, ONE_WAY_PASS_WINDOW);
        debug!("One-way platform disabled: body={:?}, below={}", hit.body, check_below);
    }

    /// Power-jump charge lapses and rising clears a pending duck.
    pub(super) fn clear_ground_ability_flags(&mut self) {
        self.state.power_jump_timer = 0.0;

        if self.state.move_direction.y > 0.0 && (self.state.is_ducking || self.state.is_creeping) {
            self.timers.restart(TimerKey::DuckClear, DUCK_CLEAR_DELAY);
        }
    }
}

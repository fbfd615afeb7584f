//! Movement domain: airborne handling, extra jumps, wall contact and gravity.

use bevy::prelude::*;

use super::timers::WALL_RUN_WINDOW;
use super::{Facing, MovementController, MovementEvent, Tick, TimerKey};
use crate::physics::{GroundType, PhysicsBackend};

/// Glide engages only once the character is no longer rising faster than this.
const GLIDE_ENTRY_SPEED: f32 = 0.2;

impl MovementController {
    pub(super) fn in_air<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        if self.state.coyote_time_counter > 0.0 && self.jump_requested() {
            self.jump(tick);
        }

        self.clear_ground_ability_flags();
        self.air_jump(tick);
        self.wall_run(tick);
        self.calculate_gravity(tick);

        if self.state.is_gliding && tick.input.y <= 0.0 {
            self.state.is_gliding = false;
        }
    }

    /// Short-hop on release, then double, triple, water and wall jumps on press.
    pub(super) fn air_jump<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        if self.state.release_jump {
            self.state.release_jump = false;
            self.state.move_direction.y *= 0.5;
        }

        if !self.state.start_jump {
            return;
        }
        self.state.start_jump = false;

        let contacts = &tick.contacts;
        let touching_wall = contacts.touching_wall();
        let mut acted = false;

        if self.profile.can_triple_jump
            && !touching_wall
            && self.state.is_double_jumping
            && !self.state.is_triple_jumping
        {
            self.events.push(MovementEvent::DoubleJump);
            self.state.move_direction.y = self.profile.double_jump_speed;
            self.state.is_triple_jumping = true;
            acted = true;
            debug!("Triple jump");
        }

        if self.profile.can_double_jump && !touching_wall && !self.state.is_double_jumping {
            self.events.push(MovementEvent::DoubleJump);
            self.state.move_direction.y = self.profile.double_jump_speed;
            self.state.is_double_jumping = true;
            acted = true;
            debug!("Double jump");
        }

        if contacts.is_in_water {
            self.state.is_double_jumping = false;
            self.state.is_triple_jumping = false;
            self.state.move_direction.y = self.profile.jump_speed;
            acted = true;
        }

        if self.profile.can_wall_jump && touching_wall && !contacts.wall_forbids_jump() {
            acted |= self.wall_jump(contacts.left, contacts.right);
        }

        if acted {
            self.state.jump_buffer_counter = 0.0;
        }
    }

    /// Launch away from the touched wall. Only pushes off when the current
    /// horizontal velocity is not already heading away from it.
    fn wall_jump(&mut self, left: bool, right: bool) -> bool {
        let x = self.state.move_direction.x;
        let (direction, facing) = if x <= 0.0 && left {
            (1.0, Facing::Right)
        } else if x >= 0.0 && right {
            (-1.0, Facing::Left)
        } else {
            return false;
        };

        self.state.move_direction.x = self.profile.wall_jump_speed_x * direction;
        self.state.move_direction.y = self.profile.wall_jump_speed_y;
        self.state.facing = facing;

        self.state.is_wall_jumping = true;
        self.state.in_air_control = false;
        self.timers
            .restart(TimerKey::WallJumpLockout, self.profile.wall_jump_delay);

        if self.profile.can_jump_after_wall_jump {
            self.state.is_double_jumping = false;
            self.state.is_triple_jumping = false;
        }

        debug!(
            "Wall jump: facing={:?}, lockout={}",
            facing, self.profile.wall_jump_delay
        );
        true
    }

    fn wall_run<B: PhysicsBackend>(&mut self, tick: &Tick<'_, B>) {
        let contacts = &tick.contacts;
        let touching_wall = contacts.touching_wall();

        if contacts.hit_wall_this_frame {
            self.clear_air_ability_flags();
        }

        if self.profile.can_wall_run && touching_wall {
            if contacts.wall_forbids_run() {
                return;
            }

            if tick.input.y > 0.0 && self.state.able_to_wall_run {
                self.state.move_direction.y = self.profile.wall_run_amount;

                if !self.state.is_wall_jumping {
                    if contacts.left {
                        self.state.facing = Facing::Left;
                    } else if contacts.right {
                        self.state.facing = Facing::Right;
                    }
                }

                self.state.is_wall_running = true;
                if self.timers.start_if_idle(TimerKey::WallRun, WALL_RUN_WINDOW) {
                    debug!("Wall run started");
                }
            }
        } else if self.profile.can_multiple_wall_run {
            self.timers.cancel(TimerKey::WallRun);
            self.state.able_to_wall_run = true;
            self.state.is_wall_running = false;
        }

        if touching_wall && self.profile.can_wall_run {
            self.state.current_glide_time = if self.profile.can_glide_after_wall_contact {
                self.profile.glide_time
            } else {
                0.0
            };
        }
    }

    /// First matching rule wins: head bump, wall slide, glide, ground slam,
    /// plain gravity.
    pub(super) fn calculate_gravity<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        let dt = tick.dt;
        let gravity = self.profile.gravity;

        if self.state.move_direction.y > 0.0 && tick.contacts.above {
            if tick.contacts.ceiling_type == GroundType::OneWayPlatform {
                self.disable_one_way_platform(tick, false);
            } else {
                self.state.move_direction.y = 0.0;
            }
        }

        let contacts = &tick.contacts;
        let direction = &mut self.state.move_direction;

        if self.profile.can_wall_slide && contacts.touching_wall() {
            if contacts.hit_wall_this_frame {
                direction.y = 0.0;
            }

            if direction.y <= 0.0 {
                let modifier = contacts.slide_modifier(self.profile.wall_slide_amount);
                direction.y -= gravity * modifier * dt;
                self.state.is_wall_sliding = true;
            } else {
                direction.y -= gravity * dt;
                self.state.is_wall_sliding = false;
            }
        } else if self.profile.can_glide && tick.input.y > 0.0 && direction.y < GLIDE_ENTRY_SPEED {
            if self.state.current_glide_time > 0.0 {
                self.state.is_gliding = true;
                if self.state.start_glide {
                    direction.y = 0.0;
                    self.state.start_glide = false;
                }
                direction.y -= self.profile.glide_descend_amount * dt;
                self.state.current_glide_time -= dt;
            } else {
                self.state.is_gliding = false;
                direction.y -= gravity * dt;
            }
        } else if self.state.is_ground_slamming && !self.state.is_power_jumping && direction.y < 0.0 {
            if !self.state.stomp_emitted {
                self.events.push(MovementEvent::Stomp);
                self.state.stomp_emitted = true;
                debug!("Ground slam");
            }
            direction.y = -self.profile.ground_slam_speed;
        } else if !self.state.is_dashing {
            direction.y -= gravity * dt;
            self.state.is_wall_sliding = false;
        }
    }
}

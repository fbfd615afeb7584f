//! Movement domain: mutable per-character movement state.

use bevy::prelude::*;

use crate::physics::BodyHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }
}

/// A one-way platform switched off so the character can pass through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OneWayPass {
    pub body: BodyHandle,
    /// Ground-slam gate as it was before the pass started.
    pub saved_ground_slam: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MovementState {
    /// Velocity the controller resolves every tick. Persists across ticks.
    pub move_direction: Vec2,
    pub facing: Facing,

    pub is_jumping: bool,
    pub is_double_jumping: bool,
    pub is_triple_jumping: bool,
    pub is_wall_jumping: bool,
    pub is_wall_running: bool,
    pub is_wall_sliding: bool,
    pub is_ducking: bool,
    pub is_creeping: bool,
    pub is_gliding: bool,
    pub is_power_jumping: bool,
    pub is_dashing: bool,
    pub is_ground_slamming: bool,
    pub is_swimming: bool,

    pub power_jump_timer: f32,
    pub current_glide_time: f32,
    pub coyote_time_counter: f32,
    pub jump_buffer_counter: f32,

    // Input latches
    pub start_jump: bool,
    pub release_jump: bool,
    pub hold_jump: bool,

    pub in_air_control: bool,
    pub able_to_wall_run: bool,
    pub start_glide: bool,
    /// Runtime copy of the ground-slam gate; one-way passes suspend it.
    pub ground_slam_enabled: bool,
    pub stomp_emitted: bool,

    /// Velocity carried into the tick the character touched down.
    pub landing_velocity: Vec2,
    pub jump_pad_adjustment: f32,

    pub one_way_pass: Option<OneWayPass>,
    pub deactivated_air_effector: Option<BodyHandle>,
}

impl MovementState {
    pub fn new(glide_time: f32, can_ground_slam: bool) -> Self {
        Self {
            move_direction: Vec2::ZERO,
            facing: Facing::Right,
            is_jumping: false,
            is_double_jumping: false,
            is_triple_jumping: false,
            is_wall_jumping: false,
            is_wall_running: false,
            is_wall_sliding: false,
            is_ducking: false,
            is_creeping: false,
            is_gliding: false,
            is_power_jumping: false,
            is_dashing: false,
            is_ground_slamming: false,
            is_swimming: false,
            power_jump_timer: 0.0,
            current_glide_time: glide_time,
            coyote_time_counter: 0.0,
            jump_buffer_counter: 0.0,
            start_jump: false,
            release_jump: false,
            hold_jump: false,
            in_air_control: true,
            able_to_wall_run: true,
            start_glide: true,
            ground_slam_enabled: can_ground_slam,
            stomp_emitted: false,
            landing_velocity: Vec2::ZERO,
            jump_pad_adjustment: 0.0,
            one_way_pass: None,
            deactivated_air_effector: None,
        }
    }
}

impl Default for MovementState {
    fn default() -> Self {
        Self::new(0.0, false)
    }
}

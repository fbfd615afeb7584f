//! Profile domain: tunable movement constants and ability gates.

mod loader;
mod validation;


pub use loader::{ProfileLoadError, load_profile, parse_profile};
pub use validation::{ValidationError, validate_profile};

use serde::{Deserialize, Serialize};

/// Which state the controller dispatches to when several apply at once.
///
/// `GroundFirst` is the current behaviour: being grounded wins over water and
/// air effectors. `WaterFirst` reproduces the earlier ordering where water was
/// checked before ground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum DispatchOrder {
    #[default]
    GroundFirst,
    WaterFirst,
}

/// Immutable movement configuration, shared by every character using it.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Profile {
    // Player properties
    pub walk_speed: f32,
    /// Fraction of the gap to the target horizontal speed closed per tick.
    pub acceleration_amount: f32,
    pub deceleration_amount: f32,
    pub creep_speed: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub double_jump_speed: f32,
    pub wall_jump_speed_x: f32,
    pub wall_jump_speed_y: f32,
    pub wall_run_amount: f32,
    pub wall_slide_amount: f32,
    pub glide_time: f32,
    pub glide_descend_amount: f32,
    pub power_jump_speed: f32,
    pub power_jump_wait_time: f32,
    pub dash_speed: f32,
    pub dash_time: f32,
    pub dash_cooldown_time: f32,
    pub ground_slam_speed: f32,
    pub deadzone: f32,
    pub swim_speed: f32,
    pub wall_jump_delay: f32,
    pub coyote_time: f32,
    pub jump_buffer_time: f32,

    // Ability toggles
    pub can_double_jump: bool,
    pub can_triple_jump: bool,
    pub can_wall_jump: bool,
    pub can_jump_after_wall_jump: bool,
    pub can_wall_run: bool,
    pub can_multiple_wall_run: bool,
    pub can_wall_slide: bool,
    pub can_glide: bool,
    pub can_glide_after_wall_contact: bool,
    pub can_power_jump: bool,
    pub can_ground_dash: bool,
    pub can_air_dash: bool,
    pub can_ground_slam: bool,
    pub can_swim: bool,

    pub dispatch_order: DispatchOrder,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            walk_speed: 10.0,
            acceleration_amount: 1.0,
            deceleration_amount: 1.0,
            creep_speed: 5.0,
            gravity: 20.0,
            jump_speed: 15.0,
            double_jump_speed: 10.0,
            wall_jump_speed_x: 15.0,
            wall_jump_speed_y: 15.0,
            wall_run_amount: 8.0,
            wall_slide_amount: 0.1,
            glide_time: 2.0,
            glide_descend_amount: 2.0,
            power_jump_speed: 40.0,
            power_jump_wait_time: 1.5,
            dash_speed: 20.0,
            dash_time: 0.2,
            dash_cooldown_time: 1.0,
            ground_slam_speed: 60.0,
            deadzone: 0.15,
            swim_speed: 150.0,
            wall_jump_delay: 0.4,
            coyote_time: 0.2,
            jump_buffer_time: 0.2,
            can_double_jump: false,
            can_triple_jump: false,
            can_wall_jump: false,
            can_jump_after_wall_jump: false,
            can_wall_run: false,
            can_multiple_wall_run: false,
            can_wall_slide: false,
            can_glide: false,
            can_glide_after_wall_contact: false,
            can_power_jump: false,
            can_ground_dash: false,
            can_air_dash: false,
            can_ground_slam: false,
            can_swim: false,
            dispatch_order: DispatchOrder::GroundFirst,
        }
    }
}

impl Profile {
    /// Every ability enabled, the rest left at defaults. Handy for sandboxes.
    pub fn all_abilities() -> Self {
        Self {
            can_double_jump: true,
            can_triple_jump: true,
            can_wall_jump: true,
            can_jump_after_wall_jump: true,
            can_wall_run: true,
            can_multiple_wall_run: true,
            can_wall_slide: true,
            can_glide: true,
            can_glide_after_wall_contact: true,
            can_power_jump: true,
            can_ground_dash: true,
            can_air_dash: true,
            can_ground_slam: true,
            can_swim: true,
            ..Self::default()
        }
    }

    /// Apex height of a ground jump: h = v² / (2g)
    pub fn single_jump_height(&self) -> f32 {
        self.jump_speed * self.jump_speed / (2.0 * self.gravity)
    }

    /// Number of extra jumps available in the air.
    pub fn air_jump_count(&self) -> u8 {
        match (self.can_double_jump, self.can_triple_jump) {
            (true, true) => 2,
            (true, false) => 1,
            _ => 0,
        }
    }
}

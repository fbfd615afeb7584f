//! Validation for profile tunables.

use super::Profile;

/// A validation error naming the offending field.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub field: &'static str,
    pub value: f32,
    pub reason: &'static str,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Profile field '{}' has invalid value {}: {}",
            self.field, self.value, self.reason
        )
    }
}

impl std::error::Error for ValidationError {}

/// Helper macro for checking a field is not negative
macro_rules! check_non_negative {
    ($errors:expr, $profile:expr, $($field:ident),+ $(,)?) => {
        $(
            if !($profile.$field >= 0.0) {
                $errors.push(ValidationError {
                    field: stringify!($field),
                    value: $profile.$field,
                    reason: "must be a non-negative number",
                });
            }
        )+
    };
}

/// Validate all tunables in a profile.
/// Returns a list of validation errors, empty if the profile is usable.
pub fn validate_profile(profile: &Profile) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_non_negative!(
        errors,
        profile,
        walk_speed,
        creep_speed,
        gravity,
        jump_speed,
        double_jump_speed,
        wall_jump_speed_x,
        wall_jump_speed_y,
        wall_run_amount,
        wall_slide_amount,
        glide_time,
        glide_descend_amount,
        power_jump_speed,
        power_jump_wait_time,
        dash_speed,
        dash_time,
        dash_cooldown_time,
        ground_slam_speed,
        swim_speed,
        wall_jump_delay,
        coyote_time,
        jump_buffer_time,
    );

    if !(0.0..1.0).contains(&profile.deadzone) {
        errors.push(ValidationError {
            field: "deadzone",
            value: profile.deadzone,
            reason: "must lie in [0, 1)",
        });
    }

    for (field, value) in [
        ("acceleration_amount", profile.acceleration_amount),
        ("deceleration_amount", profile.deceleration_amount),
    ] {
        if !(value > 0.0 && value <= 1.0) {
            errors.push(ValidationError {
                field,
                value,
                reason: "must lie in (0, 1]",
            });
        }
    }

    errors
}

//! Movement domain: per-tick input events.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Reflect)]
pub enum JumpSignal {
    Pressed,
    Held,
    Released,
}

/// Everything the host delivers for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct InputFrame {
    pub movement: Vec2,
    /// `None` keeps the jump latches as they were.
    pub jump: Option<JumpSignal>,
    pub dash: bool,
    pub attack: bool,
}

impl InputFrame {
    pub fn moving(movement: Vec2) -> Self {
        Self {
            movement,
            ..default()
        }
    }

    pub fn with_movement(mut self, movement: Vec2) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_jump(mut self, signal: JumpSignal) -> Self {
        self.jump = Some(signal);
        self
    }

    pub fn with_dash(mut self) -> Self {
        self.dash = true;
        self
    }

    pub fn with_attack(mut self) -> Self {
        self.attack = true;
        self
    }
}

/// Zero each axis whose magnitude is inside the deadzone.
pub fn apply_deadzone(axis: Vec2, deadzone: f32) -> Vec2 {
    let filter = |value: f32| if value.abs() < deadzone { 0.0 } else { value };
    Vec2::new(filter(axis.x), filter(axis.y))
}

//! Platforms domain: waypoint-following and collapsing platforms.
//!
//! Both expose `difference`, the position delta of the last tick, which the
//! probe reads as the platform's velocity when a character stands on it.


use bevy::prelude::*;

/// Distance at which a moving platform counts as having reached a waypoint.
pub const WAYPOINT_TOLERANCE: f32 = 0.1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    NoWaypoints,
}

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlatformError::NoWaypoints => write!(f, "moving platform needs at least one waypoint"),
        }
    }
}

impl std::error::Error for PlatformError {}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct MovingPlatform {
    waypoints: Vec<Vec2>,
    pub move_speed: f32,
    current: usize,
    position: Vec2,
    difference: Vec2,
}

impl MovingPlatform {
    /// Starts at `position`, heading for the first waypoint.
    pub fn new(position: Vec2, waypoints: Vec<Vec2>, move_speed: f32) -> Result<Self, PlatformError> {
        if waypoints.is_empty() {
            return Err(PlatformError::NoWaypoints);
        }
        Ok(Self {
            waypoints,
            move_speed,
            current: 0,
            position,
            difference: Vec2::ZERO,
        })
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn difference(&self) -> Vec2 {
        self.difference
    }

    pub fn target(&self) -> Vec2 {
        self.waypoints[self.current]
    }

    pub fn target_index(&self) -> usize {
        self.current
    }

    pub fn advance(&mut self, dt: f32) {
        let last_position = self.position;
        self.position = move_towards(self.position, self.target(), self.move_speed * dt);

        if self.position.distance(self.target()) < WAYPOINT_TOLERANCE {
            self.current = (self.current + 1) % self.waypoints.len();
        }

        self.difference = self.position - last_position;
    }
}

/// Step from `current` toward `target` by at most `max_delta`, never past it.
fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let to_target = target - current;
    let distance = to_target.length();
    if distance <= max_delta || distance == 0.0 {
        target
    } else {
        current + to_target / distance * max_delta
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum CollapseState {
    #[default]
    Idle,
    /// Counting down before it gives way.
    CollapseScheduled,
    Falling,
    /// Came to rest. Static from here on.
    Settled,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct CollapsingPlatform {
    pub delay_time: f32,
    pub fall_speed: f32,
    pub mass: f32,
    pub gravity: f32,
    state: CollapseState,
    delay_remaining: f32,
    position: Vec2,
    velocity: Vec2,
    difference: Vec2,
}

impl CollapsingPlatform {
    pub fn new(position: Vec2) -> Self {
        Self {
            delay_time: 0.5,
            fall_speed: 10.0,
            mass: 1000.0,
            gravity: 9.81,
            state: CollapseState::Idle,
            delay_remaining: 0.0,
            position,
            velocity: Vec2::ZERO,
            difference: Vec2::ZERO,
        }
    }

    pub fn with_delay(mut self, delay_time: f32) -> Self {
        self.delay_time = delay_time;
        self
    }

    pub fn state(&self) -> CollapseState {
        self.state
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn difference(&self) -> Vec2 {
        self.difference
    }

    /// Begin the collapse sequence. Ignored unless idle.
    pub fn collapse(&mut self) {
        if self.state == CollapseState::Idle {
            self.state = CollapseState::CollapseScheduled;
            self.delay_remaining = self.delay_time;
            debug!("Platform collapse scheduled: delay={}", self.delay_time);
        }
    }

    /// Advance one tick. `support` is the free distance below the platform,
    /// `None` when nothing is underneath.
    pub fn advance(&mut self, dt: f32, support: Option<f32>) {
        let last_position = self.position;

        match self.state {
            CollapseState::Idle | CollapseState::Settled => {}
            CollapseState::CollapseScheduled => {
                self.delay_remaining -= dt;
                if self.delay_remaining <= 0.0 {
                    self.state = CollapseState::Falling;
                    debug!("Platform falling");
                }
            }
            CollapseState::Falling => {
                self.velocity.y -= (self.gravity + self.fall_speed / self.mass) * dt;

                let step = -self.velocity.y * dt;
                match support {
                    Some(free) if free <= step => {
                        self.position.y -= free.max(0.0);
                        self.velocity = Vec2::ZERO;
                    }
                    _ => self.position.y -= step,
                }

                if self.velocity.y == 0.0 {
                    self.state = CollapseState::Settled;
                    debug!("Platform settled: position={:?}", self.position);
                }
            }
        }

        self.difference = self.position - last_position;
    }
}

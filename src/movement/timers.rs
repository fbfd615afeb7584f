//! Movement domain: cancellable timers keyed by purpose.

use std::collections::BTreeMap;

/// Fixed window lengths not exposed through the profile.
pub const WALL_RUN_WINDOW: f32 = 0.5;
pub const POWER_JUMP_WINDOW: f32 = 0.8;
pub const ONE_WAY_PASS_WINDOW: f32 = 0.5;
pub const DUCK_CLEAR_DELAY: f32 = 0.05;
pub const AIR_EFFECTOR_DEACTIVATION: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    Dash,
    DashCooldown,
    PowerJump,
    WallJumpLockout,
    WallRun,
    DuckClear,
    OneWayPass,
    AirEffectorDeactivation,
}

/// At most one pending timer per key. Expired keys come back from
/// [`Timers::tick`] in key order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Timers {
    pending: BTreeMap<TimerKey, f32>,
}

impl Timers {
    /// Start `key`, replacing any pending run.
    pub fn restart(&mut self, key: TimerKey, duration: f32) {
        self.pending.insert(key, duration);
    }

    /// Start `key` unless it is already running.
    pub fn start_if_idle(&mut self, key: TimerKey, duration: f32) -> bool {
        if self.pending.contains_key(&key) {
            return false;
        }
        self.pending.insert(key, duration);
        true
    }

    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.pending.remove(&key).is_some()
    }

    pub fn is_running(&self, key: TimerKey) -> bool {
        self.pending.contains_key(&key)
    }

    pub fn remaining(&self, key: TimerKey) -> Option<f32> {
        self.pending.get(&key).copied()
    }

    /// Count every timer down by `dt` and return the ones that ran out.
    pub fn tick(&mut self, dt: f32) -> Vec<TimerKey> {
        let mut expired = Vec::new();
        for (key, remaining) in self.pending.iter_mut() {
            *remaining -= dt;
            if *remaining <= 0.0 {
                expired.push(*key);
            }
        }
        for key in &expired {
            self.pending.remove(key);
        }
        expired
    }
}

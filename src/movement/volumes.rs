//! Movement domain: air effector and water volumes.

use bevy::prelude::*;

use super::timers::AIR_EFFECTOR_DEACTIVATION;
use super::{MovementController, Tick, TimerKey};
use crate::physics::{AirEffectorType, BodyHandle, PhysicsBackend};

/// Upward velocity regained per tick while sinking without input.
const BUOYANCY_DAMPING: f32 = 2.0;
/// Rate at which a tractor beam bleeds off vertical velocity.
const TRACTOR_BEAM_DAMPING: f32 = 4.0;

impl MovementController {
    pub(super) fn in_air_effector<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        if self.state.start_jump {
            self.deactivate_air_effector(tick);
            self.jump(tick);
        }

        let Some(effector) = tick.contacts.air_effector else {
            return;
        };

        match effector.kind {
            AirEffectorType::Ladder => {
                self.state.move_direction.y = if tick.input.y > 0.0 {
                    effector.speed
                } else if tick.input.y < 0.0 {
                    -effector.speed
                } else {
                    0.0
                };
            }
            AirEffectorType::TractorBeam => {
                let y = self.state.move_direction.y;
                if y != 0.0 {
                    let t = (tick.dt * TRACTOR_BEAM_DAMPING).clamp(0.0, 1.0);
                    self.state.move_direction.y = y * (1.0 - t);
                }
            }
            AirEffectorType::Updraft => {
                if tick.input.y <= 0.0 {
                    self.state.is_gliding = false;
                }
                if self.state.is_gliding {
                    self.state.move_direction.y = effector.speed;
                } else {
                    self.in_air(tick);
                }
            }
            AirEffectorType::None => {}
        }
    }

    pub(super) fn in_water<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        self.clear_ground_ability_flags();
        self.air_jump(tick);

        let input_y = tick.input.y;
        let submerged = tick.contacts.is_submerged;
        let can_swim = self.profile.can_swim;

        if input_y != 0.0 && can_swim && !self.state.hold_jump {
            self.state.move_direction.y = if input_y > 0.0 && !submerged {
                // Hold at the surface
                0.0
            } else {
                input_y * self.profile.swim_speed * tick.dt
            };
        } else if self.state.move_direction.y < 0.0 && input_y == 0.0 {
            self.state.move_direction.y += BUOYANCY_DAMPING;
        }

        self.state.is_swimming = submerged && can_swim;
    }

    /// Switch the current air effector off for a short window so a jump can
    /// carry the character out of it.
    fn deactivate_air_effector<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        if let Some(effector) = tick.contacts.air_effector {
            self.deactivate_effector_body(tick, effector.body);
        }
    }

    fn deactivate_effector_body<B: PhysicsBackend>(
        &mut self,
        tick: &mut Tick<'_, B>,
        body: BodyHandle,
    ) {
        match self.state.deactivated_air_effector.replace(body) {
            Some(previous) if previous != body => {
                tick.backend.set_collision_enabled(previous, true);
            }
            _ => {}
        }
        tick.backend.set_collision_enabled(body, false);
        self.timers
            .restart(TimerKey::AirEffectorDeactivation, AIR_EFFECTOR_DEACTIVATION);
        debug!("Air effector deactivated: body={:?}", body);
    }

    /// Leaving an effector volume deactivates it for the same short window.
    pub(super) fn track_air_effector_exit<B: PhysicsBackend>(&mut self, tick: &mut Tick<'_, B>) {
        let current = tick.contacts.air_effector.map(|contact| contact.body);
        let previous = std::mem::replace(&mut self.last_air_effector, current);

        match previous {
            Some(body)
                if current != Some(body) && self.state.deactivated_air_effector != Some(body) =>
            {
                self.deactivate_effector_body(tick, body);
            }
            _ => {}
        }
    }
}

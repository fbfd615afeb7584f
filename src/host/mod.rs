//! Host domain: binds the movement core to bevy and avian2d.
//!
//! Keyboard input is sampled every frame and latched on [`MotorInput`].
//! Platforms and characters advance in `FixedUpdate`, which runs before
//! avian's own step.

mod backend;
mod components;
#[cfg(feature = "dev-tools")]
mod dev;
mod systems;


pub use backend::{AvianBackend, BackendRequests, BodyIndex, shape_collider};
pub use components::{
    Effectors, GameLayer, Motor, MotorInput, PlayerControlled, WATER_DAMPING, collider_for,
    damping_for, motor_character, surface, volume,
};
#[cfg(feature = "dev-tools")]
pub use dev::{MotorDevPlugin, ProbeOverlay};
pub use systems::{PendingCollapses, TELEPORT_LIFT, TELEPORT_REACH, teleport_aim};

use std::path::PathBuf;
use std::sync::Arc;

use bevy::prelude::*;

use crate::movement::MovementNotification;
use crate::profile::{Profile, load_profile, validate_profile};

/// The profile every character spawned by the host shares.
#[derive(Resource, Debug, Clone)]
pub struct MotorProfile(pub Arc<Profile>);

/// Ordering of the fixed-step host systems.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum MotorSet {
    Platforms,
    Index,
    Characters,
}

#[derive(Debug, Default, Clone)]
pub struct MotorPlugin {
    /// RON (or `.json`) profile to load. `None` uses [`Profile::default`].
    pub profile_path: Option<PathBuf>,
}

impl MotorPlugin {
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            profile_path: Some(path.into()),
        }
    }

    fn resolve_profile(&self) -> Profile {
        let Some(path) = &self.profile_path else {
            return Profile::default();
        };

        let profile = match load_profile(path) {
            Ok(profile) => profile,
            Err(e) => {
                error!("{}", e);
                return Profile::default();
            }
        };

        let errors = validate_profile(&profile);
        if errors.is_empty() {
            info!("Loaded movement profile from {}", path.display());
            return profile;
        }
        for error in &errors {
            warn!("{}", error);
        }
        warn!(
            "Profile {} has {} invalid field(s), using defaults",
            path.display(),
            errors.len()
        );
        Profile::default()
    }
}

impl Plugin for MotorPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(MotorProfile(Arc::new(self.resolve_profile())))
            .init_resource::<BodyIndex>()
            .init_resource::<PendingCollapses>()
            .add_message::<MovementNotification>()
            .configure_sets(
                FixedUpdate,
                (MotorSet::Platforms, MotorSet::Index, MotorSet::Characters).chain(),
            )
            .add_systems(Update, systems::sample_keyboard)
            .add_systems(
                FixedUpdate,
                (
                    systems::advance_platforms.in_set(MotorSet::Platforms),
                    systems::index_bodies.in_set(MotorSet::Index),
                    (systems::aim_teleports, systems::tick_characters)
                        .chain()
                        .in_set(MotorSet::Characters),
                ),
            );

        #[cfg(feature = "dev-tools")]
        app.add_plugins(dev::MotorDevPlugin);
    }
}

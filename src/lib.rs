//! 2D platformer character movement: a physics-agnostic controller core plus
//! a bevy/avian2d host.

pub mod character;
pub mod headless;
pub mod host;
pub mod integrator;
pub mod movement;
pub mod physics;
pub mod platforms;
pub mod probe;
pub mod profile;
pub mod teleport;

pub use character::Character;
pub use host::{MotorPlugin, MotorProfile};
pub use movement::{InputFrame, JumpSignal, MovementController, MovementEvent};
pub use profile::Profile;
pub use teleport::TeleportTarget;

//! Movement domain: one-shot notifications for presentation layers.

use bevy::ecs::message::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementEvent {
    /// Fired for both the double and the triple jump.
    DoubleJump,
    PowerJump,
    Stomp,
    DashStarted,
}

/// Event fired for each notification a character produced this tick
#[derive(Debug, Clone, Copy)]
pub struct MovementNotification {
    pub entity: bevy::prelude::Entity,
    pub event: MovementEvent,
}

impl Message for MovementNotification {}

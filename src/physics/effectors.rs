//! Effector data: typed attributes attached to surfaces and volumes.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum GroundType {
    #[default]
    None,
    LevelGeometry,
    OneWayPlatform,
    MovingPlatform,
    CollapsablePlatform,
    JumpPad,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum WallType {
    #[default]
    None,
    Normal,
    Sticky,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum AirEffectorType {
    #[default]
    None,
    Ladder,
    Updraft,
    TractorBeam,
}

/// Marks a surface as a specific kind of ground.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct GroundEffector {
    pub ground_type: GroundType,
}

impl GroundEffector {
    pub fn new(ground_type: GroundType) -> Self {
        Self { ground_type }
    }
}

/// Per-wall behaviour overrides.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct WallEffector {
    pub wall_type: WallType,
    pub runnable: bool,
    pub jumpable: bool,
    /// Fraction of gravity applied while sliding down this wall.
    pub slide_amount: f32,
}

impl Default for WallEffector {
    fn default() -> Self {
        Self {
            wall_type: WallType::Normal,
            runnable: true,
            jumpable: true,
            slide_amount: 0.1,
        }
    }
}

/// Bouncy ground. Implies [`GroundType::JumpPad`].
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct JumpPad {
    pub amount: f32,
    pub upper_limit: f32,
}

impl Default for JumpPad {
    fn default() -> Self {
        Self {
            amount: 15.0,
            upper_limit: 30.0,
        }
    }
}

/// Trigger volume changing vertical motion (ladders, updrafts, tractor beams).
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
pub struct AirEffector {
    pub kind: AirEffectorType,
    pub speed: f32,
    /// The volume's local up, in world space.
    pub direction: Vec2,
}

impl AirEffector {
    pub fn new(kind: AirEffectorType, speed: f32) -> Self {
        Self {
            kind,
            speed,
            direction: Vec2::Y,
        }
    }
}

/// Buoyancy volume. Entering one switches the character to force-based motion.
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct WaterVolume;

/// Per-tick position delta of a platform, read by riders as velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Reflect)]
pub struct PlatformMotion {
    pub difference: Vec2,
}

/// Everything attached to one body. Backends build this per lookup.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EffectorSet {
    pub ground: Option<GroundEffector>,
    pub wall: Option<WallEffector>,
    pub jump_pad: Option<JumpPad>,
    pub air: Option<AirEffector>,
    pub water: Option<WaterVolume>,
    pub platform: Option<PlatformMotion>,
}

/// A typed view selected out of an [`EffectorSet`].
pub trait Capability: Sized {
    fn select(effectors: &EffectorSet) -> Option<Self>;
}

impl Capability for GroundEffector {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.ground.or_else(|| {
            effectors
                .jump_pad
                .map(|_| GroundEffector::new(GroundType::JumpPad))
        })
    }
}

impl Capability for WallEffector {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.wall
    }
}

impl Capability for JumpPad {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.jump_pad
    }
}

impl Capability for AirEffector {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.air
    }
}

impl Capability for WaterVolume {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.water
    }
}

impl Capability for PlatformMotion {
    fn select(effectors: &EffectorSet) -> Option<Self> {
        effectors.platform
    }
}

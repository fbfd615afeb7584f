//! Headless backend: axis-aligned boxes, axis-aligned casts.
//!
//! Capsules are treated as their bounding boxes. Good enough for
//! deterministic replays and the test-suite; the ECS host uses avian2d.

use bevy::prelude::*;

use super::{
    BodyHandle, CastHit, CastShape, CharacterBody, CharacterCollider, EffectorSet, PhysicsBackend,
    QueryFilter,
};

/// Tolerance for boundary contacts.
const EPSILON: f32 = 1e-4;
/// Gap left between a swept body and whatever stopped it.
const SKIN: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq)]
pub struct AabbBody {
    pub center: Vec2,
    pub half_extents: Vec2,
    pub layers: u32,
    pub enabled: bool,
    /// Only blocks things coming from above.
    pub one_way: bool,
    /// Normal reported for hits on the top face. Lets a flat box stand in
    /// for a ramp when testing slope handling.
    pub top_normal: Option<Vec2>,
    pub effectors: EffectorSet,
}

impl AabbBody {
    pub fn new(center: Vec2, size: Vec2, layers: u32) -> Self {
        Self {
            center,
            half_extents: size * 0.5,
            layers,
            enabled: true,
            one_way: false,
            top_normal: None,
            effectors: EffectorSet::default(),
        }
    }

    pub fn with_effectors(mut self, effectors: EffectorSet) -> Self {
        self.effectors = effectors;
        self
    }

    pub fn one_way(mut self) -> Self {
        self.one_way = true;
        self
    }

    pub fn with_top_normal(mut self, normal: Vec2) -> Self {
        self.top_normal = Some(normal.normalize_or_zero());
        self
    }

    pub fn min(&self) -> Vec2 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec2 {
        self.center + self.half_extents
    }

    pub fn top(&self) -> f32 {
        self.center.y + self.half_extents.y
    }
}

#[derive(Debug, Default)]
pub struct AabbWorld {
    bodies: Vec<AabbBody>,
    collapse_signals: Vec<BodyHandle>,
}

impl AabbWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_body(&mut self, body: AabbBody) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle((self.bodies.len() - 1) as u64)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&AabbBody> {
        self.bodies.get(handle.0 as usize)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut AabbBody> {
        self.bodies.get_mut(handle.0 as usize)
    }

    pub fn set_center(&mut self, handle: BodyHandle, center: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.center = center;
        }
    }

    pub fn set_platform_motion(&mut self, handle: BodyHandle, difference: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            body.effectors.platform = Some(super::PlatformMotion { difference });
        }
    }

    /// Collapse requests received since the last call.
    pub fn take_collapse_signals(&mut self) -> Vec<BodyHandle> {
        std::mem::take(&mut self.collapse_signals)
    }

    fn candidates<'a>(
        &'a self,
        filter: &'a QueryFilter,
    ) -> impl Iterator<Item = (BodyHandle, &'a AabbBody)> + 'a {
        self.bodies
            .iter()
            .enumerate()
            .map(|(index, body)| (BodyHandle(index as u64), body))
            .filter(move |(handle, body)| {
                body.enabled && body.layers & filter.mask != 0 && filter.exclude != Some(*handle)
            })
    }

    fn cast_box(
        &self,
        half_extents: Vec2,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
        ignore_penetrating: bool,
    ) -> Option<CastHit> {
        let dir = direction.as_vec2();
        let mut best: Option<CastHit> = None;

        for (handle, body) in self.candidates(filter) {
            let min = body.min() - half_extents;
            let max = body.max() + half_extents;

            // One-way bodies only catch things moving down from above
            if body.one_way {
                let bottom = origin.y - half_extents.y;
                if dir.y >= 0.0 && ignore_penetrating {
                    continue;
                }
                if dir.y < 0.0 && bottom < body.top() - EPSILON {
                    continue;
                }
            }

            if ignore_penetrating && strictly_inside(origin, min, max) {
                continue;
            }

            let Some((distance, normal)) = slab_cast(origin, dir, max_distance, min, max) else {
                continue;
            };

            let normal = match body.top_normal {
                Some(top) if normal.y > 0.5 => top,
                _ => normal,
            };

            if best.is_none_or(|hit| distance < hit.distance) {
                best = Some(CastHit {
                    body: handle,
                    distance,
                    normal,
                });
            }
        }

        best
    }

    /// Move a box of `size` from `from` by `delta`, stopping at solid bodies.
    /// Resolves x then y. Returns the new centre.
    pub fn sweep(&self, size: Vec2, from: Vec2, delta: Vec2, filter: &QueryFilter) -> Vec2 {
        let half = size * 0.5;
        let mut position = from;

        for axis in [Vec2::X, Vec2::Y] {
            let amount = delta.dot(axis);
            if amount.abs() <= f32::EPSILON {
                continue;
            }
            let Ok(direction) = Dir2::new(axis * amount.signum()) else {
                continue;
            };

            let travel = match self.cast_box(half, position, direction, amount.abs(), filter, true)
            {
                Some(hit) => (hit.distance - SKIN).max(0.0),
                None => amount.abs(),
            };
            position += direction.as_vec2() * travel;
        }

        position
    }
}

impl PhysicsBackend for AabbWorld {
    fn cast_shape(
        &self,
        shape: CastShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit> {
        self.cast_box(
            shape.size() * 0.5,
            origin,
            direction,
            max_distance,
            filter,
            false,
        )
    }

    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit> {
        self.cast_box(Vec2::ZERO, origin, direction, max_distance, filter, false)
    }

    fn overlapping(
        &self,
        shape: CastShape,
        origin: Vec2,
        filter: &QueryFilter,
    ) -> Vec<BodyHandle> {
        let half = shape.size() * 0.5;
        self.candidates(filter)
            .filter(|(_, body)| {
                let min = body.min() - half;
                let max = body.max() + half;
                strictly_inside(origin, min, max)
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    fn containing_point(&self, point: Vec2, filter: &QueryFilter) -> Vec<BodyHandle> {
        self.candidates(filter)
            .filter(|(_, body)| {
                point.cmpge(body.min()).all() && point.cmple(body.max()).all()
            })
            .map(|(handle, _)| handle)
            .collect()
    }

    fn effectors(&self, body: BodyHandle) -> EffectorSet {
        self.body(body)
            .map(|body| body.effectors)
            .unwrap_or_default()
    }

    fn set_collision_enabled(&mut self, body: BodyHandle, enabled: bool) {
        if let Some(body) = self.body_mut(body) {
            body.enabled = enabled;
        }
    }

    fn signal_collapse(&mut self, body: BodyHandle) {
        self.collapse_signals.push(body);
    }
}

fn strictly_inside(point: Vec2, min: Vec2, max: Vec2) -> bool {
    point.x > min.x + EPSILON
        && point.x < max.x - EPSILON
        && point.y > min.y + EPSILON
        && point.y < max.y - EPSILON
}

/// Slab test of a ray against a box. Returns entry distance and entry normal.
/// A ray starting on or inside the box hits at zero, unless it is leaving.
fn slab_cast(origin: Vec2, dir: Vec2, max_distance: f32, min: Vec2, max: Vec2) -> Option<(f32, Vec2)> {
    let mut t_enter = 0.0_f32;
    let mut t_exit = max_distance;
    let mut normal = Vec2::ZERO;

    for axis in 0..2 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (min[axis], max[axis]);

        if d.abs() < EPSILON {
            // Grazing a face is not a hit
            if o <= lo + EPSILON || o >= hi - EPSILON {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let (t1, t2) = {
            let a = (lo - o) * inv;
            let b = (hi - o) * inv;
            if a <= b { (a, b) } else { (b, a) }
        };

        if t1 > t_enter {
            t_enter = t1;
            normal = Vec2::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t2);

        if t_enter > t_exit || t2 <= EPSILON {
            return None;
        }
    }

    if normal == Vec2::ZERO {
        normal = -dir;
    }

    Some((t_enter, normal))
}

/// Headless stand-in for the character's rigid body.
#[derive(Debug, Clone, PartialEq)]
pub struct SimBody {
    pub handle: BodyHandle,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: Vec2,
    /// Collider centre relative to `position`.
    pub offset: Vec2,
    pub mass: f32,
    /// Fraction of velocity lost per second while forces drive the body.
    pub linear_damping: f32,
    pub mask: u32,
    force: Vec2,
}

impl SimBody {
    pub fn new(handle: BodyHandle, position: Vec2, size: Vec2, mask: u32) -> Self {
        Self {
            handle,
            position,
            velocity: Vec2::ZERO,
            size,
            offset: Vec2::ZERO,
            mass: 1.0,
            linear_damping: 1.0,
            mask,
            force: Vec2::ZERO,
        }
    }

    pub fn pending_force(&self) -> Vec2 {
        self.force
    }

    /// Integrate accumulated force and velocity for one step, then clear it.
    pub fn integrate_dynamics(&mut self, world: &AabbWorld, dt: f32) {
        if self.force == Vec2::ZERO && self.velocity == Vec2::ZERO {
            return;
        }
        self.velocity += self.force / self.mass * dt;
        self.velocity *= (1.0 - self.linear_damping * dt).max(0.0);
        self.force = Vec2::ZERO;

        let delta = self.velocity * dt;
        self.sweep(world, delta);
    }

    pub fn set_collider(&mut self, collider: &CharacterCollider) {
        self.size = collider.size;
        self.offset = collider.offset;
    }

    fn sweep(&mut self, world: &AabbWorld, delta: Vec2) {
        let filter = QueryFilter::from_mask(self.mask).excluding(self.handle);
        let center = self.position + self.offset;
        self.position = world.sweep(self.size, center, delta, &filter) - self.offset;
    }
}

/// A [`SimBody`] paired with the world it collides against.
pub struct SweptBody<'w> {
    pub world: &'w AabbWorld,
    pub body: &'w mut SimBody,
}

impl CharacterBody for SweptBody<'_> {
    fn position(&self) -> Vec2 {
        self.body.position
    }

    fn move_position(&mut self, target: Vec2) {
        let delta = target - self.body.position;
        self.body.sweep(self.world, delta);
    }

    fn set_position(&mut self, position: Vec2) {
        self.body.position = position;
    }

    fn velocity(&self) -> Vec2 {
        self.body.velocity
    }

    fn set_velocity(&mut self, velocity: Vec2) {
        self.body.velocity = velocity;
    }

    fn add_force(&mut self, force: Vec2) {
        self.body.force += force;
    }
}

//! Host domain: the movement core's physics backend over avian spatial queries.

use std::collections::HashMap;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::physics::{BodyHandle, CastHit, CastShape, EffectorSet, PhysicsBackend, QueryFilter};

#[derive(Debug, Clone, Copy)]
struct IndexedBody {
    entity: Entity,
    effectors: EffectorSet,
}

/// Maps backend handles to entities and caches each body's effectors.
#[derive(Resource, Debug, Default)]
pub struct BodyIndex {
    bodies: HashMap<BodyHandle, IndexedBody>,
}

impl BodyIndex {
    pub fn insert(&mut self, entity: Entity, effectors: EffectorSet) -> BodyHandle {
        let handle = BodyHandle::from(entity);
        self.bodies.insert(handle, IndexedBody { entity, effectors });
        handle
    }

    pub fn remove(&mut self, entity: Entity) {
        self.bodies.remove(&BodyHandle::from(entity));
    }

    pub fn entity(&self, handle: BodyHandle) -> Option<Entity> {
        self.bodies.get(&handle).map(|body| body.entity)
    }

    pub fn effectors(&self, handle: BodyHandle) -> EffectorSet {
        self.bodies
            .get(&handle)
            .map(|body| body.effectors)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

/// Side effects a tick asked for. Applied through `Commands` afterwards.
#[derive(Debug, Default)]
pub struct BackendRequests {
    pub toggles: Vec<(BodyHandle, bool)>,
    pub collapses: Vec<BodyHandle>,
}

pub struct AvianBackend<'a, 'w, 's> {
    spatial: &'a SpatialQuery<'w, 's>,
    index: &'a BodyIndex,
    requests: BackendRequests,
}

impl<'a, 'w, 's> AvianBackend<'a, 'w, 's> {
    pub fn new(spatial: &'a SpatialQuery<'w, 's>, index: &'a BodyIndex) -> Self {
        Self {
            spatial,
            index,
            requests: BackendRequests::default(),
        }
    }

    pub fn into_requests(self) -> BackendRequests {
        self.requests
    }

    fn filter(&self, filter: &QueryFilter) -> SpatialQueryFilter {
        let spatial = SpatialQueryFilter::from_mask(LayerMask(filter.mask));
        match filter.exclude.and_then(|body| self.index.entity(body)) {
            Some(entity) => spatial.with_excluded_entities([entity]),
            None => spatial,
        }
    }
}

/// Avian collider matching a query shape.
pub fn shape_collider(shape: CastShape) -> Collider {
    match shape {
        CastShape::Box { size } => Collider::rectangle(size.x, size.y),
        CastShape::Capsule { size } => {
            let radius = size.x * 0.5;
            Collider::capsule(radius, (size.y - size.x).max(0.0))
        }
    }
}

impl PhysicsBackend for AvianBackend<'_, '_, '_> {
    fn cast_shape(
        &self,
        shape: CastShape,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit> {
        let collider = shape_collider(shape);
        let config = ShapeCastConfig::from_max_distance(max_distance);
        self.spatial
            .cast_shape(&collider, origin, 0.0, direction, &config, &self.filter(filter))
            .map(|hit| CastHit {
                body: BodyHandle::from(hit.entity),
                distance: hit.distance,
                normal: hit.normal1,
            })
    }

    fn cast_ray(
        &self,
        origin: Vec2,
        direction: Dir2,
        max_distance: f32,
        filter: &QueryFilter,
    ) -> Option<CastHit> {
        self.spatial
            .cast_ray(origin, direction, max_distance, true, &self.filter(filter))
            .map(|hit| CastHit {
                body: BodyHandle::from(hit.entity),
                distance: hit.distance,
                normal: hit.normal,
            })
    }

    fn overlapping(&self, shape: CastShape, origin: Vec2, filter: &QueryFilter) -> Vec<BodyHandle> {
        let collider = shape_collider(shape);
        self.spatial
            .shape_intersections(&collider, origin, 0.0, &self.filter(filter))
            .into_iter()
            .map(BodyHandle::from)
            .collect()
    }

    fn containing_point(&self, point: Vec2, filter: &QueryFilter) -> Vec<BodyHandle> {
        self.spatial
            .point_intersections(point, &self.filter(filter))
            .into_iter()
            .map(BodyHandle::from)
            .collect()
    }

    fn effectors(&self, body: BodyHandle) -> EffectorSet {
        self.index.effectors(body)
    }

    fn set_collision_enabled(&mut self, body: BodyHandle, enabled: bool) {
        self.requests.toggles.push((body, enabled));
    }

    fn signal_collapse(&mut self, body: BodyHandle) {
        self.requests.collapses.push(body);
    }
}

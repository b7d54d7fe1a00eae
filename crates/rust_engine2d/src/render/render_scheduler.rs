//! Draw ordering of renderable entities
//!
//! Entities are bucketed by sorting layer. Buckets draw in layer id order and
//! each bucket is kept sorted by `sorting_order`; equal orders draw in
//! registration order.

use std::collections::{BTreeMap, HashMap};

use crate::engine::EngineError;
use crate::foundation::collections::EntityId;
use crate::physics::LayerId;
use crate::render::{DrawCall, RenderBackend};
use crate::scene::Scene;

/// Sorted set of entities to draw each frame
#[derive(Debug, Default)]
pub struct RenderScheduler {
    buckets: BTreeMap<LayerId, Vec<(i32, EntityId)>>,
    placed: HashMap<EntityId, LayerId>,
}

impl RenderScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a live entity with a visible renderable
    ///
    /// Anything else is ignored. A previous registration is replaced so the
    /// entity lands in its current bucket and position.
    pub fn add(&mut self, scene: &Scene, entity: EntityId) {
        self.remove(entity);

        let Some(node) = scene.entity(entity).filter(|node| node.is_live()) else {
            return;
        };
        let Some(renderable) = node.renderable().filter(|r| r.visible) else {
            return;
        };

        let order = renderable.sorting_order;
        let bucket = self.buckets.entry(renderable.sorting_layer).or_default();
        let index = bucket.partition_point(|&(other, _)| other <= order);
        bucket.insert(index, (order, entity));
        self.placed.insert(entity, renderable.sorting_layer);
    }

    /// Re-register after the renderable changed
    pub fn update(&mut self, scene: &Scene, entity: EntityId) {
        self.add(scene, entity);
    }

    /// Drop an entity; returns whether it was registered
    pub fn remove(&mut self, entity: EntityId) -> bool {
        let Some(layer) = self.placed.remove(&entity) else {
            return false;
        };
        if let Some(bucket) = self.buckets.get_mut(&layer) {
            bucket.retain(|&(_, id)| id != entity);
            if bucket.is_empty() {
                self.buckets.remove(&layer);
            }
        }
        true
    }

    /// Whether the entity is registered
    pub fn contains(&self, entity: EntityId) -> bool {
        self.placed.contains_key(&entity)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.placed.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.placed.is_empty()
    }

    /// Registered entities in draw order
    pub fn draw_order(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.buckets.values().flat_map(|bucket| bucket.iter().map(|&(_, id)| id))
    }

    /// Draw every registered entity that is still live and visible
    ///
    /// Returns the number of draw calls issued.
    pub fn render(&self, scene: &Scene, backend: &mut dyn RenderBackend) -> Result<usize, EngineError> {
        backend.begin_frame()?;
        let mut drawn = 0;
        for entity in self.draw_order() {
            let Some(node) = scene.entity(entity).filter(|node| node.is_live()) else {
                continue;
            };
            let Some(renderable) = node.renderable().filter(|r| r.visible) else {
                continue;
            };
            backend.draw(&DrawCall {
                entity,
                sprite: &renderable.sprite,
                color: renderable.color,
                transform: scene.world_matrix(entity),
                sorting_layer: renderable.sorting_layer,
                sorting_order: renderable.sorting_order,
            })?;
            drawn += 1;
        }
        backend.end_frame()?;
        log::trace!("Render scheduler: {} draw calls", drawn);
        Ok(drawn)
    }
}

//! Colliders and collision reports

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::foundation::collections::{ColliderId, EntityId};
use crate::foundation::math::{Mat3, Vec2};
use crate::physics::sat::Contact;
use crate::physics::shape::{ConvexShape, Shape};

/// Surface properties of a collider
///
/// Read-only data carried for gameplay code; no collision response uses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhysicsMaterial {
    /// Friction coefficient
    pub friction: f32,
    /// Restitution
    pub bounciness: f32,
}

impl Default for PhysicsMaterial {
    fn default() -> Self {
        Self { friction: 4.0, bounciness: 1.0 }
    }
}

/// A shape attached to an entity for overlap testing
#[derive(Debug, Clone)]
pub struct Collider {
    shape: Shape,
    offset: Vec2,
    parts: Vec<ConvexShape>,
    is_trigger: bool,
    material: PhysicsMaterial,
    active: bool,
    pub(crate) entity: Option<EntityId>,
}

impl Collider {
    /// Create a solid collider with no offset
    pub fn new(shape: Shape) -> Result<Self, EngineError> {
        let parts = shape.convex_parts(Vec2::zeros())?;
        Ok(Self {
            shape,
            offset: Vec2::zeros(),
            parts,
            is_trigger: false,
            material: PhysicsMaterial::default(),
            active: true,
            entity: None,
        })
    }

    /// Rectangle collider
    pub fn rect(width: f32, height: f32) -> Result<Self, EngineError> {
        Self::new(Shape::rect(width, height))
    }

    /// Circle collider
    pub fn circle(radius: f32) -> Result<Self, EngineError> {
        Self::new(Shape::circle(radius))
    }

    /// Builder-style offset in entity-local space
    pub fn with_offset(mut self, offset: Vec2) -> Result<Self, EngineError> {
        self.parts = self.shape.convex_parts(offset)?;
        self.offset = offset;
        Ok(self)
    }

    /// Builder-style trigger flag
    #[must_use]
    pub fn trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Builder-style active flag
    #[must_use]
    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    /// Builder-style material
    #[must_use]
    pub fn with_material(mut self, material: PhysicsMaterial) -> Self {
        self.material = material;
        self
    }

    /// Authored shape
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Offset in entity-local space
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Whether the collider only reports overlaps
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Change the trigger flag
    ///
    /// Collision registrations see the change after the owning entity is
    /// refreshed; `BehaviorContext::set_trigger` queues that refresh.
    pub fn set_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    /// Surface material
    pub fn material(&self) -> PhysicsMaterial {
        self.material
    }

    /// Whether the collider takes part in collision steps
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Enable or disable; takes effect on the owner's next refresh
    ///
    /// Outside the crate this goes through `World::set_collider_active`,
    /// which queues that refresh.
    pub(crate) fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Owning entity, once attached
    pub fn entity(&self) -> Option<EntityId> {
        self.entity
    }

    /// Convex parts moved into world space
    pub fn world_parts(&self, matrix: &Mat3) -> Vec<ConvexShape> {
        self.parts.iter().map(|part| part.transformed(matrix)).collect()
    }
}

/// Collision report handed to `on_collision_*` hooks
#[derive(Debug, Clone)]
pub struct Collision2D {
    /// Collider of the entity receiving the callback
    pub collider: ColliderId,
    /// The other collider
    pub other_collider: ColliderId,
    /// Entity receiving the callback
    pub entity: EntityId,
    /// Owner of the other collider
    pub other_entity: EntityId,
    /// Contacts between the two, empty on exit
    pub contacts: Vec<Contact>,
}

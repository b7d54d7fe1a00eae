//! Scene graph nodes

use crate::foundation::collections::{BehaviorId, ColliderId, EntityId};
use crate::foundation::math::Transform2D;
use crate::physics::LayerId;
use crate::render::Renderable;

/// What kind of node this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Regular game object
    Object,
    /// Root of a loaded scene; holds children only
    SceneRoot,
}

/// A node in the scene tree
#[derive(Debug, Clone)]
pub struct Entity {
    name: String,
    kind: EntityKind,
    pub(crate) tag: Option<String>,
    pub(crate) layer: LayerId,
    pub(crate) reference_name: Option<String>,

    /// Transform relative to the parent
    pub transform: Transform2D,

    pub(crate) parent: Option<EntityId>,
    pub(crate) children: Vec<EntityId>,
    pub(crate) behaviors: Vec<BehaviorId>,
    pub(crate) colliders: Vec<ColliderId>,
    /// Stored for this entity, not attached yet
    pub(crate) pending_behaviors: Vec<BehaviorId>,
    pub(crate) pending_colliders: Vec<ColliderId>,
    pub(crate) renderable: Option<Renderable>,

    pub(crate) active: bool,
    pub(crate) destroyed: bool,
    pub(crate) subscribed: bool,
    pub(crate) dont_destroy_on_load: bool,
}

impl Entity {
    pub(crate) fn new(name: String, kind: EntityKind) -> Self {
        Self {
            name,
            kind,
            tag: None,
            layer: 0,
            reference_name: None,
            transform: Transform2D::identity(),
            parent: None,
            children: Vec::new(),
            behaviors: Vec::new(),
            colliders: Vec::new(),
            pending_behaviors: Vec::new(),
            pending_colliders: Vec::new(),
            renderable: None,
            active: true,
            destroyed: false,
            subscribed: false,
            dont_destroy_on_load: false,
        }
    }

    /// Display name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Node kind
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Whether this node is a scene root
    pub fn is_scene_root(&self) -> bool {
        self.kind == EntityKind::SceneRoot
    }

    /// Tag, if any
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Collision layer id
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Unique reference name, if any
    pub fn reference_name(&self) -> Option<&str> {
        self.reference_name.as_deref()
    }

    /// Parent node
    pub fn parent(&self) -> Option<EntityId> {
        self.parent
    }

    /// Child nodes in order
    pub fn children(&self) -> &[EntityId] {
        &self.children
    }

    /// Attached behaviors in order
    pub fn behaviors(&self) -> &[BehaviorId] {
        &self.behaviors
    }

    /// Attached colliders in order
    pub fn colliders(&self) -> &[ColliderId] {
        &self.colliders
    }

    /// Renderable, if any
    pub fn renderable(&self) -> Option<&Renderable> {
        self.renderable.as_ref()
    }

    /// Own active flag
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Flagged for teardown
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Registered with the schedulers
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    /// Alive, active and not being torn down
    pub fn is_live(&self) -> bool {
        self.active && !self.destroyed
    }

    /// Survives scene switches
    pub fn dont_destroy_on_load(&self) -> bool {
        self.dont_destroy_on_load
    }

    /// Keep this object (when top-level) across scene switches
    pub fn set_dont_destroy_on_load(&mut self, keep: bool) {
        self.dont_destroy_on_load = keep;
    }
}

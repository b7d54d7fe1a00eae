//! Scene templates
//!
//! Static, serializable descriptions of a scene's objects. A template is
//! instantiated into live entities when its scene is loaded; behaviors are
//! named and resolved through the [`BehaviorRegistry`](crate::behavior::BehaviorRegistry).
//!
//! ```ron
//! (
//!     name: "Arena",
//!     objects: [
//!         (
//!             name: "Ship",
//!             tag: Some("Player"),
//!             layer: "Ships",
//!             transform: (position: (0.0, 0.0), rotation: 0.0, scale: (1.0, 1.0)),
//!             colliders: [(shape: Circle(radius: 1.0))],
//!             renderable: Some((sprite: "ship")),
//!             behaviors: ["Pilot"],
//!         ),
//!     ],
//! )
//! ```

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::foundation::math::{Transform2D, Vec2};
use crate::physics::Shape;

/// A scene: a named list of top-level objects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneTemplate {
    /// Scene name, also the name of its root entity
    pub name: String,
    /// Objects placed under the scene root
    pub objects: Vec<EntityTemplate>,
}

impl Config for SceneTemplate {}

impl SceneTemplate {
    /// Empty scene
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            objects: Vec::new(),
        }
    }

    /// Add a top-level object
    pub fn with_object(mut self, object: EntityTemplate) -> Self {
        self.objects.push(object);
        self
    }
}

/// One object and its subtree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityTemplate {
    /// Entity name
    pub name: String,
    /// Unique name for reference lookups
    pub reference_name: Option<String>,
    /// Tag, must be declared in the game settings
    pub tag: Option<String>,
    /// Collision layer name
    pub layer: String,
    /// Local transform
    pub transform: Transform2D,
    /// Starts active
    pub active: bool,
    /// Survives scene switches when placed directly under the scene root
    pub dont_destroy_on_load: bool,
    /// Colliders
    pub colliders: Vec<ColliderTemplate>,
    /// Optional visual
    pub renderable: Option<RenderableTemplate>,
    /// Registered behavior names, attached in order
    pub behaviors: Vec<String>,
    /// Child objects
    pub children: Vec<EntityTemplate>,
}

impl Default for EntityTemplate {
    fn default() -> Self {
        Self {
            name: "Object".to_string(),
            reference_name: None,
            tag: None,
            layer: "Default".to_string(),
            transform: Transform2D::identity(),
            active: true,
            dont_destroy_on_load: false,
            colliders: Vec::new(),
            renderable: None,
            behaviors: Vec::new(),
            children: Vec::new(),
        }
    }
}

impl EntityTemplate {
    /// Active object at the origin
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Place at a local position
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    /// Set the collision layer by name
    pub fn on_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Set the tag
    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Set the unique reference name
    pub fn referenced_as(mut self, name: impl Into<String>) -> Self {
        self.reference_name = Some(name.into());
        self
    }

    /// Add a collider
    pub fn with_collider(mut self, collider: ColliderTemplate) -> Self {
        self.colliders.push(collider);
        self
    }

    /// Set the renderable
    pub fn with_renderable(mut self, renderable: RenderableTemplate) -> Self {
        self.renderable = Some(renderable);
        self
    }

    /// Attach a registered behavior by name
    pub fn with_behavior(mut self, name: impl Into<String>) -> Self {
        self.behaviors.push(name.into());
        self
    }

    /// Add a child object
    pub fn with_child(mut self, child: EntityTemplate) -> Self {
        self.children.push(child);
        self
    }

    /// Start inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Keep across scene switches
    pub fn keep_on_load(mut self) -> Self {
        self.dont_destroy_on_load = true;
        self
    }
}

/// Collider description
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColliderTemplate {
    /// Local shape
    pub shape: Shape,
    /// Offset from the entity origin
    pub offset: Vec2,
    /// Overlap-only collider
    pub is_trigger: bool,
}

impl ColliderTemplate {
    /// Solid collider of a shape
    pub fn solid(shape: Shape) -> Self {
        Self {
            shape,
            ..Self::default()
        }
    }

    /// Trigger collider of a shape
    pub fn trigger(shape: Shape) -> Self {
        Self {
            shape,
            is_trigger: true,
            ..Self::default()
        }
    }
}

/// Renderable description; the sorting layer is given by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderableTemplate {
    /// Sprite name
    pub sprite: String,
    /// RGBA tint
    pub color: [f32; 4],
    /// Sorting layer name
    pub sorting_layer: String,
    /// Order inside the sorting layer
    pub sorting_order: i32,
    /// Drawn when true
    pub visible: bool,
}

impl Default for RenderableTemplate {
    fn default() -> Self {
        Self {
            sprite: String::new(),
            color: [1.0, 1.0, 1.0, 1.0],
            sorting_layer: "Default".to_string(),
            sorting_order: 0,
            visible: true,
        }
    }
}

impl RenderableTemplate {
    /// White sprite on the default sorting layer
    pub fn sprite(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            ..Self::default()
        }
    }
}

//! # Rendering
//!
//! Backend-agnostic draw ordering. The engine never talks to a graphics API
//! directly: the [`RenderScheduler`] walks live renderable entities by
//! sorting layer and sorting order and hands each one to a [`RenderBackend`]
//! as a [`DrawCall`].

pub mod render_scheduler;

pub use render_scheduler::RenderScheduler;

use serde::{Deserialize, Serialize};

use crate::engine::EngineError;
use crate::foundation::collections::EntityId;
use crate::foundation::math::Mat3;
use crate::physics::LayerId;

/// Visual attached to an entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Renderable {
    /// Sprite or mesh name understood by the backend
    pub sprite: String,
    /// RGBA tint
    pub color: [f32; 4],
    /// Sorting layer id; lower layers draw first
    pub sorting_layer: LayerId,
    /// Order inside the sorting layer; lower orders draw first
    pub sorting_order: i32,
    /// Hidden renderables are skipped
    pub visible: bool,
}

impl Default for Renderable {
    fn default() -> Self {
        Self {
            sprite: String::new(),
            color: [1.0, 1.0, 1.0, 1.0],
            sorting_layer: 0,
            sorting_order: 0,
            visible: true,
        }
    }
}

impl Renderable {
    /// White renderable for a sprite on the default sorting layer
    pub fn sprite(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            ..Self::default()
        }
    }

    /// Set the tint
    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    /// Set sorting layer and order
    pub fn sorted(mut self, sorting_layer: LayerId, sorting_order: i32) -> Self {
        self.sorting_layer = sorting_layer;
        self.sorting_order = sorting_order;
        self
    }
}

/// One draw request handed to the backend
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    /// Entity being drawn
    pub entity: EntityId,
    /// Sprite name
    pub sprite: &'a str,
    /// RGBA tint
    pub color: [f32; 4],
    /// World transform of the entity
    pub transform: Mat3,
    /// Sorting layer id
    pub sorting_layer: LayerId,
    /// Order inside the sorting layer
    pub sorting_order: i32,
}

/// Rendering surface the engine draws through
pub trait RenderBackend {
    /// Called before the first draw of a frame
    fn begin_frame(&mut self) -> Result<(), EngineError> {
        Ok(())
    }

    /// Draw one renderable
    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), EngineError>;

    /// Called after the last draw of a frame
    fn end_frame(&mut self) -> Result<(), EngineError> {
        Ok(())
    }
}

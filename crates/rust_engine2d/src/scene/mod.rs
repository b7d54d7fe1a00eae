//! Scene management system
//!
//! Following Game Engine Architecture Chapter 16 - Runtime Gameplay
//! Foundation Systems.
//!
//! ```text
//! SceneTemplate (static data)
//!      ↓ load / switch
//! Scene (entities, behaviors, colliders)
//!      ↓ subscribe
//! Schedulers (update, collision, render)
//! ```

mod entity;
mod scene_graph;
mod scene_manager;
pub mod template;

pub use entity::{Entity, EntityKind};
pub use scene_graph::Scene;
pub use scene_manager::SceneManager;
pub use template::{ColliderTemplate, EntityTemplate, RenderableTemplate, SceneTemplate};

//! Physics module - collision detection
//!
//! Overlap detection only: there is no collision response. The
//! [`CollisionManager`] tests every registered collider against every other
//! one each step and reports enter/stay/exit transitions to behaviors.

pub mod shape;
pub mod sat;
pub mod collider;
pub mod collision_layers;
pub mod collision_manager;

pub use shape::{ConvexShape, Shape};
pub use sat::{test_overlap, Contact};
pub use collider::{Collider, Collision2D, PhysicsMaterial};
pub use collision_layers::{CollisionMatrix, LayerId, LayerKind, LayerMask, LayerRegistry, Layers, MAX_LAYERS};
pub use collision_manager::{CollisionManager, Transition};

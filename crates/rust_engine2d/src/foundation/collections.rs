//! Handle types for engine objects
//!
//! Every engine object lives in a slot map and is addressed by a typed key.
//! Keys are generational: once an object is destroyed its key never resolves
//! again, which gives stale references the "compares equal to null" behavior
//! gameplay code relies on.

pub use slotmap::{Key, SlotMap};

slotmap::new_key_type! {
    /// Handle to an entity in the scene graph
    pub struct EntityId;

    /// Handle to a behavior instance attached to an entity
    pub struct BehaviorId;

    /// Handle to a collider attached to an entity
    pub struct ColliderId;

    /// Handle to a running routine
    pub struct RoutineId;
}

//! Scene graph storage
//!
//! Following Game Engine Architecture Chapter 16.2 - Runtime Object Model.
//!
//! [`Scene`] owns every entity, behavior and collider of a world in slot maps.
//! Creating storage is immediate; linking a node into the live tree and
//! removing anything is done by the execution queue's flush, so the
//! schedulers never see their collections change mid-phase.
//!
//! A destroyed entity keeps its storage until the end of the flush that
//! destroyed it, so its `on_destroy` hooks can still read it. From the moment
//! it is marked, [`Scene::is_null`] returns `true` and [`Scene::get`] treats it
//! as missing.

use std::collections::{HashMap, HashSet};

use crate::behavior::{Behavior, BehaviorSlot};
use crate::core::ValueNotFoundPolicy;
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId, SlotMap};
use crate::foundation::math::{Mat3, Transform2D};
use crate::physics::{Collider, LayerId};
use crate::render::Renderable;
use crate::scene::entity::{Entity, EntityKind};

/// Entity, behavior and collider storage plus tag and reference indices
pub struct Scene {
    entities: SlotMap<EntityId, Entity>,
    behaviors: SlotMap<BehaviorId, BehaviorSlot>,
    colliders: SlotMap<ColliderId, Collider>,
    tags: HashSet<String>,
    tagged: HashMap<String, Vec<EntityId>>,
    references: HashMap<String, EntityId>,
    policy: ValueNotFoundPolicy,
}

impl Scene {
    /// Create empty storage with the configured tag set
    pub fn new<S: AsRef<str>>(tags: &[S], policy: ValueNotFoundPolicy) -> Self {
        Self {
            entities: SlotMap::with_key(),
            behaviors: SlotMap::with_key(),
            colliders: SlotMap::with_key(),
            tags: tags.iter().map(|tag| tag.as_ref().to_string()).collect(),
            tagged: HashMap::new(),
            references: HashMap::new(),
            policy,
        }
    }

    /// Not-found policy used by lookups
    pub fn policy(&self) -> ValueNotFoundPolicy {
        self.policy
    }

    // ---------------------------------------------------------------------
    // Entities
    // ---------------------------------------------------------------------

    /// Create a detached, active entity
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.insert(Entity::new(name.into(), EntityKind::Object))
    }

    pub(crate) fn create_scene_root(&mut self, name: impl Into<String>) -> EntityId {
        self.entities.insert(Entity::new(name.into(), EntityKind::SceneRoot))
    }

    /// Entity by handle
    ///
    /// Still resolves while a destroyed entity waits to be freed; use
    /// [`Scene::is_null`] or [`Scene::get`] to skip those.
    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable entity by handle
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Whether a handle resolves to nothing
    pub fn is_null(&self, id: EntityId) -> bool {
        self.entities.get(id).map_or(true, Entity::is_destroyed)
    }

    /// Number of stored entities, scene roots included
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Iterate stored entities
    pub fn entities(&self) -> impl Iterator<Item = (EntityId, &Entity)> {
        self.entities.iter()
    }

    /// Entity lookup going through the not-found policy
    pub fn get(&self, id: EntityId) -> Result<Option<&Entity>, EngineError> {
        let entity = self.entities.get(id).filter(|entity| !entity.is_destroyed());
        self.policy.resolve(entity, || format!("entity {id:?}"))
    }

    pub(crate) fn entity_or_err(&self, id: EntityId) -> Result<&Entity, EngineError> {
        self.entities.get(id).ok_or(EngineError::ObjectNotFound("entity"))
    }

    fn entity_mut_or_err(&mut self, id: EntityId) -> Result<&mut Entity, EngineError> {
        self.entities.get_mut(id).ok_or(EngineError::ObjectNotFound("entity"))
    }

    /// First entity with this name
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.entities
            .iter()
            .find(|(_, entity)| entity.name() == name && !entity.is_destroyed())
            .map(|(id, _)| id)
    }

    /// Transform composed with every ancestor
    pub fn world_matrix(&self, id: EntityId) -> Mat3 {
        let mut matrix = Mat3::identity();
        let mut current = self.entities.get(id);
        while let Some(entity) = current {
            matrix = entity.transform.to_matrix() * matrix;
            current = entity.parent.and_then(|parent| self.entities.get(parent));
        }
        matrix
    }

    /// Local transform of an entity
    pub fn transform_mut(&mut self, id: EntityId) -> Option<&mut Transform2D> {
        self.entities.get_mut(id).map(|entity| &mut entity.transform)
    }

    pub(crate) fn set_active_flag(&mut self, id: EntityId, active: bool) -> Result<(), EngineError> {
        self.entity_mut_or_err(id)?.active = active;
        Ok(())
    }

    /// Set the collision layer; callers check the id against the registry
    pub(crate) fn set_layer(&mut self, id: EntityId, layer: LayerId) -> Result<(), EngineError> {
        self.entity_mut_or_err(id)?.layer = layer;
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tags
    // ---------------------------------------------------------------------

    /// Whether the tag is declared in the game settings
    pub fn is_known_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    fn require_tag(&self, tag: &str) -> Result<(), EngineError> {
        if self.tags.contains(tag) {
            Ok(())
        } else {
            Err(EngineError::UnknownTag(tag.to_string()))
        }
    }

    /// Set or clear an entity's tag
    pub fn set_tag(&mut self, id: EntityId, tag: Option<&str>) -> Result<(), EngineError> {
        if let Some(tag) = tag {
            self.require_tag(tag)?;
        }
        let entity = self.entity_mut_or_err(id)?;
        let previous = std::mem::replace(&mut entity.tag, tag.map(str::to_string));

        if let Some(previous) = previous {
            self.untag(id, &previous);
        }
        if let Some(tag) = tag {
            self.tagged.entry(tag.to_string()).or_default().push(id);
        }
        Ok(())
    }

    fn untag(&mut self, id: EntityId, tag: &str) {
        if let Some(list) = self.tagged.get_mut(tag) {
            list.retain(|&tagged| tagged != id);
        }
    }

    /// First live entity carrying a tag
    pub fn find_with_tag(&self, tag: &str) -> Result<Option<EntityId>, EngineError> {
        Ok(self.find_all_with_tag(tag)?.into_iter().next())
    }

    /// Every live entity carrying a tag, in tagging order
    pub fn find_all_with_tag(&self, tag: &str) -> Result<Vec<EntityId>, EngineError> {
        self.require_tag(tag)?;
        Ok(self
            .tagged
            .get(tag)
            .map(|list| list.iter().copied().filter(|&id| !self.is_null(id)).collect())
            .unwrap_or_default())
    }

    // ---------------------------------------------------------------------
    // References
    // ---------------------------------------------------------------------

    /// Give an entity a unique reference name
    pub fn set_reference_name(&mut self, id: EntityId, name: &str) -> Result<(), EngineError> {
        if let Some(&holder) = self.references.get(name) {
            if holder != id {
                return Err(EngineError::DuplicateReference(name.to_string()));
            }
            return Ok(());
        }
        let entity = self.entity_mut_or_err(id)?;
        let previous = entity.reference_name.replace(name.to_string());
        if let Some(previous) = previous {
            self.references.remove(&previous);
        }
        self.references.insert(name.to_string(), id);
        Ok(())
    }

    /// Look up an entity by reference name through the not-found policy
    pub fn find_reference(&self, name: &str) -> Result<Option<EntityId>, EngineError> {
        let found = self.references.get(name).copied().filter(|&id| !self.is_null(id));
        self.policy.resolve(found, || format!("reference '{name}'"))
    }

    // ---------------------------------------------------------------------
    // Hierarchy
    // ---------------------------------------------------------------------

    fn check_link(&self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        self.entity_or_err(parent)?;
        let node = self.entity_or_err(child)?;
        if node.is_scene_root() {
            return Err(EngineError::InvalidHierarchy("a scene root cannot be a child".to_string()));
        }
        let mut cursor = Some(parent);
        while let Some(id) = cursor {
            if id == child {
                return Err(EngineError::InvalidHierarchy("an entity cannot be its own ancestor".to_string()));
            }
            cursor = self.entities.get(id).and_then(|entity| entity.parent);
        }
        Ok(())
    }

    /// Unlink from the current parent, returns the old parent
    pub(crate) fn detach(&mut self, child: EntityId) -> Option<EntityId> {
        let parent = self.entities.get_mut(child)?.parent.take()?;
        if let Some(node) = self.entities.get_mut(parent) {
            node.children.retain(|&id| id != child);
        }
        Some(parent)
    }

    /// Link `child` under `parent` at `index` (clamped), moving it if linked elsewhere
    pub(crate) fn insert_child(&mut self, parent: EntityId, index: usize, child: EntityId) -> Result<(), EngineError> {
        self.check_link(parent, child)?;
        self.detach(child);
        let node = self.entity_mut_or_err(parent)?;
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        self.entity_mut_or_err(child)?.parent = Some(parent);
        Ok(())
    }

    /// Link `child` as the last child of `parent`
    pub(crate) fn add_child(&mut self, parent: EntityId, child: EntityId) -> Result<(), EngineError> {
        let len = self.entity_or_err(parent)?.children.len();
        self.insert_child(parent, len, child)
    }

    /// Replace the child at `index`, returning the unlinked one
    pub(crate) fn replace_child(
        &mut self,
        parent: EntityId,
        index: usize,
        child: EntityId,
    ) -> Result<EntityId, EngineError> {
        self.check_link(parent, child)?;
        let old = *self
            .entity_or_err(parent)?
            .children
            .get(index)
            .ok_or_else(|| EngineError::InvalidHierarchy(format!("no child at index {index}")))?;
        if old == child {
            return Ok(old);
        }
        self.detach(old);
        self.detach(child);
        let node = self.entity_mut_or_err(parent)?;
        let index = index.min(node.children.len());
        node.children.insert(index, child);
        self.entity_mut_or_err(child)?.parent = Some(parent);
        Ok(old)
    }

    /// Every node below `id`, depth first, parents before children
    pub fn descendants(&self, id: EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut stack: Vec<EntityId> = self
            .entities
            .get(id)
            .map(|entity| entity.children.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(entity) = self.entities.get(next) {
                stack.extend(entity.children.iter().rev().copied());
            }
        }
        out
    }

    // ---------------------------------------------------------------------
    // Behaviors
    // ---------------------------------------------------------------------

    /// Store a behavior for `entity` without attaching it yet
    pub(crate) fn insert_behavior(
        &mut self,
        entity: EntityId,
        behavior: Box<dyn Behavior>,
    ) -> Result<BehaviorId, EngineError> {
        let node = self.entities.get_mut(entity).ok_or(EngineError::ObjectNotFound("entity"))?;
        if node.is_scene_root() {
            return Err(EngineError::SceneComponents);
        }
        let id = self.behaviors.insert(BehaviorSlot::new(entity, behavior));
        node.pending_behaviors.push(id);
        Ok(id)
    }

    /// Append a stored behavior to its entity's list
    pub(crate) fn attach_behavior(&mut self, id: BehaviorId) -> Result<EntityId, EngineError> {
        let slot = self.behaviors.get_mut(id).ok_or(EngineError::ObjectNotFound("behavior"))?;
        let entity = slot.entity;
        if slot.attached {
            return Ok(entity);
        }
        slot.attached = true;
        let node = self.entity_mut_or_err(entity)?;
        node.pending_behaviors.retain(|&b| b != id);
        node.behaviors.push(id);
        Ok(entity)
    }

    pub(crate) fn remove_behavior_slot(&mut self, id: BehaviorId) -> Option<EntityId> {
        let slot = self.behaviors.remove(id)?;
        if let Some(entity) = self.entities.get_mut(slot.entity) {
            entity.behaviors.retain(|&b| b != id);
            entity.pending_behaviors.retain(|&b| b != id);
        }
        Some(slot.entity)
    }

    pub(crate) fn behavior_slot(&self, id: BehaviorId) -> Option<&BehaviorSlot> {
        self.behaviors.get(id)
    }

    pub(crate) fn behavior_slot_mut(&mut self, id: BehaviorId) -> Option<&mut BehaviorSlot> {
        self.behaviors.get_mut(id)
    }

    /// Concrete behavior by handle
    ///
    /// `None` if the handle is stale, the type differs, or one of the
    /// behavior's own hooks is running.
    pub fn behavior<T: Behavior>(&self, id: BehaviorId) -> Option<&T> {
        self.behaviors.get(id)?.instance.as_deref()?.as_any().downcast_ref::<T>()
    }

    /// Concrete behavior by handle, mutably
    pub fn behavior_mut<T: Behavior>(&mut self, id: BehaviorId) -> Option<&mut T> {
        self.behaviors
            .get_mut(id)?
            .instance
            .as_deref_mut()?
            .as_any_mut()
            .downcast_mut::<T>()
    }

    /// First behavior of type `T` on an entity
    pub fn find_behavior<T: Behavior>(&self, entity: EntityId) -> Option<BehaviorId> {
        self.entities
            .get(entity)?
            .behaviors
            .iter()
            .copied()
            .find(|&id| self.behavior::<T>(id).is_some())
    }

    /// Owning entity of a behavior
    pub fn behavior_owner(&self, id: BehaviorId) -> Option<EntityId> {
        self.behaviors.get(id).map(|slot| slot.entity)
    }

    /// Behavior enable flag
    pub fn behavior_is_active(&self, id: BehaviorId) -> bool {
        self.behaviors.get(id).is_some_and(|slot| slot.active)
    }

    /// Enable or disable a behavior; hooks check the flag at call time
    pub fn set_behavior_active(&mut self, id: BehaviorId, active: bool) -> Result<(), EngineError> {
        self.behaviors.get_mut(id).ok_or(EngineError::ObjectNotFound("behavior"))?.active = active;
        Ok(())
    }

    /// Whether behavior `id` and its entity are both live
    pub(crate) fn behavior_is_live(&self, id: BehaviorId) -> bool {
        self.behaviors.get(id).is_some_and(|slot| {
            slot.active && self.entities.get(slot.entity).is_some_and(Entity::is_live)
        })
    }

    // ---------------------------------------------------------------------
    // Colliders
    // ---------------------------------------------------------------------

    /// Store a collider for `entity` without attaching it yet
    pub(crate) fn insert_collider(&mut self, entity: EntityId, mut collider: Collider) -> Result<ColliderId, EngineError> {
        let node = self.entities.get_mut(entity).ok_or(EngineError::ObjectNotFound("entity"))?;
        if node.is_scene_root() {
            return Err(EngineError::SceneComponents);
        }
        collider.entity = Some(entity);
        let id = self.colliders.insert(collider);
        node.pending_colliders.push(id);
        Ok(id)
    }

    /// Append a stored collider to its entity's list
    pub(crate) fn attach_collider(&mut self, id: ColliderId) -> Result<EntityId, EngineError> {
        let entity = self
            .colliders
            .get(id)
            .and_then(Collider::entity)
            .ok_or(EngineError::ObjectNotFound("collider"))?;
        let node = self.entity_mut_or_err(entity)?;
        node.pending_colliders.retain(|&c| c != id);
        if !node.colliders.contains(&id) {
            node.colliders.push(id);
        }
        Ok(entity)
    }

    pub(crate) fn remove_collider(&mut self, id: ColliderId) -> Option<EntityId> {
        let entity = self.colliders.remove(id)?.entity()?;
        if let Some(node) = self.entities.get_mut(entity) {
            node.colliders.retain(|&c| c != id);
            node.pending_colliders.retain(|&c| c != id);
        }
        Some(entity)
    }

    /// Collider by handle
    pub fn collider(&self, id: ColliderId) -> Option<&Collider> {
        self.colliders.get(id)
    }

    /// Collider by handle, mutably
    pub fn collider_mut(&mut self, id: ColliderId) -> Option<&mut Collider> {
        self.colliders.get_mut(id)
    }

    /// Owning entity of a collider
    pub fn collider_owner(&self, id: ColliderId) -> Option<EntityId> {
        self.colliders.get(id).and_then(Collider::entity)
    }

    // ---------------------------------------------------------------------
    // Renderables
    // ---------------------------------------------------------------------

    /// Set or clear an entity's renderable
    pub(crate) fn set_renderable(&mut self, id: EntityId, renderable: Option<Renderable>) -> Result<(), EngineError> {
        let entity = self.entity_mut_or_err(id)?;
        if entity.is_scene_root() && renderable.is_some() {
            return Err(EngineError::SceneComponents);
        }
        entity.renderable = renderable;
        Ok(())
    }

    /// Renderable of an entity, mutably
    ///
    /// Sorting changes only reorder after the entity is refreshed.
    pub fn renderable_mut(&mut self, id: EntityId) -> Option<&mut Renderable> {
        self.entities.get_mut(id)?.renderable.as_mut()
    }

    // ---------------------------------------------------------------------
    // Teardown
    // ---------------------------------------------------------------------

    /// Mark an entity destroyed and drop its tag and reference entries
    pub(crate) fn mark_destroyed(&mut self, id: EntityId) {
        let Some(entity) = self.entities.get_mut(id) else { return };
        entity.destroyed = true;
        entity.subscribed = false;
        let tag = entity.tag.take();
        let reference = entity.reference_name.take();

        if let Some(tag) = tag {
            self.untag(id, &tag);
        }
        if let Some(reference) = reference {
            if self.references.get(&reference) == Some(&id) {
                self.references.remove(&reference);
            }
        }
    }

    /// Free an entity's storage along with its colliders and remaining behaviors,
    /// attached or not
    pub(crate) fn free_entity(&mut self, id: EntityId) {
        self.detach(id);
        let Some(entity) = self.entities.remove(id) else { return };
        for collider in entity.colliders.into_iter().chain(entity.pending_colliders) {
            self.colliders.remove(collider);
        }
        for behavior in entity.behaviors.into_iter().chain(entity.pending_behaviors) {
            self.behaviors.remove(behavior);
        }
    }
}

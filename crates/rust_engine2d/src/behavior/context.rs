//! Context handed to behavior hooks and routine bodies

use crate::behavior::Behavior;
use crate::core::GameSettings;
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId, RoutineId};
use crate::foundation::math::Transform2D;
use crate::foundation::time::GameTime;
use crate::physics::{Collider, LayerId, Layers};
use crate::scene::Scene;
use crate::schedule::{Command, ExecutionQueue, RoutineBody, Wait};

/// Read-only world state every hook may consult
#[derive(Clone, Copy)]
pub struct Services<'a> {
    /// Game clock
    pub time: &'a GameTime,
    /// Layer registries
    pub layers: &'a Layers,
    /// Game settings
    pub settings: &'a GameSettings,
}

impl<'a> Services<'a> {
    /// Bundle the shared state
    pub fn new(time: &'a GameTime, layers: &'a Layers, settings: &'a GameSettings) -> Self {
        Self { time, layers, settings }
    }
}

/// A hook's window onto the world
pub struct BehaviorContext<'a> {
    scene: &'a mut Scene,
    execution: &'a mut ExecutionQueue,
    services: Services<'a>,
    entity: EntityId,
    behavior: Option<BehaviorId>,
}

impl<'a> BehaviorContext<'a> {
    pub(crate) fn new(
        scene: &'a mut Scene,
        execution: &'a mut ExecutionQueue,
        services: Services<'a>,
        entity: EntityId,
        behavior: Option<BehaviorId>,
    ) -> Self {
        Self { scene, execution, services, entity, behavior }
    }

    /// Entity running the hook
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// Behavior running the hook, `None` for routines started by the host
    pub fn behavior(&self) -> Option<BehaviorId> {
        self.behavior
    }

    /// The scene graph
    pub fn scene(&self) -> &Scene {
        &*self.scene
    }

    /// The scene graph, mutably
    ///
    /// Transforms, tags and behavior state can be changed in place; changes
    /// to the graph's structure go through the queued helpers below.
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut *self.scene
    }

    /// Transform of the running entity
    pub fn transform_mut(&mut self) -> Option<&mut Transform2D> {
        self.scene.entity_mut(self.entity).map(|entity| &mut entity.transform)
    }

    /// Game clock
    pub fn time(&self) -> &GameTime {
        self.services.time
    }

    /// Layer registries
    pub fn layers(&self) -> &Layers {
        self.services.layers
    }

    /// Game settings
    pub fn settings(&self) -> &GameSettings {
        self.services.settings
    }

    /// Queue a command for the next flush
    pub fn do_next_frame(&mut self, command: Command) {
        self.execution.do_next_frame(command);
    }

    /// Create an entity under `parent`; it joins the graph at the next flush
    pub fn spawn(&mut self, name: impl Into<String>, parent: EntityId) -> EntityId {
        let child = self.scene.create_entity(name);
        self.execution.do_next_frame(Command::AddChild { parent, child });
        child
    }

    /// Destroy an entity at the next flush
    pub fn destroy(&mut self, entity: EntityId) {
        self.execution.do_next_frame(Command::Destroy(entity));
    }

    /// Flip an entity's active flag now; registrations follow at the next flush
    pub fn set_active(&mut self, entity: EntityId, active: bool) -> Result<(), EngineError> {
        self.scene.set_active_flag(entity, active)?;
        self.execution.do_next_frame(Command::Refresh(entity));
        Ok(())
    }

    /// Enable or disable a behavior
    ///
    /// Disabling takes effect from the next dispatched hook. A behavior
    /// enabled for the first time starts and joins the update chains at the
    /// next flush.
    pub fn set_behavior_enabled(&mut self, behavior: BehaviorId, enabled: bool) -> Result<(), EngineError> {
        self.scene.set_behavior_active(behavior, enabled)?;
        if let Some(owner) = self.scene.behavior_owner(behavior) {
            self.execution.do_next_frame(Command::Refresh(owner));
        }
        Ok(())
    }

    /// Move an entity to another collision layer
    pub fn set_layer(&mut self, entity: EntityId, layer: LayerId) -> Result<(), EngineError> {
        let layer = self.services.layers.layers.check(layer)?;
        self.scene.set_layer(entity, layer)
    }

    /// Change a collider's trigger flag at the next flush
    pub fn set_trigger(&mut self, collider: ColliderId, is_trigger: bool) {
        self.execution.do_next_frame(Command::SetTrigger { collider, is_trigger });
    }

    /// Enable or disable a collider at the next flush
    pub fn set_collider_active(&mut self, collider: ColliderId, active: bool) {
        self.execution.do_next_frame(Command::SetColliderActive { collider, active });
    }

    /// Attach a behavior at the next flush
    pub fn add_behavior<B: Behavior>(&mut self, entity: EntityId, behavior: B) -> Result<BehaviorId, EngineError> {
        let id = self.scene.insert_behavior(entity, Box::new(behavior))?;
        self.execution.do_next_frame(Command::AttachBehavior(id));
        Ok(id)
    }

    /// Detach and destroy a behavior at the next flush
    pub fn remove_behavior(&mut self, behavior: BehaviorId) {
        self.execution.do_next_frame(Command::RemoveBehavior(behavior));
    }

    /// Attach a collider at the next flush
    pub fn add_collider(&mut self, entity: EntityId, collider: Collider) -> Result<ColliderId, EngineError> {
        let id = self.scene.insert_collider(entity, collider)?;
        self.execution.do_next_frame(Command::AttachCollider(id));
        Ok(id)
    }

    /// Remove a collider at the next flush
    pub fn remove_collider(&mut self, collider: ColliderId) {
        self.execution.do_next_frame(Command::RemoveCollider(collider));
    }

    /// Start a routine owned by the running entity
    pub fn start_routine(&mut self, wait: Wait, body: RoutineBody) -> RoutineId {
        self.execution.start_routine(self.entity, self.behavior, wait, body)
    }

    /// Pause a routine owned by the running entity
    pub fn pause_routine(&mut self, routine: RoutineId) -> Result<(), EngineError> {
        self.execution.pause_routine(self.entity, routine)
    }

    /// Resume a paused routine owned by the running entity
    pub fn resume_routine(&mut self, routine: RoutineId) -> Result<(), EngineError> {
        self.execution.resume_routine(self.entity, routine)
    }

    /// Stop a routine owned by the running entity
    pub fn stop_routine(&mut self, routine: RoutineId) -> Result<(), EngineError> {
        self.execution.stop_routine(self.entity, routine)
    }

    /// Look up an entity by reference name
    pub fn find_reference(&self, name: &str) -> Result<Option<EntityId>, EngineError> {
        self.scene.find_reference(name)
    }

    /// First live entity carrying a tag
    pub fn find_with_tag(&self, tag: &str) -> Result<Option<EntityId>, EngineError> {
        self.scene.find_with_tag(tag)
    }
}

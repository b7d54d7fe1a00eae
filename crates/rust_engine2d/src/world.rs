//! # World
//!
//! One explicitly owned context holding everything a running game needs:
//! settings and layer registries, the scene graph, the execution queue and
//! the three schedulers. Nothing in the engine is global, so several worlds
//! can live side by side (tests do this constantly).
//!
//! Host code talks to the world between frames. Storage is created
//! immediately; linking objects into the live tree, removing them, and every
//! other structural change is queued and applied by the flush at the start
//! of the next [`World::step_frame`].

use crate::behavior::{Behavior, BehaviorRegistry, Services};
use crate::core::GameSettings;
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId, RoutineId};
use crate::foundation::time::GameTime;
use crate::physics::{Collider, CollisionManager, LayerId, Layers};
use crate::render::{RenderBackend, RenderScheduler, Renderable};
use crate::scene::{Scene, SceneManager};
use crate::schedule::routine::run_routines;
use crate::schedule::{Command, ExecutionQueue, Phase, RoutineBody, RoutinePhase, UpdateScheduler, Wait};

/// A running game
pub struct World {
    pub(crate) settings: GameSettings,
    pub(crate) layers: Layers,
    pub(crate) time: GameTime,
    pub(crate) scene: Scene,
    pub(crate) execution: ExecutionQueue,
    pub(crate) updates: UpdateScheduler,
    pub(crate) collisions: CollisionManager,
    pub(crate) renderers: RenderScheduler,
    pub(crate) scenes: SceneManager,
    pub(crate) factories: BehaviorRegistry,
}

impl World {
    /// Build a world from settings
    ///
    /// Fails when the layer configuration is malformed.
    pub fn new(settings: GameSettings) -> Result<Self, EngineError> {
        let layers = Layers::from_settings(&settings)?;
        let scene = Scene::new(&settings.tags, settings.developer.value_not_found);

        log::debug!(
            "World created: {} tags, {} layers, {} sorting layers",
            settings.tags.len(),
            layers.layers.len(),
            layers.sorting.len()
        );
        Ok(Self {
            settings,
            layers,
            time: GameTime::new(),
            scene,
            execution: ExecutionQueue::new(),
            updates: UpdateScheduler::new(),
            collisions: CollisionManager::new(),
            renderers: RenderScheduler::new(),
            scenes: SceneManager::new(),
            factories: BehaviorRegistry::new(),
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Game settings
    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    /// Layer registries
    pub fn layers(&self) -> &Layers {
        &self.layers
    }

    /// Game clock
    pub fn time(&self) -> &GameTime {
        &self.time
    }

    /// Scene graph
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Scene graph, mutably
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    /// Execution queue and routine table
    pub fn execution(&self) -> &ExecutionQueue {
        &self.execution
    }

    /// Execution queue, mutably
    pub fn execution_mut(&mut self) -> &mut ExecutionQueue {
        &mut self.execution
    }

    /// Update scheduler
    pub fn updates(&self) -> &UpdateScheduler {
        &self.updates
    }

    /// Collision manager
    pub fn collisions(&self) -> &CollisionManager {
        &self.collisions
    }

    /// Render scheduler
    pub fn renderers(&self) -> &RenderScheduler {
        &self.renderers
    }

    /// Behavior factories used by scene templates
    pub fn behavior_registry(&self) -> &BehaviorRegistry {
        &self.factories
    }

    /// Behavior factories, mutably
    pub fn behavior_registry_mut(&mut self) -> &mut BehaviorRegistry {
        &mut self.factories
    }

    // ---------------------------------------------------------------------
    // Objects
    // ---------------------------------------------------------------------

    /// Create a detached entity; it stays dormant until linked under a live parent
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityId {
        self.scene.create_entity(name)
    }

    /// Create an entity under `parent`, linked at the next flush
    pub fn spawn(&mut self, name: impl Into<String>, parent: EntityId) -> EntityId {
        let child = self.scene.create_entity(name);
        self.add_child(parent, child);
        child
    }

    /// Link `child` as the last child of `parent` at the next flush
    pub fn add_child(&mut self, parent: EntityId, child: EntityId) {
        self.execution.do_next_frame(Command::AddChild { parent, child });
    }

    /// Link `child` under `parent` at `index` at the next flush
    pub fn insert_child(&mut self, parent: EntityId, index: usize, child: EntityId) {
        self.execution.do_next_frame(Command::InsertChild { parent, index, child });
    }

    /// Unlink `child` from `parent` at the next flush
    pub fn remove_child(&mut self, parent: EntityId, child: EntityId) {
        self.execution.do_next_frame(Command::RemoveChild { parent, child });
    }

    /// Swap the child at `index` for `child` at the next flush
    pub fn replace_child(&mut self, parent: EntityId, index: usize, child: EntityId) {
        self.execution.do_next_frame(Command::ReplaceChild { parent, index, child });
    }

    /// Unlink every child of `parent` at the next flush
    pub fn clear_children(&mut self, parent: EntityId) {
        self.execution.do_next_frame(Command::ClearChildren { parent });
    }

    /// Destroy an entity and its subtree at the next flush
    pub fn destroy(&mut self, entity: EntityId) {
        self.execution.do_next_frame(Command::Destroy(entity));
    }

    /// Flip the active flag now; registrations follow at the next flush
    pub fn set_active(&mut self, entity: EntityId, active: bool) -> Result<(), EngineError> {
        self.scene.set_active_flag(entity, active)?;
        self.execution.do_next_frame(Command::Refresh(entity));
        Ok(())
    }

    /// Attach a behavior at the next flush
    pub fn add_behavior<B: Behavior>(&mut self, entity: EntityId, behavior: B) -> Result<BehaviorId, EngineError> {
        self.add_boxed_behavior(entity, Box::new(behavior))
    }

    /// Attach an already boxed behavior at the next flush
    pub fn add_boxed_behavior(&mut self, entity: EntityId, behavior: Box<dyn Behavior>) -> Result<BehaviorId, EngineError> {
        let id = self.scene.insert_behavior(entity, behavior)?;
        self.execution.do_next_frame(Command::AttachBehavior(id));
        Ok(id)
    }

    /// Enable or disable a behavior
    ///
    /// The flag changes now; a behavior disabled when its entity registered
    /// joins the update chains at the next flush.
    pub fn set_behavior_enabled(&mut self, behavior: BehaviorId, enabled: bool) -> Result<(), EngineError> {
        self.scene.set_behavior_active(behavior, enabled)?;
        if let Some(owner) = self.scene.behavior_owner(behavior) {
            self.execution.do_next_frame(Command::Refresh(owner));
        }
        Ok(())
    }

    /// Destroy a behavior at the next flush
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

    /// Change a collider's trigger flag at the next flush
    pub fn set_trigger(&mut self, collider: ColliderId, is_trigger: bool) {
        self.execution.do_next_frame(Command::SetTrigger { collider, is_trigger });
    }

    /// Enable or disable a collider at the next flush
    pub fn set_collider_active(&mut self, collider: ColliderId, active: bool) {
        self.execution.do_next_frame(Command::SetColliderActive { collider, active });
    }

    /// Move an entity to another collision layer
    pub fn set_layer(&mut self, entity: EntityId, layer: LayerId) -> Result<(), EngineError> {
        let layer = self.layers.layers.check(layer)?;
        self.scene.set_layer(entity, layer)
    }

    /// Set or clear an entity's renderable; draw order follows at the next flush
    pub fn set_renderable(&mut self, entity: EntityId, renderable: Option<Renderable>) -> Result<(), EngineError> {
        if let Some(renderable) = &renderable {
            self.layers.sorting.check(renderable.sorting_layer)?;
        }
        self.scene.set_renderable(entity, renderable)?;
        self.execution.do_next_frame(Command::Refresh(entity));
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Deferred work
    // ---------------------------------------------------------------------

    /// Queue a command for the next flush
    pub fn do_next_frame(&mut self, command: Command) {
        self.execution.do_next_frame(command);
    }

    /// Queue a closure for the next flush
    pub fn invoke(&mut self, action: impl FnOnce(&mut World) -> Result<(), EngineError> + 'static) {
        self.execution.invoke_next_frame(action);
    }

    /// Start a routine owned by `owner`
    pub fn start_routine(&mut self, owner: EntityId, wait: Wait, body: RoutineBody) -> RoutineId {
        self.execution.start_routine(owner, None, wait, body)
    }

    /// Apply every queued command
    ///
    /// Commands queued while the flush runs wait for the next one. The first
    /// failing command aborts the flush and the commands after it are
    /// dropped.
    pub fn invoke_queue(&mut self) -> Result<(), EngineError> {
        let commands = self.execution.take_queue();
        if commands.is_empty() {
            return Ok(());
        }
        log::trace!("Flushing {} commands", commands.len());

        let total = commands.len();
        for (index, command) in commands.into_iter().enumerate() {
            let label = command.label();
            if let Err(error) = self.apply(command) {
                log::warn!(
                    "{label} failed, dropping {} queued commands: {error}",
                    total - index - 1
                );
                return Err(error);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Frame
    // ---------------------------------------------------------------------

    /// Run one fixed step
    ///
    /// Flush, before-step hooks, step hooks, collision step, step routines,
    /// after-step hooks, end-of-frame routines. The first error aborts the
    /// step.
    pub fn step_frame(&mut self) -> Result<(), EngineError> {
        self.time.advance(self.settings.fixed_timestep);
        self.execution.set_clock(self.time.elapsed());

        self.invoke_queue()?;

        let services = Services::new(&self.time, &self.layers, &self.settings);
        self.updates.dispatch(Phase::BeforeStep, &mut self.scene, &mut self.execution, services)?;
        self.updates.dispatch(Phase::Step, &mut self.scene, &mut self.execution, services)?;
        self.collisions.step(&mut self.scene, &mut self.execution, services)?;
        run_routines(&mut self.execution, &mut self.scene, services, RoutinePhase::Step)?;
        self.updates.dispatch(Phase::AfterStep, &mut self.scene, &mut self.execution, services)?;
        run_routines(&mut self.execution, &mut self.scene, services, RoutinePhase::EndOfFrame)?;
        Ok(())
    }

    /// Draw the live renderables through `backend`, returns the draw count
    pub fn render(&self, backend: &mut dyn RenderBackend) -> Result<usize, EngineError> {
        self.renderers.render(&self.scene, backend)
    }
}

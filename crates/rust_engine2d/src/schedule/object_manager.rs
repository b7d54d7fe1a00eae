//! Object manager
//!
//! Applies queued commands and keeps the schedulers' registrations in step
//! with the scene graph. An entity is subscribed while it is active and
//! linked, through active ancestors, to the loaded scene root. Subscribing
//! wakes its behaviors (`awake`, then `start`, once each) and registers it
//! with the update, collision and render schedulers.
//!
//! Everything here runs inside the flush, never during a phase.

use crate::behavior::{invoke_hook, Hooks, Services};
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, EntityId};
use crate::scene::Entity;
use crate::schedule::Command;
use crate::world::World;

impl World {
    /// Apply one queued command
    ///
    /// Commands naming destroyed objects are skipped.
    pub(crate) fn apply(&mut self, command: Command) -> Result<(), EngineError> {
        match command {
            Command::AddChild { parent, child } => {
                if self.either_null(parent, child) {
                    return Ok(());
                }
                self.scene.add_child(parent, child)?;
                self.refresh(child)
            }
            Command::InsertChild { parent, index, child } => {
                if self.either_null(parent, child) {
                    return Ok(());
                }
                self.scene.insert_child(parent, index, child)?;
                self.refresh(child)
            }
            Command::RemoveChild { parent, child } => {
                if self.scene.entity(child).and_then(Entity::parent) != Some(parent) {
                    log::debug!("RemoveChild skipped, {child:?} is not a child of {parent:?}");
                    return Ok(());
                }
                self.scene.detach(child);
                self.unsubscribe(child)
            }
            Command::ReplaceChild { parent, index, child } => {
                if self.either_null(parent, child) {
                    return Ok(());
                }
                let old = self.scene.replace_child(parent, index, child)?;
                if old != child {
                    self.unsubscribe(old)?;
                }
                self.refresh(child)
            }
            Command::ClearChildren { parent } => {
                let children = self.scene.entity(parent).map(|node| node.children().to_vec()).unwrap_or_default();
                for child in children {
                    self.scene.detach(child);
                    self.unsubscribe(child)?;
                }
                Ok(())
            }
            Command::Destroy(entity) => self.destroy_now(entity),
            Command::AttachBehavior(id) => {
                if self.scene.behavior_slot(id).is_none() {
                    return Ok(());
                }
                let entity = self.scene.attach_behavior(id)?;
                self.refresh(entity)
            }
            Command::RemoveBehavior(id) => self.remove_behavior_now(id),
            Command::AttachCollider(id) => {
                if self.scene.collider(id).is_none() {
                    return Ok(());
                }
                let entity = self.scene.attach_collider(id)?;
                self.refresh(entity)
            }
            Command::RemoveCollider(id) => match self.scene.remove_collider(id) {
                Some(entity) => self.refresh(entity),
                None => Ok(()),
            },
            Command::SetActive { entity, active } => {
                if self.scene.is_null(entity) {
                    return Ok(());
                }
                self.scene.set_active_flag(entity, active)?;
                self.refresh(entity)
            }
            Command::SetTrigger { collider, is_trigger } => {
                let Some(shape) = self.scene.collider_mut(collider) else {
                    return Ok(());
                };
                shape.set_trigger(is_trigger);
                match self.scene.collider_owner(collider) {
                    Some(entity) => self.refresh(entity),
                    None => Ok(()),
                }
            }
            Command::SetColliderActive { collider, active } => {
                let Some(shape) = self.scene.collider_mut(collider) else {
                    return Ok(());
                };
                shape.set_active(active);
                match self.scene.collider_owner(collider) {
                    Some(entity) => self.refresh(entity),
                    None => Ok(()),
                }
            }
            Command::Refresh(entity) => self.refresh(entity),
            Command::SwitchScene(id) => self.switch_scene_now(id),
            Command::Invoke(action) => action(self),
        }
    }

    fn either_null(&self, parent: EntityId, child: EntityId) -> bool {
        let null = self.scene.is_null(parent) || self.scene.is_null(child);
        if null {
            log::debug!("Link of {child:?} under {parent:?} skipped, one side is destroyed");
        }
        null
    }

    /// Whether the entity hangs directly off something subscribed
    fn in_live_tree(&self, entity: EntityId) -> bool {
        match self.scene.entity(entity).and_then(Entity::parent) {
            Some(parent) => self.scene.entity(parent).is_some_and(Entity::is_subscribed),
            None => self.scenes.active_root() == Some(entity),
        }
    }

    /// Bring an entity's subscription in line with its flags and position
    ///
    /// A subscribed entity whose composition changed is re-registered
    /// everywhere and newly attached behaviors are woken.
    pub(crate) fn refresh(&mut self, entity: EntityId) -> Result<(), EngineError> {
        let Some(node) = self.scene.entity(entity).filter(|node| !node.is_destroyed()) else {
            return Ok(());
        };
        let subscribed = node.is_subscribed();
        let wanted = node.is_active() && self.in_live_tree(entity);

        match (wanted, subscribed) {
            (true, false) => self.subscribe(entity),
            (false, true) => self.unsubscribe(entity),
            (true, true) => {
                self.wake(entity)?;
                self.register(entity)
            }
            (false, false) => Ok(()),
        }
    }

    /// Subscribe an entity and its active subtree
    pub(crate) fn subscribe(&mut self, entity: EntityId) -> Result<(), EngineError> {
        match self.scene.entity_mut(entity) {
            Some(node) if node.is_live() && !node.subscribed => node.subscribed = true,
            _ => return Ok(()),
        }
        log::trace!("Subscribing {entity:?}");

        self.wake(entity)?;
        self.register(entity)?;

        let children = self.scene.entity(entity).map(|node| node.children().to_vec()).unwrap_or_default();
        for child in children {
            self.subscribe(child)?;
        }
        Ok(())
    }

    /// Unsubscribe an entity and its subtree; nothing is destroyed
    pub(crate) fn unsubscribe(&mut self, entity: EntityId) -> Result<(), EngineError> {
        let children = match self.scene.entity_mut(entity) {
            Some(node) if node.subscribed => {
                node.subscribed = false;
                node.children.clone()
            }
            _ => return Ok(()),
        };
        log::trace!("Unsubscribing {entity:?}");

        self.updates.remove(entity);
        self.collisions.remove(entity)?;
        self.renderers.remove(entity);
        for child in children {
            self.unsubscribe(child)?;
        }
        Ok(())
    }

    fn register(&mut self, entity: EntityId) -> Result<(), EngineError> {
        self.updates.update(&self.scene, entity)?;
        self.collisions.update(&self.scene, entity)?;
        self.renderers.update(&self.scene, entity);
        Ok(())
    }

    /// Run `awake` on behaviors that never woke, then `start` on enabled ones
    /// that never started
    fn wake(&mut self, entity: EntityId) -> Result<(), EngineError> {
        let behaviors = self.scene.entity(entity).map(|node| node.behaviors().to_vec()).unwrap_or_default();
        let services = Services::new(&self.time, &self.layers, &self.settings);

        for &id in &behaviors {
            let Some(slot) = self.scene.behavior_slot_mut(id).filter(|slot| !slot.awoken) else {
                continue;
            };
            slot.awoken = true;
            if slot.hooks.contains(Hooks::AWAKE) {
                invoke_hook(&mut self.scene, &mut self.execution, services, id, "awake", |behavior, ctx| {
                    behavior.awake(ctx)
                })?;
            }
        }

        for &id in &behaviors {
            if !self.scene.behavior_is_live(id) {
                continue;
            }
            let Some(slot) = self.scene.behavior_slot_mut(id).filter(|slot| !slot.started) else {
                continue;
            };
            slot.started = true;
            if slot.hooks.contains(Hooks::START) {
                invoke_hook(&mut self.scene, &mut self.execution, services, id, "start", |behavior, ctx| {
                    behavior.start(ctx)
                })?;
            }
        }
        Ok(())
    }

    fn fire_on_destroy(&mut self, id: BehaviorId) -> Result<(), EngineError> {
        let fire = self
            .scene
            .behavior_slot(id)
            .is_some_and(|slot| slot.awoken && slot.hooks.contains(Hooks::DESTROY));
        if !fire {
            return Ok(());
        }
        let services = Services::new(&self.time, &self.layers, &self.settings);
        invoke_hook(&mut self.scene, &mut self.execution, services, id, "on_destroy", |behavior, ctx| {
            behavior.on_destroy(ctx)
        })
    }

    /// Tear an entity and its subtree down
    ///
    /// Unsubscribes, marks the entity destroyed (releasing its tag and
    /// reference name), ends its routines, fires `on_destroy`, destroys the
    /// children and finally frees the storage. A failing `on_destroy` does
    /// not stop the teardown; the first failure is returned at the end.
    pub(crate) fn destroy_now(&mut self, entity: EntityId) -> Result<(), EngineError> {
        if self.scene.is_null(entity) {
            return Ok(());
        }
        if self.scenes.active_root() == Some(entity) {
            self.scenes.clear_active();
        }

        self.unsubscribe(entity)?;
        self.scene.mark_destroyed(entity);
        let stopped = self.execution.stop_owned_by(entity);

        let (behaviors, children) = self
            .scene
            .entity(entity)
            .map(|node| (node.behaviors().to_vec(), node.children().to_vec()))
            .unwrap_or_default();

        let mut first_error = None;
        for id in behaviors {
            self.execution.stop_started_by(id);
            if let Err(error) = self.fire_on_destroy(id) {
                first_error.get_or_insert(error);
            }
        }
        for child in children {
            if let Err(error) = self.destroy_now(child) {
                first_error.get_or_insert(error);
            }
        }

        if let Some(node) = self.scene.entity(entity) {
            log::debug!("Destroyed '{}' ({} routines ended)", node.name(), stopped);
        }
        self.scene.free_entity(entity);
        first_error.map_or(Ok(()), Err)
    }

    /// Destroy one behavior, firing its `on_destroy`
    pub(crate) fn remove_behavior_now(&mut self, id: BehaviorId) -> Result<(), EngineError> {
        let Some(entity) = self.scene.behavior_owner(id) else {
            return Ok(());
        };
        let fired = self.fire_on_destroy(id);
        self.execution.stop_started_by(id);
        self.scene.remove_behavior_slot(id);
        self.refresh(entity)?;
        fired
    }
}

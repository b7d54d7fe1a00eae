//! Behavior model
//!
//! A behavior is user logic attached to exactly one entity. Instead of
//! looking hooks up by name, every behavior declares the hooks it implements
//! through [`Behavior::hooks`]. The set is read once when the behavior is
//! attached and the schedulers only bind what it names; everything else
//! falls through to the trait's no-op defaults.
//!
//! Hooks receive a [`BehaviorContext`], their window onto the world for the
//! duration of the call. Structural changes made through the context are
//! queued and applied at the next flush.

mod context;
mod registry;

pub use context::{BehaviorContext, Services};
pub use registry::{BehaviorFactory, BehaviorRegistry};

use std::any::Any;

use bitflags::bitflags;
use thiserror::Error;

use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId};
use crate::physics::Collision2D;
use crate::scene::Scene;
use crate::schedule::ExecutionQueue;

bitflags! {
    /// Hooks a behavior implements
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Hooks: u16 {
        /// [`Behavior::awake`]
        const AWAKE = 1 << 0;
        /// [`Behavior::start`]
        const START = 1 << 1;
        /// [`Behavior::early_update`]
        const EARLY_UPDATE = 1 << 2;
        /// [`Behavior::update`]
        const UPDATE = 1 << 3;
        /// [`Behavior::late_update`]
        const LATE_UPDATE = 1 << 4;
        /// [`Behavior::on_trigger_enter`]
        const TRIGGER_ENTER = 1 << 5;
        /// [`Behavior::on_trigger_stay`]
        const TRIGGER_STAY = 1 << 6;
        /// [`Behavior::on_trigger_exit`]
        const TRIGGER_EXIT = 1 << 7;
        /// [`Behavior::on_collision_enter`]
        const COLLISION_ENTER = 1 << 8;
        /// [`Behavior::on_collision_stay`]
        const COLLISION_STAY = 1 << 9;
        /// [`Behavior::on_collision_exit`]
        const COLLISION_EXIT = 1 << 10;
        /// [`Behavior::on_destroy`]
        const DESTROY = 1 << 11;

        /// Any per-step hook
        const STEP = Self::EARLY_UPDATE.bits() | Self::UPDATE.bits() | Self::LATE_UPDATE.bits();
        /// Any trigger-style hook
        const TRIGGER = Self::TRIGGER_ENTER.bits() | Self::TRIGGER_STAY.bits() | Self::TRIGGER_EXIT.bits();
        /// Any collision-style hook
        const COLLISION = Self::COLLISION_ENTER.bits() | Self::COLLISION_STAY.bits() | Self::COLLISION_EXIT.bits();
    }
}

/// Error returned from a behavior hook
#[derive(Error, Debug)]
pub enum HookError {
    /// Gameplay failure
    #[error("{0}")]
    Message(String),

    /// An engine call made by the hook failed
    #[error(transparent)]
    Engine(Box<EngineError>),
}

impl HookError {
    /// Gameplay failure with a message
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

impl From<EngineError> for HookError {
    fn from(error: EngineError) -> Self {
        Self::Engine(Box::new(error))
    }
}

/// Result of a behavior hook
pub type HookResult = Result<(), HookError>;

/// Downcasting support for behavior trait objects
pub trait AsAny: Any {
    /// Borrow as `Any`
    fn as_any(&self) -> &dyn Any;
    /// Mutably borrow as `Any`
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// User logic attached to an entity
///
/// Only the hooks named by [`Behavior::hooks`] are ever called.
#[allow(unused_variables)]
pub trait Behavior: AsAny {
    /// Hooks this behavior implements
    fn hooks(&self) -> Hooks;

    /// Name used in logs and errors
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Once, when the owning entity first goes live
    fn awake(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }

    /// Once, after every behavior of the entity is awake
    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }

    /// Every step, before-step phase
    fn early_update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }

    /// Every step, step phase
    fn update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }

    /// Every step, after-step phase
    fn late_update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }

    /// A collider of this entity started overlapping `other`
    fn on_trigger_enter(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        Ok(())
    }

    /// Still overlapping `other`
    fn on_trigger_stay(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        Ok(())
    }

    /// Stopped overlapping `other`
    fn on_trigger_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        Ok(())
    }

    /// Collision started
    fn on_collision_enter(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        Ok(())
    }

    /// Collision continues
    fn on_collision_stay(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        Ok(())
    }

    /// Collision ended
    fn on_collision_exit(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        Ok(())
    }

    /// The behavior or its entity is being destroyed
    fn on_destroy(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        Ok(())
    }
}

/// Storage slot of an attached behavior
pub(crate) struct BehaviorSlot {
    pub(crate) entity: EntityId,
    pub(crate) name: &'static str,
    pub(crate) hooks: Hooks,
    pub(crate) active: bool,
    pub(crate) attached: bool,
    pub(crate) awoken: bool,
    pub(crate) started: bool,
    /// Empty while one of its hooks is running
    pub(crate) instance: Option<Box<dyn Behavior>>,
}

impl BehaviorSlot {
    pub(crate) fn new(entity: EntityId, instance: Box<dyn Behavior>) -> Self {
        Self {
            entity,
            name: instance.name(),
            hooks: instance.hooks(),
            active: true,
            attached: false,
            awoken: false,
            started: false,
            instance: Some(instance),
        }
    }
}

/// Run one hook of one behavior
///
/// The instance is taken out of its slot for the call so the hook can borrow
/// the scene mutably. A behavior whose hook is already on the stack is
/// skipped.
pub(crate) fn invoke_hook<F>(
    scene: &mut Scene,
    execution: &mut ExecutionQueue,
    services: Services<'_>,
    id: BehaviorId,
    hook: &'static str,
    call: F,
) -> Result<(), EngineError>
where
    F: FnOnce(&mut dyn Behavior, &mut BehaviorContext<'_>) -> HookResult,
{
    let Some(slot) = scene.behavior_slot_mut(id) else {
        return Ok(());
    };
    let entity = slot.entity;
    let name = slot.name;
    let Some(mut instance) = slot.instance.take() else {
        log::trace!("{hook} skipped, '{name}' is already running");
        return Ok(());
    };

    let result = {
        let mut ctx = BehaviorContext::new(scene, execution, services, entity, Some(id));
        call(&mut *instance, &mut ctx)
    };

    if let Some(slot) = scene.behavior_slot_mut(id) {
        slot.instance = Some(instance);
    }

    result.map_err(|source| EngineError::Hook {
        hook,
        behavior: name.to_string(),
        entity: scene
            .entity(entity)
            .map_or_else(|| "<destroyed>".to_string(), |e| e.name().to_string()),
        source,
    })
}

//! Update scheduler
//!
//! Keeps, per registered entity, three ordered chains of behaviors: one per
//! step phase. Chains are built from each behavior's declared [`Hooks`] when
//! the entity registers; liveness is checked again at call time so a
//! behavior disabled mid-frame stops on the very next phase.

use std::collections::HashMap;

use crate::behavior::{invoke_hook, Hooks, Services};
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, EntityId};
use crate::scene::Scene;
use crate::schedule::ExecutionQueue;

/// Step phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// `early_update`
    BeforeStep,
    /// `update`
    Step,
    /// `late_update`
    AfterStep,
}

impl Phase {
    fn hook(self) -> Hooks {
        match self {
            Self::BeforeStep => Hooks::EARLY_UPDATE,
            Self::Step => Hooks::UPDATE,
            Self::AfterStep => Hooks::LATE_UPDATE,
        }
    }

    fn hook_name(self) -> &'static str {
        match self {
            Self::BeforeStep => "early_update",
            Self::Step => "update",
            Self::AfterStep => "late_update",
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
struct PhaseChains {
    before: Vec<BehaviorId>,
    step: Vec<BehaviorId>,
    after: Vec<BehaviorId>,
}

impl PhaseChains {
    fn chain(&self, phase: Phase) -> &[BehaviorId] {
        match phase {
            Phase::BeforeStep => &self.before,
            Phase::Step => &self.step,
            Phase::AfterStep => &self.after,
        }
    }
}

/// Per-frame dispatch of update hooks in registration order
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    order: Vec<EntityId>,
    chains: HashMap<EntityId, PhaseChains>,
}

impl UpdateScheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity's active behaviors
    ///
    /// Inactive or destroyed entities are skipped. Registering twice is an
    /// error; call [`UpdateScheduler::update`] after composition changes.
    pub fn add(&mut self, scene: &Scene, entity: EntityId) -> Result<(), EngineError> {
        let Some(node) = scene.entity(entity).filter(|node| node.is_live()) else {
            return Ok(());
        };
        if self.chains.contains_key(&entity) {
            return Err(EngineError::AlreadyRegistered(entity, "update scheduler"));
        }

        let mut chains = PhaseChains::default();
        for &id in node.behaviors() {
            let Some(slot) = scene.behavior_slot(id).filter(|slot| slot.active) else {
                continue;
            };
            if slot.hooks.contains(Hooks::EARLY_UPDATE) {
                chains.before.push(id);
            }
            if slot.hooks.contains(Hooks::UPDATE) {
                chains.step.push(id);
            }
            if slot.hooks.contains(Hooks::LATE_UPDATE) {
                chains.after.push(id);
            }
        }

        log::debug!(
            "Update scheduler: registered '{}' ({}/{}/{} hooks)",
            node.name(),
            chains.before.len(),
            chains.step.len(),
            chains.after.len()
        );
        self.order.push(entity);
        self.chains.insert(entity, chains);
        Ok(())
    }

    /// Re-register an entity after its composition changed
    pub fn update(&mut self, scene: &Scene, entity: EntityId) -> Result<(), EngineError> {
        self.remove(entity);
        self.add(scene, entity)
    }

    /// Drop an entity's registration, returns whether it was registered
    pub fn remove(&mut self, entity: EntityId) -> bool {
        if self.chains.remove(&entity).is_none() {
            return false;
        }
        self.order.retain(|&id| id != entity);
        true
    }

    /// Whether the entity is registered
    pub fn contains(&self, entity: EntityId) -> bool {
        self.chains.contains_key(&entity)
    }

    /// Number of registered entities
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Run one phase over every registered entity
    ///
    /// The first failing hook aborts the rest of the phase.
    pub(crate) fn dispatch(
        &self,
        phase: Phase,
        scene: &mut Scene,
        execution: &mut ExecutionQueue,
        services: Services<'_>,
    ) -> Result<(), EngineError> {
        let hook = phase.hook();
        for entity in &self.order {
            let Some(chains) = self.chains.get(entity) else { continue };
            for &id in chains.chain(phase) {
                if !scene.behavior_is_live(id) {
                    continue;
                }
                invoke_hook(scene, execution, services, id, phase.hook_name(), |behavior, ctx| {
                    if hook == Hooks::EARLY_UPDATE {
                        behavior.early_update(ctx)
                    } else if hook == Hooks::UPDATE {
                        behavior.update(ctx)
                    } else {
                        behavior.late_update(ctx)
                    }
                })?;
            }
        }
        Ok(())
    }
}

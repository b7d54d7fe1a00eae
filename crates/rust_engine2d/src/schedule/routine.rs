//! Routines: callbacks resumed across frames
//!
//! A routine is a body plus the [`Wait`] it is parked on. When the wait
//! elapses the body runs and returns the next wait, or `None` to finish.
//! Time waits are measured on the game clock, so they follow the fixed
//! step rather than wall time.

use crate::behavior::{BehaviorContext, HookError, Services};
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, EntityId, RoutineId};
use crate::scene::Scene;
use crate::schedule::ExecutionQueue;

/// Body of a routine
pub type RoutineBody = Box<dyn FnMut(&mut BehaviorContext<'_>) -> Result<Option<Wait>, HookError>>;

/// What a routine is parked on
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Wait {
    /// Game-clock seconds
    Seconds(f32),
    /// Number of fixed steps
    Steps(u32),
    /// End of the current frame, after the after-step hooks
    EndOfFrame,
}

/// Which routine pass is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutinePhase {
    /// After the collision step
    Step,
    /// After the after-step hooks
    EndOfFrame,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum WaitState {
    Until(f32),
    Steps(u32),
    EndOfFrame,
}

impl WaitState {
    fn new(wait: Wait, now: f32) -> Self {
        match wait {
            Wait::Seconds(seconds) => Self::Until(now + seconds),
            Wait::Steps(steps) => Self::Steps(steps),
            Wait::EndOfFrame => Self::EndOfFrame,
        }
    }

    /// Advance one tick of `phase`; true when the wait is over
    fn tick(&mut self, phase: RoutinePhase, now: f32) -> bool {
        match (self, phase) {
            (Self::Until(deadline), RoutinePhase::Step) => now >= *deadline,
            (Self::Steps(remaining), RoutinePhase::Step) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            (Self::EndOfFrame, RoutinePhase::EndOfFrame) => true,
            _ => false,
        }
    }
}

pub(crate) struct Routine {
    pub(crate) owner: EntityId,
    pub(crate) behavior: Option<BehaviorId>,
    state: WaitState,
    pub(crate) paused: bool,
    /// Empty while the body runs
    body: Option<RoutineBody>,
}

impl Routine {
    pub(crate) fn new(owner: EntityId, behavior: Option<BehaviorId>, wait: Wait, now: f32, body: RoutineBody) -> Self {
        Self {
            owner,
            behavior,
            state: WaitState::new(wait, now),
            paused: false,
            body: Some(body),
        }
    }
}

/// Run every routine whose wait ends in this pass
///
/// Routines started by a body wait at least until the next pass.
pub(crate) fn run_routines(
    execution: &mut ExecutionQueue,
    scene: &mut Scene,
    services: Services<'_>,
    phase: RoutinePhase,
) -> Result<(), EngineError> {
    let now = services.time.elapsed();
    let ready: Vec<RoutineId> = execution
        .routines
        .iter_mut()
        .filter(|(_, routine)| !routine.paused)
        .filter_map(|(id, routine)| routine.state.tick(phase, now).then_some(id))
        .collect();

    for id in ready {
        let Some(routine) = execution.routines.get_mut(id) else { continue };
        if routine.paused {
            continue;
        }
        let owner = routine.owner;
        let behavior = routine.behavior;
        if scene.is_null(owner) {
            execution.routines.remove(id);
            continue;
        }
        let Some(mut body) = routine.body.take() else { continue };

        let result = {
            let mut ctx = BehaviorContext::new(scene, execution, services, owner, behavior);
            body(&mut ctx)
        };

        match result {
            Ok(Some(wait)) => {
                if let Some(routine) = execution.routines.get_mut(id) {
                    routine.state = WaitState::new(wait, now);
                    routine.body = Some(body);
                }
            }
            Ok(None) => {
                execution.routines.remove(id);
            }
            Err(source) => {
                execution.routines.remove(id);
                return Err(EngineError::Hook {
                    hook: "routine",
                    behavior: behavior
                        .and_then(|b| scene.behavior_slot(b))
                        .map_or_else(|| "<routine>".to_string(), |slot| slot.name.to_string()),
                    entity: scene.entity(owner).map_or_else(String::new, |e| e.name().to_string()),
                    source,
                });
            }
        }
    }
    Ok(())
}

//! Deferred execution queue
//!
//! Following Game Engine Architecture Chapter 16.8 - Events and Message
//! Passing: structural changes are queued as explicit commands and applied
//! at one well-known point, the flush at the start of the next frame.
//!
//! A flush drains the queue it started with. Commands queued while it runs
//! land in a fresh queue and wait for the following flush.

use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId, RoutineId, SlotMap};
use crate::schedule::routine::{Routine, RoutineBody, Wait};
use crate::world::World;

/// Arbitrary deferred work
pub type Deferred = Box<dyn FnOnce(&mut World) -> Result<(), EngineError>>;

/// A queued structural change
pub enum Command {
    /// Link `child` as the last child of `parent`
    AddChild {
        /// New parent
        parent: EntityId,
        /// Entity to link
        child: EntityId,
    },
    /// Link `child` under `parent` at `index`
    InsertChild {
        /// New parent
        parent: EntityId,
        /// Position among the children, clamped
        index: usize,
        /// Entity to link
        child: EntityId,
    },
    /// Unlink `child` from `parent`; the child goes dormant, it is not destroyed
    RemoveChild {
        /// Current parent
        parent: EntityId,
        /// Entity to unlink
        child: EntityId,
    },
    /// Put `child` at `index`, unlinking whatever was there
    ReplaceChild {
        /// Parent
        parent: EntityId,
        /// Position to replace
        index: usize,
        /// Entity to link
        child: EntityId,
    },
    /// Unlink every child of `parent`
    ClearChildren {
        /// Parent
        parent: EntityId,
    },
    /// Tear down an entity and everything below it
    Destroy(EntityId),
    /// Append a stored behavior to its entity
    AttachBehavior(BehaviorId),
    /// Destroy a behavior
    RemoveBehavior(BehaviorId),
    /// Append a stored collider to its entity
    AttachCollider(ColliderId),
    /// Remove a collider
    RemoveCollider(ColliderId),
    /// Set an entity's active flag and update its registrations
    SetActive {
        /// Entity
        entity: EntityId,
        /// New flag
        active: bool,
    },
    /// Change a collider's trigger flag and re-register its entity
    SetTrigger {
        /// Collider
        collider: ColliderId,
        /// New flag
        is_trigger: bool,
    },
    /// Enable or disable a collider and re-register its entity
    SetColliderActive {
        /// Collider
        collider: ColliderId,
        /// New flag
        active: bool,
    },
    /// Re-read an entity's composition into every scheduler
    Refresh(EntityId),
    /// Replace the loaded scene
    SwitchScene(usize),
    /// Run a closure against the world
    Invoke(Deferred),
}

impl Command {
    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            Self::AddChild { .. } => "AddChild",
            Self::InsertChild { .. } => "InsertChild",
            Self::RemoveChild { .. } => "RemoveChild",
            Self::ReplaceChild { .. } => "ReplaceChild",
            Self::ClearChildren { .. } => "ClearChildren",
            Self::Destroy(_) => "Destroy",
            Self::AttachBehavior(_) => "AttachBehavior",
            Self::RemoveBehavior(_) => "RemoveBehavior",
            Self::AttachCollider(_) => "AttachCollider",
            Self::RemoveCollider(_) => "RemoveCollider",
            Self::SetActive { .. } => "SetActive",
            Self::SetTrigger { .. } => "SetTrigger",
            Self::SetColliderActive { .. } => "SetColliderActive",
            Self::Refresh(_) => "Refresh",
            Self::SwitchScene(_) => "SwitchScene",
            Self::Invoke(_) => "Invoke",
        }
    }
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Next-frame command queue plus the routine table
#[derive(Default)]
pub struct ExecutionQueue {
    next_frame: Vec<Command>,
    pub(crate) routines: SlotMap<RoutineId, Routine>,
    now: f32,
}

impl ExecutionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a command for the next flush
    pub fn do_next_frame(&mut self, command: Command) {
        log::trace!("Queued {}", command.label());
        self.next_frame.push(command);
    }

    /// Queue a closure for the next flush
    pub fn invoke_next_frame(&mut self, action: impl FnOnce(&mut World) -> Result<(), EngineError> + 'static) {
        self.do_next_frame(Command::Invoke(Box::new(action)));
    }

    /// Commands waiting for the next flush
    pub fn pending(&self) -> usize {
        self.next_frame.len()
    }

    /// Take the queue for a flush, leaving a fresh one behind
    pub(crate) fn take_queue(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.next_frame)
    }

    pub(crate) fn set_clock(&mut self, now: f32) {
        self.now = now;
    }

    /// Start a routine owned by `owner`
    pub fn start_routine(
        &mut self,
        owner: EntityId,
        behavior: Option<BehaviorId>,
        wait: Wait,
        body: RoutineBody,
    ) -> RoutineId {
        self.routines.insert(Routine::new(owner, behavior, wait, self.now, body))
    }

    fn owned_mut(&mut self, owner: EntityId, id: RoutineId) -> Result<&mut Routine, EngineError> {
        self.routines
            .get_mut(id)
            .filter(|routine| routine.owner == owner)
            .ok_or(EngineError::RoutineNotOwned)
    }

    /// Pause a routine; its wait stops advancing
    pub fn pause_routine(&mut self, owner: EntityId, id: RoutineId) -> Result<(), EngineError> {
        self.owned_mut(owner, id)?.paused = true;
        Ok(())
    }

    /// Resume a paused routine
    pub fn resume_routine(&mut self, owner: EntityId, id: RoutineId) -> Result<(), EngineError> {
        self.owned_mut(owner, id)?.paused = false;
        Ok(())
    }

    /// End a routine
    pub fn stop_routine(&mut self, owner: EntityId, id: RoutineId) -> Result<(), EngineError> {
        self.owned_mut(owner, id)?;
        self.routines.remove(id);
        Ok(())
    }

    /// End every routine of an entity, returns how many ended
    pub fn stop_owned_by(&mut self, owner: EntityId) -> usize {
        let before = self.routines.len();
        self.routines.retain(|_, routine| routine.owner != owner);
        before - self.routines.len()
    }

    /// End every routine a behavior started, returns how many ended
    pub fn stop_started_by(&mut self, behavior: BehaviorId) -> usize {
        let before = self.routines.len();
        self.routines.retain(|_, routine| routine.behavior != Some(behavior));
        before - self.routines.len()
    }

    /// Whether the routine is still scheduled
    pub fn is_running(&self, id: RoutineId) -> bool {
        self.routines.contains_key(id)
    }

    /// Whether the routine is paused
    pub fn is_paused(&self, id: RoutineId) -> bool {
        self.routines.get(id).is_some_and(|routine| routine.paused)
    }

    /// Number of scheduled routines
    pub fn routine_count(&self) -> usize {
        self.routines.len()
    }
}

//! Scheduling and lifecycle core
//!
//! One fixed step runs these phases in order:
//!
//! 1. flush of the deferred command queue
//! 2. before-step hooks (`early_update`)
//! 3. step hooks (`update`)
//! 4. collision step
//! 5. routines waiting on time or steps
//! 6. after-step hooks (`late_update`)
//! 7. routines waiting for the end of the frame
//!
//! Registration maps only change during the flush, so no phase ever sees
//! a collection it iterates being mutated.

pub mod execution;
pub mod routine;
pub mod update_scheduler;
mod object_manager;

pub use execution::{Command, Deferred, ExecutionQueue};
pub use routine::{RoutineBody, RoutinePhase, Wait};
pub use update_scheduler::{Phase, UpdateScheduler};

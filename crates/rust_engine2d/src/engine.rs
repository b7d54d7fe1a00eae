//! Core engine implementation
//!
//! [`Engine`] owns a [`World`] and drives it with a fixed timestep: real frame
//! time is accumulated and consumed in `fixed_timestep` slices, at most
//! `max_steps_per_frame` per rendered frame, then the world is rendered once.

use crate::{
    application::Application,
    behavior::HookError,
    config::ConfigError,
    core::GameSettings,
    foundation::{collections::EntityId, time::FrameTimer},
    render::RenderBackend,
    world::World,
};
use thiserror::Error;

/// Main engine struct
///
/// The engine coordinates the world and manages the main loop.
pub struct Engine {
    world: World,

    /// Frame timing
    timer: FrameTimer,

    /// Unconsumed real time, in seconds
    accumulator: f32,

    /// Whether the engine should continue running
    running: bool,
}

impl Engine {
    /// Create a new engine instance
    pub fn new(settings: GameSettings) -> Result<Self, EngineError> {
        log::info!("Initializing engine for '{}'...", settings.name);

        let world = World::new(settings)?;

        Ok(Self {
            world,
            timer: FrameTimer::new(),
            accumulator: 0.0,
            running: true,
        })
    }

    /// Run the engine main loop with the given application
    pub fn run<T: Application>(
        settings: GameSettings,
        app: &mut T,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), EngineError> {
        let mut engine = Self::new(settings)?;

        app.initialize(&mut engine)
            .map_err(|e| EngineError::ApplicationError(format!("App initialization: {e}")))?;

        log::info!("Starting main loop...");

        let result = engine.main_loop(app, backend);

        app.cleanup(&mut engine);

        log::info!("Engine shutdown complete");
        result
    }

    fn main_loop<T: Application>(
        &mut self,
        app: &mut T,
        backend: &mut dyn RenderBackend,
    ) -> Result<(), EngineError> {
        while self.running {
            let delta_time = self.timer.tick();

            app.update(self, delta_time)
                .map_err(|e| EngineError::ApplicationError(format!("App update: {e}")))?;

            self.frame(delta_time, backend)?;
        }
        Ok(())
    }

    /// Advance by `delta_time` seconds of real time and render once
    ///
    /// Returns the number of fixed steps taken.
    pub fn frame(&mut self, delta_time: f32, backend: &mut dyn RenderBackend) -> Result<u32, EngineError> {
        let step = self.world.settings().fixed_timestep;
        let max_steps = self.world.settings().max_steps_per_frame;

        self.accumulator += delta_time;
        let mut steps = 0;
        while self.accumulator >= step && steps < max_steps {
            self.world.step_frame()?;
            self.accumulator -= step;
            steps += 1;
        }
        if steps == max_steps && self.accumulator >= step {
            log::warn!(
                "Simulation falling behind, dropping {:.3}s",
                self.accumulator
            );
            self.accumulator = 0.0;
        }

        self.world.render(backend)?;
        Ok(steps)
    }

    /// Request engine shutdown
    pub fn quit(&mut self) {
        log::info!("Engine shutdown requested");
        self.running = false;
    }

    /// Whether the main loop is still running
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Get the world
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Get mutable access to the world
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Get the current frame delta time
    pub fn delta_time(&self) -> f32 {
        self.timer.delta()
    }
}

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// A scheduler already tracks this entity
    #[error("Entity {0:?} is already registered with the {1}")]
    AlreadyRegistered(EntityId, &'static str),

    /// Registration changed while the collision manager was stepping
    #[error("Collision registrations cannot change while a collision step is running")]
    RegistryLocked,

    /// A lookup missed under the throwing not-found policy
    #[error("Value not found: {0}")]
    ValueNotFound(String),

    /// More layers than fit a 32-bit mask
    #[error("{kind} registry holds {count} layers, the limit is {limit}")]
    LayerLimitExceeded {
        /// "Layer" or "Sorting layer"
        kind: &'static str,
        /// Configured count
        count: usize,
        /// Maximum count
        limit: usize,
    },

    /// Layer id outside the registry
    #[error("{kind} id {id} is out of range (0..{len})")]
    LayerOutOfRange {
        /// "Layer" or "Sorting layer"
        kind: &'static str,
        /// Requested id
        id: u32,
        /// Registry size
        len: usize,
    },

    /// Layer name not in the registry
    #[error("Unknown {kind} '{name}'")]
    UnknownLayer {
        /// "layer" or "sorting layer"
        kind: &'static str,
        /// Requested name
        name: String,
    },

    /// Tag not declared in the game settings
    #[error("Unknown tag '{0}'")]
    UnknownTag(String),

    /// Reference name already taken
    #[error("Reference name '{0}' is already in use")]
    DuplicateReference(String),

    /// No scene with this id
    #[error("Scene {0} does not exist")]
    SceneNotFound(usize),

    /// A scene is live already
    #[error("Scene '{0}' is already loaded")]
    SceneAlreadyLoaded(String),

    /// No scenes were configured
    #[error("Scene list is empty")]
    NoScenes,

    /// Parent/child link that would break the tree
    #[error("Invalid hierarchy change: {0}")]
    InvalidHierarchy(String),

    /// Scene roots do not hold components
    #[error("Scenes cannot hold components")]
    SceneComponents,

    /// Routine is unknown or belongs to another object
    #[error("Routine is not part of this object")]
    RoutineNotOwned,

    /// Entity, behavior or collider handle no longer resolves
    #[error("{0} no longer exists")]
    ObjectNotFound(&'static str),

    /// Collider shape cannot be used for overlap tests
    #[error("Invalid collider shape: {0}")]
    InvalidShape(String),

    /// A behavior hook failed
    #[error("{hook} hook failed on behavior '{behavior}' of entity '{entity}': {source}")]
    Hook {
        /// Hook name
        hook: &'static str,
        /// Behavior type name
        behavior: String,
        /// Entity name
        entity: String,
        /// Failure returned by the hook
        #[source]
        source: HookError,
    },

    /// Rendering error
    #[error("Rendering error: {0}")]
    RenderError(String),

    /// Application error
    #[error("Application error: {0}")]
    ApplicationError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

//! Host application hooks for [`Engine::run`]

use crate::config::ConfigError;
use crate::engine::{Engine, EngineError};
use thiserror::Error;

/// Game host driven by [`Engine::run`]
///
/// Gameplay belongs in behaviors. An application only prepares the world
/// (behavior factories, scene templates, the first scene) and decides when
/// the loop ends by calling [`Engine::quit`].
pub trait Application {
    /// Runs once, before the first frame
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError>;

    /// Runs at the top of every rendered frame with the real frame time in
    /// seconds; fixed steps and rendering follow
    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError>;

    /// Runs once when the loop ends, whether it quit or failed
    fn cleanup(&mut self, engine: &mut Engine) {
        let _ = engine;
    }
}

/// Failure reported by an [`Application`]
#[derive(Error, Debug)]
pub enum AppError {
    /// An engine call failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Settings or scene files could not be read
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    /// Anything else the game wants to stop on
    #[error("{0}")]
    Custom(String),
}

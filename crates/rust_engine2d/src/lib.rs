//! # Rust Engine 2D
//!
//! A 2D game engine runtime: a scene graph of entities carrying behaviors,
//! colliders and renderables, driven by a fixed-step loop.
//!
//! ## Features
//!
//! - **Scheduling Core**: Update scheduler, deferred command queue and routines
//! - **Collision Detection**: All-pairs SAT narrow phase with enter/stay/exit tracking
//! - **Scene Templates**: Scenes described in RON or TOML and loaded by id
//! - **Backend Agnostic Rendering**: Sorted draw calls through a `RenderBackend` trait
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_engine2d::prelude::*;
//!
//! struct Spinner;
//!
//! impl Behavior for Spinner {
//!     fn hooks(&self) -> Hooks {
//!         Hooks::UPDATE
//!     }
//!
//!     fn update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
//!         let delta = ctx.time().delta();
//!         if let Some(transform) = ctx.transform_mut() {
//!             transform.rotation += 90.0 * delta;
//!         }
//!         Ok(())
//!     }
//! }
//!
//! struct MyApp;
//!
//! impl Application for MyApp {
//!     fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
//!         let world = engine.world_mut();
//!         world.behavior_registry_mut().register("Spinner", || Spinner);
//!         world.set_scenes(vec![SceneTemplate::named("Main")
//!             .with_object(EntityTemplate::new("Wheel").with_behavior("Spinner"))])?;
//!         world.load_scene(0)?;
//!         Ok(())
//!     }
//!
//!     fn update(&mut self, engine: &mut Engine, _delta_time: f32) -> Result<(), AppError> {
//!         if engine.world().time().elapsed() > 5.0 {
//!             engine.quit();
//!         }
//!         Ok(())
//!     }
//! }
//!
//! struct NoDraw;
//!
//! impl RenderBackend for NoDraw {
//!     fn draw(&mut self, _call: &DrawCall<'_>) -> Result<(), EngineError> {
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     rust_engine2d::foundation::logging::init();
//!     Engine::run(GameSettings::default(), &mut MyApp, &mut NoDraw)?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

// Core engine modules
pub mod config;
pub mod core;
pub mod foundation;

pub mod behavior;
pub mod physics;
pub mod render;
pub mod scene;
pub mod schedule;

mod application;
mod engine;
mod world;

#[cfg(test)]
mod tests;

pub use application::{AppError, Application};
pub use engine::{Engine, EngineError};
pub use world::World;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        behavior::{Behavior, BehaviorContext, BehaviorRegistry, HookError, HookResult, Hooks},
        config::{Config, ConfigFormat},
        core::{GameSettings, ValueNotFoundPolicy},
        foundation::{
            collections::{BehaviorId, ColliderId, EntityId, RoutineId},
            math::{Transform2D, Vec2},
            time::GameTime,
        },
        physics::{Collider, Collision2D, Contact, LayerMask, PhysicsMaterial, Shape},
        render::{DrawCall, RenderBackend, Renderable},
        scene::{ColliderTemplate, EntityTemplate, RenderableTemplate, Scene, SceneTemplate},
        schedule::{Command, Wait},
        AppError, Application, Engine, EngineError, World,
    };
}

//! World-level tests
//!
//! These drive whole frames through a [`World`]: the flush, the update
//! phases, the collision step, routines and rendering together.

mod collision_scenarios;
mod lifecycle;

use std::cell::RefCell;
use std::rc::Rc;

use crate::behavior::{Behavior, BehaviorContext, HookResult, Hooks};
use crate::core::GameSettings;
use crate::engine::EngineError;
use crate::foundation::collections::{ColliderId, EntityId};
use crate::physics::Collision2D;
use crate::render::{DrawCall, RenderBackend};
use crate::scene::{Scene, SceneTemplate};
use crate::world::World;

pub(crate) type Log = Rc<RefCell<Vec<String>>>;

/// Drain the log
pub(crate) fn take(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

/// World with one empty scene loaded
pub(crate) fn world_with_scene(settings: GameSettings) -> (World, EntityId) {
    let mut world = World::new(settings).unwrap();
    world.set_scenes(vec![SceneTemplate::named("Test")]).unwrap();
    let root = world.load_scene(0).unwrap();
    (world, root)
}

fn owner_name(scene: &Scene, collider: ColliderId) -> String {
    scene
        .collider_owner(collider)
        .and_then(|entity| scene.entity(entity))
        .map_or_else(|| "?".to_string(), |entity| entity.name().to_string())
}

fn entity_name(scene: &Scene, entity: EntityId) -> String {
    scene.entity(entity).map_or_else(|| "?".to_string(), |entity| entity.name().to_string())
}

/// Records every hook it declares as `label:event`
pub(crate) struct Probe {
    label: String,
    hooks: Hooks,
    log: Log,
}

impl Probe {
    pub(crate) fn new(label: &str, hooks: Hooks, log: &Log) -> Self {
        Self {
            label: label.to_string(),
            hooks,
            log: Rc::clone(log),
        }
    }

    fn record(&self, event: &str) {
        self.log.borrow_mut().push(format!("{}:{event}", self.label));
    }
}

impl Behavior for Probe {
    fn hooks(&self) -> Hooks {
        self.hooks
    }

    fn awake(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("awake");
        Ok(())
    }

    fn start(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("start");
        Ok(())
    }

    fn early_update(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("early");
        Ok(())
    }

    fn update(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("update");
        Ok(())
    }

    fn late_update(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("late");
        Ok(())
    }

    fn on_trigger_enter(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        self.record(&format!("trigger_enter:{}", owner_name(ctx.scene(), other)));
        Ok(())
    }

    fn on_trigger_stay(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        self.record(&format!("trigger_stay:{}", owner_name(ctx.scene(), other)));
        Ok(())
    }

    fn on_trigger_exit(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        self.record(&format!("trigger_exit:{}", owner_name(ctx.scene(), other)));
        Ok(())
    }

    fn on_collision_enter(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        self.record(&format!("collision_enter:{}", entity_name(ctx.scene(), collision.other_entity)));
        Ok(())
    }

    fn on_collision_stay(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        self.record(&format!("collision_stay:{}", entity_name(ctx.scene(), collision.other_entity)));
        Ok(())
    }

    fn on_collision_exit(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        self.record(&format!("collision_exit:{}", entity_name(ctx.scene(), collision.other_entity)));
        Ok(())
    }

    fn on_destroy(&mut self, _ctx: &mut BehaviorContext<'_>) -> HookResult {
        self.record("destroy");
        Ok(())
    }
}

/// Backend remembering the sprites it was asked to draw
#[derive(Default)]
pub(crate) struct SpriteLog {
    pub(crate) frames: Vec<Vec<String>>,
}

impl RenderBackend for SpriteLog {
    fn begin_frame(&mut self) -> Result<(), EngineError> {
        self.frames.push(Vec::new());
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), EngineError> {
        if let Some(frame) = self.frames.last_mut() {
            frame.push(call.sprite.to_string());
        }
        Ok(())
    }
}

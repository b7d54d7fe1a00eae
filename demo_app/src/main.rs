//! Asteroid belt collision demo
//!
//! Runs the engine headless: a ship drifts through a belt of rocks, swallows
//! whatever its trigger touches, and the application keeps the belt topped
//! up. Draw calls go to a backend that only counts and logs them.

use std::path::Path;

use rand::Rng;
use rust_engine2d::foundation::logging;
use rust_engine2d::prelude::*;

const ASSETS: &str = "demo_app/assets";
const BELT_SIZE: usize = 24;
const ARENA_HALF_EXTENT: f32 = 20.0;
const RUN_SECONDS: f32 = 10.0;

/// Moves its entity at a constant velocity, wrapping at the arena edge
struct Drifter {
    velocity: Vec2,
}

impl Drifter {
    fn random() -> Self {
        let mut rng = rand::thread_rng();
        Self {
            velocity: Vec2::new(rng.gen_range(-4.0..4.0), rng.gen_range(-4.0..4.0)),
        }
    }
}

impl Behavior for Drifter {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        let delta = ctx.time().delta();
        if let Some(transform) = ctx.transform_mut() {
            transform.translate(self.velocity * delta);
            for axis in 0..2 {
                if transform.position[axis].abs() > ARENA_HALF_EXTENT {
                    transform.position[axis] = -transform.position[axis].signum() * ARENA_HALF_EXTENT;
                }
            }
        }
        Ok(())
    }
}

/// Swallows rocks that enter its trigger
#[derive(Default)]
struct Ship {
    swallowed: u32,
}

impl Behavior for Ship {
    fn hooks(&self) -> Hooks {
        Hooks::START | Hooks::TRIGGER_ENTER
    }

    fn start(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        let Some(me) = ctx.behavior() else {
            return Ok(());
        };
        ctx.start_routine(
            Wait::Seconds(2.0),
            Box::new(move |ctx| {
                if let Some(ship) = ctx.scene().behavior::<Ship>(me) {
                    log::info!("{:>5.1}s: {} rocks swallowed", ctx.time().elapsed(), ship.swallowed);
                }
                Ok(Some(Wait::Seconds(2.0)))
            }),
        );
        Ok(())
    }

    fn on_trigger_enter(&mut self, ctx: &mut BehaviorContext<'_>, other: ColliderId) -> HookResult {
        let Some(rock) = ctx.scene().collider_owner(other) else {
            return Ok(());
        };
        if ctx.scene().entity(rock).and_then(|node| node.tag()) == Some("Rock") {
            self.swallowed += 1;
            ctx.destroy(rock);
        }
        Ok(())
    }
}

/// Logs rocks bumping into each other
struct Rock;

impl Behavior for Rock {
    fn hooks(&self) -> Hooks {
        Hooks::COLLISION_ENTER
    }

    fn on_collision_enter(&mut self, _ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
        log::debug!(
            "{:?} hit {:?} at {} contact points",
            collision.entity,
            collision.other_entity,
            collision.contacts.len()
        );
        Ok(())
    }
}

/// Counts draw calls, logging a summary now and then
#[derive(Default)]
struct LogBackend {
    frames: u64,
    draws: usize,
}

impl RenderBackend for LogBackend {
    fn begin_frame(&mut self) -> Result<(), EngineError> {
        self.frames += 1;
        self.draws = 0;
        Ok(())
    }

    fn draw(&mut self, call: &DrawCall<'_>) -> Result<(), EngineError> {
        log::trace!("draw '{}' layer {} order {}", call.sprite, call.sorting_layer, call.sorting_order);
        self.draws += 1;
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), EngineError> {
        if self.frames % 120 == 0 {
            log::info!("Frame {}: {} sprites", self.frames, self.draws);
        }
        Ok(())
    }
}

struct BeltDemo {
    scene: SceneTemplate,
    elapsed: f32,
}

impl BeltDemo {
    fn rock_template() -> EntityTemplate {
        let mut rng = rand::thread_rng();
        let radius = rng.gen_range(0.4..1.2);
        EntityTemplate::new("Rock")
            .at(
                rng.gen_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
                rng.gen_range(-ARENA_HALF_EXTENT..ARENA_HALF_EXTENT),
            )
            .tagged("Rock")
            .on_layer("Rocks")
            .with_collider(ColliderTemplate::solid(Shape::circle(radius)))
            .with_renderable(RenderableTemplate {
                sorting_layer: "Foreground".to_string(),
                ..RenderableTemplate::sprite("rock")
            })
            .with_behavior("Drifter")
            .with_behavior("Rock")
    }

    /// Instantiate rocks until the belt is full again
    fn top_up(world: &mut World) -> Result<(), AppError> {
        let Some(root) = world.active_scene() else {
            return Ok(());
        };
        let present = world.scene().find_all_with_tag("Rock")?.len();
        for _ in present..BELT_SIZE {
            world.instantiate(&Self::rock_template(), root)?;
        }
        Ok(())
    }
}

impl Application for BeltDemo {
    fn initialize(&mut self, engine: &mut Engine) -> Result<(), AppError> {
        let world = engine.world_mut();
        let registry = world.behavior_registry_mut();
        registry.register("Drifter", Drifter::random);
        registry.register("Ship", Ship::default);
        registry.register("Rock", || Rock);

        world.set_scenes(vec![self.scene.clone()])?;
        world.load_scene(0)?;
        Self::top_up(world)
    }

    fn update(&mut self, engine: &mut Engine, delta_time: f32) -> Result<(), AppError> {
        self.elapsed += delta_time;
        if self.elapsed >= RUN_SECONDS {
            engine.quit();
            return Ok(());
        }
        Self::top_up(engine.world_mut())
    }

    fn cleanup(&mut self, engine: &mut Engine) {
        let world = engine.world();
        log::info!(
            "Belt demo ran {} steps over {:.1}s, {} entities alive",
            world.time().steps(),
            world.time().elapsed(),
            world.scene().entity_count()
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let settings = match GameSettings::load_from_file(Path::new(ASSETS).join("game.toml")) {
        Ok(settings) => settings,
        Err(e) => {
            logging::init();
            log::warn!("Using default settings: {e}");
            GameSettings::default()
                .with_tags(["Player", "Rock"])
                .with_layers(["Ships", "Rocks"])
                .with_sorting_layers(["Background", "Foreground"])
        }
    };
    logging::init_with_filter(&settings.developer.log_filter);
    log::info!("Starting {}", settings.name);

    let scene = SceneTemplate::load_from_file(Path::new(ASSETS).join("belt.ron"))?;
    let mut app = BeltDemo { scene, elapsed: 0.0 };
    let mut backend = LogBackend::default();

    if let Err(e) = Engine::run(settings, &mut app, &mut backend) {
        log::error!("Belt demo failed: {e}");
        return Err(e.into());
    }
    log::info!("Belt demo finished after {} frames", backend.frames);
    Ok(())
}

//! Subscription, activation, destruction and routines

use std::rc::Rc;

use super::{take, world_with_scene, Log, Probe};
use crate::behavior::{Behavior, BehaviorContext, HookResult, Hooks};
use crate::core::{GameSettings, ValueNotFoundPolicy};
use crate::engine::EngineError;
use crate::foundation::collections::EntityId;
use crate::physics::Collider;
use crate::render::Renderable;
use crate::schedule::Wait;

/// Destroys `target` from its update
struct Assassin {
    target: EntityId,
}

impl Behavior for Assassin {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        ctx.destroy(self.target);
        Ok(())
    }
}

#[test]
fn test_entities_go_live_at_next_flush() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    world.add_behavior(a, Probe::new("a", Hooks::UPDATE, &log)).unwrap();

    assert!(!world.scene().entity(a).unwrap().is_subscribed());
    assert!(world.scene().entity(root).unwrap().children().is_empty());

    world.step_frame().unwrap();
    assert!(world.scene().entity(a).unwrap().is_subscribed());
    assert_eq!(world.scene().entity(root).unwrap().children(), &[a]);
    assert_eq!(take(&log), vec!["a:update"]);
}

#[test]
fn test_detached_entities_stay_dormant() {
    let log = Log::default();
    let (mut world, _root) = world_with_scene(GameSettings::default());
    let loose = world.create_entity("loose");
    world.add_behavior(loose, Probe::new("loose", Hooks::AWAKE | Hooks::UPDATE, &log)).unwrap();

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(!world.updates().contains(loose));
}

#[test]
fn test_awake_and_start_run_once() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    world
        .add_behavior(a, Probe::new("a", Hooks::AWAKE | Hooks::START | Hooks::UPDATE, &log))
        .unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:awake", "a:start", "a:update"]);

    world.set_active(a, false).unwrap();
    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(!world.updates().contains(a));

    world.set_active(a, true).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:update"]);
}

#[test]
fn test_inactive_parent_keeps_children_dormant() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let parent = world.spawn("parent", root);
    let child = world.spawn("child", parent);
    world.add_behavior(child, Probe::new("child", Hooks::UPDATE, &log)).unwrap();
    world.set_active(parent, false).unwrap();

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(!world.scene().entity(child).unwrap().is_subscribed());

    world.set_active(parent, true).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["child:update"]);
}

#[test]
fn test_removed_child_goes_dormant_and_can_return() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    world.add_behavior(a, Probe::new("a", Hooks::AWAKE | Hooks::UPDATE, &log)).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:awake", "a:update"]);

    world.remove_child(root, a);
    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(!world.scene().is_null(a));
    assert_eq!(world.scene().entity(a).unwrap().parent(), None);

    world.insert_child(root, 0, a);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:update"]);
}

#[test]
fn test_replace_and_clear_children() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    let b = world.spawn("b", root);
    world.step_frame().unwrap();

    let c = world.create_entity("c");
    world.replace_child(root, 0, c);
    world.step_frame().unwrap();
    assert_eq!(world.scene().entity(root).unwrap().children(), &[c, b]);
    assert!(!world.scene().entity(a).unwrap().is_subscribed());
    assert!(world.scene().entity(c).unwrap().is_subscribed());

    world.clear_children(root);
    world.step_frame().unwrap();
    assert!(world.scene().entity(root).unwrap().children().is_empty());
    assert!(!world.scene().entity(b).unwrap().is_subscribed());
    assert!(!world.scene().entity(c).unwrap().is_subscribed());
}

#[test]
fn test_cycles_are_rejected() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let parent = world.spawn("parent", root);
    let child = world.spawn("child", parent);
    world.step_frame().unwrap();

    world.add_child(child, parent);
    assert!(matches!(world.step_frame(), Err(EngineError::InvalidHierarchy(_))));
    assert_eq!(world.scene().entity(parent).unwrap().parent(), Some(root));
}

#[test]
fn test_destroy_tears_down_subtree() {
    let log = Log::default();
    let settings = GameSettings::default().with_tags(["Enemy"]).with_value_not_found(ValueNotFoundPolicy::Silent);
    let (mut world, root) = world_with_scene(settings);
    let parent = world.spawn("parent", root);
    let child = world.spawn("child", parent);
    world.add_behavior(parent, Probe::new("parent", Hooks::DESTROY | Hooks::UPDATE, &log)).unwrap();
    world.add_behavior(child, Probe::new("child", Hooks::DESTROY, &log)).unwrap();
    world.add_collider(parent, Collider::circle(1.0).unwrap()).unwrap();
    world.set_renderable(parent, Some(Renderable::sprite("ship"))).unwrap();
    world.scene_mut().set_tag(parent, Some("Enemy")).unwrap();
    world.scene_mut().set_reference_name(parent, "boss").unwrap();
    world.step_frame().unwrap();
    take(&log);

    world.destroy(parent);
    assert!(!world.scene().is_null(parent));
    world.step_frame().unwrap();

    assert_eq!(take(&log), vec!["parent:destroy", "child:destroy"]);
    assert!(world.scene().is_null(parent));
    assert!(world.scene().is_null(child));
    assert!(world.scene().entity(parent).is_none());
    assert!(world.scene().entity(root).unwrap().children().is_empty());
    assert!(!world.updates().contains(parent));
    assert!(!world.collisions().is_registered(parent));
    assert!(!world.renderers().contains(parent));
    assert_eq!(world.scene().find_with_tag("Enemy").unwrap(), None);
    assert_eq!(world.scene().find_reference("boss").unwrap(), None);

    // the reference name is free again
    let heir = world.spawn("heir", root);
    world.scene_mut().set_reference_name(heir, "boss").unwrap();
}

#[test]
fn test_destroying_twice_is_harmless() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    world.step_frame().unwrap();

    world.destroy(a);
    world.destroy(a);
    world.step_frame().unwrap();
    world.destroy(a);
    world.step_frame().unwrap();
    assert!(world.scene().is_null(a));
}

#[test]
fn test_destroy_does_not_cancel_current_frame() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let victim = world.spawn("victim", root);
    let killer = world.spawn("killer", root);
    world.add_behavior(killer, Assassin { target: victim }).unwrap();
    world.add_behavior(victim, Probe::new("victim", Hooks::UPDATE, &log)).unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["victim:update"]);
    assert!(!world.scene().is_null(victim));

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(world.scene().is_null(victim));
}

#[test]
fn test_remove_behavior_fires_on_destroy() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    let probe = world.add_behavior(a, Probe::new("a", Hooks::UPDATE | Hooks::DESTROY, &log)).unwrap();
    world.step_frame().unwrap();
    take(&log);

    world.remove_behavior(probe);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:destroy"]);
    assert!(world.scene().behavior_owner(probe).is_none());
    assert!(world.scene().entity(a).unwrap().behaviors().is_empty());

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
}

#[test]
fn test_renderables_follow_subscription() {
    let (mut world, root) = world_with_scene(GameSettings::default().with_sorting_layers(["Back", "Front"]));
    let ship = world.spawn("ship", root);
    let star = world.spawn("star", root);
    let front_layer = world.layers().sorting.require("Front").unwrap();
    world.set_renderable(ship, Some(Renderable::sprite("ship").sorted(front_layer, 0))).unwrap();
    world.set_renderable(star, Some(Renderable::sprite("star"))).unwrap();

    let mut backend = super::SpriteLog::default();
    assert_eq!(world.render(&mut backend).unwrap(), 0);

    world.step_frame().unwrap();
    assert_eq!(world.render(&mut backend).unwrap(), 2);
    assert_eq!(backend.frames[1], vec!["star", "ship"]);

    world.set_active(star, false).unwrap();
    world.step_frame().unwrap();
    world.render(&mut backend).unwrap();
    assert_eq!(backend.frames[2], vec!["ship"]);
}

#[test]
fn test_routine_waits_on_game_clock() {
    let log = Log::default();
    let settings = GameSettings { fixed_timestep: 0.25, ..GameSettings::default() };
    let (mut world, root) = world_with_scene(settings);
    let a = world.spawn("a", root);
    world.step_frame().unwrap();

    let ticks = Rc::clone(&log);
    let routine = world.start_routine(a, Wait::Seconds(0.5), Box::new(move |ctx| {
        ticks.borrow_mut().push(format!("tick@{}", ctx.time().steps()));
        Ok(Some(Wait::Steps(2)))
    }));

    for _ in 0..6 {
        world.step_frame().unwrap();
    }
    assert_eq!(take(&log), vec!["tick@3", "tick@5", "tick@7"]);

    world.execution_mut().pause_routine(a, routine).unwrap();
    world.step_frame().unwrap();
    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(world.execution().is_paused(routine));

    world.execution_mut().resume_routine(a, routine).unwrap();
    world.step_frame().unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["tick@11"]);

    world.execution_mut().stop_routine(a, routine).unwrap();
    assert!(!world.execution().is_running(routine));
}

#[test]
fn test_routines_belong_to_their_owner() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    let b = world.spawn("b", root);
    let routine = world.start_routine(a, Wait::Seconds(10.0), Box::new(|_ctx| Ok(None)));

    assert!(matches!(
        world.execution_mut().stop_routine(b, routine),
        Err(EngineError::RoutineNotOwned)
    ));
    assert!(world.execution().is_running(routine));

    world.destroy(a);
    world.step_frame().unwrap();
    assert!(!world.execution().is_running(routine));
    assert_eq!(world.execution().routine_count(), 0);
}

#[test]
fn test_behavior_enabled_later_starts_then() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    let probe = world
        .add_behavior(a, Probe::new("a", Hooks::AWAKE | Hooks::START | Hooks::UPDATE, &log))
        .unwrap();
    world.scene_mut().set_behavior_active(probe, false).unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:awake"]);

    world.set_behavior_enabled(probe, true).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:start", "a:update"]);
}

/// Moves its entity to `layer` on update and records the outcome
struct LayerHopper {
    layer: u32,
    log: Log,
}

impl Behavior for LayerHopper {
    fn hooks(&self) -> Hooks {
        Hooks::UPDATE
    }

    fn update(&mut self, ctx: &mut BehaviorContext<'_>) -> HookResult {
        let outcome = match ctx.set_layer(ctx.entity(), self.layer) {
            Ok(()) => format!("layer:{}", self.layer),
            Err(EngineError::LayerOutOfRange { id, .. }) => format!("rejected:{id}"),
            Err(error) => return Err(error.into()),
        };
        self.log.borrow_mut().push(outcome);
        Ok(())
    }
}

#[test]
fn test_layer_ids_checked_against_registry() {
    let (mut world, root) = world_with_scene(GameSettings::default().with_layers(["Ships"]));
    let a = world.spawn("a", root);
    let ships = world.layers().layers.require("Ships").unwrap();

    world.set_layer(a, ships).unwrap();
    assert!(matches!(
        world.set_layer(a, 40),
        Err(EngineError::LayerOutOfRange { kind: "layer", id: 40, len: 2 })
    ));
    assert_eq!(world.scene().entity(a).unwrap().layer(), ships);

    let log = Log::default();
    world.add_behavior(a, LayerHopper { layer: 2, log: Rc::clone(&log) }).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["rejected:2"]);
    assert_eq!(world.scene().entity(a).unwrap().layer(), ships);
}

#[test]
fn test_renderable_sorting_layer_checked() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let a = world.spawn("a", root);
    assert!(matches!(
        world.set_renderable(a, Some(Renderable::sprite("ship").sorted(3, 0))),
        Err(EngineError::LayerOutOfRange { kind: "sorting layer", id: 3, len: 1 })
    ));
    assert!(world.scene().entity(a).unwrap().renderable().is_none());
    world.set_renderable(a, Some(Renderable::sprite("ship").sorted(0, 0))).unwrap();
}

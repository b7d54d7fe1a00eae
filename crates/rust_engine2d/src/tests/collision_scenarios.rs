//! Collision transitions observed through full frames

use super::{take, world_with_scene, Log, Probe};
use crate::behavior::Hooks;
use crate::core::GameSettings;
use crate::foundation::collections::{ColliderId, EntityId};
use crate::foundation::math::Vec2;
use crate::physics::Collider;
use crate::world::World;

fn place(world: &mut World, entity: EntityId, x: f32, y: f32) {
    world.scene_mut().transform_mut(entity).unwrap().position = Vec2::new(x, y);
}

fn body(world: &mut World, root: EntityId, name: &str, x: f32, collider: Collider) -> (EntityId, ColliderId) {
    let entity = world.spawn(name, root);
    place(world, entity, x, 0.0);
    let collider = world.add_collider(entity, collider).unwrap();
    (entity, collider)
}

#[test]
fn test_box_pair_enter_stay_exit() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, _) = body(&mut world, root, "a", 0.0, Collider::rect(1.0, 1.0).unwrap());
    let (b, _) = body(&mut world, root, "b", 10.0, Collider::rect(1.0, 1.0).unwrap());
    world.add_behavior(a, Probe::new("a", Hooks::TRIGGER | Hooks::COLLISION, &log)).unwrap();

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());

    place(&mut world, b, 0.0, 0.0);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_enter:b"]);

    for _ in 0..3 {
        world.step_frame().unwrap();
        assert_eq!(take(&log), vec!["a:collision_stay:b"]);
    }

    place(&mut world, b, 10.0, 0.0);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_exit:b"]);

    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
}

#[test]
fn test_exit_clears_partner() {
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (_, ca) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap());
    let (b, cb) = body(&mut world, root, "b", 1.0, Collider::circle(1.0).unwrap());

    world.step_frame().unwrap();
    assert_eq!(world.collisions().partner_of(ca), Some(cb));

    place(&mut world, b, 5.0, 0.0);
    world.step_frame().unwrap();
    assert_eq!(world.collisions().partner_of(ca), None);
    assert_eq!(world.collisions().partner_count(), 0);
}

#[test]
fn test_trigger_tracks_a_single_partner() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (sensor, sensor_collider) = body(&mut world, root, "sensor", 0.0, Collider::circle(1.0).unwrap().trigger(true));
    world
        .add_behavior(sensor, Probe::new("sensor", Hooks::TRIGGER | Hooks::COLLISION, &log))
        .unwrap();

    let (o1, c1) = body(&mut world, root, "o1", 1.5, Collider::circle(1.0).unwrap());
    let (_, _) = body(&mut world, root, "o2", -1.5, Collider::circle(1.0).unwrap());
    let (o3, c3) = body(&mut world, root, "o3", 0.0, Collider::circle(1.0).unwrap());
    place(&mut world, o3, 0.0, 1.5);

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["sensor:trigger_enter:o1"]);
    assert_eq!(world.collisions().partner_of(sensor_collider), Some(c1));

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["sensor:trigger_stay:o1"]);

    // losing the partner reports the exit with the first remaining overlap
    // and moves on to the second one in the same step
    place(&mut world, o1, 10.0, 0.0);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["sensor:trigger_exit:o2", "sensor:trigger_enter:o3"]);
    assert_eq!(world.collisions().partner_of(sensor_collider), Some(c3));

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["sensor:trigger_stay:o3"]);
}

#[test]
fn test_each_side_reports_from_its_own_turn() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, _) = body(&mut world, root, "a", 0.0, Collider::rect(2.0, 2.0).unwrap());
    let (b, _) = body(&mut world, root, "b", 1.0, Collider::rect(2.0, 2.0).unwrap());
    world.add_behavior(a, Probe::new("a", Hooks::COLLISION, &log)).unwrap();
    world.add_behavior(b, Probe::new("b", Hooks::COLLISION, &log)).unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_enter:b", "b:collision_enter:a"]);
}

#[test]
fn test_colliders_of_one_entity_never_pair() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, _) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap());
    world.add_collider(a, Collider::rect(1.0, 1.0).unwrap()).unwrap();
    world.add_behavior(a, Probe::new("a", Hooks::TRIGGER | Hooks::COLLISION, &log)).unwrap();

    for _ in 0..3 {
        world.step_frame().unwrap();
    }
    assert!(take(&log).is_empty());
    assert_eq!(world.collisions().partner_count(), 0);
}

#[test]
fn test_reregistration_keeps_callbacks() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, _) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap());
    body(&mut world, root, "b", 0.5, Collider::circle(1.0).unwrap());
    world.add_behavior(a, Probe::new("a", Hooks::COLLISION, &log)).unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_enter:b"]);

    world.collisions.update(&world.scene, a).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_stay:b"]);

    world.collisions.remove(a).unwrap();
    world.collisions.add(&world.scene, a).unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_stay:b"]);
}

#[test]
fn test_entity_without_colliders_never_dispatched() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let ghost = world.spawn("ghost", root);
    world.add_behavior(ghost, Probe::new("ghost", Hooks::TRIGGER | Hooks::COLLISION, &log)).unwrap();
    body(&mut world, root, "b", 0.0, Collider::circle(1.0).unwrap());

    world.step_frame().unwrap();
    world.step_frame().unwrap();
    assert!(!world.collisions().is_registered(ghost));
    assert!(take(&log).is_empty());
}

#[test]
fn test_removed_collider_stops_reporting() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, ca) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap());
    body(&mut world, root, "b", 0.5, Collider::circle(1.0).unwrap());
    world.add_behavior(a, Probe::new("a", Hooks::COLLISION, &log)).unwrap();

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_enter:b"]);

    world.remove_collider(ca);
    world.step_frame().unwrap();
    assert!(take(&log).is_empty());
    assert!(!world.collisions().is_registered(a));
    assert_eq!(world.collisions().partner_of(ca), None);
}

#[test]
fn test_set_trigger_switches_callback_style() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, ca) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap());
    body(&mut world, root, "b", 0.5, Collider::circle(1.0).unwrap());
    world
        .add_behavior(a, Probe::new("a", Hooks::TRIGGER_STAY | Hooks::COLLISION_STAY, &log))
        .unwrap();

    world.step_frame().unwrap();
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:collision_stay:b"]);

    world.set_trigger(ca, true);
    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["a:trigger_stay:b"]);
}

#[test]
fn test_children_collide_in_world_space() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let holder = world.spawn("holder", root);
    place(&mut world, holder, 10.0, 0.0);
    let (arm, _) = body(&mut world, holder, "arm", -10.0, Collider::circle(0.5).unwrap());
    world.add_behavior(arm, Probe::new("arm", Hooks::COLLISION_ENTER, &log)).unwrap();
    body(&mut world, root, "target", 0.0, Collider::circle(0.5).unwrap());

    world.step_frame().unwrap();
    assert_eq!(take(&log), vec!["arm:collision_enter:target"]);
}

#[test]
fn test_activating_a_collider_registers_its_entity() {
    let log = Log::default();
    let (mut world, root) = world_with_scene(GameSettings::default());
    let (a, ca) = body(&mut world, root, "a", 0.0, Collider::circle(1.0).unwrap().active(false));
    body(&mut world, root, "b", 0.5, Collider::circle(1.0).unwrap());
    world.add_behavior(a, Probe::new("a", Hooks::COLLISION, &log)).unwrap();

    world.step_frame().unwrap();
    assert!(!world.collisions().is_registered(a));
    assert!(take(&log).is_empty());

    world.set_collider_active(ca, true);
    world.step_frame().unwrap();
    assert!(world.collisions().is_registered(a));
    assert_eq!(take(&log), vec!["a:collision_enter:b"]);

    world.set_collider_active(ca, false);
    world.step_frame().unwrap();
    assert!(!world.collisions().is_registered(a));
    assert!(take(&log).is_empty());
}

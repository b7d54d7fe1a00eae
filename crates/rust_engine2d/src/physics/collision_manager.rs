//! Collision manager
//!
//! Based on Game Engine Architecture 3rd Edition, Chapter 13:
//! "The collision detection system is typically split into two phases:
//! broad-phase and narrow-phase."
//!
//! There is no broad phase here: every step tests all ordered pairs of
//! registered colliders with the SAT narrow phase. Per collider the manager
//! tracks a single partner and turns the overlap list into enter, stay and
//! exit transitions (see [`advance`]). A transition is reported to the
//! collider's own entity only; the other side hears about the pair when its
//! colliders take their turn in the outer loop.
//!
//! Registration changes are rejected while a step is running.

use std::collections::HashMap;

use crate::behavior::{invoke_hook, Hooks, Services};
use crate::engine::EngineError;
use crate::foundation::collections::{BehaviorId, ColliderId, EntityId, Key};
use crate::physics::collider::{Collider, Collision2D};
use crate::physics::collision_layers::LayerId;
use crate::physics::sat::{test_overlap, Contact};
use crate::physics::shape::ConvexShape;
use crate::scene::Scene;
use crate::schedule::ExecutionQueue;

/// Change in a collider's tracked partner during one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Started tracking this collider
    Enter(ColliderId),
    /// Still overlapping the tracked collider
    Stay(ColliderId),
    /// Stopped tracking; carries the collider the exit is reported with
    Exit(ColliderId),
}

/// Compute one collider's transitions for a step
///
/// `partner` is the tracked partner before the step, `collided` the colliders
/// it overlaps now in test order. Returns the partner after the step and the
/// transitions to report, in order.
///
/// When the tracked partner is no longer overlapped the exit is reported
/// with `collided[0]`, not with the lost partner, and tracking moves on to
/// `collided[1]` in the same step if there is one.
pub fn advance(partner: Option<ColliderId>, collided: &[ColliderId]) -> (Option<ColliderId>, Vec<Transition>) {
    let mut transitions = Vec::new();
    let Some(&first) = collided.first() else {
        return match partner {
            Some(lost) => (None, vec![Transition::Exit(lost)]),
            None => (None, transitions),
        };
    };

    let mut partner = match partner {
        None => {
            transitions.push(Transition::Enter(first));
            Some(first)
        }
        Some(current) if collided.contains(&current) => {
            transitions.push(Transition::Stay(current));
            Some(current)
        }
        Some(_) => {
            transitions.push(Transition::Exit(first));
            None
        }
    };

    if partner.is_none() {
        if let Some(&second) = collided.get(1) {
            transitions.push(Transition::Enter(second));
            partner = Some(second);
        }
    }
    (partner, transitions)
}

/// Callbacks wired for one registered entity
#[derive(Debug, Clone, Default, PartialEq)]
struct CallbackSet {
    colliders: Vec<ColliderId>,
    /// Wired when any collider is a trigger
    trigger: Option<Vec<BehaviorId>>,
    /// Wired when any collider is solid
    collision: Option<Vec<BehaviorId>>,
}

/// World-space view of one collider, taken at step start
struct ColliderSnapshot {
    entity: EntityId,
    collider: ColliderId,
    layer: LayerId,
    parts: Vec<ConvexShape>,
}

/// An overlap found for the collider under test
struct Hit {
    collider: ColliderId,
    entity: EntityId,
    contacts: Vec<Contact>,
}

/// All-pairs collision detector with single-partner transition tracking
#[derive(Debug, Default)]
pub struct CollisionManager {
    order: Vec<EntityId>,
    registered: HashMap<EntityId, CallbackSet>,
    current_partner: HashMap<ColliderId, ColliderId>,
    locked: bool,
}

impl CollisionManager {
    /// Create an empty manager
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_unlocked(&self) -> Result<(), EngineError> {
        if self.locked {
            Err(EngineError::RegistryLocked)
        } else {
            Ok(())
        }
    }

    /// Register an entity's active colliders and collision hooks
    ///
    /// Inactive or destroyed entities, and entities without active colliders,
    /// are ignored. Otherwise any previous registration is replaced. Trigger
    /// callbacks are wired when some collider is a trigger, collision
    /// callbacks when some collider is solid.
    pub fn add(&mut self, scene: &Scene, entity: EntityId) -> Result<(), EngineError> {
        self.ensure_unlocked()?;

        let Some(node) = scene.entity(entity).filter(|node| node.is_live()) else {
            return Ok(());
        };
        let colliders: Vec<ColliderId> = node
            .colliders()
            .iter()
            .copied()
            .filter(|&id| scene.collider(id).is_some_and(Collider::is_active))
            .collect();
        if colliders.is_empty() {
            return Ok(());
        }

        self.unregister(entity);

        let is_trigger = |id: &ColliderId| scene.collider(*id).is_some_and(Collider::is_trigger);
        let any_trigger = colliders.iter().any(is_trigger);
        let any_solid = !colliders.iter().all(is_trigger);

        let with_hooks = |mask: Hooks| -> Vec<BehaviorId> {
            node.behaviors()
                .iter()
                .copied()
                .filter(|&id| {
                    scene
                        .behavior_slot(id)
                        .is_some_and(|slot| slot.active && slot.hooks.intersects(mask))
                })
                .collect()
        };
        let set = CallbackSet {
            trigger: any_trigger.then(|| with_hooks(Hooks::TRIGGER)),
            collision: any_solid.then(|| with_hooks(Hooks::COLLISION)),
            colliders,
        };

        log::debug!(
            "Collision manager: registered '{}' ({} colliders, trigger: {}, solid: {})",
            node.name(),
            set.colliders.len(),
            any_trigger,
            any_solid
        );
        self.order.push(entity);
        self.registered.insert(entity, set);
        Ok(())
    }

    /// Re-register an entity after its composition changed
    pub fn update(&mut self, scene: &Scene, entity: EntityId) -> Result<(), EngineError> {
        self.remove(entity)?;
        self.add(scene, entity)
    }

    /// Drop an entity's registration
    ///
    /// Partner entries of its colliders are kept; they are ignored while the
    /// entity is unregistered and dropped once the collider is gone.
    pub fn remove(&mut self, entity: EntityId) -> Result<bool, EngineError> {
        self.ensure_unlocked()?;
        Ok(self.unregister(entity))
    }

    fn unregister(&mut self, entity: EntityId) -> bool {
        if self.registered.remove(&entity).is_none() {
            return false;
        }
        self.order.retain(|&id| id != entity);
        true
    }

    /// Whether the entity is registered
    pub fn is_registered(&self, entity: EntityId) -> bool {
        self.registered.contains_key(&entity)
    }

    /// Number of registered entities
    pub fn registered_count(&self) -> usize {
        self.order.len()
    }

    /// Tracked partner of a collider
    pub fn partner_of(&self, collider: ColliderId) -> Option<ColliderId> {
        self.current_partner.get(&collider).copied()
    }

    /// Number of colliders with a tracked partner
    pub fn partner_count(&self) -> usize {
        self.current_partner.len()
    }

    /// Whether a step is running
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Detect overlaps and report transitions
    ///
    /// A failing hook aborts the rest of the step; the lock is released
    /// either way.
    pub(crate) fn step(
        &mut self,
        scene: &mut Scene,
        execution: &mut ExecutionQueue,
        services: Services<'_>,
    ) -> Result<(), EngineError> {
        self.locked = true;
        let result = self.detect(scene, execution, services);
        self.locked = false;

        self.current_partner.retain(|collider, _| scene.collider(*collider).is_some());
        result
    }

    fn snapshot(&self, scene: &Scene) -> Vec<ColliderSnapshot> {
        let mut snapshot = Vec::new();
        for &entity in &self.order {
            let (Some(set), Some(node)) = (self.registered.get(&entity), scene.entity(entity)) else {
                continue;
            };
            let matrix = scene.world_matrix(entity);
            for &collider in &set.colliders {
                let Some(shape) = scene.collider(collider).filter(|c| c.is_active()) else {
                    continue;
                };
                snapshot.push(ColliderSnapshot {
                    entity,
                    collider,
                    layer: node.layer(),
                    parts: shape.world_parts(&matrix),
                });
            }
        }
        snapshot
    }

    fn detect(
        &mut self,
        scene: &mut Scene,
        execution: &mut ExecutionQueue,
        services: Services<'_>,
    ) -> Result<(), EngineError> {
        let snapshot = self.snapshot(scene);
        let matrix = &services.layers.collisions;

        for first in &snapshot {
            let hits: Vec<Hit> = snapshot
                .iter()
                .filter(|second| second.entity != first.entity)
                .filter(|second| matrix.allows(first.layer, second.layer))
                .filter_map(|second| {
                    let contacts = test_overlap(&first.parts, &second.parts);
                    (!contacts.is_empty()).then(|| Hit {
                        collider: second.collider,
                        entity: second.entity,
                        contacts,
                    })
                })
                .collect();

            let collided: Vec<ColliderId> = hits.iter().map(|hit| hit.collider).collect();
            let previous = self.current_partner.get(&first.collider).copied();
            let (partner, transitions) = advance(previous, &collided);
            match partner {
                Some(partner) => self.current_partner.insert(first.collider, partner),
                None => self.current_partner.remove(&first.collider),
            };

            for transition in transitions {
                log::trace!("{:?} -> {:?}", first.collider, transition);
                self.report(transition, first, &hits, &snapshot, scene, execution, services)?;
            }
        }
        Ok(())
    }

    fn report(
        &self,
        transition: Transition,
        first: &ColliderSnapshot,
        hits: &[Hit],
        snapshot: &[ColliderSnapshot],
        scene: &mut Scene,
        execution: &mut ExecutionQueue,
        services: Services<'_>,
    ) -> Result<(), EngineError> {
        let Some(set) = self.registered.get(&first.entity) else {
            return Ok(());
        };
        let (Transition::Enter(other) | Transition::Stay(other) | Transition::Exit(other)) = transition;
        let hit = hits.iter().find(|hit| hit.collider == other);
        let other_entity = hit
            .map(|hit| hit.entity)
            .or_else(|| snapshot.iter().find(|s| s.collider == other).map(|s| s.entity))
            .or_else(|| scene.collider_owner(other))
            .unwrap_or_else(EntityId::null);
        let collision = Collision2D {
            collider: first.collider,
            other_collider: other,
            entity: first.entity,
            other_entity,
            contacts: match transition {
                Transition::Exit(_) => Vec::new(),
                _ => hit.map(|hit| hit.contacts.clone()).unwrap_or_default(),
            },
        };

        let (trigger_hook, collision_hook) = match transition {
            Transition::Enter(_) => (Hooks::TRIGGER_ENTER, Hooks::COLLISION_ENTER),
            Transition::Stay(_) => (Hooks::TRIGGER_STAY, Hooks::COLLISION_STAY),
            Transition::Exit(_) => (Hooks::TRIGGER_EXIT, Hooks::COLLISION_EXIT),
        };

        for &id in set.trigger.iter().flatten() {
            if !Self::wants(scene, id, trigger_hook) {
                continue;
            }
            invoke_hook(scene, execution, services, id, hook_name(trigger_hook), |behavior, ctx| {
                match transition {
                    Transition::Enter(_) => behavior.on_trigger_enter(ctx, other),
                    Transition::Stay(_) => behavior.on_trigger_stay(ctx, other),
                    Transition::Exit(_) => behavior.on_trigger_exit(ctx, other),
                }
            })?;
        }
        for &id in set.collision.iter().flatten() {
            if !Self::wants(scene, id, collision_hook) {
                continue;
            }
            invoke_hook(scene, execution, services, id, hook_name(collision_hook), |behavior, ctx| {
                match transition {
                    Transition::Enter(_) => behavior.on_collision_enter(ctx, &collision),
                    Transition::Stay(_) => behavior.on_collision_stay(ctx, &collision),
                    Transition::Exit(_) => behavior.on_collision_exit(ctx, &collision),
                }
            })?;
        }
        Ok(())
    }

    fn wants(scene: &Scene, id: BehaviorId, hook: Hooks) -> bool {
        scene.behavior_is_live(id) && scene.behavior_slot(id).is_some_and(|slot| slot.hooks.contains(hook))
    }
}

fn hook_name(hook: Hooks) -> &'static str {
    match hook {
        h if h == Hooks::TRIGGER_ENTER => "on_trigger_enter",
        h if h == Hooks::TRIGGER_STAY => "on_trigger_stay",
        h if h == Hooks::TRIGGER_EXIT => "on_trigger_exit",
        h if h == Hooks::COLLISION_ENTER => "on_collision_enter",
        h if h == Hooks::COLLISION_STAY => "on_collision_stay",
        _ => "on_collision_exit",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::{Behavior, BehaviorContext, HookResult};
    use crate::core::{GameSettings, ValueNotFoundPolicy};
    use crate::foundation::collections::SlotMap;
    use crate::foundation::math::Vec2;
    use crate::foundation::time::GameTime;
    use crate::physics::Layers;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn ids(n: usize) -> Vec<ColliderId> {
        let mut keys: SlotMap<ColliderId, ()> = SlotMap::with_key();
        (0..n).map(|_| keys.insert(())).collect()
    }

    #[test]
    fn test_advance_enter_on_first_candidate() {
        let c = ids(3);
        let (partner, transitions) = advance(None, &[c[0], c[1], c[2]]);
        assert_eq!(partner, Some(c[0]));
        assert_eq!(transitions, vec![Transition::Enter(c[0])]);
    }

    #[test]
    fn test_advance_stay_while_partner_overlaps() {
        let c = ids(2);
        let (partner, transitions) = advance(Some(c[1]), &[c[0], c[1]]);
        assert_eq!(partner, Some(c[1]));
        assert_eq!(transitions, vec![Transition::Stay(c[1])]);
    }

    #[test]
    fn test_advance_exit_reports_first_candidate() {
        let c = ids(3);
        // partner c[2] lost, only c[0] overlaps
        let (partner, transitions) = advance(Some(c[2]), &[c[0]]);
        assert_eq!(partner, None);
        assert_eq!(transitions, vec![Transition::Exit(c[0])]);
    }

    #[test]
    fn test_advance_moves_to_second_candidate() {
        let c = ids(3);
        let (partner, transitions) = advance(Some(c[2]), &[c[0], c[1]]);
        assert_eq!(partner, Some(c[1]));
        assert_eq!(transitions, vec![Transition::Exit(c[0]), Transition::Enter(c[1])]);
    }

    #[test]
    fn test_advance_exit_when_nothing_overlaps() {
        let c = ids(1);
        assert_eq!(advance(Some(c[0]), &[]), (None, vec![Transition::Exit(c[0])]));
        assert_eq!(advance(None, &[]), (None, Vec::new()));
    }

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records trigger and collision callbacks
    struct Probe {
        hooks: Hooks,
        log: Log,
    }

    impl Behavior for Probe {
        fn hooks(&self) -> Hooks {
            self.hooks
        }

        fn on_trigger_enter(&mut self, ctx: &mut BehaviorContext<'_>, _other: ColliderId) -> HookResult {
            let name = ctx.scene().entity(ctx.entity()).map(|e| e.name().to_string()).unwrap_or_default();
            self.log.borrow_mut().push(format!("{name}:trigger_enter"));
            Ok(())
        }

        fn on_collision_enter(&mut self, ctx: &mut BehaviorContext<'_>, collision: &Collision2D) -> HookResult {
            let name = ctx.scene().entity(collision.entity).map(|e| e.name().to_string()).unwrap_or_default();
            self.log.borrow_mut().push(format!("{name}:collision_enter"));
            Ok(())
        }

        fn on_collision_stay(&mut self, ctx: &mut BehaviorContext<'_>, _collision: &Collision2D) -> HookResult {
            let name = ctx.scene().entity(ctx.entity()).map(|e| e.name().to_string()).unwrap_or_default();
            self.log.borrow_mut().push(format!("{name}:collision_stay"));
            Ok(())
        }
    }

    struct Fixture {
        scene: Scene,
        execution: ExecutionQueue,
        time: GameTime,
        layers: Layers,
        settings: GameSettings,
        log: Log,
    }

    impl Fixture {
        fn new(settings: GameSettings) -> Self {
            Self {
                scene: Scene::new::<&str>(&[], ValueNotFoundPolicy::Throw),
                execution: ExecutionQueue::new(),
                time: GameTime::new(),
                layers: Layers::from_settings(&settings).unwrap(),
                settings,
                log: Rc::default(),
            }
        }

        fn body(&mut self, name: &str, x: f32, collider: Collider, hooks: Hooks) -> (EntityId, ColliderId) {
            let entity = self.scene.create_entity(name);
            self.scene.transform_mut(entity).unwrap().position = Vec2::new(x, 0.0);
            let collider = self.scene.insert_collider(entity, collider).unwrap();
            self.scene.attach_collider(collider).unwrap();
            let probe = Probe { hooks, log: Rc::clone(&self.log) };
            let behavior = self.scene.insert_behavior(entity, Box::new(probe)).unwrap();
            self.scene.attach_behavior(behavior).unwrap();
            (entity, collider)
        }

        fn step(&mut self, manager: &mut CollisionManager) -> Result<(), EngineError> {
            let services = Services::new(&self.time, &self.layers, &self.settings);
            manager.step(&mut self.scene, &mut self.execution, services)
        }

        fn take_log(&self) -> Vec<String> {
            std::mem::take(&mut *self.log.borrow_mut())
        }
    }

    #[test]
    fn test_entity_without_colliders_is_ignored() {
        let mut fx = Fixture::new(GameSettings::default());
        let entity = fx.scene.create_entity("empty");
        let mut manager = CollisionManager::new();

        manager.add(&fx.scene, entity).unwrap();
        assert!(!manager.is_registered(entity));
    }

    #[test]
    fn test_aggregates_follow_collider_kinds() {
        let mut fx = Fixture::new(GameSettings::default());
        let (solid, _) = fx.body("solid", 0.0, Collider::circle(1.0).unwrap(), Hooks::TRIGGER | Hooks::COLLISION);
        let (sensor, _) = fx.body("sensor", 0.0, Collider::circle(1.0).unwrap().trigger(true), Hooks::TRIGGER);
        let mixed = fx.scene.create_entity("mixed");
        for trigger in [true, false] {
            let collider = fx.scene.insert_collider(mixed, Collider::circle(1.0).unwrap().trigger(trigger)).unwrap();
            fx.scene.attach_collider(collider).unwrap();
        }

        let mut manager = CollisionManager::new();
        for entity in [solid, sensor, mixed] {
            manager.add(&fx.scene, entity).unwrap();
        }

        let solid_set = &manager.registered[&solid];
        assert!(solid_set.trigger.is_none());
        assert_eq!(solid_set.collision.as_ref().map(Vec::len), Some(1));

        let sensor_set = &manager.registered[&sensor];
        assert_eq!(sensor_set.trigger.as_ref().map(Vec::len), Some(1));
        assert!(sensor_set.collision.is_none());

        let mixed_set = &manager.registered[&mixed];
        assert!(mixed_set.trigger.is_some() && mixed_set.collision.is_some());
        assert_eq!(mixed_set.colliders.len(), 2);
    }

    #[test]
    fn test_add_replaces_previous_registration() {
        let mut fx = Fixture::new(GameSettings::default());
        let (a, _) = fx.body("a", 0.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();
        let before = manager.registered[&a].clone();

        manager.add(&fx.scene, a).unwrap();
        manager.update(&fx.scene, a).unwrap();
        assert_eq!(manager.registered_count(), 1);
        assert_eq!(manager.registered[&a], before);
    }

    #[test]
    fn test_mutation_rejected_while_locked() {
        let mut fx = Fixture::new(GameSettings::default());
        let (a, _) = fx.body("a", 0.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let (b, _) = fx.body("b", 5.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();

        manager.locked = true;
        assert!(matches!(manager.add(&fx.scene, b), Err(EngineError::RegistryLocked)));
        assert!(matches!(manager.remove(a), Err(EngineError::RegistryLocked)));
        assert!(matches!(manager.update(&fx.scene, a), Err(EngineError::RegistryLocked)));
        assert!(manager.is_registered(a));
        assert!(!manager.is_registered(b));

        manager.locked = false;
        manager.add(&fx.scene, b).unwrap();
        assert!(manager.is_registered(b));
    }

    #[test]
    fn test_lock_released_after_step() {
        let mut fx = Fixture::new(GameSettings::default());
        let (a, _) = fx.body("a", 0.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();

        fx.step(&mut manager).unwrap();
        assert!(!manager.is_locked());
    }

    #[test]
    fn test_both_sides_hear_about_a_pair() {
        let mut fx = Fixture::new(GameSettings::default());
        let (a, ca) = fx.body("a", 0.0, Collider::rect(1.0, 1.0).unwrap(), Hooks::COLLISION);
        let (b, cb) = fx.body("b", 0.5, Collider::rect(1.0, 1.0).unwrap(), Hooks::COLLISION);
        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();
        manager.add(&fx.scene, b).unwrap();

        fx.step(&mut manager).unwrap();
        assert_eq!(fx.take_log(), vec!["a:collision_enter", "b:collision_enter"]);
        assert_eq!(manager.partner_of(ca), Some(cb));
        assert_eq!(manager.partner_of(cb), Some(ca));

        fx.step(&mut manager).unwrap();
        assert_eq!(fx.take_log(), vec!["a:collision_stay", "b:collision_stay"]);
    }

    #[test]
    fn test_trigger_and_collision_callbacks_fire_together() {
        let mut fx = Fixture::new(GameSettings::default());
        let mixed = fx.scene.create_entity("mixed");
        for trigger in [true, false] {
            let collider = fx.scene.insert_collider(mixed, Collider::circle(1.0).unwrap().trigger(trigger)).unwrap();
            fx.scene.attach_collider(collider).unwrap();
        }
        let probe = Probe { hooks: Hooks::TRIGGER_ENTER | Hooks::COLLISION_ENTER, log: Rc::clone(&fx.log) };
        let behavior = fx.scene.insert_behavior(mixed, Box::new(probe)).unwrap();
        fx.scene.attach_behavior(behavior).unwrap();
        let (other, _) = fx.body("other", 0.5, Collider::circle(1.0).unwrap(), Hooks::empty());

        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, mixed).unwrap();
        manager.add(&fx.scene, other).unwrap();
        fx.step(&mut manager).unwrap();

        // each of the two colliders enters, each entry fires both styles
        assert_eq!(
            fx.take_log(),
            vec!["mixed:trigger_enter", "mixed:collision_enter", "mixed:trigger_enter", "mixed:collision_enter"]
        );
    }

    #[test]
    fn test_ignored_layers_never_collide() {
        let settings = GameSettings::default().with_layers(["Rocks"]).ignoring_collisions("Rocks", "Rocks");
        let mut fx = Fixture::new(settings);
        let rocks = fx.layers.layers.require("Rocks").unwrap();
        let (a, ca) = fx.body("a", 0.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let (b, _) = fx.body("b", 0.5, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        fx.scene.set_layer(a, rocks).unwrap();
        fx.scene.set_layer(b, rocks).unwrap();

        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();
        manager.add(&fx.scene, b).unwrap();
        fx.step(&mut manager).unwrap();

        assert!(fx.take_log().is_empty());
        assert_eq!(manager.partner_of(ca), None);
    }

    #[test]
    fn test_partner_entries_of_removed_colliders_are_pruned() {
        let mut fx = Fixture::new(GameSettings::default());
        let (a, ca) = fx.body("a", 0.0, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let (b, _) = fx.body("b", 0.5, Collider::circle(1.0).unwrap(), Hooks::COLLISION);
        let mut manager = CollisionManager::new();
        manager.add(&fx.scene, a).unwrap();
        manager.add(&fx.scene, b).unwrap();
        fx.step(&mut manager).unwrap();
        assert_eq!(manager.partner_count(), 2);

        manager.remove(a).unwrap();
        fx.scene.remove_collider(ca);
        fx.step(&mut manager).unwrap();
        assert_eq!(manager.partner_of(ca), None);
    }
}

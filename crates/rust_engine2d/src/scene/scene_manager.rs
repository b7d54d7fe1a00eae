//! Scene loading and switching
//!
//! The world holds a list of [`SceneTemplate`]s and at most one loaded scene.
//! Loading instantiates a template under a fresh scene root and subscribes
//! it. Switching is queued: at the next flush the current scene is destroyed,
//! except for its top-level objects flagged `dont_destroy_on_load`, which
//! move over to the new scene root.

use crate::engine::EngineError;
use crate::foundation::collections::EntityId;
use crate::physics::Collider;
use crate::render::Renderable;
use crate::scene::template::{EntityTemplate, SceneTemplate};
use crate::schedule::Command;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ActiveScene {
    id: usize,
    root: EntityId,
}

/// Scene templates and the loaded scene
#[derive(Debug, Default)]
pub struct SceneManager {
    templates: Vec<SceneTemplate>,
    active: Option<ActiveScene>,
}

impl SceneManager {
    /// No scenes
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of scene templates
    pub fn len(&self) -> usize {
        self.templates.len()
    }

    /// Whether no templates are set
    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }

    /// Template by scene id
    pub fn template(&self, id: usize) -> Option<&SceneTemplate> {
        self.templates.get(id)
    }

    /// Scene id by name
    pub fn find(&self, name: &str) -> Option<usize> {
        self.templates.iter().position(|template| template.name == name)
    }

    /// Id of the loaded scene
    pub fn active_scene_id(&self) -> Option<usize> {
        self.active.map(|active| active.id)
    }

    /// Root entity of the loaded scene
    pub fn active_root(&self) -> Option<EntityId> {
        self.active.map(|active| active.root)
    }

    pub(crate) fn clear_active(&mut self) {
        self.active = None;
    }
}

impl World {
    /// Scene templates and the loaded scene
    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    /// Root entity of the loaded scene
    pub fn active_scene(&self) -> Option<EntityId> {
        self.scenes.active_root()
    }

    /// Replace the scene templates
    ///
    /// A loaded scene stays loaded.
    pub fn set_scenes(&mut self, templates: Vec<SceneTemplate>) -> Result<(), EngineError> {
        if templates.is_empty() {
            return Err(EngineError::NoScenes);
        }
        log::info!(
            "Scenes: {:?}",
            templates.iter().map(|template| template.name.as_str()).collect::<Vec<_>>()
        );
        self.scenes.templates = templates;
        Ok(())
    }

    /// Load the first scene, returns its root
    ///
    /// Fails when a scene is already loaded; use [`World::switch_scene`] to
    /// change scenes afterwards.
    pub fn load_scene(&mut self, id: usize) -> Result<EntityId, EngineError> {
        if let Some(active) = self.scenes.active {
            let name = self.scene.entity(active.root).map_or_else(String::new, |root| root.name().to_string());
            return Err(EngineError::SceneAlreadyLoaded(name));
        }
        if self.scenes.is_empty() {
            return Err(EngineError::NoScenes);
        }
        let template = self.scenes.template(id).cloned().ok_or(EngineError::SceneNotFound(id))?;

        let root = self.scene.create_scene_root(template.name.as_str());
        for object in &template.objects {
            let entity = self.build_entity(object)?;
            self.scene.add_child(root, entity)?;
        }
        self.scenes.active = Some(ActiveScene { id, root });
        log::info!("Loaded scene '{}' ({} objects)", template.name, template.objects.len());

        self.subscribe(root)?;
        Ok(root)
    }

    /// Switch to another scene at the next flush
    pub fn switch_scene(&mut self, id: usize) -> Result<(), EngineError> {
        if id >= self.scenes.len() {
            return Err(EngineError::SceneNotFound(id));
        }
        self.execution.do_next_frame(Command::SwitchScene(id));
        Ok(())
    }

    pub(crate) fn switch_scene_now(&mut self, id: usize) -> Result<(), EngineError> {
        if id >= self.scenes.len() {
            return Err(EngineError::SceneNotFound(id));
        }

        let mut kept = Vec::new();
        if let Some(active) = self.scenes.active.take() {
            kept = self
                .scene
                .entity(active.root)
                .map(|root| root.children().to_vec())
                .unwrap_or_default();
            kept.retain(|&child| self.scene.entity(child).is_some_and(|node| node.dont_destroy_on_load()));
            for &child in &kept {
                self.scene.detach(child);
            }
            self.destroy_now(active.root)?;
        }

        let root = self.load_scene(id)?;
        for child in kept {
            self.scene.add_child(root, child)?;
            self.refresh(child)?;
        }
        Ok(())
    }

    /// Instantiate a template under `parent`; it is linked at the next flush
    pub fn instantiate(&mut self, template: &EntityTemplate, parent: EntityId) -> Result<EntityId, EngineError> {
        let entity = self.build_entity(template)?;
        self.add_child(parent, entity);
        Ok(entity)
    }

    /// Build a dormant, detached subtree from a template
    fn build_entity(&mut self, template: &EntityTemplate) -> Result<EntityId, EngineError> {
        let entity = self.scene.create_entity(template.name.as_str());
        let layer = self.layers.layers.require(&template.layer)?;
        self.scene.set_layer(entity, layer)?;
        if let Some(node) = self.scene.entity_mut(entity) {
            node.transform = template.transform.clone();
            node.active = template.active;
            node.dont_destroy_on_load = template.dont_destroy_on_load;
        }
        if let Some(tag) = &template.tag {
            self.scene.set_tag(entity, Some(tag.as_str()))?;
        }
        if let Some(reference) = &template.reference_name {
            self.scene.set_reference_name(entity, reference)?;
        }

        for desc in &template.colliders {
            let collider = Collider::new(desc.shape.clone())?
                .with_offset(desc.offset)?
                .trigger(desc.is_trigger);
            let id = self.scene.insert_collider(entity, collider)?;
            self.scene.attach_collider(id)?;
        }

        if let Some(desc) = &template.renderable {
            let renderable = Renderable {
                sprite: desc.sprite.clone(),
                color: desc.color,
                sorting_layer: self.layers.sorting.require(&desc.sorting_layer)?,
                sorting_order: desc.sorting_order,
                visible: desc.visible,
            };
            self.scene.set_renderable(entity, Some(renderable))?;
        }

        let policy = self.settings.developer.value_not_found;
        for name in &template.behaviors {
            if let Some(behavior) = self.factories.create(name, policy)? {
                let id = self.scene.insert_behavior(entity, behavior)?;
                self.scene.attach_behavior(id)?;
            }
        }

        for child in &template.children {
            let child = self.build_entity(child)?;
            self.scene.add_child(entity, child)?;
        }
        Ok(entity)
    }
}

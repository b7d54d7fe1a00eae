//! Named behavior factories for scene templates

use std::collections::HashMap;

use crate::behavior::Behavior;
use crate::core::ValueNotFoundPolicy;
use crate::engine::EngineError;

/// Creates a fresh behavior instance
pub type BehaviorFactory = Box<dyn Fn() -> Box<dyn Behavior>>;

/// Behavior factories addressed by the names templates use
#[derive(Default)]
pub struct BehaviorRegistry {
    factories: HashMap<String, BehaviorFactory>,
}

impl BehaviorRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory, replacing any previous one of the same name
    pub fn register<B, F>(&mut self, name: impl Into<String>, factory: F)
    where
        B: Behavior,
        F: Fn() -> B + 'static,
    {
        let name = name.into();
        if self
            .factories
            .insert(name.clone(), Box::new(move || Box::new(factory()) as Box<dyn Behavior>))
            .is_some()
        {
            log::warn!("Behavior factory '{name}' replaced");
        }
    }

    /// Whether a factory is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Instantiate by name, misses go through the not-found policy
    pub fn create(&self, name: &str, policy: ValueNotFoundPolicy) -> Result<Option<Box<dyn Behavior>>, EngineError> {
        let instance = self.factories.get(name).map(|factory| factory());
        policy.resolve(instance, || format!("behavior '{name}'"))
    }
}

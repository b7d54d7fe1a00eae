//! # Game Settings
//!
//! Everything a game declares up front: tags, collision layers, sorting
//! layers, which layer pairs never collide, the fixed timestep and the
//! developer switches that decide how loud lookup misses are.
//!
//! ```toml
//! name = "Asteroids"
//! fixed_timestep = 0.0166667
//! tags = ["Player", "Enemy"]
//! layers = ["Default", "Ships", "Rocks"]
//! sorting_layers = ["Background", "Default", "Foreground"]
//! ignore_collision_layers = [["Rocks", "Rocks"]]
//!
//! [developer]
//! value_not_found = "LogError"
//! log_filter = "info"
//! ```

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::config::Config;
use crate::engine::EngineError;

/// Top-level game settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// Game name, used for logging
    pub name: String,
    /// Length of one simulation step in seconds
    pub fixed_timestep: f32,
    /// Upper bound of simulation steps per rendered frame
    pub max_steps_per_frame: u32,
    /// Tags entities may carry
    pub tags: Vec<String>,
    /// Collision layer names, id = index
    pub layers: Vec<String>,
    /// Sorting layer names, id = index, drawn in order
    pub sorting_layers: Vec<String>,
    /// Layer pairs that never collide
    pub ignore_collision_layers: Vec<(String, String)>,
    /// Development switches
    pub developer: DeveloperSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            name: "Untitled".to_string(),
            fixed_timestep: 1.0 / 60.0,
            max_steps_per_frame: 5,
            tags: Vec::new(),
            layers: vec!["Default".to_string()],
            sorting_layers: vec!["Default".to_string()],
            ignore_collision_layers: Vec::new(),
            developer: DeveloperSettings::default(),
        }
    }
}

impl Config for GameSettings {}

impl GameSettings {
    /// Builder-style tag list
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style layer list
    #[must_use]
    pub fn with_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style sorting layer list
    #[must_use]
    pub fn with_sorting_layers<I, S>(mut self, layers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sorting_layers = layers.into_iter().map(Into::into).collect();
        self
    }

    /// Builder-style ignored collision pair
    #[must_use]
    pub fn ignoring_collisions(mut self, a: impl Into<String>, b: impl Into<String>) -> Self {
        self.ignore_collision_layers.push((a.into(), b.into()));
        self
    }

    /// Builder-style not-found policy
    #[must_use]
    pub fn with_value_not_found(mut self, policy: ValueNotFoundPolicy) -> Self {
        self.developer.value_not_found = policy;
        self
    }
}

/// Development-time switches
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeveloperSettings {
    /// What happens when a lookup misses
    pub value_not_found: ValueNotFoundPolicy,
    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for DeveloperSettings {
    fn default() -> Self {
        Self {
            value_not_found: ValueNotFoundPolicy::Throw,
            log_filter: "info".to_string(),
        }
    }
}

/// How a failed lookup is reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ValueNotFoundPolicy {
    /// Return [`EngineError::ValueNotFound`]
    #[default]
    Throw,
    /// Log at error level and fall back to nothing
    LogError,
    /// Fall back to nothing
    Silent,
}

impl ValueNotFoundPolicy {
    /// Route a lookup result through the policy
    ///
    /// A hit passes through untouched. A miss becomes an error, a logged
    /// `None`, or a quiet `None`.
    pub fn resolve<T, D: Display>(
        self,
        value: Option<T>,
        what: impl FnOnce() -> D,
    ) -> Result<Option<T>, EngineError> {
        if value.is_some() {
            return Ok(value);
        }
        match self {
            Self::Throw => Err(EngineError::ValueNotFound(what().to_string())),
            Self::LogError => {
                log::error!("Value not found: {}", what());
                Ok(None)
            }
            Self::Silent => Ok(None),
        }
    }
}

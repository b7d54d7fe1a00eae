//! Collision layer system for filtering collision detection
//!
//! Based on Game Engine Architecture 3rd Edition, Section 13.3.8:
//! "Most games need to filter collisions... This is typically done via
//! collision layers or groups."
//!
//! Layers and sorting layers are named registries built once from the game
//! settings. Ids are indices, so a layer id doubles as a bit position in a
//! [`LayerMask`]; that caps both registries at 32 entries.

use bitflags::bitflags;

use crate::core::GameSettings;
use crate::engine::EngineError;

/// Maximum number of layers in a registry
pub const MAX_LAYERS: usize = 32;

/// Name of the layer inserted at id 0 when missing
pub const DEFAULT_LAYER: &str = "Default";

/// Layer id, index into a [`LayerRegistry`]
pub type LayerId = u32;

bitflags! {
    /// Set of collision layers
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct LayerMask: u32 {
        /// The default layer (id 0)
        const DEFAULT = 1;
        const _ = !0;
    }
}

impl LayerMask {
    /// Mask holding a single layer
    ///
    /// Ids past the mask width give an empty mask.
    pub fn of(layer: LayerId) -> Self {
        Self::from_bits_retain(1u32.checked_shl(layer).unwrap_or(0))
    }

    /// Mask holding the named layers
    pub fn from_names<S: AsRef<str>>(registry: &LayerRegistry, names: &[S]) -> Result<Self, EngineError> {
        names.iter().try_fold(Self::empty(), |mask, name| {
            let id = registry.require(name.as_ref())?;
            Ok(mask | Self::of(id))
        })
    }

    /// Whether the layer is in the set
    pub fn has_layer(self, layer: LayerId) -> bool {
        layer < 32 && self.contains(Self::of(layer))
    }

    /// Layer ids in the set, ascending
    pub fn layer_ids(self) -> Vec<LayerId> {
        (0..32).filter(|&id| self.has_layer(id)).collect()
    }
}

/// Which registry a name or id belongs to, for error messages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerKind {
    /// Collision layers
    Layer,
    /// Sorting (draw order) layers
    Sorting,
}

impl LayerKind {
    fn label(self) -> &'static str {
        match self {
            Self::Layer => "layer",
            Self::Sorting => "sorting layer",
        }
    }
}

/// Name to id mapping, immutable after construction
#[derive(Debug, Clone)]
pub struct LayerRegistry {
    kind: LayerKind,
    names: Vec<String>,
}

impl LayerRegistry {
    /// Build from configured names
    ///
    /// "Default" is inserted at id 0 when absent; exceeding [`MAX_LAYERS`]
    /// after that is an error.
    pub fn new<S: AsRef<str>>(kind: LayerKind, names: &[S]) -> Result<Self, EngineError> {
        let mut names: Vec<String> = names.iter().map(|name| name.as_ref().to_string()).collect();
        if !names.iter().any(|name| name == DEFAULT_LAYER) {
            names.insert(0, DEFAULT_LAYER.to_string());
        }
        if names.len() > MAX_LAYERS {
            return Err(EngineError::LayerLimitExceeded {
                kind: kind.label(),
                count: names.len(),
                limit: MAX_LAYERS,
            });
        }
        Ok(Self { kind, names })
    }

    /// Id of a layer name
    pub fn id_of(&self, name: &str) -> Option<LayerId> {
        self.names
            .iter()
            .position(|candidate| candidate == name)
            .and_then(|index| LayerId::try_from(index).ok())
    }

    /// Id of a layer name, unknown names are an error
    pub fn require(&self, name: &str) -> Result<LayerId, EngineError> {
        self.id_of(name).ok_or_else(|| EngineError::UnknownLayer {
            kind: self.kind.label(),
            name: name.to_string(),
        })
    }

    /// Name of a layer id
    pub fn name_of(&self, id: LayerId) -> Result<&str, EngineError> {
        self.names
            .get(id as usize)
            .map(String::as_str)
            .ok_or(EngineError::LayerOutOfRange { kind: self.kind.label(), id, len: self.names.len() })
    }

    /// The id itself when it names a registered layer
    pub fn check(&self, id: LayerId) -> Result<LayerId, EngineError> {
        self.name_of(id).map(|_| id)
    }

    /// Number of layers
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; the default layer is guaranteed
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Names in id order
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// Per-layer mask of layers it collides with
#[derive(Debug, Clone)]
pub struct CollisionMatrix {
    rows: [LayerMask; MAX_LAYERS],
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        Self { rows: [LayerMask::all(); MAX_LAYERS] }
    }
}

impl CollisionMatrix {
    /// Disable collisions between two layers, both directions
    pub fn ignore(&mut self, a: LayerId, b: LayerId) {
        self.rows[a as usize].remove(LayerMask::of(b));
        self.rows[b as usize].remove(LayerMask::of(a));
    }

    /// Whether entities on these layers may collide
    pub fn allows(&self, a: LayerId, b: LayerId) -> bool {
        self.rows.get(a as usize).is_some_and(|row| row.has_layer(b))
    }
}

/// All layer data a world needs
#[derive(Debug, Clone)]
pub struct Layers {
    /// Collision layers
    pub layers: LayerRegistry,
    /// Draw order layers
    pub sorting: LayerRegistry,
    /// Ignored layer pairs
    pub collisions: CollisionMatrix,
}

impl Layers {
    /// Build from game settings
    pub fn from_settings(settings: &GameSettings) -> Result<Self, EngineError> {
        let layers = LayerRegistry::new(LayerKind::Layer, &settings.layers)?;
        let sorting = LayerRegistry::new(LayerKind::Sorting, &settings.sorting_layers)?;

        let mut collisions = CollisionMatrix::default();
        for (a, b) in &settings.ignore_collision_layers {
            collisions.ignore(layers.require(a)?, layers.require(b)?);
        }

        log::debug!(
            "Layers: {:?}, sorting layers: {:?}",
            layers.names(),
            sorting.names()
        );
        Ok(Self { layers, sorting, collisions })
    }
}

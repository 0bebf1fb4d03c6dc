use bevy::prelude::*;
use std::fmt;

use super::scene_ops::CompositeId;
use super::shapes::Bounds3;

/// Identifies the base slot a load was issued for.
///
/// A completion is only accepted while both the composite and the slot
/// generation are still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub composite: CompositeId,
    pub slot: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub ticket: LoadTicket,
    pub variant: String,
    pub path: String,
}

/// A resolved base model: the scene to instance and its local extent.
#[derive(Debug, Clone)]
pub struct LoadedAsset {
    pub scene: Handle<Scene>,
    pub bounds: Bounds3,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AssetLoadError {
    #[error("no model is mapped for variant '{0}'")]
    Unmapped(String),

    #[error("failed to load '{path}': {reason}")]
    Failed { path: String, reason: String },

    #[error("'{path}' is not a usable model: {reason}")]
    Malformed { path: String, reason: String },
}

/// Variant load status as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariantStatus {
    #[default]
    Waiting,
    Loaded,
    Placeholder,
}

impl VariantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "(waiting)",
            Self::Loaded => "loaded",
            Self::Placeholder => "placeholder",
        }
    }
}

impl fmt::Display for VariantStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

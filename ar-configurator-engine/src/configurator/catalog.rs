use bevy::prelude::*;
use constants::product::{COLOR_SWATCHES, DEFAULT_COLOR, DEFAULT_VARIANT, VARIANT_MODELS};
use constants::transform_limits::{MAX_SCALE, MIN_SCALE};
use serde::{Deserialize, Serialize};

use super::color::ColorHex;
use super::composite::AttachmentFlags;

/// One selectable base model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantEntry {
    pub id: String,
    pub label: String,
    /// Model path relative to the asset root. Variants without one always
    /// use the placeholder.
    #[serde(default)]
    pub model_path: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScaleLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ScaleLimits {
    fn default() -> Self {
        Self {
            min: MIN_SCALE,
            max: MAX_SCALE,
        }
    }
}

impl ScaleLimits {
    /// Both bounds finite, positive and in order.
    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min > 0.0 && self.min <= self.max
    }

    /// NaN maps to `min`. Never panics, even on inverted limits.
    pub fn clamp(&self, scale: f32) -> f32 {
        scale.max(self.min).min(self.max)
    }
}

/// Product catalog as a Bevy asset. Mirrors `assets/catalog.json`.
#[derive(Asset, TypePath, Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductCatalog {
    pub variants: Vec<VariantEntry>,
    pub default_variant: String,
    pub default_color: ColorHex,
    pub swatches: Vec<ColorHex>,
    #[serde(default)]
    pub default_attachments: AttachmentFlags,
    #[serde(default)]
    pub scale_limits: ScaleLimits,
}

impl Default for ProductCatalog {
    fn default() -> Self {
        Self {
            variants: VARIANT_MODELS
                .iter()
                .map(|(id, label, path)| VariantEntry {
                    id: id.to_string(),
                    label: label.to_string(),
                    model_path: Some(path.to_string()),
                })
                .collect(),
            default_variant: DEFAULT_VARIANT.to_string(),
            default_color: ColorHex::new(DEFAULT_COLOR),
            swatches: COLOR_SWATCHES.iter().copied().map(ColorHex::new).collect(),
            default_attachments: AttachmentFlags::default(),
            scale_limits: ScaleLimits::default(),
        }
    }
}

impl ProductCatalog {
    /// Replaces unusable scale limits with the built-in ones.
    pub fn validated(mut self) -> Self {
        if !self.scale_limits.is_valid() {
            warn!(
                "Catalog scale limits [{}, {}] are unusable; using [{}, {}]",
                self.scale_limits.min, self.scale_limits.max, MIN_SCALE, MAX_SCALE
            );
            self.scale_limits = ScaleLimits::default();
        }
        self
    }

    pub fn variant(&self, id: &str) -> Option<&VariantEntry> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Model path for `id`, or `None` when the variant has no model mapped.
    pub fn model_path(&self, id: &str) -> Option<&str> {
        self.variant(id).and_then(|v| v.model_path.as_deref())
    }

    /// Swatch following `current`, wrapping around. Unknown colours restart
    /// at the first swatch.
    pub fn next_swatch(&self, current: ColorHex) -> Option<ColorHex> {
        let next = match self.swatches.iter().position(|c| *c == current) {
            Some(index) => (index + 1) % self.swatches.len(),
            None => 0,
        };
        self.swatches.get(next).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shipped_catalog_matches_built_in_defaults() {
        let shipped: ProductCatalog =
            serde_json::from_str(include_str!("../../assets/catalog.json")).unwrap();
        assert_eq!(shipped, ProductCatalog::default());
    }

    #[test]
    fn unknown_variant_has_no_model() {
        let catalog = ProductCatalog::default();
        assert_eq!(catalog.model_path("pro"), Some("models/pro.glb"));
        assert_eq!(catalog.model_path("deluxe"), None);
    }

    #[test]
    fn scale_is_clamped_to_limits() {
        let limits = ScaleLimits::default();
        assert_eq!(limits.clamp(0.1), 0.5);
        assert_eq!(limits.clamp(5.0), 2.0);
        assert_eq!(limits.clamp(1.25), 1.25);
        assert_eq!(limits.clamp(f32::NAN), 0.5);
    }

    #[test]
    fn inverted_limits_fall_back_to_defaults() {
        let json = include_str!("../../assets/catalog.json").replace(
            r#""scale_limits": { "min": 0.5, "max": 2.0 }"#,
            r#""scale_limits": { "min": 2.0, "max": 0.5 }"#,
        );
        let loaded: ProductCatalog = serde_json::from_str(&json).unwrap();
        assert!(!loaded.scale_limits.is_valid());
        assert_eq!(loaded.scale_limits.clamp(1.0), 0.5);

        let catalog = loaded.validated();
        assert_eq!(catalog.scale_limits, ScaleLimits::default());
        assert_eq!(catalog.scale_limits.clamp(1.0), 1.0);
    }

    #[test]
    fn non_finite_limits_are_invalid() {
        let limits = ScaleLimits {
            min: f32::NAN,
            max: 2.0,
        };
        assert!(!limits.is_valid());
        assert!(ScaleLimits::default().is_valid());
    }

    #[test]
    fn swatches_cycle() {
        let catalog = ProductCatalog::default();
        let last = *catalog.swatches.last().unwrap();
        assert_eq!(catalog.next_swatch(last), Some(catalog.swatches[0]));
        assert_eq!(
            catalog.next_swatch(ColorHex::new(0x123456)),
            Some(catalog.swatches[0])
        );
    }
}

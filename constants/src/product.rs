/// Variant selected on start-up and after a reset.
pub const DEFAULT_VARIANT: &str = "standard";

/// Known variants as `(id, label, model path relative to the asset root)`.
pub const VARIANT_MODELS: &[(&str, &str, &str)] = &[
    ("standard", "Standard", "models/standard.glb"),
    ("pro", "Pro", "models/pro.glb"),
];

/// Default product colour (blue).
pub const DEFAULT_COLOR: u32 = 0x3b82f6;

/// Swatch palette offered by the UI.
pub const COLOR_SWATCHES: &[u32] = &[0x3b82f6, 0x22c55e, 0xf59e0b, 0xef4444, 0x94a3b8, 0x111827];

/// Attachment checkboxes on start-up and after a reset.
pub const DEFAULT_GUARD_ENABLED: bool = true;
pub const DEFAULT_STAND_ENABLED: bool = false;
pub const DEFAULT_HOSE_ENABLED: bool = false;

/// Product catalog asset, relative to the asset root.
pub const CATALOG_PATH: &str = "catalog.json";

/// File name of the exported configuration.
pub const EXPORT_FILE_NAME: &str = "config.json";

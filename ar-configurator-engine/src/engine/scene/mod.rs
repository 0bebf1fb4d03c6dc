/// Scene adapter: mirrors the session's composite into entities.
pub mod composite_view;

/// Meshes and materials for procedural parts.
pub mod part_mesh;

/// Placement reticle following the tracked surface.
pub mod reticle;

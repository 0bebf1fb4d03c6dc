/// Product catalog loading and the transition into the running state.
pub mod catalog_loader;

/// glTF loading for base models, completing the session's load tickets.
pub mod variant_loader;

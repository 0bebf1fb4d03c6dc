//! Shared configuration constants for the AR product configurator.

pub mod product;
pub mod render_settings;
pub mod transform_limits;

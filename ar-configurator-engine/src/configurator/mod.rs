//! Renderer-agnostic configurator core.
//!
//! The session owns the placement state machine, the composite and the UI
//! selection. Nothing in here spawns entities or touches assets directly;
//! scene edits and load requests are queued for the engine adapter.

pub mod catalog;
pub mod color;
pub mod composite;
pub mod export;
pub mod footprint;
pub mod gesture;
pub mod loading;
pub mod recipes;
pub mod scene_ops;
pub mod session;
pub mod shapes;

pub use catalog::ProductCatalog;
pub use color::ColorHex;
pub use composite::{AttachmentFlags, AttachmentKind, ProductComposite};
pub use export::ConfigRecord;
pub use footprint::{Footprint, FootprintText};
pub use gesture::{ContactPoint, GestureInterpreter, GestureUpdate};
pub use loading::{AssetLoadError, LoadTicket, LoadedAsset, VariantStatus};
pub use session::{ConfiguratorSession, PlacementOutcome, SurfacePose};

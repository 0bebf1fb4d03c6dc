pub mod configurator;
pub mod engine;
pub mod rpc;
pub mod tools;

pub use engine::core::app_setup::create_app;

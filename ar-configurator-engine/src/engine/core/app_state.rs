use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    /// Product catalog is being fetched.
    #[default]
    Loading,
    Running,
}

/// Per-frame phases of the runtime, executed in declaration order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeSet {
    /// RPC, pointer, keyboard and surface tracking feed events in.
    Input,
    /// Commands, gestures and asset loads mutate the session.
    Apply,
    /// The scene graph follows the session.
    Scene,
    /// Footprint, notifications, exports and readouts.
    Report,
    /// Outgoing RPC traffic.
    Flush,
}

#[derive(Component)]
pub struct ReadoutText;

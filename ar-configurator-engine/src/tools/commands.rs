use bevy::prelude::*;

use crate::configurator::{AttachmentKind, ColorHex, ConfiguratorSession, PlacementOutcome};
use crate::tools::export_writer::ExportRequested;
use crate::tools::surface_tracker::SurfaceTracker;

#[cfg(not(target_arch = "wasm32"))]
use constants::transform_limits::{SCALE_STEP, YAW_STEP};

/// One UI action, mapped 1:1 onto a session operation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfiguratorCommand {
    PlaceOrReposition,
    ArmReposition,
    Reset,
    Export,
    SelectVariant(String),
    PickColor(ColorHex),
    SetScale(f32),
    SetYaw(f32),
    ToggleAttachment { kind: AttachmentKind, enabled: bool },
}

/// Source of a command for debugging and conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandSource {
    Rpc,
    Keyboard,
    Pointer,
}

#[derive(Event, Debug, Clone)]
pub struct CommandEvent {
    pub command: ConfiguratorCommand,
    pub source: CommandSource,
}

impl CommandEvent {
    pub fn new(command: ConfiguratorCommand, source: CommandSource) -> Self {
        Self { command, source }
    }
}

/// Applies queued commands to the session in arrival order.
pub fn apply_configurator_commands(
    mut events: EventReader<CommandEvent>,
    mut session: ResMut<ConfiguratorSession>,
    tracker: Res<SurfaceTracker>,
    mut exports: EventWriter<ExportRequested>,
) {
    for event in events.read() {
        debug!("{:?} via {:?}", event.command, event.source);

        match &event.command {
            ConfiguratorCommand::PlaceOrReposition => {
                if session.request_place_or_reposition(tracker.latest())
                    == PlacementOutcome::Ignored
                {
                    debug!("Placement request from {:?} ignored", event.source);
                }
            }
            ConfiguratorCommand::ArmReposition => {
                if session.arm_reposition() {
                    info!("Reposition armed: next tap moves the product");
                } else {
                    debug!("Reposition requested before placement");
                }
            }
            ConfiguratorCommand::Reset => session.reset(),
            ConfiguratorCommand::Export => {
                exports.write(ExportRequested {
                    record: session.export(),
                });
            }
            ConfiguratorCommand::SelectVariant(variant) => {
                session.set_variant(variant);
            }
            ConfiguratorCommand::PickColor(color) => session.set_color(*color),
            ConfiguratorCommand::SetScale(scale) => {
                session.set_scale(*scale);
            }
            ConfiguratorCommand::SetYaw(yaw) => session.set_yaw(*yaw),
            ConfiguratorCommand::ToggleAttachment { kind, enabled } => {
                session.set_attachment(*kind, *enabled);
            }
        }
    }
}

/// System handling keyboard shortcuts for configurator actions (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_configurator_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    session: Res<ConfiguratorSession>,
    mut command_events: EventWriter<CommandEvent>,
) {
    let mut send = |command| {
        command_events.write(CommandEvent::new(command, CommandSource::Keyboard));
    };
    let selection = session.selection();
    let catalog = session.catalog();

    for (key, index) in [(KeyCode::Digit1, 0), (KeyCode::Digit2, 1)] {
        if keyboard.just_pressed(key) {
            if let Some(variant) = catalog.variants.get(index) {
                send(ConfiguratorCommand::SelectVariant(variant.id.clone()));
            }
        }
    }

    if keyboard.just_pressed(KeyCode::KeyC) {
        if let Some(color) = catalog.next_swatch(selection.color) {
            send(ConfiguratorCommand::PickColor(color));
        }
    }

    for (key, kind) in [
        (KeyCode::KeyG, AttachmentKind::Guard),
        (KeyCode::KeyS, AttachmentKind::Stand),
        (KeyCode::KeyH, AttachmentKind::Hose),
    ] {
        if keyboard.just_pressed(key) {
            send(ConfiguratorCommand::ToggleAttachment {
                kind,
                enabled: !selection.attachments.get(kind),
            });
        }
    }

    if keyboard.just_pressed(KeyCode::Minus) {
        send(ConfiguratorCommand::SetScale(selection.scale - SCALE_STEP));
    }
    if keyboard.just_pressed(KeyCode::Equal) {
        send(ConfiguratorCommand::SetScale(selection.scale + SCALE_STEP));
    }

    if let Some((_, yaw)) = session.composite_scale_yaw() {
        if keyboard.just_pressed(KeyCode::BracketLeft) {
            send(ConfiguratorCommand::SetYaw(yaw - YAW_STEP));
        }
        if keyboard.just_pressed(KeyCode::BracketRight) {
            send(ConfiguratorCommand::SetYaw(yaw + YAW_STEP));
        }
    }

    if keyboard.just_pressed(KeyCode::KeyR) {
        send(ConfiguratorCommand::ArmReposition);
    }
    if keyboard.just_pressed(KeyCode::Backspace) {
        send(ConfiguratorCommand::Reset);
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        send(ConfiguratorCommand::Export);
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_configurator_shortcuts() {
    // No keyboard shortcuts in WASM builds - configurator controlled via RPC only.
}

/// Left click stands in for the XR select action on native builds.
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_pointer_taps(
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut command_events: EventWriter<CommandEvent>,
) {
    if mouse_button.just_pressed(MouseButton::Left) {
        command_events.write(CommandEvent::new(
            ConfiguratorCommand::PlaceOrReposition,
            CommandSource::Pointer,
        ));
    }
}

/// Taps arrive through the `place` RPC in WASM builds.
#[cfg(target_arch = "wasm32")]
pub fn handle_pointer_taps() {}

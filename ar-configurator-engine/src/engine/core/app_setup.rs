use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;

use crate::configurator::{ConfiguratorSession, ProductCatalog};
use crate::engine::camera::viewer_camera::{ViewerPose, apply_viewer_pose, spawn_viewer_camera};
use crate::engine::core::app_state::{AppState, ReadoutText, RuntimeSet};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::catalog_loader::{CatalogLoader, load_catalog_system, start_loading};
use crate::engine::loading::variant_loader::{
    VariantLoader, dispatch_variant_loads, poll_variant_loads,
};
use crate::engine::scene::composite_view::{
    CompositeView, apply_scene_ops, sync_composite_view, tint_scene_instance,
};
use crate::engine::scene::reticle::{spawn_reticle, update_reticle};
use crate::engine::systems::footprint_tracking::{footprint_notification_system, track_footprint};
use crate::engine::systems::ui_sync::session_notification_system;
use crate::rpc::web_rpc::WebRpcPlugin;
use crate::tools::{
    commands::{
        CommandEvent, apply_configurator_commands, handle_configurator_shortcuts,
        handle_pointer_taps,
    },
    export_writer::{ExportRequested, ExportSettings, write_exports},
    gestures::{TouchGestures, touch_gesture_system},
    surface_tracker::{SurfaceTracker, expire_stale_surface, track_cursor_surface},
};

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::ui_sync::readout_text_update_system;

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers ProductCatalog as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ProductCatalog>::new(&["json"]))
        .add_plugins(WebRpcPlugin);

    // Initialise resources early
    app.init_resource::<ConfiguratorSession>()
        .init_resource::<CatalogLoader>()
        .init_resource::<VariantLoader>()
        .init_resource::<CompositeView>()
        .init_resource::<SurfaceTracker>()
        .init_resource::<TouchGestures>()
        .init_resource::<ViewerPose>()
        .init_resource::<ExportSettings>()
        .add_event::<CommandEvent>()
        .add_event::<ExportRequested>()
        .add_observer(tint_scene_instance);

    app.configure_sets(
        Update,
        (
            RuntimeSet::Input,
            RuntimeSet::Apply,
            RuntimeSet::Scene,
            RuntimeSet::Report,
            RuntimeSet::Flush,
        )
            .chain(),
    );

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            load_catalog_system.run_if(in_state(AppState::Loading)),
        );

    app.add_systems(
        Update,
        (
            track_cursor_surface,          // Native cursor raycast or no-op for WASM
            handle_configurator_shortcuts, // Native shortcuts or no-op for WASM
            handle_pointer_taps,
            apply_viewer_pose,
        )
            .chain()
            .in_set(RuntimeSet::Input)
            .run_if(in_state(AppState::Running)),
    )
    .add_systems(
        Update,
        (
            apply_configurator_commands,
            touch_gesture_system,
            dispatch_variant_loads,
            poll_variant_loads,
        )
            .chain()
            .in_set(RuntimeSet::Apply)
            .run_if(in_state(AppState::Running)),
    )
    .add_systems(
        Update,
        (apply_scene_ops, sync_composite_view, update_reticle)
            .chain()
            .in_set(RuntimeSet::Scene)
            .run_if(in_state(AppState::Running)),
    )
    .add_systems(
        Update,
        (
            track_footprint,
            footprint_notification_system,
            session_notification_system,
            write_exports,
            expire_stale_surface,
        )
            .chain()
            .in_set(RuntimeSet::Report)
            .run_if(in_state(AppState::Running)),
    );

    // Readout overlay only exists in native builds.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(
            Update,
            readout_text_update_system
                .in_set(RuntimeSet::Report)
                .after(track_footprint),
        );
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 300.0,
        ..default()
    });
}

// Startup system that only handles basic initialisation
fn setup(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    spawn_lighting(&mut commands);
    spawn_viewer_camera(&mut commands);
    spawn_reticle(&mut commands, &mut meshes, &mut materials);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("Loading catalog..."),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                ReadoutText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}

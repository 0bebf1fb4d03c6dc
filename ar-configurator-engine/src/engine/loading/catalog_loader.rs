use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::product::CATALOG_PATH;

use crate::configurator::{ConfiguratorSession, ProductCatalog};
use crate::engine::core::app_state::AppState;

#[derive(Resource, Default)]
pub struct CatalogLoader {
    handle: Option<Handle<ProductCatalog>>,
}

// Start the loading process
pub fn start_loading(mut catalog_loader: ResMut<CatalogLoader>, asset_server: Res<AssetServer>) {
    catalog_loader.handle = Some(asset_server.load(CATALOG_PATH));
}

/// Installs the shipped catalog, or keeps the built-in one if it fails to
/// load, then moves on to `Running`.
pub fn load_catalog_system(
    catalog_loader: Res<CatalogLoader>,
    catalogs: Res<Assets<ProductCatalog>>,
    asset_server: Res<AssetServer>,
    mut session: ResMut<ConfiguratorSession>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = catalog_loader.handle.as_ref() else {
        return;
    };

    if let Some(catalog) = catalogs.get(handle) {
        info!(
            "Product catalog loaded: {} variants, {} swatches",
            catalog.variants.len(),
            catalog.swatches.len()
        );
        session.replace_catalog(catalog.clone());
        next_state.set(AppState::Running);
        return;
    }

    if let Some(LoadState::Failed(err)) = asset_server.get_load_state(handle) {
        warn!("Product catalog unavailable ({err}); using built-in defaults");
        next_state.set(AppState::Running);
    }
}

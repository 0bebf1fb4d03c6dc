use bevy::prelude::*;
use constants::product::EXPORT_FILE_NAME;
use std::path::PathBuf;

use crate::configurator::ConfigRecord;
use crate::rpc::web_rpc::WebRpcInterface;

/// Where native builds write exported configurations.
#[derive(Resource, Debug, Clone)]
pub struct ExportSettings {
    pub directory: PathBuf,
    pub file_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("exports"),
            file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

/// Snapshot taken by an `Export` command, waiting to be written out.
#[derive(Event, Debug, Clone)]
pub struct ExportRequested {
    pub record: ConfigRecord,
}

/// Hands every export to the host page; native builds also write the file.
pub fn write_exports(
    mut events: EventReader<ExportRequested>,
    settings: Res<ExportSettings>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        let content = match event.record.to_json_pretty() {
            Ok(content) => content,
            Err(err) => {
                error!("{err}");
                continue;
            }
        };

        #[cfg(not(target_arch = "wasm32"))]
        match event.record.write_to(&settings.directory, &settings.file_name) {
            Ok(path) => info!("Configuration exported to {}", path.display()),
            Err(err) => error!("{err}"),
        }

        rpc_interface.send_notification(
            "config_export",
            serde_json::json!({
                "filename": settings.file_name,
                "content": content,
            }),
        );
    }
}

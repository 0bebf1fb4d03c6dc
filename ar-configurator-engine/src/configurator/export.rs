use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::color::ColorHex;
use super::composite::AttachmentFlags;
use super::footprint::FootprintText;

/// Exported configuration, written as `config.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub variant: String,
    pub color: ColorHex,
    pub scale: f32,
    pub attachments: AttachmentFlags,
    pub footprint: FootprintText,
}

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("failed to serialise configuration: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write configuration: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigRecord {
    pub fn to_json_pretty(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Writes the record to `dir/file_name`, creating `dir` if needed.
    pub fn write_to(&self, dir: &Path, file_name: &str) -> Result<PathBuf, ExportError> {
        let json = self.to_json_pretty()?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(file_name);
        std::fs::write(&path, json)?;
        Ok(path)
    }
}

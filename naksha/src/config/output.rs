//! Output configuration section.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::defaults;

/// Output settings section
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputSection {
    /// Output directory path
    #[serde(default = "defaults::output_dir")]
    pub dir: String,

    /// Image file name; the extension picks the format (`.png` or `.pgm`)
    #[serde(default = "defaults::image_name")]
    pub image_name: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: defaults::output_dir(),
            image_name: defaults::image_name(),
        }
    }
}

impl OutputSection {
    /// Full path of the exported image.
    pub fn image_path(&self) -> PathBuf {
        PathBuf::from(&self.dir).join(&self.image_name)
    }
}

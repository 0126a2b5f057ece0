use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Highest accepted resampling resolution
pub const MAX_RESAMPLE_DPI: u32 = 2400;

/// Complete conversion configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConversionOptions {
    // Input and output
    pub input_dir: PathBuf,
    pub output: PathBuf,

    // Viewer settings
    pub page_layout: Option<PageLayout>,
    pub direction: Option<Direction>,

    // Image processing: 0 keeps the source resolution
    pub resample_dpi: u32,

    // Document structure
    pub outlines: bool,
    pub compress: bool,

    // Read overrides from an `@pdf ...` file in the input directory
    pub metafile: bool,

    // Log what would happen without running mogrify or writing the output
    pub dry_run: bool,

    pub mogrify_path: PathBuf,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::new(),
            output: PathBuf::new(),
            page_layout: None,
            direction: None,
            resample_dpi: 0,
            outlines: false,
            compress: false,
            metafile: false,
            dry_run: false,
            mogrify_path: PathBuf::from("mogrify"),
        }
    }
}

impl ConversionOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ConvertError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConvertError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.input_dir.as_os_str().is_empty() {
            return Err(ConvertError::Config(
                "No input directory specified".to_string(),
            ));
        }

        if self.output.as_os_str().is_empty() && !self.dry_run {
            return Err(ConvertError::Config("No output file specified".to_string()));
        }

        if self.resample_dpi > MAX_RESAMPLE_DPI {
            return Err(ConvertError::Config(format!(
                "Resample resolution {} dpi exceeds the maximum of {} dpi",
                self.resample_dpi, MAX_RESAMPLE_DPI
            )));
        }

        if self.mogrify_path.as_os_str().is_empty() {
            return Err(ConvertError::Config(
                "mogrify path must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Output version required by the viewer settings alone
    pub fn required_version(&self) -> &'static str {
        let mut version = BASE_PDF_VERSION;
        if let Some(layout) = self.page_layout {
            version = max_version(version, layout.min_version());
        }
        if let Some(direction) = self.direction {
            version = max_version(version, direction.min_version());
        }
        version
    }
}

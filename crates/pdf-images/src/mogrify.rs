//! ImageMagick `mogrify` invocation
//!
//! Each source image is converted into a single-page PDF in the temp
//! directory. `mogrify -path` keeps the image's base name, so the page's
//! outline label survives the conversion.

use crate::scan::extension;
use crate::types::*;
use image::{ColorType, ImageDecoder, ImageReader};
use log::debug;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extensions that are recompressed when resampling; TIFF pages are kept as is
const RESAMPLED_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

const CENTIMETERS_PER_INCH: f64 = 2.54;

/// How one image is turned into a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PagePlan {
    /// Convert to a gray colorspace before recompressing as JPEG
    pub grayscale: bool,
    /// Target resolution in dots per inch
    pub resample_dpi: Option<u32>,
}

/// Decide how to convert `image` for the given resampling resolution
///
/// Only PNG and JPEG images are resampled. Grayscale PNGs (which include
/// 1-bit scans) are converted to gray explicitly, as JPEG has no 1-bit mode.
pub async fn plan_page(image: &Path, resample_dpi: u32) -> Result<PagePlan> {
    if resample_dpi == 0 {
        return Ok(PagePlan::default());
    }

    let ext = extension(image).unwrap_or_default();
    if !RESAMPLED_EXTENSIONS.contains(&ext.as_str()) {
        return Ok(PagePlan::default());
    }

    let grayscale = if ext == "png" {
        let image = image.to_owned();
        tokio::task::spawn_blocking(move || is_grayscale(&image)).await??
    } else {
        false
    };

    Ok(PagePlan {
        grayscale,
        resample_dpi: Some(resample_dpi),
    })
}

/// Whether the image header declares a grayscale color type
pub fn is_grayscale(path: &Path) -> Result<bool> {
    let decoder = ImageReader::open(path)?.with_guessed_format()?.into_decoder()?;
    Ok(matches!(
        decoder.color_type(),
        ColorType::L8 | ColorType::La8 | ColorType::L16 | ColorType::La16
    ))
}

/// `mogrify`'s resolution unit, rounded to two decimals
fn pixels_per_centimeter(dpi: u32) -> f64 {
    (f64::from(dpi) / CENTIMETERS_PER_INCH * 100.0).round() / 100.0
}

/// A ready-to-run `mogrify` command line
#[derive(Debug, Clone, PartialEq)]
pub struct MogrifyCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl MogrifyCommand {
    pub fn new(program: impl Into<PathBuf>, image: &Path, temp_dir: &Path, plan: PagePlan) -> Self {
        let mut args: Vec<String> = vec!["-path".to_string(), temp_dir.display().to_string()];

        if plan.grayscale {
            args.extend(["-colorspace".to_string(), "gray".to_string()]);
        }
        if let Some(dpi) = plan.resample_dpi {
            args.extend([
                "-units".to_string(),
                "pixelspercentimeter".to_string(),
                "-resample".to_string(),
                pixels_per_centimeter(dpi).to_string(),
                "-unsharp".to_string(),
                "2x2+0.7+0.02".to_string(),
                "-compress".to_string(),
                "jpeg".to_string(),
                "-quality".to_string(),
                "60".to_string(),
            ]);
        }

        args.extend([
            "-format".to_string(),
            "pdf".to_string(),
            "-define".to_string(),
            format!("registry:temporary-path={}", temp_dir.display()),
            image.display().to_string(),
        ]);

        Self {
            program: program.into(),
            args,
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Run the command, failing on a non-zero exit status
    pub async fn run(&self) -> Result<()> {
        debug!("{}", self);
        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .output()
            .await
            .map_err(|e| ConvertError::ExternalTool {
                command: self.to_string(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ConvertError::ExternalTool {
                command: self.to_string(),
                reason: format!("{} {}", output.status, stderr.trim()),
            });
        }
        Ok(())
    }
}

impl fmt::Display for MogrifyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

//! Per-directory overrides stored in a file name
//!
//! An empty file named like `@pdf --pagelayout TwoPageRight --outlines` in
//! the image directory carries conversion flags, so a directory can be
//! converted with the right settings without remembering them.

use crate::options::ConversionOptions;
use crate::types::*;
use clap::Parser;
use log::{info, warn};
use std::path::Path;

/// File name prefix that marks a metafile
pub const METAFILE_PREFIX: &str = "@pdf ";

/// Flags accepted in a metafile name
#[derive(Parser, Debug, Default, PartialEq)]
#[command(name = "@pdf", disable_help_flag = true, disable_version_flag = true)]
pub struct MetafileArgs {
    #[arg(long = "pagelayout", value_enum)]
    pub page_layout: Option<PageLayout>,

    #[arg(long, value_enum)]
    pub direction: Option<Direction>,

    /// Resampling resolution in dpi
    #[arg(long)]
    pub resample: Option<u32>,

    #[arg(long, overrides_with = "no_outlines")]
    pub outlines: bool,

    #[arg(long, overrides_with = "outlines")]
    pub no_outlines: bool,

    #[arg(long, alias = "objectstream", overrides_with = "no_compress")]
    pub compress: bool,

    #[arg(long, alias = "no-objectstream", overrides_with = "compress")]
    pub no_compress: bool,

    /// Accepted for older metafiles; linearized output is not produced
    #[arg(long, hide = true, overrides_with = "no_linearize")]
    pub linearize: bool,

    #[arg(long, hide = true, overrides_with = "linearize")]
    pub no_linearize: bool,
}

impl MetafileArgs {
    /// Override `options` with the flags present in the metafile
    pub fn apply(&self, options: &mut ConversionOptions) {
        if let Some(layout) = self.page_layout {
            options.page_layout = Some(layout);
        }
        if let Some(direction) = self.direction {
            options.direction = Some(direction);
        }
        if let Some(dpi) = self.resample {
            options.resample_dpi = dpi;
        }
        set_flag(&mut options.outlines, self.outlines, self.no_outlines);
        set_flag(&mut options.compress, self.compress, self.no_compress);
        if self.linearize {
            warn!("metafile asks for --linearize, which is not supported; ignoring");
        }
    }
}

/// Turn `value` on or off when either flag is given, otherwise keep it
pub fn set_flag(value: &mut bool, on: bool, off: bool) {
    if on {
        *value = true;
    } else if off {
        *value = false;
    }
}

/// Parse the flags of a metafile name (with or without the `@pdf ` prefix)
pub fn parse_metafile(name: &str) -> Result<MetafileArgs> {
    let flags = name.strip_prefix(METAFILE_PREFIX).unwrap_or(name);
    MetafileArgs::try_parse_from(std::iter::once("@pdf").chain(flags.split_whitespace())).map_err(
        |e| ConvertError::Metafile {
            name: name.to_string(),
            reason: e.to_string().trim().to_string(),
        },
    )
}

/// Find and parse the metafile in `dir`
///
/// When several metafiles exist, the first by name wins.
pub async fn find_metafile(dir: impl AsRef<Path>) -> Result<Option<MetafileArgs>> {
    let mut entries = tokio::fs::read_dir(dir.as_ref()).await?;
    let mut names = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(METAFILE_PREFIX) && entry.file_type().await?.is_file() {
            names.push(name);
        }
    }

    names.sort();
    if names.len() > 1 {
        warn!(
            "found {} metafiles in {}; using '{}'",
            names.len(),
            dir.as_ref().display(),
            names[0]
        );
    }

    match names.first() {
        Some(name) => {
            info!("reading settings from metafile '{}'", name);
            parse_metafile(name).map(Some)
        }
        None => Ok(None),
    }
}

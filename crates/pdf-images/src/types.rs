use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Outline error: {0}")]
    Outline(#[from] pdf_outline::OutlineError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid metafile '{name}': {reason}")]
    Metafile { name: String, reason: String },
    #[error("{command} failed: {reason}")]
    ExternalTool { command: String, reason: String },
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error("No images found in {0}")]
    NoImages(String),
    #[error("No pages to join")]
    NoPages,
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Version written when nothing requires a newer one
pub const BASE_PDF_VERSION: &str = "1.4";

/// Initial page layout (`/PageLayout` in the catalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageLayout {
    /// One page at a time
    #[value(name = "SinglePage")]
    SinglePage,
    /// Continuous scrolling
    #[value(name = "OneColumn")]
    OneColumn,
    /// Continuous two-page spreads, odd pages on the left
    #[value(name = "TwoColumnLeft")]
    TwoColumnLeft,
    /// Continuous two-page spreads, odd pages on the right (cover shown alone)
    #[value(name = "TwoColumnRight")]
    TwoColumnRight,
    /// Two-page spreads, odd pages on the left
    #[value(name = "TwoPageLeft")]
    TwoPageLeft,
    /// Two-page spreads, odd pages on the right (cover shown alone)
    #[value(name = "TwoPageRight")]
    TwoPageRight,
}

impl PageLayout {
    /// PDF name of the layout
    pub fn name(self) -> &'static str {
        match self {
            PageLayout::SinglePage => "SinglePage",
            PageLayout::OneColumn => "OneColumn",
            PageLayout::TwoColumnLeft => "TwoColumnLeft",
            PageLayout::TwoColumnRight => "TwoColumnRight",
            PageLayout::TwoPageLeft => "TwoPageLeft",
            PageLayout::TwoPageRight => "TwoPageRight",
        }
    }

    /// Oldest PDF version that defines the layout
    pub fn min_version(self) -> &'static str {
        match self {
            PageLayout::TwoPageLeft | PageLayout::TwoPageRight => "1.5",
            _ => BASE_PDF_VERSION,
        }
    }
}

/// Reading direction (`/ViewerPreferences /Direction`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// Left to right, bound on the left
    #[value(name = "L2R")]
    L2R,
    /// Right to left, bound on the right (vertical writing)
    #[value(name = "R2L")]
    R2L,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::L2R => "L2R",
            Direction::R2L => "R2L",
        }
    }

    pub fn min_version(self) -> &'static str {
        "1.3"
    }
}

/// Parse a `major.minor` version string; anything unparsable sorts first
fn version_key(version: &str) -> (u32, u32) {
    let mut parts = version.trim().splitn(2, '.');
    let major = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
    (major, minor)
}

/// The newer of two PDF version strings
pub fn max_version<'a>(a: &'a str, b: &'a str) -> &'a str {
    if version_key(b) > version_key(a) { b } else { a }
}

pub mod assemble;
mod convert;
mod metafile;
mod mogrify;
mod options;
mod scan;
mod types;

pub use assemble::{apply_viewer_preferences, join_documents, load_pdf, save_pdf};
pub use convert::{ConversionReport, convert, preview_outline};
pub use metafile::{METAFILE_PREFIX, MetafileArgs, find_metafile, parse_metafile, set_flag};
pub use mogrify::{MogrifyCommand, PagePlan, is_grayscale, plan_page};
pub use options::*;
pub use scan::{SUPPORTED_IMAGE_EXTENSIONS, is_supported_image, list_images, list_pages, page_stems};
pub use types::*;

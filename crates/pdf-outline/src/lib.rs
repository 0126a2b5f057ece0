mod builder;
mod constants;
mod label;
mod pdf;
mod types;

pub use builder::{OutlineBuilder, build_outline};
pub use constants::*;
pub use label::{page_label, page_labels, tokenize};
pub use pdf::{read_outline, write_outline};
pub use types::*;

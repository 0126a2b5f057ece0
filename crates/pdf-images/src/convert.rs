//! Image directory to PDF conversion
//!
//! This module orchestrates a conversion run:
//! 1. Apply metafile overrides
//! 2. Convert every image into a single-page PDF with mogrify
//! 3. Join the pages and apply viewer settings and the outline
//! 4. Save the result

use crate::assemble::{apply_viewer_preferences, join_documents, load_pdf, save_pdf};
use crate::metafile::find_metafile;
use crate::mogrify::{MogrifyCommand, plan_page};
use crate::options::ConversionOptions;
use crate::scan::{list_images, list_pages, page_stems};
use crate::types::*;
use log::{debug, info, warn};
use lopdf::Document;
use pdf_outline::{BookmarkNode, PageLabel, build_outline, page_label, page_labels, tokenize, write_outline};
use std::path::{Path, PathBuf};

/// Temp directory name prefix, created inside the input directory
const TEMP_DIR_PREFIX: &str = ".images2pdf-";

/// Summary of a conversion run
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub images: usize,
    pub pages: usize,
    pub outline_entries: usize,
    pub version: String,
    /// Written file; `None` for a dry run
    pub output: Option<PathBuf>,
}

/// Convert the image directory described by `options` into one PDF
pub async fn convert(options: &ConversionOptions) -> Result<ConversionReport> {
    options.validate()?;
    let mut options = options.clone();

    if options.metafile {
        if let Some(overrides) = find_metafile(&options.input_dir).await? {
            overrides.apply(&mut options);
            options.validate()?;
        }
    }

    let images = list_images(&options.input_dir).await?;
    if images.is_empty() {
        return Err(ConvertError::NoImages(
            options.input_dir.display().to_string(),
        ));
    }

    if options.dry_run {
        return dry_run(&images, &options).await;
    }

    let temp_dir = tempfile::Builder::new()
        .prefix(TEMP_DIR_PREFIX)
        .tempdir_in(&options.input_dir)?;

    for image in &images {
        let plan = plan_page(image, options.resample_dpi).await?;
        MogrifyCommand::new(&options.mogrify_path, image, temp_dir.path(), plan)
            .run()
            .await?;
    }

    let page_paths = list_pages(temp_dir.path()).await?;
    let mut documents = Vec::with_capacity(page_paths.len());
    for path in &page_paths {
        documents.push(load_pdf(path).await?);
    }
    let stems = page_stems(&page_paths);

    let settings = options.clone();
    let (doc, outline_entries) =
        tokio::task::spawn_blocking(move || assemble(documents, &stems, &settings)).await??;

    let report = ConversionReport {
        images: images.len(),
        pages: doc.get_pages().len(),
        outline_entries,
        version: doc.version.clone(),
        output: Some(options.output.clone()),
    };

    info!("convert pdf: {}", options.output.display());
    save_pdf(doc, &options.output).await?;
    temp_dir.close()?;

    Ok(report)
}

/// Join the converted pages and apply every document-level setting
fn assemble(
    documents: Vec<Document>,
    stems: &[String],
    options: &ConversionOptions,
) -> Result<(Document, usize)> {
    let labels = if options.outlines {
        labels_by_first_page(&documents, stems)
    } else {
        Vec::new()
    };

    let mut doc = join_documents(documents)?;
    apply_viewer_preferences(&mut doc, options.page_layout, options.direction)?;

    let mut outline_entries = 0;
    if options.outlines {
        let roots = build_outline(&labels)?;
        outline_entries = entry_count(&roots);
        write_outline(&mut doc, &roots)?;
    }

    let pruned = doc.prune_objects();
    debug!("pruned {} unreferenced objects", pruned.len());
    if options.compress {
        doc.compress();
    }

    Ok((doc, outline_entries))
}

/// Label each converted document with the index of its first page
///
/// A multi-page TIFF becomes several pages; its entries jump to the first.
fn labels_by_first_page(documents: &[Document], stems: &[String]) -> Vec<PageLabel> {
    let mut labels = Vec::with_capacity(documents.len());
    let mut first_page = 0;

    for (doc, stem) in documents.iter().zip(stems) {
        let page_count = doc.get_pages().len();
        if page_count == 0 {
            warn!("'{}' converted to a document without pages", stem);
            continue;
        }
        labels.push(PageLabel::new(first_page, tokenize(page_label(stem))));
        first_page += page_count;
    }

    labels
}

/// Log the planned commands and the outline without touching the disk
async fn dry_run(images: &[PathBuf], options: &ConversionOptions) -> Result<ConversionReport> {
    let temp_dir = options.input_dir.join(format!("{TEMP_DIR_PREFIX}XXXXXX"));
    for image in images {
        let plan = plan_page(image, options.resample_dpi).await?;
        let command = MogrifyCommand::new(&options.mogrify_path, image, &temp_dir, plan);
        info!("mogrify: {}", command);
    }

    let mut outline_entries = 0;
    if options.outlines {
        let roots = build_outline(&page_labels(page_stems(images)))?;
        outline_entries = entry_count(&roots);
        for root in &roots {
            for (depth, node) in root.walk() {
                info!("outline: {}{} (p. {})", "  ".repeat(depth), node.title, node.target_page + 1);
            }
        }
    }

    info!("convert pdf (dry run): {}", options.output.display());
    Ok(ConversionReport {
        images: images.len(),
        pages: images.len(),
        outline_entries,
        version: options.required_version().to_string(),
        output: None,
    })
}

/// Outline that `convert` would generate for the images in `dir`
pub async fn preview_outline(dir: impl AsRef<Path>) -> Result<Vec<BookmarkNode>> {
    let images = list_images(dir).await?;
    Ok(build_outline(&page_labels(page_stems(&images)))?)
}

fn entry_count(roots: &[BookmarkNode]) -> usize {
    roots.iter().map(|root| 1 + root.descendant_count()).sum()
}

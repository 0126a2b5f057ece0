use lopdf::{Dictionary, Document, Object, Stream};
use pdf_images::*;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SAMPLE_PAGES: [&str; 8] = [
    "p.001 1 title ※note.png",
    "p.002 ❶1.1 title.jpg",
    "p.003 ❷1.1.1 title.tif",
    "p.004.jpg",
    "p.005 2 title ※note ❶2.1 title.png",
    "p.006 ❶2.2 title ❶2.3 title.jpeg",
    "p.007 3 title ⓿4 title.tiff",
    "p.008.png",
];

fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.4");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

fn image_dir(names: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for name in names {
        std::fs::write(dir.path().join(name), b"").unwrap();
    }
    dir
}

fn options_for(input: &Path, output: PathBuf) -> ConversionOptions {
    ConversionOptions {
        input_dir: input.to_path_buf(),
        output,
        ..Default::default()
    }
}

/// A stand-in for mogrify that copies a one-page PDF to `<-path>/<stem>.pdf`
#[cfg(unix)]
fn fake_mogrify(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let template = dir.join("template.pdf");
    let mut doc = create_test_pdf(1);
    doc.save(&template).unwrap();

    let script = dir.join("mogrify");
    std::fs::write(
        &script,
        format!(
            "#!/bin/sh\nout=\"$2\"\nfor last; do :; done\nname=$(basename \"$last\")\ncp \"{}\" \"$out/${{name%.*}}.pdf\"\n",
            template.display()
        ),
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();
    script
}

#[tokio::test]
async fn test_list_images_sorted_and_filtered() {
    let dir = image_dir(&["b.png", "a.JPG", "notes.txt", "@pdf --outlines", "c.tif"]);
    let images = list_images(dir.path()).await.unwrap();
    let names: Vec<_> = images
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.JPG", "b.png", "c.tif"]);
}

#[tokio::test]
async fn test_list_images_rejects_duplicate_stems() {
    let dir = image_dir(&["p.001.png", "p.001.jpg"]);
    assert!(matches!(
        list_images(dir.path()).await,
        Err(ConvertError::Config(_))
    ));
}

#[tokio::test]
async fn test_preview_outline() {
    let dir = image_dir(&SAMPLE_PAGES);
    let roots = preview_outline(dir.path()).await.unwrap();

    let titles: Vec<&str> = roots.iter().map(|r| r.title.as_str()).collect();
    assert_eq!(titles, vec!["1 title", "2 title", "3 title", "4 title"]);
    assert_eq!(roots[0].children[0].children[0].title, "1.1.1 title");
    assert_eq!(roots[1].children.len(), 3);
    assert_eq!(roots[3].target_page, 6);
}

#[tokio::test]
async fn test_convert_without_images() {
    let dir = image_dir(&["readme.txt"]);
    let options = options_for(dir.path(), dir.path().join("out.pdf"));
    assert!(matches!(convert(&options).await, Err(ConvertError::NoImages(_))));
}

#[tokio::test]
async fn test_dry_run_writes_nothing() {
    let dir = image_dir(&SAMPLE_PAGES);
    let output = dir.path().join("out").join("book.pdf");
    let mut options = options_for(dir.path(), output.clone());
    options.dry_run = true;
    options.outlines = true;
    options.page_layout = Some(PageLayout::TwoPageRight);

    let report = convert(&options).await.unwrap();

    assert_eq!(report.images, 8);
    assert_eq!(report.outline_entries, 9);
    assert_eq!(report.version, "1.5");
    assert_eq!(report.output, None);
    assert!(!output.exists());
    assert!(!dir.path().join("out").exists());
}

#[tokio::test]
async fn test_dry_run_reads_metafile() {
    let mut names = SAMPLE_PAGES.to_vec();
    names.push("@pdf --pagelayout TwoPageLeft --outlines");
    let dir = image_dir(&names);

    let mut options = options_for(dir.path(), dir.path().join("book.pdf"));
    options.dry_run = true;
    options.metafile = true;

    let report = convert(&options).await.unwrap();
    assert_eq!(report.outline_entries, 9);
    assert_eq!(report.version, "1.5");
}

#[tokio::test]
async fn test_invalid_metafile_fails() {
    let dir = image_dir(&["p.001.png", "@pdf --resample lots"]);
    let mut options = options_for(dir.path(), dir.path().join("book.pdf"));
    options.dry_run = true;
    options.metafile = true;

    assert!(matches!(
        convert(&options).await,
        Err(ConvertError::Metafile { .. })
    ));
}

#[cfg(unix)]
#[tokio::test]
async fn test_convert_with_outline_and_layout() {
    let tools = TempDir::new().unwrap();
    let dir = image_dir(&SAMPLE_PAGES);
    let output = tools.path().join("out").join("book.pdf");

    let mut options = options_for(dir.path(), output.clone());
    options.mogrify_path = fake_mogrify(tools.path());
    options.outlines = true;
    options.page_layout = Some(PageLayout::TwoPageRight);
    options.direction = Some(Direction::R2L);

    let report = convert(&options).await.unwrap();
    assert_eq!(report.pages, 8);
    assert_eq!(report.outline_entries, 9);
    assert_eq!(report.output, Some(output.clone()));

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 8);
    assert_eq!(doc.version, "1.5");

    let catalog_id = doc.trailer.get(b"Root").unwrap().as_reference().unwrap();
    let catalog = doc.get_dictionary(catalog_id).unwrap();
    assert_eq!(
        catalog.get(b"PageLayout").unwrap().as_name().unwrap(),
        b"TwoPageRight"
    );

    let outline = pdf_outline::read_outline(&doc).unwrap();
    assert_eq!(outline, preview_outline(dir.path()).await.unwrap());

    // The temp directory is removed after the run
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().starts_with(".images2pdf-"))
        .collect();
    assert!(leftovers.is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_convert_without_outline_option() {
    let tools = TempDir::new().unwrap();
    let dir = image_dir(&SAMPLE_PAGES[..3]);
    let output = tools.path().join("book.pdf");

    let mut options = options_for(dir.path(), output.clone());
    options.mogrify_path = fake_mogrify(tools.path());
    options.compress = true;

    let report = convert(&options).await.unwrap();
    assert_eq!(report.outline_entries, 0);

    let doc = load_pdf(&output).await.unwrap();
    assert_eq!(doc.get_pages().len(), 3);
    assert!(pdf_outline::read_outline(&doc).unwrap().is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_mogrify_reports_command() {
    use std::os::unix::fs::PermissionsExt;

    let tools = TempDir::new().unwrap();
    let script = tools.path().join("mogrify");
    std::fs::write(&script, "#!/bin/sh\necho 'no decode delegate' >&2\nexit 1\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let dir = image_dir(&["p.001.png"]);
    let mut options = options_for(dir.path(), tools.path().join("book.pdf"));
    options.mogrify_path = script;

    match convert(&options).await {
        Err(ConvertError::ExternalTool { command, reason }) => {
            assert!(command.contains("p.001.png"));
            assert!(reason.contains("no decode delegate"));
        }
        other => panic!("Expected ExternalTool error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_mogrify_binary() {
    let dir = image_dir(&["p.001.png"]);
    let mut options = options_for(dir.path(), dir.path().join("book.pdf"));
    options.mogrify_path = PathBuf::from("/nonexistent/mogrify");

    assert!(matches!(
        convert(&options).await,
        Err(ConvertError::ExternalTool { .. })
    ));
}

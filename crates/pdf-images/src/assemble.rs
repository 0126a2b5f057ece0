//! Joining converted pages into the output document

use crate::types::*;
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashSet;
use std::path::Path;

/// Page attributes that may live on an ancestor `/Pages` node
const INHERITABLE_ATTRIBUTES: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::fs::read(&path).await?;
    let doc = tokio::task::spawn_blocking(move || Document::load_mem(&bytes)).await??;
    Ok(doc)
}

/// Save the joined document, creating the parent directory if needed
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, ConvertError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Append the pages of every document, in order, under one page tree
///
/// The result's version is the newest of [`BASE_PDF_VERSION`] and the inputs'.
pub fn join_documents(documents: Vec<Document>) -> Result<Document> {
    if documents.is_empty() {
        return Err(ConvertError::NoPages);
    }

    let mut joined = Document::with_version(BASE_PDF_VERSION);
    let pages_id = joined.new_object_id();
    let mut kids = Vec::new();
    let mut version = BASE_PDF_VERSION.to_string();

    for mut doc in documents {
        version = max_version(&version, &doc.version).to_string();
        doc.renumber_objects_with(joined.max_id + 1);

        let page_ids: Vec<ObjectId> = doc.get_pages().into_values().collect();
        for page_id in page_ids {
            let inherited = inherited_attributes(&doc, page_id)?;
            let page = doc.get_object_mut(page_id)?.as_dict_mut()?;
            for (key, value) in inherited {
                page.set(key, value);
            }
            page.set("Parent", Object::Reference(pages_id));
            kids.push(Object::Reference(page_id));
        }

        joined.max_id = joined.max_id.max(doc.max_id);
        for (object_id, object) in doc.objects {
            match object.type_name().unwrap_or(b"") {
                b"Catalog" | b"Pages" | b"Outlines" => {}
                _ => {
                    joined.objects.insert(object_id, object);
                }
            }
        }
    }

    let pages = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Count", Object::Integer(kids.len() as i64)),
        ("Kids", Object::Array(kids)),
    ]);
    joined.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = joined.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    joined.trailer.set("Root", catalog_id);
    joined.version = version;

    Ok(joined)
}

/// Attributes the page inherits from its ancestors and does not set itself
fn inherited_attributes(doc: &Document, page_id: ObjectId) -> Result<Vec<(Vec<u8>, Object)>> {
    let page = doc.get_dictionary(page_id)?;
    let mut found: Vec<(Vec<u8>, Object)> = Vec::new();
    let mut visited = HashSet::new();
    let mut parent = page.get(b"Parent").and_then(Object::as_reference).ok();

    while let Some(node_id) = parent {
        if !visited.insert(node_id) {
            break;
        }
        let node = doc.get_dictionary(node_id)?;
        for key in INHERITABLE_ATTRIBUTES {
            let known = page.has(key) || found.iter().any(|(k, _)| k.as_slice() == key);
            if !known {
                if let Ok(value) = node.get(key) {
                    found.push((key.to_vec(), value.clone()));
                }
            }
        }
        parent = node.get(b"Parent").and_then(Object::as_reference).ok();
    }

    Ok(found)
}

/// Set `/PageLayout` and `/ViewerPreferences /Direction`, raising the version
/// where the setting requires it
pub fn apply_viewer_preferences(
    doc: &mut Document,
    layout: Option<PageLayout>,
    direction: Option<Direction>,
) -> Result<()> {
    let mut version = doc.version.clone();
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_object_mut(catalog_id)?.as_dict_mut()?;

    if let Some(layout) = layout {
        catalog.set("PageLayout", Object::Name(layout.name().as_bytes().to_vec()));
        version = max_version(&version, layout.min_version()).to_string();
    }

    if let Some(direction) = direction {
        let mut preferences = match catalog.get(b"ViewerPreferences") {
            Ok(Object::Dictionary(existing)) => existing.clone(),
            _ => Dictionary::new(),
        };
        preferences.set("Direction", Object::Name(direction.name().as_bytes().to_vec()));
        catalog.set("ViewerPreferences", Object::Dictionary(preferences));
        version = max_version(&version, direction.min_version()).to_string();
    }

    doc.version = version;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::Stream;

    #[test]
    fn test_inherited_attributes_from_page_tree() {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            ("Contents", Object::Reference(content_id)),
            ("Rotate", Object::Integer(90)),
        ]));
        doc.objects.insert(
            pages_id,
            Object::Dictionary(Dictionary::from_iter(vec![
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
                ("Rotate", Object::Integer(180)),
                (
                    "MediaBox",
                    Object::Array(vec![
                        Object::Integer(0),
                        Object::Integer(0),
                        Object::Integer(100),
                        Object::Integer(200),
                    ]),
                ),
            ])),
        );

        let inherited = inherited_attributes(&doc, page_id).unwrap();
        let keys: Vec<&[u8]> = inherited.iter().map(|(k, _)| k.as_slice()).collect();
        assert_eq!(keys, vec![b"MediaBox".as_slice()]);
    }
}

//! Outline dictionaries in a `lopdf` document

use crate::types::*;
use log::debug;
use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};
use std::collections::{BTreeMap, HashSet};

/// Guard against cyclic `/First` chains in documents we did not write
const MAX_READ_DEPTH: usize = 64;

/// Write `roots` as the document outline and link it from the catalog
///
/// Returns the id of the `/Outlines` dictionary, or `None` when there is
/// nothing to write. Every entry is open and jumps to its page with `/Fit`.
pub fn write_outline(doc: &mut Document, roots: &[BookmarkNode]) -> Result<Option<ObjectId>> {
    if roots.is_empty() {
        return Ok(None);
    }

    let pages: Vec<ObjectId> = doc.get_pages().into_values().collect();
    let outlines_id = doc.new_object_id();

    let Some((first, last)) = write_items(doc, roots, outlines_id, &pages)? else {
        return Ok(None);
    };
    let count: usize = roots.iter().map(|root| 1 + root.descendant_count()).sum();

    let outlines = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Outlines".to_vec())),
        ("First", Object::Reference(first)),
        ("Last", Object::Reference(last)),
        ("Count", Object::Integer(count as i64)),
    ]);
    doc.objects.insert(outlines_id, Object::Dictionary(outlines));

    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    doc.get_object_mut(catalog_id)?
        .as_dict_mut()?
        .set("Outlines", Object::Reference(outlines_id));

    debug!("wrote outline with {} entries", count);
    Ok(Some(outlines_id))
}

/// Write one sibling chain, returning its first and last item ids
fn write_items(
    doc: &mut Document,
    nodes: &[BookmarkNode],
    parent_id: ObjectId,
    pages: &[ObjectId],
) -> Result<Option<(ObjectId, ObjectId)>> {
    let ids: Vec<ObjectId> = nodes.iter().map(|_| doc.new_object_id()).collect();

    for (i, node) in nodes.iter().enumerate() {
        let page_id = *pages
            .get(node.target_page)
            .ok_or_else(|| OutlineError::PageOutOfRange {
                title: node.title.clone(),
                page: node.target_page,
                page_count: pages.len(),
            })?;

        let mut item = Dictionary::new();
        item.set("Title", text_string(&node.title));
        item.set("Parent", Object::Reference(parent_id));
        item.set(
            "Dest",
            Object::Array(vec![
                Object::Reference(page_id),
                Object::Name(b"Fit".to_vec()),
            ]),
        );
        if i > 0 {
            item.set("Prev", Object::Reference(ids[i - 1]));
        }
        if let Some(&next) = ids.get(i + 1) {
            item.set("Next", Object::Reference(next));
        }
        if let Some((first, last)) = write_items(doc, &node.children, ids[i], pages)? {
            item.set("First", Object::Reference(first));
            item.set("Last", Object::Reference(last));
            item.set("Count", Object::Integer(node.descendant_count() as i64));
        }

        doc.objects.insert(ids[i], Object::Dictionary(item));
    }

    Ok(ids.first().copied().zip(ids.last().copied()))
}

/// Read the document outline back into bookmark nodes
///
/// Entries whose destination does not resolve to a page of this document
/// point at page 0. A document without an outline yields no nodes.
pub fn read_outline(doc: &Document) -> Result<Vec<BookmarkNode>> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    let catalog = doc.get_dictionary(catalog_id)?;

    let outlines = match catalog.get(b"Outlines") {
        Ok(object) => resolve(doc, object)?.as_dict()?,
        Err(_) => return Ok(Vec::new()),
    };
    let first = match outlines.get(b"First") {
        Ok(object) => object.as_reference()?,
        Err(_) => return Ok(Vec::new()),
    };

    let page_numbers: BTreeMap<ObjectId, usize> = doc
        .get_pages()
        .into_iter()
        .map(|(number, id)| (id, number as usize - 1))
        .collect();

    let mut visited = HashSet::new();
    read_items(doc, first, 0, &page_numbers, &mut visited)
}

fn read_items(
    doc: &Document,
    first: ObjectId,
    depth: usize,
    page_numbers: &BTreeMap<ObjectId, usize>,
    visited: &mut HashSet<ObjectId>,
) -> Result<Vec<BookmarkNode>> {
    if depth >= MAX_READ_DEPTH {
        return Err(OutlineError::Malformed(format!(
            "outline nested deeper than {MAX_READ_DEPTH} levels"
        )));
    }

    let mut nodes = Vec::new();
    let mut current = Some(first);

    while let Some(item_id) = current {
        if !visited.insert(item_id) {
            return Err(OutlineError::Malformed(format!(
                "outline item {} {} is linked twice",
                item_id.0, item_id.1
            )));
        }
        let item = doc.get_dictionary(item_id)?;

        let title = match item.get(b"Title") {
            Ok(Object::String(bytes, _)) => decode_text_string(bytes),
            _ => String::new(),
        };
        let target_page = destination_page(doc, item, page_numbers).unwrap_or_else(|| {
            debug!("outline item '{}' has no page destination", title);
            0
        });

        let mut node = BookmarkNode::new(title, target_page);
        if let Ok(child) = item.get(b"First").and_then(Object::as_reference) {
            node.children = read_items(doc, child, depth + 1, page_numbers, visited)?;
        }
        nodes.push(node);

        current = item.get(b"Next").and_then(Object::as_reference).ok();
    }

    Ok(nodes)
}

/// Page index of an item's `/Dest` or `/A` GoTo action
fn destination_page(
    doc: &Document,
    item: &Dictionary,
    page_numbers: &BTreeMap<ObjectId, usize>,
) -> Option<usize> {
    let dest = match item.get(b"Dest") {
        Ok(dest) => dest,
        Err(_) => {
            let action = resolve(doc, item.get(b"A").ok()?).ok()?.as_dict().ok()?;
            if action.get(b"S").and_then(Object::as_name).ok()? != b"GoTo" {
                return None;
            }
            action.get(b"D").ok()?
        }
    };

    let page_ref = resolve(doc, dest).ok()?.as_array().ok()?.first()?.as_reference().ok()?;
    page_numbers.get(&page_ref).copied()
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> Result<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Encode a PDF text string: literal for ASCII, UTF-16BE with a BOM otherwise
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::String(text.as_bytes().to_vec(), StringFormat::Literal);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn decode_text_string(bytes: &[u8]) -> String {
    match bytes.strip_prefix(&[0xFE, 0xFF]) {
        Some(utf16) => {
            let units: Vec<u16> = utf16
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            String::from_utf16_lossy(&units)
        }
        None => bytes.iter().map(|&b| b as char).collect(),
    }
}

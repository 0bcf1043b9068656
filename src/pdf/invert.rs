//! Page color inversion by content-stream grafting
//!
//! Every page gets two synthesized content streams around its original ones:
//!
//! - a prefix that paints an opaque white rectangle over the whole page, so the
//!   original content draws onto a known backdrop;
//! - a suffix that selects a shared `/BM /Difference` graphics state and paints
//!   the same white rectangle again. Difference against white is `1 - C`, which
//!   flips every color underneath.
//!
//! Text and vector graphics stay vectors; nothing is rasterized.

use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use tracing::debug;
use crate::error::Result;
use crate::layout::PageSize;
use crate::pdf::resources::{dereference, inherited_attribute, DictSlot};

/// Options for inverting a document
#[derive(Debug, Clone)]
pub struct InvertOptions {
    /// Base name under which the Difference graphics state is registered in each
    /// page's `/ExtGState` resources. A numeric suffix is added on collision.
    pub resource_name: String,
    /// Inserted before the extension when naming output files
    pub output_suffix: String,
}

impl Default for InvertOptions {
    fn default() -> Self {
        Self {
            resource_name: "GSInvert".to_string(),
            output_suffix: "_inverted".to_string(),
        }
    }
}

/// What happened to one page
#[derive(Debug, Clone, PartialEq)]
pub struct PageInversion {
    pub page_id: ObjectId,
    pub size: PageSize,
    /// Resource name the suffix stream selects with `gs`
    pub resource_name: String,
    pub prefix_id: ObjectId,
    pub suffix_id: ObjectId,
}

/// Result of inverting a whole document
#[derive(Debug, Clone, PartialEq)]
pub struct InvertSummary {
    /// The shared Difference ExtGState every page points at
    pub ext_gstate_id: ObjectId,
    /// Whether that ExtGState was already in the document
    pub reused_ext_gstate: bool,
    pub pages: Vec<PageInversion>,
}

/// Invert the colors of every page in `doc`.
///
/// Mutates the object graph only; serialize it afterwards to get PDF bytes.
///
/// # Example
///
/// ```no_run
/// use pdf_invert::pdf::{invert_document, load_document_file, save_document_file, InvertOptions};
/// use std::path::Path;
///
/// let mut doc = load_document_file(Path::new("report.pdf")).expect("Failed to load");
/// invert_document(&mut doc, &InvertOptions::default()).expect("Failed to invert");
/// save_document_file(&mut doc, Path::new("report_inverted.pdf")).expect("Failed to save");
/// ```
pub fn invert_document(doc: &mut Document, options: &InvertOptions) -> Result<InvertSummary> {
    let (ext_gstate_id, reused_ext_gstate) = ensure_difference_gstate(doc);

    // Collect page ids first (to avoid borrow issues)
    let page_ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();

    let mut pages = Vec::with_capacity(page_ids.len());
    for page_id in page_ids {
        pages.push(invert_page(doc, page_id, ext_gstate_id, options)?);
    }

    Ok(InvertSummary {
        ext_gstate_id,
        reused_ext_gstate,
        pages,
    })
}

/// Invert one page using an already registered Difference ExtGState
pub fn invert_page(
    doc: &mut Document,
    page_id: ObjectId,
    ext_gstate_id: ObjectId,
    options: &InvertOptions,
) -> Result<PageInversion> {
    let resource_name = register_gstate_on_page(doc, page_id, ext_gstate_id, &options.resource_name)?;
    let size = page_size(doc, page_id);

    let prefix_id = doc.add_object(Stream::new(
        Dictionary::new(),
        prefix_content(&size).into_bytes(),
    ));
    let suffix_id = doc.add_object(Stream::new(
        Dictionary::new(),
        suffix_content(&size, &resource_name).into_bytes(),
    ));

    wrap_page_contents(doc, page_id, prefix_id, suffix_id)?;

    debug!(
        ?page_id,
        width = size.width,
        height = size.height,
        resource = %resource_name,
        "inverted page"
    );

    Ok(PageInversion {
        page_id,
        size,
        resource_name,
        prefix_id,
        suffix_id,
    })
}

/// The graphics state dictionary used for inversion
pub fn difference_gstate() -> Dictionary {
    let mut dict = Dictionary::new();
    dict.set("Type", Object::Name(b"ExtGState".to_vec()));
    dict.set("BM", Object::Name(b"Difference".to_vec()));
    dict
}

fn is_difference_gstate(dict: &Dictionary) -> bool {
    dict.len() == 2
        && matches!(dict.get(b"Type"), Ok(Object::Name(name)) if name == b"ExtGState")
        && matches!(dict.get(b"BM"), Ok(Object::Name(name)) if name == b"Difference")
}

/// Find the document's Difference ExtGState or register a new one.
///
/// Returns the object id and whether it already existed.
pub fn ensure_difference_gstate(doc: &mut Document) -> (ObjectId, bool) {
    let existing = doc.objects.iter().find_map(|(id, object)| match object {
        Object::Dictionary(dict) if is_difference_gstate(dict) => Some(*id),
        _ => None,
    });

    match existing {
        Some(id) => {
            debug!(?id, "reusing Difference ExtGState");
            (id, true)
        }
        None => {
            let id = doc.add_object(difference_gstate());
            debug!(?id, "registered Difference ExtGState");
            (id, false)
        }
    }
}

/// Make `ext_gstate_id` available to the page under a resource name.
///
/// Reuses a name that already points at it, otherwise picks a free one.
/// Returns the name the page's content can select with `gs`.
fn register_gstate_on_page(
    doc: &mut Document,
    page_id: ObjectId,
    ext_gstate_id: ObjectId,
    base_name: &str,
) -> Result<String> {
    let mut resources = page_resources(doc, page_id)?;

    let mut ext_gstates = {
        let resources_dict = resources.resolve(doc)?;
        resources_dict
            .get(b"ExtGState")
            .ok()
            .and_then(|obj| DictSlot::from_object(doc, obj))
            .unwrap_or_else(|| DictSlot::Inline(Dictionary::new()))
    };

    let name = ext_gstates.modify(doc, |ext| {
        if let Some(existing) = name_for_reference(ext, ext_gstate_id) {
            return existing;
        }
        let name = free_resource_name(ext, base_name);
        ext.set(name.as_bytes().to_vec(), Object::Reference(ext_gstate_id));
        name
    })?;

    let ext_object = ext_gstates.into_object();
    resources.modify(doc, |res| res.set("ExtGState", ext_object))?;

    let resources_object = resources.into_object();
    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Resources", resources_object);

    Ok(name)
}

/// The page's Resources, falling back to an inherited one, then to an empty dictionary
fn page_resources(doc: &Document, page_id: ObjectId) -> Result<DictSlot> {
    let page = doc.get_object(page_id)?.as_dict()?;

    let own = match page.get(b"Resources") {
        Ok(obj) => Some(obj.clone()),
        Err(_) => inherited_attribute(doc, page_id, b"Resources"),
    };

    Ok(own
        .and_then(|obj| DictSlot::from_object(doc, &obj))
        .unwrap_or_else(|| DictSlot::Inline(Dictionary::new())))
}

fn is_plain_name(name: &[u8]) -> bool {
    !name.is_empty()
        && name
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
}

fn name_for_reference(ext: &Dictionary, id: ObjectId) -> Option<String> {
    ext.iter().find_map(|(key, value)| match value {
        Object::Reference(target) if *target == id && is_plain_name(key) => {
            String::from_utf8(key.clone()).ok()
        }
        _ => None,
    })
}

fn free_resource_name(ext: &Dictionary, base_name: &str) -> String {
    if !ext.has(base_name.as_bytes()) {
        return base_name.to_string();
    }

    (1u32..)
        .map(|n| format!("{}{}", base_name, n))
        .find(|candidate| !ext.has(candidate.as_bytes()))
        .unwrap_or_else(|| base_name.to_string())
}

/// Read the page size from its (possibly inherited) MediaBox
pub fn page_size(doc: &Document, page_id: ObjectId) -> PageSize {
    inherited_attribute(doc, page_id, b"MediaBox")
        .and_then(|media_box| {
            let array = dereference(doc, &media_box)?.as_array().ok()?;
            media_box_size(doc, array)
        })
        .unwrap_or_else(PageSize::letter)
}

fn media_box_size(doc: &Document, array: &[Object]) -> Option<PageSize> {
    if array.len() != 4 {
        return None;
    }

    let mut coords = [0.0f64; 4];
    for (slot, object) in coords.iter_mut().zip(array) {
        *slot = match dereference(doc, object)? {
            Object::Integer(i) => *i as f64,
            Object::Real(r) => f64::from(*r),
            _ => return None,
        };
    }

    Some(PageSize::from_box(coords[0], coords[1], coords[2], coords[3]))
}

/// Opaque white page-sized rectangle, then an open `q` that the suffix closes
pub fn prefix_content(size: &PageSize) -> String {
    format!(
        "q\n1 1 1 rg\n{} re\nf\nQ\nq\n",
        size.rect_operands()
    )
}

/// Close the prefix's `q`, select the Difference state and paint white over the page
pub fn suffix_content(size: &PageSize, resource_name: &str) -> String {
    format!(
        "\nQ\nq\n/{} gs\n1 1 1 rg\n{} re\nf\nQ\n",
        resource_name,
        size.rect_operands()
    )
}

/// Rebuild Contents as `[prefix, original..., suffix]`.
///
/// Handles a single stream reference, an inline array, a reference to an array,
/// and a missing entry. Anything else is kept in place as-is.
fn wrap_page_contents(
    doc: &mut Document,
    page_id: ObjectId,
    prefix_id: ObjectId,
    suffix_id: ObjectId,
) -> Result<()> {
    let existing = doc.get_object(page_id)?.as_dict()?.get(b"Contents").ok().cloned();

    let mut contents = vec![Object::Reference(prefix_id)];
    match existing {
        Some(Object::Array(array)) => contents.extend(array),
        Some(Object::Reference(id)) => match doc.get_object(id) {
            // An indirect array of streams is spliced in
            Ok(Object::Array(array)) => contents.extend(array.iter().cloned()),
            _ => contents.push(Object::Reference(id)),
        },
        Some(Object::Null) | None => {}
        Some(other) => contents.push(other),
    }
    contents.push(Object::Reference(suffix_id));

    doc.get_object_mut(page_id)?
        .as_dict_mut()?
        .set("Contents", Object::Array(contents));

    Ok(())
}

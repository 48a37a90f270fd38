//! Page geometry: reading and trimming the media box of page 1.

use lopdf::{Document, Object, ObjectId};
use tracing::debug;

use crate::error::{LabelError, Result};
use crate::model::label::PageBox;

/// Guard against cyclic `Parent` chains in broken page trees.
const MAX_TREE_DEPTH: usize = 32;

/// A single-page document produced by [`trim_first_page`].
#[derive(Debug, Clone)]
pub struct TrimmedPage {
    pub bytes: Vec<u8>,
    pub original: PageBox,
    pub trimmed: PageBox,
}

/// Media box of page 1, resolved through the page tree when inherited.
pub fn first_page_box(pdf: &[u8]) -> Result<PageBox> {
    let doc = Document::load_mem(pdf)?;
    let (_, page_id) = first_page(&doc)?;
    media_box(&doc, page_id)
}

/// Build a new document holding only page 1 with its top edge lowered by
/// `top` and its bottom edge raised by `bottom` points.
pub fn trim_first_page(pdf: &[u8], top: f32, bottom: f32) -> Result<TrimmedPage> {
    let mut doc = Document::load_mem(pdf)?;
    let (number, page_id) = first_page(&doc)?;
    let original = media_box(&doc, page_id)?;
    let trimmed = original.trimmed(top, bottom);
    if trimmed.height() <= 0.0 {
        return Err(LabelError::Pdf(format!(
            "page is too small to trim ({} pt high)",
            original.height()
        )));
    }

    let others: Vec<u32> = doc
        .get_pages()
        .keys()
        .copied()
        .filter(|&n| n != number)
        .collect();
    if !others.is_empty() {
        doc.delete_pages(&others);
    }

    let media: Vec<Object> = vec![
        trimmed.left.into(),
        trimmed.bottom.into(),
        trimmed.right.into(),
        trimmed.top.into(),
    ];
    doc.get_dictionary_mut(page_id)?.set("MediaBox", media);
    doc.prune_objects();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| LabelError::Pdf(format!("failed to write trimmed page: {e}")))?;
    debug!(?original, ?trimmed, removed_pages = others.len(), "Trimmed page");
    Ok(TrimmedPage {
        bytes,
        original,
        trimmed,
    })
}

fn first_page(doc: &Document) -> Result<(u32, ObjectId)> {
    doc.get_pages()
        .into_iter()
        .next()
        .ok_or_else(|| LabelError::Pdf("document has no pages".to_string()))
}

fn media_box(doc: &Document, page_id: ObjectId) -> Result<PageBox> {
    let value = inherited(doc, page_id, b"MediaBox")?;
    let numbers = resolve(doc, value)?
        .as_array()?
        .iter()
        .map(|n| number(resolve(doc, n)?))
        .collect::<Result<Vec<f32>>>()?;
    match numbers[..] {
        [x1, y1, x2, y2] => Ok(PageBox::new(x1.min(x2), y1.min(y2), x1.max(x2), y1.max(y2))),
        _ => Err(LabelError::Pdf(format!(
            "MediaBox has {} entries, expected 4",
            numbers.len()
        ))),
    }
}

/// Look up `key` on the page or the nearest ancestor in the page tree.
fn inherited<'a>(doc: &'a Document, mut id: ObjectId, key: &[u8]) -> Result<&'a Object> {
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc.get_dictionary(id)?;
        if let Ok(value) = dict.get(key) {
            return Ok(value);
        }
        id = dict.get(b"Parent").and_then(Object::as_reference).map_err(|_| {
            LabelError::Pdf(format!(
                "page has no {}",
                String::from_utf8_lossy(key)
            ))
        })?;
    }
    Err(LabelError::Pdf("page tree is too deep".to_string()))
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

#[allow(clippy::cast_precision_loss, clippy::unnecessary_cast)]
fn number(obj: &Object) -> Result<f32> {
    match obj {
        Object::Integer(i) => Ok(*i as f32),
        Object::Real(r) => Ok(*r as f32),
        other => Err(LabelError::Pdf(format!(
            "expected a number in MediaBox, found {other:?}"
        ))),
    }
}

//! Low-level page tree helpers over lopdf

use crate::error::{ComposeError, ComposeResult};
use crate::layout::PageSize;
use lopdf::content::Operation;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId};

/// Resource name of the body font on composed pages
pub(crate) const BODY_FONT: &[u8] = b"FIntake";

const MAX_TREE_DEPTH: usize = 32;

/// Add a standard Type1 Helvetica font object
pub(crate) fn add_helvetica(doc: &mut Document, base_font: &str) -> ObjectId {
    doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Real number operand
#[inline]
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn real(value: f64) -> Object {
    Object::Real(value as _)
}

#[allow(clippy::cast_precision_loss)]
fn number(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

fn resolve<'a>(doc: &'a Document, object: &'a Object) -> ComposeResult<&'a Object> {
    match object {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

/// Look up a page attribute, following `Parent` for inherited entries
pub(crate) fn inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> ComposeResult<Option<&'a Object>> {
    let mut node = doc.get_dictionary(page_id)?;
    for _ in 0..MAX_TREE_DEPTH {
        if let Ok(value) = node.get(key) {
            return Ok(Some(resolve(doc, value)?));
        }
        match node.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => node = doc.get_dictionary(parent)?,
            Err(_) => return Ok(None),
        }
    }
    Err(ComposeError::malformed("page tree too deep"))
}

/// Width and height from a page's (possibly inherited) MediaBox
pub(crate) fn page_size(doc: &Document, page_id: ObjectId) -> ComposeResult<PageSize> {
    let media_box = inherited(doc, page_id, b"MediaBox")?
        .ok_or_else(|| ComposeError::malformed("page without MediaBox"))?
        .as_array()?;

    let coords: Vec<f64> = media_box
        .iter()
        .map(|o| resolve(doc, o).ok().and_then(number))
        .collect::<Option<_>>()
        .ok_or_else(|| ComposeError::malformed("non-numeric MediaBox"))?;

    match coords.as_slice() {
        [x0, y0, x1, y1] => Ok(PageSize::new((x1 - x0).abs(), (y1 - y0).abs())),
        _ => Err(ComposeError::malformed("MediaBox must have four entries")),
    }
}

/// Page object ids in document order
pub(crate) fn page_ids(doc: &Document) -> Vec<ObjectId> {
    doc.get_pages().into_values().collect()
}

/// Root of the page tree
pub(crate) fn pages_root(doc: &Document) -> ComposeResult<ObjectId> {
    let catalog_id = doc.trailer.get(b"Root")?.as_reference()?;
    Ok(doc.get_dictionary(catalog_id)?.get(b"Pages")?.as_reference()?)
}

/// Give a page an inline Resources dictionary that includes `font_id`
pub(crate) fn ensure_font(doc: &mut Document, page_id: ObjectId, font_id: ObjectId) -> ComposeResult<()> {
    let mut resources = match inherited(doc, page_id, b"Resources")? {
        Some(Object::Dictionary(dict)) => dict.clone(),
        _ => Dictionary::new(),
    };

    let mut fonts = match resources.get(b"Font") {
        Ok(object) => match resolve(doc, object)? {
            Object::Dictionary(dict) => dict.clone(),
            _ => Dictionary::new(),
        },
        Err(_) => Dictionary::new(),
    };
    fonts.set(BODY_FONT, font_id);
    resources.set("Font", fonts);

    doc.get_dictionary_mut(page_id)?.set("Resources", resources);
    Ok(())
}

/// Append drawing operations to a page, isolated from its existing content
pub(crate) fn append_content(
    doc: &mut Document,
    page_id: ObjectId,
    operations: Vec<Operation>,
) -> ComposeResult<()> {
    let existing: Vec<Object> = match doc.get_dictionary(page_id)?.get(b"Contents") {
        Ok(Object::Array(items)) => items.clone(),
        Ok(other) => vec![other.clone()],
        Err(_) => Vec::new(),
    };

    let mut contents = Vec::with_capacity(existing.len() + 2);
    if !existing.is_empty() {
        let save = stream(vec![Operation::new("q", vec![])])?;
        contents.push(Object::Reference(doc.add_object(save)));
        contents.extend(existing);
        let mut ops = vec![Operation::new("Q", vec![])];
        ops.extend(operations);
        contents.push(Object::Reference(doc.add_object(stream(ops)?)));
    } else {
        contents.push(Object::Reference(doc.add_object(stream(operations)?)));
    }

    doc.get_dictionary_mut(page_id)?.set("Contents", contents);
    Ok(())
}

/// Append an empty page of `size` to the end of the page tree
pub(crate) fn append_page(doc: &mut Document, size: PageSize) -> ComposeResult<ObjectId> {
    let root = pages_root(doc)?;
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => root,
        "MediaBox" => vec![Object::Integer(0), Object::Integer(0), real(size.width), real(size.height)],
        "Resources" => Dictionary::new(),
    });

    let pages = doc.get_dictionary_mut(root)?;
    let mut kids = pages.get(b"Kids")?.as_array()?.clone();
    kids.push(Object::Reference(page_id));
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.set("Kids", kids);
    pages.set("Count", count + 1);
    Ok(page_id)
}

/// Content stream from operations
pub(crate) fn stream(operations: Vec<Operation>) -> ComposeResult<lopdf::Stream> {
    let content = lopdf::content::Content { operations };
    Ok(lopdf::Stream::new(Dictionary::new(), content.encode()?))
}

/// Text in the single-byte encoding of the standard fonts
///
/// Characters outside WinAnsi become `?`.
pub(crate) fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            ' '..='~' => c as u8,
            '\u{a0}'..='\u{ff}' => u32::from(c) as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            '™' => 0x99,
            _ => b'?',
        })
        .collect()
}

/// Operations drawing one line of text
pub(crate) fn text_line(font: &[u8], size: f64, x: f64, y: f64, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![Object::Name(font.to_vec()), real(size)]),
        Operation::new("Td", vec![real(x), real(y)]),
        Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]),
        Operation::new("ET", vec![]),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn win_ansi_mapping() {
        assert_eq!(win_ansi("A • b"), vec![b'A', b' ', 0x95, b' ', b'b']);
        assert_eq!(win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("日本"), vec![b'?', b'?']);
        assert_eq!(win_ansi("“hi”"), vec![0x93, b'h', b'i', 0x94]);
    }
}

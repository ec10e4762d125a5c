//! Object-level PDF edits via `lopdf`.
//!
//! Rotation and stream compression only touch the document's object graph,
//! never page content, so they do not need pdfium loaded.

use crate::error::ConvertError;
use lopdf::{Document, Object, ObjectId};
use std::path::Path;
use tracing::{debug, info};

fn open(path: &Path) -> Result<Document, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Document::load(path).map_err(|e| ConvertError::PdfRead {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })
}

fn write(doc: &mut Document, output: &Path) -> Result<(), ConvertError> {
    doc.save(output)
        .map(|_| ())
        .map_err(|e| ConvertError::OutputWriteFailed {
            path: output.to_path_buf(),
            source: e,
        })
}

/// Flate-compress every content stream and drop unreachable objects.
pub fn compress_pdf(input: &Path, output: &Path) -> Result<(), ConvertError> {
    let mut doc = open(input)?;
    doc.prune_objects();
    doc.compress();
    write(&mut doc, output)?;

    let before = std::fs::metadata(input).map(|m| m.len()).unwrap_or(0);
    let after = std::fs::metadata(output).map(|m| m.len()).unwrap_or(0);
    info!("Compressed {} → {} bytes", before, after);
    Ok(())
}

/// Page-tree nesting beyond this is treated as a reference cycle.
const MAX_TREE_DEPTH: usize = 64;

/// A page's effective `/Rotate`: its own entry, else the nearest ancestor's.
///
/// `/Rotate` is inheritable, so a page without one takes it from its `/Pages`
/// parents. Indirect values are resolved; anything unreadable counts as 0.
fn effective_rotation(doc: &Document, page: ObjectId) -> i64 {
    let mut node = doc.get_dictionary(page).ok();
    for _ in 0..MAX_TREE_DEPTH {
        let Some(dict) = node else { break };
        if let Ok(value) = dict.get(b"Rotate") {
            return doc
                .dereference(value)
                .and_then(|(_, obj)| obj.as_i64())
                .unwrap_or(0);
        }
        node = dict
            .get(b"Parent")
            .and_then(Object::as_reference)
            .and_then(|id| doc.get_dictionary(id))
            .ok();
    }
    0
}

/// Add `degrees` to every page's effective rotation, keeping the result in
/// 0..360. The sum is written to the page itself.
///
/// `degrees` must already be a multiple of 90.
pub fn rotate_pdf(input: &Path, output: &Path, degrees: u16) -> Result<(), ConvertError> {
    let mut doc = open(input)?;
    let page_ids: Vec<_> = doc.get_pages().into_values().collect();

    for id in &page_ids {
        let current = effective_rotation(&doc, *id);
        let dict = doc
            .get_object_mut(*id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| ConvertError::PdfOperation {
                path: input.to_path_buf(),
                detail: e.to_string(),
            })?;
        let rotated = (current + i64::from(degrees)).rem_euclid(360);
        dict.set("Rotate", rotated);
        debug!("Page {:?}: /Rotate {} → {}", id, current, rotated);
    }

    write(&mut doc, output)?;
    info!("Rotated {} page(s) by {}°", page_ids.len(), degrees);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    /// A minimal document with `pages` blank pages, the first carrying
    /// `/Rotate first_rotation` when given.
    fn sample_pdf(pages: usize, first_rotation: Option<i64>) -> Document {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids: Vec<Object> = Vec::new();
        for i in 0..pages {
            let content = doc.add_object(Stream::new(
                dictionary! {},
                b"BT /F1 12 Tf 72 720 Td (hello hello hello hello) Tj ET".repeat(20),
            ));
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
                "Contents" => content,
            };
            if i == 0 {
                if let Some(rotation) = first_rotation {
                    page.set("Rotate", rotation);
                }
            }
            kids.push(doc.add_object(page).into());
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog);
        doc
    }

    fn rotations(path: &Path) -> Vec<i64> {
        let doc = Document::load(path).unwrap();
        doc.get_pages()
            .into_values()
            .map(|id| {
                doc.get_dictionary(id)
                    .unwrap()
                    .get(b"Rotate")
                    .and_then(Object::as_i64)
                    .unwrap_or(0)
            })
            .collect()
    }

    #[test]
    fn rotation_adds_to_existing_value_and_wraps() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(3, Some(270)).save(&input).unwrap();

        rotate_pdf(&input, &output, 180).unwrap();

        assert_eq!(rotations(&output), vec![90, 180, 180]);
    }

    #[test]
    fn zero_rotation_leaves_pages_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        sample_pdf(2, Some(90)).save(&input).unwrap();

        rotate_pdf(&input, &output, 0).unwrap();

        assert_eq!(rotations(&output), vec![90, 0]);
    }

    fn parent_of(doc: &Document, page: ObjectId) -> ObjectId {
        doc.get_dictionary(page)
            .unwrap()
            .get(b"Parent")
            .and_then(Object::as_reference)
            .unwrap()
    }

    #[test]
    fn rotation_inherited_from_page_tree_is_added_to() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        let mut doc = sample_pdf(2, None);
        let first = *doc.get_pages().values().next().unwrap();
        let pages_id = parent_of(&doc, first);
        doc.get_object_mut(pages_id)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Rotate", 90_i64);
        doc.save(&input).unwrap();

        rotate_pdf(&input, &output, 90).unwrap();

        assert_eq!(rotations(&output), vec![180, 180]);
    }

    #[test]
    fn indirect_rotation_is_resolved() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("out.pdf");
        let mut doc = sample_pdf(2, None);
        let rotation = doc.add_object(270_i64);
        let first = *doc.get_pages().values().next().unwrap();
        doc.get_object_mut(first)
            .and_then(Object::as_dict_mut)
            .unwrap()
            .set("Rotate", rotation);
        doc.save(&input).unwrap();

        rotate_pdf(&input, &output, 180).unwrap();

        assert_eq!(rotations(&output), vec![90, 180]);
    }

    #[test]
    fn compression_keeps_every_page() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.pdf");
        let output = dir.path().join("small.pdf");
        sample_pdf(4, None).save(&input).unwrap();

        compress_pdf(&input, &output).unwrap();

        let doc = Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 4);
        assert!(
            std::fs::metadata(&output).unwrap().len() < std::fs::metadata(&input).unwrap().len()
        );
    }

    #[test]
    fn missing_input_is_reported() {
        let err = rotate_pdf(Path::new("/nope/in.pdf"), Path::new("/nope/out.pdf"), 90)
            .unwrap_err();
        assert!(matches!(err, ConvertError::FileNotFound { .. }));
    }

    #[test]
    fn non_pdf_input_is_a_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("fake.pdf");
        std::fs::write(&input, b"not a pdf at all").unwrap();
        let err = compress_pdf(&input, &dir.path().join("out.pdf")).unwrap_err();
        assert!(matches!(err, ConvertError::PdfRead { .. }), "{err}");
    }
}

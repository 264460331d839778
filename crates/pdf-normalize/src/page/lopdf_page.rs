//! `PagePrimitives` over an lopdf document
//!
//! Content transforms never decode existing streams. Each transform adds a
//! small prefix stream (`q ... cm`) and suffix stream (`Q`) around the page's
//! existing `Contents` entries, so later transforms wrap earlier ones.

use super::PagePrimitives;
use crate::constants::{ANNOTATION_POINT_KEYS, MAX_INHERITANCE_DEPTH, SECONDARY_BOXES};
use crate::geometry::normalize_degrees;
use crate::types::{NormalizeError, PageBox, Result};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

type Rect = [f64; 4];

/// A page of an lopdf document, mutated in place
pub struct LopdfPage<'a> {
    doc: &'a mut Document,
    id: ObjectId,
}

impl<'a> LopdfPage<'a> {
    pub fn new(doc: &'a mut Document, id: ObjectId) -> Self {
        Self { doc, id }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    // =========================================================================
    // Reading
    // =========================================================================

    /// Look up a key on the page or the nearest ancestor that carries it.
    fn inherited(&self, key: &[u8]) -> Result<Option<&Object>> {
        let mut dict = self.doc.get_dictionary(self.id)?;
        for _ in 0..MAX_INHERITANCE_DEPTH {
            if let Ok(value) = dict.get(key) {
                return Ok(Some(self.resolve(value)?));
            }
            match dict.get(b"Parent").and_then(|parent| parent.as_reference()) {
                Ok(parent_id) => dict = self.doc.get_dictionary(parent_id)?,
                Err(_) => return Ok(None),
            }
        }
        Ok(None)
    }

    fn resolve<'d>(&'d self, obj: &'d Object) -> Result<&'d Object> {
        match obj {
            Object::Reference(id) => Ok(self.doc.get_object(*id)?),
            other => Ok(other),
        }
    }

    fn rect(&self, obj: &Object) -> Option<Rect> {
        let arr = self.resolve(obj).ok()?.as_array().ok()?;
        if arr.len() != 4 {
            return None;
        }
        let mut rect = [0.0; 4];
        for (slot, item) in rect.iter_mut().zip(arr) {
            *slot = extract_number(self.resolve(item).ok()?)?;
        }
        Some(rect)
    }

    fn media_box(&self) -> Result<Option<Rect>> {
        Ok(self
            .inherited(b"MediaBox")?
            .and_then(|obj| self.rect(obj)))
    }

    // =========================================================================
    // Writing
    // =========================================================================

    fn page_dict_mut(&mut self) -> Result<&mut Dictionary> {
        Ok(self.doc.get_dictionary_mut(self.id)?)
    }

    /// Current `Contents` as a list of entries, hoisting inline streams.
    fn content_entries(&mut self) -> Result<Vec<Object>> {
        let contents = match self.doc.get_dictionary(self.id)?.get(b"Contents") {
            Ok(obj) => obj.clone(),
            Err(_) => return Ok(Vec::new()),
        };

        match contents {
            Object::Reference(id) => match self.doc.get_object(id)? {
                Object::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![Object::Reference(id)]),
            },
            Object::Array(arr) => Ok(arr),
            Object::Stream(stream) => Ok(vec![Object::Reference(self.doc.add_object(stream))]),
            _ => Ok(Vec::new()),
        }
    }

    /// Wrap all page content between `prefix` and a closing `Q`.
    fn wrap_content(&mut self, prefix: String) -> Result<()> {
        let existing = self.content_entries()?;

        let prefix_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), prefix.into_bytes()));
        let suffix_id = self
            .doc
            .add_object(Stream::new(Dictionary::new(), b"\nQ\n".to_vec()));

        let mut contents = Vec::with_capacity(existing.len() + 2);
        contents.push(Object::Reference(prefix_id));
        contents.extend(existing);
        contents.push(Object::Reference(suffix_id));

        self.page_dict_mut()?
            .set("Contents", Object::Array(contents));
        Ok(())
    }

    /// Scale annotation geometry so annotations track scaled content.
    fn scale_annotations(&mut self, sx: f64, sy: f64) -> Result<()> {
        let annots = match self.doc.get_dictionary(self.id)?.get(b"Annots") {
            Ok(obj) => obj.clone(),
            Err(_) => return Ok(()),
        };
        let entries = match annots {
            Object::Array(arr) => arr,
            Object::Reference(id) => match self.doc.get_object(id)? {
                Object::Array(arr) => arr.clone(),
                _ => return Ok(()),
            },
            _ => return Ok(()),
        };

        for entry in entries {
            let Object::Reference(annot_id) = entry else {
                continue;
            };
            let Ok(annot) = self.doc.get_dictionary_mut(annot_id) else {
                continue;
            };

            for &key in ANNOTATION_POINT_KEYS.iter() {
                let scaled = annot
                    .get(key)
                    .ok()
                    .and_then(|obj| scale_points(obj, sx, sy));
                if let Some(scaled) = scaled {
                    annot.set(key, scaled);
                }
            }

            let ink = match annot.get(b"InkList") {
                Ok(Object::Array(lists)) => Some(
                    lists
                        .iter()
                        .map(|list| scale_points(list, sx, sy).unwrap_or_else(|| list.clone()))
                        .collect(),
                ),
                _ => None,
            };
            if let Some(ink) = ink {
                annot.set("InkList", Object::Array(ink));
            }
        }
        Ok(())
    }
}

impl PagePrimitives for LopdfPage<'_> {
    fn page_box(&self) -> Result<PageBox> {
        match self.media_box()? {
            Some([x1, y1, x2, y2]) => Ok(PageBox::new((x2 - x1).abs(), (y2 - y1).abs())),
            None => Err(NormalizeError::MissingMediaBox(self.id)),
        }
    }

    fn rotation(&self) -> Result<i32> {
        Ok(match self.inherited(b"Rotate")? {
            Some(Object::Integer(angle)) => *angle as i32,
            Some(Object::Real(angle)) => angle.trunc() as i32,
            _ => 0,
        })
    }

    fn set_box_size(&mut self, width: f64, height: f64) -> Result<()> {
        let old = self.media_box()?;
        let (x, y) = old
            .map(|[x1, y1, x2, y2]| (x1.min(x2), y1.min(y2)))
            .unwrap_or((0.0, 0.0));
        let new_box = [x, y, x + width, y + height];

        // Secondary boxes follow only when they mirrored the old MediaBox.
        // An inherited CropBox still clips, so the page gets its own copy.
        let mut matching = Vec::new();
        if old.is_some() {
            for &key in SECONDARY_BOXES.iter() {
                if self.inherited(key)?.and_then(|obj| self.rect(obj)) == old {
                    matching.push(key);
                }
            }
        }

        let page = self.page_dict_mut()?;
        page.set("MediaBox", rect_object(new_box));
        for key in matching {
            page.set(key, rect_object(new_box));
        }
        Ok(())
    }

    fn scale_content(&mut self, sx: f64, sy: f64) -> Result<()> {
        self.wrap_content(format!("q\n{} 0 0 {} 0 0 cm\n", sx, sy))
    }

    fn translate_content(&mut self, dx: i64, dy: i64) -> Result<()> {
        self.wrap_content(format!("q\n1 0 0 1 {} {} cm\n", dx, dy))
    }

    fn scale_box_and_content(&mut self, sx: f64, sy: f64) -> Result<()> {
        let PageBox { width, height } = self.page_box()?;
        self.set_box_size(width * sx, height * sy)?;
        self.scale_content(sx, sy)?;
        self.scale_annotations(sx, sy)
    }

    fn set_rotation(&mut self, degrees: i32) -> Result<()> {
        self.page_dict_mut()?
            .set("Rotate", Object::Integer(normalize_degrees(degrees) as i64));
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Extract numeric value from a PDF object
fn extract_number(obj: &Object) -> Option<f64> {
    match obj {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(*r as f64),
        _ => None,
    }
}

/// Scale a direct array of alternating x and y values. Non-numeric entries
/// are kept as they are.
fn scale_points(obj: &Object, sx: f64, sy: f64) -> Option<Object> {
    let values = obj.as_array().ok()?;
    Some(Object::Array(
        values
            .iter()
            .enumerate()
            .map(|(i, value)| match extract_number(value) {
                Some(n) if i % 2 == 0 => Object::Real((n * sx) as f32),
                Some(n) => Object::Real((n * sy) as f32),
                None => value.clone(),
            })
            .collect(),
    ))
}

fn rect_object(rect: Rect) -> Object {
    Object::Array(rect.iter().map(|&v| Object::Real(v as f32)).collect())
}

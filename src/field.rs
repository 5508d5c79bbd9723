//! Field identifiers, byte ownership, and the per-call result list.
//!
//! This is the Rust rendition of `AppLayerParserResultElmt` and
//! `AppLayerParserResult` from `original_source/src/app-layer-parser.c`: a
//! singly linked, pool-backed list of `{name_idx, data_ptr, data_len,
//! owned_flag}` becomes a `Vec` of [`ResultElement`], and the
//! pointer-plus-flag ownership model becomes the `FieldBytes` sum type the
//! Design Notes in `spec.md` §9 call out explicitly.

/// Identifies which field a [`ResultElement`] represents, within the
/// numbering space of a single protocol. `0` is reserved for "no field" /
/// "no subparser attached", matching the source's `HTTP_FIELD_NONE`.
pub type FieldId = u16;

/// Reserved field id meaning "not a field" / "no subparser registered".
pub const FIELD_NONE: FieldId = 0;

/// The bytes behind an emitted field: either a view into the caller's input
/// (never needs freeing, never owns), or an assembled buffer recovered from
/// carry-over (owns its allocation and is eligible to be recycled through
/// [`crate::pool::ElementPool`] once consumed).
#[derive(Debug)]
pub enum FieldBytes<'a> {
    /// A view into input the caller guarantees outlives this parse call.
    Borrowed(&'a [u8]),
    /// An allocation assembled from carry-over spanning chunk boundaries.
    Owned(Vec<u8>),
}

impl<'a> FieldBytes<'a> {
    /// Returns the field's bytes regardless of ownership.
    pub fn as_slice(&self) -> &[u8] {
        match self {
            FieldBytes::Borrowed(b) => b,
            FieldBytes::Owned(v) => v.as_slice(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consumes the field, returning its buffer to the pool if owned. Views
    /// into caller input are simply dropped — matching the source's
    /// `AlpReturnResultElmt`, which only frees when `ALP_RESULT_ELMT_ALLOC`
    /// is set.
    pub fn release(self) {
        if let FieldBytes::Owned(buf) = self {
            crate::pool::ElementPool::release(buf);
        }
    }
}

/// One emitted field: the identifier of which step of the parent parser
/// produced it, and its bytes.
#[derive(Debug)]
pub struct ResultElement<'a> {
    pub field_id: FieldId,
    pub bytes: FieldBytes<'a>,
}

/// The ordered list of fields a single parser invocation emitted, in
/// production order. Replaces the source's manually-linked
/// `AppLayerParserResult{head, tail, cnt}`.
#[derive(Debug, Default)]
pub struct ResultList<'a> {
    elements: Vec<ResultElement<'a>>,
}

impl<'a> ResultList<'a> {
    pub fn new() -> Self {
        ResultList {
            elements: Vec::new(),
        }
    }

    pub fn push(&mut self, field_id: FieldId, bytes: FieldBytes<'a>) {
        self.elements.push(ResultElement { field_id, bytes });
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultElement<'a>> {
        self.elements.iter()
    }

    /// Consumes the list, releasing every element's buffer back to the pool.
    /// Called by the dispatcher once it has finished recursing into every
    /// element's subparser, matching `AppLayerParserResultCleanup`.
    pub fn release_all(self) {
        for e in self.elements {
            e.bytes.release();
        }
    }
}

impl<'a> IntoIterator for ResultList<'a> {
    type Item = ResultElement<'a>;
    type IntoIter = std::vec::IntoIter<ResultElement<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.into_iter()
    }
}

/// Outcome of a single field-extractor call (`spec.md` §4.D / §9: replaces
/// the source's tri-valued `-1/0/1` return).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// The field was found and emitted.
    Complete,
    /// Not enough data yet; carry-over was stored (or extended).
    NeedsMore,
}

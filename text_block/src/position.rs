// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping between the three index spaces a block works in.
//!
//! Callers address text in UTF-16 code units (the "external" space). The
//! shaper sees an expanded UTF-8 string in which every tab has been replaced
//! by a space followed by U+FFFC (the "internal" space). Style offsets use the
//! raw, unexpanded UTF-8 encoding of the original text, where a tab is one
//! byte.

/// Bytes a tab occupies in the expanded text: a one-byte space followed by the
/// three-byte object replacement character.
pub(crate) const TAB_RUN_BYTES: usize = 4;

/// Bytes each tab adds over its raw one-byte encoding.
pub(crate) const TAB_EXTRA_BYTES: usize = TAB_RUN_BYTES - 1;

/// The space substituted for a tab in the expanded text.
pub(crate) const TAB_SUBSTITUTE: char = ' ';

/// The placeholder that carries a tab's width in the expanded text.
pub(crate) const TAB_PLACEHOLDER: char = '\u{FFFC}';

/// Precomputed external-to-internal offset table for one text.
#[derive(Clone, Debug, Default)]
pub(crate) struct PositionMap {
    /// Internal byte offset for each UTF-16 code unit, plus a final sentinel
    /// equal to the expanded byte length. The trailing unit of a surrogate
    /// pair maps to the offset after the pair.
    to_internal: Vec<usize>,
    /// Raw (unexpanded) byte offset of each tab, in text order.
    tab_positions: Vec<usize>,
}

impl PositionMap {
    /// Recomputes both tables from the UTF-16 encoding of the text.
    pub(crate) fn rebuild(&mut self, units: &[u16]) {
        self.to_internal.clear();
        self.tab_positions.clear();
        let mut internal = 0;
        let mut raw = 0;
        for decoded in char::decode_utf16(units.iter().copied()) {
            let (ch, unit_len) = match decoded {
                Ok(ch) => (ch, ch.len_utf16()),
                // Unpaired surrogates shape as U+FFFD.
                Err(_) => (char::REPLACEMENT_CHARACTER, 1),
            };
            self.to_internal.push(internal);
            if ch == '\t' {
                self.tab_positions.push(raw);
                internal += TAB_RUN_BYTES;
                raw += 1;
            } else {
                let encoded = ch.len_utf8();
                internal += encoded;
                raw += encoded;
            }
            for _ in 1..unit_len {
                self.to_internal.push(internal);
            }
        }
        self.to_internal.push(internal);
    }

    /// The full offset table, one entry per code unit plus the end sentinel.
    pub(crate) fn entries(&self) -> &[usize] {
        &self.to_internal
    }

    /// Internal byte offset of the given code unit, clamped to the text end.
    pub(crate) fn external_to_internal(&self, index: usize) -> usize {
        match self.to_internal.get(index) {
            Some(&offset) => offset,
            None => self.internal_len(),
        }
    }

    /// Byte length of the expanded text.
    pub(crate) fn internal_len(&self) -> usize {
        self.to_internal.last().copied().unwrap_or(0)
    }

    /// Byte length of the raw (unexpanded) text.
    pub(crate) fn raw_len(&self) -> usize {
        self.internal_len() - TAB_EXTRA_BYTES * self.tab_positions.len()
    }

    /// Number of tabs in the text.
    pub(crate) fn tab_count(&self) -> usize {
        self.tab_positions.len()
    }

    /// Number of tabs whose expanded run starts before the internal offset.
    pub(crate) fn tabs_before_internal(&self, internal: usize) -> usize {
        let mut count = 0;
        for &raw in &self.tab_positions {
            if raw + count * TAB_EXTRA_BYTES < internal {
                count += 1;
            } else {
                break;
            }
        }
        count
    }

    /// Converts an external code unit index into a raw style offset.
    ///
    /// Each tab before the index contributes one byte instead of four.
    pub(crate) fn style_offset(&self, index: usize) -> usize {
        let internal = self.external_to_internal(index);
        internal - TAB_EXTRA_BYTES * self.tabs_before_internal(internal)
    }

    /// Converts a raw style offset into an internal byte offset.
    pub(crate) fn style_to_internal(&self, offset: usize) -> usize {
        let tabs = self
            .tab_positions
            .iter()
            .take_while(|&&raw| raw < offset)
            .count();
        offset + TAB_EXTRA_BYTES * tabs
    }
}

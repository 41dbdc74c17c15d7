// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The breakpoint list backing range-scoped style edits.

use core::ops::Range;

use crate::TextStyle;

/// One breakpoint in a [`RunList`].
///
/// A breakpoint opens a run: the style applies from `start` up to the next
/// breakpoint (or the end of the text). The region before the first breakpoint
/// is implicitly styled with the list's base style.
#[derive(Clone, PartialEq, Debug)]
pub struct StyleRun {
    /// Byte offset at which this run begins.
    pub start: usize,
    /// The style in effect over the run.
    pub style: TextStyle,
}

/// An ordered, non-overlapping sequence of style breakpoints.
///
/// Breakpoint starts are strictly increasing. Mutating a range never discards
/// the style that follows it: [`RunList::apply`] always terminates the edited
/// region with a breakpoint that restores the pre-edit style at the range end.
#[derive(Clone, PartialEq, Debug)]
pub struct RunList {
    base: TextStyle,
    runs: Vec<StyleRun>,
}

impl RunList {
    /// Creates a list with no breakpoints over the given base style.
    pub fn new(base: TextStyle) -> Self {
        Self {
            base,
            runs: Vec::new(),
        }
    }

    /// Discards all breakpoints and replaces the base style.
    pub fn reset(&mut self, base: TextStyle) {
        self.base = base;
        self.runs.clear();
    }

    /// The style in effect before the first breakpoint.
    pub fn base(&self) -> &TextStyle {
        &self.base
    }

    /// The explicit breakpoints, in increasing start order.
    pub fn runs(&self) -> &[StyleRun] {
        &self.runs
    }

    /// Returns `true` if no range-scoped edit has been applied.
    pub fn is_plain(&self) -> bool {
        self.runs.is_empty()
    }

    /// The effective style at the given offset.
    pub fn style_at(&self, offset: usize) -> &TextStyle {
        self.runs
            .iter()
            .rev()
            .find(|run| run.start <= offset)
            .map(|run| &run.style)
            .unwrap_or(&self.base)
    }

    /// Applies `mutate` to every style in effect over `range`.
    ///
    /// Splits runs at the range edges as needed: if no breakpoint exists at
    /// `range.start`, one is synthesized by cloning the style in effect just
    /// before it; a breakpoint restoring the pre-edit style is guaranteed at
    /// `range.end`. Styles outside the range are unaffected. Empty ranges are
    /// ignored.
    pub fn apply(&mut self, range: Range<usize>, mutate: impl Fn(&mut TextStyle)) {
        let (start, end) = (range.start, range.end);
        if start >= end {
            return;
        }

        // First breakpoint at or after `start`, and the last one before `end`
        // (whose unmutated style the range must reset to).
        let mut insertion = None;
        let mut reset_anchor = None;
        for (i, run) in self.runs.iter().enumerate() {
            if insertion.is_none() && start <= run.start {
                insertion = Some(i);
            }
            if end > run.start {
                reset_anchor = Some(i);
            }
        }
        let reset_style = match reset_anchor {
            Some(i) => self.runs[i].style.clone(),
            None => self.base.clone(),
        };

        let entry_ix = match insertion {
            None => {
                // Every existing breakpoint starts before `start`.
                let mut entry = reset_style.clone();
                mutate(&mut entry);
                self.runs.push(StyleRun { start, style: entry });
                self.runs.push(StyleRun {
                    start: end,
                    style: reset_style,
                });
                return;
            }
            Some(ix) => {
                if self.runs[ix].start == start {
                    mutate(&mut self.runs[ix].style);
                    ix
                } else {
                    let mut entry = if ix > 0 {
                        self.runs[ix - 1].style.clone()
                    } else {
                        self.base.clone()
                    };
                    mutate(&mut entry);
                    self.runs.insert(ix, StyleRun { start, style: entry });
                    ix
                }
            }
        };

        // Mutate breakpoints strictly inside the range, then make sure a reset
        // breakpoint exists at exactly `end`.
        let mut j = entry_ix + 1;
        loop {
            match self.runs.get(j) {
                None => {
                    self.runs.push(StyleRun {
                        start: end,
                        style: reset_style,
                    });
                    break;
                }
                Some(run) if run.start > end => {
                    self.runs.insert(
                        j,
                        StyleRun {
                            start: end,
                            style: reset_style,
                        },
                    );
                    break;
                }
                Some(run) if run.start == end => break,
                Some(_) => {
                    mutate(&mut self.runs[j].style);
                    j += 1;
                }
            }
        }
    }

    /// Iterates the contiguous style segments covering `0..text_len`.
    ///
    /// Yields `(byte_range, style)` pairs in order, starting with the base
    /// style before the first breakpoint. Empty segments (a breakpoint at
    /// offset 0, or breakpoints at or past `text_len`) are skipped.
    pub fn segments(&self, text_len: usize) -> Segments<'_> {
        Segments {
            list: self,
            text_len,
            cursor: 0,
            next_run: 0,
        }
    }
}

/// Iterator over the contiguous style segments of a [`RunList`].
///
/// Created by [`RunList::segments`].
#[derive(Debug)]
pub struct Segments<'a> {
    list: &'a RunList,
    text_len: usize,
    cursor: usize,
    next_run: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = (Range<usize>, &'a TextStyle);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.cursor >= self.text_len {
                return None;
            }
            let style = if self.next_run == 0 {
                &self.list.base
            } else {
                &self.list.runs[self.next_run - 1].style
            };
            let end = self
                .list
                .runs
                .get(self.next_run)
                .map(|run| run.start.min(self.text_len))
                .unwrap_or(self.text_len);
            let start = self.cursor;
            self.cursor = end.max(start);
            self.next_run += 1;
            if end > start {
                return Some((start..end, style));
            }
            // Zero-width segment (e.g. a breakpoint at offset 0); keep going.
            if self.next_run > self.list.runs.len() {
                return None;
            }
        }
    }
}

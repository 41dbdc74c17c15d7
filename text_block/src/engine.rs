// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between a block and the shaper that lays its text out.

use core::ops::Range;

use peniko::kurbo::{Point, Rect};
use styled_runs::TextStyle;

use crate::options::AlignH;

/// Everything a shaper needs to build one paragraph.
///
/// The text is the expanded form: tabs have already been replaced by a space
/// and U+FFFC, and `placeholder_width` is the advance the engine should give
/// each U+FFFC so the pair together fills one tab stop. Span ranges are byte
/// ranges into `text`, cover it without gaps, and carry fully resolved styles
/// (no deferred colors).
#[derive(Debug)]
pub struct ShapeRequest<'a> {
    pub text: &'a str,
    pub family: &'a str,
    pub base: &'a TextStyle,
    pub spans: &'a [(Range<usize>, TextStyle)],
    /// Wrap width, or `None` to lay out unconstrained.
    pub max_width: Option<f64>,
    /// Line limit, or `None` for no limit.
    pub max_lines: Option<usize>,
    pub align: AlignH,
    pub placeholder_width: f64,
}

/// Vertical metrics of one laid-out line, in paragraph coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Distance from the paragraph top to the line's baseline.
    pub baseline: f64,
    /// Rise above the baseline.
    pub ascent: f64,
    /// Drop below the baseline.
    pub descent: f64,
}

/// One run of inked glyphs, reported during [`ShapeEngine::visit_runs`].
///
/// Runs contain only glyphs with ink: the engine skips spaces, placeholders
/// and line breaks, and the caller reconstructs those from context. `origin`
/// is the run's position in paragraph coordinates, with `origin.y` on the
/// line's baseline. Glyph positions are relative to the origin, and each ink
/// rectangle is relative to its glyph's position.
#[derive(Clone, Copy, Debug)]
pub struct GlyphRun<'a> {
    /// Index of the line this run sits on, from the top.
    pub line: usize,
    pub origin: Point,
    /// Byte offset into the expanded text of each glyph's cluster, plus a
    /// final entry one past the last cluster. Length is glyph count plus one.
    pub byte_starts: &'a [usize],
    pub positions: &'a [Point],
    pub ink_bounds: &'a [Rect],
}

impl GlyphRun<'_> {
    /// Number of glyphs in the run.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns `true` if the run has no glyphs.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Absolute right edge of the last glyph's ink, in paragraph coordinates.
    pub fn ink_right(&self) -> f64 {
        match (self.positions.last(), self.ink_bounds.last()) {
            (Some(position), Some(ink)) => self.origin.x + position.x + ink.x1,
            _ => self.origin.x,
        }
    }
}

/// A text shaper and rasterizer a [`TextBlock`](crate::TextBlock) drives.
///
/// The block owns invalidation, index mapping and geometry caches; the engine
/// owns fonts, shaping and painting. All engine geometry is in paragraph
/// coordinates, with the origin at the paragraph's top left.
pub trait ShapeEngine {
    /// An immutable shaped paragraph.
    type Paragraph;
    /// The surface [`Self::paint`] draws to.
    type Canvas;

    /// Advance of the space glyph in the family's font at the given style, or
    /// `None` if the family cannot be resolved.
    fn space_advance(&self, family: &str, style: &TextStyle) -> Option<f64>;

    /// Shapes a paragraph, or `None` if shaping failed.
    fn shape(&self, request: &ShapeRequest<'_>) -> Option<Self::Paragraph>;

    /// Re-wraps an existing paragraph to a new width.
    fn relayout(&self, paragraph: &mut Self::Paragraph, max_width: Option<f64>);

    /// Total height of the paragraph.
    fn height(&self, paragraph: &Self::Paragraph) -> f64;

    /// Distance from the paragraph top to the first alphabetic baseline.
    fn alphabetic_baseline(&self, paragraph: &Self::Paragraph) -> f64;

    /// Metrics of every line, top to bottom. Never empty for a shaped
    /// paragraph; an empty text still has one line.
    fn line_metrics(&self, paragraph: &Self::Paragraph) -> Vec<LineMetrics>;

    /// Tight rectangles covering the given byte range of the expanded text,
    /// one per line touched.
    fn range_rects(&self, paragraph: &Self::Paragraph, range: Range<usize>) -> Vec<Rect>;

    /// Calls `visitor` for every inked glyph run, in visual order by line.
    fn visit_runs(&self, paragraph: &Self::Paragraph, visitor: &mut dyn FnMut(GlyphRun<'_>));

    /// The word containing the given index, in UTF-16 code units of the
    /// expanded text.
    fn word_boundary(&self, paragraph: &Self::Paragraph, unit_index: usize) -> Range<usize>;

    /// Paints the paragraph with its top left at `origin`.
    fn paint(&self, paragraph: &Self::Paragraph, canvas: &mut Self::Canvas, origin: Point);
}

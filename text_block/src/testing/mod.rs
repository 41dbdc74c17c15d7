// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A deterministic shape engine for tests.
//!
//! Every glyph is monospace with metrics derived linearly from the font size,
//! so expected geometry can be computed by hand: advance is 0.6 times the
//! size, ascent 0.8 times, descent 0.2 times. Wrapping is greedy at word
//! boundaries. Painting records glyphs instead of rasterizing.

use core::cell::RefCell;
use core::ops::Range;

use peniko::kurbo::{Point, Rect};
use peniko::Color;
use styled_runs::TextStyle;

use crate::engine::{GlyphRun, LineMetrics, ShapeEngine, ShapeRequest};
use crate::font_cache::FontCache;
use crate::options::AlignH;

const ADVANCE_FACTOR: f64 = 0.6;
const ASCENT_FACTOR: f64 = 0.8;
const DESCENT_FACTOR: f64 = 0.2;
const INK_HEIGHT_FACTOR: f64 = 0.75;
const INK_WIDTH_FACTOR: f64 = 0.9;

const PLACEHOLDER: char = '\u{FFFC}';

fn is_word_space(ch: char) -> bool {
    ch == ' ' || ch == PLACEHOLDER
}

fn is_invisible(ch: char) -> bool {
    is_word_space(ch) || ch == '\n'
}

#[derive(Clone, Debug)]
struct Glyph {
    ch: char,
    byte_start: usize,
    advance: f64,
    size: f32,
    shift: f32,
    line_mult: f64,
    color: Color,
    // Filled in by layout.
    x: f64,
    line: usize,
}

#[derive(Clone, Debug)]
struct Line {
    range: Range<usize>,
    top: f64,
    height: f64,
    baseline: f64,
    ascent: f64,
    descent: f64,
    origin_x: f64,
}

/// A shaped paragraph of [`FixedMetricsEngine`] glyphs.
#[derive(Clone, Debug)]
pub(crate) struct FixedParagraph {
    glyphs: Vec<Glyph>,
    base_size: f32,
    line_height: f64,
    align: AlignH,
    max_width: Option<f64>,
    max_lines: Option<usize>,
    lines: Vec<Line>,
}

impl FixedParagraph {
    fn layout(&mut self) {
        let ranges = self.break_lines();
        self.lines.clear();
        let mut top = 0.0;
        for (index, range) in ranges.into_iter().enumerate() {
            let max_size = self.glyphs[range.clone()]
                .iter()
                .filter(|g| g.ch != '\n')
                .map(|g| g.size)
                .fold(0.0_f32, f32::max);
            let size = if max_size > 0.0 {
                f64::from(max_size)
            } else {
                f64::from(self.base_size)
            };
            let ascent = size * ASCENT_FACTOR;
            let descent = size * DESCENT_FACTOR;
            let natural = ascent + descent;
            let mult = self.glyphs[range.clone()]
                .iter()
                .map(|g| g.line_mult)
                .fold(self.line_height, f64::max);
            let height = natural * mult;
            let leading = (height - natural) / 2.0;

            let mut x = 0.0;
            let mut width = 0.0;
            for i in range.clone() {
                self.glyphs[i].x = x;
                self.glyphs[i].line = index;
                x += self.glyphs[i].advance;
                if !is_invisible(self.glyphs[i].ch) {
                    width = x;
                }
            }
            let origin_x = match (self.align, self.max_width) {
                (AlignH::Center, Some(max)) => (max - width) / 2.0,
                (AlignH::Right, Some(max)) => max - width,
                _ => 0.0,
            };

            self.lines.push(Line {
                range,
                top,
                height,
                baseline: top + leading + ascent,
                ascent,
                descent,
                origin_x,
            });
            top += height;
        }
    }

    /// Greedy word wrap; an unbreakable word longer than the limit is broken
    /// at the overflowing glyph.
    fn break_lines(&self) -> Vec<Range<usize>> {
        let mut ranges = Vec::new();
        let mut start = 0;
        let mut x = 0.0;
        let mut last_space = None;
        let mut i = 0;
        while i < self.glyphs.len() {
            let ch = self.glyphs[i].ch;
            if ch == '\n' {
                ranges.push(start..i + 1);
                start = i + 1;
                x = 0.0;
                last_space = None;
                i += 1;
                continue;
            }
            let next_x = x + self.glyphs[i].advance;
            if self.max_width.is_some_and(|max| next_x > max) && i > start && !is_word_space(ch) {
                let break_at = match last_space {
                    Some(space) if space >= start => space + 1,
                    _ => i,
                };
                ranges.push(start..break_at);
                start = break_at;
                x = self.glyphs[start..i].iter().map(|g| g.advance).sum();
                last_space = None;
                continue;
            }
            x = next_x;
            if is_word_space(ch) {
                last_space = Some(i);
            }
            i += 1;
        }
        if start < self.glyphs.len() || ranges.is_empty() {
            ranges.push(start..self.glyphs.len());
        }
        if let Some(max) = self.max_lines {
            if ranges.len() > max && max > 0 {
                ranges.truncate(max);
                if let Some(last) = ranges.last_mut() {
                    last.end = self.glyphs.len();
                }
            }
        }
        ranges
    }

    /// UTF-16 unit range of each glyph, in order.
    fn unit_spans(&self) -> Vec<Range<usize>> {
        let mut spans = Vec::with_capacity(self.glyphs.len());
        let mut unit = 0;
        for glyph in &self.glyphs {
            let len = glyph.ch.len_utf16();
            spans.push(unit..unit + len);
            unit += len;
        }
        spans
    }
}

/// The canvas [`FixedMetricsEngine::paint`] draws to: a glyph log.
#[derive(Clone, Debug, Default)]
pub(crate) struct RecordingCanvas {
    pub(crate) glyphs: Vec<(char, Point, Color)>,
}

/// A shape engine with fixed, size-proportional metrics.
pub(crate) struct FixedMetricsEngine {
    families: Vec<String>,
    advances: RefCell<FontCache<(String, u32), f64>>,
}

impl FixedMetricsEngine {
    pub(crate) fn new() -> Self {
        Self::with_families(&["TestSans"])
    }

    pub(crate) fn with_families(families: &[&str]) -> Self {
        Self {
            families: families.iter().map(|f| (*f).to_string()).collect(),
            advances: RefCell::new(FontCache::new(8)),
        }
    }

    pub(crate) fn cached_advances(&self) -> usize {
        self.advances.borrow().len()
    }

    fn advance_for(&self, family: &str, size: f32) -> Option<f64> {
        if !self.families.iter().any(|f| f == family) {
            return None;
        }
        let key = (family.to_string(), size.to_bits());
        let advance = *self
            .advances
            .borrow_mut()
            .entry(key, || f64::from(size) * ADVANCE_FACTOR);
        Some(advance)
    }
}

impl ShapeEngine for FixedMetricsEngine {
    type Paragraph = FixedParagraph;
    type Canvas = RecordingCanvas;

    fn space_advance(&self, family: &str, style: &TextStyle) -> Option<f64> {
        self.advance_for(family, style.font_size)
    }

    fn shape(&self, request: &ShapeRequest<'_>) -> Option<Self::Paragraph> {
        let mut glyphs = Vec::new();
        for (byte_start, ch) in request.text.char_indices() {
            let style = request
                .spans
                .iter()
                .find(|(range, _)| range.contains(&byte_start))
                .map(|(_, style)| style)
                .unwrap_or(request.base);
            let advance = if ch == PLACEHOLDER {
                request.placeholder_width
            } else if ch == '\n' {
                0.0
            } else {
                self.advance_for(request.family, style.font_size)?
                    + f64::from(style.letter_spacing)
            };
            let base_mult = request
                .base
                .line_height
                .map(f64::from)
                .filter(|&h| h > 0.0)
                .unwrap_or(1.0);
            glyphs.push(Glyph {
                ch,
                byte_start,
                advance,
                size: style.font_size,
                shift: style.baseline_shift,
                line_mult: style
                    .line_height
                    .map(f64::from)
                    .filter(|&h| h > 0.0)
                    .unwrap_or(base_mult),
                color: style.color.unwrap_or(Color::BLACK),
                x: 0.0,
                line: 0,
            });
        }
        let mut paragraph = FixedParagraph {
            glyphs,
            base_size: request.base.font_size,
            line_height: request
                .base
                .line_height
                .map(f64::from)
                .filter(|&h| h > 0.0)
                .unwrap_or(1.0),
            align: request.align,
            max_width: request.max_width,
            max_lines: request.max_lines,
            lines: Vec::new(),
        };
        paragraph.layout();
        Some(paragraph)
    }

    fn relayout(&self, paragraph: &mut Self::Paragraph, max_width: Option<f64>) {
        paragraph.max_width = max_width;
        paragraph.layout();
    }

    fn height(&self, paragraph: &Self::Paragraph) -> f64 {
        paragraph
            .lines
            .last()
            .map(|line| line.top + line.height)
            .unwrap_or(0.0)
    }

    fn alphabetic_baseline(&self, paragraph: &Self::Paragraph) -> f64 {
        paragraph.lines.first().map(|line| line.baseline).unwrap_or(0.0)
    }

    fn line_metrics(&self, paragraph: &Self::Paragraph) -> Vec<LineMetrics> {
        paragraph
            .lines
            .iter()
            .map(|line| LineMetrics {
                baseline: line.baseline,
                ascent: line.ascent,
                descent: line.descent,
            })
            .collect()
    }

    fn range_rects(&self, paragraph: &Self::Paragraph, range: Range<usize>) -> Vec<Rect> {
        let mut rects = Vec::new();
        for line in &paragraph.lines {
            let mut edges: Option<(f64, f64)> = None;
            for glyph in &paragraph.glyphs[line.range.clone()] {
                if glyph.ch == '\n' || !range.contains(&glyph.byte_start) {
                    continue;
                }
                let left = line.origin_x + glyph.x;
                let right = left + glyph.advance;
                edges = Some(match edges {
                    Some((x0, x1)) => (x0.min(left), x1.max(right)),
                    None => (left, right),
                });
            }
            if let Some((x0, x1)) = edges {
                rects.push(Rect::new(x0, line.top, x1, line.top + line.height));
            }
        }
        rects
    }

    fn visit_runs(&self, paragraph: &Self::Paragraph, visitor: &mut dyn FnMut(GlyphRun<'_>)) {
        for (line_index, line) in paragraph.lines.iter().enumerate() {
            let mut i = line.range.start;
            while i < line.range.end {
                if is_invisible(paragraph.glyphs[i].ch) {
                    i += 1;
                    continue;
                }
                let run_start = i;
                while i < line.range.end && !is_invisible(paragraph.glyphs[i].ch) {
                    i += 1;
                }
                let first = &paragraph.glyphs[run_start];
                let origin = Point::new(line.origin_x + first.x, line.baseline);
                let mut byte_starts = Vec::with_capacity(i - run_start + 1);
                let mut positions = Vec::with_capacity(i - run_start);
                let mut ink_bounds = Vec::with_capacity(i - run_start);
                for glyph in &paragraph.glyphs[run_start..i] {
                    byte_starts.push(glyph.byte_start);
                    positions.push(Point::new(glyph.x - first.x, -f64::from(glyph.shift)));
                    ink_bounds.push(Rect::new(
                        0.0,
                        -f64::from(glyph.size) * INK_HEIGHT_FACTOR,
                        glyph.advance * INK_WIDTH_FACTOR,
                        0.0,
                    ));
                }
                let last = &paragraph.glyphs[i - 1];
                byte_starts.push(last.byte_start + last.ch.len_utf8());
                visitor(GlyphRun {
                    line: line_index,
                    origin,
                    byte_starts: &byte_starts,
                    positions: &positions,
                    ink_bounds: &ink_bounds,
                });
            }
        }
    }

    fn word_boundary(&self, paragraph: &Self::Paragraph, unit_index: usize) -> Range<usize> {
        let spans = paragraph.unit_spans();
        let total = spans.last().map(|span| span.end).unwrap_or(0);
        let Some(hit) = spans
            .iter()
            .position(|span| span.contains(&unit_index))
        else {
            return total..total;
        };
        let spacey = is_invisible(paragraph.glyphs[hit].ch);
        let mut first = hit;
        while first > 0 && is_invisible(paragraph.glyphs[first - 1].ch) == spacey {
            first -= 1;
        }
        let mut last = hit;
        while last + 1 < paragraph.glyphs.len()
            && is_invisible(paragraph.glyphs[last + 1].ch) == spacey
        {
            last += 1;
        }
        spans[first].start..spans[last].end
    }

    fn paint(&self, paragraph: &Self::Paragraph, canvas: &mut Self::Canvas, origin: Point) {
        for line in &paragraph.lines {
            for glyph in &paragraph.glyphs[line.range.clone()] {
                if is_invisible(glyph.ch) {
                    continue;
                }
                let position = Point::new(
                    origin.x + line.origin_x + glyph.x,
                    origin.y + line.baseline - f64::from(glyph.shift),
                );
                canvas.glyphs.push((glyph.ch, position, glyph.color));
            }
        }
    }
}

// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The block: cached layout state plus the geometry queries over it.

use core::fmt;
use core::ops::Range;

use peniko::kurbo::{Point, Rect, Size, Vec2};
use peniko::Color;
use styled_runs::{FontFlags, RunList, TextStyle};

use crate::engine::{GlyphRun, LineMetrics, ShapeEngine, ShapeRequest};
use crate::error::Error;
use crate::options::{AlignH, AlignV, Alignment, BlockOptions, LineMode, TextOptions};
use crate::position::{PositionMap, TAB_PLACEHOLDER, TAB_SUBSTITUTE};

const SPACE: u16 = b' ' as u16;
const TAB: u16 = b'\t' as u16;
const NEWLINE: u16 = b'\n' as u16;

/// Result of a [`TextBlock::hit_test`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitTest {
    /// External index of the character the point resolved to. May be one past
    /// the last character for a caret at the end of the text.
    pub index: usize,
    /// Top of the caret the point snapped to, in block coordinates.
    pub position: Point,
}

/// A laid-out, styleable block of text.
///
/// A block owns one text, a set of style runs over it and a bounding box, and
/// answers geometry questions about the result: overall bounds, per-character
/// caret rectangles, hit tests, line and word ranges. All indices in the
/// public API are UTF-16 code units; a tab counts as one unit even though the
/// shaper sees it as two characters.
///
/// Layout and the derived geometry tables are computed lazily. Style edits
/// and resizes only mark caches dirty; the next query rebuilds exactly the
/// caches it needs.
pub struct TextBlock<E: ShapeEngine> {
    engine: E,
    options: BlockOptions,

    text: String,
    units: Vec<u16>,
    family: String,
    line_mode: LineMode,
    alignment: Alignment,
    restrict_width: bool,
    bounding: Size,
    default_color: Color,
    space_width: Option<f64>,

    positions: PositionMap,
    runs: RunList,

    paragraph: Option<E::Paragraph>,
    needs_relayout: bool,
    positions_dirty: bool,
    text_bounds_dirty: bool,
    image_bounds_dirty: bool,
    character_bounds_dirty: bool,

    text_rect: Rect,
    image_rect: Rect,
    character_bounds: Vec<Rect>,
    hit_test_bounds: Vec<Rect>,
}

impl<E: ShapeEngine> TextBlock<E> {
    /// Creates an empty block with default options.
    pub fn new(engine: E) -> Self {
        Self::with_options(engine, BlockOptions::default())
    }

    /// Creates an empty block with the given policy options.
    pub fn with_options(engine: E, options: BlockOptions) -> Self {
        Self {
            engine,
            options,
            text: String::new(),
            units: Vec::new(),
            family: String::new(),
            line_mode: LineMode::default(),
            alignment: Alignment::default(),
            restrict_width: false,
            bounding: Size::ZERO,
            default_color: Color::BLACK,
            space_width: None,
            positions: PositionMap::default(),
            runs: RunList::new(TextStyle::default()),
            paragraph: None,
            needs_relayout: false,
            positions_dirty: true,
            text_bounds_dirty: true,
            image_bounds_dirty: true,
            character_bounds_dirty: true,
            text_rect: Rect::ZERO,
            image_rect: Rect::ZERO,
            character_bounds: Vec::new(),
            hit_test_bounds: Vec::new(),
        }
    }

    /// The shape engine driving this block.
    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// The text of the block.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length of the text in UTF-16 code units.
    pub fn len_utf16(&self) -> usize {
        self.units.len()
    }

    /// The style runs currently applied over the text, with offsets in raw
    /// UTF-8 bytes of the text.
    pub fn style_runs(&self) -> &RunList {
        &self.runs
    }

    /// Internal byte offset of each code unit, plus an end sentinel.
    ///
    /// Offsets are into the expanded text the shaper sees, where each tab is
    /// a space plus a placeholder character.
    pub fn position_table(&mut self) -> &[usize] {
        self.ensure_positions();
        self.positions.entries()
    }

    /// Replaces the block's text, base style and layout configuration.
    ///
    /// All previous style runs are discarded. Returns [`Error::Unavailable`]
    /// if the font family cannot be resolved; the configuration is stored
    /// regardless, so a later reconstruction can succeed.
    pub fn construct(
        &mut self,
        text: &str,
        size: Size,
        family: &str,
        base: TextStyle,
        line_mode: LineMode,
        options: TextOptions,
    ) -> Result<(), Error> {
        self.runs.reset(base);
        self.text.clear();
        self.text.push_str(text);
        self.units = text.encode_utf16().collect();
        self.family.clear();
        self.family.push_str(family);
        self.line_mode = line_mode;
        self.alignment = options.alignment;
        self.restrict_width = line_mode == LineMode::Multi
            && (options.word_break
                || matches!(options.alignment.horizontal, AlignH::Center | AlignH::Right));
        self.bounding = size;
        self.paragraph = None;
        self.positions_dirty = true;
        self.invalidate_layout();
        self.invalidate_bounds();

        self.space_width = self.engine.space_advance(&self.family, self.runs.base());
        match self.space_width {
            Some(_) => Ok(()),
            None => Err(Error::Unavailable),
        }
    }

    /// Updates the bounding box without reshaping the text.
    ///
    /// An existing paragraph is re-wrapped to the new width; style runs and
    /// index tables are untouched.
    pub fn resize(&mut self, size: Size) {
        self.bounding = size;
        self.invalidate_bounds();
        let max_width = self.constraint_width();
        if let Some(paragraph) = self.paragraph.as_mut() {
            self.engine.relayout(paragraph, max_width);
        }
    }

    /// Sets or clears the flagged attributes over `range`.
    pub fn set_font_flags(&mut self, range: Range<usize>, mask: FontFlags, enabled: bool) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.set_flags(mask, enabled));
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Sets the font size over `range`.
    pub fn set_font_size(&mut self, range: Range<usize>, size: f32) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.font_size = size);
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Sets the extra letter spacing over `range`.
    pub fn set_letter_spacing(&mut self, range: Range<usize>, spacing: f32) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.letter_spacing = spacing);
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Sets the line height multiplier over `range`.
    ///
    /// A multiplier of exactly `1.0` restores the font's natural line height.
    pub fn set_line_spacing(&mut self, range: Range<usize>, multiplier: f32) {
        let target = self.style_range(range);
        let height = (multiplier != 1.0).then_some(multiplier);
        self.runs.apply(target, |style| style.line_height = height);
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Shifts the baseline over `range`. Positive values raise the text.
    pub fn set_baseline_offset(&mut self, range: Range<usize>, offset: f32) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.baseline_shift = offset);
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Sets the text color over `range`.
    ///
    /// Color never moves a glyph, so cached geometry stays valid.
    pub fn set_color(&mut self, range: Range<usize>, color: Color) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.color = Some(color));
        self.invalidate_layout();
    }

    /// Sets the background fill over `range`.
    pub fn set_background(&mut self, range: Range<usize>, color: Color) {
        let target = self.style_range(range);
        self.runs.apply(target, |style| style.background = Some(color));
        self.invalidate_layout();
    }

    /// Turns `range` into superscript.
    ///
    /// The size and baseline adjustments compose with whatever is already in
    /// effect: each overlapped run is scaled relative to its own font size,
    /// so a larger run inside the range stays proportionally larger.
    pub fn set_superscript(&mut self, range: Range<usize>) {
        let size_factor = self.options.superscript_size_factor;
        let baseline_factor = self.options.superscript_baseline_factor;
        self.apply_script(range, size_factor, baseline_factor);
    }

    /// Turns `range` into subscript.
    pub fn set_subscript(&mut self, range: Range<usize>) {
        let size_factor = self.options.subscript_size_factor;
        let baseline_factor = -self.options.subscript_baseline_factor;
        self.apply_script(range, size_factor, baseline_factor);
    }

    fn apply_script(&mut self, range: Range<usize>, size_factor: f32, baseline_factor: f32) {
        let target = self.style_range(range);
        if target.start >= target.end {
            return;
        }
        // Snapshot the pre-edit segmentation so each overlapped run is
        // adjusted exactly once, relative to its own pre-edit style.
        let overlaps: Vec<(Range<usize>, f32, f32)> = self
            .runs
            .segments(self.positions.raw_len().max(target.end))
            .filter_map(|(segment, style)| {
                let start = segment.start.max(target.start);
                let end = segment.end.min(target.end);
                (start < end).then(|| (start..end, style.font_size, style.baseline_shift))
            })
            .collect();
        for (segment, font_size, baseline_shift) in overlaps {
            let scaled = font_size * size_factor;
            let shifted = baseline_shift + baseline_factor * font_size;
            self.runs.apply(segment, |style| {
                style.font_size = scaled;
                style.baseline_shift = shifted;
            });
        }
        self.invalidate_layout();
        self.invalidate_bounds();
    }

    /// Bounds of the text within the bounding box, padded by the inset.
    pub fn bounds(&mut self) -> Result<Rect, Error> {
        let inset = self.options.inset;
        Ok(self.tight_bounds()?.inflate(inset, inset))
    }

    /// Bounds of the text within the bounding box, without padding.
    pub fn tight_bounds(&mut self) -> Result<Rect, Error> {
        self.ensure_text_bounds()?;
        Ok(self.text_rect + self.paragraph_offset())
    }

    /// Union of the ink of every glyph, in block coordinates.
    ///
    /// Unlike [`Self::bounds`] this reflects what is actually painted, so it
    /// excludes whitespace and includes overshoot beyond the line boxes.
    pub fn image_bounds(&mut self) -> Result<Rect, Error> {
        self.ensure_text_bounds()?;
        if self.image_bounds_dirty {
            let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
            let mut union: Option<Rect> = None;
            self.engine.visit_runs(paragraph, &mut |run: GlyphRun<'_>| {
                for i in 0..run.len() {
                    let offset = run.origin.to_vec2() + run.positions[i].to_vec2();
                    let ink = run.ink_bounds[i] + offset;
                    union = Some(match union {
                        Some(u) => u.union(ink),
                        None => ink,
                    });
                }
            });
            self.image_rect = union.unwrap_or(Rect::ZERO);
            self.image_bounds_dirty = false;
        }
        Ok(self.image_rect + self.paragraph_offset())
    }

    /// Position of the first alphabetic baseline, in block coordinates.
    ///
    /// The vertical component is rounded to the nearest pixel.
    pub fn baseline(&mut self) -> Result<Point, Error> {
        self.ensure_text_bounds()?;
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        let baseline = (self.engine.alphabetic_baseline(paragraph) + 0.5).floor();
        let offset = self.paragraph_offset();
        Ok(Point::new(offset.x, offset.y + baseline))
    }

    /// Caret rectangle of the character at `index`, in block coordinates.
    ///
    /// Indices past the end clamp to a zero-width caret after the last
    /// character; `index == len` is exactly that caret. On an empty text the
    /// rectangle is a zero-width caret with one line of height.
    pub fn character_bounds(&mut self, index: usize) -> Result<Rect, Error> {
        self.ensure_character_bounds()?;
        let rect = match self.character_bounds.get(index) {
            Some(rect) => *rect,
            None => match self.character_bounds.last() {
                Some(last) => {
                    let mut caret = *last;
                    caret.x0 = caret.x1;
                    caret
                }
                None => Rect::new(0.0, 0.0, 0.0, self.empty_caret_height()?),
            },
        };
        Ok(rect + self.paragraph_offset())
    }

    /// Maps a point in block coordinates to a character index and caret.
    ///
    /// The point snaps horizontally to the nearest caret edge of the
    /// character it lands on, to the line start for points left of the block
    /// and to the nearest text end when nothing matches.
    pub fn hit_test(&mut self, point: Point) -> Result<HitTest, Error> {
        self.ensure_character_bounds()?;
        let offset = self.paragraph_offset();
        if self.character_bounds.is_empty() {
            return Ok(HitTest {
                index: 0,
                position: Point::new(offset.x, offset.y),
            });
        }
        let local = point - offset;

        let mut found = None;
        let mut past_line_end = false;
        for (i, rect) in self.hit_test_bounds.iter().enumerate() {
            if rect.contains(local) {
                found = Some(i);
                break;
            }
            // Left of the block but vertically on this line: snap to the
            // line start. A line's trailing newline never matches here.
            if local.x < 0.0
                && local.y >= rect.y0
                && local.y < rect.y1
                && self.units[i] != NEWLINE
            {
                found = Some(i);
                break;
            }
            // The scan has moved to a line below the point, so the point sat
            // past the right end of the previous line.
            if local.y < rect.y0 {
                found = Some(i);
                past_line_end = true;
                break;
            }
        }

        let (index, position) = match found {
            None => {
                let first = self.character_bounds[0];
                if local.y < first.y1 && local.x < first.x0 {
                    (0, Point::new(first.x0, first.y0))
                } else {
                    let last_index = self.character_bounds.len() - 1;
                    let last = self.character_bounds[last_index];
                    (last_index, Point::new(last.x1, last.y0))
                }
            }
            Some(i) if past_line_end => {
                let previous = self.character_bounds[i.saturating_sub(1)];
                (i, Point::new(previous.x1, previous.y0))
            }
            Some(i) => {
                let rect = self.character_bounds[i];
                if local.x >= rect.x0 + rect.width() / 2.0 {
                    (i + 1, Point::new(rect.x1, rect.y0))
                } else {
                    (i, Point::new(rect.x0, rect.y0))
                }
            }
        };
        Ok(HitTest {
            index,
            position: position + offset,
        })
    }

    /// Selection rectangles covering `range`, one per line, in block
    /// coordinates.
    ///
    /// Rectangles on the same line are merged. Every rectangle is at least
    /// one pixel wide so that empty ranges and bare line breaks still mark a
    /// caret.
    pub fn selection_rects(&mut self, range: Range<usize>) -> Result<Vec<Rect>, Error> {
        self.ensure_character_bounds()?;
        let offset = self.paragraph_offset();
        let tolerance = self.options.line_tolerance;
        let end = range.end.min(self.character_bounds.len());

        let mut rects = Vec::new();
        let mut current: Option<Rect> = None;
        for i in range.start..end {
            let rect = self.character_bounds[i];
            current = Some(match current {
                Some(line) => {
                    let line_center = (line.y0 + line.y1) / 2.0;
                    let center = (rect.y0 + rect.y1) / 2.0;
                    if (center - line_center).abs() <= tolerance {
                        line.union(rect)
                    } else {
                        rects.push(finish_selection_rect(line, offset));
                        rect
                    }
                }
                None => rect,
            });
        }
        match current {
            Some(line) => rects.push(finish_selection_rect(line, offset)),
            None => {
                // Empty range: a marker at the caret. Already in block
                // coordinates.
                let caret = self.character_bounds(range.start)?;
                rects.push(Rect::new(caret.x0, caret.y0, caret.x0 + 1.0, caret.y1));
            }
        }
        Ok(rects)
    }

    /// Range of characters on the line containing `index`.
    ///
    /// The returned range may include the end-of-text caret slot, so its end
    /// can be one past the last character. Index `len` addresses that slot
    /// directly; anything beyond is an error.
    pub fn line_range(&mut self, index: usize) -> Result<Range<usize>, Error> {
        self.ensure_character_bounds()?;
        if self.character_bounds.is_empty() && index == 0 {
            return Ok(0..0);
        }
        if index >= self.character_bounds.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.units.len(),
            });
        }
        let tolerance = self.options.line_tolerance;
        let anchor = center_y(self.character_bounds[index]);

        let mut start = index;
        for i in (0..index).rev() {
            if center_y(self.character_bounds[i]) < anchor - tolerance {
                break;
            }
            start = i;
        }
        let mut end = self.character_bounds.len();
        for (i, rect) in self.character_bounds.iter().enumerate().skip(index) {
            if center_y(*rect) > anchor + tolerance {
                end = i;
                break;
            }
        }
        Ok(start..end)
    }

    /// Range of the word containing `index`, in external indices.
    pub fn word_range(&mut self, index: usize) -> Result<Range<usize>, Error> {
        self.ensure_layout()?;
        if self.units.is_empty() && index == 0 {
            return Ok(0..0);
        }
        if index > self.units.len() {
            return Err(Error::IndexOutOfBounds {
                index,
                len: self.units.len(),
            });
        }
        // The shaper counts a tab as two characters (substitute space plus
        // placeholder), so external indices drift by one per preceding tab.
        let drift = self.units[..index.min(self.units.len())]
            .iter()
            .filter(|&&unit| unit == TAB)
            .count();
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        let boundary = self.engine.word_boundary(paragraph, index + drift);
        let len = boundary.end.saturating_sub(boundary.start);
        let start = boundary.start.saturating_sub(drift);
        Ok(start..start + len)
    }

    /// Paints the block with its bounding box's top left at `position`.
    ///
    /// `color` becomes the default color for every run that has not set one
    /// explicitly; changing it triggers a reshape on the way.
    pub fn draw(
        &mut self,
        canvas: &mut E::Canvas,
        position: Point,
        color: Color,
    ) -> Result<(), Error> {
        if self.default_color != color {
            self.default_color = color;
            self.needs_relayout = true;
        }
        self.ensure_text_bounds()?;
        let origin = position + self.paragraph_offset();
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        self.engine.paint(paragraph, canvas, origin);
        Ok(())
    }

    fn invalidate_layout(&mut self) {
        self.needs_relayout = true;
    }

    fn invalidate_bounds(&mut self) {
        self.text_bounds_dirty = true;
        self.image_bounds_dirty = true;
        self.character_bounds_dirty = true;
    }

    fn ensure_positions(&mut self) {
        if self.positions_dirty {
            self.positions.rebuild(&self.units);
            self.positions_dirty = false;
        }
    }

    /// Converts an external range into raw style offsets.
    fn style_range(&mut self, range: Range<usize>) -> Range<usize> {
        self.ensure_positions();
        let start = self.positions.style_offset(range.start);
        let end = self.positions.style_offset(range.end.max(range.start));
        start..end.max(start)
    }

    fn constraint_width(&self) -> Option<f64> {
        self.restrict_width
            .then(|| (self.bounding.width - self.options.inset * 2.0).max(0.0))
    }

    fn paragraph_align(&self) -> AlignH {
        match self.line_mode {
            LineMode::Single => AlignH::Left,
            LineMode::Multi => self.alignment.horizontal,
        }
    }

    fn resolve_style(&self, style: &TextStyle) -> TextStyle {
        let mut resolved = style.clone();
        resolved.color = Some(resolved.color.unwrap_or(self.default_color));
        resolved
    }

    fn build_paragraph(&self) -> Option<E::Paragraph> {
        let space_width = self.space_width?;

        let mut expanded = String::with_capacity(self.positions.internal_len());
        for ch in self.text.chars() {
            if ch == '\t' {
                expanded.push(TAB_SUBSTITUTE);
                expanded.push(TAB_PLACEHOLDER);
            } else {
                expanded.push(ch);
            }
        }

        let mut spans = Vec::new();
        for (range, style) in self.runs.segments(self.positions.raw_len()) {
            let start = self.positions.style_to_internal(range.start);
            let end = self.positions.style_to_internal(range.end);
            spans.push((start..end, self.resolve_style(style)));
        }

        let base = self.resolve_style(self.runs.base());
        let request = ShapeRequest {
            text: &expanded,
            family: &self.family,
            base: &base,
            spans: &spans,
            max_width: self.constraint_width(),
            max_lines: matches!(self.line_mode, LineMode::Single).then_some(1),
            align: self.paragraph_align(),
            placeholder_width: space_width * (self.options.tab_size.saturating_sub(1)) as f64,
        };
        self.engine.shape(&request)
    }

    fn ensure_layout(&mut self) -> Result<(), Error> {
        self.ensure_positions();
        if self.needs_relayout {
            self.needs_relayout = false;
            self.paragraph = self.build_paragraph();
        }
        match self.paragraph {
            Some(_) => Ok(()),
            None => Err(Error::Unavailable),
        }
    }

    fn ensure_text_bounds(&mut self) -> Result<(), Error> {
        self.ensure_layout()?;
        if !self.text_bounds_dirty {
            return Ok(());
        }
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        let internal_len = self.positions.internal_len();
        let line_rects = self.engine.range_rects(paragraph, 0..internal_len);

        let mut union: Option<Rect> = None;
        let mut line_offset = 0.0;
        let mut previous_top = 0.0;
        for rect in &line_rects {
            union = Some(match union {
                Some(u) => u.union(*rect),
                None => *rect,
            });
            if rect.width() <= 0.0 || rect.height() <= 0.0 {
                continue;
            }
            line_offset = rect.y0 - previous_top;
            previous_top = rect.y0;
        }
        let mut rect = union.unwrap_or(Rect::ZERO);
        // The shaper reports no rectangle for the empty line a trailing
        // newline opens; extend by one line step to cover it.
        if self.text.ends_with('\n') && !line_rects.is_empty() {
            rect.y1 += line_offset;
        }
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            rect = Rect::new(0.0, 0.0, 0.0, self.engine.height(paragraph));
        }
        self.text_rect = rect;
        self.text_bounds_dirty = false;
        Ok(())
    }

    fn ensure_character_bounds(&mut self) -> Result<(), Error> {
        self.ensure_text_bounds()?;
        if self.character_bounds_dirty {
            self.rebuild_character_bounds()?;
        }
        Ok(())
    }

    fn rebuild_character_bounds(&mut self) -> Result<(), Error> {
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        let metrics = self.engine.line_metrics(paragraph);
        if metrics.is_empty() {
            self.character_bounds.clear();
            self.hit_test_bounds.clear();
            self.character_bounds_dirty = false;
            return Ok(());
        }
        let internal_len = self.positions.internal_len();
        // The dominant line height clamps every rectangle, so one oversized
        // glyph does not stretch its neighbors' carets.
        let line_height = self
            .engine
            .range_rects(paragraph, 0..internal_len)
            .iter()
            .fold(0.0_f64, |height, rect| height.max(rect.height()));
        let space_width = self.space_width.unwrap_or(0.0);

        let mut builder = BoundsBuilder {
            units: &self.units,
            map: self.positions.entries(),
            metrics: &metrics,
            line_height,
            space_width,
            tab_width: space_width * self.options.tab_size as f64,
            character_bounds: Vec::with_capacity(self.units.len() + 1),
            hit_test_bounds: Vec::with_capacity(self.units.len()),
            index: 0,
            last_line: 0,
        };
        self.engine
            .visit_runs(paragraph, &mut |run: GlyphRun<'_>| builder.visit(run));
        // Whatever the visitation did not reach (trailing whitespace, text
        // that is all whitespace) is synthesized from line metrics alone.
        while builder.index < builder.units.len() {
            builder.synthesize();
        }
        let BoundsBuilder {
            character_bounds,
            hit_test_bounds,
            ..
        } = builder;
        self.character_bounds = character_bounds;
        self.hit_test_bounds = hit_test_bounds;
        self.character_bounds_dirty = false;
        Ok(())
    }

    /// Translation from paragraph coordinates to block coordinates.
    ///
    /// Valid only while the text bounds cache is current.
    fn paragraph_offset(&self) -> Vec2 {
        let inset = self.options.inset;
        let free_width = self.bounding.width - self.text_rect.width() - inset * 2.0;
        let x = match self.alignment.horizontal {
            AlignH::Left => inset,
            AlignH::Center => inset + free_width / 2.0,
            AlignH::Right => inset + free_width,
        };
        let free_height = self.bounding.height - self.text_rect.height() - inset * 2.0;
        let y = match self.alignment.vertical {
            AlignV::Top => inset,
            AlignV::Center => inset + free_height / 2.0,
            AlignV::Bottom => inset + free_height,
        };
        Vec2::new(x - self.text_rect.x0, y - self.text_rect.y0)
    }

    fn empty_caret_height(&self) -> Result<f64, Error> {
        let paragraph = self.paragraph.as_ref().ok_or(Error::Unavailable)?;
        let mut height = self.engine.height(paragraph);
        // An empty paragraph still applies the line height override; the
        // caret wants the natural height back.
        if let Some(multiplier) = self.runs.base().line_height {
            if multiplier > 0.0 {
                height /= f64::from(multiplier);
            }
        }
        Ok(height)
    }
}

impl<E: ShapeEngine> fmt::Debug for TextBlock<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextBlock")
            .field("text", &self.text)
            .field("family", &self.family)
            .field("line_mode", &self.line_mode)
            .field("alignment", &self.alignment)
            .field("bounding", &self.bounding)
            .field("shaped", &self.paragraph.is_some())
            .finish_non_exhaustive()
    }
}

fn center_y(rect: Rect) -> f64 {
    (rect.y0 + rect.y1) / 2.0
}

fn finish_selection_rect(mut rect: Rect, offset: Vec2) -> Rect {
    // Keep even degenerate rects visible as a caret-width marker.
    if rect.width() < 1.0 {
        rect.x1 = rect.x0 + 1.0;
    }
    rect + offset
}

fn is_low_surrogate(unit: u16) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Rebuilds the per-character tables from one visitation of the glyph runs.
///
/// The engine only reports inked glyphs, so the builder interleaves two
/// sources: glyph geometry for visible characters, and line metrics for the
/// whitespace between them. `index` is the next external character waiting
/// for a rectangle; `map` translates it into expanded byte offsets for
/// comparison with cluster starts.
struct BoundsBuilder<'a> {
    units: &'a [u16],
    map: &'a [usize],
    metrics: &'a [LineMetrics],
    line_height: f64,
    space_width: f64,
    tab_width: f64,
    character_bounds: Vec<Rect>,
    hit_test_bounds: Vec<Rect>,
    index: usize,
    last_line: usize,
}

impl BoundsBuilder<'_> {
    fn visit(&mut self, run: GlyphRun<'_>) {
        for i in 0..run.len() {
            let cluster_start = run.byte_starts[i];
            let cluster_end = run.byte_starts[i + 1];

            // Characters the shaper skipped before this glyph.
            while self.index < self.units.len() && self.map[self.index] < cluster_start {
                self.synthesize();
            }
            if self.index >= self.units.len() {
                return;
            }

            let line = run.line.min(self.metrics.len().saturating_sub(1));
            let metrics = &self.metrics[line];
            let left = run.origin.x + run.positions[i].x;
            let right = if i + 1 < run.len() {
                run.origin.x + run.positions[i + 1].x
            } else {
                run.ink_right().max(left)
            };
            let top = run.origin.y - metrics.ascent;
            let rect = Rect::new(left, top, right, top + metrics.ascent + metrics.descent);
            self.push(rect, run.line);
            self.last_line = run.line;

            // Remaining units of the same cluster (surrogate pair tails,
            // combining marks) become zero-width carets at its right edge.
            while self.index < self.units.len() {
                let mapped = self.map[self.index];
                let in_cluster = mapped < cluster_end
                    || (mapped == cluster_end && is_low_surrogate(self.units[self.index]));
                if !in_cluster {
                    break;
                }
                let mut tail = rect;
                tail.x0 = tail.x1;
                self.push(tail, run.line);
            }
        }
    }

    /// Builds a rectangle for a character the shaper reported no glyph for.
    fn synthesize(&mut self) {
        let unit = self.units[self.index];
        if unit == NEWLINE && self.last_line + 1 < self.metrics.len() {
            self.last_line += 1;
        }
        let metrics = &self.metrics[self.last_line.min(self.metrics.len().saturating_sub(1))];
        let top = metrics.baseline - metrics.ascent;
        let mut rect = Rect::new(0.0, top, 0.0, metrics.baseline + metrics.descent);
        if unit != NEWLINE {
            let width = match unit {
                SPACE => self.space_width,
                TAB => self.tab_width,
                // Anything else without ink gets a zero-width caret.
                _ => 0.0,
            };
            if let Some(previous) = self.character_bounds.last() {
                if previous.y1 > rect.y0 {
                    rect.x0 = previous.x1;
                }
            }
            rect.x1 = rect.x0 + width;
        }
        self.push(rect, self.last_line);
    }

    fn clamp_height(&self, rect: &mut Rect) {
        if self.line_height > 0.0 && rect.height() > self.line_height {
            let extra = (rect.height() - self.line_height) / 2.0;
            rect.y0 += extra;
            rect.y1 = rect.y0 + self.line_height;
        }
    }

    fn push(&mut self, mut rect: Rect, line: usize) {
        self.clamp_height(&mut rect);

        // Close any horizontal gap to the previous character on the same
        // line, so hit testing never falls between rectangles.
        if let Some(previous) = self.character_bounds.last().copied() {
            if previous.y1 > rect.y0 && previous.x1 < rect.x0 {
                if let Some(last) = self.character_bounds.last_mut() {
                    last.x1 = rect.x0;
                }
                if let Some(last) = self.hit_test_bounds.last_mut() {
                    last.x1 = rect.x0;
                }
            }
        }

        let unit = self.units[self.index];
        if unit == NEWLINE {
            // The shaper reports the newline at the start of the following
            // line; the caret table wants it at the end of the line it
            // terminates. The hit table keeps the next-line rectangle so
            // vertical scans stay ordered.
            let metrics = &self.metrics[line.saturating_sub(1).min(self.metrics.len() - 1)];
            let top = metrics.baseline - metrics.ascent;
            let mut newline = Rect::new(0.0, top, 0.0, metrics.baseline + metrics.descent);
            if let Some(previous) = self.character_bounds.last() {
                if previous.y1 > newline.y0 {
                    newline.x0 = previous.x1;
                    newline.x1 = previous.x1;
                }
            }
            self.clamp_height(&mut newline);
            self.character_bounds.push(newline);
        } else {
            self.character_bounds.push(rect);
        }

        // One extra zero-width slot after the final character, for the
        // end-of-text caret.
        if self.index + 1 == self.units.len() {
            let mut caret = rect;
            caret.x0 = caret.x1;
            self.character_bounds.push(caret);
        }

        // Hit rectangles stretch halfway into the inter-line gaps so every
        // vertical position inside the paragraph hits some line.
        let mut hit = rect;
        if line > 0 && line < self.metrics.len() {
            let above = &self.metrics[line - 1];
            let current = &self.metrics[line];
            let midpoint =
                ((above.baseline + above.descent) + (current.baseline - current.ascent)) / 2.0;
            hit.y0 = hit.y0.min(midpoint);
        }
        if line + 1 < self.metrics.len() {
            let current = &self.metrics[line];
            let below = &self.metrics[line + 1];
            let midpoint =
                ((current.baseline + current.descent) + (below.baseline - below.ascent)) / 2.0;
            hit.y1 = hit.y1.max(midpoint);
        }
        self.hit_test_bounds.push(hit);

        self.index += 1;
    }
}

// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

/// Whether a block lays out as a single line or wraps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineMode {
    /// Never wrap; the paragraph is limited to one line.
    Single,
    /// Wrap to the bounding width where the configuration calls for it.
    #[default]
    Multi,
}

/// Horizontal placement of the text within its bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignH {
    #[default]
    Left,
    Center,
    Right,
}

/// Vertical placement of the text within its bounding box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlignV {
    #[default]
    Top,
    Center,
    Bottom,
}

/// Combined horizontal and vertical alignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Alignment {
    pub horizontal: AlignH,
    pub vertical: AlignV,
}

impl Alignment {
    pub fn new(horizontal: AlignH, vertical: AlignV) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }
}

/// Per-construction layout options.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextOptions {
    /// Placement of the text within the bounding box.
    pub alignment: Alignment,
    /// Break lines at word boundaries when wrapping.
    pub word_break: bool,
}

/// Tunable policy knobs shared by every construction of a block.
///
/// The defaults match common platform text controls; embedders with different
/// conventions override the relevant fields once, when the block is created.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockOptions {
    /// Width of a tab stop, in multiples of the space advance.
    pub tab_size: usize,
    /// Padding between the text and the bounding box, on each side.
    pub inset: f64,
    /// Font size multiplier applied by superscript.
    pub superscript_size_factor: f32,
    /// Baseline raise applied by superscript, as a fraction of the font size.
    pub superscript_baseline_factor: f32,
    /// Font size multiplier applied by subscript.
    pub subscript_size_factor: f32,
    /// Baseline drop applied by subscript, as a fraction of the font size.
    pub subscript_baseline_factor: f32,
    /// Vertical slack when deciding whether two rectangles share a line.
    pub line_tolerance: f64,
}

impl Default for BlockOptions {
    fn default() -> Self {
        Self {
            tab_size: 4,
            inset: 2.0,
            superscript_size_factor: 0.62,
            superscript_baseline_factor: 0.38,
            subscript_size_factor: 0.62,
            subscript_baseline_factor: 0.16,
            line_tolerance: 1.0,
        }
    }
}

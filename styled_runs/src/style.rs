// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::Color;

use crate::{FontFlags, FontSlant, FontWeight};

/// Properties that define a style.
///
/// This is a plain value bag; a [`RunList`](crate::RunList) breakpoint carries
/// one of these for the run it opens. Color fields are optional so that a run
/// can defer to whatever default color the owning layout draws with.
#[derive(Clone, PartialEq, Debug)]
pub struct TextStyle {
    /// Font weight.
    pub weight: FontWeight,
    /// Font slant.
    pub slant: FontSlant,
    /// Font size in layout units per em.
    pub font_size: f32,
    /// Extra spacing between letters.
    pub letter_spacing: f32,
    /// Line height multiplier, or `None` for the font's natural line height.
    pub line_height: Option<f32>,
    /// Vertical shift of the baseline; positive values raise the text.
    pub baseline_shift: f32,
    /// Text color, or `None` to inherit the layout's default draw color.
    pub color: Option<Color>,
    /// Background fill behind the run, if any.
    pub background: Option<Color>,
    /// Underline decoration.
    pub underline: bool,
    /// Strikethrough decoration.
    pub strikethrough: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            weight: FontWeight::NORMAL,
            slant: FontSlant::Normal,
            font_size: 16.0,
            letter_spacing: 0.0,
            line_height: None,
            baseline_shift: 0.0,
            color: None,
            background: None,
            underline: false,
            strikethrough: false,
        }
    }
}

impl TextStyle {
    /// Returns the togglable attributes of this style as a mask.
    pub fn flags(&self) -> FontFlags {
        let mut flags = FontFlags::NONE;
        if self.weight.is_bold() {
            flags = flags | FontFlags::BOLD;
        }
        if self.slant == FontSlant::Italic {
            flags = flags | FontFlags::ITALIC;
        }
        if self.underline {
            flags = flags | FontFlags::UNDERLINE;
        }
        if self.strikethrough {
            flags = flags | FontFlags::STRIKETHROUGH;
        }
        flags
    }

    /// Sets or clears every attribute named by `mask`.
    ///
    /// Setting [`FontFlags::BOLD`] promotes the weight to [`FontWeight::BOLD`]
    /// and clearing it restores [`FontWeight::NORMAL`]; intermediate weights
    /// assigned directly are overwritten by such an edit.
    pub fn set_flags(&mut self, mask: FontFlags, enabled: bool) {
        if mask.contains(FontFlags::BOLD) {
            self.weight = if enabled {
                FontWeight::BOLD
            } else {
                FontWeight::NORMAL
            };
        }
        if mask.contains(FontFlags::ITALIC) {
            self.slant = if enabled {
                FontSlant::Italic
            } else {
                FontSlant::Normal
            };
        }
        if mask.contains(FontFlags::UNDERLINE) {
            self.underline = enabled;
        }
        if mask.contains(FontFlags::STRIKETHROUGH) {
            self.strikethrough = enabled;
        }
    }
}

// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rich text block layout, hit testing and caret geometry.
//!
//! A [`TextBlock`] pairs a text with range-scoped styling and a bounding box,
//! delegates shaping to a [`ShapeEngine`] and answers geometry questions
//! about the result: bounds, per-character caret rectangles, hit tests, line
//! and word ranges. Layout is invalidated lazily; edits are cheap and the
//! next query rebuilds only the caches it needs.
//!
//! All indices in the public API are UTF-16 code units, which is what most
//! embedding text systems address text in. Internally each tab is expanded to
//! a space plus an object replacement character before shaping, so the block
//! also maintains the offset mapping between the two forms; see
//! [`TextBlock::position_table`].

// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod block;
mod engine;
mod error;
mod font_cache;
mod options;
mod position;

#[cfg(test)]
mod testing;
#[cfg(test)]
mod tests;

pub use styled_runs;

pub use crate::block::{HitTest, TextBlock};
pub use crate::engine::{GlyphRun, LineMetrics, ShapeEngine, ShapeRequest};
pub use crate::error::Error;
pub use crate::font_cache::{CacheKey, FontCache};
pub use crate::options::{AlignH, AlignV, Alignment, BlockOptions, LineMode, TextOptions};

// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ordered, non-overlapping style runs over a text buffer.
//!
//! This crate provides the style data model for rich-text layout: a value-type
//! style bag ([`TextStyle`]) and a breakpoint list ([`RunList`]) that supports
//! range-scoped style mutation with automatic split and merge. Offsets are
//! plain byte offsets into whatever text the caller associates with the list;
//! the crate performs no index translation of its own.

// These lints shouldn't apply to examples or tests.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
// These lints shouldn't apply to examples.
#![warn(clippy::print_stdout, clippy::print_stderr)]

mod font;
mod runs;
mod style;

pub use crate::font::{FontFlags, FontSlant, FontWeight};
pub use crate::runs::{RunList, Segments, StyleRun};
pub use crate::style::TextStyle;

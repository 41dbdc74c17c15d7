// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::fmt;

/// Errors that can be produced by [`TextBlock`](crate::TextBlock) queries.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The layout is not available.
    ///
    /// Either the requested font family could not be resolved, or paragraph
    /// construction failed. Every geometry query reports this until the block
    /// is reconstructed with a resolvable configuration.
    Unavailable,
    /// An index was outside the text, for a query that does not clamp.
    IndexOutOfBounds {
        /// The offending index, in UTF-16 code units.
        index: usize,
        /// The length of the text, in UTF-16 code units.
        len: usize,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => {
                write!(f, "layout unavailable; font resolution or shaping failed")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for text of {len} code units")
            }
        }
    }
}

impl core::error::Error for Error {}

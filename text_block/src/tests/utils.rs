// Copyright 2026 the Textblock Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Point, Rect, Size};
use styled_runs::TextStyle;

use crate::testing::FixedMetricsEngine;
use crate::{LineMode, TextBlock, TextOptions};

/// The family the default test engine resolves.
pub(crate) const FAMILY: &str = "TestSans";

/// A roomy default box that never forces a wrap.
pub(crate) const BOX: Size = Size::new(100.0, 50.0);

pub(crate) fn style(size: f32) -> TextStyle {
    TextStyle {
        font_size: size,
        ..Default::default()
    }
}

/// A block over `text` at font size 10, so advances are 6, ascents 8 and
/// descents 2.
pub(crate) fn block(text: &str) -> TextBlock<FixedMetricsEngine> {
    block_with(text, BOX, LineMode::Multi, TextOptions::default())
}

pub(crate) fn block_with(
    text: &str,
    size: Size,
    line_mode: LineMode,
    options: TextOptions,
) -> TextBlock<FixedMetricsEngine> {
    let mut block = TextBlock::new(FixedMetricsEngine::new());
    block
        .construct(text, size, FAMILY, style(10.0), line_mode, options)
        .expect("construct should resolve the test family");
    block
}

pub(crate) fn assert_near(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(crate) fn assert_point_near(actual: Point, expected: Point) {
    assert!(
        (actual.x - expected.x).abs() < 1e-9 && (actual.y - expected.y).abs() < 1e-9,
        "expected {expected:?}, got {actual:?}"
    );
}

pub(crate) fn assert_rect_near(actual: Rect, expected: Rect) {
    let close = (actual.x0 - expected.x0).abs() < 1e-9
        && (actual.y0 - expected.y0).abs() < 1e-9
        && (actual.x1 - expected.x1).abs() < 1e-9
        && (actual.y1 - expected.y1).abs() < 1e-9;
    assert!(close, "expected {expected:?}, got {actual:?}");
}

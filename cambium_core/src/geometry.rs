// Copyright 2026 the Cambium Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Coordinate-frame conversion helpers.
//!
//! Elements convert points and rectangles between their local frame and
//! their parent's frame via their local transform (see
//! [`Model::local_to_parent_point`](crate::model::Model::local_to_parent_point)
//! and friends). This module holds the shape-level helpers those conversions
//! share.

use kurbo::{Point, Rect, Size};

/// Converts a bare point into a degenerate rectangle with zero size.
///
/// Rectangle-frame conversions accept only rectangles; callers holding a
/// point lift it with this before converting, and get a zero-area rectangle
/// positioned at the point back out.
#[must_use]
pub fn point_rect(point: Point) -> Rect {
    Rect::from_origin_size(point, Size::ZERO)
}

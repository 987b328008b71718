// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Placement calculator: pure tooltip positioning relative to an anchor.
//!
//! ## Overview
//!
//! Given the anchor's viewport rectangle (or none, for [`Placement::Center`]),
//! the requested side, and the viewport size, compute the tooltip's top-left
//! corner. The tooltip footprint is fixed by [`PlacementConfig`]; its height is
//! an approximation since the real card height depends on its text.
//!
//! ## Per-side rules
//!
//! - `Right`: vertically centered on the anchor, `gap` past its right edge.
//! - `Left`: vertically centered on the anchor, `gap` before its left edge.
//! - `Bottom`: horizontally centered on the anchor, `gap` below it.
//! - `Top`: horizontally centered on the anchor, tooltip height plus `gap` above it.
//! - `Center`: centered in the viewport.
//!
//! The horizontal coordinate is always clamped into
//! `[margin, viewport_width - tooltip_width - margin]`. Vertical clamping is
//! opt-in through [`PlacementConfig::clamp_vertical`].
//!
//! ```
//! use kurbo::{Rect, Size};
//! use understory_tour::placement::{tooltip_origin, PlacementConfig};
//! use understory_tour::types::Placement;
//!
//! let anchor = Rect::from_origin_size((100.0, 100.0), (50.0, 50.0));
//! let cfg = PlacementConfig::default();
//! let p = tooltip_origin(Some(anchor), Placement::Right, Size::new(1000.0, 800.0), &cfg);
//! assert_eq!((p.x, p.y), (170.0, 75.0));
//! ```

use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

use crate::types::Placement;

/// Tooltip footprint and spacing constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementConfig {
    /// Tooltip width.
    pub tooltip_width: f64,
    /// Approximate tooltip height.
    pub tooltip_height: f64,
    /// Distance between anchor and tooltip.
    pub gap: f64,
    /// Minimum distance between the tooltip and the viewport edges.
    pub margin: f64,
    /// Extra space around the anchor in the highlight ring.
    pub highlight_padding: f64,
    /// Also clamp the tooltip into the viewport vertically.
    pub clamp_vertical: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            tooltip_width: 320.0,
            tooltip_height: 100.0,
            gap: 20.0,
            margin: 10.0,
            highlight_padding: 4.0,
            clamp_vertical: false,
        }
    }
}

impl PlacementConfig {
    /// Tooltip footprint.
    pub fn footprint(&self) -> Size {
        Size::new(self.tooltip_width, self.tooltip_height)
    }
}

/// Tooltip edge that carries the arrow pointing back at the anchor.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Edge {
    /// Top edge.
    Top,
    /// Bottom edge.
    Bottom,
    /// Left edge.
    Left,
    /// Right edge.
    Right,
}

/// Everything a host needs to draw the overlay for one step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct OverlayLayout {
    /// Highlight ring around the anchor; `None` for centered steps.
    pub highlight: Option<Rect>,
    /// Tooltip bounds in viewport coordinates.
    pub tooltip: Rect,
    /// Edge of the tooltip carrying the arrow; `None` for centered steps.
    pub arrow: Option<Edge>,
}

/// Compute the tooltip's top-left corner.
///
/// A missing anchor is treated as [`Placement::Center`].
pub fn tooltip_origin(
    anchor: Option<Rect>,
    side: Placement,
    viewport: Size,
    config: &PlacementConfig,
) -> Point {
    let w = config.tooltip_width;
    let h = config.tooltip_height;
    let gap = config.gap;

    let (mut x, mut y) = match (anchor, side) {
        (Some(a), Placement::Right) => (a.x1 + gap, a.y0 + a.height() / 2.0 - h / 2.0),
        (Some(a), Placement::Left) => (a.x0 - w - gap, a.y0 + a.height() / 2.0 - h / 2.0),
        (Some(a), Placement::Bottom) => (a.x0 + a.width() / 2.0 - w / 2.0, a.y1 + gap),
        (Some(a), Placement::Top) => (a.x0 + a.width() / 2.0 - w / 2.0, a.y0 - h - gap),
        (None, _) | (_, Placement::Center) => {
            (viewport.width / 2.0 - w / 2.0, viewport.height / 2.0 - h / 2.0)
        }
    };

    x = clamp_axis(x, w, viewport.width, config.margin);
    if config.clamp_vertical {
        y = clamp_axis(y, h, viewport.height, config.margin);
    }
    Point::new(x, y)
}

/// Clamp a coordinate so `[v, v + extent]` stays `margin` inside `[0, limit]`.
///
/// When the viewport is too small for both bounds, the leading edge wins so the
/// start of the tooltip stays readable.
fn clamp_axis(v: f64, extent: f64, limit: f64, margin: f64) -> f64 {
    v.min(limit - extent - margin).max(margin)
}

/// The highlight ring drawn around an anchor.
pub fn highlight_rect(anchor: Rect, config: &PlacementConfig) -> Rect {
    anchor.inflate(config.highlight_padding, config.highlight_padding)
}

/// Tooltip edge that points back at an anchor placed on `side`.
pub fn arrow_edge(side: Placement) -> Option<Edge> {
    match side {
        Placement::Right => Some(Edge::Left),
        Placement::Left => Some(Edge::Right),
        Placement::Bottom => Some(Edge::Top),
        Placement::Top => Some(Edge::Bottom),
        Placement::Center => None,
    }
}

/// Compute highlight, tooltip bounds, and arrow edge together.
pub fn layout(
    anchor: Option<Rect>,
    side: Placement,
    viewport: Size,
    config: &PlacementConfig,
) -> OverlayLayout {
    let side = if anchor.is_some() {
        side
    } else {
        Placement::Center
    };
    let anchor = anchor.filter(|_| side.is_anchored());
    let origin = tooltip_origin(anchor, side, viewport, config);
    OverlayLayout {
        highlight: anchor.map(|a| highlight_rect(a, config)),
        tooltip: Rect::from_origin_size(origin, config.footprint()),
        arrow: arrow_edge(side),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1000.0, 800.0);

    fn anchor() -> Rect {
        Rect::from_origin_size((100.0, 100.0), (50.0, 50.0))
    }

    #[test]
    fn right_places_past_right_edge_and_centers_vertically() {
        let p = tooltip_origin(
            Some(anchor()),
            Placement::Right,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(p, Point::new(170.0, 75.0));
    }

    #[test]
    fn left_overflow_clamps_to_margin() {
        // 100 - 320 - 20 = -240, clamped to 10.
        let p = tooltip_origin(
            Some(anchor()),
            Placement::Left,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(p.x, 10.0);
        assert_eq!(p.y, 75.0);
    }

    #[test]
    fn bottom_centers_horizontally_below() {
        let a = Rect::from_origin_size((400.0, 100.0), (200.0, 40.0));
        let p = tooltip_origin(
            Some(a),
            Placement::Bottom,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(p, Point::new(340.0, 160.0));
    }

    #[test]
    fn top_sits_height_plus_gap_above() {
        let a = Rect::from_origin_size((400.0, 500.0), (200.0, 40.0));
        let p = tooltip_origin(
            Some(a),
            Placement::Top,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(p, Point::new(340.0, 380.0));
    }

    #[test]
    fn center_ignores_anchor() {
        let cfg = PlacementConfig::default();
        let with = tooltip_origin(Some(anchor()), Placement::Center, VIEWPORT, &cfg);
        let without = tooltip_origin(None, Placement::Right, VIEWPORT, &cfg);
        assert_eq!(with, Point::new(340.0, 350.0));
        assert_eq!(with, without);
    }

    #[test]
    fn right_overflow_clamps_to_far_margin() {
        let a = Rect::from_origin_size((900.0, 100.0), (50.0, 50.0));
        let p = tooltip_origin(
            Some(a),
            Placement::Right,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(p.x, 1000.0 - 320.0 - 10.0);
    }

    #[test]
    fn narrow_viewport_prefers_leading_margin() {
        let p = tooltip_origin(
            Some(anchor()),
            Placement::Bottom,
            Size::new(200.0, 800.0),
            &PlacementConfig::default(),
        );
        assert_eq!(p.x, 10.0);
    }

    #[test]
    fn vertical_clamp_is_opt_in() {
        let a = Rect::from_origin_size((400.0, 20.0), (100.0, 30.0));
        let mut cfg = PlacementConfig::default();
        let loose = tooltip_origin(Some(a), Placement::Top, VIEWPORT, &cfg);
        assert_eq!(loose.y, 20.0 - 100.0 - 20.0);

        cfg.clamp_vertical = true;
        let tight = tooltip_origin(Some(a), Placement::Top, VIEWPORT, &cfg);
        assert_eq!(tight.y, 10.0);
    }

    #[test]
    fn layout_pads_highlight_and_picks_arrow() {
        let l = layout(
            Some(anchor()),
            Placement::Right,
            VIEWPORT,
            &PlacementConfig::default(),
        );
        assert_eq!(l.highlight, Some(Rect::new(96.0, 96.0, 154.0, 154.0)));
        assert_eq!(l.tooltip, Rect::new(170.0, 75.0, 490.0, 175.0));
        assert_eq!(l.arrow, Some(Edge::Left));
    }

    #[test]
    fn layout_without_anchor_is_centered_and_arrowless() {
        let l = layout(None, Placement::Top, VIEWPORT, &PlacementConfig::default());
        assert_eq!(l.highlight, None);
        assert_eq!(l.arrow, None);
        assert_eq!(l.tooltip.origin(), Point::new(340.0, 350.0));
    }

    #[test]
    fn arrow_points_back_at_anchor() {
        assert_eq!(arrow_edge(Placement::Left), Some(Edge::Right));
        assert_eq!(arrow_edge(Placement::Top), Some(Edge::Bottom));
        assert_eq!(arrow_edge(Placement::Bottom), Some(Edge::Top));
        assert_eq!(arrow_edge(Placement::Center), None);
    }
}

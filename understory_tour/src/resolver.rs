// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Target resolver: locate the live element a step anchors to.
//!
//! ## Overview
//!
//! A step's anchor may not be mounted when the step becomes current, for
//! example when it lives inside a dialog that is still animating open. So
//! resolution is not a single lookup:
//!
//! 1) [`TargetResolver::begin`] on every step change schedules the first attempt
//!    after the configured resolve delay and drops any previous geometry.
//! 2) [`TargetResolver::poll`] runs due attempts. Each attempt scrolls the target
//!    into view and then captures its bounds, so the geometry reflects the final
//!    scrolled position. Missing targets and empty or non-finite rectangles count
//!    as unresolved and are retried until the attempt budget runs out.
//! 3) Once the budget is spent the step is left awaiting its target and nothing
//!    renders. [`TargetResolver::resize`] restarts resolution immediately.
//!
//! Centered steps need no anchor and resolve to [`Anchor::Viewport`] at once.
//!
//! The toolkit-specific lookup lives behind [`TargetLookup`]. [`SceneLookup`] is
//! an in-memory implementation for hosts that already know their layout.

use core::time::Duration;
use std::collections::HashMap;

use kurbo::{Rect, Size, Vec2};

use crate::config::TourConfig;
use crate::types::Placement;

/// Host capability: find an element by its stable identifier.
pub trait TargetLookup {
    /// Current bounds of `target_id` in viewport coordinates, if mounted.
    fn bounds(&self, target_id: &str) -> Option<Rect>;

    /// Scroll so that `target_id` is visible. The default does nothing.
    fn scroll_into_view(&mut self, target_id: &str) {
        let _ = target_id;
    }
}

/// What a step is anchored to once resolved.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Anchor {
    /// No element; the tooltip is centered in the viewport.
    Viewport,
    /// A live element's bounds in viewport coordinates.
    Element(Rect),
}

impl Anchor {
    /// Element bounds, if anchored to an element.
    pub fn rect(self) -> Option<Rect> {
        match self {
            Self::Viewport => None,
            Self::Element(r) => Some(r),
        }
    }
}

/// Which step and run a resolution belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolveKey {
    /// Session generation.
    pub generation: u32,
    /// Step index.
    pub step: usize,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Pending {
    due: Duration,
    attempts: u32,
}

/// Per-step target resolution with delayed first attempt, retries, and resize handling.
#[derive(Clone, Debug)]
pub struct TargetResolver {
    key: Option<ResolveKey>,
    placement: Placement,
    anchor: Option<Anchor>,
    pending: Option<Pending>,
    delay: Duration,
    retry: Duration,
    max_attempts: u32,
}

impl TargetResolver {
    /// Create an idle resolver with timings from `config`.
    pub fn new(config: &TourConfig) -> Self {
        Self {
            key: None,
            placement: Placement::Center,
            anchor: None,
            pending: None,
            delay: config.resolve_delay(),
            retry: config.retry_interval(),
            max_attempts: config.max_resolve_attempts.max(1),
        }
    }

    /// Start resolving a newly shown step.
    pub fn begin(&mut self, key: ResolveKey, placement: Placement, now: Duration) {
        self.key = Some(key);
        self.placement = placement;
        if placement.is_anchored() {
            self.anchor = None;
            self.pending = Some(Pending {
                due: now + self.delay,
                attempts: 0,
            });
        } else {
            self.anchor = Some(Anchor::Viewport);
            self.pending = None;
        }
    }

    /// The viewport changed; re-resolve at the next poll.
    ///
    /// The previous geometry stays visible until the new attempt lands.
    pub fn resize(&mut self, now: Duration) {
        if self.key.is_some() && self.placement.is_anchored() {
            self.pending = Some(Pending {
                due: now,
                attempts: 0,
            });
        }
    }

    /// Forget the current step.
    pub fn clear(&mut self) {
        self.key = None;
        self.anchor = None;
        self.pending = None;
    }

    /// Run the attempt for `key` if it is due.
    ///
    /// Calls for a key other than the one last passed to [`begin`](Self::begin)
    /// are ignored.
    pub fn poll(
        &mut self,
        now: Duration,
        key: ResolveKey,
        target_id: &str,
        lookup: &mut impl TargetLookup,
    ) -> Option<Anchor> {
        if self.key != Some(key) {
            return None;
        }
        let Some(pending) = self.pending else {
            return self.anchor;
        };
        if now < pending.due {
            return self.anchor;
        }

        lookup.scroll_into_view(target_id);
        match lookup.bounds(target_id).filter(is_usable) {
            Some(rect) => {
                tracing::trace!(target_id, ?rect, "tour target resolved");
                self.anchor = Some(Anchor::Element(rect));
                self.pending = None;
            }
            None => {
                let attempts = pending.attempts + 1;
                if attempts >= self.max_attempts {
                    tracing::debug!(target_id, attempts, "tour target not found; awaiting target");
                    self.anchor = None;
                    self.pending = None;
                } else {
                    self.pending = Some(Pending {
                        due: now + self.retry,
                        attempts,
                    });
                }
            }
        }
        self.anchor
    }

    /// Resolved anchor for the current step.
    pub fn anchor(&self) -> Option<Anchor> {
        self.anchor
    }

    /// Whether a step is current but has no anchor yet.
    pub fn is_awaiting(&self) -> bool {
        self.key.is_some() && self.anchor.is_none()
    }

    /// When the next attempt is due, if one is scheduled.
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.map(|p| p.due)
    }
}

fn is_usable(rect: &Rect) -> bool {
    rect.is_finite() && rect.width() > 0.0 && rect.height() > 0.0
}

/// In-memory [`TargetLookup`] over document-space rectangles and a vertical scroll offset.
///
/// Scrolling into view centers the target vertically, like a browser's
/// `block: center`, without scrolling above the top of the document.
#[derive(Clone, Debug, Default)]
pub struct SceneLookup {
    targets: HashMap<String, Rect>,
    viewport: Size,
    scroll: Vec2,
}

impl SceneLookup {
    /// Create an empty scene for a viewport of `viewport` size.
    pub fn new(viewport: Size) -> Self {
        Self {
            targets: HashMap::new(),
            viewport,
            scroll: Vec2::ZERO,
        }
    }

    /// Mount or move a target, in document coordinates.
    pub fn insert(&mut self, target_id: impl Into<String>, rect: Rect) {
        self.targets.insert(target_id.into(), rect);
    }

    /// Unmount a target.
    pub fn remove(&mut self, target_id: &str) -> Option<Rect> {
        self.targets.remove(target_id)
    }

    /// Change the viewport size.
    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    /// Current scroll offset.
    pub fn scroll_offset(&self) -> Vec2 {
        self.scroll
    }
}

impl TargetLookup for SceneLookup {
    fn bounds(&self, target_id: &str) -> Option<Rect> {
        self.targets.get(target_id).map(|r| *r - self.scroll)
    }

    fn scroll_into_view(&mut self, target_id: &str) {
        if let Some(r) = self.targets.get(target_id) {
            let y = (r.center().y - self.viewport.height / 2.0).max(0.0);
            self.scroll = Vec2::new(self.scroll.x, y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);
    const KEY: ResolveKey = ResolveKey {
        generation: 0,
        step: 0,
    };

    fn resolver() -> TargetResolver {
        TargetResolver::new(&TourConfig::default())
    }

    fn scene() -> SceneLookup {
        SceneLookup::new(Size::new(1000.0, 800.0))
    }

    #[test]
    fn first_attempt_waits_for_resolve_delay() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("card", Rect::new(10.0, 10.0, 60.0, 60.0));
        r.begin(KEY, Placement::Right, Duration::ZERO);
        assert_eq!(r.poll(499 * MS, KEY, "card", &mut s), None);
        assert!(r.is_awaiting());
        let a = r.poll(500 * MS, KEY, "card", &mut s);
        assert_eq!(a, Some(Anchor::Element(Rect::new(10.0, 10.0, 60.0, 60.0))));
        assert!(!r.is_awaiting());
        assert_eq!(r.next_due(), None);
    }

    #[test]
    fn late_mount_is_picked_up_by_retry() {
        let mut r = resolver();
        let mut s = scene();
        r.begin(KEY, Placement::Bottom, Duration::ZERO);
        assert_eq!(r.poll(500 * MS, KEY, "dialog-form", &mut s), None);
        assert_eq!(r.next_due(), Some(750 * MS));
        s.insert("dialog-form", Rect::new(0.0, 0.0, 100.0, 100.0));
        assert!(r.poll(750 * MS, KEY, "dialog-form", &mut s).is_some());
    }

    #[test]
    fn gives_up_after_attempt_budget() {
        let cfg = TourConfig {
            max_resolve_attempts: 2,
            ..TourConfig::default()
        };
        let mut r = TargetResolver::new(&cfg);
        let mut s = scene();
        r.begin(KEY, Placement::Top, Duration::ZERO);
        r.poll(500 * MS, KEY, "gone", &mut s);
        r.poll(750 * MS, KEY, "gone", &mut s);
        assert_eq!(r.next_due(), None);
        assert!(r.is_awaiting());
        // Mounting later does not help until something restarts resolution.
        s.insert("gone", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert_eq!(r.poll(10_000 * MS, KEY, "gone", &mut s), None);
        r.resize(10_000 * MS);
        assert!(r.poll(10_000 * MS, KEY, "gone", &mut s).is_some());
    }

    #[test]
    fn zero_area_target_is_unresolved() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("hidden", Rect::new(0.0, 0.0, 0.0, 0.0));
        r.begin(KEY, Placement::Left, Duration::ZERO);
        assert_eq!(r.poll(500 * MS, KEY, "hidden", &mut s), None);
        assert!(r.next_due().is_some());
    }

    #[test]
    fn center_step_needs_no_lookup() {
        let mut r = resolver();
        let mut s = scene();
        r.begin(KEY, Placement::Center, Duration::ZERO);
        assert_eq!(r.anchor(), Some(Anchor::Viewport));
        assert_eq!(
            r.poll(Duration::ZERO, KEY, "nothing", &mut s),
            Some(Anchor::Viewport)
        );
    }

    #[test]
    fn stale_key_is_ignored() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        r.begin(KEY, Placement::Right, Duration::ZERO);
        let other = ResolveKey {
            generation: 0,
            step: 1,
        };
        assert_eq!(r.poll(500 * MS, other, "a", &mut s), None);
        assert!(r.is_awaiting());
    }

    #[test]
    fn step_change_drops_previous_geometry() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        r.begin(KEY, Placement::Right, Duration::ZERO);
        r.poll(500 * MS, KEY, "a", &mut s);
        let next = ResolveKey {
            generation: 0,
            step: 1,
        };
        r.begin(next, Placement::Right, 600 * MS);
        assert_eq!(r.anchor(), None);
    }

    #[test]
    fn resize_keeps_old_geometry_until_reresolved() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        r.begin(KEY, Placement::Right, Duration::ZERO);
        r.poll(500 * MS, KEY, "a", &mut s);
        s.insert("a", Rect::new(20.0, 0.0, 30.0, 10.0));
        r.resize(900 * MS);
        assert_eq!(
            r.anchor(),
            Some(Anchor::Element(Rect::new(0.0, 0.0, 10.0, 10.0)))
        );
        assert_eq!(
            r.poll(900 * MS, KEY, "a", &mut s),
            Some(Anchor::Element(Rect::new(20.0, 0.0, 30.0, 10.0)))
        );
    }

    #[test]
    fn geometry_is_captured_after_scrolling() {
        let mut r = resolver();
        let mut s = scene();
        s.insert("deep", Rect::new(0.0, 2000.0, 100.0, 2100.0));
        r.begin(KEY, Placement::Top, Duration::ZERO);
        let a = r.poll(500 * MS, KEY, "deep", &mut s).and_then(Anchor::rect);
        // Centered: 2050 - 400 = 1650 scroll.
        assert_eq!(s.scroll_offset(), Vec2::new(0.0, 1650.0));
        assert_eq!(a, Some(Rect::new(0.0, 350.0, 100.0, 450.0)));
    }

    #[test]
    fn clear_returns_to_idle() {
        let mut r = resolver();
        r.begin(KEY, Placement::Right, Duration::ZERO);
        r.clear();
        assert!(!r.is_awaiting());
        assert_eq!(r.next_due(), None);
    }
}

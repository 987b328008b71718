// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host signal bridge: the [`Tour`] coordinator a host application drives.
//!
//! ## Overview
//!
//! [`Tour`] owns the catalog, the session, the completion store, the target
//! resolver, the queue of delayed advances, and the set of screens the host
//! reported as active. The host:
//!
//! - issues commands: [`start`](Tour::start), [`next`](Tour::next),
//!   [`skip`](Tour::skip), [`restart`](Tour::restart);
//! - reports what happened elsewhere in the app:
//!   [`report_screen`](Tour::report_screen), [`clear_screen`](Tour::clear_screen)
//!   and [`report_signal`](Tour::report_signal);
//! - pumps time and layout: [`poll`](Tour::poll) each frame or timer tick with a
//!   monotonic clock, and [`resize`](Tour::resize) when the viewport changes;
//! - renders [`frame`](Tour::frame) when it returns `Some`.
//!
//! The bridge owns no timers and never blocks. Commands that can show a step
//! or schedule an advance take the host's current timestamp, so delays run
//! from the moment of the event rather than from the last poll.
//! [`next_wakeup`](Tour::next_wakeup) tells the host when polling is next useful.
//!
//! ## Screens
//!
//! Screen gates are level-triggered. A screen stays active from
//! [`report_screen`](Tour::report_screen) until [`clear_screen`](Tour::clear_screen)
//! or a restart resets the host. Whenever a step gated on an active screen
//! becomes current, it advances at once.
//!
//! No command fails. Invalid or stale input is ignored and reported through
//! [`Outcome`]; storage failures are logged and the tour carries on unpersisted.
//!
//! ## Example
//!
//! ```
//! use core::time::Duration;
//! use kurbo::{Rect, Size};
//! use understory_tour::bridge::Tour;
//! use understory_tour::catalog::Catalog;
//! use understory_tour::config::TourConfig;
//! use understory_tour::resolver::SceneLookup;
//! use understory_tour::store::MemoryStore;
//! use understory_tour::types::{Placement, Step, Trigger};
//!
//! let catalog = Catalog::new(vec![
//!     Step::new("welcome", "start-card")
//!         .with_placement(Placement::Right)
//!         .gated_by(Trigger::screen("patient-modal")),
//!     Step::new("form", "patient-form").with_placement(Placement::Right),
//! ])
//! .unwrap();
//!
//! let mut scene = SceneLookup::new(Size::new(1000.0, 800.0));
//! scene.insert("start-card", Rect::new(100.0, 100.0, 150.0, 150.0));
//!
//! let mut tour = Tour::new(catalog, MemoryStore::default(), TourConfig::default())
//!     .with_viewport(Size::new(1000.0, 800.0));
//! tour.start(Duration::ZERO);
//!
//! // The target is looked up after the resolve delay.
//! tour.poll(Duration::from_millis(500), &mut scene);
//! let frame = tour.frame().unwrap();
//! assert_eq!(frame.index, 0);
//! assert!(!frame.show_next);
//!
//! // The host opens its dialog and reports it.
//! tour.report_screen("patient-modal", Duration::from_millis(900));
//! assert_eq!(tour.current_step_index(), Some(1));
//! ```

use core::time::Duration;
use std::collections::HashSet;

use kurbo::Size;

use crate::catalog::Catalog;
use crate::config::TourConfig;
use crate::machine::{
    AdvanceTicket, Effect, Event, Finish, Ignored, Outcome, Session, transition,
};
use crate::placement::{self, OverlayLayout};
use crate::resolver::{ResolveKey, TargetLookup, TargetResolver};
use crate::store::CompletionStore;
use crate::types::{HostReset, Step, Trigger};

/// Host-side state the tour can ask to reset.
pub trait HostControl {
    /// Reset the given parts of the host before the tour restarts at step 0.
    fn reset(&mut self, what: HostReset);
}

impl<F: FnMut(HostReset)> HostControl for F {
    fn reset(&mut self, what: HostReset) {
        self(what);
    }
}

/// Render data for the current step.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Frame<'a> {
    /// The step shown.
    pub step: &'a Step,
    /// Its index.
    pub index: usize,
    /// Number of steps in the tour.
    pub count: usize,
    /// Highlight, tooltip bounds, and arrow edge.
    pub layout: OverlayLayout,
    /// Whether to offer the manual "Next" control; false on action-gated steps.
    pub show_next: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Scheduled {
    due: Duration,
    ticket: AdvanceTicket,
}

/// The tour engine as seen by the host.
#[derive(Debug)]
pub struct Tour<S: CompletionStore> {
    catalog: Catalog,
    session: Session,
    store: S,
    resolver: TargetResolver,
    scheduled: Vec<Scheduled>,
    screens: HashSet<String>,
    config: TourConfig,
    viewport: Size,
    now: Duration,
}

impl<S: CompletionStore> Tour<S> {
    /// Build a tour, reading the completion flag from `store` once.
    ///
    /// An unreadable store counts as "not completed".
    pub fn new(catalog: Catalog, store: S, config: TourConfig) -> Self {
        let completed = match store.load() {
            Ok(completed) => completed,
            Err(e) => {
                tracing::warn!(error = %e, "tour completion flag unreadable; assuming not completed");
                false
            }
        };
        tracing::debug!(steps = catalog.len(), completed, "tour initialized");
        Self {
            resolver: TargetResolver::new(&config),
            catalog,
            session: Session::new(completed),
            store,
            scheduled: Vec::new(),
            screens: HashSet::new(),
            config,
            viewport: Size::ZERO,
            now: Duration::ZERO,
        }
    }

    /// Build a tour and [`start`](Self::start) it at `now`.
    pub fn auto_start(catalog: Catalog, store: S, config: TourConfig, now: Duration) -> Self {
        let mut tour = Self::new(catalog, store, config);
        tour.start(now);
        tour
    }

    /// Set the initial viewport size.
    #[must_use]
    pub fn with_viewport(mut self, viewport: Size) -> Self {
        self.viewport = viewport;
        self
    }

    /// Start the tour unless it was completed or skipped before.
    pub fn start(&mut self, now: Duration) -> Outcome {
        self.catch_up(now);
        self.apply(Event::Start, None)
    }

    /// Advance past a step that does not require an action.
    pub fn next(&mut self, now: Duration) -> Outcome {
        self.catch_up(now);
        self.apply(Event::Next, None)
    }

    /// End the tour and record it as seen.
    pub fn skip(&mut self) -> Outcome {
        self.apply(Event::Skip, None)
    }

    /// Start over from step 0 regardless of the completion flag.
    ///
    /// `host` is asked to return to its first screen and close dialogs before
    /// step 0 is entered, so every anchor is reachable again. Screens reported
    /// as active are forgotten, and any advance still pending from the previous
    /// run is dropped.
    pub fn restart(&mut self, host: &mut impl HostControl, now: Duration) -> Outcome {
        self.catch_up(now);
        let host: &mut dyn HostControl = host;
        self.apply(Event::Restart, Some(host))
    }

    /// A screen or dialog became active and stays so until [`clear_screen`](Self::clear_screen).
    ///
    /// Advances the current step if it is gated on `name`; a step gated on it
    /// later advances as soon as it becomes current.
    pub fn report_screen(&mut self, name: &str, now: Duration) -> Outcome {
        self.catch_up(now);
        self.screens.insert(name.to_owned());
        self.apply(Event::Screen(name), None)
    }

    /// A screen or dialog is no longer active.
    pub fn clear_screen(&mut self, name: &str) {
        self.screens.remove(name);
    }

    /// Whether `name` was reported active and not cleared since.
    pub fn is_screen_active(&self, name: &str) -> bool {
        self.screens.contains(name)
    }

    /// A named action completed; `expected_step` is the step it is meant to satisfy.
    ///
    /// A delayed advance is due `delay` after `now`.
    pub fn report_signal(&mut self, name: &str, expected_step: usize, now: Duration) -> Outcome {
        self.catch_up(now);
        self.apply(
            Event::Signal {
                name,
                expected_step,
            },
            None,
        )
    }

    /// Advance the clock to `now`, deliver due advances, and run due target lookups.
    ///
    /// `now` is a monotonic timestamp chosen by the host; going backwards is
    /// treated as no time passing.
    pub fn poll(&mut self, now: Duration, lookup: &mut impl TargetLookup) {
        self.catch_up(now);

        if let Some(step) = self.session.step()
            && let Some(target) = self.catalog.get(step)
        {
            let key = ResolveKey {
                generation: self.session.generation,
                step,
            };
            self.resolver.poll(self.now, key, &target.target_id, lookup);
        }
    }

    /// The viewport changed size; targets are re-resolved at the next poll.
    pub fn resize(&mut self, viewport: Size) {
        self.viewport = viewport;
        self.resolver.resize(self.now);
    }

    /// Whether the overlay should render at all.
    pub fn is_visible(&self) -> bool {
        self.session.is_active()
    }

    /// The step shown, while active.
    pub fn current_step(&self) -> Option<&Step> {
        self.session.step().and_then(|i| self.catalog.get(i))
    }

    /// Index of the step shown, while active.
    pub fn current_step_index(&self) -> Option<usize> {
        self.session.step()
    }

    /// Number of steps.
    pub fn step_count(&self) -> usize {
        self.catalog.len()
    }

    /// Whether the tour was completed or skipped, now or in an earlier run.
    pub fn has_completed(&self) -> bool {
        self.session.completed
    }

    /// Current session state.
    pub fn session(&self) -> Session {
        self.session
    }

    /// The step catalog.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The completion store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Delayed advances that can still apply to the current step.
    pub fn pending_advances(&self) -> usize {
        self.scheduled.len()
    }

    /// Earliest time at which [`poll`](Self::poll) has work to do.
    pub fn next_wakeup(&self) -> Option<Duration> {
        let advance = self.scheduled.iter().map(|s| s.due).min();
        match (advance, self.resolver.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Render data for the current step.
    ///
    /// `None` while inactive or while the step's target has not been resolved.
    pub fn frame(&self) -> Option<Frame<'_>> {
        let index = self.session.step()?;
        let step = self.catalog.get(index)?;
        let anchor = self.resolver.anchor()?;
        Some(Frame {
            step,
            index,
            count: self.catalog.len(),
            layout: placement::layout(
                anchor.rect(),
                step.placement,
                self.viewport,
                &self.config.placement,
            ),
            show_next: !step.action_required,
        })
    }

    /// Move the clock to `now` and deliver every advance due by then.
    fn catch_up(&mut self, now: Duration) {
        self.now = self.now.max(now);
        while let Some(pos) = self.next_due_advance() {
            let Scheduled { ticket, .. } = self.scheduled.remove(pos);
            self.apply(Event::Deliver(ticket), None);
        }
    }

    fn next_due_advance(&self) -> Option<usize> {
        self.scheduled
            .iter()
            .enumerate()
            .filter(|(_, s)| s.due <= self.now)
            .min_by_key(|(_, s)| s.due)
            .map(|(i, _)| i)
    }

    /// The screen the current step waits for, if the host reported it active.
    fn active_gate(&self) -> Option<String> {
        let step = self.current_step()?;
        match &step.trigger {
            Some(Trigger::Screen { name })
                if step.action_required && self.screens.contains(name) =>
            {
                Some(name.clone())
            }
            _ => None,
        }
    }

    /// Apply `event`, then follow any screen gates that are already open.
    fn apply(&mut self, event: Event<'_>, host: Option<&mut dyn HostControl>) -> Outcome {
        let outcome = self.run(event, host);
        while let Some(name) = self.active_gate() {
            tracing::debug!(screen = %name, "tour step gated on an active screen");
            if self.run(Event::Screen(&name), None) != Outcome::Applied {
                break;
            }
        }
        outcome
    }

    fn run(&mut self, event: Event<'_>, mut host: Option<&mut dyn HostControl>) -> Outcome {
        let t = transition(self.session, &self.catalog, event);
        if let Outcome::Ignored(why) = t.outcome {
            log_ignored(&event, why, self.session);
            return t.outcome;
        }

        for effect in t.effects {
            match effect {
                Effect::ResetHost(what) => {
                    if let Some(h) = host.as_deref_mut() {
                        h.reset(what);
                    }
                    self.screens.clear();
                }
                Effect::StepChanged(i) => {
                    let Some(step) = self.catalog.get(i) else {
                        continue;
                    };
                    tracing::debug!(step = i, id = %step.id, target_id = %step.target_id, "tour step shown");
                    let key = ResolveKey {
                        generation: t.session.generation,
                        step: i,
                    };
                    self.resolver.begin(key, step.placement, self.now);
                }
                Effect::ScheduleAdvance { ticket, delay } => {
                    tracing::debug!(step = ticket.step, ?delay, "tour advance scheduled");
                    self.scheduled.push(Scheduled {
                        due: self.now + delay,
                        ticket,
                    });
                }
                Effect::PersistCompleted => {
                    if let Err(e) = self.store.save(true) {
                        tracing::warn!(error = %e, "failed to persist tour completion; continuing without it");
                    }
                }
                Effect::Finished(how) => {
                    self.resolver.clear();
                    match how {
                        Finish::Completed => tracing::info!("tour completed"),
                        Finish::Skipped => tracing::info!("tour skipped"),
                    }
                }
            }
        }
        self.session = t.session;

        // Tickets only apply to the run and step they were scheduled for.
        let live = self.session;
        self.scheduled.retain(|s| {
            s.ticket.generation == live.generation && Some(s.ticket.step) == live.step()
        });
        t.outcome
    }
}

fn log_ignored(event: &Event<'_>, why: Ignored, session: Session) {
    tracing::debug!(?event, ?why, state = ?session.state, "tour event ignored");
}

#[cfg(test)]
mod tests {
    use kurbo::Rect;

    use super::*;
    use crate::machine::TourState;
    use crate::resolver::SceneLookup;
    use crate::store::MemoryStore;
    use crate::types::{Placement, Trigger};

    const MS: Duration = Duration::from_millis(1);
    const T0: Duration = Duration::ZERO;
    const VIEWPORT: Size = Size::new(1000.0, 800.0);

    fn catalog() -> Catalog {
        Catalog::new(vec![
            Step::new("welcome", "start-card")
                .with_placement(Placement::Right)
                .gated_by(Trigger::screen("patient-modal")),
            Step::new("form", "patient-form").with_placement(Placement::Right),
            Step::new("record", "start-recording")
                .with_placement(Placement::Top)
                .gated_by(Trigger::screen("consultation")),
            Step::new("demo", "load-demo")
                .with_placement(Placement::Bottom)
                .gated_by(Trigger::action("demo_loaded", 500 * MS)),
            Step::new("generate", "generate-soap")
                .with_placement(Placement::Bottom)
                .gated_by(Trigger::action("soap_generated", 1000 * MS)),
            Step::new("edit", "assessment-plan").with_placement(Placement::Left),
        ])
        .unwrap()
    }

    fn scene() -> SceneLookup {
        let mut s = SceneLookup::new(VIEWPORT);
        s.insert("start-card", Rect::new(100.0, 100.0, 150.0, 150.0));
        s.insert("patient-form", Rect::new(300.0, 200.0, 700.0, 500.0));
        s.insert("assessment-plan", Rect::new(500.0, 300.0, 900.0, 500.0));
        s
    }

    fn tour(store: MemoryStore) -> Tour<MemoryStore> {
        Tour::new(catalog(), store, TourConfig::default()).with_viewport(VIEWPORT)
    }

    fn tour_at(step: usize) -> Tour<MemoryStore> {
        let mut t = tour(MemoryStore::default());
        t.start(T0);
        t.report_screen("patient-modal", T0);
        t.next(T0);
        t.report_screen("consultation", T0);
        assert_eq!(t.current_step_index(), Some(3));
        let mut s = scene();
        if step >= 4 {
            t.report_signal("demo_loaded", 3, T0);
            t.poll(500 * MS, &mut s);
        }
        if step >= 5 {
            t.report_signal("soap_generated", 4, 500 * MS);
            t.poll(1500 * MS, &mut s);
        }
        assert_eq!(t.current_step_index(), Some(step));
        t
    }

    #[test]
    fn fresh_user_sees_first_step() {
        let mut t = tour(MemoryStore::default());
        assert!(!t.is_visible());
        assert_eq!(t.start(T0), Outcome::Applied);
        assert!(t.is_visible());
        assert_eq!(t.current_step().map(|s| s.id.as_str()), Some("welcome"));
        assert_eq!(t.step_count(), 6);
    }

    #[test]
    fn auto_start_shows_first_step_for_fresh_user_only() {
        let t = Tour::auto_start(catalog(), MemoryStore::default(), TourConfig::default(), T0);
        assert_eq!(t.current_step_index(), Some(0));
        let t = Tour::auto_start(catalog(), MemoryStore::new(true), TourConfig::default(), T0);
        assert!(!t.is_visible());
    }

    #[test]
    fn returning_user_is_not_auto_started() {
        let mut t = tour(MemoryStore::new(true));
        assert_eq!(t.start(T0), Outcome::Ignored(Ignored::AlreadyCompleted));
        assert!(!t.is_visible());
        assert!(t.frame().is_none());
    }

    #[test]
    fn unreadable_store_defaults_to_not_completed() {
        let mut t = tour(MemoryStore::unavailable());
        assert!(!t.has_completed());
        t.start(T0);
        assert!(t.is_visible());
        // Skipping still works without persistence.
        assert_eq!(t.skip(), Outcome::Applied);
        assert!(!t.is_visible());
        assert!(t.has_completed());
    }

    #[test]
    fn frame_waits_for_target_resolution() {
        let mut t = tour(MemoryStore::default());
        let mut s = scene();
        t.start(T0);
        assert!(t.frame().is_none());
        t.poll(499 * MS, &mut s);
        assert!(t.frame().is_none());
        t.poll(500 * MS, &mut s);
        let f = t.frame().unwrap();
        assert_eq!(f.index, 0);
        assert_eq!(f.count, 6);
        assert!(!f.show_next);
        assert_eq!(f.layout.tooltip.origin(), kurbo::Point::new(170.0, 75.0));
    }

    #[test]
    fn resolve_delay_runs_from_the_step_change() {
        let mut t = tour(MemoryStore::default());
        let mut s = scene();
        t.start(T0);
        t.poll(600 * MS, &mut s);
        assert!(t.frame().is_some());
        // Long idle, then the dialog opens.
        t.report_screen("patient-modal", 8000 * MS);
        assert_eq!(t.current_step_index(), Some(1));
        assert_eq!(t.next_wakeup(), Some(8500 * MS));
        t.poll(8001 * MS, &mut s);
        assert!(t.frame().is_none());
        t.poll(8500 * MS, &mut s);
        assert_eq!(t.frame().map(|f| f.index), Some(1));
    }

    #[test]
    fn resolve_delay_after_next_between_polls() {
        let mut t = tour(MemoryStore::default());
        let mut s = scene();
        t.start(T0);
        t.report_screen("patient-modal", 100 * MS);
        t.poll(700 * MS, &mut s);
        assert_eq!(t.frame().map(|f| f.index), Some(1));
        t.next(3000 * MS);
        assert_eq!(t.current_step_index(), Some(2));
        t.poll(3001 * MS, &mut s);
        assert!(t.frame().is_none());
        assert_eq!(t.next_wakeup(), Some(3500 * MS));
    }

    #[test]
    fn missing_target_renders_nothing() {
        let mut t = tour(MemoryStore::default());
        let mut s = SceneLookup::new(VIEWPORT);
        t.start(T0);
        for ms in (500_u32..5000).step_by(250) {
            t.poll(ms * MS, &mut s);
        }
        assert!(t.is_visible());
        assert!(t.frame().is_none());
        assert_eq!(t.next_wakeup(), None);
    }

    #[test]
    fn skip_persists_and_hides() {
        let mut store = MemoryStore::default();
        {
            let mut t = Tour::new(catalog(), &mut store, TourConfig::default());
            t.start(T0);
            t.skip();
            assert!(!t.is_visible());
            assert_eq!(t.current_step_index(), None);
        }
        assert!(store.completed());
        assert_eq!(store.writes(), 1);
    }

    #[test]
    fn finishing_the_last_step_persists() {
        let mut t = tour_at(5);
        assert_eq!(t.next(2000 * MS), Outcome::Applied);
        assert!(!t.is_visible());
        assert!(t.store().completed());
    }

    #[test]
    fn next_on_gated_step_is_ignored() {
        let mut t = tour_at(3);
        assert_eq!(t.next(T0), Outcome::Ignored(Ignored::InvalidTransition));
        assert_eq!(t.current_step_index(), Some(3));
    }

    #[test]
    fn delayed_signal_fires_after_delay() {
        let mut t = tour_at(3);
        let mut s = scene();
        assert_eq!(t.report_signal("demo_loaded", 3, T0), Outcome::Applied);
        assert_eq!(t.current_step_index(), Some(3));
        assert_eq!(t.next_wakeup(), Some(500 * MS));
        t.poll(499 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(3));
        t.poll(500 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(4));
    }

    #[test]
    fn signal_delay_runs_from_the_report() {
        let mut t = tour_at(3);
        let mut s = scene();
        s.insert("load-demo", Rect::new(400.0, 80.0, 520.0, 120.0));
        t.poll(600 * MS, &mut s);
        assert!(t.frame().is_some());
        // The host sat idle for ten seconds before the action finished.
        t.report_signal("demo_loaded", 3, 10_000 * MS);
        assert_eq!(t.next_wakeup(), Some(10_500 * MS));
        t.poll(10_001 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(3));
        t.poll(10_500 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(4));
    }

    #[test]
    fn due_advance_is_delivered_before_a_later_command() {
        let mut t = tour_at(3);
        let mut s = scene();
        t.report_signal("demo_loaded", 3, T0);
        // No poll in between: the advance was due before this report.
        assert_eq!(t.report_signal("soap_generated", 4, 800 * MS), Outcome::Applied);
        assert_eq!(t.current_step_index(), Some(4));
        assert_eq!(t.pending_advances(), 1);
        t.poll(1799 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(4));
        t.poll(1800 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(5));
    }

    #[test]
    fn skip_before_delay_cancels_advance() {
        let mut t = tour_at(3);
        let mut s = scene();
        t.report_signal("demo_loaded", 3, T0);
        assert_eq!(t.pending_advances(), 1);
        t.skip();
        assert_eq!(t.pending_advances(), 0);
        assert_eq!(t.next_wakeup(), None);
        t.poll(10_000 * MS, &mut s);
        assert_eq!(t.session().state, TourState::Inactive);
        assert!(t.has_completed());
        assert!(t.store().completed());
    }

    #[test]
    fn restart_before_delay_cancels_advance() {
        let mut t = tour_at(3);
        let mut s = scene();
        t.report_signal("demo_loaded", 3, T0);
        let mut resets = Vec::new();
        t.restart(&mut |what: HostReset| resets.push(what), 100 * MS);
        assert_eq!(resets, vec![HostReset::NAVIGATE_HOME | HostReset::CLOSE_DIALOGS]);
        assert_eq!(t.pending_advances(), 0);
        t.poll(10_000 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(0));
    }

    #[test]
    fn duplicate_signals_advance_once() {
        let mut t = tour_at(3);
        let mut s = scene();
        t.report_signal("demo_loaded", 3, T0);
        t.report_signal("demo_loaded", 3, 100 * MS);
        assert_eq!(t.pending_advances(), 2);
        t.poll(500 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(4));
        assert_eq!(t.pending_advances(), 0);
        t.poll(2000 * MS, &mut s);
        assert_eq!(t.current_step_index(), Some(4));
    }

    #[test]
    fn stale_signal_is_ignored() {
        let mut t = tour_at(4);
        assert_eq!(
            t.report_signal("demo_loaded", 3, 600 * MS),
            Outcome::Ignored(Ignored::StaleSignal)
        );
        assert_eq!(t.current_step_index(), Some(4));
        assert_eq!(t.pending_advances(), 0);
    }

    #[test]
    fn screen_reported_early_opens_gate_on_arrival() {
        let mut t = Tour::new(
            Catalog::new(vec![
                Step::new("form", "patient-form"),
                Step::new("record", "start-recording").gated_by(Trigger::screen("consultation")),
                Step::new("demo", "load-demo"),
            ])
            .unwrap(),
            MemoryStore::default(),
            TourConfig::default(),
        );
        t.start(T0);
        assert_eq!(
            t.report_screen("consultation", T0),
            Outcome::Ignored(Ignored::UnknownSignal)
        );
        assert!(t.is_screen_active("consultation"));
        assert_eq!(t.next(T0), Outcome::Applied);
        assert_eq!(t.current_step_index(), Some(2));
    }

    #[test]
    fn cleared_screen_no_longer_opens_gate() {
        let mut t = tour(MemoryStore::default());
        t.start(T0);
        t.report_screen("patient-modal", T0);
        t.report_screen("consultation", T0);
        t.clear_screen("consultation");
        t.next(T0);
        assert_eq!(t.current_step_index(), Some(2));
        t.report_screen("consultation", 100 * MS);
        assert_eq!(t.current_step_index(), Some(3));
    }

    #[test]
    fn start_with_screen_already_open_skips_its_gate() {
        let mut t = tour(MemoryStore::default());
        t.report_screen("patient-modal", T0);
        t.start(T0);
        assert_eq!(t.current_step_index(), Some(1));
    }

    #[test]
    fn restart_forgets_active_screens() {
        let mut t = tour_at(3);
        assert!(t.is_screen_active("patient-modal"));
        t.restart(&mut |_: HostReset| {}, T0);
        assert!(!t.is_screen_active("patient-modal"));
        assert!(!t.is_screen_active("consultation"));
        assert_eq!(t.current_step_index(), Some(0));
    }

    #[test]
    fn restart_after_completion_reactivates() {
        let mut t = tour(MemoryStore::new(true));
        let mut reset = HostReset::empty();
        t.restart(&mut |what: HostReset| reset |= what, T0);
        assert!(t.is_visible());
        assert_eq!(t.current_step_index(), Some(0));
        assert_eq!(reset, HostReset::all());
        // The flag is untouched; only automatic start is gated by it.
        assert!(t.has_completed());
        assert_eq!(t.store().writes(), 0);
    }

    #[test]
    fn resize_recomputes_layout() {
        let mut t = tour_at(5);
        let mut s = scene();
        t.poll(2000 * MS, &mut s);
        let before = t.frame().unwrap().layout.tooltip;
        t.resize(Size::new(600.0, 800.0));
        s.set_viewport(Size::new(600.0, 800.0));
        s.insert("assessment-plan", Rect::new(200.0, 300.0, 500.0, 500.0));
        t.poll(2000 * MS, &mut s);
        let after = t.frame().unwrap().layout.tooltip;
        assert_ne!(before, after);
        // 200 - 320 - 20 clamps to the margin.
        assert_eq!(after.x0, 10.0);
    }

    #[test]
    fn commands_while_inactive_are_ignored() {
        let mut t = tour(MemoryStore::default());
        assert_eq!(t.next(T0), Outcome::Ignored(Ignored::Inactive));
        assert_eq!(t.skip(), Outcome::Ignored(Ignored::Inactive));
        assert_eq!(
            t.report_screen("patient-modal", T0),
            Outcome::Ignored(Ignored::Inactive)
        );
        assert_eq!(t.store().writes(), 0);
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tour state machine: pure transitions over a [`Session`].
//!
//! ## Overview
//!
//! [`transition`] takes the current session, the catalog, and an [`Event`], and
//! returns the next session together with the [`Effect`]s the caller must
//! perform (persist the completion flag, schedule a delayed advance, reset the
//! host). It performs no I/O and owns no timers, so every rule is testable
//! without a UI.
//!
//! ## States
//!
//! - `Inactive`: nothing renders.
//! - `Active(i)`: step `i` is shown.
//! - Terminated: transient. Termination sets the completion flag and collapses
//!   to `Inactive` within the same call.
//!
//! ## Monotonic progress
//!
//! An advance moves from `i` to `i + 1`, or terminates from the last step. There is no
//! way back. Invalid commands are no-ops reported as [`Outcome::Ignored`].
//!
//! ## Delayed advances
//!
//! A qualifying [`Trigger::Action`] with a non-zero delay does not advance at once.
//! It yields [`Effect::ScheduleAdvance`] carrying an [`AdvanceTicket`] tagged with
//! the session generation and step. When the delay elapses the caller feeds
//! [`Event::Deliver`] back in; the ticket only applies if the session is still in
//! that generation and on that step. Restart and termination bump the
//! generation, so tickets from an earlier run can never resurrect it.
//!
//! ```
//! use understory_tour::catalog::Catalog;
//! use understory_tour::machine::{transition, Event, Session, TourState};
//! use understory_tour::types::Step;
//!
//! let catalog = Catalog::new(vec![Step::new("a", "x"), Step::new("b", "y")]).unwrap();
//! let s = transition(Session::new(false), &catalog, Event::Start).session;
//! let s = transition(s, &catalog, Event::Next).session;
//! assert_eq!(s.state, TourState::Active(1));
//! let t = transition(s, &catalog, Event::Next);
//! assert_eq!(t.session.state, TourState::Inactive);
//! assert!(t.session.completed);
//! ```

use core::time::Duration;

use crate::catalog::Catalog;
use crate::types::{HostReset, Trigger};

/// Whether the overlay is up and on which step.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum TourState {
    /// The overlay does not render.
    #[default]
    Inactive,
    /// Step `i` is shown.
    Active(usize),
}

/// Mutable tour session state.
///
/// Owned by a single coordinator; [`transition`] consumes a copy and returns the next one.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub struct Session {
    /// Current state.
    pub state: TourState,
    /// Run counter; bumped on restart and termination to invalidate outstanding tickets.
    pub generation: u32,
    /// Completion flag as last loaded or written.
    pub completed: bool,
}

impl Session {
    /// A fresh inactive session with the persisted completion flag.
    pub const fn new(completed: bool) -> Self {
        Self {
            state: TourState::Inactive,
            generation: 0,
            completed,
        }
    }

    /// Current step index while active.
    pub const fn step(&self) -> Option<usize> {
        match self.state {
            TourState::Active(i) => Some(i),
            TourState::Inactive => None,
        }
    }

    /// Whether the overlay should render.
    pub const fn is_active(&self) -> bool {
        matches!(self.state, TourState::Active(_))
    }
}

/// Identity of a scheduled advance.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AdvanceTicket {
    /// Session generation the advance was scheduled in.
    pub generation: u32,
    /// Step the advance was scheduled for.
    pub step: usize,
}

/// Inputs to the state machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Event<'a> {
    /// Start the tour unless it was completed before.
    Start,
    /// Start over from step 0 regardless of the completion flag.
    Restart,
    /// Manual "Next".
    Next,
    /// Leave the tour.
    Skip,
    /// A screen or dialog became active.
    Screen(&'a str),
    /// A named host action completed, expected to satisfy `expected_step`.
    Signal {
        /// Host-chosen action name.
        name: &'a str,
        /// Step index the host believes the action satisfies.
        expected_step: usize,
    },
    /// A scheduled advance is due.
    Deliver(AdvanceTicket),
}

/// How a tour ended.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Finish {
    /// The last step was advanced past.
    Completed,
    /// The user skipped.
    Skipped,
}

/// Side effects requested by a transition, in the order they must run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Effect {
    /// Reset host navigation and dialog state.
    ResetHost(HostReset),
    /// A new step is shown; its target must be resolved afresh.
    StepChanged(usize),
    /// Feed [`Event::Deliver`] with `ticket` after `delay`.
    ScheduleAdvance {
        /// Identity checked at delivery.
        ticket: AdvanceTicket,
        /// Time until delivery.
        delay: Duration,
    },
    /// Write the completion flag.
    PersistCompleted,
    /// The tour ended.
    Finished(Finish),
}

/// Why an event changed nothing.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Ignored {
    /// The tour is not active.
    Inactive,
    /// The completion flag blocks an automatic start.
    AlreadyCompleted,
    /// The command is not valid in the current state, e.g. "Next" on an action-gated step.
    InvalidTransition,
    /// The signal or ticket belongs to a step or run that is no longer current.
    StaleSignal,
    /// The current step does not wait for this signal.
    UnknownSignal,
}

/// Whether an event was applied.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Outcome {
    /// State changed or an advance was scheduled.
    Applied,
    /// Nothing happened.
    Ignored(Ignored),
}

/// Result of [`transition`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transition {
    /// Next session state.
    pub session: Session,
    /// Effects to perform, in order.
    pub effects: Vec<Effect>,
    /// Whether the event was applied.
    pub outcome: Outcome,
}

impl Transition {
    fn applied(session: Session, effects: Vec<Effect>) -> Self {
        Self {
            session,
            effects,
            outcome: Outcome::Applied,
        }
    }

    fn ignored(session: Session, why: Ignored) -> Self {
        Self {
            session,
            effects: Vec::new(),
            outcome: Outcome::Ignored(why),
        }
    }
}

/// Apply `event` to `session`.
pub fn transition(session: Session, catalog: &Catalog, event: Event<'_>) -> Transition {
    if let Event::Restart = event {
        let next = Session {
            state: TourState::Active(0),
            generation: session.generation.wrapping_add(1),
            completed: session.completed,
        };
        return Transition::applied(
            next,
            vec![Effect::ResetHost(HostReset::all()), Effect::StepChanged(0)],
        );
    }

    let TourState::Active(i) = session.state else {
        return match event {
            Event::Start if session.completed => {
                Transition::ignored(session, Ignored::AlreadyCompleted)
            }
            Event::Start => Transition::applied(
                Session {
                    state: TourState::Active(0),
                    ..session
                },
                vec![Effect::StepChanged(0)],
            ),
            Event::Deliver(_) => Transition::ignored(session, Ignored::StaleSignal),
            _ => Transition::ignored(session, Ignored::Inactive),
        };
    };

    let Some(step) = catalog.get(i) else {
        // Only reachable if a session is paired with a shorter catalog.
        return terminate(session, Finish::Completed);
    };

    match event {
        Event::Start | Event::Restart => Transition::ignored(session, Ignored::InvalidTransition),
        Event::Skip => terminate(session, Finish::Skipped),
        Event::Next if step.action_required => {
            Transition::ignored(session, Ignored::InvalidTransition)
        }
        Event::Next => advance(session, catalog, i),
        Event::Screen(name) => match &step.trigger {
            Some(Trigger::Screen { name: want }) if step.action_required && want == name => {
                advance(session, catalog, i)
            }
            _ => Transition::ignored(session, Ignored::UnknownSignal),
        },
        Event::Signal {
            name,
            expected_step,
        } => {
            if expected_step != i {
                return Transition::ignored(session, Ignored::StaleSignal);
            }
            if !step.action_required {
                return Transition::ignored(session, Ignored::InvalidTransition);
            }
            match &step.trigger {
                Some(t @ Trigger::Action { name: want, .. }) if want == name => {
                    let delay = t.delay();
                    if delay.is_zero() {
                        advance(session, catalog, i)
                    } else {
                        let ticket = AdvanceTicket {
                            generation: session.generation,
                            step: i,
                        };
                        Transition::applied(session, vec![Effect::ScheduleAdvance { ticket, delay }])
                    }
                }
                _ => Transition::ignored(session, Ignored::UnknownSignal),
            }
        }
        Event::Deliver(ticket) => {
            if ticket.generation == session.generation && ticket.step == i {
                advance(session, catalog, i)
            } else {
                Transition::ignored(session, Ignored::StaleSignal)
            }
        }
    }
}

fn advance(session: Session, catalog: &Catalog, i: usize) -> Transition {
    if i + 1 >= catalog.len() {
        return terminate(session, Finish::Completed);
    }
    Transition::applied(
        Session {
            state: TourState::Active(i + 1),
            ..session
        },
        vec![Effect::StepChanged(i + 1)],
    )
}

fn terminate(session: Session, how: Finish) -> Transition {
    Transition::applied(
        Session {
            state: TourState::Inactive,
            generation: session.generation.wrapping_add(1),
            completed: true,
        },
        vec![Effect::PersistCompleted, Effect::Finished(how)],
    )
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the tour: steps, placements, triggers, and host reset flags.

use core::time::Duration;

use serde::{Deserialize, Serialize};

/// Preferred side of the anchor on which a step's tooltip is placed.
///
/// `Center` ignores the anchor entirely and centers the tooltip in the viewport.
/// Use it for steps whose target cannot be meaningfully anchored, such as a welcome message.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Placement {
    /// Above the anchor.
    Top,
    /// Below the anchor.
    #[default]
    Bottom,
    /// Left of the anchor.
    Left,
    /// Right of the anchor.
    Right,
    /// Center of the viewport, no anchor.
    Center,
}

impl Placement {
    /// Whether this placement needs a live anchor element.
    pub const fn is_anchored(self) -> bool {
        !matches!(self, Self::Center)
    }
}

/// The qualifying host signal that advances an action-gated step.
///
/// The engine never interprets the name; it only compares it with what the host reports.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trigger {
    /// A screen or dialog became active.
    ///
    /// Reported through [`Tour::report_screen`](crate::bridge::Tour::report_screen) and
    /// applied immediately.
    Screen {
        /// Host-chosen screen name.
        name: String,
    },
    /// A named host action completed.
    ///
    /// Reported through [`Tour::report_signal`](crate::bridge::Tour::report_signal)
    /// together with the step index it is expected to satisfy.
    Action {
        /// Host-chosen action name.
        name: String,
        /// Delay before the advance is applied, in milliseconds. Zero applies it at once.
        #[serde(default)]
        delay_ms: u64,
    },
}

impl Trigger {
    /// Gate on a screen or dialog becoming active.
    pub fn screen(name: impl Into<String>) -> Self {
        Self::Screen { name: name.into() }
    }

    /// Gate on a named action, advancing `delay` after it is reported.
    pub fn action(name: impl Into<String>, delay: Duration) -> Self {
        Self::Action {
            name: name.into(),
            delay_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// The signal name this trigger waits for.
    pub fn name(&self) -> &str {
        match self {
            Self::Screen { name } | Self::Action { name, .. } => name,
        }
    }

    /// Delay between the qualifying signal and the advance.
    pub fn delay(&self) -> Duration {
        match self {
            Self::Screen { .. } => Duration::ZERO,
            Self::Action { delay_ms, .. } => Duration::from_millis(*delay_ms),
        }
    }
}

/// One unit of the tour.
///
/// Steps are immutable once placed in a [`Catalog`](crate::catalog::Catalog).
/// The target is resolved at render time, never at construction.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// Unique step identifier.
    pub id: String,
    /// Stable identifier of the element to anchor to.
    pub target_id: String,
    /// Tooltip heading.
    #[serde(default)]
    pub title: String,
    /// Tooltip body text.
    #[serde(default, alias = "content")]
    pub body: String,
    /// Preferred tooltip side.
    #[serde(default, alias = "position")]
    pub placement: Placement,
    /// When true, the manual "Next" control does not advance this step.
    #[serde(default)]
    pub action_required: bool,
    /// Signal that advances the step when it is action-gated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<Trigger>,
}

impl Step {
    /// Create a non-gated step anchored below `target_id` with empty text.
    pub fn new(id: impl Into<String>, target_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            target_id: target_id.into(),
            title: String::new(),
            body: String::new(),
            placement: Placement::default(),
            action_required: false,
            trigger: None,
        }
    }

    /// Set the title and body text.
    #[must_use]
    pub fn with_text(mut self, title: impl Into<String>, body: impl Into<String>) -> Self {
        self.title = title.into();
        self.body = body.into();
        self
    }

    /// Set the preferred placement.
    #[must_use]
    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }

    /// Make the step action-gated on `trigger`.
    #[must_use]
    pub fn gated_by(mut self, trigger: Trigger) -> Self {
        self.action_required = true;
        self.trigger = Some(trigger);
        self
    }
}

bitflags::bitflags! {
    /// Host-side state a restart asks the host to reset before step 0 is shown.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct HostReset: u8 {
        /// Navigate back to the first toured screen.
        const NAVIGATE_HOME = 0b0000_0001;
        /// Close any open dialog.
        const CLOSE_DIALOGS = 0b0000_0010;
    }
}

impl Default for HostReset {
    fn default() -> Self {
        Self::all()
    }
}

// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Tour: a deterministic onboarding tour engine.
//!
//! ## Overview
//!
//! A tour walks a first-time user through an application by highlighting one
//! element at a time and explaining it. Some steps wait for the user to do
//! something elsewhere in the app (open a dialog, switch screens, finish a
//! simulated task) before moving on. This crate owns the part of that which has
//! ordering and consistency concerns:
//!
//! - [`catalog`]: the ordered, immutable step list.
//! - [`machine`]: the pure state machine (start, next, skip, restart, host signals,
//!   delayed advances with stale-ticket rejection).
//! - [`resolver`]: locating a step's anchor element, with delayed first lookup,
//!   retries, and re-resolution on resize.
//! - [`placement`]: pure tooltip positioning with viewport clamping.
//! - [`store`]: the persisted "tour seen" flag.
//! - [`bridge`]: [`Tour`](bridge::Tour), the coordinator the host drives.
//!
//! ## Not a renderer
//!
//! This crate does not draw anything and does not know what the host's events
//! mean. The host renders the [`Frame`](bridge::Frame) it gets back, reports
//! opaque screen and action names, and supplies element lookup through
//! [`TargetLookup`](resolver::TargetLookup).
//!
//! ## Time
//!
//! The engine owns no timers. The host passes a monotonic timestamp to
//! [`Tour::poll`](bridge::Tour::poll) and to every command that can show a step
//! or schedule an advance; delays run from that timestamp, and due work runs at
//! the next poll or command. Every delayed advance is tagged with the session generation and step
//! it was scheduled for and is discarded if either changed, so skipping or
//! restarting can never be undone by a late timer.
//!
//! ## Workflow
//!
//! 1) Build a [`Catalog`](catalog::Catalog) of [`Step`](types::Step)s.
//! 2) Build a [`Tour`](bridge::Tour) with a [`CompletionStore`](store::CompletionStore);
//!    it reads the flag once.
//! 3) Call [`Tour::start`](bridge::Tour::start) on mount. It is a no-op for users
//!    who completed or skipped the tour before;
//!    [`Tour::restart`](bridge::Tour::restart) always works.
//! 4) Each frame, [`poll`](bridge::Tour::poll) then render [`frame`](bridge::Tour::frame).
//! 5) Forward "Next"/"Skip" clicks and report screen changes and actions.
//!    Screen reports are level-triggered: a step gated on a screen that is
//!    already active advances as soon as it is shown.
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
//!     Step::new("demo", "load-demo")
//!         .with_placement(Placement::Bottom)
//!         .gated_by(Trigger::action("demo_loaded", Duration::from_millis(500))),
//!     Step::new("done", "summary").with_placement(Placement::Center),
//! ])
//! .unwrap();
//!
//! let mut scene = SceneLookup::new(Size::new(1000.0, 800.0));
//! scene.insert("load-demo", Rect::new(400.0, 80.0, 520.0, 120.0));
//!
//! let ms = Duration::from_millis;
//! let mut tour = Tour::auto_start(catalog, MemoryStore::default(), TourConfig::default(), ms(0));
//!
//! // Reported for step 0 at 100 ms, applied half a second later.
//! tour.report_signal("demo_loaded", 0, ms(100));
//! tour.poll(ms(599), &mut scene);
//! assert_eq!(tour.current_step_index(), Some(0));
//! tour.poll(ms(600), &mut scene);
//! assert_eq!(tour.current_step_index(), Some(1));
//!
//! tour.next(ms(700));
//! assert!(!tour.is_visible());
//! assert!(tour.store().completed());
//! ```

pub mod bridge;
pub mod catalog;
pub mod config;
pub mod error;
pub mod machine;
pub mod placement;
pub mod resolver;
pub mod store;
pub mod types;

pub use bridge::{Frame, HostControl, Tour};
pub use catalog::Catalog;
pub use error::{CatalogError, ConfigError, StoreError};
pub use types::{HostReset, Placement, Step, Trigger};

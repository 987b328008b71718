// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tour basics: a manual walkthrough with placement output.
//!
//! Builds a three-step tour, resolves targets from an in-memory scene, prints
//! each frame's layout, and clicks "Next" until the tour completes. Completion
//! is kept in a JSON file under the system temp directory, so a second run
//! finds the tour already seen and restarts it explicitly.
//!
//! Run:
//! - `cargo run -p understory_tour_demos --example tour_basics`

use core::time::Duration;

use kurbo::{Rect, Size};
use understory_tour::bridge::Tour;
use understory_tour::machine::{Ignored, Outcome};
use understory_tour::catalog::Catalog;
use understory_tour::config::TourConfig;
use understory_tour::resolver::SceneLookup;
use understory_tour::store::{CompletionStore, FileStore};
use understory_tour::types::HostReset;
use understory_tour::types::{Placement, Step};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();

    let viewport = Size::new(1000.0, 800.0);
    let catalog = Catalog::new(vec![
        Step::new("welcome", "hero")
            .with_text("Welcome", "A quick look around.")
            .with_placement(Placement::Center),
        Step::new("sidebar", "nav")
            .with_text("Navigation", "Every screen lives here.")
            .with_placement(Placement::Right),
        Step::new("export", "export-btn")
            .with_text("Export", "Send the finished document anywhere.")
            .with_placement(Placement::Left),
    ])
    .expect("valid catalog");

    let mut scene = SceneLookup::new(viewport);
    scene.insert("nav", Rect::new(0.0, 0.0, 220.0, 800.0));
    scene.insert("export-btn", Rect::new(860.0, 20.0, 980.0, 60.0));

    let config = TourConfig::default();
    let path = std::env::temp_dir().join("understory_tour_demo.json");
    let store = FileStore::from_config(path, &config);
    println!("== Completion flag in {} ==", store.path().display());
    let mut tour = Tour::new(catalog, store, config).with_viewport(viewport);

    let mut now = Duration::ZERO;
    if tour.start(now) == Outcome::Ignored(Ignored::AlreadyCompleted) {
        println!("== Tour already seen; restarting ==");
        tour.restart(&mut |_: HostReset| {}, now);
    }

    while tour.is_visible() {
        now += Duration::from_millis(500);
        tour.poll(now, &mut scene);
        if let Some(frame) = tour.frame() {
            println!(
                "== Step {} of {}: {} ==\n  tooltip: {:?}\n  highlight: {:?}\n  arrow: {:?}",
                frame.index + 1,
                frame.count,
                frame.step.title,
                frame.layout.tooltip,
                frame.layout.highlight,
                frame.layout.arrow,
            );
            tour.next(now);
        }
    }

    assert!(tour.has_completed());
    if let Ok(saved) = tour.store().load() {
        println!("  persisted: {saved}");
    }
    println!("== Tour completed ==");
}

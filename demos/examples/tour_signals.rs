// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Action-gated steps driven by host signals.
//!
//! A simulated host opens a dialog, switches screens, and finishes a background
//! task, with idle gaps in between. The tour follows those reports, measures
//! each delay from the moment it was reported, ignores a stale duplicate, and
//! shows that skipping cancels an advance that was still waiting on its delay.
//!
//! Run:
//! - `cargo run -p understory_tour_demos --example tour_signals`

use core::time::Duration;

use kurbo::{Rect, Size};
use understory_tour::bridge::Tour;
use understory_tour::catalog::Catalog;
use understory_tour::config::TourConfig;
use understory_tour::machine::Outcome;
use understory_tour::resolver::SceneLookup;
use understory_tour::store::MemoryStore;
use understory_tour::types::{HostReset, Placement, Step, Trigger};

const MS: Duration = Duration::from_millis(1);

fn catalog() -> Catalog {
    Catalog::new(vec![
        Step::new("welcome", "start-consult-card")
            .with_text("Start Here", "Click to launch your first consultation.")
            .with_placement(Placement::Right)
            .gated_by(Trigger::screen("patient-modal")),
        Step::new("modal-inputs", "patient-form")
            .with_text("Context Matters", "Enter basic details here.")
            .with_placement(Placement::Right),
        Step::new("modal-start", "start-recording-btn")
            .with_text("Begin Session", "Start recording to enter the listening room.")
            .with_placement(Placement::Top)
            .gated_by(Trigger::screen("consultation")),
        Step::new("consult-demo", "load-demo")
            .with_text("See the Magic", "Load a demo conversation.")
            .with_placement(Placement::Bottom)
            .gated_by(Trigger::action("demo_loaded", 500 * MS)),
        Step::new("consult-generate", "generate-soap")
            .with_text("AI Extraction", "Generate the structured note.")
            .with_placement(Placement::Bottom)
            .gated_by(Trigger::action("soap_generated", 1000 * MS)),
        Step::new("consult-edit", "assessment-plan")
            .with_text("Your Expertise", "Finish the assessment and plan.")
            .with_placement(Placement::Left),
    ])
    .expect("valid catalog")
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with_target(false)
        .init();

    let viewport = Size::new(1200.0, 800.0);
    let mut scene = SceneLookup::new(viewport);
    scene.insert("start-consult-card", Rect::new(260.0, 120.0, 560.0, 280.0));

    let mut tour =
        Tour::new(catalog(), MemoryStore::default(), TourConfig::default()).with_viewport(viewport);
    tour.start(Duration::ZERO);
    let mut now = 500 * MS;
    tour.poll(now, &mut scene);
    report(&tour);

    // The user opens the patient dialog; its form mounts a little later.
    now += 1500 * MS;
    tour.report_screen("patient-modal", now);
    scene.insert("patient-form", Rect::new(400.0, 200.0, 800.0, 520.0));
    scene.insert("start-recording-btn", Rect::new(500.0, 540.0, 700.0, 580.0));
    now += 500 * MS;
    tour.poll(now, &mut scene);
    report(&tour);

    now += 2000 * MS;
    tour.next(now);
    now += 500 * MS;
    tour.poll(now, &mut scene);
    report(&tour);

    // Recording starts: the dialog closes and the consultation screen mounts.
    scene.remove("patient-form");
    scene.remove("start-recording-btn");
    scene.insert("load-demo", Rect::new(900.0, 80.0, 1020.0, 120.0));
    scene.insert("generate-soap", Rect::new(760.0, 80.0, 880.0, 120.0));
    scene.insert("assessment-plan", Rect::new(640.0, 300.0, 1160.0, 700.0));
    tour.clear_screen("patient-modal");
    tour.report_screen("consultation", now);
    now += 500 * MS;
    tour.poll(now, &mut scene);
    report(&tour);

    now += 3000 * MS;
    tour.report_signal("demo_loaded", 3, now);
    now += 250 * MS;
    tour.poll(now, &mut scene);
    report(&tour);
    now += 250 * MS;
    tour.poll(now, &mut scene);
    now += 500 * MS;
    tour.poll(now, &mut scene);
    report(&tour);

    // A duplicate report for a step already left is ignored.
    let dup = tour.report_signal("demo_loaded", 3, now);
    println!("  duplicate demo_loaded: {dup:?}");
    assert!(matches!(dup, Outcome::Ignored(_)));

    // Skip while the generate advance is still waiting on its delay.
    tour.report_signal("soap_generated", 4, now);
    println!("  advances pending: {}", tour.pending_advances());
    tour.skip();
    assert_eq!(tour.pending_advances(), 0);
    now += 2000 * MS;
    tour.poll(now, &mut scene);
    assert!(!tour.is_visible());
    assert!(tour.store().completed());
    println!("== Skipped; late advance discarded ==");

    // The sidebar's "restart tour" button.
    tour.restart(&mut |what: HostReset| println!("  host reset: {what:?}"), now);
    assert_eq!(tour.current_step_index(), Some(0));
    println!("== Restarted at step 1 ==");
}

fn report(tour: &Tour<MemoryStore>) {
    match tour.frame() {
        Some(frame) => println!(
            "== Step {} of {}: {} ==\n  tooltip at {:?}, next button: {}",
            frame.index + 1,
            frame.count,
            frame.step.title,
            frame.layout.tooltip.origin(),
            frame.show_next,
        ),
        None => println!(
            "== Step {:?}: awaiting target ==",
            tour.current_step_index().map(|i| i + 1)
        ),
    }
}

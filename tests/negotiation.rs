/*
 *  tests/negotiation.rs
 *
 *  Integration tests for width negotiation
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 */

use std::time::{Duration, Instant};

use proptest::prelude::*;

use nowbar::display_text::{format_display_text, strip_parentheses};
use nowbar::events::Event;
use nowbar::playback::PlaybackSnapshot;
use nowbar::prefs::{DisplayPreferences, PreferenceChange, WidthLimit};
use nowbar::status_item::{
    CheckOutcome, Commit, FixedAdvanceMeasure, ManualScheduler, MockHost, NegotiationPhase,
    NegotiatorConfig, StatusItemController, WidthNegotiator,
};

type Controller = StatusItemController<MockHost, ManualScheduler, FixedAdvanceMeasure>;

fn controller(prefs: DisplayPreferences, host: MockHost) -> Controller {
    let now = Instant::now();
    let mut c = StatusItemController::new(prefs, host, ManualScheduler::new(), FixedAdvanceMeasure::default(), now);
    c.start(now);
    c
}

fn track(title: &str, artist: &str) -> Event {
    Event::TrackChanged(PlaybackSnapshot {
        title: title.to_string(),
        artist: artist.to_string(),
        is_playing: true,
    })
}

/// Fire due checks one debounce interval at a time. Returns intervals used.
fn settle(c: &mut Controller) -> usize {
    let mut intervals = 0;
    while c.scheduler_mut().pending() > 0 {
        intervals += 1;
        assert!(intervals < 64, "negotiation did not settle");
        for token in c.scheduler_mut().advance(Duration::from_millis(500)) {
            c.handle_event(Event::DebounceElapsed(token), Instant::now());
        }
    }
    intervals
}

/// Run checks against a host hiding anything wider than `threshold`,
/// returning the ceiling after each shrink.
fn drive(n: &mut WidthNegotiator, mut commit: Commit, threshold: f32) -> Vec<(f32, f32)> {
    let mut steps = Vec::new();
    for _ in 0..256 {
        let before = n.committed_width();
        let hidden = commit.width > threshold;
        match n.debounce_elapsed(commit.token, || Some(hidden)) {
            CheckOutcome::Shrunk(next) => {
                steps.push((before, n.ceiling()));
                commit = next;
            }
            _ => return steps,
        }
    }
    panic!("no convergence");
}

#[test]
fn test_scenario_title_and_artist() {
    let prefs = DisplayPreferences {
        show_title: true,
        show_artist: true,
        ignore_parentheses: true,
        ..DisplayPreferences::default()
    };
    let snapshot = PlaybackSnapshot {
        title: "Song (Remix)".into(),
        artist: "Artist".into(),
        is_playing: true,
    };
    assert_eq!(format_display_text(&snapshot, &prefs), "Song \u{2022} Artist");
}

#[test]
fn test_parentheses_removal_is_idempotent() {
    let once = strip_parentheses("Song (Remix) (Live)");
    assert_eq!(once, "Song");
    assert_eq!(strip_parentheses(&once), once);
}

#[test]
fn test_scenario_max_width_clamp_never_shrinks() {
    let host = MockHost::new();
    let mut c = controller(DisplayPreferences::default(), host.clone());
    settle(&mut c);

    let mut n = WidthNegotiator::new(NegotiatorConfig::default(), WidthLimit::Bounded(110.0), true);
    let commit = n.desired_width_changed(300.0);
    assert_eq!(commit.width, 110.0);
    assert_eq!(n.debounce_elapsed(commit.token, || Some(false)), CheckOutcome::Accepted);

    // same through the controller, 50 chars is far wider than 110
    c.handle_event(track(&"x".repeat(50), ""), Instant::now());
    let mut phases = vec![c.negotiator().phase()];
    while c.scheduler_mut().pending() > 0 {
        for token in c.scheduler_mut().advance(Duration::from_millis(500)) {
            c.handle_event(Event::DebounceElapsed(token), Instant::now());
            phases.push(c.negotiator().phase());
        }
    }
    assert_eq!(c.render(Instant::now()).committed_width_px, 110.0);
    assert!(!phases.contains(&NegotiationPhase::Shrinking));
}

#[test]
fn test_scenario_convergence() {
    let mut n = WidthNegotiator::new(NegotiatorConfig::default(), WidthLimit::Unbounded, true);
    let commit = n.desired_width_changed(200.0);
    let steps = drive(&mut n, commit, 80.0);

    let bound = ((200.0f32 - 80.0) / 48.0).ceil() as usize + 1;
    assert!(steps.len() <= bound, "{} shrinks", steps.len());
    assert!(steps.len() as f32 <= 200.0 / 48.0);
    assert!(n.committed_width() <= 80.0);
    assert_eq!(n.phase(), NegotiationPhase::Stable);
}

#[test]
fn test_static_mode_applies_once_per_change() {
    let host = MockHost::with_threshold(10.0);
    let prefs = DisplayPreferences {
        dynamic_resizing: false,
        max_width: WidthLimit::Unbounded,
        ..DisplayPreferences::default()
    };
    let mut c = controller(prefs, host.clone());
    settle(&mut c);
    let base = host.apply_count();

    c.handle_event(track("First track", ""), Instant::now());
    settle(&mut c);
    assert_eq!(host.apply_count(), base + 1);

    c.handle_event(Event::HostVisibilityChanged { visible: false }, Instant::now());
    settle(&mut c);
    c.handle_event(track("Second track, longer", ""), Instant::now());
    settle(&mut c);
    assert_eq!(host.apply_count(), base + 2);
    assert_eq!(host.state().lock().unwrap().query_count, 0);
}

#[test]
fn test_feedback_between_apply_and_check_is_ignored() {
    let host = MockHost::with_threshold(80.0);
    let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
    let mut c = controller(prefs, host.clone());
    settle(&mut c);

    c.handle_event(track("Long enough to be hidden", ""), Instant::now());
    let before = c.negotiator().snapshot();
    assert!(c.scheduler_mut().advance(Duration::from_millis(250)).is_empty());
    c.handle_event(Event::HostVisibilityChanged { visible: false }, Instant::now());
    c.handle_event(Event::HostVisibilityChanged { visible: true }, Instant::now());
    assert_eq!(c.negotiator().snapshot(), before);

    // the check itself is honored
    let due = c.scheduler_mut().advance(Duration::from_millis(250));
    assert_eq!(due.len(), 1);
    c.handle_event(Event::DebounceElapsed(due[0]), Instant::now());
    assert_eq!(c.negotiator().phase(), NegotiationPhase::Shrinking);
}

#[test]
fn test_track_change_mid_search_uses_current_ceiling() {
    let host = MockHost::with_threshold(100.0);
    let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
    let mut c = controller(prefs, host.clone());
    settle(&mut c);

    // 200 wide, first check shrinks to 192
    c.handle_event(track(&"y".repeat(27), ""), Instant::now());
    for token in c.scheduler_mut().advance(Duration::from_millis(500)) {
        c.handle_event(Event::DebounceElapsed(token), Instant::now());
    }
    assert_eq!(c.negotiator().ceiling(), 192.0);

    c.handle_event(track(&"z".repeat(60), ""), Instant::now());
    assert_eq!(host.applied().last(), Some(&192.0));
    settle(&mut c);
    assert!(c.render(Instant::now()).committed_width_px <= 100.0);
}

#[test]
fn test_unbounded_preference_reopens_width() {
    let host = MockHost::new();
    let mut c = controller(DisplayPreferences::default(), host.clone());
    c.handle_event(track(&"w".repeat(30), ""), Instant::now());
    settle(&mut c);
    assert_eq!(c.render(Instant::now()).committed_width_px, 110.0);

    c.handle_event(Event::PreferenceChanged(PreferenceChange::MaxWidth(WidthLimit::Unbounded)), Instant::now());
    settle(&mut c);
    assert_eq!(c.render(Instant::now()).committed_width_px, 30.0 * 6.0 + 38.0);
}

fn width_limit() -> impl Strategy<Value = WidthLimit> {
    prop_oneof![
        Just(WidthLimit::Unbounded),
        (30.0f32..600.0).prop_map(|px| WidthLimit::Bounded(px.floor())),
    ]
}

proptest! {
    #[test]
    fn prop_committed_is_clamped(
        desired in 30.0f32..1200.0,
        max_width in width_limit(),
        threshold in 0.0f32..1200.0,
    ) {
        let mut n = WidthNegotiator::new(NegotiatorConfig::default(), max_width, true);
        let commit = n.desired_width_changed(desired);
        let steps = drive(&mut n, commit, threshold);
        // the last ceiling this episode, accepting the width releases it
        let ceiling = steps.last().map_or(f32::INFINITY, |&(_, c)| c);

        prop_assert_eq!(n.phase(), NegotiationPhase::Stable);
        if !n.is_icon_only() {
            let expected = desired.min(max_width.as_px()).min(ceiling);
            prop_assert_eq!(n.committed_width(), expected);
            prop_assert_eq!(n.ceiling(), f32::INFINITY);
        }
    }

    #[test]
    fn prop_shrink_is_monotonic_and_bounded(
        desired in 30.0f32..2000.0,
        threshold in 0.0f32..2000.0,
    ) {
        let mut n = WidthNegotiator::new(NegotiatorConfig::default(), WidthLimit::Unbounded, true);
        let commit = n.desired_width_changed(desired);
        let steps = drive(&mut n, commit, threshold);

        let mut last_ceiling = f32::INFINITY;
        for (committed_before, ceiling) in &steps {
            prop_assert!(ceiling < committed_before);
            prop_assert!(*ceiling < last_ceiling);
            last_ceiling = *ceiling;
        }
        prop_assert!(steps.len() <= (desired / 48.0).ceil() as usize + 1);
        if n.committed_width() > threshold {
            prop_assert!(n.is_icon_only());
        }
    }
}

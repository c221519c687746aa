/*
 *  status_item/controller.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Status item controller - folds events into text, width and animation
 *
 *  This program is free software: you can redistribute it and/or modify
 *  it under the terms of the GNU General Public License as published by
 *  the Free Software Foundation, either version 3 of the License, or
 *  (at your option) any later version.
 *
 *  This program is distributed in the hope that it will be useful,
 *  but WITHOUT ANY WARRANTY; without even the implied warranty of
 *  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *  GNU General Public License for more details.
 *
 *  See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *  Public License.
 *
 */

use std::time::Instant;

use log::{debug, info, warn};

use crate::constants::{ICON_ONLY_WIDTH, TEXT_CHROME_WIDTH};
use crate::display_text::format_display_text;
use crate::events::Event;
use crate::playback::PlaybackSnapshot;
use crate::prefs::{DisplayPreferences, PreferenceChange};
use crate::status_item::marquee::{MarqueeFrame, MarqueeRenderer};
use crate::status_item::measure::TextMeasure;
use crate::status_item::negotiator::{CheckOutcome, Commit, NegotiatorConfig, WidthNegotiator};
use crate::status_item::presence::{AnimationPhase, PresenceAnimator};
use crate::status_item::scheduler::CheckScheduler;
use crate::status_item::traits::StatusItemHost;

/// Width wanted for `text` before any limit is applied
pub fn desired_width(text_width: f32, text_is_empty: bool) -> f32 {
    if text_is_empty {
        ICON_ONLY_WIDTH
    } else {
        TEXT_CHROME_WIDTH + text_width
    }
}

/// Room left for the marquee once the icon and paddings are taken out
pub fn marquee_box_width(committed_width: f32) -> f32 {
    (committed_width - TEXT_CHROME_WIDTH).max(0.0)
}

/// Everything the presentation layer needs to draw one frame
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView {
    pub text: String,
    pub icon_only: bool,
    pub committed_width_px: f32,
    pub animation: AnimationPhase,
    pub marquee: MarqueeFrame,
}

pub struct StatusItemController<H, S, M> {
    prefs: DisplayPreferences,
    snapshot: PlaybackSnapshot,
    text: String,
    text_width: f32,
    negotiator: WidthNegotiator,
    host: H,
    scheduler: S,
    measure: M,
    marquee: MarqueeRenderer,
    presence: PresenceAnimator,
}

impl<H, S, M> StatusItemController<H, S, M>
where
    H: StatusItemHost,
    S: CheckScheduler,
    M: TextMeasure,
{
    pub fn new(prefs: DisplayPreferences, host: H, scheduler: S, measure: M, now: Instant) -> Self {
        Self::with_config(NegotiatorConfig::default(), prefs, host, scheduler, measure, now)
    }

    pub fn with_config(
        config: NegotiatorConfig,
        prefs: DisplayPreferences,
        host: H,
        scheduler: S,
        measure: M,
        now: Instant,
    ) -> Self {
        let negotiator = WidthNegotiator::new(config, prefs.max_width, prefs.dynamic_resizing);
        let mut marquee = MarqueeRenderer::new(now);
        marquee.set_idle_delay(prefs.marquee_delay(), now);

        Self {
            prefs,
            snapshot: PlaybackSnapshot::default(),
            text: String::new(),
            text_width: 0.0,
            negotiator,
            host,
            scheduler,
            measure,
            marquee,
            presence: PresenceAnimator::new(false, now),
        }
    }

    /// Size the item for the initial (empty) state.
    pub fn start(&mut self, now: Instant) {
        let desired = desired_width(self.text_width, self.text.is_empty());
        let commit = self.negotiator.desired_width_changed(desired);
        self.apply(commit, now);
    }

    pub fn prefs(&self) -> &DisplayPreferences {
        &self.prefs
    }

    pub fn negotiator(&self) -> &WidthNegotiator {
        &self.negotiator
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    /// Full formatted text, regardless of icon-only
    pub fn display_text(&self) -> &str {
        &self.text
    }

    pub fn text_pixel_width(&self) -> f32 {
        self.text_width
    }

    /// Fold one event in. Returns false once the loop should stop.
    pub fn handle_event(&mut self, event: Event, now: Instant) -> bool {
        match event {
            Event::TrackChanged(snapshot) => {
                if self.presence.set_playing(snapshot.is_playing, now) {
                    debug!("Playing state now {}", snapshot.is_playing);
                }
                self.snapshot = snapshot;
                self.refresh_text(now);
            }
            Event::PreferenceChanged(change) => self.preference_changed(change, now),
            Event::HostVisibilityChanged { visible } => {
                if let Some(commit) = self.negotiator.host_visibility_report(!visible) {
                    self.apply(commit, now);
                }
            }
            Event::DebounceElapsed(token) => {
                let host = &self.host;
                let outcome = self.negotiator.debounce_elapsed(token, || {
                    if !host.is_ready() || !host.capabilities().supports_occlusion_query {
                        return None;
                    }
                    match host.is_force_hidden() {
                        Ok(hidden) => Some(hidden),
                        Err(e) => {
                            debug!("Visibility query skipped: {}", e);
                            None
                        }
                    }
                });
                if let CheckOutcome::Shrunk(commit) = outcome {
                    self.apply(commit, now);
                }
            }
            Event::Shutdown => {
                info!("Status item controller shutting down");
                self.scheduler.cancel_pending();
                return false;
            }
        }
        true
    }

    fn preference_changed(&mut self, change: PreferenceChange, now: Instant) {
        if !self.prefs.apply(&change) {
            debug!("Preference unchanged: {:?}", change);
            return;
        }
        info!("Preference changed: {:?}", change);

        if change.affects_text() {
            self.refresh_text(now);
            return;
        }
        match change {
            PreferenceChange::MaxWidth(limit) => {
                let commit = self.negotiator.max_width_changed(limit);
                self.apply(commit, now);
            }
            PreferenceChange::DynamicResizing(enabled) => {
                let commit = self.negotiator.dynamic_resizing_changed(enabled);
                self.apply(commit, now);
            }
            PreferenceChange::MarqueeDelay(_) => {
                self.marquee.set_idle_delay(self.prefs.marquee_delay(), now);
            }
            _ => {}
        }
    }

    /// Reformat and, only when text or desired width moved, renegotiate.
    fn refresh_text(&mut self, now: Instant) {
        let text = format_display_text(&self.snapshot, &self.prefs);
        let text_width = self.measure.text_width(&text);
        let desired = desired_width(text_width, text.is_empty());

        if text == self.text && desired == self.negotiator.desired_width() {
            return;
        }
        debug!("Display text '{}' ({}px)", text, text_width);
        self.text = text;
        self.text_width = text_width;

        let commit = self.negotiator.desired_width_changed(desired);
        self.apply(commit, now);
    }

    fn apply(&mut self, commit: Commit, now: Instant) {
        if self.host.is_ready() {
            if let Err(e) = self.host.apply_width(commit.width) {
                if e.is_missing_resource() {
                    debug!("Width {}px not applied: {}", commit.width, e);
                } else {
                    warn!("Width {}px not applied: {}", commit.width, e);
                }
            }
        } else {
            debug!("Host not ready, width {}px deferred to the check", commit.width);
        }
        self.scheduler.schedule(self.negotiator.debounce(), commit.token);
        self.sync_marquee(now);
    }

    fn shown_text(&self) -> &str {
        if self.negotiator.is_icon_only() { "" } else { &self.text }
    }

    fn sync_marquee(&mut self, now: Instant) {
        let box_width = marquee_box_width(self.negotiator.committed_width());
        let (shown, text_width) = if self.negotiator.is_icon_only() {
            ("", 0.0)
        } else {
            (self.text.as_str(), self.text_width)
        };
        self.marquee.set_content(shown, text_width, box_width, now);
    }

    pub fn render(&self, now: Instant) -> RenderView {
        RenderView {
            text: self.shown_text().to_string(),
            icon_only: self.negotiator.is_icon_only(),
            committed_width_px: self.negotiator.committed_width(),
            animation: self.presence.sample(now),
            marquee: self.marquee.frame_at(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prefs::WidthLimit;
    use crate::status_item::hosts::MockHost;
    use crate::status_item::measure::FixedAdvanceMeasure;
    use crate::status_item::negotiator::NegotiationPhase;
    use crate::status_item::scheduler::ManualScheduler;
    use std::time::Duration;

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

    /// Let debounce intervals pass until nothing is pending.
    fn settle(c: &mut Controller) {
        for _ in 0..32 {
            let due = c.scheduler_mut().advance(Duration::from_millis(500));
            if due.is_empty() && c.scheduler_mut().pending() == 0 {
                return;
            }
            for token in due {
                c.handle_event(Event::DebounceElapsed(token), Instant::now());
            }
        }
    }

    #[test]
    fn test_start_sizes_icon() {
        let host = MockHost::new();
        let mut c = controller(DisplayPreferences::default(), host.clone());
        settle(&mut c);
        assert_eq!(host.applied(), vec![ICON_ONLY_WIDTH]);
        assert_eq!(c.render(Instant::now()).text, "");
    }

    #[test]
    fn test_track_change_formats_and_clamps() {
        let host = MockHost::new();
        let prefs = DisplayPreferences {
            show_artist: true,
            ignore_parentheses: true,
            ..DisplayPreferences::default()
        };
        let mut c = controller(prefs, host.clone());
        c.handle_event(track("Song (Remix)", "Artist"), Instant::now());
        settle(&mut c);

        assert_eq!(c.display_text(), "Song \u{2022} Artist");
        // 13 chars at 6px plus chrome is over the 110 default
        assert_eq!(host.applied().last(), Some(&110.0));
        let view = c.render(Instant::now());
        assert_eq!(view.committed_width_px, 110.0);
        assert!(view.animation.playing);
        assert_eq!(c.negotiator().phase(), NegotiationPhase::Stable);
    }

    #[test]
    fn test_same_track_does_not_renegotiate() {
        let host = MockHost::new();
        let mut c = controller(DisplayPreferences::default(), host.clone());
        c.handle_event(track("Song", "A"), Instant::now());
        settle(&mut c);
        let applies = host.apply_count();
        c.handle_event(track("Song", "B"), Instant::now());
        settle(&mut c);
        assert_eq!(host.apply_count(), applies);
    }

    #[test]
    fn test_hidden_host_drives_to_fit() {
        let host = MockHost::with_threshold(80.0);
        let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
        let mut c = controller(prefs, host.clone());
        c.handle_event(track("Twenty Seven Characters Long", ""), Instant::now());
        settle(&mut c);

        let view = c.render(Instant::now());
        assert!(view.committed_width_px <= 80.0);
        assert!(!view.icon_only);
        assert_eq!(c.negotiator().phase(), NegotiationPhase::Stable);
    }

    #[test]
    fn test_icon_only_blanks_text() {
        let host = MockHost::with_threshold(30.0);
        let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
        let mut c = controller(prefs, host.clone());
        c.handle_event(track("Some Song", ""), Instant::now());
        settle(&mut c);

        let view = c.render(Instant::now());
        assert!(view.icon_only);
        assert_eq!(view.text, "");
        assert_eq!(view.committed_width_px, ICON_ONLY_WIDTH);
        assert_eq!(c.display_text(), "Some Song");
    }

    #[test]
    fn test_self_induced_reports_are_ignored() {
        let host = MockHost::with_threshold(80.0);
        let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
        let mut c = controller(prefs, host.clone());
        settle(&mut c);
        c.handle_event(track("Long enough to be hidden", ""), Instant::now());
        let before = c.negotiator().snapshot();
        c.handle_event(Event::HostVisibilityChanged { visible: false }, Instant::now());
        c.handle_event(Event::HostVisibilityChanged { visible: true }, Instant::now());
        assert_eq!(c.negotiator().snapshot(), before);
    }

    #[test]
    fn test_max_width_preference_recommits() {
        let host = MockHost::new();
        let mut c = controller(DisplayPreferences::default(), host.clone());
        c.handle_event(track("A title of some length here", ""), Instant::now());
        settle(&mut c);
        c.handle_event(Event::PreferenceChanged(PreferenceChange::MaxWidth(WidthLimit::Bounded(60.0))), Instant::now());
        settle(&mut c);
        assert_eq!(host.applied().last(), Some(&60.0));
        assert!(c.render(Instant::now()).marquee.is_scrolling());
    }

    #[test]
    fn test_static_mode_after_shrink_restores_full_width() {
        let host = MockHost::with_threshold(80.0);
        let prefs = DisplayPreferences { max_width: WidthLimit::Unbounded, ..DisplayPreferences::default() };
        let mut c = controller(prefs, host.clone());
        // 27 chars, 200px wanted
        c.handle_event(track(&"y".repeat(27), ""), Instant::now());
        settle(&mut c);
        assert_eq!(host.applied().last(), Some(&48.0));

        c.handle_event(Event::PreferenceChanged(PreferenceChange::DynamicResizing(false)), Instant::now());
        settle(&mut c);
        assert_eq!(host.applied().last(), Some(&200.0));
        assert_eq!(c.render(Instant::now()).committed_width_px, 200.0);
        assert_eq!(c.negotiator().phase(), NegotiationPhase::Stable);
    }

    #[test]
    fn test_not_ready_host_is_skipped() {
        let host = MockHost::new();
        host.set_ready(false);
        let mut c = controller(DisplayPreferences::default(), host.clone());
        c.handle_event(track("Song", ""), Instant::now());
        settle(&mut c);
        assert_eq!(host.apply_count(), 0);
        assert_eq!(c.negotiator().phase(), NegotiationPhase::Stable);
    }

    #[test]
    fn test_shutdown_stops() {
        let mut c = controller(DisplayPreferences::default(), MockHost::new());
        assert!(c.handle_event(Event::HostVisibilityChanged { visible: true }, Instant::now()));
        assert!(!c.handle_event(Event::Shutdown, Instant::now()));
    }
}

/*
 *  status_item/presence.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Bar icon, static when idle and bouncing while playing
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

use arrayvec::ArrayVec;

use crate::constants::{
    BAR_ANIMATION_HEIGHT, BAR_ANIMATION_WIDTH, IDLE_BAR_COUNT, IDLE_BAR_SPACING, IDLE_BAR_WIDTH,
    PLAYING_BAR_BASE_HEIGHTS, PLAYING_BAR_DURATIONS_SECS, PLAYING_BAR_MIN_HEIGHT, PLAYING_BAR_WIDTH,
};

pub const MAX_BARS: usize = 4;

/// One bar, bottom aligned inside the icon box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarGeometry {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

/// A bar bouncing between `max` and `min`, `duration` seconds each way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarAnimation {
    pub phase: f32,
    pub duration: f32,
    pub min: f32,
    pub max: f32,
}

impl BarAnimation {
    /// Height `t` seconds after the animation started. Starts at `max`,
    /// linear down to `min`, then back.
    pub fn height(&self, t: f32) -> f32 {
        if self.duration <= 0.0 {
            return self.max;
        }
        let local = (t + self.phase).max(0.0) / self.duration;
        let leg = local % 2.0;
        let toward_min = if leg < 1.0 { leg } else { 2.0 - leg };
        self.max - (self.max - self.min) * toward_min
    }
}

/// Sampled icon state handed to the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationPhase {
    pub playing: bool,
    pub bars: ArrayVec<BarGeometry, MAX_BARS>,
}

enum Variant {
    Idle,
    Playing {
        started: Instant,
        bars: ArrayVec<(f32, BarAnimation), MAX_BARS>,
    },
}

pub struct PresenceAnimator {
    variant: Variant,
}

impl PresenceAnimator {
    pub fn new(playing: bool, now: Instant) -> Self {
        let mut animator = Self { variant: Variant::Idle };
        if playing {
            animator.rebuild(true, now);
        }
        animator
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.variant, Variant::Playing { .. })
    }

    /// Switch variant. Returns false when already in that variant.
    pub fn set_playing(&mut self, playing: bool, now: Instant) -> bool {
        if playing == self.is_playing() {
            return false;
        }
        self.rebuild(playing, now);
        true
    }

    fn rebuild(&mut self, playing: bool, now: Instant) {
        if !playing {
            self.variant = Variant::Idle;
            return;
        }

        let tallest = PLAYING_BAR_BASE_HEIGHTS.iter().copied().fold(f32::MIN, f32::max);
        let multiplier = BAR_ANIMATION_HEIGHT / tallest;
        let spacing = BAR_ANIMATION_WIDTH / MAX_BARS as f32;

        let bars = PLAYING_BAR_BASE_HEIGHTS
            .iter()
            .zip(PLAYING_BAR_DURATIONS_SECS)
            .enumerate()
            .map(|(i, (base, duration))| {
                let x = i as f32 * spacing + 1.0;
                let animation = BarAnimation {
                    phase: i as f32,
                    duration,
                    min: PLAYING_BAR_MIN_HEIGHT,
                    max: base * multiplier + 1.0,
                };
                (x, animation)
            })
            .collect();

        self.variant = Variant::Playing { started: now, bars };
    }

    pub fn sample(&self, now: Instant) -> AnimationPhase {
        match &self.variant {
            Variant::Idle => AnimationPhase {
                playing: false,
                bars: (0..IDLE_BAR_COUNT)
                    .map(|i| BarGeometry {
                        x: i as f32 * IDLE_BAR_SPACING,
                        width: IDLE_BAR_WIDTH,
                        height: BAR_ANIMATION_HEIGHT,
                    })
                    .collect(),
            },
            Variant::Playing { started, bars } => {
                let t = now.saturating_duration_since(*started).as_secs_f32();
                AnimationPhase {
                    playing: true,
                    bars: bars
                        .iter()
                        .map(|(x, animation)| BarGeometry {
                            x: *x,
                            width: PLAYING_BAR_WIDTH,
                            height: animation.height(t),
                        })
                        .collect(),
                }
            }
        }
    }
}

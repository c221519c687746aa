/*
 *  status_item/marquee.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Time driven marquee for text wider than its box
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

use std::time::{Duration, Instant};

use crate::constants::{MARQUEE_IDLE_DELAY_SECS, MARQUEE_SPACER_PX, MARQUEE_SPEED_PX_PER_SEC};

/// Where to draw the text inside the box, relative to its left edge.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarqueeFrame {
    pub primary_x: f32,
    /// Wrapped copy following the primary one, only while scrolling
    pub trailing_x: Option<f32>,
}

impl MarqueeFrame {
    pub fn is_scrolling(&self) -> bool {
        self.trailing_x.is_some()
    }
}

impl Default for MarqueeFrame {
    fn default() -> Self {
        Self { primary_x: 0.0, trailing_x: None }
    }
}

/// Geometry of one scroll cycle. Copied into frame iterators.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Cycle {
    natural_width: f32,
    box_width: f32,
    idle_delay: Duration,
    speed: f32,
    spacer: f32,
}

impl Cycle {
    fn is_static(&self) -> bool {
        self.natural_width <= self.box_width || self.speed <= 0.0
    }

    /// Distance travelled before the copy lands where the original started
    fn length(&self) -> f32 {
        self.natural_width + self.spacer
    }

    fn frame_after(&self, elapsed: Duration) -> MarqueeFrame {
        if self.is_static() {
            return MarqueeFrame {
                primary_x: ((self.box_width - self.natural_width) / 2.0).max(0.0),
                trailing_x: None,
            };
        }

        let length = self.length();
        let travel = Duration::from_secs_f32(length / self.speed);
        let period = self.idle_delay + travel;
        let into_cycle = if period.is_zero() {
            Duration::ZERO
        } else {
            Duration::from_nanos((elapsed.as_nanos() % period.as_nanos()) as u64)
        };

        let offset = match into_cycle.checked_sub(self.idle_delay) {
            Some(moving) => (moving.as_secs_f32() * self.speed).min(length),
            None => 0.0,
        };

        MarqueeFrame {
            primary_x: -offset,
            trailing_x: Some(length - offset),
        }
    }
}

pub struct MarqueeRenderer {
    text: String,
    cycle: Cycle,
    started: Instant,
}

impl MarqueeRenderer {
    pub fn new(now: Instant) -> Self {
        Self {
            text: String::new(),
            cycle: Cycle {
                natural_width: 0.0,
                box_width: 0.0,
                idle_delay: Duration::from_secs(MARQUEE_IDLE_DELAY_SECS as u64),
                speed: MARQUEE_SPEED_PX_PER_SEC,
                spacer: MARQUEE_SPACER_PX,
            },
            started: now,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn box_width(&self) -> f32 {
        self.cycle.box_width
    }

    pub fn is_scrolling(&self) -> bool {
        !self.text.is_empty() && !self.cycle.is_static()
    }

    /// Set what to show. Only an actual change of text or box restarts the
    /// cycle; returns whether it did.
    pub fn set_content(&mut self, text: &str, natural_width: f32, box_width: f32, now: Instant) -> bool {
        let box_width = box_width.max(0.0);
        if self.text == text
            && self.cycle.natural_width == natural_width
            && self.cycle.box_width == box_width
        {
            return false;
        }
        self.text.clear();
        self.text.push_str(text);
        self.cycle.natural_width = natural_width;
        self.cycle.box_width = box_width;
        self.started = now;
        true
    }

    pub fn set_idle_delay(&mut self, delay: Duration, now: Instant) {
        self.cycle.idle_delay = delay;
        self.started = now;
    }

    pub fn frame_at(&self, now: Instant) -> MarqueeFrame {
        self.cycle.frame_after(now.saturating_duration_since(self.started))
    }

    /// Frames at `fps` starting from rest, forever.
    pub fn frames(&self, fps: u32) -> MarqueeFrames {
        MarqueeFrames { cycle: self.cycle, fps: fps.max(1), index: 0 }
    }
}

pub struct MarqueeFrames {
    cycle: Cycle,
    fps: u32,
    index: u64,
}

impl Iterator for MarqueeFrames {
    type Item = MarqueeFrame;

    fn next(&mut self) -> Option<MarqueeFrame> {
        let elapsed = Duration::from_secs_f64(self.index as f64 / self.fps as f64);
        self.index += 1;
        Some(self.cycle.frame_after(elapsed))
    }
}

/*
 *  status_item/negotiator.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Adaptive width negotiation with a host that hides items silently
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
//! The host never says "too wide". It just stops showing the item. So every
//! width we apply is followed by a quiet period, after which we ask the host
//! whether the item is visible. Hidden means the width was rejected and the
//! ceiling drops one step; visible means we settle.
//!
//! The negotiator is pure state. It does not talk to the host nor own a timer;
//! it returns a [`Commit`] whenever a width must be applied and a check
//! scheduled, and the controller does both.

use std::fmt;
use std::time::Duration;

use log::{debug, info, warn};

use crate::constants::{DEBOUNCE, ICON_ONLY_WIDTH, MARQUEE_MIN_TEXT_WIDTH, SHRINK_DECREMENT_PX};
use crate::prefs::WidthLimit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationPhase {
    /// Nothing pending, the committed width is believed accepted.
    Stable,
    /// A width was applied and its check has not run yet.
    Settling,
    /// The host hid the item at least once this episode.
    Shrinking,
}

impl fmt::Display for NegotiationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NegotiationPhase::Stable => write!(f, "stable"),
            NegotiationPhase::Settling => write!(f, "settling"),
            NegotiationPhase::Shrinking => write!(f, "shrinking"),
        }
    }
}

/// Identifies the commit a debounce check was scheduled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CheckToken {
    generation: u64,
}

impl CheckToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A width to apply now, plus the token of the check to schedule after it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Commit {
    pub width: f32,
    pub icon_only: bool,
    pub token: CheckToken,
}

/// Result of running a debounce check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckOutcome {
    /// Superseded or already settled, nothing changed
    Stale,
    /// Host shows the item, settled
    Accepted,
    /// Dynamic resizing is off, settled without asking the host
    Trusted,
    /// Host hid the item, a narrower width must be applied
    Shrunk(Commit),
    /// Hidden even as an icon, settled anyway
    GaveUp,
    /// Host could not be queried, settled with the ceiling kept
    HostUnavailable,
}

#[derive(Debug, Clone)]
pub struct NegotiatorConfig {
    pub decrement_px: f32,
    pub icon_width: f32,
    pub min_text_width: f32,
    pub debounce: Duration,
}

impl Default for NegotiatorConfig {
    fn default() -> Self {
        Self {
            decrement_px: SHRINK_DECREMENT_PX,
            icon_width: ICON_ONLY_WIDTH,
            min_text_width: MARQUEE_MIN_TEXT_WIDTH,
            debounce: DEBOUNCE,
        }
    }
}

/// Read-only view of the negotiation, for logging and tests.
#[derive(Debug, Clone, PartialEq)]
pub struct NegotiationSnapshot {
    pub phase: NegotiationPhase,
    pub desired: f32,
    pub max_width: WidthLimit,
    pub ceiling: f32,
    pub committed: f32,
    pub icon_only: bool,
    pub suppressed: bool,
    pub generation: u64,
    pub shrinks: u32,
}

pub struct WidthNegotiator {
    config: NegotiatorConfig,
    phase: NegotiationPhase,
    desired: f32,
    max_width: WidthLimit,
    ceiling: f32,
    committed: f32,
    icon_only: bool,
    suppress_feedback: bool,
    dynamic_resizing: bool,
    generation: u64,
    shrinks: u32,
}

impl WidthNegotiator {
    pub fn new(config: NegotiatorConfig, max_width: WidthLimit, dynamic_resizing: bool) -> Self {
        let icon_width = config.icon_width;
        Self {
            config,
            phase: NegotiationPhase::Stable,
            desired: icon_width,
            max_width,
            ceiling: f32::INFINITY,
            committed: icon_width,
            icon_only: false,
            suppress_feedback: false,
            dynamic_resizing,
            generation: 0,
            shrinks: 0,
        }
    }

    pub fn phase(&self) -> NegotiationPhase {
        self.phase
    }

    pub fn committed_width(&self) -> f32 {
        self.committed
    }

    pub fn desired_width(&self) -> f32 {
        self.desired
    }

    pub fn ceiling(&self) -> f32 {
        self.ceiling
    }

    pub fn max_width(&self) -> WidthLimit {
        self.max_width
    }

    pub fn is_icon_only(&self) -> bool {
        self.icon_only
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_feedback
    }

    pub fn dynamic_resizing(&self) -> bool {
        self.dynamic_resizing
    }

    pub fn debounce(&self) -> Duration {
        self.config.debounce
    }

    /// Step the ceiling drops by per rejection. Without dynamic resizing a
    /// single rejection takes the whole width.
    pub fn decrement_step(&self) -> f32 {
        if self.dynamic_resizing {
            self.config.decrement_px
        } else {
            self.committed
        }
    }

    /// Whether `token` belongs to the check currently awaited.
    pub fn is_current(&self, token: CheckToken) -> bool {
        token.generation == self.generation && self.phase != NegotiationPhase::Stable
    }

    pub fn snapshot(&self) -> NegotiationSnapshot {
        NegotiationSnapshot {
            phase: self.phase,
            desired: self.desired,
            max_width: self.max_width,
            ceiling: self.ceiling,
            committed: self.committed,
            icon_only: self.icon_only,
            suppressed: self.suppress_feedback,
            generation: self.generation,
            shrinks: self.shrinks,
        }
    }

    pub fn desired_width_changed(&mut self, width: f32) -> Commit {
        self.begin_episode_if_stable();
        self.desired = width.max(0.0);
        self.commit("desired width")
    }

    pub fn max_width_changed(&mut self, limit: WidthLimit) -> Commit {
        self.begin_episode_if_stable();
        self.max_width = limit;
        self.commit("max width")
    }

    /// Toggling dynamic resizing re-commits against the ceiling as it is.
    pub fn dynamic_resizing_changed(&mut self, enabled: bool) -> Commit {
        self.dynamic_resizing = enabled;
        self.commit("dynamic resizing")
    }

    /// An asynchronous visibility notification from the host. Returns a
    /// commit only when the report restarts negotiation.
    pub fn host_visibility_report(&mut self, hidden: bool) -> Option<Commit> {
        if self.suppress_feedback {
            debug!("Ignoring visibility report (hidden={}) during {}", hidden, self.phase);
            return None;
        }
        if !hidden {
            return None;
        }
        if !self.dynamic_resizing {
            debug!("Item hidden at {}px, dynamic resizing off", self.committed);
            return None;
        }
        info!("Host hid the item at {}px, renegotiating", self.committed);
        self.begin_episode_if_stable();
        Some(self.commit("host hid item"))
    }

    /// Run the debounce check for `token`. `query_hidden` is only called when
    /// the host's answer is actually needed; `None` means the host could
    /// not answer.
    pub fn debounce_elapsed<F>(&mut self, token: CheckToken, query_hidden: F) -> CheckOutcome
    where
        F: FnOnce() -> Option<bool>,
    {
        if !self.is_current(token) {
            debug!(
                "Stale check {} (current {}, {})",
                token.generation, self.generation, self.phase
            );
            return CheckOutcome::Stale;
        }

        if !self.dynamic_resizing {
            self.settle();
            info!("Width {}px applied, dynamic resizing off", self.committed);
            return CheckOutcome::Trusted;
        }

        match query_hidden() {
            None => {
                self.settle();
                debug!("Host unavailable for visibility check, keeping {}px", self.committed);
                CheckOutcome::HostUnavailable
            }
            Some(false) => {
                self.settle();
                // visible at a stable width, the search is over
                self.ceiling = f32::INFINITY;
                info!(
                    "Settled at {}px{} after {} shrink(s)",
                    self.committed,
                    if self.icon_only { " (icon only)" } else { "" },
                    self.shrinks
                );
                CheckOutcome::Accepted
            }
            Some(true) if self.icon_only => {
                self.settle();
                warn!(
                    "Host hides the item even at icon width {}px, giving up after {} shrink(s)",
                    self.committed, self.shrinks
                );
                CheckOutcome::GaveUp
            }
            Some(true) => {
                let step = self.decrement_step().max(1.0);
                let mut next = self.committed - self.committed % step;
                if next >= self.committed {
                    next -= step;
                }
                self.ceiling = self.ceiling.min(next.max(0.0));
                self.shrinks += 1;
                self.phase = NegotiationPhase::Shrinking;
                info!(
                    "Hidden at {}px, ceiling now {}px (shrink {})",
                    self.committed, self.ceiling, self.shrinks
                );
                CheckOutcome::Shrunk(self.commit("shrink"))
            }
        }
    }

    fn begin_episode_if_stable(&mut self) {
        if self.phase == NegotiationPhase::Stable {
            self.ceiling = f32::INFINITY;
            self.shrinks = 0;
        }
    }

    fn settle(&mut self) {
        self.suppress_feedback = false;
        self.phase = NegotiationPhase::Stable;
    }

    fn commit(&mut self, reason: &str) -> Commit {
        let clamped = self.desired.min(self.max_width.as_px()).min(self.ceiling);
        self.icon_only = clamped < self.config.min_text_width;
        self.committed = if self.icon_only { self.config.icon_width } else { clamped };

        self.generation += 1;
        self.suppress_feedback = true;
        if self.phase == NegotiationPhase::Stable {
            self.phase = NegotiationPhase::Settling;
        }
        debug!(
            "Commit {}px ({}, gen {}, desired {} max {} ceiling {})",
            self.committed, reason, self.generation, self.desired, self.max_width, self.ceiling
        );

        Commit {
            width: self.committed,
            icon_only: self.icon_only,
            token: CheckToken { generation: self.generation },
        }
    }
}

/*
 *  constants.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layout and timing constants shared by the status item components
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
//! This module contains global constants used across the status item and other modules.

use std::time::Duration;

/// Height of the host menu bar strip in pixels.
pub const MENU_BAR_HEIGHT: u32 = 22;

/// Width of the bar animation (icon) in pixels.
pub const BAR_ANIMATION_WIDTH: f32 = 14.0;
/// Height of the bar animation (icon) in pixels.
pub const BAR_ANIMATION_HEIGHT: f32 = 10.0;
/// Horizontal padding between the button edge, icon and text.
pub const STATUS_ITEM_PADDING: f32 = 8.0;

/// Width of the status item when only the icon is shown.
pub const ICON_ONLY_WIDTH: f32 = BAR_ANIMATION_WIDTH + 2.0 * STATUS_ITEM_PADDING;
/// Fixed chrome around the text: icon plus three paddings.
pub const TEXT_CHROME_WIDTH: f32 = BAR_ANIMATION_WIDTH + 3.0 * STATUS_ITEM_PADDING;

/// Below this clamped width the text is dropped and the item goes icon-only.
pub const MARQUEE_MIN_TEXT_WIDTH: f32 = 30.0;
/// Gap between the end of the text and its wrapped copy.
pub const MARQUEE_SPACER_PX: f32 = 16.0;
/// Constant scroll velocity.
pub const MARQUEE_SPEED_PX_PER_SEC: f32 = 30.0;
/// Default pause at the start of each scroll cycle.
pub const MARQUEE_IDLE_DELAY_SECS: u8 = 3;
/// Upper limit accepted for the marquee delay preference.
pub const MARQUEE_MAX_DELAY_SECS: u8 = 10;

/// Factory default for the maximum width preference.
pub const DEFAULT_MAX_WIDTH: f32 = 110.0;
/// Lowest value the maximum width slider goes to.
pub const MAX_WIDTH_SLIDER_MIN: f32 = 30.0;
/// Slider value meaning "no limit".
pub const MAX_WIDTH_UNBOUNDED_SENTINEL: f32 = 500.0;

/// How much the ceiling drops per rejected attempt with dynamic resizing on.
pub const SHRINK_DECREMENT_PX: f32 = 48.0;
/// Quiet period between applying a width and judging the host's reaction.
pub const DEBOUNCE: Duration = Duration::from_millis(500);

/// Joins title and artist when both are shown.
pub const TEXT_SEPARATOR: &str = " \u{2022} ";

/// Frame clock period for marquee and bar sampling (~30fps).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(33);

// playing bar animation, one entry per bar
pub const PLAYING_BAR_BASE_HEIGHTS: [f32; 4] = [7.0, 6.0, 9.0, 8.0];
pub const PLAYING_BAR_DURATIONS_SECS: [f32; 4] = [0.6, 0.3, 0.5, 0.7];
pub const PLAYING_BAR_WIDTH: f32 = 2.0;
pub const PLAYING_BAR_MIN_HEIGHT: f32 = 2.0;

// idle bars are static
pub const IDLE_BAR_COUNT: usize = 2;
pub const IDLE_BAR_WIDTH: f32 = 6.0;
pub const IDLE_BAR_SPACING: f32 = 8.0;

/*
 *  status_item/traits.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Trait definitions for the host status item abstraction
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

use crate::status_item::error::HostError;

/// What the host menu bar offers the widget
#[derive(Debug, Clone)]
pub struct HostCapabilities {
    /// Fixed strip height in pixels
    pub bar_height: u32,

    /// Whether the host can be asked if the item is currently occluded.
    /// Hosts without it never trigger the shrink search.
    pub supports_occlusion_query: bool,
}

/// Minimal host abstraction - the menu bar integration implements this
///
/// The host owns the real widget. It may hide the widget whenever it decides
/// the width is too large, and tells us only through visibility events and
/// the occlusion query below.
pub trait StatusItemHost {
    /// Returns the capabilities of this host
    fn capabilities(&self) -> &HostCapabilities;

    /// Whether the widget exists yet
    fn is_ready(&self) -> bool {
        true
    }

    /// Resize the widget to `width` pixels
    fn apply_width(&mut self, width: f32) -> Result<(), HostError>;

    /// Ask whether the host is currently force-hiding the widget
    fn is_force_hidden(&self) -> Result<bool, HostError>;

    /// Last width actually applied, if any
    fn current_width(&self) -> Option<f32>;
}

/*
 *  status_item/error.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Error types for the host widget seam
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

use std::error::Error;
use std::fmt;

/// Failures talking to the host status item. None of these are fatal; the
/// controller logs them and waits for the next event.
#[derive(Debug, Clone, PartialEq)]
pub enum HostError {
    /// The host widget has not been constructed yet
    NotReady,

    /// The widget is gone (e.g. removed from the menu bar)
    Detached,

    /// Width the host refused outright
    InvalidWidth(f32),

    /// Generic error with message
    Other(String),
}

impl HostError {
    /// Missing host resources: skip the operation quietly.
    pub fn is_missing_resource(&self) -> bool {
        matches!(self, HostError::NotReady | HostError::Detached)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NotReady =>
                write!(f, "Status item not constructed yet"),
            HostError::Detached =>
                write!(f, "Status item detached from the menu bar"),
            HostError::InvalidWidth(w) =>
                write!(f, "Host rejected width {}", w),
            HostError::Other(msg) =>
                write!(f, "{}", msg),
        }
    }
}

impl Error for HostError {}

/*
 *  status_item/mod.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Status item subsystem: width negotiation, marquee, bar icon and hosts
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

pub mod canvas;
pub mod controller;
pub mod error;
pub mod hosts;
pub mod marquee;
pub mod measure;
pub mod negotiator;
pub mod presence;
pub mod scheduler;
pub mod traits;

pub use canvas::StatusItemCanvas;
pub use controller::{RenderView, StatusItemController};
pub use error::HostError;
pub use hosts::{MockHost, SimulatedHost};
pub use marquee::{MarqueeFrame, MarqueeRenderer};
pub use measure::{FixedAdvanceMeasure, MonoFontMeasure, TextMeasure};
pub use negotiator::{CheckOutcome, CheckToken, Commit, NegotiationPhase, NegotiatorConfig, WidthNegotiator};
pub use presence::{AnimationPhase, BarAnimation, BarGeometry, PresenceAnimator};
pub use scheduler::{CheckScheduler, ManualScheduler, TokioScheduler};
pub use traits::{HostCapabilities, StatusItemHost};

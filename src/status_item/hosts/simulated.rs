/*
 *  status_item/hosts/simulated.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Simulated menu bar with limited room for the item
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
//! Behaves the way a crowded menu bar does: any width above the free room is
//! silently hidden. Every resize also echoes a visibility notification back
//! onto the bus, which is exactly the self-induced churn the negotiator has
//! to ignore. Spurious notifications can be sprinkled in on top.

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::events::{Event, EventBus};
use crate::status_item::error::HostError;
use crate::status_item::traits::{HostCapabilities, StatusItemHost};

pub struct SimulatedHost {
    capabilities: HostCapabilities,
    bus: EventBus,
    capacity_px: f32,
    width: Option<f32>,
    spurious_rate: f64,
    rng: StdRng,
}

impl SimulatedHost {
    /// `capacity_px` is the free room in the bar, `None` for unlimited.
    /// `spurious_rate` is the chance per resize of an extra bogus notification.
    pub fn new(bus: EventBus, bar_height: u32, capacity_px: Option<f32>, spurious_rate: f64, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            capabilities: HostCapabilities {
                bar_height,
                supports_occlusion_query: true,
            },
            bus,
            capacity_px: capacity_px.unwrap_or(f32::INFINITY),
            width: None,
            spurious_rate: spurious_rate.clamp(0.0, 1.0),
            rng,
        }
    }

    pub fn capacity(&self) -> f32 {
        self.capacity_px
    }

    fn hidden_at(&self, width: f32) -> bool {
        width > self.capacity_px
    }
}

impl StatusItemHost for SimulatedHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn apply_width(&mut self, width: f32) -> Result<(), HostError> {
        if !width.is_finite() || width < 0.0 {
            return Err(HostError::InvalidWidth(width));
        }
        // nobody left to hear about the resize, the bar is gone
        if self.bus.subscriber_count() == 0 {
            info!("Simulated host has no listeners, {}px dropped", width);
            return Err(HostError::Detached);
        }
        self.width = Some(width);
        let visible = !self.hidden_at(width);
        debug!("Simulated host sized to {}px, visible={}", width, visible);

        self.bus.publish(Event::HostVisibilityChanged { visible });
        if self.spurious_rate > 0.0 && self.rng.random_bool(self.spurious_rate) {
            debug!("Simulated host emitting spurious notification");
            self.bus.publish(Event::HostVisibilityChanged { visible: !visible });
        }
        Ok(())
    }

    fn is_force_hidden(&self) -> Result<bool, HostError> {
        match self.width {
            Some(width) => Ok(self.hidden_at(width)),
            None => Err(HostError::NotReady),
        }
    }

    fn current_width(&self) -> Option<f32> {
        self.width
    }
}

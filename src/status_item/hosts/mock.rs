/*
 *  status_item/hosts/mock.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Mock status item host for testing
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

use std::sync::{Arc, Mutex};

use crate::constants::MENU_BAR_HEIGHT;
use crate::status_item::error::HostError;
use crate::status_item::traits::{HostCapabilities, StatusItemHost};

/// Mock host for testing
///
/// Records every width applied and answers the occlusion query from a simple
/// policy: anything wider than `accept_up_to` is hidden. The state is shared
/// so a test can keep a handle after the host moves into the controller.
#[derive(Debug, Clone)]
pub struct MockHost {
    capabilities: HostCapabilities,
    state: Arc<Mutex<MockHostState>>,
}

/// Internal state for the mock host (shared for inspection in tests)
#[derive(Debug, Default)]
pub struct MockHostState {
    /// Every width passed to apply_width, in order
    pub applied: Vec<f32>,

    /// Number of occlusion queries answered
    pub query_count: usize,

    /// Widest width the host shows; `None` shows everything
    pub accept_up_to: Option<f32>,

    /// Hide regardless of width
    pub force_hidden: bool,

    /// Simulate a widget that has not been constructed yet
    pub not_ready: bool,

    /// Simulate failures (for error testing)
    pub simulate_apply_failure: bool,
}

impl MockHost {
    pub fn new() -> Self {
        Self {
            capabilities: HostCapabilities {
                bar_height: MENU_BAR_HEIGHT,
                supports_occlusion_query: true,
            },
            state: Arc::new(Mutex::new(MockHostState::default())),
        }
    }

    /// Host that hides anything wider than `threshold`
    pub fn with_threshold(threshold: f32) -> Self {
        let host = Self::new();
        host.state.lock().unwrap().accept_up_to = Some(threshold);
        host
    }

    /// Get reference to state for inspection in tests
    pub fn state(&self) -> Arc<Mutex<MockHostState>> {
        Arc::clone(&self.state)
    }

    pub fn applied(&self) -> Vec<f32> {
        self.state.lock().unwrap().applied.clone()
    }

    pub fn apply_count(&self) -> usize {
        self.state.lock().unwrap().applied.len()
    }

    pub fn set_threshold(&self, threshold: Option<f32>) {
        self.state.lock().unwrap().accept_up_to = threshold;
    }

    pub fn set_ready(&self, ready: bool) {
        self.state.lock().unwrap().not_ready = !ready;
    }
}

impl Default for MockHost {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusItemHost for MockHost {
    fn capabilities(&self) -> &HostCapabilities {
        &self.capabilities
    }

    fn is_ready(&self) -> bool {
        !self.state.lock().unwrap().not_ready
    }

    fn apply_width(&mut self, width: f32) -> Result<(), HostError> {
        let mut state = self.state.lock().unwrap();
        if state.not_ready {
            return Err(HostError::NotReady);
        }
        if state.simulate_apply_failure {
            return Err(HostError::Other("Simulated apply failure".to_string()));
        }
        state.applied.push(width);
        Ok(())
    }

    fn is_force_hidden(&self) -> Result<bool, HostError> {
        let mut state = self.state.lock().unwrap();
        if state.not_ready {
            return Err(HostError::NotReady);
        }
        state.query_count += 1;
        let width = state.applied.last().copied().unwrap_or(0.0);
        Ok(state.force_hidden || state.accept_up_to.is_some_and(|limit| width > limit))
    }

    fn current_width(&self) -> Option<f32> {
        self.state.lock().unwrap().applied.last().copied()
    }
}

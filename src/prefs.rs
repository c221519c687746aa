/*
 *  prefs.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Display preferences and the typed preference change events
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

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;

use crate::constants::{
    DEFAULT_MAX_WIDTH, MARQUEE_IDLE_DELAY_SECS, MARQUEE_MAX_DELAY_SECS,
    MAX_WIDTH_SLIDER_MIN, MAX_WIDTH_UNBOUNDED_SENTINEL,
};
use crate::events::EventError;

/// User configured upper bound on the status item width.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawWidthLimit", into = "RawWidthLimit")]
pub enum WidthLimit {
    Bounded(f32),
    Unbounded,
}

impl WidthLimit {
    /// Map a slider value onto a limit. The top of the slider is the
    /// unbounded sentinel, everything else is floored to whole pixels.
    pub fn from_slider(value: f32) -> Self {
        if !value.is_finite() || value >= MAX_WIDTH_UNBOUNDED_SENTINEL {
            WidthLimit::Unbounded
        } else {
            WidthLimit::Bounded(value.floor().max(MAX_WIDTH_SLIDER_MIN))
        }
    }

    /// Limit in pixels, `f32::INFINITY` when unbounded.
    pub fn as_px(&self) -> f32 {
        match self {
            WidthLimit::Bounded(px) => *px,
            WidthLimit::Unbounded => f32::INFINITY,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, WidthLimit::Unbounded)
    }
}

impl Default for WidthLimit {
    fn default() -> Self {
        WidthLimit::Bounded(DEFAULT_MAX_WIDTH)
    }
}

impl fmt::Display for WidthLimit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WidthLimit::Bounded(px) => write!(f, "{:.0} px", px),
            WidthLimit::Unbounded => write!(f, "unbounded"),
        }
    }
}

impl std::str::FromStr for WidthLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unbounded" | "infinite" | "inf" => Ok(WidthLimit::Unbounded),
            other => other
                .parse::<f32>()
                .map(WidthLimit::from_slider)
                .map_err(|_| format!("'{}' is neither a width nor 'unbounded'", s)),
        }
    }
}

/// Wire form of `WidthLimit`: a slider number or a word.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum RawWidthLimit {
    Number(f32),
    Word(String),
}

impl TryFrom<RawWidthLimit> for WidthLimit {
    type Error = String;

    fn try_from(raw: RawWidthLimit) -> Result<Self, Self::Error> {
        match raw {
            RawWidthLimit::Number(n) => Ok(WidthLimit::from_slider(n)),
            RawWidthLimit::Word(w) => w.parse(),
        }
    }
}

impl From<WidthLimit> for RawWidthLimit {
    fn from(limit: WidthLimit) -> Self {
        match limit {
            WidthLimit::Bounded(px) => RawWidthLimit::Number(px),
            WidthLimit::Unbounded => RawWidthLimit::Word("unbounded".to_string()),
        }
    }
}

/// Preferences that influence what text is shown and how wide the item may be.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayPreferences {
    pub show_title: bool,
    pub show_artist: bool,
    pub ignore_parentheses: bool,
    pub dynamic_resizing: bool,
    pub max_width: WidthLimit,
    pub marquee_delay_secs: u8,
}

impl Default for DisplayPreferences {
    fn default() -> Self {
        Self {
            show_title: true,
            show_artist: false,
            ignore_parentheses: false,
            dynamic_resizing: true,
            max_width: WidthLimit::default(),
            marquee_delay_secs: MARQUEE_IDLE_DELAY_SECS,
        }
    }
}

impl DisplayPreferences {
    pub fn marquee_delay(&self) -> Duration {
        Duration::from_secs(self.marquee_delay_secs as u64)
    }

    /// Fold a change into the preferences. Returns false when nothing moved.
    pub fn apply(&mut self, change: &PreferenceChange) -> bool {
        match *change {
            PreferenceChange::ShowTitle(v) => replace(&mut self.show_title, v),
            PreferenceChange::ShowArtist(v) => replace(&mut self.show_artist, v),
            PreferenceChange::IgnoreParentheses(v) => replace(&mut self.ignore_parentheses, v),
            PreferenceChange::DynamicResizing(v) => replace(&mut self.dynamic_resizing, v),
            PreferenceChange::MaxWidth(v) => replace(&mut self.max_width, v),
            PreferenceChange::MarqueeDelay(v) => {
                replace(&mut self.marquee_delay_secs, v.min(MARQUEE_MAX_DELAY_SECS))
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// A single preference edit, as delivered by the preferences store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreferenceChange {
    ShowTitle(bool),
    ShowArtist(bool),
    IgnoreParentheses(bool),
    DynamicResizing(bool),
    MaxWidth(WidthLimit),
    MarqueeDelay(u8),
}

impl PreferenceChange {
    /// Decode a string keyed `{ key, value }` pair into a typed change.
    pub fn from_key_value(key: &str, value: &Value) -> Result<Self, EventError> {
        let invalid = || EventError::InvalidPreferenceValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        let as_bool = || value.as_bool().ok_or_else(invalid);

        match key {
            "show-title" => Ok(PreferenceChange::ShowTitle(as_bool()?)),
            "show-artist" => Ok(PreferenceChange::ShowArtist(as_bool()?)),
            "ignore-parentheses" => Ok(PreferenceChange::IgnoreParentheses(as_bool()?)),
            "dynamic-resizing-enabled" => Ok(PreferenceChange::DynamicResizing(as_bool()?)),
            "max-width-limit" => {
                let limit = match value {
                    Value::Number(n) => n.as_f64().map(|v| WidthLimit::from_slider(v as f32)),
                    Value::String(s) => s.parse().ok(),
                    _ => None,
                };
                limit.map(PreferenceChange::MaxWidth).ok_or_else(invalid)
            }
            "marquee-delay" => value
                .as_u64()
                .filter(|secs| *secs <= MARQUEE_MAX_DELAY_SECS as u64)
                .map(|secs| PreferenceChange::MarqueeDelay(secs as u8))
                .ok_or_else(invalid),
            other => Err(EventError::UnknownPreference(other.to_string())),
        }
    }

    /// Changes that alter the formatted text rather than the width bounds.
    pub fn affects_text(&self) -> bool {
        matches!(
            self,
            PreferenceChange::ShowTitle(_)
                | PreferenceChange::ShowArtist(_)
                | PreferenceChange::IgnoreParentheses(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_slider_sentinel_is_unbounded() {
        assert_eq!(WidthLimit::from_slider(500.0), WidthLimit::Unbounded);
        assert_eq!(WidthLimit::from_slider(f32::INFINITY), WidthLimit::Unbounded);
        assert_eq!(WidthLimit::from_slider(110.7), WidthLimit::Bounded(110.0));
        // below the slider range snaps up to its minimum
        assert_eq!(WidthLimit::from_slider(12.0), WidthLimit::Bounded(30.0));
        assert_eq!(WidthLimit::Unbounded.as_px(), f32::INFINITY);
    }

    #[test]
    fn test_width_limit_serde_forms() {
        let limit: WidthLimit = serde_json::from_value(json!(250)).unwrap();
        assert_eq!(limit, WidthLimit::Bounded(250.0));
        let limit: WidthLimit = serde_json::from_value(json!("unbounded")).unwrap();
        assert_eq!(limit, WidthLimit::Unbounded);
        let limit: WidthLimit = serde_json::from_value(json!(500)).unwrap();
        assert_eq!(limit, WidthLimit::Unbounded);
        assert!(serde_json::from_value::<WidthLimit>(json!("wide")).is_err());

        assert_eq!(serde_json::to_value(WidthLimit::Unbounded).unwrap(), json!("unbounded"));
    }

    #[test]
    fn test_defaults_match_factory_settings() {
        let prefs = DisplayPreferences::default();
        assert!(prefs.show_title);
        assert!(!prefs.show_artist);
        assert!(!prefs.ignore_parentheses);
        assert!(prefs.dynamic_resizing);
        assert_eq!(prefs.max_width, WidthLimit::Bounded(110.0));
        assert_eq!(prefs.marquee_delay(), Duration::from_secs(3));
    }

    #[test]
    fn test_key_value_decoding() {
        assert_eq!(
            PreferenceChange::from_key_value("show-artist", &json!(true)).unwrap(),
            PreferenceChange::ShowArtist(true)
        );
        assert_eq!(
            PreferenceChange::from_key_value("max-width-limit", &json!(500)).unwrap(),
            PreferenceChange::MaxWidth(WidthLimit::Unbounded)
        );
        assert_eq!(
            PreferenceChange::from_key_value("max-width-limit", &json!(180.4)).unwrap(),
            PreferenceChange::MaxWidth(WidthLimit::Bounded(180.0))
        );
        assert_eq!(
            PreferenceChange::from_key_value("marquee-delay", &json!(5)).unwrap(),
            PreferenceChange::MarqueeDelay(5)
        );
    }

    #[test]
    fn test_key_value_rejects_bad_input() {
        assert!(matches!(
            PreferenceChange::from_key_value("theme", &json!("dark")),
            Err(EventError::UnknownPreference(_))
        ));
        assert!(matches!(
            PreferenceChange::from_key_value("show-title", &json!("yes")),
            Err(EventError::InvalidPreferenceValue { .. })
        ));
        assert!(PreferenceChange::from_key_value("marquee-delay", &json!(42)).is_err());
    }

    #[test]
    fn test_apply_reports_changes() {
        let mut prefs = DisplayPreferences::default();
        assert!(!prefs.apply(&PreferenceChange::ShowTitle(true)));
        assert!(prefs.apply(&PreferenceChange::ShowArtist(true)));
        assert!(prefs.show_artist);
        assert!(prefs.apply(&PreferenceChange::MaxWidth(WidthLimit::Unbounded)));
        assert!(prefs.max_width.is_unbounded());
    }
}

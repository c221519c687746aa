/*
 *  config.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Layered configuration: defaults, YAML file, then command line
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

use clap::{ArgAction, Parser, ValueHint};
use dirs_next::home_dir;
use serde::{Deserialize, Serialize};
use std::{fs, path::{Path, PathBuf}};
use thiserror::Error;

use crate::constants::{MARQUEE_MAX_DELAY_SECS, MENU_BAR_HEIGHT};
use crate::prefs::{DisplayPreferences, WidthLimit};

/// Error type for config loading/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

/// Top-level app configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// General options
    pub log_level: Option<String>, // e.g., "info" | "debug"
    /// draw frames to the terminal as ASCII
    pub preview: Option<bool>,
    /// keep the latest frame in this PBM file
    pub preview_pbm: Option<String>,
    pub preferences: Option<PreferencesConfig>,
    pub host: Option<HostConfig>,
    pub feed: Option<FeedConfig>,
}

/// Display preferences as persisted; unset fields keep the factory default.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreferencesConfig {
    pub show_title: Option<bool>,
    pub show_artist: Option<bool>,
    pub ignore_parentheses: Option<bool>,
    pub dynamic_resizing: Option<bool>,
    pub max_width: Option<WidthLimit>, // number, or "unbounded"
    pub marquee_delay_secs: Option<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HostConfig {
    /// free room in the simulated menu bar, unset = unlimited
    pub capacity_px: Option<f32>,
    /// chance per resize of a bogus visibility notification, 0..=1
    pub spurious_rate: Option<f64>,
    pub bar_height: Option<u32>,
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FeedConfig {
    /// JSON lines file, "-" for stdin
    pub path: Option<String>,
    pub demo: Option<bool>,
    pub demo_interval_secs: Option<u64>,
}

impl Config {
    pub fn display_preferences(&self) -> DisplayPreferences {
        let mut prefs = DisplayPreferences::default();
        if let Some(p) = self.preferences.as_ref() {
            if let Some(v) = p.show_title         { prefs.show_title = v; }
            if let Some(v) = p.show_artist        { prefs.show_artist = v; }
            if let Some(v) = p.ignore_parentheses { prefs.ignore_parentheses = v; }
            if let Some(v) = p.dynamic_resizing   { prefs.dynamic_resizing = v; }
            if let Some(v) = p.max_width          { prefs.max_width = v; }
            if let Some(v) = p.marquee_delay_secs { prefs.marquee_delay_secs = v; }
        }
        prefs
    }

    pub fn bar_height(&self) -> u32 {
        self.host.as_ref().and_then(|h| h.bar_height).unwrap_or(MENU_BAR_HEIGHT)
    }

    pub fn preview(&self) -> bool {
        self.preview.unwrap_or(false)
    }

    pub fn preview_pbm(&self) -> Option<&str> {
        self.preview_pbm.as_deref().filter(|p| !p.is_empty())
    }
}

/// CLI overrides. All fields are Options so we can layer them over YAML.
#[derive(Debug, Parser, Clone)]
#[command(name = "nowbar", version, about = "Now playing, in the menu bar")]
pub struct Cli {
    /// Path to a YAML config file (overrides search)
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,
    /// shorthand for --log-level debug
    #[arg(short = 'v', long, action = ArgAction::SetTrue)]
    pub debug: bool,
    #[arg(long)]
    pub log_level: Option<String>,
    /// JSON lines playback feed, "-" for stdin
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub feed: Option<String>,
    /// cycle a canned playlist instead of reading a feed
    #[arg(long, action = ArgAction::SetTrue)]
    pub demo: bool,
    /// draw frames to the terminal
    #[arg(long, action = ArgAction::SetTrue)]
    pub preview: bool,
    /// write each new frame to a PBM image
    #[arg(long, value_hint = ValueHint::FilePath)]
    pub pbm: Option<String>,
    /// pixel limit or "unbounded"
    #[arg(long)]
    pub max_width: Option<WidthLimit>,
    #[arg(long, action = ArgAction::Set)]
    pub show_title: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub show_artist: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub ignore_parentheses: Option<bool>,
    #[arg(long, action = ArgAction::Set)]
    pub dynamic_resizing: Option<bool>,
    #[arg(long)]
    pub marquee_delay: Option<u8>,
    /// free room in the simulated menu bar
    #[arg(long)]
    pub host_capacity: Option<f32>,
    /// dump fully merged config (after overrides) and exit
    #[arg(long, action = ArgAction::SetTrue)]
    pub dump_config: bool,
}

/// Public entry point: parse CLI, read YAML, merge, validate.
pub fn load() -> Result<Config, ConfigError> {
    let cli = Cli::parse();
    let cfg = load_with(&cli)?;

    if cli.dump_config {
        // Pretty YAML of effective config (nice for debugging)
        let s = serde_yaml::to_string(&cfg)?;
        println!("{s}");
        std::process::exit(0);
    }

    Ok(cfg)
}

/// Everything `load` does short of parsing argv and dumping.
pub fn load_with(cli: &Cli) -> Result<Config, ConfigError> {
    // 1) defaults (from `Default` impl)
    let mut cfg = Config::default();

    // 2) YAML file (explicit path or search)
    if let Some(p) = cli.config.as_ref() {
        if p.exists() {
            let y = read_yaml(p)?;
            merge(&mut cfg, y);
        } else {
            return Err(ConfigError::Validation(format!(
                "Config file not found: {}",
                p.display()
            )));
        }
    } else if let Some(p) = find_config_file() {
        let y = read_yaml(&p)?;
        merge(&mut cfg, y);
    }

    // 3) CLI overrides (highest precedence)
    apply_cli_overrides(&mut cfg, cli);

    // 4) Validate
    validate(&cfg)?;
    Ok(cfg)
}

/// Try common locations in order (first hit wins).
fn find_config_file() -> Option<PathBuf> {
    // XDG-style: ~/.config/nowbar/config.yaml
    if let Some(home) = home_dir() {
        let p = home.join(".config/nowbar/config.yaml");
        if p.exists() { return Some(p) }
        let p = home.join(".config/nowbar.yaml");
        if p.exists() { return Some(p) }
    }
    // project local
    for candidate in &["nowbar.yaml", "config/nowbar.yaml"] {
        let p = PathBuf::from(candidate);
        if p.exists() { return Some(p) }
    }
    None
}

fn read_yaml(path: &Path) -> Result<Config, ConfigError> {
    let s = fs::read_to_string(path)?;
    parse_yaml(&s)
}

pub fn parse_yaml(s: &str) -> Result<Config, ConfigError> {
    let cfg: Config = serde_yaml::from_str(s)?;
    Ok(cfg)
}

/// Shallow merge `src` into `dst`, Option-by-Option.
fn merge(dst: &mut Config, src: Config) {
    // top-level
    if src.log_level.is_some() { dst.log_level = src.log_level; }
    if src.preview.is_some()   { dst.preview = src.preview; }
    if src.preview_pbm.is_some() { dst.preview_pbm = src.preview_pbm; }
    match (&mut dst.preferences, src.preferences) {
        (None, Some(p)) => dst.preferences = Some(p),
        (Some(d), Some(s)) => merge_preferences(d, s),
        _ => {}
    }
    match (&mut dst.host, src.host) {
        (None, Some(h)) => dst.host = Some(h),
        (Some(d), Some(s)) => merge_host(d, s),
        _ => {}
    }
    match (&mut dst.feed, src.feed) {
        (None, Some(f)) => dst.feed = Some(f),
        (Some(d), Some(s)) => merge_feed(d, s),
        _ => {}
    }
}

fn merge_preferences(dst: &mut PreferencesConfig, src: PreferencesConfig) {
    if src.show_title.is_some()         { dst.show_title = src.show_title; }
    if src.show_artist.is_some()        { dst.show_artist = src.show_artist; }
    if src.ignore_parentheses.is_some() { dst.ignore_parentheses = src.ignore_parentheses; }
    if src.dynamic_resizing.is_some()   { dst.dynamic_resizing = src.dynamic_resizing; }
    if src.max_width.is_some()          { dst.max_width = src.max_width; }
    if src.marquee_delay_secs.is_some() { dst.marquee_delay_secs = src.marquee_delay_secs; }
}

fn merge_host(dst: &mut HostConfig, src: HostConfig) {
    if src.capacity_px.is_some()   { dst.capacity_px = src.capacity_px; }
    if src.spurious_rate.is_some() { dst.spurious_rate = src.spurious_rate; }
    if src.bar_height.is_some()    { dst.bar_height = src.bar_height; }
    if src.seed.is_some()          { dst.seed = src.seed; }
}

fn merge_feed(dst: &mut FeedConfig, src: FeedConfig) {
    if src.path.is_some()               { dst.path = src.path; }
    if src.demo.is_some()               { dst.demo = src.demo; }
    if src.demo_interval_secs.is_some() { dst.demo_interval_secs = src.demo_interval_secs; }
}

fn apply_cli_overrides(cfg: &mut Config, cli: &Cli) {
    if cli.log_level.is_some() { cfg.log_level = cli.log_level.clone(); }
    if cli.debug               { cfg.log_level = Some("debug".to_string()); }
    if cli.preview             { cfg.preview = Some(true); }
    if cli.pbm.is_some()       { cfg.preview_pbm = cli.pbm.clone(); }

    let any_pref = cli.max_width.is_some()
        || cli.show_title.is_some()
        || cli.show_artist.is_some()
        || cli.ignore_parentheses.is_some()
        || cli.dynamic_resizing.is_some()
        || cli.marquee_delay.is_some();
    if any_pref {
        let prefs = cfg.preferences.get_or_insert_with(PreferencesConfig::default);
        if cli.max_width.is_some()          { prefs.max_width = cli.max_width; }
        if cli.show_title.is_some()         { prefs.show_title = cli.show_title; }
        if cli.show_artist.is_some()        { prefs.show_artist = cli.show_artist; }
        if cli.ignore_parentheses.is_some() { prefs.ignore_parentheses = cli.ignore_parentheses; }
        if cli.dynamic_resizing.is_some()   { prefs.dynamic_resizing = cli.dynamic_resizing; }
        if cli.marquee_delay.is_some()      { prefs.marquee_delay_secs = cli.marquee_delay; }
    }

    if cli.host_capacity.is_some() {
        cfg.host.get_or_insert_with(HostConfig::default).capacity_px = cli.host_capacity;
    }

    if cli.feed.is_some() || cli.demo {
        let feed = cfg.feed.get_or_insert_with(FeedConfig::default);
        if cli.feed.is_some() { feed.path = cli.feed.clone(); }
        if cli.demo           { feed.demo = Some(true); }
    }
}

/// Put any invariants here (required fields, ranges, etc.)
fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if let Some(level) = cfg.log_level.as_deref() {
        match level {
            "error" | "warn" | "info" | "debug" | "trace" | "off" => {}
            _ => return Err(ConfigError::Validation(format!("unknown log_level '{}'", level))),
        }
    }
    if let Some(prefs) = cfg.preferences.as_ref() {
        if let Some(d) = prefs.marquee_delay_secs {
            if d > MARQUEE_MAX_DELAY_SECS {
                return Err(ConfigError::Validation(format!(
                    "marquee_delay_secs must be 0..={}", MARQUEE_MAX_DELAY_SECS
                )));
            }
        }
        if let Some(WidthLimit::Bounded(px)) = prefs.max_width {
            if !(px > 0.0) {
                return Err(ConfigError::Validation("max_width must be > 0".into()));
            }
        }
    }
    if let Some(host) = cfg.host.as_ref() {
        if let Some(c) = host.capacity_px {
            if !c.is_finite() || c < 0.0 {
                return Err(ConfigError::Validation("host capacity_px must be >= 0".into()));
            }
        }
        if let Some(r) = host.spurious_rate {
            if !(0.0..=1.0).contains(&r) {
                return Err(ConfigError::Validation("host spurious_rate must be 0..=1".into()));
            }
        }
        if host.bar_height == Some(0) {
            return Err(ConfigError::Validation("host bar_height must be > 0".into()));
        }
    }
    if let Some(feed) = cfg.feed.as_ref() {
        if feed.demo_interval_secs == Some(0) {
            return Err(ConfigError::Validation("feed demo_interval_secs must be > 0".into()));
        }
    }
    Ok(())
}

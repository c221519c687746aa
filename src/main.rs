/*
 *  main.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Binary entry point: config, logging, host and event loop
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

use anyhow::Context;
use env_logger::Env;
use log::{info, warn};

use nowbar::config;
use nowbar::constants::FRAME_INTERVAL;
use nowbar::events::EventBus;
use nowbar::runtime::{self, FramePreview};
use nowbar::status_item::{MonoFontMeasure, SimulatedHost, StatusItemController, TokioScheduler};

include!(concat!(env!("OUT_DIR"), "/build_info.rs"));

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cfg = config::load().context("loading configuration")?;

    // Initialize the logger with the appropriate level based on debug flag
    let level = cfg.log_level.clone().unwrap_or_else(|| "info".to_string());
    env_logger::Builder::from_env(Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();

    info!("{} - now playing, in the menu bar", env!("CARGO_PKG_NAME"));
    info!("v.{} ({}) built {}", env!("CARGO_PKG_VERSION"), BUILD_PROFILE, BUILD_DATE);

    let bus = EventBus::new();
    let prefs = cfg.display_preferences();
    info!(
        "Preferences: title={} artist={} strip parens={} dynamic={} max width {}",
        prefs.show_title, prefs.show_artist, prefs.ignore_parentheses, prefs.dynamic_resizing, prefs.max_width
    );

    let host_cfg = cfg.host.clone().unwrap_or_default();
    let host = SimulatedHost::new(
        bus.clone(),
        cfg.bar_height(),
        host_cfg.capacity_px,
        host_cfg.spurious_rate.unwrap_or(0.0),
        host_cfg.seed,
    );
    if host.capacity().is_finite() {
        info!("Simulated menu bar room {}px", host.capacity());
    }

    // subscribe before any producer can publish
    let subscription = bus.subscribe();

    let measure = MonoFontMeasure::default();
    let font = measure.font();
    let now = tokio::time::Instant::now().into_std();
    let mut controller = StatusItemController::new(prefs, host, TokioScheduler::new(bus.clone()), measure, now);
    controller.start(now);

    let signals = runtime::spawn_signal_handler(bus.clone());
    let feed_cfg = cfg.feed.clone().unwrap_or_default();
    let source = runtime::spawn_playback_source(&feed_cfg, bus.clone())
        .await
        .context("opening playback feed")?;

    let mut preview = (cfg.preview() || cfg.preview_pbm().is_some()).then(|| {
        let preview = FramePreview::new(font, cfg.bar_height(), cfg.preview().then(std::io::stdout));
        match cfg.preview_pbm() {
            Some(path) => {
                info!("Writing frames to {}", path);
                preview.with_pbm(path)
            }
            None => preview,
        }
    });

    runtime::run_event_loop(&mut controller, subscription, FRAME_INTERVAL, |view| {
        if let Some(p) = preview.as_mut() {
            if let Err(e) = p.show(view) {
                warn!("Preview disabled: {}", e);
                preview = None;
            }
        }
    })
    .await;

    source.abort();
    signals.abort();
    info!("Shutdown complete");

    Ok(())
}

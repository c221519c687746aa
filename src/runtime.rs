/*
 *  runtime.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Event loop, signal handling and playback source wiring
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

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::time::Duration;

use embedded_graphics::mono_font::MonoFont;
use log::{debug, error, info};
use tokio::io::BufReader;
use tokio::signal::unix::{signal, SignalKind};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

use crate::config::FeedConfig;
use crate::events::{Event, EventBus, Subscription};
use crate::playback::{spawn_demo_playlist, spawn_feed};
use crate::status_item::canvas::StatusItemCanvas;
use crate::status_item::controller::{RenderView, StatusItemController};
use crate::status_item::measure::TextMeasure;
use crate::status_item::scheduler::CheckScheduler;
use crate::status_item::traits::StatusItemHost;

const DEFAULT_DEMO_INTERVAL_SECS: u64 = 12;

/// Asynchronously waits for a SIGINT, SIGTERM, or SIGHUP signal.
pub async fn signal_handler() -> io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    tokio::select! {
        _ = sigint.recv() => {
            info!("SIGINT received. Initiating graceful shutdown.");
        }
        _ = sigterm.recv() => {
            info!("SIGTERM received. Initiating graceful shutdown.");
        }
        _ = sighup.recv() => {
            info!("SIGHUP received. Initiating graceful shutdown.");
        }
    }
    Ok(())
}

/// Turn the first termination signal into a `Shutdown` on the bus.
pub fn spawn_signal_handler(bus: EventBus) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(e) = signal_handler().await {
            error!("Signal handler failed to install: {}", e);
            return;
        }
        bus.publish(Event::Shutdown);
    })
}

/// Start whichever playback source the config asks for: demo playlist,
/// a JSON lines file, or stdin.
pub async fn spawn_playback_source(feed: &FeedConfig, bus: EventBus) -> io::Result<JoinHandle<()>> {
    if feed.demo.unwrap_or(false) {
        let secs = feed.demo_interval_secs.unwrap_or(DEFAULT_DEMO_INTERVAL_SECS);
        info!("Playback source: demo playlist every {}s", secs);
        return Ok(spawn_demo_playlist(bus, Duration::from_secs(secs)));
    }
    match feed.path.as_deref() {
        None | Some("-") => {
            info!("Playback source: stdin");
            Ok(spawn_feed(BufReader::new(tokio::io::stdin()), bus))
        }
        Some(path) => {
            info!("Playback source: {}", path);
            let file = tokio::fs::File::open(path).await?;
            Ok(spawn_feed(BufReader::new(file), bus))
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub events: u64,
    pub frames: u64,
}

/// Drive the controller until `Shutdown` or until every publisher is gone.
/// Events and frame ticks are handled on this one task only.
pub async fn run_event_loop<H, S, M, F>(
    controller: &mut StatusItemController<H, S, M>,
    mut subscription: Subscription,
    frame_interval: Duration,
    mut on_frame: F,
) -> LoopStats
where
    H: StatusItemHost,
    S: CheckScheduler,
    M: TextMeasure,
    F: FnMut(&RenderView),
{
    let mut stats = LoopStats::default();
    let mut ticker = interval(frame_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            event = subscription.recv() => {
                let Some(event) = event else {
                    debug!("Event bus closed");
                    break;
                };
                stats.events += 1;
                if !controller.handle_event(event, Instant::now().into_std()) {
                    break;
                }
            }
            _ = ticker.tick() => {
                stats.frames += 1;
                on_frame(&controller.render(Instant::now().into_std()));
            }
        }
    }
    info!("Event loop finished after {} events, {} frames", stats.events, stats.frames);
    stats
}

/// Redraws the item whenever its layout changes, as ASCII to a terminal
/// and/or as a PBM image overwritten in place.
pub struct FramePreview<W: Write> {
    canvas: StatusItemCanvas,
    out: Option<W>,
    pbm_path: Option<PathBuf>,
    last: Option<(String, f32, bool)>,
}

impl<W: Write> FramePreview<W> {
    pub fn new(font: &'static MonoFont<'static>, bar_height: u32, out: Option<W>) -> Self {
        Self {
            canvas: StatusItemCanvas::new(font, bar_height),
            out,
            pbm_path: None,
            last: None,
        }
    }

    pub fn with_pbm(mut self, path: impl Into<PathBuf>) -> Self {
        self.pbm_path = Some(path.into());
        self
    }

    pub fn show(&mut self, view: &RenderView) -> io::Result<()> {
        let key = (view.text.clone(), view.committed_width_px, view.icon_only);
        if self.last.as_ref() == Some(&key) {
            return Ok(());
        }
        let fb = self.canvas.draw(view);
        if let Some(out) = self.out.as_mut() {
            writeln!(
                out,
                "[{}px{}] {}",
                view.committed_width_px,
                if view.icon_only { " icon" } else { "" },
                view.text
            )?;
            out.write_all(fb.to_ascii().as_bytes())?;
            out.flush()?;
        }
        if let Some(path) = self.pbm_path.as_ref() {
            let mut w = BufWriter::new(File::create(path)?);
            fb.write_pbm(&mut w)?;
            w.flush()?;
        }
        self.last = Some(key);
        Ok(())
    }
}

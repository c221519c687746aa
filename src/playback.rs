/*
 *  playback.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Playback snapshots and the line oriented feed that delivers them
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
//! The music player bridge is external; this module only understands what it
//! sends. Each line on the feed is one JSON object:
//!
//! ```text
//! {"type":"track","title":"Song","artist":"Artist","isPlaying":true}
//! {"type":"preference","key":"show-artist","value":true}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::task::JoinHandle;
use tokio::time::{sleep, Duration};

use log::{debug, info, warn};

use crate::events::{Event, EventBus, EventError};
use crate::prefs::PreferenceChange;

/// What the player is doing right now. Replaced wholesale on every update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    pub title: String,
    pub artist: String,
    #[serde(rename = "isPlaying", alias = "is_playing")]
    pub is_playing: bool,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum FeedMessage {
    Track(PlaybackSnapshot),
    Preference { key: String, value: Value },
}

/// Decode one feed line. Blank lines yield `Ok(None)`.
pub fn parse_feed_line(line: &str) -> Result<Option<Event>, EventError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let event = match serde_json::from_str::<FeedMessage>(line)? {
        FeedMessage::Track(snapshot) => Event::TrackChanged(snapshot),
        FeedMessage::Preference { key, value } => {
            Event::PreferenceChanged(PreferenceChange::from_key_value(&key, &value)?)
        }
    };
    Ok(Some(event))
}

/// Read the feed until EOF, publishing each valid line onto the bus.
/// Bad lines are logged and skipped.
pub fn spawn_feed<R>(reader: R, bus: EventBus) -> JoinHandle<()>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = reader.lines();
        let mut line_no = 0u64;
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    line_no += 1;
                    match parse_feed_line(&line) {
                        Ok(Some(event)) => {
                            debug!("feed line {}: {:?}", line_no, event);
                            bus.publish(event);
                        }
                        Ok(None) => {}
                        Err(e) => warn!("Dropping feed line {}: {}", line_no, e),
                    }
                }
                Ok(None) => {
                    info!("Playback feed closed after {} lines", line_no);
                    break;
                }
                Err(e) => {
                    warn!("Playback feed read failed: {}", e);
                    break;
                }
            }
        }
    })
}

/// Canned tracks for running without a player bridge.
pub fn demo_playlist() -> Vec<PlaybackSnapshot> {
    [
        ("Song (Remix)", "Artist", true),
        ("A Considerably Longer Title That Will Not Fit (Live at the Hall)", "The Long Names", true),
        ("Interlude", "Quartet", false),
        ("Short", "Duo", true),
    ]
    .into_iter()
    .map(|(title, artist, is_playing)| PlaybackSnapshot {
        title: title.to_string(),
        artist: artist.to_string(),
        is_playing,
    })
    .collect()
}

/// Cycle the demo playlist forever, one track per `interval`.
pub fn spawn_demo_playlist(bus: EventBus, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let playlist = demo_playlist();
        for snapshot in playlist.iter().cycle() {
            info!("Demo track: '{}' by '{}'", snapshot.title, snapshot.artist);
            bus.publish(Event::TrackChanged(snapshot.clone()));
            sleep(interval).await;
        }
    })
}

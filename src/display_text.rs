/*
 *  display_text.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Builds the menu bar string from track metadata and user preferences
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

use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;

use crate::constants::TEXT_SEPARATOR;
use crate::playback::PlaybackSnapshot;
use crate::prefs::DisplayPreferences;

// one group per match, plus at most one whitespace either side
static PARENTHESES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s?\([^(]*?\)\s?").expect("parentheses pattern is valid"));

/// Remove every parenthesized group, e.g. "Song (Remix) (Live)" -> "Song".
pub fn strip_parentheses(text: &str) -> Cow<'_, str> {
    PARENTHESES.replace_all(text, "")
}

/// Compose the display string for the status item.
pub fn format_display_text(snapshot: &PlaybackSnapshot, prefs: &DisplayPreferences) -> String {
    let clean = |field: &str| -> String {
        if prefs.ignore_parentheses {
            strip_parentheses(field).into_owned()
        } else {
            field.to_string()
        }
    };

    let mut parts: Vec<String> = Vec::with_capacity(2);
    if prefs.show_title {
        let title = clean(&snapshot.title);
        if !title.is_empty() {
            parts.push(title);
        }
    }
    if prefs.show_artist {
        let artist = clean(&snapshot.artist);
        if !artist.is_empty() {
            parts.push(artist);
        }
    }
    parts.join(TEXT_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(title: &str, artist: &str) -> PlaybackSnapshot {
        PlaybackSnapshot {
            title: title.to_string(),
            artist: artist.to_string(),
            is_playing: true,
        }
    }

    fn prefs(show_title: bool, show_artist: bool, ignore_parentheses: bool) -> DisplayPreferences {
        DisplayPreferences {
            show_title,
            show_artist,
            ignore_parentheses,
            ..Default::default()
        }
    }

    #[test]
    fn test_strip_removes_every_group() {
        assert_eq!(strip_parentheses("Song (Remix) (Live)"), "Song");
        assert_eq!(strip_parentheses("(Intro) Song"), "Song");
        assert_eq!(strip_parentheses("Song"), "Song");
    }

    #[test]
    fn test_strip_is_idempotent_on_clean_text() {
        let once = strip_parentheses("Song (Remix) (Live)").into_owned();
        let twice = strip_parentheses(&once).into_owned();
        assert_eq!(once, twice);
        assert!(matches!(strip_parentheses("Plain Title"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_is_not_recursive() {
        // inner group goes, the outer one survives a single pass
        assert_eq!(strip_parentheses("Song (a (b) c)"), "Song (ac)");
    }

    #[test]
    fn test_nothing_shown() {
        let text = format_display_text(&snapshot("Song", "Artist"), &prefs(false, false, false));
        assert_eq!(text, "");
    }

    #[test]
    fn test_title_and_artist_joined() {
        let text = format_display_text(&snapshot("Song (Remix)", "Artist"), &prefs(true, true, true));
        assert_eq!(text, "Song \u{2022} Artist");
    }

    #[test]
    fn test_parentheses_kept_when_not_ignored() {
        let text = format_display_text(&snapshot("Song (Remix)", "Artist"), &prefs(true, false, false));
        assert_eq!(text, "Song (Remix)");
    }

    #[test]
    fn test_separator_only_between_non_empty_fields() {
        assert_eq!(format_display_text(&snapshot("", "Artist"), &prefs(true, true, false)), "Artist");
        assert_eq!(format_display_text(&snapshot("Song", ""), &prefs(true, true, false)), "Song");
        // a title that is nothing but a group strips to empty
        assert_eq!(format_display_text(&snapshot("(Live)", "Artist"), &prefs(true, true, true)), "Artist");
    }
}

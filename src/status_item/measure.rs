/*
 *  status_item/measure.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Pixel width measurement for marquee text
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

use embedded_graphics::mono_font::{iso_8859_1::FONT_7X13, MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::Baseline;

pub trait TextMeasure {
    /// Natural rendered width of `text` in pixels
    fn text_width(&self, text: &str) -> f32;
}

/// Measures with the same mono font the canvas draws with.
#[derive(Debug, Clone, Copy)]
pub struct MonoFontMeasure {
    font: &'static MonoFont<'static>,
}

impl MonoFontMeasure {
    pub fn new(font: &'static MonoFont<'static>) -> Self {
        Self { font }
    }

    pub fn font(&self) -> &'static MonoFont<'static> {
        self.font
    }
}

impl Default for MonoFontMeasure {
    fn default() -> Self {
        Self::new(&FONT_7X13)
    }
}

impl TextMeasure for MonoFontMeasure {
    fn text_width(&self, text: &str) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let metrics = style.measure_string(text, Point::zero(), Baseline::Top);
        metrics.next_position.x.max(0) as f32
    }
}

/// Fixed advance per character (approximation, 6px per char by default)
#[derive(Debug, Clone, Copy)]
pub struct FixedAdvanceMeasure {
    pub advance: f32,
}

impl Default for FixedAdvanceMeasure {
    fn default() -> Self {
        Self { advance: 6.0 }
    }
}

impl TextMeasure for FixedAdvanceMeasure {
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}

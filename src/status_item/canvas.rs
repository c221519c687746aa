/*
 *  status_item/canvas.rs
 *
 *  NowBar - now playing, in the menu bar
 *  (c) 2020-26 Stuart Hunter
 *
 *  Rasterizes a render view into a monochrome framebuffer
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

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Baseline, Text};

use crate::constants::{BAR_ANIMATION_HEIGHT, BAR_ANIMATION_WIDTH, STATUS_ITEM_PADDING};
use crate::status_item::controller::{marquee_box_width, RenderView};
use crate::vframebuf::VarFrameBuf;

pub struct StatusItemCanvas {
    font: &'static MonoFont<'static>,
    framebuffer: VarFrameBuf<BinaryColor>,
}

impl StatusItemCanvas {
    pub fn new(font: &'static MonoFont<'static>, bar_height: u32) -> Self {
        Self {
            font,
            framebuffer: VarFrameBuf::new(0, bar_height, BinaryColor::Off),
        }
    }

    pub fn framebuffer(&self) -> &VarFrameBuf<BinaryColor> {
        &self.framebuffer
    }

    pub fn draw(&mut self, view: &RenderView) -> &VarFrameBuf<BinaryColor> {
        let bar_height = self.framebuffer.height() as u32;
        self.framebuffer.resize(view.committed_width_px.round().max(0.0) as u32, bar_height);

        let Ok(()) = self.draw_icon(view, bar_height);
        if !view.icon_only && !view.text.is_empty() {
            let Ok(()) = self.draw_text(view, bar_height);
        }
        &self.framebuffer
    }

    fn draw_icon(&mut self, view: &RenderView, bar_height: u32) -> Result<(), core::convert::Infallible> {
        let icon_top = ((bar_height as f32 - BAR_ANIMATION_HEIGHT) / 2.0).round() as i32;
        let icon_left = STATUS_ITEM_PADDING as i32;
        let fill = PrimitiveStyle::with_fill(BinaryColor::On);

        for bar in &view.animation.bars {
            let height = bar.height.round().max(0.0) as u32;
            let top = icon_top + BAR_ANIMATION_HEIGHT as i32 - height as i32;
            Rectangle::new(
                Point::new(icon_left + bar.x.round() as i32, top),
                Size::new(bar.width.round() as u32, height),
            )
            .into_styled(fill)
            .draw(&mut self.framebuffer)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, view: &RenderView, bar_height: u32) -> Result<(), core::convert::Infallible> {
        let box_left = (STATUS_ITEM_PADDING + BAR_ANIMATION_WIDTH + STATUS_ITEM_PADDING) as i32;
        let box_width = marquee_box_width(view.committed_width_px).max(0.0) as u32;
        let text_box = Rectangle::new(Point::new(box_left, 0), Size::new(box_width, bar_height));

        let style = MonoTextStyle::new(self.font, BinaryColor::On);
        let baseline_y = (bar_height / 2) as i32;
        let mut clipped = self.framebuffer.clipped(&text_box);

        // latin-1 fonts have no bullet, the middle dot has the same advance
        let text = view.text.replace('\u{2022}', "\u{00b7}");
        let xs = std::iter::once(view.marquee.primary_x).chain(view.marquee.trailing_x);
        for x in xs {
            let origin = Point::new(box_left + x.round() as i32, baseline_y);
            Text::with_baseline(&text, origin, style, Baseline::Middle).draw(&mut clipped)?;
        }
        Ok(())
    }
}

//! Retained-mode [`Toolkit`] backed by `embedded-graphics`.
//!
//! A [`Scene`] keeps windows, layers, bitmaps and fonts in fixed slot
//! tables and rasterises the top window into any `BinaryColor` draw
//! target on [`Scene::render`]. Firmware renders into the SSD1306 frame
//! buffer; tests render into an in-memory canvas.
//!
//! Colours map onto the monochrome panel as `White` → on, `Black` → off;
//! `Clear` is not drawn.

use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::{Alignment, Baseline, Text, TextStyleBuilder};
use heapless::Vec;

use crate::config::{
    LAYER_TEXT_CAPACITY, MAX_BITMAPS, MAX_BITMAP_LAYERS, MAX_CHILDREN, MAX_FONTS,
    MAX_TEXT_LAYERS, MAX_WINDOWS,
};
use crate::error::{Error, Resource};
use crate::platform::{
    BitmapAlignment, BitmapId, BitmapLayerId, Child, Color, CompositingMode, FontId, Rect,
    TextAlignment, TextLayerId, Toolkit, WindowId,
};
use crate::resources::{FontResource, ImageResource, MonoBitmap};
use crate::text::DisplayText;

struct Window {
    background: Color,
    children: Vec<Child, MAX_CHILDREN>,
}

struct TextLayer {
    frame: Rect,
    text: DisplayText<LAYER_TEXT_CAPACITY>,
    color: Color,
    background: Color,
    font: Option<FontId>,
    alignment: TextAlignment,
}

struct BitmapLayer {
    frame: Rect,
    bitmap: Option<BitmapId>,
    background: Color,
    compositing: CompositingMode,
    alignment: BitmapAlignment,
}

/// Fixed table of optional entries; a handle is an index into it.
struct Slots<T, const N: usize> {
    kind: Resource,
    items: [Option<T>; N],
}

impl<T, const N: usize> Slots<T, N> {
    fn new(kind: Resource) -> Self {
        Self {
            kind,
            items: core::array::from_fn(|_| None),
        }
    }

    fn insert(&mut self, value: T) -> Result<u8, Error> {
        let index = self
            .items
            .iter()
            .position(Option::is_none)
            .ok_or(Error::ResourceExhausted(self.kind))?;
        self.items[index] = Some(value);
        Ok(index as u8)
    }

    fn get(&self, index: usize) -> Result<&T, Error> {
        self.items
            .get(index)
            .and_then(Option::as_ref)
            .ok_or(Error::InvalidHandle(self.kind))
    }

    fn get_mut(&mut self, index: usize) -> Result<&mut T, Error> {
        let kind = self.kind;
        self.items
            .get_mut(index)
            .and_then(Option::as_mut)
            .ok_or(Error::InvalidHandle(kind))
    }

    fn remove(&mut self, index: usize) -> Result<T, Error> {
        let kind = self.kind;
        self.items
            .get_mut(index)
            .and_then(Option::take)
            .ok_or(Error::InvalidHandle(kind))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.items.iter_mut().flatten()
    }

    fn live(&self) -> usize {
        self.items.iter().filter(|i| i.is_some()).count()
    }
}

/// Live objects per kind, for leak checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResourceCounts {
    pub windows: usize,
    pub text_layers: usize,
    pub bitmap_layers: usize,
    pub bitmaps: usize,
    pub fonts: usize,
}

impl ResourceCounts {
    pub fn total(&self) -> usize {
        self.windows + self.text_layers + self.bitmap_layers + self.bitmaps + self.fonts
    }
}

pub struct Scene {
    frame: Rect,
    windows: Slots<Window, MAX_WINDOWS>,
    text_layers: Slots<TextLayer, MAX_TEXT_LAYERS>,
    bitmap_layers: Slots<BitmapLayer, MAX_BITMAP_LAYERS>,
    bitmaps: Slots<&'static MonoBitmap, MAX_BITMAPS>,
    fonts: Slots<&'static MonoFont<'static>, MAX_FONTS>,
    /// Pushed windows, topmost last.
    stack: Vec<WindowId, MAX_WINDOWS>,
    dirty: bool,
}

impl Scene {
    /// Empty scene for a `width` × `height` panel.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            frame: Rect::sized(width, height),
            windows: Slots::new(Resource::Window),
            text_layers: Slots::new(Resource::TextLayer),
            bitmap_layers: Slots::new(Resource::BitmapLayer),
            bitmaps: Slots::new(Resource::Bitmap),
            fonts: Slots::new(Resource::Font),
            stack: Vec::new(),
            dirty: false,
        }
    }

    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// The visible window, if any has been pushed.
    pub fn top_window(&self) -> Option<WindowId> {
        self.stack.last().copied()
    }

    /// Whether anything visible changed since the last successful render.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn live(&self) -> ResourceCounts {
        ResourceCounts {
            windows: self.windows.live(),
            text_layers: self.text_layers.live(),
            bitmap_layers: self.bitmap_layers.live(),
            bitmaps: self.bitmaps.live(),
            fonts: self.fonts.live(),
        }
    }

    /// Text currently held by `layer`.
    pub fn text(&self, layer: TextLayerId) -> Result<&str, Error> {
        Ok(self.text_layers.get(layer.index())?.text.as_str())
    }

    /// Draw the top window into `target` and clear the dirty flag.
    ///
    /// With no window pushed the target is cleared to off.
    pub fn render<D>(&mut self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw(target)?;
        self.dirty = false;
        Ok(())
    }

    fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let Some(window) = self
            .top_window()
            .and_then(|id| self.windows.get(id.index()).ok())
        else {
            return target.clear(BinaryColor::Off);
        };

        target.clear(binary(window.background).unwrap_or(BinaryColor::Off))?;

        for child in window.children.iter() {
            match *child {
                Child::Text(id) => {
                    if let Ok(layer) = self.text_layers.get(id.index()) {
                        self.draw_text(layer, target)?;
                    }
                }
                Child::Bitmap(id) => {
                    if let Ok(layer) = self.bitmap_layers.get(id.index()) {
                        self.draw_bitmap(layer, target)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn draw_text<D>(&self, layer: &TextLayer, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let area = rectangle(layer.frame);
        let mut clipped = target.clipped(&area);

        if let Some(bg) = binary(layer.background) {
            area.into_styled(PrimitiveStyle::with_fill(bg))
                .draw(&mut clipped)?;
        }

        let font = layer.font.and_then(|f| self.fonts.get(f.index()).ok());
        let (Some(font), Some(color)) = (font, binary(layer.color)) else {
            return Ok(());
        };
        if layer.text.is_empty() {
            return Ok(());
        }

        let (x, alignment) = match layer.alignment {
            TextAlignment::Left => (area.top_left.x, Alignment::Left),
            TextAlignment::Center => (area.center().x, Alignment::Center),
            TextAlignment::Right => (
                area.top_left.x + area.size.width as i32 - 1,
                Alignment::Right,
            ),
        };
        let text_style = TextStyleBuilder::new()
            .alignment(alignment)
            .baseline(Baseline::Top)
            .build();

        Text::with_text_style(
            layer.text.as_str(),
            Point::new(x, area.top_left.y),
            MonoTextStyle::new(*font, color),
            text_style,
        )
        .draw(&mut clipped)?;
        Ok(())
    }

    fn draw_bitmap<D>(&self, layer: &BitmapLayer, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let area = rectangle(layer.frame);
        let mut clipped = target.clipped(&area);

        if let Some(bg) = binary(layer.background) {
            area.into_styled(PrimitiveStyle::with_fill(bg))
                .draw(&mut clipped)?;
        }

        let Some(bitmap) = layer.bitmap.and_then(|b| self.bitmaps.get(b.index()).ok()) else {
            return Ok(());
        };

        let origin = aligned_origin(&area, bitmap, layer.alignment);
        let mode = layer.compositing;
        clipped.draw_iter(bitmap.pixels().filter_map(move |(x, y, set)| {
            let color = match (set, mode) {
                (true, _) => BinaryColor::On,
                (false, CompositingMode::Assign) => BinaryColor::Off,
                (false, CompositingMode::Set) => return None,
            };
            Some(Pixel(origin + Point::new(x as i32, y as i32), color))
        }))
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}

fn binary(color: Color) -> Option<BinaryColor> {
    match color {
        Color::White => Some(BinaryColor::On),
        Color::Black => Some(BinaryColor::Off),
        Color::Clear => None,
    }
}

fn rectangle(r: Rect) -> Rectangle {
    Rectangle::new(
        Point::new(r.x as i32, r.y as i32),
        Size::new(r.width as u32, r.height as u32),
    )
}

fn aligned_origin(area: &Rectangle, bitmap: &MonoBitmap, alignment: BitmapAlignment) -> Point {
    let dx = (area.size.width as i32 - bitmap.width as i32) / 2;
    let dy = (area.size.height as i32 - bitmap.height as i32) / 2;
    match alignment {
        BitmapAlignment::TopLeft => area.top_left,
        BitmapAlignment::Top => area.top_left + Point::new(dx, 0),
        BitmapAlignment::Center => area.top_left + Point::new(dx, dy),
    }
}

impl Toolkit for Scene {
    fn create_window(&mut self) -> Result<WindowId, Error> {
        let index = self.windows.insert(Window {
            background: Color::White,
            children: Vec::new(),
        })?;
        Ok(WindowId::new(index))
    }

    fn destroy_window(&mut self, window: WindowId) -> Result<(), Error> {
        self.windows.remove(window.index())?;
        self.stack.retain(|w| *w != window);
        self.mark_dirty();
        Ok(())
    }

    fn push_window(&mut self, window: WindowId, animated: bool) -> Result<(), Error> {
        self.windows.get(window.index())?;
        // No transitions on this panel; `animated` is accepted and ignored.
        debug!("push window {} (animated: {})", window, animated);
        self.stack.retain(|w| *w != window);
        self.stack
            .push(window)
            .map_err(|_| Error::ResourceExhausted(Resource::Window))?;
        self.mark_dirty();
        Ok(())
    }

    fn set_window_background(&mut self, window: WindowId, color: Color) -> Result<(), Error> {
        self.windows.get_mut(window.index())?.background = color;
        self.mark_dirty();
        Ok(())
    }

    fn root_frame(&self, window: WindowId) -> Result<Rect, Error> {
        self.windows.get(window.index())?;
        Ok(self.frame)
    }

    fn add_child(&mut self, window: WindowId, child: Child) -> Result<(), Error> {
        match child {
            Child::Text(id) => self.text_layers.get(id.index()).map(|_| ())?,
            Child::Bitmap(id) => self.bitmap_layers.get(id.index()).map(|_| ())?,
        }
        let children = &mut self.windows.get_mut(window.index())?.children;
        if !children.contains(&child) {
            children
                .push(child)
                .map_err(|_| Error::ResourceExhausted(Resource::Window))?;
        }
        self.mark_dirty();
        Ok(())
    }

    fn load_font(&mut self, resource: FontResource) -> Result<FontId, Error> {
        Ok(FontId::new(self.fonts.insert(resource.mono_font())?))
    }

    fn unload_font(&mut self, font: FontId) -> Result<(), Error> {
        self.fonts.remove(font.index())?;
        for layer in self.text_layers.iter_mut() {
            if layer.font == Some(font) {
                layer.font = None;
            }
        }
        self.mark_dirty();
        Ok(())
    }

    fn create_text_layer(&mut self, frame: Rect) -> Result<TextLayerId, Error> {
        let index = self.text_layers.insert(TextLayer {
            frame,
            text: DisplayText::new(),
            color: Color::Black,
            background: Color::White,
            font: None,
            alignment: TextAlignment::Left,
        })?;
        Ok(TextLayerId::new(index))
    }

    fn destroy_text_layer(&mut self, layer: TextLayerId) -> Result<(), Error> {
        self.text_layers.remove(layer.index())?;
        self.detach(Child::Text(layer));
        Ok(())
    }

    fn set_text(&mut self, layer: TextLayerId, text: &str) -> Result<(), Error> {
        let entry = self.text_layers.get_mut(layer.index())?;
        if entry.text.as_str() != text {
            entry.text.set(text);
            if entry.text.was_truncated() {
                warn!("text layer {} truncated", layer);
            }
            self.mark_dirty();
        }
        Ok(())
    }

    fn set_text_color(&mut self, layer: TextLayerId, color: Color) -> Result<(), Error> {
        self.text_layers.get_mut(layer.index())?.color = color;
        self.mark_dirty();
        Ok(())
    }

    fn set_text_background(&mut self, layer: TextLayerId, color: Color) -> Result<(), Error> {
        self.text_layers.get_mut(layer.index())?.background = color;
        self.mark_dirty();
        Ok(())
    }

    fn set_font(&mut self, layer: TextLayerId, font: FontId) -> Result<(), Error> {
        self.fonts.get(font.index())?;
        self.text_layers.get_mut(layer.index())?.font = Some(font);
        self.mark_dirty();
        Ok(())
    }

    fn set_text_alignment(
        &mut self,
        layer: TextLayerId,
        alignment: TextAlignment,
    ) -> Result<(), Error> {
        self.text_layers.get_mut(layer.index())?.alignment = alignment;
        self.mark_dirty();
        Ok(())
    }

    fn create_bitmap(&mut self, resource: ImageResource) -> Result<BitmapId, Error> {
        Ok(BitmapId::new(self.bitmaps.insert(resource.bitmap())?))
    }

    fn destroy_bitmap(&mut self, bitmap: BitmapId) -> Result<(), Error> {
        self.bitmaps.remove(bitmap.index())?;
        for layer in self.bitmap_layers.iter_mut() {
            if layer.bitmap == Some(bitmap) {
                layer.bitmap = None;
            }
        }
        self.mark_dirty();
        Ok(())
    }

    fn create_bitmap_layer(&mut self, frame: Rect) -> Result<BitmapLayerId, Error> {
        let index = self.bitmap_layers.insert(BitmapLayer {
            frame,
            bitmap: None,
            background: Color::Clear,
            compositing: CompositingMode::Assign,
            alignment: BitmapAlignment::TopLeft,
        })?;
        Ok(BitmapLayerId::new(index))
    }

    fn destroy_bitmap_layer(&mut self, layer: BitmapLayerId) -> Result<(), Error> {
        self.bitmap_layers.remove(layer.index())?;
        self.detach(Child::Bitmap(layer));
        Ok(())
    }

    fn set_bitmap(&mut self, layer: BitmapLayerId, bitmap: BitmapId) -> Result<(), Error> {
        self.bitmaps.get(bitmap.index())?;
        self.bitmap_layers.get_mut(layer.index())?.bitmap = Some(bitmap);
        self.mark_dirty();
        Ok(())
    }

    fn set_bitmap_background(&mut self, layer: BitmapLayerId, color: Color) -> Result<(), Error> {
        self.bitmap_layers.get_mut(layer.index())?.background = color;
        self.mark_dirty();
        Ok(())
    }

    fn set_compositing_mode(
        &mut self,
        layer: BitmapLayerId,
        mode: CompositingMode,
    ) -> Result<(), Error> {
        self.bitmap_layers.get_mut(layer.index())?.compositing = mode;
        self.mark_dirty();
        Ok(())
    }

    fn set_bitmap_alignment(
        &mut self,
        layer: BitmapLayerId,
        alignment: BitmapAlignment,
    ) -> Result<(), Error> {
        self.bitmap_layers.get_mut(layer.index())?.alignment = alignment;
        self.mark_dirty();
        Ok(())
    }
}

impl Scene {
    /// Remove a destroyed layer from every window's child list.
    fn detach(&mut self, child: Child) {
        for window in self.windows.iter_mut() {
            window.children.retain(|c| *c != child);
        }
        self.mark_dirty();
    }
}

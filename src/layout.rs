//! Watchface layout.
//!
//! Geometry comes from `config`; widths follow the window's root frame so
//! the same face works on any panel at least as tall as `PANEL_HEIGHT`.

use crate::config::{
    CONNECTION_X, LOGO_HEIGHT, STATUS_HEIGHT, STATUS_Y, TIME_HEIGHT, TIME_Y,
};
use crate::platform::{BitmapAlignment, Color, CompositingMode, Rect, TextAlignment};
use crate::resources::{FontResource, ImageResource};

/// Placeholder battery text shown until the first tick peeks the battery.
pub const BATTERY_PLACEHOLDER: &str = "100% charged";

/// A text element: one text layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextElement {
    pub frame: Rect,
    pub font: FontResource,
    pub color: Color,
    pub background: Color,
    pub alignment: TextAlignment,
    pub placeholder: Option<&'static str>,
}

/// The logo: one bitmap layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogoElement {
    pub frame: Rect,
    pub image: ImageResource,
    pub background: Color,
    pub compositing: CompositingMode,
    pub alignment: BitmapAlignment,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub background: Color,
    pub logo: LogoElement,
    pub time: TextElement,
    pub battery: TextElement,
    pub connection: TextElement,
}

impl Layout {
    /// Lay the face out inside `root`.
    pub fn for_frame(root: Rect) -> Self {
        let status_y = root.y.saturating_add(STATUS_Y);
        let connection_x = root.x.saturating_add(CONNECTION_X);
        let split = CONNECTION_X.max(0) as u16;

        let status = |frame: Rect, placeholder: Option<&'static str>| TextElement {
            frame,
            font: FontResource::Status,
            color: Color::Black,
            background: Color::Clear,
            alignment: TextAlignment::Left,
            placeholder,
        };

        Self {
            background: Color::White,
            logo: LogoElement {
                frame: Rect::new(root.x, root.y, root.width, LOGO_HEIGHT),
                image: ImageResource::Logo,
                background: Color::Clear,
                compositing: CompositingMode::Assign,
                alignment: BitmapAlignment::Center,
            },
            time: TextElement {
                frame: Rect::new(
                    root.x,
                    root.y.saturating_add(TIME_Y),
                    root.width,
                    TIME_HEIGHT,
                ),
                font: FontResource::Clock,
                color: Color::Black,
                background: Color::Clear,
                alignment: TextAlignment::Center,
                placeholder: None,
            },
            battery: status(
                Rect::new(root.x, status_y, split.min(root.width), STATUS_HEIGHT),
                Some(BATTERY_PLACEHOLDER),
            ),
            connection: status(
                Rect::new(
                    connection_x,
                    status_y,
                    root.width.saturating_sub(split),
                    STATUS_HEIGHT,
                ),
                None,
            ),
        }
    }
}

//! Seams to the host platform.
//!
//! The watchface does not draw, schedule, or talk to the radio itself. It
//! drives a retained-mode UI [`Toolkit`] and listens to three notification
//! sources ([`TickSource`], [`BatterySource`], [`ConnectionSource`]).
//! Firmware implements these on top of embassy, the SoftDevice and
//! [`Scene`](crate::scene::Scene); tests implement them with recording
//! doubles.

use crate::error::Error;
use crate::event::{BatteryState, TickUnit, TimeSample};
use crate::resources::{FontResource, ImageResource};

// ═══════════════════════════════════════════════════════════════════════════
// Geometry
// ═══════════════════════════════════════════════════════════════════════════

/// Axis-aligned rectangle in panel pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

impl Rect {
    pub const fn new(x: i16, y: i16, width: u16, height: u16) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle at the origin.
    pub const fn sized(width: u16, height: u16) -> Self {
        Self::new(0, 0, width, height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Styling
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Color {
    Black,
    White,
    /// Not drawn; whatever is underneath shows through.
    Clear,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TextAlignment {
    #[default]
    Left,
    Center,
    Right,
}

/// Placement of a bitmap inside its layer's frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BitmapAlignment {
    #[default]
    TopLeft,
    Top,
    Center,
}

/// How bitmap pixels combine with what is already drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompositingMode {
    /// Every source pixel replaces the destination.
    #[default]
    Assign,
    /// Only set source pixels are drawn; clear ones are transparent.
    Set,
}

// ═══════════════════════════════════════════════════════════════════════════
// Handles
// ═══════════════════════════════════════════════════════════════════════════

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[cfg_attr(feature = "defmt", derive(defmt::Format))]
        pub struct $name(u8);

        impl $name {
            /// Wrap a toolkit-assigned slot index.
            pub const fn new(index: u8) -> Self {
                Self(index)
            }

            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

handle!(
    /// A top-level window.
    WindowId
);
handle!(
    /// A text layer.
    TextLayerId
);
handle!(
    /// A bitmap layer.
    BitmapLayerId
);
handle!(
    /// A bitmap loaded from a bundled image resource.
    BitmapId
);
handle!(
    /// A font loaded from a bundled font resource.
    FontId
);

/// A layer that can be attached to a window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Child {
    Text(TextLayerId),
    Bitmap(BitmapLayerId),
}

impl From<TextLayerId> for Child {
    fn from(id: TextLayerId) -> Self {
        Child::Text(id)
    }
}

impl From<BitmapLayerId> for Child {
    fn from(id: BitmapLayerId) -> Self {
        Child::Bitmap(id)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// UI toolkit
// ═══════════════════════════════════════════════════════════════════════════

/// Retained-mode UI toolkit.
///
/// Creation calls hand out handles; every handle must be passed back to
/// the matching destroy call exactly once. Setters on a destroyed or
/// unknown handle fail with [`Error::InvalidHandle`].
pub trait Toolkit {
    // Windows
    fn create_window(&mut self) -> Result<WindowId, Error>;
    fn destroy_window(&mut self, window: WindowId) -> Result<(), Error>;
    /// Make `window` the visible one.
    fn push_window(&mut self, window: WindowId, animated: bool) -> Result<(), Error>;
    fn set_window_background(&mut self, window: WindowId, color: Color) -> Result<(), Error>;
    /// Frame of the window's root layer.
    fn root_frame(&self, window: WindowId) -> Result<Rect, Error>;
    /// Attach a layer to the window's root layer. Children draw in order.
    fn add_child(&mut self, window: WindowId, child: Child) -> Result<(), Error>;

    // Fonts
    fn load_font(&mut self, resource: FontResource) -> Result<FontId, Error>;
    fn unload_font(&mut self, font: FontId) -> Result<(), Error>;

    // Text layers
    fn create_text_layer(&mut self, frame: Rect) -> Result<TextLayerId, Error>;
    fn destroy_text_layer(&mut self, layer: TextLayerId) -> Result<(), Error>;
    /// Replace the layer's text and schedule a redraw.
    fn set_text(&mut self, layer: TextLayerId, text: &str) -> Result<(), Error>;
    fn set_text_color(&mut self, layer: TextLayerId, color: Color) -> Result<(), Error>;
    fn set_text_background(&mut self, layer: TextLayerId, color: Color) -> Result<(), Error>;
    fn set_font(&mut self, layer: TextLayerId, font: FontId) -> Result<(), Error>;
    fn set_text_alignment(
        &mut self,
        layer: TextLayerId,
        alignment: TextAlignment,
    ) -> Result<(), Error>;

    // Bitmaps
    fn create_bitmap(&mut self, resource: ImageResource) -> Result<BitmapId, Error>;
    fn destroy_bitmap(&mut self, bitmap: BitmapId) -> Result<(), Error>;

    // Bitmap layers
    fn create_bitmap_layer(&mut self, frame: Rect) -> Result<BitmapLayerId, Error>;
    fn destroy_bitmap_layer(&mut self, layer: BitmapLayerId) -> Result<(), Error>;
    fn set_bitmap(&mut self, layer: BitmapLayerId, bitmap: BitmapId) -> Result<(), Error>;
    fn set_bitmap_background(&mut self, layer: BitmapLayerId, color: Color) -> Result<(), Error>;
    fn set_compositing_mode(
        &mut self,
        layer: BitmapLayerId,
        mode: CompositingMode,
    ) -> Result<(), Error>;
    fn set_bitmap_alignment(
        &mut self,
        layer: BitmapLayerId,
        alignment: BitmapAlignment,
    ) -> Result<(), Error>;
}

// ═══════════════════════════════════════════════════════════════════════════
// Notification sources
// ═══════════════════════════════════════════════════════════════════════════

/// Periodic time notifications plus the wall-clock query.
pub trait TickSource {
    fn subscribe_ticks(&mut self, unit: TickUnit) -> Result<(), Error>;
    fn unsubscribe_ticks(&mut self);
    /// Current local time of day.
    fn now(&self) -> TimeSample;
}

/// Charge-state notifications plus a synchronous peek.
pub trait BatterySource {
    fn subscribe_battery(&mut self) -> Result<(), Error>;
    fn unsubscribe_battery(&mut self);
    fn peek_battery(&self) -> BatteryState;
}

/// Bluetooth connectivity notifications plus a synchronous peek.
pub trait ConnectionSource {
    fn subscribe_connection(&mut self) -> Result<(), Error>;
    fn unsubscribe_connection(&mut self);
    fn peek_connection(&self) -> bool;
}

/// Everything the lifecycle manager listens to.
pub trait EventSources: TickSource + BatterySource + ConnectionSource {}

impl<T: TickSource + BatterySource + ConnectionSource> EventSources for T {}

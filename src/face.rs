//! The watchface: its toolkit resources and the three event handlers.
//!
//! Every handle acquired in [`Watchface::create`] is recorded in an
//! [`Acquired`] ledger. Teardown, and rollback after a failed setup, both
//! go through [`Acquired::release`], which destroys each recorded handle
//! once.

use crate::error::Error;
use crate::event::{BatteryState, TimeSample};
use crate::layout::{Layout, TextElement};
use crate::platform::{
    BitmapId, BitmapLayerId, BatterySource, Child, FontId, TextLayerId, Toolkit, WindowId,
};
use crate::text::{
    format_battery, format_connection, format_time, BatteryText, ConnectionText, TimeText,
};

/// Handles owned by a live watchface.
pub struct Watchface {
    window: WindowId,
    clock_font: FontId,
    status_font: FontId,
    logo: BitmapId,
    logo_layer: BitmapLayerId,
    time_layer: TextLayerId,
    connection_layer: TextLayerId,
    battery_layer: TextLayerId,

    time_text: TimeText,
    battery_text: BatteryText,
    connection_text: ConnectionText,
}

impl Watchface {
    /// Create the window, fonts, logo and text layers and attach them.
    ///
    /// On failure everything created so far is destroyed before the error
    /// is returned.
    pub fn create<U: Toolkit>(ui: &mut U) -> Result<Self, Error> {
        let mut acquired = Acquired::default();
        match Self::build(ui, &mut acquired) {
            Ok(face) => Ok(face),
            Err(e) => {
                warn!("watchface setup failed: {}", e);
                if let Err(release_err) = acquired.release(ui) {
                    warn!("rollback incomplete: {}", release_err);
                }
                Err(e)
            }
        }
    }

    fn build<U: Toolkit>(ui: &mut U, acq: &mut Acquired) -> Result<Self, Error> {
        let window = *acq.window.insert(ui.create_window()?);
        ui.push_window(window, true)?;

        let layout = Layout::for_frame(ui.root_frame(window)?);
        ui.set_window_background(window, layout.background)?;

        let clock_font = *acq.clock_font.insert(ui.load_font(layout.time.font)?);
        let status_font = *acq.status_font.insert(ui.load_font(layout.battery.font)?);

        // Logo at the top of the screen.
        let logo = *acq.logo.insert(ui.create_bitmap(layout.logo.image)?);
        let logo_layer = *acq
            .logo_layer
            .insert(ui.create_bitmap_layer(layout.logo.frame)?);
        ui.set_bitmap(logo_layer, logo)?;
        ui.set_bitmap_background(logo_layer, layout.logo.background)?;
        ui.set_compositing_mode(logo_layer, layout.logo.compositing)?;
        ui.set_bitmap_alignment(logo_layer, layout.logo.alignment)?;

        let time_layer = text_layer(ui, &layout.time, clock_font, &mut acq.time_layer)?;
        let connection_layer = text_layer(
            ui,
            &layout.connection,
            status_font,
            &mut acq.connection_layer,
        )?;
        let battery_layer = text_layer(ui, &layout.battery, status_font, &mut acq.battery_layer)?;

        for child in [
            Child::from(logo_layer),
            Child::from(time_layer),
            Child::from(connection_layer),
            Child::from(battery_layer),
        ] {
            ui.add_child(window, child)?;
        }

        debug!("watchface created");

        Ok(Self {
            window,
            clock_font,
            status_font,
            logo,
            logo_layer,
            time_layer,
            connection_layer,
            battery_layer,
            time_text: TimeText::new(),
            battery_text: BatteryText::from_str_truncated(
                layout.battery.placeholder.unwrap_or_default(),
            ),
            connection_text: ConnectionText::new(),
        })
    }

    /// Destroy every resource created by [`Watchface::create`].
    ///
    /// All releases are attempted; the first failure is returned.
    pub fn destroy<U: Toolkit>(self, ui: &mut U) -> Result<(), Error> {
        Acquired {
            window: Some(self.window),
            clock_font: Some(self.clock_font),
            status_font: Some(self.status_font),
            logo: Some(self.logo),
            logo_layer: Some(self.logo_layer),
            time_layer: Some(self.time_layer),
            connection_layer: Some(self.connection_layer),
            battery_layer: Some(self.battery_layer),
        }
        .release(ui)
    }

    /// Time handler: show `sample`, then refresh the battery text from a
    /// synchronous peek.
    pub fn on_tick<U, B>(&mut self, ui: &mut U, battery: &B, sample: &TimeSample) -> Result<(), Error>
    where
        U: Toolkit,
        B: BatterySource + ?Sized,
    {
        self.time_text = format_time(sample);
        trace!("time {}", self.time_text.as_str());
        ui.set_text(self.time_layer, &self.time_text)?;

        self.on_battery(ui, &battery.peek_battery())
    }

    /// Battery handler.
    pub fn on_battery<U: Toolkit>(&mut self, ui: &mut U, state: &BatteryState) -> Result<(), Error> {
        self.battery_text = format_battery(state);
        ui.set_text(self.battery_layer, &self.battery_text)
    }

    /// Connection handler.
    pub fn on_connection<U: Toolkit>(&mut self, ui: &mut U, connected: bool) -> Result<(), Error> {
        self.connection_text = format_connection(connected);
        debug!("connection {}", self.connection_text.as_str());
        ui.set_text(self.connection_layer, &self.connection_text)
    }

    pub fn time_text(&self) -> &str {
        &self.time_text
    }

    pub fn battery_text(&self) -> &str {
        &self.battery_text
    }

    pub fn connection_text(&self) -> &str {
        &self.connection_text
    }

    pub fn window(&self) -> WindowId {
        self.window
    }

    pub fn time_layer(&self) -> TextLayerId {
        self.time_layer
    }

    pub fn battery_layer(&self) -> TextLayerId {
        self.battery_layer
    }

    pub fn connection_layer(&self) -> TextLayerId {
        self.connection_layer
    }
}

/// Create and style one text layer, recording it in `slot`.
fn text_layer<U: Toolkit>(
    ui: &mut U,
    element: &TextElement,
    font: FontId,
    slot: &mut Option<TextLayerId>,
) -> Result<TextLayerId, Error> {
    let layer = *slot.insert(ui.create_text_layer(element.frame)?);
    ui.set_text_color(layer, element.color)?;
    ui.set_text_background(layer, element.background)?;
    ui.set_font(layer, font)?;
    ui.set_text_alignment(layer, element.alignment)?;
    if let Some(text) = element.placeholder {
        ui.set_text(layer, text)?;
    }
    Ok(layer)
}

/// Ledger of acquired handles.
#[derive(Default)]
struct Acquired {
    window: Option<WindowId>,
    clock_font: Option<FontId>,
    status_font: Option<FontId>,
    logo: Option<BitmapId>,
    logo_layer: Option<BitmapLayerId>,
    time_layer: Option<TextLayerId>,
    connection_layer: Option<TextLayerId>,
    battery_layer: Option<TextLayerId>,
}

impl Acquired {
    /// Layers first, then what they reference, the window last.
    fn release<U: Toolkit>(self, ui: &mut U) -> Result<(), Error> {
        let mut result = Ok(());

        for layer in [self.time_layer, self.connection_layer, self.battery_layer]
            .into_iter()
            .flatten()
        {
            keep_first(&mut result, ui.destroy_text_layer(layer));
        }
        if let Some(layer) = self.logo_layer {
            keep_first(&mut result, ui.destroy_bitmap_layer(layer));
        }
        if let Some(bitmap) = self.logo {
            keep_first(&mut result, ui.destroy_bitmap(bitmap));
        }
        for font in [self.status_font, self.clock_font].into_iter().flatten() {
            keep_first(&mut result, ui.unload_font(font));
        }
        if let Some(window) = self.window {
            keep_first(&mut result, ui.destroy_window(window));
        }

        result
    }
}

fn keep_first(acc: &mut Result<(), Error>, next: Result<(), Error>) {
    if acc.is_ok() {
        *acc = next;
    }
}

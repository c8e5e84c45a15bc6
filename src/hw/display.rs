//! SSD1306 panel bring-up and frame presentation.

use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;
use wristface::config::PANEL_I2C_ADDRESS;
use wristface::{Error, Scene};

/// 128x64 panel in buffered mode; `I2C` is whatever bus the HAL hands out.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Bring the panel up at [`PANEL_I2C_ADDRESS`] and blank it.
pub fn init<I2C>(i2c: I2C) -> Result<Display<I2C>, Error>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new_custom_address(i2c, PANEL_I2C_ADDRESS);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    display.init().map_err(|_| Error::Display)?;
    display.clear_buffer();
    display.flush().map_err(|_| Error::Display)?;
    Ok(display)
}

/// Push the scene to the panel if anything changed since the last frame.
pub fn present<I2C>(scene: &mut Scene, display: &mut Display<I2C>) -> Result<(), Error>
where
    I2C: embedded_hal::i2c::I2c,
{
    if !scene.is_dirty() {
        return Ok(());
    }
    scene.render(display).map_err(|_| Error::Display)?;
    display.flush().map_err(|_| Error::Display)
}

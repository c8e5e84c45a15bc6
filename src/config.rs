//! Compile-time configuration for the watchface and its board.
//!
//! Display geometry, text capacities, timing parameters, battery
//! calibration and BLE advertising constants live here so they can be
//! tuned in one place. There is no runtime configuration.

use crate::event::TickUnit;

// Display text capacities (bytes)

/// `"HH:MM:SS"`.
pub const TIME_TEXT_CAPACITY: usize = 8;

/// Sized for the longest status, `"100% charged"`.
pub const BATTERY_TEXT_CAPACITY: usize = 12;

/// Sized for `"disconnected"`.
pub const CONNECTION_TEXT_CAPACITY: usize = 12;

/// Longest text a scene text layer keeps.
pub const LAYER_TEXT_CAPACITY: usize = 16;

// Panel (SSD1306 128×64)

pub const PANEL_WIDTH: u16 = 128;
pub const PANEL_HEIGHT: u16 = 64;

/// 7-bit I²C address of the OLED controller.
pub const PANEL_I2C_ADDRESS: u8 = 0x3C;

// Scene capacities (slots per resource kind)

pub const MAX_WINDOWS: usize = 2;
pub const MAX_TEXT_LAYERS: usize = 4;
pub const MAX_BITMAP_LAYERS: usize = 2;
pub const MAX_BITMAPS: usize = 2;
pub const MAX_FONTS: usize = 2;

/// Layers attached to one window.
pub const MAX_CHILDREN: usize = 8;

// Layout (pixels, relative to the window's root frame)
//
//   +------------------------------+  y = 0
//   |            logo              |  LOGO_HEIGHT
//   |          13:05:09            |  TIME_Y .. TIME_Y + TIME_HEIGHT
//   |                              |
//   | 42% charged    connected     |  STATUS_Y .. STATUS_Y + STATUS_HEIGHT
//   +------------------------------+  y = PANEL_HEIGHT

pub const LOGO_HEIGHT: u16 = 16;
pub const TIME_Y: i16 = 20;
pub const TIME_HEIGHT: u16 = 22;
pub const STATUS_Y: i16 = 52;
pub const STATUS_HEIGHT: u16 = 12;

/// Left edge of the connection text; the battery text starts at x = 0.
pub const CONNECTION_X: i16 = 64;

// Timing

/// Granularity of the tick subscription.
pub const TICK_UNIT: TickUnit = TickUnit::Second;

/// Local time offset from UTC (seconds). The board has no timezone database.
pub const UTC_OFFSET_SECS: i32 = 0;

/// How often the battery monitor samples the SAADC (seconds).
pub const BATTERY_POLL_SECS: u64 = 5;

// Battery (LiPo, 1:2 divider into a 12-bit SAADC with 3.3 V reference)

/// Largest raw value a 12-bit SAADC conversion produces.
pub const ADC_MAX_RAW: i16 = 4095;

/// Discharge curve, highest voltage first: (millivolts, percent).
/// Linear interpolation between points.
pub const DISCHARGE_CURVE: [(u16, u8); 8] = [
    (4180, 100),
    (4100, 90),
    (3970, 75),
    (3870, 55),
    (3800, 40),
    (3730, 20),
    (3600, 5),
    (3300, 0),
];

/// Changes smaller than this (percent) are not reported as battery events.
pub const BATTERY_REPORT_HYSTERESIS: u8 = 1;

// BLE

/// Advertised device name.
pub const BLE_DEVICE_NAME: &str = "wristface";

/// Advertising interval (in 0.625 ms units). 800 = 500 ms.
pub const BLE_ADV_INTERVAL: u32 = 800;

// GPIO pin assignments
//
// These are logical names; actual `embassy_nrf::peripherals::*` types are
// selected in `main.rs`.  Adjust for your custom PCB.
//
//   Battery voltage (AIN7) → P0.31
//   Charge indicator       → P0.12 (low while charging)
//   I²C SDA                → P0.26
//   I²C SCL                → P0.27

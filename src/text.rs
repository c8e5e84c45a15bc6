//! Bounded display text and the three formatters.
//!
//! Each piece of text shown on the face lives in a fixed-capacity
//! [`DisplayText`]. Writes past capacity are dropped at a character
//! boundary instead of overflowing, and truncation is never reported as
//! a formatting error.

use core::fmt::{self, Write};

use heapless::String;

use crate::config::{BATTERY_TEXT_CAPACITY, CONNECTION_TEXT_CAPACITY, TIME_TEXT_CAPACITY};
use crate::event::{BatteryState, TimeSample};

/// Shown instead of the percentage while the charger is connected.
pub const CHARGING_LABEL: &str = "charging";
pub const CONNECTED_LABEL: &str = "connected";
pub const DISCONNECTED_LABEL: &str = "disconnected";

/// Fixed-capacity text buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayText<const N: usize> {
    buf: String<N>,
    truncated: bool,
}

pub type TimeText = DisplayText<TIME_TEXT_CAPACITY>;
pub type BatteryText = DisplayText<BATTERY_TEXT_CAPACITY>;
pub type ConnectionText = DisplayText<CONNECTION_TEXT_CAPACITY>;

impl<const N: usize> DisplayText<N> {
    pub const fn new() -> Self {
        Self {
            buf: String::new(),
            truncated: false,
        }
    }

    /// Buffer holding `text`, truncated to `N` bytes.
    pub fn from_str_truncated(text: &str) -> Self {
        let mut out = Self::new();
        out.set(text);
        out
    }

    /// Replace the contents with `text`.
    pub fn set(&mut self, text: &str) {
        self.clear();
        let _ = self.write_str(text);
    }

    /// Replace the contents with formatted output.
    pub fn set_fmt(&mut self, args: fmt::Arguments<'_>) {
        self.clear();
        let _ = self.write_fmt(args);
    }

    pub fn clear(&mut self) {
        self.buf.clear();
        self.truncated = false;
    }

    pub fn as_str(&self) -> &str {
        self.buf.as_str()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Whether the last write lost characters to the capacity limit.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const N: usize> Write for DisplayText<N> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }
        for c in s.chars() {
            if self.buf.push(c).is_err() {
                self.truncated = true;
                break;
            }
        }
        Ok(())
    }
}

impl<const N: usize> core::ops::Deref for DisplayText<N> {
    type Target = str;

    fn deref(&self) -> &str {
        self.as_str()
    }
}

/// `HH:MM:SS`, 24-hour, zero-padded.
pub fn format_time(sample: &TimeSample) -> TimeText {
    let mut text = TimeText::new();
    text.set_fmt(format_args!(
        "{:02}:{:02}:{:02}",
        sample.hour(),
        sample.minute(),
        sample.second()
    ));
    text
}

/// `"charging"` while charging (the percentage is not shown), otherwise
/// `"<percent>% charged"`.
pub fn format_battery(state: &BatteryState) -> BatteryText {
    let mut text = BatteryText::new();
    if state.is_charging {
        text.set(CHARGING_LABEL);
    } else {
        text.set_fmt(format_args!("{}% charged", state.charge_percent));
    }
    text
}

pub fn connection_label(connected: bool) -> &'static str {
    if connected {
        CONNECTED_LABEL
    } else {
        DISCONNECTED_LABEL
    }
}

pub fn format_connection(connected: bool) -> ConnectionText {
    ConnectionText::from_str_truncated(connection_label(connected))
}

//! Board support for the nRF52840 firmware.
//!
//! Producers (the battery monitor and the BLE task) publish into the
//! statics below; only the main loop touches the display.

pub mod battery;
pub mod ble;
pub mod clock;
pub mod display;
pub mod sources;

use core::cell::Cell;
use core::sync::atomic::{AtomicBool, Ordering};

use embassy_nrf::config::Config;
use embassy_nrf::interrupt::Priority;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;
use wristface::BatteryState;

/// Latest battery reading, read by `peek_battery`.
static BATTERY: Mutex<CriticalSectionRawMutex, Cell<BatteryState>> =
    Mutex::new(Cell::new(BatteryState::new(100, false)));

/// Raised when the battery monitor reports a change.
pub static BATTERY_CHANGED: Signal<CriticalSectionRawMutex, BatteryState> = Signal::new();

static CONNECTED: AtomicBool = AtomicBool::new(false);

/// Raised on every BLE connect / disconnect.
pub static CONNECTION_CHANGED: Signal<CriticalSectionRawMutex, bool> = Signal::new();

pub fn battery() -> BatteryState {
    BATTERY.lock(|b| b.get())
}

/// Record a reading without raising an event.
pub fn store_battery(state: BatteryState) {
    BATTERY.lock(|b| b.set(state));
}

pub fn publish_battery(state: BatteryState) {
    store_battery(state);
    BATTERY_CHANGED.signal(state);
}

pub fn connected() -> bool {
    CONNECTED.load(Ordering::Acquire)
}

pub fn publish_connection(connected: bool) {
    CONNECTED.store(connected, Ordering::Release);
    CONNECTION_CHANGED.signal(connected);
}

/// HAL configuration compatible with the SoftDevice.
///
/// Priorities 0, 1 and 4 are reserved for the SoftDevice.
pub fn nrf_config() -> Config {
    let mut config = Config::default();
    config.gpiote_interrupt_priority = Priority::P2;
    config.time_interrupt_priority = Priority::P2;
    config
}

//! Host-testable core of the wristface watchface.
//!
//! Everything that does not touch hardware lives here: text formatting,
//! the watchface handlers, the lifecycle manager and the `embedded-graphics`
//! scene that rasterises the face. The embedded binary (`main.rs`, behind
//! the `embedded` feature) wires these to embassy, the SoftDevice and the
//! SSD1306 panel.
//!
//! Usage: `cargo test --lib` / `cargo test --test integration`
//!
//! Firmware: `cargo run --release --features embedded --target thumbv7em-none-eabihf`

#![cfg_attr(not(test), no_std)]

#[macro_use]
mod fmt;

pub mod app;
pub mod config;
pub mod error;
pub mod event;
pub mod face;
pub mod layout;
pub mod platform;
pub mod power_logic;
pub mod resources;
pub mod scene;
pub mod text;

pub use app::App;
pub use error::Error;
pub use event::{BatteryState, Event, Subscriptions, TickUnit, TimeSample};
pub use face::Watchface;
pub use scene::Scene;

// ═══════════════════════════════════════════════════════════════════════════
// Unit Tests - handlers on the real scene
// ═══════════════════════════════════════════════════════════════════════════

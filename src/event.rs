//! Values delivered by the notification sources.
//!
//! None of these are persisted: each one lives only as long as the event
//! that carries it.

use chrono::{DateTime, NaiveTime, Timelike};

/// Wall-clock time of day, decomposed and validated (24h).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimeSample {
    hour: u8,
    minute: u8,
    second: u8,
}

impl TimeSample {
    pub const MIDNIGHT: Self = Self {
        hour: 0,
        minute: 0,
        second: 0,
    };

    /// Build from components. Returns `None` outside `00:00:00..=23:59:59`.
    pub fn new(hour: u8, minute: u8, second: u8) -> Option<Self> {
        NaiveTime::from_hms_opt(hour.into(), minute.into(), second.into())
            .map(|t| Self::from_time(&t))
    }

    /// Decompose any `chrono` time-of-day value.
    pub fn from_time<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
            second: time.second() as u8,
        }
    }

    /// Local time of day for a Unix timestamp shifted by `utc_offset_secs`.
    pub fn from_timestamp(epoch_secs: i64, utc_offset_secs: i32) -> Option<Self> {
        let local = epoch_secs.checked_add(utc_offset_secs.into())?;
        DateTime::from_timestamp(local, 0).map(|dt| Self::from_time(&dt.time()))
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    pub fn second(&self) -> u8 {
        self.second
    }
}

/// Battery reading as reported by the power service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryState {
    /// State of charge, 0–100.
    pub charge_percent: u8,
    /// Charger connected and charging.
    pub is_charging: bool,
}

impl BatteryState {
    pub const fn new(charge_percent: u8, is_charging: bool) -> Self {
        Self {
            charge_percent,
            is_charging,
        }
    }
}

/// Granularity of tick notifications.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickUnit {
    Second,
    Minute,
}

impl TickUnit {
    /// Whether moving from `prev` to `next` crosses this unit's boundary.
    pub fn fires(self, prev: &TimeSample, next: &TimeSample) -> bool {
        match self {
            TickUnit::Second => prev != next,
            TickUnit::Minute => (prev.hour, prev.minute) != (next.hour, next.minute),
        }
    }

    /// Milliseconds from `uptime_ms` to the next half-second mark.
    ///
    /// The wall clock rolls over on whole seconds of uptime, so a once a
    /// second poll started at this mark samples every second near its
    /// middle and jitter cannot put two polls in the same second.
    pub const fn phase_delay_ms(uptime_ms: u64) -> u64 {
        let into_second = uptime_ms % 1000;
        if into_second < 500 {
            500 - into_second
        } else {
            1500 - into_second
        }
    }
}

/// A notification delivered to the watchface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Periodic tick carrying the current local time.
    Tick(TimeSample),
    /// Charge state changed.
    Battery(BatteryState),
    /// Bluetooth link came up (`true`) or went down (`false`).
    Connection(bool),
}

/// Which notification services currently have a subscriber.
///
/// Event sources keep one of these and drop events nobody asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Subscriptions {
    pub tick: Option<TickUnit>,
    pub battery: bool,
    pub connection: bool,
}

impl Subscriptions {
    /// Whether `event` should be delivered.
    pub fn accepts(&self, event: &Event) -> bool {
        match event {
            Event::Tick(_) => self.tick.is_some(),
            Event::Battery(_) => self.battery,
            Event::Connection(_) => self.connection,
        }
    }

    /// True once every service has been unsubscribed.
    pub fn is_empty(&self) -> bool {
        self.tick.is_none() && !self.battery && !self.connection
    }
}

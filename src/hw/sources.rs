//! Notification sources backed by the board statics.

use wristface::error::Error;
use wristface::platform::{BatterySource, ConnectionSource, TickSource};
use wristface::{BatteryState, Event, Subscriptions, TickUnit, TimeSample};

use super::clock;

/// Tracks what the app subscribed to and gates events accordingly.
pub struct DeviceSources {
    subscriptions: Subscriptions,
    last_tick: TimeSample,
}

impl DeviceSources {
    pub fn new() -> Self {
        Self {
            subscriptions: Subscriptions::default(),
            last_tick: clock::now(),
        }
    }

    /// Tick event for the current time, if the subscribed unit rolled over.
    pub fn tick(&mut self) -> Option<Event> {
        let unit = self.subscriptions.tick?;
        let now = clock::now();
        let fired = unit.fires(&self.last_tick, &now);
        self.last_tick = now;
        fired.then_some(Event::Tick(now))
    }

    /// Pass `event` through only if its service is subscribed.
    pub fn filter(&self, event: Event) -> Option<Event> {
        self.subscriptions.accepts(&event).then_some(event)
    }
}

impl TickSource for DeviceSources {
    fn subscribe_ticks(&mut self, unit: TickUnit) -> Result<(), Error> {
        self.subscriptions.tick = Some(unit);
        self.last_tick = clock::now();
        Ok(())
    }

    fn unsubscribe_ticks(&mut self) {
        self.subscriptions.tick = None;
    }

    fn now(&self) -> TimeSample {
        clock::now()
    }
}

impl BatterySource for DeviceSources {
    fn subscribe_battery(&mut self) -> Result<(), Error> {
        self.subscriptions.battery = true;
        Ok(())
    }

    fn unsubscribe_battery(&mut self) {
        self.subscriptions.battery = false;
    }

    fn peek_battery(&self) -> BatteryState {
        super::battery()
    }
}

impl ConnectionSource for DeviceSources {
    fn subscribe_connection(&mut self) -> Result<(), Error> {
        self.subscriptions.connection = true;
        Ok(())
    }

    fn unsubscribe_connection(&mut self) {
        self.subscriptions.connection = false;
    }

    fn peek_connection(&self) -> bool {
        super::connected()
    }
}

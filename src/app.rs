//! Lifecycle manager: startup, event dispatch and shutdown.
//!
//! An [`App`] exists only between a successful [`App::init`] and
//! [`App::deinit`], which consumes it. While it exists the watchface is on
//! screen and subscribed to all three notification sources.

use crate::config::TICK_UNIT;
use crate::error::Error;
use crate::event::{BatteryState, Event, TimeSample};
use crate::face::Watchface;
use crate::platform::{EventSources, Toolkit};

pub struct App<'a, U: Toolkit, P: EventSources> {
    ui: &'a mut U,
    sources: &'a mut P,
    face: Watchface,
}

impl<'a, U: Toolkit, P: EventSources> App<'a, U, P> {
    /// Build the face, render it once from the current state and subscribe
    /// to ticks, battery and connectivity.
    ///
    /// On failure nothing stays acquired or subscribed.
    pub fn init(ui: &'a mut U, sources: &'a mut P) -> Result<Self, Error> {
        let mut face = Watchface::create(ui)?;

        if let Err(e) = Self::start(&mut face, ui, sources) {
            warn!("startup failed: {}", e);
            unsubscribe_all(sources);
            if let Err(release_err) = face.destroy(ui) {
                warn!("release after failed startup: {}", release_err);
            }
            return Err(e);
        }

        info!("watchface up: {}", face.time_text());
        Ok(Self { ui, sources, face })
    }

    fn start(face: &mut Watchface, ui: &mut U, sources: &mut P) -> Result<(), Error> {
        let now = sources.now();
        face.on_tick(ui, &*sources, &now)?;
        face.on_connection(ui, sources.peek_connection())?;

        sources.subscribe_ticks(TICK_UNIT)?;
        sources.subscribe_battery()?;
        sources.subscribe_connection()?;
        Ok(())
    }

    /// Route one notification to its handler.
    pub fn dispatch(&mut self, event: Event) -> Result<(), Error> {
        match event {
            Event::Tick(sample) => self.on_tick(&sample),
            Event::Battery(state) => self.on_battery(&state),
            Event::Connection(connected) => self.on_connection(connected),
        }
    }

    pub fn on_tick(&mut self, sample: &TimeSample) -> Result<(), Error> {
        self.face.on_tick(&mut *self.ui, &*self.sources, sample)
    }

    pub fn on_battery(&mut self, state: &BatteryState) -> Result<(), Error> {
        self.face.on_battery(&mut *self.ui, state)
    }

    pub fn on_connection(&mut self, connected: bool) -> Result<(), Error> {
        self.face.on_connection(&mut *self.ui, connected)
    }

    /// Dispatch every event, then shut down.
    ///
    /// Handler errors are logged and do not stop the loop.
    pub fn run<I>(mut self, events: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = Event>,
    {
        for event in events {
            if let Err(e) = self.dispatch(event) {
                warn!("handler failed for {}: {}", event, e);
            }
        }
        self.deinit()
    }

    /// Unsubscribe everything and release every resource taken in
    /// [`App::init`].
    pub fn deinit(self) -> Result<(), Error> {
        let Self { ui, sources, face } = self;
        unsubscribe_all(sources);
        let result = face.destroy(ui);
        match result {
            Ok(()) => info!("watchface down"),
            Err(e) => warn!("shutdown incomplete: {}", e),
        }
        result
    }

    pub fn face(&self) -> &Watchface {
        &self.face
    }

    pub fn ui(&self) -> &U {
        &*self.ui
    }

    pub fn ui_mut(&mut self) -> &mut U {
        &mut *self.ui
    }

    pub fn sources(&self) -> &P {
        &*self.sources
    }

    pub fn sources_mut(&mut self) -> &mut P {
        &mut *self.sources
    }
}

fn unsubscribe_all<P: EventSources>(sources: &mut P) {
    sources.unsubscribe_ticks();
    sources.unsubscribe_battery();
    sources.unsubscribe_connection();
}

//! Integration tests for the watchface lifecycle against recording doubles
//! and against the real scene.

use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use wristface::config::{PANEL_HEIGHT, PANEL_WIDTH};
use wristface::error::{Resource, Service};
use wristface::platform::{
    BatterySource, BitmapAlignment, BitmapId, BitmapLayerId, Child, Color, CompositingMode,
    ConnectionSource, FontId, Rect, TextAlignment, TextLayerId, TickSource, Toolkit, WindowId,
};
use wristface::resources::{FontResource, ImageResource};
use wristface::{App, BatteryState, Error, Event, Scene, Subscriptions, TickUnit, TimeSample};

// ═══════════════════════════════════════════════════════════════════════════
// Recording toolkit
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Kind {
    next: u8,
    live: BTreeSet<u8>,
    created: usize,
    destroyed: usize,
}

impl Kind {
    fn create(&mut self) -> u8 {
        let id = self.next;
        self.next += 1;
        self.live.insert(id);
        self.created += 1;
        id
    }

    fn destroy(&mut self, id: u8, resource: Resource) -> Result<(), Error> {
        if !self.live.remove(&id) {
            return Err(Error::InvalidHandle(resource));
        }
        self.destroyed += 1;
        Ok(())
    }

    fn check(&self, id: u8, resource: Resource) -> Result<(), Error> {
        if self.live.contains(&id) {
            Ok(())
        } else {
            Err(Error::InvalidHandle(resource))
        }
    }
}

#[derive(Default)]
struct RecordingToolkit {
    windows: Kind,
    text_layers: Kind,
    bitmap_layers: Kind,
    bitmaps: Kind,
    fonts: Kind,
    /// Fail the create call with this zero-based index.
    fail_create_at: Option<usize>,
    creates: usize,
    fail_set_text: bool,
    texts: HashMap<u8, String>,
    set_text_calls: usize,
    children: Vec<Child>,
    pushed: Vec<WindowId>,
    destroy_log: Vec<Resource>,
}

impl RecordingToolkit {
    fn failing_at(n: usize) -> Self {
        Self {
            fail_create_at: Some(n),
            ..Self::default()
        }
    }

    fn gate(&mut self, resource: Resource) -> Result<(), Error> {
        let n = self.creates;
        self.creates += 1;
        if self.fail_create_at == Some(n) {
            Err(Error::ResourceExhausted(resource))
        } else {
            Ok(())
        }
    }

    fn kinds(&self) -> [&Kind; 5] {
        [
            &self.windows,
            &self.text_layers,
            &self.bitmap_layers,
            &self.bitmaps,
            &self.fonts,
        ]
    }

    fn live(&self) -> usize {
        self.kinds().iter().map(|k| k.live.len()).sum()
    }

    fn all_released_once(&self) -> bool {
        self.kinds()
            .iter()
            .all(|k| k.live.is_empty() && k.created == k.destroyed)
    }

    fn text(&self, layer: TextLayerId) -> &str {
        self.texts
            .get(&(layer.index() as u8))
            .map(String::as_str)
            .unwrap_or("")
    }
}

impl Toolkit for RecordingToolkit {
    fn create_window(&mut self) -> Result<WindowId, Error> {
        self.gate(Resource::Window)?;
        Ok(WindowId::new(self.windows.create()))
    }

    fn destroy_window(&mut self, window: WindowId) -> Result<(), Error> {
        self.destroy_log.push(Resource::Window);
        self.windows.destroy(window.index() as u8, Resource::Window)
    }

    fn push_window(&mut self, window: WindowId, _animated: bool) -> Result<(), Error> {
        self.windows.check(window.index() as u8, Resource::Window)?;
        self.pushed.push(window);
        Ok(())
    }

    fn set_window_background(&mut self, window: WindowId, _color: Color) -> Result<(), Error> {
        self.windows.check(window.index() as u8, Resource::Window)
    }

    fn root_frame(&self, window: WindowId) -> Result<Rect, Error> {
        self.windows.check(window.index() as u8, Resource::Window)?;
        Ok(Rect::sized(PANEL_WIDTH, PANEL_HEIGHT))
    }

    fn add_child(&mut self, window: WindowId, child: Child) -> Result<(), Error> {
        self.windows.check(window.index() as u8, Resource::Window)?;
        self.children.push(child);
        Ok(())
    }

    fn load_font(&mut self, _resource: FontResource) -> Result<FontId, Error> {
        self.gate(Resource::Font)?;
        Ok(FontId::new(self.fonts.create()))
    }

    fn unload_font(&mut self, font: FontId) -> Result<(), Error> {
        self.destroy_log.push(Resource::Font);
        self.fonts.destroy(font.index() as u8, Resource::Font)
    }

    fn create_text_layer(&mut self, _frame: Rect) -> Result<TextLayerId, Error> {
        self.gate(Resource::TextLayer)?;
        Ok(TextLayerId::new(self.text_layers.create()))
    }

    fn destroy_text_layer(&mut self, layer: TextLayerId) -> Result<(), Error> {
        self.destroy_log.push(Resource::TextLayer);
        self.text_layers
            .destroy(layer.index() as u8, Resource::TextLayer)
    }

    fn set_text(&mut self, layer: TextLayerId, text: &str) -> Result<(), Error> {
        let id = layer.index() as u8;
        self.text_layers.check(id, Resource::TextLayer)?;
        self.set_text_calls += 1;
        if self.fail_set_text {
            return Err(Error::InvalidHandle(Resource::TextLayer));
        }
        self.texts.insert(id, text.to_owned());
        Ok(())
    }

    fn set_text_color(&mut self, layer: TextLayerId, _color: Color) -> Result<(), Error> {
        self.text_layers
            .check(layer.index() as u8, Resource::TextLayer)
    }

    fn set_text_background(&mut self, layer: TextLayerId, _color: Color) -> Result<(), Error> {
        self.text_layers
            .check(layer.index() as u8, Resource::TextLayer)
    }

    fn set_font(&mut self, layer: TextLayerId, font: FontId) -> Result<(), Error> {
        self.fonts.check(font.index() as u8, Resource::Font)?;
        self.text_layers
            .check(layer.index() as u8, Resource::TextLayer)
    }

    fn set_text_alignment(
        &mut self,
        layer: TextLayerId,
        _alignment: TextAlignment,
    ) -> Result<(), Error> {
        self.text_layers
            .check(layer.index() as u8, Resource::TextLayer)
    }

    fn create_bitmap(&mut self, _resource: ImageResource) -> Result<BitmapId, Error> {
        self.gate(Resource::Bitmap)?;
        Ok(BitmapId::new(self.bitmaps.create()))
    }

    fn destroy_bitmap(&mut self, bitmap: BitmapId) -> Result<(), Error> {
        self.destroy_log.push(Resource::Bitmap);
        self.bitmaps.destroy(bitmap.index() as u8, Resource::Bitmap)
    }

    fn create_bitmap_layer(&mut self, _frame: Rect) -> Result<BitmapLayerId, Error> {
        self.gate(Resource::BitmapLayer)?;
        Ok(BitmapLayerId::new(self.bitmap_layers.create()))
    }

    fn destroy_bitmap_layer(&mut self, layer: BitmapLayerId) -> Result<(), Error> {
        self.destroy_log.push(Resource::BitmapLayer);
        self.bitmap_layers
            .destroy(layer.index() as u8, Resource::BitmapLayer)
    }

    fn set_bitmap(&mut self, layer: BitmapLayerId, bitmap: BitmapId) -> Result<(), Error> {
        self.bitmaps.check(bitmap.index() as u8, Resource::Bitmap)?;
        self.bitmap_layers
            .check(layer.index() as u8, Resource::BitmapLayer)
    }

    fn set_bitmap_background(&mut self, layer: BitmapLayerId, _color: Color) -> Result<(), Error> {
        self.bitmap_layers
            .check(layer.index() as u8, Resource::BitmapLayer)
    }

    fn set_compositing_mode(
        &mut self,
        layer: BitmapLayerId,
        _mode: CompositingMode,
    ) -> Result<(), Error> {
        self.bitmap_layers
            .check(layer.index() as u8, Resource::BitmapLayer)
    }

    fn set_bitmap_alignment(
        &mut self,
        layer: BitmapLayerId,
        _alignment: BitmapAlignment,
    ) -> Result<(), Error> {
        self.bitmap_layers
            .check(layer.index() as u8, Resource::BitmapLayer)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Fake notification sources
// ═══════════════════════════════════════════════════════════════════════════

struct FakeSources {
    now: TimeSample,
    battery: BatteryState,
    connected: bool,
    battery_peeks: Cell<usize>,
    connection_peeks: Cell<usize>,
    subscriptions: Subscriptions,
    refuse: Option<Service>,
}

impl FakeSources {
    fn new(now: TimeSample, battery: BatteryState, connected: bool) -> Self {
        Self {
            now,
            battery,
            connected,
            battery_peeks: Cell::new(0),
            connection_peeks: Cell::new(0),
            subscriptions: Subscriptions::default(),
            refuse: None,
        }
    }

    fn subscribe(&self, service: Service) -> Result<(), Error> {
        if self.refuse == Some(service) {
            Err(Error::Subscribe(service))
        } else {
            Ok(())
        }
    }
}

impl TickSource for FakeSources {
    fn subscribe_ticks(&mut self, unit: TickUnit) -> Result<(), Error> {
        self.subscribe(Service::Tick)?;
        self.subscriptions.tick = Some(unit);
        Ok(())
    }

    fn unsubscribe_ticks(&mut self) {
        self.subscriptions.tick = None;
    }

    fn now(&self) -> TimeSample {
        self.now
    }
}

impl BatterySource for FakeSources {
    fn subscribe_battery(&mut self) -> Result<(), Error> {
        self.subscribe(Service::Battery)?;
        self.subscriptions.battery = true;
        Ok(())
    }

    fn unsubscribe_battery(&mut self) {
        self.subscriptions.battery = false;
    }

    fn peek_battery(&self) -> BatteryState {
        self.battery_peeks.set(self.battery_peeks.get() + 1);
        self.battery
    }
}

impl ConnectionSource for FakeSources {
    fn subscribe_connection(&mut self) -> Result<(), Error> {
        self.subscribe(Service::Connection)?;
        self.subscriptions.connection = true;
        Ok(())
    }

    fn unsubscribe_connection(&mut self) {
        self.subscriptions.connection = false;
    }

    fn peek_connection(&self) -> bool {
        self.connection_peeks.set(self.connection_peeks.get() + 1);
        self.connected
    }
}

fn time(h: u8, m: u8, s: u8) -> TimeSample {
    TimeSample::new(h, m, s).unwrap()
}

fn default_sources() -> FakeSources {
    FakeSources::new(time(13, 5, 9), BatteryState::new(42, false), false)
}

// ═══════════════════════════════════════════════════════════════════════════
// Lifecycle
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn startup_renders_current_state_and_subscribes() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    let app = App::init(&mut ui, &mut sources).unwrap();

    let face = app.face();
    assert_eq!(face.time_text(), "13:05:09");
    assert_eq!(face.battery_text(), "42% charged");
    assert_eq!(face.connection_text(), "disconnected");
    assert_eq!(app.ui().text(face.time_layer()), "13:05:09");
    assert_eq!(app.ui().text(face.battery_layer()), "42% charged");
    assert_eq!(app.ui().text(face.connection_layer()), "disconnected");

    assert_eq!(app.ui().pushed, vec![face.window()]);
    assert_eq!(app.ui().children.len(), 4);
    assert_eq!(app.ui().live(), 8);

    let subs = app.sources().subscriptions;
    assert_eq!(subs.tick, Some(TickUnit::Second));
    assert!(subs.battery && subs.connection);

    app.deinit().unwrap();
}

#[test]
fn startup_uses_real_connection_state() {
    let mut ui = RecordingToolkit::default();
    let mut sources = FakeSources::new(time(0, 0, 0), BatteryState::new(100, false), true);
    let app = App::init(&mut ui, &mut sources).unwrap();
    assert_eq!(app.face().connection_text(), "connected");
    assert_eq!(app.sources().connection_peeks.get(), 1);
    app.deinit().unwrap();
}

#[test]
fn handlers_follow_events() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    let mut app = App::init(&mut ui, &mut sources).unwrap();

    app.dispatch(Event::Battery(BatteryState::new(5, true)))
        .unwrap();
    assert_eq!(app.face().battery_text(), "charging");

    app.dispatch(Event::Connection(true)).unwrap();
    assert_eq!(app.face().connection_text(), "connected");
    app.dispatch(Event::Connection(false)).unwrap();
    assert_eq!(app.face().connection_text(), "disconnected");

    // A tick re-reads the battery, replacing the "charging" text.
    app.dispatch(Event::Tick(time(23, 59, 59))).unwrap();
    assert_eq!(app.face().time_text(), "23:59:59");
    assert_eq!(app.face().battery_text(), "42% charged");
    let layer = app.face().battery_layer();
    assert_eq!(app.ui().text(layer), "42% charged");

    app.deinit().unwrap();
}

#[test]
fn each_tick_peeks_battery_once() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    let mut app = App::init(&mut ui, &mut sources).unwrap();
    assert_eq!(app.sources().battery_peeks.get(), 1);

    for s in 10..15 {
        app.dispatch(Event::Tick(time(13, 5, s))).unwrap();
    }
    assert_eq!(app.sources().battery_peeks.get(), 6);

    // Battery and connection events do not peek.
    app.dispatch(Event::Battery(BatteryState::new(41, false)))
        .unwrap();
    app.dispatch(Event::Connection(true)).unwrap();
    assert_eq!(app.sources().battery_peeks.get(), 6);

    app.deinit().unwrap();
}

#[test]
fn shutdown_releases_everything_exactly_once() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    App::init(&mut ui, &mut sources)
        .unwrap()
        .deinit()
        .unwrap();

    assert!(ui.all_released_once());
    assert_eq!(ui.windows.created, 1);
    assert_eq!(ui.text_layers.created, 3);
    assert_eq!(ui.bitmap_layers.created, 1);
    assert_eq!(ui.bitmaps.created, 1);
    assert_eq!(ui.fonts.created, 2);
    assert!(sources.subscriptions.is_empty());
}

#[test]
fn shutdown_releases_layers_before_what_they_reference() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    App::init(&mut ui, &mut sources)
        .unwrap()
        .deinit()
        .unwrap();

    assert_eq!(
        ui.destroy_log,
        vec![
            Resource::TextLayer,
            Resource::TextLayer,
            Resource::TextLayer,
            Resource::BitmapLayer,
            Resource::Bitmap,
            Resource::Font,
            Resource::Font,
            Resource::Window,
        ]
    );
}

#[test]
fn failed_create_rolls_back_at_every_step() {
    // Eight creates in total: window, two fonts, bitmap, bitmap layer,
    // three text layers.
    for n in 0..8 {
        let mut ui = RecordingToolkit::failing_at(n);
        let mut sources = default_sources();
        let result = App::init(&mut ui, &mut sources);
        assert!(
            matches!(result, Err(Error::ResourceExhausted(_))),
            "create #{} should fail",
            n
        );
        assert!(ui.all_released_once(), "leak after failing create #{}", n);
        assert_eq!(ui.windows.created + ui.fonts.created, n.min(3));
        assert!(sources.subscriptions.is_empty());
    }
}

#[test]
fn refused_subscription_rolls_back() {
    for service in [Service::Tick, Service::Battery, Service::Connection] {
        let mut ui = RecordingToolkit::default();
        let mut sources = default_sources();
        sources.refuse = Some(service);

        let result = App::init(&mut ui, &mut sources);
        assert_eq!(result.err(), Some(Error::Subscribe(service)));
        assert!(ui.all_released_once());
        assert_eq!(ui.live(), 0);
        assert!(sources.subscriptions.is_empty());
    }
}

#[test]
fn run_dispatches_then_shuts_down() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    let app = App::init(&mut ui, &mut sources).unwrap();

    app.run([
        Event::Tick(time(13, 5, 10)),
        Event::Battery(BatteryState::new(5, true)),
        Event::Connection(true),
    ])
    .unwrap();

    assert!(ui.all_released_once());
    assert_eq!(ui.texts.values().filter(|t| *t == "charging").count(), 1);
    assert_eq!(ui.texts.values().filter(|t| *t == "connected").count(), 1);
    assert_eq!(ui.texts.values().filter(|t| *t == "13:05:10").count(), 1);
}

#[test]
fn run_keeps_going_after_handler_errors() {
    let mut ui = RecordingToolkit::default();
    let mut sources = default_sources();
    let mut app = App::init(&mut ui, &mut sources).unwrap();
    app.ui_mut().fail_set_text = true;
    let before = app.ui().set_text_calls;

    app.run([Event::Connection(true), Event::Connection(false)])
        .unwrap();

    assert_eq!(ui.set_text_calls, before + 2);
    assert!(ui.all_released_once());
}

// ═══════════════════════════════════════════════════════════════════════════
// End to end on the real scene
// ═══════════════════════════════════════════════════════════════════════════

/// Counts lit pixels; out-of-bounds writes are a test failure.
struct Panel {
    on: Vec<bool>,
}

impl Panel {
    fn new() -> Self {
        Self {
            on: vec![false; PANEL_WIDTH as usize * PANEL_HEIGHT as usize],
        }
    }

    fn lit(&self) -> usize {
        self.on.iter().filter(|p| **p).count()
    }
}

impl OriginDimensions for Panel {
    fn size(&self) -> Size {
        Size::new(PANEL_WIDTH as u32, PANEL_HEIGHT as u32)
    }
}

impl DrawTarget for Panel {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<BinaryColor>>,
    {
        for Pixel(p, c) in pixels {
            assert!(
                (0..PANEL_WIDTH as i32).contains(&p.x) && (0..PANEL_HEIGHT as i32).contains(&p.y),
                "pixel {:?} outside panel",
                p
            );
            self.on[p.y as usize * PANEL_WIDTH as usize + p.x as usize] = c.is_on();
        }
        Ok(())
    }
}

#[test]
fn scene_end_to_end() {
    let mut scene = Scene::new(PANEL_WIDTH, PANEL_HEIGHT);
    let mut sources = default_sources();
    let mut app = App::init(&mut scene, &mut sources).unwrap();
    assert!(app.ui().is_dirty());

    let mut panel = Panel::new();
    app.ui_mut().render(&mut panel).unwrap();
    let full = PANEL_WIDTH as usize * PANEL_HEIGHT as usize;
    let lit = panel.lit();
    // White background with black ink: mostly lit, never fully.
    assert!(lit > full / 2 && lit < full);
    let before = panel.on.clone();
    assert!(!app.ui().is_dirty());

    app.dispatch(Event::Tick(time(13, 5, 9))).unwrap();
    assert!(!app.ui().is_dirty(), "same text should not redraw");

    app.dispatch(Event::Tick(time(18, 48, 48))).unwrap();
    assert!(app.ui().is_dirty());
    app.ui_mut().render(&mut panel).unwrap();
    assert_ne!(panel.on, before);

    app.deinit().unwrap();
    assert_eq!(scene.live().total(), 0);
    assert_eq!(scene.top_window(), None);
}

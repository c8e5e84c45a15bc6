//! wristface firmware - nRF52840 + SSD1306 watchface.
//!
//! Tasks:
//! - `softdevice_task`: runs the SoftDevice event loop
//! - `ble_task`: advertises and serves the Battery Service
//! - `battery_task`: samples the battery and publishes changes
//! - main: owns the watchface and the display, dispatches events

#![no_std]
#![no_main]

mod hw;

use defmt::{info, unwrap, warn};
use defmt_rtt as _;
use panic_probe as _;

use embassy_executor::Spawner;
use embassy_futures::select::{select3, Either3};
use embassy_nrf::gpio::{Input, Pull};
use embassy_nrf::interrupt::{self, InterruptExt, Priority};
use embassy_nrf::saadc::{self, ChannelConfig, Resolution, Saadc};
use embassy_nrf::twim::{self, Twim};
use embassy_nrf::{bind_interrupts, peripherals};
use embassy_time::{Duration, Ticker};
use nrf_softdevice::Softdevice;
use static_cell::StaticCell;
use wristface::config::{PANEL_HEIGHT, PANEL_WIDTH};
use wristface::{App, Event, Scene};

use hw::battery::BatteryMonitor;
use hw::ble::Server;
use hw::sources::DeviceSources;

bind_interrupts!(struct Irqs {
    SAADC => saadc::InterruptHandler;
    SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1 => twim::InterruptHandler<peripherals::TWISPI1>;
});

static SERVER: StaticCell<Server> = StaticCell::new();

#[embassy_executor::task]
async fn softdevice_task(sd: &'static Softdevice) -> ! {
    sd.run().await
}

#[embassy_executor::task]
async fn ble_task(sd: &'static Softdevice, server: &'static Server) -> ! {
    hw::ble::run(sd, server).await
}

#[embassy_executor::task]
async fn battery_task(mut monitor: BatteryMonitor) -> ! {
    monitor.run().await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("wristface starting");
    let p = embassy_nrf::init(hw::nrf_config());

    interrupt::SAADC.set_priority(Priority::P3);
    interrupt::SPIM1_SPIS1_TWIM1_TWIS1_SPI1_TWI1.set_priority(Priority::P3);

    // Battery: P0.31 voltage (AIN7), P0.12 charge indicator
    let mut saadc_config = saadc::Config::default();
    saadc_config.resolution = Resolution::_12BIT;
    let channel = ChannelConfig::single_ended(p.P0_31);
    let saadc = Saadc::new(p.SAADC, Irqs, saadc_config, [channel]);
    saadc.calibrate().await;
    let mut monitor = BatteryMonitor::new(saadc, Input::new(p.P0_12, Pull::None));
    monitor.prime().await;

    // Display: SSD1306 on TWIM1, P0.26 SDA / P0.27 SCL
    let mut i2c_config = twim::Config::default();
    i2c_config.frequency = twim::Frequency::K400;
    let i2c = Twim::new(p.TWISPI1, Irqs, p.P0_26, p.P0_27, i2c_config);
    let mut display = unwrap!(hw::display::init(i2c));

    // BLE
    let sd = Softdevice::enable(&hw::ble::softdevice_config());
    let server = SERVER.init(unwrap!(hw::ble::register(sd)));
    let sd: &'static Softdevice = sd;

    unwrap!(spawner.spawn(softdevice_task(sd)));
    unwrap!(spawner.spawn(ble_task(sd, server)));
    unwrap!(spawner.spawn(battery_task(monitor)));

    // Watchface
    let mut scene = Scene::new(PANEL_WIDTH, PANEL_HEIGHT);
    let mut sources = DeviceSources::new();
    let mut app = unwrap!(App::init(&mut scene, &mut sources));
    if let Err(e) = hw::display::present(app.ui_mut(), &mut display) {
        warn!("display: {}", e);
    }
    info!("Initialization finished");

    hw::clock::align_to_half_second().await;
    let mut ticker = Ticker::every(Duration::from_secs(1));
    loop {
        let event = match select3(
            ticker.next(),
            hw::BATTERY_CHANGED.wait(),
            hw::CONNECTION_CHANGED.wait(),
        )
        .await
        {
            Either3::First(()) => app.sources_mut().tick(),
            Either3::Second(state) => app.sources().filter(Event::Battery(state)),
            Either3::Third(connected) => app.sources().filter(Event::Connection(connected)),
        };

        let Some(event) = event else {
            continue;
        };
        if let Err(e) = app.dispatch(event) {
            warn!("handler failed for {}: {}", event, e);
        }
        if let Err(e) = hw::display::present(app.ui_mut(), &mut display) {
            warn!("display: {}", e);
        }
    }
}

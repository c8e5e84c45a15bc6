//! BLE peripheral: advertising, Battery Service and link state.
//!
//! Drives the Nordic SoftDevice S140 in **Peripheral** role: advertise,
//! accept one central, serve the Battery Service while connected, and
//! publish connect / disconnect transitions for the watchface.

use core::mem;

use defmt::{info, warn};
use embassy_futures::select::select;
use embassy_time::{Duration, Timer};
use nrf_softdevice::ble::advertisement_builder::{
    Flag, LegacyAdvertisementBuilder, LegacyAdvertisementPayload, ServiceList, ServiceUuid16,
};
use nrf_softdevice::ble::gatt_server::NotifyValueError;
use nrf_softdevice::ble::{gatt_server, peripheral, Connection};
use nrf_softdevice::{raw, Config, Softdevice};
use wristface::config::{BATTERY_POLL_SECS, BLE_ADV_INTERVAL, BLE_DEVICE_NAME};
use wristface::error::{BleError, Error};

static ADV_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .flags(&[Flag::GeneralDiscovery, Flag::LE_Only])
    .services_16(ServiceList::Complete, &[ServiceUuid16::BATTERY])
    .full_name(BLE_DEVICE_NAME)
    .build();

static SCAN_DATA: LegacyAdvertisementPayload = LegacyAdvertisementBuilder::new()
    .services_16(ServiceList::Complete, &[ServiceUuid16::BATTERY])
    .build();

#[nrf_softdevice::gatt_server]
pub struct Server {
    pub bas: BatteryService,
}

#[nrf_softdevice::gatt_service(uuid = "180f")]
pub struct BatteryService {
    #[characteristic(uuid = "2a19", read, notify)]
    pub battery_level: u8,
}

/// SoftDevice configuration: one peripheral link, no central role.
pub fn softdevice_config() -> Config {
    Config {
        clock: Some(raw::nrf_clock_lf_cfg_t {
            source: raw::NRF_CLOCK_LF_SRC_XTAL as u8,
            rc_ctiv: 0,
            rc_temp_ctiv: 0,
            accuracy: raw::NRF_CLOCK_LF_ACCURACY_20_PPM as u8,
        }),
        conn_gap: Some(raw::ble_gap_conn_cfg_t {
            conn_count: 1,
            event_length: 24,
        }),
        conn_gatt: Some(raw::ble_gatt_conn_cfg_t { att_mtu: 256 }),
        gatts_attr_tab_size: Some(raw::ble_gatts_cfg_attr_tab_size_t {
            attr_tab_size: raw::BLE_GATTS_ATTR_TAB_SIZE_DEFAULT,
        }),
        gap_role_count: Some(raw::ble_gap_cfg_role_count_t {
            adv_set_count: 1,
            periph_role_count: 1,
            central_role_count: 0,
            central_sec_count: 0,
            _bitfield_1: raw::ble_gap_cfg_role_count_t::new_bitfield_1(0),
        }),
        gap_device_name: Some(raw::ble_gap_cfg_device_name_t {
            p_value: BLE_DEVICE_NAME.as_ptr() as _,
            current_len: BLE_DEVICE_NAME.len() as u16,
            max_len: BLE_DEVICE_NAME.len() as u16,
            write_perm: unsafe { mem::zeroed() },
            _bitfield_1: raw::ble_gap_cfg_device_name_t::new_bitfield_1(
                raw::BLE_GATTS_VLOC_STACK as u8,
            ),
        }),
        ..Default::default()
    }
}

/// Register the GATT server. Must run before the SoftDevice task starts.
pub fn register(sd: &mut Softdevice) -> Result<Server, Error> {
    Server::new(sd).map_err(|_| BleError::GattServer.into())
}

/// Advertise, serve one central until it disconnects, repeat.
pub async fn run(sd: &'static Softdevice, server: &Server) -> ! {
    loop {
        let conn = match advertise(sd).await {
            Ok(conn) => conn,
            Err(e) => {
                warn!("BLE: {}", e);
                Timer::after(Duration::from_secs(1)).await;
                continue;
            }
        };

        info!("BLE: central connected");
        super::publish_connection(true);

        let level = super::battery().charge_percent;
        if server.bas.battery_level_set(&level).is_err() {
            warn!("BLE: could not set battery level");
        }

        let gatt = gatt_server::run(&conn, server, |e| match e {
            ServerEvent::Bas(BatteryServiceEvent::BatteryLevelCccdWrite { notifications }) => {
                info!("BLE: battery notifications {}", notifications);
            }
        });
        select(gatt, notify_battery(&conn, server)).await;

        info!("BLE: central disconnected");
        super::publish_connection(false);
    }
}

async fn advertise(sd: &'static Softdevice) -> Result<Connection, Error> {
    let config = peripheral::Config {
        interval: BLE_ADV_INTERVAL,
        ..Default::default()
    };
    let adv = peripheral::ConnectableAdvertisement::ScannableUndirected {
        adv_data: &ADV_DATA,
        scan_data: &SCAN_DATA,
    };
    peripheral::advertise_connectable(sd, adv, &config)
        .await
        .map_err(|_| BleError::AdvertiseFailed.into())
}

/// Notify the central of charge changes until the link drops.
async fn notify_battery(conn: &Connection, server: &Server) {
    let mut last = None;
    loop {
        let level = super::battery().charge_percent;
        if last != Some(level) {
            match server.bas.battery_level_notify(conn, &level) {
                Ok(()) => last = Some(level),
                Err(NotifyValueError::Disconnected) => return,
                // Central has not enabled notifications yet.
                Err(_) => {}
            }
        }
        Timer::after(Duration::from_secs(BATTERY_POLL_SECS)).await;
    }
}

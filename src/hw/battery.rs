//! Battery monitor - SAADC voltage sampling plus the charge-indicator pin.
//!
//! The cell voltage reaches AIN7 through a 1:2 divider; the charger pulls
//! P0.12 low while charging. Readings go through `power_logic` and only
//! noticeable changes are published as battery events.

use defmt::{info, warn};
use embassy_nrf::gpio::Input;
use embassy_nrf::saadc::Saadc;
use embassy_time::{Duration, Timer};
use wristface::config::BATTERY_POLL_SECS;
use wristface::power_logic::{adc_to_millivolts, percent_from_millivolts, should_report};
use wristface::BatteryState;

pub struct BatteryMonitor {
    adc: Saadc<'static, 1>,
    charge_indicator: Input<'static>,
    last_reported: Option<BatteryState>,
}

impl BatteryMonitor {
    pub fn new(adc: Saadc<'static, 1>, charge_indicator: Input<'static>) -> Self {
        Self {
            adc,
            charge_indicator,
            last_reported: None,
        }
    }

    pub fn is_charging(&self) -> bool {
        self.charge_indicator.is_low()
    }

    /// Take one reading. `None` if the ADC returned an impossible value.
    pub async fn sample(&mut self) -> Option<BatteryState> {
        let mut buf = [0i16; 1];
        self.adc.sample(&mut buf).await;
        let mv = adc_to_millivolts(buf[0])?;
        Some(BatteryState::new(percent_from_millivolts(mv), self.is_charging()))
    }

    /// Sample once and store the result as the initial reading.
    pub async fn prime(&mut self) {
        match self.sample().await {
            Some(state) => {
                info!("Battery: initial {}", state);
                super::store_battery(state);
                self.last_reported = Some(state);
            }
            None => warn!("Battery: initial reading out of range"),
        }
    }

    /// Poll forever, publishing changes.
    pub async fn run(&mut self) -> ! {
        loop {
            Timer::after(Duration::from_secs(BATTERY_POLL_SECS)).await;

            let Some(state) = self.sample().await else {
                warn!("Battery: reading out of range");
                continue;
            };
            if should_report(self.last_reported, state) {
                info!("Battery: {} -> {}", self.last_reported, state);
                self.last_reported = Some(state);
                super::publish_battery(state);
            }
        }
    }
}

//! Battery arithmetic, kept free of hardware so it runs on the host.

use crate::config::{ADC_MAX_RAW, BATTERY_REPORT_HYSTERESIS, DISCHARGE_CURVE};
use crate::event::BatteryState;

/// Convert a raw 12-bit SAADC reading of the halved battery voltage into
/// millivolts at the cell.
///
/// Readings outside `0..=ADC_MAX_RAW` (noise below ground shows up as a
/// small negative value) yield `None`.
pub fn adc_to_millivolts(raw: i16) -> Option<u16> {
    if !(0..=ADC_MAX_RAW).contains(&raw) {
        return None;
    }
    // 3.3 V full scale, 1:2 divider: mv = raw * 6600 / 4096 ≈ raw * 2000 / 1241
    u16::try_from(raw as u32 * 2000 / 1241).ok()
}

/// State of charge from cell voltage, interpolated along the discharge
/// curve and clamped to 0..=100.
pub fn percent_from_millivolts(mv: u16) -> u8 {
    let (top_mv, top_pct) = DISCHARGE_CURVE[0];
    if mv >= top_mv {
        return top_pct;
    }

    for pair in DISCHARGE_CURVE.windows(2) {
        let (hi_mv, hi_pct) = pair[0];
        let (lo_mv, lo_pct) = pair[1];
        if mv >= lo_mv {
            let span_mv = (hi_mv - lo_mv) as u32;
            let span_pct = (hi_pct - lo_pct) as u32;
            let offset = (mv - lo_mv) as u32;
            return lo_pct + (offset * span_pct / span_mv) as u8;
        }
    }

    DISCHARGE_CURVE[DISCHARGE_CURVE.len() - 1].1
}

/// Whether `next` differs enough from the last reported state to be
/// worth a battery event. A change in charging always counts.
pub fn should_report(last: Option<BatteryState>, next: BatteryState) -> bool {
    match last {
        None => true,
        Some(last) if last.is_charging != next.is_charging => true,
        Some(last) => last.charge_percent.abs_diff(next.charge_percent) >= BATTERY_REPORT_HYSTERESIS,
    }
}

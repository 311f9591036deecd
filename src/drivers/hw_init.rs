//! One-shot hardware peripheral initialization.
//!
//! Configures the ADC1 oneshot unit and the water-level channel using raw
//! ESP-IDF sys calls. Called once from `main()` before the loop starts.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(target_os = "espidf")]
use log::{info, warn};

use crate::error::Result;
#[cfg(target_os = "espidf")]
use crate::error::SensorError;
#[cfg(target_os = "espidf")]
use crate::pins;

#[cfg(target_os = "espidf")]
pub fn init_peripherals() -> Result<()> {
    // SAFETY: Called once from main() before the loop; single-threaded.
    unsafe { init_adc() }?;
    info!("hw_init: all peripherals configured");
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn init_peripherals() -> Result<()> {
    log::info!("hw_init(sim): peripheral init skipped");
    Ok(())
}

// ── ADC (oneshot) ─────────────────────────────────────────────

#[cfg(target_os = "espidf")]
static mut ADC1_HANDLE: adc_oneshot_unit_handle_t = core::ptr::null_mut();

/// SAFETY: Must be called only from the single-threaded init path or the
/// main-loop ADC read path. `init_adc()` completes before the loop starts.
#[cfg(target_os = "espidf")]
unsafe fn adc1_handle() -> adc_oneshot_unit_handle_t {
    unsafe { ADC1_HANDLE }
}

#[cfg(target_os = "espidf")]
unsafe fn init_adc() -> Result<()> {
    let init_cfg = adc_oneshot_unit_init_cfg_t {
        unit_id: adc_unit_t_ADC_UNIT_1,
        ulp_mode: adc_ulp_mode_t_ADC_ULP_MODE_DISABLE,
        ..Default::default()
    };
    // SAFETY: ADC1_HANDLE is only written here, once at boot.
    let ret = unsafe { adc_oneshot_new_unit(&init_cfg, &raw mut ADC1_HANDLE) };
    if ret != ESP_OK as i32 {
        warn!("hw_init: adc_oneshot_new_unit failed (rc={})", ret);
        return Err(SensorError::AdcConfigFailed.into());
    }

    // 12 dB attenuation gives the full 0 – 3.1 V span over 0..=4095.
    let chan_cfg = adc_oneshot_chan_cfg_t {
        atten: adc_atten_t_ADC_ATTEN_DB_12,
        bitwidth: adc_bitwidth_t_ADC_BITWIDTH_12,
    };
    let ret = unsafe {
        adc_oneshot_config_channel(adc1_handle(), pins::SENSOR_ADC1_CHANNEL, &chan_cfg)
    };
    if ret != ESP_OK as i32 {
        warn!("hw_init: adc_oneshot_config_channel failed (rc={})", ret);
        return Err(SensorError::AdcConfigFailed.into());
    }

    info!(
        "hw_init: ADC1 configured (CH{}=GPIO{} water level)",
        pins::SENSOR_ADC1_CHANNEL,
        pins::SENSOR_ADC_GPIO
    );
    Ok(())
}

/// Oneshot read of an ADC1 channel. A failed read returns `0`, which the
/// loop cannot tell apart from an empty tank.
#[cfg(target_os = "espidf")]
pub fn adc1_read(channel: u32) -> u16 {
    let mut raw: i32 = 0;
    // SAFETY: adc1_handle() contract, single-threaded main-loop access only.
    let ret = unsafe { adc_oneshot_read(adc1_handle(), channel, &mut raw) };
    if ret != ESP_OK as i32 {
        log::debug!("hw_init: {} (CH{}, rc={})", SensorError::AdcReadFailed, channel, ret);
        return 0;
    }
    raw.max(0) as u16
}

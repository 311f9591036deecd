//! Bluetooth Classic serial (SPP) adapter.
//!
//! Implements [`SerialLink`] as a newline-delimited text channel to the
//! phone app. Telemetry goes out as one line per send; commands come in
//! as one line each.
//!
//! ## cfg gating
//!
//! - **`target_os = "espidf"`**: Bluedroid Classic BT via
//!   `esp_idf_svc::bt::BtDriver`, SPP server via raw `esp_spp_*` calls.
//! - **all other targets**: in-memory simulation for host-side tests.
//!
//! ## Inbound path
//!
//! ```text
//!  Bluedroid task                      main loop
//!  ESP_SPP_DATA_IND_EVT ──▶ LineAssembler ──▶ read_line(now)
//!                          (Mutex, bounded)
//! ```
//!
//! Bytes are buffered until `\n`, or until the sender has been silent for
//! [`LINE_IDLE_TIMEOUT_MS`], in which case the partial text is taken as a
//! line. Complete lines queue up to [`RX_QUEUE_DEPTH`]; further lines are
//! dropped, as is any line longer than [`LINE_CAP`].

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::warn;

use crate::app::ports::{LINE_CAP, SerialLink};
use crate::config::LINE_IDLE_TIMEOUT_MS;
use crate::error::CommsError;

// ───────────────────────────────────────────────────────────────
// Constants
// ───────────────────────────────────────────────────────────────

/// Complete inbound lines held between loop iterations.
pub const RX_QUEUE_DEPTH: usize = 4;

/// Largest outbound line including the `\n` terminator.
const TX_CAP: usize = 80;

/// `esp_err_t` success code.
const ESP_OK_RC: i32 = 0;

pub type Line = heapless::String<LINE_CAP>;

// ───────────────────────────────────────────────────────────────
// Line assembly
// ───────────────────────────────────────────────────────────────

/// Splits a byte stream into bounded text lines.
pub struct LineAssembler {
    partial: heapless::Vec<u8, LINE_CAP>,
    overflowed: bool,
    /// Tick of the most recent byte appended to `partial`.
    last_rx_ms: u64,
    lines: heapless::Deque<Line, RX_QUEUE_DEPTH>,
}

impl Default for LineAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            partial: heapless::Vec::new(),
            overflowed: false,
            last_rx_ms: 0,
            lines: heapless::Deque::new(),
        }
    }

    /// Append bytes received at `now_ms`. Returns the number of complete
    /// lines that had to be discarded (too long, not UTF-8, or queue full).
    pub fn feed(&mut self, bytes: &[u8], now_ms: u64) -> usize {
        let mut dropped = 0;
        for &b in bytes {
            if b == b'\n' {
                if !self.finish_line() {
                    dropped += 1;
                }
            } else {
                self.last_rx_ms = now_ms;
                if !self.overflowed && self.partial.push(b).is_err() {
                    self.overflowed = true;
                }
            }
        }
        dropped
    }

    /// Next complete line. An unterminated partial line counts as complete
    /// once no byte has arrived for [`LINE_IDLE_TIMEOUT_MS`].
    pub fn pop_line(&mut self, now_ms: u64) -> Option<Line> {
        if self.lines.is_empty() && self.partial_is_stale(now_ms) {
            self.finish_line();
        }
        self.lines.pop_front()
    }

    pub fn pending_lines(&self) -> usize {
        self.lines.len()
    }

    pub fn clear(&mut self) {
        self.partial.clear();
        self.overflowed = false;
        self.lines.clear();
    }

    fn partial_is_stale(&self, now_ms: u64) -> bool {
        let has_partial = !self.partial.is_empty() || self.overflowed;
        has_partial && now_ms.wrapping_sub(self.last_rx_ms) >= LINE_IDLE_TIMEOUT_MS
    }

    fn finish_line(&mut self) -> bool {
        let overflowed = core::mem::replace(&mut self.overflowed, false);
        let bytes = core::mem::take(&mut self.partial);
        if overflowed {
            warn!("SPP: inbound line exceeds {} bytes, discarded", LINE_CAP);
            return false;
        }
        let Ok(text) = core::str::from_utf8(&bytes) else {
            warn!("SPP: inbound line is not UTF-8, discarded");
            return false;
        };
        let mut line = Line::new();
        // Cannot fail: `partial` has the same capacity as `Line`.
        let _ = line.push_str(text);
        if self.lines.push_back(line).is_err() {
            warn!("SPP: inbound queue full, line dropped");
            return false;
        }
        true
    }
}

/// Lock the inbound buffer, recovering from a panic in another holder.
/// A poisoned assembler is cleared, since a half-fed line cannot be trusted.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn lock_rx(rx: &Mutex<LineAssembler>) -> MutexGuard<'_, LineAssembler> {
    rx.lock().unwrap_or_else(|poisoned: PoisonError<_>| {
        warn!("SPP: inbound buffer lock poisoned, clearing");
        rx.clear_poison();
        let mut guard = poisoned.into_inner();
        guard.clear();
        guard
    })
}

/// Log a failed ESP-IDF call. Returns `true` on `ESP_OK`.
#[cfg_attr(not(target_os = "espidf"), allow(dead_code))]
fn esp_call_ok(what: &str, rc: i32) -> bool {
    if rc == ESP_OK_RC {
        return true;
    }
    log::error!("SPP: {} failed ({})", what, rc);
    false
}

// ───────────────────────────────────────────────────────────────
// Link state
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Idle,
    Advertising,
    Connected,
    Failed,
}

// ── ESP-IDF SPP static state ──────────────────────────────────
//
// SPP callbacks are C function pointers that cannot capture Rust
// closures. These statics bridge the callback context to the adapter.

#[cfg(target_os = "espidf")]
use core::sync::atomic::{AtomicU32, Ordering as AtomicOrdering};

/// Open SPP connection handle; 0 = no client.
#[cfg(target_os = "espidf")]
static SPP_HANDLE: AtomicU32 = AtomicU32::new(0);

// SPP callbacks run in the Bluedroid task (not ISR), so std Mutex is safe.
#[cfg(target_os = "espidf")]
static SPP_RX: Mutex<LineAssembler> = Mutex::new(LineAssembler::new());

#[cfg(target_os = "espidf")]
const SPP_SERVER_NAME: &core::ffi::CStr = c"SPP_SERVER";

/// Same time base as `Esp32TimeAdapter::uptime_ms`.
#[cfg(target_os = "espidf")]
fn spp_now_ms() -> u64 {
    (unsafe { esp_idf_svc::sys::esp_timer_get_time() }) as u64 / 1000
}

#[cfg(target_os = "espidf")]
unsafe extern "C" fn spp_event_handler(
    event: esp_idf_svc::sys::esp_spp_cb_event_t,
    param: *mut esp_idf_svc::sys::esp_spp_cb_param_t,
) {
    use esp_idf_svc::sys::*;

    match event {
        esp_spp_cb_event_t_ESP_SPP_INIT_EVT => {
            log::info!("SPP: profile initialised, starting server");
            let rc = unsafe {
                esp_spp_start_srv(
                    ESP_SPP_SEC_NONE as esp_spp_sec_t,
                    esp_spp_role_t_ESP_SPP_ROLE_SLAVE,
                    0,
                    SPP_SERVER_NAME.as_ptr(),
                )
            };
            esp_call_ok("start_srv", rc);
        }
        esp_spp_cb_event_t_ESP_SPP_START_EVT => {
            let rc = unsafe {
                esp_bt_gap_set_scan_mode(
                    esp_bt_connection_mode_t_ESP_BT_CONNECTABLE,
                    esp_bt_discovery_mode_t_ESP_BT_GENERAL_DISCOVERABLE,
                )
            };
            if esp_call_ok("set_scan_mode", rc) {
                log::info!("SPP: server started, discoverable");
            }
        }
        esp_spp_cb_event_t_ESP_SPP_SRV_OPEN_EVT => {
            let p = unsafe { &(*param).srv_open };
            SPP_HANDLE.store(p.handle, AtomicOrdering::Release);
            log::info!("SPP: client connected (handle={})", p.handle);
        }
        esp_spp_cb_event_t_ESP_SPP_CLOSE_EVT => {
            SPP_HANDLE.store(0, AtomicOrdering::Release);
            lock_rx(&SPP_RX).clear();
            log::info!("SPP: client disconnected");
        }
        esp_spp_cb_event_t_ESP_SPP_DATA_IND_EVT => {
            let p = unsafe { &(*param).data_ind };
            let data = unsafe { core::slice::from_raw_parts(p.data, p.len as usize) };
            lock_rx(&SPP_RX).feed(data, spp_now_ms());
        }
        _ => {}
    }
}

// ───────────────────────────────────────────────────────────────
// BT serial adapter
// ───────────────────────────────────────────────────────────────

pub struct BtSerialAdapter {
    state: LinkState,
    #[cfg(target_os = "espidf")]
    _driver: esp_idf_svc::bt::BtDriver<'static, esp_idf_svc::bt::Classic>,
    /// Simulation: inbound bytes pushed by tests.
    #[cfg(not(target_os = "espidf"))]
    sim_rx: LineAssembler,
    /// Simulation: tick of the latest `read_line`, used to stamp pushes.
    #[cfg(not(target_os = "espidf"))]
    sim_now_ms: u64,
    /// Simulation: every line written, terminator stripped.
    #[cfg(not(target_os = "espidf"))]
    sim_outbound: Vec<String>,
    #[cfg(not(target_os = "espidf"))]
    sim_connected: bool,
}

impl BtSerialAdapter {
    /// Wrap an initialised Classic BT driver (controller + Bluedroid up).
    #[cfg(target_os = "espidf")]
    pub fn new(driver: esp_idf_svc::bt::BtDriver<'static, esp_idf_svc::bt::Classic>) -> Self {
        Self {
            state: LinkState::Idle,
            _driver: driver,
        }
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn new() -> Self {
        Self {
            state: LinkState::Idle,
            sim_rx: LineAssembler::new(),
            sim_now_ms: 0,
            sim_outbound: Vec::new(),
            sim_connected: false,
        }
    }

    pub fn state(&self) -> LinkState {
        match self.state {
            LinkState::Advertising if self.is_connected() => LinkState::Connected,
            other => other,
        }
    }

    // ── Platform-specific ─────────────────────────────────────

    #[cfg(target_os = "espidf")]
    fn is_connected(&self) -> bool {
        SPP_HANDLE.load(AtomicOrdering::Acquire) != 0
    }

    #[cfg(not(target_os = "espidf"))]
    fn is_connected(&self) -> bool {
        self.sim_connected
    }

    #[cfg(target_os = "espidf")]
    fn platform_begin(&mut self, device_name: &str) -> Result<(), CommsError> {
        use esp_idf_svc::sys::*;

        let name = std::ffi::CString::new(device_name).map_err(|_| CommsError::BtInitFailed)?;
        unsafe {
            if !esp_call_ok("set_device_name", esp_bt_gap_set_device_name(name.as_ptr())) {
                return Err(CommsError::BtInitFailed);
            }

            if !esp_call_ok(
                "register_callback",
                esp_spp_register_callback(Some(spp_event_handler)),
            ) {
                return Err(CommsError::SppStartFailed);
            }

            // Callback mode: data arrives via ESP_SPP_DATA_IND_EVT.
            let cfg = esp_spp_cfg_t {
                mode: esp_spp_mode_t_ESP_SPP_MODE_CB,
                enable_l2cap_ertm: true,
                tx_buffer_size: 0,
            };
            if !esp_call_ok("enhanced_init", esp_spp_enhanced_init(&cfg)) {
                return Err(CommsError::SppStartFailed);
            }
        }
        log::info!("BT(espidf): SPP init requested as '{}'", device_name);
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_begin(&mut self, device_name: &str) -> Result<(), CommsError> {
        log::info!("BT(sim): advertising '{}'", device_name);
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_write(&mut self, bytes: &mut [u8]) -> Result<(), CommsError> {
        let handle = SPP_HANDLE.load(AtomicOrdering::Acquire);
        if handle == 0 {
            return Err(CommsError::NotConnected);
        }
        let ret = unsafe {
            esp_idf_svc::sys::esp_spp_write(handle, bytes.len() as i32, bytes.as_mut_ptr())
        };
        if ret != ESP_OK_RC {
            return Err(CommsError::NotConnected);
        }
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_write(&mut self, bytes: &mut [u8]) -> Result<(), CommsError> {
        if !self.sim_connected {
            return Err(CommsError::NotConnected);
        }
        let text = String::from_utf8_lossy(bytes);
        self.sim_outbound
            .push(text.trim_end_matches('\n').to_string());
        Ok(())
    }

    #[cfg(target_os = "espidf")]
    fn platform_pop_line(&mut self, now_ms: u64) -> Option<Line> {
        lock_rx(&SPP_RX).pop_line(now_ms)
    }

    #[cfg(not(target_os = "espidf"))]
    fn platform_pop_line(&mut self, now_ms: u64) -> Option<Line> {
        self.sim_now_ms = now_ms;
        self.sim_rx.pop_line(now_ms)
    }

    // ── Simulation hooks ──────────────────────────────────────

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_connect(&mut self) {
        self.sim_connected = true;
    }

    #[cfg(not(target_os = "espidf"))]
    pub fn sim_disconnect(&mut self) {
        self.sim_connected = false;
        self.sim_rx.clear();
    }

    /// Inject bytes as if the phone had written them, stamped with the
    /// tick of the most recent `read_line`.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_push_inbound(&mut self, bytes: &[u8]) -> usize {
        self.sim_rx.feed(bytes, self.sim_now_ms)
    }

    /// Drain every line written since the last call.
    #[cfg(not(target_os = "espidf"))]
    pub fn sim_take_outbound(&mut self) -> Vec<String> {
        core::mem::take(&mut self.sim_outbound)
    }
}

#[cfg(not(target_os = "espidf"))]
impl Default for BtSerialAdapter {
    fn default() -> Self {
        Self::new()
    }
}

// ───────────────────────────────────────────────────────────────
// SerialLink implementation
// ───────────────────────────────────────────────────────────────

impl SerialLink for BtSerialAdapter {
    fn begin(&mut self, device_name: &str) -> Result<(), CommsError> {
        if let Err(e) = self.platform_begin(device_name) {
            self.state = LinkState::Failed;
            return Err(e);
        }
        self.state = LinkState::Advertising;
        Ok(())
    }

    fn write_line(&mut self, line: &str) -> Result<(), CommsError> {
        let mut buf = heapless::Vec::<u8, TX_CAP>::new();
        buf.extend_from_slice(line.as_bytes())
            .map_err(|_| CommsError::LineTooLong)?;
        buf.push(b'\n').map_err(|_| CommsError::LineTooLong)?;
        self.platform_write(&mut buf)
    }

    fn read_line(&mut self, now_ms: u64) -> Option<Line> {
        self.platform_pop_line(now_ms)
    }
}

// ───────────────────────────────────────────────────────────────
// Tests
// ───────────────────────────────────────────────────────────────

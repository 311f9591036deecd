//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements | Connects to                 |
//! |-------------|------------|-----------------------------|
//! | `bt_serial` | SerialLink | Bluedroid Classic BT (SPP)  |
//! | `hardware`  | SensorPort | ESP32 ADC1 oneshot          |
//! | `log_sink`  | EventSink  | Serial log output           |
//! | `time`      | —          | ESP32 system timer          |

pub mod bt_serial;
pub mod hardware;
pub mod log_sink;
pub mod time;

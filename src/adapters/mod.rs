//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                 |
//! |------------|--------------------|-----------------------------|
//! | `hardware` | MotorPort          | LEDC servo channel          |
//! |            | IndicatorPort      | Indicator GPIO              |
//! |            | InputPort          | Button GPIOs                |
//! |            | ConsolePort        | Console UART (via `console`)|
//! |            | ClockPort, DelayNs | ESP32 timer (via `time`)    |
//! | `console`  | ConsolePort        | Console UART / host queue   |
//! | `log_sink` | EventSink          | Serial log output           |
//! | `nvs`      | ByteStorePort      | NVS blob / in-memory image  |
//! | `time`     | ClockPort, DelayNs | ESP32 system timer          |

pub mod console;
pub mod hardware;
pub mod log_sink;
pub mod nvs;
pub mod time;

//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter     | Implements          | Connects to                   |
//! |-------------|---------------------|-------------------------------|
//! | `gpio`      | InputPin (e-hal)    | Linux sysfs GPIO              |
//! | `log_sink`  | EventSink           | Console log output            |
//! | `power`     | (used by `rig`)     | shutdown / reboot / status    |
//! | `remote`    | EventSink           | TCP JSON-lines clients        |
//! | `rig`       | RigPorts            | Everything below, bundled     |
//! | `settings`  | SettingsPort        | Sectioned JSON settings file  |
//! | `sim`       | DisplayPort         | Console "LCD"                 |
//! |             | CameraPort          | Simulated camera              |
//! |             | AltimeterPort       | Simulated barometer           |
//! |             | PanTiltPort         | Simulated servo head          |
//! | `time`      | TimePort            | `std::time::Instant`          |

pub mod gpio;
pub mod log_sink;
pub mod power;
pub mod remote;
pub mod rig;
pub mod settings;
pub mod sim;
pub mod time;

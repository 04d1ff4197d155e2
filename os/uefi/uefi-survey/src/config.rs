//! # Survey Configuration
//!
//! Read from `\EFI\BOOT\survey.cfg` on the boot volume:
//!
//! ```text
//! verbose = 1        # log at debug level on the firmware console
//! serial = 1         # COM port (or I/O base) for serial logging, 0 = off
//! baudrate = 115200
//! fbcon = 1          # render the log on the GOP framebuffer
//! bootif = 1         # report the BOOTIF value of the boot NIC
//! ```

use boot_firmware::Firmware;
use boot_strings::{ConfigOption, parse_config_file};
use log::{info, warn};

pub const CONFIG_PATH: &str = "/EFI/BOOT/survey.cfg";

const DEFAULT_BAUDRATE: u32 = 115_200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurveyConfig {
    pub verbose: bool,
    /// Serial port for logging; 0 disables serial output.
    pub serial: u32,
    pub baudrate: u32,
    pub fbcon: bool,
    pub bootif: bool,
}

impl Default for SurveyConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            serial: 0,
            baudrate: DEFAULT_BAUDRATE,
            fbcon: false,
            bootif: false,
        }
    }
}

impl SurveyConfig {
    /// Parse [`CONFIG_PATH`]. A missing or malformed file yields the
    /// defaults.
    pub fn load(fw: &mut impl Firmware) -> Self {
        let mut options = [
            ConfigOption::integer("verbose", '='),
            ConfigOption::integer("serial", '='),
            ConfigOption::integer("baudrate", '='),
            ConfigOption::integer("fbcon", '='),
            ConfigOption::integer("bootif", '='),
        ];

        match parse_config_file(fw, CONFIG_PATH, &mut options) {
            Ok(()) => info!("Configuration loaded from {CONFIG_PATH}"),
            Err(e) => {
                warn!("Using default configuration: {e}");
                return Self::default();
            }
        }

        let int = |i: usize| options[i].as_int().unwrap_or(0);
        Self {
            verbose: int(0) != 0,
            serial: u32::try_from(int(1)).unwrap_or(0),
            baudrate: u32::try_from(int(2))
                .ok()
                .filter(|&b| b != 0)
                .unwrap_or(DEFAULT_BAUDRATE),
            fbcon: int(3) != 0,
            bootif: int(4) != 0,
        }
    }
}

//! Driver configuration, loaded from the `config` key of the persisted JSON document
//! (`ezsp_db_json.h`'s `conf2json`/`load`).

use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_baud() -> u32 {
	57600
}

fn default_reset_retries() -> u32 {
	ash::link::RESET_RETRIES
}

fn default_max_retransmits() -> u32 {
	ash::link::MAX_RETRANSMITS
}

fn default_protocol_version_floor() -> u8 {
	4
}

fn default_protocol_version_ceiling() -> u8 {
	8
}

/// Static configuration the driver needs before it can open the serial line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
	/// Path to the character device node (e.g. `/dev/ttyUSB0`).
	pub device: String,

	#[serde(default = "default_baud")]
	pub baud: u32,

	#[serde(default = "default_reset_retries")]
	pub reset_retries: u32,

	#[serde(default = "default_max_retransmits")]
	pub max_retransmits: u32,

	#[serde(default = "default_protocol_version_floor")]
	pub protocol_version_floor: u8,

	#[serde(default = "default_protocol_version_ceiling")]
	pub protocol_version_ceiling: u8,

	/// Path to the persisted state document (`host::persist::JsonStore`).
	pub config_file: String,

	/// Schema version string, stored and round-tripped verbatim (`config.version`).
	#[serde(default)]
	pub version: String,
}

impl DriverConfig {
	pub fn read_timeout(&self) -> Duration {
		runtime::serial::DEFAULT_READ_TIMEOUT
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn deserializes_with_defaults() {
		let json = r#"{"device": "/dev/ttyUSB0", "config_file": "/var/lib/ezsp/db.json"}"#;
		let config: DriverConfig = serde_json::from_str(json).unwrap();

		assert_eq!(config.baud, 57600);
		assert_eq!(config.reset_retries, ash::link::RESET_RETRIES);
	}
}

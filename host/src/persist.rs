//! Persistence interface (C5) and the JSON adapter. Ported from `pi-zigbee-lib/ezsp_db.h`'s
//! abstract `EzspDb` interface and `ezsp_db_json.h`'s concrete implementation.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use utils::error::*;

use crate::child::{Child, ChildTable};
use crate::config::DriverConfig;
use crate::network::{NetworkSlot, Networks};

/// Four operations a persistence backend must support. `save` must be atomic from the
/// caller's point of view (spec.md §4.4).
pub trait Store {
	fn load_config(&self, config: &mut DriverConfig) -> Result<()>;
	fn load_networks(&self, networks: &mut Networks) -> Result<()>;
	fn load_children(&self, children: &mut ChildTable) -> Result<()>;
	fn save(&self, config: &DriverConfig, networks: &Networks, children: &ChildTable) -> Result<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonConfig {
	version: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonNetwork {
	#[serde(rename = "panId")]
	pan_id: String,
	#[serde(rename = "extendedPanId")]
	extended_pan_id: Vec<String>,
	#[serde(default, rename = "radioTxPower")]
	radio_tx_power: i8,
	#[serde(default, rename = "radioChannel")]
	radio_channel: u8,
	#[serde(default, rename = "joinMethod")]
	join_method: u8,
	#[serde(default, rename = "nwkManagerId")]
	nwk_manager_id: u16,
	#[serde(default, rename = "nwkUpdateId")]
	nwk_update_id: u8,
	#[serde(default)]
	channels: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct JsonChild {
	id: u64,
	#[serde(rename = "nwkAddr")]
	nwk_addr: String,
	#[serde(rename = "ieeeAddr")]
	ieee_addr: Vec<String>,
	#[serde(rename = "type")]
	node_type: u8,
	flags: u8,
}

#[derive(Debug, Serialize, Deserialize, Default)]
struct JsonDocument {
	config: Option<JsonConfig>,
	#[serde(default)]
	networks: Vec<JsonNetwork>,
	#[serde(default)]
	childs: Vec<JsonChild>,
}

fn hex_u16(value: u16) -> String {
	format!("0x{value:04X}")
}

fn parse_hex_u16(s: &str) -> Result<u16> {
	u16::from_str_radix(s.trim_start_matches("0x"), 16).map_err(|err| log::error!("bad hex u16 {s:?}: {err}"))
}

fn hex_bytes(bytes: &[u8; 8]) -> Vec<String> {
	bytes.iter().map(|b| format!("0x{b:02X}")).collect()
}

fn parse_hex_bytes(values: &[String]) -> Result<[u8; 8]> {
	if values.len() != 8 {
		log::error!("expected 8 address bytes, got {}", values.len());
		return Err(());
	}

	let mut out = [0u8; 8];
	for (i, v) in values.iter().enumerate() {
		out[i] = u8::from_str_radix(v.trim_start_matches("0x"), 16).map_err(|err| log::error!("bad hex byte {v:?}: {err}"))?;
	}
	Ok(out)
}

/// JSON-file-backed `Store`, matching the schema and backup-before-overwrite behavior of
/// `EzspDbJson`.
pub struct JsonStore {
	path: PathBuf,
}

impl JsonStore {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}

	fn read(&self) -> Result<JsonDocument> {
		let text = fs::read_to_string(&self.path).map_err(|err| log::error!("could not load config file {:?}: {err}", self.path))?;
		serde_json::from_str(&text).map_err(|err| log::error!("could not parse config file {:?}: {err}", self.path))
	}
}

impl Store for JsonStore {
	fn load_config(&self, config: &mut DriverConfig) -> Result<()> {
		let doc = self.read()?;
		let loaded = doc.config.ok_or_else(|| log::error!("config key missing from {:?}", self.path))?;
		config.version = loaded.version;
		log::info!("config version: {}", config.version);
		Ok(())
	}

	fn load_networks(&self, networks: &mut Networks) -> Result<()> {
		let doc = self.read()?;

		for (idx, net) in doc.networks.iter().enumerate() {
			let slot = NetworkSlot {
				pan_id: parse_hex_u16(&net.pan_id)?,
				extended_pan_id: parse_hex_bytes(&net.extended_pan_id)?,
				radio_tx_power: net.radio_tx_power,
				radio_channel: net.radio_channel,
				join_method: net.join_method,
				nwk_manager_id: net.nwk_manager_id,
				nwk_update_id: net.nwk_update_id,
				channels: net.channels,
			};
			log::info!("network slot {idx}: pan 0x{:04X}", slot.pan_id);
			networks.set(slot);
		}

		Ok(())
	}

	fn load_children(&self, children: &mut ChildTable) -> Result<()> {
		let doc = self.read()?;

		for j in &doc.childs {
			let child = Child {
				eui64: parse_hex_bytes(&j.ieee_addr)?,
				short_id: parse_hex_u16(&j.nwk_addr)?,
				node_type: j.node_type,
				device_update: None,
				mac_capability: j.flags,
				joining: false,
				address_table_index: None,
				sequence: 0,
				in_flight: false,
			};
			children.insert(child);
		}

		Ok(())
	}

	fn save(&self, config: &DriverConfig, networks: &Networks, children: &ChildTable) -> Result<()> {
		if self.path.exists() {
			let backup = backup_path(&self.path);
			fs::rename(&self.path, &backup).map_err(|err| log::error!("failed to rename {:?} to {:?}: {err}", self.path, backup))?;
		}

		let doc = JsonDocument {
			config: Some(JsonConfig { version: config.version.clone() }),
			networks: networks
				.slots()
				.iter()
				.map(|n| JsonNetwork {
					pan_id: hex_u16(n.pan_id),
					extended_pan_id: hex_bytes(&n.extended_pan_id),
					radio_tx_power: n.radio_tx_power,
					radio_channel: n.radio_channel,
					join_method: n.join_method,
					nwk_manager_id: n.nwk_manager_id,
					nwk_update_id: n.nwk_update_id,
					channels: n.channels,
				})
				.collect(),
			childs: children
				.iter()
				.map(|c| JsonChild {
					id: u64::from_be_bytes(c.eui64),
					nwk_addr: hex_u16(c.short_id),
					ieee_addr: hex_bytes(&c.eui64),
					node_type: c.node_type,
					flags: c.mac_capability,
				})
				.collect(),
		};

		let text = serde_json::to_string_pretty(&doc).map_err(|err| log::error!("could not serialize config: {err}"))?;
		fs::write(&self.path, text).map_err(|err| log::error!("could not write config file {:?}: {err}", self.path))
	}
}

fn backup_path(path: &Path) -> PathBuf {
	let ts = runtime::time::unix();
	let mut name = path.as_os_str().to_owned();
	name.push(format!("_{ts}"));
	PathBuf::from(name)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn round_trips_through_json() {
		let dir = std::env::temp_dir().join(format!("host-persist-test-{}", std::process::id()));
		fs::create_dir_all(&dir).unwrap();
		let path = dir.join("db.json");

		let store = JsonStore::new(&path);
		let config = DriverConfig {
			device: "/dev/ttyUSB0".into(),
			baud: 57600,
			reset_retries: 3,
			max_retransmits: 5,
			protocol_version_floor: 4,
			protocol_version_ceiling: 8,
			config_file: path.to_string_lossy().into_owned(),
			version: "1.0".into(),
		};

		let mut networks = Networks::new();
		networks.set(NetworkSlot { pan_id: 0x1234, extended_pan_id: [1; 8], ..Default::default() });

		let mut children = ChildTable::new();
		children.insert(Child {
			eui64: [1, 2, 3, 4, 5, 6, 7, 8],
			short_id: 0xABCD,
			node_type: 2,
			device_update: None,
			mac_capability: 0x80,
			joining: false,
			address_table_index: None,
			sequence: 0,
			in_flight: false,
		});

		store.save(&config, &networks, &children).unwrap();

		let mut loaded_networks = Networks::new();
		store.load_networks(&mut loaded_networks).unwrap();
		assert_eq!(loaded_networks.slots()[0].pan_id, 0x1234);

		let mut loaded_children = ChildTable::new();
		store.load_children(&mut loaded_children).unwrap();
		assert_eq!(loaded_children.get(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap().short_id, 0xABCD);

		// Saving again should back up the previous file instead of clobbering it silently.
		store.save(&config, &networks, &children).unwrap();
		let backups = fs::read_dir(&dir).unwrap().filter(|e| e.as_ref().unwrap().file_name().to_string_lossy().starts_with("db.json_")).count();
		assert_eq!(backups, 1);

		fs::remove_dir_all(&dir).ok();
	}
}

//! Key material and security-state bookkeeping. Ported from `ezsp_frame_params.h`'s
//! `EmberInitialSecurityState`/`EmberCurrentSecurityState` bitmasks, narrowed to the network
//! key + trust-center link key model named in spec.md §3.

use ezsp::payload::SecurityState;

/// The key selectors used by the CLI surface named in spec.md §6 (`getKey Net|Trust|NextNet|AppLink`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
	Network,
	TrustCenterLink,
	NextNetwork,
	ApplicationLink,
}

impl KeyType {
	/// The `EmberKeyType` wire value for `getKey`.
	pub fn wire_value(self) -> u8 {
		match self {
			Self::Network => 0x01,
			Self::TrustCenterLink => 0x03,
			Self::NextNetwork => 0x02,
			Self::ApplicationLink => 0x04,
		}
	}

	/// The reverse of [`KeyType::wire_value`], used to recall which key type a pending
	/// `getKey` request asked for once its response arrives.
	pub fn from_wire_value(value: u8) -> Option<Self> {
		match value {
			0x01 => Some(Self::Network),
			0x03 => Some(Self::TrustCenterLink),
			0x02 => Some(Self::NextNetwork),
			0x04 => Some(Self::ApplicationLink),
			_ => None,
		}
	}
}

/// In-memory view of the keys the supervisor has learned, refreshed by
/// `getCurrentSecurityState`/`getKey` responses and consumed by `setInitialSecurityState`.
#[derive(Debug, Clone, Default)]
pub struct Keys {
	pub state: Option<SecurityState>,
	pub network_key: Option<[u8; 16]>,
	pub trust_center_link_key: Option<[u8; 16]>,
}

impl Keys {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn set_state(&mut self, state: SecurityState) {
		self.network_key = Some(state.network_key);
		self.state = Some(state);
	}

	pub fn set_key(&mut self, key_type: KeyType, key: [u8; 16]) {
		match key_type {
			KeyType::Network => self.network_key = Some(key),
			KeyType::TrustCenterLink => self.trust_center_link_key = Some(key),
			_ => {}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn wire_value_round_trips_through_from_wire_value() {
		for key_type in [KeyType::Network, KeyType::TrustCenterLink, KeyType::NextNetwork, KeyType::ApplicationLink] {
			assert_eq!(KeyType::from_wire_value(key_type.wire_value()), Some(key_type));
		}
	}

	#[test]
	fn set_state_also_refreshes_the_network_key() {
		let mut keys = Keys::new();
		let state = SecurityState { bitmask: 0, preconfigured_key: [0; 16], network_key: [9; 16], network_key_sequence_number: 0, trust_center_long_address: [0; 8] };
		keys.set_state(state);
		assert_eq!(keys.network_key, Some([9; 16]));
	}

	#[test]
	fn set_key_targets_the_right_slot() {
		let mut keys = Keys::new();
		keys.set_key(KeyType::TrustCenterLink, [1; 16]);
		assert_eq!(keys.trust_center_link_key, Some([1; 16]));
		assert_eq!(keys.network_key, None);
	}
}

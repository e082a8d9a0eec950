//! Persisted network parameters, one slot per known PAN. Ported from
//! `pi-zigbee-lib/net.h`'s `Network` record.

/// Spec data model bounds `networks` at four slots (§3, `networks[0..3]`).
pub const MAX_NETWORKS: usize = 4;

#[derive(Debug, Clone, Default)]
pub struct NetworkSlot {
	pub pan_id: u16,
	pub extended_pan_id: [u8; 8],
	pub radio_tx_power: i8,
	pub radio_channel: u8,
	pub join_method: u8,
	pub nwk_manager_id: u16,
	pub nwk_update_id: u8,
	pub channels: u32,
}

impl From<&ezsp::payload::NetworkParameters> for NetworkSlot {
	fn from(p: &ezsp::payload::NetworkParameters) -> Self {
		Self {
			pan_id: p.pan_id,
			extended_pan_id: p.extended_pan_id,
			radio_tx_power: p.radio_tx_power,
			radio_channel: p.radio_channel,
			join_method: p.join_method,
			nwk_manager_id: p.nwk_manager_id,
			nwk_update_id: p.nwk_update_id,
			channels: p.channels,
		}
	}
}

impl From<&NetworkSlot> for ezsp::payload::NetworkParameters {
	fn from(s: &NetworkSlot) -> Self {
		Self {
			extended_pan_id: s.extended_pan_id,
			pan_id: s.pan_id,
			radio_tx_power: s.radio_tx_power,
			radio_channel: s.radio_channel,
			join_method: s.join_method,
			nwk_manager_id: s.nwk_manager_id,
			nwk_update_id: s.nwk_update_id,
			channels: s.channels,
		}
	}
}

/// Fixed-capacity slot array; insertion beyond `MAX_NETWORKS` replaces the oldest entry.
#[derive(Debug, Clone, Default)]
pub struct Networks {
	slots: Vec<NetworkSlot>,
}

impl Networks {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn slots(&self) -> &[NetworkSlot] {
		&self.slots
	}

	pub fn set(&mut self, slot: NetworkSlot) {
		if let Some(existing) = self.slots.iter_mut().find(|s| s.pan_id == slot.pan_id) {
			*existing = slot;
			return;
		}

		if self.slots.len() >= MAX_NETWORKS {
			self.slots.remove(0);
		}

		self.slots.push(slot);
	}

	pub fn by_pan_id(&self, pan_id: u16) -> Option<&NetworkSlot> {
		self.slots.iter().find(|s| s.pan_id == pan_id)
	}

	/// The most recently set slot, used as the network to (re-)form when none is specified.
	pub fn primary(&self) -> Option<&NetworkSlot> {
		self.slots.last()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn set_replaces_oldest_past_capacity() {
		let mut nets = Networks::new();
		for pan in 0..MAX_NETWORKS as u16 + 1 {
			nets.set(NetworkSlot { pan_id: pan, ..Default::default() });
		}

		assert_eq!(nets.slots().len(), MAX_NETWORKS);
		assert!(nets.by_pan_id(0).is_none());
		assert!(nets.by_pan_id(MAX_NETWORKS as u16).is_some());
	}

	#[test]
	fn primary_is_the_most_recently_set_slot() {
		let mut nets = Networks::new();
		nets.set(NetworkSlot { pan_id: 1, ..Default::default() });
		nets.set(NetworkSlot { pan_id: 2, ..Default::default() });
		assert_eq!(nets.primary().unwrap().pan_id, 2);
	}

	#[test]
	fn network_parameters_round_trip_through_a_slot() {
		let slot = NetworkSlot { pan_id: 0xBEEF, extended_pan_id: [9; 8], radio_channel: 15, channels: 0x07FFF800, ..Default::default() };
		let parameters: ezsp::payload::NetworkParameters = (&slot).into();
		let back: NetworkSlot = (&parameters).into();
		assert_eq!(back.pan_id, slot.pan_id);
		assert_eq!(back.extended_pan_id, slot.extended_pan_id);
	}
}

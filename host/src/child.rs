//! The child (end device / router) table kept by the supervisor. Ported from
//! `pi-zigbee-lib/child.h`'s `Child` record and `ezsp_childs.h`'s address-table bookkeeping.

use std::collections::HashMap;

use ezsp::payload::{ChildJoin, TrustCenterJoin};

/// No short id has been assigned, or the short id has been invalidated by a collision.
pub const NO_CHILD_ID: u16 = 0xFFFF;

fn eui64_key(eui64: &[u8; 8]) -> u64 {
	u64::from_be_bytes(*eui64)
}

/// A single child device, keyed by EUI64.
#[derive(Debug, Clone)]
pub struct Child {
	pub eui64: [u8; 8],
	pub short_id: u16,
	pub node_type: u8,
	pub device_update: Option<u8>,
	pub mac_capability: u8,
	pub joining: bool,
	/// Index into the NCP's address table, once assigned.
	pub address_table_index: Option<u8>,
	pub sequence: u8,
	pub in_flight: bool,
}

impl Child {
	fn from_join(join: &ChildJoin) -> Self {
		Self {
			eui64: join.child_eui64,
			short_id: join.child_id,
			node_type: join.child_type,
			device_update: None,
			mac_capability: 0,
			joining: join.joining,
			address_table_index: None,
			sequence: 0,
			in_flight: false,
		}
	}
}

/// Children keyed by EUI64 (decimal per the JSON schema, big-endian of the 8-byte address).
#[derive(Debug, Clone, Default)]
pub struct ChildTable {
	children: HashMap<u64, Child>,
}

impl ChildTable {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn get(&self, eui64: &[u8; 8]) -> Option<&Child> {
		self.children.get(&eui64_key(eui64))
	}

	pub fn iter(&self) -> impl Iterator<Item = &Child> {
		self.children.values()
	}

	pub fn insert(&mut self, child: Child) {
		self.children.insert(eui64_key(&child.eui64), child);
	}

	/// Insert a new child or refresh an existing one's short id and reported fields. Returns
	/// the EUI64 key so the caller can follow up with `invalidate_by_short_id`.
	pub fn add_or_update(&mut self, join: &ChildJoin) -> u64 {
		let key = eui64_key(&join.child_eui64);

		match self.children.get_mut(&key) {
			Some(existing) => {
				if existing.short_id != join.child_id {
					log::info!(
						"child {:016X} short id changed {:04X} -> {:04X}",
						key,
						existing.short_id,
						join.child_id
					);
					existing.short_id = join.child_id;
				}
				existing.node_type = join.child_type;
				existing.joining = join.joining;
			}
			None => {
				self.children.insert(key, Child::from_join(join));
			}
		}

		key
	}

	/// For every entry whose short id equals `short_id` and whose EUI64 differs from
	/// `new_owner`, clear the short id. Resolves address reuse after a rejoin.
	pub fn invalidate_by_short_id(&mut self, new_owner: &[u8; 8], short_id: u16) {
		let owner_key = eui64_key(new_owner);

		for (key, child) in self.children.iter_mut() {
			if *key != owner_key && child.short_id == short_id {
				log::info!("invalidating stale short id {:04X} on child {:016X}", short_id, key);
				child.short_id = NO_CHILD_ID;
			}
		}
	}

	/// Apply a `trustCenterJoinHandler` callback: update the named child's device-update
	/// status (and, per the protocol, the owning short id may have moved to a new EUI64).
	pub fn apply_trust_center_join(&mut self, join: &TrustCenterJoin) {
		self.invalidate_by_short_id(&join.new_node_eui64, join.new_node_id);

		let key = eui64_key(&join.new_node_eui64);
		self.children
			.entry(key)
			.and_modify(|c| c.device_update = Some(join.status))
			.or_insert_with(|| {
				let mut c = Child::from_join(&ChildJoin {
					index: 0,
					joining: false,
					child_id: join.new_node_id,
					child_eui64: join.new_node_eui64,
					child_type: 0,
				});
				c.device_update = Some(join.status);
				c
			});
	}

	pub fn set_joining(&mut self, eui64: &[u8; 8], joining: bool) {
		if let Some(child) = self.children.get_mut(&eui64_key(eui64)) {
			child.joining = joining;
		}
	}

	pub fn mark_in_flight(&mut self, eui64: &[u8; 8], in_flight: bool) {
		if let Some(child) = self.children.get_mut(&eui64_key(eui64)) {
			child.in_flight = in_flight;
		}
	}

	/// The first child that has not yet been assigned an address-table slot.
	pub fn next_for_address_table(&self) -> Option<&Child> {
		self.children.values().find(|c| c.address_table_index.is_none())
	}

	pub fn len(&self) -> usize {
		self.children.len()
	}

	pub fn is_empty(&self) -> bool {
		self.children.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn join(eui64: [u8; 8], child_id: u16) -> ChildJoin {
		ChildJoin { index: 1, joining: true, child_id, child_eui64: eui64, child_type: 2 }
	}

	#[test]
	fn add_or_update_inserts_new_child() {
		let mut table = ChildTable::new();
		table.add_or_update(&join([1, 2, 3, 4, 5, 6, 7, 8], 0x1234));

		let child = table.get(&[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
		assert_eq!(child.short_id, 0x1234);
	}

	#[test]
	fn add_or_update_refreshes_short_id_without_duplicating() {
		let mut table = ChildTable::new();
		let eui64 = [1, 2, 3, 4, 5, 6, 7, 8];
		table.add_or_update(&join(eui64, 0x1234));
		table.add_or_update(&join(eui64, 0x5678));

		assert_eq!(table.len(), 1);
		assert_eq!(table.get(&eui64).unwrap().short_id, 0x5678);
	}

	#[test]
	fn invalidate_by_short_id_clears_stale_owner_only() {
		let mut table = ChildTable::new();
		let old_owner = [1; 8];
		let new_owner = [2; 8];
		table.add_or_update(&join(old_owner, 0x1234));
		table.add_or_update(&join(new_owner, 0x9999));

		table.invalidate_by_short_id(&new_owner, 0x1234);

		assert_eq!(table.get(&old_owner).unwrap().short_id, NO_CHILD_ID);
		assert_eq!(table.get(&new_owner).unwrap().short_id, 0x9999);
	}

	#[test]
	fn next_for_address_table_skips_assigned_entries() {
		let mut table = ChildTable::new();
		table.add_or_update(&join([1; 8], 1));
		table.add_or_update(&join([2; 8], 2));

		table.children.get_mut(&eui64_key(&[1; 8])).unwrap().address_table_index = Some(0);

		let next = table.next_for_address_table().unwrap();
		assert_eq!(next.eui64, [2; 8]);
	}
}

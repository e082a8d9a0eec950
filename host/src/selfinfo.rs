//! What the host learns about its own NCP during `GettingDeviceInfo`.

#[derive(Debug, Clone, Default)]
pub struct SelfInfo {
	pub protocol_version: Option<u8>,
	pub stack_type: Option<u8>,
	pub stack_version: Option<u16>,
	pub eui64: Option<[u8; 8]>,
	pub node_id: Option<u16>,
}

impl SelfInfo {
	pub fn is_complete(&self) -> bool {
		self.protocol_version.is_some() && self.eui64.is_some() && self.node_id.is_some()
	}
}

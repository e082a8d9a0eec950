//! Parameter layouts for the command catalog named in the spec. Each type pairs a `decode`
//! and an `encode`, mirroring the parameter structs in `ezsp_frame_params.h` (`ver_req`,
//! `ver_resp`, `data_array`, `ember_status`, `start_scan`, ...).

use crate::error::CodecError;
use crate::params::{Enum, Reader, Writer, MAX_PARAM_BYTES, MAX_PAYLOAD_BYTES};

/// `EmberStatus`; `SUCCESS` (0) drives normal flow, everything else is surfaced to the
/// application except the network-up/down values which drive the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmberStatus {
	Success,
	NetworkUp,
	NetworkDown,
	NotJoined,
	InvalidCall,
	Failure,
}

impl EmberStatus {
	fn decode(byte: u8) -> Option<Self> {
		Some(match byte {
			0x00 => Self::Success,
			0x90 => Self::NetworkUp,
			0x94 => Self::NetworkDown,
			0x93 => Self::NotJoined,
			0x70 => Self::InvalidCall,
			0x01 => Self::Failure,
			_ => return None,
		})
	}

	fn encode(self) -> u8 {
		match self {
			Self::Success => 0x00,
			Self::NetworkUp => 0x90,
			Self::NetworkDown => 0x94,
			Self::NotJoined => 0x93,
			Self::InvalidCall => 0x70,
			Self::Failure => 0x01,
		}
	}
}

pub type Status = Enum<EmberStatus>;

fn read_status(r: &mut Reader) -> Result<Status, CodecError> {
	Ok(Enum::decode(r.u8()?, EmberStatus::decode))
}

fn write_status(w: &mut Writer, status: Status) {
	w.u8(match status {
		Enum::Known(s) => s.encode(),
		Enum::Unknown(b) => b,
	});
}

/// `version` command: request carries the desired version, response echoes the NCP's actual
/// version, stack type, and stack version.
#[derive(Debug, Clone)]
pub struct VersionRequest {
	pub desired_protocol_version: u8,
}

impl VersionRequest {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { desired_protocol_version: Reader::new(bytes).u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.desired_protocol_version);
		w.into_inner()
	}
}

#[derive(Debug, Clone)]
pub struct VersionResponse {
	pub protocol_version: u8,
	pub stack_type: u8,
	pub stack_version: u16,
}

impl VersionResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { protocol_version: r.u8()?, stack_type: r.u8()?, stack_version: r.u16()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.protocol_version).u8(self.stack_type).u16(self.stack_version);
		w.into_inner()
	}
}

/// `echo` and other `[dataLength, data]`-shaped commands.
#[derive(Debug, Clone)]
pub struct DataArray {
	pub data: Vec<u8>,
}

impl DataArray {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { data: Reader::new(bytes).array(MAX_PAYLOAD_BYTES)? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.array(&self.data, MAX_PAYLOAD_BYTES);
		w.into_inner()
	}
}

/// A response carrying just an `EmberStatus`.
#[derive(Debug, Clone)]
pub struct StatusResponse {
	pub status: Status,
}

impl StatusResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { status: read_status(&mut Reader::new(bytes))? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.into_inner()
	}
}

/// `getEui64` response.
#[derive(Debug, Clone)]
pub struct Eui64Response {
	pub eui64: [u8; 8],
}

impl Eui64Response {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { eui64: Reader::new(bytes).fixed()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.fixed(&self.eui64);
		w.into_inner()
	}
}

/// `getNodeId` response.
#[derive(Debug, Clone)]
pub struct NodeIdResponse {
	pub node_id: u16,
}

impl NodeIdResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { node_id: Reader::new(bytes).u16()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.node_id);
		w.into_inner()
	}
}

/// `startScan` request.
#[derive(Debug, Clone)]
pub struct StartScan {
	pub scan_type: u8,
	pub channel_mask: u32,
	pub duration: u8,
}

impl StartScan {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { scan_type: r.u8()?, channel_mask: r.u32()?, duration: r.u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.scan_type).u32(self.channel_mask).u8(self.duration);
		w.into_inner()
	}
}

/// `energyScanResultHandler` callback.
#[derive(Debug, Clone)]
pub struct EnergyScanResult {
	pub channel: u8,
	pub max_rssi: i8,
}

impl EnergyScanResult {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { channel: r.u8()?, max_rssi: r.i8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.channel).i8(self.max_rssi);
		w.into_inner()
	}
}

/// `scanCompleteHandler` callback.
#[derive(Debug, Clone)]
pub struct ScanComplete {
	pub channel: u8,
	pub status: Status,
}

impl ScanComplete {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { channel: r.u8()?, status: read_status(&mut r)? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.channel);
		write_status(&mut w, self.status);
		w.into_inner()
	}
}

/// `networkFoundHandler` callback: the beacon fields relevant to join selection.
#[derive(Debug, Clone)]
pub struct NetworkFound {
	pub pan_id: u16,
	pub channel: u8,
	pub allow_join: bool,
	pub stack_profile: u8,
}

impl NetworkFound {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { pan_id: r.u16()?, channel: r.u8()?, allow_join: r.u8()? != 0, stack_profile: r.u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.pan_id).u8(self.channel).u8(self.allow_join as u8).u8(self.stack_profile);
		w.into_inner()
	}
}

/// `formNetwork` request and `getNetworkParameters` response share this layout.
#[derive(Debug, Clone)]
pub struct NetworkParameters {
	pub extended_pan_id: [u8; 8],
	pub pan_id: u16,
	pub radio_tx_power: i8,
	pub radio_channel: u8,
	pub join_method: u8,
	pub nwk_manager_id: u16,
	pub nwk_update_id: u8,
	pub channels: u32,
}

impl NetworkParameters {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self {
			extended_pan_id: r.fixed()?,
			pan_id: r.u16()?,
			radio_tx_power: r.i8()?,
			radio_channel: r.u8()?,
			join_method: r.u8()?,
			nwk_manager_id: r.u16()?,
			nwk_update_id: r.u8()?,
			channels: r.u32()?,
		})
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.fixed(&self.extended_pan_id)
			.u16(self.pan_id)
			.i8(self.radio_tx_power)
			.u8(self.radio_channel)
			.u8(self.join_method)
			.u16(self.nwk_manager_id)
			.u8(self.nwk_update_id)
			.u32(self.channels);
		w.into_inner()
	}
}

/// `getNetworkParameters` response also reports the node type and status ahead of the
/// parameters above.
#[derive(Debug, Clone)]
pub struct GetNetworkParametersResponse {
	pub status: Status,
	pub node_type: u8,
	pub parameters: NetworkParameters,
}

impl GetNetworkParametersResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let status = read_status(&mut r)?;
		let node_type = r.u8()?;
		let parameters = NetworkParameters::decode(r.remaining())?;
		Ok(Self { status, node_type, parameters })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.u8(self.node_type).raw(&self.parameters.encode());
		w.into_inner()
	}
}

/// `joinNetwork` request: the node type to join as, plus the parameters of the network found
/// by a prior scan.
#[derive(Debug, Clone)]
pub struct JoinNetwork {
	pub node_type: u8,
	pub parameters: NetworkParameters,
}

impl JoinNetwork {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let node_type = r.u8()?;
		let parameters = NetworkParameters::decode(r.remaining())?;
		Ok(Self { node_type, parameters })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.node_type).raw(&self.parameters.encode());
		w.into_inner()
	}
}

/// `stackStatusHandler` callback: the status value that drives the host state machine.
#[derive(Debug, Clone)]
pub struct StackStatus {
	pub status: Status,
}

impl StackStatus {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { status: read_status(&mut Reader::new(bytes))? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.into_inner()
	}
}

/// `setInitialSecurityState` request and `getCurrentSecurityState` response share the
/// security bitmask plus key material fields.
#[derive(Debug, Clone)]
pub struct SecurityState {
	pub bitmask: u16,
	pub preconfigured_key: [u8; 16],
	pub network_key: [u8; 16],
	pub network_key_sequence_number: u8,
	pub trust_center_long_address: [u8; 8],
}

impl SecurityState {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self {
			bitmask: r.u16()?,
			preconfigured_key: r.fixed()?,
			network_key: r.fixed()?,
			network_key_sequence_number: r.u8()?,
			trust_center_long_address: r.fixed()?,
		})
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.bitmask)
			.fixed(&self.preconfigured_key)
			.fixed(&self.network_key)
			.u8(self.network_key_sequence_number)
			.fixed(&self.trust_center_long_address);
		w.into_inner()
	}
}

/// `getCurrentSecurityState` response: status ahead of the same state layout
/// `setInitialSecurityState` takes as a request.
#[derive(Debug, Clone)]
pub struct GetSecurityStateResponse {
	pub status: Status,
	pub state: SecurityState,
}

impl GetSecurityStateResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let status = read_status(&mut r)?;
		let state = SecurityState::decode(r.remaining())?;
		Ok(Self { status, state })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.raw(&self.state.encode());
		w.into_inner()
	}
}

/// `getKey` response: the 16-byte key material for the requested key type.
#[derive(Debug, Clone)]
pub struct KeyResponse {
	pub status: Status,
	pub key: [u8; 16],
}

impl KeyResponse {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { status: read_status(&mut r)?, key: r.fixed()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.fixed(&self.key);
		w.into_inner()
	}
}

/// `setConfigurationValue`/`getConfigurationValue` share this `(id, value)` shape.
#[derive(Debug, Clone)]
pub struct ConfigValue {
	pub config_id: u8,
	pub value: u16,
}

impl ConfigValue {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { config_id: r.u8()?, value: r.u16()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.config_id).u16(self.value);
		w.into_inner()
	}
}

/// `setValue`/`getValue` carry an id and a length-prefixed byte value.
#[derive(Debug, Clone)]
pub struct Value {
	pub value_id: u8,
	pub value: Vec<u8>,
}

impl Value {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { value_id: r.u8()?, value: r.array(MAX_PARAM_BYTES)? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.value_id).array(&self.value, MAX_PARAM_BYTES);
		w.into_inner()
	}
}

/// `sendUnicast` request.
#[derive(Debug, Clone)]
pub struct SendUnicast {
	pub node_id: u16,
	pub aps_frame: Vec<u8>,
	pub message_tag: u8,
	pub payload: Vec<u8>,
}

impl SendUnicast {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let node_id = r.u16()?;
		let aps_frame = r.array(MAX_PARAM_BYTES)?;
		let message_tag = r.u8()?;
		let payload = r.array(MAX_PAYLOAD_BYTES)?;
		Ok(Self { node_id, aps_frame, message_tag, payload })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.node_id);
		w.array(&self.aps_frame, MAX_PARAM_BYTES);
		w.u8(self.message_tag);
		w.array(&self.payload, MAX_PAYLOAD_BYTES);
		w.into_inner()
	}
}

/// `messageSentHandler` callback; `message_tag` correlates with the originating `sendUnicast`.
#[derive(Debug, Clone)]
pub struct MessageSent {
	pub node_id: u16,
	pub aps_frame: Vec<u8>,
	pub message_tag: u8,
	pub status: Status,
}

impl MessageSent {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let node_id = r.u16()?;
		let aps_frame = r.array(MAX_PARAM_BYTES)?;
		let message_tag = r.u8()?;
		let status = read_status(&mut r)?;
		Ok(Self { node_id, aps_frame, message_tag, status })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.node_id);
		w.array(&self.aps_frame, MAX_PARAM_BYTES);
		w.u8(self.message_tag);
		write_status(&mut w, self.status);
		w.into_inner()
	}
}

/// `incomingMessageHandler` callback.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
	pub sender: u16,
	pub aps_frame: Vec<u8>,
	pub last_hop_lqi: u8,
	pub last_hop_rssi: i8,
	pub payload: Vec<u8>,
}

impl IncomingMessage {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		let sender = r.u16()?;
		let aps_frame = r.array(MAX_PARAM_BYTES)?;
		let last_hop_lqi = r.u8()?;
		let last_hop_rssi = r.i8()?;
		let payload = r.array(MAX_PAYLOAD_BYTES)?;
		Ok(Self { sender, aps_frame, last_hop_lqi, last_hop_rssi, payload })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.sender);
		w.array(&self.aps_frame, MAX_PARAM_BYTES);
		w.u8(self.last_hop_lqi);
		w.i8(self.last_hop_rssi);
		w.array(&self.payload, MAX_PAYLOAD_BYTES);
		w.into_inner()
	}
}

/// `incomingRouteErrorHandler` callback.
#[derive(Debug, Clone)]
pub struct IncomingRouteError {
	pub status: Status,
	pub target: u16,
}

impl IncomingRouteError {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { status: read_status(&mut r)?, target: r.u16()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.u16(self.target);
		w.into_inner()
	}
}

/// `childJoinHandler` callback.
#[derive(Debug, Clone)]
pub struct ChildJoin {
	pub index: u8,
	pub joining: bool,
	pub child_id: u16,
	pub child_eui64: [u8; 8],
	pub child_type: u8,
}

impl ChildJoin {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { index: r.u8()?, joining: r.u8()? != 0, child_id: r.u16()?, child_eui64: r.fixed()?, child_type: r.u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.index).u8(self.joining as u8).u16(self.child_id).fixed(&self.child_eui64).u8(self.child_type);
		w.into_inner()
	}
}

/// `trustCenterJoinHandler` callback.
#[derive(Debug, Clone)]
pub struct TrustCenterJoin {
	pub new_node_id: u16,
	pub new_node_eui64: [u8; 8],
	pub status: u8,
	pub policy_decision: u8,
	pub parent_of_new_node_id: u16,
}

impl TrustCenterJoin {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self {
			new_node_id: r.u16()?,
			new_node_eui64: r.fixed()?,
			status: r.u8()?,
			policy_decision: r.u8()?,
			parent_of_new_node_id: r.u16()?,
		})
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u16(self.new_node_id).fixed(&self.new_node_eui64).u8(self.status).u8(self.policy_decision).u16(self.parent_of_new_node_id);
		w.into_inner()
	}
}

/// `getChildData` response.
#[derive(Debug, Clone)]
pub struct ChildData {
	pub status: Status,
	pub child_id: u16,
	pub child_eui64: [u8; 8],
	pub child_type: u8,
}

impl ChildData {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { status: read_status(&mut r)?, child_id: r.u16()?, child_eui64: r.fixed()?, child_type: r.u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.u16(self.child_id).fixed(&self.child_eui64).u8(self.child_type);
		w.into_inner()
	}
}

/// `lookupEui64ByNodeId` response.
#[derive(Debug, Clone)]
pub struct LookupEui64Response {
	pub status: Status,
	pub eui64: [u8; 8],
}

impl LookupEui64Response {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { status: read_status(&mut r)?, eui64: r.fixed()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		write_status(&mut w, self.status);
		w.fixed(&self.eui64);
		w.into_inner()
	}
}

/// `setBinding`/`getBinding` share this layout.
#[derive(Debug, Clone)]
pub struct Binding {
	pub index: u8,
	pub binding_type: u8,
	pub local_endpoint: u8,
	pub cluster_id: u16,
	pub remote_endpoint: u8,
	pub identifier: [u8; 8],
}

impl Binding {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self {
			index: r.u8()?,
			binding_type: r.u8()?,
			local_endpoint: r.u8()?,
			cluster_id: r.u16()?,
			remote_endpoint: r.u8()?,
			identifier: r.fixed()?,
		})
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.index).u8(self.binding_type).u8(self.local_endpoint).u16(self.cluster_id).u8(self.remote_endpoint).fixed(&self.identifier);
		w.into_inner()
	}
}

/// `setExtendedTimeout`/`getExtendedTimeout` share this layout.
#[derive(Debug, Clone)]
pub struct ExtendedTimeout {
	pub remote_eui64: [u8; 8],
	pub extended_timeout: bool,
}

impl ExtendedTimeout {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		let mut r = Reader::new(bytes);
		Ok(Self { remote_eui64: r.fixed()?, extended_timeout: r.u8()? != 0 })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.fixed(&self.remote_eui64).u8(self.extended_timeout as u8);
		w.into_inner()
	}
}

/// `neighborCount` response.
#[derive(Debug, Clone)]
pub struct NeighborCount {
	pub value: u8,
}

impl NeighborCount {
	pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
		Ok(Self { value: Reader::new(bytes).u8()? })
	}

	pub fn encode(&self) -> Vec<u8> {
		let mut w = Writer::new();
		w.u8(self.value);
		w.into_inner()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn version_round_trip() {
		let resp = VersionResponse { protocol_version: 8, stack_type: 2, stack_version: 0x1234 };
		let bytes = resp.encode();
		let decoded = VersionResponse::decode(&bytes).unwrap();
		assert_eq!(decoded.protocol_version, 8);
		assert_eq!(decoded.stack_version, 0x1234);
	}

	#[test]
	fn status_unknown_value_does_not_fail_frame() {
		let bytes = [0x99];
		let resp = StatusResponse::decode(&bytes).unwrap();
		assert_eq!(resp.status, Enum::Unknown(0x99));
	}

	#[test]
	fn child_join_round_trip() {
		let join = ChildJoin { index: 1, joining: true, child_id: 0xBEEF, child_eui64: [1, 2, 3, 4, 5, 6, 7, 8], child_type: 2 };
		let bytes = join.encode();
		let decoded = ChildJoin::decode(&bytes).unwrap();
		assert_eq!(decoded.child_id, 0xBEEF);
		assert!(decoded.joining);
	}

	#[test]
	fn send_unicast_round_trip_with_payload() {
		let cmd = SendUnicast { node_id: 0x1234, aps_frame: vec![1, 2, 3], message_tag: 9, payload: vec![0xAA; 10] };
		let bytes = cmd.encode();
		let decoded = SendUnicast::decode(&bytes).unwrap();
		assert_eq!(decoded.node_id, 0x1234);
		assert_eq!(decoded.payload.len(), 10);
	}

	#[test]
	fn join_network_round_trip() {
		let parameters = NetworkParameters {
			extended_pan_id: [1; 8],
			pan_id: 0x1234,
			radio_tx_power: 3,
			radio_channel: 15,
			join_method: 0,
			nwk_manager_id: 0,
			nwk_update_id: 0,
			channels: 0x07FFF800,
		};
		let join = JoinNetwork { node_type: 1, parameters };
		let bytes = join.encode();
		let decoded = JoinNetwork::decode(&bytes).unwrap();
		assert_eq!(decoded.node_type, 1);
		assert_eq!(decoded.parameters.pan_id, 0x1234);
	}

	#[test]
	fn security_state_response_round_trip() {
		let state = SecurityState {
			bitmask: 0,
			preconfigured_key: [0; 16],
			network_key: [7; 16],
			network_key_sequence_number: 0,
			trust_center_long_address: [1; 8],
		};
		let resp = GetSecurityStateResponse { status: Enum::Known(EmberStatus::Success), state };
		let bytes = resp.encode();
		let decoded = GetSecurityStateResponse::decode(&bytes).unwrap();
		assert_eq!(decoded.state.network_key, [7; 16]);
	}
}

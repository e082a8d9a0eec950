//! The supervisor: owns the in-memory model and drives the state table in spec.md §4.4.
//! Ported from `ezsp_sm.cpp`'s event dispatch loop, minus the shared-pointer/callback-member
//! plumbing (see SPEC_FULL.md's design notes on replacing those with owned state + an action
//! list).

use ash::frame::ResetReason;
use ezsp::payload::{self, EmberStatus, NetworkFound};
use ezsp::{CommandId, Enum, Envelope};

use crate::child::ChildTable;
use crate::events::{Action, DomainEvent, Event};
use crate::network::Networks;
use crate::security::{KeyType, Keys};
use crate::selfinfo::SelfInfo;
use crate::state::State;

/// Active scan across all 16 2.4GHz channels, matching the CLI surface's `startscana`.
const DEFAULT_SCAN_CHANNEL_MASK: u32 = 0x07FFF800;
const DEFAULT_SCAN_DURATION: u8 = 4;
/// `EZSP_ACTIVE_SCAN`; `EZSP_ENERGY_SCAN` is 0x00.
const SCAN_TYPE_ACTIVE: u8 = 0x01;
/// Default radio channel to form a network on when none is persisted, matching
/// `ezsp_db_json.h`'s `get_optional<uint8_t>(net, "radioChannel", 15)`.
const DEFAULT_RADIO_CHANNEL: u8 = 15;
/// `EmberNodeType`: this host joins an existing network as a router, never as an end device.
const NODE_TYPE_ROUTER: u8 = 0x01;

/// The supervisor task's state, per spec.md §4.4/§5. The link task never touches this; only
/// `handle_event` (run from the supervisor thread) does.
pub struct Supervisor {
	state: State,
	seq: u8,
	/// Whether this host forms the network (trust center) rather than joining one.
	coordinator: bool,
	self_info: SelfInfo,
	pub children: ChildTable,
	pub networks: Networks,
	pub keys: Keys,
	/// The best beacon seen during the active scan started in `InitNetwork`, joined once the
	/// scan completes.
	scan_candidate: Option<NetworkFound>,
	/// Which `KeyType` an outstanding `getKey` request asked for, so its response can be filed
	/// under the right slot in `keys`.
	pending_key_request: Option<KeyType>,
}

impl Supervisor {
	pub fn new(coordinator: bool) -> Self {
		Self {
			state: State::Initial,
			seq: 0,
			coordinator,
			self_info: SelfInfo::default(),
			children: ChildTable::new(),
			networks: Networks::new(),
			keys: Keys::new(),
			scan_candidate: None,
			pending_key_request: None,
		}
	}

	pub fn state(&self) -> State {
		self.state
	}

	/// The EZSP envelope framing version to use on the wire: the NCP's reported protocol
	/// version once known, otherwise the legacy default every NCP understands.
	pub fn negotiated_version(&self) -> u8 {
		self.self_info.protocol_version.unwrap_or(4)
	}

	fn next_seq(&mut self) -> u8 {
		let seq = self.seq;
		self.seq = self.seq.wrapping_add(1);
		seq
	}

	fn send(&mut self, command: CommandId, params: Vec<u8>) -> Action {
		Action::Send(Envelope {
			seq: self.next_seq(),
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command,
			params,
		})
	}

	/// Advance the state machine and in-memory model by one event, returning the side effects
	/// the caller (the supervisor task's driver loop) must perform.
	pub fn handle_event(&mut self, event: Event) -> Vec<Action> {
		match event {
			Event::Start => self.on_start(),
			Event::LinkUp(reason) => self.on_link_up(reason),
			Event::LinkDown => self.on_link_down(),
			Event::LinkFailed(err) => self.on_link_failed(err),
			Event::Frame(envelope) => self.on_frame(envelope),
			Event::Send(command, params) => {
				if command == CommandId::GetKey {
					self.pending_key_request = params.first().copied().and_then(KeyType::from_wire_value);
				}
				vec![self.send(command, params)]
			}
		}
	}

	fn on_start(&mut self) -> Vec<Action> {
		if self.state == State::Initial {
			log::info!("starting driver");
			self.state = State::UartConnected;
		}
		vec![]
	}

	fn on_link_up(&mut self, reason: ResetReason) -> Vec<Action> {
		if self.state != State::UartConnected {
			log::warn!("link up in unexpected state {:?}", self.state);
		}
		self.state = State::GettingDeviceInfo;
		self.self_info = SelfInfo::default();

		vec![
			Action::Emit(DomainEvent::Connected(reason)),
			self.send(CommandId::Version, payload::VersionRequest { desired_protocol_version: 8 }.encode()),
		]
	}

	fn on_link_down(&mut self) -> Vec<Action> {
		self.state = State::Initial;
		vec![Action::Emit(DomainEvent::Disconnected)]
	}

	fn on_link_failed(&mut self, err: ash::LinkError) -> Vec<Action> {
		log::warn!("link failed: {err:?}");
		self.state = State::Initial;
		vec![Action::Emit(DomainEvent::Disconnected)]
	}

	fn on_frame(&mut self, envelope: Envelope) -> Vec<Action> {
		match envelope.command {
			CommandId::Version => self.on_version(&envelope),
			CommandId::GetEui64 => self.on_eui64(&envelope),
			CommandId::GetNodeId => self.on_node_id(&envelope),
			CommandId::StackStatusHandler => self.on_stack_status(&envelope),
			CommandId::ChildJoinHandler => self.on_child_join(&envelope),
			CommandId::TrustCenterJoinHandler => self.on_trust_center_join(&envelope),
			CommandId::GetNetworkParameters => self.on_network_parameters(&envelope),
			CommandId::SetInitialSecurityState => self.on_security_state_set(&envelope),
			CommandId::GetCurrentSecurityState => self.on_security_state(&envelope),
			CommandId::GetKey => self.on_get_key(&envelope),
			CommandId::ScanCompleteHandler => self.on_scan_complete(&envelope),
			CommandId::NetworkFoundHandler => self.on_network_found(&envelope),
			CommandId::EnergyScanResultHandler => self.on_energy_scan_result(&envelope),
			CommandId::MessageSentHandler => self.on_message_sent(&envelope),
			CommandId::IncomingMessageHandler => self.on_incoming_message(&envelope),
			CommandId::LookupEui64ByNodeId => {
				log::debug!("lookupEui64ByNodeId response for seq {}", envelope.seq);
				vec![]
			}
			_ => self.on_generic_response(&envelope),
		}
	}

	/// Commands this supervisor does not special-case still get their leading `EmberStatus`
	/// checked, so a failure reaches the application instead of being dropped silently
	/// (spec.md §7: "surfaced to application with the originating command id").
	fn on_generic_response(&mut self, envelope: &Envelope) -> Vec<Action> {
		log::debug!("unhandled command {} (seq {})", envelope.command.name(), envelope.seq);

		let Ok(resp) = payload::StatusResponse::decode(&envelope.params) else {
			return vec![];
		};

		match resp.status {
			Enum::Known(EmberStatus::Success) | Enum::Known(EmberStatus::NetworkUp) | Enum::Known(EmberStatus::NetworkDown) => vec![],
			_ => vec![Action::Emit(DomainEvent::CommandFailed { command: envelope.command, status: resp.status })],
		}
	}

	fn decode_err<T>(&self, what: &str, result: Result<T, ezsp::CodecError>) -> Option<T> {
		match result {
			Ok(v) => Some(v),
			Err(err) => {
				log::warn!("could not decode {what}: {err:?}");
				None
			}
		}
	}

	fn on_version(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("version response", payload::VersionResponse::decode(&envelope.params)) else {
			return vec![];
		};

		self.self_info.protocol_version = Some(resp.protocol_version);
		self.self_info.stack_type = Some(resp.stack_type);
		self.self_info.stack_version = Some(resp.stack_version);

		vec![self.send(CommandId::GetEui64, vec![])]
	}

	fn on_eui64(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("getEui64 response", payload::Eui64Response::decode(&envelope.params)) else {
			return vec![];
		};

		self.self_info.eui64 = Some(resp.eui64);
		vec![self.send(CommandId::GetNodeId, vec![])]
	}

	fn on_node_id(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("getNodeId response", payload::NodeIdResponse::decode(&envelope.params)) else {
			return vec![];
		};

		self.self_info.node_id = Some(resp.node_id);

		if !self.self_info.is_complete() || self.state != State::GettingDeviceInfo {
			return vec![];
		}

		self.state = State::InitNetwork;
		log::info!("device info complete, entering InitNetwork (coordinator={})", self.coordinator);

		if self.coordinator {
			let state = payload::SecurityState {
				bitmask: 0,
				preconfigured_key: [0; 16],
				network_key: self.keys.network_key.unwrap_or([0; 16]),
				network_key_sequence_number: 0,
				trust_center_long_address: self.self_info.eui64.unwrap_or_default(),
			};
			vec![self.send(CommandId::SetInitialSecurityState, state.encode())]
		} else {
			let scan = payload::StartScan { scan_type: SCAN_TYPE_ACTIVE, channel_mask: DEFAULT_SCAN_CHANNEL_MASK, duration: DEFAULT_SCAN_DURATION };
			vec![self.send(CommandId::StartScan, scan.encode())]
		}
	}

	fn on_stack_status(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(status) = self.decode_err("stackStatusHandler", payload::StackStatus::decode(&envelope.params)) else {
			return vec![];
		};

		match status.status {
			Enum::Known(EmberStatus::NetworkUp) => {
				self.state = State::UpAndReady;
				vec![Action::Emit(DomainEvent::NetworkUp)]
			}
			Enum::Known(EmberStatus::NetworkDown) => {
				self.state = State::Initial;
				vec![Action::Emit(DomainEvent::NetworkDown)]
			}
			_ => vec![],
		}
	}

	fn on_child_join(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(join) = self.decode_err("childJoinHandler", payload::ChildJoin::decode(&envelope.params)) else {
			return vec![];
		};

		self.children.add_or_update(&join);
		vec![Action::Emit(DomainEvent::ChildJoined { eui64: join.child_eui64 })]
	}

	fn on_trust_center_join(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(join) = self.decode_err("trustCenterJoinHandler", payload::TrustCenterJoin::decode(&envelope.params)) else {
			return vec![];
		};

		self.children.apply_trust_center_join(&join);
		vec![Action::Emit(DomainEvent::ChildUpdated { eui64: join.new_node_eui64 })]
	}

	fn on_network_parameters(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("getNetworkParameters response", payload::GetNetworkParametersResponse::decode(&envelope.params)) else {
			return vec![];
		};

		self.networks.set((&resp.parameters).into());
		vec![]
	}

	/// Coordinator path: once the initial security state is accepted, form the network whose
	/// parameters were last persisted, or a fresh one on the default channel (spec.md §4.4,
	/// "(if coordinator) → issue `setInitialSecurityState` then on success `formNetwork`").
	fn on_security_state_set(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("setInitialSecurityState response", payload::StatusResponse::decode(&envelope.params)) else {
			return vec![];
		};

		if resp.status != Enum::Known(EmberStatus::Success) {
			return vec![Action::Emit(DomainEvent::CommandFailed { command: envelope.command, status: resp.status })];
		}

		let parameters = match self.networks.primary() {
			Some(slot) => slot.into(),
			None => payload::NetworkParameters {
				extended_pan_id: [0; 8],
				pan_id: self.default_pan_id(),
				radio_tx_power: 0,
				radio_channel: DEFAULT_RADIO_CHANNEL,
				join_method: 0,
				nwk_manager_id: 0,
				nwk_update_id: 0,
				channels: DEFAULT_SCAN_CHANNEL_MASK,
			},
		};

		vec![self.send(CommandId::FormNetwork, parameters.encode())]
	}

	/// A PAN id to form a network on when none has ever been persisted, derived from this
	/// host's own EUI64 rather than a fabricated constant (`ezsp_db_json.h` has no default
	/// `panId`, only a default `radioChannel`).
	fn default_pan_id(&self) -> u16 {
		let eui64 = self.self_info.eui64.unwrap_or_default();
		u16::from_be_bytes([eui64[6], eui64[7]])
	}

	fn on_security_state(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("getCurrentSecurityState response", payload::GetSecurityStateResponse::decode(&envelope.params)) else {
			return vec![];
		};

		if resp.status != Enum::Known(EmberStatus::Success) {
			return vec![Action::Emit(DomainEvent::CommandFailed { command: envelope.command, status: resp.status })];
		}

		self.keys.set_state(resp.state);
		vec![]
	}

	fn on_get_key(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("getKey response", payload::KeyResponse::decode(&envelope.params)) else {
			return vec![];
		};

		if resp.status != Enum::Known(EmberStatus::Success) {
			return vec![Action::Emit(DomainEvent::CommandFailed { command: envelope.command, status: resp.status })];
		}

		if let Some(key_type) = self.pending_key_request.take() {
			self.keys.set_key(key_type, resp.key);
		}
		vec![]
	}

	fn on_scan_complete(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(resp) = self.decode_err("scanCompleteHandler", payload::ScanComplete::decode(&envelope.params)) else {
			return vec![];
		};

		let mut actions = vec![Action::Emit(DomainEvent::ScanComplete(resp.status))];

		if !self.coordinator && self.state == State::InitNetwork {
			if let Some(candidate) = self.scan_candidate.take() {
				let join = payload::JoinNetwork {
					node_type: NODE_TYPE_ROUTER,
					parameters: payload::NetworkParameters {
						extended_pan_id: [0; 8],
						pan_id: candidate.pan_id,
						radio_tx_power: 0,
						radio_channel: candidate.channel,
						join_method: 0,
						nwk_manager_id: 0,
						nwk_update_id: 0,
						channels: 1 << candidate.channel,
					},
				};
				actions.push(self.send(CommandId::JoinNetwork, join.encode()));
			}
		}

		actions
	}

	/// Remembers the first joinable beacon seen during the active scan, consumed by
	/// `on_scan_complete` to issue `joinNetwork` (spec.md §4.4, "(else) → scan+join").
	fn on_network_found(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(found) = self.decode_err("networkFoundHandler", payload::NetworkFound::decode(&envelope.params)) else {
			return vec![];
		};

		if self.scan_candidate.is_none() && found.allow_join {
			self.scan_candidate = Some(found.clone());
		}

		vec![Action::Emit(DomainEvent::NetworkFound(found))]
	}

	fn on_energy_scan_result(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(result) = self.decode_err("energyScanResultHandler", payload::EnergyScanResult::decode(&envelope.params)) else {
			return vec![];
		};
		vec![Action::Emit(DomainEvent::EnergyScanResult(result))]
	}

	fn on_message_sent(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(sent) = self.decode_err("messageSentHandler", payload::MessageSent::decode(&envelope.params)) else {
			return vec![];
		};
		vec![Action::Emit(DomainEvent::MessageSent(sent))]
	}

	fn on_incoming_message(&mut self, envelope: &Envelope) -> Vec<Action> {
		let Some(msg) = self.decode_err("incomingMessageHandler", payload::IncomingMessage::decode(&envelope.params)) else {
			return vec![];
		};
		vec![Action::Emit(DomainEvent::IncomingMessage(msg))]
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn start_moves_to_uart_connected() {
		let mut sm = Supervisor::new(true);
		sm.handle_event(Event::Start);
		assert_eq!(sm.state(), State::UartConnected);
	}

	#[test]
	fn link_up_requests_version_and_advances_state() {
		let mut sm = Supervisor::new(true);
		sm.handle_event(Event::Start);
		let actions = sm.handle_event(Event::LinkUp(ResetReason::Unknown));

		assert_eq!(sm.state(), State::GettingDeviceInfo);
		assert!(matches!(
			actions.as_slice(),
			[Action::Emit(DomainEvent::Connected(_)), Action::Send(envelope)] if envelope.command == CommandId::Version
		));
	}

	#[test]
	fn device_info_sequence_drives_coordinator_into_init_network() {
		let mut sm = Supervisor::new(true);
		sm.handle_event(Event::Start);
		sm.handle_event(Event::LinkUp(ResetReason::Unknown));

		let version_resp = payload::VersionResponse { protocol_version: 8, stack_type: 2, stack_version: 1 }.encode();
		let actions = sm.handle_event(Event::Frame(Envelope {
			seq: 0,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::Version,
			params: version_resp,
		}));
		assert!(matches!(actions.as_slice(), [Action::Send(e)] if e.command == CommandId::GetEui64));

		let eui64_resp = payload::Eui64Response { eui64: [1; 8] }.encode();
		sm.handle_event(Event::Frame(Envelope {
			seq: 1,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::GetEui64,
			params: eui64_resp,
		}));

		let node_id_resp = payload::NodeIdResponse { node_id: 0 }.encode();
		let actions = sm.handle_event(Event::Frame(Envelope {
			seq: 2,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::GetNodeId,
			params: node_id_resp,
		}));

		assert_eq!(sm.state(), State::InitNetwork);
		assert!(matches!(actions.as_slice(), [Action::Send(e)] if e.command == CommandId::SetInitialSecurityState));
	}

	#[test]
	fn network_up_status_reaches_up_and_ready() {
		let mut sm = Supervisor::new(true);
		let status = payload::StackStatus { status: Enum::Known(EmberStatus::NetworkUp) }.encode();
		let actions = sm.handle_event(Event::Frame(Envelope {
			seq: 0,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::StackStatusHandler,
			params: status,
		}));

		assert_eq!(sm.state(), State::UpAndReady);
		assert!(matches!(actions.as_slice(), [Action::Emit(DomainEvent::NetworkUp)]));
	}

	#[test]
	fn child_join_then_trust_center_join_invalidates_stale_short_id() {
		let mut sm = Supervisor::new(true);
		let old_owner = [1; 8];
		let new_owner = [2; 8];

		let join = payload::ChildJoin { index: 0, joining: true, child_id: 0x1234, child_eui64: old_owner, child_type: 2 }.encode();
		sm.handle_event(Event::Frame(Envelope {
			seq: 0,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::ChildJoinHandler,
			params: join,
		}));

		let trust = payload::TrustCenterJoin {
			new_node_id: 0x1234,
			new_node_eui64: new_owner,
			status: 0,
			policy_decision: 0,
			parent_of_new_node_id: 0,
		}
		.encode();
		sm.handle_event(Event::Frame(Envelope {
			seq: 1,
			control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::TrustCenterJoinHandler,
			params: trust,
		}));

		assert_eq!(sm.children.get(&old_owner).unwrap().short_id, crate::child::NO_CHILD_ID);
	}

	fn envelope(seq: u8, command: CommandId, params: Vec<u8>) -> Envelope {
		Envelope { seq, control_low: ezsp::control::ControlLow::command(ezsp::control::SleepMode::Idle, 0), control_high: None, command, params }
	}

	fn drive_to_init_network(sm: &mut Supervisor) {
		sm.handle_event(Event::Start);
		sm.handle_event(Event::LinkUp(ResetReason::Unknown));
		sm.handle_event(Event::Frame(envelope(0, CommandId::Version, payload::VersionResponse { protocol_version: 8, stack_type: 2, stack_version: 1 }.encode())));
		sm.handle_event(Event::Frame(envelope(1, CommandId::GetEui64, payload::Eui64Response { eui64: [1; 8] }.encode())));
		sm.handle_event(Event::Frame(envelope(2, CommandId::GetNodeId, payload::NodeIdResponse { node_id: 0 }.encode())));
	}

	#[test]
	fn coordinator_forms_network_after_security_state_accepted() {
		let mut sm = Supervisor::new(true);
		drive_to_init_network(&mut sm);

		let actions = sm.handle_event(Event::Frame(envelope(
			3,
			CommandId::SetInitialSecurityState,
			payload::StatusResponse { status: Enum::Known(EmberStatus::Success) }.encode(),
		)));

		assert!(matches!(actions.as_slice(), [Action::Send(e)] if e.command == CommandId::FormNetwork));
	}

	#[test]
	fn non_coordinator_joins_best_beacon_after_scan_completes() {
		let mut sm = Supervisor::new(false);
		drive_to_init_network(&mut sm);

		let found = payload::NetworkFound { pan_id: 0xABCD, channel: 11, allow_join: true, stack_profile: 2 };
		sm.handle_event(Event::Frame(envelope(3, CommandId::NetworkFoundHandler, found.encode())));

		let actions = sm.handle_event(Event::Frame(envelope(
			4,
			CommandId::ScanCompleteHandler,
			payload::ScanComplete { channel: 11, status: Enum::Known(EmberStatus::Success) }.encode(),
		)));

		assert!(actions.iter().any(|a| matches!(a, Action::Send(e) if e.command == CommandId::JoinNetwork)));
	}

	#[test]
	fn get_current_security_state_populates_keys() {
		let mut sm = Supervisor::new(true);
		let state = payload::SecurityState { bitmask: 0, preconfigured_key: [0; 16], network_key: [7; 16], network_key_sequence_number: 0, trust_center_long_address: [0; 8] };
		sm.handle_event(Event::Frame(envelope(
			0,
			CommandId::GetCurrentSecurityState,
			payload::GetSecurityStateResponse { status: Enum::Known(EmberStatus::Success), state }.encode(),
		)));

		assert_eq!(sm.keys.network_key, Some([7; 16]));
	}

	#[test]
	fn get_key_response_is_filed_under_the_requested_key_type() {
		let mut sm = Supervisor::new(true);
		sm.handle_event(Event::Send(CommandId::GetKey, vec![KeyType::TrustCenterLink.wire_value()]));
		sm.handle_event(Event::Frame(envelope(
			1,
			CommandId::GetKey,
			payload::KeyResponse { status: Enum::Known(EmberStatus::Success), key: [3; 16] }.encode(),
		)));

		assert_eq!(sm.keys.trust_center_link_key, Some([3; 16]));
	}
}

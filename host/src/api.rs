//! Upper-layer payload helpers (C6). Construction and parsing of `payload_bytes` (ZDP, ZCL,
//! APS commands) live above this crate; it only ever hands back byte buffers, per spec.md
//! §4.4's C6 interface.

use crate::events::Event;
use crate::security::KeyType;

/// Build the `Event` that, once handled by the supervisor, sends a unicast application
/// message. `aps_frame` is the already-encoded APS header; `payload` is the application
/// payload (ZDP/ZCL/etc.), both opaque to this crate.
pub fn send_unicast(destination: u16, aps_frame: Vec<u8>, payload: Vec<u8>, message_tag: u8) -> Event {
	let params = ezsp::payload::SendUnicast { node_id: destination, aps_frame, message_tag, payload }.encode();
	Event::Send(ezsp::CommandId::SendUnicast, params)
}

/// Build the `Event` for the `getKey Net|Trust|NextNet|AppLink` CLI surface (spec.md §6). The
/// supervisor remembers which `key_type` this asked for so it can file the eventual response
/// under the right slot in `Supervisor::keys`.
pub fn get_key(key_type: KeyType) -> Event {
	Event::Send(ezsp::CommandId::GetKey, vec![key_type.wire_value()])
}

/// Build the `Event` for the `getCurrentSecurityState` CLI surface (spec.md §6).
pub fn get_current_security_state() -> Event {
	Event::Send(ezsp::CommandId::GetCurrentSecurityState, vec![])
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn send_unicast_builds_the_right_command() {
		let event = send_unicast(0x1234, vec![1, 2, 3], vec![0xAA, 0xBB], 7);
		match event {
			Event::Send(command, params) => {
				assert_eq!(command, ezsp::CommandId::SendUnicast);
				let decoded = ezsp::payload::SendUnicast::decode(&params).unwrap();
				assert_eq!(decoded.node_id, 0x1234);
				assert_eq!(decoded.payload, vec![0xAA, 0xBB]);
			}
			_ => panic!("expected Event::Send"),
		}
	}

	#[test]
	fn get_key_carries_the_wire_value() {
		let event = get_key(KeyType::TrustCenterLink);
		match event {
			Event::Send(command, params) => {
				assert_eq!(command, ezsp::CommandId::GetKey);
				assert_eq!(params, vec![KeyType::TrustCenterLink.wire_value()]);
			}
			_ => panic!("expected Event::Send"),
		}
	}
}

//! Envelope encode/decode, parameterized by the EZSP protocol version negotiated at connect
//! time. Versions 4..7 carry a single-byte command id (5..7 additionally carry the legacy
//! `0xFF` pad and a second control byte); version 8+ carries a two-byte command id and drops
//! the pad.

use crate::command::CommandId;
use crate::control::{ControlHigh, ControlLow};
use crate::error::CodecError;
use crate::params::Reader;

const LEGACY_PAD: u8 = 0xFF;

/// A decoded or to-be-encoded EZSP envelope: sequence number, control bytes, command id, and
/// the still-raw parameter bytes.
#[derive(Debug, Clone)]
pub struct Envelope {
	pub seq: u8,
	pub control_low: ControlLow,
	pub control_high: Option<ControlHigh>,
	pub command: CommandId,
	pub params: Vec<u8>,
}

fn has_legacy_pad(version: u8) -> bool {
	(5..8).contains(&version)
}

fn has_wide_command_id(version: u8) -> bool {
	version >= 8
}

impl Envelope {
	/// Encode this envelope for the wire, at `version`.
	pub fn encode(&self, version: u8) -> Vec<u8> {
		let mut out = Vec::with_capacity(8 + self.params.len());

		out.push(self.seq);
		out.push(self.control_low.encode());

		if has_legacy_pad(version) {
			out.push(LEGACY_PAD);
			out.push(self.control_high.unwrap_or_default().encode());
		}

		if has_wide_command_id(version) {
			out.extend_from_slice(&self.command.id().to_le_bytes());
		} else {
			out.push(self.command.id() as u8);
		}

		out.extend_from_slice(&self.params);
		out
	}

	/// Decode an envelope at `version` from `bytes` (the de-randomized DATA payload).
	pub fn decode(version: u8, bytes: &[u8]) -> Result<Self, CodecError> {
		let mut reader = Reader::new(bytes);

		let seq = reader.u8()?;
		let control_low = ControlLow::decode(reader.u8()?);

		let control_high = if has_legacy_pad(version) {
			if reader.remaining().first() == Some(&LEGACY_PAD) {
				reader.u8()?;
				Some(ControlHigh::decode(reader.u8()?))
			} else {
				None
			}
		} else {
			None
		};

		let command = if has_wide_command_id(version) {
			let id = reader.u16()?;
			CommandId::from_u16(id).ok_or(CodecError::UnknownCommand(id))?
		} else {
			let id = reader.u8()?;
			CommandId::from_u8(id).ok_or(CodecError::UnknownCommand(id as u16))?
		};

		let params = reader.remaining().to_vec();

		Ok(Self { seq, control_low, control_high, command, params })
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::control::SleepMode;

	#[test]
	fn round_trips_at_version_4() {
		let envelope = Envelope {
			seq: 7,
			control_low: ControlLow::command(SleepMode::Idle, 0),
			control_high: None,
			command: CommandId::Version,
			params: vec![0x04],
		};

		let encoded = envelope.encode(4);
		assert_eq!(encoded, vec![7, 0x00, 0x00, 0x04]);

		let decoded = Envelope::decode(4, &encoded).unwrap();
		assert_eq!(decoded.command, CommandId::Version);
		assert_eq!(decoded.params, vec![0x04]);
	}

	#[test]
	fn round_trips_at_version_6_with_legacy_pad() {
		let envelope = Envelope {
			seq: 1,
			control_low: ControlLow::command(SleepMode::Idle, 0),
			control_high: Some(ControlHigh::default()),
			command: CommandId::Echo,
			params: vec![1, 0xAB],
		};

		let encoded = envelope.encode(6);
		assert_eq!(encoded[0], 1);
		assert_eq!(encoded[2], LEGACY_PAD);

		let decoded = Envelope::decode(6, &encoded).unwrap();
		assert_eq!(decoded.command, CommandId::Echo);
		assert_eq!(decoded.params, vec![1, 0xAB]);
	}

	#[test]
	fn round_trips_at_version_8_with_wide_id() {
		let envelope =
			Envelope { seq: 2, control_low: ControlLow::command(SleepMode::Idle, 0), control_high: None, command: CommandId::GetValue, params: vec![] };

		let encoded = envelope.encode(8);
		assert_eq!(encoded, vec![2, 0x00, CommandId::GetValue.id() as u8, 0x00]);

		let decoded = Envelope::decode(8, &encoded).unwrap();
		assert_eq!(decoded.command, CommandId::GetValue);
	}

	#[test]
	fn unknown_command_id_is_reported() {
		let bytes = [0u8, 0x00, 0xFE];
		assert_eq!(Envelope::decode(4, &bytes), Err(CodecError::UnknownCommand(0xFE)));
	}
}

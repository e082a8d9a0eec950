//! Frame encoding and the per-byte receive pipeline (spec step sequence: accumulate, cancel,
//! close-on-flag, destuff, validate length, verify CRC, de-randomize, deliver).

use crate::crc::checksum;
use crate::error::RxError;
use crate::frame::{self, Kind, CANCEL, FLAG, SUB};
use crate::rand;
use crate::stuff::{destuff, stuff};

/// A frame decoded off the wire, past CRC verification and de-randomization.
#[derive(Debug, Clone)]
pub struct DecodedFrame {
	pub kind: Kind,
	pub control: u8,
	pub data: Vec<u8>,
}

/// A frame that failed validation. `kind` is best-effort, read off the (possibly corrupted)
/// control byte, so the caller can decide whether a NAK is owed per the DATA-frame rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedFrame {
	pub error: RxError,
	pub kind: Option<Kind>,
}

/// Encode a frame for transmission: `control` plus payload `data` (already randomized by the
/// caller for DATA frames), CRC, byte stuffing, and the trailing `FLAG`.
pub fn encode(control: u8, data: &[u8]) -> Vec<u8> {
	let mut body = Vec::with_capacity(1 + data.len() + 2);
	body.push(control);
	body.extend_from_slice(data);

	let crc = checksum(&body);
	body.push((crc >> 8) as u8);
	body.push((crc & 0xFF) as u8);

	let mut out = Vec::with_capacity(body.len() * 2 + 1);
	stuff(&body, &mut out);
	out.push(FLAG);
	out
}

/// Encode an ACK frame acknowledging DATA frames up to (not including) `ack_num`.
pub fn encode_ack(ack_num: u8, nrdy: bool) -> Vec<u8> {
	encode(frame::ack_control(ack_num, nrdy), &[])
}

/// Encode a NAK frame, requesting retransmission starting at `ack_num`.
pub fn encode_nak(ack_num: u8, nrdy: bool) -> Vec<u8> {
	encode(frame::nak_control(ack_num, nrdy), &[])
}

fn expected_len(kind: Kind) -> Option<core::ops::RangeInclusive<usize>> {
	match kind {
		Kind::Rst | Kind::Ack | Kind::Nak => Some(4..=4),
		Kind::RstAck | Kind::Error => Some(6..=6),
		Kind::Data => Some(7..=133),
		Kind::Unknown => None,
	}
}

fn finish(raw: &[u8]) -> Result<DecodedFrame, DroppedFrame> {
	let dropped = |error, kind| Err(DroppedFrame { error, kind });

	let Some(destuffed) = destuff(raw) else {
		return dropped(RxError::TooShort, None);
	};

	if destuffed.len() < 4 {
		return dropped(RxError::TooShort, None);
	}

	if destuffed.len() > 133 {
		return dropped(RxError::TooLong, None);
	}

	let control = destuffed[0];
	let kind = frame::kind(control);

	let Some(range) = expected_len(kind) else {
		return dropped(RxError::UnknownControl, None);
	};

	if !range.contains(&destuffed.len()) {
		let error = if destuffed.len() < *range.start() { RxError::TooShort } else { RxError::TooLong };
		return dropped(error, Some(kind));
	}

	let body = &destuffed[..destuffed.len() - 2];
	let received_crc = u16::from_be_bytes([destuffed[destuffed.len() - 2], destuffed[destuffed.len() - 1]]);

	if checksum(body) != received_crc {
		return dropped(RxError::CrcMismatch, Some(kind));
	}

	let mut data = body[1..].to_vec();

	if kind == Kind::Data {
		rand::apply(&mut data);
	}

	Ok(DecodedFrame { kind, control, data })
}

/// Accumulates raw bytes from the serial transport and yields decoded frames at each `FLAG`.
#[derive(Default)]
pub struct Receiver {
	buf: Vec<u8>,
}

impl Receiver {
	pub fn new() -> Self {
		Self::default()
	}

	/// Feed one byte from the wire. Returns `Some` once a frame boundary (`FLAG`) is reached;
	/// `Ok` for a validated frame, `Err` for one that failed validation and was dropped.
	pub fn feed(&mut self, byte: u8) -> Option<Result<DecodedFrame, DroppedFrame>> {
		match byte {
			CANCEL | SUB => {
				self.buf.clear();
				None
			}
			FLAG => {
				let raw = core::mem::take(&mut self.buf);

				if raw.is_empty() {
					// A bare FLAG (or one immediately following another) carries no frame.
					return None;
				}

				Some(finish(&raw))
			}
			_ => {
				self.buf.push(byte);
				None
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn feed_all(rx: &mut Receiver, bytes: &[u8]) -> Option<Result<DecodedFrame, DroppedFrame>> {
		let mut last = None;

		for &b in bytes {
			if let Some(r) = rx.feed(b) {
				last = Some(r);
			}
		}

		last
	}

	#[test]
	fn decodes_rst_frame() {
		let encoded = encode(frame::rst_control(), &[]);
		assert_eq!(encoded, vec![0xC0, 0x38, 0xBC, 0x7E]);

		let mut rx = Receiver::new();
		let decoded = feed_all(&mut rx, &encoded).unwrap().unwrap();
		assert_eq!(decoded.kind, Kind::Rst);
		assert!(decoded.data.is_empty());
	}

	#[test]
	fn decodes_rstack_frame() {
		// NCP's worked-example reply: version 2, reset reason 2.
		let bytes = [0xC1, 0x02, 0x02, 0x9B, 0x7B, 0x7E];

		let mut rx = Receiver::new();
		let decoded = feed_all(&mut rx, &bytes).unwrap().unwrap();
		assert_eq!(decoded.kind, Kind::RstAck);
		assert_eq!(decoded.data, vec![0x02, 0x02]);
	}

	#[test]
	fn crc_mismatch_is_dropped() {
		let bytes = [0xC1, 0x02, 0x02, 0x00, 0x00, 0x7E];

		let mut rx = Receiver::new();
		let result = feed_all(&mut rx, &bytes).unwrap();
		assert_eq!(result.unwrap_err().error, RxError::CrcMismatch);
	}

	#[test]
	fn cancel_discards_in_progress_frame() {
		let mut rx = Receiver::new();
		assert!(rx.feed(0xC1).is_none());
		assert!(rx.feed(0x02).is_none());
		assert!(rx.feed(CANCEL).is_none());
		assert!(rx.buf.is_empty());
	}

	#[test]
	fn data_frame_round_trips_and_is_derandomized() {
		let payload = b"hello ezsp";
		let mut randomized = payload.to_vec();
		rand::apply(&mut randomized);

		let control = frame::data_control(3, 1, false);
		let encoded = encode(control, &randomized);

		let mut rx = Receiver::new();
		let decoded = feed_all(&mut rx, &encoded).unwrap().unwrap();

		assert_eq!(decoded.kind, Kind::Data);
		assert_eq!(decoded.data, payload);
		assert_eq!(frame::seq_of(decoded.control), 3);
	}
}

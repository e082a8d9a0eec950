//! ASH control-byte layout and frame classification, ported from the `ftype`/`UFrame`
//! bit layout in the original link layer.

/// Marks the end of a frame.
pub const FLAG: u8 = 0x7E;
/// Escapes the following byte; it is XORed with `0x20` once read back.
pub const ESC: u8 = 0x7D;
/// Resume transmission. Always ignored by the NCP; reserved on the wire.
pub const XON: u8 = 0x11;
/// Stop transmission. Always ignored by the NCP; reserved on the wire.
pub const XOFF: u8 = 0x13;
/// Marks a byte that arrived with a low-level UART error; discards the frame in progress.
pub const SUB: u8 = 0x18;
/// Terminates a frame in progress, discarding everything since the last `FLAG`.
pub const CANCEL: u8 = 0x1A;

/// Sliding window size; this core only ever has one frame outstanding.
pub const WINDOW: u8 = 1;

const CTRL_ACK: u8 = 0x80;
const CTRL_NAK: u8 = 0xA0;
const CTRL_RST: u8 = 0xC0;
const CTRL_RSTACK: u8 = 0xC1;
const CTRL_ERROR: u8 = 0xC2;
const CTRL_TYPE_MASK: u8 = 0xE0;
const CTRL_DATA_BIT: u8 = 0x80;

/// The six frame kinds the link layer exchanges with the NCP.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
	/// Carries an EZSP frame.
	Data,
	/// Acknowledges receipt of DATA frames up to `ack_num - 1`.
	Ack,
	/// Negative-acknowledges a DATA frame; retransmit starting at `ack_num`.
	Nak,
	/// Requests the NCP perform a software reset. Host-only.
	Rst,
	/// The NCP has reset and reports why.
	RstAck,
	/// The NCP is in the FAILED state and reports why.
	Error,
	/// A control byte outside the six known kinds.
	Unknown,
}

/// Classify a control byte into its frame kind.
pub fn kind(control: u8) -> Kind {
	if control & CTRL_DATA_BIT == 0 {
		return Kind::Data;
	}

	match control {
		CTRL_RST => Kind::Rst,
		CTRL_RSTACK => Kind::RstAck,
		CTRL_ERROR => Kind::Error,
		_ => match control & CTRL_TYPE_MASK {
			CTRL_ACK => Kind::Ack,
			CTRL_NAK => Kind::Nak,
			_ => Kind::Unknown,
		},
	}
}

/// Build a DATA frame's control byte.
pub fn data_control(seq: u8, ack_num: u8, retransmit: bool) -> u8 {
	((seq & 0x07) << 4) | ((retransmit as u8) << 3) | (ack_num & 0x07)
}

/// Build an ACK frame's control byte.
pub fn ack_control(ack_num: u8, nrdy: bool) -> u8 {
	CTRL_ACK | ((nrdy as u8) << 3) | (ack_num & 0x07)
}

/// Build a NAK frame's control byte.
pub fn nak_control(ack_num: u8, nrdy: bool) -> u8 {
	CTRL_NAK | ((nrdy as u8) << 3) | (ack_num & 0x07)
}

/// The RST frame's fixed control byte.
pub const fn rst_control() -> u8 {
	CTRL_RST
}

/// DATA/ACK/NAK frame sequence fields live in the low nibble of the control byte.
pub fn seq_of(control: u8) -> u8 {
	(control >> 4) & 0x07
}

/// `ack_num` acknowledges DATA frames up to, but not including, this value.
pub fn ack_num_of(control: u8) -> u8 {
	control & 0x07
}

/// Set on a retransmitted DATA frame.
pub fn retransmit_bit(control: u8) -> bool {
	control & 0x08 != 0
}

/// Set by either side to inhibit the NCP from sending further callback frames.
pub fn nrdy_bit(control: u8) -> bool {
	control & 0x08 != 0
}

/// A reset or fatal-error reason byte, carried by RSTACK and ERROR frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
	Unknown,
	External,
	PowerOn,
	Watchdog,
	Assert,
	BootLoader,
	Software,
	ExceededAckTimeout,
	ChipSpecific(u8),
}

impl ResetReason {
	/// Decode a reset/error reason byte.
	pub fn decode(byte: u8) -> Self {
		match byte {
			0x00 => Self::Unknown,
			0x01 => Self::External,
			0x02 => Self::PowerOn,
			0x03 => Self::Watchdog,
			0x06 => Self::Assert,
			0x09 => Self::BootLoader,
			0x0B => Self::Software,
			0x51 => Self::ExceededAckTimeout,
			other => Self::ChipSpecific(other),
		}
	}
}

/// Whether `byte` must be escaped when it appears inside a frame body.
pub fn needs_escape(byte: u8) -> bool {
	matches!(byte, FLAG | ESC | XON | XOFF | SUB | CANCEL)
}

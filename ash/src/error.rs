/// Per-frame decode failures from the receive pipeline. All are recovered: the current
/// frame is dropped and the link continues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RxError {
	/// Fewer than 4 bytes after destuffing, or a dangling escape.
	TooShort,
	/// More than 133 bytes after destuffing.
	TooLong,
	/// CRC over the control byte and data field did not match.
	CrcMismatch,
	/// Control byte did not match any of the six known frame kinds.
	UnknownControl,
}

/// Link-level failures, surfaced to the host state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
	/// The serial transport could not be opened.
	Unavailable,
	/// The serial transport closed under us (`EBADF`, device unplugged).
	Closed,
	/// The reset handshake did not receive an RSTACK within the retry budget.
	ResetTimeout,
	/// Retransmission exceeded the configured attempt budget.
	AckTimeout,
	/// The NCP reported a fatal error via an ERROR frame.
	PeerError(super::frame::ResetReason),
	/// The outbound queue is full.
	Busy,
}

/// Codec-level decode failures, scoped to a single frame; none of them kill the link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecError {
	/// Consuming a fixed-width field ran past the end of the buffer.
	ShortBuffer,
	/// A length-prefixed field's declared length exceeds what remains in the buffer, or the
	/// field's declared maximum.
	LengthOverflow,
	/// The command id isn't in the known table; carries the raw wire id so the caller can
	/// still surface it (spec.md §7: delivered as `Unrecognized{id, bytes}`).
	UnknownCommand(u16),
}

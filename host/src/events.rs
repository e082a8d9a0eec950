//! The supervisor's event vocabulary. Ported from `ezsp_sm.h`'s `Ezsp_SM_Event`, widened to
//! also carry the reassembled EZSP frames and link-layer transitions the C++ version threads
//! through separate callback members.

use ash::LinkError;
use ezsp::Envelope;

/// Something the supervisor's event queue can carry: an application request, a reassembled
/// frame from the link, or an internal transition.
#[derive(Debug)]
pub enum Event {
	/// Start the driver (`Initial` -> `UartConnected`).
	Start,
	/// The link task completed the reset handshake.
	LinkUp(ash::frame::ResetReason),
	/// The link closed (link-layer reset, transport failure already logged by the link task).
	LinkDown,
	/// The link failed fatally (ack timeout, peer error frame).
	LinkFailed(LinkError),
	/// A decoded EZSP envelope arrived from the NCP.
	Frame(Envelope),
	/// The application wants to send a command; `Supervisor::handle_event` assigns `seq`.
	Send(ezsp::CommandId, Vec<u8>),
}

/// Events the supervisor surfaces to the application, consumed from its own bounded queue.
#[derive(Debug, Clone)]
pub enum DomainEvent {
	Connected(ash::frame::ResetReason),
	Disconnected,
	NetworkUp,
	NetworkDown,
	ChildJoined { eui64: [u8; 8] },
	ChildUpdated { eui64: [u8; 8] },
	IncomingMessage(ezsp::payload::IncomingMessage),
	MessageSent(ezsp::payload::MessageSent),
	NetworkFound(ezsp::payload::NetworkFound),
	ScanComplete(ezsp::payload::Status),
	EnergyScanResult(ezsp::payload::EnergyScanResult),
	/// A command id outside the known catalog; surfaced instead of dropped (spec.md §7).
	Unrecognized { id: u16, bytes: Vec<u8> },
	/// `EmberStatus != SUCCESS` on a response, surfaced with the command that produced it.
	CommandFailed { command: ezsp::CommandId, status: ezsp::payload::Status },
}

/// A side effect the supervisor wants performed: a command to hand to the link task, or a
/// domain event to publish.
#[derive(Debug)]
pub enum Action {
	Send(Envelope),
	Emit(DomainEvent),
}

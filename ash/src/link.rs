//! Link session state: sequence counters, the single-slot unacked window, and the dispatch
//! rules for each frame kind. Grounded on `ZBUart_Info`'s `_frmNum`/`_ackNum` bookkeeping and
//! the DATA/ACK/NAK handling described for the ASH link layer.

use std::time::Instant;

use crate::error::LinkError;
use crate::frame::{self, Kind, ResetReason, WINDOW};

/// Default number of RST retries before giving up on the reset handshake.
pub const RESET_RETRIES: u32 = 3;
/// Default number of consecutive retransmits before declaring the link failed.
pub const MAX_RETRANSMITS: u32 = 5;

/// An outcome of delivering a DATA frame up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
	/// A new, in-order payload; an ACK should be sent.
	Accept(Vec<u8>),
	/// A frame we've already delivered; re-ACK, don't redeliver.
	Duplicate,
	/// Out of sequence; a NAK with the current `rx_expected` should be sent.
	Reject,
}

struct Unacked {
	seq: u8,
	control: u8,
	data: Vec<u8>,
	attempts: u32,
	sent_at: Instant,
}

/// Mutable link-layer session state, owned exclusively by the link task.
pub struct Session {
	tx_seq: u8,
	ack_expected: u8,
	rx_expected: u8,
	connected: bool,
	activated: bool,
	nrdy: bool,
	unacked: Option<Unacked>,
	max_retransmits: u32,
}

impl Default for Session {
	fn default() -> Self {
		Self::new()
	}
}

impl Session {
	pub fn new() -> Self {
		Self::with_max_retransmits(MAX_RETRANSMITS)
	}

	/// Like [`Session::new`], but with a caller-chosen retransmit budget.
	pub fn with_max_retransmits(max_retransmits: u32) -> Self {
		Self { tx_seq: 0, ack_expected: 0, rx_expected: 0, connected: false, activated: false, nrdy: false, unacked: None, max_retransmits }
	}

	pub fn is_connected(&self) -> bool {
		self.connected
	}

	pub fn is_activated(&self) -> bool {
		self.activated
	}

	pub fn set_activated(&mut self, activated: bool) {
		self.activated = activated;
	}

	pub fn is_nrdy(&self) -> bool {
		self.nrdy
	}

	/// Reset all sequence counters and drop any outstanding frame. Called on a successful
	/// reset handshake.
	pub fn on_connected(&mut self) {
		self.tx_seq = 0;
		self.ack_expected = 0;
		self.rx_expected = 0;
		self.unacked = None;
		self.connected = true;
	}

	pub fn on_disconnected(&mut self) {
		self.connected = false;
		self.activated = false;
		self.unacked = None;
	}

	/// Apply the DATA dispatch rule from the sequence number on the wire.
	pub fn on_data(&mut self, seq: u8, payload: Vec<u8>) -> Delivery {
		if seq == self.rx_expected {
			self.rx_expected = (self.rx_expected + 1) % 8;
			Delivery::Accept(payload)
		} else if seq == (self.rx_expected + 7) % 8 {
			Delivery::Duplicate
		} else {
			Delivery::Reject
		}
	}

	/// Release unacked frames covered by an incoming ACK's `ack_num`.
	pub fn on_ack(&mut self, ack_num: u8, nrdy: bool) {
		self.nrdy = nrdy;

		if let Some(unacked) = &self.unacked {
			let covered = (ack_num.wrapping_add(7).wrapping_sub(unacked.seq)) % 8 < WINDOW;

			if covered {
				self.unacked = None;
			}
		}

		self.ack_expected = ack_num;
	}

	/// Mark the outstanding frame (if any) for retransmission on a NAK.
	pub fn on_nak(&mut self, ack_num: u8, nrdy: bool) {
		self.nrdy = nrdy;

		if let Some(unacked) = &mut self.unacked {
			unacked.control = frame::data_control(unacked.seq, ack_num, true);
		}

		self.ack_expected = ack_num;
	}

	/// Whether the single-slot window can accept a new frame right now.
	pub fn can_send(&self) -> bool {
		self.unacked.is_none()
	}

	/// Assign sequence numbers for a new outbound DATA frame and stage it as unacked.
	/// Returns `None` if a frame is already outstanding (the caller must wait for ack/NAK).
	pub fn prepare_send(&mut self, data: Vec<u8>) -> Option<(u8, Vec<u8>)> {
		if self.unacked.is_some() {
			return None;
		}

		let seq = self.tx_seq;
		let control = frame::data_control(seq, self.rx_expected, false);

		self.unacked = Some(Unacked { seq, control, data: data.clone(), attempts: 0, sent_at: Instant::now() });
		self.tx_seq = (self.tx_seq + 1) % 8;

		Some((control, data))
	}

	/// Whether the retransmit timer for the outstanding frame has expired.
	pub fn retransmit_due(&self, timeout: std::time::Duration) -> bool {
		self.unacked.as_ref().is_some_and(|u| u.sent_at.elapsed() >= timeout)
	}

	/// Re-encode the outstanding frame with the retransmit bit set and a refreshed `ack_num`.
	/// Returns `Err(LinkError::AckTimeout)` once the attempt budget is exhausted.
	pub fn prepare_retransmit(&mut self) -> Result<Option<(u8, Vec<u8>)>, LinkError> {
		let Some(unacked) = &mut self.unacked else {
			return Ok(None);
		};

		if unacked.attempts >= self.max_retransmits {
			return Err(LinkError::AckTimeout);
		}

		unacked.attempts += 1;
		unacked.control = frame::data_control(unacked.seq, self.rx_expected, true);
		unacked.sent_at = Instant::now();

		Ok(Some((unacked.control, unacked.data.clone())))
	}

	pub fn rx_expected(&self) -> u8 {
		self.rx_expected
	}

	pub fn ack_expected(&self) -> u8 {
		self.ack_expected
	}
}

/// Classify a decoded frame's kind for callers dispatching on it, pairing the kind with the
/// reset reason for RSTACK/ERROR frames.
pub fn reset_reason(kind: Kind, data: &[u8]) -> Option<ResetReason> {
	matches!(kind, Kind::RstAck | Kind::Error).then(|| data.last().copied().map(ResetReason::decode).unwrap_or(ResetReason::Unknown))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn in_order_data_advances_rx_expected() {
		let mut session = Session::new();
		assert_eq!(session.on_data(0, vec![1]), Delivery::Accept(vec![1]));
		assert_eq!(session.rx_expected(), 1);
	}

	#[test]
	fn duplicate_data_is_recognized() {
		let mut session = Session::new();
		session.on_data(0, vec![1]);
		assert_eq!(session.on_data(0, vec![1]), Delivery::Duplicate);
	}

	#[test]
	fn out_of_order_data_is_rejected() {
		let mut session = Session::new();
		assert_eq!(session.on_data(5, vec![1]), Delivery::Reject);
	}

	#[test]
	fn single_slot_window_blocks_second_send() {
		let mut session = Session::new();
		session.on_connected();
		assert!(session.prepare_send(vec![1]).is_some());
		assert!(session.prepare_send(vec![2]).is_none());
	}

	#[test]
	fn can_send_reflects_the_occupied_slot() {
		let mut session = Session::new();
		session.on_connected();
		assert!(session.can_send());

		session.prepare_send(vec![1]).unwrap();
		assert!(!session.can_send());

		session.on_ack(1, false);
		assert!(session.can_send());
	}

	#[test]
	fn ack_releases_unacked_slot() {
		let mut session = Session::new();
		session.on_connected();
		session.prepare_send(vec![1]).unwrap();
		session.on_ack(1, false);
		assert!(session.prepare_send(vec![2]).is_some());
	}

	#[test]
	fn retransmit_budget_is_exhausted_eventually() {
		let mut session = Session::new();
		session.on_connected();
		session.prepare_send(vec![1]).unwrap();

		for _ in 0..MAX_RETRANSMITS {
			assert!(session.prepare_retransmit().unwrap().is_some());
		}

		assert_eq!(session.prepare_retransmit(), Err(LinkError::AckTimeout));
	}
}

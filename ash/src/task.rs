//! The link task: owns the serial handle, is the only reader and writer of the port, and
//! drives the reset handshake, DATA dispatch, and retransmission. Modeled directly on
//! `ZBUart::worker`'s loop (wait for activation, connect, then service the outbound queue and
//! inbound bytes).

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use runtime::serial::{ReadError, Serial};
use runtime::worker::Worker;

use crate::codec::Receiver;
use crate::error::LinkError;
use crate::frame::{self, Kind, ResetReason};
use crate::link::{Delivery, Session, MAX_RETRANSMITS, RESET_RETRIES};

/// Events the link task delivers to the supervisor: reassembled payloads, link-state
/// transitions, and fatal link failures.
#[derive(Debug, Clone)]
pub enum LinkEvent {
	/// The reset handshake completed; the NCP reported this reason for its last reset.
	Connected(ResetReason),
	/// The transport closed or the NCP reported a fatal error; a reconnect will be attempted.
	Disconnected,
	/// The link gave up (retransmit budget exhausted, or the reset handshake never completed).
	Failed(LinkError),
	/// A reassembled EZSP frame, ready for C3 to decode.
	Payload(Vec<u8>),
}

/// Configuration for a single link task run.
pub struct Config {
	pub path: String,
	pub baud: u32,
	pub read_timeout: Duration,
	pub retransmit_timeout: Duration,
	/// RST retries before giving up on the reset handshake. Defaults to [`RESET_RETRIES`].
	pub reset_retries: u32,
	/// Consecutive retransmits before declaring the link failed. Defaults to [`MAX_RETRANSMITS`].
	pub max_retransmits: u32,
}

impl Default for Config {
	fn default() -> Self {
		Self {
			path: String::new(),
			baud: 57600,
			read_timeout: Duration::from_millis(100),
			retransmit_timeout: Duration::from_millis(800),
			reset_retries: RESET_RETRIES,
			max_retransmits: MAX_RETRANSMITS,
		}
	}
}

/// Run the link task until `outbound` is stopped. Intended to be the body of a dedicated
/// OS thread; blocks on serial reads bounded by `read_timeout`.
pub fn run(config: Config, outbound: Worker<Vec<u8>>, events: Worker<LinkEvent>) {
	info!("link task started");

	while !outbound.is_stopped() {
		let mut serial = match Serial::open(&config.path, config.baud) {
			Ok(serial) => serial,
			Err(()) => {
				let _ = events.push(LinkEvent::Failed(LinkError::Unavailable));
				return;
			}
		};

		let mut session = Session::with_max_retransmits(config.max_retransmits);

		let Some(reason) = reset_handshake(&mut serial, &mut session, &outbound, config.reset_retries) else {
			let _ = events.push(LinkEvent::Failed(LinkError::ResetTimeout));
			serial.close();
			return;
		};

		let _ = events.push(LinkEvent::Connected(reason));
		session.set_activated(true);

		service(&mut serial, &mut session, &config, &outbound, &events);

		serial.close();

		if outbound.is_stopped() {
			break;
		}

		let _ = events.push(LinkEvent::Disconnected);
	}

	info!("link task finished");
}

/// Send RST and wait for RSTACK, retrying up to `retries` times. Returns the reset reason the
/// NCP reported on success.
fn reset_handshake(serial: &mut Serial, session: &mut Session, outbound: &Worker<Vec<u8>>, retries: u32) -> Option<ResetReason> {
	let mut receiver = Receiver::new();

	for attempt in 0..retries {
		if outbound.is_stopped() {
			return None;
		}

		debug!("sending RST (attempt {attempt})");

		if serial.write(&crate::codec::encode(frame::rst_control(), &[])).is_err() {
			return None;
		}

		let deadline = Instant::now() + Duration::from_millis(1600);

		while Instant::now() < deadline {
			match serial.read_one(deadline) {
				Ok(byte) => {
					if let Some(Ok(decoded)) = receiver.feed(byte) {
						if decoded.kind == Kind::RstAck {
							session.on_connected();
							return Some(ResetReason::decode(*decoded.data.last().unwrap_or(&0)));
						}
					}
				}
				Err(ReadError::Timeout) => break,
				Err(ReadError::Closed) => return None,
			}
		}
	}

	None
}

/// Service the outbound queue and inbound byte stream until the link fails or is stopped.
fn service(serial: &mut Serial, session: &mut Session, config: &Config, outbound: &Worker<Vec<u8>>, events: &Worker<LinkEvent>) {
	let mut receiver = Receiver::new();

	loop {
		if outbound.is_stopped() {
			return;
		}

		if session.is_activated() && !session.is_nrdy() && session.can_send() {
			if let Ok(Some(payload)) = outbound.pop_timeout(Duration::ZERO) {
				if let Some((control, data)) = session.prepare_send(payload) {
					if serial.write(&crate::codec::encode(control, &data)).is_err() {
						return;
					}
				}
			}
		}

		if session.retransmit_due(config.retransmit_timeout) {
			match session.prepare_retransmit() {
				Ok(Some((control, data))) => {
					warn!("retransmitting DATA frame");

					if serial.write(&crate::codec::encode(control, &data)).is_err() {
						return;
					}
				}
				Ok(None) => {}
				Err(err) => {
					let _ = events.push(LinkEvent::Failed(err));
					return;
				}
			}
		}

		let deadline = Instant::now() + config.read_timeout;

		let byte = match serial.read_one(deadline) {
			Ok(byte) => byte,
			Err(ReadError::Timeout) => continue,
			Err(ReadError::Closed) => return,
		};

		let Some(result) = receiver.feed(byte) else { continue };

		match result {
			Ok(decoded) => handle_frame(serial, session, events, decoded),
			Err(dropped) => {
				if dropped.kind == Some(Kind::Data) {
					let nak = crate::codec::encode_nak(session.rx_expected(), session.is_nrdy());
					let _ = serial.write(&nak);
				}
			}
		}
	}
}

fn handle_frame(serial: &mut Serial, session: &mut Session, events: &Worker<LinkEvent>, decoded: crate::codec::DecodedFrame) {
	match decoded.kind {
		Kind::Rst => {}
		Kind::RstAck => {
			session.on_connected();
			let reason = ResetReason::decode(*decoded.data.last().unwrap_or(&0));
			let _ = events.push(LinkEvent::Connected(reason));
		}
		Kind::Error => {
			let reason = ResetReason::decode(*decoded.data.last().unwrap_or(&0));
			session.on_disconnected();
			let _ = events.push(LinkEvent::Failed(LinkError::PeerError(reason)));
		}
		Kind::Data => {
			let seq = frame::seq_of(decoded.control);

			match session.on_data(seq, decoded.data) {
				Delivery::Accept(payload) => {
					let ack = crate::codec::encode_ack(session.rx_expected(), session.is_nrdy());
					let _ = serial.write(&ack);
					let _ = events.push(LinkEvent::Payload(payload));
				}
				Delivery::Duplicate => {
					let ack = crate::codec::encode_ack(session.rx_expected(), session.is_nrdy());
					let _ = serial.write(&ack);
				}
				Delivery::Reject => {
					let nak = crate::codec::encode_nak(session.rx_expected(), session.is_nrdy());
					let _ = serial.write(&nak);
				}
			}
		}
		Kind::Ack => session.on_ack(frame::ack_num_of(decoded.control), frame::nrdy_bit(decoded.control)),
		Kind::Nak => session.on_nak(frame::ack_num_of(decoded.control), frame::nrdy_bit(decoded.control)),
		Kind::Unknown => {}
	}
}

//! Wires the link task (C1+C2), the EZSP codec (C3), and the supervisor (C4) together, per
//! spec.md §5's two-task model. Ported from `ezsp.cpp`'s `run`/dispatch loop, replacing its
//! shared-pointer callback registration with the bounded queues `runtime::worker::Worker`
//! already provides for the link task.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use ash::task::{self, Config as AshConfig};
use ash::LinkEvent;
use ezsp::Envelope;
use runtime::Worker;

use crate::config::DriverConfig;
use crate::events::{Action, DomainEvent, Event};
use crate::sm::Supervisor;

/// Bound named by spec.md §5: event queue and outbound DATA queue are each capped at 20.
pub const QUEUE_CAPACITY: usize = 20;

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// A running driver: the application pushes `Event`s in and drains `DomainEvent`s out.
pub struct Driver {
	inbox: Worker<Event>,
	app_events: Worker<DomainEvent>,
}

impl Driver {
	/// Start the link task and the supervisor task as OS threads, wired together by two
	/// bounded queues (link-to-supervisor and supervisor-to-application).
	pub fn spawn(config: DriverConfig, coordinator: bool) -> Self {
		let outbound = Worker::new(QUEUE_CAPACITY);
		let link_events = Worker::new(QUEUE_CAPACITY);
		let inbox: Worker<Event> = Worker::new(QUEUE_CAPACITY);
		let app_events: Worker<DomainEvent> = Worker::new(QUEUE_CAPACITY);
		let version = Arc::new(AtomicU8::new(config.protocol_version_floor));

		let ash_config = AshConfig {
			path: config.device.clone(),
			baud: config.baud,
			read_timeout: config.read_timeout(),
			retransmit_timeout: Duration::from_millis(800),
			reset_retries: config.reset_retries,
			max_retransmits: config.max_retransmits,
		};

		{
			let outbound = outbound.clone();
			let link_events = link_events.clone();
			thread::spawn(move || task::run(ash_config, outbound, link_events));
		}

		{
			let link_events = link_events.clone();
			let inbox = inbox.clone();
			let app_events = app_events.clone();
			thread::spawn(move || forward_link_events(link_events, inbox, app_events, version.clone()));
		}

		{
			let inbox = inbox.clone();
			let outbound = outbound.clone();
			let app_events = app_events.clone();
			thread::spawn(move || run_supervisor(coordinator, inbox, outbound, app_events, version));
		}

		inbox.push(Event::Start).ok();

		Self { inbox, app_events }
	}

	/// Enqueue an application request (e.g. built by [`crate::api::send_unicast`]).
	pub fn send(&self, event: Event) -> Result<(), runtime::worker::Busy> {
		self.inbox.push(event)
	}

	/// Block until the next domain event, or `None` once the driver has been stopped.
	pub fn recv(&self) -> Option<DomainEvent> {
		self.app_events.pop().ok()
	}

	/// Stop every task. The link task closes the serial handle on its next wakeup.
	pub fn stop(&self) {
		self.inbox.stop();
		self.app_events.stop();
	}
}

fn forward_link_events(link_events: Worker<LinkEvent>, inbox: Worker<Event>, app_events: Worker<DomainEvent>, version: Arc<AtomicU8>) {
	loop {
		let event = match link_events.pop() {
			Ok(event) => event,
			Err(()) => break,
		};

		let translated = match event {
			LinkEvent::Connected(reason) => Event::LinkUp(reason),
			LinkEvent::Disconnected => Event::LinkDown,
			LinkEvent::Failed(err) => Event::LinkFailed(err),
			LinkEvent::Payload(bytes) => match Envelope::decode(version.load(Ordering::Relaxed), &bytes) {
				Ok(envelope) => Event::Frame(envelope),
				Err(ezsp::CodecError::UnknownCommand(id)) => {
					if app_events.push(DomainEvent::Unrecognized { id, bytes }).is_err() {
						log::warn!("application event queue stopped, dropping unrecognized frame {id:#06x}");
						break;
					}
					continue;
				}
				Err(err) => {
					log::warn!("dropping undecodable EZSP frame: {err:?}");
					continue;
				}
			},
		};

		if inbox.push(translated).is_err() {
			log::warn!("supervisor inbox stopped, dropping forwarded event");
			break;
		}
	}
}

fn run_supervisor(coordinator: bool, inbox: Worker<Event>, outbound: Worker<Vec<u8>>, app_events: Worker<DomainEvent>, version: Arc<AtomicU8>) {
	let mut supervisor = Supervisor::new(coordinator);

	loop {
		let event = match inbox.pop_timeout(POLL_INTERVAL) {
			Ok(Some(event)) => event,
			Ok(None) => continue,
			Err(()) => break,
		};

		for action in supervisor.handle_event(event) {
			match action {
				Action::Send(envelope) => {
					if outbound.push(envelope.encode(supervisor.negotiated_version())).is_err() {
						log::warn!("link outbound queue stopped, dropping command {}", envelope.command.name());
					}
				}
				Action::Emit(domain_event) => {
					if app_events.push(domain_event).is_err() {
						log::warn!("application event queue stopped, dropping event");
					}
				}
			}
		}

		version.store(supervisor.negotiated_version(), Ordering::Relaxed);
	}
}

use std::io::{ErrorKind, Read, Write};
use std::time::{Duration, Instant};

use log::error;
use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};
use utils::error::*;

/// Default inter-byte read timeout, per the link layer's framing loop.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// A reason a blocking read did not produce a byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadError {
	/// No byte arrived before the deadline.
	Timeout,
	/// The transport was closed (e.g. `EBADF`, device unplugged).
	Closed,
}

/// A blocking byte-level serial transport, backed by the OS's serial driver.
///
/// Owns the only reader/writer of the line; the link layer drives framing on top of
/// `read_one`/`write`.
pub struct Serial {
	port: Option<Box<dyn SerialPort>>,
}

impl Serial {
	/// Open `path` at `baud`, 8N1, no hardware flow control, software XON/XOFF enabled.
	pub fn open(path: &str, baud: u32) -> Result<Self> {
		let port = serialport::new(path, baud)
			.data_bits(DataBits::Eight)
			.parity(Parity::None)
			.stop_bits(StopBits::One)
			.flow_control(FlowControl::Software)
			.timeout(DEFAULT_READ_TIMEOUT)
			.open()
			.map_err(|err| error!("Could not open serial device {path}: {err}"))?;

		Ok(Self { port: Some(port) })
	}

	/// Whether the transport is still open.
	pub fn is_open(&self) -> bool {
		self.port.is_some()
	}

	/// Write the full buffer, blocking until it's accepted or the transport fails.
	pub fn write(&mut self, buf: &[u8]) -> Result<()> {
		let Some(port) = &mut self.port else {
			return Err(());
		};

		if let Err(err) = port.write_all(buf) {
			if is_closed(&err) {
				self.port = None;
				return Err(());
			}

			error!("Serial write failed: {err}");
			return Err(());
		}

		Ok(())
	}

	/// Read a single byte, blocking until one arrives, `deadline` passes, or the transport closes.
	pub fn read_one(&mut self, deadline: Instant) -> core::result::Result<u8, ReadError> {
		let Some(port) = &mut self.port else {
			return Err(ReadError::Closed);
		};

		loop {
			let remaining = deadline.saturating_duration_since(Instant::now());

			if remaining.is_zero() {
				return Err(ReadError::Timeout);
			}

			if port.set_timeout(remaining).is_err() {
				self.port = None;
				return Err(ReadError::Closed);
			}

			let mut byte = [0u8; 1];

			match port.read(&mut byte) {
				Ok(0) => continue,
				Ok(_) => return Ok(byte[0]),
				Err(err) if err.kind() == ErrorKind::TimedOut => return Err(ReadError::Timeout),
				Err(err) if is_closed(&err) => {
					self.port = None;
					return Err(ReadError::Closed);
				}
				Err(err) => {
					error!("Serial read failed: {err}");
					self.port = None;
					return Err(ReadError::Closed);
				}
			}
		}
	}

	/// Close the transport. Idempotent.
	pub fn close(&mut self) {
		if let Some(port) = &mut self.port {
			let _ = port.clear(ClearBuffer::All);
		}

		self.port = None;
	}
}

fn is_closed(err: &std::io::Error) -> bool {
	matches!(err.kind(), ErrorKind::BrokenPipe | ErrorKind::NotConnected | ErrorKind::UnexpectedEof) || err.raw_os_error() == Some(libc_ebadf())
}

#[cfg(target_family = "unix")]
fn libc_ebadf() -> i32 {
	// EBADF, as defined by POSIX; surfaced when the device node disappears under us.
	9
}

#[cfg(not(target_family = "unix"))]
fn libc_ebadf() -> i32 {
	-1
}

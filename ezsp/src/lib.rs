pub mod command;
pub mod control;
pub mod envelope;
pub mod error;
pub mod params;
pub mod payload;

pub use command::CommandId;
pub use control::{ControlHigh, ControlLow};
pub use envelope::Envelope;
pub use error::CodecError;
pub use params::{Enum, Reader, Writer, MAX_PARAM_BYTES, MAX_PAYLOAD_BYTES};

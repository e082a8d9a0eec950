pub mod logger;
pub mod serial;
pub mod time;
pub mod worker;

pub use serial::Serial;
pub use worker::Worker;

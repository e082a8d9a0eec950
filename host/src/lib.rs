pub mod api;
pub mod child;
pub mod config;
pub mod driver;
pub mod events;
pub mod network;
pub mod persist;
pub mod security;
pub mod selfinfo;
pub mod sm;
pub mod state;

pub use config::DriverConfig;
pub use driver::Driver;
pub use events::{Action, DomainEvent, Event};
pub use sm::Supervisor;
pub use state::State;

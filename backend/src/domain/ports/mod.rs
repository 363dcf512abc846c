//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod command_transport;
mod user_repository;

pub use command_transport::{CommandRequest, CommandTransport};
#[cfg(test)]
pub use command_transport::MockCommandTransport;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_repository::MockUserRepository;

//! Command transport inbound adapter for the users service.
//!
//! `registry` maps each command to its use-case; `listener` accepts TCP
//! connections and feeds decoded frames to the registry.

mod listener;
mod registry;

pub use listener::serve;
pub use registry::{CommandRegistry, CommandRegistryBuilder, RegistryError, users_registry};

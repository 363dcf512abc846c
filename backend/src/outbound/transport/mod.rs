//! Command transport adapters used by the gateway.

mod tcp_client;

pub use tcp_client::{DEFAULT_COMMAND_TIMEOUT, TcpClientConfig, TcpCommandClient};

//! Inbound adapters that translate external requests into domain service
//! calls while keeping framework details at the edge.
//!
//! HTTP handlers for the gateway live under [`http`]; the users service's
//! command transport lives under [`command`].

pub mod command;
pub mod http;

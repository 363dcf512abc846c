//! Users gateway and users service.
//!
//! The gateway (`bin/gateway.rs`) exposes user CRUD over HTTP under
//! `/gateway` and relays each request as a command over TCP to the users
//! service (`bin/users_service.rs`), which owns the Postgres `users` table.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod protocol;
pub mod server;
pub mod telemetry;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;

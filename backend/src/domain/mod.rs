//! Domain primitives, use-cases, and ports.
//!
//! Purpose: define strongly typed user entities, the closed command set shared
//! by the gateway and the users service, and the transport-agnostic error
//! type. Keep types immutable and document invariants and serialisation
//! contracts (serde) in each type's Rustdoc.
//!
//! Public surface:
//! - Error / ErrorCode: classified failure carried across HTTP and commands.
//! - User, NewUser, UserPatch: validated user records and requests.
//! - UsersCommand: command identifiers and their payload shapes.
//! - UsersService: store-side use-cases; UsersClient: gateway-side facade.

pub mod command;
pub mod error;
pub mod ports;
pub mod trace_id;
pub mod user;
pub mod users_client;
pub mod users_service;

pub use self::command::{NoPayload, UnknownCommand, UpdateUserPayload, UsersCommand};
pub use self::error::{Error, ErrorCode};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    Email, NewUser, PASSWORD_MIN, Password, User, UserId, UserName, UserPatch,
    UserValidationError,
};
pub use self::users_client::UsersClient;
pub use self::users_service::UsersService;

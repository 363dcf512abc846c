//! HTTP inbound adapter exposing the gateway's REST endpoints.

pub mod error;
pub mod health;
pub mod schemas;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::{Scope, web};

pub use error::ApiResult;

/// Path prefix shared by every gateway endpoint.
pub const GATEWAY_PREFIX: &str = "/gateway";

/// The `/gateway` scope with the users endpoints and body validation wired in.
///
/// Handlers expect [`state::HttpState`] in the application data.
pub fn gateway_scope() -> Scope {
    web::scope(GATEWAY_PREFIX)
        .app_data(validation::json_config())
        .service(users::create_user)
        .service(users::list_users)
        .service(users::get_user)
        .service(users::update_user)
        .service(users::delete_user)
}

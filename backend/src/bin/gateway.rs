#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Gateway entry-point: HTTP on `GATEWAY_PORT`, commands to the users service.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use usergate::config::GatewaySettings;
use usergate::domain::UsersClient;
use usergate::inbound::http::health::HealthState;
use usergate::inbound::http::state::HttpState;
use usergate::outbound::transport::TcpCommandClient;
use usergate::server::{ServerConfig, create_server};
use usergate::telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init();

    let settings = GatewaySettings::from_env()?;
    let client_config = settings.client_config();
    info!(
        users_service = client_config.address(),
        timeout = ?client_config.command_timeout(),
        "relaying commands to users service"
    );

    let transport = TcpCommandClient::new(client_config);
    let http_state = HttpState::new(UsersClient::new(Arc::new(transport)));
    let health_state = web::Data::new(HealthState::new());

    let (host, port) = settings.bind_addr();
    let config = ServerConfig::new(http_state, host, port);
    let server = create_server(health_state.clone(), config)?;
    let result = server.await;
    health_state.mark_unhealthy();
    result
}

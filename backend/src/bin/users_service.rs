#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), forbid(clippy::expect_used))]
//! Users service entry-point: accepts commands over TCP and owns the
//! `users` table.

use std::io;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use usergate::config::{DatabaseSettings, UsersServiceSettings};
use usergate::domain::UsersService;
use usergate::inbound::command::{serve, users_registry};
use usergate::outbound::persistence::{DbPool, DieselUserRepository, synchronize_schema};
use usergate::telemetry;

#[tokio::main]
async fn main() -> io::Result<()> {
    telemetry::init();

    let database = DatabaseSettings::from_env()?;
    let listen = UsersServiceSettings::from_env()?;
    info!(?database, "connecting to database");

    let pool = DbPool::new(database.pool_config()?)
        .await
        .map_err(|err| io::Error::other(err.to_string()))?;
    if database.synchronize {
        synchronize_schema(&pool)
            .await
            .map_err(|err| io::Error::other(err.to_string()))?;
    }

    let repository = Arc::new(DieselUserRepository::new(pool));
    let service = Arc::new(UsersService::new(repository));
    let registry = users_registry(service).map_err(|err| io::Error::other(err.to_string()))?;

    let listener = TcpListener::bind(listen.bind_addr()).await?;
    info!(addr = %listener.local_addr()?, "users service listening");

    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            warn!(%error, "failed to listen for shutdown signal");
            return;
        }
        info!("shutdown requested");
        trigger.cancel();
    });

    serve(listener, Arc::new(registry), shutdown).await
}

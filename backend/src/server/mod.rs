//! Gateway server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::Trace;
use crate::doc::ApiDoc;
use crate::inbound::http::gateway_scope;
use crate::inbound::http::health::{HealthState, live, ready};
use crate::inbound::http::state::HttpState;

/// Path of the Swagger UI; the document is served beneath it.
pub const SWAGGER_UI_PATH: &str = "/api-doc";

/// State shared by every worker's application instance.
#[derive(Clone)]
pub struct AppDependencies {
    pub health_state: web::Data<HealthState>,
    pub http_state: web::Data<HttpState>,
    pub swagger_ui: bool,
}

/// Assemble the gateway application: `/gateway` routes, probes and docs.
pub fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        swagger_ui,
    } = deps;

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(gateway_scope())
        .service(ready)
        .service(live);

    app.configure(|cfg| {
        if swagger_ui {
            cfg.service(
                SwaggerUi::new(format!("{SWAGGER_UI_PATH}/{{_:.*}}"))
                    .url(format!("{SWAGGER_UI_PATH}/openapi.json"), ApiDoc::openapi()),
            );
        }
    })
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Returns
/// A spawned [`Server`] that must be awaited to drive the listener.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        host,
        port,
        http_state,
        swagger_ui,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        swagger_ui,
    };

    let http_server = HttpServer::new(move || build_app(deps.clone())).bind((host.as_str(), port))?;
    let addrs = http_server.addrs();
    let server = http_server.run();

    info!(%host, port, ?addrs, "gateway listening");
    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests;

use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};
use dotenvy::dotenv;
use std::sync::Arc;
use std::time::Duration;

mod api;
mod auth;
mod config;
mod docs;
mod errors;
mod model;
mod routes;
mod services;

use config::Config;

use crate::docs::ApiDoc;
use crate::services::directory::UserDirectory;
use crate::services::resolver::{self, InMemoryCatalog, LocationCatalog, LocationResolver};
use crate::services::store::SessionStore;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance Tracker API"
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    let config = Config::from_env();

    // Rolling daily log
    let file_appender = rolling::daily("logs", "app.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    info!("Server starting...");

    let catalog: Arc<dyn LocationCatalog> = Arc::new(InMemoryCatalog::seeded());
    let resolver = Data::new(LocationResolver::new(
        catalog.clone(),
        Duration::from_millis(config.lookup_timeout_ms),
    ));
    let store = Data::new(SessionStore::new());
    let directory = Data::new(UserDirectory::new());

    let server_addr = config.server_addr.clone();
    let config_data = config.clone();

    let catalog_for_warmup = catalog.clone();
    actix_web::rt::spawn(async move {
        if let Err(e) = resolver::warmup_location_cache(catalog_for_warmup.as_ref()).await {
            eprintln!("Failed to warmup location cache: {:?}", e);
        }
    });

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(store.clone())
            .app_data(directory.clone())
            .app_data(resolver.clone())
            .app_data(Data::new(config.clone()))
            .service(index)
            .configure(|cfg| routes::configure(cfg, config_data.clone()))
    })
    .bind(server_addr)?
    .run()
    .await
}

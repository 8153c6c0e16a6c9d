pub mod admin;
pub mod attendance;
pub mod location;

use actix_web::{HttpResponse, Responder};
use chrono::{SecondsFormat, Utc};
use serde_json::json;

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = Object, example = json!({
            "status": "healthy",
            "timestamp": "2025-03-10T09:00:00Z"
        }))
    ),
    tag = "Health"
)]
pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
    }))
}

/// Builds a fully wired test service: real stores, seeded catalog, and the
/// production route table.
#[cfg(test)]
macro_rules! test_app {
    () => {{
        use actix_web::{App, web::Data};
        use std::sync::Arc;
        use std::time::Duration;

        let config = crate::config::Config::for_tests();
        let resolver = crate::services::resolver::LocationResolver::new(
            Arc::new(crate::services::resolver::InMemoryCatalog::seeded()),
            Duration::from_millis(config.lookup_timeout_ms),
        );

        actix_web::test::init_service(
            App::new()
                .app_data(Data::new(crate::services::store::SessionStore::new()))
                .app_data(Data::new(crate::services::directory::UserDirectory::new()))
                .app_data(Data::new(resolver))
                .app_data(Data::new(config.clone()))
                .configure(|cfg| crate::routes::configure(cfg, config)),
        )
        .await
    }};
}

#[cfg(test)]
pub(crate) use test_app;

use actix_web::{HttpResponse, Responder, web};

use crate::model::location::RegisteredLocation;
use crate::services::resolver::LocationResolver;

/// Registered office locations
#[utoipa::path(
    get,
    path = "/api/locations",
    responses(
        (status = 200, description = "All registered locations", body = [RegisteredLocation]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Locations"
)]
pub async fn list_locations(
    resolver: web::Data<LocationResolver>,
) -> actix_web::Result<impl Responder> {
    let locations: Vec<RegisteredLocation> = resolver.registered().await;
    Ok(HttpResponse::Ok().json(locations))
}

#[cfg(test)]
mod tests {
    use crate::api::test_app;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn lists_the_seeded_offices() {
        let app = test_app!();
        let req = test::TestRequest::get()
            .peer_addr("127.0.0.1:12345".parse().unwrap())
            .insert_header(("X-User-Id", "7"))
            .uri("/api/locations")
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let locations = body.as_array().unwrap();
        assert_eq!(locations.len(), 5);
        assert_eq!(locations[2]["name"], json!("Mumbai Office"));
        assert_eq!(locations[2]["pincode"], json!("400001"));
    }
}

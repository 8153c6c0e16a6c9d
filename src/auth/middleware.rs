use actix_web::{
    Error, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    middleware::Next,
    web::Data,
};
use actix_web::HttpMessage;
use serde_json::json;

use crate::auth::auth::AuthUser;
use crate::model::user::Role;
use crate::services::directory::UserDirectory;

/// Trusts the identity headers set by the external auth layer in front of
/// this service: `X-User-Id` (required), `X-User-Name`, `X-User-Email`, and
/// `X-User-Admin`. Requests without a validated identity never reach a
/// handler.
pub async fn identity_middleware(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let user_id = match header(&req, "X-User-Id").and_then(|v| v.parse::<u64>().ok()) {
        Some(id) => id,
        None => {
            let resp = HttpResponse::Unauthorized()
                .json(json!({"error": "unauthorized", "message": "Missing or invalid X-User-Id header"}));
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    let name = header(&req, "X-User-Name").unwrap_or_else(|| format!("user-{user_id}"));
    let email = header(&req, "X-User-Email").unwrap_or_default();
    let is_admin = matches!(
        header(&req, "X-User-Admin").as_deref(),
        Some("true") | Some("1")
    );

    let directory = req
        .app_data::<Data<UserDirectory>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("User directory missing"))?;

    if directory.record(user_id, &name, &email, is_admin).is_err() {
        let resp = HttpResponse::ServiceUnavailable()
            .json(json!({"error": "storage_unavailable", "message": "Attendance storage is unavailable"}));
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    let auth_user = AuthUser {
        user_id,
        name,
        email,
        role: Role::from_admin_flag(is_admin),
    };
    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

fn header(req: &ServiceRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

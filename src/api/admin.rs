use actix_web::http::header::ContentDisposition;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::api::attendance::{AttendanceRecord, SummaryResponse, summarize};
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::errors::{AdminError, AppError};
use crate::model::session::AttendanceSession;
use crate::services::directory::UserDirectory;
use crate::services::export::export_month;
use crate::services::store::SessionStore;

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
    pub is_admin: bool,
    #[schema(example = "2025-01-06T08:12:00Z", format = "date-time", value_type = String)]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Serialize, ToSchema)]
pub struct AdminAttendanceRecord {
    #[serde(flatten)]
    pub record: AttendanceRecord,
    pub user: UserBrief,
}

#[derive(Serialize, ToSchema)]
pub struct UserBrief {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Asha Rao")]
    pub name: String,
    #[schema(example = "asha@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExportQuery {
    /// Calendar year, e.g. 2025
    pub year: i32,
    /// Calendar month, 1-12
    pub month: u32,
}

/// List all known users
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses(
        (status = 200, description = "All users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin"
)]
pub async fn list_users(
    auth: AuthUser,
    directory: web::Data<UserDirectory>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let users: Vec<UserResponse> = directory
        .list()
        .map_err(AppError::from)?
        .into_iter()
        .map(|u| UserResponse {
            id: u.id,
            name: u.name,
            email: u.email,
            is_admin: u.is_admin,
            created_at: u.created_at,
        })
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// Delete a user and all their attendance data
#[utoipa::path(
    delete,
    path = "/api/admin/users/{user_id}",
    params(("user_id", Path, description = "User ID")),
    responses(
        (status = 200, description = "User deleted", body = Object, example = json!({
            "message": "User deleted successfully"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 404, description = "User not found")
    ),
    tag = "Admin"
)]
pub async fn delete_user(
    auth: AuthUser,
    directory: web::Data<UserDirectory>,
    store: web::Data<SessionStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let profile = directory.remove(user_id).map_err(AppError::from)?;
    let had_sessions = store.delete_user(user_id).map_err(AppError::from)?;

    if profile.is_none() && !had_sessions {
        return Err(AppError::from(AdminError::UserNotFound(user_id)).into());
    }

    tracing::info!(user_id, "User deleted with all attendance data");

    Ok(HttpResponse::Ok().json(json!({
        "message": "User deleted successfully"
    })))
}

/// Attendance records across all users
#[utoipa::path(
    get,
    path = "/api/admin/attendance",
    responses(
        (status = 200, description = "All attendance records, newest first", body = [AdminAttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin"
)]
pub async fn all_attendance(
    auth: AuthUser,
    directory: web::Data<UserDirectory>,
    store: web::Data<SessionStore>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let mut sessions: Vec<AttendanceSession> = Vec::new();
    for user_id in store.user_ids().map_err(AppError::from)? {
        let (open, closed) = store.snapshot(user_id).map_err(AppError::from)?;
        sessions.extend(open);
        sessions.extend(closed);
    }
    sessions.sort_by(|a, b| b.date.cmp(&a.date).then(b.check_in.cmp(&a.check_in)));

    let mut records: Vec<AdminAttendanceRecord> = Vec::with_capacity(sessions.len());
    for session in &sessions {
        let user = directory.get(session.user_id).map_err(AppError::from)?;
        records.push(AdminAttendanceRecord {
            record: session.into(),
            user: match user {
                Some(u) => UserBrief { id: u.id, name: u.name, email: u.email },
                None => UserBrief {
                    id: session.user_id,
                    name: format!("user-{}", session.user_id),
                    email: String::new(),
                },
            },
        });
    }

    Ok(HttpResponse::Ok().json(records))
}

/// Attendance records for one user
#[utoipa::path(
    get,
    path = "/api/admin/attendance/{user_id}",
    params(("user_id", Path, description = "User ID")),
    responses(
        (status = 200, description = "Records, open session first then newest closed", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin"
)]
pub async fn user_attendance(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let (open, closed) = store.snapshot(user_id).map_err(AppError::from)?;
    let mut records: Vec<AttendanceRecord> = Vec::with_capacity(closed.len() + 1);
    if let Some(open) = &open {
        records.push(open.into());
    }
    records.extend(closed.iter().map(AttendanceRecord::from));

    Ok(HttpResponse::Ok().json(records))
}

/// Aggregated summary for one user
#[utoipa::path(
    get,
    path = "/api/admin/attendance/{user_id}/summary",
    params(("user_id", Path, description = "User ID")),
    responses(
        (status = 200, description = "Aggregated totals", body = SummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin"
)]
pub async fn user_summary(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let (open, closed) = store.snapshot(user_id).map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(summarize(open, closed)))
}

/// Export one user's month as CSV
#[utoipa::path(
    get,
    path = "/api/admin/attendance/export/{user_id}",
    params(("user_id", Path, description = "User ID"), ExportQuery),
    responses(
        (status = 200, description = "CSV attachment; header-only when the month is empty"),
        (status = 400, description = "Invalid year/month range"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    tag = "Admin"
)]
pub async fn export_attendance(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    config: web::Data<Config>,
    path: web::Path<u64>,
    query: web::Query<ExportQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let user_id = path.into_inner();

    let (open, mut sessions) = store.snapshot(user_id).map_err(AppError::from)?;
    sessions.extend(open);

    let csv = export_month(&sessions, query.year, query.month, config.year_bounds())
        .map_err(AppError::from)?;

    tracing::debug!(user_id, year = query.year, month = query.month, "Attendance export");

    let filename = format!("attendance-{}-{}-{:02}.csv", user_id, query.year, query.month);
    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header(ContentDisposition::attachment(filename))
        .body(csv))
}

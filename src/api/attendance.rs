use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::errors::AppError;
use crate::model::session::{AttendanceSession, CustomField, TaskRecord};
use crate::services::report;
use crate::services::resolver::{CheckInLocation, LocationResolver};
use crate::services::store::SessionStore;

#[derive(Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckInRequest {
    #[schema(example = 3)]
    pub location_id: Option<u32>,
    #[schema(example = 19.076)]
    pub latitude: Option<f64>,
    #[schema(example = 72.8777)]
    pub longitude: Option<f64>,
    #[schema(example = "Client site, Andheri East")]
    pub address: Option<String>,
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutRequest {
    #[schema(example = "Fixed login bug")]
    pub task: String,
    #[serde(alias = "status")]
    #[schema(example = "completed")]
    pub task_status: String,
    #[schema(example = "Auth")]
    pub project_name: String,
    #[serde(default)]
    pub custom_fields: Vec<CustomField>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct HistoryQuery {
    /// Inclusive start date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-03-01")]
    pub from: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD)
    #[param(value_type = Option<String>, example = "2025-03-31")]
    pub to: Option<NaiveDate>,
}

/// One attendance record as the dashboard and admin views consume it.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub id: String,
    #[schema(example = "2025-03-10")]
    pub date: String,
    #[schema(example = "2025-03-10T09:00:00Z")]
    pub check_in_time: String,
    #[schema(example = "2025-03-10T17:30:00Z")]
    pub check_out_time: Option<String>,
    #[schema(example = "Mumbai Office")]
    pub location: String,
    pub task: Option<String>,
    #[schema(example = "completed")]
    pub task_status: Option<String>,
    #[schema(example = "Auth")]
    pub project_name: Option<String>,
    pub custom_fields: Option<Vec<CustomField>>,
}

impl From<&AttendanceSession> for AttendanceRecord {
    fn from(session: &AttendanceSession) -> Self {
        let task = session.task.as_ref();
        Self {
            id: session.id.to_string(),
            date: session.date.to_string(),
            check_in_time: session.check_in.to_rfc3339_opts(SecondsFormat::Secs, true),
            check_out_time: session
                .check_out
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)),
            location: session.location.name.clone(),
            task: task.map(|t| t.description.clone()),
            task_status: task.map(|t| t.status.to_string()),
            project_name: task.map(|t| t.project_name.clone()),
            custom_fields: task
                .filter(|t| !t.custom_fields.is_empty())
                .map(|t| t.custom_fields.clone()),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResponse {
    #[schema(example = 42.5)]
    pub total_hours: f64,
    pub task_stats: report::TaskStats,
    #[schema(example = 2)]
    pub distinct_locations: usize,
    pub recent: Vec<AttendanceRecord>,
}

/// Builds the summary the dashboard shows for one user's sessions.
pub fn summarize(
    open: Option<AttendanceSession>,
    mut sessions: Vec<AttendanceSession>,
) -> SummaryResponse {
    if let Some(open) = open {
        sessions.push(open);
    }
    SummaryResponse {
        total_hours: report::total_hours(&sessions),
        task_stats: report::task_stats(&sessions),
        distinct_locations: report::distinct_locations(&sessions),
        recent: report::recent(&sessions, 5).iter().map(Into::into).collect(),
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkin",
    request_body = CheckInRequest,
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Check-in successful",
            "checkInTime": "2025-03-10T09:00:00Z",
            "locationName": "Mumbai Office",
            "gpsRecorded": false
        })),
        (status = 400, description = "Already checked in, or the location input is missing/invalid"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown registered location"),
        (status = 504, description = "Registered location lookup timed out")
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    resolver: web::Data<LocationResolver>,
    payload: Option<web::Json<CheckInRequest>>,
) -> actix_web::Result<impl Responder> {
    let req = payload.map(web::Json::into_inner).unwrap_or_default();

    let requested =
        CheckInLocation::from_parts(req.location_id, req.latitude, req.longitude, req.address)
            .map_err(AppError::from)?;
    let location = resolver.resolve(requested).await.map_err(AppError::from)?;
    let gps_recorded = location.is_gps();

    let session = store
        .try_open(auth.user_id, location, Utc::now())
        .map_err(AppError::from)?;

    tracing::info!(user_id = auth.user_id, gps = gps_recorded, "Check-in successful");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Check-in successful",
        "checkInTime": session.check_in.to_rfc3339_opts(SecondsFormat::Secs, true),
        "locationName": session.location.name,
        "gpsRecorded": gps_recorded,
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/checkout",
    request_body = CheckOutRequest,
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Check-out successful",
            "checkOutTime": "2025-03-10T17:30:00Z",
            "taskStatus": "completed"
        })),
        (status = 400, description = "No open session, or the task payload is invalid"),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    payload: web::Json<CheckOutRequest>,
) -> actix_web::Result<impl Responder> {
    let payload = payload.into_inner();
    let task = TaskRecord::new(
        &payload.task,
        &payload.task_status,
        &payload.project_name,
        payload.custom_fields,
    )
    .map_err(AppError::from)?;

    let session = store
        .close(auth.user_id, task, Utc::now())
        .map_err(AppError::from)?;
    let check_out = session.check_out.unwrap_or(session.check_in);

    tracing::info!(user_id = auth.user_id, "Check-out successful");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Check-out successful",
        "checkOutTime": check_out.to_rfc3339_opts(SecondsFormat::Secs, true),
        "taskStatus": session.task.map(|t| t.status.to_string()),
    })))
}

/// Current check-in status
#[utoipa::path(
    get,
    path = "/api/attendance/status",
    responses(
        (status = 200, description = "Current status", body = Object, example = json!({
            "isCheckedIn": true,
            "checkInTime": "2025-03-10T09:00:00Z",
            "locationId": 3,
            "locationName": "Mumbai Office"
        })),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn check_status(
    auth: AuthUser,
    store: web::Data<SessionStore>,
) -> actix_web::Result<impl Responder> {
    let response = match store.status(auth.user_id).map_err(AppError::from)? {
        Some(open) => json!({
            "isCheckedIn": true,
            "checkInTime": open.check_in.to_rfc3339_opts(SecondsFormat::Secs, true),
            "locationId": open.location.id,
            "locationName": open.location.name,
        }),
        None => json!({ "isCheckedIn": false }),
    };

    Ok(HttpResponse::Ok().json(response))
}

/// Attendance history for the authenticated user
#[utoipa::path(
    get,
    path = "/api/attendance/history",
    params(HistoryQuery),
    responses(
        (status = 200, description = "Records, open session first then newest closed", body = [AttendanceRecord]),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn get_history(
    auth: AuthUser,
    store: web::Data<SessionStore>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let range = match (query.from, query.to) {
        (None, None) => None,
        (from, to) => Some((
            from.unwrap_or(NaiveDate::MIN),
            to.unwrap_or(NaiveDate::MAX),
        )),
    };

    let (open, _) = store.snapshot(auth.user_id).map_err(AppError::from)?;
    let closed = store
        .history(auth.user_id, range)
        .map_err(AppError::from)?;

    let mut records: Vec<AttendanceRecord> = Vec::with_capacity(closed.len() + 1);
    if let Some(open) = open {
        let in_range = range
            .map(|(from, to)| open.date >= from && open.date <= to)
            .unwrap_or(true);
        if in_range {
            records.push((&open).into());
        }
    }
    records.extend(closed.iter().map(AttendanceRecord::from));

    Ok(HttpResponse::Ok().json(records))
}

/// Aggregated dashboard summary for the authenticated user
#[utoipa::path(
    get,
    path = "/api/attendance/summary",
    responses(
        (status = 200, description = "Aggregated totals", body = SummaryResponse),
        (status = 401, description = "Unauthorized")
    ),
    tag = "Attendance"
)]
pub async fn get_summary(
    auth: AuthUser,
    store: web::Data<SessionStore>,
) -> actix_web::Result<impl Responder> {
    let (open, closed) = store.snapshot(auth.user_id).map_err(AppError::from)?;
    Ok(HttpResponse::Ok().json(summarize(open, closed)))
}

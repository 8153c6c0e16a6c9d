use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

use crate::services::store::StoreError;

#[derive(Error, Debug)]
pub enum LocationError {
    #[error("Either a registered location id or GPS coordinates are required")]
    Missing,

    #[error("Location {0} is not registered")]
    NotFound(u32),

    #[error("Coordinates ({latitude}, {longitude}) are out of range")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Registered location lookup timed out")]
    LookupTimeout,
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("You are already checked in. Please check out first")]
    AlreadyCheckedIn,

    #[error("No check-in found. Please check in first")]
    NoOpenSession,

    #[error("{0}")]
    InvalidTask(String),
}

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Export range is invalid: year {year}, month {month}")]
    InvalidRange { year: i32, month: u32 },
}

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("User {0} not found")]
    UserNotFound(u64),
}

/// Umbrella error for the request boundary. Every variant maps to a stable
/// machine-readable kind plus a human message; only `Storage` is retryable.
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error(transparent)]
    Admin(#[from] AdminError),

    #[error("Attendance storage is unavailable")]
    Storage,
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::AlreadyCheckedIn => AppError::Session(SessionError::AlreadyCheckedIn),
            StoreError::NoOpenSession => AppError::Session(SessionError::NoOpenSession),
            StoreError::Unavailable => AppError::Storage,
        }
    }
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Location(LocationError::Missing) => "location_missing",
            AppError::Location(LocationError::NotFound(_)) => "location_not_found",
            AppError::Location(LocationError::InvalidCoordinates { .. }) => "invalid_coordinates",
            AppError::Location(LocationError::LookupTimeout) => "lookup_timeout",
            AppError::Session(SessionError::AlreadyCheckedIn) => "already_checked_in",
            AppError::Session(SessionError::NoOpenSession) => "no_open_session",
            AppError::Session(SessionError::InvalidTask(_)) => "invalid_task",
            AppError::Export(ExportError::InvalidRange { .. }) => "invalid_range",
            AppError::Admin(AdminError::UserNotFound(_)) => "user_not_found",
            AppError::Storage => "storage_unavailable",
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Location(LocationError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Location(LocationError::LookupTimeout) => StatusCode::GATEWAY_TIMEOUT,
            AppError::Location(_) => StatusCode::BAD_REQUEST,
            AppError::Session(_) => StatusCode::BAD_REQUEST,
            AppError::Export(_) => StatusCode::BAD_REQUEST,
            AppError::Admin(AdminError::UserNotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }))
    }
}

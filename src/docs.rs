use crate::api::admin::{AdminAttendanceRecord, UserBrief, UserResponse};
use crate::api::attendance::{
    AttendanceRecord, CheckInRequest, CheckOutRequest, SummaryResponse,
};
use crate::model::location::RegisteredLocation;
use crate::model::session::CustomField;
use crate::services::report::TaskStats;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

This API powers an employee attendance tracker: check in with a registered
office or GPS coordinates, check out with a task summary, and review or
export the resulting records.

### 🔹 Key Features
- **Check-in / Check-out**
  - One open session per user, closed with a task summary
- **Locations**
  - Registered office catalog or raw GPS with synthesized addresses
- **Dashboards**
  - Per-user history and aggregated totals
- **Admin**
  - User management, all-hands attendance views, monthly CSV export

### 🔐 Identity
Endpoints trust the validated identity headers (`X-User-Id`,
`X-User-Admin`, ...) injected by the auth layer in front of this service.
Admin endpoints require the admin flag.

---
Built with **Rust**, **Actix Web**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::health,

        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::check_status,
        crate::api::attendance::get_history,
        crate::api::attendance::get_summary,

        crate::api::location::list_locations,

        crate::api::admin::list_users,
        crate::api::admin::delete_user,
        crate::api::admin::all_attendance,
        crate::api::admin::user_attendance,
        crate::api::admin::user_summary,
        crate::api::admin::export_attendance,
    ),
    components(
        schemas(
            CheckInRequest,
            CheckOutRequest,
            AttendanceRecord,
            SummaryResponse,
            TaskStats,
            CustomField,
            RegisteredLocation,
            UserResponse,
            UserBrief,
            AdminAttendanceRecord
        )
    ),
    tags(
        (name = "Attendance", description = "Check-in/check-out lifecycle and reporting APIs"),
        (name = "Locations", description = "Registered location catalog APIs"),
        (name = "Admin", description = "Administrative attendance APIs"),
        (name = "Health", description = "Service health"),
    )
)]
pub struct ApiDoc;

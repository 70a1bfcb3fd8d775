use crate::api::attendance::{BulkMarkReq, MarkAttendanceReq, RangeQuery, ReportQuery};
use crate::api::employee::CreateEmployee;
use crate::model::attendance::{AttendanceEvent, AttendanceStats, ConsolidatedDay};
use crate::model::employee::Employee;
use crate::model::employee_log::EmployeeLog;
use crate::models::{LoginReq, LoginResponse, UserInfo};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Office Attendance Tracker

Employees authenticate, record check-in / lunch-out / lunch-in / check-out
events, and administrators manage employee records and view attendance
reports.

### 🔹 Key Features
- **Attendance Tracking**
  - Self-service timer events and a consolidated daily status
- **Employee Management**
  - Create, update, list, and soft-delete employee records
- **Reports**
  - Date-range reports with status count breakdowns, dashboard summary
- **Audit Log**
  - Every login attempt, timer event and administrative mark is recorded

### 🔐 Security
Endpoints past `/auth/login` are protected with **JWT Bearer authentication**.
Administrative routes additionally require the **admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::lunch_out,
        crate::api::attendance::lunch_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::my_attendance,
        crate::api::attendance::my_stats,
        crate::api::attendance::mark_attendance,
        crate::api::attendance::bulk_mark,
        crate::api::attendance::by_date,
        crate::api::attendance::by_employee,
        crate::api::attendance::report,

        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::dashboard::stats,

        crate::api::logs::my_logs,
        crate::api::logs::list_logs,
        crate::api::logs::login_logs,
        crate::api::logs::attendance_logs
    ),
    components(
        schemas(
            Employee,
            AttendanceEvent,
            ConsolidatedDay,
            AttendanceStats,
            EmployeeLog,
            MarkAttendanceReq,
            BulkMarkReq,
            RangeQuery,
            ReportQuery,
            CreateEmployee,
            LoginReq,
            LoginResponse,
            UserInfo
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Attendance recording and reports"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Dashboard", description = "Admin dashboard summary"),
        (name = "Logs", description = "Audit log queries"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

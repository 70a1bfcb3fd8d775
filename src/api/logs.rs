use crate::auth::auth::AuthUser;
use crate::model::employee_log;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub limit: Option<u32>,
    pub action: Option<String>,
    pub employee_id: Option<u64>,
}

fn fetch_error(e: sqlx::Error) -> HttpResponse {
    error!(error = %e, "Failed to fetch logs");
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "message": "Failed to fetch logs"
    }))
}

fn logs_response(logs: Vec<employee_log::EmployeeLog>) -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "success": true,
        "count": logs.len(),
        "logs": logs
    }))
}

/// The authenticated employee's own audit trail
#[utoipa::path(
    get,
    path = "/api/employee/my-logs",
    params(("limit" = Option<u32>, Query, description = "Max entries, default 50")),
    responses(
        (status = 200, description = "Audit entries, newest first"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn my_logs(
    auth: AuthUser,
    query: web::Query<LogQuery>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    match employee_log::logs_for_employee(pool.get_ref(), auth.employee_id, limit).await {
        Ok(logs) => logs_response(logs),
        Err(e) => fetch_error(e),
    }
}

/// Admin: recent audit entries, filterable by action and employee
#[utoipa::path(
    get,
    path = "/api/admin/logs",
    params(
        ("limit" = Option<u32>, Query, description = "Max entries, default 100"),
        ("action" = Option<String>, Query, description = "Filter by action tag"),
        ("employee_id" = Option<u64>, Query, description = "Filter by employee")
    ),
    responses(
        (status = 200, description = "Audit entries, newest first"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn list_logs(query: web::Query<LogQuery>, pool: web::Data<MySqlPool>) -> impl Responder {
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    match employee_log::recent_logs(
        pool.get_ref(),
        query.action.as_deref(),
        query.employee_id,
        limit,
    )
    .await
    {
        Ok(logs) => logs_response(logs),
        Err(e) => fetch_error(e),
    }
}

/// Admin: login/logout history for one employee
#[utoipa::path(
    get,
    path = "/api/admin/logs/login/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        ("limit" = Option<u32>, Query, description = "Max entries, default 50")
    ),
    responses(
        (status = 200, description = "Login history, newest first"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn login_logs(
    path: web::Path<u64>,
    query: web::Query<LogQuery>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let employee_id = path.into_inner();
    let limit = query.limit.unwrap_or(50).clamp(1, 500);

    match employee_log::login_logs(pool.get_ref(), employee_id, limit).await {
        Ok(logs) => logs_response(logs),
        Err(e) => fetch_error(e),
    }
}

/// Admin: attendance-related audit entries for one calendar date
#[utoipa::path(
    get,
    path = "/api/admin/logs/attendance/{date}",
    params(("date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Attendance audit entries, oldest first"),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Logs"
)]
pub async fn attendance_logs(
    path: web::Path<String>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let raw = path.into_inner();
    let date = match NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        Ok(date) => date,
        Err(_) => {
            return HttpResponse::BadRequest().json(json!({
                "success": false,
                "message": "date must be in YYYY-MM-DD format"
            }));
        }
    };

    match employee_log::attendance_logs_for_date(pool.get_ref(), date).await {
        Ok(logs) => HttpResponse::Ok().json(json!({
            "success": true,
            "count": logs.len(),
            "date": raw,
            "logs": logs
        })),
        Err(e) => fetch_error(e),
    }
}

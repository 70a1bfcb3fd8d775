use crate::auth::auth::AuthUser;
use crate::auth::handlers::{client_ip, user_agent};
use crate::model::attendance::{
    self, AttendanceStats, EventKind, RecordError, attendance_stats, consolidate,
};
use crate::model::employee_log::{self, LogAction, LogOutcome, NewLogEntry};
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RangeQuery {
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<String>,
    #[schema(example = "2024-01-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReportQuery {
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<String>,
    #[schema(example = "2024-01-31", value_type = Option<String>, format = "date")]
    pub end_date: Option<String>,
    #[schema(example = 7)]
    pub employee_id: Option<u64>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct MarkAttendanceReq {
    #[schema(example = 7)]
    pub employee_id: u64,
    #[schema(example = "2024-01-10", value_type = String, format = "date")]
    pub date: String,
    #[schema(example = "absent")]
    pub status: String,
    #[schema(example = "sick")]
    pub remarks: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BulkMarkReq {
    pub records: Vec<MarkAttendanceReq>,
}

fn internal_error() -> HttpResponse {
    HttpResponse::InternalServerError().json(json!({
        "success": false,
        "message": "Internal server error"
    }))
}

fn validation_error(message: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "success": false,
        "message": message
    }))
}

fn record_error_response(e: RecordError, employee_id: u64) -> HttpResponse {
    match e {
        RecordError::InvalidDate | RecordError::InvalidKind => {
            validation_error(&e.to_string())
        }
        RecordError::Db(e) => {
            error!(error = %e, employee_id, "Failed to record attendance event");
            internal_error()
        }
    }
}

/// Named field in the error so the caller knows which date was malformed.
fn parse_date_param(field: &str, value: &str) -> Result<NaiveDate, HttpResponse> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| validation_error(&format!("{} must be in YYYY-MM-DD format", field)))
}

fn parse_range(query: &RangeQuery) -> Result<(Option<NaiveDate>, Option<NaiveDate>), HttpResponse> {
    let start = match &query.start_date {
        Some(s) => Some(parse_date_param("start_date", s)?),
        None => None,
    };
    let end = match &query.end_date {
        Some(s) => Some(parse_date_param("end_date", s)?),
        None => None,
    };
    Ok((start, end))
}

/// Shared body of the four self-service timer endpoints: record today's
/// event for the caller, audit it, return the stored row.
async fn record_timer_event(
    auth: &AuthUser,
    req: &HttpRequest,
    pool: &MySqlPool,
    kind: EventKind,
    default_remark: &str,
    action: LogAction,
    success_message: &str,
) -> HttpResponse {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let event = match attendance::record_event(
        pool,
        auth.employee_id,
        &today,
        &kind.to_string(),
        default_remark,
        &auth.email,
    )
    .await
    {
        Ok(event) => event,
        Err(e) => return record_error_response(e, auth.employee_id),
    };

    employee_log::audit(
        pool,
        NewLogEntry {
            employee_id: Some(auth.employee_id),
            action,
            ip_address: client_ip(req),
            user_agent: user_agent(req),
            details: Some(json!({ "date": today })),
            outcome: LogOutcome::Success,
        },
    )
    .await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": success_message,
        "attendance": event
    }))
}

/// Check-in for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/employee/check-in",
    responses(
        (status = 200, description = "Checked in successfully"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    record_timer_event(
        &auth,
        &req,
        pool.get_ref(),
        EventKind::CheckIn,
        "Checked in",
        LogAction::CheckIn,
        "Checked in successfully",
    )
    .await
}

/// Lunch-out for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/employee/lunch-out",
    responses(
        (status = 200, description = "Lunch out recorded successfully"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn lunch_out(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    record_timer_event(
        &auth,
        &req,
        pool.get_ref(),
        EventKind::LunchOut,
        "Went for lunch",
        LogAction::LunchOut,
        "Lunch out recorded successfully",
    )
    .await
}

/// Lunch-in for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/employee/lunch-in",
    responses(
        (status = 200, description = "Lunch in recorded successfully"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn lunch_in(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    record_timer_event(
        &auth,
        &req,
        pool.get_ref(),
        EventKind::LunchIn,
        "Back from lunch",
        LogAction::LunchIn,
        "Lunch in recorded successfully",
    )
    .await
}

/// Check-out for the authenticated employee
#[utoipa::path(
    post,
    path = "/api/employee/check-out",
    responses(
        (status = 200, description = "Checked out successfully"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    record_timer_event(
        &auth,
        &req,
        pool.get_ref(),
        EventKind::CheckOut,
        "Checked out",
        LogAction::CheckOut,
        "Checked out successfully",
    )
    .await
}

/// Today's consolidated status for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/today-status",
    responses(
        (status = 200, description = "Consolidated view of today's events"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn today_status(auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    let today = Utc::now().date_naive();

    let events = match attendance::events_for_day(pool.get_ref(), auth.employee_id, today).await {
        Ok(events) => events,
        Err(e) => {
            error!(error = %e, employee_id = auth.employee_id, "Failed to fetch today's events");
            return internal_error();
        }
    };

    let day = consolidate(auth.employee_id, today, &events);

    HttpResponse::Ok().json(json!({
        "success": true,
        "attendance": day
    }))
}

/// Full attendance history for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/my-attendance",
    responses(
        (status = 200, description = "Attendance records, newest first"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_attendance(auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    match attendance::events_by_employee(pool.get_ref(), auth.employee_id).await {
        Ok(records) => HttpResponse::Ok().json(json!({
            "success": true,
            "records": records
        })),
        Err(e) => {
            error!(error = %e, employee_id = auth.employee_id, "Failed to fetch attendance records");
            internal_error()
        }
    }
}

/// Status count breakdown for the authenticated employee
#[utoipa::path(
    get,
    path = "/api/employee/my-stats",
    params(
        ("start_date" = Option<String>, Query, description = "Range start, YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "Range end, YYYY-MM-DD")
    ),
    responses(
        (status = 200, description = "Counts by status", body = AttendanceStats),
        (status = 400, description = "Malformed date"),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn my_stats(
    auth: AuthUser,
    query: web::Query<RangeQuery>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    let (start, end) = match parse_range(&query) {
        Ok(range) => range,
        Err(resp) => return resp,
    };

    let records =
        match attendance::events_in_range(pool.get_ref(), start, end, Some(auth.employee_id)).await
        {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, employee_id = auth.employee_id, "Failed to fetch stats records");
                return internal_error();
            }
        };

    HttpResponse::Ok().json(json!({
        "success": true,
        "stats": attendance_stats(&records),
        "start_date": query.start_date,
        "end_date": query.end_date
    }))
}

/// Admin: mark attendance directly
#[utoipa::path(
    post,
    path = "/api/admin/attendance",
    request_body = MarkAttendanceReq,
    responses(
        (status = 200, description = "Attendance marked successfully"),
        (status = 400, description = "Malformed date or status"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn mark_attendance(
    auth: AuthUser,
    req: HttpRequest,
    body: web::Json<MarkAttendanceReq>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    // Direct marks take the administrative statuses only; the timer kinds
    // belong to the employee's own endpoints.
    match EventKind::parse(&body.status) {
        Some(kind) if kind.is_administrative() => {}
        _ => {
            return validation_error(
                "Invalid status. Must be: present, absent, leave, or half-day",
            );
        }
    }

    let remarks = body.remarks.as_deref().unwrap_or("");

    let event = match attendance::record_event(
        pool.get_ref(),
        body.employee_id,
        &body.date,
        &body.status,
        remarks,
        &auth.email,
    )
    .await
    {
        Ok(event) => event,
        Err(e) => return record_error_response(e, body.employee_id),
    };

    employee_log::audit(
        pool.get_ref(),
        NewLogEntry {
            employee_id: Some(body.employee_id),
            action: LogAction::AttendanceMark,
            ip_address: client_ip(&req),
            user_agent: user_agent(&req),
            details: Some(json!({
                "date": body.date,
                "status": body.status,
                "remarks": remarks,
                "marked_by": auth.email
            })),
            outcome: LogOutcome::Success,
        },
    )
    .await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Attendance marked successfully",
        "attendance": event
    }))
}

/// Admin: mark attendance for many employees at once
#[utoipa::path(
    post,
    path = "/api/admin/attendance/bulk",
    request_body = BulkMarkReq,
    responses(
        (status = 200, description = "Bulk attendance marked successfully"),
        (status = 400, description = "Empty batch or invalid record"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn bulk_mark(
    auth: AuthUser,
    req: HttpRequest,
    body: web::Json<BulkMarkReq>,
    pool: web::Data<MySqlPool>,
) -> impl Responder {
    if body.records.is_empty() {
        return validation_error("Records array is required");
    }

    // Validate the whole batch before writing anything.
    for record in &body.records {
        match EventKind::parse(&record.status) {
            Some(kind) if kind.is_administrative() => {}
            _ => {
                return validation_error(
                    "Invalid status. Must be: present, absent, leave, or half-day",
                );
            }
        }
        if NaiveDate::parse_from_str(&record.date, "%Y-%m-%d").is_err() {
            return validation_error("Date must be in YYYY-MM-DD format");
        }
    }

    let mut marked = 0usize;
    for record in &body.records {
        let remarks = record.remarks.as_deref().unwrap_or("");
        if let Err(e) = attendance::record_event(
            pool.get_ref(),
            record.employee_id,
            &record.date,
            &record.status,
            remarks,
            &auth.email,
        )
        .await
        {
            return record_error_response(e, record.employee_id);
        }
        marked += 1;
    }

    employee_log::audit(
        pool.get_ref(),
        NewLogEntry {
            employee_id: None,
            action: LogAction::AttendanceMark,
            ip_address: client_ip(&req),
            user_agent: user_agent(&req),
            details: Some(json!({
                "record_count": marked,
                "marked_by": auth.email
            })),
            outcome: LogOutcome::Success,
        },
    )
    .await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Bulk attendance marked successfully",
        "result": { "marked": marked }
    }))
}

/// Admin: all events recorded for one date
#[utoipa::path(
    get,
    path = "/api/admin/attendance/date/{date}",
    params(("date" = String, Path, description = "Calendar date, YYYY-MM-DD")),
    responses(
        (status = 200, description = "Records for the date"),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn by_date(path: web::Path<String>, pool: web::Data<MySqlPool>) -> impl Responder {
    let raw = path.into_inner();
    let date = match parse_date_param("date", &raw) {
        Ok(date) => date,
        Err(resp) => return resp,
    };

    match attendance::events_by_date(pool.get_ref(), date).await {
        Ok(records) => HttpResponse::Ok().json(json!({
            "success": true,
            "date": raw,
            "records": records
        })),
        Err(e) => {
            error!(error = %e, date = %raw, "Failed to fetch attendance by date");
            internal_error()
        }
    }
}

/// Admin: all events recorded for one employee
#[utoipa::path(
    get,
    path = "/api/admin/attendance/employee/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Records for the employee"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn by_employee(path: web::Path<u64>, pool: web::Data<MySqlPool>) -> impl Responder {
    let employee_id = path.into_inner();

    match attendance::events_by_employee(pool.get_ref(), employee_id).await {
        Ok(records) => HttpResponse::Ok().json(json!({
            "success": true,
            "employee_id": employee_id,
            "records": records
        })),
        Err(e) => {
            error!(error = %e, employee_id, "Failed to fetch attendance by employee");
            internal_error()
        }
    }
}

/// Admin: attendance report over an optional date range
#[utoipa::path(
    get,
    path = "/api/admin/attendance/report",
    params(
        ("start_date" = Option<String>, Query, description = "Range start, YYYY-MM-DD"),
        ("end_date" = Option<String>, Query, description = "Range end, YYYY-MM-DD"),
        ("employee_id" = Option<u64>, Query, description = "Restrict to one employee")
    ),
    responses(
        (status = 200, description = "Matching records plus status counts"),
        (status = 400, description = "Malformed date"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn report(query: web::Query<ReportQuery>, pool: web::Data<MySqlPool>) -> impl Responder {
    let range = RangeQuery {
        start_date: query.start_date.clone(),
        end_date: query.end_date.clone(),
    };
    let (start, end) = match parse_range(&range) {
        Ok(range) => range,
        Err(resp) => return resp,
    };

    let records =
        match attendance::events_in_range(pool.get_ref(), start, end, query.employee_id).await {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Failed to fetch report records");
                return internal_error();
            }
        };

    HttpResponse::Ok().json(json!({
        "success": true,
        "stats": attendance_stats(&records),
        "records": records,
        "start_date": query.start_date,
        "end_date": query.end_date
    }))
}

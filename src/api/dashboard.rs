use crate::model::attendance::{self, EventKind};
use actix_web::{HttpResponse, Responder, web};
use chrono::Utc;
use serde_json::json;
use sqlx::MySqlPool;
use std::collections::HashSet;
use tracing::error;

/// Admin: today's headcount summary
#[utoipa::path(
    get,
    path = "/api/admin/dashboard/stats",
    responses(
        (status = 200, description = "Today's counts by status"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Dashboard"
)]
pub async fn stats(pool: web::Data<MySqlPool>) -> impl Responder {
    let today = Utc::now().date_naive();

    let total_employees = match sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM employees WHERE is_active = TRUE",
    )
    .fetch_one(pool.get_ref())
    .await
    {
        Ok(count) => count,
        Err(e) => {
            error!(error = %e, "Failed to count employees");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to fetch dashboard stats"
            }));
        }
    };

    let records = match attendance::events_by_date(pool.get_ref(), today).await {
        Ok(records) => records,
        Err(e) => {
            error!(error = %e, "Failed to fetch today's attendance");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to fetch dashboard stats"
            }));
        }
    };

    let stats = attendance::attendance_stats(&records);

    // An employee counts as marked once any row exists for today, whatever
    // its kind.
    let marked: HashSet<u64> = records.iter().map(|r| r.employee_id).collect();
    let not_marked = (total_employees as usize).saturating_sub(marked.len());

    let count = |kind: EventKind| {
        records
            .iter()
            .filter(|r| r.status == kind.to_string())
            .count()
    };

    HttpResponse::Ok().json(json!({
        "success": true,
        "date": today.format("%Y-%m-%d").to_string(),
        "stats": {
            "total_employees": total_employees,
            "present_today": stats.present,
            "absent_today": stats.absent,
            "on_leave_today": stats.leave,
            "half_day_today": stats.half_day,
            "checked_in_today": count(EventKind::CheckIn),
            "not_marked_today": not_marked
        }
    }))
}

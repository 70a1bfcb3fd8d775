use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Audited actions, matching the values stored in `employee_logs.action`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum LogAction {
    Login,
    Logout,
    CheckIn,
    CheckOut,
    LunchOut,
    LunchIn,
    AttendanceMark,
    ProfileView,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogOutcome {
    Success,
    Failure,
}

/// One append-only audit row. Never mutated or deleted.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeLog {
    #[schema(example = 1)]
    pub id: u64,

    /// NULL when the attempt could not be tied to an account, e.g. a login
    /// with an unknown email.
    #[schema(example = 7, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = "login")]
    pub action: String,

    #[schema(example = "203.0.113.9", nullable = true)]
    pub ip_address: Option<String>,

    #[schema(nullable = true)]
    pub user_agent: Option<String>,

    /// Free-form JSON payload, stored as text.
    #[schema(nullable = true)]
    pub details: Option<String>,

    #[schema(example = "success")]
    pub status: String,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,
}

/// One audit row pending insertion.
#[derive(Debug)]
pub struct NewLogEntry {
    pub employee_id: Option<u64>,
    pub action: LogAction,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
    pub details: Option<serde_json::Value>,
    pub outcome: LogOutcome,
}

pub async fn log_action(pool: &MySqlPool, entry: NewLogEntry) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO employee_logs (employee_id, action, ip_address, user_agent, details, status)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(entry.employee_id)
    .bind(entry.action.to_string())
    .bind(entry.ip_address)
    .bind(entry.user_agent)
    .bind(entry.details.map(|d| d.to_string()))
    .bind(entry.outcome.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Writes an audit entry and swallows the error: a failed audit write must
/// never abort the operation being audited.
pub async fn audit(pool: &MySqlPool, entry: NewLogEntry) {
    if let Err(e) = log_action(pool, entry).await {
        tracing::error!(error = %e, "Failed to write audit log entry");
    }
}

const LOG_COLUMNS: &str =
    "id, employee_id, action, ip_address, user_agent, details, status, created_at";

/// Most recent logs, optionally filtered by action and/or employee.
pub async fn recent_logs(
    pool: &MySqlPool,
    action: Option<&str>,
    employee_id: Option<u64>,
    limit: u32,
) -> sqlx::Result<Vec<EmployeeLog>> {
    let mut conditions = Vec::new();
    if action.is_some() {
        conditions.push("action = ?");
    }
    if employee_id.is_some() {
        conditions.push("employee_id = ?");
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT {} FROM employee_logs {} ORDER BY created_at DESC, id DESC LIMIT ?",
        LOG_COLUMNS, where_clause
    );

    let mut query = sqlx::query_as::<_, EmployeeLog>(&sql);
    if let Some(action) = action {
        query = query.bind(action.to_string());
    }
    if let Some(id) = employee_id {
        query = query.bind(id);
    }

    query.bind(limit).fetch_all(pool).await
}

pub async fn logs_for_employee(
    pool: &MySqlPool,
    employee_id: u64,
    limit: u32,
) -> sqlx::Result<Vec<EmployeeLog>> {
    recent_logs(pool, None, Some(employee_id), limit).await
}

/// Login and logout history for one employee.
pub async fn login_logs(
    pool: &MySqlPool,
    employee_id: u64,
    limit: u32,
) -> sqlx::Result<Vec<EmployeeLog>> {
    let sql = format!(
        "SELECT {} FROM employee_logs \
         WHERE employee_id = ? AND action IN ('login', 'logout') \
         ORDER BY created_at DESC, id DESC LIMIT ?",
        LOG_COLUMNS
    );

    sqlx::query_as::<_, EmployeeLog>(&sql)
        .bind(employee_id)
        .bind(limit)
        .fetch_all(pool)
        .await
}

/// Attendance-related audit entries recorded on one calendar date, oldest
/// first.
pub async fn attendance_logs_for_date(
    pool: &MySqlPool,
    date: NaiveDate,
) -> sqlx::Result<Vec<EmployeeLog>> {
    let sql = format!(
        "SELECT {} FROM employee_logs \
         WHERE action IN ('check-in', 'check-out', 'lunch-out', 'lunch-in', 'attendance-mark') \
         AND DATE(created_at) = ? \
         ORDER BY created_at ASC, id ASC",
        LOG_COLUMNS
    );

    sqlx::query_as::<_, EmployeeLog>(&sql)
        .bind(date)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_round_trip() {
        assert_eq!(LogAction::Login.to_string(), "login");
        assert_eq!(LogAction::AttendanceMark.to_string(), "attendance-mark");
        assert_eq!("check-in".parse::<LogAction>(), Ok(LogAction::CheckIn));
        assert!("delete-everything".parse::<LogAction>().is_err());
    }

    #[test]
    fn outcome_tags_are_lowercase() {
        assert_eq!(LogOutcome::Success.to_string(), "success");
        assert_eq!(LogOutcome::Failure.to_string(), "failure");
    }
}

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "name": "John Doe",
        "email": "john.doe@company.com",
        "role_id": 2,
        "department": "Engineering",
        "employee_code": "EMP-001",
        "is_active": true,
        "created_at": "2024-01-01T09:00:00",
        "updated_at": "2024-01-01T09:00:00"
    })
)]
pub struct Employee {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "John Doe")]
    pub name: String,

    /// Stored lowercase; unique across all rows, soft-deleted included.
    #[schema(example = "john.doe@company.com")]
    pub email: String,

    /// Argon2 PHC string; NULL for accounts that cannot log in.
    #[serde(skip_serializing)]
    #[schema(value_type = Option<String>, write_only)]
    pub password: Option<String>,

    #[schema(example = 2)]
    pub role_id: u8,

    #[schema(example = "Engineering")]
    pub department: String,

    #[schema(example = "EMP-001", nullable = true)]
    pub employee_code: Option<String>,

    #[schema(example = true)]
    pub is_active: bool,

    #[schema(value_type = String, format = "date-time")]
    pub created_at: NaiveDateTime,

    #[schema(value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

const EMPLOYEE_COLUMNS: &str =
    "id, name, email, password, role_id, department, employee_code, is_active, created_at, updated_at";

pub async fn find_by_email(pool: &MySqlPool, email: &str) -> sqlx::Result<Option<Employee>> {
    let sql = format!("SELECT {} FROM employees WHERE email = ?", EMPLOYEE_COLUMNS);

    sqlx::query_as::<_, Employee>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_id(pool: &MySqlPool, id: u64) -> sqlx::Result<Option<Employee>> {
    let sql = format!("SELECT {} FROM employees WHERE id = ?", EMPLOYEE_COLUMNS);

    sqlx::query_as::<_, Employee>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Active employees, newest first.
pub async fn list_active(pool: &MySqlPool) -> sqlx::Result<Vec<Employee>> {
    let sql = format!(
        "SELECT {} FROM employees WHERE is_active = TRUE ORDER BY id DESC",
        EMPLOYEE_COLUMNS
    );

    sqlx::query_as::<_, Employee>(&sql).fetch_all(pool).await
}

use crate::{
    auth::password::hash_password,
    model::{employee, role::Role},
    utils::{
        db_utils::{build_update_sql, execute_update},
        email_cache, email_filter,
    },
};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::{Value, json};
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployee {
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com", format = "email")]
    pub email: String,
    #[schema(example = "Engineering")]
    pub department: Option<String>,
    #[schema(example = "EMP-007")]
    pub employee_code: Option<String>,
    /// "admin" or "employee"; anything else is treated as employee.
    #[schema(example = "employee")]
    pub role: Option<String>,
    /// Optional: accounts without one cannot log in.
    #[schema(write_only)]
    pub password: Option<String>,
}

/// Columns an admin update may touch. Everything else in the payload is a
/// validation error, not a silent skip.
const UPDATABLE_COLUMNS: &[&str] = &[
    "name",
    "email",
    "department",
    "employee_code",
    "is_active",
    "role_id",
];

/// true  => email AVAILABLE
/// false => email TAKEN
pub async fn is_email_available(email: &str, pool: &MySqlPool) -> bool {
    let email = email.to_lowercase();

    // Cuckoo filter — fast negative: a definite miss means available.
    if !email_filter::might_exist(&email) {
        return true;
    }

    // Moka cache — fast positive.
    if email_cache::is_taken(&email).await {
        return false;
    }

    // Database fallback
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM employees WHERE email = ? LIMIT 1)",
    )
    .bind(&email)
    .fetch_one(pool)
    .await
    .unwrap_or(true); // fail-safe

    !exists
}

/// Admin: create an employee
#[utoipa::path(
    post,
    path = "/api/admin/employees",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee added successfully"),
        (status = 400, description = "Missing fields or duplicate email"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_employee(
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateEmployee>,
) -> impl Responder {
    let name = payload.name.trim();
    if name.is_empty() || payload.email.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Name and email are required"
        }));
    }

    let email = payload.email.trim().to_lowercase();

    if !is_email_available(&email, pool.get_ref()).await {
        return HttpResponse::BadRequest().json(json!({
            "success": false,
            "message": "Email already exists"
        }));
    }

    let hashed = match payload.password.as_deref() {
        Some(password) if !password.is_empty() => match hash_password(password) {
            Ok(hashed) => Some(hashed),
            Err(e) => {
                error!(error = %e, "Failed to hash password for new employee");
                return HttpResponse::InternalServerError().json(json!({
                    "success": false,
                    "message": "Internal server error"
                }));
            }
        },
        _ => None,
    };

    let role_id = Role::id_from_label(payload.role.as_deref().unwrap_or("employee"));
    let department = payload
        .department
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .unwrap_or("General");

    let result = sqlx::query(
        r#"
        INSERT INTO employees (name, email, password, role_id, department, employee_code)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(name)
    .bind(&email)
    .bind(&hashed)
    .bind(role_id)
    .bind(department)
    .bind(&payload.employee_code)
    .execute(pool.get_ref())
    .await;

    let id = match result {
        Ok(result) => result.last_insert_id(),
        Err(e) => {
            // Duplicate email or employee code raced past the precheck.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return HttpResponse::BadRequest().json(json!({
                        "success": false,
                        "message": "Email or Employee ID already exists"
                    }));
                }
            }

            error!(error = %e, "Failed to create employee");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Internal server error"
            }));
        }
    };

    email_filter::insert(&email);
    email_cache::mark_taken(&email).await;

    let created = match employee::find_by_id(pool.get_ref(), id).await {
        Ok(Some(employee)) => employee,
        _ => {
            // The row exists; only the read-back failed.
            return HttpResponse::Created().json(json!({
                "success": true,
                "message": "Employee added successfully"
            }));
        }
    };

    HttpResponse::Created().json(json!({
        "success": true,
        "message": "Employee added successfully",
        "employee": created
    }))
}

/// Admin: list active employees
#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, description = "Active employees, newest first"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(pool: web::Data<MySqlPool>) -> impl Responder {
    match employee::list_active(pool.get_ref()).await {
        Ok(employees) => HttpResponse::Ok().json(json!({
            "success": true,
            "employees": employees
        })),
        Err(e) => {
            error!(error = %e, "Failed to fetch employees");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to fetch employees"
            }))
        }
    }
}

/// Admin: get one employee
#[utoipa::path(
    get,
    path = "/api/admin/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee found"),
        (status = 404, description = "Employee not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn get_employee(pool: web::Data<MySqlPool>, path: web::Path<u64>) -> impl Responder {
    let employee_id = path.into_inner();

    match employee::find_by_id(pool.get_ref(), employee_id).await {
        Ok(Some(employee)) => HttpResponse::Ok().json(json!({
            "success": true,
            "employee": employee
        })),
        Ok(None) => HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Employee not found"
        })),
        Err(e) => {
            error!(error = %e, employee_id, "Failed to fetch employee");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to fetch employee"
            }))
        }
    }
}

/// Admin: partial update of one employee
#[utoipa::path(
    put,
    path = "/api/admin/employees/{id}",
    responses(
        (status = 200, description = "Employee updated successfully"),
        (status = 400, description = "Empty payload or unknown field"),
        (status = 404, description = "Employee not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn update_employee(
    pool: web::Data<MySqlPool>,
    path: web::Path<i64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();

    // Email goes into the store lowercase, same as on create.
    let mut payload = body.into_inner();
    if let Some(obj) = payload.as_object_mut() {
        let normalized = obj
            .get("email")
            .and_then(Value::as_str)
            .map(|email| email.trim().to_lowercase());
        if let Some(email) = normalized {
            obj.insert("email".to_string(), Value::String(email));
        }
    }

    let update =
        build_update_sql("employees", &payload, UPDATABLE_COLUMNS, "id", employee_id)?;

    let affected = execute_update(pool.get_ref(), update).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to update employee");
        actix_web::error::ErrorInternalServerError("Internal server error")
    })?;

    if affected == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "success": false,
            "message": "Employee not found"
        })));
    }

    if let Some(email) = payload.get("email").and_then(Value::as_str) {
        email_filter::insert(email);
        email_cache::mark_taken(email).await;
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Employee updated successfully"
    })))
}

/// Admin: soft-delete one employee
#[utoipa::path(
    delete,
    path = "/api/admin/employees/{id}",
    params(("id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted successfully"),
        (status = 404, description = "Employee not found"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn delete_employee(pool: web::Data<MySqlPool>, path: web::Path<u64>) -> impl Responder {
    let employee_id = path.into_inner();

    // Rows are never removed; the flag keeps the email reserved and the
    // attendance history intact.
    let result = sqlx::query("UPDATE employees SET is_active = FALSE WHERE id = ?")
        .bind(employee_id)
        .execute(pool.get_ref())
        .await;

    match result {
        Ok(res) => {
            if res.rows_affected() == 0 {
                return HttpResponse::NotFound().json(json!({
                    "success": false,
                    "message": "Employee not found"
                }));
            }

            HttpResponse::Ok().json(json!({
                "success": true,
                "message": "Employee deleted successfully"
            }))
        }
        Err(e) => {
            error!(error = %e, employee_id, "Failed to delete employee");
            HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Internal server error"
            }))
        }
    }
}

use actix_web::error::ErrorBadRequest;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

/// SQL bindable value enum
#[derive(Debug, PartialEq)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// SQL update container
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

/// Builds a dynamic UPDATE from a partial JSON payload. Only columns in
/// `allowed` may appear; an unknown key is a validation error naming the
/// field, never a silent skip.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    allowed: &[&str],
    id_column: &str,
    id_value: i64,
) -> Result<SqlUpdate, actix_web::Error> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ErrorBadRequest("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ErrorBadRequest("No fields provided for update"));
    }

    for key in obj.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(ErrorBadRequest(format!("Unknown field: {}", key)));
        }
    }

    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let sql = format!("UPDATE {} SET {} WHERE {} = ?", table, set_clause, id_column);

    let mut values = Vec::with_capacity(obj.len() + 1);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ErrorBadRequest("Unsupported JSON value type")),
        }
    }

    // WHERE id = ?
    values.push(SqlValue::I64(id_value));

    Ok(SqlUpdate { sql, values })
}

/// Execute the update
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const ALLOWED: &[&str] = &["name", "email", "is_active"];

    #[test]
    fn builds_set_clause_and_bindings() {
        let payload = json!({ "name": "Jane", "is_active": false });
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 7).unwrap();

        assert_eq!(
            update.sql,
            "UPDATE employees SET is_active = ?, name = ? WHERE id = ?"
        );
        assert_eq!(
            update.values,
            vec![
                SqlValue::Bool(false),
                SqlValue::String("Jane".to_string()),
                SqlValue::I64(7),
            ]
        );
    }

    #[test]
    fn rejects_unknown_column() {
        let payload = json!({ "password": "sneaky" });
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 7).is_err());
    }

    #[test]
    fn rejects_empty_payload() {
        let payload = json!({});
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 7).is_err());
    }

    #[test]
    fn rejects_non_object_payload() {
        let payload = json!(["name"]);
        assert!(build_update_sql("employees", &payload, ALLOWED, "id", 7).is_err());
    }

    #[test]
    fn date_strings_bind_as_dates() {
        let payload = json!({ "name": "2024-01-10" });
        let update = build_update_sql("employees", &payload, ALLOWED, "id", 1).unwrap();
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}

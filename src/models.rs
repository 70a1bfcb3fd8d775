use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::model::{employee::Employee, role::Role};

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "jane@company.com", format = "email")]
    pub email: Option<String>,
    /// Older clients send the email in this field.
    pub username: Option<String>,
    #[serde(default)]
    pub password: String,
}

impl LoginReq {
    /// The login field, whichever key the client used, normalized lowercase.
    pub fn login_email(&self) -> Option<String> {
        self.email
            .as_deref()
            .or(self.username.as_deref())
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Employee id.
    pub sub: u64,
    pub email: String,
    /// Role id, see `model::role::Role`.
    pub role: u8,
    pub exp: usize,
    pub jti: String,
}

/// The employee shape returned to clients. Never carries the password hash.
#[derive(Debug, Serialize, ToSchema)]
pub struct UserInfo {
    #[schema(example = 7)]
    pub id: u64,
    #[schema(example = "Jane Doe")]
    pub name: String,
    #[schema(example = "jane@company.com")]
    pub email: String,
    #[schema(example = "employee")]
    pub role: String,
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = "EMP-007", nullable = true)]
    pub employee_code: Option<String>,
}

impl From<&Employee> for UserInfo {
    fn from(e: &Employee) -> Self {
        UserInfo {
            id: e.id,
            name: e.name.clone(),
            email: e.email.clone(),
            role: Role::from_id(e.role_id)
                .unwrap_or(Role::Employee)
                .as_str()
                .to_string(),
            department: e.department.clone(),
            employee_code: e.employee_code.clone(),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub success: bool,
    #[schema(example = "Login successful")]
    pub message: String,
    pub token: String,
    pub user: UserInfo,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_email_prefers_email_over_username() {
        let req = LoginReq {
            email: Some("A@Co.com".to_string()),
            username: Some("other@co.com".to_string()),
            password: "x".to_string(),
        };
        assert_eq!(req.login_email().as_deref(), Some("a@co.com"));
    }

    #[test]
    fn login_email_falls_back_to_username() {
        let req = LoginReq {
            email: None,
            username: Some("  Legacy@Co.com ".to_string()),
            password: "x".to_string(),
        };
        assert_eq!(req.login_email().as_deref(), Some("legacy@co.com"));
    }

    #[test]
    fn empty_login_field_is_none() {
        let req = LoginReq {
            email: Some("   ".to_string()),
            username: None,
            password: "x".to_string(),
        };
        assert_eq!(req.login_email(), None);
    }
}

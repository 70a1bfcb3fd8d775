use crate::auth::middleware::GENERIC_AUTH_MESSAGE;
use crate::model::role::Role;
use actix_web::{FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized};
use futures::future::{Ready, ready};

/// The validated identity the auth middleware attaches to the request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub employee_id: u64,
    pub email: String,
    pub role: Role,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Only present when the route sits behind auth_middleware; a route
        // mounted outside the gate fails here with the same generic 401.
        match req.extensions().get::<AuthUser>() {
            Some(user) => ready(Ok(user.clone())),
            None => ready(Err(ErrorUnauthorized(GENERIC_AUTH_MESSAGE))),
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn require_admin(&self) -> actix_web::Result<()> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(actix_web::error::ErrorForbidden(
                "Access denied. Admin privileges required.",
            ))
        }
    }
}

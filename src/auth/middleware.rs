use crate::auth::auth::AuthUser;
use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::model::role::Role;
use actix_web::middleware::Next;
use actix_web::{
    Error, HttpMessage, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    web::Data,
};
use serde_json::json;

/// The one message every authentication failure surfaces. Missing header,
/// malformed token, bad signature, expired token and unknown role are all
/// indistinguishable to the caller.
pub const GENERIC_AUTH_MESSAGE: &str = "Invalid username or password";

pub fn unauthorized_response() -> HttpResponse {
    HttpResponse::Unauthorized().json(json!({
        "success": false,
        "message": GENERIC_AUTH_MESSAGE
    }))
}

pub async fn auth_middleware(
    mut req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let config = req
        .app_data::<Data<Config>>()
        .ok_or_else(|| actix_web::error::ErrorInternalServerError("App config missing"))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let claims = match token.and_then(|t| verify_token(t, &config.jwt_secret)) {
        Some(c) => c,
        None => {
            let resp = unauthorized_response();
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    let role = match Role::from_id(claims.role) {
        Some(role) => role,
        None => {
            let resp = unauthorized_response();
            return Ok(req.into_response(resp.map_into_boxed_body()));
        }
    };

    let auth_user = AuthUser {
        employee_id: claims.sub,
        email: claims.email,
        role,
    };

    req.extensions_mut().insert(auth_user);

    next.call(req).await
}

/// Second gate layer. The caller is already authenticated here, so this
/// failure is allowed to be specific.
pub async fn admin_guard(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    let is_admin = {
        let extensions = req.extensions();
        extensions
            .get::<AuthUser>()
            .map(|u| u.is_admin())
            .unwrap_or(false)
    };

    if !is_admin {
        let resp = HttpResponse::Forbidden().json(json!({
            "success": false,
            "message": "Access denied. Admin privileges required."
        }));
        return Ok(req.into_response(resp.map_into_boxed_body()));
    }

    next.call(req).await
}

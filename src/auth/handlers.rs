use crate::{
    auth::{auth::AuthUser, jwt::issue_token, middleware::unauthorized_response, password::verify_password},
    config::Config,
    model::{
        employee,
        employee_log::{self, LogAction, LogOutcome, NewLogEntry},
        role::Role,
    },
    models::{LoginReq, LoginResponse, UserInfo},
};
use actix_web::{HttpRequest, HttpResponse, Responder, http::header, web};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

pub fn client_ip(req: &HttpRequest) -> Option<String> {
    // Honors Forwarded / X-Forwarded-For before falling back to the peer.
    req.connection_info()
        .realip_remote_addr()
        .map(|s| s.to_string())
}

pub fn user_agent(req: &HttpRequest) -> Option<String> {
    req.headers()
        .get(header::USER_AGENT)
        .and_then(|h| h.to_str().ok())
        .map(|s| s.to_string())
}

fn login_audit(
    req: &HttpRequest,
    employee_id: Option<u64>,
    details: serde_json::Value,
    outcome: LogOutcome,
) -> NewLogEntry {
    NewLogEntry {
        employee_id,
        action: LogAction::Login,
        ip_address: client_ip(req),
        user_agent: user_agent(req),
        details: Some(details),
        outcome,
    }
}

#[instrument(name = "auth_login", skip_all)]
pub async fn login(
    body: web::Json<LoginReq>,
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // Missing field and missing password get the same generic answer as a
    // bad password would.
    let email = match body.login_email() {
        Some(email) if !body.password.is_empty() => email,
        _ => {
            info!("Login rejected: missing credentials");
            return unauthorized_response();
        }
    };

    debug!("Fetching employee by email");

    let db_user = match employee::find_by_email(pool.get_ref(), &email).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            info!("Login failed: unknown email");
            employee_log::audit(
                pool.get_ref(),
                login_audit(&req, None, json!({ "email": email }), LogOutcome::Failure),
            )
            .await;
            return unauthorized_response();
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching employee");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Internal server error"
            }));
        }
    };

    let password_ok = db_user
        .password
        .as_deref()
        .map(|hash| verify_password(&body.password, hash))
        .unwrap_or(false);

    if !password_ok {
        info!(employee_id = db_user.id, "Login failed: password mismatch");
        employee_log::audit(
            pool.get_ref(),
            login_audit(
                &req,
                Some(db_user.id),
                json!({ "email": db_user.email }),
                LogOutcome::Failure,
            ),
        )
        .await;
        return unauthorized_response();
    }

    if !db_user.is_active {
        info!(employee_id = db_user.id, "Login failed: inactive account");
        employee_log::audit(
            pool.get_ref(),
            login_audit(
                &req,
                Some(db_user.id),
                json!({ "email": db_user.email, "reason": "inactive" }),
                LogOutcome::Failure,
            ),
        )
        .await;
        return unauthorized_response();
    }

    let token = issue_token(
        db_user.id,
        &db_user.email,
        db_user.role_id,
        &config.jwt_secret,
        config.token_ttl,
    );

    let role = Role::from_id(db_user.role_id)
        .unwrap_or(Role::Employee)
        .as_str();

    employee_log::audit(
        pool.get_ref(),
        login_audit(
            &req,
            Some(db_user.id),
            json!({ "email": db_user.email, "role": role }),
            LogOutcome::Success,
        ),
    )
    .await;

    info!(employee_id = db_user.id, "Login successful");

    HttpResponse::Ok().json(LoginResponse {
        success: true,
        message: "Login successful".to_string(),
        token,
        user: UserInfo::from(&db_user),
    })
}

/// Token discard happens client-side; this endpoint exists to audit it.
pub async fn logout(auth: AuthUser, req: HttpRequest, pool: web::Data<MySqlPool>) -> impl Responder {
    employee_log::audit(
        pool.get_ref(),
        NewLogEntry {
            employee_id: Some(auth.employee_id),
            action: LogAction::Logout,
            ip_address: client_ip(&req),
            user_agent: user_agent(&req),
            details: Some(json!({ "email": auth.email })),
            outcome: LogOutcome::Success,
        },
    )
    .await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Logout successful"
    }))
}

/// Re-checks the token's identity against the store: a soft-deleted account
/// stops verifying even while its token is formally unexpired.
pub async fn verify(auth: AuthUser, pool: web::Data<MySqlPool>) -> impl Responder {
    match employee::find_by_id(pool.get_ref(), auth.employee_id).await {
        Ok(Some(user)) if user.is_active => HttpResponse::Ok().json(json!({
            "success": true,
            "user": UserInfo::from(&user)
        })),
        Ok(_) => unauthorized_response(),
        Err(e) => {
            error!(error = %e, "Database error while verifying identity");
            unauthorized_response()
        }
    }
}

pub async fn me(auth: AuthUser, req: HttpRequest, pool: web::Data<MySqlPool>) -> impl Responder {
    let user = match employee::find_by_id(pool.get_ref(), auth.employee_id).await {
        Ok(Some(user)) => user,
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({
                "success": false,
                "message": "User not found"
            }));
        }
        Err(e) => {
            error!(error = %e, "Failed to fetch current user");
            return HttpResponse::InternalServerError().json(json!({
                "success": false,
                "message": "Failed to fetch user data"
            }));
        }
    };

    employee_log::audit(
        pool.get_ref(),
        NewLogEntry {
            employee_id: Some(auth.employee_id),
            action: LogAction::ProfileView,
            ip_address: client_ip(&req),
            user_agent: user_agent(&req),
            details: None,
            outcome: LogOutcome::Success,
        },
    )
    .await;

    HttpResponse::Ok().json(json!({
        "success": true,
        "user": UserInfo::from(&user)
    }))
}

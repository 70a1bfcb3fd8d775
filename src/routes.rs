use crate::{
    api::{attendance, dashboard, employee, logs},
    auth::{
        handlers,
        middleware::{admin_guard, auth_middleware},
    },
    config::Config,
};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};
use std::sync::Arc;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    // Helper to build per-route limiter
    fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
        let per_ms = if requests_per_min == 0 {
            1
        } else {
            60_000 / requests_per_min as u64
        };
        let cfg = GovernorConfigBuilder::default()
            .per_millisecond(per_ms)
            .burst_size(requests_per_min)
            .key_extractor(PeerIpKeyExtractor)
            .finish()
            .unwrap();
        Governor::new(&cfg)
    }

    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public + session routes
    cfg.service(
        web::scope("/auth")
            .service(
                web::resource("/login")
                    .wrap(login_limiter.clone())
                    .route(web::post().to(handlers::login)),
            )
            .service(
                web::scope("")
                    .wrap(from_fn(auth_middleware))
                    .service(web::resource("/logout").route(web::post().to(handlers::logout)))
                    .service(web::resource("/verify").route(web::get().to(handlers::verify)))
                    .service(web::resource("/me").route(web::get().to(handlers::me))),
            ),
    );

    // Protected routes
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/employee")
                    .service(
                        web::resource("/check-in").route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/lunch-out").route(web::post().to(attendance::lunch_out)),
                    )
                    .service(
                        web::resource("/lunch-in").route(web::post().to(attendance::lunch_in)),
                    )
                    .service(
                        web::resource("/check-out").route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/today-status")
                            .route(web::get().to(attendance::today_status)),
                    )
                    .service(
                        web::resource("/my-attendance")
                            .route(web::get().to(attendance::my_attendance)),
                    )
                    .service(web::resource("/my-stats").route(web::get().to(attendance::my_stats)))
                    .service(web::resource("/my-logs").route(web::get().to(logs::my_logs))),
            )
            .service(
                web::scope("/admin")
                    .wrap(from_fn(admin_guard))
                    .service(
                        web::scope("/employees")
                            .service(
                                web::resource("")
                                    .route(web::get().to(employee::list_employees))
                                    .route(web::post().to(employee::create_employee)),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(employee::get_employee))
                                    .route(web::put().to(employee::update_employee))
                                    .route(web::delete().to(employee::delete_employee)),
                            ),
                    )
                    .service(
                        web::scope("/attendance")
                            .service(
                                web::resource("")
                                    .route(web::post().to(attendance::mark_attendance)),
                            )
                            .service(
                                web::resource("/bulk").route(web::post().to(attendance::bulk_mark)),
                            )
                            .service(
                                web::resource("/report").route(web::get().to(attendance::report)),
                            )
                            .service(
                                web::resource("/date/{date}")
                                    .route(web::get().to(attendance::by_date)),
                            )
                            .service(
                                web::resource("/employee/{id}")
                                    .route(web::get().to(attendance::by_employee)),
                            ),
                    )
                    .service(
                        web::resource("/dashboard/stats").route(web::get().to(dashboard::stats)),
                    )
                    .service(
                        web::scope("/logs")
                            .service(web::resource("").route(web::get().to(logs::list_logs)))
                            .service(
                                web::resource("/login/{employee_id}")
                                    .route(web::get().to(logs::login_logs)),
                            )
                            .service(
                                web::resource("/attendance/{date}")
                                    .route(web::get().to(logs::attendance_logs)),
                            ),
                    ),
            ),
    );
}

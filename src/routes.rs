use actix_governor::{Governor, GovernorConfig, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware};
use actix_governor::GovernorConfigBuilder;
use actix_web::web;

use crate::api::{employee, leave_request, summary};

pub type RateLimit = GovernorConfig<PeerIpKeyExtractor, NoOpMiddleware>;

/// Per-peer limiter allowing `requests_per_min` with an equal burst.
///
/// Build it once and share it between workers so the quota is process-wide.
pub fn build_limiter(requests_per_min: u32) -> RateLimit {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / u64::from(requests_per_min)).max(1);

    GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default()
}

pub fn configure(cfg: &mut web::ServiceConfig, api_prefix: &str, limiter: &RateLimit) {
    cfg.service(
        web::scope(api_prefix)
            .wrap(Governor::new(limiter))
            .service(
                web::scope("/employee")
                    // /employee
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employee/{id}
                    .service(web::resource("/{id}").route(web::get().to(employee::get_employee)))
                    .service(
                        web::resource("/{id}/leave-status")
                            .route(web::get().to(employee::current_leave_status)),
                    )
                    .service(
                        web::resource("/{id}/annual-days").route(web::get().to(employee::annual_days)),
                    )
                    .service(
                        web::resource("/{id}/balance-audit")
                            .route(web::get().to(employee::balance_audit)),
                    ),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(
                        web::resource("")
                            .route(web::get().to(leave_request::leave_list))
                            .route(web::post().to(leave_request::submit_leave)),
                    )
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::get().to(leave_request::get_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve")
                            .route(web::put().to(leave_request::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject")
                            .route(web::put().to(leave_request::reject_leave)),
                    ),
            )
            .service(
                web::resource("/department/summary")
                    .route(web::get().to(summary::department_summary)),
            )
            .service(
                web::resource("/balance/reset").route(web::post().to(summary::reset_all_balances)),
            ),
    );
}

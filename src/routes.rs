use crate::{
    api::{self, admin, attendance, location},
    auth::middleware::identity_middleware,
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

    let write_limiter = Arc::new(build_limiter(config.rate_write_per_min));
    let protected_limiter = Arc::new(build_limiter(config.rate_protected_per_min));

    // Public routes
    cfg.service(
        web::resource(format!("{}/health", config.api_prefix)).route(web::get().to(api::health)),
    );

    // Protected routes: identity required, rate limited
    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(identity_middleware))
            .wrap(protected_limiter)
            .service(
                web::scope("/attendance")
                    .service(
                        web::resource("/checkin")
                            .wrap(write_limiter.clone())
                            .route(web::post().to(attendance::check_in)),
                    )
                    .service(
                        web::resource("/checkout")
                            .wrap(write_limiter.clone())
                            .route(web::post().to(attendance::check_out)),
                    )
                    .service(
                        web::resource("/status").route(web::get().to(attendance::check_status)),
                    )
                    .service(
                        web::resource("/history").route(web::get().to(attendance::get_history)),
                    )
                    .service(
                        web::resource("/summary").route(web::get().to(attendance::get_summary)),
                    ),
            )
            .service(web::resource("/locations").route(web::get().to(location::list_locations)))
            .service(
                web::scope("/admin")
                    .service(web::resource("/users").route(web::get().to(admin::list_users)))
                    .service(
                        web::resource("/users/{user_id}")
                            .route(web::delete().to(admin::delete_user)),
                    )
                    .service(
                        web::resource("/attendance").route(web::get().to(admin::all_attendance)),
                    )
                    // export is registered ahead of the {user_id} routes so
                    // the literal segment wins the match
                    .service(
                        web::resource("/attendance/export/{user_id}")
                            .route(web::get().to(admin::export_attendance)),
                    )
                    .service(
                        web::resource("/attendance/{user_id}")
                            .route(web::get().to(admin::user_attendance)),
                    )
                    .service(
                        web::resource("/attendance/{user_id}/summary")
                            .route(web::get().to(admin::user_summary)),
                    ),
            ),
    );
}

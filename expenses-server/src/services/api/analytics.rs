use actix_web::web::*;

use crate::handlers::analytics;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/analytics")
            .service(resource("/trends").route(get().to(analytics::trends)))
            .service(resource("/anomalies").route(get().to(analytics::anomalies)))
            .service(resource("/insights").route(post().to(analytics::insights))),
    );
}

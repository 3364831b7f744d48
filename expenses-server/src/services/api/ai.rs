use actix_web::web::*;

use crate::handlers::ai;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/ai")
            .service(resource("/predict").route(get().to(ai::predict)))
            .service(resource("/insights").route(get().to(ai::insights)))
            .service(resource("/categorize").route(post().to(ai::categorize)))
            .service(resource("/chat").route(post().to(ai::chat))),
    );
}

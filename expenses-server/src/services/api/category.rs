use actix_web::web::*;

use crate::handlers::category;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/categories").service(resource("/suggest").route(post().to(category::suggest))),
    );
}

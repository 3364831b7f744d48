use actix_web::web::*;

use crate::handlers::budget;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/budgets")
            .service(
                resource("")
                    .route(get().to(budget::get))
                    .route(post().to(budget::create)),
            )
            .service(resource("/status").route(get().to(budget::status)))
            .service(resource("/summary").route(get().to(budget::summary)))
            .service(
                resource("/{id}")
                    .route(put().to(budget::update))
                    .route(delete().to(budget::delete)),
            ),
    );
}

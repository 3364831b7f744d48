use actix_web::web::*;

use crate::handlers::expense;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/expenses")
            .service(
                resource("")
                    .route(get().to(expense::get_all))
                    .route(post().to(expense::create)),
            )
            .service(resource("/stats/summary").route(get().to(expense::stats)))
            .service(
                resource("/{id}")
                    .route(get().to(expense::get))
                    .route(put().to(expense::update))
                    .route(delete().to(expense::delete)),
            ),
    );
}

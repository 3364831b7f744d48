use expenses_common::db::BudgetStore;
use expenses_common::messages::StoreHealth;

use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;

use crate::env;

#[derive(Deserialize)]
pub struct HealthKeyQuery {
    pub key: Option<String>,
}

pub async fn heartbeat() -> impl Responder {
    HttpResponse::Ok()
}

pub async fn health(
    budget_store: web::Data<dyn BudgetStore>,
    query: web::Query<HealthKeyQuery>,
) -> impl Responder {
    if !is_health_key_correct(query.key.as_deref()) {
        return HttpResponse::Unauthorized().finish();
    }

    let state = budget_store.backend_state();
    HttpResponse::Ok().json(StoreHealth {
        backend: String::from(state.backend),
        connections: state.connections,
        idle_connections: state.idle_connections,
    })
}

#[inline]
fn is_health_key_correct(key: Option<&str>) -> bool {
    let Some(key) = key else {
        return false;
    };

    let correct_key = env::CONF.health_endpoint_key.as_bytes();
    let key = key.as_bytes();

    if correct_key.len() != key.len() || key.is_empty() {
        return false;
    }

    // Bitwise comparison so the time taken doesn't depend on where the keys differ
    let keys_dont_match = correct_key
        .iter()
        .zip(key)
        .fold(0u8, |acc, (a, b)| acc | (a ^ b));

    keys_dont_match == 0
}

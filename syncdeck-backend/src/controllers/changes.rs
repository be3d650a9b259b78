use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::middleware::rate_limit::{clamp_query_limit, enforce, RateClass};
use crate::models::NewDataChange;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct ChangesQuery {
    /// Taken as a raw string so junk input clamps instead of failing.
    limit: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/data-changes")
            .route("", web::get().to(list_changes))
            .route("", web::post().to(create_change))
            .route("/database/{databaseId}", web::get().to(list_changes_by_database)),
    );
}

async fn list_changes(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ChangesQuery>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    let limit = clamp_query_limit(query.limit.as_deref());
    match state.store.list_changes(Some(limit)) {
        Ok(changes) => HttpResponse::Ok().json(changes),
        Err(e) => {
            log::error!("failed to list data changes: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch data changes"
            }))
        }
    }
}

async fn list_changes_by_database(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    match state.store.list_changes_by_database(&path) {
        Ok(changes) => HttpResponse::Ok().json(changes),
        Err(e) => {
            log::error!("failed to list data changes for {}: {}", path, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch data changes"
            }))
        }
    }
}

async fn create_change(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewDataChange>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.create_change(body.into_inner()) {
        Ok(change) => HttpResponse::Created().json(change),
        Err(e) => {
            log::error!("failed to record data change: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Invalid data change"
            }))
        }
    }
}

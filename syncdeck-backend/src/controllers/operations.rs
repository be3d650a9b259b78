use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::middleware::rate_limit::{enforce, RateClass};
use crate::models::{NewSyncOperation, SyncOperationPatch};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SyncNowRequest {
    database_id: Option<String>,
    operation: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/sync-operations")
            .route("", web::get().to(list_operations))
            .route("", web::post().to(create_operation))
            .route("/{id}", web::patch().to(update_operation)),
    );
    cfg.service(web::resource("/api/sync/now").route(web::post().to(sync_now)));
}

async fn list_operations(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    match state.store.list_operations() {
        Ok(operations) => HttpResponse::Ok().json(operations),
        Err(e) => {
            log::error!("failed to list sync operations: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch sync operations"
            }))
        }
    }
}

async fn create_operation(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewSyncOperation>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.create_operation(body.into_inner()) {
        Ok(operation) => HttpResponse::Created().json(operation),
        Err(e) => {
            log::error!("failed to create sync operation: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to create sync operation"
            }))
        }
    }
}

async fn update_operation(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<SyncOperationPatch>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.update_operation(&path, body.into_inner()) {
        Ok(Some(operation)) => HttpResponse::Ok().json(operation),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "Sync operation not found"
        })),
        Err(e) => {
            log::error!("failed to update sync operation {}: {}", path, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to update sync operation"
            }))
        }
    }
}

/// Kick off a simulated sync. Answers immediately with the running
/// operation; completion happens on the runner's timers.
async fn sync_now(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: Option<web::Json<SyncNowRequest>>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::SyncTrigger) {
        return resp;
    }
    let body = body.map(web::Json::into_inner).unwrap_or_default();
    match state.runner.trigger(body.database_id, body.operation) {
        Ok(operation) => HttpResponse::Ok().json(operation),
        Err(e) => {
            log::error!("failed to start sync operation: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to start sync operation"
            }))
        }
    }
}

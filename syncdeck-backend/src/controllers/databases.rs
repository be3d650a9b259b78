use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::middleware::rate_limit::{enforce, RateClass};
use crate::models::{ExternalDatabasePatch, NewExternalDatabase};
use crate::store::StoreError;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/databases")
            .route("", web::get().to(list_databases))
            .route("", web::post().to(create_database))
            .route("/{id}", web::get().to(get_database))
            .route("/{id}", web::patch().to(update_database))
            .route("/{id}", web::delete().to(delete_database)),
    );
}

async fn list_databases(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    match state.store.list_databases() {
        Ok(databases) => HttpResponse::Ok().json(databases),
        Err(e) => {
            log::error!("failed to list databases: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch databases"
            }))
        }
    }
}

async fn get_database(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    match state.store.get_database(&path) {
        Ok(Some(database)) => HttpResponse::Ok().json(database),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "Database not found"
        })),
        Err(e) => {
            log::error!("failed to fetch database {}: {}", path, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch database"
            }))
        }
    }
}

async fn create_database(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<NewExternalDatabase>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    let new = body.into_inner();
    if new.record_count.is_some_and(|n| n < 0) {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid database data"
        }));
    }
    match state.store.create_database(new) {
        Ok(database) => HttpResponse::Created().json(database),
        Err(e @ StoreError::DuplicateExternalId(_)) => {
            HttpResponse::BadRequest().json(serde_json::json!({ "message": e.to_string() }))
        }
        Err(e) => {
            log::error!("failed to create database: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to create database"
            }))
        }
    }
}

async fn update_database(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<ExternalDatabasePatch>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.update_database(&path, body.into_inner()) {
        Ok(Some(database)) => HttpResponse::Ok().json(database),
        Ok(None) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "Database not found"
        })),
        Err(e) => {
            log::error!("failed to update database {}: {}", path, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to update database"
            }))
        }
    }
}

async fn delete_database(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<String>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.delete_database(&path) {
        Ok(true) => HttpResponse::NoContent().finish(),
        Ok(false) => HttpResponse::NotFound().json(serde_json::json!({
            "message": "Database not found"
        })),
        Err(e) => {
            log::error!("failed to delete database {}: {}", path, e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to delete database"
            }))
        }
    }
}

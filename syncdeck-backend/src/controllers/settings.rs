use actix_web::{web, HttpRequest, HttpResponse, Responder};

use crate::middleware::rate_limit::{enforce, RateClass};
use crate::models::SyncSettingsPatch;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/api/sync-settings")
            .route(web::get().to(get_settings))
            .route(web::patch().to(update_settings)),
    );
}

async fn get_settings(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Read) {
        return resp;
    }
    match state.store.get_settings() {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => {
            log::error!("failed to fetch sync settings: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to fetch sync settings"
            }))
        }
    }
}

async fn update_settings(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<SyncSettingsPatch>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::Write) {
        return resp;
    }
    match state.store.update_settings(body.into_inner()) {
        Ok(settings) => HttpResponse::Ok().json(settings),
        Err(e) => {
            log::error!("failed to update sync settings: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "message": "Failed to update sync settings"
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn singleton_starts_with_defaults_and_merges_patches() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(testing::state())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/sync-settings").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["autoSync"], true);
        assert_eq!(body["syncInterval"], 5);
        assert_eq!(body["cacheSize"], 45);
        assert_eq!(body["isAuthenticated"], false);

        // Applying the same partial update twice lands on the same record.
        let patch = serde_json::json!({"syncInterval": 30, "autoSync": false});
        let req = test::TestRequest::patch()
            .uri("/api/sync-settings")
            .set_json(&patch)
            .to_request();
        let first: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;

        let req = test::TestRequest::patch()
            .uri("/api/sync-settings")
            .set_json(&patch)
            .to_request();
        let second: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;

        assert_eq!(first, second);
        assert_eq!(second["syncInterval"], 30);
        assert_eq!(second["autoSync"], false);
        assert_eq!(second["cacheSize"], 45);
    }

    #[actix_web::test]
    async fn unknown_settings_fields_are_rejected() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(testing::state())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::patch()
            .uri("/api/sync-settings")
            .set_json(serde_json::json!({"cacheSizeMb": 10}))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::BAD_REQUEST
        );
    }
}

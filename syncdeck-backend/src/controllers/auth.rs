use actix_web::http::header;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use crate::external::WorkspaceError;
use crate::middleware::rate_limit::{enforce, RateClass};
use crate::session::WorkspaceSession;
use crate::AppState;

#[derive(Debug, Deserialize)]
struct CallbackQuery {
    code: Option<String>,
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/auth/external").route(web::get().to(connect)));
    cfg.service(web::resource("/auth/external/callback").route(web::get().to(callback)));
    cfg.service(
        web::scope("/api/auth")
            .route("/status", web::get().to(status))
            .route("/disconnect", web::post().to(disconnect)),
    );
}

/// Send the browser to the workspace's OAuth authorize page.
async fn connect(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::AuthInit) {
        return resp;
    }
    match state.workspace.authorize_redirect_url() {
        Ok(url) => HttpResponse::Found()
            .append_header((header::LOCATION, url))
            .finish(),
        Err(WorkspaceError::NotConfigured) => HttpResponse::ServiceUnavailable().json(
            serde_json::json!({
                "error": "Workspace OAuth is not configured. Set WORKSPACE_CLIENT_ID and WORKSPACE_CLIENT_SECRET environment variables."
            }),
        ),
        Err(e) => {
            log::error!("failed to build authorize URL: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "Failed to start workspace authorization"
            }))
        }
    }
}

/// OAuth callback: exchange the code, stash the grant in the process-local
/// session, and bounce back to the settings page either way.
async fn callback(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<CallbackQuery>,
) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::AuthCallback) {
        return resp;
    }
    let Some(code) = query.code.as_deref() else {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "error": "Missing authorization code"
        }));
    };

    match state.workspace.exchange_code(code).await {
        Ok(grant) => {
            state.session.connect(WorkspaceSession {
                access_token: grant.access_token,
                workspace_id: grant.workspace_id,
                bot_id: grant.bot_id,
            });
            HttpResponse::Found()
                .append_header((header::LOCATION, "/settings?auth=success"))
                .finish()
        }
        Err(e) => {
            log::error!("workspace OAuth exchange failed: {}", e);
            HttpResponse::Found()
                .append_header((header::LOCATION, "/settings?auth=error"))
                .finish()
        }
    }
}

async fn status(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::AuthStatus) {
        return resp;
    }
    let session = state.session.snapshot();
    HttpResponse::Ok().json(serde_json::json!({
        "isAuthenticated": session.is_some(),
        "workspaceId": session.and_then(|s| s.workspace_id),
    }))
}

async fn disconnect(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    if let Err(resp) = enforce(&state.limiter, &req, RateClass::AuthStatus) {
        return resp;
    }
    state.session.disconnect();
    HttpResponse::Ok().json(serde_json::json!({ "success": true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controllers::testing;
    use actix_web::http::StatusCode;
    use actix_web::test;

    #[actix_web::test]
    async fn connect_redirects_to_the_authorize_page_when_configured() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(testing::state_configured())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/external").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FOUND);
        let location = resp
            .headers()
            .get(header::LOCATION)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(location.starts_with("https://workspace.example/oauth/authorize?"));
        assert!(location.contains("client_id=client-1"));
    }

    #[actix_web::test]
    async fn connect_without_credentials_answers_503() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(testing::state())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/auth/external").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[actix_web::test]
    async fn callback_without_a_code_is_rejected() {
        let app = test::init_service(
            actix_web::App::new()
                .app_data(testing::state_configured())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/auth/external/callback")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Missing authorization code");
    }

    #[actix_web::test]
    async fn status_reflects_the_session_and_disconnect_clears_it() {
        let state = testing::state();
        let app = test::init_service(
            actix_web::App::new()
                .app_data(state.clone())
                .configure(config),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/auth/status").to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["isAuthenticated"], false);
        assert!(body["workspaceId"].is_null());

        state.session.connect(WorkspaceSession {
            access_token: "tok".to_string(),
            workspace_id: Some("ws-1".to_string()),
            bot_id: Some("bot-1".to_string()),
        });
        let req = test::TestRequest::get().uri("/api/auth/status").to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["isAuthenticated"], true);
        assert_eq!(body["workspaceId"], "ws-1");

        let req = test::TestRequest::post()
            .uri("/api/auth/disconnect")
            .to_request();
        let body: serde_json::Value =
            test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(body["success"], true);
        assert!(!state.session.is_authenticated());
    }
}

// src/routes.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Router,
};
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    common::error::AppError, config::AppState, docs::ApiDoc, handlers, middleware::guard::session_guard,
};

// Multipart framing on top of the file itself
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

async fn not_found() -> AppError {
    AppError::NotFound("route")
}

pub fn build_router(app_state: AppState) -> Router {
    let auth_routes = Router::new()
        .route("/signup", post(handlers::auth::signup))
        .route("/login", post(handlers::auth::login))
        .route("/callback", get(handlers::auth::callback))
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::get_me));

    let upload_limit = app_state.upload_service.max_bytes() + MULTIPART_OVERHEAD_BYTES;
    let listing_routes = Router::new()
        .route("/api/properties/flat", post(handlers::listings::create_property))
        .route("/api/properties/garden", post(handlers::listings::create_venue))
        .route("/api/kitchens", post(handlers::listings::create_kitchen))
        .route(
            "/api/upload",
            post(handlers::upload::upload_image).layer(DefaultBodyLimit::max(upload_limit)),
        );

    let wizard_routes = Router::new()
        .route("/api/wizards", post(handlers::wizard::start_wizard))
        .route(
            "/api/wizards/{id}",
            get(handlers::wizard::get_wizard).delete(handlers::wizard::discard),
        )
        .route("/api/wizards/{id}/draft", patch(handlers::wizard::update_draft))
        .route("/api/wizards/{id}/actions", post(handlers::wizard::apply_action))
        .route("/api/wizards/{id}/touch", post(handlers::wizard::touch_field))
        .route("/api/wizards/{id}/advance", post(handlers::wizard::advance))
        .route("/api/wizards/{id}/retreat", post(handlers::wizard::retreat))
        .route("/api/wizards/{id}/submit", post(handlers::wizard::submit));

    let dashboard_routes = Router::new()
        .route("/dashboard", get(handlers::dashboard::dashboard_home))
        .route("/dashboard/user", get(handlers::dashboard::user_dashboard))
        .route("/dashboard/user/properties", get(handlers::dashboard::browse_properties))
        .route("/dashboard/user/properties/{id}", get(handlers::dashboard::property_detail))
        .route("/dashboard/user/venues", get(handlers::dashboard::browse_venues))
        .route("/dashboard/vendor", get(handlers::dashboard::vendor_dashboard))
        .route("/dashboard/vendor/list-property", get(handlers::dashboard::list_property_options))
        .route("/dashboard/vendor/list-success", get(handlers::dashboard::list_success))
        .route("/dashboard/admin", get(handlers::dashboard::admin_dashboard));

    let admin_routes = Router::new()
        .route("/api/admin/{collection}/{id}/approve", post(handlers::admin::approve_listing))
        .route("/api/admin/{collection}/{id}/deactivate", post(handlers::admin::deactivate_listing));

    let mut router = Router::new()
        .merge(auth_routes)
        .merge(listing_routes)
        .merge(wizard_routes)
        .merge(dashboard_routes)
        .merge(admin_routes)
        .route("/api/health", get(handlers::health::health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // Only a local path can be served from disk; a CDN base is served elsewhere.
    let public_url = app_state.config.public_upload_url.trim_end_matches('/');
    if public_url.starts_with('/') && public_url.len() > 1 {
        router = router.nest_service(public_url, ServeDir::new(&app_state.config.upload_dir));
    }

    router
        .fallback(not_found)
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), session_guard))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
        response::Response,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;
    use uuid::Uuid;

    use super::*;
    use crate::{
        config::AppConfig,
        models::auth::Role,
        services::{
            identity::testing::{StaticIdentity, VALID_CODE},
            LocalDiskStorage, SessionNotifier,
        },
    };

    fn test_app() -> Router {
        let identity = StaticIdentity::default()
            .with_user("user-token", Role::User)
            .with_user("vendor-token", Role::Vendor)
            .with_user("admin-token", Role::Admin);
        test_app_with(identity)
    }

    fn test_app_with(identity: StaticIdentity) -> Router {
        let config = AppConfig {
            database_url: "postgres://localhost/spotly_test".into(),
            jwt_secret: "test-secret".into(),
            bind_addr: "127.0.0.1:0".into(),
            upload_dir: std::env::temp_dir().join("spotly-test-uploads"),
            public_upload_url: "/uploads".into(),
            max_upload_bytes: 1024,
            session_ttl_days: 7,
            db_max_connections: 1,
        };
        // Never connects: none of the routes exercised here reach the database.
        let pool = PgPoolOptions::new().connect_lazy(&config.database_url).unwrap();
        let storage = Arc::new(LocalDiskStorage::new(config.upload_dir.clone(), "/uploads"));
        let state = AppState::assemble(pool, config, Arc::new(identity), SessionNotifier::default(), storage);
        build_router(state)
    }

    fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn json_body(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    #[tokio::test]
    async fn anonymous_dashboard_visit_redirects_to_login() {
        let response = test_app().oneshot(request("GET", "/dashboard/admin", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }

    #[tokio::test]
    async fn vendor_is_kept_out_of_admin_area() {
        let response = test_app()
            .oneshot(request("GET", "/dashboard/admin", Some("vendor-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/vendor");
    }

    #[tokio::test]
    async fn signed_in_login_visit_goes_to_dashboard() {
        let request = Request::builder()
            .method("POST")
            .uri("/login")
            .header(header::COOKIE, "spotly_session=user-token")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "email": "user@example.com", "password": "x" }).to_string()))
            .unwrap();
        let response = test_app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/user");
    }

    #[tokio::test]
    async fn login_sets_session_cookie() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "vendor@example.com", "password": "secret123" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("spotly_session="));
        let body = json_body(response).await;
        assert_eq!(body["redirectTo"], "/dashboard/vendor");
        assert_eq!(body["user"]["role"], "vendor");
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/login",
                None,
                Some(json!({ "email": "vendor@example.com", "password": "nope" })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Invalid email or password.");
    }

    #[tokio::test]
    async fn me_requires_a_session() {
        let response = test_app().oneshot(request("GET", "/api/auth/me", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await["message"], "Please sign in to continue.");

        let response = test_app()
            .oneshot(request("GET", "/api/auth/me", Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["email"], "admin@example.com");
    }

    #[tokio::test]
    async fn signup_rejects_admin_role_and_mismatched_passwords() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/signup",
                None,
                Some(json!({
                    "name": "Eve", "email": "eve@example.com", "password": "secret1",
                    "confirmPassword": "secret1", "role": "admin"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = test_app()
            .oneshot(request(
                "POST",
                "/signup",
                None,
                Some(json!({
                    "name": "Eve", "email": "eve@example.com", "password": "secret1",
                    "confirmPassword": "secret1", "role": "owner"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = test_app()
            .oneshot(request(
                "POST",
                "/signup",
                None,
                Some(json!({
                    "name": "Eve", "email": "eve@example.com", "password": "secret1",
                    "confirmPassword": "secret2"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(response).await["details"]["confirmPassword"].is_array());
    }

    #[tokio::test]
    async fn signup_defaults_to_user_role() {
        let response = test_app()
            .oneshot(request(
                "POST",
                "/signup",
                None,
                Some(json!({
                    "name": "Neha", "email": "neha@example.com", "password": "secret1",
                    "confirmPassword": "secret1", "role": "VENDOR"
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(json_body(response).await["redirectTo"], "/dashboard/vendor");
    }

    #[tokio::test]
    async fn callback_outcomes() {
        let response = test_app().oneshot(request("GET", "/callback?code=bogus", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login?error=oauth_callback_failed");

        let response = test_app().oneshot(request("GET", "/callback", None, None)).await.unwrap();
        assert_eq!(location(&response), "/login?error=oauth_callback_failed");

        let uri = format!("/callback?code={VALID_CODE}");
        let response = test_app().oneshot(request("GET", &uri, None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/dashboard/vendor");
        assert!(response.headers().contains_key(header::SET_COOKIE));
    }

    #[tokio::test]
    async fn users_cannot_start_listing_wizards() {
        let response = test_app()
            .oneshot(request("POST", "/api/wizards", Some("user-token"), Some(json!({ "kind": "flat" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn wizard_round_trip_over_http() {
        let app = test_app();

        let response = app
            .clone()
            .oneshot(request("POST", "/api/wizards", Some("vendor-token"), Some(json!({ "kind": "garden" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let view = json_body(response).await;
        assert_eq!(view["totalSteps"], 9);
        assert_eq!(view["canAdvance"], false);
        let id = view["id"].as_str().unwrap().to_string();

        // Incomplete step: the move is refused without an error.
        let response = app
            .clone()
            .oneshot(request("POST", &format!("/api/wizards/{id}/advance"), Some("vendor-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["applied"], false);

        let response = app
            .clone()
            .oneshot(request(
                "PATCH",
                &format!("/api/wizards/{id}/draft"),
                Some("vendor-token"),
                Some(json!({ "name": "Shubh Vivah Lawn" })),
            ))
            .await
            .unwrap();
        assert_eq!(json_body(response).await["canAdvance"], true);

        let response = app
            .clone()
            .oneshot(request("POST", &format!("/api/wizards/{id}/advance"), Some("vendor-token"), None))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["applied"], true);
        assert_eq!(body["wizard"]["stepLabel"], "Location");

        // Submitting from the middle of the form is a conflict.
        let response = app
            .clone()
            .oneshot(request("POST", &format!("/api/wizards/{id}/submit"), Some("vendor-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        // Another vendor cannot see it.
        let response = app
            .clone()
            .oneshot(request("GET", &format!("/api/wizards/{id}"), Some("admin-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        for expected_cancel in [false, true] {
            let response = app
                .clone()
                .oneshot(request("POST", &format!("/api/wizards/{id}/retreat"), Some("vendor-token"), None))
                .await
                .unwrap();
            let body = json_body(response).await;
            assert_eq!(body["cancelled"], expected_cancel);
        }

        let response = app
            .oneshot(request("GET", &format!("/api/wizards/{id}"), Some("vendor-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn unknown_draft_field_is_a_bad_request() {
        let app = test_app();
        let response = app
            .clone()
            .oneshot(request("POST", "/api/wizards", Some("vendor-token"), Some(json!({ "kind": "restaurant" }))))
            .await
            .unwrap();
        let id = json_body(response).await["id"].as_str().unwrap().to_string();

        let response = app
            .oneshot(request(
                "PATCH",
                &format!("/api/wizards/{id}/draft"),
                Some("vendor-token"),
                Some(json!({ "capacity": 10 })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["message"], "Unknown draft field 'capacity'");
    }

    #[tokio::test]
    async fn list_property_offers_three_kinds() {
        let response = test_app()
            .oneshot(request("GET", "/dashboard/vendor/list-property", Some("vendor-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let options = json_body(response).await;
        let ids: Vec<&str> = options.as_array().unwrap().iter().map(|o| o["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["flat", "garden", "restaurant"]);
        assert_eq!(options[2]["wizardSteps"].as_array().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn admin_routes_reject_unknown_collections() {
        let uri = format!("/api/admin/castles/{}/approve", Uuid::new_v4());
        let response = test_app().oneshot(request("POST", &uri, Some("admin-token"), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let uri = format!("/api/admin/properties/{}/approve", Uuid::new_v4());
        let response = test_app().oneshot(request("POST", &uri, Some("vendor-token"), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    fn upload_request(filename: &str, content_type: &str, contents: &str) -> Request<Body> {
        let boundary = "spotly-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n{contents}\r\n--{boundary}--\r\n"
        );
        Request::builder()
            .method("POST")
            .uri("/api/upload")
            .header(header::AUTHORIZATION, "Bearer vendor-token")
            .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn upload_rejects_non_images() {
        let response = test_app().oneshot(upload_request("notes.txt", "text/plain", "hello")).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn upload_rejects_svg() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><script>alert(document.cookie)</script></svg>"#;
        let response = test_app()
            .oneshot(upload_request("logo.svg", "image/svg+xml", svg))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn unknown_routes_get_json_404() {
        let response = test_app().oneshot(request("GET", "/nowhere", None, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["message"], "route not found");
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let identity = StaticIdentity::default().with_user("bye-token", Role::User);
        let app = test_app_with(identity);

        let response = app
            .clone()
            .oneshot(request("POST", "/api/auth/logout", Some("bye-token"), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = app.oneshot(request("GET", "/api/auth/me", Some("bye-token"), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

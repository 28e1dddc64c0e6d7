use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    handler::{
        ai::ai_handler,
        categories::{admin_categories_handler, categories_handler},
        dashboard::admin_dashboard_handler,
        news::news_handler,
        profile::profile_handler,
        reviews::admin_reviews_handler,
        tools::{admin_tools_handler, get_site_stats, tools_handler},
        users::admin_users_handler,
    },
    middleware::{auth, role_check},
    models::UserRole,
};

/// Configured origins that parse as header values.
fn parse_origins(allowed_origins: &[String]) -> Arc<[HeaderValue]> {
    allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect()
}

pub fn cors_layer(origins: &[HeaderValue]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins.iter().cloned()))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Runs outside `CorsLayer`. Requests from origins that are not listed still
/// reach the handlers, but every `access-control-*` header is removed from
/// the answer, preflights included.
async fn strip_unlisted_cors(
    State(origins): State<Arc<[HeaderValue]>>,
    req: Request,
    next: Next,
) -> Response {
    let listed = req
        .headers()
        .get(header::ORIGIN)
        .is_some_and(|origin| origins.contains(origin));

    let mut response = next.run(req).await;
    if !listed {
        let cors_headers: Vec<HeaderName> = response
            .headers()
            .keys()
            .filter(|name| name.as_str().starts_with("access-control-"))
            .cloned()
            .collect();
        for name in cors_headers {
            response.headers_mut().remove(name);
        }
    }
    response
}

async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "AIChief API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

pub fn create_router(app_state: AppState) -> Router {
    // route_layer: the guard runs only for matched admin routes. Layers wrap
    // outward, so `auth` (added last) runs before `role_check`.
    let admin_route = Router::new()
        .nest("/dashboard", admin_dashboard_handler())
        .nest("/tools", admin_tools_handler())
        .nest("/categories", admin_categories_handler())
        .nest("/reviews", admin_reviews_handler())
        .nest("/users", admin_users_handler())
        .route_layer(middleware::from_fn(|req, next| {
            role_check(req, next, vec![UserRole::Admin])
        }))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth));

    let api_route = Router::new()
        .nest("/tools", tools_handler(app_state.clone()))
        .nest("/categories", categories_handler())
        .route("/stats", get(get_site_stats))
        .nest("/auth", profile_handler(app_state.clone()))
        .nest("/admin", admin_route)
        .nest("/news", news_handler())
        .nest("/ai", ai_handler())
        .layer(TraceLayer::new_for_http());

    let origins = parse_origins(&app_state.env.allowed_origins);

    Router::new()
        .route("/", get(health))
        .nest("/api", api_route)
        .layer(cors_layer(&origins))
        .layer(middleware::from_fn_with_state(origins, strip_unlisted_cors))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::Config,
        db::DBClient,
        http::{AuthAdminClient, LlmClient},
        utils::token,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    const SECRET: &str = "router-test-secret";

    // The pool never connects: every request below is answered before the
    // database would be touched.
    fn app() -> Router {
        let config = Config {
            database_url: "postgres://localhost/unused".to_string(),
            jwt_secret: SECRET.to_string(),
            port: 0,
            llm_url: "http://127.0.0.1:9".to_string(),
            llm_api_key: "sk-test".to_string(),
            model_name: "gpt-4-turbo-preview".to_string(),
            allowed_origins: vec!["https://aichief.com".to_string()],
            auth_admin_url: None,
            auth_service_key: None,
        };
        let pool = PgPoolOptions::new()
            .connect_lazy(&config.database_url)
            .unwrap();
        let conn = reqwest::Client::new();
        let app_state = AppState {
            llm_client: LlmClient::new(
                conn.clone(),
                &config.llm_url,
                &config.llm_api_key,
                &config.model_name,
            ),
            auth_admin: AuthAdminClient::new(conn, None, None),
            db_client: DBClient::new(pool),
            env: Arc::new(config),
        };
        create_router(app_state)
    }

    fn post_json(uri: &str, origin: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(origin) = origin {
            builder = builder.header(header::ORIGIN, origin);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn missing_tool_id_and_type() {
        let response = app()
            .oneshot(post_json("/api/ai/generate-content", None, r#"{"toolId":""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await["error"],
            "toolId and type are required"
        );
    }

    #[tokio::test]
    async fn missing_topic() {
        let response = app()
            .oneshot(post_json("/api/ai/generate-news", None, r#"{"toolId":"x"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "topic is required");
    }

    #[tokio::test]
    async fn missing_tool_id_on_structured_generators() {
        for uri in [
            "/api/ai/generate-tutorial",
            "/api/ai/generate-course",
            "/api/ai/generate-all",
        ] {
            let response = app()
                .oneshot(post_json(uri, None, r#"{"difficulty":"beginner"}"#))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body_json(response).await["error"], "toolId is required");
        }
    }

    #[tokio::test]
    async fn malformed_body_keeps_the_error_shape() {
        let response = app()
            .oneshot(post_json("/api/ai/generate-news", None, "{topic"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_json(response).await["error"].is_string());
    }

    #[tokio::test]
    async fn allowed_origin_gets_cors_headers() {
        let response = app()
            .oneshot(post_json(
                "/api/ai/generate-news",
                Some("https://aichief.com"),
                "{}",
            ))
            .await
            .unwrap();
        assert_eq!(
            response
                .headers()
                .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
                .unwrap(),
            "https://aichief.com"
        );
    }

    fn cors_header_names(response: &axum::response::Response) -> Vec<String> {
        response
            .headers()
            .keys()
            .map(|name| name.as_str().to_string())
            .filter(|name| name.starts_with("access-control-"))
            .collect()
    }

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method("OPTIONS")
            .uri("/api/ai/generate-news")
            .header(header::ORIGIN, origin)
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn unlisted_origin_gets_no_cors_headers_but_handler_runs() {
        let response = app()
            .oneshot(post_json(
                "/api/ai/generate-news",
                Some("https://evil.example"),
                "{}",
            ))
            .await
            .unwrap();
        assert!(
            cors_header_names(&response).is_empty(),
            "{:?}",
            cors_header_names(&response)
        );
        // the handler answered with its own validation error
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "topic is required");
    }

    #[tokio::test]
    async fn unlisted_origin_preflight_gets_no_cors_headers() {
        let response = app().oneshot(preflight("https://evil.example")).await.unwrap();
        assert!(
            cors_header_names(&response).is_empty(),
            "{:?}",
            cors_header_names(&response)
        );
    }

    #[tokio::test]
    async fn allowed_origin_preflight_lists_methods_and_credentials() {
        let response = app().oneshot(preflight("https://aichief.com")).await.unwrap();
        let headers = response.headers();
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://aichief.com"
        );
        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS).unwrap(),
            "true"
        );
        assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_METHODS));
    }

    #[tokio::test]
    async fn requests_without_origin_get_no_cors_headers() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert!(cors_header_names(&response).is_empty());
    }

    #[tokio::test]
    async fn admin_routes_require_a_token() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/tools")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn invalid_token_is_rejected_before_any_lookup() {
        let response = app()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/dashboard")
                    .header(header::AUTHORIZATION, "Bearer not-a-jwt")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await["error"],
            "Token is invalid or expired"
        );
    }

    #[tokio::test]
    async fn reviews_require_a_token() {
        let uri = format!("/api/tools/{}/reviews", uuid::Uuid::new_v4());
        let response = app()
            .oneshot(post_json(&uri, None, r#"{"rating":5}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_creation_validates_before_writing() {
        let token =
            token::create_token(&uuid::Uuid::new_v4().to_string(), SECRET.as_bytes(), 60).unwrap();
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/auth/profile")
                    .header(header::CONTENT_TYPE, "application/json")
                    .header(header::AUTHORIZATION, format!("Bearer {token}"))
                    .body(Body::from(r#"{"display_name":""}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_ids_keep_the_error_shape() {
        for uri in ["/api/tools/not-a-uuid", "/api/news/42"] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = body_json(response).await;
            assert_eq!(body["status"], "fail");
            assert!(body["error"].is_string());
        }
    }

    #[tokio::test]
    async fn health_check() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }
}

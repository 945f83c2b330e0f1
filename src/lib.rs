pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod realtime;
pub mod services;
pub mod state;
pub mod storage;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware::from_fn_with_state,
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};

use crate::config::SecurityConfig;
use crate::database::models::Role;
use crate::middleware::{jwt_auth_middleware, require_roles, validate_user_middleware};
use crate::state::AppState;

/// Multipart framing on top of the largest allowed attachment
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Full HTTP surface: public, protected, reviewer and superadmin routes plus `/ws`
pub fn app(state: AppState) -> Router {
    let body_limit = state
        .config
        .api
        .max_request_size_bytes
        .max(state.config.storage.max_attachment_bytes + MULTIPART_OVERHEAD_BYTES);

    let mut router = Router::new()
        // Public
        .merge(public_routes())
        // Any authenticated role
        .merge(protected_routes(&state))
        // Admin + superadmin
        .merge(reviewer_routes(&state))
        // Superadmin
        .merge(superadmin_routes(&state))
        // Live updates, token checked during the handshake
        .route("/ws", get(realtime::ws_handler))
        // Global middleware
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors_layer(&state.config.security));

    if state.config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn public_routes() -> Router<AppState> {
    use handlers::public;

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/api/health", get(public::health))
        .route("/api/auth/register", post(public::register_post))
        .route("/api/auth/login", post(public::login_post))
}

fn protected_routes(state: &AppState) -> Router<AppState> {
    use handlers::protected;

    Router::new()
        .route("/api/auth/whoami", get(protected::whoami_get))
        .route("/api/users/request-admin", post(protected::request_admin_post))
        // Reports
        .route(
            "/api/reports",
            get(protected::reports_get).post(protected::report_post),
        )
        .route(
            "/api/reports/:id",
            get(protected::report_get)
                .put(protected::report_put)
                .delete(protected::report_delete),
        )
        .route(
            "/api/reports/:id/attachment",
            get(protected::report_attachment_get),
        )
        // Own notifications
        .route("/api/notifications", get(protected::notifications_get))
        .route(
            "/api/notifications/:id/read",
            put(protected::notification_read_put),
        )
        .route(
            "/api/notifications/clear",
            delete(protected::notifications_clear),
        )
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn reviewer_routes(state: &AppState) -> Router<AppState> {
    use handlers::elevated::admin;

    Router::new()
        .route("/api/reports/:id/status", put(admin::report_status_put))
        .route("/api/reports/:id/summary", put(admin::report_summary_put))
        .route("/api/admin/overview", get(admin::overview_get))
        .route("/api/admin/reports", get(admin::admin_reports_get))
        .route("/api/admin/reports/:id", put(admin::report_status_put))
        .route(
            "/api/admin/reports/:id/summary",
            put(admin::report_summary_put),
        )
        .route(
            "/api/notifications/admin/all",
            get(admin::notifications_all_get),
        )
        .route(
            "/api/notifications/user/:user_id",
            get(admin::notifications_for_user_get),
        )
        .route("/api/stats", get(admin::stats_get).post(admin::stats_post))
        .route("/api/stats/latest", get(admin::stats_latest_get))
        .route_layer(from_fn_with_state(Role::REVIEWERS, require_roles))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn superadmin_routes(state: &AppState) -> Router<AppState> {
    use handlers::elevated::superadmin;

    Router::new()
        .route("/api/admin/users", get(superadmin::users_get))
        .route("/api/admin/users/:id", delete(superadmin::user_delete))
        .route("/api/admin/users/:id/role", put(superadmin::user_role_put))
        .route(
            "/api/admin/admin-requests/pending",
            get(superadmin::admin_requests_pending_get),
        )
        .route(
            "/api/admin/admin-requests/handle",
            post(superadmin::admin_requests_handle_post),
        )
        .route(
            "/api/admin/notifications",
            post(superadmin::system_notifications_post),
        )
        .route(
            "/api/admin/notifications/all",
            get(superadmin::system_notifications_get),
        )
        .route(
            "/api/notifications/send",
            post(superadmin::notification_send_post),
        )
        .route_layer(from_fn_with_state(Role::SUPERADMIN_ONLY, require_roles))
        .route_layer(from_fn_with_state(state.clone(), validate_user_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// `*` in the origin list opens CORS to any origin
fn cors_layer(security: &SecurityConfig) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if security.cors_origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(origins))
}

use axum::http::HeaderValue;
use axum::routing::{get, patch, post};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::api::handlers;
use crate::api::state::AppState;
use crate::auth;
use crate::config::Config;

pub fn create_router(state: AppState, config: &Config) -> Router {
    let origins: Vec<HeaderValue> = config
        .cors_origin
        .split(',')
        .filter_map(|s| s.trim().parse::<HeaderValue>().ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(tower_http::cors::Any)
        .allow_headers(tower_http::cors::Any);

    let board_routes = Router::new()
        .route(
            "/",
            get(handlers::board::get_board).put(handlers::board::save_board),
        )
        .route("/reset", post(handlers::board::reset_board))
        .route("/drop", post(handlers::board::apply_drop));

    let column_routes = Router::new()
        .route("/", post(handlers::columns::create_column))
        .route(
            "/{id}",
            patch(handlers::columns::update_column).delete(handlers::columns::delete_column),
        )
        .route("/{id}/move", patch(handlers::columns::move_column))
        .route("/{id}/tasks", post(handlers::columns::create_task))
        .route("/{id}/import", post(handlers::ai::import_tasks));

    let task_routes = Router::new()
        .route(
            "/{id}",
            patch(handlers::tasks::update_task).delete(handlers::tasks::delete_task),
        )
        .route("/{id}/move", patch(handlers::tasks::move_task))
        .route("/{id}/enhance", post(handlers::ai::enhance_task))
        .route("/{id}/enhance/apply", post(handlers::ai::apply_enhancement));

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/health/live", get(handlers::liveness))
        .route("/api/auth/register", post(auth::handlers::register))
        .route("/api/auth/login", post(auth::handlers::login))
        .route("/api/auth/refresh", post(auth::handlers::refresh))
        .route("/api/auth/logout", post(auth::handlers::logout));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::handlers::me))
        .route("/api/events", get(handlers::events::board_events))
        .route("/api/ai/enhance", post(handlers::ai::enhance_draft))
        .nest("/api/board", board_routes)
        .nest("/api/columns", column_routes)
        .nest("/api/tasks", task_routes)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::auth_middleware,
        ));

    let api_routes = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let serve_dir = ServeDir::new(&config.frontend_dir).not_found_service(
        ServeDir::new(&config.frontend_dir).append_index_html_on_directories(true),
    );

    api_routes.fallback_service(serve_dir)
}

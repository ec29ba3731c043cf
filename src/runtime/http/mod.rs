//! HTTP surface: routing, authentication, admission and handlers.
//!
//! Public routes: `GET /`, `POST /users`, `POST /login`. Everything else
//! requires a bearer token and passes the rate limiter, in that order.

pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, post};
use axum::Router;
use tower::ServiceBuilder;

pub use error::{json_error, ApiError};
pub use middleware::Caller;
pub use state::AppState;

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    // route_layer: last added runs first, so authentication precedes admission.
    let protected = Router::new()
        .route("/users/:id", get(routes::get_user))
        .route(
            "/todos",
            get(routes::list_todos)
                .post(routes::create_todo)
                .delete(routes::delete_all_todos),
        )
        .route("/todos/report", post(routes::request_report))
        .route("/todos/:id", get(routes::get_todo).delete(routes::delete_todo))
        .route("/download/:file", get(routes::download))
        .route("/notifications", get(routes::notifications))
        .route_layer(from_fn_with_state(state.clone(), middleware::admit))
        .route_layer(from_fn_with_state(state.clone(), middleware::authenticate));

    Router::new()
        .route("/", get(routes::index))
        .route("/users", post(routes::create_user))
        .route("/login", post(routes::login))
        .merge(protected)
        .layer(ServiceBuilder::new().layer(from_fn(middleware::log_requests)))
        .with_state(state)
}

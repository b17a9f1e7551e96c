pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    http::HeaderValue,
    routing::{get, post, put},
};
use state::AppState;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    if parsed.is_empty() {
        layer.allow_origin(Any)
    } else {
        layer.allow_origin(AllowOrigin::list(parsed))
    }
}

pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.settings.app.cors_origins);

    let auth_routes = Router::new()
        .route("/", get(routes::auth::me))
        .route("/login", post(routes::auth::login))
        .route("/register", post(routes::auth::register));

    let invitation_routes = Router::new()
        .route(
            "/",
            get(routes::invitation::list).post(routes::invitation::issue),
        )
        .route("/{code}", get(routes::invitation::validate));

    let slot_routes = Router::new().route("/", get(routes::slot::list));

    let reservation_routes = Router::new()
        .route(
            "/",
            get(routes::reservation::list).post(routes::reservation::create),
        )
        .route(
            "/{id}",
            get(routes::reservation::get)
                .put(routes::reservation::update)
                .delete(routes::reservation::cancel),
        );

    let admin_routes = Router::new()
        .route("/user", get(routes::admin::list_users))
        .route("/user/{uid}", put(routes::admin::set_user_status))
        .route("/reservation", get(routes::admin::list_reservations))
        .route(
            "/slot",
            get(routes::admin::list_slots).post(routes::admin::set_availability),
        )
        .route("/slot/reconcile", post(routes::admin::reconcile))
        .route("/slot/{date}", put(routes::admin::set_slot))
        .route("/reminder", post(routes::admin::send_reminders))
        .route("/notification", get(routes::admin::list_notifications));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/invitation", invitation_routes)
        .nest("/slot", slot_routes)
        .nest("/reservation", reservation_routes)
        .nest("/admin", admin_routes);

    let health = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api)
        .merge(health)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

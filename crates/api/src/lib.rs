pub mod error;
pub mod extractors;
pub mod routes;
pub mod state;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use state::AppState;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .route("/ping", get(routes::auth::ping))
        .route("/verify-email", post(routes::auth::verify_email))
        .route(
            "/resend-verification",
            post(routes::auth::resend_verification),
        )
        .route("/forgot-password", post(routes::auth::forgot_password))
        .route(
            "/validate-reset-code",
            post(routes::auth::validate_reset_code),
        )
        .route("/reset-password", post(routes::auth::reset_password));

    // Static segments before the {username} capture.
    let user_routes = Router::new()
        .route("/details", put(routes::user::update_details))
        .route("/search/{term}", get(routes::user::search))
        .route("/search-history", get(routes::user::list_search_history))
        .route(
            "/search-history/{id}",
            put(routes::user::add_search_history).delete(routes::user::remove_search_history),
        )
        .route(
            "/push-subscription",
            put(routes::user::set_push_subscription),
        )
        .route("/{username}", get(routes::user::profile));

    let friend_routes = Router::new()
        .route("/", get(routes::friend::list))
        .route("/request/{user_id}", put(routes::friend::add))
        .route("/cancel/{request_id}", put(routes::friend::cancel))
        .route("/accept/{request_id}", put(routes::friend::accept))
        .route("/{request_id}", delete(routes::friend::unfriend))
        .route("/follow/{user_id}", put(routes::friend::follow))
        .route("/unfollow/{user_id}", put(routes::friend::unfollow));

    let post_routes = Router::new()
        .route("/", post(routes::post::create))
        .route("/feed", get(routes::post::feed))
        .route("/saved", get(routes::post::saved))
        .route("/user/{username}", get(routes::post::by_user))
        .route("/{id}", get(routes::post::get).delete(routes::post::delete))
        .route("/{id}/react", put(routes::post::react))
        .route("/{id}/reacts", get(routes::post::reacts))
        .route("/{id}/save", put(routes::post::toggle_save))
        .route(
            "/{id}/comments",
            get(routes::comment::list).post(routes::comment::create),
        );

    let comment_routes = Router::new()
        .route("/{id}", delete(routes::comment::delete))
        .route("/{id}/like", put(routes::comment::like))
        .route("/{id}/replies", post(routes::comment::reply));

    let chat_routes = Router::new()
        .route("/", get(routes::chat::list).post(routes::chat::open))
        .route("/group", post(routes::chat::create_group))
        .route("/{id}/rename", put(routes::chat::rename))
        .route("/{id}/add", put(routes::chat::add_member))
        .route("/{id}/remove", put(routes::chat::remove_member))
        .route("/{id}/theme", put(routes::chat::set_theme));

    let message_routes = Router::new()
        .route("/", post(routes::message::send))
        .route("/{chat_id}", get(routes::message::list))
        .route("/{chat_id}/seen", put(routes::message::mark_seen));

    let notification_routes = Router::new()
        .route("/", get(routes::notification::list))
        .route("/seen", put(routes::notification::mark_seen));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/users", user_routes)
        .nest("/friends", friend_routes)
        .nest("/posts", post_routes)
        .nest("/comments", comment_routes)
        .nest("/chats", chat_routes)
        .nest("/messages", message_routes)
        .nest("/notifications", notification_routes);

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

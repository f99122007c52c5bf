pub mod attachments;
pub mod auth;
pub mod dms;
pub mod keys;
pub mod messages;
pub mod users;

use crate::AppState;
use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use std::sync::Arc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let auth_routes = Router::new()
        .route("/sign-up/email", post(auth::sign_up))
        .route("/sign-in/email", post(auth::sign_in))
        .route("/sign-out", post(auth::sign_out))
        .route("/get-session", get(auth::get_session));

    let api_routes = Router::new()
        // DMs: conversations and per-counterpart messages
        .route("/dms", get(dms::list_conversations))
        .route(
            "/dms/{userId}/messages",
            post(dms::send_message).get(dms::list_messages),
        )
        .route("/dms/{userId}/read", post(dms::mark_read))
        // Messages
        .route("/messages/{messageId}", patch(messages::edit_message))
        .route("/messages/{messageId}", delete(messages::delete_message))
        .route("/messages/{messageId}/reactions", post(messages::toggle_reaction))
        .route("/messages/reactions", get(messages::get_reactions))
        // Users
        .route("/users/me", get(users::get_me))
        .route("/users/me", patch(users::update_me))
        .route("/users/search", get(users::search_users))
        // E2EE keys
        .route("/users/me/public-key", put(keys::set_public_key))
        .route("/users/{userId}/public-key", get(keys::get_public_key))
        // Attachments
        .route("/attachments", post(attachments::create_attachment));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api", api_routes)
        .with_state(state)
}

/**
 * Discussion Route Handlers
 *
 * # Routes
 *
 * ## Public
 * - `GET /api/discussions` - List discussions
 * - `GET /api/discussions/is-title-taken/{title}` - Title availability
 *
 * ## Authenticated
 * - `POST /api/discussions/create/{title}` - Create a discussion
 * - `DELETE /api/discussions/{id}/delete` - Delete (author only)
 * - `POST /api/discussions/{id}/join` - Join
 * - `DELETE /api/discussions/{id}/leave` - Leave
 * - `GET /api/discussions/{id}/details` - Full detail (participants only)
 * - `GET /api/discussions/{id}/is-participant` - Membership check
 * - `GET /api/discussions/{id}/participants/{participant_id}` - Participant by id
 * - `GET /api/discussions/{id}/participants/user/{user_id}` - Participant by user
 * - `POST /api/discussions/{id}/comments/add` - Comment (`?content=`)
 * - `DELETE /api/discussions/{id}/comments/delete/{comment_id}` - Delete a comment
 * - `GET /api/discussions/{id}/ws` - Live updates over WebSocket
 *
 * The WebSocket route accepts its token as `?token=` as well, since browsers
 * cannot set an `Authorization` header on the handshake.
 */
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, post},
    Router,
};

use crate::backend::discussions::comments::{add_comment, delete_comment};
use crate::backend::discussions::handlers::{
    create_discussion, delete_discussion, discussion_details, get_participant,
    get_participant_by_user, is_participant, is_title_taken, join_discussion, leave_discussion,
    list_discussions,
};
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::discussion_socket;
use crate::backend::server::state::AppState;

/// Configure discussion, comment and WebSocket routes
pub fn configure_discussion_routes(
    router: Router<AppState>,
    app_state: &AppState,
) -> Router<AppState> {
    let protected = Router::new()
        .route("/api/discussions/create/{title}", post(create_discussion))
        .route("/api/discussions/{id}/delete", delete(delete_discussion))
        .route("/api/discussions/{id}/join", post(join_discussion))
        .route("/api/discussions/{id}/leave", delete(leave_discussion))
        .route("/api/discussions/{id}/details", get(discussion_details))
        .route("/api/discussions/{id}/is-participant", get(is_participant))
        .route(
            "/api/discussions/{id}/participants/{participant_id}",
            get(get_participant),
        )
        .route(
            "/api/discussions/{id}/participants/user/{user_id}",
            get(get_participant_by_user),
        )
        .route("/api/discussions/{id}/comments/add", post(add_comment))
        .route(
            "/api/discussions/{id}/comments/delete/{comment_id}",
            delete(delete_comment),
        )
        .route("/api/discussions/{id}/ws", get(discussion_socket))
        .route_layer(from_fn_with_state(app_state.clone(), auth_middleware));

    router
        .route("/api/discussions", get(list_discussions))
        .route("/api/discussions/is-title-taken/{title}", get(is_title_taken))
        .merge(protected)
}

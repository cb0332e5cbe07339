pub mod error;
pub mod live;
pub mod page;
pub mod rsvp;
pub mod state;
pub mod talk;
pub mod validate;

use axum::{
    Router,
    routing::{get, post},
};

pub use page::Pages;
pub use state::{AppState, AppStateInner};

/// API and page routes. Static files and HTTP layers are added by the server.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(page::index))
        .route("/live", get(live::redirect))
        .route("/api/content", get(page::content))
        .route(
            "/api/talk",
            get(talk::list_talks)
                .post(talk::write_talk)
                .patch(talk::edit_talk),
        )
        .route("/api/talk/list", get(talk::list_talks))
        .route("/api/talk/checkpw", get(talk::check_password))
        .route("/rsvp", get(rsvp::page).post(rsvp::submit))
        .route("/api/rsvp", post(rsvp::respond))
        .with_state(state)
}

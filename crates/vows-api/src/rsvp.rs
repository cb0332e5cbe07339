use axum::{
    Form, Json,
    extract::{RawQuery, State},
    response::Html,
};
use axum_extra::extract::WithRejection;

use vows_types::api::{PostRsvpRequest, PostRsvpResponse};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate;

pub async fn respond(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<PostRsvpRequest>, ApiError>,
) -> Result<Json<PostRsvpResponse>, ApiError> {
    validate::post_rsvp(&req)?;

    let rsvp = state.rsvp.respond(&req.id, req.msg).await?;
    Ok(Json(PostRsvpResponse { id: rsvp.id }))
}

/// Invitation links carry the guest id as the whole query string, `/rsvp?kim-family`.
pub async fn page(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Html<String>, ApiError> {
    let guest_id = query.unwrap_or_default();
    Ok(Html(state.pages.rsvp(&state.content, &guest_id)?))
}

/// Form post from the RSVP page; answers with the thank-you page.
pub async fn submit(
    State(state): State<AppState>,
    WithRejection(Form(req), _): WithRejection<Form<PostRsvpRequest>, ApiError>,
) -> Result<Html<String>, ApiError> {
    validate::post_rsvp(&req)?;

    let rsvp = state.rsvp.respond(&req.id, req.msg).await?;
    Ok(Html(state.pages.rsvp_done(&state.content, rsvp.msg)?))
}

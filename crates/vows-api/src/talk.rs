use axum::{
    Json,
    extract::{Query, State},
};
use axum_extra::extract::{
    WithRejection,
    cookie::{Cookie, CookieJar, SameSite},
};

use vows_db::EditOutcome;
use vows_types::api::{
    CheckPasswordQuery, CheckPasswordResponse, GetTalkListResponse, PatchTalkRequest,
    PatchTalkResponse, PostTalkRequest, PostTalkResponse, TalkListQuery,
};

use crate::error::ApiError;
use crate::state::AppState;
use crate::validate;

/// Holds the id of the visitor's latest guestbook entry so they keep seeing it
/// before it is published.
pub const TALK_ID_COOKIE: &str = "talkId";

const TALK_ID_MAX_AGE_DAYS: i64 = 14;

const NO_MATCH: &str = "no matching entry, or the password is wrong";

/// `?myId=` wins over the cookie when both are present.
pub async fn list_talks(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Query(query), _): WithRejection<Query<TalkListQuery>, ApiError>,
) -> Result<Json<GetTalkListResponse>, ApiError> {
    let viewer = query
        .my_id
        .or_else(|| jar.get(TALK_ID_COOKIE).map(|c| c.value().to_string()));

    let talks = state.guestbook.list(viewer.as_deref()).await?;
    Ok(Json(GetTalkListResponse { talks }))
}

pub async fn write_talk(
    State(state): State<AppState>,
    jar: CookieJar,
    WithRejection(Json(mut req), _): WithRejection<Json<PostTalkRequest>, ApiError>,
) -> Result<(CookieJar, Json<PostTalkResponse>), ApiError> {
    validate::post_talk(&mut req)?;

    let talk = state.guestbook.write(req).await?;

    let cookie = Cookie::build((TALK_ID_COOKIE, talk.id.clone()))
        .path("/")
        .same_site(SameSite::Strict)
        .secure(state.secure_cookies)
        .max_age(time::Duration::days(TALK_ID_MAX_AGE_DAYS));

    Ok((jar.add(cookie), Json(PostTalkResponse { id: talk.id })))
}

/// A failed password check is an ordinary answer, not an HTTP error.
pub async fn edit_talk(
    State(state): State<AppState>,
    WithRejection(Json(mut req), _): WithRejection<Json<PatchTalkRequest>, ApiError>,
) -> Result<Json<PatchTalkResponse>, ApiError> {
    validate::patch_talk(&mut req)?;

    let resp = match state.guestbook.edit(req).await? {
        EditOutcome::Updated => PatchTalkResponse::default(),
        EditOutcome::NoMatch => PatchTalkResponse {
            error: Some(NO_MATCH.to_string()),
        },
    };
    Ok(Json(resp))
}

pub async fn check_password(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<CheckPasswordQuery>, ApiError>,
) -> Result<Json<CheckPasswordResponse>, ApiError> {
    let check = state
        .guestbook
        .check_password(&query.id, &query.password)
        .await?;
    Ok(Json(CheckPasswordResponse { check }))
}

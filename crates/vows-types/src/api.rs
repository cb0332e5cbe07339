use serde::{Deserialize, Serialize};

use crate::models::{Party, RsvpAnswer, Talk};

// -- Guestbook --

#[derive(Debug, Default, Deserialize)]
pub struct TalkListQuery {
    #[serde(rename = "myId")]
    pub my_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct GetTalkListResponse {
    pub talks: Vec<Talk>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostTalkRequest {
    pub author: String,
    #[serde(default)]
    pub color: String,
    pub party: Party,
    pub msg: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostTalkResponse {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatchTalkRequest {
    pub id: String,
    pub author: String,
    #[serde(default)]
    pub color: String,
    pub party: Party,
    pub msg: String,
    pub password: String,
}

/// Empty object on success; `error` is set when no entry matched id and password.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct PatchTalkResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CheckPasswordQuery {
    pub id: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CheckPasswordResponse {
    pub check: bool,
}

// -- RSVP --

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PostRsvpRequest {
    #[serde(default)]
    pub id: String,
    pub msg: RsvpAnswer,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PostRsvpResponse {
    pub id: String,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

//! Input rules for guestbook and RSVP submissions.

use vows_types::api::{PatchTalkRequest, PostRsvpRequest, PostTalkRequest};

use crate::error::ApiError;

pub const DEFAULT_COLOR: &str = "#ECC8F7";

const AUTHOR_MAX: usize = 10;
const MSG_MIN: usize = 5;
const MSG_MAX: usize = 100;
const PASSWORD_MIN: usize = 4;
const RSVP_ID_MAX: usize = 64;

pub fn post_talk(req: &mut PostTalkRequest) -> Result<(), ApiError> {
    talk_content(&req.author, &req.msg, &mut req.color)?;

    if req.password.is_empty() {
        return Err(invalid("password is required"));
    }
    if req.password.chars().count() < PASSWORD_MIN {
        return Err(invalid("password must be at least 4 characters"));
    }
    Ok(())
}

/// The password is only compared, never re-hashed, so only its presence is checked.
pub fn patch_talk(req: &mut PatchTalkRequest) -> Result<(), ApiError> {
    if req.id.is_empty() {
        return Err(invalid("id is required"));
    }
    if req.password.is_empty() {
        return Err(invalid("password is required"));
    }
    talk_content(&req.author, &req.msg, &mut req.color)
}

pub fn post_rsvp(req: &PostRsvpRequest) -> Result<(), ApiError> {
    if req.id.chars().count() > RSVP_ID_MAX {
        return Err(invalid("id is too long"));
    }
    Ok(())
}

/// Lengths count characters of the text as submitted. Whitespace-only text is
/// rejected separately.
fn talk_content(author: &str, msg: &str, color: &mut String) -> Result<(), ApiError> {
    let author_len = author.chars().count();
    if author_len == 0 {
        return Err(invalid("author is required"));
    }
    if author_len > AUTHOR_MAX {
        return Err(invalid("author must be at most 10 characters"));
    }
    if author.trim().is_empty() {
        return Err(invalid("author must not be blank"));
    }

    let msg_len = msg.chars().count();
    if msg_len == 0 {
        return Err(invalid("message is required"));
    }
    if msg_len < MSG_MIN {
        return Err(invalid("message must be at least 5 characters"));
    }
    if msg_len > MSG_MAX {
        return Err(invalid("message must be at most 100 characters"));
    }
    if msg.trim().is_empty() {
        return Err(invalid("message must not be blank"));
    }

    if color.is_empty() {
        *color = DEFAULT_COLOR.to_string();
    } else if !is_hex_color(color) {
        return Err(invalid("color must look like #rrggbb"));
    }
    Ok(())
}

fn is_hex_color(color: &str) -> bool {
    match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => false,
    }
}

fn invalid(msg: &str) -> ApiError {
    ApiError::Invalid(msg.to_string())
}

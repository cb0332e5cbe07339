//! Static page content. Read once from a JSON file at startup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    // meta
    pub html_title: String,
    pub html_desc: String,
    pub og_title: String,
    pub og_desc: String,
    pub og_image_url: String,

    // card
    pub groom_full_name: String,
    pub bride_full_name: String,
    pub datetime: String,
    pub venue: Venue,
    #[serde(default)]
    pub link: Option<Link>,
    pub greeting: Greeting,
    pub groom_contact: String,
    pub bride_contact: String,
    #[serde(default)]
    pub groom_give: Vec<GiftAccount>,
    #[serde(default)]
    pub bride_give: Vec<GiftAccount>,
    #[serde(default)]
    pub photos: Vec<Photo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Venue {
    pub desc: String,
    pub address: String,
    pub kakao_map_url: String,
    pub naver_map_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Greeting {
    pub title: String,
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GiftAccount {
    pub name: String,
    pub account: String,
}

/// A gallery image. `object_position` is a CSS `object-position` value for the thumbnail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_position: Option<String>,
}

impl Content {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

use std::sync::Arc;

use vows_db::{Guestbook, RsvpBook};
use vows_types::content::Content;

use crate::live::LiveLink;
use crate::page::Pages;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub guestbook: Guestbook,
    pub rsvp: RsvpBook,
    pub content: Content,
    pub live: LiveLink,
    pub pages: Pages,
    /// Mark the visitor cookie `Secure`. Off for plain-http development.
    pub secure_cookies: bool,
}

use anyhow::Result;
use axum::{
    Json,
    extract::State,
    response::Html,
};
use tera::{Context, Tera};

use vows_types::content::Content;
use vows_types::models::RsvpAnswer;

use crate::error::ApiError;
use crate::state::AppState;

/// Server-rendered pages. Templates are compiled into the binary; names end
/// in `.html` so Tera escapes every interpolated value.
pub struct Pages {
    tera: Tera,
}

impl Pages {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("base.html", include_str!("../templates/base.html")),
            ("index.html", include_str!("../templates/index.html")),
            ("live.html", include_str!("../templates/live.html")),
            ("rsvp.html", include_str!("../templates/rsvp.html")),
            ("rsvp_done.html", include_str!("../templates/rsvp_done.html")),
        ])?;
        Ok(Self { tera })
    }

    pub fn index(&self, c: &Content) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("greeting", &greeting_lines(c));
        self.render("index.html", c, ctx)
    }

    /// Shown on `/live` until the stream link is up.
    pub fn live_pending(&self, c: &Content) -> Result<String> {
        self.render("live.html", c, Context::new())
    }

    pub fn rsvp(&self, c: &Content, guest_id: &str) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("guest_id", guest_id);
        self.render("rsvp.html", c, ctx)
    }

    pub fn rsvp_done(&self, c: &Content, answer: RsvpAnswer) -> Result<String> {
        let mut ctx = Context::new();
        ctx.insert("answer", answer.as_str());
        self.render("rsvp_done.html", c, ctx)
    }

    fn render(&self, name: &str, c: &Content, mut ctx: Context) -> Result<String> {
        ctx.insert("c", c);
        Ok(self.tera.render(name, &ctx)?)
    }
}

pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    Ok(Html(state.pages.index(&state.content)?))
}

pub async fn content(State(state): State<AppState>) -> Json<Content> {
    Json(state.content.clone())
}

/// Greeting paragraphs keep their line breaks; indentation from the config file is dropped.
fn greeting_lines(c: &Content) -> Vec<Vec<&str>> {
    c.greeting
        .content
        .iter()
        .map(|paragraph| paragraph.lines().map(str::trim).collect())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vows_types::content::{GiftAccount, Greeting, Link, Photo, Venue};

    fn content() -> Content {
        Content {
            html_title: "Jun & Mina".into(),
            html_desc: "We are getting married".into(),
            og_title: "Jun & Mina".into(),
            og_desc: "September 25".into(),
            og_image_url: "https://example.com/og.jpg".into(),
            groom_full_name: "Jun".into(),
            bride_full_name: "<Mina>".into(),
            datetime: "Sunday, September 25, 1 PM".into(),
            venue: Venue {
                desc: "Garden Hall".into(),
                address: "1 Main St".into(),
                kakao_map_url: "https://place.map.kakao.com/1".into(),
                naver_map_url: "https://map.naver.com/1".into(),
            },
            link: Some(Link {
                label: "Shuttle".into(),
                url: "https://example.com/shuttle?a=1&b=2".into(),
            }),
            greeting: Greeting {
                title: "Hello".into(),
                content: vec!["first line\n       second line".into()],
            },
            groom_contact: "tel:000".into(),
            bride_contact: "tel:111".into(),
            groom_give: vec![GiftAccount {
                name: "Jun".into(),
                account: "Bank 110-000".into(),
            }],
            bride_give: vec![],
            photos: vec![Photo {
                url: "/photos/p01.jpeg".into(),
                object_position: Some("top".into()),
            }],
        }
    }

    #[test]
    fn escapes_content() {
        let html = Pages::new().unwrap().index(&content()).unwrap();
        assert!(html.contains("<title>Jun &amp; Mina</title>"));
        assert!(html.contains("&lt;Mina&gt;"));
        assert!(!html.contains("<Mina>"));
        assert!(html.contains("shuttle?a=1&amp;b=2"));
        assert!(!html.contains("a=1&b=2"));
    }

    #[test]
    fn renders_sections() {
        let html = Pages::new().unwrap().index(&content()).unwrap();
        assert!(html.contains("first line<br>second line"));
        assert!(html.contains("style=\"object-position: top\""));
        assert!(html.contains("place.map.kakao.com&#x2F;1"));
        assert!(html.contains("Bank 110-000"));
        assert!(html.contains("Groom's side"));
        assert!(!html.contains("Bride's side"));
    }

    #[test]
    fn optional_sections_are_left_out() {
        let mut c = content();
        c.link = None;
        c.photos.clear();
        c.groom_give.clear();

        let html = Pages::new().unwrap().index(&c).unwrap();
        assert!(!html.contains("Shuttle"));
        assert!(!html.contains("class=\"gallery\""));
        assert!(!html.contains("class=\"give\""));
    }

    #[test]
    fn live_pending_mentions_date() {
        let html = Pages::new().unwrap().live_pending(&content()).unwrap();
        assert!(html.contains("Sunday, September 25, 1 PM"));
        assert!(html.contains("<title>Jun &amp; Mina</title>"));
    }

    #[test]
    fn rsvp_forms_carry_the_guest_id() {
        let html = Pages::new().unwrap().rsvp(&content(), "kim\"family").unwrap();
        assert_eq!(html.matches("value=\"kim&quot;family\"").count(), 3);
        for answer in ["yes", "no", "idk"] {
            assert!(html.contains(&format!("name=\"msg\" value=\"{}\"", answer)));
        }
    }

    #[test]
    fn rsvp_done_depends_on_answer() {
        let pages = Pages::new().unwrap();
        let yes = pages.rsvp_done(&content(), RsvpAnswer::Yes).unwrap();
        let no = pages.rsvp_done(&content(), RsvpAnswer::No).unwrap();
        assert!(yes.contains("answer-yes"));
        assert!(no.contains("answer-no"));
        assert!(yes.contains("href=\"/\""));
    }
}

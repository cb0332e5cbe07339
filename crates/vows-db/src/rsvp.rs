use std::sync::Arc;

use anyhow::Result;
use chrono::{FixedOffset, Utc};
use tokio::sync::OnceCell;
use tracing::info;

use vows_types::models::{Rsvp, RsvpAnswer};

use crate::models::{RSVP_HEADER, rsvp_record};
use crate::{Worksheet, ensure_header};

/// Append-only log of meal attendance answers.
pub struct RsvpBook {
    sheet: Arc<dyn Worksheet>,
    offset: FixedOffset,
    header: OnceCell<()>,
}

impl RsvpBook {
    pub fn new(sheet: Arc<dyn Worksheet>, offset: FixedOffset) -> Self {
        Self {
            sheet,
            offset,
            header: OnceCell::new(),
        }
    }

    /// Record an answer. An empty `id` gets one generated from the current time.
    pub async fn respond(&self, id: &str, answer: RsvpAnswer) -> Result<Rsvp> {
        self.header
            .get_or_try_init(|| ensure_header(self.sheet.as_ref(), &RSVP_HEADER))
            .await?;

        let created = Utc::now();
        let id = if id.is_empty() {
            created.timestamp_millis().to_string()
        } else {
            id.to_string()
        };
        let rsvp = Rsvp {
            id,
            msg: answer,
            created,
        };

        self.sheet.add_row(rsvp_record(&rsvp, self.offset)).await?;

        info!("RSVP '{}' from {}", answer.as_str(), rsvp.id);
        Ok(rsvp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Database;

    #[tokio::test]
    async fn answers_are_appended() {
        let db = Database::open_in_memory().unwrap();
        let sheet: Arc<dyn Worksheet> = Arc::new(db.sheet("rsvp"));
        let book = RsvpBook::new(sheet.clone(), FixedOffset::east_opt(9 * 3600).unwrap());

        book.respond("kim-family", RsvpAnswer::Yes).await.unwrap();
        book.respond("kim-family", RsvpAnswer::No).await.unwrap();
        let generated = book.respond("", RsvpAnswer::Unsure).await.unwrap();
        assert!(generated.id.parse::<i64>().is_ok());

        assert_eq!(sheet.header_row().await.unwrap(), RSVP_HEADER);
        let rows = sheet.rows().await.unwrap();
        let answers: Vec<&str> = rows.iter().map(|r| r.get("msg")).collect();
        assert_eq!(answers, ["yes", "no", "idk"]);
        assert_eq!(rows[0].get("id"), "kim-family");
        assert!(!rows[0].get("created").is_empty());
    }
}

use std::sync::Arc;

use anyhow::Result;
use chrono::{FixedOffset, Utc};
use tokio::sync::OnceCell;
use tracing::{info, warn};

use vows_crypto::hash_password;
use vows_types::api::{PatchTalkRequest, PostTalkRequest};
use vows_types::models::Talk;

use crate::models::{FALSE, TALK_HEADER, TalkRow};
use crate::{SheetRow, Worksheet, ensure_header};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Updated,
    /// No row has this id, or the password is wrong. Nothing was written.
    NoMatch,
}

/// Guestbook entries kept in a worksheet.
///
/// Entries are created unpublished and go back to unpublished whenever they
/// are edited. Publishing happens in the sheet itself, by whoever moderates it.
pub struct Guestbook {
    sheet: Arc<dyn Worksheet>,
    offset: FixedOffset,
    header: OnceCell<()>,
}

impl Guestbook {
    pub fn new(sheet: Arc<dyn Worksheet>, offset: FixedOffset) -> Self {
        Self {
            sheet,
            offset,
            header: OnceCell::new(),
        }
    }

    async fn sheet(&self) -> Result<&dyn Worksheet> {
        self.header
            .get_or_try_init(|| ensure_header(self.sheet.as_ref(), &TALK_HEADER))
            .await?;
        Ok(self.sheet.as_ref())
    }

    /// Published entries plus the viewer's own, newest first.
    pub async fn list(&self, viewer: Option<&str>) -> Result<Vec<Talk>> {
        let viewer = viewer.filter(|id| !id.is_empty());
        let rows = self.sheet().await?.rows().await?;

        let mut talks: Vec<Talk> = rows
            .iter()
            .filter_map(|row| match TalkRow::from_sheet(row, self.offset) {
                Ok(talk) => Some(talk),
                Err(e) => {
                    warn!("Skipping guestbook row: {}", e);
                    None
                }
            })
            .filter(|talk| talk.published || Some(talk.id.as_str()) == viewer)
            .map(TalkRow::into_talk)
            .collect();

        talks.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| b.id.cmp(&a.id)));
        Ok(talks)
    }

    pub async fn write(&self, req: PostTalkRequest) -> Result<Talk> {
        let created = Utc::now();
        let row = TalkRow {
            id: created.timestamp_millis().to_string(),
            author: req.author,
            color: req.color,
            party: req.party,
            msg: req.msg,
            created,
            password: hash_password(&req.password)?,
            published: false,
        };

        self.sheet().await?.add_row(row.to_record(self.offset)).await?;

        info!("Guestbook entry {} written", row.id);
        Ok(row.into_talk())
    }

    pub async fn check_password(&self, id: &str, password: &str) -> Result<bool> {
        Ok(self.find(id, password).await?.is_some())
    }

    /// Replace the content of an entry whose id and password match.
    pub async fn edit(&self, req: PatchTalkRequest) -> Result<EditOutcome> {
        let Some(mut row) = self.find(&req.id, &req.password).await? else {
            return Ok(EditOutcome::NoMatch);
        };

        row.set("author", req.author);
        row.set("color", req.color);
        row.set("party", req.party.as_str());
        row.set("msg", req.msg);
        row.set("published", FALSE);
        self.sheet().await?.save_row(&row).await?;

        info!("Guestbook entry {} edited, back to unpublished", req.id);
        Ok(EditOutcome::Updated)
    }

    async fn find(&self, id: &str, password: &str) -> Result<Option<SheetRow>> {
        let hashed = hash_password(password)?;
        let rows = self.sheet().await?.rows().await?;

        Ok(rows
            .into_iter()
            .find(|row| row.get("id") == id && row.get("password") == hashed))
    }
}

//! Sheet row types, mapped to and from header-keyed cells.
//! Distinct from vows-types API models so the password hash never leaves this crate.

use anyhow::{Result, anyhow};
use chrono::{DateTime, FixedOffset, Utc};
use vows_types::models::{Party, Rsvp, Talk};

use crate::{Record, SheetRow, sheet_time};

pub const TALK_HEADER: [&str; 8] = [
    "id",
    "author",
    "color",
    "party",
    "msg",
    "created",
    "password",
    "published",
];

pub const RSVP_HEADER: [&str; 3] = ["id", "msg", "created"];

pub(crate) const TRUE: &str = "TRUE";
pub(crate) const FALSE: &str = "FALSE";

pub struct TalkRow {
    pub id: String,
    pub author: String,
    pub color: String,
    pub party: Party,
    pub msg: String,
    pub created: DateTime<Utc>,
    pub password: String,
    pub published: bool,
}

impl TalkRow {
    pub fn from_sheet(row: &SheetRow, offset: FixedOffset) -> Result<Self> {
        let id = row.get("id");
        if id.is_empty() {
            return Err(anyhow!("row {} has no id", row.row_number));
        }

        let party = row
            .get("party")
            .parse::<Party>()
            .map_err(|e| anyhow!("row {}: {}", row.row_number, e))?;

        // Rows typed in by hand may lack a usable date; ids are creation millis.
        let created = sheet_time::parse(row.get("created"), offset)
            .or_else(|| id.parse::<i64>().ok().and_then(DateTime::from_timestamp_millis))
            .ok_or_else(|| anyhow!("row {}: bad created '{}'", row.row_number, row.get("created")))?;

        Ok(Self {
            id: id.to_string(),
            author: row.get("author").to_string(),
            color: row.get("color").to_string(),
            party,
            msg: row.get("msg").to_string(),
            created,
            password: row.get("password").to_string(),
            published: row.get("published") == TRUE,
        })
    }

    pub fn to_record(&self, offset: FixedOffset) -> Record {
        let published = if self.published { TRUE } else { FALSE };
        [
            ("id", self.id.clone()),
            ("author", self.author.clone()),
            ("color", self.color.clone()),
            ("party", self.party.as_str().to_string()),
            ("msg", self.msg.clone()),
            ("created", sheet_time::format(self.created, offset)),
            ("password", self.password.clone()),
            ("published", published.to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    pub fn into_talk(self) -> Talk {
        Talk {
            id: self.id,
            author: self.author,
            color: self.color,
            party: self.party,
            msg: self.msg,
            created: self.created,
            published: self.published,
        }
    }
}

pub fn rsvp_record(rsvp: &Rsvp, offset: FixedOffset) -> Record {
    [
        ("id", rsvp.id.clone()),
        ("msg", rsvp.msg.as_str().to_string()),
        ("created", sheet_time::format(rsvp.created, offset)),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seoul() -> FixedOffset {
        FixedOffset::east_opt(9 * 3600).unwrap()
    }

    fn sheet_row(pairs: &[(&str, &str)]) -> SheetRow {
        SheetRow {
            row_number: 2,
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn only_exact_true_is_published() {
        let mut row = sheet_row(&[
            ("id", "1681527600000"),
            ("party", "GROOM"),
            ("created", "4/15/2023 12:00:00 PM"),
            ("published", "TRUE"),
        ]);
        assert!(TalkRow::from_sheet(&row, seoul()).unwrap().published);

        row.set("published", "true");
        assert!(!TalkRow::from_sheet(&row, seoul()).unwrap().published);
    }

    #[test]
    fn falls_back_to_id_when_created_is_unreadable() {
        let row = sheet_row(&[("id", "1681527600000"), ("party", "BRIDE"), ("created", "?")]);
        let talk = TalkRow::from_sheet(&row, seoul()).unwrap();
        assert_eq!(talk.created.timestamp_millis(), 1_681_527_600_000);
    }

    #[test]
    fn rejects_unknown_party() {
        let row = sheet_row(&[("id", "1"), ("party", "BOTH"), ("created", "4/15/2023 12:00:00 PM")]);
        assert!(TalkRow::from_sheet(&row, seoul()).is_err());
    }
}

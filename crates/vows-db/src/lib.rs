pub mod google;
pub mod guestbook;
pub mod migrations;
pub mod models;
pub mod rsvp;
pub mod sheet_time;
pub mod sqlite;

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::Connection;
use tracing::info;

pub use guestbook::{EditOutcome, Guestbook};
pub use rsvp::RsvpBook;
pub use sqlite::SqliteSheet;

/// Cell values of one row, keyed by header name.
pub type Record = BTreeMap<String, String>;

/// A data row together with its position in the sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetRow {
    /// 1-based, like the sheet itself. Row 1 is the header, so data starts at 2.
    pub row_number: usize,
    pub values: Record,
}

impl SheetRow {
    /// Missing cells read as empty.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        self.values.insert(column.to_string(), value.into());
    }
}

/// One tab of a spreadsheet: a header row naming the columns, then data rows.
///
/// Values are written as raw text. Columns are matched by header name; values
/// for columns the header does not have are dropped on write.
#[async_trait]
pub trait Worksheet: Send + Sync {
    async fn header_row(&self) -> Result<Vec<String>>;

    async fn set_header_row(&self, header: &[&str]) -> Result<()>;

    async fn rows(&self) -> Result<Vec<SheetRow>>;

    async fn add_row(&self, values: Record) -> Result<()>;

    /// Overwrite the row at `row.row_number`.
    async fn save_row(&self, row: &SheetRow) -> Result<()>;
}

/// Write `header` unless the sheet already has one.
pub async fn ensure_header(sheet: &dyn Worksheet, header: &[&str]) -> Result<()> {
    let existing = sheet.header_row().await?;
    if existing.iter().all(|h| h.is_empty()) {
        sheet.set_header_row(header).await?;
        info!("Wrote header row: {}", header.join(", "));
    }
    Ok(())
}

/// Local SQLite file standing in for a spreadsheet document.
/// Each named sheet is one tab.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        migrations::run(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        migrations::run(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn sheet(&self, name: &str) -> SqliteSheet {
        SqliteSheet::new(self.conn.clone(), name)
    }
}

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rusqlite::Connection;

use crate::{Record, SheetRow, Worksheet};

/// A worksheet stored in the local SQLite file.
#[derive(Clone)]
pub struct SqliteSheet {
    conn: Arc<Mutex<Connection>>,
    name: String,
}

impl SqliteSheet {
    pub(crate) fn new(conn: Arc<Mutex<Connection>>, name: &str) -> Self {
        Self {
            conn,
            name: name.to_string(),
        }
    }

    /// Run blocking DB work off the async runtime.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, &str) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        let name = self.name.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| anyhow!("DB lock poisoned: {}", e))?;
            f(&conn, &name)
        })
        .await?
    }
}

#[async_trait]
impl Worksheet for SqliteSheet {
    async fn header_row(&self) -> Result<Vec<String>> {
        self.with_conn(|conn, sheet| query_header(conn, sheet)).await
    }

    async fn set_header_row(&self, header: &[&str]) -> Result<()> {
        let columns = serde_json::to_string(header)?;
        self.with_conn(move |conn, sheet| {
            conn.execute(
                "INSERT OR REPLACE INTO sheet_headers (sheet, columns) VALUES (?1, ?2)",
                (sheet, &columns),
            )?;
            Ok(())
        })
        .await
    }

    async fn rows(&self) -> Result<Vec<SheetRow>> {
        self.with_conn(|conn, sheet| {
            let mut stmt = conn.prepare(
                "SELECT row_number, data FROM sheet_rows WHERE sheet = ?1 ORDER BY row_number",
            )?;

            let raw = stmt
                .query_map([sheet], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            raw.into_iter()
                .map(|(row_number, data)| -> Result<SheetRow> {
                    Ok(SheetRow {
                        row_number: usize::try_from(row_number)?,
                        values: serde_json::from_str(&data)?,
                    })
                })
                .collect()
        })
        .await
    }

    async fn add_row(&self, values: Record) -> Result<()> {
        self.with_conn(move |conn, sheet| {
            let header = query_header(conn, sheet)?;
            if header.is_empty() {
                return Err(anyhow!("Sheet '{}' has no header row", sheet));
            }
            let data = serde_json::to_string(&keep_header_columns(&header, values))?;

            // Row 1 is the header.
            conn.execute(
                "INSERT INTO sheet_rows (sheet, row_number, data)
                 VALUES (?1, (SELECT COALESCE(MAX(row_number), 1) + 1 FROM sheet_rows WHERE sheet = ?1), ?2)",
                (sheet, &data),
            )?;
            Ok(())
        })
        .await
    }

    async fn save_row(&self, row: &SheetRow) -> Result<()> {
        let row_number = i64::try_from(row.row_number)?;
        let values = row.values.clone();
        self.with_conn(move |conn, sheet| {
            let header = query_header(conn, sheet)?;
            let data = serde_json::to_string(&keep_header_columns(&header, values))?;

            let changed = conn.execute(
                "UPDATE sheet_rows SET data = ?3 WHERE sheet = ?1 AND row_number = ?2",
                (sheet, row_number, &data),
            )?;
            if changed == 0 {
                return Err(anyhow!("Sheet '{}' has no row {}", sheet, row_number));
            }
            Ok(())
        })
        .await
    }
}

fn query_header(conn: &Connection, sheet: &str) -> Result<Vec<String>> {
    let columns: Option<String> = conn
        .query_row(
            "SELECT columns FROM sheet_headers WHERE sheet = ?1",
            [sheet],
            |row| row.get(0),
        )
        .optional()?;

    match columns {
        Some(json) => Ok(serde_json::from_str(&json)?),
        None => Ok(vec![]),
    }
}

fn keep_header_columns(header: &[String], mut values: Record) -> Record {
    values.retain(|column, _| header.contains(column));
    values
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, ensure_header};

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn header_is_written_once() {
        let db = Database::open_in_memory().unwrap();
        let sheet = db.sheet("talk");
        assert!(sheet.header_row().await.unwrap().is_empty());

        ensure_header(&sheet, &["id", "msg"]).await.unwrap();
        ensure_header(&sheet, &["other"]).await.unwrap();

        assert_eq!(sheet.header_row().await.unwrap(), vec!["id", "msg"]);
    }

    #[tokio::test]
    async fn rows_are_numbered_after_header_and_filtered_to_columns() {
        let db = Database::open_in_memory().unwrap();
        let sheet = db.sheet("talk");
        sheet.set_header_row(&["id", "msg"]).await.unwrap();

        sheet
            .add_row(record(&[("id", "1"), ("msg", "hello"), ("extra", "x")]))
            .await
            .unwrap();
        sheet.add_row(record(&[("id", "2")])).await.unwrap();

        let rows = sheet.rows().await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("msg"), "hello");
        assert_eq!(rows[0].get("extra"), "");
        assert_eq!(rows[1].row_number, 3);
        assert_eq!(rows[1].get("msg"), "");
    }

    #[tokio::test]
    async fn add_row_without_header_fails() {
        let db = Database::open_in_memory().unwrap();
        let sheet = db.sheet("rsvp");
        assert!(sheet.add_row(record(&[("id", "1")])).await.is_err());
    }

    #[tokio::test]
    async fn save_row_overwrites_in_place() {
        let db = Database::open_in_memory().unwrap();
        let sheet = db.sheet("talk");
        sheet.set_header_row(&["id", "msg"]).await.unwrap();
        sheet.add_row(record(&[("id", "1"), ("msg", "before")])).await.unwrap();

        let mut row = sheet.rows().await.unwrap().remove(0);
        row.set("msg", "after");
        sheet.save_row(&row).await.unwrap();

        let rows = sheet.rows().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("msg"), "after");

        row.row_number = 99;
        assert!(sheet.save_row(&row).await.is_err());
    }

    #[tokio::test]
    async fn sheets_in_one_file_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::open(&dir.path().join("vows.db")).unwrap();
        let talk = db.sheet("talk");
        let rsvp = db.sheet("rsvp");
        talk.set_header_row(&["id"]).await.unwrap();
        rsvp.set_header_row(&["id"]).await.unwrap();

        talk.add_row(record(&[("id", "t")])).await.unwrap();

        assert_eq!(talk.rows().await.unwrap().len(), 1);
        assert!(rsvp.rows().await.unwrap().is_empty());
    }
}

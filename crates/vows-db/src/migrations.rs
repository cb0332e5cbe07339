use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS sheet_headers (
            sheet       TEXT PRIMARY KEY,
            columns     TEXT NOT NULL
        );

        -- data is a JSON object of column name -> cell text
        CREATE TABLE IF NOT EXISTS sheet_rows (
            sheet       TEXT NOT NULL,
            row_number  INTEGER NOT NULL,
            data        TEXT NOT NULL,
            PRIMARY KEY (sheet, row_number)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}

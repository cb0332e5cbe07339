//! Google Sheets API v4 worksheet, authenticated as a service account.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::{Client, Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::{Record, SheetRow, Worksheet};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const JWT_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Tokens are refreshed this long before Google says they expire.
const TOKEN_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub client_email: String,
    /// PEM-encoded RSA key.
    pub private_key: String,
}

#[derive(Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// OAuth access tokens for one service account, shared by its worksheets.
pub struct GoogleAuth {
    account: ServiceAccount,
    http: Client,
    token: Mutex<Option<CachedToken>>,
}

impl GoogleAuth {
    pub fn new(account: ServiceAccount, http: Client) -> Self {
        Self {
            account,
            http,
            token: Mutex::new(None),
        }
    }

    pub async fn access_token(&self) -> Result<String> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref() {
            if token.expires_at > Instant::now() + TOKEN_MARGIN {
                return Ok(token.access_token.clone());
            }
        }

        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.account.client_email,
            scope: SCOPE,
            aud: TOKEN_URL,
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .context("Invalid service account private key")?;
        let assertion = encode(&Header::new(Algorithm::RS256), &claims, &key)?;

        let resp: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", JWT_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?
            .error_for_status()
            .context("Token exchange rejected")?
            .json()
            .await?;

        debug!("Fetched access token for {}", self.account.client_email);
        let access_token = resp.access_token.clone();
        *cached = Some(CachedToken {
            access_token: resp.access_token,
            expires_at: Instant::now() + Duration::from_secs(resp.expires_in),
        });
        Ok(access_token)
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetMeta>,
}

#[derive(Deserialize)]
struct SheetMeta {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
    index: usize,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

/// One tab of a Google spreadsheet.
pub struct GoogleSheet {
    auth: Arc<GoogleAuth>,
    http: Client,
    spreadsheet_id: String,
    title: String,
}

impl GoogleSheet {
    /// Look up the tab at `index` (0-based, in display order).
    pub async fn open_by_index(
        auth: Arc<GoogleAuth>,
        http: Client,
        spreadsheet_id: &str,
        index: usize,
    ) -> Result<Self> {
        let token = auth.access_token().await?;
        let mut url = spreadsheet_url(spreadsheet_id, &[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties(title,index)");

        let meta: SpreadsheetMeta = http
            .get(url)
            .bearer_auth(token)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("Cannot load spreadsheet {}", spreadsheet_id))?
            .json()
            .await?;

        let title = meta
            .sheets
            .into_iter()
            .map(|s| s.properties)
            .find(|p| p.index == index)
            .map(|p| p.title)
            .ok_or_else(|| anyhow!("Spreadsheet {} has no sheet at index {}", spreadsheet_id, index))?;

        info!("Using sheet '{}' of spreadsheet {}", title, spreadsheet_id);
        Ok(Self {
            auth,
            http,
            spreadsheet_id: spreadsheet_id.to_string(),
            title,
        })
    }

    /// A1 range covering the whole tab, or one of its rows.
    fn range(&self, row: Option<usize>) -> String {
        let quoted = format!("'{}'", self.title.replace('\'', "''"));
        match row {
            Some(n) => format!("{}!{}:{}", quoted, n, n),
            None => quoted,
        }
    }

    async fn send(&self, method: Method, url: Url, body: Option<serde_json::Value>) -> Result<reqwest::Response> {
        let token = self.auth.access_token().await?;
        let mut req = self.http.request(method, url).bearer_auth(token);
        if let Some(body) = body {
            req = req.json(&body);
        }
        Ok(req.send().await?.error_for_status()?)
    }

    async fn get_values(&self, range: &str) -> Result<Vec<Vec<String>>> {
        let url = spreadsheet_url(&self.spreadsheet_id, &["values", range])?;
        let values: ValueRange = self.send(Method::GET, url, None).await?.json().await?;
        Ok(values.values)
    }

    async fn put_row(&self, row_number: usize, cells: Vec<String>) -> Result<()> {
        let range = self.range(Some(row_number));
        let mut url = spreadsheet_url(&self.spreadsheet_id, &["values", &range])?;
        url.query_pairs_mut().append_pair("valueInputOption", "RAW");
        self.send(Method::PUT, url, Some(json!({ "values": [cells] })))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Worksheet for GoogleSheet {
    async fn header_row(&self) -> Result<Vec<String>> {
        let rows = self.get_values(&self.range(Some(1))).await?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    async fn set_header_row(&self, header: &[&str]) -> Result<()> {
        let cells = header.iter().map(|h| h.to_string()).collect();
        self.put_row(1, cells).await
    }

    async fn rows(&self) -> Result<Vec<SheetRow>> {
        Ok(grid_to_rows(self.get_values(&self.range(None)).await?))
    }

    async fn add_row(&self, values: Record) -> Result<()> {
        let header = self.header_row().await?;
        if header.is_empty() {
            return Err(anyhow!("Sheet '{}' has no header row", self.title));
        }

        let range = format!("{}:append", self.range(None));
        let mut url = spreadsheet_url(&self.spreadsheet_id, &["values", &range])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "RAW")
            .append_pair("insertDataOption", "INSERT_ROWS");

        let cells = cells_in_header_order(&header, &values);
        self.send(Method::POST, url, Some(json!({ "values": [cells] })))
            .await?;
        Ok(())
    }

    async fn save_row(&self, row: &SheetRow) -> Result<()> {
        let header = self.header_row().await?;
        let cells = cells_in_header_order(&header, &row.values);
        self.put_row(row.row_number, cells).await
    }
}

fn spreadsheet_url(spreadsheet_id: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(SHEETS_API)?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("Sheets API URL cannot take path segments"))?
        .push(spreadsheet_id)
        .extend(segments);
    Ok(url)
}

/// Turn a `values` grid, header first, into data rows.
///
/// Trailing empty cells are omitted by the API, so short rows are padded and
/// blank rows come back empty. Blank rows are skipped but still counted.
fn grid_to_rows(grid: Vec<Vec<String>>) -> Vec<SheetRow> {
    let mut grid = grid.into_iter();
    let header = grid.next().unwrap_or_default();

    grid.enumerate()
        .filter(|(_, cells)| !cells.is_empty())
        .map(|(i, cells)| SheetRow {
            row_number: i + 2,
            values: header
                .iter()
                .cloned()
                .zip(cells.into_iter().chain(std::iter::repeat(String::new())))
                .collect(),
        })
        .collect()
}

fn cells_in_header_order(header: &[String], values: &Record) -> Vec<String> {
    header
        .iter()
        .map(|column| values.get(column).cloned().unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranges_quote_the_title() {
        let auth = Arc::new(GoogleAuth::new(
            ServiceAccount {
                client_email: "svc@example.iam.gserviceaccount.com".into(),
                private_key: String::new(),
            },
            Client::new(),
        ));
        let sheet = GoogleSheet {
            auth,
            http: Client::new(),
            spreadsheet_id: "abc".into(),
            title: "Guest's book".into(),
        };

        assert_eq!(sheet.range(None), "'Guest''s book'");
        assert_eq!(sheet.range(Some(4)), "'Guest''s book'!4:4");
    }

    #[test]
    fn urls_encode_ranges_as_one_segment() {
        let url = spreadsheet_url("abc", &["values", "'Sheet 1'!1:1"]).unwrap();
        assert_eq!(
            url.as_str(),
            "https://sheets.googleapis.com/v4/spreadsheets/abc/values/'Sheet%201'!1:1"
        );
    }

    fn grid(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|row| row.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn grid_rows_are_numbered_padded_and_skip_blanks() {
        let rows = grid_to_rows(grid(&[
            &["id", "msg", "published"],
            &["1", "hello", "TRUE"],
            &[],
            &["3", "short"],
        ]));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].row_number, 2);
        assert_eq!(rows[0].get("published"), "TRUE");
        assert_eq!(rows[1].row_number, 4);
        assert_eq!(rows[1].get("msg"), "short");
        assert_eq!(rows[1].values.get("published").map(String::as_str), Some(""));
    }

    #[test]
    fn grid_without_data_has_no_rows() {
        assert!(grid_to_rows(vec![]).is_empty());
        assert!(grid_to_rows(grid(&[&["id", "msg"]])).is_empty());
    }

    #[test]
    fn extra_cells_beyond_header_are_dropped() {
        let rows = grid_to_rows(grid(&[&["id"], &["1", "stray"]]));
        assert_eq!(rows[0].values.len(), 1);
    }

    #[test]
    fn cells_follow_header_order() {
        let header = vec!["id".to_string(), "note".to_string(), "msg".to_string()];
        let values = Record::from([
            ("msg".to_string(), "hi".to_string()),
            ("id".to_string(), "7".to_string()),
        ]);
        assert_eq!(cells_in_header_order(&header, &values), ["7", "", "hi"]);
    }
}

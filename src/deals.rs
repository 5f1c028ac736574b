// 📢 Deals Feed - Regional promotions from a published spreadsheet
//
// The sheet is fetched as CSV with the columns 地域 / カテゴリ / 情報内容 / 備考.
// Any failure along the way (network, HTTP status, malformed CSV, missing
// column) is reported to the user as ONE message. The cause is only logged.

use serde::{Deserialize, Serialize};
use std::io::Read;
use thiserror::Error;
use tracing::{debug, warn};

/// Shown on the panel for every kind of retrieval failure
pub const RETRIEVAL_FAILURE_MESSAGE: &str = "スプレッドシートの読み込みに失敗しました。";

// ============================================================================
// CORE TYPES
// ============================================================================

/// One row of the deals sheet. Read-only: the sheet owns this data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealsRow {
    #[serde(rename = "地域")]
    pub region: String,

    #[serde(rename = "カテゴリ")]
    pub category: String,

    #[serde(rename = "情報内容", default)]
    pub content: String,

    #[serde(rename = "備考", default)]
    pub note: String,
}

impl DealsRow {
    pub fn new(region: &str, category: &str, content: &str, note: &str) -> Self {
        DealsRow {
            region: region.to_string(),
            category: category.to_string(),
            content: content.to_string(),
            note: note.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DealsError {
    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("could not read {path}: {message}")]
    Io { path: String, message: String },

    #[error("malformed deals sheet: {0}")]
    Parse(String),
}

impl DealsError {
    /// The single user-facing message, whatever the cause
    pub fn user_message(&self) -> &'static str {
        RETRIEVAL_FAILURE_MESSAGE
    }
}

// ============================================================================
// PARSING
// ============================================================================

/// Header row every sheet must carry
pub const REQUIRED_COLUMNS: [&str; 4] = ["地域", "カテゴリ", "情報内容", "備考"];

/// Parse CSV bytes into rows. Extra columns are ignored; a missing expected
/// column fails the whole sheet. Rows cut short by trailing empty cells keep
/// their leading values, the missing cells read as "".
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<DealsRow>, DealsError> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers = rdr.headers().map_err(|e| DealsError::Parse(e.to_string()))?;
    if let Some(missing) = REQUIRED_COLUMNS.iter().find(|col| !headers.iter().any(|h| h == **col)) {
        return Err(DealsError::Parse(format!("missing column `{}`", missing)));
    }

    let mut rows = Vec::new();
    for result in rdr.deserialize() {
        let row: DealsRow = result.map_err(|e| DealsError::Parse(e.to_string()))?;
        rows.push(row);
    }

    Ok(rows)
}

// ============================================================================
// SOURCES
// ============================================================================

/// DealsSource - Anything that can hand back the rows behind a sheet URL
pub trait DealsSource: Send + Sync {
    fn fetch(&self, url: &str) -> Result<Vec<DealsRow>, DealsError>;
}

/// Production source: HTTP(S) GET for URLs, local file read for anything else
pub struct CsvSource {
    client: reqwest::blocking::Client,
}

impl CsvSource {
    /// The client carries no request timeout; a slow sheet blocks until the
    /// server answers or the connection drops.
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(None)
            .build()
            .unwrap_or_else(|error| {
                warn!(%error, "falling back to the default HTTP client");
                reqwest::blocking::Client::new()
            });

        CsvSource { client }
    }

    fn fetch_http(&self, url: &str) -> Result<Vec<DealsRow>, DealsError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| DealsError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DealsError::Status(status.as_u16()));
        }

        let body = response.bytes().map_err(|e| DealsError::Network(e.to_string()))?;
        parse_csv(body.as_ref())
    }

    fn fetch_file(&self, path: &str) -> Result<Vec<DealsRow>, DealsError> {
        let file = std::fs::File::open(path).map_err(|e| DealsError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        parse_csv(file)
    }
}

impl Default for CsvSource {
    fn default() -> Self {
        Self::new()
    }
}

impl DealsSource for CsvSource {
    fn fetch(&self, url: &str) -> Result<Vec<DealsRow>, DealsError> {
        let result = if url.starts_with("http://") || url.starts_with("https://") {
            self.fetch_http(url)
        } else {
            self.fetch_file(url.strip_prefix("file://").unwrap_or(url))
        };

        match &result {
            Ok(rows) => debug!(url, rows = rows.len(), "deals sheet loaded"),
            Err(error) => warn!(url, %error, "deals sheet retrieval failed"),
        }

        result
    }
}

/// Fixed in-memory rows (demo data, tests, offline runs)
pub struct StaticSource {
    rows: Vec<DealsRow>,
}

impl StaticSource {
    pub fn new(rows: Vec<DealsRow>) -> Self {
        StaticSource { rows }
    }
}

impl DealsSource for StaticSource {
    fn fetch(&self, _url: &str) -> Result<Vec<DealsRow>, DealsError> {
        Ok(self.rows.clone())
    }
}

// ============================================================================
// FEED + FILTER
// ============================================================================

/// Rows from a single fetch
#[derive(Debug, Clone, Default)]
pub struct DealsFeed {
    rows: Vec<DealsRow>,
}

impl DealsFeed {
    pub fn new(rows: Vec<DealsRow>) -> Self {
        DealsFeed { rows }
    }

    /// Distinct regions in order of first appearance
    pub fn regions(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.region.as_str()))
    }

    /// Distinct categories in order of first appearance
    pub fn categories(&self) -> Vec<String> {
        distinct(self.rows.iter().map(|r| r.category.as_str()))
    }

    /// (content, note) of every row matching both values exactly
    pub fn filter<'a>(&'a self, region: &'a str, category: &'a str) -> impl Iterator<Item = (&'a str, &'a str)> + 'a {
        self.rows
            .iter()
            .filter(move |r| r.region == region && r.category == category)
            .map(|r| (r.content.as_str(), r.note.as_str()))
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !seen.iter().any(|v| v == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Keep the requested option when the sheet still offers it, otherwise fall
/// back to the first one (a select box always has a value when non-empty).
pub fn resolve_selection(options: &[String], requested: Option<&str>) -> Option<String> {
    match requested {
        Some(value) if options.iter().any(|o| o == value) => Some(value.to_string()),
        _ => options.first().cloned(),
    }
}

/// Bullet text for one result
pub fn format_deal(content: &str, note: &str) -> String {
    format!("- {}（{}）", content, note)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_rows() -> Vec<DealsRow> {
        vec![
            DealsRow::new("A", "food", "c1", "n1"),
            DealsRow::new("A", "toys", "c2", "n2"),
            DealsRow::new("B", "food", "c3", "n3"),
        ]
    }

    struct FailingSource;

    impl DealsSource for FailingSource {
        fn fetch(&self, _url: &str) -> Result<Vec<DealsRow>, DealsError> {
            Err(DealsError::Network("connection refused".to_string()))
        }
    }

    #[test]
    fn test_filter_exact_match() {
        let feed = DealsFeed::new(sample_rows());
        let results: Vec<_> = feed.filter("A", "food").collect();

        assert_eq!(results, vec![("c1", "n1")]);
    }

    #[test]
    fn test_filter_is_case_sensitive() {
        let feed = DealsFeed::new(sample_rows());

        assert_eq!(feed.filter("a", "food").count(), 0);
        assert_eq!(feed.filter("A", "Food").count(), 0);
    }

    #[test]
    fn test_distinct_values_keep_first_appearance_order() {
        let feed = DealsFeed::new(sample_rows());

        assert_eq!(feed.regions(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(feed.categories(), vec!["food".to_string(), "toys".to_string()]);
    }

    #[test]
    fn test_parse_csv_with_japanese_headers() {
        let csv = "地域,カテゴリ,情報内容,備考\n東京,食品,卵が半額,火曜のみ\n大阪,日用品,洗剤10%オフ,\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], DealsRow::new("東京", "食品", "卵が半額", "火曜のみ"));
        assert_eq!(rows[1].note, "");
    }

    #[test]
    fn test_parse_csv_short_row_keeps_its_values() {
        let csv = "地域,カテゴリ,情報内容,備考\nA,food,c1,n1\nA,food,c2\nB,toys\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(
            rows,
            vec![
                DealsRow::new("A", "food", "c1", "n1"),
                DealsRow::new("A", "food", "c2", ""),
                DealsRow::new("B", "toys", "", ""),
            ]
        );
        let feed = DealsFeed::new(rows);
        assert_eq!(feed.filter("A", "food").collect::<Vec<_>>(), vec![("c1", "n1"), ("c2", "")]);
    }

    #[test]
    fn test_parse_csv_ignores_extra_columns() {
        let csv = "地域,カテゴリ,情報内容,備考,URL\nA,food,c1,n1,https://example.com\n";
        let rows = parse_csv(csv.as_bytes()).unwrap();

        assert_eq!(rows, vec![DealsRow::new("A", "food", "c1", "n1")]);
    }

    #[test]
    fn test_parse_csv_missing_column_fails() {
        let csv = "地域,カテゴリ,情報内容\nA,food,c1\n";
        let result = parse_csv(csv.as_bytes());

        assert!(matches!(result, Err(DealsError::Parse(ref m)) if m.contains("備考")));
    }

    #[test]
    fn test_parse_csv_row_without_category_fails() {
        let csv = "地域,カテゴリ,情報内容,備考\nA\n";

        assert!(matches!(parse_csv(csv.as_bytes()), Err(DealsError::Parse(_))));
    }

    #[test]
    fn test_every_error_has_same_user_message() {
        let errors = [
            DealsError::Network("timeout".to_string()),
            DealsError::Status(404),
            DealsError::Io { path: "x.csv".to_string(), message: "not found".to_string() },
            DealsError::Parse("missing field".to_string()),
        ];

        for error in errors {
            assert_eq!(error.user_message(), RETRIEVAL_FAILURE_MESSAGE);
        }
    }

    #[test]
    fn test_csv_source_missing_file_is_io_error() {
        let source = CsvSource::new();
        let result = source.fetch("/nonexistent/shufumate/deals.csv");

        assert!(matches!(result, Err(DealsError::Io { .. })));
    }

    #[test]
    fn test_csv_source_reads_local_file() {
        let path = std::env::temp_dir().join("shufumate_deals_test.csv");
        std::fs::write(&path, "地域,カテゴリ,情報内容,備考\nA,food,c1,n1\n").unwrap();

        let source = CsvSource::new();
        let rows = source.fetch(path.to_str().unwrap()).unwrap();

        assert_eq!(rows, vec![DealsRow::new("A", "food", "c1", "n1")]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_failing_source_reports_error() {
        assert!(FailingSource.fetch("https://example.invalid").is_err());
    }

    #[test]
    fn test_resolve_selection() {
        let options = vec!["A".to_string(), "B".to_string()];

        assert_eq!(resolve_selection(&options, Some("B")), Some("B".to_string()));
        assert_eq!(resolve_selection(&options, Some("Z")), Some("A".to_string()));
        assert_eq!(resolve_selection(&options, None), Some("A".to_string()));
        assert_eq!(resolve_selection(&[], Some("A")), None);
    }

    #[test]
    fn test_format_deal() {
        assert_eq!(format_deal("卵が半額", "火曜のみ"), "- 卵が半額（火曜のみ）");
    }
}

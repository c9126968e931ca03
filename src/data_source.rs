// src/data_source.rs
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;

use crate::config::DataProvider;

/// A fetched row: column name to scalar value. Rows are never mutated by the
/// widget, only selected, filtered and sliced.
pub type Row = serde_json::Map<String, Value>;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableMetadata {
    #[serde(default)]
    pub column_names: Vec<String>,
}

/// The shape every adapter returns: rows plus column metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableEnvelope {
    #[serde(default)]
    pub metadata: TableMetadata,
    #[serde(default)]
    pub rows: Vec<Row>,
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("snapshot {cid} not found under {}", store.display())]
    SnapshotNotFound { cid: String, store: PathBuf },
    #[error("failed to read snapshot: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse payload: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("malformed csv snapshot: {0}")]
    Csv(#[from] csv::Error),
    #[error("query request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("custom provider selected but no api endpoint configured")]
    MissingEndpoint,
    #[error("snapshot parse task failed: {0}")]
    Join(#[from] task::JoinError),
}

#[derive(Debug, Clone)]
pub struct QueryParams {
    pub data_source: DataProvider,
    pub query_id: String,
    pub api_endpoint: String,
}

/// Contract the widget consumes for both fetch strategies. Kept as a trait
/// object so tests can substitute recording adapters.
#[async_trait]
pub trait DataAdapter: Send + Sync {
    async fn fetch_by_cid(&self, cid: &str) -> Result<TableEnvelope, DataSourceError>;
    async fn fetch_by_query(&self, params: &QueryParams) -> Result<TableEnvelope, DataSourceError>;
}

/// Content-addressed snapshot store backed by a local directory: a snapshot
/// with identifier `cid` lives at `<dir>/<cid>.json` or `<dir>/<cid>.csv`.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        SnapshotStore { dir: dir.into() }
    }

    pub async fn fetch(&self, cid: &str) -> Result<TableEnvelope, DataSourceError> {
        let json_path = self.dir.join(format!("{cid}.json"));
        let csv_path = self.dir.join(format!("{cid}.csv"));
        let path = if json_path.is_file() {
            json_path
        } else if csv_path.is_file() {
            csv_path
        } else {
            return Err(DataSourceError::SnapshotNotFound {
                cid: cid.to_string(),
                store: self.dir.clone(),
            });
        };

        task::spawn_blocking(move || {
            let content = std::fs::read_to_string(&path)?;
            if path.extension().and_then(|e| e.to_str()) == Some("csv") {
                parse_csv_snapshot(&content)
            } else {
                Ok(serde_json::from_str(&content)?)
            }
        })
        .await?
    }
}

/// Parse a CSV snapshot payload into the adapter envelope. The delimiter is
/// detected from the first line (semicolon exports are common alongside
/// comma ones) and fully empty rows are skipped.
fn parse_csv_snapshot(content: &str) -> Result<TableEnvelope, DataSourceError> {
    let delimiter = detect_delimiter(content);
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(content.as_bytes());

    let column_names: Vec<String> = reader.headers()?.iter().map(String::from).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let mut row = Row::new();
        for (name, field) in column_names.iter().zip(record.iter()) {
            row.insert(name.clone(), Value::String(field.to_string()));
        }
        rows.push(row);
    }

    Ok(TableEnvelope {
        metadata: TableMetadata { column_names },
        rows,
    })
}

fn detect_delimiter(content: &str) -> u8 {
    match content.lines().next() {
        Some(first) if first.contains(';') => b';',
        _ => b',',
    }
}

const DUNE_API_BASE: &str = "https://api.dune.com/api/v1";

/// HTTP client for the live providers. Dune queries hit the public results
/// endpoint (API key taken from `DUNE_API_KEY` when present); the custom
/// provider calls the configured endpoint directly. Both are expected to
/// answer with the envelope shape, either at the top level or wrapped in a
/// `result` object the way Dune does.
#[derive(Debug, Clone)]
pub struct QueryClient {
    http: reqwest::Client,
    dune_base: String,
    api_key: Option<String>,
}

impl QueryClient {
    pub fn new() -> Self {
        QueryClient {
            http: reqwest::Client::new(),
            dune_base: DUNE_API_BASE.to_string(),
            api_key: std::env::var("DUNE_API_KEY").ok(),
        }
    }

    pub async fn call_api(&self, params: &QueryParams) -> Result<TableEnvelope, DataSourceError> {
        let url = match params.data_source {
            DataProvider::Dune => {
                format!("{}/query/{}/results", self.dune_base, params.query_id)
            }
            DataProvider::Custom => {
                if params.api_endpoint.is_empty() {
                    return Err(DataSourceError::MissingEndpoint);
                }
                params.api_endpoint.clone()
            }
        };

        let mut request = self.http.get(&url);
        if let Some(key) = &self.api_key {
            request = request.header("X-Dune-API-Key", key);
        }
        let body: Value = request.send().await?.error_for_status()?.json().await?;
        let payload = match body.get("result") {
            Some(result) => result.clone(),
            None => body,
        };
        Ok(serde_json::from_value(payload)?)
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Production adapter: snapshot store for SNAPSHOT mode, query client for
/// LIVE mode.
pub struct StoreAdapter {
    snapshots: SnapshotStore,
    queries: QueryClient,
}

impl StoreAdapter {
    pub fn new(snapshot_dir: impl Into<PathBuf>) -> Self {
        StoreAdapter {
            snapshots: SnapshotStore::new(snapshot_dir),
            queries: QueryClient::new(),
        }
    }
}

#[async_trait]
impl DataAdapter for StoreAdapter {
    async fn fetch_by_cid(&self, cid: &str) -> Result<TableEnvelope, DataSourceError> {
        self.snapshots.fetch(cid).await
    }

    async fn fetch_by_query(&self, params: &QueryParams) -> Result<TableEnvelope, DataSourceError> {
        self.queries.call_api(params).await
    }
}

/// Derive a snapshot reference from a file picked in the data-source dialog:
/// the file stem is the content identifier, its directory the store.
pub fn snapshot_ref_from_path(path: &Path) -> Option<(PathBuf, String)> {
    let cid = path.file_stem()?.to_str()?.to_string();
    let dir = path.parent()?.to_path_buf();
    Some((dir, cid))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_snapshot(dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
    }

    #[tokio::test]
    async fn fetches_json_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(
            dir.path(),
            "bafy1.json",
            r#"{"metadata":{"column_names":["a","b"]},"rows":[{"a":1,"b":"x"}]}"#,
        );
        let store = SnapshotStore::new(dir.path());
        let envelope = store.fetch("bafy1").await.unwrap();
        assert_eq!(envelope.metadata.column_names, vec!["a", "b"]);
        assert_eq!(envelope.rows.len(), 1);
        assert_eq!(envelope.rows[0].get("a"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn missing_snapshot_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = SnapshotStore::new(dir.path());
        assert!(matches!(
            store.fetch("nope").await,
            Err(DataSourceError::SnapshotNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn fetches_csv_snapshot_with_semicolon_delimiter() {
        let dir = tempfile::tempdir().unwrap();
        write_snapshot(
            dir.path(),
            "bafy2.csv",
            "name;score\nalice;10\n;\nbob;20\n",
        );
        let store = SnapshotStore::new(dir.path());
        let envelope = store.fetch("bafy2").await.unwrap();
        assert_eq!(envelope.metadata.column_names, vec!["name", "score"]);
        assert_eq!(envelope.rows.len(), 2);
        assert_eq!(envelope.rows[1].get("score"), Some(&json!("20")));
    }

    #[test]
    fn envelope_defaults_missing_metadata() {
        let envelope: TableEnvelope =
            serde_json::from_str(r#"{"rows":[{"a":1}]}"#).unwrap();
        assert!(envelope.metadata.column_names.is_empty());
        assert_eq!(envelope.rows.len(), 1);
    }

    #[test]
    fn snapshot_ref_from_picked_file() {
        let (dir, cid) =
            snapshot_ref_from_path(Path::new("/store/bafy3.json")).unwrap();
        assert_eq!(dir, Path::new("/store"));
        assert_eq!(cid, "bafy3");
    }
}

// src/loader.rs
use log::{debug, warn};

use crate::config::{Mode, TableConfig};
use crate::data_source::{DataAdapter, QueryParams, Row};

/// Outcome of a load. Replaces the widget's row data and column names
/// wholesale; there is no partial update or caching across fetches.
#[derive(Debug, Clone, Default)]
pub struct LoadResult {
    pub rows: Vec<Row>,
    pub column_names: Vec<String>,
}

impl LoadResult {
    pub fn empty() -> Self {
        LoadResult::default()
    }
}

/// Load the configured data. Never fails: a missing identifier, a missing
/// provider, or any adapter error yields the empty result.
pub async fn load(adapter: &dyn DataAdapter, config: &TableConfig) -> LoadResult {
    match config.mode {
        Mode::Snapshot => load_snapshot(adapter, config).await,
        Mode::Live => load_live(adapter, config).await,
    }
}

async fn load_snapshot(adapter: &dyn DataAdapter, config: &TableConfig) -> LoadResult {
    let Some(cid) = config.cid() else {
        return LoadResult::empty();
    };
    match adapter.fetch_by_cid(cid).await {
        Ok(envelope) => {
            debug!("loaded snapshot {cid}: {} rows", envelope.rows.len());
            LoadResult {
                rows: envelope.rows,
                column_names: envelope.metadata.column_names,
            }
        }
        Err(err) => {
            warn!("snapshot fetch failed for {cid}: {err}");
            LoadResult::empty()
        }
    }
}

async fn load_live(adapter: &dyn DataAdapter, config: &TableConfig) -> LoadResult {
    let Some(data_source) = config.data_source else {
        return LoadResult::empty();
    };
    let params = QueryParams {
        data_source,
        query_id: config.query_id.clone(),
        api_endpoint: config.api_endpoint.clone(),
    };
    match adapter.fetch_by_query(&params).await {
        Ok(envelope) => {
            debug!(
                "loaded {} rows from {data_source}",
                envelope.rows.len()
            );
            LoadResult {
                rows: envelope.rows,
                column_names: envelope.metadata.column_names,
            }
        }
        Err(err) => {
            warn!("live query failed for {data_source}: {err}");
            LoadResult::empty()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DataProvider, FileRef};
    use crate::data_source::{DataSourceError, TableEnvelope, TableMetadata};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockAdapter {
        cid_calls: AtomicUsize,
        query_calls: AtomicUsize,
        fail: bool,
    }

    fn sample_envelope() -> TableEnvelope {
        let row = |a: i64, b: i64| {
            let mut row = Row::new();
            row.insert("a".to_string(), json!(a));
            row.insert("b".to_string(), json!(b));
            row
        };
        TableEnvelope {
            metadata: TableMetadata {
                column_names: vec!["a".to_string(), "b".to_string()],
            },
            rows: vec![row(1, 2), row(3, 4)],
        }
    }

    #[async_trait]
    impl DataAdapter for MockAdapter {
        async fn fetch_by_cid(&self, cid: &str) -> Result<TableEnvelope, DataSourceError> {
            self.cid_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataSourceError::SnapshotNotFound {
                    cid: cid.to_string(),
                    store: PathBuf::new(),
                });
            }
            Ok(sample_envelope())
        }

        async fn fetch_by_query(
            &self,
            _params: &QueryParams,
        ) -> Result<TableEnvelope, DataSourceError> {
            self.query_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DataSourceError::MissingEndpoint);
            }
            Ok(sample_envelope())
        }
    }

    #[tokio::test]
    async fn snapshot_without_cid_skips_adapter() {
        let adapter = MockAdapter::default();
        let config = TableConfig {
            mode: Mode::Snapshot,
            ..TableConfig::default()
        };
        let result = load(&adapter, &config).await;
        assert!(result.rows.is_empty());
        assert!(result.column_names.is_empty());
        assert_eq!(adapter.cid_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn live_without_provider_skips_adapter() {
        let adapter = MockAdapter::default();
        let config = TableConfig {
            mode: Mode::Live,
            data_source: None,
            ..TableConfig::default()
        };
        let result = load(&adapter, &config).await;
        assert!(result.rows.is_empty());
        assert_eq!(adapter.query_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn live_success_populates_rows_and_columns() {
        let adapter = MockAdapter::default();
        let config = TableConfig {
            mode: Mode::Live,
            data_source: Some(DataProvider::Dune),
            query_id: "q1".to_string(),
            ..TableConfig::default()
        };
        let result = load(&adapter, &config).await;
        assert_eq!(result.column_names, vec!["a", "b"]);
        assert_eq!(result.rows.len(), 2);
        assert_eq!(adapter.query_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn snapshot_failure_yields_empty() {
        let adapter = MockAdapter {
            fail: true,
            ..MockAdapter::default()
        };
        let config = TableConfig {
            mode: Mode::Snapshot,
            file: Some(FileRef {
                cid: "bafy".to_string(),
            }),
            ..TableConfig::default()
        };
        let result = load(&adapter, &config).await;
        assert!(result.rows.is_empty());
        assert!(result.column_names.is_empty());
        assert_eq!(adapter.cid_calls.load(Ordering::SeqCst), 1);
    }
}

pub mod memory;
pub mod postgres;

use std::{collections::BTreeMap, sync::Arc};

use forecast_client::domain::{DailyRecords, Record, TableKind};
use futures::StreamExt;

use crate::{
    filter::TableFilter,
    pipeline::{Envelope, PipelineError, Sink},
};

pub use memory::MemoryForecastStore;
pub use postgres::PgForecastStore;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Connection(String),
    #[error("schema error: {0}")]
    Schema(String),
    #[error("write failed: {0}")]
    Write(String),
    #[error("transaction failed: {0}")]
    Transaction(String),
}

impl From<StoreError> for PipelineError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Connection(msg) => PipelineError::Connection(msg),
            StoreError::Schema(msg) => PipelineError::Schema(msg),
            other => PipelineError::Sink(other.to_string()),
        }
    }
}

/// Result of writing one table's records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindOutcome {
    pub written: usize,
    pub failed: usize,
}

/// Result of clearing one table: rows removed, or the error text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableClearOutcome {
    pub kind: TableKind,
    pub result: Result<u64, String>,
}

/// Persistence for the seven reporting tables.
///
/// `write_kind` commits one table's records as a unit; a record that fails
/// is rolled back alone and counted in `KindOutcome::failed`. Only errors
/// that prevent the whole unit come back as `Err`.
#[async_trait::async_trait]
pub trait ForecastStore: Send + Sync {
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    async fn write_kind(&self, kind: TableKind, records: &[Record]) -> Result<KindOutcome, StoreError>;

    async fn clear_tables(&self, kinds: &[TableKind]) -> Result<Vec<TableClearOutcome>, StoreError>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub written: BTreeMap<TableKind, usize>,
    pub failed: BTreeMap<TableKind, usize>,
    /// Set when the store could not be reached; the load stopped there.
    pub unavailable: Option<String>,
}

impl LoadReport {
    pub fn success(&self) -> bool {
        self.unavailable.is_none()
    }

    pub fn written_of(&self, kind: TableKind) -> usize {
        self.written.get(&kind).copied().unwrap_or(0)
    }

    pub fn failed_of(&self, kind: TableKind) -> usize {
        self.failed.get(&kind).copied().unwrap_or(0)
    }

    pub fn total_written(&self) -> usize {
        self.written.values().sum()
    }

    pub fn total_failed(&self) -> usize {
        self.failed.values().sum()
    }
}

/// Writes a day of records table by table through a `ForecastStore`.
#[derive(Clone)]
pub struct BatchLoader {
    store: Arc<dyn ForecastStore>,
}

impl BatchLoader {
    pub fn new(store: Arc<dyn ForecastStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ForecastStore> {
        &self.store
    }

    /// Pipeline sink that buffers a record stream and loads it under `filter`.
    pub fn into_sink(self, filter: TableFilter) -> LoaderSink {
        LoaderSink { loader: self, filter }
    }

    pub async fn load(&self, day: &DailyRecords, filter: &TableFilter) -> Result<LoadReport, PipelineError> {
        let mut report = LoadReport::default();

        match self.store.ensure_schema().await {
            Ok(()) => {}
            Err(StoreError::Connection(msg)) => {
                tracing::error!(error = %msg, "store unavailable, nothing loaded");
                report.unavailable = Some(msg);
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        }

        for kind in TableKind::ALL {
            if !filter.loads(kind) {
                tracing::debug!(table = %kind, "skipped by table filter");
                continue;
            }

            let records = day.records_of(kind);
            if records.is_empty() {
                report.written.insert(kind, 0);
                continue;
            }

            match self.store.write_kind(kind, &records).await {
                Ok(outcome) => {
                    metrics::counter!("simulator_records_written_total", "table" => kind.tag())
                        .increment(outcome.written as u64);
                    if outcome.failed > 0 {
                        metrics::counter!("simulator_record_write_failures_total", "table" => kind.tag())
                            .increment(outcome.failed as u64);
                        tracing::warn!(table = %kind, written = outcome.written, failed = outcome.failed, "table loaded with failures");
                    } else {
                        tracing::info!(table = %kind, written = outcome.written, "table loaded");
                    }
                    report.written.insert(kind, outcome.written);
                    report.failed.insert(kind, outcome.failed);
                }
                Err(StoreError::Connection(msg)) => {
                    tracing::error!(table = %kind, error = %msg, "store unavailable, aborting load");
                    report.unavailable = Some(msg);
                    break;
                }
                Err(e) => {
                    metrics::counter!("simulator_record_write_failures_total", "table" => kind.tag())
                        .increment(records.len() as u64);
                    tracing::error!(table = %kind, error = %e, "table load rolled back");
                    report.written.insert(kind, 0);
                    report.failed.insert(kind, records.len());
                }
            }
        }

        Ok(report)
    }
}

pub struct LoaderSink {
    loader: BatchLoader,
    filter: TableFilter,
}

#[async_trait::async_trait]
impl Sink<Record> for LoaderSink {
    type Report = LoadReport;

    async fn run<S>(&self, mut input: S) -> Result<LoadReport, PipelineError>
    where
        S: futures::Stream<Item = Result<Envelope<Record>, PipelineError>> + Send + Unpin + 'static,
    {
        let mut day = DailyRecords::default();
        let mut rejected: BTreeMap<TableKind, usize> = BTreeMap::new();

        while let Some(item) = input.next().await {
            match item {
                Ok(env) => day.push(env.payload),
                Err(PipelineError::Rejected { table, reason }) => {
                    tracing::warn!(table = %table, reason = %reason, "record rejected before load");
                    *rejected.entry(table).or_default() += 1;
                }
                Err(e) => {
                    tracing::error!(error = %e, "error in upstream pipeline for BatchLoader");
                    continue;
                }
            }
        }

        let mut report = self.loader.load(&day, &self.filter).await?;
        for (table, count) in rejected {
            *report.failed.entry(table).or_default() += count;
        }
        Ok(report)
    }
}

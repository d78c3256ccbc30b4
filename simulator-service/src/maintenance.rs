//! Schema creation and table clearing, run from the command line.

use forecast_client::domain::TableKind;

use crate::{
    pipeline::PipelineError,
    sinks::{ForecastStore, TableClearOutcome},
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClearReport {
    pub tables: Vec<TableClearOutcome>,
}

impl ClearReport {
    pub fn rows_cleared(&self) -> u64 {
        self.tables.iter().filter_map(|t| t.result.as_ref().ok()).sum()
    }

    pub fn failures(&self) -> impl Iterator<Item = &TableClearOutcome> {
        self.tables.iter().filter(|t| t.result.is_err())
    }
}

/// Create all seven tables if missing. Idempotent.
pub async fn ensure_schema(store: &dyn ForecastStore) -> Result<(), PipelineError> {
    store.ensure_schema().await?;
    tracing::info!(tables = TableKind::ALL.len(), "schema ready");
    Ok(())
}

/// Truncate every table in one transaction. A table that cannot be cleared
/// is reported and the rest are still cleared; only an unreachable store
/// fails the whole operation.
pub async fn clear_all(store: &dyn ForecastStore) -> Result<ClearReport, PipelineError> {
    let tables = store.clear_tables(&TableKind::ALL).await?;

    for outcome in &tables {
        match &outcome.result {
            Ok(rows) => tracing::info!(table = %outcome.kind, rows, "table cleared"),
            Err(e) => tracing::error!(table = %outcome.kind, error = %e, "failed to clear table"),
        }
    }

    let report = ClearReport { tables };
    tracing::info!(rows = report.rows_cleared(), "all tables cleared");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::MemoryForecastStore;

    #[tokio::test]
    async fn clearing_an_empty_schema_reports_zero_rows() {
        let store = MemoryForecastStore::default();
        ensure_schema(&store).await.unwrap();
        ensure_schema(&store).await.unwrap();

        let report = clear_all(&store).await.unwrap();

        assert_eq!(report.tables.len(), 7);
        assert!(report.tables.iter().all(|t| t.result == Ok(0)));
        assert_eq!(report.failures().count(), 0);
    }

    #[tokio::test]
    async fn missing_tables_are_reported_per_table() {
        let store = MemoryForecastStore::default();
        let report = clear_all(&store).await.unwrap();
        assert_eq!(report.failures().count(), 7);
        assert_eq!(report.rows_cleared(), 0);
    }

    #[tokio::test]
    async fn unreachable_store_fails() {
        let store = MemoryForecastStore::default();
        store.set_unavailable(true);
        let err = clear_all(&store).await.unwrap_err();
        assert!(matches!(err, PipelineError::Connection(_)));
    }
}

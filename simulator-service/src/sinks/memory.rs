use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    sync::{Mutex, MutexGuard},
};

use forecast_client::domain::{Record, TableKind};

use super::{ForecastStore, KindOutcome, StoreError, TableClearOutcome};

#[derive(Debug, Default)]
struct Tables {
    created: BTreeSet<TableKind>,
    rows: BTreeMap<TableKind, Vec<Record>>,
    /// Record positions forced to fail in the next `write_kind` call.
    poisoned: BTreeMap<TableKind, BTreeSet<usize>>,
    unavailable: bool,
    schema_broken: bool,
}

/// In-process store with the same key rules as the Postgres tables:
/// curtailment rows replace on `(creation, forecast)`, the load forecast
/// table accepts duplicates, and every other table rejects a repeated key.
#[derive(Debug, Default)]
pub struct MemoryForecastStore {
    tables: Mutex<Tables>,
}

impl MemoryForecastStore {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Simulate an unreachable database.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    pub fn fail_schema(&self, broken: bool) {
        self.lock().schema_broken = broken;
    }

    /// Make the record at `index` of the next write to `kind` fail. Later
    /// writes are unaffected.
    pub fn fail_record(&self, kind: TableKind, index: usize) {
        self.lock().poisoned.entry(kind).or_default().insert(index);
    }

    pub fn rows(&self, kind: TableKind) -> Vec<Record> {
        self.lock().rows.get(&kind).cloned().unwrap_or_default()
    }

    pub fn row_count(&self, kind: TableKind) -> usize {
        self.lock().rows.get(&kind).map_or(0, Vec::len)
    }
}

#[async_trait::async_trait]
impl ForecastStore for MemoryForecastStore {
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(StoreError::Connection("memory store marked unavailable".to_string()));
        }
        if tables.schema_broken {
            return Err(StoreError::Schema("memory store schema marked broken".to_string()));
        }
        tables.created.extend(TableKind::ALL);
        Ok(())
    }

    async fn write_kind(&self, kind: TableKind, records: &[Record]) -> Result<KindOutcome, StoreError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(StoreError::Connection("memory store marked unavailable".to_string()));
        }
        if !tables.created.contains(&kind) {
            return Err(StoreError::Transaction(format!("relation {} does not exist", kind.table_name())));
        }

        let poisoned = tables.poisoned.remove(&kind).unwrap_or_default();
        let mut staged = tables.rows.get(&kind).cloned().unwrap_or_default();
        let mut index: HashMap<String, usize> = staged
            .iter()
            .enumerate()
            .filter_map(|(pos, r)| r.natural_key().map(|k| (k, pos)))
            .collect();

        let mut outcome = KindOutcome::default();
        for (i, record) in records.iter().enumerate() {
            if poisoned.contains(&i) {
                tracing::warn!(table = %kind, index = i, "record write failed, rolled back to savepoint");
                outcome.failed += 1;
                continue;
            }

            match record.natural_key() {
                None => staged.push(record.clone()),
                Some(key) => match index.get(&key).copied() {
                    Some(pos) if kind.is_upsert() => staged[pos] = record.clone(),
                    Some(_) => {
                        let e = StoreError::Write(format!("duplicate key {key}"));
                        tracing::warn!(table = %kind, index = i, error = %e, "record write failed, rolled back to savepoint");
                        outcome.failed += 1;
                        continue;
                    }
                    None => {
                        index.insert(key, staged.len());
                        staged.push(record.clone());
                    }
                },
            }
            outcome.written += 1;
        }

        tables.rows.insert(kind, staged);
        Ok(outcome)
    }

    async fn clear_tables(&self, kinds: &[TableKind]) -> Result<Vec<TableClearOutcome>, StoreError> {
        let mut tables = self.lock();
        if tables.unavailable {
            return Err(StoreError::Connection("memory store marked unavailable".to_string()));
        }

        let mut outcomes = Vec::with_capacity(kinds.len());
        for &kind in kinds {
            let result = if tables.created.contains(&kind) {
                let cleared = tables.rows.remove(&kind).map_or(0, |rows| rows.len() as u64);
                Ok(cleared)
            } else {
                Err(format!("relation {} does not exist", kind.table_name()))
            };
            outcomes.push(TableClearOutcome { kind, result });
        }
        Ok(outcomes)
    }
}

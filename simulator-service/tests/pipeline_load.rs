use std::sync::Arc;

use forecast_client::domain::{Record, TableKind};
use rand::{rngs::StdRng, SeedableRng};
use simulator_service::{
    filter::TableFilter,
    maintenance,
    simulation::DailySimulation,
    sinks::{BatchLoader, MemoryForecastStore},
    synth,
};
use time::{macros::date, Date};

const DAY: Date = date!(2025-08-01);

fn seeded_day(seed: u64) -> forecast_client::domain::DailyRecords {
    synth::synthesize(DAY, &TableFilter::All, &mut StdRng::seed_from_u64(seed))
}

#[tokio::test]
async fn curtailment_reload_keeps_one_row_per_key_with_latest_values() {
    let store = Arc::new(MemoryForecastStore::default());
    let loader = BatchLoader::new(store.clone());

    loader.load(&seeded_day(1), &TableFilter::All).await.unwrap();
    let second = seeded_day(2);
    let report = loader.load(&second, &TableFilter::All).await.unwrap();

    assert_eq!(report.written_of(TableKind::Curt), 576);
    assert_eq!(report.failed_of(TableKind::Curt), 0);

    let rows = store.rows(TableKind::Curt);
    assert_eq!(rows.len(), 24);

    // The last outer hour's draw is the one that survives for each key.
    let latest = &second.curt[23 * 24..];
    for (row, expected) in rows.iter().zip(latest) {
        let Record::Curt(row) = row else {
            panic!("unexpected record in curtailment table");
        };
        assert_eq!(row, expected);
    }
}

#[tokio::test]
async fn reloading_insert_only_tables_fails_per_record() {
    let store = Arc::new(MemoryForecastStore::default());
    let loader = BatchLoader::new(store.clone());

    loader.load(&seeded_day(1), &TableFilter::All).await.unwrap();
    let report = loader.load(&seeded_day(1), &TableFilter::All).await.unwrap();

    // Load forecasts have a serial key and simply accumulate.
    assert_eq!(report.written_of(TableKind::Lfd), 24);
    assert_eq!(store.row_count(TableKind::Lfd), 48);
    // Grid balance keys on observation time; every repeat is rejected.
    assert_eq!(report.failed_of(TableKind::Kpx), 24);
    assert_eq!(store.row_count(TableKind::Kpx), 24);
    assert!(report.success());
}

#[tokio::test]
async fn failing_record_does_not_discard_other_writes() {
    let store = Arc::new(MemoryForecastStore::default());
    store.fail_record(TableKind::Gen, 7);
    let loader = BatchLoader::new(store.clone());

    let report = loader.load(&seeded_day(3), &TableFilter::All).await.unwrap();

    assert!(report.success());
    assert_eq!(report.failed_of(TableKind::Gen), 1);
    assert_eq!(report.written_of(TableKind::Gen), 119);
    assert_eq!(store.row_count(TableKind::Gen), 119);
    assert_eq!(store.row_count(TableKind::Lfd), 24);
    assert_eq!(store.row_count(TableKind::Nwp), 24);
    assert_eq!(store.row_count(TableKind::HgMeas), 192);
}

#[tokio::test]
async fn clearing_empty_tables_reports_zero_rows() {
    let store = MemoryForecastStore::default();
    maintenance::ensure_schema(&store).await.unwrap();

    let report = maintenance::clear_all(&store).await.unwrap();

    assert_eq!(report.tables.len(), TableKind::ALL.len());
    assert!(report.tables.iter().all(|t| t.result == Ok(0)));
}

#[tokio::test]
async fn clearing_after_a_run_empties_every_table() {
    let store = Arc::new(MemoryForecastStore::default());
    DailySimulation::new(store.clone(), TableFilter::All, Some(8))
        .run_for(DAY)
        .await
        .unwrap();

    let report = maintenance::clear_all(store.as_ref()).await.unwrap();

    assert_eq!(report.rows_cleared(), 24 + 120 + 24 + 24 + 24 + 192 + 192);
    assert!(TableKind::ALL.iter().all(|&k| store.row_count(k) == 0));
}

#[tokio::test]
async fn hydrogen_only_run_loads_hydrogen_and_always_produced_tables() {
    let store = Arc::new(MemoryForecastStore::default());
    let filter = TableFilter::parse_list("HG_GEN,HG_MEAS");

    let report = DailySimulation::new(store.clone(), filter, Some(4))
        .run_for(DAY)
        .await
        .unwrap();

    assert_eq!(store.row_count(TableKind::Lfd), 0);
    assert_eq!(store.row_count(TableKind::Gen), 0);
    assert_eq!(store.row_count(TableKind::Nwp), 0);
    assert_eq!(store.row_count(TableKind::Kpx), 24);
    assert_eq!(store.row_count(TableKind::Curt), 24);
    assert_eq!(report.written_of(TableKind::Curt), 576);
    assert_eq!(store.row_count(TableKind::HgGen), 192);
    assert_eq!(store.row_count(TableKind::HgMeas), 192);
}

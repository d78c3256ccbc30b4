//! Round trips against a scratch Postgres named by `DATABASE_URL`.
//! Every table is cleared first, so never point these at real data.

use forecast_client::domain::{DailyRecords, TableKind};
use rand::{rngs::StdRng, SeedableRng};
use simulator_service::{
    filter::TableFilter,
    sinks::{ForecastStore, KindOutcome, PgForecastStore},
    synth,
};
use sqlx::PgPool;
use time::macros::date;
use tokio::sync::Mutex;

// Both tests share the same tables.
static TABLES: Mutex<()> = Mutex::const_new(());

async fn scratch_store() -> PgForecastStore {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
    let store = PgForecastStore::new(PgPool::connect(&url).await.unwrap());
    store.ensure_schema().await.unwrap();
    store.clear_tables(&TableKind::ALL).await.unwrap();
    store
}

fn day() -> DailyRecords {
    synth::synthesize(date!(2031-03-04), &TableFilter::All, &mut StdRng::seed_from_u64(17))
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a scratch Postgres"]
async fn duplicate_record_rolls_back_alone() {
    let _guard = TABLES.lock().await;
    let store = scratch_store().await;
    let day = day();

    let mut generation = day.records_of(TableKind::Gen);
    let unique = generation.len();
    generation.insert(5, generation[0].clone());

    let gen_outcome = store.write_kind(TableKind::Gen, &generation).await.unwrap();
    let lfd_outcome = store
        .write_kind(TableKind::Lfd, &day.records_of(TableKind::Lfd))
        .await
        .unwrap();

    assert_eq!(gen_outcome, KindOutcome { written: unique, failed: 1 });
    assert_eq!(lfd_outcome, KindOutcome { written: 24, failed: 0 });

    let cleared = store.clear_tables(&[TableKind::Gen, TableKind::Lfd]).await.unwrap();
    assert_eq!(cleared[0].result, Ok(unique as u64));
    assert_eq!(cleared[1].result, Ok(24));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL pointing at a scratch Postgres"]
async fn clearing_reports_rows_per_table() {
    let _guard = TABLES.lock().await;
    let store = scratch_store().await;
    let day = day();

    for kind in TableKind::ALL {
        store.write_kind(kind, &day.records_of(kind)).await.unwrap();
    }

    let cleared = store.clear_tables(&TableKind::ALL).await.unwrap();
    let rows: Vec<_> = cleared.iter().map(|t| (t.kind, t.result.clone())).collect();
    assert_eq!(
        rows,
        vec![
            (TableKind::Lfd, Ok(24)),
            (TableKind::Gen, Ok(120)),
            (TableKind::Nwp, Ok(24)),
            (TableKind::Kpx, Ok(24)),
            (TableKind::Curt, Ok(24)),
            (TableKind::HgGen, Ok(192)),
            (TableKind::HgMeas, Ok(192)),
        ]
    );

    let again = store.clear_tables(&TableKind::ALL).await.unwrap();
    assert!(again.iter().all(|t| t.result == Ok(0)));
}

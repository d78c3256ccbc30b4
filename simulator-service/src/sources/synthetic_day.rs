use forecast_client::domain::{DailyRecords, Record};
use rand::{rngs::StdRng, SeedableRng};
use time::Date;

use crate::{
    filter::TableFilter,
    pipeline::{Envelope, RecordStream, Source},
    synth,
};

/// Streams one synthesized day of records in load order.
#[derive(Debug, Clone)]
pub struct SyntheticDaySource {
    day: Date,
    filter: TableFilter,
    seed: Option<u64>,
}

impl SyntheticDaySource {
    pub fn new(day: Date, filter: TableFilter, seed: Option<u64>) -> Self {
        Self { day, filter, seed }
    }

    /// Draws the whole day up front. Seeded sources always produce the same
    /// records; unseeded ones take fresh OS entropy on every call.
    pub fn synthesize(&self) -> DailyRecords {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let records = synth::synthesize(self.day, &self.filter, &mut rng);
        tracing::debug!(day = %self.day, total = records.total(), filter = %self.filter, "synthesized day");
        records
    }
}

#[async_trait::async_trait]
impl Source<Record> for SyntheticDaySource {
    async fn stream(&self) -> RecordStream<Record> {
        let records = self.synthesize();
        let s = async_stream::stream! {
            for record in records.into_records() {
                yield Ok(Envelope::new(record));
            }
        };
        Box::pin(s)
    }
}

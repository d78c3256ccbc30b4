use crate::pipeline::{Envelope, PipelineError, Transform};
use forecast_client::domain::{Record, VariantSpread};

fn check_value(name: &str, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{name} must be finite and non-negative, got {value}"));
    }
    Ok(())
}

fn check_spread(spread: &VariantSpread) -> Result<(), String> {
    for v in spread.variants {
        check_value("variant", v)?;
        if v < spread.min || v > spread.max {
            return Err(format!("variant {v} outside [{}, {}]", spread.min, spread.max));
        }
    }
    check_value("headline", spread.headline)
}

fn check_record(record: &Record) -> Result<(), String> {
    if let Some((creation, forecast)) = record.forecast_window() {
        if forecast != creation.plus_hours(1) {
            return Err(format!("forecast {forecast} is not one hour after creation {creation}"));
        }
    }

    if let Some(spread) = record.spread() {
        check_spread(spread)?;
    }

    match record {
        Record::Lfd(_) | Record::Nwp(_) => Ok(()),
        Record::Gen(r) => {
            check_value("capacity", r.capacity)?;
            check_value("storage charge", r.storage_charge)?;
            check_value("storage discharge", r.storage_discharge)?;
            check_value("storage capacity", r.storage_capacity)
        }
        Record::Kpx(r) => {
            check_value("supply capability", r.supply_capability)?;
            check_value("current load", r.current_load)?;
            check_value("renewable total", r.renewable_total)
        }
        Record::Curt(r) => {
            check_value("min power", r.min_power)?;
            check_value("curtailment", r.curtailment)
        }
        Record::HgGen(r) => {
            check_value("production", r.production)?;
            check_value("capacity", r.capacity)
        }
        Record::HgMeas(r) => {
            check_value("production", r.production)?;
            check_value("capacity", r.capacity)
        }
    }
}

/// Pure validation of a synthesized `Record`.
///
/// Rules:
/// - forecast time is exactly one hour after creation.
/// - every variant lies within the spread's min/max.
/// - quantities are finite and non-negative.
///
/// A failing record comes back as `PipelineError::Rejected` tagged with its table.
pub fn validate_record(env: Envelope<Record>) -> Result<Envelope<Record>, PipelineError> {
    match check_record(&env.payload) {
        Ok(()) => Ok(env),
        Err(reason) => Err(PipelineError::Rejected {
            table: env.payload.kind(),
            reason,
        }),
    }
}

#[derive(Clone, Default)]
pub struct RecordValidation;

#[async_trait::async_trait]
impl Transform<Record, Record> for RecordValidation {
    async fn apply(&self, input: Envelope<Record>) -> Result<Envelope<Record>, PipelineError> {
        let res = validate_record(input);
        if let Err(PipelineError::Rejected { table, .. }) = &res {
            metrics::counter!("validation_records_rejected_total", "table" => table.tag()).increment(1);
        }
        res
    }
}

/// Prints every record it passes as one JSON line on stdout.
#[derive(Clone, Default)]
pub struct JsonLinesEcho;

#[async_trait::async_trait]
impl Transform<Record, Record> for JsonLinesEcho {
    async fn apply(&self, input: Envelope<Record>) -> Result<Envelope<Record>, PipelineError> {
        let line = serde_json::to_string(&input.payload)
            .map_err(|e| PipelineError::Transform(format!("failed to encode record: {e}")))?;
        println!("{line}");
        Ok(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_client::domain::{CurtailmentForecast, LeadTime, LoadForecast, Stamp, TableKind};
    use time::macros::date;

    fn load_forecast(variants: [f64; 6]) -> Envelope<Record> {
        let creation = Stamp::at_hour(date!(2025-08-01), 8);
        Envelope::new(Record::Lfd(LoadForecast {
            creation,
            forecast: creation.plus_hours(1),
            lead_time: LeadTime::new(3, 15),
            product_code: "07".to_string(),
            spread: VariantSpread::from_variants(variants),
            registered_at: creation,
        }))
    }

    #[test]
    fn accepts_valid_load_forecast() {
        let res = validate_record(load_forecast([100.0, 101.0, 99.5, 98.0, 102.0, 100.5]));
        assert!(res.is_ok());
    }

    #[test]
    fn rejects_variant_outside_bounds() {
        let mut env = load_forecast([100.0, 101.0, 99.5, 98.0, 102.0, 100.5]);
        if let Record::Lfd(r) = &mut env.payload {
            r.spread.max = 101.0;
        }
        assert!(matches!(
            validate_record(env),
            Err(PipelineError::Rejected { table: TableKind::Lfd, .. })
        ));
    }

    #[test]
    fn rejects_wrong_forecast_offset() {
        let creation = Stamp::at_hour(date!(2025-08-01), 2);
        let env = Envelope::new(Record::Curt(CurtailmentForecast {
            creation,
            forecast: creation.plus_hours(2),
            lead_time: LeadTime::new(2, 0),
            min_power: 40_000.0,
            curtailment: 41_000.0,
            registered_at: creation,
        }));
        assert!(matches!(validate_record(env), Err(PipelineError::Rejected { table: TableKind::Curt, .. })));
    }

    #[test]
    fn rejects_negative_quantities() {
        let creation = Stamp::at_hour(date!(2025-08-01), 2);
        let env = Envelope::new(Record::Curt(CurtailmentForecast {
            creation,
            forecast: creation.plus_hours(1),
            lead_time: LeadTime::new(2, 0),
            min_power: -1.0,
            curtailment: 41_000.0,
            registered_at: creation,
        }));
        assert!(matches!(validate_record(env), Err(PipelineError::Rejected { table: TableKind::Curt, .. })));
    }
}

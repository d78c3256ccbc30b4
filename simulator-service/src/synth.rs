//! Synthesis of one day of correlated records for every table.
//!
//! Each hour slot draws a base demand from the time-of-day profile; every
//! other series for that hour is derived from it (or, for weather and
//! hydrogen, from its own band) so the tables stay mutually consistent.

use std::collections::BTreeMap;

use forecast_client::domain::{
    round_to, AreaGroup, CurtailmentForecast, DailyRecords, FuelType, GridBalance, HydrogenGenForecast,
    HydrogenMeasurement, LeadTime, LoadForecast, RenewableGeneration, Stamp, TableKind, VariantSpread,
    WeatherForecast, VARIANT_COUNT,
};
use rand::Rng;
use time::Date;

use crate::{
    filter::TableFilter,
    profile::{self, Band, SeriesKind},
};

/// Half-widths of the multiplicative jitter for QG01..QG06.
pub const JITTER_WIDTHS: [f64; VARIANT_COUNT] = [0.05, 0.06, 0.07, 0.08, 0.09, 0.10];

const HOURS_PER_DAY: u8 = 24;

const NWP_POWER_CLASS: &str = "9";
const NWP_AREA_GROUP: &str = "1";
const NWP_AREA_ID: &str = "1";

/// Values shared by every record created in one hour slot.
struct HourSlot {
    hour: u8,
    creation: Stamp,
    forecast: Stamp,
    lead_time: LeadTime,
    product_code: String,
    base_demand: f64,
}

fn draw<R: Rng>(rng: &mut R, (low, high): Band) -> f64 {
    rng.random_range(low..=high)
}

fn two_digit_code<R: Rng>(rng: &mut R) -> String {
    format!("{:02}", rng.random_range(1..=99u8))
}

fn spread_around<R: Rng>(rng: &mut R, base: f64) -> VariantSpread {
    let variants = JITTER_WIDTHS.map(|w| round_to(base * draw(rng, (1.0 - w, 1.0 + w)), 6));
    VariantSpread::from_variants(variants)
}

/// Build one day of records.
///
/// Hour slots start at 00:00 of `day`. Kinds the filter excludes come back
/// empty; curtailment and grid balance are always filled.
pub fn synthesize<R: Rng>(day: Date, filter: &TableFilter, rng: &mut R) -> DailyRecords {
    let mut out = DailyRecords::default();

    for hour in 0..HOURS_PER_DAY {
        let creation = Stamp::at_hour(day, hour);
        let lead_time = LeadTime::new(rng.random_range(1..=24), rng.random_range(0..=59));
        let product_code = two_digit_code(rng);
        let base_demand = draw(rng, profile::range_for(hour, SeriesKind::Demand));
        let slot = HourSlot {
            hour,
            creation,
            forecast: creation.plus_hours(1),
            lead_time,
            product_code,
            base_demand,
        };

        if filter.synthesizes(TableKind::Lfd) {
            out.lfd.push(load_forecast(&slot, rng));
        }

        let mut renewables: BTreeMap<FuelType, f64> = BTreeMap::new();
        if filter.synthesizes(TableKind::Gen) {
            for fuel in FuelType::ALL {
                let record = renewable_generation(&slot, fuel, rng);
                renewables.insert(fuel, record.spread.headline);
                out.gen.push(record);
            }
        }

        if filter.synthesizes(TableKind::Nwp) {
            out.nwp.push(weather_forecast(&slot, rng));
        }

        out.kpx.push(grid_balance(&slot, &renewables, rng));

        for inner in 0..HOURS_PER_DAY {
            out.curt.push(curtailment(day, inner, &slot, rng));
        }

        if filter.synthesizes(TableKind::HgGen) {
            for area in AreaGroup::ALL {
                out.hg_gen.push(hydrogen_forecast(&slot, area, rng));
            }
        }

        if filter.synthesizes(TableKind::HgMeas) {
            for area in AreaGroup::ALL {
                out.hg_meas.push(hydrogen_measurement(&slot, area, rng));
            }
        }
    }

    out
}

fn load_forecast<R: Rng>(slot: &HourSlot, rng: &mut R) -> LoadForecast {
    LoadForecast {
        creation: slot.creation,
        forecast: slot.forecast,
        lead_time: slot.lead_time,
        product_code: slot.product_code.clone(),
        spread: spread_around(rng, slot.base_demand),
        registered_at: slot.creation,
    }
}

fn renewable_generation<R: Rng>(slot: &HourSlot, fuel: FuelType, rng: &mut R) -> RenewableGeneration {
    let base = slot.base_demand * draw(rng, (0.1, 0.3));
    let spread = spread_around(rng, base);
    let capacity = round_to(base * draw(rng, (0.8, 1.2)), 6);
    let storage_charge = round_to(base * draw(rng, (0.05, 0.15)), 6);
    let storage_discharge = round_to(base * draw(rng, (0.05, 0.15)), 6);
    let storage_capacity = round_to(base * draw(rng, (0.1, 0.3)), 6);

    RenewableGeneration {
        power_class: two_digit_code(rng),
        fuel,
        creation: slot.creation,
        forecast: slot.forecast,
        lead_time: slot.lead_time,
        product_code: slot.product_code.clone(),
        spread,
        capacity,
        storage_charge,
        storage_discharge,
        storage_capacity,
        registered_at: slot.creation,
    }
}

fn weather_forecast<R: Rng>(slot: &HourSlot, rng: &mut R) -> WeatherForecast {
    let mut sample = |kind| round_to(draw(rng, profile::range_for(slot.hour, kind)), 6);
    let irradiance = sample(SeriesKind::Irradiance);
    let temperature = sample(SeriesKind::Temperature);
    let humidity = sample(SeriesKind::Humidity);
    let wind_speed = sample(SeriesKind::WindSpeed);
    let pressure = sample(SeriesKind::Pressure);

    WeatherForecast {
        power_class: NWP_POWER_CLASS.to_string(),
        area_group: NWP_AREA_GROUP.to_string(),
        area_id: NWP_AREA_ID.to_string(),
        creation: slot.creation,
        forecast: slot.forecast,
        lead_time: slot.lead_time,
        product_code: slot.product_code.clone(),
        irradiance,
        temperature,
        humidity,
        wind_speed,
        pressure,
        registered_at: slot.creation,
    }
}

fn grid_balance<R: Rng>(slot: &HourSlot, renewables: &BTreeMap<FuelType, f64>, rng: &mut R) -> GridBalance {
    let supply_capability = round_to(slot.base_demand * draw(rng, (1.1, 1.3)), 5);
    let current_load = round_to(slot.base_demand * draw(rng, (0.95, 1.05)), 5);
    let of = |fuel| renewables.get(&fuel).copied().unwrap_or(0.0);

    GridBalance {
        observed: slot.creation,
        supply_capability,
        current_load,
        renewable_total: round_to(renewables.values().sum(), 5),
        renewable_solar: round_to(of(FuelType::Solar), 5),
        renewable_wind: round_to(of(FuelType::Wind), 5),
        registered_at: slot.creation,
    }
}

/// One curtailment row for `inner` hour of `day`, drawn around the outer
/// slot's base demand and stamped with the outer slot's creation time.
fn curtailment<R: Rng>(day: Date, inner: u8, slot: &HourSlot, rng: &mut R) -> CurtailmentForecast {
    let creation = Stamp::at_hour(day, inner);
    let min_power = round_to(slot.base_demand * draw(rng, (0.8, 1.2)), 2);
    let curtailment = round_to(slot.base_demand * draw(rng, (0.9, 1.1)), 2);

    CurtailmentForecast {
        creation,
        forecast: creation.plus_hours(1),
        lead_time: LeadTime::new(u16::from(inner), 0),
        min_power,
        curtailment,
        registered_at: slot.creation,
    }
}

fn area_id<R: Rng>(area: AreaGroup, rng: &mut R) -> String {
    format!("{}_H2_{:03}", area.code(), rng.random_range(1..=999u16))
}

fn hydrogen_forecast<R: Rng>(slot: &HourSlot, area: AreaGroup, rng: &mut R) -> HydrogenGenForecast {
    let bands = profile::hydrogen_forecast_bands(slot.hour);
    let production = round_to(draw(rng, bands.production), 6);
    let capacity = round_to(draw(rng, bands.capacity), 6);

    HydrogenGenForecast {
        area_group: area,
        area_id: area_id(area, rng),
        creation: slot.creation,
        forecast: slot.forecast,
        lead_time: slot.lead_time,
        product_code: slot.product_code.clone(),
        production,
        capacity,
        registered_at: slot.creation,
    }
}

fn hydrogen_measurement<R: Rng>(slot: &HourSlot, area: AreaGroup, rng: &mut R) -> HydrogenMeasurement {
    let bands = profile::hydrogen_measurement_bands(slot.hour);
    let production = round_to(draw(rng, bands.production), 5);
    let capacity = round_to(draw(rng, bands.capacity), 5);

    HydrogenMeasurement {
        observed: slot.creation,
        area_group: area,
        area_id: area_id(area, rng),
        production,
        capacity,
        registered_at: slot.creation,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use forecast_client::domain::Record;
    use rand::{rngs::StdRng, SeedableRng};
    use time::macros::date;

    const DAY: Date = date!(2025-08-01);

    fn day_with_seed(seed: u64) -> DailyRecords {
        synthesize(DAY, &TableFilter::All, &mut StdRng::seed_from_u64(seed))
    }

    fn assert_spread_consistent(spread: &VariantSpread) {
        for v in spread.variants {
            assert!(spread.min <= v && v <= spread.max, "{v} outside [{}, {}]", spread.min, spread.max);
        }
        let mean = spread.variants.iter().sum::<f64>() / VARIANT_COUNT as f64;
        assert_eq!(spread.headline, round_to(mean, 6));
    }

    #[test]
    fn full_day_has_expected_counts() {
        let day = day_with_seed(7);
        assert_eq!(day.lfd.len(), 24);
        assert_eq!(day.gen.len(), 120);
        assert_eq!(day.nwp.len(), 24);
        assert_eq!(day.kpx.len(), 24);
        assert_eq!(day.curt.len(), 576);
        assert_eq!(day.hg_gen.len(), 192);
        assert_eq!(day.hg_meas.len(), 192);
    }

    #[test]
    fn variant_spreads_are_consistent() {
        let day = day_with_seed(11);
        day.lfd.iter().for_each(|r| assert_spread_consistent(&r.spread));
        day.gen.iter().for_each(|r| assert_spread_consistent(&r.spread));
    }

    #[test]
    fn forecasts_are_one_hour_after_creation() {
        let day = day_with_seed(3);
        for record in day.into_records() {
            if let Some((creation, forecast)) = record.forecast_window() {
                assert_eq!(forecast, creation.plus_hours(1), "{:?}", record.kind());
            }
        }
    }

    #[test]
    fn grid_balance_sums_renewable_headlines() {
        let day = day_with_seed(5);
        for (hour, kpx) in day.kpx.iter().enumerate() {
            let gens = &day.gen[hour * 5..hour * 5 + 5];
            assert!(gens.iter().all(|g| g.creation == kpx.observed));

            let total: f64 = gens.iter().map(|g| g.spread.headline).sum();
            assert!((kpx.renewable_total - total).abs() < 1e-5);

            let solar = gens.iter().find(|g| g.fuel == FuelType::Solar).map(|g| g.spread.headline);
            assert_eq!(Some(kpx.renewable_solar), solar.map(|v| round_to(v, 5)));
        }
    }

    #[test]
    fn demand_follows_the_profile() {
        let day = day_with_seed(9);
        for (hour, lfd) in day.lfd.iter().enumerate() {
            let (low, high) = profile::range_for(hour as u8, SeriesKind::Demand);
            assert!(lfd.spread.min >= low * 0.9 - 1e-6);
            assert!(lfd.spread.max <= high * 1.1 + 1e-6);
        }
    }

    #[test]
    fn curtailment_rows_cover_every_inner_hour() {
        let day = day_with_seed(13);
        let outer_three = &day.curt[3 * 24..4 * 24];
        for (inner, row) in outer_three.iter().enumerate() {
            assert_eq!(row.creation, Stamp::at_hour(DAY, inner as u8));
            assert_eq!(row.lead_time.to_string(), format!("{inner:03}00"));
            assert_eq!(row.registered_at, Stamp::at_hour(DAY, 3));
        }
    }

    #[test]
    fn hydrogen_area_ids_carry_the_group() {
        let day = day_with_seed(17);
        for r in &day.hg_gen {
            let prefix = format!("{}_H2_", r.area_group.code());
            assert!(r.area_id.starts_with(&prefix), "{}", r.area_id);
            assert_eq!(r.area_id.len(), prefix.len() + 3);
        }
        let noon = day.hg_meas.iter().find(|m| m.observed == Stamp::at_hour(DAY, 12));
        assert!(noon.is_some_and(|m| m.production >= 1000.0));
    }

    #[test]
    fn same_seed_reproduces_the_day() {
        assert_eq!(day_with_seed(42), day_with_seed(42));
        assert_ne!(day_with_seed(42), day_with_seed(43));
    }

    #[test]
    fn hydrogen_only_filter_keeps_always_produced_tables() {
        let filter = TableFilter::parse_list("HG_GEN,HG_MEAS");
        let day = synthesize(DAY, &filter, &mut StdRng::seed_from_u64(1));
        assert!(day.lfd.is_empty());
        assert!(day.gen.is_empty());
        assert!(day.nwp.is_empty());
        assert_eq!(day.kpx.len(), 24);
        assert_eq!(day.curt.len(), 576);
        assert_eq!(day.hg_gen.len(), 192);
        assert_eq!(day.hg_meas.len(), 192);
        assert!(day.kpx.iter().all(|k| k.renewable_total == 0.0 && k.renewable_wind == 0.0));
    }

    #[test]
    fn unknown_filter_names_produce_nothing_optional() {
        let filter = TableFilter::parse_list("SOLAR");
        let day = synthesize(DAY, &filter, &mut StdRng::seed_from_u64(1));
        let kinds: Vec<TableKind> = day.into_records().map(|r: Record| r.kind()).collect();
        assert!(kinds.iter().all(|k| k.is_always_produced()));
    }
}

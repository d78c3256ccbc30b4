//! Time-of-day value bands that shape every synthetic series.
//!
//! Pure lookups: an hour of day and a series kind map to a closed
//! `(low, high)` band that the synthesizer draws from uniformly.

/// Inclusive `(low, high)` value band.
pub type Band = (f64, f64);

pub const PRESSURE_BAND: Band = (1010.0, 1020.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySegment {
    /// 00–05
    Night,
    /// 06–09
    MorningPeak,
    /// 10–16
    Midday,
    /// 17–20
    EveningPeak,
    /// 21–23
    Evening,
}

impl DaySegment {
    pub fn of_hour(hour: u8) -> Self {
        debug_assert!(hour < 24, "hour of day out of range: {hour}");
        match hour {
            0..=5 => DaySegment::Night,
            6..=9 => DaySegment::MorningPeak,
            10..=16 => DaySegment::Midday,
            17..=20 => DaySegment::EveningPeak,
            _ => DaySegment::Evening,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeriesKind {
    /// System demand, MW.
    Demand,
    /// Solar irradiance, W/m².
    Irradiance,
    /// Air temperature, °C.
    Temperature,
    /// Relative humidity, %.
    Humidity,
    /// Wind speed, m/s.
    WindSpeed,
    /// Surface pressure, hPa. Same band all day.
    Pressure,
}

pub fn range_for(hour: u8, kind: SeriesKind) -> Band {
    use DaySegment::*;

    let segment = DaySegment::of_hour(hour);
    match kind {
        SeriesKind::Demand => match segment {
            Night => (30_000.0, 45_000.0),
            MorningPeak => (60_000.0, 80_000.0),
            Midday => (50_000.0, 70_000.0),
            EveningPeak => (65_000.0, 85_000.0),
            Evening => (40_000.0, 60_000.0),
        },
        SeriesKind::Irradiance => match segment {
            Night => (0.0, 50.0),
            MorningPeak => (200.0, 600.0),
            Midday => (600.0, 1000.0),
            EveningPeak => (300.0, 700.0),
            Evening => (0.0, 200.0),
        },
        SeriesKind::Temperature => match segment {
            Night => (10.0, 18.0),
            MorningPeak => (15.0, 25.0),
            Midday => (20.0, 30.0),
            EveningPeak => (18.0, 28.0),
            Evening => (15.0, 22.0),
        },
        SeriesKind::Humidity => match segment {
            Night => (70.0, 90.0),
            MorningPeak => (60.0, 80.0),
            Midday => (40.0, 60.0),
            EveningPeak => (50.0, 70.0),
            Evening => (60.0, 80.0),
        },
        SeriesKind::WindSpeed => match segment {
            Night => (1.0, 3.0),
            MorningPeak => (2.0, 5.0),
            Midday => (3.0, 7.0),
            EveningPeak => (2.0, 6.0),
            Evening => (1.0, 4.0),
        },
        SeriesKind::Pressure => PRESSURE_BAND,
    }
}

/// Production and capacity bands for one hydrogen record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HydrogenBands {
    pub production: Band,
    pub capacity: Band,
}

/// Hydrogen sites run harder between 06:00 and 18:00 inclusive.
pub fn is_hydrogen_daytime(hour: u8) -> bool {
    (6..=18).contains(&hour)
}

/// Forecast bands, MWh.
pub fn hydrogen_forecast_bands(hour: u8) -> HydrogenBands {
    if is_hydrogen_daytime(hour) {
        HydrogenBands { production: (50.0, 200.0), capacity: (100.0, 300.0) }
    } else {
        HydrogenBands { production: (20.0, 80.0), capacity: (50.0, 150.0) }
    }
}

/// Measurement bands, kg.
pub fn hydrogen_measurement_bands(hour: u8) -> HydrogenBands {
    if is_hydrogen_daytime(hour) {
        HydrogenBands { production: (1000.0, 5000.0), capacity: (2000.0, 8000.0) }
    } else {
        HydrogenBands { production: (500.0, 2000.0), capacity: (1000.0, 4000.0) }
    }
}

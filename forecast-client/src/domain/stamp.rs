use std::fmt;

use time::{Date, Duration, PrimitiveDateTime, Time};

/// A wall-clock instant in the reporting tables.
///
/// The tables key rows on a `VARCHAR(12)` in `YYYYMMDDHHMM` form; `Display`
/// renders exactly that key. Registration columns take the full datetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Stamp(PrimitiveDateTime);

impl Stamp {
    pub fn new(at: PrimitiveDateTime) -> Self {
        Self(at)
    }

    /// `hour` hours after midnight of `day`.
    pub fn at_hour(day: Date, hour: u8) -> Self {
        Self(PrimitiveDateTime::new(day, Time::MIDNIGHT) + Duration::hours(i64::from(hour)))
    }

    pub fn plus_hours(self, hours: i64) -> Self {
        Self(self.0 + Duration::hours(hours))
    }

    pub fn datetime(self) -> PrimitiveDateTime {
        self.0
    }

    pub fn key(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Stamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}{:02}{:02}{:02}{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day(),
            self.0.hour(),
            self.0.minute()
        )
    }
}

/// Forecast lead time, stored as `HHHMM` (three hour digits, two minute digits).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadTime {
    pub hours: u16,
    pub minutes: u8,
}

impl LeadTime {
    pub fn new(hours: u16, minutes: u8) -> Self {
        Self { hours, minutes }
    }
}

impl fmt::Display for LeadTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:03}{:02}", self.hours, self.minutes)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Stamp {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for LeadTime {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//! Latest-value sensor store.
//!
//! Each physical sensor owns a [`SensorSlot`] holding only its most recent raw
//! sample. The acquisition path overwrites slots through
//! [`SensorRegistry::update`]; readers observe them through view sessions.
//!
//! Raw codes are converted to physical values by the [`LookupTables`], which
//! are built once when the registry is created.

pub mod lookup;
pub mod notifier;
pub mod registry;
pub mod slot;

pub use lookup::{LookupTable, LookupTables};
pub use notifier::UpdateNotifier;
pub use registry::SensorRegistry;
pub use slot::SensorSlot;

use std::fmt;
use strum::FromRepr;

/// Number of measurement kinds reported by every sensor.
pub const MEASUREMENT_KINDS: usize = 3;

/// Measurement kinds carried in every sample.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, FromRepr)]
#[repr(u8)]
pub enum MeasurementKind {
    Battery = 0,
    Temperature = 1,
    Light = 2,
}

impl MeasurementKind {
    pub const ALL: [MeasurementKind; MEASUREMENT_KINDS] = [
        MeasurementKind::Battery,
        MeasurementKind::Temperature,
        MeasurementKind::Light,
    ];

    /// Index of this kind in per-kind arrays.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Short name used in device node names.
    pub fn short_name(self) -> &'static str {
        match self {
            MeasurementKind::Battery => "batt",
            MeasurementKind::Temperature => "temp",
            MeasurementKind::Light => "light",
        }
    }

    /// Parse a kind from its short or long name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "batt" | "battery" => Some(MeasurementKind::Battery),
            "temp" | "temperature" => Some(MeasurementKind::Temperature),
            "light" => Some(MeasurementKind::Light),
            _ => None,
        }
    }
}

impl fmt::Display for MeasurementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Publication stamp of a sample.
///
/// Stamps issued by one slot are strictly increasing. [`Timestamp::NEVER`]
/// compares older than every stamp an update can issue.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const NEVER: Timestamp = Timestamp(0);

    pub fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    pub fn as_nanos(self) -> u64 {
        self.0
    }
}

/// One raw sample as delivered by the acquisition path.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawSample {
    pub battery: u16,
    pub temperature: u16,
    pub light: u16,
}

impl RawSample {
    pub fn new(battery: u16, temperature: u16, light: u16) -> Self {
        Self {
            battery,
            temperature,
            light,
        }
    }

    /// Raw code for a single measurement kind.
    pub fn get(&self, kind: MeasurementKind) -> u16 {
        match kind {
            MeasurementKind::Battery => self.battery,
            MeasurementKind::Temperature => self.temperature,
            MeasurementKind::Light => self.light,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_repr() {
        assert_eq!(MeasurementKind::from_repr(0), Some(MeasurementKind::Battery));
        assert_eq!(MeasurementKind::from_repr(2), Some(MeasurementKind::Light));
        assert_eq!(MeasurementKind::from_repr(3), None);
    }

    #[test]
    fn test_kind_names() {
        for kind in MeasurementKind::ALL {
            assert_eq!(MeasurementKind::from_name(kind.short_name()), Some(kind));
        }
        assert_eq!(
            MeasurementKind::from_name("Temperature"),
            Some(MeasurementKind::Temperature)
        );
        assert_eq!(MeasurementKind::from_name("humidity"), None);
    }

    #[test]
    fn test_never_is_oldest() {
        assert!(Timestamp::NEVER < Timestamp::from_nanos(1));
    }
}

//! Addressing of view targets.
//!
//! A target is one measurement kind of one sensor. Device nodes encode it in
//! a minor number as `sensor << 3 | kind` and are conventionally named
//! `lunix<sensor>-<kind>`, e.g. `lunix0-temp`.

use crate::error::{LunixError, Result};
use crate::sensors::MeasurementKind;
use std::fmt;
use std::str::FromStr;

const KIND_BITS: u32 = 3;
const KIND_MASK: u32 = (1 << KIND_BITS) - 1;
const NODE_PREFIX: &str = "lunix";

/// Sensor and measurement kind watched by a view session.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Target {
    pub sensor: usize,
    pub kind: MeasurementKind,
}

impl Target {
    pub fn new(sensor: usize, kind: MeasurementKind) -> Self {
        Self { sensor, kind }
    }

    /// Build a target from an untyped kind index.
    pub fn from_parts(sensor: usize, kind: u8) -> Result<Self> {
        let kind = MeasurementKind::from_repr(kind).ok_or_else(|| {
            LunixError::InvalidArgument(format!("unknown measurement kind {kind}"))
        })?;
        Ok(Self::new(sensor, kind))
    }

    /// Decode a device minor number.
    pub fn from_minor(minor: u32) -> Result<Self> {
        Self::from_parts((minor >> KIND_BITS) as usize, (minor & KIND_MASK) as u8)
    }

    /// Device minor number of this target.
    pub fn minor(&self) -> u32 {
        ((self.sensor as u32) << KIND_BITS) | self.kind as u32
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}-{}", NODE_PREFIX, self.sensor, self.kind)
    }
}

impl FromStr for Target {
    type Err = LunixError;

    /// Parse a node name such as `lunix3-light` (a leading `/dev/` is accepted).
    fn from_str(s: &str) -> Result<Self> {
        let invalid = || LunixError::InvalidArgument(format!("invalid device node name '{s}'"));

        let name = s.strip_prefix("/dev/").unwrap_or(s);
        let rest = name.strip_prefix(NODE_PREFIX).ok_or_else(invalid)?;
        let (sensor, kind) = rest.split_once('-').ok_or_else(invalid)?;
        let sensor = sensor.parse::<usize>().map_err(|_| invalid())?;
        let kind = MeasurementKind::from_name(kind).ok_or_else(invalid)?;
        Ok(Self::new(sensor, kind))
    }
}

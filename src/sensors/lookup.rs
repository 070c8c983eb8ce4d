//! Raw code to physical value conversion.
//!
//! Every measurement kind has a table indexed by the full `u16` raw code
//! domain. Entries are signed milli-units: millivolts for battery and light,
//! millidegrees Celsius for temperature.
//!
//! The standard curves model a 10-bit ADC on a mote sensor board: the battery
//! is measured against a 1.223 V bandgap reference, temperature through a
//! 10 kOhm thermistor divider (Steinhart-Hart), and light as the photo
//! resistor divider voltage. Codes above the ADC range are clamped.

use super::{MEASUREMENT_KINDS, MeasurementKind};
use crate::error::Result;

/// Number of entries in each table.
pub const TABLE_LEN: usize = u16::MAX as usize + 1;

const ADC_MAX: f64 = 1023.0;
const BANDGAP_VOLTS: f64 = 1.223;
const THERMISTOR_REF_OHMS: f64 = 10_000.0;
const STEINHART_A: f64 = 0.001_010_024;
const STEINHART_B: f64 = 0.000_242_127;
const STEINHART_C: f64 = 0.000_000_146;
const KELVIN_OFFSET: f64 = 273.15;

/// Conversion table for one measurement kind.
#[derive(Clone)]
pub struct LookupTable {
    entries: Vec<i32>,
}

impl LookupTable {
    /// Build a table by evaluating `f` for every raw code.
    pub fn from_fn(f: impl Fn(u16) -> i32) -> Result<Self> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(TABLE_LEN)?;
        entries.extend((0..=u16::MAX).map(f));
        Ok(Self { entries })
    }

    /// Table mapping every code to zero.
    pub fn zeroed() -> Result<Self> {
        Self::from_fn(|_| 0)
    }

    pub fn get(&self, raw: u16) -> i32 {
        self.entries[raw as usize]
    }

    /// Override a single entry, e.g. from a calibration run.
    pub fn set(&mut self, raw: u16, milli: i32) {
        self.entries[raw as usize] = milli;
    }
}

impl std::fmt::Debug for LookupTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LookupTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

/// The full set of conversion tables, one per measurement kind.
///
/// Built once and shared read-only behind an `Arc` afterwards.
#[derive(Clone, Debug)]
pub struct LookupTables {
    tables: [LookupTable; MEASUREMENT_KINDS],
}

impl LookupTables {
    pub fn new(battery: LookupTable, temperature: LookupTable, light: LookupTable) -> Self {
        Self {
            tables: [battery, temperature, light],
        }
    }

    /// Tables for the standard sensor board curves.
    pub fn standard() -> Result<Self> {
        Ok(Self::new(
            LookupTable::from_fn(battery_millivolts)?,
            LookupTable::from_fn(temperature_millicelsius)?,
            LookupTable::from_fn(light_millivolts)?,
        ))
    }

    pub fn convert(&self, kind: MeasurementKind, raw: u16) -> i32 {
        self.tables[kind.index()].get(raw)
    }

    pub fn table(&self, kind: MeasurementKind) -> &LookupTable {
        &self.tables[kind.index()]
    }

    pub fn table_mut(&mut self, kind: MeasurementKind) -> &mut LookupTable {
        &mut self.tables[kind.index()]
    }
}

fn adc(raw: u16) -> f64 {
    f64::from(raw).min(ADC_MAX)
}

/// Supply voltage derived from the bandgap reading.
fn battery_millivolts(raw: u16) -> i32 {
    let code = adc(raw);
    if code == 0.0 {
        return 0;
    }
    (BANDGAP_VOLTS * (ADC_MAX + 1.0) / code * 1000.0).round() as i32
}

fn temperature_millicelsius(raw: u16) -> i32 {
    let code = adc(raw).clamp(1.0, ADC_MAX - 1.0);
    let ohms = THERMISTOR_REF_OHMS * (ADC_MAX - code) / code;
    let ln_r = ohms.ln();
    let kelvin = 1.0 / (STEINHART_A + STEINHART_B * ln_r + STEINHART_C * ln_r.powi(3));
    ((kelvin - KELVIN_OFFSET) * 1000.0).round() as i32
}

/// Photo resistor divider voltage against a 3 V supply.
fn light_millivolts(raw: u16) -> i32 {
    (adc(raw) * 3000.0 / (ADC_MAX + 1.0)).round() as i32
}

//! Text rendering of samples for view sessions.

use super::DisplayMode;
use crate::sensors::{LookupTables, MeasurementKind};
use core::fmt::Write;

/// Capacity of a session's formatted buffer.
///
/// The longest rendering is a cooked `i32` value (`-2147483.648\n`, 13 bytes).
pub const BUFFER_CAPACITY: usize = 20;

pub type FormatBuffer = heapless::String<BUFFER_CAPACITY>;

/// Render `raw` into `buf` according to `mode`, replacing its contents.
///
/// Cooked values are written as a sign, the integer part, a dot, exactly
/// three fractional digits and a newline. Raw codes are written in decimal
/// followed by a newline.
pub fn render(
    buf: &mut FormatBuffer,
    mode: DisplayMode,
    kind: MeasurementKind,
    raw: u16,
    lookup: &LookupTables,
) -> core::fmt::Result {
    buf.clear();
    match mode {
        DisplayMode::Raw => writeln!(buf, "{raw}"),
        DisplayMode::Cooked => {
            let milli = lookup.convert(kind, raw);
            let sign = if milli >= 0 { '+' } else { '-' };
            let magnitude = milli.unsigned_abs();
            writeln!(buf, "{sign}{}.{:03}", magnitude / 1000, magnitude % 1000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::LookupTable;

    fn tables_with(kind: MeasurementKind, raw: u16, milli: i32) -> LookupTables {
        let mut tables = LookupTables::new(
            LookupTable::zeroed().unwrap(),
            LookupTable::zeroed().unwrap(),
            LookupTable::zeroed().unwrap(),
        );
        tables.table_mut(kind).set(raw, milli);
        tables
    }

    fn cooked(milli: i32) -> FormatBuffer {
        let tables = tables_with(MeasurementKind::Temperature, 300, milli);
        let mut buf = FormatBuffer::new();
        render(
            &mut buf,
            DisplayMode::Cooked,
            MeasurementKind::Temperature,
            300,
            &tables,
        )
        .unwrap();
        buf
    }

    #[test]
    fn test_cooked_positive() {
        assert_eq!(cooked(23_456).as_str(), "+23.456\n");
    }

    #[test]
    fn test_cooked_pads_fraction() {
        assert_eq!(cooked(1_005).as_str(), "+1.005\n");
        assert_eq!(cooked(0).as_str(), "+0.000\n");
    }

    #[test]
    fn test_cooked_negative() {
        assert_eq!(cooked(-7_250).as_str(), "-7.250\n");
        assert_eq!(cooked(-5).as_str(), "-0.005\n");
    }

    #[test]
    fn test_cooked_extremes_fit() {
        assert_eq!(cooked(i32::MIN).as_str(), "-2147483.648\n");
        assert_eq!(cooked(i32::MAX).as_str(), "+2147483.647\n");
    }

    #[test]
    fn test_raw_keeps_full_code() {
        let tables = tables_with(MeasurementKind::Light, 0, 0);
        let mut buf = FormatBuffer::new();
        render(
            &mut buf,
            DisplayMode::Raw,
            MeasurementKind::Light,
            u16::MAX,
            &tables,
        )
        .unwrap();
        assert_eq!(buf.as_str(), "65535\n");
    }

    #[test]
    fn test_render_replaces_previous_text() {
        let tables = tables_with(MeasurementKind::Battery, 0, 0);
        let mut buf = FormatBuffer::new();
        render(&mut buf, DisplayMode::Raw, MeasurementKind::Battery, 12345, &tables).unwrap();
        render(&mut buf, DisplayMode::Raw, MeasurementKind::Battery, 7, &tables).unwrap();
        assert_eq!(buf.as_str(), "7\n");
    }
}

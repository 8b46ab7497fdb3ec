//! Text rendering of a scan verdict

use std::fmt;

use super::analyzer::{BandReport, ScanVerdict};

/// Width of the power bar for the strongest band
pub const MAX_BAR_WIDTH: usize = 40;

/// Bar length for `power`, scaled so `max_power` fills `MAX_BAR_WIDTH`
pub fn bar_width(power: f64, max_power: f64) -> usize {
    if !(max_power > 0.0) || !power.is_finite() || power <= 0.0 {
        return 0;
    }
    let width = (MAX_BAR_WIDTH as f64 * (power / max_power)).ceil();
    (width as usize).min(MAX_BAR_WIDTH)
}

fn write_band(f: &mut fmt::Formatter<'_>, row: &BandReport, max_power: f64) -> fmt::Result {
    write!(
        f,
        "{:5} {:20.6} to {:20.6} Hz: {:20.6} ",
        row.band, row.edges.low_hz, row.edges.high_hz, row.power
    )?;
    f.write_str(&"*".repeat(bar_width(row.power, max_power)))?;
    f.write_str(if row.flagged { "(WOW)" } else { "(meh)" })?;
    writeln!(f)
}

impl fmt::Display for ScanVerdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.bands {
            write_band(f, row, self.max_power)?;
        }

        match self.detection {
            Some(d) => write!(
                f,
                "POSSIBLE ANOMALY {:.6}-{:.6} Hz (CENTER {:.6} Hz)",
                d.low_hz,
                d.high_hz,
                d.center_hz()
            ),
            None => write!(f, "no anomaly"),
        }
    }
}

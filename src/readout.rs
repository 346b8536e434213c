//! Text readout of coordinate queries
//!
//! Any failed query shows as "no data", never as a stale or zeroed value.

use std::fmt::Write;

use crate::errors::QueryError;
use crate::types::LatLong;

/// Formats positions as `12.3456° N, 45.6789° W`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Readout {
    decimals: usize,
}

impl Default for Readout {
    fn default() -> Self {
        Readout { decimals: 4 }
    }
}

impl Readout {
    pub const NO_DATA: &'static str = "no data";

    pub fn new(decimals: usize) -> Self {
        Readout { decimals }
    }

    pub fn format(&self, result: &Result<LatLong, QueryError>) -> String {
        match result {
            Ok(at) => self.format_lat_long(*at),
            Err(_) => Self::NO_DATA.to_string(),
        }
    }

    pub fn format_lat_long(&self, at: LatLong) -> String {
        let mut out = String::new();
        self.push_axis(&mut out, at.lat, 'N', 'S');
        out.push_str(", ");
        self.push_axis(&mut out, at.long, 'E', 'W');
        out
    }

    fn push_axis(&self, out: &mut String, value: f64, positive: char, negative: char) {
        let magnitude = format!("{:.*}", self.decimals, value.abs());
        // -0.00001 rounds to zero and reads as positive
        let zero = magnitude.chars().all(|c| c == '0' || c == '.');
        let hemisphere = if value < 0.0 && !zero { negative } else { positive };
        let _ = write!(out, "{}° {}", magnitude, hemisphere);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_hemispheres() {
        let readout = Readout::default();
        insta::assert_snapshot!(
            readout.format(&Ok(LatLong::new(12.34564, -45.6789))),
            @"12.3456° N, 45.6789° W"
        );
        insta::assert_snapshot!(
            readout.format(&Ok(LatLong::new(-33.8688, 151.2093))),
            @"33.8688° S, 151.2093° E"
        );
    }

    #[test]
    fn negative_zero_reads_positive() {
        let readout = Readout::new(2);
        assert_eq!(
            readout.format_lat_long(LatLong::new(-0.001, -0.0)),
            "0.00° N, 0.00° E"
        );
    }

    #[test]
    fn failures_read_no_data() {
        let readout = Readout::default();
        assert_eq!(readout.format(&Err(QueryError::NotReady { pending: 2 })), "no data");
        assert_eq!(
            readout.format(&Err(QueryError::PointOutOfBounds { x: 1.0, y: 2.0 })),
            "no data"
        );
    }
}

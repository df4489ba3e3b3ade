//! Aggregated series state for one fetch cycle

use super::reading::Reading;
use serde::Serialize;

/// Three parallel sequences, newest object first.
///
/// Only `push` mutates it, so the three vectors always have equal length.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesState {
    timestamps: Vec<String>,
    moisture_a: Vec<f64>,
    moisture_b: Vec<f64>,
}

impl SeriesState {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, reading: Reading) {
        self.timestamps.push(reading.timestamp);
        self.moisture_a.push(reading.moisture_a);
        self.moisture_b.push(reading.moisture_b);
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    #[cfg(test)]
    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    #[cfg(test)]
    pub fn moisture_a(&self) -> &[f64] {
        &self.moisture_a
    }

    #[cfg(test)]
    pub fn moisture_b(&self) -> &[f64] {
        &self.moisture_b
    }

    /// Timestamp of the point drawn at `display_index` in a chronological chart
    pub fn timestamp_for_display_index(&self, display_index: usize) -> Option<&str> {
        let len = self.len();
        if display_index >= len {
            return None;
        }
        self.timestamps.get(len - 1 - display_index).map(String::as_str)
    }

    /// Oldest-first copy for left-to-right plotting
    pub fn chronological(&self) -> Chronological {
        let mut timestamps = self.timestamps.clone();
        let mut moisture_a = self.moisture_a.clone();
        let mut moisture_b = self.moisture_b.clone();
        timestamps.reverse();
        moisture_a.reverse();
        moisture_b.reverse();
        Chronological {
            timestamps,
            moisture_a,
            moisture_b,
        }
    }
}

/// Series reversed once into display order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chronological {
    pub timestamps: Vec<String>,
    pub moisture_a: Vec<f64>,
    pub moisture_b: Vec<f64>,
}

//! Emulates a small IoT device with three temperature-like sensors.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::helpers::time::now_iso8601;

/// Readings fall in `[MIN_MILLI, MIN_MILLI + SPAN_MILLI)` thousandths.
const MIN_MILLI: u32 = 22_500;
const SPAN_MILLI: u32 = 5_000;

/// One collection event, submitted as-is to the data API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SensorReading {
    pub device_id: String,
    pub timestamp: String,
    pub data1: f64,
    pub data2: f64,
    pub data3: f64,
}

#[derive(Debug, Clone)]
pub struct SensorGenerator {
    device_id: String,
}

impl SensorGenerator {
    pub fn new(device_id: impl Into<String>) -> Self {
        Self { device_id: device_id.into() }
    }

    pub fn read(&self) -> SensorReading {
        let mut rng = rand::rng();
        SensorReading {
            device_id: self.device_id.clone(),
            timestamp: now_iso8601(),
            data1: one_value(&mut rng),
            data2: one_value(&mut rng),
            data3: one_value(&mut rng),
        }
    }
}

fn one_value<R: Rng>(rng: &mut R) -> f64 {
    (MIN_MILLI + rng.random_range(0..SPAN_MILLI)) as f64 / 1000.0
}

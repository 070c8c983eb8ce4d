//! Simulated acquisition for development and testing.
//!
//! Stands in for the hardware line discipline: every tick, each sensor in the
//! registry receives a new raw sample. Codes follow a bounded random walk in
//! the 10-bit ADC range so consecutive cooked values look plausible.

use crate::sensors::{RawSample, SensorRegistry};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, interval};

const ADC_MAX: i32 = 1023;
const MAX_STEP: i32 = 8;

/// Random-walk state of one simulated sensor.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SimulatedSensor {
    sample: RawSample,
}

impl SimulatedSensor {
    /// Start from mid-range battery and temperature and a dim light reading.
    pub fn new() -> Self {
        Self {
            sample: RawSample::new(500, 512, 200),
        }
    }

    /// Advance the walk and return the next sample.
    pub fn next_sample(&mut self, rng: &mut impl Rng) -> RawSample {
        self.sample = RawSample::new(
            step(self.sample.battery, rng),
            step(self.sample.temperature, rng),
            step(self.sample.light, rng),
        );
        self.sample
    }
}

fn step(code: u16, rng: &mut impl Rng) -> u16 {
    let delta = rng.gen_range(-MAX_STEP..=MAX_STEP);
    (i32::from(code) + delta).clamp(0, ADC_MAX) as u16
}

impl Default for SimulatedSensor {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawn a task feeding every sensor in `registry` a new sample each `period`.
///
/// The task stops on its own once the registry shuts down.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_sensor_simulation(registry: Arc<SensorRegistry>, period: Duration) -> JoinHandle<()> {
    let shutdown = registry.shutdown_token();
    tokio::spawn(async move {
        info!("[Sim] Feeding {} sensors every {:?}", registry.len(), period);
        let mut rng = StdRng::from_entropy();
        let mut sensors = vec![SimulatedSensor::new(); registry.len()];
        let mut interval = interval(period);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }
            for (id, sensor) in sensors.iter_mut().enumerate() {
                let sample = sensor.next_sample(&mut rng);
                registry.update(id, sample.battery, sample.temperature, sample.light);
            }
            debug!("[Sim] Published samples for {} sensors", sensors.len());
        }
        info!("[Sim] Simulation stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::MeasurementKind;

    #[test]
    fn test_walk_stays_in_adc_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut sensor = SimulatedSensor::new();
        let mut previous = RawSample::new(500, 512, 200);
        for _ in 0..10_000 {
            let sample = sensor.next_sample(&mut rng);
            for kind in MeasurementKind::ALL {
                let code = i32::from(sample.get(kind));
                assert!((0..=ADC_MAX).contains(&code));
                assert!((code - i32::from(previous.get(kind))).abs() <= MAX_STEP);
            }
            previous = sample;
        }
    }

    #[tokio::test]
    async fn test_simulation_updates_all_sensors_until_shutdown() {
        let registry = Arc::new(SensorRegistry::new(3).unwrap());
        let handle = run_sensor_simulation(registry.clone(), Duration::from_millis(5));

        tokio::time::sleep(Duration::from_millis(50)).await;
        for slot in registry.slots() {
            assert!(slot.last_update() > crate::sensors::Timestamp::NEVER);
        }

        registry.shutdown();
        handle.await.unwrap();
    }
}

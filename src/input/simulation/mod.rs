//! Simulated acquisition source.

pub mod sensors;

pub use sensors::{SimulatedSensor, run_sensor_simulation};

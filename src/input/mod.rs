//! Acquisition sources feeding the sensor registry.
//!
//! Real hardware drives [`crate::sensors::SensorRegistry::update`] from its
//! own polling or interrupt path. The sources here do the same for
//! development setups without hardware.
//!
//! Current input sources:
//! - `simulation`: random-walk samples on a fixed period

pub mod simulation;

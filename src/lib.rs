//! Lunix sensor cache library.
//!
//! This library keeps the latest raw sample of every sensor and exposes each
//! measurement to independent readers as a byte stream that blocks until
//! fresher data arrives.

pub mod config;
pub mod error;
pub mod input;
pub mod sensors;
pub mod view;

pub use error::{LunixError, Result};
pub use sensors::{MeasurementKind, SensorRegistry, Timestamp};
pub use view::{DisplayMode, SessionOptions, Target, ViewSession};

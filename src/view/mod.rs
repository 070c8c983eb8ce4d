//! Per-reader byte-stream views over sensor slots.
//!
//! A [`ViewSession`] turns the latest sample of one [`Target`] into text and
//! serves it through `read`/`seek`. Reading from the start of the buffer
//! always refreshes first: either fresher data is formatted, the caller is
//! parked until an update arrives, or a non-blocking session fails with
//! [`crate::LunixError::WouldBlock`].

pub mod format;
pub mod session;
pub mod target;

pub use format::BUFFER_CAPACITY;
pub use session::ViewSession;
pub use target::Target;

/// How samples are rendered for a session.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum DisplayMode {
    /// The unconverted raw code in decimal.
    Raw,
    /// The converted physical value with three decimals.
    #[default]
    Cooked,
}

/// Per-session configuration, fixed when the session is opened.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SessionOptions {
    pub mode: DisplayMode,
    /// Park readers until fresh data arrives instead of failing with `WouldBlock`.
    pub blocking: bool,
}

impl SessionOptions {
    pub fn cooked() -> Self {
        Self::default()
    }

    pub fn raw() -> Self {
        Self {
            mode: DisplayMode::Raw,
            ..Self::default()
        }
    }

    pub fn nonblocking(self) -> Self {
        Self {
            blocking: false,
            ..self
        }
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Cooked,
            blocking: true,
        }
    }
}

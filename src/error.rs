//! Error types.
//!
//! - [`ConfigError`]: a zone or pixel selection that does not fit the strip.
//!   Raised while the fixture is being assembled, before any pixel is driven.
//! - [`Error`]: runtime errors from the animator and the control loop,
//!   generic over the strip driver's error type.
//!
//! Stuck or glitching buttons are not errors: the button watchdog resets
//! them to [`Press::Low`](crate::button::Press::Low) silently.

/// Invalid zone or pixel selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum ConfigError {
    /// A pixel index is not below the strip's pixel count.
    IndexOutOfRange {
        /// Offending index
        index: usize,
        /// Number of pixels on the strip
        len: usize,
    },
    /// A stepped range produced an index below zero.
    NegativeIndex {
        /// Offending index
        index: i32,
    },
    /// A zone has more indices than its backing storage holds.
    ZoneTooLarge {
        /// Storage capacity of the zone
        capacity: usize,
    },
    /// A stepped range was declared with a step of zero.
    ZeroStep,
    /// The stage-one offset of a zone is past its end.
    SkipOutOfRange {
        /// Requested offset
        skip: usize,
        /// Zone length
        len: usize,
    },
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ConfigError::IndexOutOfRange { index, len } => {
                write!(f, "Pixel index {index} out of range for {len} pixels")
            }
            ConfigError::NegativeIndex { index } => write!(f, "Negative pixel index {index}"),
            ConfigError::ZoneTooLarge { capacity } => {
                write!(f, "Zone exceeds capacity of {capacity} pixels")
            }
            ConfigError::ZeroStep => write!(f, "Zone range step must not be zero"),
            ConfigError::SkipOutOfRange { skip, len } => {
                write!(f, "Stage-one offset {skip} past end of zone ({len} pixels)")
            }
        }
    }
}

impl core::error::Error for ConfigError {}

/// Runtime error of the animator and control loop.
///
/// Generic over the strip driver error so callers can still match on the
/// underlying bus error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(target_arch = "arm", derive(defmt::Format))]
pub enum Error<E> {
    /// Invalid pixel selection
    Config(ConfigError),
    /// The strip driver failed to push the frame
    Driver(E),
    /// The power latch could not be released
    PowerOff,
}

impl<E> From<ConfigError> for Error<E> {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}

impl<E> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Config(err) => write!(f, "Configuration error: {err}"),
            Error::Driver(_) => write!(f, "Strip driver error"),
            Error::PowerOff => write!(f, "Power off failed"),
        }
    }
}

impl<E: core::fmt::Debug> core::error::Error for Error<E> {}

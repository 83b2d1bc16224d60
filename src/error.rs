use std::error::Error;
use std::fmt::{self, Debug, Display, Formatter};

use crate::block::MAX_KEY;

/// Rejected [`Limits`](crate::Limits) configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitsError {
    /// `max` was zero, so no key would be addressable.
    ZeroMax,
    /// `max` exceeds the 24-bit key space.
    MaxTooLarge(u32),
}

impl Display for LimitsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LimitsError::ZeroMax => write!(f, "max must be at least 1"),
            LimitsError::MaxTooLarge(max) => {
                write!(f, "max {max} exceeds the key space of {MAX_KEY}")
            }
        }
    }
}

impl Error for LimitsError {}

/// A key that does not fit below the configured `max`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyOutOfRange {
    pub key: u32,
    pub max: u32,
}

impl Debug for KeyOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyOutOfRange")
            .field("key", &self.key)
            .field("max", &self.max)
            .finish()
    }
}

impl Display for KeyOutOfRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "key {} is out of range (max {})", self.key, self.max)
    }
}

impl Error for KeyOutOfRange {}

//! Shared types used across the handset firmware
//!
//! This module defines domain-specific types that enforce invariants
//! at compile time and provide type safety throughout the codebase.

use core::fmt;

use heapless::String;

use crate::config::{CLOCK_SIZE, PHONE_NUMBER_SIZE, SMS_BODY_SIZE};

/// Signal level on the 0-5 bar scale shown to the user
///
/// Derived from the raw `+CSQ` RSSI value (0-31, 99 = unknown).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SignalLevel(u8);

impl SignalLevel {
    /// No signal / unknown
    pub const NONE: Self = Self(0);

    /// Maximum displayable level
    pub const MAX: Self = Self(5);

    /// Map a raw `+CSQ` RSSI reading (0-31) onto the 0-5 bar scale
    ///
    /// Rounds to nearest: level = round(raw / 6), clamped to 5.
    #[must_use]
    pub const fn from_raw_rssi(raw: u32) -> Self {
        let level = (raw + 3) / 6;
        if level > 5 {
            Self(5)
        } else {
            Self(level as u8)
        }
    }

    /// Get the level as a bar count (0-5)
    #[must_use]
    pub const fn bars(self) -> u8 {
        self.0
    }
}

impl fmt::Debug for SignalLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SignalLevel({}/5)", self.0)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SignalLevel {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}/5", self.0);
    }
}

/// Modem sleep mode, the argument to `AT+CSCLK`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SleepMode {
    /// Sleep disabled, modem always responsive
    #[default]
    Off,
    /// Sleep controlled by the DTR line
    Dtr,
    /// Automatic sleep when idle, woken by serial traffic
    Auto,
}

impl SleepMode {
    /// Get the numeric `AT+CSCLK` argument
    #[must_use]
    pub const fn as_arg(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Dtr => 1,
            Self::Auto => 2,
        }
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SleepMode {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Off => defmt::write!(f, "CSCLK=0"),
            Self::Dtr => defmt::write!(f, "CSCLK=1"),
            Self::Auto => defmt::write!(f, "CSCLK=2"),
        }
    }
}

/// A text-mode SMS as read back from the modem store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SmsRecord {
    /// Originating number
    pub number: String<PHONE_NUMBER_SIZE>,
    /// Receive date (`yy/MM/dd`)
    pub date: String<CLOCK_SIZE>,
    /// Receive time (`HH:mm:ss+zz`)
    pub time: String<CLOCK_SIZE>,
    /// Message body
    pub body: String<SMS_BODY_SIZE>,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SmsRecord {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "SMS from {}", self.number.as_str());
    }
}

/// Outcome of an SMS submission
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendStatus {
    /// Message accepted by the network
    Sent,
    /// Submission rejected or the modem stayed silent
    Error,
}

impl SendStatus {
    /// Short label for display
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sent => "OK",
            Self::Error => "ERROR",
        }
    }

    /// Check for success
    #[must_use]
    pub const fn is_sent(self) -> bool {
        matches!(self, Self::Sent)
    }
}

#[cfg(feature = "embedded")]
impl defmt::Format for SendStatus {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{}", self.as_str());
    }
}

//! GSM Handset Firmware Library
//!
//! This library provides the core functionality for a pyboard-class
//! (STM32F405) GSM handset built around the SIM800L cellular modem.
//! It turns the modem's byte-oriented UART into a reliable AT
//! command/response protocol plus an asynchronous event feed (incoming
//! calls, caller id, SMS arrival, balance queries, call termination).
//!
//! # Architecture
//!
//! The firmware is organized in layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    APPLICATION LAYER                         │
//! │  Screens / phonebook / poll loop (external collaborators)    │
//! ├─────────────────────────────────────────────────────────────┤
//! │                     MODEM ENGINE                             │
//! │  Command Engine │ Response Parsers │ Event Dispatch │ HTTP   │
//! ├─────────────────────────────────────────────────────────────┤
//! │              POWER / SLEEP COORDINATION                      │
//! │  Inactivity budget │ Wake flags │ Sleep handshake            │
//! ├─────────────────────────────────────────────────────────────┤
//! │                   TRANSPORT / HAL LAYER                      │
//! │  Line-oriented UART port │ Wake interrupts (EXTI)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Design Principles
//!
//! - **Single command in flight**: the engine is not re-entrant; `&mut`
//!   receivers enforce the invariant at compile time
//! - **Total parsers**: malformed replies yield documented defaults,
//!   never a panic
//! - **Silence is not an error**: a quiet modem reads as absent data and
//!   callers degrade to defaults
//! - **Interrupts only set flags**: wake edges cross into the poll loop
//!   through one atomic flag, never by issuing commands
//! - **No unsafe anywhere**: the HAL layer builds on embassy's safe APIs

#![cfg_attr(feature = "embedded", no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Re-export dependencies needed by applications (only in embedded mode)
#[cfg(feature = "embedded")]
pub use embassy_executor;
#[cfg(feature = "embedded")]
pub use embassy_stm32;
#[cfg(feature = "embedded")]
pub use embassy_time;

/// Hardware Abstraction Layer
///
/// UART line port and wake-interrupt wiring over STM32F405 peripherals.
#[cfg(feature = "embedded")]
pub mod hal;

/// Serial line transport
///
/// The `LinePort` seam between the engine and the UART, plus lossy text
/// decoding and the scripted port for host tests.
pub mod transport;

/// SIM800L modem control
///
/// Command engine, reply parsers, unsolicited-event dispatch, HTTP GET.
pub mod modem;

/// Power Management
///
/// Sleep/wake coordination and the interrupt-to-poll-loop wake flag.
pub mod power;

/// Shared types used across modules
pub mod types;

/// System configuration and constants
pub mod config;

/// Prelude module for common imports
#[cfg(feature = "embedded")]
pub mod prelude {
    //! Convenient re-exports for common types and traits.

    pub use crate::config::*;
    pub use crate::modem::{AtCommand, EventSink, Modem, ModemEvent};
    pub use crate::power::{SleepCoordinator, WakeFlag, WakeSource};
    pub use crate::transport::LinePort;
    pub use crate::types::*;

    // Embassy
    pub use embassy_time::{Duration, Instant, Timer};

    // Error handling
    pub use core::result::Result;

    // Logging
    pub use defmt::{debug, error, info, trace, warn};
}

//! Hardware Abstraction Layer
//!
//! Provides safe abstractions over STM32F405 peripherals.
//! This module isolates hardware-specific code: the modem UART as a
//! blocking line port and the wake-edge interrupt inputs.

pub mod uart;
pub mod wake;

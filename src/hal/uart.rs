//! Modem UART line port
//!
//! Wraps the blocking USART connected to the SIM800L as a [`LinePort`].
//! All waiting happens here against explicit deadlines; callers never
//! sleep around the port themselves.

use embassy_stm32::mode::Blocking;
use embassy_stm32::usart::Uart;
use embassy_time::{block_for, Duration, Instant};
use heapless::Vec;

use crate::config::LINE_BUFFER_SIZE;
use crate::transport::{decode_line, DecodePolicy, Line, LinePort};

/// Blocking UART line port for the modem link
pub struct ModemUart<'d> {
    uart: Uart<'d, Blocking>,
    policy: DecodePolicy,
    /// One byte read ahead by `bytes_available`
    pending: Option<u8>,
}

impl<'d> ModemUart<'d> {
    /// Wrap a configured blocking UART
    #[must_use]
    pub fn new(uart: Uart<'d, Blocking>, policy: DecodePolicy) -> Self {
        Self {
            uart,
            policy,
            pending: None,
        }
    }

    /// Pull one byte if available right now, without blocking
    fn poll_byte(&mut self) -> Option<u8> {
        if let Some(byte) = self.pending.take() {
            return Some(byte);
        }
        match self.uart.nb_read() {
            Ok(byte) => Some(byte),
            Err(nb::Error::WouldBlock) => None,
            // Framing/noise errors drop the byte; the decode layer handles
            // any garbage that does get through.
            Err(nb::Error::Other(_)) => None,
        }
    }

    /// Pull one byte, waiting until the deadline
    fn read_byte_until(&mut self, deadline: Instant) -> Option<u8> {
        loop {
            if let Some(byte) = self.poll_byte() {
                return Some(byte);
            }
            if Instant::now() >= deadline {
                return None;
            }
            block_for(Duration::from_micros(200));
        }
    }
}

impl LinePort for ModemUart<'_> {
    fn write(&mut self, bytes: &[u8]) {
        let _ = self.uart.blocking_write(bytes);
    }

    fn read_line(&mut self, timeout_ms: u32) -> Option<Line> {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        let mut raw: Vec<u8, LINE_BUFFER_SIZE> = Vec::new();

        loop {
            let Some(byte) = self.read_byte_until(deadline) else {
                // Timeout with nothing framed yet reads as no line.
                if raw.is_empty() {
                    return None;
                }
                return decode_line(&raw, self.policy);
            };
            if byte == b'\n' {
                return decode_line(&raw, self.policy);
            }
            let _ = raw.push(byte);
        }
    }

    fn read_bytes(&mut self, buf: &mut [u8], timeout_ms: u32) -> usize {
        let deadline = Instant::now() + Duration::from_millis(u64::from(timeout_ms));
        let mut filled = 0;
        while filled < buf.len() {
            let Some(byte) = self.read_byte_until(deadline) else {
                break;
            };
            buf[filled] = byte;
            filled += 1;
        }
        filled
    }

    fn bytes_available(&mut self) -> bool {
        if let Some(byte) = self.poll_byte() {
            self.pending = Some(byte);
            return true;
        }
        false
    }

    fn discard_input(&mut self) {
        self.pending = None;
        while self.poll_byte().is_some() {}
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}

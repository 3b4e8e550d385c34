//! Unsolicited event dispatch
//!
//! Lines the modem sends without being prompted (RING, caller id, SMS
//! arrival, USSD results, carrier loss) are classified here and forwarded
//! to the application's [`EventSink`]. At most one line is consumed per
//! poll call; further events queue in the UART buffer until the next cycle.

use heapless::String;

use crate::config::{CREDIT_SIZE, LINE_GAP_TIMEOUT_MS, PHONE_NUMBER_SIZE};
use crate::modem::engine::Modem;
use crate::modem::parse;
use crate::transport::LinePort;

/// One unsolicited modem event
///
/// Transient: constructed from a single raw line, forwarded to the sink,
/// never stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ModemEvent {
    /// `RING` — an incoming call has started
    IncomingCall,
    /// `+CLIP` — caller id for the ringing call
    CallerId(String<PHONE_NUMBER_SIZE>),
    /// `+CMTI` — a new SMS landed in the given store slot
    MessageArrived(u32),
    /// `+CUSD` — a balance query completed with the extracted credit text
    UssdResult(String<CREDIT_SIZE>),
    /// `NO CARRIER` — the remote side ended the call
    CarrierLost,
}

#[cfg(feature = "embedded")]
impl defmt::Format for ModemEvent {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::IncomingCall => defmt::write!(f, "RING"),
            Self::CallerId(n) => defmt::write!(f, "CLIP({})", n.as_str()),
            Self::MessageArrived(id) => defmt::write!(f, "CMTI({})", id),
            Self::UssdResult(c) => defmt::write!(f, "CUSD({})", c.as_str()),
            Self::CarrierLost => defmt::write!(f, "NO CARRIER"),
        }
    }
}

/// Receiver for unsolicited modem events
///
/// Wired in by dependency injection at the poll site. Every handler except
/// [`EventSink::on_carrier_lost`] defaults to a no-op: a dropped call must
/// always be handled, so leaving it out is a compile error rather than a
/// runtime defect.
pub trait EventSink {
    /// An incoming call has started ringing
    fn on_incoming_call(&mut self) {}

    /// Caller id arrived for the ringing call
    fn on_caller_id(&mut self, _number: &str) {}

    /// A new SMS arrived in the given store slot
    fn on_message_arrived(&mut self, _id: u32) {}

    /// A balance query produced the given credit text
    fn on_ussd_result(&mut self, _credit: &str) {}

    /// The call was ended by the remote side or the network
    fn on_carrier_lost(&mut self);
}

impl<P: LinePort> Modem<P> {
    /// Consume at most one unsolicited line and dispatch it
    ///
    /// Call once per poll cycle while no command is pending. Returns the
    /// classified event, or `None` when no line was waiting or the line
    /// was unrecognized.
    pub fn poll_unsolicited<S: EventSink>(&mut self, sink: &mut S) -> Option<ModemEvent> {
        if !self.port.bytes_available() {
            return None;
        }
        let line = self.port.read_line(LINE_GAP_TIMEOUT_MS)?;
        let event = self.classify(&line)?;

        match &event {
            ModemEvent::IncomingCall => sink.on_incoming_call(),
            ModemEvent::CallerId(number) => sink.on_caller_id(number),
            ModemEvent::MessageArrived(id) => sink.on_message_arrived(*id),
            ModemEvent::UssdResult(credit) => sink.on_ussd_result(credit),
            ModemEvent::CarrierLost => sink.on_carrier_lost(),
        }
        Some(event)
    }

    /// Classify one raw line and record its side effects in the modem
    /// state; unrecognized prefixes are silently ignored
    fn classify(&mut self, line: &str) -> Option<ModemEvent> {
        let mut fields = line.split(',');
        let head = fields.next().unwrap_or("");

        if head == "RING" {
            return Some(ModemEvent::IncomingCall);
        }
        if head == "NO CARRIER" {
            return Some(ModemEvent::CarrierLost);
        }
        if head.starts_with("+CLIP") {
            let quoted = head.split('"').nth(1)?;
            let mut number: String<PHONE_NUMBER_SIZE> = String::new();
            let _ = number.push_str(quoted);
            self.state.last_caller = Some(number.clone());
            return Some(ModemEvent::CallerId(number));
        }
        if head.starts_with("+CMTI") {
            let id = fields.next()?.trim().parse::<u32>().ok()?;
            self.state.last_message_id = Some(id);
            return Some(ModemEvent::MessageArrived(id));
        }
        if head.starts_with("+CUSD") {
            // Balance text may itself contain commas; search everything
            // after the first field. A failed extraction keeps the stale
            // credit value.
            let rest = line.get(head.len() + 1..)?;
            let credit = parse::credit(rest)?;
            self.state.credit = credit.clone();
            return Some(ModemEvent::UssdResult(credit));
        }
        None
    }
}

//! SIM800L modem control
//!
//! Command engine, reply parsers, and unsolicited-event dispatch for the
//! handset's cellular modem. Implements the functional core of the phone.

pub mod engine;
pub mod event;
pub mod http;
pub mod parse;

pub use engine::{AtCommand, EngineConfig, Modem, SettleMode};
pub use event::{EventSink, ModemEvent};
pub use http::{HttpResponse, ProtocolError};

//! AT command engine
//!
//! Sends one command at a time over the line transport, classifies the
//! reply, and exposes the handset-facing operations (calls, SMS, status
//! queries). The engine is not re-entrant: `&mut self` on every operation
//! enforces the single-command-in-flight invariant.

use core::fmt;

use heapless::String;

use crate::config::{
    BATTERY_TIMEOUT_MS, CLOCK_SIZE, CMD_BUFFER_SIZE, CREDIT_SIZE, CREDIT_USSD,
    DEFAULT_CMD_TIMEOUT_MS, DEFAULT_RINGER_LEVEL, LINE_GAP_TIMEOUT_MS, NETWORK_NAME_SIZE,
    PAYLOAD_BUFFER_SIZE, PHONE_NUMBER_SIZE, SETTLE_RESERVE_MS, SMS_ALERT_MS, SMS_SEND_TIMEOUT_MS,
    SMS_TERMINATOR, WAKE_CHARS_DELAY_MS,
};
use crate::modem::parse;
use crate::transport::{Line, LinePort};
use crate::types::{SendStatus, SignalLevel, SleepMode, SmsRecord};

/// One AT command ready to send
///
/// Ephemeral: built per call, discarded after the reply is consumed.
#[derive(Clone, Copy, Debug)]
pub struct AtCommand<'a> {
    /// Literal command text including the `\n` terminator
    text: &'a str,
    /// Total reply lines to collect (status line plus payload lines)
    expected_lines: usize,
    /// Deadline for the reply
    timeout_ms: u32,
    /// Extra bytes written straight after the command (SMS body;
    /// the caller appends the Ctrl-Z terminator)
    payload: Option<&'a str>,
}

impl<'a> AtCommand<'a> {
    /// Single-line command with the default timeout
    #[must_use]
    pub const fn new(text: &'a str) -> Self {
        Self {
            text,
            expected_lines: 1,
            timeout_ms: DEFAULT_CMD_TIMEOUT_MS,
            payload: None,
        }
    }

    /// Set the expected reply line count
    #[must_use]
    pub const fn lines(mut self, expected: usize) -> Self {
        self.expected_lines = expected;
        self
    }

    /// Set the reply timeout
    #[must_use]
    pub const fn timeout_ms(mut self, ms: u32) -> Self {
        self.timeout_ms = ms;
        self
    }

    /// Attach a payload written immediately after the command text
    #[must_use]
    pub const fn payload(mut self, payload: &'a str) -> Self {
        self.payload = Some(payload);
        self
    }
}

/// Pacing between writing a command and the first reply read
///
/// The legacy driver slept for `timeout - 1000` ms before reading whenever
/// the timeout exceeded one second; its sibling variant did not. Both
/// behaviors survive as tuning profiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SettleMode {
    /// No settle wait; the read timeout covers the whole wait
    #[default]
    Off,
    /// Sleep `timeout - reserve_ms` before the first read, then read with
    /// `reserve_ms` (applies only when the timeout exceeds the reserve)
    BeforeRead {
        /// Portion of the timeout reserved for the read itself
        reserve_ms: u32,
    },
}

impl SettleMode {
    /// The legacy driver's split profile
    #[must_use]
    pub const fn legacy() -> Self {
        Self::BeforeRead {
            reserve_ms: SETTLE_RESERVE_MS,
        }
    }

    /// Split a command timeout into (settle wait, read timeout)
    const fn split(self, timeout_ms: u32) -> (u32, u32) {
        match self {
            Self::BeforeRead { reserve_ms } if timeout_ms > reserve_ms => {
                (timeout_ms - reserve_ms, reserve_ms)
            }
            _ => (0, timeout_ms),
        }
    }
}

/// Engine tuning
#[derive(Clone, Copy, Debug, Default)]
pub struct EngineConfig {
    /// Pre-read pacing profile
    pub settle: SettleMode,
}

/// Process-wide modem state, mutated only through engine methods
#[derive(Debug, Default)]
pub struct ModemState {
    pub(crate) last_caller: Option<String<PHONE_NUMBER_SIZE>>,
    pub(crate) last_message_id: Option<u32>,
    pub(crate) credit: String<CREDIT_SIZE>,
}

/// SIM800L command engine over a line transport
pub struct Modem<P: LinePort> {
    pub(crate) port: P,
    config: EngineConfig,
    pub(crate) state: ModemState,
    payload: String<PAYLOAD_BUFFER_SIZE>,
}

impl<P: LinePort> Modem<P> {
    /// Create an engine with default tuning
    pub fn new(port: P) -> Self {
        Self::with_config(port, EngineConfig::default())
    }

    /// Create an engine with explicit tuning
    pub fn with_config(port: P, config: EngineConfig) -> Self {
        Self {
            port,
            config,
            state: ModemState::default(),
            payload: String::new(),
        }
    }

    /// Borrow the underlying port
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Execute one command and return its decoded status line
    ///
    /// `None` means the modem stayed silent within the timeout; callers
    /// treat that as absent data, not as an error. The multi-line payload
    /// buffer is invalidated here and refilled if `expected_lines > 1`.
    pub fn execute(&mut self, cmd: &AtCommand<'_>) -> Option<Line> {
        self.payload.clear();

        // A stale unsolicited line or echo must not be read as this
        // command's reply.
        self.port.discard_input();

        self.port.write(cmd.text.as_bytes());
        if let Some(extra) = cmd.payload {
            self.port.write(extra.as_bytes());
        }

        let (settle_ms, read_timeout) = self.config.settle.split(cmd.timeout_ms);
        if settle_ms > 0 {
            self.port.delay_ms(settle_ms);
        }

        // First line is the echo/linefeed artifact.
        let _ = self.port.read_line(read_timeout);
        let status = self.port.read_line(read_timeout)?;

        if cmd.expected_lines > 1 {
            for _ in 1..cmd.expected_lines {
                let Some(line) = self.port.read_line(LINE_GAP_TIMEOUT_MS) else {
                    break;
                };
                if !line.is_empty() && line.as_str() != "OK" {
                    let _ = self.payload.push_str(&line);
                    let _ = self.payload.push('\n');
                }
            }
        }

        Some(status)
    }

    /// Fire-and-forget command with default framing
    fn simple(&mut self, text: &str) {
        let _ = self.execute(&AtCommand::new(text));
    }

    /// One-time modem configuration after power-up
    pub fn setup(&mut self) {
        self.simple("ATE0\n"); // command echo off
        let ringer = format_cmd(format_args!("AT+CRSL={DEFAULT_RINGER_LEVEL}\n"));
        self.simple(&ringer);
        self.simple("AT+CMIC=0,10\n"); // microphone gain
        self.simple("AT+CLIP=1\n"); // caller line identification
        self.simple("AT+CMGF=1\n"); // plain text SMS
        self.simple("AT+CALS=3,0\n"); // ringtone
        self.simple("AT+CLTS=1\n"); // local timestamp mode
        self.simple("AT+CSCLK=0\n"); // disable automatic sleep
    }

    /// Throwaway transmission that wakes a hardware-slept modem
    ///
    /// The modem ignores the characters themselves; it only needs serial
    /// activity before it will accept real commands again.
    pub fn wake_chars(&mut self) {
        self.port.write(b"AT\n");
        self.port.delay_ms(WAKE_CHARS_DELAY_MS);
    }

    /// Select the modem sleep mode (`AT+CSCLK`)
    pub fn set_sleep(&mut self, mode: SleepMode) {
        let cmd = format_cmd(format_args!("AT+CSCLK={}\n", mode.as_arg()));
        self.simple(&cmd);
    }

    /// Priming sequence required after a hardware sleep before command
    /// traffic may resume
    pub fn prime_after_sleep(&mut self) {
        self.wake_chars();
        self.set_sleep(SleepMode::Off);
    }

    /// Sound the SMS arrival alert tone
    pub fn sms_alert(&mut self) {
        self.simple("AT+CALS=1,1\n");
        self.port.delay_ms(SMS_ALERT_MS);
        self.simple("AT+CALS=3,0\n");
    }

    /// Dial a voice call
    pub fn dial(&mut self, number: &str) {
        let cmd = format_cmd(format_args!("ATD{number};\n"));
        self.simple(&cmd);
    }

    /// Hang up the current call
    pub fn hangup(&mut self) {
        self.simple("ATH\n");
    }

    /// Answer an incoming call
    pub fn answer(&mut self) {
        self.simple("ATA\n");
    }

    /// Set the speaker volume (0-100; out-of-range values are ignored)
    pub fn set_volume(&mut self, volume: u8) {
        if volume <= 100 {
            let cmd = format_cmd(format_args!("AT+CLVL={volume}\n"));
            self.simple(&cmd);
        }
    }

    /// Query the signal level (`AT+CSQ`); silence reads as no signal
    pub fn signal_strength(&mut self) -> SignalLevel {
        match self.execute(&AtCommand::new("AT+CSQ\n").lines(3)) {
            Some(status) => parse::signal_level(&status),
            None => SignalLevel::NONE,
        }
    }

    /// Query the battery charge percentage (`AT+CBC`); silence reads as 0
    pub fn battery_charge(&mut self) -> u8 {
        match self.execute(
            &AtCommand::new("AT+CBC\n")
                .lines(3)
                .timeout_ms(BATTERY_TIMEOUT_MS),
        ) {
            Some(status) => parse::battery_percent(&status),
            None => 0,
        }
    }

    /// Query the registered network name (`AT+COPS?`)
    pub fn network_name(&mut self) -> String<NETWORK_NAME_SIZE> {
        match self.execute(&AtCommand::new("AT+COPS?\n").lines(3)) {
            Some(status) => parse::network_name(&status),
            None => String::new(),
        }
    }

    /// Query the modem clock (`AT+CCLK?`), returned as the raw quoted
    /// `yy/MM/dd,HH:mm:ss+zz` string for the caller to split
    pub fn date_time(&mut self) -> String<CLOCK_SIZE> {
        match self.execute(&AtCommand::new("AT+CCLK?\n").lines(3)) {
            Some(status) => parse::clock(&status),
            None => String::new(),
        }
    }

    /// Read a stored SMS by id; `None` means deleted or unavailable
    pub fn read_sms(&mut self, id: u32) -> Option<SmsRecord> {
        let cmd = format_cmd(format_args!("AT+CMGR={id}\n"));
        let status = self.execute(&AtCommand::new(&cmd).lines(99))?;
        parse::sms_record(&status, &self.payload)
    }

    /// Submit a text-mode SMS
    ///
    /// Success requires the `>` prompt followed by a `+CMGS` (or `+CUSD`)
    /// confirmation in the payload buffer; anything else is an error.
    pub fn send_sms(&mut self, destination: &str, body: &str) -> SendStatus {
        let mut message: String<PAYLOAD_BUFFER_SIZE> = String::new();
        let _ = message.push_str(body);
        let _ = message.push(SMS_TERMINATOR);

        let cmd = format_cmd(format_args!("AT+CMGS=\"{destination}\"\n"));
        let status = self.execute(
            &AtCommand::new(&cmd)
                .lines(99)
                .timeout_ms(SMS_SEND_TIMEOUT_MS)
                .payload(&message),
        );

        match status {
            Some(line) if line.as_str() == ">" => {
                let head = self.payload.split(':').next().unwrap_or("");
                if head == "+CMGS" || head == "+CUSD" {
                    SendStatus::Sent
                } else {
                    SendStatus::Error
                }
            }
            _ => SendStatus::Error,
        }
    }

    /// Delete a stored SMS by id
    pub fn delete_sms(&mut self, id: u32) {
        let cmd = format_cmd(format_args!("AT+CMGD={id}\n"));
        self.simple(&cmd);
    }

    /// Start a USSD balance query; the result arrives as an unsolicited
    /// `+CUSD` line handled by the event dispatcher
    pub fn query_credit(&mut self) {
        let cmd = format_cmd(format_args!("AT+CUSD=1,\"{CREDIT_USSD}\"\n"));
        self.simple(&cmd);
    }

    /// Payload buffer of the most recent multi-line command
    #[must_use]
    pub fn payload(&self) -> &str {
        &self.payload
    }

    /// Caller id captured from the last `+CLIP` line
    #[must_use]
    pub fn caller_id(&self) -> Option<&str> {
        self.state.last_caller.as_deref()
    }

    /// Message id captured from the last `+CMTI` line
    #[must_use]
    pub fn message_id(&self) -> Option<u32> {
        self.state.last_message_id
    }

    /// Credit string captured from the last successful `+CUSD` extraction
    #[must_use]
    pub fn credit(&self) -> &str {
        &self.state.credit
    }
}

/// Format a command string into a stack buffer
fn format_cmd(args: fmt::Arguments<'_>) -> String<CMD_BUFFER_SIZE> {
    let mut buf = String::new();
    let _ = fmt::write(&mut buf, args);
    buf
}

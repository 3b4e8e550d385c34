//! System configuration and hardware constants
//!
//! This module defines compile-time constants for the handset hardware.
//! All pin mappings, serial parameters, and protocol timeouts are
//! centralized here.

/// SIM800L UART baud rate (fixed by the module's autobaud lock)
pub const MODEM_BAUD: u32 = 9600;

/// Maximum length of a single reply line from the modem
pub const LINE_BUFFER_SIZE: usize = 128;

/// Maximum length of an outgoing AT command string
pub const CMD_BUFFER_SIZE: usize = 96;

/// Capacity of the multi-line payload buffer (SMS bodies, query replies)
pub const PAYLOAD_BUFFER_SIZE: usize = 512;

/// Maximum length of a phone number string
pub const PHONE_NUMBER_SIZE: usize = 24;

/// Maximum length of a stored network/operator name
pub const NETWORK_NAME_SIZE: usize = 24;

/// Maximum length of the `+CCLK` clock string
pub const CLOCK_SIZE: usize = 24;

/// Maximum length of the stored USSD credit string
pub const CREDIT_SIZE: usize = 24;

/// Maximum length of a stored SMS body
pub const SMS_BODY_SIZE: usize = 320;

/// Default timeout for a routine AT command in milliseconds
pub const DEFAULT_CMD_TIMEOUT_MS: u32 = 500;

/// Timeout for the battery charge query (`AT+CBC` is slow to settle)
pub const BATTERY_TIMEOUT_MS: u32 = 1500;

/// Timeout for SMS submission (`AT+CMGS` waits on the network)
pub const SMS_SEND_TIMEOUT_MS: u32 = 5000;

/// Timeout for opening the GPRS bearer context
pub const BEARER_OPEN_TIMEOUT_MS: u32 = 2000;

/// Timeout for each follow-on line of a multi-line reply
pub const LINE_GAP_TIMEOUT_MS: u32 = 300;

/// Read timeout reserved after the legacy pre-read settle wait
pub const SETTLE_RESERVE_MS: u32 = 1000;

/// Delay after sending the throwaway wake characters
pub const WAKE_CHARS_DELAY_MS: u32 = 100;

/// Duration of the SMS arrival alert tone
pub const SMS_ALERT_MS: u32 = 3000;

/// Number of line reads to wait for the `+HTTPACTION` result
pub const HTTP_ACTION_POLLS: usize = 20;

/// Timeout for each `+HTTPACTION` wait read
pub const HTTP_ACTION_TIMEOUT_MS: u32 = 1000;

/// Capacity of the HTTP GET body buffer
pub const HTTP_BODY_SIZE: usize = 2048;

/// Maximum length of an HTTP-layer command (URLs included)
pub const HTTP_URL_SIZE: usize = 192;

/// USSD code dialled for a balance query
pub const CREDIT_USSD: &str = "*100#";

/// Currency marker prefixed to the extracted balance
pub const CREDIT_CURRENCY: char = '£';

/// Default APN for the GPRS bearer
pub const DEFAULT_APN: &str = "giffgaff.com";

/// Placeholder substituted for non-text bytes by the lossy decoder
pub const DECODE_PLACEHOLDER: char = '#';

/// Ctrl-Z terminator appended to an SMS body
pub const SMS_TERMINATOR: char = '\u{1A}';

/// Poll loop period in milliseconds
pub const POLL_PERIOD_MS: u32 = 100;

/// Poll cycles of inactivity before the handset may sleep (~30 s)
pub const IDLE_BUDGET_POLLS: u32 = 300;

/// Default ringer volume level (`AT+CRSL`)
pub const DEFAULT_RINGER_LEVEL: u8 = 99;

/// Default speaker volume (`AT+CLVL`)
pub const DEFAULT_VOLUME: u8 = 33;

/// Pin assignments for GPIO
pub mod pins {
    //! GPIO pin assignments matching the handset schematic

    /// Modem UART TX (UART4 on the pyboard header)
    pub const MODEM_TX: &str = "PA0";

    /// Modem UART RX
    pub const MODEM_RX: &str = "PA1";

    /// Wake button input (active low, external pull-up)
    pub const WAKE_BUTTON: &str = "PB9";

    /// Modem RI (ring indicator) line, falling edge on incoming traffic
    pub const RING_INDICATOR: &str = "PB12";
}

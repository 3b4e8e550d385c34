//! Per-command reply parsers
//!
//! Each parser consumes the status line of one AT command and its fixed
//! comma/colon grammar. All parsers are total: unparsable input yields the
//! documented default, never a panic.

use heapless::String;

use crate::config::{CLOCK_SIZE, CREDIT_CURRENCY, CREDIT_SIZE, NETWORK_NAME_SIZE};
use crate::types::{SignalLevel, SmsRecord};

/// First comma-separated field, split again at the colon
///
/// `"+CSQ: 17,0"` → `("+CSQ", " 17")`.
fn prefix_and_value(status: &str) -> (&str, &str) {
    let first = status.split(',').next().unwrap_or("");
    let mut kv = first.split(':');
    let key = kv.next().unwrap_or("");
    let value = kv.next().unwrap_or("");
    (key, value)
}

/// Strip surrounding quotes and whitespace from a reply field
fn clean_field(field: &str) -> &str {
    field.trim().trim_matches('"').trim()
}

/// Parse a `+CSQ: <n>` status line onto the 0-5 bar scale
///
/// Raw value 99 means "unknown" and reads as level 0, as does anything
/// malformed.
#[must_use]
pub fn signal_level(status: &str) -> SignalLevel {
    let (key, value) = prefix_and_value(status);
    if key != "+CSQ" {
        return SignalLevel::NONE;
    }
    match value.trim().parse::<u32>() {
        Ok(99) | Err(_) => SignalLevel::NONE,
        Ok(raw) => SignalLevel::from_raw_rssi(raw),
    }
}

/// Parse a `+CBC: <flag>,<percent>,<voltage>` status line
///
/// Returns the charge percentage; malformed input reads as 0.
#[must_use]
pub fn battery_percent(status: &str) -> u8 {
    let (key, _) = prefix_and_value(status);
    if key != "+CBC" {
        return 0;
    }
    status
        .split(',')
        .nth(1)
        .and_then(|pct| pct.trim().parse::<u8>().ok())
        .unwrap_or(0)
}

/// Parse a `+COPS: <mode>,<format>,"<name>"` status line
///
/// Returns the quoted operator name; missing or short replies read as the
/// empty string.
#[must_use]
pub fn network_name(status: &str) -> String<NETWORK_NAME_SIZE> {
    let mut name = String::new();
    let (key, _) = prefix_and_value(status);
    if key != "+COPS" {
        return name;
    }
    if let Some(quoted) = status.split(',').nth(2).and_then(|f| f.split('"').nth(1)) {
        let _ = name.push_str(quoted);
    }
    name
}

/// Parse a `+CCLK: "yy/MM/dd,HH:mm:ss+zz"` status line
///
/// Returns the quoted substring verbatim for the caller to split further;
/// a non-matching prefix reads as the empty string.
#[must_use]
pub fn clock(status: &str) -> String<CLOCK_SIZE> {
    let mut out = String::new();
    if status.starts_with("+CCLK") {
        if let Some(quoted) = status.split('"').nth(1) {
            let _ = out.push_str(quoted);
        }
    }
    out
}

/// Parse a `+CMGR` status line plus the accumulated payload into an SMS
/// record
///
/// Grammar: `+CMGR: "<status>","<number>",,"<date>","<time>..."`. Absent
/// or malformed input yields `None`, which callers treat as "message
/// deleted or unavailable".
#[must_use]
pub fn sms_record(status: &str, body: &str) -> Option<SmsRecord> {
    let mut fields = status.split(',');
    let head = fields.next()?;
    if head.split(':').next()? != "+CMGR" {
        return None;
    }
    let number = clean_field(fields.next()?);
    let _alpha = fields.next()?;
    let date = clean_field(fields.next()?);
    let time = clean_field(fields.next()?);

    let mut record = SmsRecord {
        number: String::new(),
        date: String::new(),
        time: String::new(),
        body: String::new(),
    };
    let _ = record.number.push_str(number);
    let _ = record.date.push_str(date);
    let _ = record.time.push_str(time);
    let _ = record.body.push_str(body);
    Some(record)
}

/// Extract the account balance from a `+CUSD` reply body
///
/// The balance sits between a `#` marker and the second `.` that follows
/// it; the result is prefixed with the currency marker. If either marker
/// is missing, `None` — callers retain their stale credit value.
#[must_use]
pub fn credit(text: &str) -> Option<String<CREDIT_SIZE>> {
    let hash = text.find('#')?;
    let after = &text[hash + 1..];
    let first_dot = after.find('.')?;
    let second_dot = after[first_dot + 1..].find('.')?;
    let value = &after[..first_dot + 1 + second_dot];

    let mut out = String::new();
    let _ = out.push(CREDIT_CURRENCY);
    let _ = out.push_str(value);
    Some(out)
}

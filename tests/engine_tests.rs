//! Command Engine Tests
//!
//! Tests for command framing, reply classification, timeout degradation,
//! and the high-level modem operations, driven through the scripted port.

use gsm_handset_firmware::modem::{AtCommand, EngineConfig, Modem, SettleMode};
use gsm_handset_firmware::transport::ScriptedPort;
use gsm_handset_firmware::types::{SendStatus, SignalLevel, SleepMode};

/// Queue a reply: blank echo artifact, status line, then extra lines
fn script_reply(port: &mut ScriptedPort, status: &str, extra: &[&str]) {
    port.push_line("\r\n");
    port.push_line(status);
    for line in extra {
        port.push_line(line);
    }
}

// ============================================================================
// Execute Basics
// ============================================================================

#[test]
fn execute_writes_command_and_returns_status() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "OK", &[]);
    let mut modem = Modem::new(port);

    let status = modem.execute(&AtCommand::new("ATE0\n")).unwrap();
    assert_eq!(status.as_str(), "OK");
}

#[test]
fn execute_silence_is_none_not_error() {
    let mut modem = Modem::new(ScriptedPort::new());
    assert!(modem.execute(&AtCommand::new("AT\n")).is_none());
}

#[test]
fn execute_flushes_stale_input_first() {
    let mut port = ScriptedPort::new();
    // A stale unsolicited line is buffered; it must not be read as this
    // command's reply.
    port.push_stale_line("RING");
    let mut modem = Modem::new(port);

    assert!(modem.execute(&AtCommand::new("AT\n")).is_none());
}

#[test]
fn execute_discards_echo_artifact_line() {
    let mut port = ScriptedPort::new();
    port.push_line("ATE0\r\n"); // echoed command
    port.push_line("OK\r\n");
    let mut modem = Modem::new(port);

    let status = modem.execute(&AtCommand::new("ATE0\n")).unwrap();
    assert_eq!(status.as_str(), "OK");
}

#[test]
fn execute_writes_payload_after_command() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, ">", &[]);
    let mut modem = Modem::new(port);

    let cmd = AtCommand::new("AT+CMGS=\"+44\"\n").payload("body\u{1A}");
    let _ = modem.execute(&cmd);

    assert_eq!(modem.port().transcript(), "AT+CMGS=\"+44\"\nbody\u{1A}");
}

// ============================================================================
// Multi-line Payload Buffer
// ============================================================================

#[test]
fn multi_line_reply_accumulates_payload_without_ok() {
    let mut port = ScriptedPort::new();
    script_reply(
        &mut port,
        "+CMGR: \"REC READ\",\"+447911123456\",\"\",\"17/08/29,10:15:32+04\"",
        &["hello", "world", "", "OK"],
    );
    let mut modem = Modem::new(port);

    let status = modem.execute(&AtCommand::new("AT+CMGR=1\n").lines(99)).unwrap();
    assert!(status.as_str().starts_with("+CMGR"));
    assert_eq!(modem.payload(), "hello\nworld\n");
}

#[test]
fn payload_invalidated_by_next_command() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+CSQ: 17,0", &["", "OK"]);
    script_reply(&mut port, "OK", &[]);
    let mut modem = Modem::new(port);

    let _ = modem.execute(&AtCommand::new("AT+CSQ\n").lines(3));
    let status = modem.execute(&AtCommand::new("ATH\n"));
    assert_eq!(status.unwrap().as_str(), "OK");
    assert!(modem.payload().is_empty());
}

#[test]
fn payload_stops_early_on_line_timeout() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+CMGR: \"REC READ\",\"+44\",\"\",\"17/08/29,10:15\"", &["only line"]);
    let mut modem = Modem::new(port);

    let status = modem.execute(&AtCommand::new("AT+CMGR=1\n").lines(99));
    assert!(status.is_some());
    assert_eq!(modem.payload(), "only line\n");
}

// ============================================================================
// Settle Profiles
// ============================================================================

#[test]
fn settle_off_records_no_pacing_delay() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "OK", &[]);
    let mut modem = Modem::new(port);

    let _ = modem.execute(&AtCommand::new("AT+CBC\n").timeout_ms(1500));
    assert!(modem.port().delays.is_empty());
}

#[test]
fn settle_legacy_splits_long_timeouts() {
    let config = EngineConfig {
        settle: SettleMode::legacy(),
    };
    let mut modem = Modem::with_config(ScriptedPort::new(), config);

    let _ = modem.execute(&AtCommand::new("AT+CMGS=\"+44\"\n").timeout_ms(5000));
    // 5000ms timeout with a 1000ms read reserve: 4000ms settle wait
    assert_eq!(modem.port().delays, vec![4000]);
}

#[test]
fn settle_legacy_short_timeouts_are_untouched() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "OK", &[]);
    let config = EngineConfig {
        settle: SettleMode::legacy(),
    };
    let mut modem = Modem::with_config(port, config);

    let _ = modem.execute(&AtCommand::new("AT\n").timeout_ms(500));
    assert!(modem.port().delays.is_empty());
}

// ============================================================================
// High-level Operations
// ============================================================================

#[test]
fn setup_sends_full_configuration_sequence() {
    let mut modem = Modem::new(ScriptedPort::new());
    // Silence from the modem is tolerated during setup; all eight
    // configuration commands must still go out.
    modem.setup();

    let transcript = modem.port().transcript();
    for cmd in [
        "ATE0", "AT+CRSL=99", "AT+CMIC=0,10", "AT+CLIP=1", "AT+CMGF=1",
        "AT+CALS=3,0", "AT+CLTS=1", "AT+CSCLK=0",
    ] {
        assert!(transcript.contains(cmd), "missing {cmd}");
    }
}

#[test]
fn signal_strength_parses_and_defaults() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+CSQ: 17,0", &["OK"]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.signal_strength().bars(), 3);

    // Silence degrades to no signal
    assert_eq!(modem.signal_strength(), SignalLevel::NONE);
}

#[test]
fn battery_charge_parses_and_defaults() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+CBC: 0,82,4010", &["OK"]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.battery_charge(), 82);
    assert_eq!(modem.battery_charge(), 0);
}

#[test]
fn network_name_parses_and_defaults() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+COPS: 0,0,\"giffgaff\"", &["OK"]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.network_name().as_str(), "giffgaff");
    assert!(modem.network_name().is_empty());
}

#[test]
fn date_time_parses_and_defaults() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "+CCLK: \"17/08/29,10:15:32+04\"", &["OK"]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.date_time().as_str(), "17/08/29,10:15:32+04");
    assert!(modem.date_time().is_empty());
}

#[test]
fn read_sms_returns_record_or_none() {
    let mut port = ScriptedPort::new();
    script_reply(
        &mut port,
        "+CMGR: \"REC UNREAD\",\"+447911123456\",\"\",\"17/08/29,10:15:32+04\"",
        &["see you at 8", "OK"],
    );
    let mut modem = Modem::new(port);

    let record = modem.read_sms(1).unwrap();
    assert_eq!(record.number.as_str(), "+447911123456");
    assert_eq!(record.body.as_str(), "see you at 8\n");

    // Deleted slot: modem stays silent
    assert!(modem.read_sms(2).is_none());
}

#[test]
fn send_sms_success_needs_prompt_and_confirmation() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, ">", &["+CMGS: 4", "OK"]);
    let mut modem = Modem::new(port);

    let status = modem.send_sms("+447911123456", "on my way");
    assert_eq!(status, SendStatus::Sent);
    assert!(status.is_sent());
}

#[test]
fn send_sms_wrong_terminal_status_is_error() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, "ERROR", &[]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.send_sms("+447911123456", "hi"), SendStatus::Error);
}

#[test]
fn send_sms_prompt_without_confirmation_is_error() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, ">", &["+CMS ERROR: 500"]);
    let mut modem = Modem::new(port);
    assert_eq!(modem.send_sms("+447911123456", "hi"), SendStatus::Error);
}

#[test]
fn send_sms_silence_is_error() {
    let mut modem = Modem::new(ScriptedPort::new());
    assert_eq!(modem.send_sms("+447911123456", "hi"), SendStatus::Error);
}

#[test]
fn set_volume_rejects_out_of_range() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.set_volume(150);
    modem.set_volume(33);

    let transcript = modem.port().transcript();
    assert!(!transcript.contains("150"));
    assert!(transcript.contains("AT+CLVL=33"));
}

#[test]
fn dial_and_hangup_write_expected_commands() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.dial("+447911123456");
    modem.hangup();

    let transcript = modem.port().transcript();
    assert!(transcript.contains("ATD+447911123456;"));
    assert!(transcript.contains("ATH"));
}

#[test]
fn set_sleep_formats_mode_argument() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.set_sleep(SleepMode::Auto);
    modem.set_sleep(SleepMode::Off);

    let transcript = modem.port().transcript();
    assert!(transcript.contains("AT+CSCLK=2"));
    assert!(transcript.contains("AT+CSCLK=0"));
}

#[test]
fn answer_and_delete_write_expected_commands() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.answer();
    modem.delete_sms(7);

    let transcript = modem.port().transcript();
    assert!(transcript.contains("ATA"));
    assert!(transcript.contains("AT+CMGD=7"));
}

#[test]
fn query_credit_dials_the_ussd_code() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.query_credit();
    assert!(modem.port().transcript().contains("AT+CUSD=1,\"*100#\""));
}

#[test]
fn sms_alert_rings_then_restores_the_ringtone() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.sms_alert();

    let transcript = modem.port().transcript();
    let ring = transcript.find("AT+CALS=1,1").unwrap();
    let restore = transcript.find("AT+CALS=3,0").unwrap();
    assert!(ring < restore);
    assert_eq!(modem.port().delays, vec![3000]);
}

#[test]
fn send_sms_terminates_body_with_ctrl_z() {
    let mut port = ScriptedPort::new();
    script_reply(&mut port, ">", &["+CMGS: 4", "OK"]);
    let mut modem = Modem::new(port);

    let _ = modem.send_sms("+447911123456", "on my way");
    let transcript = modem.port().transcript();
    assert!(transcript.contains("AT+CMGS=\"+447911123456\""));
    assert!(transcript.contains("on my way\u{1A}"));
}

#[test]
fn prime_after_sleep_sends_wake_chars_then_sleep_off() {
    let mut modem = Modem::new(ScriptedPort::new());
    modem.prime_after_sleep();

    let transcript = modem.port().transcript();
    let wake = transcript.find("AT\n").unwrap();
    let sleep_off = transcript.find("AT+CSCLK=0").unwrap();
    assert!(wake < sleep_off);
    assert_eq!(modem.port().delays, vec![100]);
}

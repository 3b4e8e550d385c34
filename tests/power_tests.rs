//! Power Management Tests
//!
//! Tests for the inactivity budget, the sleep/wake state machine, and the
//! interrupt-to-poll-loop wake flag.

use gsm_handset_firmware::power::{SleepCoordinator, SleepState, WakeAction, WakeFlag, WakeSource};

// ============================================================================
// Inactivity Budget
// ============================================================================

#[test]
fn budget_expiry_requests_sleep() {
    let mut coordinator = SleepCoordinator::new(3);
    assert!(!coordinator.poll_idle(false));
    assert!(!coordinator.poll_idle(false));
    assert!(coordinator.poll_idle(false));
}

#[test]
fn activity_refills_budget() {
    let mut coordinator = SleepCoordinator::new(2);
    assert!(!coordinator.poll_idle(false));
    coordinator.note_activity();
    assert!(!coordinator.poll_idle(false));
    assert!(coordinator.poll_idle(false));
}

#[test]
fn active_call_holds_off_sleep() {
    let mut coordinator = SleepCoordinator::new(2);
    assert!(!coordinator.poll_idle(true));
    assert!(!coordinator.poll_idle(true));
    // Budget sits expired through the call without triggering
    assert!(!coordinator.poll_idle(true));
    // First quiet cycle after hangup enters sleep
    assert!(coordinator.poll_idle(false));
}

#[test]
fn poll_while_sleeping_never_retriggers() {
    let mut coordinator = SleepCoordinator::new(1);
    assert!(coordinator.poll_idle(false));
    coordinator.enter_sleep();
    assert!(!coordinator.poll_idle(false));
    assert!(coordinator.is_sleeping());
}

// ============================================================================
// Wake Transitions
// ============================================================================

#[test]
fn button_wake_resumes_without_priming() {
    let mut coordinator = SleepCoordinator::new(5);
    coordinator.enter_sleep();

    let action = coordinator.wake(WakeSource::Button);
    assert_eq!(action, WakeAction::Resume);
    assert_eq!(coordinator.state(), SleepState::Awake);
}

#[test]
fn ring_wake_requires_priming() {
    let mut coordinator = SleepCoordinator::new(5);
    coordinator.enter_sleep();

    let action = coordinator.wake(WakeSource::Ring);
    assert_eq!(action, WakeAction::Prime);
    assert_eq!(coordinator.state(), SleepState::Awake);
}

#[test]
fn wake_refills_the_budget() {
    let mut coordinator = SleepCoordinator::new(2);
    assert!(!coordinator.poll_idle(false));
    coordinator.enter_sleep();
    let _ = coordinator.wake(WakeSource::Button);

    // Full budget again after the wake
    assert!(!coordinator.poll_idle(false));
    assert!(coordinator.poll_idle(false));
}

// ============================================================================
// Wake Flag
// ============================================================================

#[test]
fn flag_starts_lowered() {
    let flag = WakeFlag::new();
    assert!(!flag.is_raised());
    assert_eq!(flag.take(), None);
}

#[test]
fn take_consumes_the_pending_source() {
    let flag = WakeFlag::new();
    flag.raise(WakeSource::Button);
    assert!(flag.is_raised());
    assert_eq!(flag.take(), Some(WakeSource::Button));
    assert_eq!(flag.take(), None);
}

#[test]
fn ring_edge_upgrades_a_pending_button() {
    let flag = WakeFlag::new();
    flag.raise(WakeSource::Button);
    flag.raise(WakeSource::Ring);
    assert_eq!(flag.take(), Some(WakeSource::Ring));
}

#[test]
fn button_edge_cannot_downgrade_a_pending_ring() {
    // The ring wake's priming requirement survives a button press that
    // lands before the poll loop consumes the flag.
    let flag = WakeFlag::new();
    flag.raise(WakeSource::Ring);
    flag.raise(WakeSource::Button);
    assert_eq!(flag.take(), Some(WakeSource::Ring));
    assert_eq!(flag.take(), None);
}

#[test]
fn flag_works_from_static_context() {
    static FLAG: WakeFlag = WakeFlag::new();
    FLAG.raise(WakeSource::Ring);
    assert_eq!(FLAG.take(), Some(WakeSource::Ring));
}

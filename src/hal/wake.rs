//! Wake-edge interrupt inputs
//!
//! The wake button and the modem's ring indicator line each raise the
//! shared [`WakeFlag`] on a falling edge. These tasks are the only code
//! running outside the poll loop that touches shared state, and the flag
//! is all they touch.

use embassy_stm32::exti::ExtiInput;

use crate::power::{WakeFlag, WakeSource};

/// Shared wake flag raised by the edge watchers and consumed by the poll
/// loop
pub static WAKE_FLAG: WakeFlag = WakeFlag::new();

/// Watch the wake button and raise the flag on each press
#[embassy_executor::task]
pub async fn watch_wake_button(mut input: ExtiInput<'static>) {
    loop {
        input.wait_for_falling_edge().await;
        WAKE_FLAG.raise(WakeSource::Button);
    }
}

/// Watch the modem ring indicator and raise the flag on each pulse
#[embassy_executor::task]
pub async fn watch_ring_indicator(mut input: ExtiInput<'static>) {
    loop {
        input.wait_for_falling_edge().await;
        WAKE_FLAG.raise(WakeSource::Ring);
    }
}

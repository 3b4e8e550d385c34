//! Power Management
//!
//! Sleep/wake coordination between the handset and the modem. The
//! coordinator tracks an inactivity budget and sequences the modem sleep
//! handshake; hardware wake edges (button, ring line) cross into the poll
//! loop through a single atomic flag and nothing else.

use core::sync::atomic::{AtomicU8, Ordering};

/// Sleep state of the handset/modem pair
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SleepState {
    /// Normal operation, polling and display active
    #[default]
    Awake,
    /// Modem in auto-sleep, display off, waiting on a wake edge
    Sleeping,
}

#[cfg(feature = "embedded")]
impl defmt::Format for SleepState {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Awake => defmt::write!(f, "AWAKE"),
            Self::Sleeping => defmt::write!(f, "SLEEPING"),
        }
    }
}

/// What woke the handset
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeSource {
    /// The wake button was pressed
    Button,
    /// The modem's ring indicator line pulsed
    Ring,
}

#[cfg(feature = "embedded")]
impl defmt::Format for WakeSource {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Self::Button => defmt::write!(f, "BUTTON"),
            Self::Ring => defmt::write!(f, "RING"),
        }
    }
}

/// What the host must do before resuming command traffic after a wake
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WakeAction {
    /// Resume polling directly
    Resume,
    /// Send the throwaway wake characters and re-disable sleep first
    /// (the modem ignores commands after a hardware sleep until it has
    /// seen a priming transmission)
    Prime,
}

/// Wake flag shared between the edge watchers and the poll loop
///
/// Raised from interrupt context via [`WakeFlag::raise`], read and
/// cleared only from the poll loop via [`WakeFlag::take`]. Interrupt
/// handlers must never issue modem commands themselves; setting this flag
/// is the only state they touch.
pub struct WakeFlag(AtomicU8);

const WAKE_NONE: u8 = 0;
const WAKE_BUTTON: u8 = 1;
const WAKE_RING: u8 = 2;

impl WakeFlag {
    /// Create a lowered flag
    #[must_use]
    pub const fn new() -> Self {
        Self(AtomicU8::new(WAKE_NONE))
    }

    /// Record a wake edge (interrupt context)
    ///
    /// Sources are priority-ordered: a pending ring wake survives a later
    /// button edge, so the modem priming it requires is never lost. The
    /// higher value always wins.
    pub fn raise(&self, source: WakeSource) {
        let value = match source {
            WakeSource::Button => WAKE_BUTTON,
            WakeSource::Ring => WAKE_RING,
        };
        let _ = self.0.fetch_max(value, Ordering::AcqRel);
    }

    /// Consume the pending wake source, if any (poll loop)
    pub fn take(&self) -> Option<WakeSource> {
        match self.0.swap(WAKE_NONE, Ordering::AcqRel) {
            WAKE_BUTTON => Some(WakeSource::Button),
            WAKE_RING => Some(WakeSource::Ring),
            _ => None,
        }
    }

    /// Check without consuming
    #[must_use]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire) != WAKE_NONE
    }
}

impl Default for WakeFlag {
    fn default() -> Self {
        Self::new()
    }
}

/// Sleep/wake coordinator
///
/// Pure state machine: the caller owns the modem and performs the AT
/// handshakes this type requests, then confirms the transitions.
#[derive(Clone, Copy, Debug)]
pub struct SleepCoordinator {
    state: SleepState,
    /// Poll cycles of inactivity allowed before sleeping
    idle_budget: u32,
    idle_left: u32,
}

impl SleepCoordinator {
    /// Create an awake coordinator with a full inactivity budget
    #[must_use]
    pub const fn new(idle_budget: u32) -> Self {
        Self {
            state: SleepState::Awake,
            idle_budget,
            idle_left: idle_budget,
        }
    }

    /// Current sleep state
    #[must_use]
    pub const fn state(&self) -> SleepState {
        self.state
    }

    /// Check whether the handset is sleeping
    #[must_use]
    pub const fn is_sleeping(&self) -> bool {
        matches!(self.state, SleepState::Sleeping)
    }

    /// Record user activity, refilling the inactivity budget
    pub fn note_activity(&mut self) {
        self.idle_left = self.idle_budget;
    }

    /// Advance one poll cycle; returns `true` when the budget has expired
    /// and sleep should be entered
    ///
    /// Sleep is gated: while a call or incoming-call screen is active the
    /// budget holds at zero without triggering, so the handset drops off
    /// only once the call is over and the budget next expires.
    pub fn poll_idle(&mut self, call_active: bool) -> bool {
        if self.state == SleepState::Sleeping {
            return false;
        }
        self.idle_left = self.idle_left.saturating_sub(1);
        self.idle_left == 0 && !call_active
    }

    /// Confirm the sleep transition after the host has issued the modem
    /// sleep command and blanked the display
    pub fn enter_sleep(&mut self) {
        self.state = SleepState::Sleeping;
    }

    /// Wake up, returning what the host must do before resuming traffic
    ///
    /// Either wake source transitions back to [`SleepState::Awake`] with a
    /// fresh inactivity budget. A ring wake requires priming the modem;
    /// a button wake does not.
    pub fn wake(&mut self, source: WakeSource) -> WakeAction {
        self.state = SleepState::Awake;
        self.idle_left = self.idle_budget;
        match source {
            WakeSource::Ring => WakeAction::Prime,
            WakeSource::Button => WakeAction::Resume,
        }
    }
}

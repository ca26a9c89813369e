//! Debounced layout state machine.
//!
//! The tree is always in one of three layouts. Gesture samples (or a manual
//! toggle) propose a new layout; the proposal is applied only if it differs
//! from the current one and the debounce window since the last applied
//! transition has elapsed.
//!
//! ```text
//!              open palm                pinch
//!  Assembled ───────────▶ Scattered ───────────▶ Focused
//!      ▲                   ▲    │                  │
//!      │      fist         │    │ fist             │
//!      └───────────────────┼────┘                  │
//!      ▲                   └──── open palm ────────┤
//!      └──────────────────────── fist ─────────────┘
//! ```
//!
//! Applied transitions come back as [`Transition`] values; their
//! [`actions`](Transition::actions) tell the scene which one-shot effects to run.

use std::fmt;

use tracing::debug;

use crate::gesture::GestureSample;

/// Spatial arrangement shared by every particle group.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum LayoutState {
    #[default]
    Assembled = 0,
    Scattered = 1,
    Focused = 2,
}

impl LayoutState {
    /// Scattered and Focused both keep particles away from their targets.
    #[inline]
    pub fn is_dispersed(self) -> bool {
        !matches!(self, LayoutState::Assembled)
    }

    pub(crate) fn to_bits(self) -> u8 {
        self as u8
    }

    pub(crate) fn from_bits(bits: u8) -> Self {
        match bits {
            1 => LayoutState::Scattered,
            2 => LayoutState::Focused,
            _ => LayoutState::Assembled,
        }
    }
}

impl fmt::Display for LayoutState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LayoutState::Assembled => "assembled",
            LayoutState::Scattered => "scattered",
            LayoutState::Focused => "focused",
        };
        f.write_str(name)
    }
}

/// What every consumer needs to know about the layout for one tick.
///
/// `epoch` counts applied transitions (wrapping at 24 bits) so a consumer can
/// tell a fresh transition from a layout it has already reacted to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutSnapshot {
    pub state: LayoutState,
    pub focus: Option<usize>,
    pub epoch: u32,
}

const EPOCH_MASK: u32 = 0x00ff_ffff;
const NO_FOCUS: u32 = u32::MAX;

impl LayoutSnapshot {
    /// Snapshot with `epoch` masked to 24 bits.
    pub fn new(state: LayoutState, focus: Option<usize>, epoch: u32) -> Self {
        Self {
            state,
            focus,
            epoch: epoch & EPOCH_MASK,
        }
    }

    /// Same focus, next epoch, new state.
    pub fn advanced(self, state: LayoutState, focus: Option<usize>) -> Self {
        Self::new(state, focus, self.epoch.wrapping_add(1))
    }

    /// Panel to pull into view this tick; only set while Focused.
    pub fn focused_index(&self) -> Option<usize> {
        match self.state {
            LayoutState::Focused => self.focus,
            _ => None,
        }
    }

    /// `state | epoch << 8 | focus << 32` in one word.
    pub fn pack(&self) -> u64 {
        let focus = match self.focus {
            Some(index) => (index as u64).min(NO_FOCUS as u64 - 1),
            None => NO_FOCUS as u64,
        };
        self.state.to_bits() as u64 | ((self.epoch & EPOCH_MASK) as u64) << 8 | focus << 32
    }

    /// Inverse of [`LayoutSnapshot::pack`].
    pub fn unpack(word: u64) -> Self {
        let focus = (word >> 32) as u32;
        Self {
            state: LayoutState::from_bits((word & 0xff) as u8),
            focus: (focus != NO_FOCUS).then_some(focus as usize),
            epoch: ((word >> 8) as u32) & EPOCH_MASK,
        }
    }
}

/// Minimum spacing between applied transitions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Debouncer {
    pub last_transition_ms: Option<u64>,
    pub min_interval_ms: u64,
}

impl Debouncer {
    /// Debouncer that has never seen a transition.
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            last_transition_ms: None,
            min_interval_ms,
        }
    }

    /// The first transition is always allowed. A clock that runs backwards
    /// counts as no time elapsed.
    pub fn allows(&self, now_ms: u64) -> bool {
        match self.last_transition_ms {
            None => true,
            Some(last) => now_ms.saturating_sub(last) >= self.min_interval_ms,
        }
    }

    /// Remember `now_ms` as the last applied transition.
    pub fn record(&mut self, now_ms: u64) {
        self.last_transition_ms = Some(now_ms);
    }
}

/// One-shot effect attached to entering a layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeAction {
    /// Reseed every particle's velocity with a burst.
    Explode,
    /// Move the focus selector to the next panel.
    AdvanceFocus,
}

/// An applied layout change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    pub from: LayoutState,
    pub to: LayoutState,
    pub at_ms: u64,
}

impl Transition {
    /// Side effects to run once for this transition.
    pub fn actions(&self) -> &'static [EdgeAction] {
        match self.to {
            LayoutState::Assembled => &[],
            LayoutState::Scattered => &[EdgeAction::Explode],
            LayoutState::Focused => &[EdgeAction::Explode, EdgeAction::AdvanceFocus],
        }
    }

    /// Whether [`Transition::actions`] includes `action`.
    pub fn has(&self, action: EdgeAction) -> bool {
        self.actions().contains(&action)
    }
}

/// Input to the state machine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LayoutCommand {
    Gesture(GestureSample),
    Toggle,
}

/// Three-state layout controller with a debounce window.
#[derive(Clone, Debug)]
pub struct LayoutStateMachine {
    state: LayoutState,
    debouncer: Debouncer,
}

impl LayoutStateMachine {
    pub fn new(min_interval_ms: u64) -> Self {
        Self {
            state: LayoutState::Assembled,
            debouncer: Debouncer::new(min_interval_ms),
        }
    }

    #[inline]
    pub fn state(&self) -> LayoutState {
        self.state
    }

    /// Rate limiter shared by gestures and toggles.
    pub fn debouncer(&self) -> &Debouncer {
        &self.debouncer
    }

    /// Layout a sample asks for, ignoring the debounce window.
    ///
    /// A pinch only focuses from Scattered; elsewhere it falls through to the
    /// openness rules.
    pub fn candidate(&self, sample: &GestureSample) -> LayoutState {
        if sample.pinching && self.state == LayoutState::Scattered {
            LayoutState::Focused
        } else if sample.openness >= 4 {
            LayoutState::Scattered
        } else if sample.openness == 0 && !sample.pinching {
            LayoutState::Assembled
        } else {
            self.state
        }
    }

    /// Apply a sample at `now_ms`. Returns the transition if one happened.
    pub fn handle(&mut self, sample: &GestureSample, now_ms: u64) -> Option<Transition> {
        let next = self.candidate(sample);
        if next == self.state || !self.debouncer.allows(now_ms) {
            return None;
        }

        let transition = Transition {
            from: self.state,
            to: next,
            at_ms: now_ms,
        };
        self.state = next;
        self.debouncer.record(now_ms);
        debug!(from = %transition.from, to = %transition.to, at_ms = now_ms, "layout transition");
        Some(transition)
    }

    /// Manual toggle: open palm from Assembled, fist from anything else.
    pub fn toggle(&mut self, now_ms: u64) -> Option<Transition> {
        let synthetic = match self.state {
            LayoutState::Assembled => GestureSample::OPEN_PALM,
            _ => GestureSample::FIST,
        };
        self.handle(&synthetic, now_ms)
    }

    /// Route a [`LayoutCommand`] to [`handle`](Self::handle) or [`toggle`](Self::toggle).
    pub fn apply(&mut self, command: LayoutCommand, now_ms: u64) -> Option<Transition> {
        match command {
            LayoutCommand::Gesture(sample) => self.handle(&sample, now_ms),
            LayoutCommand::Toggle => self.toggle(now_ms),
        }
    }
}

impl Default for LayoutStateMachine {
    fn default() -> Self {
        Self::new(500)
    }
}

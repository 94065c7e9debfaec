//! Machine engine owning the current-state register and tick counter.
//!
//! Every state change funnels through [`Machine::transition_to`]: it updates
//! the register, zeroes the tick counter, runs the new state's entry action,
//! and hands back the state name so the caller can announce the transition
//! on the serial channel. The engine holds no timing or transport concerns;
//! event sources deliver ticks, sampled edges, and guarded requests, and the
//! engine answers with at most one announcement per event.

use crate::states::{InputId, Level, OutputAction, StateId, StateSpec};

/// Abstraction over the physical relay/output bank.
///
/// The reference hardware exposes exactly two logical operations, so the
/// trait does too; richer banks can map them onto more outputs.
pub trait OutputBank {
    /// Drives every output to its released state.
    fn release_all(&mut self);

    /// Asserts the primary output (the power-button contact).
    fn assert_primary(&mut self);
}

/// Output bank that performs no hardware interaction.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoopOutputBank;

impl NoopOutputBank {
    pub const fn new() -> Self {
        Self
    }
}

impl OutputBank for NoopOutputBank {
    fn release_all(&mut self) {}

    fn assert_primary(&mut self) {}
}

/// The machine register plus the fixed table it walks.
///
/// The engine is the sole owner of `current` and `ticks_since_entry`; other
/// components observe them only through accessors or by running inside one
/// of the event entry points.
pub struct Machine<'t, B: OutputBank> {
    table: &'t [StateSpec],
    bank: B,
    current: StateId,
    ticks_since_entry: u32,
}

impl<'t, B: OutputBank> Machine<'t, B> {
    /// Creates a machine positioned at index 0 without running its entry
    /// action; call [`Machine::start`] once the transport is ready to carry
    /// the initial announcement.
    pub fn new(table: &'t [StateSpec], bank: B) -> Self {
        debug_assert!(!table.is_empty());
        Self {
            table,
            bank,
            current: StateId::new(0),
            ticks_since_entry: 0,
        }
    }

    /// Enters the initial state, running its entry action.
    ///
    /// Returns the announcement for the serial channel.
    pub fn start(&mut self) -> &'static str {
        self.transition_to(StateId::new(0))
    }

    /// Index of the active state.
    pub fn current(&self) -> StateId {
        self.current
    }

    /// Name of the active state, the canonical wire representation.
    pub fn state_name(&self) -> &'static str {
        self.spec().name
    }

    /// Ticks elapsed since the active state was entered.
    pub fn ticks_since_entry(&self) -> u32 {
        self.ticks_since_entry
    }

    /// Immutable handle to the output bank.
    pub fn bank(&self) -> &B {
        &self.bank
    }

    /// Mutable handle to the output bank.
    pub fn bank_mut(&mut self) -> &mut B {
        &mut self.bank
    }

    fn spec(&self) -> &StateSpec {
        &self.table[self.current.index()]
    }

    /// The single path by which the current state changes.
    ///
    /// Re-entering the active state is permitted and still zeroes the tick
    /// counter and re-runs the entry action; guarded commands use this to
    /// restart timeout windows.
    pub fn transition_to(&mut self, target: StateId) -> &'static str {
        self.current = target;
        self.ticks_since_entry = 0;
        let spec = self.table[self.current.index()];
        self.apply(spec.on_enter);
        spec.name
    }

    /// Advances the tick counter and fires the timeout trigger when the
    /// active state's window has elapsed.
    pub fn tick(&mut self) -> Option<&'static str> {
        self.ticks_since_entry = self.ticks_since_entry.saturating_add(1);
        let spec = self.table[self.current.index()];
        if spec.timeout_ticks == 0 || self.ticks_since_entry < spec.timeout_ticks {
            return None;
        }

        self.apply(spec.on_timeout_action);
        spec.on_timeout.map(|target| self.transition_to(target))
    }

    /// Handles a level change sampled on `input`.
    ///
    /// Every edge event restarts the active timeout window, whether or not
    /// the policy fires; a firing policy runs the configured action and then
    /// the transition, if one is configured.
    pub fn edge(&mut self, input: InputId, level: Level) -> Option<&'static str> {
        self.ticks_since_entry = 0;
        let spec = self.table[self.current.index()];
        if !spec.edge_policy(input).fires(level) {
            return None;
        }

        self.apply(spec.edge_action(input));
        spec.edge_target(input).map(|target| self.transition_to(target))
    }

    fn apply(&mut self, action: OutputAction) {
        match action {
            OutputAction::NoAction => {}
            OutputAction::ReleaseAll => self.bank.release_all(),
            OutputAction::AssertPrimary => self.bank.assert_primary(),
        }
    }
}

//! State table data model shared by firmware and host targets.
//!
//! A machine state is described entirely by const data: a display name, a
//! timeout expressed in ticks, one edge policy per button input, transition
//! targets, and output-bank action tags. The table is built at compile time
//! and never mutated, so the engine can treat every lookup as infallible once
//! the table has passed validation.

/// Identifier for the two edge-interrupt button inputs.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InputId {
    A,
    B,
}

impl InputId {
    /// Display label used in diagnostics.
    pub const fn label(self) -> &'static str {
        match self {
            InputId::A => "A",
            InputId::B => "B",
        }
    }
}

/// Instantaneous logic level sampled when an edge interrupt fires.
///
/// The interrupt is configured for "any change", so the handler re-derives
/// the edge direction from the sampled level rather than trusting the
/// trigger condition.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

/// Per-state rule deciding whether a sampled level change triggers the
/// state's edge transition.
///
/// Both inputs use the same four-way policy; rising means the sampled level
/// is high, falling means it is low.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum EdgePolicy {
    /// Level changes on this input have no effect.
    Ignore,
    /// Fire only when the sampled level is high.
    RisingEdge,
    /// Fire only when the sampled level is low.
    FallingEdge,
    /// Fire on any level change.
    AnyEdge,
}

impl EdgePolicy {
    /// Returns `true` when a change that sampled `level` should fire.
    pub const fn fires(self, level: Level) -> bool {
        match self {
            EdgePolicy::Ignore => false,
            EdgePolicy::RisingEdge => matches!(level, Level::High),
            EdgePolicy::FallingEdge => matches!(level, Level::Low),
            EdgePolicy::AnyEdge => true,
        }
    }
}

/// Output-bank action tag stored in the state table.
///
/// The table stores tags rather than code addresses so it remains plain
/// data, testable independent of the hardware driver behind
/// [`OutputBank`](crate::engine::OutputBank).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum OutputAction {
    NoAction,
    /// Drive every relay output to its released state.
    ReleaseAll,
    /// Assert the primary relay output (the power-button contact).
    AssertPrimary,
}

/// Index into the fixed state table.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StateId(usize);

impl StateId {
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw table index.
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Immutable description of one machine state.
///
/// Transition targets are `Option<StateId>`; `None` means the trigger runs
/// its action (if any) without leaving the state.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StateSpec {
    pub name: &'static str,
    /// Ticks after entry before the timeout trigger fires; `0` disables it.
    pub timeout_ticks: u32,
    pub edge_a: EdgePolicy,
    pub edge_b: EdgePolicy,
    pub on_timeout: Option<StateId>,
    pub on_edge_a: Option<StateId>,
    pub on_edge_b: Option<StateId>,
    pub on_enter: OutputAction,
    pub on_timeout_action: OutputAction,
    pub on_edge_a_action: OutputAction,
    pub on_edge_b_action: OutputAction,
}

impl StateSpec {
    /// Creates a state with no timeout, both inputs ignored, and no actions.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            timeout_ticks: 0,
            edge_a: EdgePolicy::Ignore,
            edge_b: EdgePolicy::Ignore,
            on_timeout: None,
            on_edge_a: None,
            on_edge_b: None,
            on_enter: OutputAction::NoAction,
            on_timeout_action: OutputAction::NoAction,
            on_edge_a_action: OutputAction::NoAction,
            on_edge_b_action: OutputAction::NoAction,
        }
    }

    pub const fn entering(mut self, action: OutputAction) -> Self {
        self.on_enter = action;
        self
    }

    pub const fn timeout(mut self, ticks: u32, target: StateId) -> Self {
        self.timeout_ticks = ticks;
        self.on_timeout = Some(target);
        self
    }

    pub const fn timeout_action(mut self, action: OutputAction) -> Self {
        self.on_timeout_action = action;
        self
    }

    pub const fn edge_a(mut self, policy: EdgePolicy, target: StateId) -> Self {
        self.edge_a = policy;
        self.on_edge_a = Some(target);
        self
    }

    pub const fn edge_b(mut self, policy: EdgePolicy, target: StateId) -> Self {
        self.edge_b = policy;
        self.on_edge_b = Some(target);
        self
    }

    pub const fn edge_a_action(mut self, action: OutputAction) -> Self {
        self.on_edge_a_action = action;
        self
    }

    pub const fn edge_b_action(mut self, action: OutputAction) -> Self {
        self.on_edge_b_action = action;
        self
    }

    /// Returns the edge policy configured for `input`.
    pub const fn edge_policy(&self, input: InputId) -> EdgePolicy {
        match input {
            InputId::A => self.edge_a,
            InputId::B => self.edge_b,
        }
    }

    /// Returns the transition target configured for `input`.
    pub const fn edge_target(&self, input: InputId) -> Option<StateId> {
        match input {
            InputId::A => self.on_edge_a,
            InputId::B => self.on_edge_b,
        }
    }

    /// Returns the action configured for `input`.
    pub const fn edge_action(&self, input: InputId) -> OutputAction {
        match input {
            InputId::A => self.on_edge_a_action,
            InputId::B => self.on_edge_b_action,
        }
    }
}

/// Returns `true` when every transition target in `table` is a valid index.
///
/// Table misconfiguration is a build-time defect; this helper exists so the
/// fixed tables can be checked once in tests rather than on every lookup.
pub fn table_is_valid(table: &[StateSpec]) -> bool {
    table.iter().all(|state| {
        [state.on_timeout, state.on_edge_a, state.on_edge_b]
            .into_iter()
            .flatten()
            .all(|target| target.index() < table.len())
    })
}

// Reference front-panel topology. Input A is the power button (doubling as
// the power-good feedback line during power_up); input B is the reset
// button.

pub const INIT: StateId = StateId::new(0);
pub const OFF: StateId = StateId::new(1);
pub const POWER_UP: StateId = StateId::new(2);
pub const ON: StateId = StateId::new(3);
pub const ON_ACTIVE: StateId = StateId::new(4);
pub const FORCE_SHUTDOWN: StateId = StateId::new(5);
pub const HARD_RESET: StateId = StateId::new(6);

/// Number of states in [`PANEL_STATES`].
pub const PANEL_STATE_COUNT: usize = 7;

/// The canonical seven-state front-panel table.
///
/// `force_shutdown` and `hard_reset` hold the primary output for their whole
/// timeout window; the held contact is released by the target state's
/// `ReleaseAll`/`AssertPrimary` entry action.
pub const PANEL_STATES: [StateSpec; PANEL_STATE_COUNT] = [
    StateSpec::new("init")
        .entering(OutputAction::ReleaseAll)
        .timeout(5, POWER_UP),
    StateSpec::new("off")
        .entering(OutputAction::ReleaseAll)
        .edge_a(EdgePolicy::RisingEdge, POWER_UP),
    StateSpec::new("power_up")
        .entering(OutputAction::AssertPrimary)
        .timeout(3, ON)
        .edge_a(EdgePolicy::RisingEdge, ON),
    StateSpec::new("on")
        .entering(OutputAction::ReleaseAll)
        .edge_a(EdgePolicy::RisingEdge, FORCE_SHUTDOWN)
        .edge_b(EdgePolicy::AnyEdge, HARD_RESET),
    StateSpec::new("on_active")
        .timeout(10, HARD_RESET)
        .edge_a(EdgePolicy::RisingEdge, FORCE_SHUTDOWN)
        .edge_b(EdgePolicy::AnyEdge, HARD_RESET),
    StateSpec::new("force_shutdown")
        .entering(OutputAction::AssertPrimary)
        .timeout(4, OFF),
    StateSpec::new("hard_reset")
        .entering(OutputAction::AssertPrimary)
        .timeout(4, POWER_UP),
];

//! Event plumbing between the interrupt-facing tasks and the engine task.
//!
//! Every stimulus the machine reacts to is normalized into an [`Event`] and
//! delivered over one bounded channel, so exactly one task ever touches the
//! machine and no masking of interrupts is needed anywhere. Outbound serial
//! lines travel the other way over their own bounded channel.

#![allow(dead_code)]

use embassy_sync::channel::{Channel, Receiver, Sender};
use panel_core::engine::{Machine, OutputBank};
use panel_core::states::{InputId, Level, StateId};
use panel_core::transport::{CommandLine, LineError, OUTBOUND_CAPACITY};

#[cfg(not(target_os = "none"))]
use embassy_sync::blocking_mutex::raw::NoopRawMutex;
#[cfg(target_os = "none")]
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;

#[cfg(target_os = "none")]
type PanelMutex = ThreadModeRawMutex;
#[cfg(not(target_os = "none"))]
type PanelMutex = NoopRawMutex;

/// Depth of the inbound event channel.
///
/// Sized for the worst burst the sources can produce between engine wakeups:
/// one tick, a bounce on each button, and a couple of command lines.
pub const EVENT_QUEUE_DEPTH: usize = 8;

/// Depth of the outbound serial line channel; matches the transmit ring so
/// drop-newest behavior is consistent across both stages.
pub const SERIAL_QUEUE_DEPTH: usize = OUTBOUND_CAPACITY;

/// A stimulus for the machine engine.
///
/// Not `Copy`: the `Line` variant owns its command-line buffer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// One period of the 10 ms-granularity slow clock elapsed.
    Tick,
    /// A button input changed level; `level` is the value sampled after the
    /// change.
    Edge { input: InputId, level: Level },
    /// A complete command line arrived on the serial console.
    Line(CommandLine),
}

/// Channel carrying [`Event`]s to the engine task.
pub type EventQueue = Channel<PanelMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventSender<'a> = Sender<'a, PanelMutex, Event, EVENT_QUEUE_DEPTH>;
pub type EventReceiver<'a> = Receiver<'a, PanelMutex, Event, EVENT_QUEUE_DEPTH>;

/// Returns `true` when a dispatched command line moved the machine, so the
/// engine task can trace command-driven transitions the same way it traces
/// tick- and edge-driven ones. Re-entry into the active state counts: the
/// tick-counter reset is observable even when the state index is unchanged.
pub fn command_caused_transition<B: OutputBank>(
    before: StateId,
    ticks_before: u32,
    machine: &Machine<'_, B>,
) -> bool {
    machine.current() != before || machine.ticks_since_entry() != ticks_before
}

/// Channel carrying finished reply lines to the serial writer task.
pub type SerialOutQueue = Channel<PanelMutex, &'static str, SERIAL_QUEUE_DEPTH>;
pub type SerialOutSender<'a> = Sender<'a, PanelMutex, &'static str, SERIAL_QUEUE_DEPTH>;
pub type SerialOutReceiver<'a> = Receiver<'a, PanelMutex, &'static str, SERIAL_QUEUE_DEPTH>;

/// The two front-panel relay outputs driven by the engine.
///
/// The primary relay shorts the host's power-button contact; the auxiliary
/// relay is released whenever the primary is, so `release_all` is the safe
/// state from any entry path.
#[cfg(target_os = "none")]
pub struct RelayBank {
    primary: embassy_stm32::gpio::Output<'static>,
    auxiliary: embassy_stm32::gpio::Output<'static>,
}

#[cfg(target_os = "none")]
impl RelayBank {
    pub fn new(
        primary: embassy_stm32::gpio::Output<'static>,
        auxiliary: embassy_stm32::gpio::Output<'static>,
    ) -> Self {
        Self { primary, auxiliary }
    }
}

#[cfg(target_os = "none")]
impl panel_core::engine::OutputBank for RelayBank {
    fn release_all(&mut self) {
        self.primary.set_low();
        self.auxiliary.set_low();
        log_relays("released");
    }

    fn assert_primary(&mut self) {
        self.auxiliary.set_low();
        self.primary.set_high();
        log_relays("primary asserted");
    }
}

#[cfg(target_os = "none")]
pub fn log_state(name: &'static str) {
    defmt::info!("panel: state {}", name);
}

#[cfg(not(target_os = "none"))]
pub fn log_state(name: &'static str) {
    println!("panel: state {name}");
}

#[cfg(target_os = "none")]
pub fn log_relays(what: &'static str) {
    defmt::debug!("panel: relays {}", what);
}

#[cfg(not(target_os = "none"))]
pub fn log_relays(what: &'static str) {
    println!("panel: relays {what}");
}

#[cfg(target_os = "none")]
pub fn log_event_dropped(which: &'static str) {
    defmt::warn!("panel: {} dropped, event queue full", which);
}

#[cfg(not(target_os = "none"))]
pub fn log_event_dropped(which: &'static str) {
    println!("panel: {which} dropped, event queue full");
}

#[cfg(target_os = "none")]
pub fn log_reply_dropped(reply: &'static str) {
    defmt::warn!("panel: reply {:?} dropped, serial queue full", reply);
}

#[cfg(not(target_os = "none"))]
pub fn log_reply_dropped(reply: &'static str) {
    println!("panel: reply {reply:?} dropped, serial queue full");
}

#[cfg(target_os = "none")]
pub fn log_line_error(error: LineError) {
    match error {
        LineError::Overflow => defmt::warn!("panel: command line overflow, discarding"),
        LineError::InvalidUtf8 => defmt::warn!("panel: command line not UTF-8, discarding"),
    }
}

#[cfg(not(target_os = "none"))]
pub fn log_line_error(error: LineError) {
    match error {
        LineError::Overflow => println!("panel: command line overflow, discarding"),
        LineError::InvalidUtf8 => println!("panel: command line not UTF-8, discarding"),
    }
}

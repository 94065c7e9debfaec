//! Serial command console.
//!
//! Received lines are matched exactly against a fixed command table. Query
//! commands answer with one reply line; transition commands validate a guard
//! on the current state and, when it passes, drive the machine through the
//! engine's transition funnel — the resulting state announcement is the only
//! output for those commands. Replies are `&'static str` so they satisfy the
//! transport's storage-stability contract without copying.

use winnow::ModalResult;
use winnow::Parser;
use winnow::ascii::multispace0;
use winnow::combinator::delimited;
use winnow::token::take_while;

use crate::engine::{Machine, OutputBank};
use crate::states::{FORCE_SHUTDOWN, HARD_RESET, OFF, ON, ON_ACTIVE, POWER_UP, StateId};

/// Reply for lines that match no command.
pub const UNKNOWN_COMMAND: &str = "unknown command";

/// Rejection for commands that require the machine to be in the on region.
pub const NOT_ON_STATE: &str = "not on state";

/// Rejection for commands that require the machine to be in the off region.
pub const NOT_OFF_STATE: &str = "not off state";

/// Reply to the `help` command.
pub const HELP_REPLY: &str = "commands: get_state touch power_up force_shutdown hard_reset help";

/// States from which on-region commands (`touch`, `force_shutdown`,
/// `hard_reset`) are meaningful.
const ON_REGION: &[StateId] = &[ON, ON_ACTIVE];

/// States from which `power_up` is meaningful.
const OFF_REGION: &[StateId] = &[OFF];

/// What a matched command does.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CommandKind {
    /// Reply with the current state's name.
    GetState,
    /// Reply with the command list.
    Help,
    /// Request a transition, subject to a guard on the current state.
    Transition {
        target: StateId,
        allowed: &'static [StateId],
        rejection: &'static str,
    },
}

struct CommandSpec {
    name: &'static str,
    kind: CommandKind,
}

/// Fixed command table; lookup is an exact-match linear scan.
const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "get_state",
        kind: CommandKind::GetState,
    },
    CommandSpec {
        name: "touch",
        kind: CommandKind::Transition {
            target: ON_ACTIVE,
            allowed: ON_REGION,
            rejection: NOT_ON_STATE,
        },
    },
    CommandSpec {
        name: "force_shutdown",
        kind: CommandKind::Transition {
            target: FORCE_SHUTDOWN,
            allowed: ON_REGION,
            rejection: NOT_ON_STATE,
        },
    },
    CommandSpec {
        name: "hard_reset",
        kind: CommandKind::Transition {
            target: HARD_RESET,
            allowed: ON_REGION,
            rejection: NOT_ON_STATE,
        },
    },
    CommandSpec {
        name: "power_up",
        kind: CommandKind::Transition {
            target: POWER_UP,
            allowed: OFF_REGION,
            rejection: NOT_OFF_STATE,
        },
    },
    CommandSpec {
        name: "help",
        kind: CommandKind::Help,
    },
];

fn command_word<'a>(input: &mut &'a str) -> ModalResult<&'a str> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_').parse_next(input)
}

/// Extracts the command keyword from a received line.
///
/// The grammar is a single keyword with optional surrounding whitespace;
/// anything else fails the parse and falls through to the unknown-command
/// reply.
fn parse_command(line: &str) -> Option<&str> {
    delimited(multispace0, command_word, multispace0)
        .parse(line)
        .ok()
}

/// Dispatches one received line against `machine`.
///
/// Returns at most one line to put on the outbound channel: a query reply, a
/// transition announcement, a guard rejection, or the unknown-command
/// reply. Blank lines are ignored.
pub fn dispatch<B: OutputBank>(line: &str, machine: &mut Machine<'_, B>) -> Option<&'static str> {
    if line.trim().is_empty() {
        return None;
    }

    let Some(word) = parse_command(line) else {
        return Some(UNKNOWN_COMMAND);
    };

    let Some(spec) = COMMANDS.iter().find(|spec| spec.name == word) else {
        return Some(UNKNOWN_COMMAND);
    };

    match spec.kind {
        CommandKind::GetState => Some(machine.state_name()),
        CommandKind::Help => Some(HELP_REPLY),
        CommandKind::Transition {
            target,
            allowed,
            rejection,
        } => {
            if allowed.contains(&machine.current()) {
                Some(machine.transition_to(target))
            } else {
                Some(rejection)
            }
        }
    }
}

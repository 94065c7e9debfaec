//! Console behavior over the canonical panel table, including the outbound
//! serial path a deployment would put the replies on.

use panel_core::console::{self, NOT_OFF_STATE, NOT_ON_STATE, UNKNOWN_COMMAND};
use panel_core::engine::{Machine, NoopOutputBank};
use panel_core::states::{
    FORCE_SHUTDOWN, HARD_RESET, INIT, OFF, ON, ON_ACTIVE, PANEL_STATES, POWER_UP, StateId,
};
use panel_core::transport::{LineAccumulator, OutboundQueue};

fn machine_at(state: StateId) -> Machine<'static, NoopOutputBank> {
    let mut machine = Machine::new(&PANEL_STATES, NoopOutputBank::new());
    machine.start();
    machine.transition_to(state);
    machine
}

#[test]
fn get_state_round_trips_in_every_state() {
    let expected = [
        (INIT, "init"),
        (OFF, "off"),
        (POWER_UP, "power_up"),
        (ON, "on"),
        (ON_ACTIVE, "on_active"),
        (FORCE_SHUTDOWN, "force_shutdown"),
        (HARD_RESET, "hard_reset"),
    ];
    for (state, name) in expected {
        let mut machine = machine_at(state);
        assert_eq!(console::dispatch("get_state", &mut machine), Some(name));
    }
}

#[test]
fn guard_rejections_leave_the_state_unchanged() {
    for state in [INIT, OFF, POWER_UP, FORCE_SHUTDOWN, HARD_RESET] {
        for command in ["touch", "force_shutdown", "hard_reset"] {
            let mut machine = machine_at(state);
            assert_eq!(
                console::dispatch(command, &mut machine),
                Some(NOT_ON_STATE)
            );
            assert_eq!(machine.current(), state);
        }
    }

    for state in [INIT, POWER_UP, ON, ON_ACTIVE, FORCE_SHUTDOWN, HARD_RESET] {
        let mut machine = machine_at(state);
        assert_eq!(
            console::dispatch("power_up", &mut machine),
            Some(NOT_OFF_STATE)
        );
        assert_eq!(machine.current(), state);
    }
}

#[test]
fn transition_commands_announce_the_target_state() {
    let mut machine = machine_at(ON);
    assert_eq!(
        console::dispatch("force_shutdown", &mut machine),
        Some("force_shutdown")
    );
    assert_eq!(machine.current(), FORCE_SHUTDOWN);

    let mut machine = machine_at(ON_ACTIVE);
    assert_eq!(
        console::dispatch("hard_reset", &mut machine),
        Some("hard_reset")
    );
    assert_eq!(machine.current(), HARD_RESET);
}

/// Replies drain over the outbound queue in the order the commands produced
/// them, even when the queue is never given a chance to go idle in between.
#[test]
fn replies_keep_command_order_on_the_wire() {
    let mut machine = machine_at(OFF);
    let mut serial: OutboundQueue<8> = OutboundQueue::new();

    for line in ["get_state", "touch", "power_up", "bogus"] {
        if let Some(reply) = console::dispatch(line, &mut machine) {
            serial.enqueue(reply).unwrap();
        }
    }

    let mut wire = Vec::new();
    while let Some(byte) = serial.next_byte() {
        wire.push(byte);
    }
    assert_eq!(
        wire,
        b"off\nnot on state\npower_up\nunknown command\n".to_vec()
    );
}

/// A full inbound-to-outbound pass: bytes in, lines assembled, commands
/// dispatched, replies queued.
#[test]
fn serial_bytes_drive_the_dispatcher() {
    let mut machine = machine_at(OFF);
    let mut lines = LineAccumulator::new();
    let mut serial: OutboundQueue<8> = OutboundQueue::new();

    for byte in b"power_up\r\nget_state\n" {
        if let Ok(Some(line)) = lines.push(*byte) {
            if let Some(reply) = console::dispatch(line.as_str(), &mut machine) {
                serial.enqueue(reply).unwrap();
            }
        }
    }

    let mut wire = Vec::new();
    while let Some(byte) = serial.next_byte() {
        wire.push(byte);
    }
    assert_eq!(wire, b"power_up\npower_up\n".to_vec());
}

#[test]
fn unknown_command_never_disturbs_the_machine() {
    let mut machine = machine_at(ON_ACTIVE);
    machine.tick();
    let ticks = machine.ticks_since_entry();

    assert_eq!(
        console::dispatch("self_destruct", &mut machine),
        Some(UNKNOWN_COMMAND)
    );
    assert_eq!(machine.current(), ON_ACTIVE);
    assert_eq!(machine.ticks_since_entry(), ticks);
}

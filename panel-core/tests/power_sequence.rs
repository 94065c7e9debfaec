//! End-to-end power-sequencing scenarios against the canonical panel table.

use panel_core::console;
use panel_core::engine::{Machine, NoopOutputBank, OutputBank};
use panel_core::states::{
    FORCE_SHUTDOWN, HARD_RESET, INIT, InputId, Level, OFF, ON, ON_ACTIVE, PANEL_STATES, POWER_UP,
};

#[derive(Default)]
struct RecordingBank {
    actions: Vec<&'static str>,
}

impl OutputBank for RecordingBank {
    fn release_all(&mut self) {
        self.actions.push("release_all");
    }

    fn assert_primary(&mut self) {
        self.actions.push("assert_primary");
    }
}

fn booted() -> Machine<'static, RecordingBank> {
    let mut machine = Machine::new(&PANEL_STATES, RecordingBank::default());
    assert_eq!(machine.start(), "init");
    machine
}

/// Runs the machine to the `on` state via the autonomous boot path.
fn run_to_on(machine: &mut Machine<'static, RecordingBank>) {
    for _ in 0..4 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(machine.tick(), Some("power_up"));
    // power-good feedback on input A ends power_up early
    assert_eq!(machine.edge(InputId::A, Level::High), Some("on"));
}

#[test]
fn cold_boot_reaches_power_up_after_five_ticks() {
    let mut machine = booted();
    assert_eq!(machine.current(), INIT);

    for _ in 0..4 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(machine.tick(), Some("power_up"));
    assert_eq!(machine.current(), POWER_UP);
    assert_eq!(
        machine.bank().actions,
        vec!["release_all", "assert_primary"]
    );
}

#[test]
fn power_up_times_out_to_on_without_feedback() {
    let mut machine = booted();
    for _ in 0..5 {
        machine.tick();
    }
    assert_eq!(machine.current(), POWER_UP);

    assert_eq!(machine.tick(), None);
    assert_eq!(machine.tick(), None);
    assert_eq!(machine.tick(), Some("on"));
    assert_eq!(machine.current(), ON);
}

#[test]
fn power_good_edge_ends_power_up_early() {
    let mut machine = booted();
    run_to_on(&mut machine);
    assert_eq!(machine.current(), ON);
    // entering on releases the power-button contact
    assert_eq!(machine.bank().actions.last(), Some(&"release_all"));
}

#[test]
fn on_active_watchdog_expires_into_hard_reset() {
    let mut machine = booted();
    run_to_on(&mut machine);
    machine.transition_to(ON_ACTIVE);

    for _ in 0..9 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(machine.tick(), Some("hard_reset"));
    assert_eq!(machine.current(), HARD_RESET);
    assert_eq!(machine.bank().actions.last(), Some(&"assert_primary"));
}

#[test]
fn touch_restarts_the_watchdog_window() {
    let mut machine = booted();
    run_to_on(&mut machine);
    assert_eq!(console::dispatch("touch", &mut machine), Some("on_active"));

    for _ in 0..9 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(console::dispatch("touch", &mut machine), Some("on_active"));
    assert_eq!(machine.ticks_since_entry(), 0);

    for _ in 0..9 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(machine.tick(), Some("hard_reset"));
}

#[test]
fn power_button_forces_shutdown_from_on() {
    let mut machine = booted();
    run_to_on(&mut machine);

    assert_eq!(
        machine.edge(InputId::A, Level::High),
        Some("force_shutdown")
    );
    assert_eq!(machine.current(), FORCE_SHUTDOWN);
    // the contact is held for the whole shutdown window
    assert_eq!(machine.bank().actions.last(), Some(&"assert_primary"));

    for _ in 0..3 {
        assert_eq!(machine.tick(), None);
    }
    assert_eq!(machine.tick(), Some("off"));
    assert_eq!(machine.current(), OFF);
    assert_eq!(machine.bank().actions.last(), Some(&"release_all"));
}

#[test]
fn reset_button_hard_resets_from_on_on_either_level() {
    for level in [Level::High, Level::Low] {
        let mut machine = booted();
        run_to_on(&mut machine);

        assert_eq!(machine.edge(InputId::B, level), Some("hard_reset"));
        for _ in 0..3 {
            assert_eq!(machine.tick(), None);
        }
        assert_eq!(machine.tick(), Some("power_up"));
    }
}

#[test]
fn power_button_wakes_machine_from_off() {
    let mut machine = booted();
    run_to_on(&mut machine);
    machine.edge(InputId::A, Level::High);
    for _ in 0..4 {
        machine.tick();
    }
    assert_eq!(machine.current(), OFF);

    // releases are ignored while off
    assert_eq!(machine.edge(InputId::A, Level::Low), None);
    assert_eq!(machine.edge(InputId::A, Level::High), Some("power_up"));
    assert_eq!(machine.current(), POWER_UP);
}

#[test]
fn reset_button_is_ignored_outside_the_on_region() {
    let mut machine = booted();
    for state in [INIT, OFF, POWER_UP, FORCE_SHUTDOWN, HARD_RESET] {
        machine.transition_to(state);
        assert_eq!(machine.edge(InputId::B, Level::High), None);
        assert_eq!(machine.current(), state);
    }
}

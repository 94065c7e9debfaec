use crate::panel::{
    Event, EventReceiver, RelayBank, SerialOutSender, command_caused_transition,
    log_reply_dropped, log_state,
};
use panel_core::console;
use panel_core::engine::Machine;

/// Sole owner of the machine; every stimulus arrives over the event channel.
#[embassy_executor::task]
pub async fn run(
    mut machine: Machine<'static, RelayBank>,
    events: EventReceiver<'static>,
    replies: SerialOutSender<'static>,
) -> ! {
    let announcement = machine.start();
    log_state(announcement);
    send(&replies, announcement);

    loop {
        let outbound = match events.receive().await {
            Event::Tick => machine.tick().inspect(|name| log_state(name)),
            Event::Edge { input, level } => {
                machine.edge(input, level).inspect(|name| log_state(name))
            }
            Event::Line(line) => {
                let before = machine.current();
                let ticks = machine.ticks_since_entry();
                let reply = console::dispatch(line.as_str(), &mut machine);
                if command_caused_transition(before, ticks, &machine) {
                    log_state(machine.state_name());
                }
                reply
            }
        };

        if let Some(reply) = outbound {
            send(&replies, reply);
        }
    }
}

fn send(replies: &SerialOutSender<'static>, reply: &'static str) {
    if replies.try_send(reply).is_err() {
        log_reply_dropped(reply);
    }
}

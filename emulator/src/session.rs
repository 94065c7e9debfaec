use panel_core::console;
use panel_core::engine::{Machine, OutputBank};
use panel_core::states::{InputId, Level, PANEL_STATES};
use panel_core::transport::{OutboundQueue, TERMINATOR};

/// Upper bound for a single `tick` command, to keep typos from spinning the
/// session through millions of states.
const MAX_TICK_BATCH: usize = 1000;

/// Output bank that narrates relay changes instead of driving hardware.
#[derive(Default)]
struct HostBank {
    narration: Vec<&'static str>,
}

impl HostBank {
    fn take(&mut self) -> Vec<&'static str> {
        std::mem::take(&mut self.narration)
    }
}

impl OutputBank for HostBank {
    fn release_all(&mut self) {
        self.narration.push("relays: all released");
    }

    fn assert_primary(&mut self) {
        self.narration.push("relays: primary asserted");
    }
}

/// One emulated controller: the machine, its narrated relay bank, and the
/// outbound serial ring the firmware would drain onto the console UART.
pub struct Session {
    machine: Machine<'static, HostBank>,
    serial: OutboundQueue,
}

impl Session {
    pub fn new() -> Self {
        Self {
            machine: Machine::new(&PANEL_STATES, HostBank::default()),
            serial: OutboundQueue::new(),
        }
    }

    /// Runs the power-on path the firmware runs before serving events.
    pub fn startup(&mut self) -> Vec<String> {
        let announcement = self.machine.start();
        self.enqueue(announcement);
        self.collect()
    }

    /// Interprets one input line: a stimulus command (`tick`, `high`, `low`)
    /// or, failing that, a passthrough to the serial command console.
    pub fn handle_command(&mut self, line: &str) -> Vec<String> {
        let mut words = line.split_whitespace();
        match words.next() {
            Some(word) if word.eq_ignore_ascii_case("tick") => {
                let count = match words.next() {
                    None => 1,
                    Some(value) => match value.parse::<usize>() {
                        Ok(count) if (1..=MAX_TICK_BATCH).contains(&count) => count,
                        _ => {
                            return vec![format!(
                                "tick count must be 1..={MAX_TICK_BATCH}, got `{value}`"
                            )];
                        }
                    },
                };
                for _ in 0..count {
                    if let Some(announcement) = self.machine.tick() {
                        self.enqueue(announcement);
                    }
                }
                self.collect()
            }
            Some(word) if word.eq_ignore_ascii_case("high") => {
                self.edge(words.next(), Level::High)
            }
            Some(word) if word.eq_ignore_ascii_case("low") => self.edge(words.next(), Level::Low),
            _ => {
                if let Some(reply) = console::dispatch(line, &mut self.machine) {
                    self.enqueue(reply);
                }
                self.collect()
            }
        }
    }

    fn edge(&mut self, input: Option<&str>, level: Level) -> Vec<String> {
        let Some(input) = input.and_then(parse_input) else {
            return vec!["expected an input name: `a` or `b`".to_string()];
        };
        if let Some(announcement) = self.machine.edge(input, level) {
            self.enqueue(announcement);
        }
        self.collect()
    }

    fn enqueue(&mut self, message: &'static str) {
        if self.serial.enqueue(message).is_err() {
            // Mirrors the firmware's drop-newest policy; the session drains
            // after every command so this only fires on huge tick batches.
            eprintln!("serial queue full, dropping `{message}`");
        }
    }

    /// Drains relay narration and the serial ring into printable lines.
    fn collect(&mut self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .machine
            .bank_mut()
            .take()
            .into_iter()
            .map(str::to_string)
            .collect();

        let mut wire = Vec::new();
        while let Some(byte) = self.serial.next_byte() {
            wire.push(byte);
        }
        for chunk in wire.split(|byte| *byte == TERMINATOR) {
            if chunk.is_empty() {
                continue;
            }
            lines.push(format!("tty< {}", String::from_utf8_lossy(chunk)));
        }

        lines
    }
}

fn parse_input(word: &str) -> Option<InputId> {
    if word.eq_ignore_ascii_case("a") {
        Some(InputId::A)
    } else if word.eq_ignore_ascii_case("b") {
        Some(InputId::B)
    } else {
        None
    }
}

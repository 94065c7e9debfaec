use embassy_stm32::exti::ExtiInput;

use crate::panel::{Event, EventSender, log_event_dropped};
use panel_core::states::{InputId, Level};

/// Forwards level changes on one button input to the engine.
///
/// The EXTI line is armed for both directions and the level is sampled after
/// each change; the per-state edge policy decides which direction matters.
#[embassy_executor::task(pool_size = 2)]
pub async fn run(mut button: ExtiInput<'static>, input: InputId, events: EventSender<'static>) -> ! {
    loop {
        button.wait_for_any_edge().await;
        let level = if button.is_high() {
            Level::High
        } else {
            Level::Low
        };
        if events.try_send(Event::Edge { input, level }).is_err() {
            log_event_dropped(input.label());
        }
    }
}

use embassy_stm32::gpio::Output;
use embassy_time::{Duration, Ticker};

use crate::panel::{Event, EventSender, log_event_dropped};

/// Engine tick period; state timeouts in the panel table are multiples of
/// this.
const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Emits one [`Event::Tick`] per period and toggles the heartbeat LED.
///
/// The LED toggles even when the queue is full, so a wedged engine task is
/// visible as a still-blinking board that stops answering.
#[embassy_executor::task]
pub async fn run(mut heartbeat: Output<'static>, events: EventSender<'static>) -> ! {
    let mut ticker = Ticker::every(TICK_PERIOD);
    loop {
        ticker.next().await;
        heartbeat.toggle();
        if events.try_send(Event::Tick).is_err() {
            log_event_dropped("tick");
        }
    }
}

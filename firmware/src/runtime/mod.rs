use cortex_m::interrupt;
use cortex_m::register::primask;
use critical_section::{self, RawRestoreState};
use defmt_rtt as _;
use embassy_executor::Spawner;
use embassy_stm32 as hal;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Level as PinLevel, Output, Pull, Speed};
use embassy_sync::channel::Channel;

use crate::panel::{EventQueue, RelayBank, SerialOutQueue};
use panel_core::engine::Machine;
use panel_core::states::{InputId, PANEL_STATES};

mod button_task;
mod engine_task;
mod serial_task;
mod tick_task;

critical_section::set_impl!(InterruptCriticalSection);

struct InterruptCriticalSection;

unsafe impl critical_section::Impl for InterruptCriticalSection {
    unsafe fn acquire() -> RawRestoreState {
        let primask = primask::read();
        interrupt::disable();
        primask.is_active()
    }

    unsafe fn release(restore_state: RawRestoreState) {
        if restore_state {
            unsafe {
                interrupt::enable();
            }
        }
    }
}

pub(super) static EVENT_QUEUE: EventQueue = Channel::new();
pub(super) static SERIAL_OUT: SerialOutQueue = Channel::new();

#[embassy_executor::main]
pub async fn main(spawner: Spawner) {
    let config = hal::Config::default();
    let hal::Peripherals {
        PA0,
        PA1,
        PA5,
        PB4,
        PB5,
        PB6,
        PB7,
        EXTI4,
        EXTI5,
        USART1,
        ..
    } = hal::init(config);

    // Relays start released; the init state's entry action re-releases them
    // once the engine task announces itself.
    let bank = RelayBank::new(
        Output::new(PA0, PinLevel::Low, Speed::Low),
        Output::new(PA1, PinLevel::Low, Speed::Low),
    );
    let machine = Machine::new(&PANEL_STATES, bank);

    let heartbeat = Output::new(PA5, PinLevel::Low, Speed::Low);

    // Buttons are active-low with external pull-ups mirrored internally; the
    // handlers sample the level after each change rather than trusting the
    // trigger direction.
    let power_button = ExtiInput::new(PB4, EXTI4, Pull::Up);
    let reset_button = ExtiInput::new(PB5, EXTI5, Pull::Up);

    spawner
        .spawn(engine_task::run(
            machine,
            EVENT_QUEUE.receiver(),
            SERIAL_OUT.sender(),
        ))
        .expect("failed to spawn engine task");

    spawner
        .spawn(tick_task::run(heartbeat, EVENT_QUEUE.sender()))
        .expect("failed to spawn tick task");

    spawner
        .spawn(button_task::run(
            power_button,
            InputId::A,
            EVENT_QUEUE.sender(),
        ))
        .expect("failed to spawn power button task");
    spawner
        .spawn(button_task::run(
            reset_button,
            InputId::B,
            EVENT_QUEUE.sender(),
        ))
        .expect("failed to spawn reset button task");

    spawner
        .spawn(serial_task::run(
            USART1,
            PB6,
            PB7,
            EVENT_QUEUE.sender(),
            SERIAL_OUT.receiver(),
        ))
        .expect("failed to spawn serial task");

    core::future::pending::<()>().await;
}

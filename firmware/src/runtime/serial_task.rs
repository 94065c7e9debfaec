use embassy_futures::join::join;
use embassy_stm32 as hal;
use embassy_stm32::Peri;
use embassy_stm32::usart::{BufferedUart, Config as UartConfig, DataBits, Parity, StopBits};
use embassy_time::{Duration, Timer};
use embedded_io_async::{Read, Write};

use crate::panel::{Event, EventSender, SerialOutReceiver, log_event_dropped, log_line_error};
use panel_core::transport::{LineAccumulator, MAX_LINE_LEN, TERMINATOR};

const CONSOLE_BAUD: u32 = 115_200;
const UART_BUFFER_SIZE: usize = MAX_LINE_LEN * 2;

static mut UART_TX_BUFFER: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];
static mut UART_RX_BUFFER: [u8; UART_BUFFER_SIZE] = [0; UART_BUFFER_SIZE];

embassy_stm32::bind_interrupts!(struct UartIrqs {
    USART1 => embassy_stm32::usart::BufferedInterruptHandler<hal::peripherals::USART1>;
});

/// Owns the console UART: assembles inbound bytes into command-line events
/// and drains reply lines onto the wire, one terminator-delimited line each.
#[embassy_executor::task]
pub async fn run(
    usart: Peri<'static, hal::peripherals::USART1>,
    tx_pin: Peri<'static, hal::peripherals::PB6>,
    rx_pin: Peri<'static, hal::peripherals::PB7>,
    events: EventSender<'static>,
    replies: SerialOutReceiver<'static>,
) -> ! {
    let mut config = UartConfig::default();
    config.baudrate = CONSOLE_BAUD;
    config.data_bits = DataBits::DataBits8;
    config.stop_bits = StopBits::STOP1;
    config.parity = Parity::ParityNone;

    let uart = unsafe {
        BufferedUart::new(
            usart,
            rx_pin,
            tx_pin,
            &mut UART_TX_BUFFER,
            &mut UART_RX_BUFFER,
            UartIrqs,
            config,
        )
        .expect("failed to initialize console UART")
    };

    let (mut uart_tx, mut uart_rx) = uart.split();

    let reader = async move {
        let mut accumulator = LineAccumulator::new();
        let mut ingress = [0u8; 16];
        loop {
            match uart_rx.read(&mut ingress).await {
                Ok(count) if count > 0 => {
                    for byte in &ingress[..count] {
                        match accumulator.push(*byte) {
                            Ok(Some(line)) => {
                                if events.try_send(Event::Line(line)).is_err() {
                                    log_event_dropped("command line");
                                }
                            }
                            Ok(None) => {}
                            Err(error) => log_line_error(error),
                        }
                    }
                }
                Ok(_) => {}
                Err(_) => {
                    defmt::warn!("panel: console UART read error");
                    Timer::after(Duration::from_millis(5)).await;
                }
            }
        }
    };

    let writer = async move {
        loop {
            let line = replies.receive().await;
            if write_line(&mut uart_tx, line).await.is_err() {
                defmt::warn!("panel: console UART write error");
                Timer::after(Duration::from_millis(5)).await;
            }
        }
    };

    join(reader, writer).await;
    loop {
        core::future::pending::<()>().await;
    }
}

async fn write_line<W: Write>(uart: &mut W, line: &'static str) -> Result<(), W::Error> {
    uart.write_all(line.as_bytes()).await?;
    uart.write_all(&[TERMINATOR]).await?;
    uart.flush().await
}

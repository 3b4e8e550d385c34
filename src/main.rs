//! GSM Handset Main Application
//!
//! Entry point for the STM32F405-based handset firmware.
//! Initializes the modem UART and wake interrupts, then runs the
//! cooperative poll loop.

#![no_std]
#![no_main]

use defmt::info;
use embassy_executor::Spawner;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::Pull;
use embassy_stm32::usart::{Config as UartConfig, Uart};
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use gsm_handset_firmware::hal::uart::ModemUart;
use gsm_handset_firmware::hal::wake::{watch_ring_indicator, watch_wake_button, WAKE_FLAG};
use gsm_handset_firmware::prelude::*;
use gsm_handset_firmware::transport::DecodePolicy;

/// Event sink wiring unsolicited modem events into the application
struct HandsetSink {
    /// Set while the call or incoming-call screen is up; gates sleep
    call_active: bool,
}

impl EventSink for HandsetSink {
    fn on_incoming_call(&mut self) {
        info!("incoming call");
        self.call_active = true;
    }

    fn on_caller_id(&mut self, number: &str) {
        info!("caller id: {}", number);
    }

    fn on_message_arrived(&mut self, id: u32) {
        info!("new SMS in slot {}", id);
    }

    fn on_ussd_result(&mut self, credit: &str) {
        info!("balance: {}", credit);
    }

    fn on_carrier_lost(&mut self) {
        info!("carrier lost");
        self.call_active = false;
    }
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("GSM Handset Firmware v{}", env!("CARGO_PKG_VERSION"));

    let p = embassy_stm32::init(embassy_stm32::Config::default());
    info!("Peripherals initialized");

    // UART4 to the SIM800L: PA0 = TX, PA1 = RX, 9600 8N1
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = MODEM_BAUD;
    let uart = Uart::new_blocking(p.UART4, p.PA1, p.PA0, uart_config)
        .expect("modem UART configuration is static and valid");

    let mut modem = Modem::new(ModemUart::new(uart, DecodePolicy::Replace));

    // Wake sources: button on PB9, modem RI line on PB12
    let wake_button = ExtiInput::new(p.PB9, p.EXTI9, Pull::Up);
    let ring_line = ExtiInput::new(p.PB12, p.EXTI12, Pull::Up);
    spawner.spawn(watch_wake_button(wake_button)).unwrap();
    spawner.spawn(watch_ring_indicator(ring_line)).unwrap();

    modem.setup();
    modem.set_volume(DEFAULT_VOLUME);
    info!("Modem configured, entering poll loop");

    let mut sink = HandsetSink { call_active: false };
    let mut coordinator = SleepCoordinator::new(IDLE_BUDGET_POLLS);

    loop {
        if coordinator.is_sleeping() {
            if let Some(source) = WAKE_FLAG.take() {
                info!("woken by {}", source);
                match coordinator.wake(source) {
                    gsm_handset_firmware::power::WakeAction::Prime => modem.prime_after_sleep(),
                    gsm_handset_firmware::power::WakeAction::Resume => {}
                }
            }
            Timer::after(Duration::from_millis(u64::from(POLL_PERIOD_MS))).await;
            continue;
        }

        if let Some(event) = modem.poll_unsolicited(&mut sink) {
            if matches!(event, ModemEvent::IncomingCall) {
                coordinator.note_activity();
            }
        }

        // Touch input / screen activity would call note_activity() here.
        if coordinator.poll_idle(sink.call_active) {
            info!("idle budget expired, sleeping");
            modem.set_sleep(SleepMode::Auto);
            coordinator.enter_sleep();
        }

        Timer::after(Duration::from_millis(u64::from(POLL_PERIOD_MS))).await;
    }
}

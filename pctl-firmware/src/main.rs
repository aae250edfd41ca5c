//! PCTL - Imaging Instrument Controller Firmware
//!
//! Main firmware binary for RP2040-based controller boards. The
//! supervisor owns the operator port, the lens link, the sensors and the
//! payload power switches; the frame trigger runs on an interrupt
//! executor with its own camera and strobe outputs.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::{UART0, UART1};
use embassy_rp::rtc::Rtc;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Delay;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pctl_core::config::{ConfigRegistry, Param, ParamTable};
use pctl_core::supervisor::{Hardware, PortBank};
use pctl_core::trigger::FrameTrigger;
use pctl_drivers::{EnvironmentBoard, GpioStrobe, OptotuneLens};
use pctl_hal_rp2040::{
    BoardRtc, BoardWatchdog, EmbassyClock, FlashParamStore, PowerSwitch, UartPort,
};

use crate::board::{Rp2040Board, SignalTrigger};

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
    UART1_IRQ => BufferedInterruptHandler<UART1>;
});

/// Baud rate of the lens controller link
const LENS_BAUD: u32 = 115_200;

/// Frame trigger executor, above thread mode
static EXECUTOR_TRIGGER: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    EXECUTOR_TRIGGER.on_interrupt()
}

// Static cells for UART buffers (must live forever)
static OPERATOR_TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static OPERATOR_RX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static LENS_TX_BUF: StaticCell<[u8; 64]> = StaticCell::new();
static LENS_RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("PCTL firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Parameter store; the port baud rates are read before the UARTs exist
    let mut store = FlashParamStore::new(p.FLASH, p.DMA_CH0);
    let mut boot_params = ParamTable::new();
    if boot_params.reload(&mut store).is_err() {
        info!("No stored parameters, using default baud rate");
    }

    // Operator port (UART0: GPIO0 TX, GPIO1 RX)
    let operator_baud = boot_params.get(Param::Port0Baud).max(0) as u32;
    let mut operator_config = UartConfig::default();
    operator_config.baudrate = operator_baud;
    let operator = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, operator_config).into_buffered(
        Irqs,
        OPERATOR_TX_BUF.init([0u8; 512]),
        OPERATOR_RX_BUF.init([0u8; 256]),
    );

    let mut ports = PortBank::new();
    if ports.add(UartPort::new(operator)).is_err() {
        warn!("Port bank full");
    }
    info!("Operator UART at {} baud", operator_baud);

    // Lens controller (UART1: GPIO4 TX, GPIO5 RX)
    let mut lens_config = UartConfig::default();
    lens_config.baudrate = LENS_BAUD;
    let lens_uart = Uart::new_blocking(p.UART1, p.PIN_4, p.PIN_5, lens_config).into_buffered(
        Irqs,
        LENS_TX_BUF.init([0u8; 64]),
        LENS_RX_BUF.init([0u8; 64]),
    );
    let lens = OptotuneLens::new(UartPort::new(lens_uart), Delay);

    // Power monitor and climate sensor (I2C0: GPIO20 SDA, GPIO21 SCL)
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_21, p.PIN_20, i2c::Config::default());
    let mut sensors = EnvironmentBoard::new(i2c, Delay);
    if let Err(e) = sensors.init() {
        warn!("Power monitor not configured: {}", e);
    }

    // Sequence capture outputs: camera GPIO10, white GPIO11, UV GPIO12
    let strobe = GpioStrobe::new(
        Output::new(p.PIN_10, Level::Low),
        Output::new(p.PIN_11, Level::Low),
        Output::new(p.PIN_12, Level::Low),
        Delay,
    );

    // Frame trigger outputs: camera GPIO13, white GPIO14, UV GPIO15
    let trigger = FrameTrigger::new(GpioStrobe::new(
        Output::new(p.PIN_13, Level::Low),
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::Low),
        Delay,
    ));

    // Payload power: camera GPIO16, strobes GPIO17
    let power = PowerSwitch::new(
        Output::new(p.PIN_16, Level::Low),
        Output::new(p.PIN_17, Level::Low),
    );

    let hw: Hardware<Rp2040Board> = Hardware {
        ports,
        clock: EmbassyClock,
        strobe,
        lens,
        power,
        rtc: BoardRtc::new(Rtc::new(p.RTC)),
        sensors,
        watchdog: BoardWatchdog::new(Watchdog::new(p.WATCHDOG)),
        trigger: SignalTrigger,
        store,
    };
    info!("Board initialized");

    // Frame trigger preempts the supervisor
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let trigger_spawner = EXECUTOR_TRIGGER.start(interrupt::SWI_IRQ_1);
    trigger_spawner.spawn(tasks::trigger_task(trigger)).unwrap();

    spawner.spawn(tasks::supervisor_task(hw)).unwrap();

    info!("All tasks spawned, firmware running");
}

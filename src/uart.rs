//! Interrupt-driven UART driver for the LPC40xx.
//!
//! - Transmit: blocking, byte at a time, polling "transmit holding register empty"
//! - Receive: the UART interrupt drains the hardware FIFO into a lock-free ring,
//!   foreground code drains the ring with [`UartDriver::read`]
//!
//! # Safety Requirements
//!
//! - **Single Consumer**: `read` and `flush` must only be called from one
//!   foreground context. The receive ring has no lock to enforce this.
//! - **Single Producer**: only the UART's own interrupt may call `interrupt`.
//! - **Configuration Before Enable**: `initialize`, `configure_baud_rate` and
//!   `enable`/`disable` must not race each other or a running `write`.

use core::fmt;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use crate::baud::{self, BaudSettings};
use crate::config::{uart, DEFAULT_BAUD_RATE, DEFAULT_RECEIVE_CAPACITY};
use crate::error::{UartError, UartResult};
use crate::platform::Platform;
use crate::port::PortDescriptor;
use crate::register::{DivisorLatch, RegisterBus, ShadowRegister};
use crate::ring_buffer::ReceiveRingBuffer;
use crate::trampoline::{InterruptHandler, TrampolineTable};

/// Receive storage of the default size, for `static` placement.
pub type ReceiveStorage = [u8; DEFAULT_RECEIVE_CAPACITY];

/// Number of stop bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

/// Parity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
    /// Parity bit always 1
    Forced1,
    /// Parity bit always 0
    Forced0,
}

impl Parity {
    /// LCR parity select value, `None` when parity is disabled.
    const fn code(self) -> Option<u32> {
        match self {
            Parity::None => None,
            Parity::Odd => Some(0x0),
            Parity::Even => Some(0x1),
            Parity::Forced1 => Some(0x2),
            Parity::Forced0 => Some(0x3),
        }
    }
}

/// Character framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFormat {
    /// Data bits per character, 5 to 8.
    pub word_length: u8,
    /// Stop bits per character.
    pub stop_bits: StopBits,
    /// Parity bit, if any.
    pub parity: Parity,
}

impl LineFormat {
    /// LCR word length value, `None` for unsupported lengths.
    const fn word_length_code(&self) -> Option<u32> {
        match self.word_length {
            5..=8 => Some(self.word_length as u32 - 5),
            _ => None,
        }
    }
}

impl Default for LineFormat {
    /// 8 data bits, no parity, 1 stop bit.
    fn default() -> Self {
        Self {
            word_length: 8,
            stop_bits: StopBits::One,
            parity: Parity::None,
        }
    }
}

/// Line settings applied by [`UartDriver::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    /// Requested baud rate in bits per second.
    pub baud_rate: u32,
    /// Character framing.
    pub format: LineFormat,
}

impl Default for SerialSettings {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            format: LineFormat::default(),
        }
    }
}

/// Driver lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DriverState {
    /// Not yet initialized.
    Uninitialized = 0,
    /// Initialized, FIFOs off.
    Disabled = 1,
    /// Initialized, FIFOs on.
    Enabled = 2,
}

impl DriverState {
    const fn from_u8(value: u8) -> Self {
        match value {
            1 => DriverState::Disabled,
            2 => DriverState::Enabled,
            _ => DriverState::Uninitialized,
        }
    }
}

/// Driver for one UART port.
///
/// Must live in a `'static` location (e.g. a `StaticCell`) before
/// [`initialize`](Self::initialize), since the interrupt keeps a reference.
pub struct UartDriver<'a, B> {
    port: &'static PortDescriptor,
    bus: B,
    settings: SerialSettings,
    /// FCR is write-only; IIR answers reads at its address.
    fifo_control: ShadowRegister,
    receive: ReceiveRingBuffer<'a>,
    busy: AtomicBool,
    state: AtomicU8,
}

impl<'a, B: RegisterBus> UartDriver<'a, B> {
    /// Create a driver for `port`. Received bytes are buffered in `storage`.
    ///
    /// No register is touched until [`initialize`](Self::initialize).
    pub fn new(
        port: &'static PortDescriptor,
        bus: B,
        storage: &'a mut [u8],
        settings: SerialSettings,
    ) -> Self {
        Self {
            port,
            bus,
            settings,
            fifo_control: ShadowRegister::new(uart::FCR, 0, uart::FCR_STROBES),
            receive: ReceiveRingBuffer::new(storage),
            busy: AtomicBool::new(false),
            state: AtomicU8::new(DriverState::Uninitialized as u8),
        }
    }

    /// Port this driver owns.
    pub fn port(&self) -> &'static PortDescriptor {
        self.port
    }

    /// Settings applied at initialization.
    pub fn settings(&self) -> &SerialSettings {
        &self.settings
    }

    /// Current lifecycle state.
    pub fn state(&self) -> DriverState {
        DriverState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True while a [`write`](Self::write) is in progress. Advisory only.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Transmit `bytes`, waiting for the transmit holding register before each one.
    ///
    /// Has no timeout: a stalled transmitter blocks forever.
    pub fn write(&self, bytes: &[u8]) {
        self.busy.store(true, Ordering::Release);

        for &byte in bytes {
            while !uart::LSR_THR_EMPTY.is_set(&self.bus) {
                core::hint::spin_loop();
            }
            uart::THR.write(&self.bus, u32::from(byte));
        }

        self.busy.store(false, Ordering::Release);
    }

    /// Move buffered bytes into `buffer`, returning how many were copied.
    ///
    /// Never blocks; returns fewer than `buffer.len()` (possibly 0) when the
    /// receive buffer runs dry.
    pub fn read(&self, buffer: &mut [u8]) -> usize {
        let mut count = 0;
        for slot in buffer.iter_mut() {
            // SAFETY: foreground is the only consumer.
            match unsafe { self.receive.pop_front() } {
                Some(byte) => {
                    *slot = byte;
                    count += 1;
                }
                None => break,
            }
        }
        count
    }

    /// Bytes waiting to be read.
    pub fn bytes_available(&self) -> usize {
        self.receive.len()
    }

    /// Receive buffer capacity.
    pub fn capacity(&self) -> usize {
        self.receive.capacity()
    }

    /// Bytes lost because the receive buffer was full.
    pub fn dropped_bytes(&self) -> u32 {
        self.receive.dropped()
    }

    /// Discard everything in the receive buffer.
    pub fn flush(&self) {
        // SAFETY: foreground is the only consumer.
        unsafe {
            self.receive.flush();
        }
    }

    /// Service a UART interrupt.
    ///
    /// On "receive data available" or "character time-out", drains the
    /// hardware FIFO into the receive buffer. Other causes are ignored.
    pub fn interrupt(&self) {
        let id = uart::IIR_ID.get(&self.bus);
        if id != uart::IIR_RECEIVE_DATA && id != uart::IIR_CHARACTER_TIMEOUT {
            return;
        }

        while uart::LSR_DATA_READY.is_set(&self.bus) {
            let byte = uart::RBR.read(&self.bus) as u8;
            // SAFETY: this interrupt is the only producer.
            // A full buffer drops the byte and counts it.
            let _ = unsafe { self.receive.push_back(byte) };
        }
    }

    /// Turn the FIFOs on, clearing both.
    pub fn enable(&self) {
        self.fifo_control.modify(&self.bus, |fcr| {
            uart::FCR_FIFO_ENABLE.set_in(fcr | uart::FCR_STROBES)
        });
        self.state.store(DriverState::Enabled as u8, Ordering::Release);
    }

    /// Turn the FIFOs off, clearing both.
    pub fn disable(&self) {
        self.fifo_control.modify(&self.bus, |fcr| {
            uart::FCR_FIFO_ENABLE.reset_in(fcr | uart::FCR_STROBES)
        });
        self.state.store(DriverState::Disabled as u8, Ordering::Release);
    }

    /// Program the divisor latch and fractional divider directly.
    ///
    /// [`initialize`](Self::initialize) calls this with the result of
    /// [`baud::calculate`]; call it yourself only to apply a known calibration.
    /// Must not be called while a write is in progress.
    pub fn configure_baud_rate(&self, settings: BaudSettings) {
        let divisor = u32::from(settings.divisor);
        let fraction = uart::FDR_DENOMINATOR.insert_in(
            uart::FDR_NUMERATOR.insert_in(0, u32::from(settings.numerator)),
            u32::from(settings.denominator),
        );

        DivisorLatch::new(&self.bus, uart::LCR_DLAB).program(|latched| {
            latched.write(uart::DLM, (divisor >> 8) & 0xFF);
            latched.write(uart::DLL, divisor & 0xFF);
            latched.write(uart::FDR, fraction);
        });
    }

    /// Apply the line format to LCR.
    ///
    /// The stop bit setting is written even when the word length is rejected.
    fn configure_format(&self) -> UartResult<()> {
        let format = self.settings.format;
        let mut lcr = uart::LCR.read(&self.bus);

        lcr = match format.stop_bits {
            StopBits::One => uart::LCR_STOP.reset_in(lcr),
            StopBits::Two => uart::LCR_STOP.set_in(lcr),
        };

        let Some(word_length) = format.word_length_code() else {
            uart::LCR.write(&self.bus, lcr);
            return Err(UartError::InvalidFrameSize);
        };
        lcr = uart::LCR_WORD_LENGTH.insert_in(lcr, word_length);

        lcr = match format.parity.code() {
            Some(code) => {
                let enabled = uart::LCR_PARITY_ENABLE.set_in(lcr);
                uart::LCR_PARITY.insert_in(enabled, code)
            }
            None => uart::LCR_PARITY_ENABLE.reset_in(lcr),
        };

        uart::LCR.write(&self.bus, lcr);
        Ok(())
    }
}

impl<B: RegisterBus + Sync + 'static> UartDriver<'static, B> {
    /// Bring the port up with the driver's [`SerialSettings`].
    ///
    /// Powers the peripheral, programs line format and baud rate, routes the
    /// pins, binds this driver into `table` and installs the port's
    /// trampoline, then enables the FIFOs. On error the port is left
    /// disabled; registers already written are not restored.
    ///
    /// The interrupt keeps a reference to the driver, so neither the driver
    /// nor its receive storage may live on the stack:
    ///
    /// ```compile_fail,E0597
    /// use lpc40xx_uart::platform::Platform;
    /// use lpc40xx_uart::register::Mmio;
    /// use lpc40xx_uart::{SerialSettings, UartDriver, UART0, UART_TRAMPOLINES};
    ///
    /// fn bring_up<P: Platform>(platform: &mut P) {
    ///     let mut storage = [0u8; 64];
    ///     let bus = unsafe { Mmio::new(UART0.base) };
    ///     let driver = UartDriver::new(&UART0, bus, &mut storage, SerialSettings::default());
    ///     let _ = driver.initialize(platform, &UART_TRAMPOLINES);
    /// }
    /// ```
    pub fn initialize<P: Platform + ?Sized>(
        &'static self,
        platform: &mut P,
        table: &TrampolineTable,
    ) -> UartResult<()> {
        let port = self.port;

        platform.power_on(port.peripheral);
        self.disable();

        let clock = platform.frequency(port.peripheral);
        let baud = baud::calculate(clock, self.settings.baud_rate);
        let format = self.configure_format();

        let baud = baud.inspect_err(|_| {
            log::warn!(
                "UART{}: {} baud not achievable from {} Hz",
                port.index,
                self.settings.baud_rate,
                clock
            );
        })?;
        format.inspect_err(|_| {
            log::warn!(
                "UART{}: unsupported word length {}",
                port.index,
                self.settings.format.word_length
            );
        })?;

        self.configure_baud_rate(baud);

        platform.set_function(port.tx, port.tx_function);
        platform.set_function(port.rx, port.rx_function);
        platform.set_pull_up(port.rx);

        self.setup_receive_interrupt(platform, table)?;

        self.flush();
        self.enable();

        log::debug!(
            "UART{}: {} baud (divisor {}, fraction {}/{}, actual {})",
            port.index,
            self.settings.baud_rate,
            baud.divisor,
            baud.numerator,
            baud.denominator,
            baud.output_rate(clock)
        );
        Ok(())
    }

    fn setup_receive_interrupt<P: Platform + ?Sized>(
        &'static self,
        platform: &mut P,
        table: &TrampolineTable,
    ) -> UartResult<()> {
        let port = self.port;

        table.bind(port.index, self)?;
        table.install(port.index, port.vector, platform)?;

        uart::IER_RECEIVE.set(&self.bus);
        self.fifo_control.modify(&self.bus, |fcr| {
            uart::FCR_RX_TRIGGER.insert_in(fcr, uart::RX_TRIGGER_14_BYTES)
        });
        self.fifo_control
            .modify(&self.bus, |fcr| uart::FCR_FIFO_ENABLE.set_in(fcr));
        Ok(())
    }
}

impl<B: RegisterBus + Sync> InterruptHandler for UartDriver<'_, B> {
    fn on_interrupt(&self) {
        self.interrupt();
    }
}

impl<B: RegisterBus> fmt::Write for &UartDriver<'_, B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write(s.as_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{UART0, UART2, UART4};
    use crate::sim::{FakePlatform, SimulatedUart};
    use crate::trampoline_table;
    use core::fmt::Write;
    use static_cell::StaticCell;
    use std::boxed::Box;
    use std::vec::Vec;

    type SimDriver = UartDriver<'static, &'static SimulatedUart>;

    fn driver(
        port: &'static PortDescriptor,
        capacity: usize,
        settings: SerialSettings,
    ) -> (&'static SimulatedUart, &'static SimDriver) {
        let sim: &'static SimulatedUart = Box::leak(Box::new(SimulatedUart::new()));
        let storage = std::vec![0u8; capacity].leak();
        let driver = Box::leak(Box::new(UartDriver::new(port, sim, storage, settings)));
        (sim, driver)
    }

    fn at_baud(baud_rate: u32) -> SerialSettings {
        SerialSettings {
            baud_rate,
            ..SerialSettings::default()
        }
    }

    trampoline_table! { static FRAME_TABLE; }

    #[test]
    fn test_invalid_word_length_leaves_port_disabled() {
        let settings = SerialSettings {
            format: LineFormat {
                word_length: 9,
                stop_bits: StopBits::Two,
                parity: Parity::None,
            },
            ..SerialSettings::default()
        };
        let (sim, uart) = driver(&UART2, 16, settings);
        let mut platform = FakePlatform::with_clock(12_000_000);

        assert_eq!(
            uart.initialize(&mut platform, &FRAME_TABLE),
            Err(UartError::InvalidFrameSize)
        );
        assert_eq!(uart.state(), DriverState::Disabled);
        assert_eq!(platform.powered, [UART2.peripheral]);
        assert!(platform.installed.is_empty());
        assert!(platform.functions.is_empty());
        assert!(!FRAME_TABLE.is_bound(UART2.index));
        // FIFO off, both clears strobed
        assert_eq!(sim.fcr_writes(), [0x06]);
        // Stop bit applied before the word length was rejected
        assert_eq!(sim.lcr() & (1 << 2), 1 << 2);
        assert_eq!(sim.divisor(), 0);
    }

    trampoline_table! { static BAUD_TABLE; }

    #[test]
    fn test_unachievable_baud_reported_before_format() {
        let settings = SerialSettings {
            baud_rate: 1_000_000,
            format: LineFormat {
                word_length: 4,
                ..LineFormat::default()
            },
        };
        let (_, uart) = driver(&UART0, 16, settings);
        let mut platform = FakePlatform::with_clock(12_000_000);

        assert_eq!(
            uart.initialize(&mut platform, &BAUD_TABLE),
            Err(UartError::UnachievableBaudRate)
        );
        assert_eq!(uart.state(), DriverState::Disabled);
        assert!(platform.installed.is_empty());
    }

    trampoline_table! { static INIT_TABLE; }

    #[test]
    fn test_initialize_programs_port() {
        let (sim, uart) = driver(&UART2, 16, at_baud(9600));
        let mut platform = FakePlatform::with_clock(1_536_000);

        uart.initialize(&mut platform, &INIT_TABLE).unwrap();

        assert_eq!(uart.state(), DriverState::Enabled);
        assert_eq!(sim.divisor(), 10);
        assert_eq!(sim.fdr(), 0x10);
        // 8N1, latch closed
        assert_eq!(sim.lcr(), 0x03);
        assert_eq!(sim.ier() & 1, 1);
        // disable, trigger level, FIFO on, enable with clears
        assert_eq!(sim.fcr_writes(), [0x06, 0xC0, 0xC1, 0xC7]);

        assert_eq!(
            platform.functions,
            [
                (UART2.tx, UART2.tx_function),
                (UART2.rx, UART2.rx_function),
            ]
        );
        assert_eq!(platform.pull_ups, [UART2.rx]);
        assert_eq!(platform.installed.len(), 1);
        assert_eq!(platform.installed[0].0, UART2.vector);
        assert!(INIT_TABLE.is_bound(UART2.index));
    }

    trampoline_table! { static LATCH_TABLE; }

    #[test]
    fn test_divisor_written_only_while_latch_open() {
        let (sim, uart) = driver(&UART0, 16, at_baud(115_200));
        let mut platform = FakePlatform::with_clock(12_000_000);

        uart.initialize(&mut platform, &LATCH_TABLE).unwrap();

        let writes = sim.writes();
        let open = writes
            .iter()
            .position(|&(offset, value)| offset == 0x0C && value & 0x80 != 0)
            .unwrap();
        assert_eq!(
            writes[open..open + 5],
            [
                (0x0C, 0x83),
                (0x04, 0x00),
                (0x00, 0x06),
                (0x28, 0xC1),
                (0x0C, 0x03),
            ]
        );
        // Latch opened exactly once
        assert_eq!(
            writes
                .iter()
                .filter(|&&(offset, value)| offset == 0x0C && value & 0x80 != 0)
                .count(),
            1
        );
    }

    #[test]
    fn test_line_format_encoding() {
        let cases = [
            (7, StopBits::Two, Parity::Even, 0x1E),
            (5, StopBits::One, Parity::Forced0, 0x38),
            (6, StopBits::One, Parity::Odd, 0x09),
            (8, StopBits::Two, Parity::Forced1, 0x2F),
            (8, StopBits::One, Parity::None, 0x03),
        ];
        for (word_length, stop_bits, parity, lcr) in cases {
            let settings = SerialSettings {
                format: LineFormat {
                    word_length,
                    stop_bits,
                    parity,
                },
                ..SerialSettings::default()
            };
            let (sim, uart) = driver(&UART0, 4, settings);
            uart.configure_format().unwrap();
            assert_eq!(sim.lcr(), lcr);
        }
    }

    trampoline_table! { static RECEIVE_TABLE; }

    #[test]
    fn test_interrupt_buffers_fifo_in_arrival_order() {
        let (sim, uart) = driver(&UART2, 16, SerialSettings::default());
        let mut platform = FakePlatform::with_clock(48_000_000);
        uart.initialize(&mut platform, &RECEIVE_TABLE).unwrap();

        sim.receive(b"hello");
        let vector = platform.vector(UART2.vector).unwrap();
        vector();

        assert_eq!(sim.pending_rx(), 0);
        assert_eq!(uart.bytes_available(), 5);

        let mut buffer = [0u8; 8];
        assert_eq!(uart.read(&mut buffer), 5);
        assert_eq!(&buffer[..5], b"hello");
        assert_eq!(uart.read(&mut buffer), 0);
        assert_eq!(uart.bytes_available(), 0);
    }

    #[test]
    fn test_character_timeout_also_drains() {
        let (sim, uart) = driver(&UART0, 16, SerialSettings::default());
        sim.receive(b"ok");
        sim.set_interrupt_id(0x6);

        uart.interrupt();
        assert_eq!(uart.bytes_available(), 2);
    }

    #[test]
    fn test_other_interrupt_causes_ignored() {
        let (sim, uart) = driver(&UART0, 16, SerialSettings::default());
        sim.receive(b"x");
        // THRE interrupt
        sim.set_interrupt_id(0x1);

        uart.interrupt();
        assert_eq!(uart.bytes_available(), 0);
        assert_eq!(sim.pending_rx(), 1);

        sim.set_interrupt_id(0x0);
        uart.interrupt();
        assert_eq!(uart.bytes_available(), 0);
    }

    #[test]
    fn test_overflow_keeps_oldest_bytes() {
        let (sim, uart) = driver(&UART0, 4, SerialSettings::default());
        sim.receive(b"abcdef");

        uart.interrupt();

        // Hardware FIFO emptied even though the buffer filled up
        assert_eq!(sim.pending_rx(), 0);
        assert_eq!(uart.bytes_available(), 4);
        assert_eq!(uart.dropped_bytes(), 2);

        let mut buffer = [0u8; 6];
        assert_eq!(uart.read(&mut buffer), 4);
        assert_eq!(&buffer[..4], b"abcd");
    }

    #[test]
    fn test_short_read_and_flush() {
        let (sim, uart) = driver(&UART0, 8, SerialSettings::default());
        sim.receive(b"123");
        uart.interrupt();

        let mut one = [0u8; 1];
        assert_eq!(uart.read(&mut one), 1);
        assert_eq!(one, *b"1");

        uart.flush();
        assert_eq!(uart.bytes_available(), 0);
        assert_eq!(uart.read(&mut one), 0);
        assert_eq!(one, *b"1");
    }

    #[test]
    fn test_write_waits_for_transmitter() {
        let (sim, uart) = driver(&UART0, 4, SerialSettings::default());
        sim.set_tx_latency(3);

        uart.write(b"abc");

        assert_eq!(sim.transmitted(), b"abc");
        assert_eq!(sim.tx_overruns(), 0);
        assert!(!uart.is_busy());
    }

    #[test]
    fn test_formatted_output() {
        let (sim, uart) = driver(&UART0, 4, SerialSettings::default());
        let mut out = uart;

        write!(out, "t={}ms", 42).unwrap();
        assert_eq!(sim.transmitted(), b"t=42ms");
    }

    #[test]
    fn test_enable_disable_fifo_control() {
        let (sim, uart) = driver(&UART0, 4, SerialSettings::default());
        assert_eq!(uart.state(), DriverState::Uninitialized);

        uart.enable();
        assert_eq!(uart.state(), DriverState::Enabled);
        uart.disable();
        assert_eq!(uart.state(), DriverState::Disabled);
        uart.enable();

        assert_eq!(sim.fcr_writes(), [0x07, 0x06, 0x07]);
    }

    trampoline_table! { static PAIR_TABLE; }

    #[test]
    fn test_two_ports_dispatch_to_their_own_driver() {
        let (sim0, uart0) = driver(&UART0, 16, SerialSettings::default());
        let (sim4, uart4) = driver(&UART4, 16, SerialSettings::default());
        let mut platform = FakePlatform::with_clock(60_000_000);

        uart0.initialize(&mut platform, &PAIR_TABLE).unwrap();
        uart4.initialize(&mut platform, &PAIR_TABLE).unwrap();

        sim0.receive(b"zero");
        sim4.receive(b"four!");

        platform.vector(UART0.vector).unwrap()();
        assert_eq!(uart0.bytes_available(), 4);
        assert_eq!(uart4.bytes_available(), 0);

        platform.vector(UART4.vector).unwrap()();
        assert_eq!(uart0.bytes_available(), 4);
        assert_eq!(uart4.bytes_available(), 5);
    }

    trampoline_table! { static SHARED_TABLE; }

    #[test]
    fn test_second_driver_cannot_take_bound_port() {
        let (_, first) = driver(&UART2, 16, SerialSettings::default());
        let (_, second) = driver(&UART2, 16, SerialSettings::default());
        let mut platform = FakePlatform::with_clock(48_000_000);

        first.initialize(&mut platform, &SHARED_TABLE).unwrap();
        // Re-initializing the bound driver is allowed
        first.initialize(&mut platform, &SHARED_TABLE).unwrap();

        assert_eq!(
            second.initialize(&mut platform, &SHARED_TABLE),
            Err(UartError::HandlerAlreadyBound)
        );
        assert_eq!(second.state(), DriverState::Disabled);
    }

    trampoline_table! { static CELL_TABLE; }

    #[test]
    fn test_driver_in_static_cell() {
        static SIM: StaticCell<SimulatedUart> = StaticCell::new();
        static STORAGE: StaticCell<ReceiveStorage> = StaticCell::new();
        static DRIVER: StaticCell<SimDriver> = StaticCell::new();

        let sim: &'static SimulatedUart = SIM.init(SimulatedUart::new());
        let storage = STORAGE.init([0; DEFAULT_RECEIVE_CAPACITY]);
        let instance = UartDriver::new(&UART0, sim, storage, SerialSettings::default());
        let uart: &'static SimDriver = DRIVER.init(instance);
        let mut platform = FakePlatform::with_clock(12_000_000);

        uart.initialize(&mut platform, &CELL_TABLE).unwrap();
        assert_eq!(uart.capacity(), 512);

        sim.receive(&[0x55; 20]);
        platform.vector(UART0.vector).unwrap()();

        let mut buffer = Vec::new();
        let mut chunk = [0u8; 8];
        loop {
            let n = uart.read(&mut chunk);
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
        }
        assert_eq!(buffer, [0x55; 20]);
    }
}

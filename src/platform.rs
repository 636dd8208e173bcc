//! Services the driver borrows from the rest of the system.
//!
//! Power gating, clock tree, pin multiplexing and the interrupt controller
//! belong to other drivers. The UART driver only sees them through these
//! traits, so board support code (or a test fake) decides how each request is
//! carried out.

/// Context-free interrupt service routine, as stored in a vector table.
pub type Vector = extern "C" fn();

/// Peripheral identifier, the bit index in the power-control register (PCONP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeripheralId(pub u8);

impl PeripheralId {
    /// PCUART0.
    pub const UART0: Self = Self(3);
    /// PCUART1.
    pub const UART1: Self = Self(4);
    /// PCUART2.
    pub const UART2: Self = Self(24);
    /// PCUART3.
    pub const UART3: Self = Self(25);
    /// PCUART4.
    pub const UART4: Self = Self(8);
}

/// A GPIO pin, `P<port>.<pin>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PinId {
    /// GPIO port number.
    pub port: u8,
    /// Pin number within the port.
    pub pin: u8,
}

impl PinId {
    /// Pin `pin` of GPIO port `port`.
    pub const fn new(port: u8, pin: u8) -> Self {
        Self { port, pin }
    }
}

/// Peripheral power gating.
pub trait PowerControl {
    /// Enable power and the register interface of `peripheral`.
    fn power_on(&mut self, peripheral: PeripheralId);
}

/// Clock tree queries.
pub trait ClockSource {
    /// Input clock of `peripheral` in Hz.
    fn frequency(&self, peripheral: PeripheralId) -> u32;
}

/// I/O configuration.
pub trait PinMux {
    /// Route `pin` to alternate function `function`.
    fn set_function(&mut self, pin: PinId, function: u8);

    /// Enable the internal pull-up on `pin`.
    fn set_pull_up(&mut self, pin: PinId);
}

/// Nested vectored interrupt controller.
pub trait InterruptController {
    /// Install `handler` on `vector` and unmask it.
    fn enable_interrupt(&mut self, vector: u16, handler: Vector);
}

/// Everything [`UartDriver::initialize`](crate::uart::UartDriver::initialize) needs.
pub trait Platform: PowerControl + ClockSource + PinMux + InterruptController {}

impl<T: PowerControl + ClockSource + PinMux + InterruptController + ?Sized> Platform for T {}

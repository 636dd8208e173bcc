//! Hardware memory map and configuration constants for the LPC40xx UARTs.
//!
//! This module centralizes base addresses, interrupt numbers and the UART
//! register layout, so drivers never carry magic numbers.
//!
//! # Memory Map
//!
//! | Peripheral | Base Address | IRQ | PCONP bit |
//! |------------|--------------|-----|-----------|
//! | UART0      | 0x4000_C000  | 5   | 3         |
//! | UART1      | 0x4001_0000  | 6   | 4         |
//! | UART2      | 0x4008_8000  | 7   | 24        |
//! | UART3      | 0x4009_C000  | 8   | 25        |
//! | UART4      | 0x400A_4000  | 35  | 8         |

/// UART0 base address
pub const UART0_BASE: usize = 0x4000_C000;

/// UART1 base address
pub const UART1_BASE: usize = 0x4001_0000;

/// UART2 base address
pub const UART2_BASE: usize = 0x4008_8000;

/// UART3 base address
pub const UART3_BASE: usize = 0x4009_C000;

/// UART4 base address
pub const UART4_BASE: usize = 0x400A_4000;

/// UART0 interrupt number on the NVIC
pub const UART0_IRQ: u16 = 5;

/// UART1 interrupt number on the NVIC
pub const UART1_IRQ: u16 = 6;

/// UART2 interrupt number on the NVIC
pub const UART2_IRQ: u16 = 7;

/// UART3 interrupt number on the NVIC
pub const UART3_IRQ: u16 = 8;

/// UART4 interrupt number on the NVIC
pub const UART4_IRQ: u16 = 35;

/// Number of UART ports, and of trampoline slots.
pub const MAX_PORTS: usize = 5;

/// Receive ring capacity used when the application has no better figure.
pub const DEFAULT_RECEIVE_CAPACITY: usize = 512;

/// Baud rate of [`SerialSettings::default`](crate::uart::SerialSettings).
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// UART register layout.
///
/// Registers are 32 bits wide at word-aligned byte offsets. Several offsets
/// are shared: the divisor-latch access bit in LCR selects DLL/DLM over
/// RBR/THR/IER, and IIR (read) shares its address with FCR (write).
pub mod uart {
    use crate::register::{Access, Field, Register};

    /// Receiver Buffer (read, DLAB=0)
    pub const RBR: Register = Register::new(0x00, Access::ReadOnly);

    /// Transmit Holding (write, DLAB=0)
    pub const THR: Register = Register::new(0x00, Access::WriteOnly);

    /// Divisor Latch LSB (DLAB=1)
    pub const DLL: Register = Register::new(0x00, Access::ReadWrite);

    /// Divisor Latch MSB (DLAB=1)
    pub const DLM: Register = Register::new(0x04, Access::ReadWrite);

    /// Interrupt Enable (DLAB=0)
    pub const IER: Register = Register::new(0x04, Access::ReadWrite);

    /// Interrupt Identification (read)
    pub const IIR: Register = Register::new(0x08, Access::ReadOnly);

    /// FIFO Control (write)
    pub const FCR: Register = Register::new(0x08, Access::WriteOnly);

    /// Line Control
    pub const LCR: Register = Register::new(0x0C, Access::ReadWrite);

    /// Line Status
    pub const LSR: Register = Register::new(0x14, Access::ReadOnly);

    /// Fractional Divider
    pub const FDR: Register = Register::new(0x28, Access::ReadWrite);

    // Line control fields

    /// Word length select, value = data bits - 5
    pub const LCR_WORD_LENGTH: Field = Field::new(LCR, 0, 2);

    /// Stop bit select (0 = 1 stop bit, 1 = 2 stop bits)
    pub const LCR_STOP: Field = Field::bit(LCR, 2);

    /// Parity enable
    pub const LCR_PARITY_ENABLE: Field = Field::bit(LCR, 3);

    /// Parity select
    pub const LCR_PARITY: Field = Field::new(LCR, 4, 2);

    /// Divisor Latch Access Bit
    pub const LCR_DLAB: Field = Field::bit(LCR, 7);

    // Interrupt fields

    /// Receive Data Available interrupt enable
    pub const IER_RECEIVE: Field = Field::bit(IER, 0);

    /// Interrupt identification
    pub const IIR_ID: Field = Field::new(IIR, 1, 3);

    /// Receive Data Available
    pub const IIR_RECEIVE_DATA: u32 = 0x2;

    /// Character Time-out Indicator
    pub const IIR_CHARACTER_TIMEOUT: u32 = 0x6;

    // FIFO control fields

    /// FIFO enable
    pub const FCR_FIFO_ENABLE: Field = Field::bit(FCR, 0);

    /// RX FIFO reset (self-clearing)
    pub const FCR_RX_CLEAR: Field = Field::bit(FCR, 1);

    /// TX FIFO reset (self-clearing)
    pub const FCR_TX_CLEAR: Field = Field::bit(FCR, 2);

    /// RX trigger level
    pub const FCR_RX_TRIGGER: Field = Field::new(FCR, 6, 2);

    /// Bits of FCR that act once and read back as zero
    pub const FCR_STROBES: u32 = FCR_RX_CLEAR.mask() | FCR_TX_CLEAR.mask();

    /// RX trigger level 3: interrupt after 14 characters
    pub const RX_TRIGGER_14_BYTES: u32 = 0x3;

    // Line status fields

    /// Receiver Data Ready
    pub const LSR_DATA_READY: Field = Field::bit(LSR, 0);

    /// Transmit Holding Register Empty
    pub const LSR_THR_EMPTY: Field = Field::bit(LSR, 5);

    // Fractional divider fields

    /// DIVADDVAL
    pub const FDR_NUMERATOR: Field = Field::new(FDR, 0, 4);

    /// MULVAL
    pub const FDR_DENOMINATOR: Field = Field::new(FDR, 4, 4);
}

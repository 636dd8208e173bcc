//! Error type for UART configuration.
//!
//! Only configuration-time calls fail: [`UartDriver::initialize`],
//! [`TrampolineTable::bind`] and the port registry. The data path (`read`,
//! `write`, the interrupt handler) absorbs overflow and underflow silently.
//!
//! # Error Codes Reference
//!
//! | Code | Variant | Description |
//! |------|---------|-------------|
//! | 0x01 | UnachievableBaudRate | Divisor out of range at this clock |
//! | 0x02 | InvalidFrameSize | Word length outside 5..=8 |
//! | 0x03 | HandlerAlreadyBound | Trampoline slot holds another handler |
//! | 0x04 | InvalidSlot | Slot index outside the trampoline table |
//! | 0x05 | PortAlreadyRegistered | Registry already holds a driver for the port |
//!
//! [`UartDriver::initialize`]: crate::uart::UartDriver::initialize
//! [`TrampolineTable::bind`]: crate::trampoline::TrampolineTable::bind

use core::fmt;

/// Configuration failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum UartError {
    /// The target baud rate cannot be produced from the input clock
    UnachievableBaudRate = 0x01,
    /// Word length outside 5..=8 bits
    InvalidFrameSize = 0x02,
    /// The trampoline slot is bound to a different handler
    HandlerAlreadyBound = 0x03,
    /// The trampoline slot index is out of range
    InvalidSlot = 0x04,
    /// The registry already holds a driver for this port
    PortAlreadyRegistered = 0x05,
}

impl UartError {
    /// Get the raw numeric code.
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Get a human-readable description of the error.
    pub const fn description(self) -> &'static str {
        match self {
            UartError::UnachievableBaudRate => "baud rate not achievable at this clock",
            UartError::InvalidFrameSize => "word length must be 5 to 8 bits",
            UartError::HandlerAlreadyBound => "interrupt slot bound to another handler",
            UartError::InvalidSlot => "interrupt slot index out of range",
            UartError::PortAlreadyRegistered => "port already has a registered driver",
        }
    }
}

impl fmt::Display for UartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<UartError> for u8 {
    #[inline]
    fn from(error: UartError) -> Self {
        error.code()
    }
}

/// Result type for UART configuration.
pub type UartResult<T> = Result<T, UartError>;

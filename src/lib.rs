//! Interrupt-driven UART driver for the NXP LPC40xx.
//!
//! Layers, bottom up:
//! - [`register`]: descriptor-based register and bit-field access
//! - [`baud`]: divisor and fractional divider calculation
//! - [`ring_buffer`]: lock-free receive buffer between ISR and foreground
//! - [`trampoline`]: context-free vector entries forwarding to driver instances
//! - [`uart`]: the driver
//!
//! Power, clocks, pins and the interrupt controller are reached through the
//! [`platform`] traits.

#![cfg_attr(not(test), no_std)]

pub mod baud;
pub mod config;
pub mod error;
pub mod platform;
pub mod port;
pub mod register;
pub mod ring_buffer;
pub mod trampoline;
pub mod uart;

#[cfg(test)]
mod sim;

pub use error::{UartError, UartResult};
pub use port::{PortDescriptor, UartRegistry, UART0, UART1, UART2, UART3, UART4};
pub use trampoline::{InterruptHandler, TrampolineTable, UART_TRAMPOLINES};
pub use uart::{DriverState, LineFormat, Parity, SerialSettings, StopBits, UartDriver};
